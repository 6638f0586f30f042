//! The unit of pipeline work.

use async_trait::async_trait;

use crate::{FieldName, Record, StepError};

/// One unit of analysis work.
///
/// A step declares which record fields it reads and which it writes. A
/// declared write is guaranteed to be present in the step's output unless it
/// is also listed in [`optional_writes`](Step::optional_writes). The engine
/// checks every declared read against the guaranteed writes of the steps that
/// always run earlier, and at run time rejects any returned field that is not
/// a declared write as well as any guaranteed write that is missing.
///
/// `run` receives the current record by reference and returns a *partial*
/// record containing only the fields it produced; it never mutates its input.
#[async_trait]
pub trait Step: Send + Sync {
    /// Fields this step reads from the record.
    fn reads(&self) -> &[FieldName];

    /// Every field this step may write into the record.
    fn writes(&self) -> &[FieldName];

    /// The subset of [`writes`](Step::writes) the step may leave out.
    ///
    /// Later steps cannot declare reads on these fields.
    fn optional_writes(&self) -> &[FieldName] {
        &[]
    }

    /// Performs the work and returns the newly produced fields.
    async fn run(&self, record: &Record) -> Result<Record, StepError>;
}

/// Adapts a synchronous closure into a [`Step`].
///
/// Useful for pure transformations (and for tests) that need no I/O.
pub struct FnStep<F> {
    reads: Vec<FieldName>,
    writes: Vec<FieldName>,
    optional: Vec<FieldName>,
    func: F,
}

impl<F> FnStep<F>
where
    F: Fn(&Record) -> Result<Record, StepError> + Send + Sync,
{
    /// Wraps `func` with the given field contract.
    pub fn new(
        reads: impl IntoIterator<Item = FieldName>,
        writes: impl IntoIterator<Item = FieldName>,
        func: F,
    ) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            writes: writes.into_iter().collect(),
            optional: Vec::new(),
            func,
        }
    }

    /// Marks some of the declared writes as optional.
    pub fn with_optional_writes(mut self, fields: impl IntoIterator<Item = FieldName>) -> Self {
        self.optional.extend(fields);
        self
    }
}

#[async_trait]
impl<F> Step for FnStep<F>
where
    F: Fn(&Record) -> Result<Record, StepError> + Send + Sync,
{
    fn reads(&self) -> &[FieldName] {
        &self.reads
    }

    fn writes(&self) -> &[FieldName] {
        &self.writes
    }

    fn optional_writes(&self) -> &[FieldName] {
        &self.optional
    }

    async fn run(&self, record: &Record) -> Result<Record, StepError> {
        (self.func)(record)
    }
}
