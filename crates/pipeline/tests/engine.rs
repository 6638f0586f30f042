//! Execution-order and failure behaviour of compiled pipelines.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pipeline::{
    FieldName, PipelineBuilder, PipelineError, PipelineName, Record, RunLog, RunState,
    ServiceError, Step, StepError, StepName, END,
};

/// Appends its name to a shared journal and writes a field named after itself.
struct Journaling {
    name: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
    writes: Vec<FieldName>,
    fail: bool,
}

impl Journaling {
    fn new(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            journal: Arc::clone(journal),
            writes: vec![FieldName::from_static(name)],
            fail: false,
        }
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl Step for Journaling {
    fn reads(&self) -> &[FieldName] {
        &[]
    }

    fn writes(&self) -> &[FieldName] {
        &self.writes
    }

    async fn run(&self, _record: &Record) -> Result<Record, StepError> {
        self.journal.lock().unwrap().push(self.name.to_owned());
        if self.fail {
            return Err(ServiceError::Api {
                status: 429,
                message: "rate limited".into(),
            }
            .into());
        }
        Ok(Record::new().with_field(self.name, self.name))
    }
}

fn chain(names: &[&'static str], journal: &Arc<Mutex<Vec<String>>>) -> PipelineBuilder {
    let mut builder = PipelineBuilder::new(PipelineName::from_static("journal"));
    for &name in names {
        builder.add_step(name, Journaling::new(name, journal)).unwrap();
    }
    builder.set_entry(names[0]);
    for pair in names.windows(2) {
        builder.add_edge(pair[0], pair[1]);
    }
    builder.add_edge(names[names.len() - 1], END);
    builder
}

#[tokio::test]
async fn linear_pipelines_run_in_declared_edge_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    // Registration order deliberately differs from edge order.
    let mut builder = PipelineBuilder::new(PipelineName::from_static("journal"));
    for name in ["summarize", "fetch", "classify", "extract"] {
        builder.add_step(name, Journaling::new(name, &journal)).unwrap();
    }
    builder
        .set_entry("fetch")
        .add_edge("fetch", "classify")
        .add_edge("classify", "extract")
        .add_edge("extract", "summarize")
        .add_edge("summarize", END);
    let pipeline = builder.compile().unwrap();

    let record = pipeline.invoke(Record::new()).await.unwrap();

    let ran = journal.lock().unwrap().clone();
    assert_eq!(ran, vec!["fetch", "classify", "extract", "summarize"]);
    assert_eq!(
        pipeline.order().map(StepName::as_str).collect::<Vec<_>>(),
        ran
    );
    assert_eq!(record.len(), 4);
}

#[tokio::test]
async fn a_failing_step_stops_the_run() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut builder = PipelineBuilder::new(PipelineName::from_static("journal"));
    builder.add_step("one", Journaling::new("one", &journal)).unwrap();
    builder
        .add_step("two", Journaling::new("two", &journal).failing())
        .unwrap();
    builder.add_step("three", Journaling::new("three", &journal)).unwrap();
    builder
        .set_entry("one")
        .add_edge("one", "two")
        .add_edge("two", "three")
        .add_edge("three", END);
    let pipeline = builder.compile().unwrap();
    let mut log = RunLog::new();

    let err = pipeline
        .invoke_observed(Record::from_text("seed"), &mut log)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        PipelineError::StepFailed { step, source: StepError::Service(ServiceError::Api { status: 429, .. }) }
            if step.as_str() == "two"
    ));
    assert_eq!(journal.lock().unwrap().clone(), vec!["one", "two"]);

    let states = log.states();
    assert_eq!(states.first(), Some(&RunState::NotStarted));
    assert_eq!(
        states.last(),
        Some(&RunState::Failed {
            step: StepName::from_static("two")
        })
    );
    assert_eq!(log.traces().len(), 1);

    // Work completed before the failure is still available to the observer.
    let captured = log.last_record().unwrap();
    assert_eq!(captured.get_str("one"), Some("one"));
    assert_eq!(captured.get_str("text"), Some("seed"));
    assert!(!captured.contains("two"));
}

#[tokio::test]
async fn observer_sees_every_transition_of_a_successful_run() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let pipeline = chain(&["a", "b"], &journal).compile().unwrap();
    let mut log = RunLog::new();

    pipeline
        .invoke_observed(Record::new(), &mut log)
        .await
        .unwrap();

    let expected = vec![
        RunState::NotStarted,
        RunState::Running {
            step: StepName::from_static("a"),
            index: 0,
            total: 2,
        },
        RunState::Running {
            step: StepName::from_static("b"),
            index: 1,
            total: 2,
        },
        RunState::Completed,
    ];
    assert_eq!(log.states(), expected.as_slice());
    assert!(log.run_id().is_some());
}

#[tokio::test]
async fn a_shared_pipeline_serves_concurrent_invocations() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Arc::new(chain(&["a", "b"], &journal).compile().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .invoke(Record::from_text(format!("run-{i}")))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let record = handle.await.unwrap().unwrap();
        assert_eq!(record.get_str("text"), Some(format!("run-{i}").as_str()));
        assert_eq!(record.len(), 3);
    }
    assert_eq!(journal.lock().unwrap().len(), 8);
}
