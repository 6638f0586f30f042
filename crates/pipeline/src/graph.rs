//! Pipeline graph builder and the compiled execution engine.
//!
//! A [`PipelineBuilder`] collects named steps, edges, an entry step and the
//! fields the seed record is guaranteed to carry. [`PipelineBuilder::compile`]
//! validates the graph and fixes an execution order; the resulting
//! [`CompiledPipeline`] is immutable and may be shared between concurrent
//! callers, each invocation working on its own [`Record`].
//!
//! ## Validation
//!
//! | Check | Error |
//! |-------|-------|
//! | step names non-empty and not [`END`] | [`PipelineError::InvalidName`] |
//! | no name registered twice | [`PipelineError::DuplicateStep`] |
//! | entry declared and registered | [`PipelineError::NoEntry`], [`PipelineError::UnknownStep`] |
//! | every edge endpoint registered | [`PipelineError::UnknownStep`] |
//! | every step reachable from the entry | [`PipelineError::Unreachable`] |
//! | every step has a path to [`END`] | [`PipelineError::NoPathToEnd`] |
//! | no cycles | [`PipelineError::Cycle`] |
//! | declared reads satisfied by inputs or ancestor writes | [`PipelineError::UnsatisfiedRead`] |
//!
//! ## Execution order
//!
//! Steps run one at a time in topological order. Ties between independent
//! branches are broken by registration order, so a linear graph runs in
//! exactly its declared edge order.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, debug_span, info, info_span, warn, Instrument};

use crate::identifiers::END;
use crate::run::{NoopObserver, RunObserver, RunState};
use crate::{FieldName, PipelineError, PipelineName, PipelineRunId, Record, Step, StepName};

struct RegisteredStep {
    name: StepName,
    step: Arc<dyn Step>,
}

/// Collects steps and edges for a pipeline graph.
pub struct PipelineBuilder {
    name: PipelineName,
    steps: Vec<RegisteredStep>,
    index: HashMap<StepName, usize>,
    invalid: Vec<String>,
    duplicates: Vec<StepName>,
    edges: Vec<(String, String)>,
    entry: Option<String>,
    inputs: Vec<FieldName>,
}

impl PipelineBuilder {
    /// Starts an empty graph.
    pub fn new(name: PipelineName) -> Self {
        Self {
            name,
            steps: Vec::new(),
            index: HashMap::new(),
            invalid: Vec::new(),
            duplicates: Vec::new(),
            edges: Vec::new(),
            entry: None,
            inputs: Vec::new(),
        }
    }

    /// Registers `step` under `name`.
    ///
    /// Fails if the name is empty, reserved, or already registered. A rejected
    /// registration is remembered and also makes [`compile`](Self::compile)
    /// fail, so a builder that saw one can never produce a pipeline.
    pub fn add_step(
        &mut self,
        name: &str,
        step: impl Step + 'static,
    ) -> Result<&mut Self, PipelineError> {
        self.add_shared_step(name, Arc::new(step))
    }

    /// Registers an already shared step under `name`.
    pub fn add_shared_step(
        &mut self,
        name: &str,
        step: Arc<dyn Step>,
    ) -> Result<&mut Self, PipelineError> {
        let Some(step_name) = StepName::new(name).filter(|n| n.as_str() != END) else {
            self.invalid.push(name.to_owned());
            return Err(PipelineError::InvalidName {
                name: name.to_owned(),
            });
        };
        if self.index.contains_key(&step_name) {
            self.duplicates.push(step_name.clone());
            return Err(PipelineError::DuplicateStep { name: step_name });
        }
        self.index.insert(step_name.clone(), self.steps.len());
        self.steps.push(RegisteredStep {
            name: step_name,
            step,
        });
        Ok(self)
    }

    /// Declares that `to` runs after `from`. `to` may be [`END`].
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        self.edges.push((from.to_owned(), to.to_owned()));
        self
    }

    /// Declares the first step to run.
    pub fn set_entry(&mut self, name: &str) -> &mut Self {
        self.entry = Some(name.to_owned());
        self
    }

    /// Declares a field every seed record passed to `invoke` must contain.
    pub fn declare_input(&mut self, field: FieldName) -> &mut Self {
        if !self.inputs.contains(&field) {
            self.inputs.push(field);
        }
        self
    }

    fn lookup(
        &self,
        name: &str,
        referenced_by: impl FnOnce() -> String,
    ) -> Result<usize, PipelineError> {
        StepName::new(name)
            .and_then(|n| self.index.get(&n).copied())
            .ok_or_else(|| PipelineError::UnknownStep {
                name: name.to_owned(),
                referenced_by: referenced_by(),
            })
    }

    /// Validates the graph and fixes its execution order.
    pub fn compile(self) -> Result<CompiledPipeline, PipelineError> {
        if let Some(name) = self.invalid.first() {
            return Err(PipelineError::InvalidName { name: name.clone() });
        }
        if let Some(name) = self.duplicates.first() {
            return Err(PipelineError::DuplicateStep { name: name.clone() });
        }

        let entry_name = self.entry.as_deref().ok_or(PipelineError::NoEntry)?;
        let entry = self.lookup(entry_name, || "entry".to_owned())?;

        let n = self.steps.len();
        let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        let mut predecessors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        let mut to_end = vec![false; n];
        for (from, to) in &self.edges {
            let describe = || format!("edge {from} -> {to}");
            let f = self.lookup(from, describe)?;
            if to == END {
                to_end[f] = true;
            } else {
                let t = self.lookup(to, describe)?;
                successors[f].insert(t);
                predecessors[t].insert(f);
            }
        }

        let reachable = flood(entry, &successors, n);
        if let Some(i) = (0..n).find(|&i| !reachable[i]) {
            return Err(PipelineError::Unreachable {
                name: self.steps[i].name.clone(),
            });
        }

        let mut reaches_end = vec![false; n];
        for start in (0..n).filter(|&i| to_end[i]) {
            for (i, hit) in flood(start, &predecessors, n).into_iter().enumerate() {
                reaches_end[i] |= hit;
            }
        }
        if let Some(i) = (0..n).find(|&i| !reaches_end[i]) {
            return Err(PipelineError::NoPathToEnd {
                name: self.steps[i].name.clone(),
            });
        }

        let order = topological_order(&successors, &predecessors).map_err(|i| {
            PipelineError::Cycle {
                name: self.steps[i].name.clone(),
            }
        })?;

        // Ancestors of a step always run before it, whatever branch executes.
        let mut ancestors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for &v in &order {
            let mut acc = BTreeSet::new();
            for &p in &predecessors[v] {
                acc.insert(p);
                acc.extend(ancestors[p].iter().copied());
            }
            ancestors[v] = acc;
        }
        for &v in &order {
            let registered = &self.steps[v];
            for field in registered.step.reads() {
                let provided = self.inputs.contains(field)
                    || ancestors[v]
                        .iter()
                        .any(|&a| guarantees(self.steps[a].step.as_ref(), field));
                if !provided {
                    return Err(PipelineError::UnsatisfiedRead {
                        step: registered.name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }

        let mut slots: Vec<Option<RegisteredStep>> = self.steps.into_iter().map(Some).collect();
        let scheduled = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .map(|registered| ScheduledStep {
                guaranteed: registered
                    .step
                    .writes()
                    .iter()
                    .filter(|f| guarantees(registered.step.as_ref(), f))
                    .cloned()
                    .collect(),
                writes: registered
                    .step
                    .writes()
                    .iter()
                    .map(|f| f.as_str().to_owned())
                    .collect(),
                name: registered.name,
                step: registered.step,
            })
            .collect::<Vec<_>>();

        debug!(
            pipeline = %self.name,
            steps = scheduled.len(),
            "Pipeline compiled"
        );

        Ok(CompiledPipeline {
            name: self.name,
            order: scheduled,
            inputs: self.inputs,
        })
    }
}

/// Whether `step` always writes `field` when it succeeds.
fn guarantees(step: &dyn Step, field: &FieldName) -> bool {
    step.writes().contains(field) && !step.optional_writes().contains(field)
}

/// Marks every node reachable from `start` along `adjacency`.
fn flood(start: usize, adjacency: &[BTreeSet<usize>], n: usize) -> Vec<bool> {
    let mut seen = vec![false; n];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(v) = queue.pop_front() {
        for &w in &adjacency[v] {
            if !seen[w] {
                seen[w] = true;
                queue.push_back(w);
            }
        }
    }
    seen
}

/// Kahn's algorithm with ties broken by lowest index.
///
/// On a cycle, returns the index of a node lying on it.
fn topological_order(
    successors: &[BTreeSet<usize>],
    predecessors: &[BTreeSet<usize>],
) -> Result<Vec<usize>, usize> {
    let n = successors.len();
    let mut in_degree: Vec<usize> = predecessors.iter().map(BTreeSet::len).collect();
    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(v) = ready.pop_first() {
        order.push(v);
        for &w in &successors[v] {
            in_degree[w] -= 1;
            if in_degree[w] == 0 {
                ready.insert(w);
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    // Every leftover node has a leftover predecessor; walking back n times
    // from any of them must end on the cycle.
    let leftover: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] > 0).collect();
    let mut v = leftover.first().copied().unwrap_or(0);
    for _ in 0..n {
        if let Some(&p) = predecessors[v].iter().find(|p| leftover.contains(p)) {
            v = p;
        }
    }
    Err(v)
}

struct ScheduledStep {
    name: StepName,
    step: Arc<dyn Step>,
    writes: BTreeSet<String>,
    guaranteed: Vec<FieldName>,
}

/// A validated pipeline, ready to run.
pub struct CompiledPipeline {
    name: PipelineName,
    order: Vec<ScheduledStep>,
    inputs: Vec<FieldName>,
}

impl std::fmt::Debug for CompiledPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPipeline")
            .field("name", &self.name)
            .field("order", &self.order().collect::<Vec<_>>())
            .field("inputs", &self.inputs)
            .finish()
    }
}

impl CompiledPipeline {
    /// The pipeline's name.
    pub fn name(&self) -> &PipelineName {
        &self.name
    }

    /// Step names in execution order.
    pub fn order(&self) -> impl Iterator<Item = &StepName> {
        self.order.iter().map(|s| &s.name)
    }

    /// Fields the seed record must contain.
    pub fn inputs(&self) -> &[FieldName] {
        &self.inputs
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the pipeline has no steps (never the case after a
    /// successful compile).
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Runs every step against `initial` and returns the final record.
    pub async fn invoke(&self, initial: Record) -> Result<Record, PipelineError> {
        self.invoke_observed(initial, &mut NoopObserver).await
    }

    /// Like [`invoke`](Self::invoke), reporting progress to `observer`.
    pub async fn invoke_observed(
        &self,
        initial: Record,
        observer: &mut dyn RunObserver,
    ) -> Result<Record, PipelineError> {
        let run_id = PipelineRunId::new_random();
        let span = info_span!("pipeline.invoke", pipeline = %self.name, run_id = %run_id);
        self.execute(run_id, initial, observer).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: PipelineRunId,
        mut record: Record,
        observer: &mut dyn RunObserver,
    ) -> Result<Record, PipelineError> {
        if let Some(field) = self.inputs.iter().find(|f| !record.contains(f.as_str())) {
            warn!(field = %field, "Seed record is missing a declared input");
            return Err(PipelineError::MissingInput {
                field: field.clone(),
            });
        }

        observer.on_transition(run_id, &RunState::NotStarted);
        let total = self.order.len();
        let started = Instant::now();

        for (index, scheduled) in self.order.iter().enumerate() {
            let name = &scheduled.name;
            observer.on_transition(
                run_id,
                &RunState::Running {
                    step: name.clone(),
                    index,
                    total,
                },
            );

            debug!(step = %name, index, total, "Step started");
            let step_started = Instant::now();
            let result = scheduled
                .step
                .run(&record)
                .instrument(debug_span!("step", step = %name, index))
                .await;

            let partial = match result {
                Ok(partial) => partial,
                Err(source) => {
                    warn!(step = %name, index, error = %source, "Step failed");
                    observer.on_transition(run_id, &RunState::Failed { step: name.clone() });
                    return Err(PipelineError::StepFailed {
                        step: name.clone(),
                        source,
                    });
                }
            };

            if let Some(field) = partial.keys().find(|k| !scheduled.writes.contains(*k)) {
                let field = field.to_owned();
                warn!(step = %name, field = %field, "Step wrote an undeclared field");
                observer.on_transition(run_id, &RunState::Failed { step: name.clone() });
                return Err(PipelineError::UndeclaredWrite {
                    step: name.clone(),
                    field,
                });
            }

            if let Some(field) = scheduled
                .guaranteed
                .iter()
                .find(|f| !partial.contains(f.as_str()))
            {
                warn!(step = %name, field = %field, "Step left out a guaranteed field");
                observer.on_transition(run_id, &RunState::Failed { step: name.clone() });
                return Err(PipelineError::MissingWrite {
                    step: name.clone(),
                    field: field.clone(),
                });
            }

            let written = partial.keys().collect::<Vec<_>>().join(",");
            record.merge(partial);
            info!(
                step = %name,
                index,
                duration_ms = step_started.elapsed().as_millis() as u64,
                fields = %written,
                "Step completed"
            );
            observer.on_merged(name, &record);
        }

        observer.on_transition(run_id, &RunState::Completed);
        info!(
            steps = total,
            fields = record.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Pipeline completed"
        );
        Ok(record)
    }
}
