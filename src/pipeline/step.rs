// src/pipeline/step.rs
// =============================================================================
// The contract every pipeline step implements, and the context it runs in.
//
// A step has a lifecycle of Setup -> Execute -> Clean:
// - setup:   prepare anything execute needs (called for every selected step
//            before any of them runs)
// - execute: do the work; an Err aborts the whole run
// - clean:   remove whatever a previous execute produced ("if you make it,
//            you clean it up"), only called when a clean run is requested
// =============================================================================

use anyhow::Result;

use crate::checker::Probe;
use crate::config::Config;
use crate::tools::DocBuilder;

/// A named unit of the documentation pipeline.
pub trait Step {
    /// Unique lowercase key, used in --steps. No spaces.
    fn identifier(&self) -> &'static str;

    /// Title printed above the step's output.
    fn header(&self) -> &'static str;

    /// Steps expected to have run earlier in the same run.
    ///
    /// Advisory only: the scheduler warns when one is missing but never
    /// reorders or refuses.
    fn required_steps(&self) -> &'static [&'static str] {
        &[]
    }

    fn setup(&self, _ctx: &StepContext<'_>) -> Result<()> {
        Ok(())
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()>;

    fn clean(&self, _ctx: &StepContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// What a step can see and touch while it runs.
pub struct StepContext<'a> {
    pub config: &'a Config,
    pub docs: &'a dyn DocBuilder,
    pub probe: &'a dyn Probe,
    completed: Vec<&'static str>,
    hosting: bool,
}

impl<'a> StepContext<'a> {
    pub fn new(config: &'a Config, docs: &'a dyn DocBuilder, probe: &'a dyn Probe) -> Self {
        Self {
            config,
            docs,
            probe,
            completed: Vec::new(),
            hosting: false,
        }
    }

    /// Whether the step with this identifier already executed in this run.
    pub fn has_completed(&self, identifier: &str) -> bool {
        self.completed.iter().any(|id| *id == identifier)
    }

    /// Identifiers of executed steps, in execution order.
    pub fn completed(&self) -> &[&'static str] {
        &self.completed
    }

    pub(crate) fn mark_completed(&mut self, identifier: &'static str) {
        self.completed.push(identifier);
    }

    /// Records that a step left a documentation server running.
    pub fn start_hosting(&mut self) {
        self.hosting = true;
    }

    pub fn is_hosting(&self) -> bool {
        self.hosting
    }
}
