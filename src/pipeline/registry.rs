// src/pipeline/registry.rs
// =============================================================================
// Every step the program knows about, keyed by identifier.
//
// Steps are registered from a static table of constructor functions (see
// steps::BUILTIN_STEPS). Adding a step is one line in that table.
// =============================================================================

use std::collections::HashMap;

use tracing::warn;

use super::step::Step;

/// Builds one step instance.
pub type StepFactory = fn() -> Box<dyn Step>;

/// Registered steps in registration order, with a lookup by identifier.
#[derive(Default)]
pub struct StepRegistry {
    steps: Vec<Box<dyn Step>>,
    index: HashMap<String, usize>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Registers every factory's step, then reports prerequisites nobody provides
    pub fn from_factories(factories: &[StepFactory]) -> Self {
        let mut registry = Self::new();
        for factory in factories {
            registry.register(factory());
        }
        for (step, missing) in registry.unresolved_prerequisites() {
            warn!("Step '{}' requires unregistered step '{}'.", step, missing);
        }
        registry
    }

    // Adds a step under its lowercased identifier
    //
    // Returns: false (with a warning) if the identifier is already taken;
    // the first registration wins.
    pub fn register(&mut self, step: Box<dyn Step>) -> bool {
        let key = step.identifier().to_lowercase();
        if self.index.contains_key(&key) {
            warn!("A step with identifier '{}' is already registered.", key);
            return false;
        }
        self.index.insert(key, self.steps.len());
        self.steps.push(step);
        true
    }

    /// Looks a step up by identifier (case-insensitive).
    pub fn get(&self, identifier: &str) -> Option<&dyn Step> {
        self.index
            .get(&identifier.trim().to_lowercase())
            .map(|&i| self.steps[i].as_ref())
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|step| step.identifier())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// (step, prerequisite) pairs whose prerequisite is not registered.
    pub fn unresolved_prerequisites(&self) -> Vec<(&'static str, &'static str)> {
        self.steps
            .iter()
            .flat_map(|step| {
                step.required_steps()
                    .iter()
                    .filter(|required| self.get(required).is_none())
                    .map(move |required| (step.identifier(), *required))
            })
            .collect()
    }
}
