// src/pipeline/mod.rs
// =============================================================================
// The step pipeline.
//
// Submodules:
// - step: the Step trait and the context steps run in
// - registry: every known step, keyed by identifier
// - scheduler: name resolution and the clean/setup/execute loop
// =============================================================================

mod registry;
mod scheduler;
mod step;

pub use registry::{StepFactory, StepRegistry};
pub use scheduler::{clean_steps, parse_step_list, resolve, run_steps, setup_steps};
pub use step::{Step, StepContext};

use anyhow::Result;
use tracing::{info, warn};

use crate::checker::Probe;
use crate::config::Config;
use crate::tools::DocBuilder;

/// What a finished generate run left behind.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Identifiers that executed, in order.
    pub executed: Vec<&'static str>,
    /// A step left a documentation server running.
    pub hosting: bool,
}

// Runs the generate command
//
// 1. Resolve the requested (or default) step list
// 2. Clean every selected step if asked to
// 3. Set up every selected step
// 4. Execute them in order
pub fn generate(
    config: &Config,
    registry: &StepRegistry,
    default_steps: &[&str],
    docs: &dyn DocBuilder,
    probe: &dyn Probe,
) -> Result<RunReport> {
    info!("Generating ...");

    let resolution = match &config.steps {
        Some(requested) => resolve(registry, requested)?,
        None => resolve(registry, default_steps)?,
    };

    if !resolution.unknown.is_empty() {
        let known: Vec<_> = registry.identifiers().collect();
        warn!(
            "Skipping unknown step(s) {}; known steps are {}.",
            resolution.unknown.join(", "),
            known.join(", ")
        );
    }

    let mut ctx = StepContext::new(config, docs, probe);
    if config.clean {
        clean_steps(&resolution.steps, &ctx)?;
    }
    setup_steps(&resolution.steps, &ctx)?;
    run_steps(&resolution.steps, &mut ctx)?;

    Ok(RunReport {
        executed: ctx.completed().to_vec(),
        hosting: ctx.is_hosting(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DoxError;
    use crate::testing::{CallLog, FakeDocBuilder, NamedStep, ScriptedProbe};

    fn registry() -> StepRegistry {
        let mut registry = StepRegistry::new();
        registry.register(NamedStep::boxed("metadata", &[]));
        registry.register(NamedStep::boxed("build", &["metadata"]));
        registry.register(NamedStep::hosting("host"));
        registry
    }

    #[test]
    fn test_generate_uses_default_sequence() {
        let config = Config::new("docs");
        let report = generate(
            &config,
            &registry(),
            &["metadata", "build"],
            &FakeDocBuilder::succeeding(),
            &ScriptedProbe::new(200),
        )
        .unwrap();
        assert_eq!(report.executed, vec!["metadata", "build"]);
        assert!(!report.hosting);
    }

    #[test]
    fn test_generate_honours_requested_steps_and_hosting() {
        let mut config = Config::new("docs");
        config.steps = Some(parse_step_list("build,hosst,host"));
        let report = generate(
            &config,
            &registry(),
            &[],
            &FakeDocBuilder::succeeding(),
            &ScriptedProbe::new(200),
        )
        .unwrap();
        assert_eq!(report.executed, vec!["build", "host"]);
        assert!(report.hosting);
    }

    #[test]
    fn test_generate_without_steps_fails() {
        let mut config = Config::new("docs");
        config.steps = Some(parse_step_list("nothing"));
        let err = generate(
            &config,
            &registry(),
            &[],
            &FakeDocBuilder::succeeding(),
            &ScriptedProbe::new(200),
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<DoxError>(), Some(DoxError::NoSteps)));
    }

    #[test]
    fn test_generate_cleans_then_sets_up_then_executes() {
        let log = CallLog::default();
        let mut registry = StepRegistry::new();
        registry.register(NamedStep::recording("metadata", &log));
        registry.register(NamedStep::recording("build", &log));
        registry.register(NamedStep::recording("host", &log));

        let mut config = Config::new("docs");
        config.clean = true;
        config.steps = Some(parse_step_list("metadata,build"));
        let report = generate(
            &config,
            &registry,
            &[],
            &FakeDocBuilder::succeeding(),
            &ScriptedProbe::new(200),
        )
        .unwrap();

        assert_eq!(report.executed, vec!["metadata", "build"]);
        assert_eq!(
            *log.borrow(),
            vec![
                "clean:metadata",
                "clean:build",
                "setup:metadata",
                "setup:build",
                "execute:metadata",
                "execute:build",
            ]
        );
    }

    #[test]
    fn test_generate_skips_clean_unless_asked() {
        let log = CallLog::default();
        let mut registry = StepRegistry::new();
        registry.register(NamedStep::recording("build", &log));

        let config = Config::new("docs");
        generate(
            &config,
            &registry,
            &["build"],
            &FakeDocBuilder::succeeding(),
            &ScriptedProbe::new(200),
        )
        .unwrap();
        assert_eq!(*log.borrow(), vec!["setup:build", "execute:build"]);
    }
}
