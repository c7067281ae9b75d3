// src/pipeline/scheduler.rs
// =============================================================================
// Turns a requested list of step names into an ordered run, then runs it.
//
// Ordering is the caller's: steps run exactly in the order they were asked
// for. Declared prerequisites are checked only to warn, so an operator can
// deliberately re-run a single late step (say, `build`) without its
// predecessors.
// =============================================================================

use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::registry::StepRegistry;
use super::step::{Step, StepContext};
use crate::error::DoxError;

/// The outcome of resolving requested names against the registry.
pub struct Resolution<'r> {
    /// Steps to run, in request order.
    pub steps: Vec<&'r dyn Step>,
    /// Requested names that matched nothing, as requested (lowercased).
    pub unknown: Vec<String>,
}

// Splits a comma separated step list
//
// "Build, ,host" -> ["build", "host"]
pub fn parse_step_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

// Resolves requested names into steps
//
// Unknown names are dropped with a warning. A name requested twice runs
// once, at its first position. Fails if nothing resolved.
pub fn resolve<'r, S: AsRef<str>>(
    registry: &'r StepRegistry,
    requested: &[S],
) -> Result<Resolution<'r>, DoxError> {
    let mut steps: Vec<&'r dyn Step> = Vec::new();
    let mut unknown = Vec::new();
    let mut seen = HashSet::new();

    for name in requested {
        let name = name.as_ref().trim().to_lowercase();
        if name.is_empty() {
            continue;
        }

        match registry.get(&name) {
            Some(step) => {
                if seen.insert(step.identifier()) {
                    steps.push(step);
                } else {
                    warn!("Step '{}' was requested more than once; running it once.", name);
                }
            }
            None => {
                warn!("Unable to find '{}' step.", name);
                unknown.push(name);
            }
        }
    }

    if steps.is_empty() {
        return Err(DoxError::NoSteps);
    }

    Ok(Resolution { steps, unknown })
}

/// Calls `clean` on each step, in order.
pub fn clean_steps(steps: &[&dyn Step], ctx: &StepContext<'_>) -> Result<()> {
    for step in steps {
        info!("Cleaning {} ...", step.identifier());
        step.clean(ctx)
            .with_context(|| format!("cleaning step '{}' failed", step.identifier()))?;
    }
    Ok(())
}

/// Calls `setup` on each step, in order.
pub fn setup_steps(steps: &[&dyn Step], ctx: &StepContext<'_>) -> Result<()> {
    for step in steps {
        step.setup(ctx)
            .with_context(|| format!("setting up step '{}' failed", step.identifier()))?;
    }
    Ok(())
}

// Executes each step once, in order, stopping at the first failure
pub fn run_steps(steps: &[&dyn Step], ctx: &mut StepContext<'_>) -> Result<()> {
    for step in steps {
        print_section_header(step.header());

        for missing in missing_prerequisites(*step, ctx) {
            warn!(
                "Step '{}' expects '{}' to have run earlier; its output may be incomplete.",
                step.identifier(),
                missing
            );
        }

        step.execute(ctx)
            .with_context(|| format!("step '{}' failed", step.identifier()))?;
        ctx.mark_completed(step.identifier());
    }
    Ok(())
}

/// Prerequisites of `step` that have not executed yet in this run.
pub fn missing_prerequisites(step: &dyn Step, ctx: &StepContext<'_>) -> Vec<&'static str> {
    step.required_steps()
        .iter()
        .copied()
        .filter(|required| !ctx.has_completed(required))
        .collect()
}

fn print_section_header(header: &str) {
    println!();
    println!("▶ {}", header);
    println!("{}", "=".repeat(header.chars().count() + 2));
}
