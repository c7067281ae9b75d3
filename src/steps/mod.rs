// src/steps/mod.rs
// =============================================================================
// The built-in pipeline steps.
//
// BUILTIN_STEPS is the one place steps are registered. DEFAULT_STEPS is the
// sequence run when --steps is not given: every built-in step except
// validate-links, which probes the whole site and is asked for by name.
// =============================================================================

mod docs;
mod files;
mod links;
mod reports;
mod toc;

use crate::pipeline::{Step, StepFactory};

pub use docs::{BuildStep, HostStep, MetadataStep};
pub use files::{ChangelogStep, CodeOfConductStep, LicenseStep, SecurityPolicyStep};
pub use links::ValidateLinksStep;
pub use reports::{CodeCoverageStep, CodeDuplicationStep, CodeInspectionStep};
pub use toc::TableOfContentsStep;

/// Every step the program ships with, in canonical order.
pub const BUILTIN_STEPS: &[StepFactory] = &[
    || -> Box<dyn Step> { Box::new(ChangelogStep) },
    || -> Box<dyn Step> { Box::new(SecurityPolicyStep) },
    || -> Box<dyn Step> { Box::new(CodeOfConductStep) },
    || -> Box<dyn Step> { Box::new(LicenseStep) },
    || -> Box<dyn Step> { Box::new(MetadataStep) },
    || -> Box<dyn Step> { Box::new(TableOfContentsStep) },
    || -> Box<dyn Step> { Box::new(CodeInspectionStep) },
    || -> Box<dyn Step> { Box::new(CodeDuplicationStep) },
    || -> Box<dyn Step> { Box::new(CodeCoverageStep) },
    || -> Box<dyn Step> { Box::new(BuildStep) },
    || -> Box<dyn Step> { Box::new(ValidateLinksStep) },
    || -> Box<dyn Step> { Box::new(HostStep::new()) },
];

/// Steps run when none are requested.
pub const DEFAULT_STEPS: &[&str] = &[
    ChangelogStep::KEY,
    SecurityPolicyStep::KEY,
    CodeOfConductStep::KEY,
    LicenseStep::KEY,
    MetadataStep::KEY,
    TableOfContentsStep::KEY,
    CodeInspectionStep::KEY,
    CodeDuplicationStep::KEY,
    CodeCoverageStep::KEY,
    BuildStep::KEY,
    HostStep::KEY,
];
