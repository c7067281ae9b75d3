// src/tools/mod.rs
// =============================================================================
// External programs the pipeline drives.
//
// - docfx: the documentation builder (metadata, build, serve)
// - git: clone/update/commit/push of the deployment repository
//
// Both sit behind a trait so steps and deploy can be exercised without the
// real binaries installed.
// =============================================================================

mod docfx;
mod git;

pub use docfx::{DocBuildMode, DocBuilder, DocFx};
pub use git::{Git, SourceControl};
