// src/steps/links.rs
// =============================================================================
// The link validation step and its report.
//
// Every link in the built site is resolved against the configured host and
// probed once. Broken links never fail the run: they are reported, and the
// totals are printed at the end either as a table or as JSON (--json).
// =============================================================================

use anyhow::Result;

use super::docs::BuildStep;
use crate::checker::{self, LinkStatus, ValidationResult, ValidationSummary};
use crate::pipeline::{Step, StepContext};

pub struct ValidateLinksStep;

impl ValidateLinksStep {
    pub const KEY: &'static str = "validate-links";
}

impl Step for ValidateLinksStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Validate Links"
    }

    fn required_steps(&self) -> &'static [&'static str] {
        &[BuildStep::KEY]
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let config = ctx.config;
        let base_url = config.host.base_url(&config.site);
        let summary = checker::validate_links(&config.site_dir(), &base_url, ctx.probe)?;
        print_summary(&summary, config.json)
    }
}

// Prints the results either as a table or JSON
fn print_summary(summary: &ValidationSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print_table(summary);
    }
    Ok(())
}

// Prints the failed links and the totals
fn print_table(summary: &ValidationSummary) {
    let failures: Vec<&ValidationResult> = summary.failures().collect();

    if !failures.is_empty() {
        println!("{:<60} {:<10} {:<30}", "URL", "STATUS", "FIRST FOUND IN");
        println!("{}", "=".repeat(100));

        for result in failures {
            let first = result
                .occurrences
                .first()
                .map(|o| o.file.display().to_string())
                .unwrap_or_default();
            println!(
                "{:<60} {:<10} {:<30}",
                truncate(&result.url, 57),
                format_status(result),
                first
            );
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   ✅ Good Links: {}", summary.good);
    println!("   🐙 GitHub Links: {}", summary.github);
    println!("   ❌ Bad Links: {}", summary.bad);
}

fn format_status(result: &ValidationResult) -> String {
    match result.status {
        LinkStatus::Good => format!("✅ {}", result.status_code),
        LinkStatus::GithubFalsePositive => format!("🐙 {}", result.status_code),
        LinkStatus::Bad => format!("❌ {}", result.status_code),
    }
}

// Shortens long URLs for the table, respecting char boundaries
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{FakeDocBuilder, ScriptedProbe};
    use std::fs;

    #[test]
    fn test_validates_site_for_configured_host() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path());
        config.json = true;
        let site = config.site_dir().join("guide");
        fs::create_dir_all(&site).unwrap();
        fs::write(site.join("page.html"), r#"<a href="/api/Foo.html">F</a><a href="Bar.html">B</a>"#).unwrap();

        let docs = FakeDocBuilder::succeeding();
        let probe = ScriptedProbe::new(404);
        let mut ctx = StepContext::new(&config, &docs, &probe);

        // Bad links are reported, not fatal
        ValidateLinksStep.execute(&mut ctx).unwrap();
        assert_eq!(probe.calls_to("http://localhost:8080/api/Foo.html"), 1);
        assert_eq!(probe.calls_to("http://localhost:8080/guide/Bar.html"), 1);
    }

    #[test]
    fn test_missing_site_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let (docs, probe) = (FakeDocBuilder::succeeding(), ScriptedProbe::new(200));
        let mut ctx = StepContext::new(&config, &docs, &probe);

        assert!(ValidateLinksStep.execute(&mut ctx).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 57), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
