// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every option is a flat `--name [value]` flag. Unknown flags (and the value
// that follows them) are dropped by `known_args` before clap sees the
// command line, so wrapper scripts can pass extra switches through without
// breaking older builds of the tool.
//
// With neither --generate nor --deploy we generate. With both we generate
// first and then deploy.
// =============================================================================

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::checker::HostProfile;

#[derive(Parser, Debug)]
#[command(
    name = "dox",
    version,
    about = "Build, host, validate and deploy a documentation site",
    long_about = "dox runs an ordered set of documentation steps (metadata extraction, \
                  reports, site build, hosting, link validation) against the docfx toolchain, \
                  then optionally publishes the result to a versioned static site repository.")]
pub struct Cli {
    /// Run the documentation steps (the default command)
    #[arg(long)]
    pub generate: bool,

    /// Publish the built site to the deployment repository
    #[arg(long)]
    pub deploy: bool,

    /// Documentation input directory (holds .docfx/docfx.json)
    #[arg(long, env = "DOX_INPUT", default_value = ".")]
    pub input: PathBuf,

    /// Copy the built site to this directory after the build step
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Comma separated step identifiers, run in the given order
    ///
    /// Example: --steps files-changelog,metadata,build
    #[arg(long, env = "DOX_STEPS")]
    pub steps: Option<String>,

    /// Deployment branch: dev or main
    #[arg(long, env = "DOX_BRANCH")]
    pub branch: Option<String>,

    /// Host the link steps target (defaults to the branch's host, else local)
    #[arg(long, value_enum)]
    pub host: Option<HostProfile>,

    /// Directory holding CI artifacts for the report steps
    #[arg(long, env = "DOX_STAGING")]
    pub staging: Option<PathBuf>,

    /// Clean every selected step's previous output before running
    #[arg(long)]
    pub clean: bool,

    /// Publish exported values as TeamCity service messages
    #[arg(long = "set-teamcity")]
    pub set_teamcity: bool,

    /// Publish exported values as environment variables
    #[arg(long = "set-user-env")]
    pub set_user_env: bool,

    /// Print the link validation summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Whether the step pipeline should run.
    pub fn should_generate(&self) -> bool {
        self.generate || !self.deploy
    }

    // Log filter used when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

// Keeps only the arguments clap knows about
//
// An unknown `--name value` pair is dropped as a whole; a following token
// that starts with '-' is treated as the next flag, not as a value.
pub fn known_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut cmd = Cli::command();
    cmd.build();

    // (takes a value) per known long and short name
    let mut longs = HashMap::new();
    let mut shorts = HashMap::new();
    for arg in cmd.get_arguments() {
        let takes_value = arg.get_action().takes_values();
        if let Some(long) = arg.get_long() {
            longs.insert(long.to_string(), takes_value);
        }
        if let Some(short) = arg.get_short() {
            shorts.insert(short, takes_value);
        }
    }

    let mut args = args.into_iter().peekable();
    let mut kept: Vec<String> = args.next().into_iter().collect();

    while let Some(token) = args.next() {
        let (known, inline_value) = if let Some(flag) = token.strip_prefix("--") {
            let (name, value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };
            (longs.get(name).copied(), value)
        } else if let Some(flag) = token.strip_prefix('-').filter(|f| f.chars().count() == 1) {
            (flag.chars().next().and_then(|c| shorts.get(&c).copied()), false)
        } else {
            // A stray value with no flag in front of it
            continue;
        };

        let next_is_value = !inline_value && args.peek().is_some_and(|next| !next.starts_with('-'));
        match known {
            Some(takes_value) => {
                kept.push(token);
                if takes_value && !inline_value {
                    kept.extend(args.next());
                }
            }
            None if next_is_value => {
                args.next();
            }
            None => {}
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_generate() {
        let cli = Cli::parse_from(["dox"]);
        assert!(cli.should_generate());
        assert!(!cli.deploy);
        assert_eq!(cli.input, PathBuf::from("."));
    }

    #[test]
    fn test_deploy_only() {
        let cli = Cli::parse_from(["dox", "--deploy", "--branch", "main"]);
        assert!(!cli.should_generate());
        assert_eq!(cli.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_flags_with_values() {
        let cli = Cli::parse_from([
            "dox", "--steps", "build,host", "--host", "dev", "--output", "out", "--set-teamcity",
        ]);
        assert_eq!(cli.steps.as_deref(), Some("build,host"));
        assert_eq!(cli.host, Some(HostProfile::Dev));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(cli.set_teamcity);
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(known_args(args.iter().map(|a| a.to_string())))
    }

    #[test]
    fn test_unknown_flag_at_the_end() {
        let cli = parse(&["dox", "--steps", "build", "--mystery"]);
        assert_eq!(cli.steps.as_deref(), Some("build"));
    }

    #[test]
    fn test_unknown_flag_first_keeps_the_rest() {
        let cli = parse(&["dox", "--mystery", "--steps", "build", "--deploy"]);
        assert_eq!(cli.steps.as_deref(), Some("build"));
        assert!(cli.deploy);
    }

    #[test]
    fn test_unknown_flag_with_value_in_the_middle() {
        let cli = parse(&["dox", "--steps", "build", "--ping-host", "github.com", "--branch", "main"]);
        assert_eq!(cli.steps.as_deref(), Some("build"));
        assert_eq!(cli.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_unknown_inline_value_and_short_flags() {
        let cli = parse(&["dox", "--timeout=30", "-x", "-v", "--host=dev", "stray"]);
        assert!(cli.verbose);
        assert_eq!(cli.host, Some(HostProfile::Dev));
    }

    #[test]
    fn test_known_args_keeps_values_that_look_like_paths() {
        let args = known_args(["dox", "--input", "docs", "--output", "out"].map(String::from));
        assert_eq!(args, vec!["dox", "--input", "docs", "--output", "out"]);
    }
}
