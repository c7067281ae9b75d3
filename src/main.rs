// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (RUST_LOG wins over --verbose/--quiet)
// 3. Run the generate pipeline, then deploy, as requested
// 4. Exit with proper code (0 = success, 2 = error)
//
// Broken links never change the exit code. They are reported by the
// validate-links step and left for a person to judge.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker;  // src/checker/ - link extraction, rewriting and validation
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - run configuration and dox.toml
mod deploy;   // src/deploy.rs - publishing to the site repository
mod error;    // src/error.rs - typed failures
mod pipeline; // src/pipeline/ - the step registry and scheduler
mod platform; // src/platform.rs - filesystem helpers
mod steps;    // src/steps/ - the built-in steps
mod tools;    // src/tools/ - docfx and git

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use checker::HttpProbe;
use cli::Cli;
use config::Config;
use pipeline::StepRegistry;
use tools::{DocFx, Git};

fn main() {
    if let Err(e) = run() {
        // {:#} prints the whole context chain on one line
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_from(cli::known_args(std::env::args()));
    init_logging(&cli);

    println!("📚 dox v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_cli(&cli)?;
    let registry = StepRegistry::from_factories(steps::BUILTIN_STEPS);
    debug!("Registered {} steps.", registry.len());

    let mut hosting = false;
    if cli.should_generate() {
        let probe = HttpProbe::new()?;
        let docs = DocFx::new(&config.docfx.executable)?;
        let report = pipeline::generate(&config, &registry, steps::DEFAULT_STEPS, &docs, &probe)?;
        info!("Completed {} step(s).", report.executed.len());
        hosting = report.hosting;
    }

    if cli.deploy {
        if hosting {
            info!("Skipping deployment as documentation is being served.");
        } else {
            let git = Git::new()?;
            deploy::run(&config, &git)?;
        }
    }

    Ok(())
}

// Logs go to stderr so --json output on stdout stays parseable
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
