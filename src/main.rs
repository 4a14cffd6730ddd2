use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use zipmirror::config::{self, Cli};
use zipmirror::MirrorError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", console::style("error:").red().bold(), err);
            let code = err
                .downcast_ref::<MirrorError>()
                .map(MirrorError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let settings = config::load_settings(cli)?;
    tracing::info!(target_dir = %settings.target_dir.display(), dry_run = settings.dry_run, "starting run");

    let summary = zipmirror::commands::sync::run(&settings)?;
    if summary.has_warnings() {
        tracing::warn!(errors = summary.errors(), "completed with warnings");
    }
    Ok(())
}

/// Diagnostics go to stderr so stdout stays clean for events and `--json`.
/// `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
