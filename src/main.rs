// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, build the workflow and hand it to
//   the interactive prompt.

use catbackup_cli::{config::BackupConfig, ui::run_interactive, workflow::BackupWorkflow};

fn main() -> anyhow::Result<()> {
    // Warnings and errors only by default so log lines don't fight with
    // the spinner; RUST_LOG=debug shows every request.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let config = BackupConfig::from_env()?;
    let workflow = BackupWorkflow::new(config)?;

    run_interactive(&workflow)?;
    Ok(())
}
