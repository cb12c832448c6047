// UI layer: asks for the caption and the token with `dialoguer`, then runs
// one backup behind an `indicatif` spinner.

use crate::record::BackupRequest;
use crate::workflow::{BackupWorkflow, Progress};
use anyhow::Result;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Prompt for input, run a single backup and print the outcome. Failures
/// of the backup itself are reported on screen, not returned.
pub fn run_interactive(workflow: &BackupWorkflow) -> Result<()> {
    println!("Cat picture backup to Yandex.Disk");
    println!("{}", "=".repeat(50));

    let text: String = Input::new()
        .with_prompt("Text for the picture")
        .allow_empty(true)
        .interact_text()?;
    // `Password` hides the token while it is typed.
    let token: String = Password::new()
        .with_prompt("Yandex.Disk token")
        .allow_empty_password(true)
        .interact()?;

    let (text, token) = (text.trim(), token.trim());
    if text.is_empty() || token.is_empty() {
        println!("Text and token must not be empty!");
        return Ok(());
    }

    let request = match BackupRequest::new(text, token) {
        Ok(req) => req,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = workflow.try_run(&request, |step| report(&spinner, step));
    // clear the spinner row before anything else reaches the terminal
    spinner.finish_and_clear();

    match result {
        Ok(record) => {
            println!();
            println!("Backup finished successfully!");
            println!("File size: {} MB", record.file_size_mb);
            println!("Upload date: {}", record.upload_timestamp);
        }
        Err(e) => {
            workflow.log_failure(&request, &e);
            println!();
            println!("Backup could not be completed");
        }
    }
    Ok(())
}

/// Steps in progress drive the spinner message; finished steps are
/// printed above it so they stay on screen.
fn report(spinner: &ProgressBar, step: Progress) {
    match step {
        Progress::FetchingImage { .. }
        | Progress::EnsuringFolder { .. }
        | Progress::RequestingUploadUrl { .. }
        | Progress::Uploading { .. }
        | Progress::SavingRecord { .. } => spinner.set_message(step.to_string()),
        Progress::ImageFetched { .. }
        | Progress::FolderReady { .. }
        | Progress::Uploaded { .. }
        | Progress::RecordSaved { .. } => spinner.println(step.to_string()),
    }
}
