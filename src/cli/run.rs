//! Run command implementation.

use super::SessionArgs;
use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Run directory name (defaults to the current date and time)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the backup command. Fails unless every file was copied.
pub fn run(args: RunArgs) -> Result<()> {
    let session = args.session.build_session()?;

    let complete = match (&args.name, args.json) {
        (Some(name), false) => session.backup_now_named(name),
        (None, false) => session.backup_now(),
        (name, true) => {
            let name = match name {
                Some(name) => name.clone(),
                None => crate::timestamp::current_date_and_time(session.current_date_pattern())?,
            };
            let report = session.run_backup(&name);
            println!("{}", serde_json::to_string_pretty(&report)?);
            report.is_complete()
        }
    };

    if !complete {
        bail!("Backup incomplete");
    }

    info!("Backup completed successfully");
    Ok(())
}
