//! Preview command implementation.

use super::SessionArgs;
use crate::session::BackupSession;
use anyhow::Result;
use clap::Args;
use serde::Serialize;

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Print the preview as JSON
    #[arg(long)]
    pub json: bool,
}

/// What a run would do right now
#[derive(Debug, Serialize)]
pub struct Preview {
    pub destination: String,
    pub size_limit: u64,
    pub total_size: u64,
    pub to_copy: Vec<String>,
    pub omitted: Vec<String>,
    pub ignored: Vec<String>,
}

impl Preview {
    pub fn from_session(session: &BackupSession) -> Self {
        Self {
            destination: session.destination().to_string(),
            size_limit: session.size_limit_bytes(),
            total_size: session.size(),
            to_copy: session.files_to_copy(),
            omitted: session.files_omitted(),
            ignored: session.files_ignored(),
        }
    }
}

/// Run the preview command
pub fn run(args: PreviewArgs) -> Result<()> {
    let session = args.session.build_session()?;
    let preview = Preview::from_session(&session);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!("Destination: {}", preview.destination);
    print_list("Files to copy", &preview.to_copy);
    print_list("Omitted", &preview.omitted);
    print_list("Ignored", &preview.ignored);
    println!(
        "Total size: {} bytes (limit {} bytes)",
        preview.total_size, preview.size_limit
    );
    if preview.total_size > preview.size_limit {
        println!("  A run would be refused: the size limit is exceeded.");
    }

    Ok(())
}

fn print_list(title: &str, paths: &[String]) {
    println!("{} ({}):", title, paths.len());
    for path in paths {
        println!("  - {}", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_preview_from_session() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a.txt"), b"0123456789")?;
        fs::write(temp_dir.path().join(".DS_Store"), b"x")?;
        fs::create_dir_all(temp_dir.path().join("notes"))?;
        fs::write(temp_dir.path().join("notes/todo.md"), b"abc")?;

        let mut session = BackupSession::new(temp_dir.path())?;
        session.copy(["/"]).omit(["notes"]);
        let preview = Preview::from_session(&session);

        assert_eq!(preview.to_copy, vec!["a.txt"]);
        assert_eq!(preview.omitted, vec!["notes/todo.md"]);
        assert_eq!(preview.ignored, vec![".DS_Store"]);
        assert_eq!(preview.total_size, 10);
        assert_eq!(preview.destination, "simplebackup");
        Ok(())
    }
}
