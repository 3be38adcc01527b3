//! delete command - irreversibly remove a container after confirmation

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use blobsync_core::{SyncEngine, SyncOptions};
use blobsync_s3::S3Client;

use crate::commands::exit_for;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Only an exact case-insensitive "yes" authorizes the deletion
pub fn confirmed(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// Execute the delete command
pub async fn execute(store: S3Client, container: String, formatter: &Formatter) -> ExitCode {
    formatter.warning(&format!(
        "This will delete the entire container '{container}' and every object in it."
    ));
    print!("Do you want to continue? [yes|no]: ");
    let _ = std::io::stdout().flush();

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        formatter.error("Failed to read confirmation");
        return ExitCode::GeneralError;
    }

    if !confirmed(&input) {
        formatter.println("Cancelled.");
        return ExitCode::Success;
    }

    let engine = SyncEngine::new(Arc::new(store), SyncOptions::new(PathBuf::new(), container));
    match engine.delete_container().await {
        Ok(()) => {
            formatter.success("Container deleted.");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Delete failed: {e}"));
            exit_for(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_accepts_only_yes() {
        assert!(confirmed("yes"));
        assert!(confirmed("YES"));
        assert!(confirmed("  Yes \n"));

        assert!(!confirmed("y"));
        assert!(!confirmed("no"));
        assert!(!confirmed("yess"));
        assert!(!confirmed(""));
        assert!(!confirmed("yes please"));
    }
}
