//! backup command - upload changed local files to the container

use std::sync::Arc;

use blobsync_core::{SyncEngine, SyncOptions};
use blobsync_s3::S3Client;

use crate::commands::{exit_for, progress_spinner};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Execute the backup command
pub async fn execute(store: S3Client, options: SyncOptions, formatter: &Formatter) -> ExitCode {
    let progress = progress_spinner(formatter, "Backing up");

    let mut engine = SyncEngine::new(Arc::new(store), options);
    if let Some(pb) = &progress {
        let pb = pb.clone();
        engine = engine.with_progress(Arc::new(move || pb.inc(1)));
    }

    match engine.backup().await {
        Ok(summary) => {
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            formatter.success(&format!(
                "Backup complete: {} of {} file(s) uploaded in {:.1}s",
                summary.transferred,
                summary.candidates,
                summary.elapsed.as_secs_f64()
            ));
            ExitCode::Success
        }
        Err(e) => {
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            formatter.error(&format!("Backup failed: {e}"));
            exit_for(&e)
        }
    }
}
