//! list command - enumerate containers or a container's objects

use std::path::PathBuf;
use std::sync::Arc;

use blobsync_core::{ExtensionFilter, SyncEngine, SyncOptions};
use blobsync_s3::S3Client;
use comfy_table::Table;
use comfy_table::presets::NOTHING;

use crate::commands::exit_for;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Execute the list command
///
/// With no destination (or `/`) the account's containers are listed;
/// otherwise the named container's objects, filtered by extension policy.
pub async fn execute(
    store: S3Client,
    destination: Option<String>,
    filter: ExtensionFilter,
    formatter: &Formatter,
) -> ExitCode {
    match destination.as_deref() {
        None | Some("/") | Some("") => list_containers(store, formatter).await,
        Some(container) => list_objects(store, container.to_string(), filter, formatter).await,
    }
}

async fn list_containers(store: S3Client, formatter: &Formatter) -> ExitCode {
    let engine = SyncEngine::new(Arc::new(store), SyncOptions::new(PathBuf::new(), ""));

    let containers = match engine.list_containers().await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to list containers: {e}"));
            return exit_for(&e);
        }
    };

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(["CONTAINER", "LAST MODIFIED"]);
    for container in &containers {
        let modified = container
            .last_modified
            .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row([formatter.style_name(&container.name), modified]);
    }

    formatter.println(&table.to_string());
    formatter.println(&format!("Total: {} container(s)", containers.len()));
    ExitCode::Success
}

async fn list_objects(
    store: S3Client,
    container: String,
    filter: ExtensionFilter,
    formatter: &Formatter,
) -> ExitCode {
    let options = SyncOptions::new(PathBuf::new(), container).with_filter(filter);
    let engine = SyncEngine::new(Arc::new(store), options);

    let objects = match engine.list_objects().await {
        Ok(o) => o,
        Err(e) => {
            formatter.error(&format!("Failed to list objects: {e}"));
            return exit_for(&e);
        }
    };

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(["OBJECT", "SIZE"]);
    for object in &objects {
        table.add_row([
            object.key.clone(),
            humansize::format_size(object.size_bytes, humansize::BINARY),
        ]);
    }

    formatter.println(&table.to_string());
    formatter.println(&format!("Total: {} object(s)", objects.len()));
    ExitCode::Success
}
