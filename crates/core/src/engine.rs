//! Sync engine - orchestrates the five operations
//!
//! Each operation enumerates a source set (local files or remote objects),
//! applies the extension filter and transfer policy per item, and drives the
//! resulting jobs through the bounded [`WorkScheduler`]. Per-item errors are
//! soft: they are logged, counted as failures, and never abort sibling
//! items. Transfers are not transactional; re-running the operation is the
//! recovery mechanism.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::item::{ContainerInfo, LocalItem, RemoteItem, RunSummary, TransferOutcome};
use crate::localfs;
use crate::mime;
use crate::options::SyncOptions;
use crate::policy::TransferPolicy;
use crate::scheduler::WorkScheduler;
use crate::traits::ObjectStore;

/// Called once per completed item, whatever its outcome
pub type ProgressHook = Arc<dyn Fn() + Send + Sync>;

/// Drives backup, restore, clean, list and delete against one container
///
/// The container reference is resolved once per run and shared by every
/// worker; the store handle is stateless per call and safely shared.
pub struct SyncEngine<S> {
    store: Arc<S>,
    options: SyncOptions,
    policy: TransferPolicy,
    scheduler: WorkScheduler,
    progress: Option<ProgressHook>,
}

impl<S: ObjectStore + 'static> SyncEngine<S> {
    pub fn new(store: Arc<S>, options: SyncOptions) -> Self {
        let scheduler = WorkScheduler::new(options.workers);
        let policy = TransferPolicy::with_retries(options.max_retries);
        Self {
            store,
            options,
            policy,
            scheduler,
            progress: None,
        }
    }

    /// Replace the default retry budget with an explicit policy
    pub fn with_policy(mut self, policy: TransferPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Upload local files that are new or newer than their remote copy
    pub async fn backup(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let items = localfs::scan_tree(&self.options.source_root, &self.options.filter)?;
        let candidates = items.len() as u64;
        tracing::info!(
            candidates,
            container = %self.options.container,
            "backup started"
        );

        self.store.ensure_container(&self.options.container).await?;

        let jobs = items.into_iter().map(|item| {
            let store = Arc::clone(&self.store);
            let container = self.options.container.clone();
            let policy = self.policy;
            let overwrite = self.options.overwrite;
            let progress = self.progress.clone();
            async move {
                let path = item.relative.clone();
                let outcome = match Self::backup_one(store, &container, item, policy, overwrite)
                    .await
                {
                    Ok(true) => TransferOutcome::Transferred,
                    Ok(false) => TransferOutcome::Skipped,
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "failed to back up file");
                        TransferOutcome::Failed(e)
                    }
                };
                if let Some(progress) = progress {
                    progress();
                }
                outcome
            }
        });

        let report = self.scheduler.run(jobs).await;
        let summary = RunSummary {
            transferred: report.completed,
            candidates,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            uploaded = summary.transferred,
            candidates,
            failed = report.failed,
            "backup completed"
        );
        Ok(summary)
    }

    async fn backup_one(
        store: Arc<S>,
        container: &str,
        item: LocalItem,
        policy: TransferPolicy,
        overwrite: bool,
    ) -> Result<bool> {
        tracing::debug!(
            path = %item.relative,
            kb = item.size_bytes / 1024,
            "considering upload"
        );

        let remote = if overwrite {
            None
        } else {
            // A probe failure other than absence fails this item; it is never
            // taken to mean the object does not exist.
            match store.head_object(container, &item.relative).await {
                Ok(info) => Some(info),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            }
        };

        if !policy.needs_upload(&item, remote.as_ref(), overwrite) {
            tracing::debug!(path = %item.relative, "unchanged, not uploaded");
            return Ok(false);
        }

        let content_type = mime::content_type_for(&item.relative);
        let body = Bytes::from(tokio::fs::read(&item.absolute).await?);

        let started = Instant::now();
        policy
            .execute(item.size_bytes, || {
                store.put_object(container, &item.relative, body.clone(), Some(content_type))
            })
            .await?;

        let secs = started.elapsed().as_secs_f64().max(f64::EPSILON);
        tracing::debug!(
            path = %item.relative,
            kbps = (item.size_bytes as f64 / 1024.0 / secs) as u64,
            "uploaded"
        );
        Ok(true)
    }

    /// Download every remote object to the source root, always overwriting
    ///
    /// Restore has no change-detection gate beyond the extension filter;
    /// local absence is the common case and conflict resolution is out of
    /// scope.
    pub async fn restore(&self) -> Result<RunSummary> {
        let started = Instant::now();
        self.store.ensure_container(&self.options.container).await?;
        let objects = self.filtered_objects().await?;
        let candidates = objects.len() as u64;
        tracing::info!(
            candidates,
            container = %self.options.container,
            "restore started"
        );

        let jobs = objects.into_iter().map(|object| {
            let store = Arc::clone(&self.store);
            let container = self.options.container.clone();
            let root = self.options.source_root.clone();
            let policy = self.policy;
            let progress = self.progress.clone();
            async move {
                let key = object.key.clone();
                let outcome =
                    match Self::restore_one(store, &container, object, root, policy).await {
                        Ok(()) => TransferOutcome::Transferred,
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "failed to restore object");
                            TransferOutcome::Failed(e)
                        }
                    };
                if let Some(progress) = progress {
                    progress();
                }
                outcome
            }
        });

        let report = self.scheduler.run(jobs).await;
        let summary = RunSummary {
            transferred: report.completed,
            candidates,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            downloaded = summary.transferred,
            candidates,
            failed = report.failed,
            "restore completed"
        );
        Ok(summary)
    }

    async fn restore_one(
        store: Arc<S>,
        container: &str,
        object: RemoteItem,
        root: PathBuf,
        policy: TransferPolicy,
    ) -> Result<()> {
        tracing::debug!(
            key = %object.key,
            kb = object.size_bytes / 1024,
            "restoring object"
        );

        let target = root.join(&object.key);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let started = Instant::now();
        let body = policy
            .execute(object.size_bytes, || {
                store.get_object(container, &object.key)
            })
            .await?;
        tokio::fs::write(&target, &body).await?;

        let secs = started.elapsed().as_secs_f64().max(f64::EPSILON);
        tracing::debug!(
            key = %object.key,
            kbps = (object.size_bytes as f64 / 1024.0 / secs) as u64,
            "downloaded"
        );
        Ok(())
    }

    /// Delete remote objects that no longer exist under the source root
    ///
    /// One-directional reconciliation: remote state is pruned to match local
    /// state. Local-only files are backup's job, never uploaded here.
    pub async fn clean(&self) -> Result<RunSummary> {
        let started = Instant::now();
        if !self.options.source_root.is_dir() {
            // A missing source root would schedule every object for deletion.
            return Err(Error::Config(format!(
                "source path '{}' is not a directory",
                self.options.source_root.display()
            )));
        }

        self.store.ensure_container(&self.options.container).await?;
        let doomed: Vec<RemoteItem> = self
            .filtered_objects()
            .await?
            .into_iter()
            .filter(|object| !self.options.source_root.join(&object.key).is_file())
            .collect();
        let candidates = doomed.len() as u64;
        tracing::info!(
            candidates,
            container = %self.options.container,
            "clean started"
        );

        let jobs = doomed.into_iter().map(|object| {
            let store = Arc::clone(&self.store);
            let container = self.options.container.clone();
            let policy = self.policy;
            let progress = self.progress.clone();
            async move {
                let outcome = match policy
                    .execute(object.size_bytes, || {
                        store.delete_object(&container, &object.key)
                    })
                    .await
                {
                    Ok(()) => {
                        tracing::debug!(
                            key = %object.key,
                            kb = object.size_bytes / 1024,
                            "deleted from backup"
                        );
                        TransferOutcome::Transferred
                    }
                    Err(e) => {
                        tracing::warn!(key = %object.key, error = %e, "failed to delete object");
                        TransferOutcome::Failed(e)
                    }
                };
                if let Some(progress) = progress {
                    progress();
                }
                outcome
            }
        });

        let report = self.scheduler.run(jobs).await;
        let summary = RunSummary {
            transferred: report.completed,
            candidates,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            deleted = summary.transferred,
            candidates,
            failed = report.failed,
            "clean completed"
        );
        Ok(summary)
    }

    /// Filtered flat listing of the container's objects
    pub async fn list_objects(&self) -> Result<Vec<RemoteItem>> {
        self.store.ensure_container(&self.options.container).await?;
        self.filtered_objects().await
    }

    /// All containers on the account
    pub async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        self.store.list_containers().await
    }

    /// Irreversibly remove the container and all its objects
    ///
    /// Confirmation is the caller's responsibility; the engine assumes the
    /// decision has already been made.
    pub async fn delete_container(&self) -> Result<()> {
        self.store.delete_container(&self.options.container).await?;
        tracing::info!(container = %self.options.container, "container deleted");
        Ok(())
    }

    async fn filtered_objects(&self) -> Result<Vec<RemoteItem>> {
        let objects = self.store.list_objects(&self.options.container).await?;
        Ok(objects
            .into_iter()
            .filter(|object| self.options.filter.matches(&object.key))
            .collect())
    }
}
