use crate::config::{Config, SnapshotBackend};
use crate::error::SnapshotError;
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type SnapshotFuture<'a> = Pin<Box<dyn Future<Output = Result<String, SnapshotError>> + Send + 'a>>;

/// External version-control primitive: take a checkpoint, or revert to one.
pub trait SnapshotProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Checkpoint the current state and return its id.
    fn snapshot<'a>(&'a self, label: &'a str) -> SnapshotFuture<'a>;

    /// Restore `snapshot_id` and return the id of the post-revert state.
    fn revert<'a>(&'a self, snapshot_id: &'a str) -> SnapshotFuture<'a>;
}

/// Provider selected by `[snapshot] backend`.
pub fn from_config(config: &Config) -> Arc<dyn SnapshotProvider> {
    match config.snapshot.backend {
        SnapshotBackend::Git => Arc::new(GitSnapshotter::new(config.snapshot_repo_dir())),
        SnapshotBackend::Disabled => Arc::new(DisabledSnapshotter),
    }
}

const COMMITTER_NAME: &str = "trustward";
const COMMITTER_EMAIL: &str = "trustward@localhost";

/// Snapshots a working tree as git commits.
///
/// Every snapshot is a commit (empty when nothing changed). Revert never
/// discards work: the current tree is committed first, then the snapshot's
/// tree is restored on top of it as a new commit.
#[derive(Debug, Clone)]
pub struct GitSnapshotter {
    repo_dir: PathBuf,
}

impl GitSnapshotter {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    async fn git(&self, args: &[&str]) -> Result<String, SnapshotError> {
        let op = format!("git {}", args.first().copied().unwrap_or_default());
        let output = tokio::process::Command::new("git")
            .arg("-c")
            .arg(format!("user.name={COMMITTER_NAME}"))
            .arg("-c")
            .arg(format!("user.email={COMMITTER_EMAIL}"))
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(&self.repo_dir)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env_remove("GIT_INDEX_FILE")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SnapshotError::Unavailable("git executable not found".into())
                } else {
                    SnapshotError::Io(e)
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SnapshotError::Command {
                op,
                message: stderr.trim().to_string(),
            })
        }
    }

    async fn ensure_repo(&self) -> Result<(), SnapshotError> {
        if !self.repo_dir.is_dir() {
            return Err(SnapshotError::Unavailable(format!(
                "repository directory {} does not exist",
                self.repo_dir.display()
            )));
        }
        if !self.owns_repo().await? {
            tracing::info!(repo = %self.repo_dir.display(), "initializing snapshot repository");
            self.git(&["init", "-q"]).await?;
        }
        Ok(())
    }

    /// Whether `repo_dir` is itself a work-tree root. A directory nested
    /// inside some enclosing repository does not count; snapshotting there
    /// would commit and reset files outside `repo_dir`.
    async fn owns_repo(&self) -> Result<bool, SnapshotError> {
        let Ok(toplevel) = self.git(&["rev-parse", "--show-toplevel"]).await else {
            return Ok(false);
        };
        let repo_dir = tokio::fs::canonicalize(&self.repo_dir).await?;
        Ok(tokio::fs::canonicalize(&toplevel)
            .await
            .is_ok_and(|toplevel| toplevel == repo_dir))
    }

    async fn commit_all(&self, message: &str) -> Result<String, SnapshotError> {
        self.git(&["add", "-A"]).await?;
        self.git(&["commit", "-q", "--allow-empty", "--no-verify", "-m", message])
            .await?;
        self.git(&["rev-parse", "HEAD"]).await
    }

    async fn take(&self, label: &str) -> Result<String, SnapshotError> {
        self.ensure_repo().await?;
        self.commit_all(&format!("trustward snapshot: {label}")).await
    }

    async fn restore(&self, snapshot_id: &str) -> Result<String, SnapshotError> {
        if snapshot_id.starts_with('-') || snapshot_id.trim().is_empty() {
            return Err(SnapshotError::Command {
                op: "git revert".into(),
                message: format!("invalid snapshot id {snapshot_id:?}"),
            });
        }
        self.ensure_repo().await?;
        let commit = format!("{snapshot_id}^{{commit}}");
        self.git(&["rev-parse", "--verify", "-q", &commit]).await?;

        self.commit_all(&format!("trustward pre-revert of {snapshot_id}"))
            .await?;
        self.git(&["read-tree", "-u", "--reset", snapshot_id]).await?;
        self.commit_all(&format!("trustward revert to {snapshot_id}"))
            .await
    }
}

impl SnapshotProvider for GitSnapshotter {
    fn name(&self) -> &str {
        "git"
    }

    fn snapshot<'a>(&'a self, label: &'a str) -> SnapshotFuture<'a> {
        Box::pin(self.take(label))
    }

    fn revert<'a>(&'a self, snapshot_id: &'a str) -> SnapshotFuture<'a> {
        Box::pin(self.restore(snapshot_id))
    }
}

/// Always fails; mutating tools then run without rollback safety.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSnapshotter;

impl SnapshotProvider for DisabledSnapshotter {
    fn name(&self) -> &str {
        "disabled"
    }

    fn snapshot<'a>(&'a self, _label: &'a str) -> SnapshotFuture<'a> {
        Box::pin(async { Err(SnapshotError::Unavailable("snapshots are disabled".into())) })
    }

    fn revert<'a>(&'a self, _snapshot_id: &'a str) -> SnapshotFuture<'a> {
        Box::pin(async { Err(SnapshotError::Unavailable("snapshots are disabled".into())) })
    }
}

/// Process-local provider that only tracks ids. For embedding hosts that
/// manage state themselves, and for tests.
#[derive(Debug, Default)]
pub struct InMemorySnapshotter {
    next: AtomicU64,
    known: Mutex<HashSet<String>>,
    reverts: Mutex<Vec<String>>,
    fail_snapshots: AtomicBool,
    fail_reverts: AtomicBool,
}

impl InMemorySnapshotter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reverts(&self, fail: bool) {
        self.fail_reverts.store(fail, Ordering::SeqCst);
    }

    /// Snapshot ids reverted so far, in order.
    pub fn reverts(&self) -> Vec<String> {
        self.reverts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn mint(&self) -> String {
        let id = format!("mem-{:06}", self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.known
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id.clone());
        id
    }
}

impl SnapshotProvider for InMemorySnapshotter {
    fn name(&self) -> &str {
        "memory"
    }

    fn snapshot<'a>(&'a self, _label: &'a str) -> SnapshotFuture<'a> {
        Box::pin(async move {
            if self.fail_snapshots.load(Ordering::SeqCst) {
                return Err(SnapshotError::Command {
                    op: "snapshot".into(),
                    message: "injected failure".into(),
                });
            }
            Ok(self.mint())
        })
    }

    fn revert<'a>(&'a self, snapshot_id: &'a str) -> SnapshotFuture<'a> {
        Box::pin(async move {
            if self.fail_reverts.load(Ordering::SeqCst) {
                return Err(SnapshotError::Command {
                    op: "revert".into(),
                    message: "injected failure".into(),
                });
            }
            let known = self
                .known
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .contains(snapshot_id);
            if !known {
                return Err(SnapshotError::Command {
                    op: "revert".into(),
                    message: format!("unknown snapshot {snapshot_id}"),
                });
            }
            self.reverts
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(snapshot_id.to_string());
            Ok(self.mint())
        })
    }
}
