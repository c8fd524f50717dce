// src/engine/session.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::notify::{Notification, NotificationSink};

/// The explicit session every component reports through.
///
/// Built once by the top-level controller and cloned into each component;
/// clones share the same sink.
#[derive(Clone)]
pub struct Session {
    workspace_root: PathBuf,
    notifier: Arc<dyn NotificationSink>,
}

impl Session {
    pub fn new(workspace_root: impl AsRef<Path>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            workspace_root: workspace_root.as_ref().to_path_buf(),
            notifier,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Resolve a workspace-relative path.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.workspace_root.join(relative)
    }

    pub fn notify(&self, event: Notification) {
        self.notifier.notify(event);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("workspace_root", &self.workspace_root)
            .finish_non_exhaustive()
    }
}
