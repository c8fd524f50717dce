// src/exec/task.rs

//! One cancellable, awaitable task abstraction for every subprocess.
//!
//! Awaited commands are a `TaskHandle` that is joined straight away; the
//! network process keeps its handle so it can be terminated later.

use std::future::Future;

use anyhow::anyhow;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{DeployError, Result};

/// A spawned Tokio task plus the sender half of its cancel channel.
///
/// - `cancel` asks the task to stop (the task decides how, e.g. by killing
///   its child process).
/// - Dropping the handle drops the sender, which the task observes as a
///   closed channel.
#[derive(Debug)]
pub struct TaskHandle<T> {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn `body`, handing it the receiving end of the cancel channel.
    pub fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(body(cancel_rx));
        Self {
            cancel: Some(cancel_tx),
            handle,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Request cancellation. Returns false if the request could not be
    /// delivered (already requested, or the task already finished).
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Wait for the task to finish.
    pub async fn join(self) -> Result<T> {
        self.handle
            .await
            .map_err(|e| DeployError::Other(anyhow!("task join failed: {e}")))
    }

    /// Cancel, then wait for the task to finish.
    pub async fn terminate(mut self) -> Result<T> {
        if !self.cancel() {
            debug!("cancel not delivered; task already finished or cancelled");
        }
        self.join().await
    }
}
