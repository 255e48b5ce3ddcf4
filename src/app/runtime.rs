// SPDX-License-Identifier: GPL-3.0-only

//! Message loop
//!
//! `update` returns a [`Task`]: zero or more futures that each resolve to a
//! follow-up [`Message`]. The [`Runtime`] spawns them on the tokio runtime and
//! feeds their messages back into `update`, one at a time. State is only ever
//! touched from the loop.

use crate::app::{AppModel, Message};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Deferred work producing follow-up messages
#[must_use]
pub struct Task {
    futures: Vec<BoxFuture<'static, Message>>,
}

impl Task {
    /// Nothing to do
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Run `future` and map its output to a message
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Message + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Self {
            futures: vec![Box::pin(future.map(map))],
        }
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

/// Drives an [`AppModel`] with spawned tasks
pub struct Runtime {
    model: AppModel,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
    /// Spawned tasks whose message has not arrived yet
    in_flight: usize,
}

impl Runtime {
    pub fn new(model: AppModel) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            model,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    /// Apply `message` and spawn the resulting tasks
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, message: Message) {
        debug!(?message, "Dispatching message");
        let task = self.model.update(message);
        for future in task.futures {
            self.in_flight += 1;
            let sender = self.sender.clone();
            tokio::spawn(async move {
                let message = match AssertUnwindSafe(future).catch_unwind().await {
                    Ok(message) => message,
                    Err(_) => {
                        error!("Background task panicked");
                        Message::Noop
                    }
                };
                // The receiver lives as long as the runtime
                let _ = sender.send(message);
            });
        }
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Wait for one task message and apply it
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn step(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.receiver.recv().await {
            Some(message) => {
                self.in_flight -= 1;
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Run until every task, including follow-ups, has finished
    pub async fn settle(&mut self) {
        while self.step().await {}
    }
}
