//! Hand-off of actions from the listener thread to the UI thread

use crate::Action;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;
use std::sync::Arc;

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Create a bounded action queue
pub fn action_channel(capacity: usize) -> (ActionSender, ActionReceiver) {
    let (tx, rx) = bounded(capacity);
    (ActionSender { tx, waker: None }, ActionReceiver { rx })
}

/// Producer side, held by the listener thread
#[derive(Clone)]
pub struct ActionSender {
    tx: Sender<Action>,
    waker: Option<Waker>,
}

impl ActionSender {
    /// Call `waker` after every queued action so the consumer runs promptly
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Queue an action without blocking. Full or closed queues drop it.
    pub fn post(&self, action: Action) -> bool {
        match self.tx.try_send(action) {
            Ok(()) => {
                if let Some(wake) = &self.waker {
                    wake();
                }
                true
            }
            Err(TrySendError::Full(action)) => {
                warn!("Action queue full, dropping {:?}", action);
                false
            }
            Err(TrySendError::Disconnected(action)) => {
                warn!("Action queue closed, dropping {:?}", action);
                false
            }
        }
    }
}

/// Consumer side, drained on the UI thread
pub struct ActionReceiver {
    rx: Receiver<Action>,
}

impl ActionReceiver {
    /// Take every action queued so far, oldest first
    pub fn drain(&self) -> Vec<Action> {
        self.rx.try_iter().collect()
    }
}
