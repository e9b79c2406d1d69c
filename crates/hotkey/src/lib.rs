//! Global hotkeys for Snapcrop
//!
//! A dedicated thread owns the OS hotkey registrations and forwards
//! triggered actions to the UI thread through a bounded queue.

pub mod binding;
pub mod listener;
pub mod marshal;
#[cfg(windows)]
pub mod win32;

pub use binding::{BindingPlan, HotkeyBinding, KeyCombo};
pub use listener::{BackendEvent, HotkeyBackend, HotkeyListener, ListenerHandle, QuitSignal};
pub use marshal::{action_channel, ActionReceiver, ActionSender};
#[cfg(windows)]
pub use win32::Win32Backend;

use thiserror::Error;

/// What a hotkey asks the UI thread to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Show,
    Hide,
    Capture,
}

#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("Invalid hotkey '{0}'")]
    InvalidCombo(String),

    #[error("Could not register {combo}: {reason}")]
    Registration { combo: String, reason: String },

    #[error("Hotkey backend error: {0}")]
    Backend(String),

    #[error("Failed to start listener thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Listener thread exited before it was ready")]
    NotStarted,

    #[error("Listener thread panicked")]
    Panicked,
}

pub type HotkeyResult<T> = Result<T, HotkeyError>;
