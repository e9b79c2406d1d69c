//! Hotkey listener thread

use crate::binding::{BindingPlan, HotkeyBinding, KeyCombo, FIRST_CAPTURE_ID, HIDE_ID, SHOW_ID};
use crate::marshal::ActionSender;
use crate::{Action, HotkeyError, HotkeyResult};
use crossbeam_channel::bounded;
use log::{debug, info, warn};
use std::thread::{self, JoinHandle};

/// What the backend's blocking wait produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    /// A registered hotkey fired
    Hotkey(i32),
    /// The loop was asked to stop
    Quit,
    /// Anything else; the loop keeps waiting
    Idle,
}

/// Thread-safe way to stop a backend's wait loop
pub trait QuitSignal: Send {
    fn quit(&self);
}

/// OS hotkey registration plus its message wait.
///
/// A backend is created and used on the listener thread only, since OS
/// hotkey registrations belong to the thread that made them.
pub trait HotkeyBackend {
    fn quit_signal(&self) -> Box<dyn QuitSignal>;

    fn register(&mut self, id: i32, combo: KeyCombo) -> HotkeyResult<()>;

    fn unregister(&mut self, id: i32) -> HotkeyResult<()>;

    /// Block until the next event
    fn wait_event(&mut self) -> BackendEvent;
}

/// Attempt every binding in `plan`, keeping the ones that succeed.
///
/// Capture ids are handed out consecutively from `FIRST_CAPTURE_ID` and
/// only advance on success.
pub fn register_bindings<B: HotkeyBackend + ?Sized>(
    backend: &mut B,
    plan: &BindingPlan,
) -> Vec<HotkeyBinding> {
    let mut bindings = Vec::new();
    let mut attempt = |backend: &mut B, combo: KeyCombo, id: i32, action: Action| {
        match backend.register(id, combo) {
            Ok(()) => {
                info!("Registered {:?} hotkey {} (id {})", action, combo, id);
                bindings.push(HotkeyBinding { combo, id, action });
                true
            }
            Err(e) => {
                warn!("Skipping {:?} hotkey {}: {}", action, combo, e);
                false
            }
        }
    };

    attempt(backend, plan.show, SHOW_ID, Action::Show);
    attempt(backend, plan.hide, HIDE_ID, Action::Hide);

    let mut next_id = FIRST_CAPTURE_ID;
    for &combo in &plan.capture {
        if attempt(backend, combo, next_id, Action::Capture) {
            next_id += 1;
        }
    }

    if next_id == FIRST_CAPTURE_ID {
        warn!("No capture hotkey could be registered; only show/hide are active");
    }

    bindings
}

fn run<B: HotkeyBackend>(backend: &mut B, bindings: &[HotkeyBinding], sender: &ActionSender) {
    loop {
        match backend.wait_event() {
            BackendEvent::Hotkey(id) => match bindings.iter().find(|b| b.id == id) {
                Some(binding) => {
                    debug!("Hotkey {} fired", binding.combo);
                    sender.post(binding.action);
                }
                None => debug!("Ignoring unknown hotkey id {}", id),
            },
            BackendEvent::Quit => break,
            BackendEvent::Idle => {}
        }
    }

    for binding in bindings {
        if let Err(e) = backend.unregister(binding.id) {
            debug!("Unregister of {} failed: {}", binding.combo, e);
        }
    }
    info!("Hotkey listener stopped");
}

pub struct HotkeyListener;

impl HotkeyListener {
    /// Start the listener thread.
    ///
    /// `make_backend` runs on the new thread. Returns once registration
    /// has been attempted, with the bindings that succeeded.
    pub fn spawn<B, F>(
        make_backend: F,
        plan: BindingPlan,
        sender: ActionSender,
    ) -> HotkeyResult<ListenerHandle>
    where
        B: HotkeyBackend,
        F: FnOnce() -> HotkeyResult<B> + Send + 'static,
    {
        let (ready_tx, ready_rx) = bounded(1);

        let thread = thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut backend = match make_backend() {
                    Ok(backend) => backend,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let bindings = register_bindings(&mut backend, &plan);
                let _ = ready_tx.send(Ok((backend.quit_signal(), bindings.clone())));
                run(&mut backend, &bindings, &sender);
            })?;

        match ready_rx.recv() {
            Ok(Ok((quit, bindings))) => Ok(ListenerHandle {
                quit,
                thread: Some(thread),
                bindings,
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(HotkeyError::NotStarted)
            }
        }
    }
}

/// Owner of a running listener thread; stops it on drop
pub struct ListenerHandle {
    quit: Box<dyn QuitSignal>,
    thread: Option<JoinHandle<()>>,
    bindings: Vec<HotkeyBinding>,
}

impl ListenerHandle {
    /// Bindings the listener registered
    pub fn bindings(&self) -> &[HotkeyBinding] {
        &self.bindings
    }

    /// Combos bound to `action`, in registration order
    pub fn combos_for(&self, action: Action) -> Vec<KeyCombo> {
        self.bindings
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.combo)
            .collect()
    }

    /// Signal quit and wait for the thread to unregister and exit
    pub fn shutdown(mut self) -> HotkeyResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> HotkeyResult<()> {
        match self.thread.take() {
            Some(thread) => {
                self.quit.quit();
                thread.join().map_err(|_| HotkeyError::Panicked)
            }
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("{}", e);
        }
    }
}
