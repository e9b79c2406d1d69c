//! UI-thread owner of the overlay session
//!
//! Drains queued hotkey actions and runs show/hide/capture against the
//! session, a capture backend and the PNG exporter.

use crate::notify::{NoticeKind, Notifier};
use anyhow::{Context, Result};
use capture::{capture_region_or_crop, Rect, ScreenCapture};
use chrono::NaiveDateTime;
use export::PngExporter;
use hotkey::{Action, ActionReceiver, ListenerHandle};
use log::{debug, error, info, warn};
use overlay::{DesktopSnapshot, OverlayError, OverlayHandler, OverlaySession, OverlaySurface};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub struct Controller<C, N> {
    session: OverlaySession,
    capturer: C,
    notifier: N,
    exporter: PngExporter,
    hide_delay: Duration,
    actions: ActionReceiver,
    clock: Box<dyn Fn() -> NaiveDateTime>,
    listener: Option<ListenerHandle>,
}

impl<C: ScreenCapture, N: Notifier> Controller<C, N> {
    pub fn new(
        session: OverlaySession,
        capturer: C,
        notifier: N,
        exporter: PngExporter,
        hide_delay: Duration,
        actions: ActionReceiver,
    ) -> Self {
        Self {
            session,
            capturer,
            notifier,
            exporter,
            hide_delay,
            actions,
            clock: Box::new(|| chrono::Local::now().naive_local()),
            listener: None,
        }
    }

    /// Replace the timestamp source used for file names
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Take ownership of the listener so exit can stop it first
    pub fn attach_listener(&mut self, listener: ListenerHandle) {
        self.listener = Some(listener);
    }

    /// Run every queued action in order
    pub fn drain_actions(&mut self, surface: &mut dyn OverlaySurface) {
        for action in self.actions.drain() {
            if let Err(e) = self.handle(action, surface) {
                error!("{:?} failed: {:#}", action, e);
                if self.session.is_visible() {
                    self.notifier
                        .notify(NoticeKind::Error, "Snapcrop", &format!("{:#}", e));
                }
            }
        }
    }

    pub fn handle(&mut self, action: Action, surface: &mut dyn OverlaySurface) -> Result<()> {
        debug!("Handling {:?}", action);
        match action {
            Action::Show => self.show(surface),
            Action::Hide => {
                self.hide(surface);
                Ok(())
            }
            Action::Capture => self.capture(surface).map(|_| ()),
        }
    }

    fn show(&mut self, surface: &mut dyn OverlaySurface) -> Result<()> {
        // Keep the overlay itself out of the new snapshot
        let was_visible = self.session.is_visible();
        if was_visible {
            self.hide(surface);
            thread::sleep(self.hide_delay);
        }
        let frame = match self.capturer.capture_full_desktop() {
            Ok(frame) => frame,
            Err(e) => {
                // Fall back to the previous snapshot rather than vanishing
                if was_visible {
                    self.session.restore();
                    surface.show(self.session.desktop_size());
                }
                return Err(e).context("Failed to grab the desktop");
            }
        };
        self.session.present(DesktopSnapshot::new(frame));
        surface.show(self.session.desktop_size());
        Ok(())
    }

    fn hide(&mut self, surface: &mut dyn OverlaySurface) {
        self.session.conceal();
        surface.hide();
    }

    /// Capture the current selection; `None` when it is too small
    pub fn capture(&mut self, surface: &mut dyn OverlaySurface) -> Result<Option<PathBuf>> {
        let region = match self.session.capture_region() {
            Ok(region) => region,
            Err(e @ OverlayError::SelectionTooSmall { .. }) => {
                warn!("{}", e);
                if self.session.is_visible() {
                    self.notifier.notify(
                        NoticeKind::Warning,
                        "Too small",
                        "Selection is too small to capture.",
                    );
                }
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let was_visible = self.session.is_visible();
        if was_visible {
            self.hide(surface);
            thread::sleep(self.hide_delay);
        }

        let saved = self.grab_and_save(region);

        if was_visible {
            self.session.restore();
            surface.show(self.session.desktop_size());
        }

        let path = saved?;
        info!("Saved capture to {}", path.display());
        if was_visible {
            self.notifier.notify(
                NoticeKind::Info,
                "Saved",
                &format!("Saved to:\n{}", path.display()),
            );
        }
        Ok(Some(path))
    }

    fn grab_and_save(&mut self, region: Rect) -> Result<PathBuf> {
        let frame = capture_region_or_crop(&mut self.capturer, region)
            .with_context(|| format!("Failed to capture {}x{} region", region.width, region.height))?;
        let bytes = frame.encode_png().context("Failed to encode PNG")?;
        let stamp = (self.clock)();
        let path = self
            .exporter
            .save_capture(&bytes, &stamp)
            .with_context(|| format!("Failed to save into {}", self.exporter.dir().display()))?;
        Ok(path)
    }

    fn stop_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            match listener.shutdown() {
                Ok(()) => info!("Hotkey listener joined"),
                Err(e) => error!("Hotkey listener: {}", e),
            }
        }
    }
}

impl<C: ScreenCapture, N: Notifier> OverlayHandler for Controller<C, N> {
    fn session(&self) -> &OverlaySession {
        &self.session
    }

    fn session_mut(&mut self) -> &mut OverlaySession {
        &mut self.session
    }

    fn on_wake(&mut self, surface: &mut dyn OverlaySurface) {
        self.drain_actions(surface);
    }

    fn on_exit(&mut self) {
        info!("Exit requested");
        self.stop_listener();
    }
}
