//! Re-entrancy-safe access to the overlay handler
//!
//! Modal dialogs opened by the handler run their own message loop while the
//! handler is still borrowed. Requests that arrive in that window are
//! latched here and replayed once, after the handler is free again.

use crate::session::{OverlayHandler, OverlaySurface};
use std::cell::{Cell, RefCell};

/// Requests deferred while the handler was busy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Followup {
    pub wake: bool,
    pub close: bool,
}

pub struct HandlerSlot {
    handler: RefCell<Box<dyn OverlayHandler>>,
    pending_wake: Cell<bool>,
    pending_close: Cell<bool>,
}

impl HandlerSlot {
    pub fn new(handler: Box<dyn OverlayHandler>) -> Self {
        Self {
            handler: RefCell::new(handler),
            pending_wake: Cell::new(false),
            pending_close: Cell::new(false),
        }
    }

    /// Run `f` with shared access; `None` while the handler is busy
    pub fn with_ref<R>(&self, f: impl FnOnce(&Box<dyn OverlayHandler>) -> R) -> Option<R> {
        let handler = self.handler.try_borrow().ok()?;
        Some(f(&handler))
    }

    /// Run `f` with exclusive access; `None` while the handler is busy
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Box<dyn OverlayHandler>) -> R) -> Option<R> {
        let mut handler = self.handler.try_borrow_mut().ok()?;
        Some(f(&mut handler))
    }

    /// Drain queued work now, or latch one wake for later
    pub fn wake(&self, surface: &mut dyn OverlaySurface) -> bool {
        let ran = self.with_mut(|h| h.on_wake(surface)).is_some();
        if !ran {
            self.pending_wake.set(true);
        }
        ran
    }

    /// Run the exit path. `true` means the window may be destroyed now;
    /// otherwise the close is latched until the handler is free.
    pub fn exit(&self) -> bool {
        let ran = self.with_mut(|h| h.on_exit()).is_some();
        if !ran {
            self.pending_close.set(true);
        }
        ran
    }

    /// Take the latched requests. Empty, and left latched, while the
    /// handler is still busy.
    pub fn take_followup(&self) -> Followup {
        if self.handler.try_borrow_mut().is_err() {
            return Followup::default();
        }
        Followup {
            wake: self.pending_wake.replace(false),
            close: self.pending_close.replace(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CursorKind, Size};
    use crate::render::RenderStyle;
    use crate::screenshot::DesktopSnapshot;
    use crate::selection::SelectionLimits;
    use crate::session::OverlaySession;
    use capture::FrameData;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counts {
        wakes: Cell<u32>,
        exits: Cell<u32>,
    }

    struct CountingHandler {
        session: OverlaySession,
        counts: Rc<Counts>,
    }

    impl OverlayHandler for CountingHandler {
        fn session(&self) -> &OverlaySession {
            &self.session
        }

        fn session_mut(&mut self) -> &mut OverlaySession {
            &mut self.session
        }

        fn on_wake(&mut self, _surface: &mut dyn OverlaySurface) {
            self.counts.wakes.set(self.counts.wakes.get() + 1);
        }

        fn on_exit(&mut self) {
            self.counts.exits.set(self.counts.exits.get() + 1);
        }
    }

    struct NullSurface;

    impl OverlaySurface for NullSurface {
        fn show(&mut self, _size: Size) {}
        fn hide(&mut self) {}
        fn redraw(&mut self) {}
        fn set_cursor(&mut self, _cursor: CursorKind) {}
    }

    fn slot() -> (HandlerSlot, Rc<Counts>) {
        let frame = FrameData::new(vec![0; 64 * 48 * 4], 64, 48).unwrap();
        let session = OverlaySession::new(
            DesktopSnapshot::new(frame),
            SelectionLimits::default(),
            RenderStyle::default(),
        );
        let counts = Rc::new(Counts::default());
        let handler = CountingHandler {
            session,
            counts: counts.clone(),
        };
        (HandlerSlot::new(Box::new(handler)), counts)
    }

    #[test]
    fn free_handler_runs_immediately() {
        let (slot, counts) = slot();
        assert!(slot.wake(&mut NullSurface));
        assert!(slot.exit());
        assert_eq!((counts.wakes.get(), counts.exits.get()), (1, 1));
        assert_eq!(slot.take_followup(), Followup::default());
    }

    #[test]
    fn busy_wakes_collapse_into_one_followup() {
        let (slot, counts) = slot();
        let guard = slot.handler.borrow_mut();

        for _ in 0..50 {
            assert!(!slot.wake(&mut NullSurface));
        }
        assert!(slot.with_ref(|_| ()).is_none());
        // Still busy; nothing is handed out yet
        assert_eq!(slot.take_followup(), Followup::default());

        drop(guard);
        assert_eq!(
            slot.take_followup(),
            Followup {
                wake: true,
                close: false
            }
        );
        assert_eq!(slot.take_followup(), Followup::default());
        assert_eq!(counts.wakes.get(), 0);
    }

    #[test]
    fn busy_close_is_deferred_not_dropped() {
        let (slot, counts) = slot();
        let guard = slot.handler.borrow_mut();
        assert!(!slot.exit());
        assert_eq!(counts.exits.get(), 0);
        drop(guard);

        let followup = slot.take_followup();
        assert!(followup.close);
        assert!(slot.exit());
        assert_eq!(counts.exits.get(), 1);
    }

    #[test]
    fn shared_access_reads_session() {
        let (slot, _counts) = slot();
        let outer = slot.with_ref(|h| h.session().desktop_size());
        assert_eq!(outer, Some(Size::new(64, 48)));
    }
}
