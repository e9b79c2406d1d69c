//! `RegisterHotKey` backend driven by the listener thread's message queue

use crate::binding::{KeyCombo, MOD_NOREPEAT};
use crate::listener::{BackendEvent, HotkeyBackend, QuitSignal};
use crate::{HotkeyError, HotkeyResult};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW, TranslateMessage, MSG,
    PM_NOREMOVE, WM_HOTKEY, WM_QUIT,
};

/// Thread-bound hotkey registrations; `new` must run on the listener thread
pub struct Win32Backend {
    thread_id: u32,
}

impl Win32Backend {
    pub fn new() -> HotkeyResult<Self> {
        // Force the thread's message queue into existence so quit can be posted
        let mut msg = MSG::default();
        unsafe {
            let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
        }
        let thread_id = unsafe { GetCurrentThreadId() };
        if thread_id == 0 {
            return Err(HotkeyError::Backend("no thread id".into()));
        }
        Ok(Self { thread_id })
    }
}

struct ThreadQuit {
    thread_id: u32,
}

impl QuitSignal for ThreadQuit {
    fn quit(&self) {
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
    }
}

impl HotkeyBackend for Win32Backend {
    fn quit_signal(&self) -> Box<dyn QuitSignal> {
        Box::new(ThreadQuit {
            thread_id: self.thread_id,
        })
    }

    fn register(&mut self, id: i32, combo: KeyCombo) -> HotkeyResult<()> {
        let modifiers = HOT_KEY_MODIFIERS(combo.modifiers | MOD_NOREPEAT);
        unsafe { RegisterHotKey(None, id, modifiers, combo.vk) }.map_err(|e| {
            HotkeyError::Registration {
                combo: combo.to_string(),
                reason: e.message(),
            }
        })
    }

    fn unregister(&mut self, id: i32) -> HotkeyResult<()> {
        unsafe { UnregisterHotKey(None, id) }.map_err(|e| HotkeyError::Backend(e.message()))
    }

    fn wait_event(&mut self) -> BackendEvent {
        let mut msg = MSG::default();
        let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        // 0 is WM_QUIT, -1 is a broken queue
        if r.0 == 0 || r.0 == -1 {
            return BackendEvent::Quit;
        }
        if msg.message == WM_HOTKEY {
            return BackendEvent::Hotkey(msg.wParam.0 as i32);
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        BackendEvent::Idle
    }
}
