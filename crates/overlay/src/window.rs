//! Overlay window implementation

use crate::geometry::{CursorKind, Point, Size};
use crate::dispatch::HandlerSlot;
use crate::session::{OverlayHandler, OverlaySurface};
use crate::OverlayResult;
use capture::virtual_desktop_rect;
use std::cell::Cell;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::InvalidateRect;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    GetWindowLongPtrW, LoadCursorW, PostMessageW, PostQuitMessage, RegisterClassExW,
    SetCursor, SetForegroundWindow, SetWindowLongPtrW, SetWindowPos, ShowWindow,
    TranslateMessage, CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, HTCLIENT, HWND_TOPMOST,
    IDC_CROSS, IDC_SIZEALL, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE, IDC_SIZEWE, MSG,
    SWP_SHOWWINDOW, SW_HIDE, WM_APP, WM_CLOSE, WM_DESTROY, WM_ERASEBKGND, WM_KEYDOWN,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_NCDESTROY, WM_PAINT, WM_SETCURSOR,
    WNDCLASSEXW, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

/// Posted to the overlay when queued actions are waiting
pub const WM_APP_WAKE: u32 = WM_APP + 1;

const VK_ESCAPE: usize = 0x1B;

/// Per-window state behind `GWLP_USERDATA`
struct WindowState {
    slot: HandlerSlot,
    cursor: Cell<CursorKind>,
}

/// Full-desktop overlay window; starts hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayWindow {
    hwnd: isize,
}

impl OverlayWindow {
    const CLASS_NAME: PCWSTR = w!("SnapcropOverlay");

    /// Create the hidden overlay window owning `handler`
    pub fn create(handler: Box<dyn OverlayHandler>) -> OverlayResult<Self> {
        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(Self::wnd_proc),
                hInstance: hinstance,
                hCursor: LoadCursorW(None, IDC_CROSS)?,
                lpszClassName: Self::CLASS_NAME,
                ..Default::default()
            };

            RegisterClassExW(&wc);

            let vd = virtual_desktop_rect();
            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                Self::CLASS_NAME,
                w!("Snapcrop Overlay"),
                WS_POPUP,
                vd.x,
                vd.y,
                vd.width as i32,
                vd.height as i32,
                None,
                None,
                hinstance,
                None,
            )?;

            let state = Box::new(WindowState {
                slot: HandlerSlot::new(handler),
                cursor: Cell::new(CursorKind::Crosshair),
            });
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);

            Ok(Self {
                hwnd: hwnd.0 as isize,
            })
        }
    }

    /// Raw handle, safe to move across threads
    pub fn raw(&self) -> isize {
        self.hwnd
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut std::ffi::c_void)
    }

    /// Ask the window's thread to drain its queue; callable from any thread
    pub fn post_wake(raw: isize) -> bool {
        let hwnd = HWND(raw as *mut std::ffi::c_void);
        unsafe { PostMessageW(hwnd, WM_APP_WAKE, WPARAM(0), LPARAM(0)).is_ok() }
    }

    /// Run the UI thread's message loop until the overlay is destroyed
    pub fn run_message_loop() -> i32 {
        unsafe {
            let mut msg = MSG::default();
            // GetMessageW returns -1 on failure
            while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            msg.wParam.0 as i32
        }
    }

    fn apply_cursor(kind: CursorKind) {
        let id = match kind {
            CursorKind::Crosshair => IDC_CROSS,
            CursorKind::Move => IDC_SIZEALL,
            CursorKind::SizeNS => IDC_SIZENS,
            CursorKind::SizeWE => IDC_SIZEWE,
            CursorKind::SizeNESW => IDC_SIZENESW,
            CursorKind::SizeNWSE => IDC_SIZENWSE,
        };
        unsafe {
            if let Ok(cursor) = LoadCursorW(None, id) {
                SetCursor(cursor);
            }
        }
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowState;
        if ptr.is_null() {
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }

        match msg {
            // Esc and Alt+F4 both land here: stop the listener, then destroy
            WM_CLOSE => {
                if (*ptr).slot.exit() {
                    let _ = DestroyWindow(hwnd);
                }
                return LRESULT(0);
            }
            WM_DESTROY => {
                PostQuitMessage(0);
                return LRESULT(0);
            }
            WM_NCDESTROY => {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                drop(Box::from_raw(ptr));
                return DefWindowProcW(hwnd, msg, wparam, lparam);
            }
            _ => {}
        }

        let state = &*ptr;
        let mut window = OverlayWindow {
            hwnd: hwnd.0 as isize,
        };

        let result = match msg {
            WM_PAINT => {
                match state.slot.with_ref(|h| h.session().renderer().render(hwnd)) {
                    Some(()) => LRESULT(0),
                    None => DefWindowProcW(hwnd, msg, wparam, lparam),
                }
            }

            WM_ERASEBKGND => LRESULT(1),

            WM_SETCURSOR if (lparam.0 & 0xFFFF) as u32 == HTCLIENT => {
                Self::apply_cursor(state.cursor.get());
                LRESULT(1)
            }

            WM_LBUTTONDOWN => {
                let started = state
                    .slot
                    .with_mut(|h| h.session_mut().pointer_down(point_from_lparam(lparam)));
                if started.is_some() {
                    SetCapture(hwnd);
                    window.redraw();
                }
                LRESULT(0)
            }

            WM_MOUSEMOVE => {
                let p = point_from_lparam(lparam);
                let outcome = state.slot.with_mut(|h| {
                    let session = h.session_mut();
                    let moved = session.pointer_move(p);
                    (moved, if moved { None } else { session.hover(p) })
                });
                match outcome {
                    Some((true, _)) => window.redraw(),
                    Some((false, Some(cursor))) => window.set_cursor(cursor),
                    _ => {}
                }
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                state.slot.with_mut(|h| h.session_mut().pointer_up());
                let _ = ReleaseCapture();
                LRESULT(0)
            }

            WM_KEYDOWN if wparam.0 == VK_ESCAPE => {
                let _ = PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0));
                LRESULT(0)
            }

            WM_APP_WAKE => {
                state.slot.wake(&mut window);
                LRESULT(0)
            }

            _ => return DefWindowProcW(hwnd, msg, wparam, lparam),
        };

        // Replay, once, whatever arrived while a modal loop held the handler
        let followup = state.slot.take_followup();
        if followup.close {
            let _ = PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0));
        } else if followup.wake {
            let _ = PostMessageW(hwnd, WM_APP_WAKE, WPARAM(0), LPARAM(0));
        }
        result
    }
}

fn point_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

impl OverlaySurface for OverlayWindow {
    fn show(&mut self, size: Size) {
        let vd = virtual_desktop_rect();
        unsafe {
            let _ = SetWindowPos(
                self.hwnd(),
                HWND_TOPMOST,
                vd.x,
                vd.y,
                size.width,
                size.height,
                SWP_SHOWWINDOW,
            );
            let _ = SetForegroundWindow(self.hwnd());
            let _ = InvalidateRect(self.hwnd(), None, false);
        }
    }

    fn hide(&mut self) {
        unsafe {
            let _ = ShowWindow(self.hwnd(), SW_HIDE);
        }
    }

    fn redraw(&mut self) {
        unsafe {
            let _ = InvalidateRect(self.hwnd(), None, false);
        }
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        unsafe {
            let ptr = GetWindowLongPtrW(self.hwnd(), GWLP_USERDATA) as *const WindowState;
            if !ptr.is_null() {
                (*ptr).cursor.set(cursor);
            }
        }
        Self::apply_cursor(cursor);
    }
}
