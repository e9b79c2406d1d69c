//! Snapcrop - hotkey-driven region screenshots for Windows

#![cfg_attr(windows, windows_subsystem = "windows")]
#![cfg_attr(not(windows), allow(dead_code))]

mod config;
mod controller;
mod notify;

use anyhow::Result;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capacity of the hotkey-to-UI action queue
const ACTION_QUEUE_CAPACITY: usize = 16;

#[cfg(windows)]
fn run() -> Result<()> {
    use crate::config::AppConfig;
    use crate::controller::Controller;
    use crate::notify::DialogNotifier;
    use anyhow::Context;
    use capture::{GdiCapture, ScreenCapture};
    use export::PngExporter;
    use hotkey::{action_channel, Action, HotkeyListener, Win32Backend};
    use once_cell::sync::OnceCell;
    use overlay::{DesktopSnapshot, OverlaySession, OverlayWindow};
    use std::sync::Arc;
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    // Physical-pixel coordinates so pointer input matches the snapshot
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let config = AppConfig::load().context("Failed to load config")?;
    log::info!("Config loaded: {:?}", config);

    let save_dir = config.save_dir();
    std::fs::create_dir_all(&save_dir)
        .with_context(|| format!("Failed to create {}", save_dir.display()))?;

    let mut capturer = GdiCapture::new();
    let initial = capturer
        .capture_full_desktop()
        .context("Failed to grab the desktop")?;
    let session = OverlaySession::new(
        DesktopSnapshot::new(initial),
        config.selection_limits()?,
        config.render_style(),
    );

    // Filled in once the overlay exists; wakes before that are covered by
    // the explicit wake after creation
    let overlay_hwnd: Arc<OnceCell<isize>> = Arc::new(OnceCell::new());
    let waker_hwnd = overlay_hwnd.clone();
    let (sender, receiver) = action_channel(ACTION_QUEUE_CAPACITY);
    let sender = sender.with_waker(move || {
        if let Some(&raw) = waker_hwnd.get() {
            OverlayWindow::post_wake(raw);
        }
    });

    let listener = HotkeyListener::spawn(Win32Backend::new, config.binding_plan()?, sender)
        .context("Failed to start hotkey listener")?;

    let describe = |action: Action| {
        let combos: Vec<String> = listener
            .combos_for(action)
            .iter()
            .map(ToString::to_string)
            .collect();
        if combos.is_empty() {
            "(unavailable)".to_string()
        } else {
            combos.join(" or ")
        }
    };
    log::info!("Hotkeys:");
    log::info!("  {} -> show overlay", describe(Action::Show));
    log::info!("  {} -> hide overlay", describe(Action::Hide));
    log::info!("  {} -> capture", describe(Action::Capture));
    log::info!("  Esc (overlay focused) -> quit");
    log::info!("Saving captures to {}", save_dir.display());

    let mut controller = Controller::new(
        session,
        capturer,
        DialogNotifier,
        PngExporter::new(save_dir),
        config.hide_delay(),
        receiver,
    );
    controller.attach_listener(listener);

    let window = OverlayWindow::create(Box::new(controller))?;
    let _ = overlay_hwnd.set(window.raw());
    OverlayWindow::post_wake(window.raw());

    let exit_code = OverlayWindow::run_message_loop();
    log::info!("Message loop exited with {}", exit_code);
    Ok(())
}

#[cfg(not(windows))]
fn run() -> Result<()> {
    anyhow::bail!("Snapcrop runs on Windows only")
}

fn main() {
    let temp_dir = std::env::temp_dir();
    let run_log_path = temp_dir.join("snapcrop_run.log");
    let err_log_path = temp_dir.join("snapcrop_fatal_err.log");

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    // No console under the GUI subsystem; stderr only if the file is unavailable
    if let Ok(log_file) = std::fs::File::create(&run_log_path) {
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.init();

    log::info!("Snapcrop v{} starting", APP_VERSION);

    if let Err(e) = run() {
        log::error!("Fatal error: {:?}", e);
        std::fs::write(&err_log_path, format!("{:?}", e)).ok();
        std::process::exit(1);
    }

    log::info!("Snapcrop exited");
}
