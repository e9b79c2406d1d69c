//! User-facing notices

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Shows a short message to the user; blocks until it is dismissed
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str);
}

/// Modal message box
#[cfg(windows)]
pub struct DialogNotifier;

#[cfg(windows)]
impl Notifier for DialogNotifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str) {
        let level = match kind {
            NoticeKind::Info => rfd::MessageLevel::Info,
            NoticeKind::Warning => rfd::MessageLevel::Warning,
            NoticeKind::Error => rfd::MessageLevel::Error,
        };
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}
