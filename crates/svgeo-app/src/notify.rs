//! Transient user-visible notices with an auto-hide deadline.

use std::time::Duration;

/// How long a notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

/// Single-slot notice holder. Showing a new notice replaces the previous
/// one and its deadline, so a stale auto-hide never fires late.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    slot: Option<(Notice, Duration)>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, kind: NoticeKind, now: Duration) {
        self.slot = Some((
            Notice {
                message: message.into(),
                kind,
            },
            now + NOTICE_DURATION,
        ));
    }

    /// The notice still visible at `now`, if any.
    pub fn current(&mut self, now: Duration) -> Option<&Notice> {
        if let Some((_, deadline)) = &self.slot {
            if now >= *deadline {
                self.slot = None;
            }
        }
        self.slot.as_ref().map(|(notice, _)| notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_notice_expires() {
        let mut center = NotificationCenter::new();
        center.show("copied", NoticeKind::Success, ms(0));
        assert!(center.current(ms(3999)).is_some());
        assert!(center.current(ms(4000)).is_none());
    }

    #[test]
    fn test_new_notice_replaces_deadline() {
        let mut center = NotificationCenter::new();
        center.show("first", NoticeKind::Info, ms(0));
        center.show("second", NoticeKind::Error, ms(3500));
        let notice = center.current(ms(5000)).unwrap();
        assert_eq!(notice.message, "second");
        assert_eq!(notice.kind, NoticeKind::Error);
    }
}
