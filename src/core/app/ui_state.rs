use std::time::{Duration, Instant};

use ratatui::prelude::Size;

use crate::core::constants::NOTIFICATION_TTL_SECS;
use crate::ui::theme::Theme;
use crate::utils::line_editor::{apply_line_edit_action, LineEditAction, LineEditorState};

/// The three top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    Study,
    Devotional,
}

impl View {
    pub const ALL: [View; 3] = [View::Chat, View::Study, View::Devotional];

    pub fn label(self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::Study => "Study",
            View::Devotional => "Devotional",
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Chat => View::Study,
            View::Study => View::Devotional,
            View::Devotional => View::Chat,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            View::Chat => View::Devotional,
            View::Study => View::Chat,
            View::Devotional => View::Study,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= Duration::from_secs(NOTIFICATION_TTL_SECS)
    }
}

/// What a pending y/n prompt will do when accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSession { id: String },
    DeleteStudyItem { id: String },
    DeleteDevotional { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub prompt: String,
    pub action: ConfirmAction,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub view: View,
    pub theme: Theme,
    pub input: LineEditorState,
    /// Lines scrolled up from the bottom of the chat, or down from the top
    /// of the study and devotional lists.
    pub scroll_offset: u16,
    pub notification: Option<Notification>,
    pub confirmation: Option<PendingConfirmation>,
    pub show_help: bool,
    pub exit_requested: bool,
    pub last_term_size: Size,
}

impl UiState {
    pub fn new(theme: Theme) -> Self {
        Self {
            view: View::Chat,
            theme,
            input: LineEditorState::default(),
            scroll_offset: 0,
            notification: None,
            confirmation: None,
            show_help: false,
            exit_requested: false,
            last_term_size: Size::default(),
        }
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.scroll_offset = 0;
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notification = Some(Notification {
            kind,
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message);
    }

    /// Drop the notification once it has been visible long enough.
    /// Returns true when something was cleared.
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        if self
            .notification
            .as_ref()
            .is_some_and(|notification| notification.is_expired(now))
        {
            self.notification = None;
            return true;
        }
        false
    }

    pub fn request_confirmation(&mut self, prompt: impl Into<String>, action: ConfirmAction) {
        self.confirmation = Some(PendingConfirmation {
            prompt: prompt.into(),
            action,
        });
    }

    pub fn input_text(&self) -> &str {
        &self.input.text
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input = LineEditorState::with_text(text);
    }

    pub fn edit_input(&mut self, action: LineEditAction) -> bool {
        apply_line_edit_action(&mut self.input, action)
    }

    pub fn take_input(&mut self) -> String {
        self.input.take()
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.scroll_offset).saturating_add(delta);
        self.scroll_offset = next.clamp(0, i32::from(u16::MAX)) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_cycle_in_both_directions() {
        let mut view = View::Chat;
        for _ in 0..3 {
            view = view.next();
        }
        assert_eq!(view, View::Chat);
        assert_eq!(View::Chat.previous(), View::Devotional);
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let mut ui = UiState::new(Theme::dark_default());
        ui.success("Saved");
        let shown_at = ui.notification.as_ref().unwrap().shown_at;

        assert!(!ui.expire_notification(shown_at + Duration::from_secs(4)));
        assert!(ui.notification.is_some());
        assert!(ui.expire_notification(shown_at + Duration::from_secs(5)));
        assert!(ui.notification.is_none());
    }

    #[test]
    fn newer_notification_replaces_older() {
        let mut ui = UiState::new(Theme::dark_default());
        ui.info("first");
        ui.error("second");
        let notification = ui.notification.as_ref().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "second");
    }

    #[test]
    fn switching_views_resets_scroll() {
        let mut ui = UiState::new(Theme::dark_default());
        ui.scroll_by(12);
        ui.set_view(View::Chat);
        assert_eq!(ui.scroll_offset, 12);
        ui.set_view(View::Study);
        assert_eq!(ui.scroll_offset, 0);
        ui.scroll_by(-3);
        assert_eq!(ui.scroll_offset, 0);
    }
}
