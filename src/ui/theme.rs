use ratatui::style::{Color, Modifier, Style};

use crate::core::app::ui_state::NotificationKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background_color: Color,

    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub model_text_style: Style,
    pub muted_text_style: Style,
    pub error_text_style: Style,
    pub streaming_indicator_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub sidebar_item_style: Style,
    pub sidebar_active_style: Style,
    pub input_text_style: Style,
    pub input_disabled_style: Style,

    // Study and devotional accents
    pub heading_style: Style,
    pub reference_style: Style,
    pub keyword_style: Style,

    // Notifications
    pub info_style: Style,
    pub success_style: Style,
    pub error_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            name: "dark",
            background_color: Color::Rgb(0x11, 0x18, 0x27),

            user_prefix_style: Style::default()
                .fg(Color::Rgb(0x93, 0xc5, 0xfd))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0xbf, 0xdb, 0xfe)),
            model_text_style: Style::default().fg(Color::Rgb(0xe5, 0xe7, 0xeb)),
            muted_text_style: Style::default().fg(Color::Rgb(0x9c, 0xa3, 0xaf)),
            error_text_style: Style::default().fg(Color::Rgb(0xf8, 0x71, 0x71)),
            streaming_indicator_style: Style::default().fg(Color::Rgb(0xfc, 0xd3, 0x4d)),

            title_style: Style::default()
                .fg(Color::Rgb(0xfc, 0xd3, 0x4d))
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::Rgb(0x4b, 0x55, 0x63)),
            sidebar_item_style: Style::default().fg(Color::Rgb(0xd1, 0xd5, 0xdb)),
            sidebar_active_style: Style::default()
                .fg(Color::Rgb(0x11, 0x18, 0x27))
                .bg(Color::Rgb(0xfc, 0xd3, 0x4d))
                .add_modifier(Modifier::BOLD),
            input_text_style: Style::default().fg(Color::White),
            input_disabled_style: Style::default().fg(Color::Rgb(0x6b, 0x72, 0x80)),

            heading_style: Style::default()
                .fg(Color::Rgb(0xfc, 0xd3, 0x4d))
                .add_modifier(Modifier::BOLD),
            reference_style: Style::default()
                .fg(Color::Rgb(0x93, 0xc5, 0xfd))
                .add_modifier(Modifier::BOLD),
            keyword_style: Style::default().fg(Color::Rgb(0x6e, 0xe7, 0xb7)),

            info_style: Style::default().fg(Color::Rgb(0x93, 0xc5, 0xfd)),
            success_style: Style::default().fg(Color::Rgb(0x6e, 0xe7, 0xb7)),
            error_style: Style::default()
                .fg(Color::Rgb(0xf8, 0x71, 0x71))
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            background_color: Color::Rgb(0xf9, 0xfa, 0xfb),

            user_prefix_style: Style::default()
                .fg(Color::Rgb(0x1d, 0x4e, 0xd8))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0x1e, 0x3a, 0x8a)),
            model_text_style: Style::default().fg(Color::Rgb(0x1f, 0x29, 0x37)),
            muted_text_style: Style::default().fg(Color::Rgb(0x6b, 0x72, 0x80)),
            error_text_style: Style::default().fg(Color::Rgb(0xb9, 0x1c, 0x1c)),
            streaming_indicator_style: Style::default().fg(Color::Rgb(0xb4, 0x53, 0x09)),

            title_style: Style::default()
                .fg(Color::Rgb(0x92, 0x40, 0x0e))
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::Rgb(0xd1, 0xd5, 0xdb)),
            sidebar_item_style: Style::default().fg(Color::Rgb(0x37, 0x41, 0x51)),
            sidebar_active_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0x92, 0x40, 0x0e))
                .add_modifier(Modifier::BOLD),
            input_text_style: Style::default().fg(Color::Black),
            input_disabled_style: Style::default().fg(Color::Rgb(0x9c, 0xa3, 0xaf)),

            heading_style: Style::default()
                .fg(Color::Rgb(0x92, 0x40, 0x0e))
                .add_modifier(Modifier::BOLD),
            reference_style: Style::default()
                .fg(Color::Rgb(0x1d, 0x4e, 0xd8))
                .add_modifier(Modifier::BOLD),
            keyword_style: Style::default().fg(Color::Rgb(0x04, 0x78, 0x57)),

            info_style: Style::default().fg(Color::Rgb(0x1d, 0x4e, 0xd8)),
            success_style: Style::default().fg(Color::Rgb(0x04, 0x78, 0x57)),
            error_style: Style::default()
                .fg(Color::Rgb(0xb9, 0x1c, 0x1c))
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark_default(),
        }
    }

    pub fn is_light(&self) -> bool {
        self.name == "light"
    }

    pub fn toggled(&self) -> Self {
        if self.is_light() {
            Self::dark_default()
        } else {
            Self::light()
        }
    }

    pub fn notification_style(&self, kind: NotificationKind) -> Style {
        match kind {
            NotificationKind::Info => self.info_style,
            NotificationKind::Success => self.success_style,
            NotificationKind::Error => self.error_style,
        }
    }

    // Markdown styles derive from the transcript palette.

    pub fn md_heading_style(&self, level: u8) -> Style {
        let base = self.heading_style;
        if level <= 2 {
            base.add_modifier(Modifier::UNDERLINED)
        } else {
            base
        }
    }

    pub fn md_blockquote_style(&self) -> Style {
        self.muted_text_style.add_modifier(Modifier::ITALIC)
    }

    pub fn md_inline_code_style(&self) -> Style {
        self.keyword_style
    }

    pub fn md_list_marker_style(&self) -> Style {
        self.muted_text_style
    }
}
