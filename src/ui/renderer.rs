use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::commands::all_commands;
use crate::core::app::{App, View};
use crate::core::constants::language_name;
use crate::ui::theme::Theme;
use crate::ui::views::{chat_lines, devotional_lines, pulse_symbol, study_lines};
use crate::ui::wrap::display_width;

const SIDEBAR_WIDTH: u16 = 28;
const MIN_WIDTH_FOR_SIDEBAR: u16 = 72;

pub fn ui(f: &mut Frame, app: &mut App) {
    let theme = app.ui.theme.clone();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let main = if rows[0].width >= MIN_WIDTH_FOR_SIDEBAR {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(rows[0]);
        render_sidebar(f, app, &theme, columns[0]);
        columns[1]
    } else {
        rows[0]
    };

    render_view(f, app, &theme, main);
    render_status(f, app, &theme, rows[1]);
    render_input(f, app, &theme, rows[2]);

    if app.ui.show_help {
        render_help(f, &theme);
    }
}

fn render_sidebar(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let active = app.sessions.active_id();
    let mut lines = Vec::with_capacity(app.sessions.len());

    for (index, session) in app.sessions.sessions().iter().enumerate() {
        let label = truncate(&format!("{:>2} {}", index + 1, session.title), inner_width);
        let style = if Some(session.id.as_str()) == active {
            theme.sidebar_active_style
        } else {
            theme.sidebar_item_style
        };
        lines.push(Line::from(Span::styled(label, style)));
    }

    // Keep the active chat visible in long histories.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app
        .sessions
        .active_index()
        .map_or(0, |index| (index + 1).saturating_sub(visible));

    let sidebar = Paragraph::new(lines).scroll((skip as u16, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style)
            .title(Span::styled(" Chats ", theme.title_style)),
    );
    f.render_widget(sidebar, area);
}

fn view_title(app: &App, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (index, view) in View::ALL.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" │ ", theme.border_style));
        }
        let style = if *view == app.ui.view {
            theme.title_style
        } else {
            theme.muted_text_style
        };
        spans.push(Span::styled(view.label(), style));
    }

    let detail = match app.ui.view {
        View::Chat => app.active_session().map(|session| {
            format!(
                "{} · {} · {}",
                session.title,
                session.bible_version,
                language_name(&session.language)
            )
        }),
        View::Study => Some(format!("{} saved", app.study.len())),
        View::Devotional => Some(format!("{} days", app.devotionals.len())),
    };
    if let Some(detail) = detail {
        spans.push(Span::styled(format!("  {detail} "), theme.muted_text_style));
    }
    Line::from(spans)
}

fn render_view(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(view_title(app, theme));
    let inner = block.inner(area);
    let width = inner.width.max(1) as usize;

    let lines = match app.ui.view {
        View::Chat => chat_lines(app, width),
        View::Study => study_lines(app, width),
        View::Devotional => devotional_lines(app, width),
    };

    let height = inner.height as usize;
    let max_offset = lines.len().saturating_sub(height).min(u16::MAX as usize) as u16;
    app.ui.scroll_offset = app.ui.scroll_offset.min(max_offset);

    // Chat scrolls up from the newest message; the lists scroll down from the top.
    let top = match app.ui.view {
        View::Chat => max_offset - app.ui.scroll_offset,
        View::Study | View::Devotional => app.ui.scroll_offset,
    };

    let paragraph = Paragraph::new(lines).block(block).scroll((top, 0));
    f.render_widget(paragraph, area);
}

fn render_status(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let line = if let Some(confirmation) = &app.ui.confirmation {
        Line::from(Span::styled(
            confirmation.prompt.clone(),
            theme.error_style,
        ))
    } else if let Some(notification) = &app.ui.notification {
        Line::from(Span::styled(
            notification.message.clone(),
            theme.notification_style(notification.kind),
        ))
    } else {
        Line::from(Span::styled(
            status_hint(app),
            theme.muted_text_style,
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn status_hint(app: &App) -> String {
    let input = app.ui.input_text();
    if let Some(prefix) = input.strip_prefix('/').filter(|p| !p.contains(' ')) {
        let names: Vec<String> = crate::commands::matching_commands(prefix)
            .map(|command| format!("/{}", command.name))
            .collect();
        if !names.is_empty() {
            return names.join("  ");
        }
    }
    "Enter send · Tab switch view · Ctrl+S save reply · Ctrl+G devotional · F1 help · Ctrl+C quit"
        .to_string()
}

fn render_input(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let streaming = app.chat.active_stream.as_ref();
    let inner_width = area.width.saturating_sub(2) as usize;
    // Room for " ○ " when streaming.
    let text_width = if streaming.is_some() {
        inner_width.saturating_sub(3)
    } else {
        inner_width
    };

    let editor = &app.ui.input;
    let cursor = editor.cursor_columns();
    let scroll = (cursor + 1).saturating_sub(text_width.max(1));

    let style = if streaming.is_some() {
        theme.input_disabled_style
    } else {
        theme.input_text_style
    };
    let mut spans = vec![Span::styled(editor.text.clone(), style)];
    if let Some(stream) = streaming {
        let used = display_width(&editor.text).saturating_sub(scroll);
        let pad = text_width.saturating_sub(used) + 1;
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(
            pulse_symbol(stream.started_at.elapsed().as_millis()),
            theme.streaming_indicator_style,
        ));
    }

    let title = if streaming.is_some() {
        " Waiting for the reply... (commands still work) "
    } else if app.ui.confirmation.is_some() {
        " Press y to confirm, n to cancel "
    } else {
        " Ask about Scripture, or type /help "
    };

    let input = Paragraph::new(Line::from(spans))
        .scroll((0, scroll as u16))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style)
                .title(Span::styled(title, theme.muted_text_style)),
        );
    f.render_widget(input, area);

    if !app.ui.show_help && app.ui.confirmation.is_none() {
        let x = area.x + 1 + (cursor - scroll).min(text_width) as u16;
        f.set_cursor_position((x, area.y + 1));
    }
}

fn render_help(f: &mut Frame, theme: &Theme) {
    let mut lines = vec![
        Line::from(Span::styled("Keys", theme.heading_style)),
        help_row("Enter", "Send message or run command", theme),
        help_row("Tab / Shift+Tab", "Next / previous view", theme),
        help_row("Alt+Up / Alt+Down", "Previous / next chat", theme),
        help_row("Up / Down / PgUp / PgDn", "Scroll", theme),
        help_row("Ctrl+N", "New chat", theme),
        help_row("Ctrl+S", "Save last reply (input becomes the note)", theme),
        help_row("Ctrl+G", "Today's devotional", theme),
        help_row("Ctrl+T", "Toggle light/dark theme", theme),
        help_row("Esc", "Close help / clear input", theme),
        help_row("Ctrl+C", "Quit", theme),
        Line::default(),
        Line::from(Span::styled("Commands", theme.heading_style)),
    ];
    for command in all_commands() {
        lines.push(help_row(command.usage, command.help, theme));
    }

    let area = centered_rect(f.area(), 76, lines.len() as u16 + 2);
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style)
            .style(Style::default().bg(theme.background_color))
            .title(Span::styled(" Help (Esc to close) ", theme.title_style)),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn help_row(key: &str, description: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<26}"), theme.keyword_style),
        Span::styled(description.to_string(), theme.model_text_style),
    ])
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let cw = display_width(ch.encode_utf8(&mut [0; 4]));
        if width + cw + 1 > max {
            break;
        }
        out.push(ch);
        width += cw;
    }
    out.push('…');
    out
}
