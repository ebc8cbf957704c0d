//! Static screen shown instead of the chat UI when no API key is available.

use std::error::Error;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::chat_loop::{restore_terminal, setup_terminal};
use crate::ui::theme::Theme;
use crate::ui::wrap::wrap_text;

pub fn draw_config_error(f: &mut Frame, message: &str, theme: &Theme) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        area,
    );

    let width = area.width.saturating_sub(4).clamp(1, 72);
    let mut lines = vec![
        Line::from(Span::styled("Configuration Error", theme.error_style)),
        Line::default(),
    ];
    lines.extend(wrap_text(message, theme.model_text_style, width as usize));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press any key to exit.",
        theme.muted_text_style,
    )));

    let height = (lines.len() as u16 + 2).min(area.height);
    let box_width = (width + 4).min(area.width);
    let rect = Rect {
        x: area.x + (area.width - box_width) / 2,
        y: area.y + (area.height - height) / 2,
        width: box_width,
        height,
    };
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.error_text_style)
            .title(Span::styled(" Bible Expert ", theme.title_style)),
    );
    f.render_widget(panel, rect);
}

/// Show the message until a key is pressed.
pub async fn run_config_error(message: &str, theme: Theme) -> Result<(), Box<dyn Error>> {
    let terminal = setup_terminal()?;

    let result: Result<(), Box<dyn Error>> = loop {
        {
            let mut guard = terminal.lock().await;
            if let Err(err) = guard.draw(|f| draw_config_error(f, message, &theme)) {
                break Err(err.into());
            }
        }
        match event::poll(Duration::from_millis(250)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
                Ok(_) => {}
                Err(err) => break Err(err.into()),
            },
            Ok(false) => tokio::task::yield_now().await,
            Err(err) => break Err(err.into()),
        }
    };

    restore_terminal(&terminal).await?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::missing_key_message;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn explains_how_to_configure_a_key() {
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        let theme = Theme::dark_default();
        terminal
            .draw(|f| draw_config_error(f, &missing_key_message(), &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = (0..buffer.area.height)
            .flat_map(|y| (0..buffer.area.width).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect();
        assert!(text.contains("Configuration Error"));
        assert!(text.contains("GEMINI_API_KEY"));
        assert!(text.contains("Press any key to exit."));
    }

    #[test]
    fn tiny_terminals_do_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        let theme = Theme::light();
        terminal
            .draw(|f| draw_config_error(f, "no key", &theme))
            .unwrap();
    }
}
