//! Line builders for the chat, study and devotional views.

use chrono::{DateTime, Local};
use ratatui::text::{Line, Span};

use crate::core::app::App;
use crate::core::constants::{language_name, STARTER_QUESTIONS};
use crate::core::devotional::Devotional;
use crate::core::message::ChatMessage;
use crate::core::study::SavedItem;
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Theme;
use crate::ui::wrap::{wrap_text, wrap_with_prefix};

const MODEL_LABEL: &str = "Bible Expert";
const USER_LABEL: &str = "You";

/// Streaming indicator: a pulse that brightens and fades twice a second.
pub fn pulse_symbol(elapsed_ms: u128) -> &'static str {
    let phase = (elapsed_ms % 1000) as f32 / 500.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
    if intensity < 0.33 {
        "○"
    } else if intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

fn message_lines(
    message: &ChatMessage,
    theme: &Theme,
    width: usize,
    reply_number: Option<usize>,
    pending: Option<&'static str>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if message.is_user() {
        lines.push(Line::from(Span::styled(USER_LABEL, theme.user_prefix_style)));
        lines.extend(wrap_text(&message.content, theme.user_text_style, width));
        return lines;
    }

    let mut header = vec![Span::styled(MODEL_LABEL, theme.title_style)];
    if let Some(number) = reply_number {
        header.push(Span::styled(format!(" #{number}"), theme.muted_text_style));
    }
    if let Some(symbol) = pending {
        header.push(Span::raw(" "));
        header.push(Span::styled(symbol, theme.streaming_indicator_style));
    }
    lines.push(Line::from(header));
    if message.content.is_empty() {
        if pending.is_some() {
            lines.push(Line::from(Span::styled(
                "Searching the Scriptures...",
                theme.muted_text_style,
            )));
        }
        return lines;
    }
    lines.extend(render_markdown(
        &message.content,
        theme,
        theme.model_text_style,
        width,
    ));
    lines
}

/// The active session's transcript, wrapped to `width`.
pub fn chat_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    let Some(session) = app.active_session() else {
        return Vec::new();
    };
    let streaming = app
        .chat
        .active_stream
        .as_ref()
        .filter(|stream| stream.session_id == session.id);

    let mut lines = Vec::new();
    let mut replies = 0;
    for message in &session.messages {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let pending = streaming
            .filter(|stream| stream.message_id == message.id)
            .map(|stream| pulse_symbol(stream.started_at.elapsed().as_millis()));
        // Matches the numbering `/save #n` uses.
        let reply_number = (message.is_model() && !message.is_welcome() && !message.content.is_empty())
            .then(|| {
                replies += 1;
                replies
            });
        lines.extend(message_lines(message, theme, width, reply_number, pending));
    }

    if session.messages.len() == 1 {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Not sure where to start? Try /ask <n>:",
            theme.muted_text_style,
        )));
        for (index, question) in STARTER_QUESTIONS.iter().enumerate() {
            lines.extend(wrap_with_prefix(
                &[Span::styled(*question, theme.model_text_style)],
                &[Span::styled(format!("  {}. ", index + 1), theme.title_style)],
                &[Span::raw("     ")],
                width,
            ));
        }
    }

    if let Some(error) = &app.chat.error {
        lines.push(Line::default());
        lines.extend(wrap_text(error, theme.error_text_style, width));
    }
    lines
}

fn saved_at_label(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.with_timezone(&Local).format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_default()
}

fn labeled(label: &str, body: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(label.to_string(), theme.heading_style))];
    lines.extend(wrap_text(body, theme.model_text_style, width));
    lines
}

fn study_item_lines(index: usize, item: &SavedItem, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("#{} ", index + 1), theme.title_style),
        Span::styled(item.session_title.clone(), theme.reference_style),
        Span::styled(
            format!("  {}", saved_at_label(item.saved_at)),
            theme.muted_text_style,
        ),
    ])];

    if !item.note.is_empty() {
        lines.extend(wrap_with_prefix(
            &[Span::styled(item.note.clone(), theme.user_text_style)],
            &[Span::styled("Note: ", theme.muted_text_style)],
            &[Span::raw("      ")],
            width,
        ));
    }
    lines.extend(render_markdown(
        &item.message.content,
        theme,
        theme.model_text_style,
        width,
    ));

    if item.is_enriching() {
        lines.push(Line::from(Span::styled(
            "Enriching with keywords and cross references...",
            theme.streaming_indicator_style,
        )));
        return lines;
    }

    if let Some(keywords) = item.keywords.as_ref().filter(|k| !k.is_empty()) {
        let mut spans = Vec::new();
        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" · ", theme.muted_text_style));
            }
            spans.push(Span::styled(keyword.clone(), theme.keyword_style));
        }
        lines.extend(wrap_with_prefix(
            &spans,
            &[Span::styled("Keywords: ", theme.muted_text_style)],
            &[Span::raw("          ")],
            width,
        ));
    }
    if let Some(reflection) = item.ai_reflection.as_deref().filter(|r| !r.is_empty()) {
        lines.extend(labeled("Reflection", reflection, theme, width));
    }
    if let Some(references) = item.cross_references.as_ref().filter(|r| !r.is_empty()) {
        lines.push(Line::from(Span::styled("Cross references", theme.heading_style)));
        for reference in references {
            lines.extend(wrap_with_prefix(
                &[Span::styled(reference.text.clone(), theme.model_text_style)],
                &[
                    Span::styled("• ", theme.md_list_marker_style()),
                    Span::styled(format!("{} ", reference.reference), theme.reference_style),
                ],
                &[Span::raw("  ")],
                width,
            ));
        }
    }
    lines
}

pub fn study_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    if app.study.is_empty() {
        return wrap_text(
            "Your study collection is empty. Save a reply with Ctrl+S or /save [#n] [note].",
            theme.muted_text_style,
            width,
        );
    }

    let mut lines = Vec::new();
    for (index, item) in app.study.items().iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.extend(study_item_lines(index, item, theme, width));
    }
    lines
}

fn devotional_item_lines(
    index: usize,
    devotional: &Devotional,
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("#{} ", index + 1), theme.title_style),
        Span::styled(devotional.day_id.clone(), theme.heading_style),
    ])];
    lines.push(Line::from(Span::styled(
        devotional.reading.reference.clone(),
        theme.reference_style,
    )));
    lines.extend(wrap_with_prefix(
        &[Span::styled(
            devotional.reading.text.clone(),
            theme.md_blockquote_style(),
        )],
        &[Span::styled("│ ", theme.md_blockquote_style())],
        &[Span::styled("│ ", theme.md_blockquote_style())],
        width,
    ));
    lines.extend(labeled("Reflection", &devotional.reflection, theme, width));
    lines.extend(labeled("Prayer", &devotional.prayer, theme, width));
    lines
}

pub fn devotional_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    let mut lines = Vec::new();

    if app.chat.devotional_in_flight {
        lines.push(Line::from(Span::styled(
            format!(
                "Preparing today's devotional in {}...",
                language_name(&app.prefs.language)
            ),
            theme.streaming_indicator_style,
        )));
    } else if app.devotionals.is_empty() {
        lines.extend(wrap_text(
            "No devotionals yet. Press Ctrl+G or type /devotional new for today's reading.",
            theme.muted_text_style,
            width,
        ));
    }

    for (index, devotional) in app.devotionals.devotionals().iter().enumerate() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.extend(devotional_item_lines(index, devotional, theme, width));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{apply_action, AppAction};
    use crate::core::study::{CrossReference, Enrichment};
    use tempfile::TempDir;

    fn rendered(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn chat_shows_welcome_then_error() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        app.chat.error = Some("Error: quota exceeded".into());

        let text = rendered(&chat_lines(&app, 60));
        assert_eq!(text[0], MODEL_LABEL);
        assert!(text[1].starts_with("Peace be with you!"));
        assert_eq!(text.last().map(String::as_str), Some("Error: quota exceeded"));
    }

    #[test]
    fn fresh_chat_offers_starter_questions() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());

        let text = rendered(&chat_lines(&app, 80));
        assert!(text.iter().any(|line| line.contains("/ask <n>")));
        assert!(text.contains(&format!("  1. {}", STARTER_QUESTIONS[0])));

        apply_action(
            &mut app,
            AppAction::SubmitMessage {
                text: "Psalm 1".into(),
            },
        );
        let text = rendered(&chat_lines(&app, 80));
        assert!(!text.iter().any(|line| line.contains("/ask <n>")));
    }

    #[test]
    fn finished_replies_are_numbered() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        for question in ["Genesis 1:1", "John 1:1"] {
            apply_action(
                &mut app,
                AppAction::SubmitMessage {
                    text: question.into(),
                },
            );
            let stream_id = app.chat.active_stream.as_ref().unwrap().stream_id;
            apply_action(
                &mut app,
                AppAction::AppendResponseChunk {
                    content: "In the beginning".into(),
                    stream_id,
                },
            );
            apply_action(&mut app, AppAction::StreamCompleted { stream_id });
        }

        let text = rendered(&chat_lines(&app, 80));
        let headers: Vec<&str> = text
            .iter()
            .map(String::as_str)
            .filter(|line| line.starts_with(MODEL_LABEL))
            .collect();
        assert_eq!(headers, vec![MODEL_LABEL, "Bible Expert #1", "Bible Expert #2"]);
    }

    #[test]
    fn pending_reply_shows_indicator() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        apply_action(
            &mut app,
            AppAction::SubmitMessage {
                text: "Psalm 121".into(),
            },
        );

        let text = rendered(&chat_lines(&app, 60));
        assert!(text.iter().any(|line| line == USER_LABEL));
        assert!(text.iter().any(|line| line == "Searching the Scriptures..."));
    }

    #[test]
    fn study_lists_enrichment_fields() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        apply_action(
            &mut app,
            AppAction::SubmitMessage {
                text: "Shepherd".into(),
            },
        );
        let stream_id = app.chat.active_stream.as_ref().unwrap().stream_id;
        apply_action(
            &mut app,
            AppAction::AppendResponseChunk {
                content: "The Lord is my shepherd".into(),
                stream_id,
            },
        );
        apply_action(&mut app, AppAction::StreamCompleted { stream_id });
        apply_action(
            &mut app,
            AppAction::SaveReply {
                note: "comfort".into(),
                reply: None,
            },
        );
        let item_id = app.study.items()[0].id.clone();

        let pending = rendered(&study_lines(&app, 80));
        assert!(pending.iter().any(|l| l.starts_with("Enriching")));

        apply_action(
            &mut app,
            AppAction::EnrichmentCompleted {
                item_id,
                result: Ok(Enrichment {
                    keywords: vec!["shepherd".into(), "care".into()],
                    ai_reflection: "God cares.".into(),
                    cross_references: vec![CrossReference {
                        reference: "John 10:11".into(),
                        text: "I am the good shepherd.".into(),
                    }],
                }),
            },
        );
        let text = rendered(&study_lines(&app, 80));
        assert!(text.contains(&"Note: comfort".to_string()));
        assert!(text.contains(&"Keywords: shepherd · care".to_string()));
        assert!(text.contains(&"• John 10:11 I am the good shepherd.".to_string()));
    }

    #[test]
    fn empty_views_explain_themselves() {
        let dir = TempDir::new().unwrap();
        let app = App::new_test_app(dir.path());
        assert!(rendered(&study_lines(&app, 100))[0].starts_with("Your study collection is empty"));
        assert!(rendered(&devotional_lines(&app, 100))[0].starts_with("No devotionals yet"));
    }

    #[test]
    fn pulse_rises_and_falls() {
        assert_eq!(pulse_symbol(0), "○");
        assert_eq!(pulse_symbol(250), "◐");
        assert_eq!(pulse_symbol(500), "●");
        assert_eq!(pulse_symbol(1000), "○");
    }
}
