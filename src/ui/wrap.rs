//! Width-aware wrapping of styled spans.
//!
//! Views pre-wrap everything they draw so scroll offsets can be computed
//! from line counts without asking ratatui to reflow.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

enum Piece {
    Word(Vec<(String, Style)>, usize),
    Space(String, Style, usize),
}

/// Split spans into words and whitespace runs. Adjacent spans without
/// whitespace between them form one word so punctuation stays attached.
fn pieces(spans: &[Span<'static>]) -> Vec<Piece> {
    let mut out = Vec::new();
    let mut word: Vec<(String, Style)> = Vec::new();
    let mut word_width = 0usize;

    for span in spans {
        let style = span.style;
        let mut run = String::new();
        let mut run_is_space = false;

        for ch in span.content.chars() {
            let is_space = ch.is_whitespace();
            if !run.is_empty() && is_space != run_is_space {
                if run_is_space {
                    let width = display_width(&run);
                    out.push(Piece::Space(std::mem::take(&mut run), style, width));
                } else {
                    word_width += display_width(&run);
                    word.push((std::mem::take(&mut run), style));
                }
            }
            if is_space && !word.is_empty() {
                out.push(Piece::Word(std::mem::take(&mut word), word_width));
                word_width = 0;
            }
            run_is_space = is_space;
            run.push(if is_space { ' ' } else { ch });
        }

        if !run.is_empty() {
            if run_is_space {
                if !word.is_empty() {
                    out.push(Piece::Word(std::mem::take(&mut word), word_width));
                    word_width = 0;
                }
                let width = display_width(&run);
                out.push(Piece::Space(run, style, width));
            } else {
                word_width += display_width(&run);
                word.push((run, style));
            }
        }
    }
    if !word.is_empty() {
        out.push(Piece::Word(word, word_width));
    }
    out
}

struct LineBuilder {
    lines: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    width: usize,
    max: usize,
}

impl LineBuilder {
    fn break_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.width = 0;
    }

    /// Append text, merging into the previous span when the style matches.
    fn push(&mut self, text: String, style: Style, width: usize) {
        match self.current.last_mut().filter(|last| last.style == style) {
            Some(last) => last.content.to_mut().push_str(&text),
            None => self.current.push(Span::styled(text, style)),
        }
        self.width += width;
    }

    /// Place a word longer than the line, character by character.
    fn push_hard(&mut self, segments: Vec<(String, Style)>) {
        for (text, style) in segments {
            let mut chunk = String::new();
            let mut chunk_width = 0usize;
            for ch in text.chars() {
                let cw = ch.width().unwrap_or(0);
                if self.width + chunk_width + cw > self.max && self.width + chunk_width > 0 {
                    if !chunk.is_empty() {
                        self.push(std::mem::take(&mut chunk), style, chunk_width);
                        chunk_width = 0;
                    }
                    self.break_line();
                }
                chunk.push(ch);
                chunk_width += cw;
            }
            if !chunk.is_empty() {
                self.push(chunk, style, chunk_width);
            }
        }
    }
}

/// Greedy word wrap. Always returns at least one (possibly empty) line.
pub fn wrap_spans(spans: &[Span<'static>], max_width: usize) -> Vec<Vec<Span<'static>>> {
    let max = max_width.max(1);
    let mut builder = LineBuilder {
        lines: Vec::new(),
        current: Vec::new(),
        width: 0,
        max,
    };
    let mut pending_space: Option<(String, Style, usize)> = None;

    for piece in pieces(spans) {
        match piece {
            Piece::Space(text, style, width) => {
                if builder.width > 0 {
                    pending_space = Some((text, style, width));
                }
            }
            Piece::Word(segments, word_width) => {
                let space_width = pending_space.as_ref().map_or(0, |(_, _, w)| *w);
                if builder.width + space_width + word_width <= max {
                    if let Some((text, style, width)) = pending_space.take() {
                        builder.push(text, style, width);
                    }
                    for (text, style) in segments {
                        let width = display_width(&text);
                        builder.push(text, style, width);
                    }
                    continue;
                }

                pending_space = None;
                if builder.width > 0 {
                    builder.break_line();
                }
                if word_width <= max {
                    for (text, style) in segments {
                        let width = display_width(&text);
                        builder.push(text, style, width);
                    }
                } else {
                    builder.push_hard(segments);
                }
            }
        }
    }

    if !builder.current.is_empty() || builder.lines.is_empty() {
        builder.break_line();
    }
    builder.lines
}

/// Wrap spans behind a prefix: `first` on the first line, `rest` after.
pub fn wrap_with_prefix(
    spans: &[Span<'static>],
    first: &[Span<'static>],
    rest: &[Span<'static>],
    max_width: usize,
) -> Vec<Line<'static>> {
    let width_of = |prefix: &[Span<'static>]| -> usize {
        prefix.iter().map(|span| display_width(&span.content)).sum()
    };
    let prefix_width = width_of(first)
        .max(width_of(rest))
        .min(max_width.saturating_sub(1));
    let body_width = max_width.saturating_sub(prefix_width).max(1);

    wrap_spans(spans, body_width)
        .into_iter()
        .enumerate()
        .map(|(index, body)| {
            let prefix = if index == 0 { first } else { rest };
            let mut line: Vec<Span<'static>> = prefix.to_vec();
            line.extend(body);
            Line::from(line)
        })
        .collect()
}

/// Wrap multi-line plain text in a single style.
pub fn wrap_text(text: &str, style: Style, max_width: usize) -> Vec<Line<'static>> {
    text.split('\n')
        .flat_map(|line| {
            wrap_spans(&[Span::styled(line.to_string(), style)], max_width)
                .into_iter()
                .map(Line::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Modifier};

    fn text_of(lines: &[Vec<Span<'static>>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let wrapped = wrap_spans(&[Span::raw("the Lord is my shepherd")], 10);
        assert_eq!(text_of(&wrapped), vec!["the Lord", "is my", "shepherd"]);
    }

    #[test]
    fn long_words_are_hard_broken() {
        let wrapped = wrap_spans(&[Span::raw("Mahershalalhashbaz fled")], 8);
        assert_eq!(text_of(&wrapped), vec!["Mahersha", "lalhashb", "az fled"]);
    }

    #[test]
    fn styled_punctuation_stays_with_word() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let spans = vec![
            Span::raw("see "),
            Span::styled("John 3:16", bold),
            Span::raw(", which"),
        ];
        let wrapped = wrap_spans(&spans, 10);
        assert_eq!(text_of(&wrapped), vec!["see John", "3:16,", "which"]);
        assert_eq!(wrapped[1][0].style, bold);
    }

    #[test]
    fn empty_input_yields_one_empty_line() {
        assert_eq!(wrap_spans(&[], 20).len(), 1);
        assert_eq!(wrap_text("a\n\nb", Style::default(), 20).len(), 3);
    }

    #[test]
    fn wide_characters_count_double() {
        let wrapped = wrap_spans(&[Span::raw("平安 平安")], 5);
        assert_eq!(text_of(&wrapped), vec!["平安", "平安"]);
    }

    #[test]
    fn prefix_repeats_on_continuation_lines() {
        let style = Style::default().fg(Color::Gray);
        let lines = wrap_with_prefix(
            &[Span::raw("one two three")],
            &[Span::styled("- ", style)],
            &[Span::raw("  ")],
            9,
        );
        let rendered: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(rendered, vec!["- one two", "  three"]);
    }
}
