//! Markdown rendering for model replies.
//!
//! Produces pre-wrapped ratatui lines for a given width. Lists, block
//! quotes, headings, emphasis, inline code, fenced code and rules are
//! supported; anything else degrades to plain text.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;
use crate::ui::wrap::{display_width, wrap_with_prefix};

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct MarkdownRenderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    /// Marker width of every open list item, outermost first.
    item_indents: Vec<usize>,
    pending_marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
    needs_blank: bool,
}

impl<'t> MarkdownRenderer<'t> {
    fn new(theme: &'t Theme, base: Style, width: usize) -> Self {
        Self {
            theme,
            width: width.max(1),
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            item_indents: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            in_code_block: false,
            needs_blank: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, modify: impl FnOnce(Style) -> Style) {
        let next = modify(self.style());
        self.style_stack.push(next);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        if self.quote_depth == 0 {
            return Vec::new();
        }
        vec![Span::styled(
            "│ ".repeat(self.quote_depth),
            self.theme.md_blockquote_style(),
        )]
    }

    /// Start a block, separating it from the previous one by a blank line.
    fn start_block(&mut self) {
        self.flush();
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_blank = false;
    }

    fn end_block(&mut self) {
        self.flush();
        self.needs_blank = true;
    }

    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let indent: usize = self.item_indents.iter().sum();

        let mut rest = self.quote_prefix();
        if indent > 0 {
            rest.push(Span::raw(" ".repeat(indent)));
        }
        let first = match self.pending_marker.take() {
            Some(marker) => {
                let mut first = self.quote_prefix();
                let outer = indent.saturating_sub(display_width(&marker));
                if outer > 0 {
                    first.push(Span::raw(" ".repeat(outer)));
                }
                first.push(Span::styled(marker, self.theme.md_list_marker_style()));
                first
            }
            None => rest.clone(),
        };

        let wrapped = wrap_with_prefix(&spans, &first, &rest, self.width);
        self.lines.extend(wrapped);
    }

    fn start_item(&mut self) {
        self.flush();
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        self.item_indents.push(display_width(&marker));
        self.pending_marker = Some(marker);
    }

    fn code_line(&mut self, text: &str) {
        let mut first = self.quote_prefix();
        first.push(Span::raw("    "));
        let span = Span::styled(text.to_string(), self.theme.md_inline_code_style());
        let wrapped = wrap_with_prefix(&[span], &first, &first, self.width);
        self.lines.extend(wrapped);
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.trim_end_matches('\n').split('\n') {
                self.code_line(line);
            }
            return;
        }
        self.spans.push(Span::styled(text.to_string(), self.style()));
    }

    fn render(mut self, content: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(content, options);

        for event in parser {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => {
                        if self.pending_marker.is_none() {
                            self.start_block();
                        }
                    }
                    Tag::Heading { level, .. } => {
                        self.start_block();
                        let style = self.theme.md_heading_style(heading_level(level));
                        self.style_stack.push(style);
                    }
                    Tag::BlockQuote(_) => {
                        self.start_block();
                        self.quote_depth += 1;
                        let style = self.theme.md_blockquote_style();
                        self.style_stack.push(style);
                    }
                    Tag::List(start) => {
                        if self.list_stack.is_empty() {
                            self.start_block();
                        } else {
                            self.flush();
                        }
                        self.list_stack.push(match start {
                            Some(n) => ListKind::Ordered(n),
                            None => ListKind::Unordered,
                        });
                    }
                    Tag::Item => self.start_item(),
                    Tag::CodeBlock(_) => {
                        self.start_block();
                        self.in_code_block = true;
                    }
                    Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
                    Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
                    Tag::Strikethrough => {
                        self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT))
                    }
                    Tag::Link { .. } => self.push_style(|s| s.add_modifier(Modifier::UNDERLINED)),
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Paragraph => self.end_block(),
                    TagEnd::Heading(_) => {
                        self.end_block();
                        self.pop_style();
                    }
                    TagEnd::BlockQuote(_) => {
                        self.end_block();
                        self.quote_depth = self.quote_depth.saturating_sub(1);
                        self.pop_style();
                    }
                    TagEnd::List(_) => {
                        self.flush();
                        self.list_stack.pop();
                        self.needs_blank = self.list_stack.is_empty();
                    }
                    TagEnd::Item => {
                        self.flush();
                        self.pending_marker = None;
                        self.item_indents.pop();
                        self.needs_blank = false;
                    }
                    TagEnd::CodeBlock => {
                        self.in_code_block = false;
                        self.needs_blank = true;
                    }
                    TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                        self.pop_style()
                    }
                    _ => {}
                },
                Event::Text(text) => self.text(&text),
                Event::Code(code) => {
                    let style = self.theme.md_inline_code_style();
                    self.spans.push(Span::styled(code.to_string(), style));
                }
                Event::SoftBreak => self.spans.push(Span::styled(" ", self.style())),
                Event::HardBreak => self.flush(),
                Event::Rule => {
                    self.start_block();
                    let rule = "─".repeat(self.width.min(40));
                    self.lines
                        .push(Line::from(Span::styled(rule, self.theme.muted_text_style)));
                    self.needs_blank = true;
                }
                Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
                _ => {}
            }
        }
        self.flush();
        self.lines
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Render `content` as markdown wrapped to `width` columns.
pub fn render_markdown(
    content: &str,
    theme: &Theme,
    base: Style,
    width: usize,
) -> Vec<Line<'static>> {
    let lines = MarkdownRenderer::new(theme, base, width).render(content);
    if lines.is_empty() {
        vec![Line::default()]
    } else {
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(content: &str, width: usize) -> Vec<String> {
        let theme = Theme::dark_default();
        render_markdown(content, &theme, theme.model_text_style, width)
            .iter()
            .map(|line| line.to_string())
            .collect()
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        assert_eq!(
            render("Grace to you.\n\nAnd peace.", 40),
            vec!["Grace to you.", "", "And peace."]
        );
    }

    #[test]
    fn bold_references_keep_their_style() {
        let theme = Theme::dark_default();
        let lines = render_markdown(
            "**John 3:16** For God so loved",
            &theme,
            theme.model_text_style,
            40,
        );
        let first = &lines[0].spans[0];
        assert_eq!(first.content, "John 3:16");
        assert!(first.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn list_items_get_markers_and_hanging_indent() {
        assert_eq!(
            render("- Love is patient and kind\n- Love never fails", 16),
            vec!["• Love is", "  patient and", "  kind", "• Love never", "  fails"]
        );
    }

    #[test]
    fn ordered_lists_count_from_start() {
        assert_eq!(
            render("3. Faith\n4. Hope", 20),
            vec!["3. Faith", "4. Hope"]
        );
    }

    #[test]
    fn block_quotes_are_prefixed() {
        assert_eq!(
            render("> Be still, and know", 40),
            vec!["│ Be still, and know"]
        );
    }

    #[test]
    fn list_after_paragraph_is_spaced() {
        assert_eq!(
            render("Verses on hope:\n\n- Romans 15:13", 40),
            vec!["Verses on hope:", "", "• Romans 15:13"]
        );
    }

    #[test]
    fn empty_content_renders_one_line() {
        assert_eq!(render("", 10), vec![""]);
    }
}
