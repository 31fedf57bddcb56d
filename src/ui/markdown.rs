//! Markdown rendering for legacy free-text reviews and static pages.
//!
//! pulldown-cmark does the parsing. [`RenderState`] walks its events with a
//! stack of inline styles and the enclosing block context, styles text word by
//! word, and wraps each finished block to the terminal width.

use console::{Style, style};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use super::code::render_code_block;

/// Prose is never wrapped narrower than this.
const MIN_WIDTH: usize = 20;
/// Longest horizontal rule drawn.
const RULE_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inline {
    Heading,
    Strong,
    Emphasis,
    Strikethrough,
    Link,
}

impl Inline {
    fn apply(self, style: Style) -> Style {
        match self {
            Inline::Heading => style.cyan().bold(),
            Inline::Strong => style.bold(),
            Inline::Emphasis => style.italic(),
            Inline::Strikethrough => style.strikethrough(),
            Inline::Link => style.blue().underlined(),
        }
    }
}

#[derive(Debug)]
struct ListLevel {
    /// Next number for ordered lists.
    next: Option<u64>,
    /// Width of the current item's marker, for continuation lines.
    hang: usize,
}

struct RenderState {
    width: usize,
    out: String,
    /// Styled text of the block being built.
    buffer: String,
    inline: Vec<Inline>,
    lists: Vec<ListLevel>,
    /// Marker of an item whose first line is not written yet.
    marker: Option<String>,
    quote_depth: usize,
    /// Language and body of an open code block.
    code: Option<(String, String)>,
    /// Destination and visible text of an open link.
    link: Option<(String, String)>,
    needs_blank: bool,
}

impl RenderState {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            out: String::new(),
            buffer: String::new(),
            inline: Vec::new(),
            lists: Vec::new(),
            marker: None,
            quote_depth: 0,
            code: None,
            link: None,
            needs_blank: false,
        }
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => self.rule(),
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.start_block();
                }
            }
            Tag::Heading { .. } => {
                self.flush();
                self.start_block();
                self.inline.push(Inline::Heading);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.start_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.start_block();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                self.flush();
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(ListLevel {
                    next: start,
                    hang: 0,
                });
            }
            Tag::Item => {
                self.flush();
                if let Some(level) = self.lists.last_mut() {
                    let marker = match level.next.as_mut() {
                        Some(n) => {
                            let marker = format!("{}. ", n);
                            *n += 1;
                            marker
                        }
                        None => "• ".to_string(),
                    };
                    level.hang = marker.chars().count();
                    self.marker = Some(marker);
                }
            }
            Tag::Emphasis => self.inline.push(Inline::Emphasis),
            Tag::Strong => self.inline.push(Inline::Strong),
            Tag::Strikethrough => self.inline.push(Inline::Strikethrough),
            Tag::Link { dest_url, .. } => {
                self.inline.push(Inline::Link);
                self.link = Some((dest_url.to_string(), String::new()));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Heading(_) => {
                self.pop_inline(Inline::Heading);
                self.flush();
                self.needs_blank = true;
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.needs_blank = true;
            }
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis => self.pop_inline(Inline::Emphasis),
            TagEnd::Strong => self.pop_inline(Inline::Strong),
            TagEnd::Strikethrough => self.pop_inline(Inline::Strikethrough),
            TagEnd::Link => self.end_link(),
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.inline
            .iter()
            .fold(Style::new(), |acc, inline| inline.apply(acc))
    }

    fn pop_inline(&mut self, kind: Inline) {
        if let Some(pos) = self.inline.iter().rposition(|i| *i == kind) {
            self.inline.remove(pos);
        }
    }

    /// Append `text` styled word by word, so a wrapped line never carries
    /// half of a styled run.
    fn push_styled(&mut self, text: &str, style: &Style) {
        let words: Vec<String> = text
            .split(' ')
            .map(|word| {
                if word.is_empty() {
                    String::new()
                } else {
                    style.apply_to(word).to_string()
                }
            })
            .collect();
        self.buffer.push_str(&words.join(" "));
        if let Some((_, visible)) = self.link.as_mut() {
            visible.push_str(text);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, body)) = self.code.as_mut() {
            body.push_str(text);
            return;
        }
        let style = self.current_style();
        self.push_styled(text, &style);
    }

    fn inline_code(&mut self, code: &str) {
        let style = self.current_style().yellow();
        self.push_styled(code, &style);
    }

    fn end_link(&mut self) {
        self.pop_inline(Inline::Link);
        if let Some((url, visible)) = self.link.take()
            && !url.is_empty()
            && url != visible
        {
            self.buffer
                .push_str(&format!(" {}", style(format!("({})", url)).dim()));
        }
    }

    fn end_code_block(&mut self) {
        let Some((language, body)) = self.code.take() else {
            return;
        };
        self.marker = None;
        let pad = self.continuation();
        for line in render_code_block(body.trim_end_matches('\n'), &language).lines() {
            self.out.push_str(&pad);
            self.out.push_str(line);
            self.out.push('\n');
        }
        self.needs_blank = self.lists.is_empty();
    }

    fn rule(&mut self) {
        self.flush();
        self.start_block();
        let rule = "─".repeat(self.width.min(RULE_WIDTH));
        self.out
            .push_str(&format!("{}{}\n", self.quote_prefix(), style(rule).dim()));
        self.needs_blank = true;
    }

    fn start_block(&mut self) {
        if self.needs_blank && self.lists.is_empty() {
            self.out.push_str(&self.quote_prefix());
            self.out.push('\n');
        }
        self.needs_blank = false;
    }

    fn quote_prefix(&self) -> String {
        style("│ ").dim().to_string().repeat(self.quote_depth)
    }

    /// Prefix for lines that continue the current block.
    fn continuation(&self) -> String {
        let hang = self.lists.last().map_or(0, |level| level.hang);
        format!(
            "{}{}{}",
            self.quote_prefix(),
            "  ".repeat(self.lists.len()),
            " ".repeat(hang)
        )
    }

    /// Wrap the buffered block into the output.
    fn flush(&mut self) {
        let text = std::mem::take(&mut self.buffer);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let rest = self.continuation();
        let first = match self.marker.take() {
            Some(marker) => format!(
                "{}{}{}",
                self.quote_prefix(),
                "  ".repeat(self.lists.len()),
                marker
            ),
            None => rest.clone(),
        };
        let options = textwrap::Options::new(self.width)
            .initial_indent(&first)
            .subsequent_indent(&rest);
        for line in textwrap::wrap(text, options) {
            self.out.push_str(&line);
            self.out.push('\n');
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.end_code_block();
        self.out
    }
}

/// Render markdown `text` for a terminal `width` columns wide.
pub fn render_markdown(text: &str, width: usize) -> String {
    let mut state = RenderState::new(width);
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        state.handle_event(event);
    }
    state.finish()
}
