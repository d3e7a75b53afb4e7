//! Markdown → Pango markup.
//!
//! The recognized text is turned into a flat list of [`Block`]s. Each block
//! carries its kind (so the window can pick a widget and CSS class) and the
//! inline content as Pango markup. The transform is a pure function of the
//! input and tolerates anything: unknown or broken syntax falls through as
//! literal text.

use std::borrow::Cow;

use gtk4::glib;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// `<|ref|>title<|/ref|><|det|>[[62, 42, 935, 85]]<|/det|>` spans emitted in
/// grounding mode. The optional trailing newline keeps headings that follow
/// the span at the start of their line.
static GROUNDING_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\|ref\|>[^<]*<\|/ref\|>\s*<\|det\|>[^<]*<\|/det\|>[ \t]*\n?")
        .expect("grounding pattern is valid")
});
static STRAY_GROUNDING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\|/?(?:ref|det|grounding)\|>").expect("tag pattern is valid"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static HTML_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row pattern is valid"));
static HTML_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<t([hd])[^>]*>(.*?)</t[hd]>").expect("cell pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    /// `marker` is `•` or `N.`; `depth` starts at 0.
    ListItem { depth: usize, marker: String },
    CodeBlock,
    Quote,
    TableRow { header: bool },
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Inline content as Pango markup.
    pub markup: String,
}

/// Remove grounding annotations, leaving the recognized content.
pub fn strip_grounding(raw: &str) -> Cow<'_, str> {
    if !raw.contains("<|") {
        return Cow::Borrowed(raw);
    }
    let without_spans = GROUNDING_SPAN.replace_all(raw, "");
    Cow::Owned(STRAY_GROUNDING_TAG.replace_all(&without_spans, "").into_owned())
}

/// Render recognized text into display blocks.
pub fn render(raw: &str) -> Vec<Block> {
    let text = strip_grounding(raw);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(&text, options) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    current: Option<Block>,
    /// Next number for each open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code: bool,
    html: String,
}

impl BlockBuilder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code {
                    self.open(BlockKind::CodeBlock).push_str(&escape(&text));
                } else {
                    self.inline(&escape(&text));
                }
            }
            Event::Code(code) => self.inline(&format!("<tt>{}</tt>", escape(&code))),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.inline(&format!("<tt>{}</tt>", escape(&math)))
            }
            Event::Html(html) => self.html.push_str(&html),
            Event::InlineHtml(html) => {
                let stripped = HTML_TAG.replace_all(&html, "");
                if !stripped.is_empty() {
                    self.inline(&escape(&stripped));
                }
            }
            Event::SoftBreak => self.inline(" "),
            Event::HardBreak => self.inline("\n"),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block {
                    kind: BlockKind::Rule,
                    markup: String::new(),
                });
            }
            Event::FootnoteReference(label) => self.inline(&format!("[{}]", escape(&label))),
            Event::TaskListMarker(done) => self.inline(if done { "☑ " } else { "☐ " }),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.current = Some(Block {
                    kind: BlockKind::Heading(level as u8),
                    markup: String::new(),
                });
            }
            Tag::Paragraph => {
                // Loose list items wrap their text in paragraphs.
                if self.in_list_item() {
                    if let Some(block) = &mut self.current {
                        if !block.markup.is_empty() {
                            block.markup.push('\n');
                        }
                    }
                } else {
                    self.flush();
                    let kind = if self.quote_depth > 0 {
                        BlockKind::Quote
                    } else {
                        BlockKind::Paragraph
                    };
                    self.current = Some(Block {
                        kind,
                        markup: String::new(),
                    });
                }
            }
            Tag::BlockQuote { .. } => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code = true;
                self.open(BlockKind::CodeBlock);
            }
            Tag::List(first) => {
                self.flush();
                self.lists.push(first);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}.");
                        *next += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.current = Some(Block {
                    kind: BlockKind::ListItem { depth, marker },
                    markup: String::new(),
                });
            }
            Tag::TableHead => {
                self.flush();
                self.open(BlockKind::TableRow { header: true });
            }
            Tag::TableRow => {
                self.flush();
                self.open(BlockKind::TableRow { header: false });
            }
            Tag::TableCell => {
                if let Some(block) = &mut self.current {
                    if !block.markup.is_empty() {
                        block.markup.push_str(" | ");
                    }
                }
            }
            Tag::Emphasis => self.inline("<i>"),
            Tag::Strong => self.inline("<b>"),
            Tag::Strikethrough => self.inline("<s>"),
            Tag::Link { .. } => self.inline("<u>"),
            Tag::HtmlBlock => {
                self.flush();
                self.html.clear();
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading { .. } | TagEnd::TableHead | TagEnd::TableRow => self.flush(),
            TagEnd::Paragraph => {
                if !self.in_list_item() {
                    self.flush();
                }
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some(block) = &mut self.current {
                    let trimmed = block.markup.trim_end_matches('\n').len();
                    block.markup.truncate(trimmed);
                }
                self.in_code = false;
                self.flush();
            }
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis => self.inline("</i>"),
            TagEnd::Strong => self.inline("</b>"),
            TagEnd::Strikethrough => self.inline("</s>"),
            TagEnd::Link => self.inline("</u>"),
            TagEnd::HtmlBlock => {
                let html = std::mem::take(&mut self.html);
                self.html_block(&html);
            }
            _ => {}
        }
    }

    fn in_list_item(&self) -> bool {
        matches!(
            self.current.as_ref().map(|b| &b.kind),
            Some(BlockKind::ListItem { .. })
        )
    }

    /// Append inline markup, opening a paragraph if text arrives outside any block.
    fn inline(&mut self, markup: &str) {
        let kind = if self.quote_depth > 0 {
            BlockKind::Quote
        } else {
            BlockKind::Paragraph
        };
        self.open(kind).push_str(markup);
    }

    fn open(&mut self, kind: BlockKind) -> &mut String {
        &mut self
            .current
            .get_or_insert_with(|| Block {
                kind,
                markup: String::new(),
            })
            .markup
    }

    fn html_block(&mut self, html: &str) {
        let mut rows = HTML_ROW.captures_iter(html).peekable();
        if rows.peek().is_none() {
            let text = HTML_TAG.replace_all(html, "");
            let text = text.trim();
            if !text.is_empty() {
                self.blocks.push(Block {
                    kind: BlockKind::Paragraph,
                    markup: escape(text),
                });
            }
            return;
        }
        for row in rows {
            let Some(body) = row.get(1) else { continue };
            let mut header = false;
            let cells: Vec<String> = HTML_CELL
                .captures_iter(body.as_str())
                .map(|cell| {
                    if cell.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("h")) {
                        header = true;
                    }
                    let content = cell.get(2).map_or("", |m| m.as_str());
                    escape(HTML_TAG.replace_all(content, "").trim())
                })
                .collect();
            if cells.is_empty() {
                continue;
            }
            self.blocks.push(Block {
                kind: BlockKind::TableRow { header },
                markup: cells.join(" | "),
            });
        }
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            close_dangling_tags(&mut block.markup);
            let keep = !block.markup.trim().is_empty()
                || matches!(block.kind, BlockKind::Rule | BlockKind::CodeBlock);
            if keep {
                self.blocks.push(block);
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        if !self.html.is_empty() {
            let html = std::mem::take(&mut self.html);
            self.flush();
            self.html_block(&html);
        }
        self.flush();
        self.blocks
    }
}

fn escape(text: &str) -> String {
    glib::markup_escape_text(text).to_string()
}

/// Pango rejects a whole label on unbalanced markup, so any inline tag left
/// open by a block boundary is closed here.
fn close_dangling_tags(markup: &mut String) {
    let mut open: Vec<&'static str> = Vec::new();
    let mut rest = markup.as_str();
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos + 1..];
        for tag in ["i", "b", "s", "tt", "u"] {
            let closing = rest
                .strip_prefix('/')
                .and_then(|r| r.strip_prefix(tag))
                .is_some_and(|r| r.starts_with('>'));
            let opening = rest
                .strip_prefix(tag)
                .is_some_and(|r| r.starts_with('>') || r.starts_with(' '));
            if opening {
                open.push(tag);
                break;
            }
            if closing {
                if let Some(idx) = open.iter().rposition(|t| *t == tag) {
                    open.remove(idx);
                }
                break;
            }
        }
    }
    for tag in open.into_iter().rev() {
        markup.push_str(&format!("</{tag}>"));
    }
}
