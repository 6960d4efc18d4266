use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::convert::{ConvertError, Converter};

const DEFAULT_MAX_DEPTH: usize = 256;

/// Converts exported rich text into markdown.
///
/// Headings, emphasis, links, lists, quotes and line breaks survive; styling-only
/// wrappers (`span`, `font`) are dropped unless their inline style marks bold or
/// italic text. Images are ignored here, photos are placed by the entry parser.
/// Plain text passes through unchanged apart from whitespace collapsing.
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    max_depth: usize,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn visit_node(
        &self,
        node: NodeRef<'_, Node>,
        ctx: &mut MarkdownContext,
        depth: usize,
    ) -> Result<(), ConvertError> {
        if depth > self.max_depth {
            return Err(ConvertError::TooDeep {
                limit: self.max_depth,
            });
        }
        match node.value() {
            Node::Text(text) => ctx.append_text(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, ctx, depth)?;
                }
            }
            Node::Comment(_) => {}
            _ => {
                for child in node.children() {
                    self.visit_node(child, ctx, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn visit_element(
        &self,
        element: ElementRef,
        ctx: &mut MarkdownContext,
        depth: usize,
    ) -> Result<(), ConvertError> {
        let tag = element.value().name().to_ascii_lowercase();
        match tag.as_str() {
            "br" => ctx.line_break(),
            "hr" => {
                ctx.ensure_blank_line();
                ctx.push_str("---");
                ctx.ensure_blank_line();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                ctx.ensure_blank_line();
                ctx.push_str(&"#".repeat(level));
                ctx.push_str(" ");
                self.visit_children(element, ctx, depth)?;
                ctx.ensure_blank_line();
            }
            "p" | "div" | "section" | "article" | "header" | "footer" | "figure"
            | "figcaption" | "table" | "tr" | "address" => {
                ctx.ensure_blank_line();
                self.visit_children(element, ctx, depth)?;
                ctx.ensure_blank_line();
            }
            "td" | "th" => {
                self.visit_children(element, ctx, depth)?;
                ctx.append_text(" ");
            }
            "strong" | "b" => self.wrap_inline("**", element, ctx, depth)?,
            "em" | "i" | "cite" => self.wrap_inline("*", element, ctx, depth)?,
            "s" | "del" | "strike" => self.wrap_inline("~~", element, ctx, depth)?,
            "code" | "kbd" => self.wrap_inline("`", element, ctx, depth)?,
            "pre" => {
                let text: String = element.text().collect();
                ctx.ensure_blank_line();
                ctx.push_str("```\n");
                ctx.push_str(text.trim_end_matches('\n'));
                ctx.push_str("\n```");
                ctx.ensure_blank_line();
            }
            "a" => self.handle_anchor(element, ctx, depth)?,
            "ul" => self.handle_list(element, ctx, depth, None)?,
            "ol" => {
                let start = element
                    .value()
                    .attr("start")
                    .and_then(|s| s.trim().parse::<u32>().ok())
                    .unwrap_or(1);
                self.handle_list(element, ctx, depth, Some(start))?
            }
            "li" => {
                ctx.ensure_newline();
                ctx.start_item("- ");
                self.visit_children(element, ctx, depth)?;
                ctx.ensure_newline();
            }
            "blockquote" => {
                let mut inner = MarkdownContext::new();
                self.visit_children(element, &mut inner, depth)?;
                let inner = inner.into_markdown();
                if !inner.is_empty() {
                    let quoted = inner
                        .lines()
                        .map(|line| {
                            if line.is_empty() {
                                ">".to_string()
                            } else {
                                format!("> {line}")
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    ctx.ensure_blank_line();
                    ctx.push_str(&quoted);
                    ctx.ensure_blank_line();
                }
            }
            "span" | "font" => self.handle_styled_span(element, ctx, depth)?,
            "img" | "picture" | "video" | "audio" | "script" | "style" | "noscript" | "iframe"
            | "template" | "head" | "title" => {
                // media is placed by the entry parser; the rest is not content
            }
            _ => self.visit_children(element, ctx, depth)?,
        }
        Ok(())
    }

    fn visit_children(
        &self,
        element: ElementRef,
        ctx: &mut MarkdownContext,
        depth: usize,
    ) -> Result<(), ConvertError> {
        for child in element.children() {
            self.visit_node(child, ctx, depth + 1)?;
        }
        Ok(())
    }

    fn wrap_inline(
        &self,
        marker: &str,
        element: ElementRef,
        ctx: &mut MarkdownContext,
        depth: usize,
    ) -> Result<(), ConvertError> {
        let start = ctx.builder.len();
        self.visit_children(element, ctx, depth)?;
        let inner = ctx.take_from(start);
        let core = inner.trim();
        if core.is_empty() {
            ctx.append_text(&inner);
            return Ok(());
        }
        // markers hug the text; surrounding whitespace stays outside
        if inner.starts_with(char::is_whitespace) {
            ctx.append_text(" ");
        }
        ctx.push_str(marker);
        ctx.push_str(core);
        ctx.push_str(marker);
        if inner.ends_with(char::is_whitespace) {
            ctx.append_text(" ");
        }
        Ok(())
    }

    fn handle_anchor(
        &self,
        element: ElementRef,
        ctx: &mut MarkdownContext,
        depth: usize,
    ) -> Result<(), ConvertError> {
        let href = element
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| is_followable(href));
        let start = ctx.builder.len();
        self.visit_children(element, ctx, depth)?;
        let Some(href) = href else {
            return Ok(());
        };

        let inner = ctx.take_from(start);
        let text = inner.trim();
        if text.is_empty() {
            ctx.push_str(&format!("<{href}>"));
            return Ok(());
        }
        if inner.starts_with(char::is_whitespace) {
            ctx.append_text(" ");
        }
        ctx.push_str(&format!("[{text}]({href})"));
        if inner.ends_with(char::is_whitespace) {
            ctx.append_text(" ");
        }
        Ok(())
    }

    fn handle_list(
        &self,
        element: ElementRef,
        ctx: &mut MarkdownContext,
        depth: usize,
        ordered_from: Option<u32>,
    ) -> Result<(), ConvertError> {
        if ctx.list_depth == 0 {
            ctx.ensure_blank_line();
        } else {
            ctx.ensure_newline();
        }
        ctx.list_depth += 1;
        let indent = "  ".repeat(ctx.list_depth - 1);
        let mut number = ordered_from;

        for child in element.children() {
            match ElementRef::wrap(child) {
                Some(item) if item.value().name().eq_ignore_ascii_case("li") => {
                    ctx.ensure_newline();
                    let marker = match number.as_mut() {
                        Some(n) => {
                            let marker = format!("{indent}{n}. ");
                            *n += 1;
                            marker
                        }
                        None => format!("{indent}- "),
                    };
                    ctx.start_item(&marker);
                    self.visit_children(item, ctx, depth + 1)?;
                }
                _ => self.visit_node(child, ctx, depth + 1)?,
            }
        }

        ctx.list_depth -= 1;
        if ctx.list_depth == 0 {
            ctx.ensure_blank_line();
        } else {
            ctx.ensure_newline();
        }
        Ok(())
    }

    fn handle_styled_span(
        &self,
        element: ElementRef,
        ctx: &mut MarkdownContext,
        depth: usize,
    ) -> Result<(), ConvertError> {
        let style: String = element
            .value()
            .attr("style")
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let bold = ["font-weight:bold", "font-weight:600", "font-weight:700", "font-weight:800", "font-weight:900"]
            .iter()
            .any(|needle| style.contains(needle));
        let italic = style.contains("font-style:italic");
        match (bold, italic) {
            (true, true) => self.wrap_inline("***", element, ctx, depth),
            (true, false) => self.wrap_inline("**", element, ctx, depth),
            (false, true) => self.wrap_inline("*", element, ctx, depth),
            (false, false) => self.visit_children(element, ctx, depth),
        }
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for MarkdownConverter {
    fn to_markdown(&self, html: &str) -> Result<String, ConvertError> {
        let fragment = Html::parse_fragment(html);
        let mut ctx = MarkdownContext::new();
        for child in fragment.root_element().children() {
            self.visit_node(child, &mut ctx, 0)?;
        }
        Ok(ctx.into_markdown())
    }
}

fn is_followable(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    !(href.is_empty() || lower.starts_with('#') || lower.starts_with("javascript:"))
}

struct MarkdownContext {
    builder: String,
    last_char: Option<char>,
    list_depth: usize,
    at_item_start: bool,
}

impl MarkdownContext {
    fn new() -> Self {
        Self {
            builder: String::new(),
            last_char: None,
            list_depth: 0,
            at_item_start: false,
        }
    }

    fn into_markdown(self) -> String {
        self.builder.trim().to_string()
    }

    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char, None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_char(ch);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
        self.at_item_start = false;
    }

    /// Writes a list marker; block separators are suppressed until the item has text.
    fn start_item(&mut self, marker: &str) {
        self.push_str(marker);
        self.at_item_start = true;
    }

    fn line_break(&mut self) {
        if self.builder.is_empty() || self.builder.ends_with("\n\n") {
            return;
        }
        self.trim_trailing_spaces();
        self.push_char('\n');
    }

    fn ensure_newline(&mut self) {
        if self.builder.is_empty() || self.at_item_start || self.last_char == Some('\n') {
            return;
        }
        self.trim_trailing_spaces();
        self.push_char('\n');
    }

    fn ensure_blank_line(&mut self) {
        if self.builder.is_empty() || self.at_item_start {
            return;
        }
        self.trim_trailing_spaces();
        while !self.builder.ends_with("\n\n") {
            self.push_char('\n');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.builder.trim_end_matches([' ', '\t']).len();
        self.builder.truncate(trimmed);
        self.last_char = self.builder.chars().last();
    }

    /// Removes and returns everything written since `start`.
    fn take_from(&mut self, start: usize) -> String {
        let taken = self.builder.split_off(start);
        self.last_char = self.builder.chars().last();
        taken
    }
}
