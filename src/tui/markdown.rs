//! Markdown → ratatui `Text` renderer for bot replies.
//!
//! Walks `pulldown_cmark` events and emits styled `Line`/`Span` values:
//! headings, emphasis, inline code, fenced code (highlighted with syntect),
//! lists, blockquotes, links and images. A terminal cannot show the
//! generated images themselves, so each one becomes a placeholder line that
//! points at the preview overlay.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

/// Parse markdown into styled, owned `Text`.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        renderer.handle(event);
    }
    renderer.out
}

fn frame_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

/// Fenced code state: highlighted when the language is known.
enum CodeBlock {
    Highlighted(Box<HighlightLines<'static>>),
    Plain,
}

struct Renderer {
    out: Text<'static>,
    base_fg: Color,
    /// Inline styles; each entry is already patched onto its parent
    styles: Vec<Style>,
    /// Prefixes repeated at the start of every line (quote bars, code gutter)
    gutters: Vec<Span<'static>>,
    /// One entry per open list: None = bullets, Some(n) = next number
    lists: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    link_url: Option<String>,
    /// Alt text collected while inside an image
    image_alt: Option<String>,
    pending_gap: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            out: Text::default(),
            base_fg,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            code: None,
            link_url: None,
            image_alt: None,
            pending_gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn new_line(&mut self, mut line: Line<'static>) {
        for gutter in self.gutters.iter().rev() {
            line.spans.insert(0, gutter.clone());
        }
        self.out.lines.push(line);
    }

    fn append(&mut self, span: Span<'static>) {
        match self.out.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    fn gap(&mut self) {
        if self.pending_gap {
            self.new_line(Line::default());
            self.pending_gap = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.append(Span::styled(
                c.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.gap();
                self.new_line(Line::from(Span::styled("─".repeat(40), frame_style())));
                self.pending_gap = true;
            }
            Event::TaskListMarker(done) => {
                self.append(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.gap();
                self.new_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.gap();
                let style = heading_style(self.base_fg, level);
                self.new_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(heading_depth(level))),
                    style,
                )));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.gap();
                self.gutters.push(Span::styled("│ ", frame_style()));
                self.push_style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => self.open_code(kind),
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}- "),
                };
                self.append(Span::styled(marker, frame_style()));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            Tag::Image { .. } => self.image_alt = Some(String::new()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = true,
            TagEnd::Heading(_) | TagEnd::BlockQuote(_) => {
                if matches!(tag, TagEnd::BlockQuote(_)) {
                    self.gutters.pop();
                }
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.gutters.pop();
                self.new_line(Line::from(Span::styled("╰──", frame_style())));
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.pending_gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link_url.take() {
                    self.append(Span::raw(" ("));
                    self.append(Span::styled(url, link_style()));
                    self.append(Span::raw(")"));
                }
            }
            TagEnd::Image => {
                let alt = self.image_alt.take().unwrap_or_default();
                let label = if alt.is_empty() { "image".to_string() } else { alt };
                self.append(Span::styled(
                    format!("🖼  [{label}] (Ctrl+P to preview)"),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            _ => {}
        }
    }

    fn open_code(&mut self, kind: CodeBlockKind<'_>) {
        if !self.out.lines.is_empty() {
            self.new_line(Line::default());
        }
        let lang = match &kind {
            CodeBlockKind::Fenced(lang) => lang.as_ref(),
            CodeBlockKind::Indented => "",
        };

        let top = if lang.is_empty() {
            Line::from(Span::styled("╭──", frame_style()))
        } else {
            Line::from(vec![
                Span::styled("╭── ", frame_style()),
                Span::styled(lang.to_owned(), frame_style().add_modifier(Modifier::BOLD)),
                Span::styled(" ──", frame_style()),
            ])
        };
        self.new_line(top);
        self.gutters.push(Span::styled("│ ", frame_style()));

        let syntax = (!lang.is_empty())
            .then(|| SYNTAX_SET.find_syntax_by_token(lang))
            .flatten();
        self.code = Some(match (syntax, THEME_SET.themes.get(CODE_THEME)) {
            (Some(syntax), Some(theme)) => CodeBlock::Highlighted(Box::new(HighlightLines::new(syntax, theme))),
            _ => CodeBlock::Plain,
        });
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        if let Some(alt) = self.image_alt.as_mut() {
            alt.push_str(&text);
            return;
        }

        match self.code.take() {
            Some(CodeBlock::Highlighted(mut hl)) => {
                for line in LinesWithEndings::from(&text) {
                    let Ok(ranges) = hl.highlight_line(line, &SYNTAX_SET) else {
                        self.new_line(Line::raw(line.trim_end_matches('\n').to_owned()));
                        continue;
                    };
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .filter_map(|(style, frag)| {
                            let frag = frag.trim_end_matches('\n');
                            (!frag.is_empty()).then(|| {
                                let fg = style.foreground;
                                Span::styled(frag.to_owned(), Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)))
                            })
                        })
                        .collect();
                    self.new_line(Line::from(spans));
                }
                self.code = Some(CodeBlock::Highlighted(hl));
            }
            Some(CodeBlock::Plain) => {
                for line in text.lines() {
                    self.new_line(Line::from(Span::styled(
                        line.to_owned(),
                        Style::default().fg(Color::White),
                    )));
                }
                self.code = Some(CodeBlock::Plain);
            }
            None => {
                let style = self.style();
                self.append(Span::styled(text, style));
            }
        }
    }
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let modifier = match level {
        HeadingLevel::H1 => Modifier::BOLD | Modifier::UNDERLINED,
        HeadingLevel::H2 => Modifier::BOLD,
        _ => Modifier::BOLD | Modifier::ITALIC,
    };
    Style::default().fg(base_fg).add_modifier(modifier)
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_text_inherits_heading_style() {
        let text = render("## Hello", Color::Blue);
        let line = &text.lines[0];
        assert!(line.spans.len() >= 2);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].style.fg, Some(Color::Blue));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("Some **bold** text", Color::Blue);
        let bold = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "bold")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn code_block_has_border_structure() {
        let lines = plain(&render("```\nline1\nline2\n```", Color::Blue));
        assert!(lines[0].starts_with('╭'));
        assert!(lines[1].starts_with("│ ") && lines[1].contains("line1"));
        assert!(lines[2].starts_with("│ ") && lines[2].contains("line2"));
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn highlighted_code_keeps_content() {
        let lines = plain(&render("```rust\nfn main() {}\n```", Color::Blue));
        assert!(lines[0].contains("rust"));
        assert!(lines.iter().any(|l| l.contains("fn main() {}")));
    }

    #[test]
    fn image_becomes_placeholder() {
        let lines = plain(&render(
            "Here it is:\n\n![Generated Image](http://localhost:8000/images/a.png)",
            Color::Blue,
        ));
        let placeholder = lines
            .iter()
            .find(|l| l.contains("[Generated Image]"))
            .expect("placeholder line");
        assert!(placeholder.contains("Ctrl+P"));
        // The URL is not dumped into the transcript
        assert!(!lines.iter().any(|l| l.contains("images/a.png")));
    }

    #[test]
    fn links_show_their_target() {
        let lines = plain(&render("[docs](https://example.com)", Color::Blue));
        assert_eq!(lines[0], "docs (https://example.com)");
    }

    #[test]
    fn ordered_lists_are_numbered() {
        let lines = plain(&render("1. one\n2. two", Color::Blue));
        assert!(lines.iter().any(|l| l == "1. one"));
        assert!(lines.iter().any(|l| l == "2. two"));
    }

    #[test]
    fn tabs_expanded_to_spaces() {
        let text = render("```\n\tindented\n```", Color::Blue);
        assert!(!text.lines.iter().any(|l| l.spans.iter().any(|s| s.content.contains('\t'))));
    }
}
