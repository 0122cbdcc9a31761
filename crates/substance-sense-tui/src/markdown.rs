//! Markdown to styled terminal lines
//!
//! Replies from the prediction backend are markdown produced by an LLM: bold
//! headings, bullet lists, emphasis, and a closing rule with an italic
//! disclaimer. This walks the pulldown-cmark event stream and turns it into
//! ratatui `Line`s that the transcript paragraph can wrap.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const RULE_WIDTH: usize = 40;

pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        renderer.handle(event);
    }
    renderer.finish()
}

fn heading_style(level: HeadingLevel) -> Style {
    let base = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => base,
        _ => base.add_modifier(Modifier::ITALIC),
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Green)
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    // One entry per open list; Some(n) is the next number of an ordered list
    lists: Vec<Option<u64>>,
    in_code_block: bool,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => {
                for line in text.lines() {
                    self.lines.push(Line::from(Span::styled(format!("  {line}"), code_style())));
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                let style = self.current_style();
                self.spans.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                self.spans.push(Span::styled(code.into_string(), code_style()));
            }
            Event::SoftBreak => {
                let style = self.current_style();
                self.spans.push(Span::styled(" ", style));
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.blank_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank_line();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.blank_line();
                self.styles.push(heading_style(level));
            }
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::List(start) => {
                // Nested list: close the parent item's text line first
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::styled(
                    format!("{}{}", "  ".repeat(depth), marker),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.styles.pop();
                self.blank_line();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank_line();
            }
            _ => {}
        }
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        self.styles.push(Style::default().add_modifier(modifier));
    }

    fn current_style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    // At most one blank line between blocks, none at the top
    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn plain_lines(text: &str) -> Vec<String> {
        render_markdown(text).iter().map(plain).collect()
    }

    #[test]
    fn test_bold_markers_become_style() {
        let lines = render_markdown("The predicted overdose probability is **67%**.");
        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "The predicted overdose probability is 67%.");

        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "67%")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_bullet_list() {
        let lines = plain_lines("* **Age:** 23\n* **Location:** Fort Richmond\n");
        assert_eq!(lines, ["• Age: 23", "• Location: Fort Richmond"]);
    }

    #[test]
    fn test_ordered_and_nested_lists() {
        let lines = plain_lines("1. Low\n2. Medium\n   - alcohol\n3. High\n");
        assert_eq!(lines, ["1. Low", "2. Medium", "  • alcohol", "3. High"]);
    }

    #[test]
    fn test_heading_is_own_line_and_styled() {
        let lines = render_markdown("## Confidence Level\nThe confidence level is Medium.");
        assert_eq!(plain(&lines[0]), "Confidence Level");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(plain(&lines[1]), "");
        assert_eq!(plain(&lines[2]), "The confidence level is Medium.");
    }

    #[test]
    fn test_soft_breaks_join_paragraph() {
        let lines = plain_lines("Age: 23\nLocation: Fort Richmond\n\nOverdose Probability");
        assert_eq!(lines, ["Age: 23 Location: Fort Richmond", "", "Overdose Probability"]);
    }

    #[test]
    fn test_rule_and_italic_disclaimer() {
        let lines = render_markdown("Summary.\n\n---\n\n*This analysis is based solely on the provided data.*");
        let texts: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(texts[0], "Summary.");
        assert_eq!(texts[2], "─".repeat(RULE_WIDTH));
        let disclaimer = lines.last().unwrap();
        assert!(disclaimer.spans[0].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_unclosed_bold_stays_literal() {
        assert_eq!(plain_lines("risk is **high"), ["risk is **high"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(render_markdown("").is_empty());
    }
}
