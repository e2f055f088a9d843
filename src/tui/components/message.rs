use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::links::{TextRun, linkify};
use crate::core::state::{Bubble, OptionGroup, Source};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders one chat bubble and its option buttons.
///
/// # Design
///
/// `Message` is a **transient component**: it's created fresh each frame with the
/// data it needs. Which option is highlighted is tracked by the parent and passed
/// in as `focused_option`.
///
/// # Layout
///
/// ```text
/// ╭Erica (Agent)──────────────╮
/// │ Are you a smoker?          │   body, wrapped
/// │ [ 1. Yes ]                 │   one row per option
/// │ [ 2. No ]                  │
/// ╰────────────────────────────╯
/// ```
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height with
/// `textwrap` options matching Ratatui's `Paragraph` wrapping, so `MessageList`
/// can lay out the scroll canvas without rendering every bubble.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub bubble: &'a Bubble,
    pub agent_name: &'a str,
    /// Index of the highlighted option, if this bubble holds the active group
    pub focused_option: Option<usize>,
}

impl<'a> Message<'a> {
    pub fn new(bubble: &'a Bubble, agent_name: &'a str, focused_option: Option<usize>) -> Self {
        Self {
            bubble,
            agent_name,
            focused_option,
        }
    }

    /// Calculate the height required for this bubble given a width.
    ///
    /// The wrapping options must match the Ratatui default for `Paragraph`
    /// so calculated and actual heights agree.
    pub fn calculate_height(bubble: &Bubble, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Terminal too narrow for borders + padding
            return 1;
        }

        let rows = body_rows(&bubble.body, content_width) + option_count(bubble);
        rows.max(1) + VERTICAL_OVERHEAD
    }

    /// Which option sits on `row` (0 = top border) of a bubble rendered at `width`.
    pub fn option_at(bubble: &Bubble, width: u16, row: u16) -> Option<usize> {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return None;
        }
        let first = 1 + body_rows(&bubble.body, content_width);
        let index = row.checked_sub(first)? as usize;
        (index < option_count(bubble) as usize).then_some(index)
    }
}

fn body_rows(body: &str, content_width: u16) -> u16 {
    let body = body.trim();
    if body.is_empty() {
        return 0;
    }
    let options = textwrap::Options::new(content_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    textwrap::wrap(body, options).len() as u16
}

fn option_count(bubble: &Bubble) -> u16 {
    bubble.options.as_ref().map_or(0, |g| g.options.len() as u16)
}

fn source_style(source: Source) -> Style {
    match source {
        Source::Bot => Style::default().fg(Color::Blue),
        Source::User => Style::default().fg(Color::Green),
    }
}

fn option_style(group: &OptionGroup, focused: bool) -> Style {
    if group.disabled {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    } else if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

/// Body lines with URLs styled as links (bot bubbles only).
fn body_lines(bubble: &Bubble) -> Vec<Line<'_>> {
    let link_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED);

    bubble
        .body
        .trim()
        .lines()
        .map(|line| match bubble.source {
            Source::User => Line::raw(line),
            Source::Bot => Line::from(
                linkify(line)
                    .into_iter()
                    .map(|run| match run {
                        TextRun::Plain(text) => Span::raw(text),
                        TextRun::Link(url) => Span::styled(url, link_style),
                    })
                    .collect::<Vec<_>>(),
            ),
        })
        .collect()
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = source_style(self.bubble.source);
        let title = match self.bubble.source {
            Source::Bot => format!("{} (Agent)", self.agent_name),
            Source::User => "You".to_string(),
        };
        let border_style = style.add_modifier(Modifier::DIM);

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);

        let body_height = body_rows(&self.bubble.body, inner.width).min(inner.height);
        if body_height > 0 {
            let body_area = Rect { height: body_height, ..inner };
            Paragraph::new(body_lines(self.bubble))
                .style(style)
                .wrap(Wrap { trim: true })
                .render(body_area, buf);
        }

        let Some(group) = &self.bubble.options else {
            return;
        };
        for (i, option) in group.options.iter().enumerate() {
            let y = inner.y + body_height + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let focused = !group.disabled && self.focused_option == Some(i);
            let row = Rect { y, height: 1, ..inner };
            Paragraph::new(format!("[ {} ]", option.caption()))
                .style(option_style(group, focused))
                .render(row, buf);
        }
    }
}
