//! # InputBox Component
//!
//! Where the user types free-text answers.
//!
//! ## Responsibilities
//!
//! - Capture text input, paste, and basic cursor movement
//! - Emit `Submit` on Enter
//! - Show the placeholder while empty
//! - Refuse all input while locked (pending reply, option choice, or restart)
//! - Grow with its content up to `MAX_VISIBLE_LINES`, then scroll
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `placeholder` and `locked` are
//! props synced from the App lock state every frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Left + right borders
const HORIZONTAL_OVERHEAD: u16 = 2;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
pub const MAX_VISIBLE_LINES: u16 = 5;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Cursor position as byte offset in buffer (Internal State)
    cursor: usize,
    /// First visible wrapped line (Internal State)
    scroll_offset: u16,
    /// Shown dimmed while the buffer is empty (Prop)
    pub placeholder: String,
    /// When true, all editing is refused (Prop)
    pub locked: bool,
}

impl InputBox {
    pub fn new(placeholder: String) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            placeholder,
            locked: false,
        }
    }

    /// Height for the current buffer, clamped to
    /// `[1 + VERTICAL_OVERHEAD, MAX_VISIBLE_LINES + VERTICAL_OVERHEAD]`.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let width = inner_width(area_width);
        let (cursor_row, _) = cursor_cell(&self.buffer[..self.cursor], width);
        let rows = (visual_lines(&self.buffer, width).len() as u16).max(cursor_row + 1);
        rows.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Moves to the same char column on the previous (`up`) or next logical line.
    fn move_vertical(&mut self, up: bool) -> bool {
        let line_start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
        let column = self.buffer[line_start..self.cursor].chars().count();

        let target_start = if up {
            if line_start == 0 {
                return false;
            }
            self.buffer[..line_start - 1].rfind('\n').map_or(0, |i| i + 1)
        } else {
            match self.buffer[self.cursor..].find('\n') {
                Some(i) => self.cursor + i + 1,
                None => return false,
            }
        };

        let target_line = self.buffer[target_start..]
            .split('\n')
            .next()
            .unwrap_or_default();
        let offset = target_line
            .char_indices()
            .nth(column)
            .map_or(target_line.len(), |(i, _)| i);
        self.cursor = target_start + offset;
        true
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map_or(self.buffer.len(), |c| self.cursor + c.len_utf8())
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        let (cursor_row, cursor_col) = cursor_cell(&self.buffer[..self.cursor], width);

        // Keep the cursor row inside the viewport
        if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if cursor_row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = cursor_row + 1 - MAX_VISIBLE_LINES;
        }

        let border_style = if self.locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title("Message");

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(self.placeholder.as_str()).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let visible: Vec<&str> = visual_lines(&self.buffer, width)
                .into_iter()
                .skip(self.scroll_offset as usize)
                .take(MAX_VISIBLE_LINES as usize)
                .collect();
            Paragraph::new(visible.join("\n")).style(Style::default().fg(Color::Green))
        };

        frame.render_widget(paragraph.block(block), area);

        if !self.locked {
            let x = area.x + 1 + cursor_col;
            let y = area.y + 1 + cursor_row.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.locked {
            return None;
        }

        match event {
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut tmp));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = self.prev_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = self.next_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorUp => self.move_vertical(true).then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .move_vertical(false)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map_or(0, |i| i + 1);
                (self.cursor != line_start).then(|| {
                    self.cursor = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                (self.cursor != line_end).then(|| {
                    self.cursor = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll_offset = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}

fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Hard-wraps one logical line at `width` display columns.
fn hard_wrap(line: &str, width: u16) -> Vec<&str> {
    let width = width as usize;
    if width == 0 {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, c) in line.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > width && i > start {
            rows.push(&line[start..i]);
            start = i;
            used = 0;
        }
        used += w;
    }
    rows.push(&line[start..]);
    rows
}

/// Screen rows for `text`: logical lines, each hard-wrapped.
fn visual_lines(text: &str, width: u16) -> Vec<&str> {
    text.split('\n').flat_map(|line| hard_wrap(line, width)).collect()
}

/// (row, column) of the cell just after `before`.
fn cursor_cell(before: &str, width: u16) -> (u16, u16) {
    let rows = visual_lines(before, width);
    let row = rows.len().saturating_sub(1) as u16;
    let col: usize = rows
        .last()
        .map_or(0, |r| r.chars().map(|c| c.width().unwrap_or(0)).sum());

    // A full row pushes the cursor onto the next one
    if width > 0 && col >= width as usize {
        (row + 1, 0)
    } else {
        (row, col as u16)
    }
}
