//! # MessageList Component
//!
//! Scrollable view of the conversation transcript.
//!
//! ## Responsibilities
//!
//! - Display the bubbles, with option buttons under bot bubbles
//! - Show the animated "is typing" row while a reply is pending
//! - Keep the newest bubble in view unless the user scrolled away
//! - Hit testing for option clicks
//! - Cache bubble heights between frames
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the transcript (props).
//!
//! Since `Component::render` takes `&mut self`, we can safely mutate the state
//! (including layout cache and scroll state) during the render pass, aligning
//! with Ratatui's `StatefulWidget` pattern.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::Bubble;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

/// Rows reserved under the last bubble for the typing indicator.
const TYPING_ROW_HEIGHT: u16 = 1;
const TYPING_FRAMES: [&str; 4] = ["", ".", "..", "..."];
/// Spinner ticks per typing-dot frame.
const TICKS_PER_DOT: usize = 3;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Rows drawn below the last bubble (typing indicator)
    trailing_rows: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            trailing_rows: 0,
        }
    }

    fn content_height(&self) -> u16 {
        self.layout.total_height() + self.trailing_rows
    }

    fn max_offset(&self) -> u16 {
        self.content_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// True when the user has scrolled up and there is content below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }

    /// Forget scroll position and cached heights (transcript was cleared).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Maps a row inside the list area to `(entry, option)` when it lands on
    /// an option button. Uses the layout from the last render.
    pub fn hit_test(&self, transcript: &[Bubble], row: u16) -> Option<(usize, usize)> {
        let offset = self.scroll_state.offset().y.min(self.max_offset());
        let content_y = offset.saturating_add(row);
        let prefix = &self.layout.prefix_heights;
        let entry = prefix.partition_point(|&end| end <= content_y);
        if entry >= prefix.len() {
            return None;
        }
        let bubble = transcript.get(entry)?;

        let top = if entry == 0 { 0 } else { prefix[entry - 1] };
        let option = Message::option_at(bubble, self.layout.content_width, content_y - top)?;
        Some((entry, option))
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub transcript: &'a [Bubble],
    pub agent_name: &'a str,
    pub is_typing: bool,
    /// Conversation epoch; a change means the transcript was replaced
    pub epoch: u64,
    /// Highlighted `(entry, option)`, if any
    pub focus: Option<(usize, usize)>,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        transcript: &'a [Bubble],
        agent_name: &'a str,
        is_typing: bool,
        epoch: u64,
    ) -> Self {
        Self {
            state,
            transcript,
            agent_name,
            is_typing,
            epoch,
            focus: None,
            spinner_frame: 0,
        }
    }

    pub fn focus(mut self, focus: Option<(usize, usize)>) -> Self {
        self.focus = focus;
        self
    }

    pub fn spinner_frame(mut self, frame: usize) -> Self {
        self.spinner_frame = frame;
        self
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let count = self.transcript.len();

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(count, content_width, self.epoch);
        layout.heights.truncate(reusable);
        for bubble in self.transcript.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(Message::calculate_height(bubble, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(count, content_width, self.epoch);

        let total_height = self.state.layout.total_height();
        self.state.trailing_rows = if self.is_typing { TYPING_ROW_HEIGHT } else { 0 };
        let canvas_height = total_height + self.state.trailing_rows;

        // 2. Clamp scroll offset to prevent overscrolling past content
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = if self.state.stick_to_bottom {
            self.state.max_offset()
        } else {
            self.state.scroll_state.offset().y
        };
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible bubbles into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let bubble = &self.transcript[i];
            let height = self.state.layout.heights[i];
            let focused_option = self
                .focus
                .and_then(|(entry, option)| (entry == i).then_some(option));

            let message = Message::new(bubble, self.agent_name, focused_option);
            scroll_view.render_widget(message, Rect::new(0, y_offset, content_width, height));
            y_offset += height;
        }

        if self.is_typing {
            let dots = TYPING_FRAMES[(self.spinner_frame / TICKS_PER_DOT) % TYPING_FRAMES.len()];
            let indicator = Paragraph::new(format!(" {} is typing{dots}", self.agent_name)).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            scroll_view.render_widget(
                indicator,
                Rect::new(0, total_height, content_width, TYPING_ROW_HEIGHT),
            );
        }

        // Auto-scroll logic (Mutation)
        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because scrolling mutates persistent state, while `MessageList` is rebuilt
/// every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                // scroll_to_bottom may park the offset past the end
                self.clamp_scroll();
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.clamp_scroll();
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
    epoch: u64,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
            epoch: 0,
        }
    }

    /// How many cached heights are still valid. Bubbles never change size
    /// once appended, so only a resize or a cleared transcript invalidates.
    pub fn reusable_count(&self, message_count: usize, content_width: u16, epoch: u64) -> usize {
        if self.content_width != content_width || self.epoch != epoch {
            return 0;
        }
        if message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16, epoch: u64) {
        self.message_count = message_count;
        self.content_width = content_width;
        self.epoch = epoch;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::ChoiceOption;
    use crate::core::state::{OptionGroup, Source};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn text_bubble(source: Source, body: &str) -> Bubble {
        Bubble {
            source,
            body: body.into(),
            options: None,
        }
    }

    fn option_bubble(body: &str) -> Bubble {
        Bubble {
            source: Source::Bot,
            body: body.into(),
            options: Some(OptionGroup {
                options: vec![
                    ChoiceOption { key: "1".into(), label: "Yes".into() },
                    ChoiceOption { key: "2".into(), label: "No".into() },
                ],
                disabled: false,
            }),
        }
    }

    fn draw(
        state: &mut MessageListState,
        transcript: &[Bubble],
        is_typing: bool,
        size: (u16, u16),
    ) -> String {
        let mut terminal = Terminal::new(TestBackend::new(size.0, size.1)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, transcript, "Erica", is_typing, 0).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3; 5];
        cache.update_metadata(5, 80, 0);

        // Same everything → all reusable
        assert_eq!(cache.reusable_count(5, 80, 0), 5);
        // New bubble appended → cached ones still valid
        assert_eq!(cache.reusable_count(6, 80, 0), 5);
        // Width changed → nothing reusable
        assert_eq!(cache.reusable_count(5, 40, 0), 0);
        // Transcript shrank → nothing reusable
        assert_eq!(cache.reusable_count(2, 80, 0), 0);
        // New conversation with as many bubbles → nothing reusable
        assert_eq!(cache.reusable_count(5, 80, 1), 0);
    }

    #[test]
    fn test_visible_range_skips_offscreen() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 10];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total_height(), 100);

        let range = cache.visible_range(50, 10);
        assert!(range.start >= 3 && range.end <= 8, "got {range:?}");
        assert!(range.contains(&5));
    }

    #[test]
    fn renders_bubbles_and_typing_indicator() {
        let mut state = MessageListState::new();
        let transcript = vec![
            text_bubble(Source::Bot, "Hello, I'm Erica"),
            text_bubble(Source::User, "John"),
        ];
        let text = draw(&mut state, &transcript, true, (40, 12));
        assert!(text.contains("Hello, I'm Erica"));
        assert!(text.contains("John"));
        assert!(text.contains("Erica is typing"));
    }

    #[test]
    fn no_typing_row_when_idle() {
        let mut state = MessageListState::new();
        let transcript = vec![text_bubble(Source::Bot, "Hi")];
        let text = draw(&mut state, &transcript, false, (40, 8));
        assert!(!text.contains("is typing"));
    }

    #[test]
    fn hit_test_finds_option_rows() {
        let mut state = MessageListState::new();
        let transcript = vec![text_bubble(Source::User, "hello"), option_bubble("Pick one:")];
        draw(&mut state, &transcript, false, (40, 20));

        // Bubble 0 occupies rows 0..3; bubble 1 has border, body, then options
        assert_eq!(state.hit_test(&transcript, 0), None);
        assert_eq!(state.hit_test(&transcript, 4), None);
        assert_eq!(state.hit_test(&transcript, 5), Some((1, 0)));
        assert_eq!(state.hit_test(&transcript, 6), Some((1, 1)));
        assert_eq!(state.hit_test(&transcript, 7), None);
        assert_eq!(state.hit_test(&transcript, 15), None);
    }

    #[test]
    fn scrolling_up_unpins_and_down_repins() {
        let mut state = MessageListState::new();
        let transcript: Vec<Bubble> = (0..10)
            .map(|i| text_bubble(Source::Bot, &format!("line {i}")))
            .collect();
        draw(&mut state, &transcript, false, (30, 6));
        assert!(!state.has_unseen_content());

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        assert!(state.has_unseen_content());

        for _ in 0..50 {
            state.handle_event(&TuiEvent::ScrollDown);
        }
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn reset_forgets_layout() {
        let mut state = MessageListState::new();
        draw(&mut state, &[text_bubble(Source::Bot, "Hi")], false, (30, 6));
        assert!(!state.layout.heights.is_empty());
        state.reset();
        assert!(state.layout.heights.is_empty());
        assert!(state.stick_to_bottom);
    }
}
