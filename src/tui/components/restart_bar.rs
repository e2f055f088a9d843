//! # RestartBar Component
//!
//! The "start over" control shown after a conversation ends.
//!
//! Visible: a button the user can click, or trigger with Enter / Ctrl+N.
//! Pending: dimmed while the reset request is in flight.
//! Hidden: takes no space at all (see [`RestartBar::height`]).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::RestartControl;
use crate::tui::component::Component;

pub struct RestartBar {
    pub control: RestartControl,
}

impl RestartBar {
    pub fn new(control: RestartControl) -> Self {
        Self { control }
    }

    /// Rows this bar occupies in the layout.
    pub fn height(control: RestartControl) -> u16 {
        match control {
            RestartControl::Hidden => 0,
            RestartControl::Visible | RestartControl::Pending => 1,
        }
    }

    fn line(&self) -> Line<'static> {
        match self.control {
            RestartControl::Hidden => Line::default(),
            RestartControl::Visible => Line::from(vec![
                Span::styled(
                    "[ ↻ Restart ]",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  Enter or Ctrl+N", Style::default().fg(Color::DarkGray)),
            ]),
            RestartControl::Pending => Line::from(Span::styled(
                "[ Restarting... ]",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )),
        }
    }
}

impl Component for RestartBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(self.line().centered(), area);
    }
}
