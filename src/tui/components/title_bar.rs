//! # TitleBar Component
//!
//! One-line header above the conversation.
//!
//! ## Responsibilities
//!
//! - Name the agent the user is chatting with
//! - Show transient status ("Restarting...", "Connection problem")
//! - Show "↓ New" when bubbles arrived below the scroll position
//!
//! TitleBar is purely presentational: every field is a prop, set by the
//! parent each frame.
//!
//! ## Conditional Formatting
//!
//! 1. **Unseen content**: `"Erica Chat | Restarting... | ↓ New"`
//! 2. **Status message**: `"Erica Chat | Restarting..."`
//! 3. **Default**: `"Erica Chat"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

pub struct TitleBar {
    pub agent_name: String,
    pub status_message: String,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(agent_name: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            agent_name,
            status_message,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        let mut parts = vec![format!("{} Chat", self.agent_name)];
        if !self.status_message.is_empty() {
            parts.push(self.status_message.clone());
        }
        if self.has_unseen_content {
            parts.push("↓ New".to_string());
        }
        parts.join(" | ")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = Span::styled(self.text(), Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(title, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new("Erica".into(), "Restarting...".into(), true);
        let text = rendered(&mut title_bar);
        assert!(text.contains("Erica Chat"));
        assert!(text.contains("Restarting..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("Erica".into(), String::new(), false);
        let text = rendered(&mut title_bar);
        assert!(text.contains("Erica Chat"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_unseen_without_status_skips_empty_segment() {
        let title_bar = TitleBar::new("Erica".into(), String::new(), true);
        assert_eq!(title_bar.text(), "Erica Chat | ↓ New");
    }
}
