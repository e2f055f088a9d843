use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};

use crate::core::state::{App, Bubble};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, MessageListState, RestartBar, TitleBar};

/// Where the clickable regions landed in the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenAreas {
    pub list: Rect,
    pub restart: Rect,
}

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Option { entry: usize, option: usize },
    Restart,
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let layout = Layout::vertical([
        Length(1),
        Min(0),
        Length(RestartBar::height(app.restart)),
        Length(input_height),
    ]);
    let [title_area, list_area, restart_area, input_area] = layout.areas(frame.area());
    tui.areas = ScreenAreas {
        list: list_area,
        restart: restart_area,
    };

    TitleBar::new(
        app.agent_name.clone(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content(),
    )
    .render(frame, title_area);

    let focus = focused_option(app, tui.option_focus);
    MessageList::new(
        &mut tui.message_list,
        &app.transcript,
        &app.agent_name,
        app.is_typing,
        app.epoch,
    )
    .focus(focus)
    .spinner_frame(spinner_frame)
    .render(frame, list_area);

    RestartBar::new(app.restart).render(frame, restart_area);
    tui.input_box.render(frame, input_area);
}

/// The highlighted `(entry, option)` in the newest choosable group, with
/// `option_focus` clamped to the group's size.
pub fn focused_option(app: &App, option_focus: usize) -> Option<(usize, usize)> {
    let entry = app.active_option_group()?;
    let count = app.transcript[entry].options.as_ref()?.options.len();
    (count > 0).then(|| (entry, option_focus.min(count - 1)))
}

pub fn hit_test(
    areas: &ScreenAreas,
    list: &MessageListState,
    transcript: &[Bubble],
    col: u16,
    row: u16,
) -> Option<ClickTarget> {
    let position = Position::new(col, row);
    if areas.restart.contains(position) {
        return Some(ClickTarget::Restart);
    }
    if areas.list.contains(position) {
        let (entry, option) = list.hit_test(transcript, row - areas.list.y)?;
        return Some(ClickTarget::Option { entry, option });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn draws_title_transcript_and_input() {
        let mut app = test_app();
        app.append_bot("Hello, I'm Erica.");
        let mut tui = TuiState::new(&app);

        let text = draw(&app, &mut tui, 50, 14);
        assert!(text.contains("Erica Chat"));
        assert!(text.contains("Hello, I'm Erica."));
        assert!(text.contains("Type your message..."));
    }

    #[test]
    fn restart_bar_only_when_visible() {
        let mut app = test_app();
        app.append_bot("Thank you for contacting us.");
        let mut tui = TuiState::new(&app);

        draw(&app, &mut tui, 50, 14);
        assert_eq!(tui.areas.restart.height, 0);

        app.show_restart();
        tui.sync(&app);
        let text = draw(&app, &mut tui, 50, 14);
        assert_eq!(tui.areas.restart.height, 1);
        assert!(text.contains("Restart ]"));
        assert!(text.contains("Click Restart to start a new conversation"));
    }

    #[test]
    fn click_on_option_and_restart() {
        let mut app = test_app();
        app.append_bot("Smoker?\n1. Yes\n2. No");
        let mut tui = TuiState::new(&app);
        draw(&app, &mut tui, 40, 20);

        // Title is row 0, the list starts at row 1; the bubble's options sit
        // under its top border and one body row.
        let list_y = tui.areas.list.y;
        let hit = hit_test(&tui.areas, &tui.message_list, &app.transcript, 5, list_y + 2);
        assert_eq!(hit, Some(ClickTarget::Option { entry: 0, option: 0 }));
        let hit = hit_test(&tui.areas, &tui.message_list, &app.transcript, 5, list_y + 3);
        assert_eq!(hit, Some(ClickTarget::Option { entry: 0, option: 1 }));
        assert_eq!(hit_test(&tui.areas, &tui.message_list, &app.transcript, 5, 0), None);

        app.transcript[0].options.as_mut().unwrap().disabled = true;
        app.show_restart();
        draw(&app, &mut tui, 40, 20);
        let restart_y = tui.areas.restart.y;
        assert_eq!(
            hit_test(&tui.areas, &tui.message_list, &app.transcript, 10, restart_y),
            Some(ClickTarget::Restart)
        );
    }

    #[test]
    fn focus_clamps_to_group_size() {
        let mut app = test_app();
        assert_eq!(focused_option(&app, 0), None);
        app.append_bot("1. A\n2. B");
        assert_eq!(focused_option(&app, 0), Some((0, 0)));
        assert_eq!(focused_option(&app, 9), Some((0, 1)));
    }
}
