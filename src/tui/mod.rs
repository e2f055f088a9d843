//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard and mouse events into core::Action values, and runs
//! the effects `update()` asks for on the tokio runtime.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Typing** (reply pending): draws every ~80ms to animate the indicator.
//! - **Idle**: sleeps up to 500ms, only redraws on events, resize, or
//!   actions arriving from background tasks.
//!
//! ## Background Work
//!
//! Each effect becomes one spawned task that reports back over an
//! `std::sync::mpsc` channel drained once per loop iteration:
//!
//! ```text
//! SendChat   → chat_turn()  → ReplyReceived | ReplyFailed
//! Present    → present()    → ShowBubble ... → RevealRestart
//! SendReset  → reset_turn() → ResetCompleted | ResetFailed
//! ```

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::formatter::ReplyPlan;
use crate::core::state::{App, InputLock};
use crate::transport::{ChatTransport, HttpTransport};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::{ClickTarget, ScreenAreas};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    /// Highlighted option within the active group
    pub option_focus: usize,
    /// Digits typed so far toward a multi-digit option key
    pub typed_key: String,
    /// Clickable regions from the last frame
    pub areas: ScreenAreas,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(app.placeholder()),
            option_focus: 0,
            typed_key: String::new(),
            areas: ScreenAreas::default(),
        }
    }

    /// Copy the props the input box takes from App.
    pub fn sync(&mut self, app: &App) {
        self.input_box.locked = app.lock.is_locked();
        self.input_box.placeholder = app.placeholder();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets us tell Shift+Enter from Enter; terminals
        // without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

/// Everything a spawned effect needs.
#[derive(Clone)]
struct Runtime {
    transport: Arc<dyn ChatTransport>,
    typing_delay: Duration,
    tx: mpsc::Sender<Action>,
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let transport = HttpTransport::new(&config.server_url).map_err(std::io::Error::other)?;
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new(&app);

    let (tx, rx) = mpsc::channel();
    let runtime = Runtime {
        transport: Arc::new(transport),
        typing_delay: config.typing_delay,
        tx,
    };

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Ask for the greeting before the first frame
    let mut should_quit = dispatch(&mut app, &mut tui, &runtime, Action::Start);

    let start_time = Instant::now();
    let mut needs_redraw = true;

    while !should_quit {
        tui.sync(&app);

        if app.is_typing {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if app.is_typing { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = handle_event(&app, &mut tui, &event) {
                should_quit |= dispatch(&mut app, &mut tui, &runtime, action);
            }
            // Lock state may have changed; later events in this batch must see it
            tui.sync(&app);
        }

        // Handle actions reported by background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            should_quit |= dispatch(&mut app, &mut tui, &runtime, action);
        }
    }

    ratatui::restore();
    Ok(())
}

/// Maps a terminal event to a core action, handling TUI-local events in place.
fn handle_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        TuiEvent::Restart => return Some(Action::RestartRequested),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(event);
            return None;
        }
        TuiEvent::MouseClick(col, row) => {
            return match ui::hit_test(&tui.areas, &tui.message_list, &app.transcript, *col, *row)? {
                ClickTarget::Option { entry, option } => Some(Action::ChooseOption { entry, option }),
                ClickTarget::Restart => Some(Action::RestartRequested),
            };
        }
        _ => {}
    }

    match app.lock {
        InputLock::AwaitingChoice => choice_key(app, tui, event),
        InputLock::AwaitingRestart => {
            matches!(event, TuiEvent::Submit).then_some(Action::RestartRequested)
        }
        InputLock::AwaitingReply => None,
        InputLock::Unlocked => match tui.input_box.handle_event(event)? {
            InputEvent::Submit(text) => Some(Action::Submit(text)),
            InputEvent::ContentChanged => None,
        },
    }
}

/// Keyboard selection among the active option group.
fn choice_key(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    let (entry, focused) = ui::focused_option(app, tui.option_focus)?;
    let options = &app.transcript[entry].options.as_ref()?.options;

    match event {
        TuiEvent::CursorUp => {
            tui.typed_key.clear();
            tui.option_focus = focused.saturating_sub(1);
            None
        }
        TuiEvent::CursorDown => {
            tui.typed_key.clear();
            tui.option_focus = (focused + 1).min(options.len() - 1);
            None
        }
        TuiEvent::Submit => {
            tui.typed_key.clear();
            Some(Action::ChooseOption {
                entry,
                option: focused,
            })
        }
        TuiEvent::InputChar(c) => {
            tui.typed_key.push(*c);
            if !options.iter().any(|o| o.key.starts_with(tui.typed_key.as_str())) {
                // Start over from this key
                tui.typed_key.clear();
                tui.typed_key.push(*c);
            }

            let typed = tui.typed_key.as_str();
            let exact = options.iter().position(|o| o.key == typed);
            let longer = options
                .iter()
                .any(|o| o.key.len() > typed.len() && o.key.starts_with(typed));

            match (exact, longer) {
                (Some(option), false) => {
                    tui.typed_key.clear();
                    Some(Action::ChooseOption { entry, option })
                }
                // "1" while "10" exists: highlight and wait for Enter or more digits
                (Some(option), true) => {
                    tui.option_focus = option;
                    None
                }
                (None, true) => None,
                (None, false) => {
                    tui.typed_key.clear();
                    None
                }
            }
        }
        _ => None,
    }
}

/// Runs one action through `update()` and starts its effect.
/// Returns true when the app should exit.
fn dispatch(app: &mut App, tui: &mut TuiState, runtime: &Runtime, action: Action) -> bool {
    let epoch = app.epoch;
    if matches!(action, Action::ChooseOption { .. }) {
        tui.option_focus = 0;
        tui.typed_key.clear();
    }

    let effect = update(app, action);

    if app.epoch != epoch {
        tui.message_list.reset();
        tui.option_focus = 0;
        tui.typed_key.clear();
    }

    match effect {
        Effect::Quit => return true,
        Effect::None => {}
        Effect::SendChat {
            epoch,
            tab_id,
            message,
        } => {
            let rt = runtime.clone();
            tokio::spawn(async move {
                let action =
                    chat_turn(rt.transport.as_ref(), epoch, &tab_id, &message, rt.typing_delay)
                        .await;
                send(&rt.tx, action);
            });
        }
        Effect::Present { epoch, plan } => {
            tokio::spawn(present(epoch, plan, runtime.tx.clone()));
        }
        Effect::SendReset { tab_id } => {
            let rt = runtime.clone();
            tokio::spawn(async move {
                let action = reset_turn(rt.transport.as_ref(), &tab_id).await;
                send(&rt.tx, action);
            });
        }
    }
    false
}

fn send(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver action: receiver dropped");
    }
}

/// One `/chat` round trip. A successful reply is held back by `typing_delay`
/// so the typing indicator stays up for a beat.
async fn chat_turn(
    transport: &dyn ChatTransport,
    epoch: u64,
    tab_id: &str,
    message: &str,
    typing_delay: Duration,
) -> Action {
    match transport.chat(message, tab_id).await {
        Ok(reply) => {
            tokio::time::sleep(typing_delay).await;
            Action::ReplyReceived { epoch, reply }
        }
        Err(e) => Action::ReplyFailed {
            epoch,
            error: e.to_string(),
        },
    }
}

/// Plays a reply plan: each bubble at its offset from now, then the restart
/// reveal if the plan has one. Stops early if the loop has gone away.
async fn present(epoch: u64, plan: ReplyPlan, tx: mpsc::Sender<Action>) {
    let start = tokio::time::Instant::now();

    for bubble in plan.bubbles {
        tokio::time::sleep_until(start + bubble.delay).await;
        if tx
            .send(Action::ShowBubble {
                epoch,
                text: bubble.text,
            })
            .is_err()
        {
            return;
        }
    }

    if let Some(at) = plan.restart_at {
        tokio::time::sleep_until(start + at).await;
        send(&tx, Action::RevealRestart { epoch });
    }
}

async fn reset_turn(transport: &dyn ChatTransport, tab_id: &str) -> Action {
    match transport.reset(tab_id).await {
        Ok(()) => Action::ResetCompleted,
        Err(e) => Action::ResetFailed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formatter::{ReplyFormatter, ScheduledBubble};
    use crate::core::state::RestartControl;
    use crate::test_support::{ScriptedTransport, test_app};
    use crate::transport::TransportError;

    fn plan(texts: &[&str], step_ms: u64, restart: bool) -> ReplyPlan {
        let bubbles: Vec<ScheduledBubble> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ScheduledBubble {
                text: t.to_string(),
                delay: Duration::from_millis(i as u64 * step_ms),
            })
            .collect();
        let restart_at =
            restart.then(|| Duration::from_millis(texts.len() as u64 * step_ms));
        ReplyPlan {
            bubbles,
            restart_at,
        }
    }

    #[test]
    fn chat_turn_success_reports_reply() {
        let transport = ScriptedTransport::with_replies(vec![Ok("Hello!".into())]);
        let action = tokio_test::block_on(chat_turn(
            &transport,
            2,
            "tab_1",
            "hi",
            Duration::from_millis(1),
        ));
        assert_eq!(
            action,
            Action::ReplyReceived {
                epoch: 2,
                reply: "Hello!".into()
            }
        );
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), &[("hi".to_string(), "tab_1".to_string())]);
    }

    #[tokio::test]
    async fn chat_turn_failure_reports_error() {
        let transport = ScriptedTransport::with_replies(vec![Err(TransportError::Api {
            status: 500,
            message: "boom".into(),
        })]);
        let action = chat_turn(&transport, 0, "tab_1", "", Duration::ZERO).await;
        match action {
            Action::ReplyFailed { epoch, error } => {
                assert_eq!(epoch, 0);
                assert!(error.contains("500"));
            }
            other => panic!("expected ReplyFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn present_sends_bubbles_in_order_then_restart() {
        let (tx, rx) = mpsc::channel();
        present(7, plan(&["one", "two", "three"], 5, true), tx).await;

        let received: Vec<Action> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                Action::ShowBubble { epoch: 7, text: "one".into() },
                Action::ShowBubble { epoch: 7, text: "two".into() },
                Action::ShowBubble { epoch: 7, text: "three".into() },
                Action::RevealRestart { epoch: 7 },
            ]
        );
    }

    #[tokio::test]
    async fn present_honors_delays() {
        let (tx, rx) = mpsc::channel();
        let began = Instant::now();
        present(0, plan(&["a", "b"], 30, false), tx).await;
        assert!(began.elapsed() >= Duration::from_millis(30));
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[tokio::test]
    async fn present_stops_when_receiver_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        // Must return rather than hang or panic
        present(0, plan(&["a", "b"], 1, true), tx).await;
    }

    #[tokio::test]
    async fn reset_turn_maps_results() {
        let ok = ScriptedTransport::default();
        assert_eq!(reset_turn(&ok, "tab_9").await, Action::ResetCompleted);
        assert_eq!(ok.resets.lock().unwrap().as_slice(), &["tab_9".to_string()]);

        let failing = ScriptedTransport::failing_reset();
        assert!(matches!(
            reset_turn(&failing, "tab_9").await,
            Action::ResetFailed(_)
        ));
    }

    /// Drives a whole conversation through update() and the async helpers,
    /// the way the event loop does, minus the terminal.
    #[tokio::test]
    async fn full_conversation_round_trip() {
        let transport = ScriptedTransport::with_replies(vec![
            Ok("Hello, I'm Erica.\n\nAre you a smoker?\n1. Yes\n2. No".into()),
            Ok("Thank you for contacting us. Goodbye!".into()),
        ]);
        let mut app = App::new("Erica".into(), ReplyFormatter {
            step: Duration::from_millis(1),
            restart_grace: Duration::from_millis(1),
            ..ReplyFormatter::default()
        });

        async fn drive(app: &mut App, transport: &ScriptedTransport, action: Action) {
            let mut pending = vec![action];
            while let Some(action) = pending.pop() {
                match update(app, action) {
                    Effect::SendChat { epoch, tab_id, message } => {
                        pending.push(
                            chat_turn(transport, epoch, &tab_id, &message, Duration::ZERO).await,
                        );
                    }
                    Effect::Present { epoch, plan } => {
                        let (tx, rx) = mpsc::channel();
                        present(epoch, plan, tx).await;
                        let mut actions: Vec<Action> = rx.try_iter().collect();
                        actions.reverse();
                        pending.extend(actions);
                    }
                    Effect::SendReset { tab_id } => {
                        pending.push(reset_turn(transport, &tab_id).await);
                    }
                    Effect::None | Effect::Quit => {}
                }
            }
        }

        drive(&mut app, &transport, Action::Start).await;
        assert_eq!(app.lock, InputLock::AwaitingChoice);
        assert_eq!(app.transcript[0].body, "Hello, I'm Erica.");

        let entry = app.active_option_group().unwrap();
        drive(&mut app, &transport, Action::ChooseOption { entry, option: 1 }).await;
        assert_eq!(app.restart, RestartControl::Visible);
        assert_eq!(app.lock, InputLock::AwaitingRestart);

        drive(&mut app, &transport, Action::RestartRequested).await;
        assert_eq!(app.epoch, 1);

        let sent = transport.sent.lock().unwrap();
        let messages: Vec<&str> = sent.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(messages, vec!["", "2", ""]);
        assert_eq!(transport.resets.lock().unwrap().len(), 1);
    }

    #[test]
    fn choice_keys_move_focus_and_pick() {
        let mut app = test_app();
        app.append_bot("Pick:\n1. A\n2. B\n3. C");
        let mut tui = TuiState::new(&app);

        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::CursorDown), None);
        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::CursorDown), None);
        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::CursorDown), None);
        assert_eq!(tui.option_focus, 2);
        assert_eq!(
            choice_key(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::ChooseOption { entry: 0, option: 2 })
        );
        assert_eq!(
            choice_key(&app, &mut tui, &TuiEvent::InputChar('1')),
            Some(Action::ChooseOption { entry: 0, option: 0 })
        );
        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::InputChar('9')), None);
    }

    #[test]
    fn multi_digit_option_keys() {
        let mut app = test_app();
        let menu: Vec<String> = (1..=10).map(|i| format!("{i}. Plan {i}")).collect();
        app.append_bot(&format!("Choose a plan:\n{}", menu.join("\n")));
        let mut tui = TuiState::new(&app);

        // "1" is ambiguous with "10": it only moves the highlight
        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::InputChar('1')), None);
        assert_eq!(tui.option_focus, 0);
        assert_eq!(
            choice_key(&app, &mut tui, &TuiEvent::InputChar('0')),
            Some(Action::ChooseOption { entry: 0, option: 9 })
        );
        assert!(tui.typed_key.is_empty());

        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::InputChar('1')), None);
        assert_eq!(
            choice_key(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::ChooseOption { entry: 0, option: 0 })
        );

        // Unambiguous single digits still pick at once
        assert_eq!(
            choice_key(&app, &mut tui, &TuiEvent::InputChar('7')),
            Some(Action::ChooseOption { entry: 0, option: 6 })
        );

        // "13" matches nothing, so the 3 starts a fresh key
        assert_eq!(choice_key(&app, &mut tui, &TuiEvent::InputChar('1')), None);
        assert_eq!(
            choice_key(&app, &mut tui, &TuiEvent::InputChar('3')),
            Some(Action::ChooseOption { entry: 0, option: 2 })
        );
    }

    #[test]
    fn typing_is_refused_while_awaiting_choice() {
        let mut app = test_app();
        app.append_bot("1. Yes\n2. No");
        let mut tui = TuiState::new(&app);
        tui.sync(&app);

        assert_eq!(handle_event(&app, &mut tui, &TuiEvent::InputChar('x')), None);
        assert!(tui.input_box.buffer.is_empty());
    }

    #[test]
    fn enter_restarts_when_restart_visible() {
        let mut app = test_app();
        app.show_restart();
        let mut tui = TuiState::new(&app);
        tui.sync(&app);
        assert_eq!(
            handle_event(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::RestartRequested)
        );
    }

    #[test]
    fn unlocked_enter_submits_typed_text() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        tui.sync(&app);
        for c in "John".chars() {
            handle_event(&app, &mut tui, &TuiEvent::InputChar(c));
        }
        assert_eq!(
            handle_event(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::Submit("John".into()))
        );
    }

    #[test]
    fn ctrl_c_quits_in_any_state() {
        let mut app = test_app();
        app.lock = InputLock::AwaitingReply;
        let mut tui = TuiState::new(&app);
        assert_eq!(handle_event(&app, &mut tui, &TuiEvent::ForceQuit), Some(Action::Quit));
    }
}
