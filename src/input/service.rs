//! High-level input service.
//!
//! Runs the board's input state machine over terminal key events and yields
//! domain-level `InputAction`s that the application runtime consumes. The
//! only text-entry mode is the endpoint prompt.

use crate::error::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Current input mode (board display vs endpoint prompt).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputState {
    Board,
    EndpointInput,
}

/// High-level input actions emitted by the state machine/service.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Quit,
    StartEndpointEntry,
    UpdateEndpointBuffer(String),
    CancelEndpointEntry,
    /// Submit the entered endpoint URL; the feed re-subscribes to it.
    SubmitEndpoint(String),
    Resize {
        width: u16,
        height: u16,
    },
    NoAction,
    InvalidInput,
}

/// State machine mapping key events onto board actions.
pub struct InputStateMachine {
    state: InputState,
    endpoint_buffer: String,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self {
            state: InputState::Board,
            endpoint_buffer: String::new(),
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputAction {
        if key_event.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }

        match (self.state, key_event.code, key_event.modifiers) {
            (InputState::Board, KeyCode::Char('q'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::Quit
            }
            (InputState::Board, KeyCode::Char('c'), KeyModifiers::CONTROL) => InputAction::Quit,
            (InputState::Board, KeyCode::Char('e'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.state = InputState::EndpointInput;
                self.endpoint_buffer.clear();
                InputAction::StartEndpointEntry
            }
            (InputState::EndpointInput, KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.state = InputState::Board;
                self.endpoint_buffer.clear();
                InputAction::CancelEndpointEntry
            }
            (InputState::EndpointInput, KeyCode::Char(ch), modifiers)
                if ch.is_ascii_graphic()
                    && !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.endpoint_buffer.push(ch);
                InputAction::UpdateEndpointBuffer(self.endpoint_buffer.clone())
            }
            (InputState::EndpointInput, KeyCode::Backspace, _) => {
                self.endpoint_buffer.pop();
                if self.endpoint_buffer.is_empty() {
                    self.state = InputState::Board;
                    InputAction::CancelEndpointEntry
                } else {
                    InputAction::UpdateEndpointBuffer(self.endpoint_buffer.clone())
                }
            }
            (InputState::EndpointInput, KeyCode::Enter, _) => {
                let url = self.endpoint_buffer.clone();
                self.state = InputState::Board;
                self.endpoint_buffer.clear();

                if url.trim().is_empty() {
                    InputAction::CancelEndpointEntry
                } else {
                    InputAction::SubmitEndpoint(url.trim().to_string())
                }
            }
            (InputState::EndpointInput, KeyCode::Esc, _) => {
                self.state = InputState::Board;
                self.endpoint_buffer.clear();
                InputAction::CancelEndpointEntry
            }
            _ => InputAction::InvalidInput,
        }
    }

    pub fn get_endpoint_buffer(&self) -> &str {
        &self.endpoint_buffer
    }

    pub fn get_state(&self) -> InputState {
        self.state
    }
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Service responsible for producing high-level `InputAction`s from terminal events.
pub struct InputService {
    state_machine: InputStateMachine,
}

impl InputService {
    pub fn new() -> Self {
        Self {
            state_machine: InputStateMachine::new(),
        }
    }

    pub fn poll_action(&mut self, timeout: Option<Duration>) -> Result<Option<InputAction>> {
        let timeout_duration = timeout.unwrap_or(Duration::from_millis(100));

        if event::poll(timeout_duration)? {
            return Ok(self.process_event(event::read()?));
        }

        Ok(None)
    }

    pub fn process_event(&mut self, event: Event) -> Option<InputAction> {
        let action = match event {
            Event::Key(key_event) => self.state_machine.handle_key_event(key_event),
            Event::Resize(width, height) => InputAction::Resize { width, height },
            _ => InputAction::NoAction,
        };

        match action {
            InputAction::NoAction | InputAction::InvalidInput => None,
            _ => Some(action),
        }
    }
}

impl Default for InputService {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a blocking thread that polls for terminal events and forwards actions to the runtime.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputAction>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut service = InputService::new();
        while !shutdown.load(Ordering::SeqCst) {
            match service.poll_action(Some(poll_interval)) {
                Ok(Some(action)) => {
                    if tx.send(action).is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    // No input this tick; continue polling.
                    continue;
                }
                Err(err) => {
                    eprintln!("Input thread error: {}", err);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(sm: &mut InputStateMachine, text: &str) -> InputAction {
        let mut last = InputAction::NoAction;
        for ch in text.chars() {
            last = sm.handle_key_event(key(KeyCode::Char(ch)));
        }
        last
    }

    #[test]
    fn quit_from_board_mode() {
        let mut sm = InputStateMachine::new();
        assert_eq!(sm.handle_key_event(key(KeyCode::Char('q'))), InputAction::Quit);
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputAction::Quit
        );
    }

    #[test]
    fn endpoint_entry_accumulates_and_submits() {
        let mut sm = InputStateMachine::new();
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Char('e'))),
            InputAction::StartEndpointEntry
        );
        assert_eq!(sm.get_state(), InputState::EndpointInput);

        let last = type_text(&mut sm, "http://x/feed");
        assert_eq!(
            last,
            InputAction::UpdateEndpointBuffer("http://x/feed".to_string())
        );

        assert_eq!(
            sm.handle_key_event(key(KeyCode::Enter)),
            InputAction::SubmitEndpoint("http://x/feed".to_string())
        );
        assert_eq!(sm.get_state(), InputState::Board);
        assert_eq!(sm.get_endpoint_buffer(), "");
    }

    #[test]
    fn empty_submit_cancels_entry() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('e')));
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Enter)),
            InputAction::CancelEndpointEntry
        );
        assert_eq!(sm.get_state(), InputState::Board);
    }

    #[test]
    fn escape_cancels_entry() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('e')));
        type_text(&mut sm, "http");
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Esc)),
            InputAction::CancelEndpointEntry
        );
        assert_eq!(sm.get_state(), InputState::Board);
    }

    #[test]
    fn backspace_on_empty_buffer_cancels() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('e')));
        type_text(&mut sm, "h");
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Backspace)),
            InputAction::CancelEndpointEntry
        );
        assert_eq!(sm.get_state(), InputState::Board);
    }

    #[test]
    fn q_types_into_endpoint_buffer() {
        // 'q' must not quit while the endpoint prompt is open.
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(key(KeyCode::Char('e')));
        assert_eq!(
            sm.handle_key_event(key(KeyCode::Char('q'))),
            InputAction::UpdateEndpointBuffer("q".to_string())
        );
    }

    #[test]
    fn resize_passes_through_service() {
        let mut service = InputService::new();
        assert_eq!(
            service.process_event(Event::Resize(100, 30)),
            Some(InputAction::Resize {
                width: 100,
                height: 30,
            })
        );
    }
}
