//! Keyboard and mouse routing for an accordion view.
//!
//! Header activation is the only thing that touches the registry; everything
//! else just moves focus in [`AccordionState`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::host::Host;
use crate::render::AccordionState;

/// What an input event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// A header was activated
    Toggled,
    FocusMoved,
    Ignored,
}

impl InputOutcome {
    pub fn needs_redraw(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Handle a key press: arrows/`j`/`k`/Home/End move focus, Enter/Space activate.
pub fn handle_key(host: &Host, state: &mut AccordionState, key: KeyEvent) -> InputOutcome {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return InputOutcome::Ignored;
    }

    let headers = host.headers();
    if headers.is_empty() {
        return InputOutcome::Ignored;
    }
    state.clamp(headers.len());

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.focus_prev(headers.len());
            InputOutcome::FocusMoved
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.focus_next(headers.len());
            InputOutcome::FocusMoved
        }
        KeyCode::Home => {
            state.focus_first();
            InputOutcome::FocusMoved
        }
        KeyCode::End => {
            state.focus_last(headers.len());
            InputOutcome::FocusMoved
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            headers[state.focused()].activate();
            InputOutcome::Toggled
        }
        _ => InputOutcome::Ignored,
    }
}

/// Handle a mouse event: left click on a header focuses and activates it,
/// the wheel moves focus.
pub fn handle_mouse(host: &Host, state: &mut AccordionState, mouse: MouseEvent) -> InputOutcome {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(index) = state.header_at(mouse.column, mouse.row) else {
                return InputOutcome::Ignored;
            };
            match host.headers().get(index) {
                Some(header) => {
                    state.set_focused(index);
                    header.activate();
                    InputOutcome::Toggled
                }
                None => InputOutcome::Ignored,
            }
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let count = host.headers().len();
            if count == 0 {
                return InputOutcome::Ignored;
            }
            state.clamp(count);
            if mouse.kind == MouseEventKind::ScrollUp {
                state.focus_prev(count);
            } else {
                state.focus_next(count);
            }
            InputOutcome::FocusMoved
        }
        _ => InputOutcome::Ignored,
    }
}
