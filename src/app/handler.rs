//! Input handling: maps key and mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use super::keys::Action;
use scroll_keyframes::Axis;
use tracing::debug;

use super::state::DemoState;

/// Process a key event through the configured bindings.
pub fn handle_key(state: &mut DemoState, key: KeyEvent) {
    // Ctrl+c always quits, whatever the bindings say.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.bindings.match_key(key) else {
        return;
    };
    debug!(?action, "key action");
    state.status_message = None;

    match action {
        Action::ScrollUp => state.scroll_by(-state.scroll_step),
        Action::ScrollDown => state.scroll_by(state.scroll_step),
        Action::PageUp => state.scroll_by(-state.page_size),
        Action::PageDown => state.scroll_by(state.page_size),
        Action::Top => state.scroll_to(0.0),
        Action::Bottom => state.scroll_to(f64::INFINITY),
        Action::CycleEasing => cycle_easing(state),
        Action::Quit => state.should_quit = true,
    }
}

/// Wheel scrolling.  Vertical wheels drive a horizontal scene too.
pub fn handle_mouse(state: &mut DemoState, mouse: MouseEvent) {
    let step = state.scroll_step;
    match (mouse.kind, state.scene.axis()) {
        (MouseEventKind::ScrollDown, _) | (MouseEventKind::ScrollRight, Axis::X) => {
            state.scroll_by(step)
        }
        (MouseEventKind::ScrollUp, _) | (MouseEventKind::ScrollLeft, Axis::X) => {
            state.scroll_by(-step)
        }
        _ => {}
    }
}

fn cycle_easing(state: &mut DemoState) {
    let next = state.scene.easing().next();
    state.scene.set_easing(next);
    state.status_message = Some(format!("easing: {next}"));
}
