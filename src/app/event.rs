//! Terminal input forwarding.
//!
//! Crossterm's reader blocks, so it runs on a blocking task and forwards
//! the events the demo cares about over a channel.  Frame pacing lives in
//! the main loop, not here.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

/// How long one poll waits before checking whether the receiver is gone.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Input events consumed by the demo.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

fn translate(event: CtEvent) -> Option<AppEvent> {
    match event {
        CtEvent::Key(k) if k.kind == KeyEventKind::Press => Some(AppEvent::Key(k)),
        CtEvent::Mouse(m) => Some(AppEvent::Mouse(m)),
        CtEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Spawn the reader and hand back its channel.  The reader stops once the
/// receiver is dropped.
pub fn spawn_event_reader() -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            if !event::poll(POLL_INTERVAL).unwrap_or(false) {
                continue;
            }
            let Ok(raw) = event::read() else {
                continue;
            };
            if let Some(app_event) = translate(raw) {
                if tx.send(app_event).is_err() {
                    break;
                }
            }
        }
    });

    rx
}
