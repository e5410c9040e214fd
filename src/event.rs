use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Tick interval; also bounds how late a question timeout can be noticed.
pub const TICK_RATE: Duration = Duration::from_millis(100);

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

/// Terminal input read on a background thread. A tick is sent whenever no
/// input arrived within the tick rate, which drives the question timer.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let event = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        // Release and repeat events would double-submit answers.
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                        Ok(Event::Resize(_, _)) => AppEvent::Resize,
                        Ok(_) => continue,
                        Err(err) => {
                            tracing::error!(error = %err, "terminal read failed");
                            return;
                        }
                    },
                    Ok(false) => AppEvent::Tick,
                    Err(err) => {
                        tracing::error!(error = %err, "terminal poll failed");
                        return;
                    }
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
