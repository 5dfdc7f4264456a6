//! Terminal event handling.

use color_eyre::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Terminal events.
#[derive(Debug)]
pub enum Event {
    /// Redraw tick, drives the loading spinner.
    Tick,
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize.
    Resize,
}

/// Polls crossterm on a blocking thread and forwards events to the UI loop.
pub struct EventHandler {
    /// Event receiver.
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a handler that also emits [`Event::Tick`] every `tick_rate_ms`.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                    polled = tokio::task::spawn_blocking(|| {
                        event::poll(Duration::from_millis(50))
                    }) => {
                        if !matches!(polled, Ok(Ok(true))) {
                            continue;
                        }
                        let event = match event::read() {
                            // Release and repeat events arrive on some platforms.
                            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            Ok(CrosstermEvent::Resize(_, _)) => Some(Event::Resize),
                            Ok(_) => None,
                            Err(e) => {
                                tracing::warn!("Failed to read terminal event: {}", e);
                                None
                            }
                        };
                        if let Some(event) = event
                            && tx.send(event).is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx }
    }

    /// Get the next event.
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| color_eyre::eyre::eyre!("Event channel closed"))
    }
}
