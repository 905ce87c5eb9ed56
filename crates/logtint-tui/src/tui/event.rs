use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use logtint_logs::SourceEvent;

/// Everything the viewer loop reacts to
#[derive(Clone, Debug)]
pub enum Event {
    /// Redraw opportunity; lines are batched between ticks
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
    /// Output of the reader for source number `index`
    Source { index: usize, event: SourceEvent },
    Error(String),
}

/// Merges terminal input, ticks and source readers into one stream
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventHandler {
    /// Ticks plus terminal input
    pub fn new(tick_rate: Duration) -> Self {
        let handler = Self::ticking(tick_rate);
        handler.spawn_terminal_input();
        handler
    }

    /// Ticks only, no terminal input
    pub fn ticking(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let tx = sender.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            sender,
            receiver,
            cancel,
        }
    }

    /// Forward the events of source `index` into this handler
    pub fn attach_source(&self, index: usize, mut events: mpsc::UnboundedReceiver<SourceEvent>) {
        let tx = self.sender.clone();
        let token = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => {
                            if tx.send(Event::Source { index, event }).is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        });
    }

    fn spawn_terminal_input(&self) {
        let tx = self.sender.clone();
        let token = self.cancel.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            loop {
                let next = reader.next().fuse();
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = next => event,
                };

                let forwarded = match event {
                    // Only presses; Windows also reports releases
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        Event::Key(key)
                    }
                    Some(Ok(CrosstermEvent::Resize(w, h))) => Event::Resize(w, h),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => Event::Error(e.to_string()),
                    None => break,
                };
                if tx.send(forwarded).is_err() {
                    break;
                }
            }
        });
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Stop every background task
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_source_events_are_tagged_with_index() {
        let mut handler = EventHandler::ticking(Duration::from_secs(3600));

        let (tx, rx) = mpsc::unbounded_channel();
        handler.attach_source(2, rx);
        tx.send(SourceEvent::Line("hello".to_string())).unwrap();
        tx.send(SourceEvent::Eof).unwrap();

        let mut received = Vec::new();
        while received.len() < 2 {
            match handler.next().await {
                Some(Event::Source { index, event }) => received.push((index, event)),
                Some(_) => {}
                None => break,
            }
        }

        assert_eq!(
            received,
            vec![
                (2, SourceEvent::Line("hello".to_string())),
                (2, SourceEvent::Eof),
            ]
        );
        handler.shutdown();
    }

    #[tokio::test]
    async fn test_first_tick_is_immediate() {
        let mut handler = EventHandler::ticking(Duration::from_secs(3600));
        assert!(matches!(handler.next().await, Some(Event::Tick)));
    }
}
