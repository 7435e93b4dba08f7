use std::io;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize,
    /// SIGINT delivered to the process.
    Interrupt,
    /// Terminal input can no longer be read. No events follow.
    Failed(String),
}

impl Event {
    /// Whether the event asks the program to stop, either as a signal or as
    /// Ctrl+C read in raw mode.
    pub fn is_interrupt(&self) -> bool {
        match self {
            Event::Interrupt => true,
            Event::Key(key) => {
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
            }
            _ => false,
        }
    }
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self::from_sources(event::EventStream::new(), sigint(), tick_rate)
    }

    /// Pumps terminal events, interrupts and ticks into one channel.
    pub fn from_sources<E, I>(events: E, interrupts: I, tick_rate: Duration) -> Self
    where
        E: Stream<Item = io::Result<CrosstermEvent>> + Send + 'static,
        I: Stream<Item = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();

        let task = tokio::spawn(async move {
            let mut reader = std::pin::pin!(events);
            let mut interrupts = std::pin::pin!(interrupts.fuse());
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(evt)) => {
                                let mapped = match evt {
                                    CrosstermEvent::Key(key) => Some(Event::Key(key)),
                                    CrosstermEvent::Resize(_, _) => Some(Event::Resize),
                                    _ => None,
                                };
                                if let Some(e) = mapped
                                    && tx.send(e).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(err)) => {
                                tracing::error!(error = %err, "terminal event stream failed");
                                let _ = tx.send(Event::Failed(err.to_string()));
                                break;
                            }
                            None => break,
                        }
                    }
                    _ = tick_interval.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                    Some(()) = interrupts.next() => {
                        if tx.send(Event::Interrupt).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, _task: task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Waits for an event that ends the program, discarding every other
    /// event. Returns [`Event::Interrupt`] or [`Event::Failed`].
    pub async fn interrupted(&mut self) -> Event {
        while let Some(event) = self.next().await {
            if event.is_interrupt() {
                return Event::Interrupt;
            }
            if let Event::Failed(_) = event {
                return event;
            }
        }
        Event::Failed("event channel closed".to_string())
    }

    /// Drops events that queued up while a command was running.
    pub fn discard_pending(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// SIGINT deliveries. The listener is registered once and kept for the
/// life of the stream.
#[cfg(unix)]
fn sigint() -> impl Stream<Item = ()> + Send + 'static {
    use tokio::signal::unix::{SignalKind, signal};

    let listener = signal(SignalKind::interrupt())
        .inspect_err(|err| tracing::warn!(error = %err, "cannot listen for SIGINT"))
        .ok();
    futures::stream::unfold(listener, |listener| async move {
        let mut listener = listener?;
        listener.recv().await.map(|()| ((), Some(listener)))
    })
}

#[cfg(not(unix))]
fn sigint() -> impl Stream<Item = ()> + Send + 'static {
    futures::stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGINT");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOW_TICK: Duration = Duration::from_secs(3600);

    async fn next_non_tick(handler: &mut EventHandler) -> Option<Event> {
        loop {
            match handler.next().await {
                Some(Event::Tick) => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn ctrl_c_key_counts_as_interrupt() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(Event::Key(key).is_interrupt());
        assert!(Event::Interrupt.is_interrupt());

        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(!Event::Key(plain).is_interrupt());
        assert!(!Event::Tick.is_interrupt());
        assert!(!Event::Failed("tty closed".to_string()).is_interrupt());
    }

    #[tokio::test]
    async fn every_interrupt_is_delivered() {
        let interrupts = futures::stream::iter([(), (), ()]).chain(futures::stream::pending());
        let mut handler =
            EventHandler::from_sources(futures::stream::pending(), interrupts, SLOW_TICK);

        for _ in 0..3 {
            assert_eq!(next_non_tick(&mut handler).await, Some(Event::Interrupt));
        }
    }

    #[tokio::test]
    async fn stream_error_is_reported_as_failure() {
        let events = futures::stream::iter(vec![
            Ok(CrosstermEvent::Resize(80, 24)),
            Err(io::Error::other("tty gone")),
        ]);
        let mut handler = EventHandler::from_sources(events, futures::stream::pending(), SLOW_TICK);

        assert_eq!(next_non_tick(&mut handler).await, Some(Event::Resize));
        let failed = next_non_tick(&mut handler).await;
        assert_eq!(failed, Some(Event::Failed("tty gone".to_string())));
        assert_eq!(next_non_tick(&mut handler).await, None);
    }

    #[tokio::test]
    async fn waiting_for_interrupt_stops_on_failure() {
        let events = futures::stream::iter(vec![Err(io::Error::other("tty gone"))]);
        let mut handler = EventHandler::from_sources(events, futures::stream::pending(), SLOW_TICK);

        assert_eq!(
            handler.interrupted().await,
            Event::Failed("tty gone".to_string())
        );
    }
}
