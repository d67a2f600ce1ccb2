use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent, MouseEventKind};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ReflexEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait ReflexEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ReflexEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => ReflexEvent::Key(key),
                // only presses matter; drags and releases would double count
                Ok(CtEvent::Mouse(m)) if matches!(m.kind, MouseEventKind::Down(_)) => {
                    ReflexEvent::Mouse(m)
                }
                Ok(CtEvent::Resize(_, _)) => ReflexEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflexEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<ReflexEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ReflexEvent>) -> Self {
        Self { rx }
    }
}

impl ReflexEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: ReflexEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ReflexEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// How long to wait: the tick interval, cut short by an earlier timer deadline
    pub fn wait_for(&self, deadline: Option<Instant>, now: Instant) -> Duration {
        let tick = self.ticker.interval();
        match deadline {
            Some(d) => tick.min(d.saturating_duration_since(now)),
            None => tick,
        }
    }

    /// Blocks until an event arrives or the wait elapses, returning Tick on timeout
    pub fn step(&self, deadline: Option<Instant>) -> ReflexEvent {
        let timeout = self.wait_for(deadline, Instant::now());
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                ReflexEvent::Tick
            }
        }
    }
}
