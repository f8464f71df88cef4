use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};

use super::runtime::SessionEvent;

/// Countdown resolution.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Pause between locking a question and moving on, so the player sees the outcome.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Timer firing, tagged with the epoch of the question that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { epoch: u64 },
    AdvanceDue { epoch: u64 },
}

/// The two timers of a session: the per-question countdown and the advance delay.
///
/// At most one of each runs at a time. Timer tasks hold only a weak sender, so they
/// never keep the session's event loop alive on their own; they are aborted on every
/// reschedule and on drop.
pub(crate) struct SessionTimers {
    events: WeakUnboundedSender<SessionEvent>,
    countdown: Option<JoinHandle<()>>,
    advance: Option<JoinHandle<()>>,
}

impl SessionTimers {
    #[must_use]
    pub fn new(events: &UnboundedSender<SessionEvent>) -> Self {
        Self {
            events: events.downgrade(),
            countdown: None,
            advance: None,
        }
    }

    /// Start the 1 s countdown for the question loaded at `epoch`.
    ///
    /// Cancels any timer still running.
    pub fn start_countdown(&mut self, epoch: u64) {
        self.cancel_all();
        let events = self.events.clone();
        self.countdown = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            loop {
                ticks.tick().await;
                if !post(&events, TimerEvent::Tick { epoch }) {
                    break;
                }
            }
        }));
    }

    /// Stop the countdown and schedule the advance for the question locked at `epoch`.
    pub fn schedule_advance(&mut self, epoch: u64) {
        self.cancel_all();
        let events = self.events.clone();
        self.advance = Some(tokio::spawn(async move {
            sleep(ADVANCE_DELAY).await;
            post(&events, TimerEvent::AdvanceDue { epoch });
        }));
    }

    pub fn cancel_all(&mut self) {
        if let Some(task) = self.countdown.take() {
            task.abort();
        }
        if let Some(task) = self.advance.take() {
            task.abort();
        }
    }

    #[cfg(test)]
    fn is_counting_down(&self) -> bool {
        self.countdown.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SessionTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn post(events: &WeakUnboundedSender<SessionEvent>, event: TimerEvent) -> bool {
    events
        .upgrade()
        .is_some_and(|tx| tx.send(SessionEvent::Timer(event)).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn timer_event(event: Option<SessionEvent>) -> TimerEvent {
        match event {
            Some(SessionEvent::Timer(event)) => event,
            _ => panic!("expected a timer event"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_once_per_second() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = SessionTimers::new(&tx);
        timers.start_countdown(3);

        let started = Instant::now();
        for _ in 0..3 {
            assert_eq!(timer_event(rx.recv().await), TimerEvent::Tick { epoch: 3 });
        }
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert!(timers.is_counting_down());
    }

    #[tokio::test(start_paused = true)]
    async fn advance_replaces_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = SessionTimers::new(&tx);
        timers.start_countdown(0);
        timers.schedule_advance(0);
        assert!(!timers.is_counting_down());

        let started = Instant::now();
        assert_eq!(timer_event(rx.recv().await), TimerEvent::AdvanceDue { epoch: 0 });
        assert_eq!(started.elapsed(), ADVANCE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_timers_fall_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = SessionTimers::new(&tx);
        timers.start_countdown(1);
        drop(timers);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn timers_do_not_keep_the_channel_open() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = SessionTimers::new(&tx);
        timers.start_countdown(1);
        drop(tx);

        assert!(rx.recv().await.is_none());
    }
}
