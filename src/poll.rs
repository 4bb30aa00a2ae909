use crate::dashboard::{Dashboard, DashboardFrame};
use crate::error::FetchError;
use crate::metrics::DynamicMetrics;
use crate::render::canvas::RecordingCanvas;
use crate::source::MetricsSource;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default delay between two metric fetches.
pub const REFRESH_MS: u64 = 2000;

/// What happened to one tick's fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Applied { seq: u64 },
    /// Fetch or decode failed; nothing was updated.
    Skipped { seq: u64 },
    /// A newer tick was already applied; this result was dropped.
    Stale { seq: u64, newest: u64 },
}

/// Hands out tick sequence numbers and remembers the newest applied one.
#[derive(Debug, Default)]
struct TickLedger {
    next_seq: u64,
    last_applied: Option<u64>,
}

impl TickLedger {
    fn issue(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Marks `seq` applied unless something newer already was.
    fn accept(&mut self, seq: u64) -> Result<(), u64> {
        match self.last_applied {
            Some(newest) if newest > seq => Err(newest),
            _ => {
                self.last_applied = Some(seq);
                Ok(())
            }
        }
    }
}

/// Everything a tick mutates: the widgets plus the published frame.
pub struct PollState {
    dashboard: Dashboard<RecordingCanvas>,
    ledger: TickLedger,
    frames: watch::Sender<DashboardFrame>,
}

impl PollState {
    pub fn new(
        dashboard: Dashboard<RecordingCanvas>,
    ) -> (Self, watch::Receiver<DashboardFrame>) {
        let (frames, frames_rx) = watch::channel(dashboard.frame(None));
        let state = Self {
            dashboard,
            ledger: TickLedger::default(),
            frames,
        };
        (state, frames_rx)
    }

    pub fn issue(&mut self) -> u64 {
        self.ledger.issue()
    }

    /// Settles one tick. Failures and stale results leave every widget as it was.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<DynamicMetrics, FetchError>,
    ) -> TickOutcome {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Fetch failed (tick {}): {}", seq, e);
                return TickOutcome::Skipped { seq };
            }
        };
        if let Err(newest) = self.ledger.accept(seq) {
            debug!("Dropping tick {} result; tick {} already applied", seq, newest);
            return TickOutcome::Stale { seq, newest };
        }
        self.dashboard.apply(&snapshot);
        self.publish();
        TickOutcome::Applied { seq }
    }

    pub fn resize(&mut self, container_width: Option<f64>) {
        self.dashboard.resize(container_width);
        self.publish();
    }

    pub fn dashboard(&self) -> &Dashboard<RecordingCanvas> {
        &self.dashboard
    }

    fn publish(&self) {
        self.frames
            .send_replace(self.dashboard.frame(self.ledger.last_applied));
    }
}

/// Handles presenters use to talk to a running [`PollLoop`].
#[derive(Clone, Debug)]
pub struct PollHandle {
    pub frames: watch::Receiver<DashboardFrame>,
    pub viewport: mpsc::UnboundedSender<Option<f64>>,
}

/// Fetches a snapshot right away and then every `interval`, forever.
///
/// Fetches run alongside the timer, so a slow response never shifts the
/// schedule. Each response is tagged with its tick number and applied only if
/// no newer tick has been applied yet.
pub struct PollLoop<S> {
    source: S,
    state: PollState,
    interval: Duration,
    viewport_rx: mpsc::UnboundedReceiver<Option<f64>>,
}

impl<S: MetricsSource> PollLoop<S> {
    pub fn new(
        source: S,
        dashboard: Dashboard<RecordingCanvas>,
        interval: Duration,
    ) -> (Self, PollHandle) {
        let (state, frames) = PollState::new(dashboard);
        let (viewport, viewport_rx) = mpsc::unbounded_channel();
        let poll = Self {
            source,
            state,
            interval,
            viewport_rx,
        };
        (poll, PollHandle { frames, viewport })
    }

    pub async fn run(self, cancel: CancellationToken) {
        let Self {
            source,
            mut state,
            interval,
            mut viewport_rx,
        } = self;

        info!("Poll loop started with interval {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = FuturesUnordered::new();

        loop {
            // interval() ticks immediately on the first await, which gives the initial fetch.
            tokio::select! {
                _ = cancel.cancelled() => {
                    break;
                }
                _ = ticker.tick() => {
                    let seq = state.issue();
                    let source = &source;
                    in_flight.push(async move { (seq, source.fetch_dynamic().await) });
                }
                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    state.complete(seq, result);
                }
                Some(width) = viewport_rx.recv() => {
                    state.resize(width);
                }
            }
        }

        info!("Poll loop stopped ({} fetches in flight)", in_flight.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardSettings, Metric};
    use crate::render::canvas::Canvas;

    fn state() -> (PollState, watch::Receiver<DashboardFrame>) {
        PollState::new(Dashboard::with_recording(&DashboardSettings::default()).unwrap())
    }

    fn snapshot(cpu: f64, ram: f64) -> DynamicMetrics {
        DynamicMetrics {
            cpu_usage: cpu,
            ram_usage: ram,
            gpus: Some(vec![]),
        }
    }

    fn failure() -> FetchError {
        FetchError::Status {
            status: 503,
            url: "http://metrics/api/dynamic".to_string(),
        }
    }

    #[test]
    fn failed_tick_leaves_frame_untouched() {
        let (mut state, frames) = state();
        let s0 = state.issue();
        let outcome = state.complete(s0, Ok(snapshot(10.0, 20.0)));
        assert_eq!(outcome, TickOutcome::Applied { seq: 0 });
        let before = frames.borrow().clone();

        let s1 = state.issue();
        let outcome = state.complete(s1, Err(failure()));
        assert_eq!(outcome, TickOutcome::Skipped { seq: 1 });
        assert_eq!(*frames.borrow(), before);

        let s2 = state.issue();
        let outcome = state.complete(s2, Ok(snapshot(30.0, 40.0)));
        assert_eq!(outcome, TickOutcome::Applied { seq: 2 });
        let after = frames.borrow().clone();
        assert_eq!(after.seq, Some(2));
        assert_eq!(after.cpu.trend.samples, vec![10.0, 30.0]);
        assert_eq!(after.cpu.gauge.label.unwrap().text, "30.0%");
    }

    #[test]
    fn late_result_of_older_tick_is_dropped() {
        let (mut state, frames) = state();
        let slow = state.issue();
        let fast = state.issue();
        state.complete(fast, Ok(snapshot(50.0, 50.0)));
        assert_eq!(
            state.complete(slow, Ok(snapshot(1.0, 1.0))),
            TickOutcome::Stale { seq: 0, newest: 1 }
        );
        assert_eq!(state.dashboard().trend(Metric::Cpu).samples().len(), 1);
        assert_eq!(frames.borrow().cpu.gauge.label.as_ref().unwrap().text, "50.0%");
    }

    #[test]
    fn first_frame_is_blank() {
        let (_state, frames) = state();
        let frame = frames.borrow();
        assert_eq!(frame.seq, None);
        assert!(frame.cpu.trend.canvas.is_blank());
        assert_eq!(frame.cpu.gauge.label.as_ref().unwrap().text, "");
    }

    #[test]
    fn resize_republishes_with_same_seq() {
        let (mut state, frames) = state();
        let s = state.issue();
        state.complete(s, Ok(snapshot(10.0, 20.0)));
        state.resize(Some(480.0));
        let frame = frames.borrow();
        assert_eq!(frame.seq, Some(0));
        assert_eq!(frame.ram.trend.canvas.size().0, 480.0);
    }
}
