//! The "refresh static info" control: a guarded one-shot request with a
//! status label, independent of the poll loop.

use crate::metrics::StaticInfo;
use crate::source::MetricsSource;
use serde::Serialize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const IDLE_LABEL: &str = "↺ REFRESH STATIC";
pub const BUSY_LABEL: &str = "↻ REFRESHING...";
pub const DONE_LABEL: &str = "✓ REFRESHED";
pub const FAILED_LABEL: &str = "✗ FAILED";
/// How long the success label stays up, with the control disabled.
pub const DONE_HOLD: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Refreshing,
    Refreshed { until: Instant },
    Failed,
}

/// Label and enabled flag of the control at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControlView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    Refreshed,
    Failed,
    /// A refresh was in flight or just finished; the press was ignored.
    Ignored,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    info: Option<StaticInfo>,
}

#[derive(Debug)]
pub struct StaticRefresh {
    inner: RwLock<Inner>,
}

impl Default for StaticRefresh {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticRefresh {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                phase: Phase::Idle,
                info: None,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        match self.inner.write() {
            Ok(g) => g,
            // Continue with the inner value even if poisoned.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn view(&self) -> ControlView {
        self.view_at(Instant::now())
    }

    pub fn view_at(&self, now: Instant) -> ControlView {
        let (label, enabled) = match self.read().phase {
            Phase::Idle => (IDLE_LABEL, true),
            Phase::Refreshing => (BUSY_LABEL, false),
            Phase::Refreshed { until } if now < until => (DONE_LABEL, false),
            Phase::Refreshed { .. } => (IDLE_LABEL, true),
            Phase::Failed => (FAILED_LABEL, true),
        };
        ControlView { label, enabled }
    }

    /// Host facts from the last successful refresh.
    pub fn info(&self) -> Option<StaticInfo> {
        self.read().info.clone()
    }

    /// Moves to `Refreshing` if the control is enabled at `now`.
    fn begin(&self, now: Instant) -> bool {
        let mut guard = self.write();
        let enabled = match guard.phase {
            Phase::Idle | Phase::Failed => true,
            Phase::Refreshed { until } => now >= until,
            Phase::Refreshing => false,
        };
        if enabled {
            guard.phase = Phase::Refreshing;
        }
        enabled
    }

    /// Runs one refresh request unless one is already in progress.
    pub async fn trigger<S: MetricsSource>(&self, source: &S) -> TriggerOutcome {
        if !self.begin(Instant::now()) {
            return TriggerOutcome::Ignored;
        }
        let mut pending = Pending {
            control: self,
            settled: false,
        };
        let result = source.refresh_static().await;
        pending.settled = true;
        let mut guard = self.write();
        match result {
            Ok(info) => {
                info!("Static info refreshed for host {:?}", info.hostname);
                guard.info = Some(info);
                guard.phase = Phase::Refreshed {
                    until: Instant::now() + DONE_HOLD,
                };
                TriggerOutcome::Refreshed
            }
            Err(e) => {
                warn!("Static refresh failed: {}", e);
                guard.phase = Phase::Failed;
                TriggerOutcome::Failed
            }
        }
    }
}

/// Puts an abandoned refresh back to idle so the control is not stuck busy.
struct Pending<'a> {
    control: &'a StaticRefresh,
    settled: bool,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut guard = self.control.write();
        if guard.phase == Phase::Refreshing {
            guard.phase = Phase::Idle;
        }
    }
}
