#![allow(dead_code)]

use axum::Router;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use telemetry_dashboard::error::FetchError;
use telemetry_dashboard::metrics::{DeviceMetric, DynamicMetrics, StaticInfo};
use telemetry_dashboard::source::MetricsSource;

pub fn scenario() -> DynamicMetrics {
    DynamicMetrics {
        cpu_usage: 42.3,
        ram_usage: 67.8,
        gpus: Some(vec![DeviceMetric {
            name: "GPU0".to_string(),
            load: 10.0,
            temp: 55.0,
            mem_used: Some(1024.0),
            mem_total: Some(8192.0),
        }]),
    }
}

pub fn snapshot(cpu: f64, ram: f64) -> DynamicMetrics {
    DynamicMetrics {
        cpu_usage: cpu,
        ram_usage: ram,
        gpus: None,
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub struct Step {
    pub delay: Duration,
    pub result: Result<DynamicMetrics, u16>,
}

impl Step {
    pub fn ok(m: DynamicMetrics) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(m),
        }
    }

    pub fn fail(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(status),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// In-process source that answers fetches from a script, one step per call.
/// An exhausted script answers 503.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetricsSource for ScriptedSource {
    async fn fetch_dynamic(&self) -> Result<DynamicMetrics, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Err(FetchError::Status {
                status: 503,
                url: "scripted".to_string(),
            });
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result.map_err(|status| FetchError::Status {
            status,
            url: "scripted".to_string(),
        })
    }

    async fn refresh_static(&self) -> Result<StaticInfo, FetchError> {
        Ok(StaticInfo::default())
    }
}
