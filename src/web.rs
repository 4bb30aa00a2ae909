use crate::clock::Clock;
use crate::dashboard::{DashboardFrame, Metric};
use crate::metrics::{ErrorResponse, StaticInfo};
use crate::render::gauge::gauge_svg;
use crate::source::HttpMetricsSource;
use crate::static_refresh::{ControlView, StaticRefresh, TriggerOutcome};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub frames: watch::Receiver<DashboardFrame>,
    pub viewport: mpsc::UnboundedSender<Option<f64>>,
    pub refresh: Arc<StaticRefresh>,
    pub source: Arc<HttpMetricsSource>,
    pub clock: Clock,
    pub shutdown: CancellationToken,
}

#[derive(Deserialize)]
pub struct ViewportRequest {
    pub width: Option<f64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/frame", get(get_frame))
        .route("/api/clock", get(get_clock))
        .route("/api/stream", get(stream))
        .route("/api/sparkline/:metric", get(sparkline_svg))
        .route("/api/gauge/:metric", get(gauge_image))
        .route("/api/static/refresh", get(refresh_state).post(refresh_static))
        .route("/api/viewport", post(set_viewport))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

fn not_found(msg: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: msg.into() }),
    )
        .into_response()
}

fn svg(body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
        .into_response()
}

async fn get_frame(State(state): State<AppState>) -> impl IntoResponse {
    let frame = state.frames.borrow().clone();
    if frame.seq.is_none() {
        return not_found("no data yet");
    }
    (StatusCode::OK, Json(frame)).into_response()
}

async fn get_clock(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.clock.readout())
}

async fn sparkline_svg(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> impl IntoResponse {
    let Ok(metric) = metric.parse::<Metric>() else {
        return not_found(format!("unknown metric {metric:?}"));
    };
    let body = state.frames.borrow().widget(metric).trend.canvas.to_svg();
    svg(body)
}

async fn gauge_image(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> impl IntoResponse {
    let Ok(metric) = metric.parse::<Metric>() else {
        return not_found(format!("unknown metric {metric:?}"));
    };
    let body = {
        let frame = state.frames.borrow();
        let gauge = &frame.widget(metric).gauge;
        match (&gauge.arc, &gauge.label) {
            (Some(arc), label) => Some(gauge_svg(arc, label.as_ref())),
            (None, _) => None,
        }
    };
    match body {
        Some(body) => svg(body),
        None => not_found(format!("{metric} gauge is not part of this layout")),
    }
}

#[derive(Serialize)]
struct RefreshResponse {
    outcome: Option<&'static str>,
    control: ControlView,
    info: Option<StaticInfo>,
}

async fn refresh_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(RefreshResponse {
        outcome: None,
        control: state.refresh.view(),
        info: state.refresh.info(),
    })
}

async fn refresh_static(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.refresh.trigger(state.source.as_ref()).await;
    let (status, outcome) = match outcome {
        TriggerOutcome::Refreshed => (StatusCode::OK, "refreshed"),
        TriggerOutcome::Failed => (StatusCode::BAD_GATEWAY, "failed"),
        TriggerOutcome::Ignored => (StatusCode::CONFLICT, "ignored"),
    };
    (
        status,
        Json(RefreshResponse {
            outcome: Some(outcome),
            control: state.refresh.view(),
            info: state.refresh.info(),
        }),
    )
}

async fn set_viewport(
    State(state): State<AppState>,
    Json(req): Json<ViewportRequest>,
) -> impl IntoResponse {
    if state.viewport.send(req.width).is_err() {
        warn!("Viewport change dropped: poll loop is not running");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::ACCEPTED
}

async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let shutdown = state.shutdown.clone();
    let stream = WatchStream::new(state.frames.clone())
        .take_until(async move { shutdown.cancelled().await })
        .filter(|frame| futures::future::ready(frame.seq.is_some()))
        .map(|frame| match serde_json::to_string(&frame) {
            Ok(json) => Ok(Event::default().data(json)),
            Err(e) => Ok(Event::default()
                .event("error")
                .data(format!("serialize_error: {e}"))),
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(10))
            .text("keep-alive"),
    )
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Telemetry Dashboard</title>
  <style>
    :root { --bg: #0b0f19; --panel: #0f1626; --border: #2a3550; --text: #e5e7eb; --muted: #9ca3af; }
    body { background: var(--bg); color: var(--text); font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; margin: 24px; }
    .topbar { display: flex; gap: 18px; align-items: baseline; flex-wrap: wrap; margin-bottom: 16px; }
    #clock { font-size: 28px; }
    .muted { color: var(--muted); }
    .row { display: flex; gap: 24px; flex-wrap: wrap; }
    .panel { background: var(--panel); border: 1px solid var(--border); border-radius: 12px; padding: 12px; flex: 1; min-width: 260px; }
    .spark { width: 100%; }
    .gpu-card { background: var(--panel); border: 1px solid var(--border); border-radius: 12px; padding: 12px; min-width: 240px; opacity: 0; animation: rise 0.4s ease forwards; }
    @keyframes rise { from { opacity: 0; transform: translateY(8px); } to { opacity: 1; transform: none; } }
    .gpu-bar { height: 6px; background: #1c2740; border-radius: 3px; margin: 4px 0 8px 0; }
    .gpu-bar-fill { height: 100%; background: #00e5a0; border-radius: 3px; }
    .gpu-bar-fill--mem { background: #4090e0; }
    .host { display: grid; grid-template-columns: max-content 1fr; gap: 2px 14px; margin-bottom: 16px; }
    .disk { display: flex; gap: 12px; align-items: center; }
    .disk .gpu-bar { flex: 1; min-width: 120px; margin: 0; }
    button { background: #111a2d; color: var(--text); border: 1px solid var(--border); border-radius: 8px; padding: 6px 10px; cursor: pointer; }
  </style>
</head>
<body>
  <div class="topbar">
    <span id="clock">--:--:--</span>
    <span id="date" class="muted"></span>
    <span class="muted">UPTIME <span id="uptime">00:00:00</span></span>
    <button id="refresh-btn" class="refresh-btn" type="button">↺ REFRESH STATIC</button>
  </div>
  <div class="panel" id="host-panel">
    <div class="muted">HOST</div>
    <div class="host" id="host-info"><span class="muted">host info not loaded</span></div>
    <div id="host-disks"></div>
  </div>
  <div class="row">
    <div class="panel" id="cpu-panel">
      <div class="muted">CPU</div>
      <img id="cpu-gauge" alt="CPU gauge"/>
      <img id="cpu-spark" class="spark" alt="CPU trend"/>
    </div>
    <div class="panel" id="ram-panel">
      <div class="muted">RAM</div>
      <img id="ram-gauge" alt="RAM gauge"/>
      <img id="ram-spark" class="spark" alt="RAM trend"/>
    </div>
  </div>
  <h3>GPU</h3>
  <div class="row" id="gpu-grid"></div>
  <script>
    const grid = document.getElementById('gpu-grid');

    function reportViewport() {
      const panel = document.getElementById('cpu-panel');
      fetch('/api/viewport', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ width: panel.clientWidth - 24 })
      }).catch(() => {});
    }
    window.addEventListener('resize', reportViewport);
    reportViewport();

    function card(c) {
      const el = document.createElement('div');
      el.className = 'gpu-card';
      el.style.animationDelay = c.entrance_delay + 's';
      el.innerHTML =
        '<div><b></b></div>' +
        '<div class="muted">LOAD ' + c.load + '% &middot; TEMP ' + c.temp + '</div>' +
        '<div class="muted">VRAM ' + c.mem_used + ' / ' + c.mem_total + '</div>' +
        '<div class="muted">GPU LOAD ' + c.load_bar + '%</div>' +
        '<div class="gpu-bar"><div class="gpu-bar-fill" style="width:' + c.load_bar + '%"></div></div>' +
        '<div class="muted">VRAM ' + c.mem_bar + '%</div>' +
        '<div class="gpu-bar"><div class="gpu-bar-fill gpu-bar-fill--mem" style="width:' + c.mem_bar + '%"></div></div>';
      el.querySelector('b').textContent = c.name;
      return el;
    }

    function apply(frame) {
      const bust = '?seq=' + frame.seq;
      for (const m of ['cpu', 'ram']) {
        document.getElementById(m + '-spark').src = '/api/sparkline/' + m + bust;
        const gauge = document.getElementById(m + '-gauge');
        if (frame[m].gauge.arc) gauge.src = '/api/gauge/' + m + bust;
        else gauge.style.display = 'none';
      }
      grid.replaceChildren();
      if (frame.devices.kind === 'placeholder') {
        const msg = document.createElement('div');
        msg.className = 'muted';
        msg.textContent = frame.devices.message;
        grid.appendChild(msg);
      } else if (frame.devices.kind === 'cards') {
        frame.devices.cards.forEach(c => grid.appendChild(card(c)));
      }
    }

    new EventSource('/api/stream').onmessage = ev => apply(JSON.parse(ev.data));

    async function tickClock() {
      try {
        const r = await (await fetch('/api/clock')).json();
        document.getElementById('clock').textContent = r.time;
        document.getElementById('date').textContent = r.date;
        document.getElementById('uptime').textContent = r.uptime;
      } catch (e) {}
    }
    setInterval(tickClock, 1000);
    tickClock();

    function showHost(info) {
      if (!info) return;
      const host = document.getElementById('host-info');
      host.replaceChildren();
      const facts = [
        ['HOSTNAME', info.hostname],
        ['OS', info.os],
        ['PROCESSOR', info.processor],
        ['ARCH', info.arch],
        ['RAM', info.ram_total.toFixed(1) + ' GB'],
      ];
      for (const [k, v] of facts) {
        const key = document.createElement('span');
        key.className = 'muted';
        key.textContent = k;
        const val = document.createElement('span');
        val.textContent = v;
        host.append(key, val);
      }
      const disks = document.getElementById('host-disks');
      disks.replaceChildren();
      for (const d of info.disks) {
        const row = document.createElement('div');
        row.className = 'disk';
        row.innerHTML =
          '<span class="mount"></span>' +
          '<span class="muted">' + d.total.toFixed(1) + ' GB</span>' +
          '<div class="gpu-bar"><div class="gpu-bar-fill gpu-bar-fill--mem" style="width:' +
          Math.min(Math.max(d.percent, 0), 100) + '%"></div></div>' +
          '<span>' + d.percent.toFixed(1) + '%</span>';
        row.querySelector('.mount').textContent = d.mountpoint;
        disks.appendChild(row);
      }
    }

    const btn = document.getElementById('refresh-btn');
    function showControl(r) {
      btn.textContent = r.control.label;
      btn.disabled = !r.control.enabled;
      showHost(r.info);
    }
    async function loadStatic() {
      try {
        showControl(await (await fetch('/api/static/refresh')).json());
      } catch (e) {}
    }
    loadStatic();

    btn.addEventListener('click', async () => {
      btn.disabled = true;
      btn.textContent = '↻ REFRESHING...';
      try {
        showControl(await (await fetch('/api/static/refresh', { method: 'POST' })).json());
      } catch (e) {
        btn.textContent = '✗ FAILED';
        btn.disabled = false;
      }
      setTimeout(loadStatic, 2100);
    });
  </script>
</body>
</html>"#;
