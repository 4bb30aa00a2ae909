mod common;

use common::{scenario, snapshot, ScriptedSource, Step};
use std::sync::Arc;
use std::time::Duration;
use telemetry_dashboard::dashboard::{Dashboard, DashboardSettings};
use telemetry_dashboard::poll::{PollHandle, PollLoop};
use telemetry_dashboard::render::Canvas;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_millis(2000);

type Running = (
    Arc<ScriptedSource>,
    PollHandle,
    CancellationToken,
    JoinHandle<()>,
);

fn start(steps: Vec<Step>) -> Running {
    let source = Arc::new(ScriptedSource::new(steps));
    let dashboard = Dashboard::with_recording(&DashboardSettings::default()).unwrap();
    let (poll, handle) = PollLoop::new(source.clone(), dashboard, INTERVAL);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(poll.run(cancel.clone()));
    (source, handle, cancel, task)
}

async fn advance_to(ms: u64, origin: tokio::time::Instant) {
    tokio::time::sleep_until(origin + Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn fetches_immediately_then_every_interval() {
    let origin = tokio::time::Instant::now();
    let (source, _handle, cancel, task) = start(vec![]);

    advance_to(1, origin).await;
    assert_eq!(source.calls(), 1);
    advance_to(1999, origin).await;
    assert_eq!(source.calls(), 1);
    advance_to(2001, origin).await;
    assert_eq!(source.calls(), 2);
    advance_to(6001, origin).await;
    assert_eq!(source.calls(), 4);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_tick_keeps_previous_frame_and_next_tick_recovers() {
    let origin = tokio::time::Instant::now();
    let (_source, handle, cancel, task) = start(vec![
        Step::ok(snapshot(10.0, 20.0)),
        Step::fail(500),
        Step::ok(snapshot(30.0, 40.0)),
    ]);

    advance_to(1, origin).await;
    let after_first = handle.frames.borrow().clone();
    assert_eq!(after_first.seq, Some(0));

    advance_to(2001, origin).await;
    assert_eq!(*handle.frames.borrow(), after_first);

    advance_to(4001, origin).await;
    let frame = handle.frames.borrow().clone();
    assert_eq!(frame.seq, Some(2));
    assert_eq!(frame.cpu.trend.samples, vec![10.0, 30.0]);
    assert_eq!(frame.ram.gauge.label.unwrap().text, "40.0%");

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_response_never_delays_the_timer() {
    let origin = tokio::time::Instant::now();
    let (source, _handle, cancel, task) = start(vec![
        Step::ok(snapshot(1.0, 1.0)).after(Duration::from_millis(5000)),
        Step::ok(snapshot(2.0, 2.0)),
    ]);

    advance_to(4001, origin).await;
    assert_eq!(source.calls(), 3);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stale_response_does_not_overwrite_newer_one() {
    let origin = tokio::time::Instant::now();
    let (_source, handle, cancel, task) = start(vec![
        Step::ok(snapshot(1.0, 1.0)).after(Duration::from_millis(3000)),
        Step::ok(snapshot(50.0, 60.0)),
    ]);

    advance_to(2001, origin).await;
    assert_eq!(handle.frames.borrow().seq, Some(1));

    advance_to(3001, origin).await;
    let frame = handle.frames.borrow().clone();
    assert_eq!(frame.seq, Some(1));
    assert_eq!(frame.cpu.trend.samples, vec![50.0]);
    assert_eq!(frame.cpu.gauge.label.unwrap().text, "50.0%");

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn end_to_end_scenario_renders_every_widget() {
    let origin = tokio::time::Instant::now();
    let (_source, handle, cancel, task) = start(vec![Step::ok(scenario())]);

    advance_to(1, origin).await;
    let frame = handle.frames.borrow().clone();
    let cpu_arc = frame.cpu.gauge.arc.as_ref().unwrap();
    assert_eq!(frame.cpu.gauge.label.as_ref().unwrap().text, "42.3%");
    assert_eq!(cpu_arc.stroke.unwrap().to_string(), "#00e5a0");
    assert_eq!(frame.ram.gauge.label.as_ref().unwrap().text, "67.8%");
    assert_eq!(
        frame.ram.gauge.arc.as_ref().unwrap().stroke.unwrap().to_string(),
        "#4090e0"
    );
    let cards = frame.devices.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].load_bar_pct(), 10.0);
    assert_eq!(cards[0].mem_bar_pct(), 12.5);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn viewport_changes_resize_without_losing_samples() {
    let origin = tokio::time::Instant::now();
    let (_source, handle, cancel, task) = start(vec![
        Step::ok(snapshot(10.0, 10.0)),
        Step::ok(snapshot(20.0, 20.0)),
    ]);

    advance_to(2001, origin).await;
    handle.viewport.send(Some(320.0)).unwrap();
    advance_to(2002, origin).await;

    let frame = handle.frames.borrow().clone();
    assert_eq!(frame.cpu.trend.canvas.size(), (320.0, 40.0));
    assert_eq!(frame.cpu.trend.samples, vec![10.0, 20.0]);
    assert!(!frame.cpu.trend.canvas.is_blank());

    cancel.cancel();
    task.await.unwrap();
}
