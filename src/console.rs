use crate::clock::Clock;
use crate::dashboard::{DashboardFrame, Metric, TrendFrame};
use crate::metrics::StaticInfo;
use crate::render::canvas::{Canvas, DrawOp};
use crate::render::color::Color as Rgba;
use crate::render::grid::GridContent;
use crate::static_refresh::StaticRefresh;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::ExecutableCommand;
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::error;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
/// Columns taken by the label in front of a trend row.
const ROW_PREFIX: u16 = 14;
const BAR_WIDTH: usize = 24;
const DISK_BAR_WIDTH: usize = 16;
/// Used when the terminal size cannot be read.
const DEFAULT_COLS: u16 = 80;

pub struct ConsoleView {
    pub frames: watch::Receiver<DashboardFrame>,
    /// Where terminal width changes are forwarded. `None` when another
    /// presenter owns the sparkline surface width.
    pub viewport: Option<mpsc::UnboundedSender<Option<f64>>>,
    pub refresh: Arc<StaticRefresh>,
    pub clock: Clock,
}

/// Glyphs available for one trend row on a terminal `term_cols` wide.
pub fn glyph_cols(term_cols: u16) -> usize {
    usize::from(term_cols.saturating_sub(ROW_PREFIX + 1))
}

/// Redraws the terminal every `interval` until cancelled. Runs on its own
/// timer so the clock keeps moving while a fetch is outstanding.
pub async fn run_console(view: ConsoleView, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_cols: Option<u16> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            _ = ticker.tick() => {
                let cols = terminal::size().map(|(c, _)| c).unwrap_or(DEFAULT_COLS);
                if last_cols != Some(cols) {
                    last_cols = Some(cols);
                    if let Some(viewport) = &view.viewport {
                        let width = glyph_cols(cols) as f64;
                        // A closed channel means the poll loop is gone; shutdown follows.
                        let _ = viewport.send(Some(width));
                    }
                }
                let frame = view.frames.borrow().clone();
                let host = view.refresh.info();
                if let Err(e) = render_once(&frame, &view, host.as_ref(), glyph_cols(cols)) {
                    error!("Console render error: {}", e);
                }
            }
        }
    }
}

fn render_once(
    frame: &DashboardFrame,
    view: &ConsoleView,
    host: Option<&StaticInfo>,
    spark_cols: usize,
) -> std::io::Result<()> {
    let mut out = stdout();
    out.execute(MoveTo(0, 0))?;
    out.execute(Clear(ClearType::All))?;

    let clock = view.clock.readout();
    writeln!(
        out,
        "Telemetry Dashboard   {}   {}   UP {}",
        clock.time.as_str().bold(),
        clock.date,
        clock.uptime
    )?;
    let control = view.refresh.view();
    writeln!(out, "Press Ctrl+C to exit.   [{}]", control.label)?;
    for line in host_lines(host) {
        writeln!(out, "{}", line.as_str().dim())?;
    }
    writeln!(out)?;

    if frame.seq.is_none() {
        writeln!(out, "Waiting for first sample...")?;
    }

    for metric in [Metric::Cpu, Metric::Ram] {
        let widget = frame.widget(metric);
        let gauge = match (&widget.gauge.arc, &widget.gauge.label) {
            (Some(arc), Some(label)) if !label.text.is_empty() => {
                let color = arc.stroke.map(term_color).unwrap_or(Color::White);
                format!("{:>7}", label.text).with(color).to_string()
            }
            _ => format!("{:>7}", "--"),
        };
        let spark = trend_glyphs(&widget.trend, spark_cols);
        let spark_color = widget
            .gauge
            .arc
            .as_ref()
            .and_then(|a| a.stroke)
            .map(term_color)
            .unwrap_or(Color::Grey);
        writeln!(
            out,
            "{:<4} {}  {}",
            metric.to_string().to_uppercase(),
            gauge,
            spark.with(spark_color)
        )?;
    }
    writeln!(out)?;

    match &frame.devices {
        GridContent::Empty => {}
        GridContent::Placeholder { message } => writeln!(out, "{}", message.as_str().dim())?,
        GridContent::Cards { cards } => {
            for card in cards {
                writeln!(
                    out,
                    "{}   LOAD {}%   TEMP {}   VRAM {} / {}",
                    card.name.as_str().bold(),
                    card.load,
                    card.temp,
                    card.mem_used,
                    card.mem_total
                )?;
                writeln!(
                    out,
                    "  GPU LOAD {} {}%",
                    text_bar(card.load_bar_pct(), BAR_WIDTH),
                    card.load_bar
                )?;
                writeln!(
                    out,
                    "  VRAM     {} {}%",
                    text_bar(card.mem_bar_pct(), BAR_WIDTH),
                    card.mem_bar
                )?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Host facts from the last static refresh: identity, memory and one row per disk.
pub fn host_lines(info: Option<&StaticInfo>) -> Vec<String> {
    let Some(info) = info else {
        return vec!["host info not loaded".to_string()];
    };
    let mut lines = vec![
        format!("HOST {}   OS {}", info.hostname, info.os),
        format!(
            "CPU  {}   ARCH {}   RAM {:.1} GB",
            info.processor, info.arch, info.ram_total
        ),
    ];
    for disk in &info.disks {
        lines.push(format!(
            "DISK {:<12} {:>8.1} GB {} {:.1}%",
            disk.mountpoint,
            disk.total,
            text_bar(disk.percent, DISK_BAR_WIDTH),
            disk.percent
        ));
    }
    lines
}

fn term_color(c: Rgba) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Samples the drawn trend line at `cols` evenly spaced columns and maps each
/// height to a block glyph. Columns left of the first sample stay blank.
pub fn trend_glyphs(trend: &TrendFrame, cols: usize) -> String {
    let line = trend.canvas.ops().iter().find_map(|op| match op {
        DrawOp::Stroke { points, .. } => Some(points),
        _ => None,
    });
    let Some(points) = line.filter(|p| p.len() >= 2) else {
        return " ".repeat(cols);
    };
    let (w, h) = trend.canvas.size();
    if cols == 0 || w <= 0.0 || h <= 0.0 {
        return String::new();
    }

    (0..cols)
        .map(|c| {
            let x = (c as f64 + 0.5) / cols as f64 * w;
            if x < points[0].x {
                return ' ';
            }
            let y = match points.windows(2).find(|s| x <= s[1].x) {
                Some(s) if s[1].x > s[0].x => {
                    let t = (x - s[0].x) / (s[1].x - s[0].x);
                    s[0].y + t * (s[1].y - s[0].y)
                }
                Some(s) => s[1].y,
                None => points[points.len() - 1].y,
            };
            let level = ((h - y) / h * LEVELS.len() as f64).floor();
            LEVELS[(level.max(0.0) as usize).min(LEVELS.len() - 1)]
        })
        .collect()
}

pub fn text_bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0).clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "·".repeat(width - filled))
}
