//! The widget set: two trend charts, two gauges and the device grid, wired to
//! their render targets and fed one metrics snapshot per tick.

use crate::error::RenderError;
use crate::metrics::DynamicMetrics;
use crate::render::canvas::{Canvas, Point, RecordingCanvas};
use crate::render::color::palette;
use crate::render::gauge::{render_gauge, GaugeStyle, Thresholds};
use crate::render::grid::{render_devices, GridContent};
use crate::render::sparkline::{TrendRenderer, TrendStyle};
use crate::render::target::{CardContainer, GaugeSlots};
use crate::storage::SPARK_MAX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpu,
    Ram,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Cpu => "cpu",
            Metric::Ram => "ram",
        })
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches(".svg") {
            "cpu" => Ok(Metric::Cpu),
            "ram" => Ok(Metric::Ram),
            other => Err(format!("unknown metric {other:?}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DashboardSettings {
    pub thresholds: Thresholds,
    pub capacity: usize,
    /// Clamp CPU/RAM into [0, 100] before they reach the widgets.
    pub clamp_samples: bool,
    pub cpu_gauge: bool,
    pub ram_gauge: bool,
    /// Measured width of the sparkline containers, if known.
    pub spark_width: Option<f64>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            capacity: SPARK_MAX,
            clamp_samples: false,
            cpu_gauge: true,
            ram_gauge: true,
            spark_width: None,
        }
    }
}

/// Widgets that failed during one dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub failed: Vec<&'static str>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, widget: &'static str, result: Result<(), RenderError>) {
        if let Err(e) = result {
            warn!("{} render failed: {}", widget, e);
            self.failed.push(widget);
        }
    }
}

pub struct Dashboard<C> {
    cpu_trend: TrendRenderer<C>,
    ram_trend: TrendRenderer<C>,
    cpu_gauge: GaugeSlots,
    ram_gauge: GaugeSlots,
    cpu_style: GaugeStyle,
    ram_style: GaugeStyle,
    devices: CardContainer,
    clamp_samples: bool,
}

impl<C: Canvas> Dashboard<C> {
    pub fn new(
        settings: &DashboardSettings,
        cpu_canvas: C,
        ram_canvas: C,
    ) -> Result<Self, RenderError> {
        let slots = |present: bool| {
            if present {
                GaugeSlots::present()
            } else {
                GaugeSlots::missing()
            }
        };
        Ok(Self {
            cpu_trend: TrendRenderer::new(
                cpu_canvas,
                TrendStyle::new(palette::CPU_GREEN).with_capacity(settings.capacity),
                settings.spark_width,
            )?,
            ram_trend: TrendRenderer::new(
                ram_canvas,
                TrendStyle::new(palette::RAM_BLUE).with_capacity(settings.capacity),
                settings.spark_width,
            )?,
            cpu_gauge: slots(settings.cpu_gauge),
            ram_gauge: slots(settings.ram_gauge),
            cpu_style: GaugeStyle::new(palette::CPU_GREEN).with_thresholds(settings.thresholds),
            ram_style: GaugeStyle::new(palette::RAM_BLUE).with_thresholds(settings.thresholds),
            devices: CardContainer::default(),
            clamp_samples: settings.clamp_samples,
        })
    }

    /// Feeds one snapshot to every widget. Each widget is driven on its own;
    /// a failure in one is logged and the rest still update.
    pub fn apply(&mut self, snapshot: &DynamicMetrics) -> DispatchReport {
        let clamped;
        let snapshot = if self.clamp_samples {
            clamped = snapshot.clamped();
            &clamped
        } else {
            snapshot
        };

        let mut report = DispatchReport::default();
        report.record("cpu sparkline", self.cpu_trend.push(snapshot.cpu_usage));
        report.record("ram sparkline", self.ram_trend.push(snapshot.ram_usage));

        let g = &mut self.cpu_gauge;
        render_gauge(g.arc.as_mut(), g.label.as_mut(), snapshot.cpu_usage, &self.cpu_style);
        let g = &mut self.ram_gauge;
        render_gauge(g.arc.as_mut(), g.label.as_mut(), snapshot.ram_usage, &self.ram_style);

        render_devices(&mut self.devices, snapshot.devices());
        report
    }

    /// Viewport change: both trend surfaces follow the new container width.
    pub fn resize(&mut self, container_width: Option<f64>) -> DispatchReport {
        let mut report = DispatchReport::default();
        report.record("cpu sparkline", self.cpu_trend.resize(container_width));
        report.record("ram sparkline", self.ram_trend.resize(container_width));
        report
    }

    pub fn trend(&self, metric: Metric) -> &TrendRenderer<C> {
        match metric {
            Metric::Cpu => &self.cpu_trend,
            Metric::Ram => &self.ram_trend,
        }
    }

    pub fn gauge(&self, metric: Metric) -> &GaugeSlots {
        match metric {
            Metric::Cpu => &self.cpu_gauge,
            Metric::Ram => &self.ram_gauge,
        }
    }

    pub fn devices(&self) -> &CardContainer {
        &self.devices
    }
}

impl Dashboard<RecordingCanvas> {
    pub fn with_recording(settings: &DashboardSettings) -> Result<Self, RenderError> {
        Self::new(settings, RecordingCanvas::new(), RecordingCanvas::new())
    }

    /// Snapshot of every render target, for presenters.
    pub fn frame(&self, seq: Option<u64>) -> DashboardFrame {
        let widget = |metric: Metric| WidgetFrame {
            gauge: self.gauge(metric).clone(),
            trend: TrendFrame {
                samples: self.trend(metric).samples().values().collect(),
                points: self.trend(metric).points(),
                canvas: self.trend(metric).canvas().clone(),
            },
        };
        DashboardFrame {
            seq,
            cpu: widget(Metric::Cpu),
            ram: widget(Metric::Ram),
            devices: self.devices.content.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrendFrame {
    pub samples: Vec<f64>,
    pub points: Vec<Point>,
    pub canvas: RecordingCanvas,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WidgetFrame {
    pub gauge: GaugeSlots,
    pub trend: TrendFrame,
}

/// State of all render targets after the last applied tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardFrame {
    /// Sequence number of the tick that produced this frame.
    pub seq: Option<u64>,
    pub cpu: WidgetFrame,
    pub ram: WidgetFrame,
    pub devices: GridContent,
}

impl DashboardFrame {
    pub fn widget(&self, metric: Metric) -> &WidgetFrame {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Ram => &self.ram,
        }
    }
}
