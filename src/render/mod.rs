pub mod canvas;
pub mod color;
pub mod gauge;
pub mod grid;
pub mod sparkline;
pub mod target;

pub use canvas::{Canvas, DrawOp, Point, RecordingCanvas};
pub use color::{palette, Color};
pub use gauge::{render_gauge, GaugeStyle, Severity, Thresholds};
pub use grid::{render_devices, DeviceCard, GridContent};
pub use sparkline::{TrendRenderer, TrendStyle};
