//! Device card grid.

use crate::metrics::DeviceMetric;
use crate::render::target::CardContainer;
use serde::Serialize;
use std::time::Duration;

pub const NO_DEVICE_MESSAGE: &str = "No GPU detected";
/// Entrance delay added per card index.
pub const STAGGER: Duration = Duration::from_millis(60);

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridContent {
    /// Nothing rendered yet.
    #[default]
    Empty,
    Placeholder { message: String },
    Cards { cards: Vec<DeviceCard> },
}

impl GridContent {
    pub fn cards(&self) -> &[DeviceCard] {
        match self {
            GridContent::Cards { cards } => cards,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceCard {
    pub name: String,
    pub load: String,
    pub temp: String,
    pub mem_used: String,
    pub mem_total: String,
    /// Bar widths in percent, formatted with one decimal.
    pub load_bar: String,
    pub mem_bar: String,
    #[serde(serialize_with = "as_secs")]
    pub entrance_delay: Duration,
}

impl DeviceCard {
    fn build(index: usize, device: &DeviceMetric) -> Self {
        let load = format!("{:.1}", device.load);
        let mem_used = device.mem_used.unwrap_or(0.0);
        let mem_pct = match device.mem_total {
            Some(total) if total != 0.0 => mem_used / total * 100.0,
            _ => 0.0,
        };
        Self {
            name: device.name.clone(),
            load_bar: load.clone(),
            load,
            temp: format!("{}°C", device.temp),
            mem_used: format!("{:.0} MB", mem_used),
            mem_total: format!("{:.0} MB", device.mem_total.unwrap_or(0.0)),
            mem_bar: format!("{mem_pct:.1}"),
            entrance_delay: STAGGER * index as u32,
        }
    }

    pub fn load_bar_pct(&self) -> f64 {
        self.load_bar.parse().unwrap_or(0.0)
    }

    pub fn mem_bar_pct(&self) -> f64 {
        self.mem_bar.parse().unwrap_or(0.0)
    }
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Replaces the container's content with one card per device, or with the
/// placeholder when there are none.
pub fn render_devices(container: &mut CardContainer, devices: Option<&[DeviceMetric]>) {
    container.content = match devices {
        Some(devices) if !devices.is_empty() => GridContent::Cards {
            cards: devices
                .iter()
                .enumerate()
                .map(|(i, d)| DeviceCard::build(i, d))
                .collect(),
        },
        _ => GridContent::Placeholder {
            message: NO_DEVICE_MESSAGE.to_string(),
        },
    };
}
