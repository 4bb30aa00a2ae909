use crate::dashboard::DashboardSettings;
use crate::error::ConfigError;
use crate::poll::REFRESH_MS;
use crate::render::gauge::{Thresholds, DEFAULT_CRIT, DEFAULT_WARN};
use crate::storage::SPARK_MAX;
use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone, Debug, ValueEnum)]
pub enum Mode {
    Console,
    Web,
    Both,
}

#[derive(Clone, Debug, Parser)]
#[command(
    name = "telemetry_dashboard",
    about = "Live CPU/RAM/GPU dashboard fed by a remote metrics endpoint"
)]
pub struct Config {
    /// Base URL of the metrics server
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub endpoint: String,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = REFRESH_MS)]
    pub refresh_ms: u64,

    /// Samples kept per trend chart
    #[arg(long, default_value_t = SPARK_MAX)]
    pub spark_capacity: usize,

    /// Gauge warning threshold (percent)
    #[arg(long, default_value_t = DEFAULT_WARN)]
    pub warn: f64,

    /// Gauge critical threshold (percent)
    #[arg(long, default_value_t = DEFAULT_CRIT)]
    pub crit: f64,

    /// Output mode (console/web/both)
    #[arg(long, value_enum, default_value_t = Mode::Console)]
    pub mode: Mode,

    /// Bind address for HTTP server
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// HTTP server port
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Clamp CPU/RAM samples into [0, 100]
    #[arg(long, default_value_t = false)]
    pub clamp_samples: bool,

    /// Lay out the dashboard without a CPU gauge
    #[arg(long, default_value_t = false)]
    pub no_cpu_gauge: bool,

    /// Lay out the dashboard without a RAM gauge
    #[arg(long, default_value_t = false)]
    pub no_ram_gauge: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_ms == 0 {
            return Err(ConfigError::ZeroRefresh);
        }
        if self.spark_capacity < 2 {
            return Err(ConfigError::CapacityTooSmall(self.spark_capacity));
        }
        if self.warn.is_nan() || self.crit.is_nan() || self.warn > self.crit {
            return Err(ConfigError::ThresholdOrder {
                warn: self.warn,
                crit: self.crit,
            });
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::Endpoint(self.endpoint.clone()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn web_addr(&self) -> SocketAddr {
        SocketAddr::from((self.bind, self.port))
    }

    pub fn web_enabled(&self) -> bool {
        matches!(self.mode, Mode::Web | Mode::Both)
    }

    pub fn console_enabled(&self) -> bool {
        matches!(self.mode, Mode::Console | Mode::Both)
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            thresholds: Thresholds {
                warn: self.warn,
                crit: self.crit,
            },
            capacity: self.spark_capacity,
            clamp_samples: self.clamp_samples,
            cpu_gauge: !self.no_cpu_gauge,
            ram_gauge: !self.no_ram_gauge,
            spark_width: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("telemetry_dashboard").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_built_in_constants() {
        let cfg = parse(&[]);
        assert_eq!(cfg.interval(), Duration::from_millis(2000));
        assert_eq!(cfg.spark_capacity, 60);
        assert_eq!((cfg.warn, cfg.crit), (85.0, 95.0));
        assert!(cfg.console_enabled());
        assert!(!cfg.web_enabled());
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let cfg = parse(&["--warn", "96", "--crit", "90"]);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ThresholdOrder {
                warn: 96.0,
                crit: 90.0
            })
        );
    }

    #[test]
    fn rejects_tiny_window_and_zero_refresh() {
        assert_eq!(
            parse(&["--spark-capacity", "1"]).validate(),
            Err(ConfigError::CapacityTooSmall(1))
        );
        assert_eq!(
            parse(&["--refresh-ms", "0"]).validate(),
            Err(ConfigError::ZeroRefresh)
        );
    }

    #[test]
    fn layout_flags_drop_gauges() {
        let settings = parse(&["--no-ram-gauge", "--mode", "both"]).dashboard_settings();
        assert!(settings.cpu_gauge);
        assert!(!settings.ram_gauge);
    }
}
