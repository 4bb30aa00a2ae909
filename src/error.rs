use thiserror::Error;

/// Failure to obtain a payload from the metrics endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, timeout, TLS failure, etc.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Body was not a valid payload.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure while drawing into a surface.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("refresh interval must be positive")]
    ZeroRefresh,

    #[error("sparkline capacity must be at least 2, got {0}")]
    CapacityTooSmall(usize),

    #[error("warn threshold {warn} must not exceed crit threshold {crit}")]
    ThresholdOrder { warn: f64, crit: f64 },

    #[error("invalid endpoint URL {0:?}")]
    Endpoint(String),
}
