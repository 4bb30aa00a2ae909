use crate::error::FetchError;
use crate::metrics::{DynamicMetrics, StaticInfo};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DYNAMIC_PATH: &str = "/api/dynamic";
pub const STATIC_REFRESH_PATH: &str = "/api/static/refresh";

/// Where metric snapshots come from.
pub trait MetricsSource: Send + Sync {
    fn fetch_dynamic(&self) -> impl Future<Output = Result<DynamicMetrics, FetchError>> + Send;

    /// Asks the server to re-read slow-changing host facts.
    fn refresh_static(&self) -> impl Future<Output = Result<StaticInfo, FetchError>> + Send;
}

impl<T: MetricsSource> MetricsSource for Arc<T> {
    fn fetch_dynamic(&self) -> impl Future<Output = Result<DynamicMetrics, FetchError>> + Send {
        (**self).fetch_dynamic()
    }

    fn refresh_static(&self) -> impl Future<Output = Result<StaticInfo, FetchError>> + Send {
        (**self).refresh_static()
    }
}

/// Metrics server reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpMetricsSource {
    client: reqwest::Client,
    dynamic_url: String,
    static_url: String,
}

impl HttpMetricsSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("telemetry_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::from_reqwest(endpoint, client))
    }

    pub fn from_reqwest(endpoint: &str, client: reqwest::Client) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            client,
            dynamic_url: format!("{base}{DYNAMIC_PATH}"),
            static_url: format!("{base}{STATIC_REFRESH_PATH}"),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

impl MetricsSource for HttpMetricsSource {
    async fn fetch_dynamic(&self) -> Result<DynamicMetrics, FetchError> {
        self.get_json(&self.dynamic_url).await
    }

    async fn refresh_static(&self) -> Result<StaticInfo, FetchError> {
        self.get_json(&self.static_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoint_paths() {
        let src = HttpMetricsSource::from_reqwest("http://host:5000/", reqwest::Client::new());
        assert_eq!(src.dynamic_url, "http://host:5000/api/dynamic");
        assert_eq!(src.static_url, "http://host:5000/api/static/refresh");
    }
}
