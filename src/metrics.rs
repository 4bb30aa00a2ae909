use serde::{Deserialize, Serialize};

/// One GPU's readings from the dynamic metrics endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetric {
    pub name: String,
    /// Utilization in percent.
    pub load: f64,
    /// Degrees Celsius.
    #[serde(default)]
    pub temp: f64,
    /// MB. Absent when the driver does not report memory.
    pub mem_used: Option<f64>,
    /// MB. Absent or zero means no capacity reported.
    pub mem_total: Option<f64>,
}

/// Payload of `GET /api/dynamic`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicMetrics {
    pub cpu_usage: f64,
    pub ram_usage: f64,
    /// `null` and a missing field are both treated as "no devices".
    pub gpus: Option<Vec<DeviceMetric>>,
}

impl DynamicMetrics {
    pub fn devices(&self) -> Option<&[DeviceMetric]> {
        self.gpus.as_deref()
    }

    /// Copy with CPU/RAM limited to [0, 100].
    pub fn clamped(&self) -> Self {
        Self {
            cpu_usage: clamp_pct(self.cpu_usage),
            ram_usage: clamp_pct(self.ram_usage),
            gpus: self.gpus.clone(),
        }
    }
}

fn clamp_pct(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    /// GiB.
    pub total: f64,
    pub percent: f64,
}

/// Payload of `GET /api/static/refresh`: slow-changing host facts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticInfo {
    pub os: String,
    pub hostname: String,
    pub processor: String,
    pub arch: String,
    /// GiB.
    pub ram_total: f64,
    pub disks: Vec<DiskInfo>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_dynamic_payload() {
        let json = r#"{"cpu_usage": 42.3, "ram_usage": 67.8,
            "gpus": [{"name": "GPU0", "load": 10.0, "temp": 55,
                      "mem_used": 1024, "mem_total": 8192}]}"#;
        let m: DynamicMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.cpu_usage, 42.3);
        let gpus = m.devices().unwrap();
        assert_eq!(gpus[0].name, "GPU0");
        assert_eq!(gpus[0].mem_total, Some(8192.0));
    }

    #[test]
    fn null_or_missing_gpus_decode_as_none() {
        let m: DynamicMetrics =
            serde_json::from_str(r#"{"cpu_usage": 1, "ram_usage": 2, "gpus": null}"#).unwrap();
        assert!(m.devices().is_none());
        let m: DynamicMetrics =
            serde_json::from_str(r#"{"cpu_usage": 1, "ram_usage": 2}"#).unwrap();
        assert!(m.devices().is_none());
    }

    #[test]
    fn missing_cpu_is_a_decode_error() {
        assert!(serde_json::from_str::<DynamicMetrics>(r#"{"ram_usage": 2}"#).is_err());
    }

    #[test]
    fn clamps_scalars_only() {
        let m = DynamicMetrics {
            cpu_usage: 140.0,
            ram_usage: -3.0,
            gpus: None,
        };
        let c = m.clamped();
        assert_eq!((c.cpu_usage, c.ram_usage), (100.0, 0.0));
    }

    #[test]
    fn static_info_is_lenient() {
        let info: StaticInfo =
            serde_json::from_str(r#"{"hostname": "rig", "disks": [{"device": "/dev/sda1"}]}"#)
                .unwrap();
        assert_eq!(info.hostname, "rig");
        assert_eq!(info.disks[0].total, 0.0);
    }
}
