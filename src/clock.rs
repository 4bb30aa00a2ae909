use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Wall clock, date and session uptime text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClockReadout {
    pub time: String,
    pub date: String,
    pub uptime: String,
}

#[derive(Clone, Copy, Debug)]
pub struct Clock {
    started: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn readout(&self) -> ClockReadout {
        readout_at(&Local::now(), self.started.elapsed())
    }
}

pub fn readout_at<Tz: TimeZone>(now: &DateTime<Tz>, uptime: Duration) -> ClockReadout
where
    Tz::Offset: std::fmt::Display,
{
    ClockReadout {
        time: now.format("%H:%M:%S").to_string(),
        date: now.format("%a, %b %-d, %Y").to_string().to_uppercase(),
        uptime: format_uptime(uptime),
    }
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_clock_and_date() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap();
        let r = readout_at(&now, Duration::from_secs(3_725));
        assert_eq!(r.time, "09:05:07");
        assert_eq!(r.date, "FRI, OCT 16, 2026");
        assert_eq!(r.uptime, "01:02:05");
    }

    #[test]
    fn uptime_hours_do_not_wrap() {
        assert_eq!(format_uptime(Duration::from_secs(100 * 3600 + 59)), "100:00:59");
        assert_eq!(format_uptime(Duration::ZERO), "00:00:00");
    }
}
