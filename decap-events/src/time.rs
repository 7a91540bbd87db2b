use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

/// Representation of `struct timespec` to hold capture time values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TimeSpec {
    sec: i64,
    nsec: i64,
}

impl TimeSpec {
    const NSECS_IN_SEC: i64 = 1000000000;

    pub fn new(mut sec: i64, mut nsec: i64) -> Self {
        if nsec >= Self::NSECS_IN_SEC {
            let diff = nsec / Self::NSECS_IN_SEC;
            sec += diff;
            nsec -= diff * Self::NSECS_IN_SEC;
        }

        Self { sec, nsec }
    }

    pub fn sec(&self) -> i64 {
        self.sec
    }

    pub fn nsec(&self) -> i64 {
        self.nsec
    }
}

impl From<Duration> for TimeSpec {
    fn from(d: Duration) -> Self {
        Self::new(d.as_secs() as i64, d.subsec_nanos() as i64)
    }
}

impl From<TimeSpec> for DateTime<Utc> {
    fn from(val: TimeSpec) -> DateTime<Utc> {
        DateTime::from_timestamp(val.sec(), val.nsec() as u32)
            .expect("Could not convert TimeSpec to DateTime")
    }
}

/// Formats a TimeSpec as an UTC date, e.g. "2024-02-01T12:00:01.000000001Z".
pub fn format_utc_date(ts: TimeSpec) -> String {
    let date: DateTime<Utc> = ts.into();
    date.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespec_new() {
        let ts = TimeSpec::new(42, 100001);
        assert_eq!(ts.sec(), 42);
        assert_eq!(ts.nsec(), 100001);

        let ts = TimeSpec::new(42, TimeSpec::NSECS_IN_SEC + 1);
        assert_eq!(ts.sec(), 43);
        assert_eq!(ts.nsec(), 1);

        let ts = TimeSpec::new(42, TimeSpec::NSECS_IN_SEC * 10 + 1);
        assert_eq!(ts.sec(), 52);
        assert_eq!(ts.nsec(), 1);
    }

    #[test]
    fn timespec_from_duration() {
        let ts: TimeSpec = Duration::new(1706788800, 42).into();
        assert_eq!(ts.sec(), 1706788800);
        assert_eq!(ts.nsec(), 42);
    }

    #[test]
    fn utc_date() {
        let ts = TimeSpec::new(1706788801, 1);
        assert_eq!(&format_utc_date(ts), "2024-02-01T12:00:01.000000001Z");
    }
}
