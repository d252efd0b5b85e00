//! File timestamp queries and "older/newer than" checks.

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OpsError;

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

/// Which file timestamp to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacTime {
    /// `ctime`: inode status change time on Unix, creation time elsewhere.
    #[default]
    Changed,
    /// Birth time, or modification time where the platform has none.
    Created,
    /// Last modification time.
    Modified,
    /// Last access time, or modification time where unavailable.
    Accessed,
}

impl MacTime {
    fn read(self, metadata: &Metadata) -> io::Result<SystemTime> {
        let time = match self {
            Self::Changed => changed_time(metadata),
            Self::Created => metadata.created(),
            Self::Modified => metadata.modified(),
            Self::Accessed => metadata.accessed(),
        };
        time.or_else(|_| metadata.modified())
    }
}

#[cfg(unix)]
fn changed_time(metadata: &Metadata) -> io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let nanos = Duration::from_nanos(u64::try_from(metadata.ctime_nsec()).unwrap_or(0));
    let secs = Duration::from_secs(metadata.ctime().unsigned_abs());
    let base = if metadata.ctime() >= 0 {
        UNIX_EPOCH.checked_add(secs)
    } else {
        UNIX_EPOCH.checked_sub(secs)
    };
    base.and_then(|t| t.checked_add(nanos))
        .ok_or_else(|| io::Error::other("ctime out of range"))
}

#[cfg(not(unix))]
fn changed_time(metadata: &Metadata) -> io::Result<SystemTime> {
    metadata.created()
}

impl std::fmt::Display for MacTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Changed => write!(f, "ctime"),
            Self::Created => write!(f, "birthtime"),
            Self::Modified => write!(f, "mtime"),
            Self::Accessed => write!(f, "atime"),
        }
    }
}

/// Signed offset from "now". Positive values point to the future,
/// negative values to the past. A year is 365 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimestampDelta {
    #[serde(default)]
    pub years: i64,
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
}

impl TimestampDelta {
    /// Offset of a number of seconds.
    pub fn seconds(seconds: i64) -> Self {
        Self {
            seconds,
            ..Default::default()
        }
    }

    /// Offset of a number of days.
    pub fn days(days: i64) -> Self {
        Self {
            days,
            ..Default::default()
        }
    }

    /// Total offset in seconds, saturating on overflow.
    pub fn total_seconds(&self) -> i64 {
        self.seconds
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.hours.saturating_mul(60 * 60))
            .saturating_add(self.days.saturating_mul(24 * 60 * 60))
            .saturating_add(self.years.saturating_mul(SECONDS_PER_YEAR))
    }

    /// The same offset pointing the other way.
    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
        }
    }

    fn to_time_delta(self) -> TimeDelta {
        let seconds = self.total_seconds();
        match TimeDelta::try_seconds(seconds) {
            Some(delta) => delta,
            None if seconds < 0 => TimeDelta::MIN,
            None => TimeDelta::MAX,
        }
    }
}

impl std::str::FromStr for TimestampDelta {
    type Err = OpsError;

    /// Parse a span such as `30d`, `12h`, `2w` or `1y` (`m` is minutes,
    /// `s` seconds, a bare number counts days). The result is positive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let parse_error = |message: &str| OpsError::Parse {
            value: s.to_string(),
            message: message.to_string(),
        };

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let num: i64 = digits
            .parse()
            .map_err(|_| parse_error("expected a number followed by y, w, d, h, m or s"))?;

        let delta = match unit {
            "y" => Self {
                years: num,
                ..Default::default()
            },
            "w" => Self::days(num.saturating_mul(7)),
            "d" | "" => Self::days(num),
            "h" => Self {
                hours: num,
                ..Default::default()
            },
            "m" => Self {
                minutes: num,
                ..Default::default()
            },
            "s" => Self::seconds(num),
            _ => return Err(parse_error("unknown unit, expected y, w, d, h, m or s")),
        };
        Ok(delta)
    }
}

/// Read one of the timestamps of `path`.
pub fn file_time(path: &Path, mac: MacTime) -> Result<DateTime<Utc>, OpsError> {
    let metadata = std::fs::metadata(path).map_err(|e| OpsError::io(path, e))?;
    let time = mac.read(&metadata).map_err(|e| OpsError::io(path, e))?;
    Ok(DateTime::<Utc>::from(time))
}

/// True iff `now + delta` lies after the file's timestamp.
///
/// With a negative delta this answers "is the file older than `-delta`".
pub fn check_file_timestamp_delta(
    path: &Path,
    mac: MacTime,
    delta: TimestampDelta,
) -> Result<bool, OpsError> {
    check_file_timestamp_delta_at(path, mac, delta, Utc::now())
}

/// [`check_file_timestamp_delta`] against an explicit reference time.
pub fn check_file_timestamp_delta_at(
    path: &Path,
    mac: MacTime,
    delta: TimestampDelta,
    now: DateTime<Utc>,
) -> Result<bool, OpsError> {
    if !path.is_file() {
        return Err(OpsError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let stamp = file_time(path, mac)?;
    let reference = now
        .checked_add_signed(delta.to_time_delta())
        .unwrap_or(if delta.total_seconds() < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
    Ok(reference > stamp)
}

/// True iff the file's `ctime` ([`MacTime::Changed`]) is more than `age` ago.
pub fn is_file_older_than(path: &Path, age: TimestampDelta) -> Result<bool, OpsError> {
    check_file_timestamp_delta(path, MacTime::Changed, age.negated())
}
