//! Time layouts used by OpenStack services

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Layout for time values in query strings, bodies and headers
///
/// Services disagree on time layouts; the variants cover the ones seen in
/// the wild. Values are always rendered in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// `2018-01-04T10:00:12Z`
    #[default]
    Rfc3339,
    /// `2018-01-04T10:00:12.123456Z`, fraction omitted when zero
    Rfc3339Milli,
    /// `2018-01-04T10:00:12.123456`, fraction omitted when zero
    Rfc3339MilliNoZ,
    /// `2018-01-04T10:00:12`
    Rfc3339NoZ,
    /// `2018-01-04 10:00:12Z`
    Rfc3339ZNoT,
    /// `2018-01-04 10:00:12`
    Rfc3339ZNoTNoZ,
    /// `Thu, 04 Jan 2018 10:00:12 GMT`
    Rfc1123,
}

impl TimeFormat {
    fn layout(self) -> &'static str {
        match self {
            Self::Rfc3339 => "%Y-%m-%dT%H:%M:%SZ",
            Self::Rfc3339Milli => "%Y-%m-%dT%H:%M:%S%.fZ",
            Self::Rfc3339MilliNoZ => "%Y-%m-%dT%H:%M:%S%.f",
            Self::Rfc3339NoZ => "%Y-%m-%dT%H:%M:%S",
            Self::Rfc3339ZNoT => "%Y-%m-%d %H:%M:%SZ",
            Self::Rfc3339ZNoTNoZ => "%Y-%m-%d %H:%M:%S",
            Self::Rfc1123 => "%a, %d %b %Y %H:%M:%S GMT",
        }
    }

    /// Render a time with this layout
    pub fn format(self, time: &DateTime<Utc>) -> String {
        match self {
            Self::Rfc3339 => time.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Rfc3339Milli => format!("{}Z", format_micros(time)),
            Self::Rfc3339MilliNoZ => format_micros(time),
            other => time.format(other.layout()).to_string(),
        }
    }

    /// Parse a time written with this layout
    pub fn parse(self, value: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::Rfc3339 | Self::Rfc3339Milli => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            Self::Rfc1123 => DateTime::parse_from_rfc2822(value)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            other => {
                let value = value.strip_suffix('Z').unwrap_or(value);
                let layout = other.layout().trim_end_matches('Z');
                NaiveDateTime::parse_from_str(value, layout)
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }
        }
    }
}

/// Seconds plus up to six fraction digits, trailing zeros trimmed
fn format_micros(time: &DateTime<Utc>) -> String {
    let base = time.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = time.timestamp_subsec_micros();
    if micros == 0 {
        return base;
    }
    let fraction = format!("{micros:06}");
    format!("{base}.{}", fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 1, 4, 10, 0, 12).unwrap()
    }

    #[test_case(TimeFormat::Rfc3339, "2018-01-04T10:00:12Z" ; "rfc3339")]
    #[test_case(TimeFormat::Rfc3339Milli, "2018-01-04T10:00:12Z" ; "rfc3339 milli")]
    #[test_case(TimeFormat::Rfc3339MilliNoZ, "2018-01-04T10:00:12" ; "rfc3339 milli no z")]
    #[test_case(TimeFormat::Rfc3339NoZ, "2018-01-04T10:00:12" ; "rfc3339 no z")]
    #[test_case(TimeFormat::Rfc3339ZNoT, "2018-01-04 10:00:12Z" ; "rfc3339 z no t")]
    #[test_case(TimeFormat::Rfc3339ZNoTNoZ, "2018-01-04 10:00:12" ; "rfc3339 z no t no z")]
    #[test_case(TimeFormat::Rfc1123, "Thu, 04 Jan 2018 10:00:12 GMT" ; "rfc1123")]
    fn test_format(format: TimeFormat, expected: &str) {
        assert_eq!(format.format(&sample()), expected);
    }

    #[test_case(TimeFormat::Rfc3339, "2018-01-04T10:00:12Z" ; "rfc3339")]
    #[test_case(TimeFormat::Rfc3339NoZ, "2018-01-04T10:00:12" ; "rfc3339 no z")]
    #[test_case(TimeFormat::Rfc3339ZNoT, "2018-01-04 10:00:12Z" ; "rfc3339 z no t")]
    #[test_case(TimeFormat::Rfc1123, "Thu, 04 Jan 2018 10:00:12 GMT" ; "rfc1123")]
    fn test_parse(format: TimeFormat, input: &str) {
        assert_eq!(format.parse(input), Some(sample()));
    }

    #[test]
    fn test_fraction_kept_when_present() {
        let time = sample() + chrono::Duration::milliseconds(250);
        assert_eq!(
            TimeFormat::Rfc3339MilliNoZ.format(&time),
            "2018-01-04T10:00:12.25"
        );
    }

    #[test]
    fn test_fraction_keeps_microseconds() {
        let time = sample() + chrono::Duration::microseconds(123_450);
        assert_eq!(
            TimeFormat::Rfc3339Milli.format(&time),
            "2018-01-04T10:00:12.12345Z"
        );
        let nanos = sample() + chrono::Duration::nanoseconds(7_000_999);
        assert_eq!(
            TimeFormat::Rfc3339MilliNoZ.format(&nanos),
            "2018-01-04T10:00:12.007"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(TimeFormat::Rfc3339NoZ.parse("yesterday"), None);
    }
}
