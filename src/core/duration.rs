use serde::{self, Deserialize, Deserializer, Serializer};
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Duration Format
-------------------------------------------------------------------------------------------------*/

/*
    Durations are written the way the host configuration writes them: a sequence of
    decimal numbers, each with a unit suffix (`1.5h`, `1h30m`, `250ms`, `2d`), or a
    bare integer number of nanoseconds.
*/

const UNITS: [(&str, f64); 8] = [
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60.0 * 1e9),
    ("h", 60.0 * 60.0 * 1e9),
    ("d", 24.0 * 60.0 * 60.0 * 1e9),
];

/// Parse a duration string such as `1.5h`, `30s`, `1h30m`, or `90000000000`.
pub fn parse(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("empty duration".to_string());
    }

    if let Ok(nanos) = value.parse::<u64>() {
        return Ok(Duration::from_nanos(nanos));
    }

    let mut nanos = 0f64;
    let mut rest = value;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {value:?}"))?;
        if number_len == 0 {
            return Err(format!("invalid duration {value:?}"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {value:?}"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown unit {unit:?} in duration {value:?}"))?;
        rest = &rest[unit_len..];

        nanos += number * scale;
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("duration {value:?} out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Render a duration in the same notation accepted by [parse].
pub fn format(duration: &Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    let units: [(&str, u128); 4] = [
        ("h", 3_600_000_000_000),
        ("m", 60_000_000_000),
        ("s", 1_000_000_000),
        ("ms", 1_000_000),
    ];
    for (name, scale) in units {
        if nanos % scale == 0 {
            return format!("{}{}", nanos / scale, name);
        }
    }
    format!("{nanos}ns")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Nanos(u64),
    Text(String),
}

impl RawDuration {
    fn into_duration<E: serde::de::Error>(self) -> Result<Duration, E> {
        match self {
            RawDuration::Nanos(nanos) => Ok(Duration::from_nanos(nanos)),
            RawDuration::Text(text) => parse(&text).map_err(E::custom),
        }
    }
}

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(duration))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    RawDuration::deserialize(deserializer)?.into_duration()
}

/*--------------------------------------------------------------------------------------
  Optional Durations
--------------------------------------------------------------------------------------*/

pub mod option {
    use super::RawDuration;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => super::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawDuration>::deserialize(deserializer)?
            .map(RawDuration::into_duration)
            .transpose()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse("1.5h").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("1h30m").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse("2d").unwrap(), Duration::from_secs(2 * 24 * 60 * 60));
        assert_eq!(parse("1000").unwrap(), Duration::from_nanos(1000));
    }

    #[test]
    fn test_parse_invalid_durations() {
        assert!(parse("").is_err());
        assert!(parse("10").is_ok());
        assert!(parse("10x").is_err());
        assert!(parse("h").is_err());
        assert!(parse("1.2.3s").is_err());
    }

    #[test]
    fn test_format_durations() {
        assert_eq!(format(&Duration::from_secs(3600)), "1h");
        assert_eq!(format(&Duration::from_secs(90)), "90s");
        assert_eq!(format(&Duration::from_millis(1500)), "1500ms");
        assert_eq!(format(&Duration::ZERO), "0s");
        assert_eq!(
            parse(&format(&Duration::from_secs(5400))).unwrap(),
            Duration::from_secs(5400)
        );
    }
}
