use std::fmt::Display;

use serde::Deserialize;

use crate::result::{Error, Result};

/// End of the last chapter when nothing bounds it
pub const UNBOUNDED_END: f64 = 1_000_000_000.0;

/// A chapter boundary as it is declared, either in seconds or as text.
///
/// Text accepts plain seconds ("90", "90.5") or a clock time ("1:30", "01:01:30.25").
/// Empty text is considered as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Seconds(f64),
    Text(String),
}

impl TimeValue {
    /// Return the value in seconds, or `None` if it is blank
    pub fn seconds(&self) -> Result<Option<f64>> {
        match self {
            TimeValue::Seconds(s) if s.is_finite() && *s >= 0.0 => Ok(Some(*s)),
            TimeValue::Seconds(s) => Err(Error::InvalidChapterTime(s.to_string())),
            TimeValue::Text(text) if text.trim().is_empty() => Ok(None),
            TimeValue::Text(text) => to_seconds(text.trim())
                .map(Some)
                .ok_or_else(|| Error::InvalidChapterTime(text.clone())),
        }
    }
}

impl From<f64> for TimeValue {
    fn from(s: f64) -> Self {
        TimeValue::Seconds(s)
    }
}

impl From<&str> for TimeValue {
    fn from(s: &str) -> Self {
        TimeValue::Text(s.to_owned())
    }
}

/// Parse `[[HH:]MM:]SS[.frac]` into seconds
fn to_seconds(tstamp: &str) -> Option<f64> {
    let mut parts = tstamp.rsplitn(2, ':');
    let secs: f64 = parts.next()?.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }

    // Minutes, with the hours folded in
    let mut minutes = 0u64;
    if let Some(rest) = parts.next() {
        for n in rest.split(':') {
            minutes = minutes.checked_mul(60)?.checked_add(n.parse().ok()?)?;
        }
    }

    Some(minutes.checked_mul(60)? as f64 + secs)
}

/// Resolved `[start, end)` range of a chapter, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn is_unbounded(&self) -> bool {
        self.end >= UNBOUNDED_END
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unbounded() {
            write!(f, "{} - END", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text_forms() {
        assert_eq!(TimeValue::from("90").seconds().unwrap(), Some(90.0));
        assert_eq!(TimeValue::from("90.5").seconds().unwrap(), Some(90.5));
        assert_eq!(TimeValue::from("1:30").seconds().unwrap(), Some(90.0));
        assert_eq!(TimeValue::from("01:01:30.5").seconds().unwrap(), Some(3690.5));
        assert_eq!(TimeValue::from(" ").seconds().unwrap(), None);
        assert_eq!(TimeValue::from(12.0).seconds().unwrap(), Some(12.0));
    }

    #[test]
    fn reject_invalid_times() {
        for text in ["abc", "1:xx", "-5", "1::2"] {
            assert!(TimeValue::from(text).seconds().is_err(), "{text}");
        }
        assert!(TimeValue::from(-1.0).seconds().is_err());
    }

    #[test]
    fn reject_times_too_large() {
        for text in ["999999999999999999:00:00", "1:99999999999999999999:00"] {
            assert!(
                matches!(TimeValue::from(text).seconds(), Err(Error::InvalidChapterTime(t)) if t == text),
                "{text}"
            );
        }
    }

    #[test]
    fn deserialize_numbers_and_strings() {
        let values: Vec<Option<TimeValue>> =
            serde_json::from_str(r#"[1.5, "2:00", "", null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Some(TimeValue::Seconds(1.5)),
                Some(TimeValue::Text("2:00".into())),
                Some(TimeValue::Text("".into())),
                None
            ]
        );
    }
}
