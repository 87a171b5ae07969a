//! Bar intervals and the history window fetched for each.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timeframe '{0}' (expected one of 1m, 5m, 15m, 30m, 60m, 1h, 1d, 1wk, 1mo)")]
pub struct ParseTimeframeError(pub String);

/// Supported bar intervals. `60m` and `1h` are distinct labels for the
/// same step, kept apart because sources name their files by label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "60m")]
    Minute60,
    #[serde(rename = "1h")]
    Hour1,
    #[default]
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 9] = [
        Timeframe::Minute1,
        Timeframe::Minute5,
        Timeframe::Minute15,
        Timeframe::Minute30,
        Timeframe::Minute60,
        Timeframe::Hour1,
        Timeframe::Day1,
        Timeframe::Week1,
        Timeframe::Month1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Minute60 => "60m",
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1d",
            Timeframe::Week1 => "1wk",
            Timeframe::Month1 => "1mo",
        }
    }

    /// History window requested from a price source, as a period label.
    pub fn history_label(self) -> &'static str {
        match self {
            Timeframe::Minute1 => "7d",
            Timeframe::Minute5 | Timeframe::Minute15 | Timeframe::Minute30 => "60d",
            Timeframe::Minute60 | Timeframe::Hour1 => "730d",
            Timeframe::Day1 => "2y",
            Timeframe::Week1 => "10y",
            Timeframe::Month1 => "20y",
        }
    }

    /// History window as a duration (years counted as 365 days).
    pub fn history_span(self) -> Duration {
        match self {
            Timeframe::Minute1 => Duration::days(7),
            Timeframe::Minute5 | Timeframe::Minute15 | Timeframe::Minute30 => Duration::days(60),
            Timeframe::Minute60 | Timeframe::Hour1 => Duration::days(730),
            Timeframe::Day1 => Duration::days(2 * 365),
            Timeframe::Week1 => Duration::days(10 * 365),
            Timeframe::Month1 => Duration::days(20 * 365),
        }
    }

    /// Spacing between consecutive bars (months approximated as 30 days).
    pub fn step(self) -> Duration {
        match self {
            Timeframe::Minute1 => Duration::minutes(1),
            Timeframe::Minute5 => Duration::minutes(5),
            Timeframe::Minute15 => Duration::minutes(15),
            Timeframe::Minute30 => Duration::minutes(30),
            Timeframe::Minute60 | Timeframe::Hour1 => Duration::hours(1),
            Timeframe::Day1 => Duration::days(1),
            Timeframe::Week1 => Duration::weeks(1),
            Timeframe::Month1 => Duration::days(30),
        }
    }

    pub fn is_intraday(self) -> bool {
        self.step() < Duration::days(1)
    }

    /// Upper bound on bars in one history window.
    pub fn max_bars(self) -> usize {
        (self.history_span().num_seconds() / self.step().num_seconds()) as usize
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == wanted)
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_labels() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
        }
        assert_eq!(" 1D ".parse::<Timeframe>().unwrap(), Timeframe::Day1);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "2h".parse::<Timeframe>().unwrap_err();
        assert!(err.to_string().contains("2h"));
    }

    #[test]
    fn history_windows() {
        assert_eq!(Timeframe::Minute1.history_label(), "7d");
        assert_eq!(Timeframe::Minute15.history_label(), "60d");
        assert_eq!(Timeframe::Hour1.history_label(), "730d");
        assert_eq!(Timeframe::Day1.history_label(), "2y");
        assert_eq!(Timeframe::Week1.history_label(), "10y");
        assert_eq!(Timeframe::Month1.history_label(), "20y");
        assert_eq!(Timeframe::default(), Timeframe::Day1);
    }

    #[test]
    fn intraday_split() {
        assert!(Timeframe::Minute30.is_intraday());
        assert!(Timeframe::Hour1.is_intraday());
        assert!(!Timeframe::Day1.is_intraday());
        assert_eq!(Timeframe::Day1.max_bars(), 730);
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&Timeframe::Week1).unwrap();
        assert_eq!(json, "\"1wk\"");
        let tf: Timeframe = serde_json::from_str("\"60m\"").unwrap();
        assert_eq!(tf, Timeframe::Minute60);
    }
}
