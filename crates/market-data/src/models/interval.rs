use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bar interval accepted by intraday endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IntradayInterval {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "60min")]
    SixtyMinutes,
}

impl IntradayInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::FiveMinutes => "5min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
            Self::SixtyMinutes => "60min",
        }
    }
}

impl fmt::Display for IntradayInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntradayInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1min" => Ok(Self::OneMinute),
            "5min" => Ok(Self::FiveMinutes),
            "15min" => Ok(Self::FifteenMinutes),
            "30min" => Ok(Self::ThirtyMinutes),
            "60min" => Ok(Self::SixtyMinutes),
            other => Err(format!(
                "Unsupported intraday interval '{}' (expected 1min, 5min, 15min, 30min or 60min)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(
            "60min".parse::<IntradayInterval>().unwrap(),
            IntradayInterval::SixtyMinutes
        );
        assert_eq!(
            " 5MIN ".parse::<IntradayInterval>().unwrap(),
            IntradayInterval::FiveMinutes
        );
        assert!("2h".parse::<IntradayInterval>().is_err());
    }

    #[test]
    fn test_default_is_hourly() {
        assert_eq!(IntradayInterval::default().as_str(), "60min");
    }
}
