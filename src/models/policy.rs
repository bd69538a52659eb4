use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyViolation, UpkeepError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "d" | "day" | "days" | "daily" => Some(Self::Day),
            "w" | "week" | "weeks" | "weekly" => Some(Self::Week),
            "m" | "month" | "months" | "monthly" => Some(Self::Month),
            "y" | "year" | "years" | "yearly" | "annually" => Some(Self::Year),
            _ => None,
        }
    }
}

/// A positive calendar interval such as "4 weeks" or "1 month".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub count: u32,
    pub unit: IntervalUnit,
}

impl Interval {
    pub fn new(count: u32, unit: IntervalUnit) -> Result<Self, UpkeepError> {
        if count == 0 {
            return Err(UpkeepError::invalid_policy(PolicyViolation::NonPositiveInterval));
        }
        Ok(Self { count, unit })
    }

    pub fn days(count: u32) -> Result<Self, UpkeepError> {
        Self::new(count, IntervalUnit::Day)
    }

    pub fn weeks(count: u32) -> Result<Self, UpkeepError> {
        Self::new(count, IntervalUnit::Week)
    }

    pub fn months(count: u32) -> Result<Self, UpkeepError> {
        Self::new(count, IntervalUnit::Month)
    }

    pub fn years(count: u32) -> Result<Self, UpkeepError> {
        Self::new(count, IntervalUnit::Year)
    }

    pub fn validate(&self) -> Result<(), UpkeepError> {
        if self.count == 0 {
            return Err(UpkeepError::invalid_policy(PolicyViolation::NonPositiveInterval));
        }
        Ok(())
    }

    /// Compact form used on the command line and in JSON, e.g. `4w`.
    pub fn to_short(&self) -> String {
        let suffix = match self.unit {
            IntervalUnit::Day => 'd',
            IntervalUnit::Week => 'w',
            IntervalUnit::Month => 'm',
            IntervalUnit::Year => 'y',
        };
        format!("{}{}", self.count, suffix)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "1 {}", self.unit.as_str())
        } else {
            write!(f, "{} {}s", self.count, self.unit.as_str())
        }
    }
}

/// Accepts `4w`, `4 weeks`, `10d`, `monthly`, `2y`. Zero and negative counts
/// are rejected as policy violations, anything else unreadable as unparseable.
impl FromStr for Interval {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let unparseable = || {
            UpkeepError::invalid_policy(PolicyViolation::Unparseable(format!(
                "cannot read interval '{s}' (expected e.g. 4w, 10d, 1m, 2y)"
            )))
        };

        if let Some(unit) = IntervalUnit::from_str(&text) {
            return Interval::new(1, unit);
        }

        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+'))
            .ok_or_else(unparseable)?;
        let (number, unit) = text.split_at(split);
        let count: i64 = number.trim().parse().map_err(|_| unparseable())?;
        let unit = IntervalUnit::from_str(unit.trim()).ok_or_else(unparseable)?;
        if count <= 0 {
            return Err(UpkeepError::invalid_policy(PolicyViolation::NonPositiveInterval));
        }
        let count = u32::try_from(count).map_err(|_| unparseable())?;
        Interval::new(count, unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// Next occurrence counts from the day the task was actually done.
    FromCompletion,
    /// Next occurrence keeps the original cadence, however late the completion.
    FromDueDate,
}

impl AnchorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FromCompletion => "completion",
            Self::FromDueDate => "due",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completion" | "from_completion" | "done" => Some(Self::FromCompletion),
            "due" | "from_due_date" | "due_date" | "fixed" => Some(Self::FromDueDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrencePolicy {
    NonRecurring,
    Recurring { interval: Interval, anchor: AnchorMode },
}

impl RecurrencePolicy {
    pub fn recurring(interval: Interval, anchor: AnchorMode) -> Self {
        Self::Recurring { interval, anchor }
    }

    pub fn validate(&self) -> Result<(), UpkeepError> {
        match self {
            Self::NonRecurring => Ok(()),
            Self::Recurring { interval, .. } => interval.validate(),
        }
    }

    pub fn anchor(&self) -> Option<AnchorMode> {
        match self {
            Self::NonRecurring => None,
            Self::Recurring { anchor, .. } => Some(*anchor),
        }
    }
}

impl fmt::Display for RecurrencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonRecurring => write!(f, "once"),
            Self::Recurring { interval, anchor } => {
                write!(f, "every {interval} from {}", anchor.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_interval_forms() {
        assert_eq!("4w".parse::<Interval>().unwrap(), Interval::weeks(4).unwrap());
        assert_eq!("4 weeks".parse::<Interval>().unwrap(), Interval::weeks(4).unwrap());
        assert_eq!("monthly".parse::<Interval>().unwrap(), Interval::months(1).unwrap());
        assert_eq!("2Y".parse::<Interval>().unwrap(), Interval::years(2).unwrap());
    }

    #[test]
    fn test_parse_interval_rejects_non_positive() {
        for input in ["0w", "-3d"] {
            let err = input.parse::<Interval>().unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidPolicy);
            assert_eq!(err.violation, Some(PolicyViolation::NonPositiveInterval));
            assert!(err.message.contains("interval must be positive"));
        }
    }

    #[test]
    fn test_parse_interval_rejects_garbage() {
        let err = "fortnightly".parse::<Interval>().unwrap_err();
        assert!(matches!(err.violation, Some(PolicyViolation::Unparseable(_))));
    }

    #[test]
    fn test_deserialized_zero_interval_fails_validation() {
        let policy = RecurrencePolicy::Recurring {
            interval: Interval { count: 0, unit: IntervalUnit::Day },
            anchor: AnchorMode::FromCompletion,
        };
        assert!(policy.validate().is_err());
    }
}
