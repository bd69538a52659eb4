//! Seasonal eligibility windows.
//!
//! A window is a set of calendar months in which a task may become due.
//! It is stored as a 12-bit mask (bit 0 = January) and always has at
//! least one eligible month.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyViolation, UpkeepError};

const ALL_MONTHS: u16 = 0x0FFF;

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct SeasonalWindow {
    mask: u16,
}

impl SeasonalWindow {
    /// Window made of exactly the listed months.
    pub fn allow<I: IntoIterator<Item = u32>>(months: I) -> Result<Self, UpkeepError> {
        let mut mask = 0u16;
        for month in months {
            mask |= month_bit(month)?;
        }
        Self::from_mask(mask)
    }

    /// Window made of every month except the listed ones.
    pub fn deny<I: IntoIterator<Item = u32>>(months: I) -> Result<Self, UpkeepError> {
        let mut excluded = 0u16;
        for month in months {
            excluded |= month_bit(month)?;
        }
        Self::from_mask(ALL_MONTHS & !excluded)
    }

    /// Inclusive range, wrapping past December when `end < start` (Dec..Feb).
    pub fn range(start: u32, end: u32) -> Result<Self, UpkeepError> {
        month_bit(start)?;
        month_bit(end)?;
        Self::allow(month_range(start, end))
    }

    pub fn from_mask(mask: u16) -> Result<Self, UpkeepError> {
        let mask = mask & ALL_MONTHS;
        if mask == 0 {
            return Err(UpkeepError::invalid_policy(PolicyViolation::EmptySeasonalWindow));
        }
        Ok(Self { mask })
    }

    pub fn mask(&self) -> u16 {
        self.mask
    }

    pub fn contains(&self, month: u32) -> bool {
        (1..=12).contains(&month) && self.mask & (1 << (month - 1)) != 0
    }

    pub fn is_all_year(&self) -> bool {
        self.mask == ALL_MONTHS
    }

    pub fn months(&self) -> Vec<u32> {
        (1..=12).filter(|m| self.contains(*m)).collect()
    }

    /// Parse an allow-list: `4-10`, `apr-oct`, `dec-feb`, `1,2,12`, `jun`.
    pub fn parse_allow(text: &str) -> Result<Self, UpkeepError> {
        Self::allow(parse_month_list(text)?)
    }

    /// Parse a deny-list with the same syntax as [`Self::parse_allow`].
    pub fn parse_deny(text: &str) -> Result<Self, UpkeepError> {
        Self::deny(parse_month_list(text)?)
    }
}

impl TryFrom<Vec<u32>> for SeasonalWindow {
    type Error = UpkeepError;

    fn try_from(months: Vec<u32>) -> Result<Self, Self::Error> {
        Self::allow(months)
    }
}

impl From<SeasonalWindow> for Vec<u32> {
    fn from(window: SeasonalWindow) -> Self {
        window.months()
    }
}

impl fmt::Display for SeasonalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_year() {
            return write!(f, "all year");
        }
        let names: Vec<&str> = self
            .months()
            .iter()
            .map(|m| MONTH_NAMES[(*m - 1) as usize])
            .collect();
        write!(f, "{}", names.join(","))
    }
}

fn month_bit(month: u32) -> Result<u16, UpkeepError> {
    if !(1..=12).contains(&month) {
        return Err(UpkeepError::invalid_policy(PolicyViolation::MonthOutOfRange(month)));
    }
    Ok(1 << (month - 1))
}

fn month_range(start: u32, end: u32) -> Vec<u32> {
    let mut months = vec![start];
    let mut m = start;
    while m != end {
        m = m % 12 + 1;
        months.push(m);
    }
    months
}

fn parse_month(token: &str) -> Result<u32, UpkeepError> {
    let token = token.trim().to_ascii_lowercase();
    if let Ok(n) = token.parse::<i64>() {
        return u32::try_from(n)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                UpkeepError::invalid_policy(PolicyViolation::MonthOutOfRange(
                    u32::try_from(n).unwrap_or(0),
                ))
            });
    }
    let prefix: String = token.chars().take(3).collect();
    MONTH_NAMES
        .iter()
        .position(|name| *name == prefix && token.len() >= 3)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| {
            UpkeepError::invalid_policy(PolicyViolation::Unparseable(format!(
                "unknown month '{token}'"
            )))
        })
}

fn parse_month_list(text: &str) -> Result<Vec<u32>, UpkeepError> {
    let mut months = Vec::new();
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                months.extend(month_range(parse_month(start)?, parse_month(end)?));
            }
            None => months.push(parse_month(part)?),
        }
    }
    Ok(months)
}
