//! Money value object (integer minor units).

use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value_object::ValueObject;

/// Amount in the smallest currency unit (paise, cents).
///
/// All ledger arithmetic is exact integer arithmetic on this type. Amounts can
/// be negative: a negative balance means the gym owes the member.
///
/// On the wire an amount is a major-unit decimal string (`"1234.50"`) so that
/// values survive JSON without float rounding. Deserialization also accepts
/// JSON numbers in major units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Number of minor units per major unit.
    pub const SCALE: i64 = 100;

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole major units (e.g. rupees).
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(Self::SCALE))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Whole major units, truncated toward zero.
    pub const fn major_part(self) -> i64 {
        self.0 / Self::SCALE
    }

    /// Fractional minor units, always in `0..SCALE`.
    pub const fn minor_part(self) -> i64 {
        (self.0 % Self::SCALE).abs()
    }

    /// Parse a major-unit decimal string such as `"1,200.50"` or `" -300 "`.
    ///
    /// Surrounding whitespace and well-formed thousands separators (Western
    /// `1,234,567` or Indian `12,34,567`) are accepted. Digits past the second
    /// decimal round half away from zero. Returns `None` for anything that is
    /// not a plain decimal number or does not fit.
    pub fn parse_decimal(input: &str) -> Option<Self> {
        let cleaned = strip_grouping(input.trim())?;
        let cleaned = if cleaned.starts_with("-.") {
            cleaned.replacen("-.", "-0.", 1)
        } else if cleaned.starts_with('.') {
            format!("0{cleaned}")
        } else {
            cleaned
        };
        Decimal::from_str(&cleaned).ok().and_then(Self::from_decimal)
    }

    /// Convert a major-unit float, rounding to the nearest minor unit.
    ///
    /// Non-finite or out-of-range values return `None`.
    pub fn from_major_f64(value: f64) -> Option<Self> {
        Decimal::from_f64_retain(value).and_then(Self::from_decimal)
    }

    /// Round a major-unit decimal to minor units, half away from zero.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(Self::SCALE))?
            .to_i64()
            .map(Self)
    }
}

/// Drop thousands separators, rejecting misplaced ones such as `1,2,3`.
fn strip_grouping(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if frac.contains(',') {
        return None;
    }

    let groups: Vec<&str> = whole.trim_start_matches(['-', '+']).split(',').collect();
    let (last, head) = groups.split_last()?;
    let (first, middle) = head.split_first()?;
    let well_formed = last.len() == 3
        && (1..=3).contains(&first.len())
        && middle.iter().all(|g| (2..=3).contains(&g.len()));

    well_formed.then(|| s.replace(',', ""))
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match MoneyRepr::deserialize(deserializer)? {
            MoneyRepr::Whole(v) => v.checked_mul(Self::SCALE).map(Self),
            MoneyRepr::Fractional(v) => Self::from_major_f64(v),
            MoneyRepr::Text(s) => Self::parse_decimal(&s),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("invalid money amount"))
    }
}

/// Plain decimal rendering with two fraction digits, e.g. `-1234.50`.
impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = Self::SCALE as u64;
        write!(f, "{sign}{}.{:02}", abs / scale, abs % scale)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
