//! Locale-style currency rendering for displays, receipts and messages.

use serde::{Deserialize, Serialize};

use gymdesk_core::{DomainError, Money};

/// Digit grouping of the integer part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitGrouping {
    /// `12,34,567.00` (lakh/crore).
    #[default]
    Indian,
    /// `1,234,567.00`.
    Western,
}

impl core::str::FromStr for DigitGrouping {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indian" | "en-in" | "lakh" => Ok(DigitGrouping::Indian),
            "western" | "en-us" | "thousands" => Ok(DigitGrouping::Western),
            other => Err(DomainError::validation(format!("unknown digit grouping '{other}'"))),
        }
    }
}

/// Currency symbol + grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub grouping: DigitGrouping,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "₹".to_string(),
            grouping: DigitGrouping::Indian,
        }
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, grouping: DigitGrouping) -> Self {
        Self {
            symbol: symbol.into(),
            grouping,
        }
    }

    /// `₹1,23,456.50`, `-₹300.00`.
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!("{sign}{}{}", self.symbol, self.format_unsigned(amount))
    }

    /// Grouped magnitude without symbol or sign, e.g. `1,23,456.50`.
    pub fn format_unsigned(&self, amount: Money) -> String {
        let whole = amount.major_part().unsigned_abs().to_string();
        format!("{}.{:02}", group_digits(&whole, self.grouping), amount.minor_part())
    }
}

fn group_digits(digits: &str, grouping: DigitGrouping) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let group = match grouping {
        DigitGrouping::Indian => 2,
        DigitGrouping::Western => 3,
    };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}
