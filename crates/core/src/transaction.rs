use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// A monetary value as it left its pipeline.
///
/// Text mode parses amounts; OCR mode keeps the recognized text verbatim
/// because column jitter makes numeric parsing unreliable there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Value(Money),
    Raw(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Value(m) => write!(f, "{m}"),
            Amount::Raw(s) => write!(f, "{s}"),
        }
    }
}

/// Direction of a transaction. Only one side can ever be populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Credit(Amount),
    Debit(Amount),
}

impl Flow {
    /// Place a signed amount: positive is a credit, negative a debit, zero
    /// is neither. The stored value is the absolute amount.
    pub fn from_signed(amount: Money) -> Option<Flow> {
        if amount.is_zero() {
            None
        } else if amount.is_negative() {
            Some(Flow::Debit(Amount::Value(amount.abs())))
        } else {
            Some(Flow::Credit(Amount::Value(amount)))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: String,
    pub description: String,
    pub check_number: Option<String>,
    pub category: String,
    pub flow: Option<Flow>,
}

impl TransactionRecord {
    pub fn new(date: impl Into<String>, description: impl Into<String>, flow: Option<Flow>) -> Self {
        let description = description.into();
        TransactionRecord {
            date: date.into(),
            check_number: check_number(&description),
            description,
            category: String::new(),
            flow,
        }
    }

    pub fn credit(&self) -> Option<&Amount> {
        match &self.flow {
            Some(Flow::Credit(a)) => Some(a),
            _ => None,
        }
    }

    pub fn debit(&self) -> Option<&Amount> {
        match &self.flow {
            Some(Flow::Debit(a)) => Some(a),
            _ => None,
        }
    }
}

/// `CHECK 1042 STORE` → `1042`. The prefix match is case-sensitive and the
/// second token must be all digits, so `CHECKING DEPOSIT` yields nothing.
pub fn check_number(description: &str) -> Option<String> {
    if !description.starts_with("CHECK") {
        return None;
    }
    let second = description.split_whitespace().nth(1)?;
    if second.chars().all(|c| c.is_ascii_digit()) {
        Some(second.to_string())
    } else {
        None
    }
}
