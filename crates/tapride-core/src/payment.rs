//! Payment method selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the rider intends to pay. Exactly one is selected at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Cashless,
}

impl PaymentMethod {
    /// Returns the other method; backs the one-tap payment button.
    pub fn toggled(self) -> Self {
        match self {
            Self::Cash => Self::Cashless,
            Self::Cashless => Self::Cash,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::Cashless => write!(f, "Cashless"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "cashless" => Ok(Self::Cashless),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cash() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cashless).unwrap(),
            "\"Cashless\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"Cash\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cash);
    }

    #[test]
    fn test_toggled() {
        assert_eq!(PaymentMethod::Cash.toggled(), PaymentMethod::Cashless);
        assert_eq!(PaymentMethod::Cashless.toggled(), PaymentMethod::Cash);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("CASHLESS".parse::<PaymentMethod>(), Ok(PaymentMethod::Cashless));
        assert!("card".parse::<PaymentMethod>().is_err());
    }
}
