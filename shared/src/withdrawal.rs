use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::constants::{MINIMUM_WITHDRAWAL_ERROR, MIN_WITHDRAWAL_COINS, MISSING_FIELDS_ERROR, SELECT_METHOD_ERROR};
use crate::currency::coins_to_currency;
use crate::validation::{validate_required, validate_withdrawal_balance};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayoutMethod {
    Paypal,
    Bank,
    Upi,
}

impl PayoutMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paypal => "PayPal",
            Self::Bank => "Bank Transfer",
            Self::Upi => "UPI",
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Paypal => &["email"],
            Self::Bank => &["accountNumber", "ifsc", "accountName"],
            Self::Upi => &["upiId"],
        }
    }
}

pub fn field_label(field: &str) -> &str {
    match field {
        "email" => "PayPal Email",
        "accountNumber" => "Account Number",
        "ifsc" => "IFSC Code",
        "accountName" => "Account Holder Name",
        "upiId" => "UPI ID (e.g. user@paytm)",
        other => other,
    }
}

/// Form contents as submitted from the withdrawal screen. Never stored.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WithdrawalRequest {
    pub method: Option<PayoutMethod>,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    MissingMethod,
    /// Labels of the required fields left blank, in form order.
    MissingFields(Vec<String>),
    BelowMinimum { balance: u64, minimum: u64 },
}

impl fmt::Display for WithdrawalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMethod => write!(f, "{}", SELECT_METHOD_ERROR),
            Self::MissingFields(labels) => write!(f, "{}: {}", MISSING_FIELDS_ERROR, labels.join(", ")),
            Self::BelowMinimum { .. } => write!(f, "{}", MINIMUM_WITHDRAWAL_ERROR),
        }
    }
}

impl std::error::Error for WithdrawalError {}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WithdrawalReceipt {
    pub method: PayoutMethod,
    pub coins: u64,
    pub amount: String,
    pub message: String,
}

impl WithdrawalRequest {
    /// Checks the form against `balance`: method chosen, required fields
    /// filled in, and at least the minimum withdrawal available.
    pub fn validate(&self, balance: u64) -> Result<WithdrawalReceipt, WithdrawalError> {
        let method = self.method.ok_or(WithdrawalError::MissingMethod)?;

        let missing: Vec<String> = method
            .required_fields()
            .iter()
            .filter(|field| {
                let value = self.fields.get(**field).map(String::as_str).unwrap_or("");
                validate_required(value).is_err()
            })
            .map(|field| field_label(field).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(WithdrawalError::MissingFields(missing));
        }

        validate_withdrawal_balance(balance).map_err(|_| WithdrawalError::BelowMinimum {
            balance,
            minimum: MIN_WITHDRAWAL_COINS,
        })?;

        let amount = coins_to_currency(balance);
        Ok(WithdrawalReceipt {
            method,
            coins: balance,
            message: format!(
                "Your request for ${} has been submitted. Payment will be processed within 24-48 hours.",
                amount
            ),
            amount,
        })
    }
}

// === API Types ===

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PayoutField {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PayoutMethodInfo {
    pub id: PayoutMethod,
    pub label: String,
    pub fields: Vec<PayoutField>,
}

pub fn payout_methods() -> Vec<PayoutMethodInfo> {
    PayoutMethod::iter()
        .map(|method| PayoutMethodInfo {
            id: method,
            label: method.label().to_string(),
            fields: method
                .required_fields()
                .iter()
                .map(|name| PayoutField {
                    name: name.to_string(),
                    label: field_label(name).to_string(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn request(method: Option<PayoutMethod>, fields: &[(&str, &str)]) -> WithdrawalRequest {
        WithdrawalRequest {
            method,
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn test_method_required() {
        let err = request(None, &[("email", "a@b.c")]).validate(5000).unwrap_err();
        assert_eq!(err, WithdrawalError::MissingMethod);
        assert_eq!(err.to_string(), "Please select a payment method.");
    }

    #[test]
    fn test_missing_fields_reported_by_label() {
        let err = request(Some(PayoutMethod::Bank), &[("ifsc", "  "), ("accountName", "Sam")])
            .validate(5000)
            .unwrap_err();
        assert_eq!(
            err,
            WithdrawalError::MissingFields(vec!["Account Number".to_string(), "IFSC Code".to_string()])
        );
        assert_eq!(err.to_string(), "Please fill: Account Number, IFSC Code");
    }

    #[test]
    fn test_fields_checked_before_balance() {
        let err = request(Some(PayoutMethod::Upi), &[]).validate(0).unwrap_err();
        assert!(matches!(err, WithdrawalError::MissingFields(_)));
    }

    #[test]
    fn test_minimum_balance() {
        let err = request(Some(PayoutMethod::Paypal), &[("email", "a@b.c")])
            .validate(999)
            .unwrap_err();
        assert_eq!(err, WithdrawalError::BelowMinimum { balance: 999, minimum: 1000 });
    }

    #[test]
    fn test_valid_request_produces_receipt() {
        let receipt = request(Some(PayoutMethod::Upi), &[("upiId", "user@paytm")])
            .validate(2500)
            .unwrap();
        assert_eq!(receipt.amount, "2.50");
        assert_eq!(receipt.coins, 2500);
        assert!(receipt.message.starts_with("Your request for $2.50 has been submitted."));
    }

    #[test]
    fn test_method_ids() {
        assert_eq!(PayoutMethod::from_str("paypal").unwrap(), PayoutMethod::Paypal);
        assert_eq!(PayoutMethod::Upi.to_string(), "upi");
        let methods = payout_methods();
        assert_eq!(methods.len(), 3);
        assert_eq!(methods[1].fields.len(), 3);
        assert_eq!(methods[1].fields[1].label, "IFSC Code");
    }
}
