use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use super::{money::Money, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Mpesa,
    BankTransfer,
    Card,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "card" => Ok(PaymentMethod::Card),
            "cheque" => Ok(PaymentMethod::Cheque),
            other => Err(UnknownVariant::new("payment_method", other)),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(UnknownVariant::new("payment_status", other)),
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct Payment {
    pub id: String,
    pub tenant_id: String,
    pub unit_id: String,
    #[sqlx(try_from = "String")]
    pub amount_due: Money,
    #[sqlx(try_from = "String")]
    pub amount_paid: Money,
    #[sqlx(try_from = "String")]
    pub method: PaymentMethod,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub billing_period: String,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new payment. The ledger fills `payment_date`.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub tenant_id: String,
    pub unit_id: String,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub billing_period: String,
}

impl Payment {
    pub fn from_draft(draft: PaymentDraft, payment_date: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: draft.tenant_id,
            unit_id: draft.unit_id,
            amount_due: draft.amount_due,
            amount_paid: draft.amount_paid,
            method: draft.method,
            status: draft.status,
            transaction_id: draft.transaction_id,
            billing_period: draft.billing_period,
            payment_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn balance(&self) -> Money {
        Money::new(self.amount_due.amount() - self.amount_paid.amount()).unwrap_or(Money::ZERO)
    }
}
