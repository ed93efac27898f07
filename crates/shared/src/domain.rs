use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::validation::{self, ValidationErrors};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(EntityId);

/// Anything the collection controller can hold: a decodable record with a
/// backend-assigned id.
pub trait Entity: Clone + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &EntityId;
}

/// Editable payload of one entity type, bound to its backend table.
pub trait EntityData: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;

    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Stored row: backend-owned columns plus the entity payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<D> {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub data: D,
}

impl<D: EntityData> Entity for Record<D> {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

pub type Company = Record<CompanyData>;
pub type Seller = Record<SellerData>;
pub type Contract = Record<ContractData>;
pub type Service = Record<ServiceData>;
pub type Receivable = Record<ReceivableData>;
pub type PaymentMethod = Record<PaymentMethodData>;

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyData {
    pub legal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    pub cnpj: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_registration: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl EntityData for CompanyData {
    const TABLE: &'static str = "empresas";

    fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_company(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerData {
    pub name: String,
    /// CPF or CNPJ, with or without punctuation.
    pub tax_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub commission_percent: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl EntityData for SellerData {
    const TABLE: &'static str = "vendedores";

    fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_seller(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    pub customer_name: String,
    pub number: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub monthly_amount_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EntityData for ContractData {
    const TABLE: &'static str = "contratos";

    fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_contract(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl EntityData for ServiceData {
    const TABLE: &'static str = "servicos";

    fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_service(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableStatus {
    #[default]
    Open,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivableData {
    pub description: String,
    pub customer_name: String,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: ReceivableStatus,
    #[serde(default = "default_one")]
    pub installment: u32,
    #[serde(default = "default_one")]
    pub installments: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<NaiveDate>,
}

impl ReceivableData {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == ReceivableStatus::Open && self.due_date < today
    }
}

impl EntityData for ReceivableData {
    const TABLE: &'static str = "contas_receber";

    fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_receivable(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Cash,
    Pix,
    CreditCard,
    DebitCard,
    BankSlip,
    StoreCredit,
}

impl PaymentKind {
    /// Cash and Pix settle immediately and are never split.
    pub fn allows_installments(self) -> bool {
        !matches!(self, Self::Cash | Self::Pix)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodData {
    pub name: String,
    pub kind: PaymentKind,
    #[serde(default)]
    pub fee_percent: f64,
    #[serde(default = "default_one")]
    pub max_installments: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl EntityData for PaymentMethodData {
    const TABLE: &'static str = "formas_pagamento";

    fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_payment_method(self)
    }
}
