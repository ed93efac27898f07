//! Field rules applied by forms before a record is sent to the backend.
//!
//! The collection controller never calls into this module; callers validate
//! first and only then mutate.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    CompanyData, ContractData, PaymentMethodData, ReceivableData, SellerData, ServiceData,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;
const CNPJ_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", join_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Records `message` against `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    pub fn require(&mut self, field: &'static str, value: &str) {
        self.check(!value.trim().is_empty(), field, "required");
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    Cpf,
    Cnpj,
}

pub fn only_digits(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top = u32::try_from(digits.len() + 1).unwrap_or(u32::MAX);
    let sum: u32 = digits
        .iter()
        .zip((2..=top).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        rest => rest,
    }
}

fn cnpj_check_digit(digits: &[u32]) -> u32 {
    let weights = &CNPJ_WEIGHTS[CNPJ_WEIGHTS.len() - digits.len()..];
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        rest => 11 - rest,
    }
}

pub fn is_valid_cpf(raw: &str) -> bool {
    let digits = only_digits(raw);
    if digits.len() != CPF_LEN || all_same(&digits) {
        return false;
    }
    cpf_check_digit(&digits[..9]) == digits[9] && cpf_check_digit(&digits[..10]) == digits[10]
}

pub fn is_valid_cnpj(raw: &str) -> bool {
    let digits = only_digits(raw);
    if digits.len() != CNPJ_LEN || all_same(&digits) {
        return false;
    }
    cnpj_check_digit(&digits[..12]) == digits[12] && cnpj_check_digit(&digits[..13]) == digits[13]
}

pub fn tax_id_kind(raw: &str) -> Option<TaxIdKind> {
    match only_digits(raw).len() {
        CPF_LEN => Some(TaxIdKind::Cpf),
        CNPJ_LEN => Some(TaxIdKind::Cnpj),
        _ => None,
    }
}

pub fn is_valid_tax_id(raw: &str) -> bool {
    match tax_id_kind(raw) {
        Some(TaxIdKind::Cpf) => is_valid_cpf(raw),
        Some(TaxIdKind::Cnpj) => is_valid_cnpj(raw),
        None => false,
    }
}

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}

fn is_percent(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

pub fn validate_company(data: &CompanyData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("legal_name", &data.legal_name);
    errors.check(is_valid_cnpj(&data.cnpj), "cnpj", "invalid CNPJ");
    errors.check(is_valid_email(&data.email), "email", "invalid email");
    errors.into_result()
}

pub fn validate_seller(data: &SellerData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("name", &data.name);
    errors.check(is_valid_tax_id(&data.tax_id), "tax_id", "invalid CPF/CNPJ");
    errors.check(is_valid_email(&data.email), "email", "invalid email");
    errors.check(
        is_percent(data.commission_percent),
        "commission_percent",
        "must be between 0 and 100",
    );
    errors.into_result()
}

pub fn validate_contract(data: &ContractData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("customer_name", &data.customer_name);
    errors.require("number", &data.number);
    errors.check(
        data.monthly_amount_cents > 0,
        "monthly_amount_cents",
        "must be positive",
    );
    if let Some(end) = data.end_date {
        errors.check(end >= data.start_date, "end_date", "ends before it starts");
    }
    errors.into_result()
}

pub fn validate_service(data: &ServiceData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("name", &data.name);
    errors.check(data.price_cents >= 0, "price_cents", "must not be negative");
    errors.into_result()
}

pub fn validate_receivable(data: &ReceivableData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("description", &data.description);
    errors.require("customer_name", &data.customer_name);
    errors.check(data.amount_cents > 0, "amount_cents", "must be positive");
    errors.check(
        data.installment >= 1 && data.installment <= data.installments,
        "installment",
        "must be between 1 and the installment count",
    );
    errors.into_result()
}

pub fn validate_payment_method(data: &PaymentMethodData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("name", &data.name);
    errors.check(
        is_percent(data.fee_percent),
        "fee_percent",
        "must be between 0 and 100",
    );
    errors.check(data.max_installments >= 1, "max_installments", "at least 1");
    if !data.kind.allows_installments() {
        errors.check(
            data.max_installments <= 1,
            "max_installments",
            "cash and pix are single payment",
        );
    }
    errors.into_result()
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
