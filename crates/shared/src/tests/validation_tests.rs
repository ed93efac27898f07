use super::*;

use chrono::NaiveDate;

use crate::domain::{PaymentKind, ReceivableStatus};

fn seller() -> SellerData {
    SellerData {
        name: "Maria Souza".to_string(),
        tax_id: "529.982.247-25".to_string(),
        email: "maria@loja.com.br".to_string(),
        phone: None,
        commission_percent: 5.0,
        active: true,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

#[test]
fn cpf_check_digits_are_verified() {
    assert!(is_valid_cpf("529.982.247-25"));
    assert!(is_valid_cpf("52998224725"));
    assert!(!is_valid_cpf("529.982.247-26"));
    assert!(!is_valid_cpf("111.111.111-11"));
    assert!(!is_valid_cpf("1234"));
}

#[test]
fn cnpj_check_digits_are_verified() {
    assert!(is_valid_cnpj("11.222.333/0001-81"));
    assert!(is_valid_cnpj("11222333000181"));
    assert!(!is_valid_cnpj("11.222.333/0001-80"));
    assert!(!is_valid_cnpj("00000000000000"));
}

#[test]
fn tax_id_kind_follows_digit_count() {
    assert_eq!(tax_id_kind("529.982.247-25"), Some(TaxIdKind::Cpf));
    assert_eq!(tax_id_kind("11.222.333/0001-81"), Some(TaxIdKind::Cnpj));
    assert_eq!(tax_id_kind("12-34"), None);
    assert!(is_valid_tax_id("11.222.333/0001-81"));
    assert!(!is_valid_tax_id(""));
}

#[test]
fn email_format() {
    assert!(is_valid_email("vendas@empresa.com.br"));
    assert!(is_valid_email("  a@b.co "));
    assert!(!is_valid_email("sem-arroba.com"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("a b@c.com"));
}

#[test]
fn valid_seller_passes() {
    assert_eq!(validate_seller(&seller()), Ok(()));
}

#[test]
fn seller_reports_every_broken_field() {
    let mut data = seller();
    data.name = "   ".to_string();
    data.tax_id = "000".to_string();
    data.email = "nope".to_string();
    data.commission_percent = 120.0;

    let errors = validate_seller(&data).expect_err("invalid seller");
    assert_eq!(errors.errors.len(), 4);
    assert!(errors.has("name"));
    assert!(errors.has("tax_id"));
    assert!(errors.has("email"));
    assert!(errors.has("commission_percent"));
    assert!(errors.to_string().starts_with("validation failed: name: required"));
}

#[test]
fn company_requires_cnpj_not_cpf() {
    let data = CompanyData {
        legal_name: "Padaria Boa Vista LTDA".to_string(),
        trade_name: Some("Boa Vista".to_string()),
        cnpj: "529.982.247-25".to_string(),
        state_registration: None,
        email: "contato@boavista.com.br".to_string(),
        phone: None,
    };
    let errors = validate_company(&data).expect_err("cpf is not a cnpj");
    assert!(errors.has("cnpj"));
    assert_eq!(errors.errors.len(), 1);
}

#[test]
fn contract_dates_must_be_ordered() {
    let data = ContractData {
        customer_name: "Cliente".to_string(),
        number: "2024-001".to_string(),
        start_date: date(2024, 3, 1),
        end_date: Some(date(2024, 2, 1)),
        monthly_amount_cents: 15_000,
        service_id: None,
        notes: None,
    };
    let errors = validate_contract(&data).expect_err("end before start");
    assert!(errors.has("end_date"));

    let ok = ContractData {
        end_date: Some(date(2025, 3, 1)),
        ..data
    };
    assert_eq!(validate_contract(&ok), Ok(()));
}

#[test]
fn service_price_may_be_zero() {
    let data = ServiceData {
        name: "Instalacao".to_string(),
        description: None,
        price_cents: 0,
        active: true,
    };
    assert_eq!(validate_service(&data), Ok(()));
}

#[test]
fn receivable_installment_within_count() {
    let data = ReceivableData {
        description: "Venda 42".to_string(),
        customer_name: "Joao".to_string(),
        amount_cents: 9_990,
        due_date: date(2024, 5, 10),
        status: ReceivableStatus::Open,
        installment: 3,
        installments: 2,
        payment_method_id: None,
        seller_id: None,
        paid_at: None,
    };
    let errors = validate_receivable(&data).expect_err("3 of 2");
    assert!(errors.has("installment"));
    assert!(!errors.has("amount_cents"));
}

#[test]
fn pix_cannot_be_split() {
    let data = PaymentMethodData {
        name: "Pix".to_string(),
        kind: PaymentKind::Pix,
        fee_percent: 0.0,
        max_installments: 3,
        active: true,
    };
    let errors = validate_payment_method(&data).expect_err("pix with installments");
    assert!(errors.has("max_installments"));

    let card = PaymentMethodData {
        kind: PaymentKind::CreditCard,
        fee_percent: 3.5,
        ..data
    };
    assert_eq!(validate_payment_method(&card), Ok(()));
}
