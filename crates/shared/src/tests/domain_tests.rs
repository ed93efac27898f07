use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{
    Entity, EntityData, PaymentKind, PaymentMethod, Receivable, ReceivableData, ReceivableStatus,
    Seller, SellerData,
};

#[test]
fn record_flattens_payload_next_to_backend_columns() {
    let seller: Seller = serde_json::from_value(json!({
        "id": "7f8c2d1e-0000-4000-8000-000000000001",
        "created_at": "2024-04-01T12:00:00Z",
        "name": "Ana",
        "tax_id": "52998224725",
        "email": "ana@loja.com"
    }))
    .expect("decode seller");

    assert_eq!(seller.id().as_str(), "7f8c2d1e-0000-4000-8000-000000000001");
    assert!(seller.created_at.is_some());
    assert_eq!(seller.data.name, "Ana");
    assert!(seller.data.active);
    assert_eq!(seller.data.commission_percent, 0.0);
}

#[test]
fn payload_serializes_without_backend_columns() {
    let data = SellerData {
        name: "Ana".to_string(),
        tax_id: "52998224725".to_string(),
        email: "ana@loja.com".to_string(),
        phone: None,
        commission_percent: 2.5,
        active: false,
    };
    let value = serde_json::to_value(&data).expect("encode");
    assert!(value.get("id").is_none());
    assert!(value.get("phone").is_none());
    assert_eq!(value["active"], json!(false));
}

#[test]
fn tables_are_distinct() {
    let tables = [
        crate::domain::CompanyData::TABLE,
        SellerData::TABLE,
        crate::domain::ContractData::TABLE,
        crate::domain::ServiceData::TABLE,
        ReceivableData::TABLE,
        crate::domain::PaymentMethodData::TABLE,
    ];
    let mut sorted = tables.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), tables.len());
}

#[test]
fn receivable_defaults_and_overdue() {
    let receivable: Receivable = serde_json::from_value(json!({
        "id": "r1",
        "description": "Parcela",
        "customer_name": "Joao",
        "amount_cents": 1000,
        "due_date": "2024-01-10"
    }))
    .expect("decode receivable");

    assert_eq!(receivable.data.status, ReceivableStatus::Open);
    assert_eq!(receivable.data.installments, 1);
    let today = NaiveDate::from_ymd_opt(2024, 2, 1).expect("date");
    assert!(receivable.data.is_overdue(today));
}

#[test]
fn payment_kind_uses_snake_case() {
    let method: PaymentMethod = serde_json::from_value(json!({
        "id": "pm1",
        "name": "Boleto",
        "kind": "bank_slip"
    }))
    .expect("decode payment method");
    assert_eq!(method.data.kind, PaymentKind::BankSlip);
    assert!(method.data.kind.allows_installments());
    assert!(!PaymentKind::Cash.allows_installments());
}
