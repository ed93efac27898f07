use super::*;

use std::sync::Arc;

use shared::domain::{Company, CompanyData};

use crate::gateway::MemoryGateway;

fn company(cnpj: &str) -> CompanyData {
    CompanyData {
        legal_name: "Comercio Exemplo LTDA".to_string(),
        trade_name: None,
        cnpj: cnpj.to_string(),
        state_registration: None,
        email: "fiscal@exemplo.com.br".to_string(),
        phone: None,
    }
}

#[tokio::test]
async fn invalid_data_never_reaches_the_gateway() {
    let gateway = Arc::new(MemoryGateway::new(10));
    let companies = BoundCollection::<Company>::for_table(gateway.clone());

    let err = submit_create(&companies, &company("11.222.333/0001-00"))
        .await
        .expect_err("bad cnpj");

    let errors = err.validation().expect("validation failure");
    assert!(errors.has("cnpj"));
    assert!(gateway.is_empty("empresas").await);
    assert!(companies.error().is_none());
}

#[tokio::test]
async fn valid_data_is_created() {
    let gateway = Arc::new(MemoryGateway::new(10));
    let companies = BoundCollection::<Company>::for_table(gateway);

    let created = submit_create(&companies, &company("11.222.333/0001-81"))
        .await
        .expect("create");

    assert_eq!(companies.items(), vec![created]);
}

#[tokio::test]
async fn backend_rejection_is_reported_as_rejected() {
    let gateway = Arc::new(MemoryGateway::new(10));
    let companies = BoundCollection::<Company>::for_table(gateway);

    let err = submit_update(
        &companies,
        &EntityId::from("ghost"),
        &company("11.222.333/0001-81"),
    )
    .await
    .expect_err("missing row");

    assert!(matches!(err, FormError::Rejected(_)));
    assert!(err.validation().is_none());
    assert!(companies.error().is_some());
}
