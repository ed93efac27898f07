//! Per-entity views over [`BoundCollection`] with domain vocabulary.

use std::{ops::Deref, sync::Arc};

use shared::{
    domain::{
        Company, CompanyData, Contract, ContractData, EntityId, PaymentMethod,
        PaymentMethodData, Receivable, ReceivableData, Seller, SellerData, Service, ServiceData,
    },
    error::GatewayError,
};

use crate::{collection::BoundCollection, gateway::Gateway};

macro_rules! facade {
    (
        $(#[$meta:meta])*
        $name:ident<$record:ty, $data:ty> {
            list: $list:ident,
            add: $add:ident,
            edit: $edit:ident,
            remove: $remove:ident $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            inner: BoundCollection<$record>,
        }

        impl $name {
            pub fn new(gateway: Arc<dyn Gateway>) -> Self {
                Self {
                    inner: BoundCollection::for_table(gateway),
                }
            }

            pub fn $list(&self) -> Vec<$record> {
                self.inner.items()
            }

            pub async fn $add(&self, data: &$data) -> Result<$record, GatewayError> {
                self.inner.create_item(data).await
            }

            pub async fn $edit(
                &self,
                id: &EntityId,
                data: &$data,
            ) -> Result<$record, GatewayError> {
                self.inner.update_item(id, data).await
            }

            pub async fn $remove(&self, id: &EntityId) -> Result<(), GatewayError> {
                self.inner.delete_item(id).await
            }

            pub fn collection(&self) -> &BoundCollection<$record> {
                &self.inner
            }
        }

        impl Deref for $name {
            type Target = BoundCollection<$record>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }
    };
}

facade! {
    /// Registered companies (empresas).
    CompanyList<Company, CompanyData> {
        list: companies,
        add: add_company,
        edit: edit_company,
        remove: remove_company,
    }
}

facade! {
    /// Sellers (vendedores).
    SellerList<Seller, SellerData> {
        list: sellers,
        add: add_seller,
        edit: edit_seller,
        remove: remove_seller,
    }
}

facade! {
    ContractList<Contract, ContractData> {
        list: contracts,
        add: add_contract,
        edit: edit_contract,
        remove: remove_contract,
    }
}

facade! {
    ServiceList<Service, ServiceData> {
        list: services,
        add: add_service,
        edit: edit_service,
        remove: remove_service,
    }
}

facade! {
    /// Accounts-receivable lines (contas a receber).
    ReceivableList<Receivable, ReceivableData> {
        list: receivables,
        add: add_receivable,
        edit: edit_receivable,
        remove: remove_receivable,
    }
}

facade! {
    PaymentMethodList<PaymentMethod, PaymentMethodData> {
        list: payment_methods,
        add: add_payment_method,
        edit: edit_payment_method,
        remove: remove_payment_method,
    }
}

#[cfg(test)]
#[path = "tests/facades_tests.rs"]
mod tests;
