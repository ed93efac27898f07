//! Client-side core of the ERP: remote data gateways, the bound collection
//! controller and its per-entity facades, form submission and the PDV
//! keyboard shortcuts.

pub mod collection;
pub mod config;
pub mod facades;
pub mod forms;
pub mod gateway;
pub mod shortcuts;

pub use collection::{BoundCollection, CollectionState};
pub use config::{load_settings, ClientSettings};
pub use facades::{
    CompanyList, ContractList, PaymentMethodList, ReceivableList, SellerList, ServiceList,
};
pub use forms::{submit_create, submit_update, FormError};
pub use gateway::{Gateway, MemoryGateway, RestGateway};
pub use shortcuts::{KeyEvent, KeyboardHub, PosAction};
