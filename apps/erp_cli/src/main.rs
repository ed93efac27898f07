use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    config::{apply_overrides, load_settings_from},
    gateway::Gateway,
    load_settings, shortcuts, submit_create, BoundCollection, FormError, RestGateway,
};
use shared::domain::{
    CompanyData, ContractData, EntityData, EntityId, PaymentMethodData, ReceivableData, Record,
    SellerData, ServiceData,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "erp", about = "Back-office client for the ERP data API")]
struct Cli {
    /// Settings file; defaults to ./erp.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EntityKind {
    Company,
    Seller,
    Contract,
    Service,
    Receivable,
    PaymentMethod,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        entity: EntityKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Create {
        entity: EntityKind,
        /// Record fields as a JSON object.
        #[arg(long)]
        json: String,
    },
    Delete {
        entity: EntityKind,
        id: String,
    },
    /// Print the point-of-sale shortcut table, or resolve one chord.
    Shortcuts {
        #[arg(long)]
        press: Option<String>,
    },
}

macro_rules! with_entity {
    ($kind:expr, $data:ident => $body:expr) => {
        match $kind {
            EntityKind::Company => {
                type $data = CompanyData;
                $body
            }
            EntityKind::Seller => {
                type $data = SellerData;
                $body
            }
            EntityKind::Contract => {
                type $data = ContractData;
                $body
            }
            EntityKind::Service => {
                type $data = ServiceData;
                $body
            }
            EntityKind::Receivable => {
                type $data = ReceivableData;
                $body
            }
            EntityKind::PaymentMethod => {
                type $data = PaymentMethodData;
                $body
            }
        }
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    if let Command::Shortcuts { press } = &cli.command {
        return print_shortcuts(press.as_deref());
    }

    let mut settings = match &cli.config {
        Some(path) => {
            let mut settings = load_settings_from(path)?;
            apply_overrides(&mut settings, |key| std::env::var(key).ok());
            settings
        }
        None => load_settings()?,
    };
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(api_key) = cli.api_key {
        settings.api_key = Some(api_key);
    }
    info!(base_url = %settings.base_url, page_size = settings.page_size, "erp: using data api");
    let gateway: Arc<dyn Gateway> = Arc::new(RestGateway::from_settings(&settings)?);

    match cli.command {
        Command::List { entity, page } => with_entity!(entity, D => list::<D>(gateway, page).await),
        Command::Create { entity, json } => {
            with_entity!(entity, D => create::<D>(gateway, &json).await)
        }
        Command::Delete { entity, id } => {
            with_entity!(entity, D => delete::<D>(gateway, EntityId::from(id)).await)
        }
        Command::Shortcuts { .. } => Ok(()),
    }
}

async fn list<D: EntityData>(gateway: Arc<dyn Gateway>, page: u32) -> Result<()> {
    let collection = BoundCollection::<Record<D>>::for_table(gateway);
    collection.load(page).await;
    let state = collection.state();
    if let Some(err) = state.error {
        bail!("failed to list {}: {err}", D::TABLE);
    }

    println!(
        "{} page {}/{}",
        D::TABLE,
        state.current_page,
        state.total_pages.max(1)
    );
    for item in &state.items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

async fn create<D: EntityData>(gateway: Arc<dyn Gateway>, raw: &str) -> Result<()> {
    let data: D = serde_json::from_str(raw)
        .with_context(|| format!("payload does not describe a {} record", D::TABLE))?;
    let collection = BoundCollection::<Record<D>>::for_table(gateway);

    match submit_create(&collection, &data).await {
        Ok(record) => {
            println!("created {} id={}", D::TABLE, record.id);
            Ok(())
        }
        Err(FormError::Invalid(errors)) => {
            for field in &errors.errors {
                eprintln!("  {field}");
            }
            bail!("{} record rejected by validation", D::TABLE)
        }
        Err(err) => Err(err.into()),
    }
}

async fn delete<D: EntityData>(gateway: Arc<dyn Gateway>, id: EntityId) -> Result<()> {
    let collection = BoundCollection::<Record<D>>::for_table(gateway);
    collection
        .delete_item(&id)
        .await
        .with_context(|| format!("failed to delete {} {id}", D::TABLE))?;
    println!("deleted {} id={id}", D::TABLE);
    Ok(())
}

fn print_shortcuts(press: Option<&str>) -> Result<()> {
    if let Some(chord) = press {
        let event: client_core::KeyEvent = chord.parse()?;
        match shortcuts::route(&event) {
            Some(action) => println!("{event} -> {}", action.description()),
            None => println!("{event} is not bound"),
        }
        return Ok(());
    }

    for (event, action) in shortcuts::bindings() {
        println!("{:<12} {}", event.to_string(), action.description());
    }
    Ok(())
}
