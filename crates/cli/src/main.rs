//! Stride CLI - drive the cart from the command line.
//!
//! The composition root for headless use: builds a [`CartStore`] from
//! environment configuration, runs one operation, and prints the resulting
//! cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! stride show
//!
//! # Add one unit of product 1
//! stride add 1
//!
//! # Set product 1's quantity to 3
//! stride update 1 3
//!
//! # Remove product 1
//! stride remove 1
//! ```
//!
//! Configuration comes from the environment (see `stride-cart`'s config
//! module): `STRIDE_CATALOG_URL` is required, `STRIDE_STORAGE_DIR` and
//! `STRIDE_HTTP_TIMEOUT_SECS` are optional.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use stride_cart::{CartConfig, CartStore, CatalogClient, FileStorage, TracingNotifier};
use stride_core::ProductId;

#[derive(Parser)]
#[command(name = "stride")]
#[command(author, version, about = "Stride cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product to the cart
    Add {
        /// Product identifier
        product_id: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product identifier
        product_id: i64,
    },
    /// Set a product's quantity
    Update {
        /// Product identifier
        product_id: i64,
        /// Target quantity (at least 1)
        amount: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; default to warnings so user
    // notifications stay visible without drowning the cart printout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stride_cart=warn,stride=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;

    let catalog = CatalogClient::new(&config.catalog_url, config.http_timeout)?;
    let storage = FileStorage::new(&config.storage_dir)?;
    let store = CartStore::new(
        Arc::new(catalog),
        Arc::new(storage),
        Arc::new(TracingNotifier),
    )?;

    match cli.command {
        Commands::Show => {}
        Commands::Add { product_id } => {
            store.add_product(ProductId::new(product_id)).await?;
        }
        Commands::Remove { product_id } => {
            store.remove_product(ProductId::new(product_id)).await?;
        }
        Commands::Update { product_id, amount } => {
            store
                .update_product_amount(ProductId::new(product_id), amount)
                .await?;
        }
    }

    print_cart(&store);
    Ok(())
}

/// Print the cart as a table. Stdout is this binary's product.
#[allow(clippy::print_stdout)]
fn print_cart(store: &CartStore) {
    let items = store.cart();
    if items.is_empty() {
        println!("cart is empty");
        return;
    }

    println!("{:>6}  {:>6}  {:>10}  title", "id", "qty", "price");
    for item in &items {
        let id = item.id.to_string();
        let price = item.price.to_string();
        println!("{id:>6}  {:>6}  {price:>10}  {}", item.amount, item.title);
    }
}
