//! Product command handlers for the CLI.
//!
//! Reads go straight to the database. Deletes and imports run through the
//! catalog so stored images are released and payloads validated exactly as
//! the admin API does.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use lapstore_core::{validate_fields, AppConfig, Product, ProductFields, ProductType};
use lapstore_db::{PgProductStore, ProductFilter};
use uuid::Uuid;

/// Sub-commands available under `products`.
#[derive(Debug, Subcommand)]
pub enum ProductsCommands {
    /// List products, newest first
    List {
        /// Only show products of this type (laptop or accessory)
        #[arg(long = "type")]
        product_type: Option<ProductType>,
        /// Only show featured products
        #[arg(long)]
        featured: bool,
        /// Maximum number of products to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
    /// Print one product as JSON
    Show { id: Uuid },
    /// Delete a product and release its stored images
    Delete { id: Uuid },
    /// Create products from a JSON file holding an array of product payloads
    Import {
        path: PathBuf,
        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run(config: &AppConfig, command: ProductsCommands) -> anyhow::Result<()> {
    match command {
        ProductsCommands::List {
            product_type,
            featured,
            limit,
        } => {
            let filter = ProductFilter {
                product_type,
                featured: featured.then_some(true),
                limit: Some(limit.clamp(1, 1000)),
            };
            run_list(config, &filter).await
        }
        ProductsCommands::Show { id } => run_show(config, id).await,
        ProductsCommands::Delete { id } => run_delete(config, id).await,
        ProductsCommands::Import { path, dry_run } => run_import(config, &path, dry_run).await,
    }
}

async fn run_list(config: &AppConfig, filter: &ProductFilter) -> anyhow::Result<()> {
    let pool = lapstore_db::connect_pool_from_config(config).await?;
    let products = PgProductStore::new(pool).list_filtered(filter).await?;

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    println!(
        "{:<38}{:<11}{:<14}{:<8}{:<7}NAME",
        "ID", "TYPE", "PRICE", "IMAGES", "FEAT"
    );
    for product in &products {
        println!("{}", format_row(product));
    }
    Ok(())
}

async fn run_show(config: &AppConfig, id: Uuid) -> anyhow::Result<()> {
    let catalog = crate::connect_catalog(config).await?;
    let product = catalog.get_product(id).await?;
    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}

async fn run_delete(config: &AppConfig, id: Uuid) -> anyhow::Result<()> {
    let catalog = crate::connect_catalog(config).await?;
    catalog.delete_product(id).await?;
    println!("deleted product {id}");
    Ok(())
}

async fn run_import(config: &AppConfig, path: &Path, dry_run: bool) -> anyhow::Result<()> {
    let payloads = read_import_file(path)?;

    if dry_run {
        println!(
            "dry-run: {} product(s) in {} are valid",
            payloads.len(),
            path.display()
        );
        return Ok(());
    }

    let catalog = crate::connect_catalog(config).await?;
    let mut created = 0usize;
    for fields in &payloads {
        let product = catalog
            .create_product(fields)
            .await
            .with_context(|| format!("failed to import '{}'", fields.name))?;
        tracing::debug!(product_id = %product.id, name = %product.fields.name, "imported product");
        created += 1;
    }

    println!("imported {created} product(s) from {}", path.display());
    Ok(())
}

/// Reads and validates every payload in an import file.
///
/// The whole file is rejected if any entry is malformed, so an import never
/// stops halfway on bad input.
pub(crate) fn read_import_file(path: &Path) -> anyhow::Result<Vec<ProductFields>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let payloads: Vec<ProductFields> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of products", path.display()))?;

    for (index, fields) in payloads.iter().enumerate() {
        validate_fields(fields)
            .with_context(|| format!("entry {index} ('{}') is invalid", fields.name))?;
    }
    Ok(payloads)
}

pub(crate) fn format_row(product: &Product) -> String {
    let name = if product.fields.name.chars().count() > 40 {
        format!("{}...", product.fields.name.chars().take(40).collect::<String>())
    } else {
        product.fields.name.clone()
    };
    format!(
        "{:<38}{:<11}{:<14}{:<8}{:<7}{}",
        product.id.to_string(),
        product.product_type().as_str(),
        product.fields.price,
        product.fields.images.images.len(),
        if product.fields.featured { "yes" } else { "" },
        name
    )
}
