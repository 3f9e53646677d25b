mod commands;

use clap::{Parser, Subcommand};
use shopdash_client::{CancellationToken, DummyJsonClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopdash")]
#[command(about = "Product catalog admin for the DummyJSON demo API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List, create, update, or delete products
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// List product categories
    Categories,
    /// List orders (carts)
    Orders,
    /// Headline inventory numbers across the whole catalog
    Dashboard,
    /// Category distribution and top brands by inventory value
    Analytics,
}

#[derive(Debug, Subcommand)]
enum ProductsCommands {
    /// Show one page of products
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Free-text search; takes precedence over --category
        #[arg(long)]
        search: Option<String>,

        /// Category slug, or "all"
        #[arg(long)]
        category: Option<String>,
    },
    /// Dump every product in one response
    All,
    /// Create a product from form fields
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        stock: u64,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Replace a product with the full JSON record in FILE
    Update {
        /// Path to a JSON file holding a complete product, including `id`
        file: std::path::PathBuf,
    },
    /// Delete a product by id
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shopdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "configuration loaded");

    let client = DummyJsonClient::from_config(&config)?;
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling request");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Products { command } => match command {
            ProductsCommands::List {
                page,
                search,
                category,
            } => commands::list_products(&client, &cancel, page, search, category).await,
            ProductsCommands::All => commands::all_products(&client, &cancel).await,
            ProductsCommands::Create {
                title,
                brand,
                price,
                stock,
                category,
                description,
            } => {
                let form = commands::ProductForm {
                    title,
                    brand,
                    price,
                    stock,
                    category,
                    description,
                };
                commands::create_product(&client, &cancel, form).await
            }
            ProductsCommands::Update { file } => {
                commands::update_product(&client, &cancel, &file).await
            }
            ProductsCommands::Delete { id } => {
                commands::delete_product(&client, &cancel, id).await
            }
        },
        Commands::Categories => commands::categories(&client, &cancel).await,
        Commands::Orders => commands::orders(&client, &cancel).await,
        Commands::Dashboard => commands::dashboard(&client, &cancel).await,
        Commands::Analytics => commands::analytics(&client, &cancel).await,
    }
}
