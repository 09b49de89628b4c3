//! # Storefront CLI
//!
//! Drives the storefront stores from a terminal.
//!
//! Commands:
//! - `storefront products` - List a catalog page
//! - `storefront product <id>` - Show one product
//! - `storefront login` - Log in and print the session token
//! - `storefront me` - Show the user behind `--token`
//! - `storefront cart` - Show the cart and its total
//! - `storefront orders` - List order history
//! - `storefront config` - Print (or write) the effective configuration
//!
//! Logs go to stderr; set `RUST_LOG` to change the filter.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use storefront_client::{ClientConfig, HttpTransport, MemorySessionStorage, SessionStorage};
use storefront_core::{LoginCredentials, OrderQuery, Product, ProductQuery};
use storefront_state::{AppStore, Collaborators, NoOpNavigator, TracingNotifier};

/// Storefront command-line client
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session token for authenticated commands
    #[arg(long, global = true, env = "STOREFRONT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a page of the catalog
    Products(ProductsArgs),

    /// Show one product
    Product {
        /// Product id
        id: String,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Show the user behind the current token
    Me,

    /// Show the cart
    Cart,

    /// List order history
    Orders {
        #[arg(long)]
        page: Option<u32>,

        /// Filter by order number
        #[arg(long)]
        order_num: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args)]
struct ProductsArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Page size (5, 10, 20 or 50)
    #[arg(long)]
    per_page: Option<u32>,

    /// Name filter
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ClientConfig::load(cli.config.clone()).context("failed to load configuration")?;
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    let session: Arc<dyn SessionStorage> = match &cli.token {
        Some(token) => Arc::new(MemorySessionStorage::with_entry(config.token_key(), token)),
        None => Arc::new(MemorySessionStorage::new()),
    };
    let transport = HttpTransport::new(&config, session.clone())?;
    let app = AppStore::new(
        &config,
        Collaborators {
            transport: Arc::new(transport),
            session: session.clone(),
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NoOpNavigator),
        },
    );

    match cli.command {
        Commands::Config { write } => show_config(&config, cli.config.clone(), write)?,

        Commands::Products(args) => {
            let mut query = ProductQuery::page(args.page);
            if let Some(per_page) = args.per_page {
                app.product().set_items_per_page(per_page)?;
                query = query.with_items_per_page(per_page);
            }
            if let Some(name) = args.name {
                query = query.with_name(name);
            }

            let page = app.product().get_product_list(query).into_result().await?;
            if cli.json {
                print_json(&page.products)?;
            } else {
                for product in &page.products {
                    print_product_line(product);
                }
                let state = app.product().snapshot();
                println!(
                    "page {} of {} ({} per page)",
                    state.current_page, state.total_pages, state.items_per_page
                );
            }
        }

        Commands::Product { id } => {
            let product = app.product().get_product_detail(&id).into_result().await?;
            if cli.json {
                print_json(&product)?;
            } else {
                print_product_line(&product);
                println!("  {}", product.description);
                let mut sizes: Vec<_> = product.stock.iter().collect();
                sizes.sort();
                for (size, qty) in sizes {
                    println!("  {:<4} {:>4} in stock", size, qty);
                }
            }
        }

        Commands::Login { email, password } => {
            let user = app
                .user()
                .login_with_email(LoginCredentials { email, password })
                .into_result()
                .await?;
            println!("Logged in as {} <{}>", user.name, user.email);
            if let Some(token) = session.get(config.token_key()) {
                println!("export STOREFRONT_TOKEN={}", token);
            }
        }

        Commands::Me => {
            require_token(&cli.token)?;
            let user = app.user().login_with_token().into_result().await?;
            if cli.json {
                print_json(&user)?;
            } else {
                let role = if user.is_admin() { "admin" } else { "customer" };
                println!("{} <{}> ({})", user.name, user.email, role);
            }
        }

        Commands::Cart => {
            require_token(&cli.token)?;
            let items = app.cart().get_cart_list().into_result().await?;
            let state = app.cart().snapshot();
            if cli.json {
                print_json(&state)?;
            } else {
                for item in &items {
                    let line_total = item.line_total().unwrap_or_default();
                    println!(
                        "{:<30} {:<4} x{:<3} {:>10}",
                        item.product.name, item.size, item.qty, line_total
                    );
                }
                println!("total {}", state.total_price);
            }
        }

        Commands::Orders { page, order_num } => {
            require_token(&cli.token)?;
            let result = app
                .order()
                .get_order_list(OrderQuery { page, order_num })
                .into_result()
                .await?;
            if cli.json {
                print_json(&result.orders)?;
            } else {
                for order in &result.orders {
                    println!(
                        "{:<16} {:<10} {:>10}",
                        order.order_num,
                        format!("{:?}", order.status).to_lowercase(),
                        order.total_price
                    );
                }
                println!("{} page(s)", result.total_pages);
            }
        }
    }

    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "info,storefront=debug";

/// Initializes the tracing subscriber, writing to stderr.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    subscriber(filter).init();
}

/// Stderr subscriber governed entirely by `filter`.
fn subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn require_token(token: &Option<String>) -> Result<()> {
    if token.is_none() {
        anyhow::bail!("this command needs --token or STOREFRONT_TOKEN (run `storefront login` first)");
    }
    Ok(())
}

fn show_config(config: &ClientConfig, path: Option<PathBuf>, write: bool) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    if write {
        config.save(path)?;
    }
    Ok(())
}

fn print_product_line(product: &Product) {
    println!(
        "{:<24} {:<12} {:<30} {:>10}",
        product.id, product.sku, product.name, product.price
    );
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_products() {
        let cli = Cli::try_parse_from(["storefront", "products", "--page", "2", "--per-page", "20"]).unwrap();
        match cli.command {
            Commands::Products(args) => {
                assert_eq!(args.page, 2);
                assert_eq!(args.per_page, Some(20));
            }
            _ => panic!("expected products"),
        }
    }

    #[test]
    fn test_log_filter_governs_dependencies() {
        tracing::subscriber::with_default(subscriber(EnvFilter::new("warn")), || {
            assert!(!tracing::enabled!(target: "hyper::proto", tracing::Level::DEBUG));
            assert!(tracing::enabled!(target: "hyper::proto", tracing::Level::WARN));
        });

        tracing::subscriber::with_default(subscriber(EnvFilter::new(DEFAULT_LOG_FILTER)), || {
            assert!(tracing::enabled!(target: "storefront", tracing::Level::DEBUG));
            assert!(!tracing::enabled!(target: "reqwest::connect", tracing::Level::DEBUG));
        });
    }

    #[test]
    fn test_require_token() {
        assert!(require_token(&None).is_err());
        assert!(require_token(&Some("abc".into())).is_ok());
    }
}
