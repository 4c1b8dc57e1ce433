//! Ajaxtreon CLI - Command-line front end for the ERP backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from AJAXTREON_PASSWORD or a prompt)
//! ajx login -e rina@toko.id
//!
//! # Who is signed in
//! ajx whoami
//!
//! # What the route guard does for a path
//! ajx route check /admin/users
//!
//! # List a resource as JSON
//! ajx list products
//!
//! # Date-ranged report
//! ajx report sales --from 2024-01-01 --to 2024-01-31
//!
//! # Stock movements
//! ajx stock adjust prod-1 -3 --note "Damaged in transit"
//! ajx stock history prod-1
//! ```
//!
//! # Environment Variables
//!
//! See `ajaxtreon_client::config` for the client settings. In addition:
//! - `RUST_LOG` - Log filter (default: `ajaxtreon_client=info,ajaxtreon_cli=info`)
//! - `AJAXTREON_LOG_JSON` - Emit logs as JSON lines when set

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::resources::{Report, Resource};
use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "ajx")]
#[command(author, version, about = "Ajaxtreon ERP command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Route guard checks
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },
    /// List every record of a resource as JSON
    List {
        #[arg(value_enum)]
        resource: Resource,
    },
    /// Fetch a date-ranged report as JSON
    Report {
        #[arg(value_enum)]
        kind: Report,

        /// First day (YYYY-MM-DD)
        #[arg(long = "from")]
        start_date: NaiveDate,

        /// Last day (YYYY-MM-DD)
        #[arg(long = "to")]
        end_date: NaiveDate,
    },
    /// Stock adjustments and history
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Mark a notification as read
    Read {
        /// Notification ID
        id: String,
    },
}

#[derive(Subcommand)]
enum RouteAction {
    /// Print `allow <path>` or `redirect <target>` for a navigation target
    Check {
        /// Path such as `/admin/users`
        path: String,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Add (positive) or subtract (negative) stock
    Adjust {
        /// Product ID
        product_id: String,

        /// Signed, non-zero quantity
        #[arg(allow_negative_numbers = true)]
        delta: i64,

        /// Reason recorded with the movement
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Stock movements of one product
    History {
        /// Product ID
        product_id: String,
    },
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ajaxtreon_client=info,ajaxtreon_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so JSON output on stdout stays machine-readable
    if std::env::var_os("AJAXTREON_LOG_JSON").is_some() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::from_env()?;

    match cli.command {
        Commands::Login { email } => commands::auth::login(&ctx, &email).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Route {
            action: RouteAction::Check { path },
        } => commands::route::check(&ctx, &path).await,
        Commands::List { resource } => commands::resources::list(&ctx, resource).await,
        Commands::Report {
            kind,
            start_date,
            end_date,
        } => commands::resources::report(&ctx, kind, start_date, end_date).await,
        Commands::Stock { action } => match action {
            StockAction::Adjust {
                product_id,
                delta,
                note,
            } => commands::resources::adjust_stock(&ctx, &product_id, delta, &note).await,
            StockAction::History { product_id } => {
                commands::resources::stock_history(&ctx, &product_id).await
            }
        },
        Commands::Read { id } => commands::resources::mark_notification_read(&ctx, &id).await,
    }
}
