//! Resource listing, reports and stock adjustments.
//!
//! Every command resolves the stored session first. If the backend rejects
//! the token mid-command the stored session is dropped and the command asks
//! for a fresh login.

use ajaxtreon_client::models::{ReportKind, ReportQuery};
use ajaxtreon_core::{NotificationId, ProductId};
use chrono::NaiveDate;
use clap::ValueEnum;

use super::{CliError, Context, print_json};

/// Resource families that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Leads,
    Contacts,
    Opportunities,
    Activities,
    CrmUsers,
    Suppliers,
    Sellers,
    Products,
    Categories,
    Stocks,
    Orders,
    Purchases,
    Users,
    Notifications,
}

/// Report families, named as the backend's `/report/{kind}` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Report {
    Sales,
    Purchases,
    Stocks,
    Revenue,
    Customers,
    Suppliers,
    InventoryTurnover,
}

impl From<Report> for ReportKind {
    fn from(report: Report) -> Self {
        match report {
            Report::Sales => Self::Sales,
            Report::Purchases => Self::Purchases,
            Report::Stocks => Self::Stocks,
            Report::Revenue => Self::Revenue,
            Report::Customers => Self::Customers,
            Report::Suppliers => Self::Suppliers,
            Report::InventoryTurnover => Self::InventoryTurnover,
        }
    }
}

pub async fn list(ctx: &Context, resource: Resource) -> Result<(), CliError> {
    ctx.require_session().await?;
    let api = ctx.api();

    match resource {
        Resource::Leads => print_json(&ctx.call(api.leads().list()).await?),
        Resource::Contacts => print_json(&ctx.call(api.contacts().list()).await?),
        Resource::Opportunities => print_json(&ctx.call(api.opportunities().list()).await?),
        Resource::Activities => print_json(&ctx.call(api.activities().list()).await?),
        Resource::CrmUsers => print_json(&ctx.call(api.crm_users().list()).await?),
        Resource::Suppliers => print_json(&ctx.call(api.suppliers().list()).await?),
        Resource::Sellers => print_json(&ctx.call(api.sellers().list()).await?),
        Resource::Products => print_json(&ctx.call(api.products().list()).await?),
        Resource::Categories => print_json(&ctx.call(api.categories().list()).await?),
        Resource::Stocks => print_json(&ctx.call(api.stocks().list()).await?),
        Resource::Orders => print_json(&ctx.call(api.orders().list()).await?),
        Resource::Purchases => print_json(&ctx.call(api.purchases().list()).await?),
        Resource::Users => print_json(&ctx.call(api.users().list()).await?),
        Resource::Notifications => print_json(&ctx.call(api.notifications().mine()).await?),
    }
}

pub async fn report(
    ctx: &Context,
    report: Report,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), CliError> {
    ctx.require_session().await?;
    let query = ReportQuery {
        start_date,
        end_date,
    };
    let rows = ctx
        .call(
            ctx.api()
                .reports()
                .fetch::<serde_json::Value>(report.into(), &query),
        )
        .await?;
    tracing::debug!(rows = rows.len(), "Report fetched");
    print_json(&rows)
}

pub async fn stock_history(ctx: &Context, product_id: &str) -> Result<(), CliError> {
    ctx.require_session().await?;
    let history = ctx.call(ctx.api().stocks().history(&ProductId::new(product_id))).await?;
    print_json(&history)
}

/// Direction and size of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMovement {
    Add(u32),
    Subtract(u32),
}

impl TryFrom<i64> for StockMovement {
    type Error = CliError;

    /// Zero and anything beyond `u32` are rejected before any request is sent.
    fn try_from(delta: i64) -> Result<Self, Self::Error> {
        let quantity =
            u32::try_from(delta.unsigned_abs()).map_err(|_| CliError::InvalidQuantity(delta))?;
        match delta {
            0 => Err(CliError::InvalidQuantity(delta)),
            d if d > 0 => Ok(Self::Add(quantity)),
            _ => Ok(Self::Subtract(quantity)),
        }
    }
}

/// Add (positive `delta`) or subtract (negative `delta`) stock.
pub async fn adjust_stock(
    ctx: &Context,
    product_id: &str,
    delta: i64,
    note: &str,
) -> Result<(), CliError> {
    let movement = StockMovement::try_from(delta)?;
    ctx.require_session().await?;
    let stocks = ctx.api().stocks();
    let product_id = ProductId::new(product_id);

    match movement {
        StockMovement::Add(quantity) => {
            ctx.call(stocks.add(&product_id, quantity, note)).await?;
        }
        StockMovement::Subtract(quantity) => {
            ctx.call(stocks.subtract(&product_id, quantity, note)).await?;
        }
    }
    println!("Stock of {product_id} adjusted by {delta}");
    Ok(())
}

pub async fn mark_notification_read(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.require_session().await?;
    ctx.call(
        ctx.api()
            .notifications()
            .mark_read(&NotificationId::new(id)),
    )
    .await?;
    println!("Notification {id} marked as read");
    Ok(())
}
