//! Route guard checks from the command line.
//!
//! ```bash
//! ajx route check /admin/users
//! # => redirect /seller/dashboard
//! ```

use ajaxtreon_client::{Navigation, RouteGuard};

use super::{CliError, Context};

/// Print what the guard would do for `path` with the stored session.
pub async fn check(ctx: &Context, path: &str) -> Result<(), CliError> {
    let guard = RouteGuard::new(ctx.resolver.clone());
    match guard.check(path).await {
        Navigation::Allow => println!("allow {path}"),
        Navigation::Redirect(target) => println!("redirect {target}"),
    }
    Ok(())
}
