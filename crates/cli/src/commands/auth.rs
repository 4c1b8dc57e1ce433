//! Sign-in, sign-out and session inspection.
//!
//! # Usage
//!
//! ```bash
//! # Password from the environment (useful in scripts)
//! AJAXTREON_PASSWORD=... ajx login -e rina@toko.id
//!
//! # Or typed in at the prompt
//! ajx login -e rina@toko.id
//!
//! ajx whoami
//! ajx logout
//! ```

use std::io::Write;

use ajaxtreon_client::guard::landing_after_login;
use ajaxtreon_core::Email;
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, Context, print_json};

const PASSWORD_ENV: &str = "AJAXTREON_PASSWORD";

pub async fn login(ctx: &Context, email: &str) -> Result<(), CliError> {
    // Catch typos before asking for the password.
    let email = Email::parse(email)?;
    let password = read_password().await?;
    let user = ctx.resolver.login(email.as_str(), &password).await?;

    tracing::info!(email = %user.email, role = %user.role, "Signed in");
    println!(
        "Signed in as {} ({}). Start page: {}",
        user.email,
        user.role,
        landing_after_login(&user)
    );
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    // Resolve first so the backend logout carries the stored token.
    ctx.resolver.resolve().await;
    ctx.resolver.logout().await;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.resolver.resolve().await;
    let user = session.user().ok_or(CliError::NotSignedIn)?;
    print_json(user)
}

/// Take the password from `AJAXTREON_PASSWORD`, or prompt for one line on stdin.
async fn read_password() -> Result<SecretString, CliError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    print!("Password: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CliError::MissingPassword);
    }
    Ok(SecretString::from(password.to_string()))
}
