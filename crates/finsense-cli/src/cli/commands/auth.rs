//! Auth command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use finsense_core::api::ApiClient;
use finsense_core::session::{SessionManager, SessionStore, Startup, mask_token};

pub async fn login(
    client: &ApiClient,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    let username = match username {
        Some(u) => u.to_string(),
        None => prompt("Username: ")?,
    };
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt("Password: ")?,
    };

    let mut manager = SessionManager::new();
    let profile = manager
        .login(client, &username, &password)
        .await
        .context("login failed")?;

    println!("✓ Signed in as {} ({})", profile.username, profile.email);
    if let Some(token) = manager.token() {
        println!("  Token: {}", mask_token(token));
    }
    println!(
        "  Session saved to: {}",
        SessionStore::default_path().display()
    );

    Ok(())
}

pub async fn register(
    client: &ApiClient,
    email: Option<&str>,
    username: Option<&str>,
    full_name: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    let email = match email {
        Some(e) => e.to_string(),
        None => prompt("Email: ")?,
    };
    let username = match username {
        Some(u) => u.to_string(),
        None => prompt("Username: ")?,
    };
    let full_name = match full_name {
        Some(n) => n.to_string(),
        None => prompt("Full name: ")?,
    };
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt("Password: ")?,
    };

    let mut manager = SessionManager::new();
    let profile = manager
        .register(client, &email, &username, &full_name, &password)
        .await
        .context("registration failed")?;

    println!("✓ Account created. Signed in as {}", profile.username);
    println!(
        "  Session saved to: {}",
        SessionStore::default_path().display()
    );

    Ok(())
}

pub fn logout() -> Result<()> {
    let mut manager = SessionManager::new();
    let had_session = manager.logout()?;

    if had_session {
        println!("✓ Signed out");
        println!(
            "  Session removed from: {}",
            SessionStore::default_path().display()
        );
    } else {
        println!("Not signed in (no session found).");
    }

    Ok(())
}

pub async fn whoami(client: &ApiClient) -> Result<()> {
    let mut manager = SessionManager::new();

    match manager.startup(client).await.context("resolve session")? {
        Startup::Resumed(profile) => {
            println!("Signed in as {} ({})", profile.username, profile.email);
            println!("  Full name: {}", profile.full_name);
            println!("  Member since: {}", profile.created_at.format("%Y-%m-%d"));
            if !profile.is_active {
                println!("  Account is inactive");
            }
        }
        Startup::Expired(err) => {
            println!(
                "Stored session is no longer valid: {}",
                err.detail_or_message()
            );
            println!("Please sign in again with `finsense login`.");
        }
        Startup::SignedOut => {
            println!("Not signed in.");
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("Input cannot be empty");
    }
    Ok(value)
}
