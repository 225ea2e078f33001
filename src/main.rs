use anyhow::{Context, Result};
use std::env;

use account_service::{all_accounts, count_accounts, open_database, reset_database, AppConfig};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = AppConfig::load().context("failed to load configuration")?;

    match args.get(1).map(String::as_str) {
        Some("db-create") => run_db_create(&config)?,
        Some("list") => run_list(&config)?,
        _ => print_usage(),
    }

    Ok(())
}

/// Drop and recreate the accounts table
fn run_db_create(config: &AppConfig) -> Result<()> {
    let path = &config.database.path;
    let conn = open_database(path).with_context(|| format!("failed to open database at {path}"))?;

    reset_database(&conn).context("failed to recreate schema")?;
    println!("✓ Database tables recreated at {path}");

    Ok(())
}

fn run_list(config: &AppConfig) -> Result<()> {
    let path = &config.database.path;
    let conn = open_database(path).with_context(|| format!("failed to open database at {path}"))?;

    let accounts = all_accounts(&conn)?;
    for account in &accounts {
        println!(
            "{:>5}  {:<24} {:<28} {:<14} {}",
            account.id,
            account.name,
            account.email,
            account.phone_number.as_deref().unwrap_or("-"),
            account.date_joined,
        );
    }
    println!("✓ {} accounts", count_accounts(&conn)?);

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: account-service <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  db-create   Drop and recreate the accounts table");
    eprintln!("  list        Print every stored account");
    eprintln!();
    eprintln!("Run the HTTP API with: account-server");
}
