use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use crate::entities::account::{format_date, parse_date};
use crate::entities::{Account, NewAccount};
use crate::error::{Error, Result};

/// Path that selects a private in-memory store instead of a file
pub const IN_MEMORY: &str = ":memory:";

const ACCOUNT_COLUMNS: &str = "id, name, email, address, phone_number, date_joined";

/// Open the store at `path` and make sure the schema exists
pub fn open_database(path: &str) -> Result<Connection> {
    let conn = if path == IN_MEMORY {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };

    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            address TEXT NOT NULL,
            phone_number TEXT,
            date_joined TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Drop every account and recreate the schema
pub fn reset_database(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS accounts", [])?;
    setup_database(conn)
}

/// Persist a new account and return it with its assigned id
pub fn create_account(conn: &Connection, new_account: &NewAccount) -> Result<Account> {
    let date_joined = new_account.joined_on();

    conn.execute(
        "INSERT INTO accounts (name, email, address, phone_number, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_account.name,
            new_account.email,
            new_account.address,
            new_account.phone_number,
            format_date(date_joined),
        ],
    )?;

    Ok(Account {
        id: conn.last_insert_rowid(),
        name: new_account.name.clone(),
        email: new_account.email.clone(),
        address: new_account.address.clone(),
        phone_number: new_account.phone_number.clone(),
        date_joined,
    })
}

pub fn find_account(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
            params![id],
            account_from_row,
        )
        .optional()?;

    Ok(account)
}

pub fn all_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"))?;

    let accounts = stmt
        .query_map([], account_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(accounts)
}

/// Write every field of `account` back to its row (last writer wins)
pub fn update_account(conn: &Connection, account: &Account) -> Result<()> {
    let changed = conn.execute(
        "UPDATE accounts
         SET name = ?1, email = ?2, address = ?3, phone_number = ?4, date_joined = ?5
         WHERE id = ?6",
        params![
            account.name,
            account.email,
            account.address,
            account.phone_number,
            format_date(account.date_joined),
            account.id,
        ],
    )?;

    if changed == 0 {
        return Err(Error::AccountNotFound(account.id));
    }

    Ok(())
}

/// Remove an account; returns whether a row was deleted
pub fn delete_account(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_accounts(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;

    Ok(count)
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let date_joined: String = row.get(5)?;
    let date_joined = parse_date(&date_joined)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        address: row.get(3)?,
        phone_number: row.get(4)?,
        date_joined,
    })
}
