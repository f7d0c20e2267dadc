//! Account file loading
//!
//! One account per line: `name [last_login_unix_seconds]`. Blank lines and
//! lines starting with `#` are ignored.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::{AccountStore, PlayerAuth};

#[derive(Debug, Error)]
pub enum AccountFileError {
    #[error("failed to read account file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid last login timestamp {value:?}")]
    InvalidTimestamp { line: usize, value: String },

    #[error("line {line}: unexpected trailing field {value:?}")]
    TrailingField { line: usize, value: String },
}

/// Load an account file into a fresh store
pub fn load_accounts(path: impl AsRef<Path>) -> Result<AccountStore, AccountFileError> {
    let contents = fs::read_to_string(path)?;
    parse_accounts(&contents)
}

/// Parse account lines into a fresh store
pub fn parse_accounts(contents: &str) -> Result<AccountStore, AccountFileError> {
    let store = AccountStore::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let mut fields = raw.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };

        let last_login = match fields.next() {
            Some(value) => Some(parse_timestamp(line, value)?),
            None => None,
        };

        if let Some(extra) = fields.next() {
            return Err(AccountFileError::TrailingField {
                line,
                value: extra.to_string(),
            });
        }

        store.save(PlayerAuth::new(name, last_login));
    }

    Ok(store)
}

fn parse_timestamp(line: usize, value: &str) -> Result<DateTime<Utc>, AccountFileError> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| AccountFileError::InvalidTimestamp {
            line,
            value: value.to_string(),
        })
}
