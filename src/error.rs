//! Errors raised by the cart store and its storage backends.
//!
//! Business-rule failures:
//! - A rental request that is already in the cart (duplicate natural key)
//! - A surrogate id that no longer resolves to a line item
//! - Rental dates that cannot be parsed
//! - A total price too large to represent
//! - Batch commands lacking a required column
//!
//! Technical failures of the persisted blob are wrapped in [`StorageError`].
//! Read paths of the store swallow these and log them; write paths return them.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("item '{item_id}' is already in the cart for {start_date}..{end_date}")]
    DuplicateEntry {
        item_id: String,
        start_date: String,
        end_date: String,
    },

    #[error("no cart item with id '{id}'")]
    NotFound { id: String },

    #[error("invalid rental date '{0}'")]
    InvalidDate(String),

    #[error("total price overflows for {daily_price} per day over {rental_days} days")]
    PriceOverflow {
        daily_price: Decimal,
        rental_days: u32,
    },

    #[error("'{command}' command is missing '{field}'")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    #[error("cart storage failure: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart blob could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage key '{0}' is not allowed")]
    InvalidKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
