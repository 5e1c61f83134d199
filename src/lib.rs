mod cart;
mod config;
mod csv_utils;
mod dto;
mod error;
mod logging;
mod rental;
mod runner;
mod stores;

pub use cart::{CartItem, CartItemPatch, CartStore, NewCartItem, DEFAULT_STORAGE_KEY};
pub use config::{Config, ConfigError};
pub use dto::{CartItemRow, Command, CommandType};
pub use error::{Error, StorageError};
pub use logging::init as init_logging;
pub use rental::{rental_days, total_price};
pub use runner::{run, run_async, RunSummary};
pub use stores::{FileStorage, MemoryStorage, Storage};
