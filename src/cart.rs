//! The cart store: rental line items persisted as one JSON array under a
//! single storage key.
//!
//! Every operation reads the whole list, transforms it in memory and, for
//! mutations, writes the whole list back. Reads are best-effort: a missing or
//! unreadable blob is an empty cart. Writes report storage faults to the
//! caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::rental;
use crate::stores::Storage;
use crate::Error;

pub const DEFAULT_STORAGE_KEY: &str = "rental_cart";

/// One rental booking staged for checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub item_id: String,
    pub start_date: String,
    pub end_date: String,
    pub rental_days: u32,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_image: Option<String>,
    /// Set when the entry comes from an already placed booking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
}

impl CartItem {
    /// Whether this item is the rental request `(item_id, start_date, end_date)`.
    pub fn is_rental(&self, item_id: &str, start_date: &str, end_date: &str) -> bool {
        self.item_id == item_id && self.start_date == start_date && self.end_date == end_date
    }

    fn same_rental(&self, other: &CartItem) -> bool {
        self.is_rental(&other.item_id, &other.start_date, &other.end_date)
    }
}

/// Payload for [`CartStore::add_item`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCartItem {
    pub item_id: String,
    pub start_date: String,
    pub end_date: String,
    /// Only used to derive `total_price`; not stored.
    pub daily_price: Decimal,
    pub item_name: Option<String>,
    pub item_brand: Option<String>,
    pub item_image: Option<String>,
    pub booking_id: Option<String>,
}

impl NewCartItem {
    pub fn new(
        item_id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        daily_price: Decimal,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            daily_price,
            ..Default::default()
        }
    }
}

/// Partial update for [`CartStore::update_item`]. `None` leaves a field as is.
///
/// Derived fields are plain data here: changing the dates does not recompute
/// `rental_days` or `total_price`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartItemPatch {
    pub item_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rental_days: Option<u32>,
    pub total_price: Option<Decimal>,
    pub item_name: Option<String>,
    pub item_brand: Option<String>,
    pub item_image: Option<String>,
    pub booking_id: Option<String>,
}

impl CartItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(self, item: &mut CartItem) {
        if let Some(item_id) = self.item_id {
            item.item_id = item_id;
        }
        if let Some(start_date) = self.start_date {
            item.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            item.end_date = end_date;
        }
        if let Some(rental_days) = self.rental_days {
            item.rental_days = rental_days;
        }
        if let Some(total_price) = self.total_price {
            item.total_price = total_price;
        }
        if self.item_name.is_some() {
            item.item_name = self.item_name;
        }
        if self.item_brand.is_some() {
            item.item_brand = self.item_brand;
        }
        if self.item_image.is_some() {
            item.item_image = self.item_image;
        }
        if self.booking_id.is_some() {
            item.booking_id = self.booking_id;
        }
    }
}

pub struct CartStore<S> {
    storage: S,
    key: String,
}

impl<S: Storage> CartStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gives the storage backend back, e.g. to reopen the cart elsewhere.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn load(&self) -> Result<Vec<CartItem>, StorageError> {
        match self.storage.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, items: &[CartItem]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.storage.set(&self.key, &raw)?;
        debug!(key = %self.key, items = items.len(), "cart persisted");
        Ok(())
    }

    /// All line items, oldest first. An unreadable cart reads as empty.
    pub fn list_items(&self) -> Vec<CartItem> {
        self.load().unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "cart could not be read, treating as empty");
            Vec::new()
        })
    }

    /// Adds a new rental request to the cart.
    ///
    /// Returns [`Error::DuplicateEntry`] without writing anything if the same
    /// item is already in the cart for the same dates.
    pub fn add_item(&mut self, new_item: NewCartItem) -> Result<CartItem> {
        let rental_days = rental::rental_days(&new_item.start_date, &new_item.end_date)?;
        let total_price = rental::total_price(new_item.daily_price, rental_days)?;
        let mut items = self.load()?;

        if items
            .iter()
            .any(|item| item.is_rental(&new_item.item_id, &new_item.start_date, &new_item.end_date))
        {
            return Err(Error::DuplicateEntry {
                item_id: new_item.item_id,
                start_date: new_item.start_date,
                end_date: new_item.end_date,
            });
        }

        let item = CartItem {
            id: Uuid::new_v4().to_string(),
            total_price,
            rental_days,
            item_id: new_item.item_id,
            start_date: new_item.start_date,
            end_date: new_item.end_date,
            item_name: new_item.item_name,
            item_brand: new_item.item_brand,
            item_image: new_item.item_image,
            booking_id: new_item.booking_id,
        };
        items.push(item.clone());
        self.save(&items)?;
        debug!(id = %item.id, item_id = %item.item_id, rental_days, "cart item added");
        Ok(item)
    }

    /// Removes the item with the given id. Unknown ids are a no-op.
    pub fn remove_item(&mut self, id: &str) -> Result<()> {
        let mut items = self.load()?;
        items.retain(|item| item.id != id);
        self.save(&items)?;
        debug!(id, "cart item removed");
        Ok(())
    }

    /// Merges `patch` over the item with the given id.
    ///
    /// Returns [`Error::NotFound`] for an unknown id, and
    /// [`Error::DuplicateEntry`] if the patched item would collide with
    /// another rental request already in the cart.
    pub fn update_item(&mut self, id: &str, patch: CartItemPatch) -> Result<CartItem> {
        let mut items = self.load()?;
        let index = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| Error::NotFound { id: id.to_owned() })?;

        let mut updated = items[index].clone();
        patch.apply_to(&mut updated);

        let collides = items
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && other.same_rental(&updated));
        if collides {
            return Err(Error::DuplicateEntry {
                item_id: updated.item_id,
                start_date: updated.start_date,
                end_date: updated.end_date,
            });
        }

        items[index] = updated.clone();
        self.save(&items)?;
        debug!(id, "cart item updated");
        Ok(updated)
    }

    /// Drops the persisted cart entirely.
    pub fn clear_all(&mut self) -> Result<()> {
        self.storage.remove(&self.key)?;
        debug!(key = %self.key, "cart cleared");
        Ok(())
    }

    /// Sum of all total prices; zero for an empty cart.
    /// Saturates at `Decimal::MAX` if the sum does not fit.
    pub fn total(&self) -> Decimal {
        self.list_items()
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total_price))
            .unwrap_or_else(|| {
                warn!(key = %self.key, "cart total overflows, saturating");
                Decimal::MAX
            })
    }

    pub fn count(&self) -> usize {
        self.list_items().len()
    }

    pub fn find_by_id(&self, id: &str) -> Option<CartItem> {
        self.list_items().into_iter().find(|item| item.id == id)
    }

    pub fn find_by_natural_key(
        &self,
        item_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Option<CartItem> {
        self.list_items()
            .into_iter()
            .find(|item| item.is_rental(item_id, start_date, end_date))
    }

    pub fn exists_by_natural_key(&self, item_id: &str, start_date: &str, end_date: &str) -> bool {
        self.find_by_natural_key(item_id, start_date, end_date)
            .is_some()
    }
}
