//! The runner applies a CSV batch of cart commands to a cart store and writes
//! the resulting cart to a writer.
//!
//! This module provides both a synchronous and an asynchronous runner implementation.
//!
//! Commands that break a cart rule (duplicate rental, unknown id, bad dates,
//! price overflow, missing columns) are logged and skipped. Storage faults abort the batch.
mod async_runner;
mod sync_runner;

pub use async_runner::run as run_async;
pub use sync_runner::run;

use tracing::warn;

use crate::cart::CartStore;
use crate::dto::{CartCommand, Command, Target};
use crate::stores::Storage;
use crate::Error;

/// Outcome counts of one command batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: usize,
    pub rejected: usize,
}

impl RunSummary {
    /// Counts the outcome of one command, passing storage faults through.
    fn record(&mut self, outcome: Result<(), Error>) -> Result<(), Error> {
        match outcome {
            Ok(()) => {
                self.applied += 1;
                Ok(())
            }
            Err(err @ Error::Storage(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "command rejected");
                self.rejected += 1;
                Ok(())
            }
        }
    }
}

fn resolve_id<S: Storage>(store: &CartStore<S>, target: Target) -> Option<String> {
    match target {
        Target::Id(id) => Some(id),
        Target::Rental {
            item_id,
            start_date,
            end_date,
        } => store
            .find_by_natural_key(&item_id, &start_date, &end_date)
            .map(|item| item.id),
    }
}

fn apply<S: Storage>(store: &mut CartStore<S>, command: Command) -> Result<(), Error> {
    match CartCommand::try_from(command)? {
        CartCommand::Add(new_item) => store.add_item(new_item).map(|_| ()),
        CartCommand::Remove(target) => match resolve_id(store, target) {
            Some(id) => store.remove_item(&id),
            None => Ok(()),
        },
        CartCommand::Update(target, patch) => {
            let id = match resolve_id(store, target.clone()) {
                Some(id) => id,
                None => {
                    return Err(Error::NotFound {
                        id: describe(&target),
                    })
                }
            };
            store.update_item(&id, patch).map(|_| ())
        }
        CartCommand::Clear => store.clear_all(),
    }
}

fn describe(target: &Target) -> String {
    match target {
        Target::Id(id) => id.clone(),
        Target::Rental {
            item_id,
            start_date,
            end_date,
        } => format!("{item_id}@{start_date}..{end_date}"),
    }
}
