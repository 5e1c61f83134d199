use std::error::Error;
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{apply, RunSummary};
use crate::{
    cart::CartStore,
    csv_utils::{read_csv, write_csv},
    dto::{CartItemRow, Command},
    stores::Storage,
};

/// Applies the command batch in the given file to `store` and writes the resulting cart to the provided writer.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing cart commands
/// * `store` - The cart the commands are applied to
/// * `writer` - Where to write the cart items (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * The cart cannot be persisted
/// * Writing to the output fails
pub fn run<P, S, W>(
    input_path: P,
    store: &mut CartStore<S>,
    writer: W,
) -> Result<RunSummary, Box<dyn Error>>
where
    P: AsRef<Path>,
    S: Storage,
    W: Write,
{
    let mut summary = RunSummary::default();

    let commands_iter = read_csv::<Command, _>(input_path)?;
    for command in commands_iter {
        // CSV parsing errors are critical - propagate them
        let command = command?;
        summary.record(apply(store, command))?;
    }
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        "command batch finished"
    );

    // Cart order is insertion order, so output is already deterministic
    write_csv(writer, store.list_items().into_iter().map(CartItemRow::from))?;
    Ok(summary)
}
