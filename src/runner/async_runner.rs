use std::error::Error;
use std::io::Write;
use std::path::Path;

use crate::{
    cart::CartStore,
    csv_utils::write_csv,
    dto::{CartItemRow, Command},
    stores::Storage,
};

use super::{apply, RunSummary};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::info;

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Applies the command batch in the given file to `store` asynchronously and writes the resulting cart to the provided writer.
/// Spawns two tasks:
/// * CSV reader - streams commands from the input file, deserializes them and sends them to the processor via channel.
/// * Processor - owns the store, receives commands from the channel and applies them in order until the channel is closed.
///
/// The store is handed back together with the summary once the batch is done.
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * The cart cannot be persisted
/// * Writing to the output fails
pub async fn run<P, S, W>(
    input_path: P,
    store: CartStore<S>,
    writer: W,
) -> Result<(CartStore<S>, RunSummary)>
where
    P: AsRef<Path>,
    S: Storage + Send + 'static,
    W: Write,
{
    // Create channel for passing commands from reader to processor
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_commands(input_path, tx));
    let processor_handle = tokio::spawn(process_commands(store, rx));

    // The processor stops early on a storage fault; the reader then sees a closed channel
    let processed = processor_handle.await?;
    reader_handle.await??;
    let (store, summary) = processed?;

    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        "command batch finished"
    );

    write_csv(writer, store.list_items().into_iter().map(CartItemRow::from))?;
    Ok((store, summary))
}

/// Reads and deserializes commands from a CSV file.
/// Returns them through the provided channel.
async fn read_commands(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<Command>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<Command>();
    while let Some(result) = records.next().await {
        match result {
            Ok(command) => {
                if tx.send(command).await.is_err() {
                    // Receiver dropped, exit gracefully
                    break;
                }
            }
            // CSV parsing errors are critical - propagate them
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Applies commands received through the channel.
/// Returns the store once the channel is closed by the reader.
async fn process_commands<S: Storage>(
    mut store: CartStore<S>,
    mut rx: mpsc::Receiver<Command>,
) -> Result<(CartStore<S>, RunSummary), crate::Error> {
    let mut summary = RunSummary::default();
    while let Some(command) = rx.recv().await {
        summary.record(apply(&mut store, command))?;
    }
    Ok((store, summary))
}
