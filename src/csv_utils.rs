//! CSV serialization and deserialization utilities.
//!
//! Provides generic functions for reading command batches and writing cart rows.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Creates an iterator that reads CSV records from a file.
/// Fields are trimmed and each record is deserialized into type T.
pub fn read_csv<T, P>(path: P) -> csv::Result<impl Iterator<Item = csv::Result<T>>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?
        .into_deserialize())
}

/// Writes an iterator of records to a CSV writer.
/// The header comes from the first record, so no records means empty output.
pub fn write_csv<T, W>(writer: W, records: impl Iterator<Item = T>) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{Command, CommandType};
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_csv() -> csv::Result<()> {
        let commands: Vec<Command> =
            read_csv("data/clear_commands.csv")?.collect::<Result<_, _>>()?;

        let add = |item_id: &str, start: &str, end: &str, price| Command {
            op: Some(CommandType::Add),
            item_id: Some(item_id.into()),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            daily_price: Some(price),
            ..Default::default()
        };
        let expected_commands = vec![
            add("d1", "2025-08-01", "2025-08-03", dec!(50)),
            add("d2", "2025-08-05", "2025-08-06", dec!(35)),
            Command {
                op: Some(CommandType::Clear),
                ..Default::default()
            },
            add("d3", "2025-08-10", "2025-08-14", dec!(20)),
        ];
        assert_eq!(commands, expected_commands);

        Ok(())
    }

    #[test]
    fn test_write_csv_without_records_writes_nothing() -> csv::Result<()> {
        let mut output = Vec::new();
        write_csv(&mut output, std::iter::empty::<crate::dto::CartItemRow>())?;
        assert!(output.is_empty());
        Ok(())
    }
}
