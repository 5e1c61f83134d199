use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::cart::{CartItem, CartItemPatch, NewCartItem};
use crate::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Add,
    Remove,
    Update,
    Clear,
}

impl CommandType {
    fn name(self) -> &'static str {
        match self {
            CommandType::Add => "add",
            CommandType::Remove => "remove",
            CommandType::Update => "update",
            CommandType::Clear => "clear",
        }
    }
}

/// One row of a command batch.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Command {
    pub op: Option<CommandType>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price_2dp")]
    pub daily_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_price_2dp")]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub rental_days: Option<u32>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_brand: Option<String>,
    #[serde(default)]
    pub item_image: Option<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
}

/// Prices are parsed from the raw field text so no digits pass through `f64`.
fn deserialize_price_2dp<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Decimal::from_str(raw.trim())
        .map(|dec| Some(dec.round_dp_with_strategy(2, RoundingStrategy::ToZero)))
        .map_err(|e| de::Error::custom(format!("invalid price '{raw}': {e}")))
}

/// How a remove or update command picks its line item.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Id(String),
    Rental {
        item_id: String,
        start_date: String,
        end_date: String,
    },
}

/// A validated command, ready to apply to a cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    Add(NewCartItem),
    Remove(Target),
    Update(Target, CartItemPatch),
    Clear,
}

fn required(value: Option<String>, command: CommandType, field: &'static str) -> Result<String, Error> {
    value.ok_or(Error::MissingField {
        command: command.name(),
        field,
    })
}

impl TryFrom<Command> for CartCommand {
    type Error = Error;

    fn try_from(row: Command) -> Result<Self, Self::Error> {
        let op = row.op.ok_or(Error::MissingField {
            command: "batch",
            field: "op",
        })?;

        match op {
            CommandType::Add => Ok(CartCommand::Add(NewCartItem {
                item_id: required(row.item_id, op, "item_id")?,
                start_date: required(row.start_date, op, "start_date")?,
                end_date: required(row.end_date, op, "end_date")?,
                daily_price: row.daily_price.ok_or(Error::MissingField {
                    command: op.name(),
                    field: "daily_price",
                })?,
                item_name: row.item_name,
                item_brand: row.item_brand,
                item_image: row.item_image,
                booking_id: row.booking_id,
            })),
            CommandType::Remove => {
                let target = match row.id {
                    Some(id) => Target::Id(id),
                    None => Target::Rental {
                        item_id: required(row.item_id, op, "id")?,
                        start_date: required(row.start_date, op, "start_date")?,
                        end_date: required(row.end_date, op, "end_date")?,
                    },
                };
                Ok(CartCommand::Remove(target))
            }
            CommandType::Update => {
                let mut patch = CartItemPatch {
                    rental_days: row.rental_days,
                    total_price: row.total_price,
                    item_name: row.item_name,
                    item_brand: row.item_brand,
                    item_image: row.item_image,
                    booking_id: row.booking_id,
                    ..Default::default()
                };
                // Without an id the rental columns select the item instead of patching it
                let target = match row.id {
                    Some(id) => {
                        patch.item_id = row.item_id;
                        patch.start_date = row.start_date;
                        patch.end_date = row.end_date;
                        Target::Id(id)
                    }
                    None => Target::Rental {
                        item_id: required(row.item_id, op, "id")?,
                        start_date: required(row.start_date, op, "start_date")?,
                        end_date: required(row.end_date, op, "end_date")?,
                    },
                };
                Ok(CartCommand::Update(target, patch))
            }
            CommandType::Clear => Ok(CartCommand::Clear),
        }
    }
}

/// One row of the cart written after a batch.
#[derive(Debug, Serialize, PartialEq)]
pub struct CartItemRow {
    pub id: String,
    pub item_id: String,
    pub start_date: String,
    pub end_date: String,
    pub rental_days: u32,
    pub total_price: Decimal,
    pub booking_id: Option<String>,
}

impl From<CartItem> for CartItemRow {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            item_id: item.item_id,
            start_date: item.start_date,
            end_date: item.end_date,
            rental_days: item.rental_days,
            total_price: item.total_price,
            booking_id: item.booking_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "op,id,item_id,start_date,end_date,daily_price,total_price,rental_days,item_name,item_brand,item_image,booking_id";

    fn parse_csv_row(row: &str) -> Result<Command, csv::Error> {
        let data_with_header = format!("{}\n{}", HEADER, row);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse_csv_row("add,,d1,2025-08-01,2025-08-03,50,,,Silk Gown,Atelier,,").unwrap(),
            Command {
                op: Some(CommandType::Add),
                item_id: Some("d1".into()),
                start_date: Some("2025-08-01".into()),
                end_date: Some("2025-08-03".into()),
                daily_price: Some(dec!(50)),
                item_name: Some("Silk Gown".into()),
                item_brand: Some("Atelier".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_trims_fields() {
        let command = parse_csv_row("remove , abc ,,,,,,,,,,").unwrap();
        assert_eq!(command.op, Some(CommandType::Remove));
        assert_eq!(command.id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_update_with_derived_fields() {
        let command = parse_csv_row("update,abc,,,,,120.5,3,,,,bk-1").unwrap();
        assert_eq!(command.total_price, Some(dec!(120.5)));
        assert_eq!(command.rental_days, Some(3));
        assert_eq!(command.booking_id.as_deref(), Some("bk-1"));
    }

    #[test]
    fn test_parse_clear() {
        assert_eq!(
            parse_csv_row("clear,,,,,,,,,,,").unwrap(),
            Command {
                op: Some(CommandType::Clear),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_invalid_op() {
        assert!(parse_csv_row("upsert,,d1,,,,,,,,,").is_err());
    }

    #[test]
    fn test_parse_invalid_price() {
        assert!(parse_csv_row("add,,d1,2025-08-01,2025-08-03,abc,,,,,,").is_err());
    }

    #[test]
    fn test_parse_negative_rental_days() {
        assert!(parse_csv_row("update,abc,,,,,,-1,,,,").is_err());
    }

    #[test]
    fn test_prices_round_to_2_decimal_places() {
        let command = parse_csv_row("add,,d1,2025-08-01,2025-08-03,19.999,,,,,,").unwrap();
        assert_eq!(command.daily_price, Some(dec!(19.99))); // Rounded down from 19.999
    }

    #[test]
    fn test_large_price_keeps_every_digit() {
        let command =
            parse_csv_row("add,,d1,2025-08-01,2025-08-03,30000000000000000000000000.5,,,,,,").unwrap();
        assert_eq!(
            command.daily_price,
            Some(dec!(30000000000000000000000000.5))
        );
        assert_eq!(
            crate::rental::total_price(command.daily_price.unwrap(), 364).unwrap(),
            dec!(10920000000000000000000000182)
        );
    }

    #[test]
    fn test_missing_columns_default_to_none() {
        let mut reader = csv::Reader::from_reader("op,id\nremove,abc\n".as_bytes());
        let command: Command = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(command.id.as_deref(), Some("abc"));
        assert_eq!(command.item_id, None);
        assert_eq!(command.daily_price, None);
    }

    #[test]
    fn test_add_requires_rental_fields() {
        let row = parse_csv_row("add,,d1,2025-08-01,,50,,,,,,").unwrap();
        assert!(matches!(
            CartCommand::try_from(row),
            Err(Error::MissingField {
                command: "add",
                field: "end_date"
            })
        ));

        let row = parse_csv_row("add,,d1,2025-08-01,2025-08-03,,,,,,,").unwrap();
        assert!(matches!(
            CartCommand::try_from(row),
            Err(Error::MissingField {
                field: "daily_price",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_op() {
        let row = parse_csv_row(",abc,,,,,,,,,,").unwrap();
        assert!(matches!(
            CartCommand::try_from(row),
            Err(Error::MissingField { field: "op", .. })
        ));
    }

    #[test]
    fn test_remove_targets() {
        let row = parse_csv_row("remove,abc,,,,,,,,,,").unwrap();
        assert_eq!(
            CartCommand::try_from(row).unwrap(),
            CartCommand::Remove(Target::Id("abc".into()))
        );

        let row = parse_csv_row("remove,,d1,2025-08-01,2025-08-03,,,,,,,").unwrap();
        assert_eq!(
            CartCommand::try_from(row).unwrap(),
            CartCommand::Remove(Target::Rental {
                item_id: "d1".into(),
                start_date: "2025-08-01".into(),
                end_date: "2025-08-03".into(),
            })
        );

        let row = parse_csv_row("remove,,,,,,,,,,,").unwrap();
        assert!(matches!(
            CartCommand::try_from(row),
            Err(Error::MissingField { field: "id", .. })
        ));
    }

    #[test]
    fn test_update_by_id_patches_rental_columns() {
        let row = parse_csv_row("update,abc,d9,2025-09-01,,,,,,,,").unwrap();
        assert_eq!(
            CartCommand::try_from(row).unwrap(),
            CartCommand::Update(
                Target::Id("abc".into()),
                CartItemPatch {
                    item_id: Some("d9".into()),
                    start_date: Some("2025-09-01".into()),
                    ..Default::default()
                }
            )
        );
    }

    #[test]
    fn test_update_by_rental_selects_item() {
        let row = parse_csv_row("update,,d1,2025-08-01,2025-08-03,,,,Linen,,,bk-2").unwrap();
        assert_eq!(
            CartCommand::try_from(row).unwrap(),
            CartCommand::Update(
                Target::Rental {
                    item_id: "d1".into(),
                    start_date: "2025-08-01".into(),
                    end_date: "2025-08-03".into(),
                },
                CartItemPatch {
                    item_name: Some("Linen".into()),
                    booking_id: Some("bk-2".into()),
                    ..Default::default()
                }
            )
        );
    }

    #[test]
    fn test_item_row_from_cart_item() {
        let item = CartItem {
            id: "abc".into(),
            item_id: "d1".into(),
            start_date: "2025-08-01".into(),
            end_date: "2025-08-03".into(),
            rental_days: 2,
            total_price: dec!(100),
            item_name: Some("Gown".into()),
            item_brand: None,
            item_image: None,
            booking_id: None,
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(CartItemRow::from(item)).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            output,
            "id,item_id,start_date,end_date,rental_days,total_price,booking_id\nabc,d1,2025-08-01,2025-08-03,2,100,\n"
        );
    }
}
