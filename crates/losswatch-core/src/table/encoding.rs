//! Column-oriented JSON encoding of a loss table.
//!
//! ```json
//! {"columns":["date","killed",...],"index":[0,1],"data":[["2022-03-01T00:00:00.000",100,...],...]}
//! ```
//!
//! This is the value stored in the refresh cache; decoding it is the only
//! way the chart side sees a table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::parse_date;
use super::{LossColumn, LossRow, LossTable, DATE_COLUMN};
use crate::error::FeedError;

/// Timestamp layout used for encoded dates.
const DATE_FORMAT: &str = "%Y-%m-%dT00:00:00.000";

#[derive(Debug, Serialize, Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    index: Vec<usize>,
    data: Vec<Vec<Value>>,
}

/// An encoded loss table. Equality is byte equality of the JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedTable(String);

impl EncodedTable {
    pub fn encode(table: &LossTable) -> Result<Self, FeedError> {
        let mut columns = vec![DATE_COLUMN.to_string()];
        columns.extend(LossColumn::ALL.iter().map(|c| c.name().to_string()));

        let data = table
            .rows()
            .iter()
            .map(|row| {
                let mut values = Vec::with_capacity(columns.len());
                values.push(Value::String(row.date.format(DATE_FORMAT).to_string()));
                values.extend(LossColumn::ALL.iter().map(|&c| Value::from(row.value(c))));
                values
            })
            .collect();

        let split = SplitTable {
            columns,
            index: (0..table.len()).collect(),
            data,
        };
        serde_json::to_string(&split)
            .map(EncodedTable)
            .map_err(|e| FeedError::Encoding(e.to_string()))
    }

    pub fn decode(&self) -> Result<LossTable, FeedError> {
        let split: SplitTable =
            serde_json::from_str(&self.0).map_err(|e| FeedError::Encoding(e.to_string()))?;

        if split.index.len() != split.data.len() {
            return Err(FeedError::Encoding(format!(
                "index has {} entries but data has {} rows",
                split.index.len(),
                split.data.len()
            )));
        }

        let position = |name: &str| {
            split
                .columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| FeedError::Encoding(format!("missing column `{}`", name)))
        };
        let date_at = position(DATE_COLUMN)?;
        let mut int_at = [0usize; LossColumn::ALL.len()];
        for (slot, column) in int_at.iter_mut().zip(LossColumn::ALL) {
            *slot = position(column.name())?;
        }

        let rows = split
            .data
            .iter()
            .enumerate()
            .map(|(i, values)| {
                if values.len() != split.columns.len() {
                    return Err(FeedError::Encoding(format!(
                        "row {} has {} values for {} columns",
                        i,
                        values.len(),
                        split.columns.len()
                    )));
                }
                let date = values[date_at]
                    .as_str()
                    .and_then(parse_date)
                    .ok_or_else(|| FeedError::Encoding(format!("row {} has an invalid date", i)))?;
                let int = |column: LossColumn| {
                    values[int_at[column as usize]].as_i64().ok_or_else(|| {
                        FeedError::Encoding(format!("row {} has a non-integer `{}`", i, column.name()))
                    })
                };
                Ok(LossRow {
                    date,
                    killed: int(LossColumn::Killed)?,
                    wounded: int(LossColumn::Wounded)?,
                    artillery: int(LossColumn::Artillery)?,
                    aircraft: int(LossColumn::Aircraft)?,
                    helicopters: int(LossColumn::Helicopters)?,
                    tanks: int(LossColumn::Tanks)?,
                    armored: int(LossColumn::Armored)?,
                    ships: int(LossColumn::Ships)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LossTable::new(rows))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EncodedTable {
    fn from(json: String) -> Self {
        EncodedTable(json)
    }
}
