//! Loss table: the typed, tabular form of a feed.
//!
//! `builder` turns a raw feed payload into a table and `encoding` moves
//! tables to and from the column-oriented JSON form stored in the cache.

pub mod builder;
pub mod encoding;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use builder::{build, parse_feed};
pub use encoding::EncodedTable;

/// Integer columns of a loss table, in encoded column order.
///
/// Discriminants match positions in `LossColumn::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossColumn {
    Killed,
    Wounded,
    Artillery,
    Aircraft,
    Helicopters,
    Tanks,
    Armored,
    Ships,
}

impl LossColumn {
    pub const ALL: [LossColumn; 8] = [
        LossColumn::Killed,
        LossColumn::Wounded,
        LossColumn::Artillery,
        LossColumn::Aircraft,
        LossColumn::Helicopters,
        LossColumn::Tanks,
        LossColumn::Armored,
        LossColumn::Ships,
    ];

    /// Column name in the table.
    pub fn name(self) -> &'static str {
        match self {
            LossColumn::Killed => "killed",
            LossColumn::Wounded => "wounded",
            LossColumn::Artillery => "artillery",
            LossColumn::Aircraft => "aircraft",
            LossColumn::Helicopters => "helicopters",
            LossColumn::Tanks => "tanks",
            LossColumn::Armored => "armored",
            LossColumn::Ships => "ships",
        }
    }

    /// Field this column is read from in a story's `content`.
    pub fn feed_field(self) -> &'static str {
        match self {
            LossColumn::Armored => "armored_combat_vehicles",
            LossColumn::Ships => "ships_boats",
            other => other.name(),
        }
    }
}

/// Name of the date column.
pub const DATE_COLUMN: &str = "date";

/// One reported day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossRow {
    pub date: NaiveDate,
    pub killed: i64,
    pub wounded: i64,
    pub artillery: i64,
    pub aircraft: i64,
    pub helicopters: i64,
    pub tanks: i64,
    pub armored: i64,
    pub ships: i64,
}

impl LossRow {
    pub fn value(&self, column: LossColumn) -> i64 {
        match column {
            LossColumn::Killed => self.killed,
            LossColumn::Wounded => self.wounded,
            LossColumn::Artillery => self.artillery,
            LossColumn::Aircraft => self.aircraft,
            LossColumn::Helicopters => self.helicopters,
            LossColumn::Tanks => self.tanks,
            LossColumn::Armored => self.armored,
            LossColumn::Ships => self.ships,
        }
    }
}

/// Rows in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LossTable {
    rows: Vec<LossRow>,
}

impl LossTable {
    pub fn new(rows: Vec<LossRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LossRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|row| row.date).collect()
    }

    pub fn column(&self, column: LossColumn) -> Vec<i64> {
        self.rows.iter().map(|row| row.value(column)).collect()
    }
}
