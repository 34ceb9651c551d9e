//! Stacked-area chart specifications for a loss table.
//!
//! `render` is pure: it only reshapes table columns into two `ChartSpec`s.
//! `ChartSpec::to_figure` turns a spec into a plotly.js figure document for
//! the browser.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::table::{LossColumn, LossTable};

pub const INFANTRY_TITLE: &str = "Infantry";
pub const INFANTRY_Y_AXIS: &str = "Russian Infantry Losses";
pub const EQUIPMENT_TITLE: &str = "Equipment";
pub const EQUIPMENT_Y_AXIS: &str = "Russian Equipment Destroyed";

/// Stack order, bottom to top.
pub const INFANTRY_SERIES: [LossColumn; 2] = [LossColumn::Wounded, LossColumn::Killed];

/// Stack order, bottom to top.
pub const EQUIPMENT_SERIES: [LossColumn; 6] = [
    LossColumn::Artillery,
    LossColumn::Aircraft,
    LossColumn::Helicopters,
    LossColumn::Tanks,
    LossColumn::Armored,
    LossColumn::Ships,
];

/// Default qualitative colorway, one color per stacked series.
const COLORWAY: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverMode {
    /// One hover label per x value covering every series.
    UnifiedX,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub y_axis_title: String,
    pub theme: Theme,
    pub hover_mode: HoverMode,
    pub series: Vec<Series>,
}

/// Infantry and equipment charts for one table.
pub fn render(table: &LossTable) -> (ChartSpec, ChartSpec) {
    (
        stacked_area(table, INFANTRY_TITLE, INFANTRY_Y_AXIS, &INFANTRY_SERIES),
        stacked_area(table, EQUIPMENT_TITLE, EQUIPMENT_Y_AXIS, &EQUIPMENT_SERIES),
    )
}

fn stacked_area(
    table: &LossTable,
    title: &str,
    y_axis_title: &str,
    columns: &[LossColumn],
) -> ChartSpec {
    let dates = table.dates();
    ChartSpec {
        title: title.to_string(),
        y_axis_title: y_axis_title.to_string(),
        theme: Theme::Dark,
        hover_mode: HoverMode::UnifiedX,
        series: columns
            .iter()
            .map(|&column| Series {
                name: column.name().to_string(),
                x: dates.clone(),
                y: table.column(column),
            })
            .collect(),
    }
}

impl ChartSpec {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// plotly.js figure: `{ data: [...traces], layout: {...} }`.
    pub fn to_figure(&self) -> Value {
        let data: Vec<Value> = self
            .series
            .iter()
            .map(|series| {
                let x: Vec<String> = series.x.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
                json!({
                    "type": "scatter",
                    "mode": "lines",
                    "stackgroup": "1",
                    "name": series.name,
                    "legendgroup": series.name,
                    "x": x,
                    "y": series.y,
                })
            })
            .collect();

        let hovermode = match self.hover_mode {
            HoverMode::UnifiedX => "x",
        };

        json!({
            "data": data,
            "layout": {
                "template": template(self.theme),
                "legend": { "title": { "text": self.title } },
                "xaxis": { "title": { "text": "" } },
                "yaxis": { "title": { "text": self.y_axis_title } },
                "hovermode": hovermode,
            },
        })
    }
}

fn template(theme: Theme) -> Value {
    match theme {
        Theme::Dark => json!({
            "layout": {
                "colorway": COLORWAY,
                "font": { "color": "#f2f5fa" },
                "paper_bgcolor": "rgb(17,17,17)",
                "plot_bgcolor": "rgb(17,17,17)",
                "hoverlabel": { "align": "left" },
                "xaxis": {
                    "gridcolor": "#283442",
                    "linecolor": "#506784",
                    "zerolinecolor": "#283442",
                    "automargin": true,
                },
                "yaxis": {
                    "gridcolor": "#283442",
                    "linecolor": "#506784",
                    "zerolinecolor": "#283442",
                    "automargin": true,
                },
            }
        }),
    }
}
