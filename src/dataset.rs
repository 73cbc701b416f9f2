use ratatui::style::Color;

use crate::stats::{PlayerStats, STAT_FIELDS, StatField, stat_label};

/// Added to every charted value: a bar/slice at exactly zero renders as
/// nothing, so zero-valued players would vanish from the chart entirely.
/// Small enough to be invisible at any legitimate stat magnitude.
pub const ZERO_VISIBILITY_EPSILON: f64 = 0.00000000001;

pub const SERIES_PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightMagenta,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationKind {
    Table,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieType {
    Pie,
    Doughnut,
}

pub fn visualization_label(kind: VisualizationKind) -> &'static str {
    match kind {
        VisualizationKind::Table => "Table",
        VisualizationKind::Pie => "Chart",
    }
}

pub fn pie_type_label(pie: PieType) -> &'static str {
    match pie {
        PieType::Pie => "Pie",
        PieType::Doughnut => "Doughnut",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub point_colors: Vec<Color>,
    pub values: Vec<f64>,
}

/// Normalized render-ready shape: one label per player (input order), series
/// values aligned with the labels. Rebuilt wholesale on any input change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartDataset {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

pub fn build_dataset(
    player_stats: &[PlayerStats],
    visualization: VisualizationKind,
    selected_stat: StatField,
) -> ChartDataset {
    match visualization {
        VisualizationKind::Table => table_dataset(player_stats),
        VisualizationKind::Pie => pie_dataset(player_stats, selected_stat),
    }
}

pub fn palette_color(index: usize) -> Color {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

/// Row-oriented passthrough: one series per registry field, raw values.
fn table_dataset(player_stats: &[PlayerStats]) -> ChartDataset {
    let labels = player_stats
        .iter()
        .map(|player| player.username.clone())
        .collect::<Vec<_>>();

    let series = STAT_FIELDS
        .iter()
        .enumerate()
        .map(|(idx, field)| ChartSeries {
            label: stat_label(*field).to_string(),
            point_colors: vec![palette_color(idx); player_stats.len()],
            values: player_stats
                .iter()
                .map(|player| player.stats.value(*field))
                .collect(),
        })
        .collect();

    ChartDataset { labels, series }
}

/// Single series over the selected field, one slice per player.
fn pie_dataset(player_stats: &[PlayerStats], selected_stat: StatField) -> ChartDataset {
    let labels = player_stats
        .iter()
        .map(|player| player.username.clone())
        .collect::<Vec<_>>();

    let point_colors = (0..player_stats.len()).map(palette_color).collect();
    let values = player_stats
        .iter()
        .map(|player| player.stats.value(selected_stat) + ZERO_VISIBILITY_EPSILON)
        .collect();

    ChartDataset {
        labels,
        series: vec![ChartSeries {
            label: stat_label(selected_stat).to_string(),
            point_colors,
            values,
        }],
    }
}
