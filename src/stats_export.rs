use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::stats::{PlayerStats, STAT_FIELDS, stat_label};

/// Write the displayed leaderboard to an xlsx workbook: one header row, one
/// row per player. Returns the number of exported players.
pub fn export_player_stats(path: &Path, stats: &[PlayerStats]) -> Result<usize> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Leaderboard")?;

    sheet
        .write_string(0, 0, "Player")
        .context("write header cell")?;
    for (col, field) in STAT_FIELDS.iter().enumerate() {
        sheet
            .write_string(0, (col + 1) as u16, stat_label(*field))
            .context("write header cell")?;
    }

    for (row, player) in stats.iter().enumerate() {
        let row_idx = (row + 1) as u32;
        sheet
            .write_string(row_idx, 0, &player.username)
            .with_context(|| format!("write player row {row_idx}"))?;
        for (col, field) in STAT_FIELDS.iter().enumerate() {
            sheet
                .write_number(row_idx, (col + 1) as u16, player.stats.value(*field))
                .with_context(|| format!("write stat cell ({row_idx},{})", col + 1))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(stats.len())
}
