//! Well selection within plate-like labware.
//!
//! Wells are addressed "A1"-style: row letter (A = first row), 1-based
//! column number. Selection walks columns first, skipping wells already in
//! use.

use labdeck_catalog::LabwareEntry;
use labdeck_core::binding::{WellPattern, WellSelection};

/// Fill pattern used when picking wells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPattern {
    #[default]
    Sequential,
    Alternating,
    Checkerboard,
}

impl From<SelectionPattern> for WellPattern {
    fn from(pattern: SelectionPattern) -> Self {
        match pattern {
            SelectionPattern::Sequential => WellPattern::Sequential,
            SelectionPattern::Alternating => WellPattern::Alternating,
            SelectionPattern::Checkerboard => WellPattern::Checkerboard,
        }
    }
}

fn well_name(row: u32, column: u32) -> String {
    let letter = char::from(b'A' + row as u8);
    format!("{letter}{column}")
}

/// Select up to `count` free wells from `labware` in the given pattern.
/// Labware without a well layout yields an empty selection.
pub fn select_wells(
    labware: &LabwareEntry,
    count: usize,
    pattern: SelectionPattern,
    used_wells: &[String],
) -> WellSelection {
    let Some(layout) = &labware.well_layout else {
        return WellSelection::default();
    };

    let mut specific = Vec::new();
    let column_step = match pattern {
        SelectionPattern::Alternating => 2,
        _ => 1,
    };

    'outer: for column in (1..=layout.columns).step_by(column_step) {
        for row in 0..layout.rows {
            if specific.len() >= count {
                break 'outer;
            }
            if pattern == SelectionPattern::Checkerboard && (row + column) % 2 != 0 {
                continue;
            }
            let well = well_name(row, column);
            if !used_wells.contains(&well) {
                specific.push(well);
            }
        }
    }

    WellSelection {
        rows: Vec::new(),
        columns: Vec::new(),
        specific,
        pattern: Some(pattern.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdeck_catalog::ResourceCatalog;

    fn plate() -> LabwareEntry {
        ResourceCatalog::with_builtins()
            .labware("corning_96_wellplate_360ul_flat")
            .cloned()
            .unwrap()
    }

    #[test]
    fn sequential_fills_column_first() {
        let selection = select_wells(&plate(), 3, SelectionPattern::Sequential, &[]);
        assert_eq!(selection.specific, ["A1", "B1", "C1"]);
        assert_eq!(selection.pattern, Some(WellPattern::Sequential));
    }

    #[test]
    fn sequential_skips_used_wells() {
        let used = vec!["A1".to_string(), "B1".to_string()];
        let selection = select_wells(&plate(), 2, SelectionPattern::Sequential, &used);
        assert_eq!(selection.specific, ["C1", "D1"]);
    }

    #[test]
    fn alternating_skips_odd_columns() {
        let selection = select_wells(&plate(), 9, SelectionPattern::Alternating, &[]);
        // Eight wells from column 1, then the ninth from column 3.
        assert_eq!(selection.specific[7], "H1");
        assert_eq!(selection.specific[8], "A3");
    }

    #[test]
    fn checkerboard_selects_even_parity_cells() {
        let selection = select_wells(&plate(), 4, SelectionPattern::Checkerboard, &[]);
        // Column 1: rows with (row + 1) % 2 == 0 → B1, D1, F1, H1.
        assert_eq!(selection.specific, ["B1", "D1", "F1", "H1"]);
    }

    #[test]
    fn labware_without_layout_selects_nothing() {
        let mut labware = plate();
        labware.well_layout = None;
        let selection = select_wells(&labware, 4, SelectionPattern::Sequential, &[]);
        assert!(selection.specific.is_empty());
    }
}
