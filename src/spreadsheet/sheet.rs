use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::DateSystem;
use crate::spreadsheet::cell::RawCell;
use crate::spreadsheet::DecodeError;

/// Cells collected from one worksheet, with the top-left corner of the used area.
pub(crate) struct Sheet {
    pub(crate) name: String,
    pub(crate) cells: Vec<Cell>,
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            col_lower_bound: None,
        }
    }

    /// Adds a cell, widening the used area to include it.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.col_lower_bound.map(|lower| col < lower).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
    }

    /// Lays the cells out as a rectangle under the header row.
    ///
    /// The first used row is the header and its last cell fixes the width;
    /// cells right of it are dropped. Rows run down to the last row holding a
    /// cell inside that width, blank rows in between are kept as nulls.
    /// Fails before allocating when the rectangle holds more than `max_cells`.
    pub(crate) fn into_rows(self, system: DateSystem, max_cells: usize) -> Result<Vec<Vec<RawCell>>, DecodeError> {
        let (Some(row_lower), Some(col_lower)) = (self.row_lower_bound, self.col_lower_bound) else {
            return Ok(Vec::new());
        };
        let Some(col_upper) = self.cells.iter().filter(|cell| cell.row == row_lower).map(|cell| cell.col).max() else {
            return Ok(Vec::new());
        };
        let row_upper = self
            .cells
            .iter()
            .filter(|cell| cell.col <= col_upper)
            .map(|cell| cell.row)
            .max()
            .unwrap_or(row_lower);

        let width = col_upper - col_lower + 1;
        let height = row_upper - row_lower + 1;
        if height.saturating_mul(width) > max_cells {
            return Err(DecodeError::TooLarge {
                rows: height,
                columns: width,
                limit: max_cells,
            });
        }

        let mut rows = vec![vec![RawCell::Null; width]; height];
        for cell in self.cells.iter().filter(|cell| cell.col <= col_upper) {
            rows[cell.row - row_lower][cell.col - col_lower] = cell.to_raw(system);
        }
        Ok(rows)
    }
}
