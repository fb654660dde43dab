use std::collections::BTreeMap;

/// The program text, addressed as rows of character codes.
///
/// Rows are stored sparsely: a line with no characters never gets an entry,
/// and each stored row keeps its own length, so the grid is jagged rather
/// than rectangular. A space is stored as code 0, the same value an absent
/// cell reads as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeGrid {
    rows: BTreeMap<usize, Vec<u32>>,
}

impl CodeGrid {
    /// Build a grid from program text. Lines are split on `'\n'` only, so a
    /// trailing `'\r'` stays in the row as an ordinary (no-op) character;
    /// use [`CodeGrid::from_source`] for text read from files.
    pub fn build(text: &str) -> Self {
        Self::from_codes(
            text.split('\n')
                .map(|line| line.chars().map(|ch| if ch == ' ' { 0 } else { ch as u32 })),
        )
    }

    /// Build a grid from a program file or REPL submission. CRLF line
    /// endings are read as plain `'\n'` before splitting.
    pub fn from_source(text: &str) -> Self {
        Self::build(&text.replace("\r\n", "\n"))
    }

    /// Build a grid from raw code points, one iterator per row.
    ///
    /// Unlike [`CodeGrid::build`] nothing guarantees the codes are valid
    /// characters; stepping onto one that is not ends the run with
    /// [`crate::BrainboxError::Undecodable`].
    pub fn from_codes<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = u32>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .filter_map(|(y, row)| {
                let row: Vec<u32> = row.into_iter().collect();
                (!row.is_empty()).then_some((y, row))
            })
            .collect();
        Self { rows }
    }

    /// Highest row index holding at least one cell (0 for an empty grid).
    pub fn max_row(&self) -> usize {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    /// Highest column index of row `y` (0 when the row has no cells).
    pub fn max_col(&self, y: usize) -> usize {
        self.rows.get(&y).map_or(0, |row| row.len() - 1)
    }

    /// Code at `(x, y)`; absent cells read as 0.
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.rows
            .get(&y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(0)
    }

    /// The text of row `y` with spaces restored, used for error context.
    pub fn row_text(&self, y: usize) -> String {
        self.rows
            .get(&y)
            .map(|row| {
                row.iter()
                    .map(|&code| match code {
                        0 => ' ',
                        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_source_reads_crlf_as_newline() {
        let grid = CodeGrid::from_source("abv\r\n!+\r\n");
        assert_eq!(grid.max_col(0), 2);
        assert_eq!(grid.max_col(1), 1);
        assert_eq!(grid.row_text(1), "!+");
        assert_eq!(CodeGrid::build("!+\r").max_col(0), 2);
    }

    #[test]
    fn spaces_and_absent_cells_read_as_zero() {
        let grid = CodeGrid::build("+ -");
        assert_eq!(grid.get(0, 0), '+' as u32);
        assert_eq!(grid.get(1, 0), 0);
        assert_eq!(grid.get(2, 0), '-' as u32);
        assert_eq!(grid.get(9, 0), 0);
        assert_eq!(grid.get(0, 7), 0);
    }

    #[test]
    fn rows_are_jagged() {
        let grid = CodeGrid::build("abcde\nx\nxyz");
        assert_eq!(grid.max_row(), 2);
        assert_eq!(grid.max_col(0), 4);
        assert_eq!(grid.max_col(1), 0);
        assert_eq!(grid.max_col(2), 2);
    }

    #[test]
    fn blank_lines_are_not_stored() {
        let grid = CodeGrid::build("v\n\n!\n");
        // The trailing newline does not add a row; the blank middle row reads as empty.
        assert_eq!(grid.max_row(), 2);
        assert_eq!(grid.max_col(1), 0);
        assert_eq!(grid.get(0, 1), 0);
    }

    #[test]
    fn empty_text_is_accepted() {
        let grid = CodeGrid::build("");
        assert!(grid.is_empty());
        assert_eq!(grid.max_row(), 0);
        assert_eq!(grid.max_col(0), 0);
    }

    #[test]
    fn carriage_return_is_kept_as_a_cell() {
        let grid = CodeGrid::build("+!\r\n");
        assert_eq!(grid.max_col(0), 2);
        assert_eq!(grid.get(2, 0), '\r' as u32);
    }

    #[test]
    fn row_text_restores_spaces() {
        let grid = CodeGrid::build("> v");
        assert_eq!(grid.row_text(0), "> v");
        assert_eq!(grid.row_text(4), "");
    }
}
