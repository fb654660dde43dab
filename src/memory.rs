use std::collections::HashMap;

/// Unbounded two-dimensional memory of byte counters.
///
/// Cells are only materialized when written; every other cell reads as 0.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    cells: HashMap<(i64, i64), u8>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: i64, y: i64) -> u8 {
        self.cells.get(&(x, y)).copied().unwrap_or(0)
    }

    /// Add one, saturating at 255.
    pub fn increment(&mut self, x: i64, y: i64) {
        let cell = self.cells.entry((x, y)).or_insert(0);
        *cell = cell.saturating_add(1);
    }

    /// Subtract one, saturating at 0.
    pub fn decrement(&mut self, x: i64, y: i64) {
        let cell = self.cells.entry((x, y)).or_insert(0);
        *cell = cell.saturating_sub(1);
    }

    pub fn set(&mut self, x: i64, y: i64, value: u8) {
        self.cells.insert((x, y), value);
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
