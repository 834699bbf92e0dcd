use crate::config::{CellWidth, InterpreterConfig};
use crate::error::BfError;

/// Growable memory tape of fixed-width unsigned cells.
///
/// The tape never shrinks. It grows in batches of `growth` cells, and only
/// when the pointer lands exactly on the current end.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u64>,
    width: CellWidth,
    limit: Option<usize>,
    growth: usize,
    wrap_around: bool,
}

impl Tape {
    /// Build a zeroed tape from an already validated configuration.
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            cells: vec![0; config.initial_size],
            width: config.cell_width,
            limit: config.size_limit,
            growth: config.growth,
            wrap_around: config.wrap_around,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u64] {
        &self.cells
    }

    /// Largest value a cell can hold.
    pub fn max_value(&self) -> u64 {
        self.width.max_value()
    }

    pub fn read(&self, index: usize) -> u64 {
        self.cells[index]
    }

    /// Store `value`, reduced modulo 2^width when wrap-around is on and
    /// clamped to the cell range when it is off.
    pub fn write(&mut self, index: usize, value: i128) {
        let max = self.max_value();
        let stored = if self.wrap_around {
            value.rem_euclid(self.width.value_space() as i128) as u64
        } else {
            value.clamp(0, max as i128) as u64
        };
        self.cells[index] = stored;
    }

    /// Add `delta` to a cell under the same overflow rules as [`Tape::write`].
    pub fn add(&mut self, index: usize, delta: i128) -> u64 {
        self.write(index, self.cells[index] as i128 + delta);
        self.cells[index]
    }

    /// Grow the tape if `index` sits exactly on its end.
    ///
    /// With a limit configured, the final increment is clipped to the limit;
    /// landing on the limit itself is a [`BfError::CapacityExceeded`].
    pub fn ensure_capacity(&mut self, index: usize) -> Result<(), BfError> {
        if index != self.cells.len() {
            return Ok(());
        }

        let target = match self.limit {
            Some(limit) if index >= limit => {
                return Err(BfError::CapacityExceeded { index, limit });
            }
            Some(limit) => (index + self.growth).min(limit),
            None => index + self.growth,
        };

        log::debug!("Growing tape from {} to {} cells", self.cells.len(), target);
        self.cells.resize(target, 0);
        Ok(())
    }
}
