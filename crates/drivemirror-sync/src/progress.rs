//! Byte-based transfer progress

use drivemirror_core::domain::SizeUnit;

/// Share of the total always shown as done, so a bar never looks stuck at zero
const MIN_DISPLAY_FRACTION: f64 = 0.05;

/// Progress of the uploads of one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    total_bytes: u64,
    transferred_bytes: u64,
    unit: SizeUnit,
}

impl TransferProgress {
    /// Start tracking `total_bytes`, displayed in the unit that fits the total
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            transferred_bytes: 0,
            unit: SizeUnit::for_size(total_bytes),
        }
    }

    /// Account for `bytes` more transferred
    pub fn record(&mut self, bytes: u64) {
        self.transferred_bytes = self
            .transferred_bytes
            .saturating_add(bytes)
            .min(self.total_bytes);
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// Bytes to show as done: the real count, but never under 5% of the total
    pub fn display_bytes(&self) -> u64 {
        let floor = (MIN_DISPLAY_FRACTION * self.total_bytes as f64) as u64;
        self.transferred_bytes.max(floor)
    }

    /// Completion ratio in `0.0..=1.0` based on [`Self::display_bytes`]
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        self.display_bytes() as f64 / self.total_bytes as f64
    }

    pub fn is_complete(&self) -> bool {
        self.transferred_bytes >= self.total_bytes
    }

    /// `"<done> / <total> <unit>"` with two decimals
    pub fn summary(&self) -> String {
        format!(
            "{:.2} / {:.2} {}",
            self.unit.convert(self.transferred_bytes),
            self.unit.convert(self.total_bytes),
            self.unit
        )
    }
}
