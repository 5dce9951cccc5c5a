// SPDX-License-Identifier: MPL-2.0
//! Validated diagnostics settings.

/// Event buffer size limits.
pub mod buffer_capacity_bounds {
    /// Smallest buffer kept in memory.
    pub const MIN: usize = 100;
    /// Largest buffer kept in memory.
    pub const MAX: usize = 10_000;
    /// Buffer size used when nothing is configured.
    pub const DEFAULT: usize = 1_000;
}

/// Number of diagnostic events kept in memory, clamped to
/// [`buffer_capacity_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity(usize);

impl BufferCapacity {
    /// Clamps `value` into the supported range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(buffer_capacity_bounds::MIN, buffer_capacity_bounds::MAX))
    }

    /// Returns the number of events.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for BufferCapacity {
    fn default() -> Self {
        Self(buffer_capacity_bounds::DEFAULT)
    }
}
