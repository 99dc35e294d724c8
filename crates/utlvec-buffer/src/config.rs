//! Buffer configuration parameters.

use utlvec_core::{BufferError, ConfigError, HeaderLayout};

/// What releasing a buffer does with the backing store it allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Free the owned store and reset the header to the empty state
    /// (null base, zero allocation, zero count) so it never dangles.
    #[default]
    FreeOwned,
    /// Leave the store and header untouched. Ownership of the store passes
    /// to the foreign side, which must free it with the same allocator.
    Detach,
}

/// Configuration for a [`RawGrowableBuffer`](crate::RawGrowableBuffer).
///
/// Validated at construction; immutable for the buffer's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferConfig {
    /// Field offsets of the foreign header.
    ///
    /// Default: [`HeaderLayout::native`].
    pub layout: HeaderLayout,

    /// Largest accepted element size in bytes.
    ///
    /// Default: 1 MiB.
    pub max_element_size: usize,

    /// Alignment of every backing store this buffer allocates.
    ///
    /// Default: 16, matching what `malloc` guarantees on common 64-bit
    /// targets. Must be a power of two.
    pub store_align: usize,

    /// Behaviour on release.
    pub release: ReleasePolicy,
}

impl BufferConfig {
    /// Default element size ceiling: 1 MiB.
    pub const DEFAULT_MAX_ELEMENT_SIZE: usize = 1024 * 1024;

    /// Default backing store alignment.
    pub const DEFAULT_STORE_ALIGN: usize = 16;

    /// Create a config for the given header layout with default limits.
    pub fn new(layout: HeaderLayout) -> Self {
        Self {
            layout,
            max_element_size: Self::DEFAULT_MAX_ELEMENT_SIZE,
            store_align: Self::DEFAULT_STORE_ALIGN,
            release: ReleasePolicy::FreeOwned,
        }
    }

    /// Check limits and the header layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_element_size == 0 {
            return Err(ConfigError::ZeroMaxElementSize);
        }
        if !self.store_align.is_power_of_two() {
            return Err(ConfigError::InvalidStoreAlign {
                align: self.store_align,
            });
        }
        self.layout.validate()?;
        Ok(())
    }

    /// Check an element size against `1..=max_element_size`.
    pub fn check_element_size(&self, size: usize) -> Result<(), BufferError> {
        if size == 0 || size > self.max_element_size {
            return Err(BufferError::InvalidElementSize {
                size,
                max: self.max_element_size,
            });
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(HeaderLayout::native())
    }
}
