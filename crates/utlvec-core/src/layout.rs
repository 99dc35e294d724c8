//! Byte-exact description of the foreign vector header.
//!
//! The header is never overlaid with a Rust struct. Instead every field is
//! described by a [`FieldSpec`] (byte offset + width) and the engine reads
//! and writes at `header_address + offset`. The offsets depend on the
//! target's pointer width and on whether the platform variant carries the
//! cached element pointer, so a [`HeaderLayout`] is passed in as
//! configuration rather than hard-coded.
//!
//! ```text
//! offset (64-bit)   field
//! 0                 base pointer          ┐
//! 8                 allocation count      │ memory block
//! 12                grow size hint        ┘
//! 16                element count
//! 24                cached base pointer   (optional)
//! ```

use std::fmt;
use std::mem;

use crate::error::LayoutError;

/// Width in bytes of the header's integer fields (a C `int`).
pub const INT_WIDTH: usize = 4;

/// Location of one header field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// Byte offset from the start of the header.
    pub offset: usize,
    /// Width of the field in bytes.
    pub width: usize,
}

impl FieldSpec {
    /// Create a field spec.
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    /// One past the last byte of the field, saturating at `usize::MAX`.
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.width)
    }

    /// Whether two fields share at least one byte.
    pub fn overlaps(&self, other: &FieldSpec) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Names of the header fields, used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderField {
    /// Pointer to the backing store.
    Base,
    /// Number of elements the backing store can hold.
    AllocationCount,
    /// Growth granularity hint (0 = doubling).
    GrowSize,
    /// Number of live elements.
    ElementCount,
    /// Legacy mirror of the base pointer.
    CachedBase,
}

impl HeaderField {
    /// Whether the field holds a pointer (as opposed to an `int`).
    pub fn is_pointer(self) -> bool {
        matches!(self, Self::Base | Self::CachedBase)
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Base => "base",
            Self::AllocationCount => "allocation_count",
            Self::GrowSize => "grow_size",
            Self::ElementCount => "element_count",
            Self::CachedBase => "cached_base",
        };
        f.write_str(name)
    }
}

/// Field offsets and sizes of the foreign vector header.
///
/// Use [`HeaderLayout::native`] for the host platform, or
/// [`HeaderLayout::for_pointer_width`] to describe another target.
/// Hand-built layouts must pass [`validate`](HeaderLayout::validate)
/// before the engine will accept them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeaderLayout {
    /// Width of the pointer fields in bytes.
    pub pointer_width: usize,
    /// Backing store pointer.
    pub base: FieldSpec,
    /// Allocation count (`int`).
    pub allocation_count: FieldSpec,
    /// Grow size hint (`int`).
    pub grow_size: FieldSpec,
    /// Element count (`int`).
    pub element_count: FieldSpec,
    /// Cached base pointer; `None` on the platform variant without it.
    pub cached_base: Option<FieldSpec>,
    /// Total size of the header in bytes, including tail padding.
    pub size: usize,
}

const fn align_up(value: usize, align: usize) -> usize {
    if align == 0 {
        return value;
    }
    value.div_ceil(align) * align
}

impl HeaderLayout {
    /// C layout of the header for a target with the given pointer width.
    ///
    /// Fields follow C struct rules: the memory block (`pointer, int, int`)
    /// comes first, then the element count, then the optional cached
    /// pointer aligned to the pointer width.
    pub const fn for_pointer_width(pointer_width: usize, cached: bool) -> Self {
        let p = pointer_width;
        let base = FieldSpec::new(0, p);
        let allocation_count = FieldSpec::new(p, INT_WIDTH);
        let grow_size = FieldSpec::new(p + INT_WIDTH, INT_WIDTH);
        let element_count = FieldSpec::new(p + 2 * INT_WIDTH, INT_WIDTH);
        let after_count = element_count.end();
        let (cached_base, end) = if cached {
            let offset = align_up(after_count, p);
            (Some(FieldSpec::new(offset, p)), offset + p)
        } else {
            (None, after_count)
        };
        Self {
            pointer_width: p,
            base,
            allocation_count,
            grow_size,
            element_count,
            cached_base,
            size: align_up(end, p),
        }
    }

    /// Layout for the host platform, with the cached base pointer.
    pub const fn native() -> Self {
        Self::for_pointer_width(mem::size_of::<*mut u8>(), true)
    }

    /// Layout for the host platform without the cached base pointer.
    pub const fn native_uncached() -> Self {
        Self::for_pointer_width(mem::size_of::<*mut u8>(), false)
    }

    /// Whether this layout carries the cached base pointer.
    pub fn has_cached_base(&self) -> bool {
        self.cached_base.is_some()
    }

    /// Iterate over every present field.
    pub fn fields(&self) -> impl Iterator<Item = (HeaderField, FieldSpec)> {
        [
            (HeaderField::Base, self.base),
            (HeaderField::AllocationCount, self.allocation_count),
            (HeaderField::GrowSize, self.grow_size),
            (HeaderField::ElementCount, self.element_count),
        ]
        .into_iter()
        .chain(self.cached_base.map(|spec| (HeaderField::CachedBase, spec)))
    }

    /// Check that the layout can be used on this host.
    ///
    /// The engine reads pointer fields as host pointers, so the pointer
    /// width must match the host. `size` may not exceed `isize::MAX`.
    /// Every field must be naturally aligned, fit inside `size`, and not
    /// overlap any other field.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let host = mem::size_of::<*mut u8>();
        if self.pointer_width != host {
            return Err(LayoutError::PointerWidthMismatch {
                host,
                layout: self.pointer_width,
            });
        }
        let max = isize::MAX.unsigned_abs();
        if self.size > max {
            return Err(LayoutError::HeaderTooLarge {
                size: self.size,
                max,
            });
        }

        let fields: Vec<_> = self.fields().collect();
        for &(field, spec) in &fields {
            let expected = if field.is_pointer() {
                self.pointer_width
            } else {
                INT_WIDTH
            };
            if spec.width != expected {
                return Err(LayoutError::FieldWidth {
                    field,
                    expected,
                    actual: spec.width,
                });
            }
            if spec.offset % spec.width != 0 {
                return Err(LayoutError::Misaligned {
                    field,
                    offset: spec.offset,
                    align: spec.width,
                });
            }
            if spec.end() > self.size {
                return Err(LayoutError::OutOfBounds {
                    field,
                    end: spec.end(),
                    size: self.size,
                });
            }
        }

        for (i, &(first, a)) in fields.iter().enumerate() {
            for &(second, b) in &fields[i + 1..] {
                if a.overlaps(&b) {
                    return Err(LayoutError::Overlap { first, second });
                }
            }
        }
        Ok(())
    }
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self::native()
    }
}
