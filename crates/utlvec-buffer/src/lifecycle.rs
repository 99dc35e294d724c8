//! Element construction and destruction hooks.
//!
//! Elements are opaque fixed-size byte blobs, so the default policy is a
//! byte copy on construction and nothing on destruction. The engine calls
//! the hooks at the points a typed vector would run constructors and
//! destructors, which leaves room for element kinds that own resources.
//! Relocation (growth, shifting) is always a bitwise move.

/// Construct/destruct hooks invoked by the engine.
pub trait ElementLifecycle {
    /// Initialise a freshly claimed slot.
    ///
    /// `dest` is exactly one element wide. `src`, when present, has the
    /// same length.
    fn construct(&self, dest: &mut [u8], src: Option<&[u8]>);

    /// Tear down a live element before its slot is reused or released.
    fn destruct(&self, _elem: &mut [u8]) {}
}

/// Plain-old-data policy: copy or zero-fill, no-op destruct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PodLifecycle;

impl ElementLifecycle for PodLifecycle {
    fn construct(&self, dest: &mut [u8], src: Option<&[u8]>) {
        match src {
            Some(src) => dest.copy_from_slice(src),
            None => dest.fill(0),
        }
    }
}
