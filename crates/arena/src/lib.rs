//! # ferroact Arena
//!
//! A region allocator over a chain of heap blocks. Every long-lived byte a
//! [`Session`](https://docs.rs/ferroact-agent) carves out (tool names,
//! descriptions, schemas, registry headers) lives in one of these and is
//! released all at once when the arena is destroyed.
//!
//! ## Handles instead of pointers
//!
//! `alloc` returns a small `Copy` handle ([`ArenaSlice`] / [`ArenaStr`])
//! rather than a raw pointer. A handle remembers which arena produced it and
//! the arena's reset epoch, so reading through a handle after `reset` or
//! `destroy`, or through a handle from a different arena, yields `None`
//! instead of aliasing reused memory.
//!
//! ## Two sharing disciplines
//!
//! - [`Arena`]: exclusive, `&mut self` allocation, single owner.
//! - [`SharedArena`]: the same operations behind a mutex, `Send + Sync`,
//!   for the case where several owners allocate from one region.

mod arena;
mod block;
mod shared;

pub use arena::{Arena, ArenaSlice, ArenaStats, ArenaStr};
pub use shared::SharedArena;

/// Every allocation offset and size is rounded to this many bytes.
pub const ALIGNMENT: usize = 8;

/// Smallest capacity an arena (or any of its blocks) is created with.
pub const MIN_CAPACITY: usize = 1024;

/// Capacity of blocks appended when the current chain runs out of room.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Round `size` up to the next multiple of [`ALIGNMENT`].
///
/// Returns `None` on overflow.
pub fn align_up(size: usize) -> Option<usize> {
    size.checked_add(ALIGNMENT - 1).map(|s| s & !(ALIGNMENT - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_eight() {
        assert_eq!(align_up(0), Some(0));
        assert_eq!(align_up(1), Some(8));
        assert_eq!(align_up(8), Some(8));
        assert_eq!(align_up(9), Some(16));
        assert_eq!(align_up(usize::MAX), None);
    }
}
