//! The exclusive (single-owner) arena.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::block::Block;
use crate::{DEFAULT_BLOCK_SIZE, MIN_CAPACITY, align_up};

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// A checked reference to bytes carved out of an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSlice {
    arena: u64,
    epoch: u64,
    block: usize,
    offset: usize,
    len: usize,
}

impl ArenaSlice {
    /// Requested length in bytes (before alignment padding).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset inside the owning block. Always a multiple of 8.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Index of the owning block in the chain.
    pub fn block(&self) -> usize {
        self.block
    }
}

/// A checked reference to a UTF-8 string copied into an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaStr(ArenaSlice);

impl ArenaStr {
    pub fn len(&self) -> usize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }
}

/// Informational snapshot of an arena's footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Sum of every block's capacity.
    pub total_capacity: usize,
    /// Sum of every block's bump offset (aligned bytes handed out).
    pub total_used: usize,
    pub block_count: usize,
    pub largest_block: usize,
    /// Number of resets performed so far.
    pub epoch: u64,
}

/// Bump allocator over a singly-growing chain of blocks.
///
/// Not thread-safe; see [`SharedArena`](crate::SharedArena) for the
/// mutex-guarded variant.
#[derive(Debug)]
pub struct Arena {
    id: u64,
    blocks: Vec<Block>,
    current: usize,
    block_size: usize,
    epoch: u64,
}

impl Arena {
    /// Create an arena whose first block holds at least `capacity` bytes.
    ///
    /// Returns `None` if the host cannot provide the first block.
    pub fn create(capacity: usize) -> Option<Self> {
        Self::with_block_size(capacity, DEFAULT_BLOCK_SIZE)
    }

    /// Like [`create`](Self::create) with a custom size for appended blocks.
    pub fn with_block_size(capacity: usize, block_size: usize) -> Option<Self> {
        let capacity = capacity.max(MIN_CAPACITY);
        let first = Block::new(capacity)?;
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        debug!(arena = id, capacity, "Arena created");
        Some(Self {
            id,
            blocks: vec![first],
            current: 0,
            block_size: block_size.max(MIN_CAPACITY),
            epoch: 0,
        })
    }

    /// Unique id of this arena; handles carry it.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reserve `size` bytes (rounded up to 8).
    ///
    /// Tries the current block, then the first existing block with room,
    /// then appends a block of `max(block_size, size)`. `None` means the
    /// host refused memory; the arena is left unchanged in that case.
    pub fn alloc(&mut self, size: usize) -> Option<ArenaSlice> {
        let aligned = align_up(size)?;

        let block = if self.blocks[self.current].room() >= aligned {
            self.current
        } else if let Some(idx) = self.blocks.iter().position(|b| b.room() >= aligned) {
            trace!(arena = self.id, block = idx, "Reusing earlier block");
            idx
        } else {
            let capacity = self.block_size.max(aligned);
            let block = Block::new(capacity)?;
            self.blocks.try_reserve(1).ok()?;
            self.blocks.push(block);
            debug!(
                arena = self.id,
                capacity,
                blocks = self.blocks.len(),
                "Arena grew"
            );
            self.blocks.len() - 1
        };

        self.current = block;
        let offset = self.blocks[block].bump(aligned)?;
        Some(ArenaSlice {
            arena: self.id,
            epoch: self.epoch,
            block,
            offset,
            len: size,
        })
    }

    /// Allocate and copy `bytes` into the arena.
    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> Option<ArenaSlice> {
        let slice = self.alloc(bytes.len())?;
        self.bytes_mut(slice)?.copy_from_slice(bytes);
        Some(slice)
    }

    /// Copy a string into the arena.
    pub fn strdup(&mut self, text: &str) -> Option<ArenaStr> {
        self.alloc_bytes(text.as_bytes()).map(ArenaStr)
    }

    /// Whether `slice` was produced by this arena since the last reset.
    pub fn contains(&self, slice: ArenaSlice) -> bool {
        slice.arena == self.id && slice.epoch == self.epoch && slice.block < self.blocks.len()
    }

    pub fn bytes(&self, slice: ArenaSlice) -> Option<&[u8]> {
        if !self.contains(slice) {
            return None;
        }
        self.blocks[slice.block].slice(slice.offset, slice.len)
    }

    pub fn bytes_mut(&mut self, slice: ArenaSlice) -> Option<&mut [u8]> {
        if !self.contains(slice) {
            return None;
        }
        self.blocks[slice.block].slice_mut(slice.offset, slice.len)
    }

    pub fn get_str(&self, text: ArenaStr) -> Option<&str> {
        self.bytes(text.0).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Mark every block empty without releasing memory.
    ///
    /// Every handle issued before the reset stops resolving.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.clear();
        }
        self.current = 0;
        self.epoch += 1;
        debug!(arena = self.id, epoch = self.epoch, "Arena reset");
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            total_capacity: self.blocks.iter().map(Block::capacity).sum(),
            total_used: self.blocks.iter().map(Block::used).sum(),
            block_count: self.blocks.len(),
            largest_block: self.blocks.iter().map(Block::capacity).max().unwrap_or(0),
            epoch: self.epoch,
        }
    }

    /// Release every block at once.
    pub fn destroy(self) {
        debug!(arena = self.id, blocks = self.blocks.len(), "Arena destroyed");
        drop(self);
    }
}
