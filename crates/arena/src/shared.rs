//! Mutex-guarded arena for regions with more than one allocating owner.

use parking_lot::Mutex;
use tracing::debug;

use crate::arena::{Arena, ArenaSlice, ArenaStats, ArenaStr};
use crate::DEFAULT_BLOCK_SIZE;

/// An [`Arena`] behind a lock.
///
/// Unlike the exclusive arena, `destroy` takes `&self`: the blocks are
/// released in place and the arena stays addressable as an empty shell,
/// so owners that still hold an `Arc<SharedArena>` observe `None` from
/// every later read or allocation instead of dangling.
#[derive(Debug)]
pub struct SharedArena {
    id: u64,
    inner: Mutex<Option<Arena>>,
}

impl SharedArena {
    pub fn create(capacity: usize) -> Option<Self> {
        Self::with_block_size(capacity, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(capacity: usize, block_size: usize) -> Option<Self> {
        Arena::with_block_size(capacity, block_size).map(Self::from)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn alloc(&self, size: usize) -> Option<ArenaSlice> {
        self.inner.lock().as_mut()?.alloc(size)
    }

    pub fn alloc_bytes(&self, bytes: &[u8]) -> Option<ArenaSlice> {
        self.inner.lock().as_mut()?.alloc_bytes(bytes)
    }

    pub fn strdup(&self, text: &str) -> Option<ArenaStr> {
        self.inner.lock().as_mut()?.strdup(text)
    }

    /// Run `f` over the bytes behind `slice` while the lock is held.
    pub fn with_bytes<R>(&self, slice: ArenaSlice, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let guard = self.inner.lock();
        guard.as_ref()?.bytes(slice).map(f)
    }

    /// Overwrite the bytes behind `slice`. `data` must match its length.
    pub fn write(&self, slice: ArenaSlice, data: &[u8]) -> bool {
        let mut guard = self.inner.lock();
        match guard.as_mut().and_then(|a| a.bytes_mut(slice)) {
            Some(dst) if dst.len() == data.len() => {
                dst.copy_from_slice(data);
                true
            }
            _ => false,
        }
    }

    pub fn with_str<R>(&self, text: ArenaStr, f: impl FnOnce(&str) -> R) -> Option<R> {
        let guard = self.inner.lock();
        guard.as_ref()?.get_str(text).map(f)
    }

    /// Copy a string out of the arena.
    pub fn get_string(&self, text: ArenaStr) -> Option<String> {
        self.with_str(text, str::to_owned)
    }

    pub fn reset(&self) {
        if let Some(arena) = self.inner.lock().as_mut() {
            arena.reset();
        }
    }

    /// Zeroed stats once destroyed.
    pub fn stats(&self) -> ArenaStats {
        self.inner
            .lock()
            .as_ref()
            .map(Arena::stats)
            .unwrap_or_default()
    }

    /// Release every block. Idempotent.
    pub fn destroy(&self) {
        let taken = self.inner.lock().take();
        match taken {
            Some(arena) => arena.destroy(),
            None => debug!(arena = self.id, "Shared arena already destroyed"),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().is_none()
    }
}

impl From<Arena> for SharedArena {
    fn from(arena: Arena) -> Self {
        Self {
            id: arena.id(),
            inner: Mutex::new(Some(arena)),
        }
    }
}
