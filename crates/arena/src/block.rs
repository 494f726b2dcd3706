//! A single fixed-capacity memory block in the arena chain.

/// One heap block. `data.len()` is the block capacity and never changes
/// after creation; `used` is the bump offset.
#[derive(Debug)]
pub(crate) struct Block {
    data: Vec<u8>,
    used: usize,
}

impl Block {
    /// Allocate a zeroed block, or `None` if the host refuses the memory.
    pub(crate) fn new(capacity: usize) -> Option<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity).ok()?;
        data.resize(capacity, 0);
        Some(Self { data, used: 0 })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    pub(crate) fn room(&self) -> usize {
        self.data.len() - self.used
    }

    /// Bump `aligned` bytes off the block. `aligned` must already be a
    /// multiple of the arena alignment so `used` stays aligned.
    pub(crate) fn bump(&mut self, aligned: usize) -> Option<usize> {
        if aligned > self.room() {
            return None;
        }
        let offset = self.used;
        self.used += aligned;
        Some(offset)
    }

    pub(crate) fn clear(&mut self) {
        self.used = 0;
    }

    pub(crate) fn slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.used {
            return None;
        }
        self.data.get(offset..end)
    }

    pub(crate) fn slice_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        if end > self.used {
            return None;
        }
        self.data.get_mut(offset..end)
    }
}
