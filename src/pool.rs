//! Fixed arena of equally sized byte slots for allocation-free buffers.

use core::cell::{RefCell, RefMut};
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::buffer::StrBuf;
use crate::diag::debug;
use crate::edit::bounded_len;
use crate::error::StrbError;
use crate::render;

/// Slot count of [`TinyPool`].
pub const TINY_SLOTS: usize = 8;
/// Slot size of [`TinyPool`].
pub const TINY_SLOT_SIZE: usize = 248;

/// Eight slots of 248 bytes: about 2KB of storage and no heap use.
pub type TinyPool = SlotPool<TINY_SLOTS, TINY_SLOT_SIZE>;

/// A fixed-capacity arena of `SLOTS` byte arrays of `SLOT_SIZE` bytes each.
///
/// Slots are handed out lowest index first and come back when their
/// [`PoolSlot`] is dropped. The pool is single-threaded.
pub struct SlotPool<const SLOTS: usize, const SLOT_SIZE: usize> {
    slots: [RefCell<[u8; SLOT_SIZE]>; SLOTS],
    free: RefCell<FreeList<SLOTS>>,
}

/// Free slot indices, kept in descending order so `pop` yields the lowest.
struct FreeList<const N: usize> {
    indices: [usize; N],
    count: usize,
}

impl<const N: usize> FreeList<N> {
    fn full() -> Self {
        Self {
            indices: core::array::from_fn(|i| N - 1 - i),
            count: N,
        }
    }

    fn pop(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        Some(self.indices[self.count])
    }

    fn push(&mut self, index: usize) {
        debug_assert!(self.count < N, "slot released twice");
        debug_assert!(!self.indices[..self.count].contains(&index));
        let at = self.indices[..self.count].partition_point(|&free| free > index);
        self.indices.copy_within(at..self.count, at + 1);
        self.indices[at] = index;
        self.count += 1;
    }
}

trait SlotRelease {
    fn release(&self, index: usize);
}

impl<const SLOTS: usize, const SLOT_SIZE: usize> SlotRelease for SlotPool<SLOTS, SLOT_SIZE> {
    fn release(&self, index: usize) {
        debug!(index, "slot released");
        self.free.borrow_mut().push(index);
    }
}

impl<const SLOTS: usize, const SLOT_SIZE: usize> SlotPool<SLOTS, SLOT_SIZE> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| RefCell::new([0u8; SLOT_SIZE])),
            free: RefCell::new(FreeList::full()),
        }
    }

    /// Total number of slots.
    #[must_use]
    pub fn slots(&self) -> usize {
        SLOTS
    }

    /// Usable bytes per slot, terminator included.
    #[must_use]
    pub fn slot_size(&self) -> usize {
        SLOT_SIZE.min(crate::MAX_SIZE)
    }

    /// Number of slots not currently claimed.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.borrow().count
    }

    /// Claims a free slot.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::PoolExhausted` if every slot is in use.
    pub fn claim(&self) -> Result<PoolSlot<'_>, StrbError> {
        let exhausted = StrbError::PoolExhausted { slots: SLOTS };
        let Some(index) = self.free.borrow_mut().pop() else {
            debug!(slots = SLOTS, "slot pool exhausted");
            return Err(exhausted);
        };
        let Ok(bytes) = self.slots[index].try_borrow_mut() else {
            self.free.borrow_mut().push(index);
            return Err(exhausted);
        };
        debug!(index, "slot claimed");
        Ok(PoolSlot {
            bytes: RefMut::map(bytes, |bytes| bytes.as_mut_slice()),
            index,
            pool: self,
        })
    }

    /// Creates an empty buffer that owns a slot of this pool.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::PoolExhausted` if every slot is in use, or
    /// `StrbError::ZeroSizeBuffer` for a pool of zero-size slots.
    pub fn alloc(&self) -> Result<StrBuf<'_>, StrbError> {
        StrBuf::from_slot(self.claim()?)
    }

    /// Creates a pool-backed buffer holding `src` up to its first zero byte.
    ///
    /// # Errors
    ///
    /// As [`SlotPool::alloc`], plus `StrbError::CapacityExhausted` if the
    /// content does not fit a slot. The slot is returned on failure.
    pub fn dup(&self, src: &[u8]) -> Result<StrBuf<'_>, StrbError> {
        self.ndup(src, usize::MAX)
    }

    /// Like [`SlotPool::dup`], reading at most `max` bytes of `src`.
    ///
    /// # Errors
    ///
    /// As [`SlotPool::dup`].
    pub fn ndup(&self, src: &[u8], max: usize) -> Result<StrBuf<'_>, StrbError> {
        let len = bounded_len(src, max);
        let mut buf = self.alloc()?;
        buf.put_slice(&src[..len])?;
        Ok(buf)
    }

    /// Creates a pool-backed buffer holding the rendered `args`.
    ///
    /// # Errors
    ///
    /// As [`SlotPool::dup`], plus `StrbError::Format` if rendering fails.
    pub fn format(&self, args: fmt::Arguments<'_>) -> Result<StrBuf<'_>, StrbError> {
        let len = render::measure(args)?;
        if len >= self.slot_size() {
            return Err(StrbError::CapacityExhausted {
                requested: len + 1,
                available: self.slot_size(),
            });
        }
        let mut buf = self.alloc()?;
        buf.put_fmt(args)?;
        Ok(buf)
    }
}

impl<const SLOTS: usize, const SLOT_SIZE: usize> Default for SlotPool<SLOTS, SLOT_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SLOTS: usize, const SLOT_SIZE: usize> fmt::Debug for SlotPool<SLOTS, SLOT_SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotPool")
            .field("slots", &SLOTS)
            .field("slot_size", &SLOT_SIZE)
            .field("available", &self.available())
            .finish()
    }
}

/// Exclusive access to one slot of a [`SlotPool`].
pub struct PoolSlot<'p> {
    bytes: RefMut<'p, [u8]>,
    index: usize,
    pool: &'p dyn SlotRelease,
}

impl PoolSlot<'_> {
    /// Index of the slot within its pool.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Deref for PoolSlot<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DerefMut for PoolSlot<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for PoolSlot<'_> {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl fmt::Debug for PoolSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolSlot {{ index: {}, size: {} }}", self.index, self.bytes.len())
    }
}
