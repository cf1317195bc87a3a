#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::diag::debug;
use crate::error::StrbError;
use crate::pool::PoolSlot;
use crate::MAX_SIZE;
#[cfg(feature = "alloc")]
use crate::GROW_FACTOR;

/// Who owns the bytes behind a `StrBuf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Caller-supplied array; never freed or grown
    Borrowed,
    /// Pool slot claimed by the caller and lent to the buffer
    BorrowedSlot,
    /// Heap allocation owned by the buffer; grows on demand
    Heap,
    /// Pool slot owned by the buffer; returned to the pool on release
    Slot,
}

pub(crate) enum Storage<'a> {
    Borrowed(&'a mut [u8]),
    Lent(&'a mut [u8]),
    #[cfg(feature = "alloc")]
    Heap(Vec<u8>),
    Slot(PoolSlot<'a>),
}

impl<'a> Storage<'a> {
    #[cfg(feature = "alloc")]
    pub(crate) fn heap(size: usize) -> Result<Self, StrbError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| StrbError::AllocationFailed { requested: size })?;
        bytes.resize(size, 0);
        Ok(Storage::Heap(bytes))
    }

    pub(crate) fn ownership(&self) -> Ownership {
        match self {
            Storage::Borrowed(_) => Ownership::Borrowed,
            Storage::Lent(_) => Ownership::BorrowedSlot,
            #[cfg(feature = "alloc")]
            Storage::Heap(_) => Ownership::Heap,
            Storage::Slot(_) => Ownership::Slot,
        }
    }

    pub(crate) fn can_grow(&self) -> bool {
        self.ownership() == Ownership::Heap
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Storage::Borrowed(bytes) | Storage::Lent(bytes) => &bytes[..],
            #[cfg(feature = "alloc")]
            Storage::Heap(bytes) => &bytes[..],
            Storage::Slot(slot) => &slot[..],
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Storage::Borrowed(bytes) | Storage::Lent(bytes) => &mut bytes[..],
            #[cfg(feature = "alloc")]
            Storage::Heap(bytes) => &mut bytes[..],
            Storage::Slot(slot) => &mut slot[..],
        }
    }

    /// Makes `top + n + 1` bytes addressable and returns the resulting size.
    ///
    /// `size` is the current usable size. On error nothing has changed.
    pub(crate) fn ensure(&mut self, size: usize, top: usize, n: usize) -> Result<usize, StrbError> {
        if n >= MAX_SIZE - top {
            debug!(top, n, "size range exhausted");
            return Err(StrbError::RangeExhausted {
                top,
                requested: n,
                max: MAX_SIZE,
            });
        }

        let room = size.saturating_sub(top);
        if n < room {
            return Ok(size);
        }

        match self {
            #[cfg(feature = "alloc")]
            Storage::Heap(bytes) => grow(bytes, size, top + n + 1),
            _ => {
                debug!(n, room, "fixed storage exhausted");
                Err(StrbError::CapacityExhausted {
                    requested: n + 1,
                    available: room,
                })
            }
        }
    }
}

#[cfg(feature = "alloc")]
fn grow(bytes: &mut Vec<u8>, size: usize, needed: usize) -> Result<usize, StrbError> {
    let mut new_size = if size <= MAX_SIZE / GROW_FACTOR {
        size * GROW_FACTOR
    } else {
        MAX_SIZE
    };
    if new_size < needed {
        new_size = needed;
    }

    bytes
        .try_reserve_exact(new_size - bytes.len())
        .map_err(|_| StrbError::AllocationFailed {
            requested: new_size,
        })?;
    bytes.resize(new_size, 0);
    debug!(from = size, to = new_size, "grew heap storage");
    Ok(new_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrowed_refuses_growth() {
        let mut array = [0u8; 8];
        let mut storage = Storage::Borrowed(&mut array);

        assert_eq!(storage.ensure(8, 0, 7), Ok(8));
        assert_eq!(
            storage.ensure(8, 2, 6),
            Err(StrbError::CapacityExhausted {
                requested: 7,
                available: 6
            })
        );
        assert!(!storage.can_grow());
    }

    #[test]
    fn test_range_checked_before_room() {
        let mut array = [0u8; 8];
        let mut storage = Storage::Borrowed(&mut array);

        assert_eq!(
            storage.ensure(8, 10, MAX_SIZE - 10),
            Err(StrbError::RangeExhausted {
                top: 10,
                requested: MAX_SIZE - 10,
                max: MAX_SIZE
            })
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_heap_doubles() {
        let mut storage = Storage::heap(256).unwrap();
        assert_eq!(storage.ensure(256, 255, 1), Ok(512));
        assert_eq!(storage.bytes().len(), 512);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_heap_grows_to_fit_large_request() {
        let mut storage = Storage::heap(256).unwrap();
        assert_eq!(storage.ensure(256, 100, 1000), Ok(1101));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_heap_saturates_at_max() {
        let mut storage = Storage::heap(40_000).unwrap();
        assert_eq!(storage.ensure(40_000, 39_999, 1), Ok(MAX_SIZE));
        assert_eq!(storage.bytes().len(), MAX_SIZE);
    }
}
