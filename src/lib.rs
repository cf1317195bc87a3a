#![no_std]

//! `StrBuf`: a cursor-addressed byte string that is always zero-terminated.
//!
//! A `StrBuf` keeps a length, a cursor and an editing mode over one of four
//! kinds of storage, and never lets them disagree: the byte at offset `len()`
//! is always zero and `len()` is always below `capacity()`. Callers never size,
//! terminate or bounds-check the backing array themselves.
//!
//! # Storage
//!
//! - A caller-supplied array ([`StrBuf::from_array`], [`StrBuf::adopt_array`]).
//!   Never grows, never freed.
//! - A slot of a [`SlotPool`], either lent by the caller
//!   ([`StrBuf::on_slot`]) or owned by the buffer ([`StrBuf::from_slot`],
//!   [`SlotPool::alloc`]). No heap use at all.
//! - A heap allocation ([`StrBuf::alloc`], [`StrBuf::dup`],
//!   [`StrBuf::format_new`]) that grows by [`GROW_FACTOR`] on demand.
//!   Requires the `alloc` feature (on by default).
//!
//! Sizes are held in [`StrbSize`], a deliberately narrow type: no buffer is
//! ever larger than [`MAX_SIZE`] bytes, terminator included.
//!
//! # Editing
//!
//! Writes happen at the cursor. In [`Mode::Insert`] trailing content moves up
//! to make room; in [`Mode::Overwrite`] it is replaced in place and the length
//! only grows when writing past the end. A cursor placed past the end is
//! allowed; the next write zero-fills the gap.
//!
//! ```
//! # use strbuf::{Mode, StrBuf};
//! let mut array = [0u8; 100];
//! let mut buf = StrBuf::from_array(&mut array).unwrap();
//!
//! buf.put_str("abcdef").unwrap();
//! buf.set_mode(Mode::Overwrite);
//! buf.seek(3).unwrap();
//! buf.put_str("ZZ").unwrap();
//! assert_eq!(buf.as_bytes(), b"abcZZf");
//!
//! buf.set_mode(Mode::Insert);
//! buf.delete_to(strbuf::END);
//! assert_eq!(buf.as_bytes(), b"abcZZ");
//! ```
//!
//! # Errors
//!
//! Every mutating operation either succeeds or leaves the buffer exactly as it
//! was and sets a sticky error flag. The flag lets a sequence of calls be
//! checked once at the end:
//!
//! ```
//! # use strbuf::StrBuf;
//! let mut array = [0u8; 8];
//! let mut buf = StrBuf::from_array(&mut array).unwrap();
//!
//! let _ = buf.put_str("seven..");
//! let _ = buf.put_str("overflow");
//! let _ = buf.put_byte(b'!');
//!
//! assert!(buf.has_error());
//! assert_eq!(buf.as_bytes(), b"seven..");
//! buf.clear_error();
//! ```
//!
//! # Direct writes
//!
//! [`StrBuf::prepare_write`] hands out room for `n` bytes plus the byte after
//! them, so a writer that terminates its own output can be used as is.
//! [`StrBuf::restore`] then re-joins any content the terminator cut off.
//!
//! ```
//! # use strbuf::StrBuf;
//! let mut array = [0u8; 32];
//! let mut buf = StrBuf::from_array(&mut array).unwrap();
//! buf.put_str("hello").unwrap();
//! buf.seek(2).unwrap();
//!
//! let region = buf.prepare_write(2).unwrap();
//! region.copy_from_slice(b"XY\0");
//! assert_eq!(buf.as_c_str().to_bytes(), b"heXY");
//!
//! buf.restore();
//! assert_eq!(buf.as_bytes(), b"heXYllo");
//! ```

#[cfg(feature = "alloc")]
extern crate alloc;

mod buffer;
mod diag;
mod edit;
mod error;
mod pool;
mod render;
mod storage;

pub use buffer::{Mode, StrBuf};
pub use error::StrbError;
pub use pool::{PoolSlot, SlotPool, TinyPool, TINY_SLOTS, TINY_SLOT_SIZE};
pub use storage::Ownership;

/// Type holding sizes, lengths and positions.
pub type StrbSize = u16;

/// Largest buffer size, terminator included.
pub const MAX_SIZE: usize = StrbSize::MAX as usize;

/// Heap size used when a size hint is too small or too large.
pub const DEFAULT_SIZE: usize = 256;

/// Heap storage is multiplied by this when it runs out.
pub const GROW_FACTOR: usize = 2;

/// Delete target meaning "to the end of the content".
pub const END: usize = usize::MAX;
