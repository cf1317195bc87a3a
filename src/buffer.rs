use core::ffi::CStr;
use core::fmt;

use crate::diag::{debug, trace};
use crate::error::StrbError;
use crate::pool::PoolSlot;
use crate::storage::{Ownership, Storage};
use crate::{StrbSize, MAX_SIZE};
#[cfg(feature = "alloc")]
use crate::{edit::bounded_len, render, DEFAULT_SIZE};

/// How writes treat the bytes after the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Writes shift trailing content up to make room
    #[default]
    Insert,
    /// Writes replace content in place
    Overwrite,
}

impl TryFrom<i32> for Mode {
    type Error = StrbError;

    fn try_from(value: i32) -> Result<Self, StrbError> {
        match value {
            0 => Ok(Mode::Insert),
            1 => Ok(Mode::Overwrite),
            _ => Err(StrbError::InvalidMode { value }),
        }
    }
}

/// What `undo` needs to take back the last byte of the last put.
#[derive(Debug, Clone, Copy)]
struct Undo {
    /// Byte the put replaced, as seen by a byte-at-a-time writer
    byte: u8,
    /// Length before the last byte was written
    len: StrbSize,
}

/// A byte a direct writer may clobber, with the offset to put it back at.
#[derive(Debug, Clone, Copy)]
struct Patch {
    offset: StrbSize,
    byte: u8,
}

/// State saved before an append that may have to be taken back.
pub(crate) struct Checkpoint {
    len: StrbSize,
    pos: StrbSize,
    first: u8,
    undo: Option<Undo>,
    pending: Option<Patch>,
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(value: usize) -> StrbSize {
    debug_assert!(value <= MAX_SIZE);
    value as StrbSize
}

fn terminated_len(bytes: &[u8]) -> Result<usize, StrbError> {
    if bytes.is_empty() {
        return Err(StrbError::ZeroSizeBuffer);
    }
    let size = bytes.len().min(MAX_SIZE);
    bytes[..size]
        .iter()
        .position(|&b| b == 0)
        .ok_or(StrbError::MissingTerminator { size })
}

/// A growable, cursor-addressed byte string whose content is always followed
/// by a zero terminator.
///
/// Failing operations leave the buffer as it was and set a sticky error flag,
/// see [`StrBuf::has_error`].
pub struct StrBuf<'a> {
    storage: Storage<'a>,
    size: StrbSize,
    len: StrbSize,
    pos: StrbSize,
    mode: Mode,
    undo: Option<Undo>,
    pending: Option<Patch>,
    error: bool,
}

impl<'a> StrBuf<'a> {
    fn init(storage: Storage<'a>, len: usize) -> Self {
        let size = storage.bytes().len().min(MAX_SIZE);
        debug!(ownership = ?storage.ownership(), size, len, "buffer created");
        Self {
            storage,
            size: narrow(size),
            len: narrow(len),
            pos: narrow(len),
            mode: Mode::Insert,
            undo: None,
            pending: None,
            error: false,
        }
    }

    /// Creates an empty buffer over a caller-supplied array.
    ///
    /// At most [`MAX_SIZE`] bytes of the array are used.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::ZeroSizeBuffer` if `array` is empty.
    pub fn from_array(array: &'a mut [u8]) -> Result<Self, StrbError> {
        let Some(first) = array.first_mut() else {
            return Err(StrbError::ZeroSizeBuffer);
        };
        *first = 0;
        Ok(Self::init(Storage::Borrowed(array), 0))
    }

    /// Creates a buffer over a caller-supplied array that already holds
    /// zero-terminated content. The cursor is placed at the end.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::ZeroSizeBuffer` if `array` is empty, or
    /// `StrbError::MissingTerminator` if no zero byte is found within the
    /// usable part of the array.
    pub fn adopt_array(array: &'a mut [u8]) -> Result<Self, StrbError> {
        let len = terminated_len(array)?;
        Ok(Self::init(Storage::Borrowed(array), len))
    }

    /// Creates an empty buffer over a pool slot the caller keeps ownership of.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::ZeroSizeBuffer` for a zero-size slot.
    pub fn on_slot(slot: &'a mut PoolSlot<'_>) -> Result<Self, StrbError> {
        let bytes = slot.as_mut_slice();
        let Some(first) = bytes.first_mut() else {
            return Err(StrbError::ZeroSizeBuffer);
        };
        *first = 0;
        Ok(Self::init(Storage::Lent(bytes), 0))
    }

    /// Creates an empty buffer that owns `slot` and gives it back to its pool
    /// when released.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::ZeroSizeBuffer` for a zero-size slot.
    pub fn from_slot(mut slot: PoolSlot<'a>) -> Result<Self, StrbError> {
        let Some(first) = slot.first_mut() else {
            return Err(StrbError::ZeroSizeBuffer);
        };
        *first = 0;
        Ok(Self::init(Storage::Slot(slot), 0))
    }

    /// Releases the buffer. Owned storage is freed or returned to its pool;
    /// borrowed storage is left to the caller.
    pub fn release(self) {
        debug!(ownership = ?self.ownership(), "buffer released");
    }

    /// Content length, terminator excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Whether the content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Addressable bytes, terminator slot included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::from(self.size)
    }

    /// Kind of storage behind the buffer.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        self.storage.ownership()
    }

    /// Content bytes, without the terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.bytes()[..self.len()]
    }

    /// Content bytes followed by the terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.storage.bytes()[..=self.len()]
    }

    /// Content up to the first zero byte. Shorter than [`StrBuf::as_bytes`]
    /// after a [`StrBuf::split`], or when a gap was zero-filled.
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.as_bytes_with_nul()).unwrap_or_default()
    }

    /// Switches between insert and overwrite. Disarms [`StrBuf::undo`].
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.undo = None;
    }

    /// Current editing mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Moves the cursor. Positions past the end are allowed; the next write
    /// zero-fills the gap.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::InvalidPosition` if `pos` can never be written at:
    /// at or beyond the capacity of fixed storage, or at or beyond
    /// [`MAX_SIZE`] for growable storage.
    pub fn seek(&mut self, pos: usize) -> Result<(), StrbError> {
        let limit = if self.storage.can_grow() {
            MAX_SIZE
        } else {
            self.capacity()
        };
        if pos >= limit {
            debug!(pos, limit, "bad seek");
            return Err(self.fail(StrbError::InvalidPosition {
                position: pos,
                limit,
            }));
        }
        self.pos = narrow(pos);
        self.undo = None;
        self.pending = None;
        Ok(())
    }

    /// Cursor position; may be past the end of the content.
    #[must_use]
    pub fn tell(&self) -> usize {
        usize::from(self.pos)
    }

    /// Whether an operation failed since the last [`StrBuf::clear_error`].
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Resets the error flag.
    pub fn clear_error(&mut self) {
        self.error = false;
    }

    pub(crate) fn fail(&mut self, error: StrbError) -> StrbError {
        self.error = true;
        error
    }

    /// Reserves room for `n` bytes at the cursor and returns the offset the
    /// caller may write them at. The byte after them is saved for
    /// [`StrBuf::restore`].
    pub(crate) fn reserve(&mut self, n: usize) -> Result<usize, StrbError> {
        debug_assert!(self.len < self.size);
        let old_len = self.len();
        let old_pos = self.tell();
        let detached = old_pos > old_len;
        let top = if self.mode == Mode::Overwrite || detached {
            old_pos
        } else {
            old_len
        };

        let size = match self.storage.ensure(self.capacity(), top, n) {
            Ok(size) => size,
            Err(error) => return Err(self.fail(error)),
        };
        self.size = narrow(size);

        let bytes = self.storage.bytes_mut();
        let mut len = old_len;
        if detached {
            trace!(from = old_len, to = old_pos, "zero-filling gap");
            bytes[old_len..=old_pos].fill(0);
            len = old_pos;
        }

        let new_pos = old_pos + n;
        let undo = if self.mode == Mode::Insert {
            bytes.copy_within(old_pos..=len, new_pos);
            len += n;
            Undo {
                byte: 0,
                len: narrow(len.saturating_sub(1)),
            }
        } else {
            // As if written one byte at a time, each byte followed by a
            // terminator: the last byte replaces a zero once past the old end.
            let last = new_pos.saturating_sub(1);
            Undo {
                byte: if last >= old_len { 0 } else { bytes[last] },
                len: narrow(len.max(last)),
            }
        };

        if new_pos > len {
            len = new_pos;
            bytes[len] = 0;
        }

        self.pending = Some(Patch {
            offset: narrow(new_pos),
            byte: bytes[new_pos],
        });
        self.undo = (n > 0).then_some(undo);
        self.len = narrow(len);
        self.pos = narrow(new_pos);
        Ok(old_pos)
    }

    /// Reserves `n` bytes at the cursor and returns them plus one more for the
    /// caller to write into directly.
    ///
    /// The extra byte holds the terminator or the first byte of trailing
    /// content. A writer that puts its own terminator there should call
    /// [`StrBuf::restore`] afterwards to re-join the trailing content.
    ///
    /// # Errors
    ///
    /// `StrbError::RangeExhausted`, `StrbError::CapacityExhausted` or
    /// `StrbError::AllocationFailed` if the room cannot be provided. The
    /// buffer is unchanged apart from the error flag.
    pub fn prepare_write(&mut self, n: usize) -> Result<&mut [u8], StrbError> {
        let start = self.reserve(n)?;
        Ok(&mut self.storage.bytes_mut()[start..=start + n])
    }

    /// Reserves `n` bytes at the cursor and lets `render` fill them and the
    /// byte after them. If `render` fails the buffer is left as it was.
    ///
    /// Overwriting existing content renders past the end first and only then
    /// moves the output into place, so it needs room for `n` more bytes after
    /// the content.
    pub(crate) fn render_at_cursor<F>(&mut self, n: usize, render: F) -> Result<(), StrbError>
    where
        F: FnOnce(&mut [u8]) -> Result<(), StrbError>,
    {
        if self.mode == Mode::Overwrite && n > 0 && self.pos < self.len {
            let staged = self.stage(n, render)?;
            self.commit_staged(staged, n);
            return Ok(());
        }

        let checkpoint = self.checkpoint();
        let old_len = self.len();
        let start = self.reserve(n)?;
        let rendered = render(&mut self.storage.bytes_mut()[start..=start + n]);
        self.restore();
        if let Err(error) = rendered {
            debug!(start, n, "render failed, dropping reserved room");
            let len = self.len();
            let bytes = self.storage.bytes_mut();
            if self.mode == Mode::Insert {
                bytes.copy_within(start + n..=len, start);
            }
            bytes[old_len] = 0;
            self.rollback(checkpoint);
            return Err(self.fail(error));
        }
        Ok(())
    }

    /// Replaces the whole content with `n` bytes filled by `render`. If
    /// `render` fails the buffer is left as it was.
    ///
    /// The output is rendered past the current content, so the storage needs
    /// room for both.
    pub(crate) fn replace_rendered<F>(&mut self, n: usize, render: F) -> Result<(), StrbError>
    where
        F: FnOnce(&mut [u8]) -> Result<(), StrbError>,
    {
        let staged = self.stage(n, render)?;
        if n == 0 {
            self.empty();
        } else {
            self.len = 0;
            self.pos = 0;
            self.commit_staged(staged, n);
        }
        Ok(())
    }

    /// Renders `n` bytes into the room after the content and returns the
    /// offset they start at. Length, cursor and terminator are not touched.
    fn stage<F>(&mut self, n: usize, render: F) -> Result<usize, StrbError>
    where
        F: FnOnce(&mut [u8]) -> Result<(), StrbError>,
    {
        let top = self.len();
        let size = match self.storage.ensure(self.capacity(), top, n) {
            Ok(size) => size,
            Err(error) => return Err(self.fail(error)),
        };
        self.size = narrow(size);

        let bytes = self.storage.bytes_mut();
        if let Err(error) = render(&mut bytes[top..=top + n]) {
            bytes[top] = 0;
            debug!(top, n, "render failed while staged");
            return Err(self.fail(error));
        }
        trace!(offset = top, n, "staged rendered bytes");
        Ok(top)
    }

    /// Overwrites `n` bytes at the cursor with the `n` bytes at `staged`.
    fn commit_staged(&mut self, staged: usize, n: usize) {
        debug_assert!(n > 0 && staged >= self.len());
        let old_len = self.len();
        let pos = self.tell();
        let new_pos = pos + n;
        let last = new_pos - 1;
        let len = old_len.max(new_pos);

        let bytes = self.storage.bytes_mut();
        let undo = Undo {
            byte: if last >= old_len { 0 } else { bytes[last] },
            len: narrow(old_len.max(last)),
        };
        bytes.copy_within(staged..staged + n, pos);
        bytes[len] = 0;

        self.len = narrow(len);
        self.pos = narrow(new_pos);
        self.undo = Some(undo);
        self.pending = None;
    }

    /// Puts back the byte saved by the last prepared write, if any.
    pub fn restore(&mut self) {
        if let Some(patch) = self.pending.take() {
            trace!(offset = patch.offset, byte = patch.byte, "restored pending byte");
            self.storage.bytes_mut()[usize::from(patch.offset)] = patch.byte;
        }
    }

    /// Terminates the visible string at the cursor without discarding what
    /// follows; [`StrBuf::restore`] brings it back.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`] with zero bytes, when a detached cursor
    /// cannot be reached.
    pub fn split(&mut self) -> Result<(), StrbError> {
        let start = self.reserve(0)?;
        self.storage.bytes_mut()[start] = 0;
        Ok(())
    }

    /// Deletes the bytes between the cursor and `target` and leaves the
    /// cursor at the lower of the two. Both are clamped to the content.
    ///
    /// In overwrite mode nothing is removed and only the cursor moves.
    /// Pass [`crate::END`] to delete from the cursor to the end.
    pub fn delete_to(&mut self, target: usize) {
        let len = self.len();
        let a = target.min(len);
        let b = self.tell().min(len);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };

        if self.mode == Mode::Insert {
            self.storage.bytes_mut().copy_within(hi..=len, lo);
            self.len = narrow(len - (hi - lo));
        }
        self.pos = narrow(lo);
        self.undo = None;
        self.pending = None;
    }

    /// Takes back the last byte of the last put and returns it.
    ///
    /// In insert mode the byte is removed; in overwrite mode the byte it
    /// replaced comes back. Length and cursor return to what they were
    /// before that byte was written.
    ///
    /// A put that extended the content in overwrite mode is shortened again,
    /// not only stepped back over.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::NothingToUndo` unless the last operation was a
    /// put of at least one byte.
    pub fn undo(&mut self) -> Result<u8, StrbError> {
        let Some(undo) = self.undo.take() else {
            return Err(self.fail(StrbError::NothingToUndo));
        };
        let len = self.len();
        let pos = self.tell();
        debug_assert!(pos > 0 && pos <= len);

        let new_pos = pos - 1;
        let bytes = self.storage.bytes_mut();
        let removed = bytes[new_pos];
        if self.mode == Mode::Insert {
            bytes.copy_within(pos..=len, new_pos);
        } else {
            bytes[new_pos] = undo.byte;
            bytes[usize::from(undo.len)] = 0;
        }
        self.len = undo.len;
        self.pos = narrow(new_pos);
        self.pending = None;
        Ok(removed)
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.len,
            pos: self.pos,
            first: self.storage.bytes()[0],
            undo: self.undo,
            pending: self.pending,
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.storage.bytes_mut()[0] = checkpoint.first;
        self.len = checkpoint.len;
        self.pos = checkpoint.pos;
        self.undo = checkpoint.undo;
        self.pending = checkpoint.pending;
    }

    /// Drops all content and puts the cursor at the start.
    pub(crate) fn empty(&mut self) {
        self.storage.bytes_mut()[0] = 0;
        self.len = 0;
        self.pos = 0;
        self.undo = None;
        self.pending = None;
    }
}

#[cfg(feature = "alloc")]
impl StrBuf<'static> {
    /// Creates an empty heap buffer.
    ///
    /// A hint below [`DEFAULT_SIZE`] or above [`MAX_SIZE`] allocates
    /// [`DEFAULT_SIZE`] bytes. The buffer grows as needed.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::AllocationFailed` if the heap refuses.
    pub fn alloc(size_hint: usize) -> Result<Self, StrbError> {
        let size = if size_hint > MAX_SIZE || size_hint < DEFAULT_SIZE {
            DEFAULT_SIZE
        } else {
            size_hint
        };
        Ok(Self::init(Storage::heap(size)?, 0))
    }

    /// Creates a heap buffer holding `src` up to its first zero byte.
    ///
    /// # Errors
    ///
    /// Returns `StrbError::TooLong` if the content cannot fit [`MAX_SIZE`],
    /// or `StrbError::AllocationFailed`.
    pub fn dup(src: &[u8]) -> Result<Self, StrbError> {
        Self::ndup(src, usize::MAX)
    }

    /// Like [`StrBuf::dup`], reading at most `max` bytes of `src`.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::dup`].
    pub fn ndup(src: &[u8], max: usize) -> Result<Self, StrbError> {
        let len = bounded_len(src, max);
        if len >= MAX_SIZE {
            return Err(StrbError::TooLong {
                len,
                max: MAX_SIZE - 1,
            });
        }
        let mut buf = Self::alloc(len + 1)?;
        buf.put_slice(&src[..len])?;
        Ok(buf)
    }

    /// Creates a heap buffer holding the rendered `args`.
    ///
    /// ```
    /// # use strbuf::StrBuf;
    /// let buf = StrBuf::format_new(format_args!("Hello {}", 99)).unwrap();
    /// assert_eq!(buf.as_bytes(), b"Hello 99");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `StrbError::Format` if rendering fails, `StrbError::TooLong`
    /// if the result cannot fit [`MAX_SIZE`], or
    /// `StrbError::AllocationFailed`.
    pub fn format_new(args: fmt::Arguments<'_>) -> Result<Self, StrbError> {
        let len = render::measure(args)?;
        if len >= MAX_SIZE {
            return Err(StrbError::TooLong {
                len,
                max: MAX_SIZE - 1,
            });
        }
        let mut buf = Self::alloc(len + 1)?;
        buf.put_fmt(args)?;
        Ok(buf)
    }
}

impl AsRef<[u8]> for StrBuf<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for StrBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StrBuf {{ ownership: {:?}, len: {}, pos: {}, size: {}, mode: {:?}, error: {}, content: {:?} }}",
            self.ownership(),
            self.len,
            self.pos,
            self.size,
            self.mode,
            self.error,
            self.as_bytes()
        )
    }
}
