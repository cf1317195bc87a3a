use core::fmt;

use crate::buffer::StrBuf;
use crate::error::StrbError;
use crate::render;

/// Length of `src` up to its first zero byte, reading at most `max` bytes.
pub(crate) fn bounded_len(src: &[u8], max: usize) -> usize {
    let cap = src.len().min(max);
    src[..cap].iter().position(|&b| b == 0).unwrap_or(cap)
}

impl StrBuf<'_> {
    /// Writes one byte at the cursor.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`].
    pub fn put_byte(&mut self, byte: u8) -> Result<(), StrbError> {
        self.put_repeated(byte, 1)
    }

    /// Writes `count` copies of `byte` at the cursor.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`].
    pub fn put_repeated(&mut self, byte: u8, count: usize) -> Result<(), StrbError> {
        let region = self.prepare_write(count)?;
        region[..count].fill(byte);
        Ok(())
    }

    /// Writes all of `src` at the cursor, zero bytes included.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`].
    pub fn put_slice(&mut self, src: &[u8]) -> Result<(), StrbError> {
        let region = self.prepare_write(src.len())?;
        region[..src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Writes `src` up to its first zero byte, reading at most `max` bytes.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`].
    pub fn put_bounded(&mut self, src: &[u8], max: usize) -> Result<(), StrbError> {
        self.put_slice(&src[..bounded_len(src, max)])
    }

    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`].
    pub fn put_str(&mut self, s: &str) -> Result<(), StrbError> {
        self.put_slice(s.as_bytes())
    }

    /// Reserves `count` bytes at the cursor and lets `render` fill them.
    ///
    /// `render` receives `count + 1` bytes and may terminate its output in
    /// the last one; the byte that was there is restored afterwards.
    ///
    /// In overwrite mode with the cursor inside the content, `render` writes
    /// past the end and the output is moved into place once it succeeded.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::prepare_write`], or whatever `render` returns. In both
    /// cases the buffer is left as it was. Overwriting content needs room for
    /// `count` bytes after the content, not only after the cursor.
    pub fn put_with<F>(&mut self, count: usize, render: F) -> Result<(), StrbError>
    where
        F: FnOnce(&mut [u8]) -> Result<(), StrbError>,
    {
        self.render_at_cursor(count, render)
    }

    /// Renders `args` at the cursor.
    ///
    /// ```
    /// # use strbuf::StrBuf;
    /// let mut array = [0u8; 32];
    /// let mut buf = StrBuf::from_array(&mut array).unwrap();
    /// buf.put_byte(b'a').unwrap();
    /// buf.put_fmt(format_args!("fmt{}x", 4)).unwrap();
    /// assert_eq!(buf.as_bytes(), b"afmt4x");
    /// assert_eq!(buf.undo(), Ok(b'x'));
    /// assert_eq!(buf.as_bytes(), b"afmt4");
    /// ```
    ///
    /// # Errors
    ///
    /// `StrbError::Format` if rendering fails, otherwise as
    /// [`StrBuf::put_with`]. The buffer is left as it was either way.
    pub fn put_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), StrbError> {
        let count = render::measure(args).map_err(|error| self.fail(error))?;
        self.put_with(count, |region| render::render(region, args))
    }

    /// Replaces the whole content with `src`.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::put_slice`]; on failure the previous content is kept.
    pub fn replace(&mut self, src: &[u8]) -> Result<(), StrbError> {
        self.replace_with(|buf| buf.put_slice(src))
    }

    /// Replaces the whole content with `src` up to its first zero byte,
    /// reading at most `max` bytes.
    ///
    /// # Errors
    ///
    /// As [`StrBuf::replace`].
    pub fn replace_bounded(&mut self, src: &[u8], max: usize) -> Result<(), StrbError> {
        self.replace_with(|buf| buf.put_bounded(src, max))
    }

    /// Replaces the whole content with the rendered `args`.
    ///
    /// The output is rendered after the current content before it replaces
    /// it, so the previous content survives a formatter that fails.
    ///
    /// # Errors
    ///
    /// `StrbError::Format` if rendering fails, or a capacity error if the
    /// storage cannot hold the previous and the new content together. On
    /// failure the previous content is kept.
    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), StrbError> {
        let count = render::measure(args).map_err(|error| self.fail(error))?;
        self.replace_rendered(count, |region| render::render(region, args))
    }

    fn replace_with<F>(&mut self, put: F) -> Result<(), StrbError>
    where
        F: FnOnce(&mut Self) -> Result<(), StrbError>,
    {
        let checkpoint = self.checkpoint();
        self.empty();
        put(self).inspect_err(|_| self.rollback(checkpoint))
    }
}

impl fmt::Write for StrBuf<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s).map_err(|_| fmt::Error)
    }
}
