//! Two-pass rendering of `fmt::Arguments`: measure, then write into a region
//! of exactly that size.

use core::fmt::{self, Write};

use crate::error::StrbError;

struct Counter {
    len: usize,
}

impl Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.len = self.len.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

/// Writes into a borrowed slice; refuses to overflow it.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let end = self.pos.checked_add(bytes.len()).ok_or(fmt::Error)?;
        let dest = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

/// Number of bytes `args` renders to.
pub(crate) fn measure(args: fmt::Arguments<'_>) -> Result<usize, StrbError> {
    if let Some(s) = args.as_str() {
        return Ok(s.len());
    }
    let mut counter = Counter { len: 0 };
    counter.write_fmt(args).map_err(|_| StrbError::Format)?;
    Ok(counter.len)
}

/// Renders `args` into all but the last byte of `region` and writes a
/// terminator into the last byte.
///
/// A short rendering is zero-padded.
pub(crate) fn render(region: &mut [u8], args: fmt::Arguments<'_>) -> Result<(), StrbError> {
    let Some((terminator, body)) = region.split_last_mut() else {
        return Err(StrbError::Format);
    };
    let mut writer = SliceWriter {
        buf: &mut *body,
        pos: 0,
    };
    writer.write_fmt(args).map_err(|_| StrbError::Format)?;
    let written = writer.pos;
    body[written..].fill(0);
    *terminator = 0;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure() {
        assert_eq!(measure(format_args!("plain")), Ok(5));
        assert_eq!(measure(format_args!("fmt{}x", 4)), Ok(5));
        assert_eq!(measure(format_args!("{:>8}", "ab")), Ok(8));
    }

    #[test]
    fn test_render_terminates() {
        let mut region = [0xffu8; 6];
        render(&mut region, format_args!("R{}D{}", 2, 2)).unwrap();
        assert_eq!(&region, b"R2D2\0\0");

        let mut region = [0xffu8; 5];
        render(&mut region, format_args!("R{}D{}", 2, 2)).unwrap();
        assert_eq!(&region, b"R2D2\0");
    }

    #[test]
    fn test_render_refuses_overflow() {
        let mut region = [0u8; 3];
        assert_eq!(
            render(&mut region, format_args!("{}", 12345)),
            Err(StrbError::Format)
        );
    }
}
