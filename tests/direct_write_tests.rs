use strbuf::{Mode, StrBuf, StrbError};

#[test]
fn test_prepare_write_region_size() {
    let mut array = [0u8; 16];
    let mut buf = StrBuf::from_array(&mut array).unwrap();

    let region = buf.prepare_write(4).unwrap();
    assert_eq!(region.len(), 5);
    assert_eq!(region[4], 0);
    region[..4].copy_from_slice(b"abcd");

    assert_eq!(buf.as_bytes(), b"abcd");
    assert_eq!(buf.tell(), 4);
}

#[test]
fn test_restore_rejoins_insert_tail() {
    let mut array = [0u8; 32];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("hello").unwrap();
    buf.seek(2).unwrap();

    let region = buf.prepare_write(2).unwrap();
    assert_eq!(region[2], b'l');
    region.copy_from_slice(b"XY\0");
    assert_eq!(buf.as_c_str().to_bytes(), b"heXY");
    assert_eq!(buf.len(), 7);

    buf.restore();
    assert_eq!(buf.as_bytes(), b"heXYllo");
    assert_eq!(buf.as_c_str().to_bytes(), b"heXYllo");
    assert_eq!(buf.len(), 7);
    assert_eq!(buf.tell(), 4);
}

#[test]
fn test_restore_rejoins_overwrite_tail() {
    let mut array = [0u8; 32];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("abcdef").unwrap();
    buf.set_mode(Mode::Overwrite);
    buf.seek(1).unwrap();

    let region = buf.prepare_write(2).unwrap();
    region.copy_from_slice(b"XY\0");
    assert_eq!(buf.as_c_str().to_bytes(), b"aXY");

    buf.restore();
    assert_eq!(buf.as_bytes(), b"aXYdef");
    assert_eq!(buf.len(), 6);
}

#[test]
fn test_restore_at_end_keeps_terminator() {
    let mut array = [0u8; 32];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("ab").unwrap();

    let region = buf.prepare_write(3).unwrap();
    region.copy_from_slice(b"cd\0\0");
    buf.restore();

    assert_eq!(buf.as_bytes_with_nul(), b"abcd\0\0");
    assert_eq!(buf.len(), 5);
}

#[test]
fn test_restore_is_one_shot() {
    let mut array = [0u8; 32];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("abc").unwrap();
    buf.seek(1).unwrap();

    let region = buf.prepare_write(0).unwrap();
    region[0] = 0;
    buf.restore();
    assert_eq!(buf.as_bytes(), b"abc");

    buf.split().unwrap();
    buf.seek(1).unwrap();
    buf.restore();
    assert_eq!(buf.as_c_str().to_bytes(), b"a");
}

#[test]
fn test_restore_without_write_is_noop() {
    let mut array = [0u8; 8];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("abc").unwrap();
    buf.restore();
    buf.restore();
    assert_eq!(buf.as_bytes_with_nul(), b"abc\0");
}

#[test]
fn test_split_and_restore() {
    let mut array = [0u8; 32];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("hello world").unwrap();
    buf.seek(5).unwrap();

    buf.split().unwrap();
    assert_eq!(buf.as_c_str().to_bytes(), b"hello");
    assert_eq!(buf.len(), 11);
    assert_eq!(buf.tell(), 5);
    assert_eq!(buf.undo(), Err(StrbError::NothingToUndo));

    buf.restore();
    assert_eq!(buf.as_c_str().to_bytes(), b"hello world");
}

#[test]
fn test_split_with_detached_cursor_closes_gap() {
    let mut array = [0xffu8; 16];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("ab").unwrap();
    buf.seek(4).unwrap();

    buf.split().unwrap();
    assert_eq!(buf.len(), 4);
    assert_eq!(buf.as_bytes_with_nul(), b"ab\0\0\0");
}

#[test]
fn test_prepare_write_failure() {
    let mut array = [0u8; 6];
    let mut buf = StrBuf::from_array(&mut array).unwrap();
    buf.put_str("abc").unwrap();

    assert_eq!(
        buf.prepare_write(3).unwrap_err(),
        StrbError::CapacityExhausted {
            requested: 4,
            available: 3
        }
    );
    assert!(buf.has_error());
    assert_eq!(buf.as_bytes_with_nul(), b"abc\0");
    assert_eq!(buf.tell(), 3);

    buf.clear_error();
    assert!(buf.prepare_write(2).is_ok());
    assert!(!buf.has_error());
}
