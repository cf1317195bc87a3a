use strbuf::{Mode, StrBuf, END};

fn filled<'a>(array: &'a mut [u8], content: &[u8]) -> StrBuf<'a> {
    let mut buf = StrBuf::from_array(array).unwrap();
    buf.put_slice(content).unwrap();
    buf
}

#[test]
fn test_delete_at_cursor_is_noop() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"DELETEME");

    for pos in [0, 3, 8] {
        buf.seek(pos).unwrap();
        buf.delete_to(buf.tell());
        assert_eq!(buf.as_bytes(), b"DELETEME");
        assert_eq!(buf.tell(), pos);
    }
}

#[test]
fn test_delete_to_end() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"DELETEME");
    buf.seek(6).unwrap();

    buf.delete_to(END);
    assert_eq!(buf.as_bytes(), b"DELETE");
    assert_eq!(buf.len(), 6);
    assert_eq!(buf.tell(), 6);
}

#[test]
fn test_delete_backwards() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"DELETE");

    buf.delete_to(3);
    assert_eq!(buf.as_bytes(), b"DEL");
    assert_eq!(buf.tell(), 3);
    assert_eq!(buf.as_bytes_with_nul(), b"DEL\0");
}

#[test]
fn test_delete_forwards() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"DEL");
    buf.seek(1).unwrap();

    buf.delete_to(2);
    assert_eq!(buf.as_bytes(), b"DL");
    assert_eq!(buf.tell(), 1);
}

#[test]
fn test_delete_everything() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"some content");
    buf.seek(4).unwrap();

    buf.delete_to(0);
    assert_eq!(buf.as_bytes(), b" content");
    buf.delete_to(END);
    assert!(buf.is_empty());
    assert_eq!(buf.as_bytes_with_nul(), b"\0");
}

#[test]
fn test_delete_with_detached_cursor_clamps() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"abcdef");
    buf.seek(20).unwrap();

    buf.delete_to(4);
    assert_eq!(buf.as_bytes(), b"abcd");
    assert_eq!(buf.tell(), 4);
}

#[test]
fn test_delete_in_overwrite_mode_only_moves_cursor() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"abcdef");
    buf.set_mode(Mode::Overwrite);

    buf.delete_to(2);
    assert_eq!(buf.as_bytes(), b"abcdef");
    assert_eq!(buf.len(), 6);
    assert_eq!(buf.tell(), 2);

    buf.put_str("XY").unwrap();
    assert_eq!(buf.as_bytes(), b"abXYef");
}

#[test]
fn test_delete_drops_pending_restore() {
    let mut array = [0u8; 32];
    let mut buf = filled(&mut array, b"hello");
    buf.seek(0).unwrap();
    buf.split().unwrap();
    assert_eq!(buf.as_c_str().to_bytes(), b"");

    buf.delete_to(0);
    buf.restore();
    assert_eq!(buf.as_c_str().to_bytes(), b"");
    assert_eq!(buf.len(), 5);
}
