use super::*;
use tempfile::TempDir;

#[test]
fn missing_banfile_is_created_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");

    let identifiers = read_banfile(&path).unwrap();

    assert!(identifiers.is_empty());
    assert!(path.is_file());
    assert_eq!(std::fs::read(&path).unwrap().len(), 0);
}

#[test]
fn lines_are_kept_in_order_and_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");
    std::fs::write(&path, "10.0.0.1\n 10.0.0.2\n\n10.0.0.1\nFE80::1 \n").unwrap();

    let identifiers = read_banfile(&path).unwrap();

    assert_eq!(
        identifiers,
        vec!["10.0.0.1", " 10.0.0.2", "", "10.0.0.1", "FE80::1 "]
    );
}

#[test]
fn last_line_without_newline_is_read() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");
    std::fs::write(&path, "127.0.0.1").unwrap();

    assert_eq!(read_banfile(&path).unwrap(), vec!["127.0.0.1"]);
}

#[test]
fn crlf_line_endings_are_stripped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");
    std::fs::write(&path, "192.0.2.1\r\n192.0.2.2\r\n").unwrap();

    assert_eq!(read_banfile(&path).unwrap(), vec!["192.0.2.1", "192.0.2.2"]);
}

#[test]
fn long_lines_are_not_truncated() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");
    let long = "a".repeat(256 * 1024);
    std::fs::write(&path, format!("{}\nb\n", long)).unwrap();

    let identifiers = read_banfile(&path).unwrap();
    assert_eq!(identifiers.len(), 2);
    assert_eq!(identifiers[0].len(), long.len());
}

#[test]
fn uncreatable_banfile_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no-such-dir").join("banned");

    let err = read_banfile(&path).unwrap_err();
    assert!(matches!(err, BanlistError::Io { .. }), "got {:?}", err);
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn directory_banfile_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");
    std::fs::create_dir(&path).unwrap();

    let err = read_banfile(&path).unwrap_err();
    assert!(matches!(err, BanlistError::Parse { .. }), "got {:?}", err);
}

#[test]
fn invalid_utf8_does_not_hide_other_lines() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banned");
    std::fs::write(&path, b"# h\xf6st\n127.0.0.1\n\xff\xfe\r\n10.0.0.1").unwrap();

    let identifiers = read_banfile(&path).unwrap();

    assert_eq!(
        identifiers,
        vec!["# h\u{fffd}st", "127.0.0.1", "\u{fffd}\u{fffd}", "10.0.0.1"]
    );
}
