use mirror_fs::io;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");

    io::write_atomic(&path, b"hello world").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "hello world");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");
    fs::write(&path, "original content that is longer").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "updated");
}

#[test]
fn test_read_text_nonexistent_file() {
    let result = io::read_text(std::path::Path::new("/nonexistent/file.txt"));
    assert!(result.is_err());
}

#[test]
fn test_read_text_optional_absent_is_none() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.txt");

    assert_eq!(io::read_text_optional(&path).unwrap(), None);
}

#[test]
fn test_read_text_optional_present() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("present.txt");
    fs::write(&path, "3.7.12").unwrap();

    assert_eq!(
        io::read_text_optional(&path).unwrap(),
        Some("3.7.12".to_string())
    );
}

#[test]
fn test_remove_file_if_exists() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stale.zip");
    fs::write(&path, "stale").unwrap();

    assert!(io::remove_file_if_exists(&path).unwrap());
    assert!(!path.exists());
    assert!(!io::remove_file_if_exists(&path).unwrap());
}

#[test]
fn test_remove_dir_if_exists() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("3.7.12");
    fs::create_dir_all(dir.join("outgoing")).unwrap();
    fs::write(dir.join("outgoing/a.zip"), "a").unwrap();

    assert!(io::remove_dir_if_exists(&dir).unwrap());
    assert!(!dir.exists());
    assert!(!io::remove_dir_if_exists(&dir).unwrap());
}

#[test]
fn test_link_or_copy_exposes_same_bytes() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("flutter_linux_3.7.12-stable.tar.xz");
    let destination = temp.path().join("outgoing/flutter_linux.tar.xz");
    fs::write(&source, b"archive bytes").unwrap();

    io::link_or_copy(&source, &destination).unwrap();

    assert_eq!(fs::read(&destination).unwrap(), b"archive bytes");
    assert!(source.exists());
}

#[test]
fn test_link_or_copy_replaces_existing_destination() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("new.zip");
    let destination = temp.path().join("staged.zip");
    fs::write(&source, b"new").unwrap();
    fs::write(&destination, b"old").unwrap();

    io::link_or_copy(&source, &destination).unwrap();

    assert_eq!(fs::read(&destination).unwrap(), b"new");
}
