//! Round trips against the real `WScript.Shell` service.

#![cfg(windows)]

use std::fs;

use tempfile::TempDir;
use wshlnk::config::ShortcutDefaults;
use wshlnk::{AutomationSession, LnkError, SessionState, Shortcut};

#[test]
fn test_write_and_read_real_shortcut() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("demo.txt");
    fs::write(&target, "demo").unwrap();
    let link = temp_dir.path().join("demo.lnk");

    let shortcut = Shortcut::builder()
        .target_path(target.to_string_lossy())
        .description("demo")
        .working_directory(temp_dir.path().to_string_lossy())
        .build();
    wshlnk::write(&link, &shortcut).unwrap();
    assert!(link.exists());

    let read_back = wshlnk::read(&link).unwrap();
    assert_eq!(read_back.target_path, shortcut.target_path);
    assert_eq!(read_back.description, "demo");
    assert_eq!(read_back.working_directory, shortcut.working_directory);
    assert_eq!(read_back.icon_location, ShortcutDefaults::ICON_LOCATION);
    assert_eq!(read_back.window_style, "1");
    assert_eq!(read_back.arguments, "");
    assert_eq!(read_back.hotkey, "");
}

#[test]
fn test_rewrite_reads_back_identically() {
    let temp_dir = TempDir::new().unwrap();
    let link = temp_dir.path().join("twice.lnk");
    let shortcut = Shortcut::builder()
        .target_path(r"C:\Windows\System32\notepad.exe")
        .arguments("readme.txt")
        .window_style(wshlnk::WindowStyle::Maximized)
        .build();

    wshlnk::write(&link, &shortcut).unwrap();
    let first = wshlnk::read(&link).unwrap();
    wshlnk::write(&link, &shortcut).unwrap();
    let second = wshlnk::read(&link).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.window_style, "3");
}

#[test]
fn test_non_link_path_fails_to_open() {
    let temp_dir = TempDir::new().unwrap();
    let err = wshlnk::read(temp_dir.path().join("plain.txt")).unwrap_err();
    assert!(matches!(err, LnkError::ShortcutOpenFailed { .. }));

    // The failed operation released its session.
    let mut session = AutomationSession::open().unwrap();
    assert_eq!(session.state(), SessionState::Open);
    session.close();
}
