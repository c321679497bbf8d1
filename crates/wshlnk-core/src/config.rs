//! Centralized configuration for wshlnk.
//!
//! Names of the automation objects and methods, and the values substituted for
//! empty properties when a shortcut is written.

/// Shell automation service configuration.
pub struct AutomationConfig;

impl AutomationConfig {
    pub const SHELL_PROG_ID: &'static str = "WScript.Shell";
    pub const CREATE_SHORTCUT_METHOD: &'static str = "CreateShortcut";
    pub const SAVE_METHOD: &'static str = "Save";
    /// LOCALE_USER_DEFAULT
    pub const LCID: u32 = 0x0400;
}

/// Default values for shortcut properties.
pub struct ShortcutDefaults;

impl ShortcutDefaults {
    pub const ICON_LOCATION: &'static str = "%SystemRoot%\\System32\\SHELL32.dll,0";
    pub const WINDOW_STYLE: &'static str = "1";
    pub const LINK_EXTENSION: &'static str = "lnk";
}
