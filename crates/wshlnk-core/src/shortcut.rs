//! The shortcut record and its fixed property table.
//!
//! `ShortcutField::ALL` is the single list of properties transferred to and
//! from the automation object. Property names must stay identical to the ones
//! the shell service exposes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ShortcutDefaults;
use crate::error::{LnkError, Result};

/// One of the seven properties of a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutField {
    TargetPath,
    Arguments,
    Description,
    Hotkey,
    IconLocation,
    WindowStyle,
    WorkingDirectory,
}

impl ShortcutField {
    /// Every field, in transfer order.
    pub const ALL: [ShortcutField; 7] = [
        ShortcutField::TargetPath,
        ShortcutField::Arguments,
        ShortcutField::Description,
        ShortcutField::Hotkey,
        ShortcutField::IconLocation,
        ShortcutField::WindowStyle,
        ShortcutField::WorkingDirectory,
    ];

    /// Name of the property on the automation object.
    pub const fn property_name(self) -> &'static str {
        match self {
            ShortcutField::TargetPath => "TargetPath",
            ShortcutField::Arguments => "Arguments",
            ShortcutField::Description => "Description",
            ShortcutField::Hotkey => "Hotkey",
            ShortcutField::IconLocation => "IconLocation",
            ShortcutField::WindowStyle => "WindowStyle",
            ShortcutField::WorkingDirectory => "WorkingDirectory",
        }
    }

    /// Value written in place of an empty field, if the field has one.
    pub const fn default_value(self) -> Option<&'static str> {
        match self {
            ShortcutField::IconLocation => Some(ShortcutDefaults::ICON_LOCATION),
            ShortcutField::WindowStyle => Some(ShortcutDefaults::WINDOW_STYLE),
            _ => None,
        }
    }

    /// Look a field up by its property name (exact match).
    pub fn from_property_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.property_name() == name)
    }
}

impl fmt::Display for ShortcutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property_name())
    }
}

/// A Windows shortcut as a flat record of text properties.
///
/// Every field is always present; an empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Shortcut {
    /// File path or URL the shortcut resolves to.
    pub target_path: String,
    /// Command-line arguments passed to the target.
    pub arguments: String,
    /// Free-text comment.
    pub description: String,
    /// Key combination, e.g. `CTRL+ALT+F`.
    pub hotkey: String,
    /// Icon source path, optionally followed by `,index`.
    pub icon_location: String,
    /// `1` normal, `3` maximized, `7` minimized.
    pub window_style: String,
    /// Directory the target runs in.
    pub working_directory: String,
}

impl Shortcut {
    /// Create a new shortcut builder.
    pub fn builder() -> ShortcutBuilder {
        ShortcutBuilder::new()
    }

    pub fn get(&self, field: ShortcutField) -> &str {
        match field {
            ShortcutField::TargetPath => &self.target_path,
            ShortcutField::Arguments => &self.arguments,
            ShortcutField::Description => &self.description,
            ShortcutField::Hotkey => &self.hotkey,
            ShortcutField::IconLocation => &self.icon_location,
            ShortcutField::WindowStyle => &self.window_style,
            ShortcutField::WorkingDirectory => &self.working_directory,
        }
    }

    pub fn set(&mut self, field: ShortcutField, value: impl Into<String>) {
        let slot = match field {
            ShortcutField::TargetPath => &mut self.target_path,
            ShortcutField::Arguments => &mut self.arguments,
            ShortcutField::Description => &mut self.description,
            ShortcutField::Hotkey => &mut self.hotkey,
            ShortcutField::IconLocation => &mut self.icon_location,
            ShortcutField::WindowStyle => &mut self.window_style,
            ShortcutField::WorkingDirectory => &mut self.working_directory,
        };
        *slot = value.into();
    }

    /// Copy of this record with write defaults substituted for empty fields.
    pub fn with_defaults(&self) -> Shortcut {
        let mut out = self.clone();
        for field in ShortcutField::ALL {
            if let Some(default) = field.default_value() {
                if out.get(field).is_empty() {
                    out.set(field, default);
                }
            }
        }
        out
    }

    /// Iterate `(field, value)` pairs in transfer order.
    pub fn iter(&self) -> impl Iterator<Item = (ShortcutField, &str)> + '_ {
        ShortcutField::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Typed view of `window_style`. `None` when empty or unrecognized.
    pub fn window_style_kind(&self) -> Option<WindowStyle> {
        self.window_style.parse().ok()
    }

    /// Typed view of `icon_location`. `None` when empty.
    pub fn icon(&self) -> Option<IconLocation> {
        if self.icon_location.is_empty() {
            None
        } else {
            Some(IconLocation::parse(&self.icon_location))
        }
    }
}

/// Builder for shortcut records.
pub struct ShortcutBuilder {
    shortcut: Shortcut,
}

impl ShortcutBuilder {
    /// Create a new builder with every field empty.
    pub fn new() -> Self {
        Self {
            shortcut: Shortcut::default(),
        }
    }

    pub fn target_path(mut self, value: impl Into<String>) -> Self {
        self.shortcut.target_path = value.into();
        self
    }

    pub fn arguments(mut self, value: impl Into<String>) -> Self {
        self.shortcut.arguments = value.into();
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.shortcut.description = value.into();
        self
    }

    pub fn hotkey(mut self, value: impl Into<String>) -> Self {
        self.shortcut.hotkey = value.into();
        self
    }

    pub fn icon_location(mut self, value: impl Into<String>) -> Self {
        self.shortcut.icon_location = value.into();
        self
    }

    /// Set the window style from its typed form.
    pub fn window_style(mut self, style: WindowStyle) -> Self {
        self.shortcut.window_style = style.as_str().to_string();
        self
    }

    pub fn working_directory(mut self, value: impl Into<String>) -> Self {
        self.shortcut.working_directory = value.into();
        self
    }

    /// Build the shortcut record.
    pub fn build(self) -> Shortcut {
        self.shortcut
    }
}

impl Default for ShortcutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// How the target's window is shown when launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowStyle {
    Normal = 1,
    Maximized = 3,
    Minimized = 7,
}

impl WindowStyle {
    /// The numeric text stored in the `WindowStyle` property.
    pub const fn as_str(self) -> &'static str {
        match self {
            WindowStyle::Normal => "1",
            WindowStyle::Maximized => "3",
            WindowStyle::Minimized => "7",
        }
    }
}

impl FromStr for WindowStyle {
    type Err = LnkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "normal" => Ok(WindowStyle::Normal),
            "3" | "maximized" => Ok(WindowStyle::Maximized),
            "7" | "minimized" => Ok(WindowStyle::Minimized),
            other => Err(LnkError::InvalidValue {
                field: ShortcutField::WindowStyle,
                message: format!("expected 1, 3, 7, normal, maximized or minimized, got {other:?}"),
            }),
        }
    }
}

impl fmt::Display for WindowStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An icon reference: a resource path plus an icon index within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLocation {
    pub path: String,
    pub index: i32,
}

impl IconLocation {
    pub fn new(path: impl Into<String>, index: i32) -> Self {
        Self {
            path: path.into(),
            index,
        }
    }

    /// Split `path,index` on the last comma.
    ///
    /// A missing or non-numeric suffix keeps the whole text as the path with
    /// index 0, since commas are legal in file names.
    pub fn parse(s: &str) -> Self {
        if let Some((path, index)) = s.rsplit_once(',') {
            if let Ok(index) = index.trim().parse::<i32>() {
                return Self::new(path, index);
            }
        }
        Self::new(s, 0)
    }
}

impl fmt::Display for IconLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.path, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_table_is_complete_and_unique() {
        let names: HashSet<_> = ShortcutField::ALL.iter().map(|f| f.property_name()).collect();
        assert_eq!(names.len(), 7);
        for field in ShortcutField::ALL {
            assert_eq!(ShortcutField::from_property_name(field.property_name()), Some(field));
        }
        assert_eq!(ShortcutField::from_property_name("targetpath"), None);
    }

    #[test]
    fn test_get_set_cover_every_field() {
        let mut shortcut = Shortcut::default();
        for field in ShortcutField::ALL {
            shortcut.set(field, field.property_name());
        }
        for (field, value) in shortcut.iter() {
            assert_eq!(value, field.property_name());
        }
        assert_eq!(shortcut.hotkey, "Hotkey");
    }

    #[test]
    fn test_with_defaults_fills_only_empty_defaulted_fields() {
        let shortcut = Shortcut::builder().target_path(r"C:\Temp\demo.txt").build();
        let filled = shortcut.with_defaults();
        assert_eq!(filled.icon_location, ShortcutDefaults::ICON_LOCATION);
        assert_eq!(filled.window_style, "1");
        assert_eq!(filled.target_path, r"C:\Temp\demo.txt");
        assert!(filled.arguments.is_empty());
        assert!(filled.hotkey.is_empty());

        let custom = Shortcut::builder()
            .icon_location(r"C:\app.exe,2")
            .window_style(WindowStyle::Minimized)
            .build()
            .with_defaults();
        assert_eq!(custom.icon_location, r"C:\app.exe,2");
        assert_eq!(custom.window_style, "7");
    }

    #[test]
    fn test_serde_uses_property_names() {
        let shortcut = Shortcut::builder()
            .target_path("notepad.exe")
            .working_directory(r"C:\Temp")
            .build();
        let json = serde_json::to_value(&shortcut).unwrap();
        assert_eq!(json["TargetPath"], "notepad.exe");
        assert_eq!(json["WorkingDirectory"], r"C:\Temp");

        let parsed: Shortcut = serde_json::from_str(r#"{"Description":"demo"}"#).unwrap();
        assert_eq!(parsed.description, "demo");
        assert!(parsed.target_path.is_empty());
    }

    #[test]
    fn test_window_style_parsing() {
        assert_eq!("1".parse::<WindowStyle>().unwrap(), WindowStyle::Normal);
        assert_eq!("Maximized".parse::<WindowStyle>().unwrap(), WindowStyle::Maximized);
        assert_eq!(" 7 ".parse::<WindowStyle>().unwrap(), WindowStyle::Minimized);

        let err = "2".parse::<WindowStyle>().unwrap_err();
        assert_eq!(err.field(), Some(ShortcutField::WindowStyle));

        let shortcut = Shortcut {
            window_style: "3".into(),
            ..Default::default()
        };
        assert_eq!(shortcut.window_style_kind(), Some(WindowStyle::Maximized));
        assert_eq!(Shortcut::default().window_style_kind(), None);
    }

    #[test]
    fn test_icon_location_parsing() {
        let icon = IconLocation::parse(ShortcutDefaults::ICON_LOCATION);
        assert_eq!(icon.path, r"%SystemRoot%\System32\SHELL32.dll");
        assert_eq!(icon.index, 0);

        let icon = IconLocation::parse(r"C:\tools\app.exe,-101");
        assert_eq!(icon.index, -101);
        assert_eq!(icon.to_string(), r"C:\tools\app.exe,-101");

        let icon = IconLocation::parse(r"C:\odd,name\app.ico");
        assert_eq!(icon.path, r"C:\odd,name\app.ico");
        assert_eq!(icon.index, 0);

        assert_eq!(Shortcut::default().icon(), None);
    }
}
