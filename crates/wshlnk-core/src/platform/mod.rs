//! Platform abstraction layer for the shell automation service.
//!
//! All `#[cfg]` blocks for OS-specific behavior live in this module.
//!
//! # Supported Platforms
//!
//! - **Windows**: `WScript.Shell` over COM (`wsh` submodule)
//! - **Everything else**: no shell service; opening a session fails with
//!   `AutomationUnavailable`

#[cfg(windows)]
pub mod wsh;

#[cfg(windows)]
pub use wsh::WshProvider;

use std::path::Path;

use crate::error::CallError;
use crate::session::{AutomationProvider, ShellService, ShortcutObject};

/// The provider backed by the operating system on this platform.
#[cfg(windows)]
pub type PlatformProvider = WshProvider;

/// The provider backed by the operating system on this platform.
#[cfg(not(windows))]
pub type PlatformProvider = UnsupportedProvider;

pub fn default_provider() -> PlatformProvider {
    PlatformProvider::default()
}

/// Returns the current platform name.
pub fn current_platform() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "linux"
    }
    #[cfg(target_os = "windows")]
    {
        "windows"
    }
    #[cfg(target_os = "macos")]
    {
        "macos"
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        "unknown"
    }
}

/// Returns true if the shell automation service can exist on this platform.
pub fn is_supported_platform() -> bool {
    cfg!(windows)
}

/// Provider for platforms without a shell automation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProvider;

/// Uninhabited: no service or shortcut object exists on these platforms.
#[derive(Debug)]
pub enum Unsupported {}

impl AutomationProvider for UnsupportedProvider {
    type Apartment = ();
    type Service = Unsupported;

    fn enter_apartment(&self) -> Result<(), CallError> {
        Err(CallError::new(format!(
            "shell automation is not available on {}",
            current_platform()
        )))
    }

    fn create_service(&self, _apartment: &()) -> Result<Unsupported, CallError> {
        Err(CallError::new("shell automation service is not registered"))
    }
}

impl ShellService for Unsupported {
    type Shortcut = Unsupported;

    fn create_shortcut(&self, _path: &Path) -> Result<Unsupported, CallError> {
        match *self {}
    }
}

impl ShortcutObject for Unsupported {
    fn get_property(&self, _name: &str) -> Result<String, CallError> {
        match *self {}
    }

    fn set_property(&mut self, _name: &str, _value: &str) -> Result<(), CallError> {
        match *self {}
    }

    fn save(&mut self) -> Result<(), CallError> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LnkError;
    use crate::session::AutomationSession;

    #[test]
    fn test_current_platform() {
        let platform = current_platform();
        assert!(["linux", "windows", "macos", "unknown"].contains(&platform));
    }

    #[test]
    fn test_unsupported_provider_is_unavailable() {
        let err = AutomationSession::open_with(&UnsupportedProvider).err().unwrap();
        assert!(matches!(err, LnkError::AutomationUnavailable { .. }));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_default_session_unavailable_off_windows() {
        assert!(!is_supported_platform());
        assert!(matches!(
            AutomationSession::open(),
            Err(LnkError::AutomationUnavailable { .. })
        ));
    }
}
