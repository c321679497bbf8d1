//! wshlnk - read and write Windows shortcut (`.lnk`) files through the
//! `WScript.Shell` automation object.
//!
//! The binary shortcut format is never parsed here. Each operation opens a
//! private [`AutomationSession`], asks the shell service for a shortcut object
//! bound to the path, transfers the seven properties of [`Shortcut`] and tears
//! the session down before returning.
//!
//! # Example
//!
//! ```rust,ignore
//! use wshlnk::Shortcut;
//!
//! fn main() -> wshlnk::Result<()> {
//!     let shortcut = Shortcut::builder()
//!         .target_path(r"C:\Temp\demo.txt")
//!         .description("demo")
//!         .working_directory(r"C:\Temp")
//!         .build();
//!     wshlnk::write(r"C:\Temp\demo.lnk", &shortcut)?;
//!
//!     let read_back = wshlnk::read(r"C:\Temp\demo.lnk")?;
//!     assert_eq!(read_back.window_style, "1");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod memory;
pub mod platform;
pub mod session;
pub mod shortcut;

// Re-export commonly used types
pub use error::{CallError, LnkError, Result};
pub use memory::MemoryShell;
pub use session::{
    AutomationProvider, AutomationSession, SessionState, ShellService, ShortcutHandle,
    ShortcutObject, ThreadAffinity,
};
pub use shortcut::{IconLocation, Shortcut, ShortcutBuilder, ShortcutField, WindowStyle};

use std::path::Path;
use tracing::{debug, info};

/// Read the shortcut at `path` using the operating system's shell service.
pub fn read(path: impl AsRef<Path>) -> Result<Shortcut> {
    read_with(&platform::default_provider(), path)
}

/// Create or overwrite the shortcut at `path` using the operating system's
/// shell service.
pub fn write(path: impl AsRef<Path>, shortcut: &Shortcut) -> Result<()> {
    write_with(&platform::default_provider(), path, shortcut)
}

/// Read the shortcut at `path` through `provider`.
///
/// Returns either a fully populated record or an error, never a partial one.
pub fn read_with<P: AutomationProvider>(provider: &P, path: impl AsRef<Path>) -> Result<Shortcut> {
    let path = path.as_ref();
    debug!("Reading shortcut {:?}", path);

    let mut session = AutomationSession::open_with(provider)?;
    let result = session
        .create_shortcut_handle(path)
        .and_then(|handle| mapper::read_properties(&handle));
    session.close();
    result
}

/// Create or overwrite the shortcut at `path` through `provider`.
///
/// Empty `IconLocation` and `WindowStyle` are replaced by their defaults.
/// On `SaveFailed` the file at `path` may be missing or stale.
pub fn write_with<P: AutomationProvider>(
    provider: &P,
    path: impl AsRef<Path>,
    shortcut: &Shortcut,
) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing shortcut {:?}", path);

    let mut session = AutomationSession::open_with(provider)?;
    let result = session
        .create_shortcut_handle(path)
        .and_then(|mut handle| mapper::write_properties(&mut handle, shortcut));
    session.close();

    if result.is_ok() {
        info!("Saved shortcut {:?}", path);
    }
    result
}
