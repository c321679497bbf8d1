//! In-process stand-in for the shell automation service.
//!
//! `MemoryShell` behaves like `WScript.Shell` as far as this crate can
//! observe: shortcut paths must end in `.lnk` or `.url`, a new shortcut
//! object reports WindowStyle `1` and IconLocation `,0` with every other
//! property empty, property sets are staged on the object and only become
//! visible to other objects on `save`. Saved shortcuts live in a shared map
//! instead of on disk.
//!
//! Individual calls can be made to fail through [`MemoryShell::faults`], and
//! the number of live apartments and services is tracked so callers can
//! check that sessions release everything they acquire.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ShortcutDefaults;
use crate::error::CallError;
use crate::session::{AutomationProvider, ShellService, ShortcutObject};
use crate::shortcut::{Shortcut, ShortcutField};

/// DISP_E_UNKNOWNNAME
const UNKNOWN_NAME: i32 = 0x8002_0006_u32 as i32;
/// E_FAIL
const FAILED: i32 = 0x8000_4005_u32 as i32;

/// Calls that should fail on the next attempt, and every one after it.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub apartment: bool,
    pub service: bool,
    pub open: bool,
    pub get: Option<ShortcutField>,
    pub set: Option<ShortcutField>,
    pub save: bool,
}

#[derive(Debug, Default)]
struct Store {
    files: HashMap<PathBuf, Shortcut>,
    live_apartments: usize,
    live_services: usize,
    saves: usize,
}

/// An in-memory shell automation service. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryShell {
    store: Arc<Mutex<Store>>,
    faults: Arc<Mutex<Faults>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault switches; edit through the returned guard.
    pub fn faults(&self) -> MutexGuard<'_, Faults> {
        lock(&self.faults)
    }

    /// Place a saved shortcut at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, shortcut: Shortcut) {
        lock(&self.store).files.insert(path.into(), shortcut);
    }

    /// The last saved state of the shortcut at `path`.
    pub fn stored(&self, path: impl AsRef<Path>) -> Option<Shortcut> {
        lock(&self.store).files.get(path.as_ref()).cloned()
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<Shortcut> {
        lock(&self.store).files.remove(path.as_ref())
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        lock(&self.store).saves
    }

    pub fn live_apartments(&self) -> usize {
        lock(&self.store).live_apartments
    }

    pub fn live_services(&self) -> usize {
        lock(&self.store).live_services
    }

    fn check(&self, tripped: impl FnOnce(&Faults) -> bool, what: &str) -> Result<(), CallError> {
        if tripped(&self.faults()) {
            Err(CallError::with_code(format!("injected failure: {what}"), FAILED))
        } else {
            Ok(())
        }
    }
}

/// Runtime initialization held by a session.
#[derive(Debug)]
pub struct MemoryApartment {
    shell: MemoryShell,
}

impl Drop for MemoryApartment {
    fn drop(&mut self) {
        lock(&self.shell.store).live_apartments -= 1;
    }
}

/// The service object held by a session.
#[derive(Debug)]
pub struct MemoryService {
    shell: MemoryShell,
}

impl Drop for MemoryService {
    fn drop(&mut self) {
        lock(&self.shell.store).live_services -= 1;
    }
}

impl AutomationProvider for MemoryShell {
    type Apartment = MemoryApartment;
    type Service = MemoryService;

    fn enter_apartment(&self) -> Result<MemoryApartment, CallError> {
        self.check(|f| f.apartment, "enter apartment")?;
        lock(&self.store).live_apartments += 1;
        Ok(MemoryApartment {
            shell: self.clone(),
        })
    }

    fn create_service(&self, _apartment: &MemoryApartment) -> Result<MemoryService, CallError> {
        self.check(|f| f.service, "create shell service")?;
        lock(&self.store).live_services += 1;
        Ok(MemoryService {
            shell: self.clone(),
        })
    }
}

impl ShellService for MemoryService {
    type Shortcut = MemoryShortcut;

    fn create_shortcut(&self, path: &Path) -> Result<MemoryShortcut, CallError> {
        self.shell.check(|f| f.open, "create shortcut")?;

        let is_link = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case(ShortcutDefaults::LINK_EXTENSION)
                    || ext.eq_ignore_ascii_case("url")
            });
        if !is_link {
            return Err(CallError::with_code(
                "The shortcut pathname must end with .lnk or .url.",
                FAILED,
            ));
        }

        let staged = self.shell.stored(path).unwrap_or_else(unsaved);
        Ok(MemoryShortcut {
            shell: self.shell.clone(),
            path: path.to_path_buf(),
            staged,
        })
    }
}

/// A shortcut object with staged, unsaved properties.
#[derive(Debug)]
pub struct MemoryShortcut {
    shell: MemoryShell,
    path: PathBuf,
    staged: Shortcut,
}

/// What the shell reports for an object that has never been saved.
fn unsaved() -> Shortcut {
    Shortcut {
        window_style: "1".to_string(),
        icon_location: ",0".to_string(),
        ..Shortcut::default()
    }
}

fn resolve(name: &str) -> Result<ShortcutField, CallError> {
    ShortcutField::from_property_name(name)
        .ok_or_else(|| CallError::with_code(format!("Unknown name: {name}"), UNKNOWN_NAME))
}

impl ShortcutObject for MemoryShortcut {
    fn get_property(&self, name: &str) -> Result<String, CallError> {
        let field = resolve(name)?;
        self.shell
            .check(|f| f.get == Some(field), &format!("get {name}"))?;
        Ok(self.staged.get(field).to_string())
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), CallError> {
        let field = resolve(name)?;
        self.shell
            .check(|f| f.set == Some(field), &format!("set {name}"))?;
        self.staged.set(field, value);
        Ok(())
    }

    fn save(&mut self) -> Result<(), CallError> {
        self.shell.check(|f| f.save, "save")?;
        let mut store = lock(&self.shell.store);
        store.files.insert(self.path.clone(), self.staged.clone());
        store.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shortcut_reports_shell_initial_values() {
        let shell = MemoryShell::new();
        let apartment = shell.enter_apartment().unwrap();
        let service = shell.create_service(&apartment).unwrap();
        let object = service.create_shortcut(Path::new("new.lnk")).unwrap();

        for field in ShortcutField::ALL {
            let expected = match field {
                ShortcutField::WindowStyle => "1",
                ShortcutField::IconLocation => ",0",
                _ => "",
            };
            assert_eq!(object.get_property(field.property_name()).unwrap(), expected);
        }
    }

    #[test]
    fn test_staged_sets_are_invisible_until_save() {
        let shell = MemoryShell::new();
        let apartment = shell.enter_apartment().unwrap();
        let service = shell.create_service(&apartment).unwrap();

        let mut object = service.create_shortcut(Path::new("a.lnk")).unwrap();
        object.set_property("TargetPath", "x.exe").unwrap();
        assert!(shell.stored("a.lnk").is_none());

        object.save().unwrap();
        assert_eq!(shell.stored("a.lnk").unwrap().target_path, "x.exe");
        assert_eq!(shell.save_count(), 1);
    }

    #[test]
    fn test_unknown_property() {
        let shell = MemoryShell::new();
        let apartment = shell.enter_apartment().unwrap();
        let service = shell.create_service(&apartment).unwrap();
        let object = service.create_shortcut(Path::new("a.lnk")).unwrap();

        let err = object.get_property("FullName2").unwrap_err();
        assert_eq!(err.code, Some(UNKNOWN_NAME));
    }

    #[test]
    fn test_rejects_non_link_paths() {
        let shell = MemoryShell::new();
        let apartment = shell.enter_apartment().unwrap();
        let service = shell.create_service(&apartment).unwrap();

        assert!(service.create_shortcut(Path::new("notes.txt")).is_err());
        assert!(service.create_shortcut(Path::new("site.URL")).is_ok());
    }

    #[test]
    fn test_live_counts() {
        let shell = MemoryShell::new();
        let apartment = shell.enter_apartment().unwrap();
        let service = shell.create_service(&apartment).unwrap();
        assert_eq!((shell.live_apartments(), shell.live_services()), (1, 1));

        drop(service);
        drop(apartment);
        assert_eq!((shell.live_apartments(), shell.live_services()), (0, 0));
    }
}
