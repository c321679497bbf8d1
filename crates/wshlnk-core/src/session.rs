//! Automation session lifecycle.
//!
//! A session owns, in acquisition order:
//! 1. a [`ThreadAffinity`] token pinning it to the calling OS thread,
//! 2. the automation runtime initialization (the COM apartment on Windows),
//! 3. the shell automation service object.
//!
//! [`AutomationSession::close`] releases them in reverse order and also runs
//! from `Drop`, so every exit path tears the session down exactly once.
//! Shortcut handles borrow the session, which guarantees they are released
//! before it closes.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::thread::{self, ThreadId};

use tracing::debug;

use crate::error::{CallError, LnkError, Result};

/// Source of the automation runtime and the shell service.
///
/// Resources are released by dropping them, so every associated type is an
/// RAII guard.
pub trait AutomationProvider {
    /// Per-thread runtime initialization.
    type Apartment;
    /// The shell automation service object.
    type Service: ShellService;

    /// Initialize the automation runtime on the calling thread (STA).
    fn enter_apartment(&self) -> std::result::Result<Self::Apartment, CallError>;

    /// Instantiate the shell automation service inside `apartment`.
    fn create_service(
        &self,
        apartment: &Self::Apartment,
    ) -> std::result::Result<Self::Service, CallError>;
}

/// The shell automation service (`WScript.Shell`).
pub trait ShellService {
    type Shortcut: ShortcutObject;

    /// Load the shortcut at `path`, or create an unsaved one bound to it.
    fn create_shortcut(&self, path: &Path) -> std::result::Result<Self::Shortcut, CallError>;
}

/// A shortcut object exposing named text properties.
pub trait ShortcutObject {
    fn get_property(&self, name: &str) -> std::result::Result<String, CallError>;

    fn set_property(&mut self, name: &str, value: &str) -> std::result::Result<(), CallError>;

    /// Persist the object to the path it is bound to.
    fn save(&mut self) -> std::result::Result<(), CallError>;
}

/// Lifecycle state of an [`AutomationSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opening,
    Open,
    Closed,
}

/// Token binding a session to the OS thread that created it.
///
/// The token is neither `Send` nor `Sync`, so anything that owns one cannot
/// leave the thread it was claimed on.
#[derive(Debug)]
pub struct ThreadAffinity {
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl ThreadAffinity {
    /// Claim the calling thread.
    pub fn claim() -> Self {
        let thread = thread::current().id();
        debug!("Claimed thread affinity for {:?}", thread);
        Self {
            thread,
            _not_send: PhantomData,
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Fail unless called from the claimed thread.
    pub fn ensure_current(&self) -> std::result::Result<(), CallError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(CallError::new(format!(
                "automation session belongs to thread {:?} but was used from {:?}",
                self.thread,
                thread::current().id()
            )))
        }
    }
}

impl Drop for ThreadAffinity {
    fn drop(&mut self) {
        debug!("Released thread affinity for {:?}", self.thread);
    }
}

/// A single-use connection to the shell automation service.
pub struct AutomationSession<P: AutomationProvider> {
    state: SessionState,
    // Released in reverse declaration order by `close`.
    affinity: Option<ThreadAffinity>,
    apartment: Option<P::Apartment>,
    service: Option<P::Service>,
}

impl AutomationSession<crate::platform::PlatformProvider> {
    /// Open a session against the operating system's shell service.
    pub fn open() -> Result<Self> {
        Self::open_with(&crate::platform::default_provider())
    }
}

impl<P: AutomationProvider> AutomationSession<P> {
    /// Open a session using `provider`.
    ///
    /// On failure every resource acquired so far is released before the
    /// error is returned.
    pub fn open_with(provider: &P) -> Result<Self> {
        let mut session = Self {
            state: SessionState::Unopened,
            affinity: None,
            apartment: None,
            service: None,
        };
        session.transition(SessionState::Opening);

        session.affinity = Some(ThreadAffinity::claim());

        let apartment = match provider.enter_apartment() {
            Ok(apartment) => apartment,
            Err(e) => {
                session.close();
                return Err(LnkError::unavailable(e));
            }
        };

        let service = match provider.create_service(&apartment) {
            Ok(service) => service,
            Err(e) => {
                drop(apartment);
                session.close();
                return Err(LnkError::unavailable(e));
            }
        };

        session.apartment = Some(apartment);
        session.service = Some(service);
        session.transition(SessionState::Open);
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Obtain a shortcut object bound to `path`.
    ///
    /// Works the same whether or not a shortcut already exists at `path`.
    pub fn create_shortcut_handle(
        &self,
        path: &Path,
    ) -> Result<ShortcutHandle<'_, <P::Service as ShellService>::Shortcut>> {
        let (Some(affinity), Some(service), SessionState::Open) =
            (&self.affinity, &self.service, self.state)
        else {
            return Err(LnkError::open_failed(
                path,
                CallError::new("automation session is not open"),
            ));
        };
        affinity
            .ensure_current()
            .map_err(|e| LnkError::open_failed(path, e))?;

        let object = service
            .create_shortcut(path)
            .map_err(|e| LnkError::open_failed(path, e))?;
        debug!("Opened shortcut object for {:?}", path);

        Ok(ShortcutHandle {
            object,
            path: path.to_path_buf(),
            _session: PhantomData,
        })
    }

    /// Release the service, the runtime and the thread binding, in that order.
    ///
    /// Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(service) = self.service.take() {
            drop(service);
            debug!("Released shell automation service");
        }
        if let Some(apartment) = self.apartment.take() {
            drop(apartment);
            debug!("Left automation apartment");
        }
        self.affinity.take();
        self.transition(SessionState::Closed);
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Automation session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl<P: AutomationProvider> Drop for AutomationSession<P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// A shortcut object obtained from, and borrowing, an open session.
pub struct ShortcutHandle<'s, O: ShortcutObject> {
    object: O,
    path: PathBuf,
    _session: PhantomData<&'s ()>,
}

impl<O: ShortcutObject> ShortcutHandle<'_, O> {
    /// Path the shortcut object is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn object(&self) -> &O {
        &self.object
    }

    pub(crate) fn object_mut(&mut self) -> &mut O {
        &mut self.object
    }
}

impl<O: ShortcutObject> Drop for ShortcutHandle<'_, O> {
    fn drop(&mut self) {
        debug!("Released shortcut object for {:?}", self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryShell;

    #[test]
    fn test_open_and_close() {
        let shell = MemoryShell::new();
        let mut session = AutomationSession::open_with(&shell).unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(shell.live_apartments(), 1);
        assert_eq!(shell.live_services(), 1);

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(shell.live_apartments(), 0);
        assert_eq!(shell.live_services(), 0);

        // Second close is a no-op.
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_drop_closes_session() {
        let shell = MemoryShell::new();
        {
            let _session = AutomationSession::open_with(&shell).unwrap();
            assert_eq!(shell.live_services(), 1);
        }
        assert_eq!(shell.live_apartments(), 0);
        assert_eq!(shell.live_services(), 0);
    }

    #[test]
    fn test_apartment_failure_is_unavailable() {
        let shell = MemoryShell::new();
        shell.faults().apartment = true;

        let err = AutomationSession::open_with(&shell).err().unwrap();
        assert!(matches!(err, LnkError::AutomationUnavailable { .. }));
        assert_eq!(shell.live_apartments(), 0);
    }

    #[test]
    fn test_service_failure_unwinds_apartment() {
        let shell = MemoryShell::new();
        shell.faults().service = true;

        let err = AutomationSession::open_with(&shell).err().unwrap();
        assert!(matches!(err, LnkError::AutomationUnavailable { .. }));
        assert_eq!(shell.live_apartments(), 0);
        assert_eq!(shell.live_services(), 0);
    }

    #[test]
    fn test_handle_on_closed_session_fails() {
        let shell = MemoryShell::new();
        let mut session = AutomationSession::open_with(&shell).unwrap();
        session.close();

        let err = session
            .create_shortcut_handle(Path::new(r"C:\Temp\closed.lnk"))
            .err()
            .unwrap();
        assert!(matches!(err, LnkError::ShortcutOpenFailed { .. }));
    }

    #[test]
    fn test_open_failure_reports_path() {
        let shell = MemoryShell::new();
        shell.faults().open = true;
        let session = AutomationSession::open_with(&shell).unwrap();

        let result = session.create_shortcut_handle(Path::new(r"C:\Temp\x.lnk"));
        match result {
            Err(LnkError::ShortcutOpenFailed { path, .. }) => {
                assert_eq!(path, PathBuf::from(r"C:\Temp\x.lnk"));
            }
            _ => panic!("expected ShortcutOpenFailed"),
        };
    }

    #[test]
    fn test_thread_affinity() {
        let affinity = ThreadAffinity::claim();
        assert!(affinity.is_current());
        assert!(affinity.ensure_current().is_ok());
        assert_eq!(affinity.thread_id(), thread::current().id());
    }

    #[test]
    fn test_sessions_on_separate_threads_are_independent() {
        let shell = MemoryShell::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shell = shell.clone();
                thread::spawn(move || {
                    let session = AutomationSession::open_with(&shell).unwrap();
                    session.is_open()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(shell.live_apartments(), 0);
    }
}
