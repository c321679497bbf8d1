//! `WScript.Shell` over COM late binding.
//!
//! The shell object and the shortcut objects it creates are driven through
//! `IDispatch`: names are resolved with `GetIDsOfNames` and every call goes
//! through `Invoke`, the same way a script host would.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use tracing::debug;
use windows::core::{Interface, BSTR, GUID, HSTRING, PCWSTR, VARIANT};
use windows::Win32::System::Com::{
    CLSIDFromProgID, CoCreateInstance, CoInitializeEx, CoUninitialize, IDispatch, CLSCTX_ALL,
    COINIT_APARTMENTTHREADED, COINIT_SPEED_OVER_MEMORY, DISPATCH_FLAGS, DISPATCH_METHOD,
    DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS,
};
use windows::Win32::System::Ole::DISPID_PROPERTYPUT;

use crate::config::AutomationConfig;
use crate::error::CallError;
use crate::session::{AutomationProvider, ShellService, ShortcutObject};

const VT_DISPATCH: u16 = 9;

fn call_error(err: windows::core::Error, what: &str) -> CallError {
    CallError::with_code(format!("{what}: {}", err.message()), err.code().0)
}

/// Provider for the real `WScript.Shell` service.
#[derive(Debug, Clone, Copy, Default)]
pub struct WshProvider;

/// A single-threaded COM apartment entered by the current thread.
#[derive(Debug)]
pub struct ComApartment {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        // SAFETY: paired with the successful CoInitializeEx in
        // `enter_apartment` on this same thread (the guard is !Send), and the
        // session drops every COM object before its apartment.
        unsafe { CoUninitialize() };
        debug!("CoUninitialize");
    }
}

impl AutomationProvider for WshProvider {
    type Apartment = ComApartment;
    type Service = WshService;

    fn enter_apartment(&self) -> Result<ComApartment, CallError> {
        // SAFETY: no reserved pointer is passed. S_FALSE (already initialized
        // as STA) counts as success and still needs a matching uninitialize;
        // RPC_E_CHANGED_MODE is an error and creates no guard.
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_SPEED_OVER_MEMORY) }
            .ok()
            .map_err(|e| call_error(e, "CoInitializeEx"))?;
        debug!("CoInitializeEx (apartment threaded)");
        Ok(ComApartment {
            _not_send: PhantomData,
        })
    }

    fn create_service(&self, _apartment: &ComApartment) -> Result<WshService, CallError> {
        let prog_id = HSTRING::from(AutomationConfig::SHELL_PROG_ID);
        // SAFETY: `prog_id` is a NUL-terminated wide string alive for the call.
        let clsid = unsafe { CLSIDFromProgID(PCWSTR(prog_id.as_ptr())) }
            .map_err(|e| call_error(e, AutomationConfig::SHELL_PROG_ID))?;
        // SAFETY: COM is initialized on this thread by `_apartment`.
        let shell: IDispatch = unsafe { CoCreateInstance(&clsid, None, CLSCTX_ALL) }
            .map_err(|e| call_error(e, AutomationConfig::SHELL_PROG_ID))?;
        debug!("Created {}", AutomationConfig::SHELL_PROG_ID);
        Ok(WshService {
            shell: Dispatch(shell),
        })
    }
}

/// Late-bound calls on an `IDispatch`.
struct Dispatch(IDispatch);

impl Dispatch {
    fn dispid(&self, name: &str) -> Result<i32, CallError> {
        let wide = HSTRING::from(name);
        let names = [PCWSTR(wide.as_ptr())];
        let mut dispid = 0;
        // SAFETY: `names` holds one valid wide string and `dispid` one slot,
        // both outliving the call.
        unsafe {
            self.0.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                AutomationConfig::LCID,
                &mut dispid,
            )
        }
        .map_err(|e| call_error(e, name))?;
        Ok(dispid)
    }

    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        mut args: Vec<VARIANT>,
    ) -> Result<VARIANT, CallError> {
        let dispid = self.dispid(name)?;

        // DISPPARAMS lists arguments right to left.
        args.reverse();
        let is_put = flags == DISPATCH_PROPERTYPUT;
        let mut named = [DISPID_PROPERTYPUT];
        let params = DISPPARAMS {
            rgvarg: if args.is_empty() {
                ptr::null_mut()
            } else {
                args.as_mut_ptr()
            },
            rgdispidNamedArgs: if is_put {
                named.as_mut_ptr()
            } else {
                ptr::null_mut()
            },
            cArgs: args.len() as u32,
            cNamedArgs: u32::from(is_put),
        };

        let mut result = VARIANT::default();
        // SAFETY: `params` points into `args` and `named`, which outlive the
        // call; `result` is a valid empty VARIANT the callee may fill.
        unsafe {
            self.0.Invoke(
                dispid,
                &GUID::zeroed(),
                AutomationConfig::LCID,
                flags,
                &params,
                Some(&mut result as *mut VARIANT),
                None,
                None,
            )
        }
        .map_err(|e| call_error(e, name))?;
        Ok(result)
    }
}

fn text(value: &VARIANT, what: &str) -> Result<String, CallError> {
    BSTR::try_from(value)
        .map(|b| b.to_string())
        .map_err(|e| call_error(e, what))
}

fn object(value: &VARIANT, what: &str) -> Result<IDispatch, CallError> {
    let raw = value.as_raw();
    // SAFETY: `vt` is valid for every VARIANT and `pdispVal` is only read
    // when `vt` says it holds an IDispatch pointer. `cloned` adds the
    // reference we keep; `value` still releases its own.
    let dispatch = unsafe {
        let inner = &raw.Anonymous.Anonymous;
        if inner.vt == VT_DISPATCH {
            IDispatch::from_raw_borrowed(&inner.Anonymous.pdispVal).cloned()
        } else {
            None
        }
    };
    dispatch.ok_or_else(|| CallError::new(format!("{what} did not return an object")))
}

/// The path as a `BSTR`, carrying its UTF-16 units unchanged.
fn path_bstr(path: &Path) -> Result<BSTR, CallError> {
    let wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    BSTR::from_wide(&wide).map_err(|e| call_error(e, "allocate shortcut path"))
}

/// The `WScript.Shell` object.
pub struct WshService {
    shell: Dispatch,
}

impl ShellService for WshService {
    type Shortcut = WshShortcut;

    fn create_shortcut(&self, path: &Path) -> Result<WshShortcut, CallError> {
        let method = AutomationConfig::CREATE_SHORTCUT_METHOD;
        let arg = VARIANT::from(path_bstr(path)?);
        let result = self.shell.invoke(method, DISPATCH_METHOD, vec![arg])?;
        Ok(WshShortcut {
            link: Dispatch(object(&result, method)?),
        })
    }
}

/// A `WshShortcut` object returned by `CreateShortcut`.
pub struct WshShortcut {
    link: Dispatch,
}

impl ShortcutObject for WshShortcut {
    fn get_property(&self, name: &str) -> Result<String, CallError> {
        let value = self.link.invoke(name, DISPATCH_PROPERTYGET, Vec::new())?;
        text(&value, name)
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), CallError> {
        let arg = VARIANT::from(BSTR::from(value));
        self.link.invoke(name, DISPATCH_PROPERTYPUT, vec![arg])?;
        Ok(())
    }

    fn save(&mut self) -> Result<(), CallError> {
        self.link
            .invoke(AutomationConfig::SAVE_METHOD, DISPATCH_METHOD, Vec::new())?;
        Ok(())
    }
}
