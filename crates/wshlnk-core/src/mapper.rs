//! Property transfer between a [`Shortcut`] record and a shortcut object.
//!
//! Both directions walk [`ShortcutField::ALL`]. A failure on any field aborts
//! the whole transfer: reads never return a partially filled record and
//! writes never reach `save` after a failed property set.

use tracing::debug;

use crate::error::{LnkError, Result};
use crate::session::{ShortcutHandle, ShortcutObject};
use crate::shortcut::{Shortcut, ShortcutField};

/// Read all seven properties from `handle` into a fresh record.
pub fn read_properties<O: ShortcutObject>(handle: &ShortcutHandle<'_, O>) -> Result<Shortcut> {
    let mut shortcut = Shortcut::default();
    for field in ShortcutField::ALL {
        let value = handle
            .object()
            .get_property(field.property_name())
            .map_err(|source| LnkError::PropertyReadFailed { field, source })?;
        debug!("Read {} = {:?}", field, value);
        shortcut.set(field, value);
    }
    Ok(shortcut)
}

/// Apply write defaults, set all seven properties on `handle`, then save.
pub fn write_properties<O: ShortcutObject>(
    handle: &mut ShortcutHandle<'_, O>,
    shortcut: &Shortcut,
) -> Result<()> {
    let shortcut = shortcut.with_defaults();
    for (field, value) in shortcut.iter() {
        handle
            .object_mut()
            .set_property(field.property_name(), value)
            .map_err(|source| LnkError::PropertyWriteFailed { field, source })?;
        debug!("Set {} = {:?}", field, value);
    }

    let path = handle.path().to_path_buf();
    handle
        .object_mut()
        .save()
        .map_err(|source| LnkError::SaveFailed { path, source })?;
    Ok(())
}
