//! Typed MTP operations built on [`Engine::run_transaction`].
//!
//! Each method builds the request container, runs the exchange, and decodes
//! any data phase into the matching wire record.

use std::io::{Read, Write};

use tracing::debug;

use mtplink_transport::UsbTransport;
use mtplink_wire::consts::{
    OC_ANDROID_BEGIN_EDIT_OBJECT, OC_ANDROID_END_EDIT_OBJECT, OC_ANDROID_GET_PARTIAL_OBJECT64,
    OC_ANDROID_SEND_PARTIAL_OBJECT, OC_ANDROID_TRUNCATE_OBJECT, OC_CLOSE_SESSION,
    OC_DELETE_OBJECT, OC_GET_DEVICE_INFO, OC_GET_DEVICE_PROP_DESC, OC_GET_DEVICE_PROP_VALUE,
    OC_GET_NUM_OBJECTS, OC_GET_OBJECT, OC_GET_OBJECT_HANDLES, OC_GET_OBJECT_INFO,
    OC_GET_PARTIAL_OBJECT, OC_GET_STORAGE_IDS, OC_GET_STORAGE_INFO,
    OC_MTP_GET_OBJECT_PROPS_SUPPORTED, OC_MTP_GET_OBJECT_PROP_DESC, OC_MTP_GET_OBJECT_PROP_VALUE,
    OC_MTP_SET_OBJECT_PROP_VALUE, OC_OPEN_SESSION, OC_RESET_DEVICE_PROP_VALUE,
    OC_SEND_OBJECT, OC_SEND_OBJECT_INFO, OC_SET_DEVICE_PROP_VALUE, RC_SESSION_ALREADY_OPENED,
};
use mtplink_wire::{
    Container, DeviceInfo, DevicePropDesc, ObjectInfo, ObjectPropDesc, ResponseCode, StorageInfo,
    Uint16Array, Uint32Array, WireDecode, WireEncode,
};

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::session::Session;

/// Handle of the root directory in `parent` parameters.
pub const PARENT_ROOT: u32 = 0xFFFFFFFF;

/// Wildcard storage id meaning "all stores".
pub const STORAGE_ALL: u32 = 0xFFFFFFFF;

impl<T: UsbTransport> Engine<T> {
    /// Open a session under a fresh random id.
    ///
    /// Transaction ids restart at 1 with the new session.
    pub fn open_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(EngineError::Rc(ResponseCode(RC_SESSION_ALREADY_OPENED)));
        }
        let id = Session::random_id();
        let mut req = Container::with_params(OC_OPEN_SESSION, &[id]);
        self.run_transaction(&mut req, None, None, 0)?;
        debug!(session = id, "session open");
        self.session = Some(Session::new(id));
        Ok(())
    }

    /// Close the session on the device.
    ///
    /// Host-side session state is dropped regardless of the outcome, since
    /// the device may have lost the session already.
    pub fn close_session(&mut self) -> Result<()> {
        let mut req = Container::new(OC_CLOSE_SESSION);
        let result = self.run_transaction(&mut req, None, None, 0);
        self.session = None;
        result.map(drop)
    }

    pub fn get_device_info(&mut self) -> Result<DeviceInfo> {
        self.get_data(&mut Container::new(OC_GET_DEVICE_INFO))
    }

    pub fn get_storage_ids(&mut self) -> Result<Vec<u32>> {
        let ids: Uint32Array = self.get_data(&mut Container::new(OC_GET_STORAGE_IDS))?;
        Ok(ids.0)
    }

    pub fn get_storage_info(&mut self, storage_id: u32) -> Result<StorageInfo> {
        self.get_data(&mut Container::with_params(OC_GET_STORAGE_INFO, &[storage_id]))
    }

    /// Count objects under `parent` (use [`PARENT_ROOT`] for the root and 0
    /// for `format_code` to match all formats).
    pub fn get_num_objects(&mut self, storage_id: u32, format_code: u16, parent: u32) -> Result<u32> {
        let mut req = Container::with_params(
            OC_GET_NUM_OBJECTS,
            &[storage_id, u32::from(format_code), parent],
        );
        let rep = self.run_transaction(&mut req, None, None, 0)?;
        param(&rep, 0)
    }

    pub fn get_object_handles(
        &mut self,
        storage_id: u32,
        format_code: u16,
        parent: u32,
    ) -> Result<Vec<u32>> {
        let handles: Uint32Array = self.get_data(&mut Container::with_params(
            OC_GET_OBJECT_HANDLES,
            &[storage_id, u32::from(format_code), parent],
        ))?;
        Ok(handles.0)
    }

    pub fn get_object_info(&mut self, handle: u32) -> Result<ObjectInfo> {
        self.get_data(&mut Container::with_params(OC_GET_OBJECT_INFO, &[handle]))
    }

    /// Stream an object's content into `dest`.
    pub fn get_object(&mut self, handle: u32, dest: &mut dyn Write) -> Result<()> {
        let mut req = Container::with_params(OC_GET_OBJECT, &[handle]);
        self.run_transaction(&mut req, Some(dest), None, 0).map(drop)
    }

    /// Read up to `size` bytes at `offset`. Returns the byte count the
    /// device reports it actually sent.
    pub fn get_partial_object(
        &mut self,
        handle: u32,
        offset: u32,
        size: u32,
        dest: &mut dyn Write,
    ) -> Result<u32> {
        let mut req = Container::with_params(OC_GET_PARTIAL_OBJECT, &[handle, offset, size]);
        let rep = self.run_transaction(&mut req, Some(dest), None, 0)?;
        param(&rep, 0)
    }

    /// Announce an object. Returns the device's (storage id, parent handle,
    /// new object handle); the object data must follow via
    /// [`Self::send_object`] before most devices accept other operations.
    pub fn send_object_info(
        &mut self,
        storage_id: u32,
        parent: u32,
        info: &ObjectInfo,
    ) -> Result<(u32, u32, u32)> {
        let mut req = Container::with_params(OC_SEND_OBJECT_INFO, &[storage_id, parent]);
        let rep = self.send_data(&mut req, info)?;
        Ok((param(&rep, 0)?, param(&rep, 1)?, param(&rep, 2)?))
    }

    /// Send the object data announced by the preceding
    /// [`Self::send_object_info`].
    pub fn send_object(&mut self, src: &mut dyn Read, size: u64) -> Result<()> {
        let mut req = Container::new(OC_SEND_OBJECT);
        self.run_transaction(&mut req, None, Some(src), size).map(drop)
    }

    pub fn delete_object(&mut self, handle: u32) -> Result<()> {
        // Second parameter is the object format filter, 0 for "all".
        let mut req = Container::with_params(OC_DELETE_OBJECT, &[handle, 0]);
        self.run_transaction(&mut req, None, None, 0).map(drop)
    }

    pub fn get_device_prop_desc(&mut self, prop_code: u16) -> Result<DevicePropDesc> {
        self.get_data(&mut Container::with_params(
            OC_GET_DEVICE_PROP_DESC,
            &[u32::from(prop_code)],
        ))
    }

    pub fn get_device_prop_value<V: WireDecode>(&mut self, prop_code: u16) -> Result<V> {
        self.get_data(&mut Container::with_params(
            OC_GET_DEVICE_PROP_VALUE,
            &[u32::from(prop_code)],
        ))
    }

    pub fn set_device_prop_value<V: WireEncode>(&mut self, prop_code: u16, value: &V) -> Result<()> {
        let mut req = Container::with_params(OC_SET_DEVICE_PROP_VALUE, &[u32::from(prop_code)]);
        self.send_data(&mut req, value).map(drop)
    }

    pub fn reset_device_prop_value(&mut self, prop_code: u16) -> Result<()> {
        let mut req = Container::with_params(OC_RESET_DEVICE_PROP_VALUE, &[u32::from(prop_code)]);
        self.run_transaction(&mut req, None, None, 0).map(drop)
    }

    pub fn get_object_props_supported(&mut self, format_code: u16) -> Result<Vec<u16>> {
        let props: Uint16Array = self.get_data(&mut Container::with_params(
            OC_MTP_GET_OBJECT_PROPS_SUPPORTED,
            &[u32::from(format_code)],
        ))?;
        Ok(props.0)
    }

    pub fn get_object_prop_desc(
        &mut self,
        prop_code: u16,
        format_code: u16,
    ) -> Result<ObjectPropDesc> {
        self.get_data(&mut Container::with_params(
            OC_MTP_GET_OBJECT_PROP_DESC,
            &[u32::from(prop_code), u32::from(format_code)],
        ))
    }

    pub fn get_object_prop_value<V: WireDecode>(&mut self, handle: u32, prop_code: u16) -> Result<V> {
        self.get_data(&mut Container::with_params(
            OC_MTP_GET_OBJECT_PROP_VALUE,
            &[handle, u32::from(prop_code)],
        ))
    }

    pub fn set_object_prop_value<V: WireEncode>(
        &mut self,
        handle: u32,
        prop_code: u16,
        value: &V,
    ) -> Result<()> {
        let mut req = Container::with_params(
            OC_MTP_SET_OBJECT_PROP_VALUE,
            &[handle, u32::from(prop_code)],
        );
        self.send_data(&mut req, value).map(drop)
    }

    /// Android extension: read `size` bytes at a 64-bit offset. Returns the
    /// byte count the device reports.
    pub fn android_get_partial_object64(
        &mut self,
        handle: u32,
        offset: u64,
        size: u32,
        dest: &mut dyn Write,
    ) -> Result<u32> {
        let mut req = Container::with_params(
            OC_ANDROID_GET_PARTIAL_OBJECT64,
            &[handle, offset as u32, (offset >> 32) as u32, size],
        );
        let rep = self.run_transaction(&mut req, Some(dest), None, 0)?;
        param(&rep, 0)
    }

    /// Android extension: write `size` bytes at a 64-bit offset into an
    /// object opened for editing.
    pub fn android_send_partial_object(
        &mut self,
        handle: u32,
        offset: u64,
        size: u32,
        src: &mut dyn Read,
    ) -> Result<()> {
        let mut req = Container::with_params(
            OC_ANDROID_SEND_PARTIAL_OBJECT,
            &[handle, offset as u32, (offset >> 32) as u32, size],
        );
        self.run_transaction(&mut req, None, Some(src), u64::from(size))
            .map(drop)
    }

    pub fn android_truncate_object(&mut self, handle: u32, size: u64) -> Result<()> {
        let mut req = Container::with_params(
            OC_ANDROID_TRUNCATE_OBJECT,
            &[handle, size as u32, (size >> 32) as u32],
        );
        self.run_transaction(&mut req, None, None, 0).map(drop)
    }

    pub fn android_begin_edit_object(&mut self, handle: u32) -> Result<()> {
        let mut req = Container::with_params(OC_ANDROID_BEGIN_EDIT_OBJECT, &[handle]);
        self.run_transaction(&mut req, None, None, 0).map(drop)
    }

    /// Commit edits made through [`Self::android_send_partial_object`].
    pub fn android_end_edit_object(&mut self, handle: u32) -> Result<()> {
        let mut req = Container::with_params(OC_ANDROID_END_EDIT_OBJECT, &[handle]);
        self.run_transaction(&mut req, None, None, 0).map(drop)
    }
}

fn param(rep: &Container, index: usize) -> Result<u32> {
    rep.params.get(index).copied().ok_or_else(|| {
        EngineError::Sync(format!(
            "response carries {} parameters, needed at least {}",
            rep.params.len(),
            index + 1
        ))
    })
}
