//! Protocol constants: operation, response, and container-type codes,
//! data-type selectors, and property-descriptor flags.
//!
//! Numeric values are fixed by the PTP (ISO 15740) and MTP specifications
//! and must match the device side bit-exactly.

use std::fmt;

// Container types carried in the bulk packet header.
pub const CONTAINER_UNDEFINED: u16 = 0x0000;
pub const CONTAINER_COMMAND: u16 = 0x0001;
pub const CONTAINER_DATA: u16 = 0x0002;
pub const CONTAINER_RESPONSE: u16 = 0x0003;
pub const CONTAINER_EVENT: u16 = 0x0004;

/// Symbolic name of a container type code.
pub fn container_type_name(kind: u16) -> Option<&'static str> {
    Some(match kind {
        CONTAINER_UNDEFINED => "UNDEFINED",
        CONTAINER_COMMAND => "COMMAND",
        CONTAINER_DATA => "DATA",
        CONTAINER_RESPONSE => "RESPONSE",
        CONTAINER_EVENT => "EVENT",
        _ => return None,
    })
}

// Standard PTP operation codes.
pub const OC_GET_DEVICE_INFO: u16 = 0x1001;
pub const OC_OPEN_SESSION: u16 = 0x1002;
pub const OC_CLOSE_SESSION: u16 = 0x1003;
pub const OC_GET_STORAGE_IDS: u16 = 0x1004;
pub const OC_GET_STORAGE_INFO: u16 = 0x1005;
pub const OC_GET_NUM_OBJECTS: u16 = 0x1006;
pub const OC_GET_OBJECT_HANDLES: u16 = 0x1007;
pub const OC_GET_OBJECT_INFO: u16 = 0x1008;
pub const OC_GET_OBJECT: u16 = 0x1009;
pub const OC_GET_THUMB: u16 = 0x100A;
pub const OC_DELETE_OBJECT: u16 = 0x100B;
pub const OC_SEND_OBJECT_INFO: u16 = 0x100C;
pub const OC_SEND_OBJECT: u16 = 0x100D;
pub const OC_GET_DEVICE_PROP_DESC: u16 = 0x1014;
pub const OC_GET_DEVICE_PROP_VALUE: u16 = 0x1015;
pub const OC_SET_DEVICE_PROP_VALUE: u16 = 0x1016;
pub const OC_RESET_DEVICE_PROP_VALUE: u16 = 0x1017;
pub const OC_GET_PARTIAL_OBJECT: u16 = 0x101B;

// MTP extension operation codes.
pub const OC_MTP_GET_OBJECT_PROPS_SUPPORTED: u16 = 0x9801;
pub const OC_MTP_GET_OBJECT_PROP_DESC: u16 = 0x9802;
pub const OC_MTP_GET_OBJECT_PROP_VALUE: u16 = 0x9803;
pub const OC_MTP_SET_OBJECT_PROP_VALUE: u16 = 0x9804;

// Android direct-I/O extension operation codes.
pub const OC_ANDROID_GET_PARTIAL_OBJECT64: u16 = 0x95C1;
pub const OC_ANDROID_SEND_PARTIAL_OBJECT: u16 = 0x95C2;
pub const OC_ANDROID_TRUNCATE_OBJECT: u16 = 0x95C3;
pub const OC_ANDROID_BEGIN_EDIT_OBJECT: u16 = 0x95C4;
pub const OC_ANDROID_END_EDIT_OBJECT: u16 = 0x95C5;

/// Symbolic name of an operation code, if it is one this crate knows.
pub fn operation_name(code: u16) -> Option<&'static str> {
    Some(match code {
        OC_GET_DEVICE_INFO => "GetDeviceInfo",
        OC_OPEN_SESSION => "OpenSession",
        OC_CLOSE_SESSION => "CloseSession",
        OC_GET_STORAGE_IDS => "GetStorageIDs",
        OC_GET_STORAGE_INFO => "GetStorageInfo",
        OC_GET_NUM_OBJECTS => "GetNumObjects",
        OC_GET_OBJECT_HANDLES => "GetObjectHandles",
        OC_GET_OBJECT_INFO => "GetObjectInfo",
        OC_GET_OBJECT => "GetObject",
        OC_GET_THUMB => "GetThumb",
        OC_DELETE_OBJECT => "DeleteObject",
        OC_SEND_OBJECT_INFO => "SendObjectInfo",
        OC_SEND_OBJECT => "SendObject",
        OC_GET_DEVICE_PROP_DESC => "GetDevicePropDesc",
        OC_GET_DEVICE_PROP_VALUE => "GetDevicePropValue",
        OC_SET_DEVICE_PROP_VALUE => "SetDevicePropValue",
        OC_RESET_DEVICE_PROP_VALUE => "ResetDevicePropValue",
        OC_GET_PARTIAL_OBJECT => "GetPartialObject",
        OC_MTP_GET_OBJECT_PROPS_SUPPORTED => "GetObjectPropsSupported",
        OC_MTP_GET_OBJECT_PROP_DESC => "GetObjectPropDesc",
        OC_MTP_GET_OBJECT_PROP_VALUE => "GetObjectPropValue",
        OC_MTP_SET_OBJECT_PROP_VALUE => "SetObjectPropValue",
        OC_ANDROID_GET_PARTIAL_OBJECT64 => "AndroidGetPartialObject64",
        OC_ANDROID_SEND_PARTIAL_OBJECT => "AndroidSendPartialObject",
        OC_ANDROID_TRUNCATE_OBJECT => "AndroidTruncateObject",
        OC_ANDROID_BEGIN_EDIT_OBJECT => "AndroidBeginEditObject",
        OC_ANDROID_END_EDIT_OBJECT => "AndroidEndEditObject",
        _ => return None,
    })
}

/// Operation name for log output; unknown codes render as hex.
pub fn operation_label(code: u16) -> String {
    match operation_name(code) {
        Some(name) => name.to_string(),
        None => format!("Operation 0x{code:04x}"),
    }
}

// Response codes.
pub const RC_OK: u16 = 0x2001;
pub const RC_GENERAL_ERROR: u16 = 0x2002;
pub const RC_SESSION_NOT_OPEN: u16 = 0x2003;
pub const RC_INVALID_TRANSACTION_ID: u16 = 0x2004;
pub const RC_OPERATION_NOT_SUPPORTED: u16 = 0x2005;
pub const RC_PARAMETER_NOT_SUPPORTED: u16 = 0x2006;
pub const RC_INCOMPLETE_TRANSFER: u16 = 0x2007;
pub const RC_INVALID_STORAGE_ID: u16 = 0x2008;
pub const RC_INVALID_OBJECT_HANDLE: u16 = 0x2009;
pub const RC_DEVICE_PROP_NOT_SUPPORTED: u16 = 0x200A;
pub const RC_INVALID_OBJECT_FORMAT_CODE: u16 = 0x200B;
pub const RC_STORE_FULL: u16 = 0x200C;
pub const RC_OBJECT_WRITE_PROTECTED: u16 = 0x200D;
pub const RC_STORE_READ_ONLY: u16 = 0x200E;
pub const RC_ACCESS_DENIED: u16 = 0x200F;
pub const RC_SELF_TEST_FAILED: u16 = 0x2011;
pub const RC_PARTIAL_DELETION: u16 = 0x2012;
pub const RC_STORE_NOT_AVAILABLE: u16 = 0x2013;
pub const RC_SPECIFICATION_BY_FORMAT_UNSUPPORTED: u16 = 0x2014;
pub const RC_NO_VALID_OBJECT_INFO: u16 = 0x2015;
pub const RC_INVALID_CODE_FORMAT: u16 = 0x2016;
pub const RC_UNKNOWN_VENDOR_CODE: u16 = 0x2017;
pub const RC_CAPTURE_ALREADY_TERMINATED: u16 = 0x2018;
pub const RC_DEVICE_BUSY: u16 = 0x2019;
pub const RC_INVALID_PARENT_OBJECT: u16 = 0x201A;
pub const RC_INVALID_DEVICE_PROP_FORMAT: u16 = 0x201B;
pub const RC_INVALID_DEVICE_PROP_VALUE: u16 = 0x201C;
pub const RC_INVALID_PARAMETER: u16 = 0x201D;
pub const RC_SESSION_ALREADY_OPENED: u16 = 0x201E;
pub const RC_TRANSACTION_CANCELLED: u16 = 0x201F;

/// A device-reported return code from the response container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseCode(pub u16);

impl ResponseCode {
    pub fn is_ok(self) -> bool {
        self.0 == RC_OK
    }

    /// Symbolic name, if the code is one this crate knows.
    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            RC_OK => "OK",
            RC_GENERAL_ERROR => "GeneralError",
            RC_SESSION_NOT_OPEN => "SessionNotOpen",
            RC_INVALID_TRANSACTION_ID => "InvalidTransactionID",
            RC_OPERATION_NOT_SUPPORTED => "OperationNotSupported",
            RC_PARAMETER_NOT_SUPPORTED => "ParameterNotSupported",
            RC_INCOMPLETE_TRANSFER => "IncompleteTransfer",
            RC_INVALID_STORAGE_ID => "InvalidStorageID",
            RC_INVALID_OBJECT_HANDLE => "InvalidObjectHandle",
            RC_DEVICE_PROP_NOT_SUPPORTED => "DevicePropNotSupported",
            RC_INVALID_OBJECT_FORMAT_CODE => "InvalidObjectFormatCode",
            RC_STORE_FULL => "StoreFull",
            RC_OBJECT_WRITE_PROTECTED => "ObjectWriteProtected",
            RC_STORE_READ_ONLY => "StoreReadOnly",
            RC_ACCESS_DENIED => "AccessDenied",
            RC_SELF_TEST_FAILED => "SelfTestFailed",
            RC_PARTIAL_DELETION => "PartialDeletion",
            RC_STORE_NOT_AVAILABLE => "StoreNotAvailable",
            RC_SPECIFICATION_BY_FORMAT_UNSUPPORTED => "SpecificationByFormatUnsupported",
            RC_NO_VALID_OBJECT_INFO => "NoValidObjectInfo",
            RC_INVALID_CODE_FORMAT => "InvalidCodeFormat",
            RC_UNKNOWN_VENDOR_CODE => "UnknownVendorCode",
            RC_CAPTURE_ALREADY_TERMINATED => "CaptureAlreadyTerminated",
            RC_DEVICE_BUSY => "DeviceBusy",
            RC_INVALID_PARENT_OBJECT => "InvalidParentObject",
            RC_INVALID_DEVICE_PROP_FORMAT => "InvalidDevicePropFormat",
            RC_INVALID_DEVICE_PROP_VALUE => "InvalidDevicePropValue",
            RC_INVALID_PARAMETER => "InvalidParameter",
            RC_SESSION_ALREADY_OPENED => "SessionAlreadyOpened",
            RC_TRANSACTION_CANCELLED => "TransactionCancelled",
            _ => return None,
        })
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "RetCode 0x{:04x}", self.0),
        }
    }
}

// Data type codes used as variant selectors.
pub const DTC_UNDEF: u16 = 0x0000;
pub const DTC_INT8: u16 = 0x0001;
pub const DTC_UINT8: u16 = 0x0002;
pub const DTC_INT16: u16 = 0x0003;
pub const DTC_UINT16: u16 = 0x0004;
pub const DTC_INT32: u16 = 0x0005;
pub const DTC_UINT32: u16 = 0x0006;
pub const DTC_INT64: u16 = 0x0007;
pub const DTC_UINT64: u16 = 0x0008;
pub const DTC_INT128: u16 = 0x0009;
pub const DTC_UINT128: u16 = 0x000A;
pub const DTC_ARRAY_MASK: u16 = 0x4000;
pub const DTC_STR: u16 = 0xFFFF;

// Property-descriptor form flags.
pub const DPFF_NONE: u8 = 0x00;
pub const DPFF_RANGE: u8 = 0x01;
pub const DPFF_ENUMERATION: u8 = 0x02;

// Property get/set capability.
pub const DPGS_GET: u8 = 0x00;
pub const DPGS_GET_SET: u8 = 0x01;

// Device property codes (the ones the engine and its tests touch).
pub const DPC_BATTERY_LEVEL: u16 = 0x5001;
pub const DPC_DEVICE_FRIENDLY_NAME: u16 = 0xD402;

// Storage types.
pub const ST_UNDEFINED: u16 = 0x0000;
pub const ST_FIXED_ROM: u16 = 0x0001;
pub const ST_REMOVABLE_ROM: u16 = 0x0002;
pub const ST_FIXED_RAM: u16 = 0x0003;
pub const ST_REMOVABLE_RAM: u16 = 0x0004;

// Filesystem types.
pub const FST_UNDEFINED: u16 = 0x0000;
pub const FST_GENERIC_FLAT: u16 = 0x0001;
pub const FST_GENERIC_HIERARCHICAL: u16 = 0x0002;
pub const FST_DCF: u16 = 0x0003;

// Association (directory) handling.
pub const OFC_ASSOCIATION: u16 = 0x3001;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_code_display() {
        assert_eq!(ResponseCode(RC_OK).to_string(), "OK");
        assert_eq!(
            ResponseCode(RC_SESSION_ALREADY_OPENED).to_string(),
            "SessionAlreadyOpened"
        );
        assert_eq!(ResponseCode(0xA801).to_string(), "RetCode 0xa801");
    }

    #[test]
    fn operation_labels() {
        assert_eq!(operation_label(OC_OPEN_SESSION), "OpenSession");
        assert_eq!(operation_label(0x9101), "Operation 0x9101");
    }
}
