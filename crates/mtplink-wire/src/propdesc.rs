//! Device and object property descriptors.
//!
//! Descriptors are composite records: a fixed-shape prefix whose `DataType`
//! field selects the kind of the default/current values, followed by a form
//! whose shape depends on the form flag. The selector is decoded first and
//! threaded explicitly through every later variant field.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::codec::{get_u16, get_u32, get_u8, WireDecode, WireEncode};
use crate::consts::{DPFF_ENUMERATION, DPFF_NONE, DPFF_RANGE};
use crate::error::{Result, WireError};
use crate::value::{DataType, Value};

/// Constraint form attached to a property descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropDescForm {
    /// No constraint, or a form flag this codec does not know.
    None,
    /// Inclusive min/max with a step, all of the descriptor's data type.
    Range {
        minimum: Value,
        maximum: Value,
        step: Value,
    },
    /// An explicit list of allowed values.
    Enumeration(Vec<Value>),
}

impl PropDescForm {
    /// Decode the form selected by `form_flag`, using the descriptor's
    /// already-decoded data type for every variant value.
    ///
    /// Flags outside {None, Range, Enumeration} carry no form data.
    pub fn decode(buf: &mut Bytes, data_type: DataType, form_flag: u8) -> Result<Self> {
        match form_flag {
            DPFF_RANGE => Ok(PropDescForm::Range {
                minimum: Value::decode(buf, data_type)?,
                maximum: Value::decode(buf, data_type)?,
                step: Value::decode(buf, data_type)?,
            }),
            DPFF_ENUMERATION => {
                // Enumeration forms use a 2-byte element count, unlike
                // every other array on the wire.
                let len = get_u16(buf)? as usize;
                let mut values = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    values.push(Value::decode(buf, data_type)?);
                }
                Ok(PropDescForm::Enumeration(values))
            }
            DPFF_NONE => Ok(PropDescForm::None),
            other => {
                debug!(form_flag = other, "unknown property form flag, no form data");
                Ok(PropDescForm::None)
            }
        }
    }

    pub fn encode(&self, out: &mut BytesMut) -> Result<()> {
        match self {
            PropDescForm::None => Ok(()),
            PropDescForm::Range {
                minimum,
                maximum,
                step,
            } => {
                minimum.encode(out)?;
                maximum.encode(out)?;
                step.encode(out)
            }
            PropDescForm::Enumeration(values) => {
                let len = u16::try_from(values.len()).map_err(|_| WireError::ArrayTooLong {
                    len: values.len(),
                    max: u16::MAX as usize,
                })?;
                out.put_u16_le(len);
                for v in values {
                    v.encode(out)?;
                }
                Ok(())
            }
        }
    }
}

/// Descriptor of one device property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePropDesc {
    pub property_code: u16,
    pub data_type: DataType,
    pub get_set: u8,
    pub factory_default: Value,
    pub current: Value,
    pub form_flag: u8,
    pub form: PropDescForm,
}

impl WireDecode for DevicePropDesc {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        let property_code = get_u16(buf)?;
        let data_type = DataType::from_code(get_u16(buf)?)?;
        let get_set = get_u8(buf)?;
        let factory_default = Value::decode(buf, data_type)?;
        let current = Value::decode(buf, data_type)?;
        let form_flag = get_u8(buf)?;
        let form = PropDescForm::decode(buf, data_type, form_flag)?;
        Ok(Self {
            property_code,
            data_type,
            get_set,
            factory_default,
            current,
            form_flag,
            form,
        })
    }
}

impl WireEncode for DevicePropDesc {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u16_le(self.property_code);
        out.put_u16_le(self.data_type.code());
        out.put_u8(self.get_set);
        self.factory_default.encode(out)?;
        self.current.encode(out)?;
        out.put_u8(self.form_flag);
        self.form.encode(out)
    }
}

/// Descriptor of one object property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPropDesc {
    pub property_code: u16,
    pub data_type: DataType,
    pub get_set: u8,
    pub factory_default: Value,
    pub group_code: u32,
    pub form_flag: u8,
    pub form: PropDescForm,
}

impl WireDecode for ObjectPropDesc {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        let property_code = get_u16(buf)?;
        let data_type = DataType::from_code(get_u16(buf)?)?;
        let get_set = get_u8(buf)?;
        let factory_default = Value::decode(buf, data_type)?;
        let group_code = get_u32(buf)?;
        let form_flag = get_u8(buf)?;
        let form = PropDescForm::decode(buf, data_type, form_flag)?;
        Ok(Self {
            property_code,
            data_type,
            get_set,
            factory_default,
            group_code,
            form_flag,
            form,
        })
    }
}

impl WireEncode for ObjectPropDesc {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u16_le(self.property_code);
        out.put_u16_le(self.data_type.code());
        out.put_u8(self.get_set);
        self.factory_default.encode(out)?;
        out.put_u32_le(self.group_code);
        out.put_u8(self.form_flag);
        self.form.encode(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_record, encode_record};
    use crate::consts::{DPC_BATTERY_LEVEL, DPGS_GET_SET};

    #[test]
    fn battery_level_descriptor_roundtrips() {
        let desc = DevicePropDesc {
            property_code: DPC_BATTERY_LEVEL,
            data_type: DataType::Uint16,
            get_set: DPGS_GET_SET,
            factory_default: Value::Uint16(3),
            current: Value::Uint16(5),
            form_flag: DPFF_RANGE,
            form: PropDescForm::Range {
                minimum: Value::Uint16(1),
                maximum: Value::Uint16(11),
                step: Value::Uint16(2),
            },
        };

        let wire = encode_record(&desc).unwrap();
        let back: DevicePropDesc = decode_record(wire).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn selector_drives_value_widths() {
        // code, type=UINT16, get/set, default=3, current=5, range 1..=11 step 2
        let wire = encode_record(&DevicePropDesc {
            property_code: DPC_BATTERY_LEVEL,
            data_type: DataType::Uint16,
            get_set: DPGS_GET_SET,
            factory_default: Value::Uint16(3),
            current: Value::Uint16(5),
            form_flag: DPFF_RANGE,
            form: PropDescForm::Range {
                minimum: Value::Uint16(1),
                maximum: Value::Uint16(11),
                step: Value::Uint16(2),
            },
        })
        .unwrap();
        assert_eq!(
            wire.as_ref(),
            &[
                0x01, 0x50, // BatteryLevel
                0x04, 0x00, // UINT16
                0x01, // GetSet
                3, 0, // factory default
                5, 0, // current
                0x01, // Range
                1, 0, 11, 0, 2, 0,
            ]
        );
    }

    #[test]
    fn object_descriptor_enumeration_roundtrips() {
        let desc = ObjectPropDesc {
            property_code: 0xDC01,
            data_type: DataType::Uint16,
            get_set: DPGS_GET_SET,
            factory_default: Value::Uint16(3),
            group_code: 0x21,
            form_flag: DPFF_ENUMERATION,
            form: PropDescForm::Enumeration(vec![
                Value::Uint16(1),
                Value::Uint16(11),
                Value::Uint16(2),
            ]),
        };

        let wire = encode_record(&desc).unwrap();
        let back: ObjectPropDesc = decode_record(wire).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn enumeration_count_prefix_is_two_bytes() {
        let form = PropDescForm::Enumeration(vec![Value::Uint8(7), Value::Uint8(9)]);
        let mut out = BytesMut::new();
        form.encode(&mut out).unwrap();
        assert_eq!(out.as_ref(), &[2, 0, 7, 9]);
    }

    #[test]
    fn string_typed_descriptor_roundtrips() {
        let desc = DevicePropDesc {
            property_code: 0xD402,
            data_type: DataType::Str,
            get_set: DPGS_GET_SET,
            factory_default: Value::Str(String::new()),
            current: Value::Str("Living room cam".to_string()),
            form_flag: DPFF_NONE,
            form: PropDescForm::None,
        };
        let wire = encode_record(&desc).unwrap();
        let back: DevicePropDesc = decode_record(wire).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn unknown_form_flag_preserved_with_no_form_data() {
        let desc = DevicePropDesc {
            property_code: DPC_BATTERY_LEVEL,
            data_type: DataType::Uint8,
            get_set: DPGS_GET_SET,
            factory_default: Value::Uint8(0),
            current: Value::Uint8(50),
            form_flag: 0x05,
            form: PropDescForm::None,
        };
        let wire = encode_record(&desc).unwrap();
        let back: DevicePropDesc = decode_record(wire.clone()).unwrap();
        assert_eq!(back, desc);
        assert_eq!(encode_record(&back).unwrap(), wire);
    }

    #[test]
    fn unsupported_data_type_fails_decode() {
        // property code, then the reserved type code 0x000B
        let wire = Bytes::from_static(&[0x01, 0x50, 0x0B, 0x00, 0x01]);
        let result: Result<DevicePropDesc> = decode_record(wire);
        assert!(matches!(result, Err(WireError::UnsupportedType(0x000B))));
    }
}
