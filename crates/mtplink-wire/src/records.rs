//! Records transferred in data phases.
//!
//! Field declaration order here is wire order; every impl encodes and
//! decodes fields in exactly the order they are declared.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::NaiveDateTime;

use crate::codec::{
    decode_datetime, decode_string, decode_u16_array, decode_u32_array, encode_datetime,
    encode_string, encode_u16_array, encode_u32_array, get_u16, get_u32, get_u64, WireDecode,
    WireEncode,
};
use crate::consts::{FST_GENERIC_HIERARCHICAL, ST_REMOVABLE_RAM, ST_REMOVABLE_ROM};
use crate::error::Result;

/// The DeviceInfo dataset returned by GetDeviceInfo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInfo {
    pub standard_version: u16,
    pub mtp_vendor_extension_id: u32,
    pub mtp_version: u16,
    pub mtp_extension: String,
    pub functional_mode: u16,
    pub operations_supported: Vec<u16>,
    pub events_supported: Vec<u16>,
    pub device_properties_supported: Vec<u16>,
    pub capture_formats: Vec<u16>,
    pub playback_formats: Vec<u16>,
    pub manufacturer: String,
    pub model: String,
    pub device_version: String,
    pub serial_number: String,
}

impl WireDecode for DeviceInfo {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            standard_version: get_u16(buf)?,
            mtp_vendor_extension_id: get_u32(buf)?,
            mtp_version: get_u16(buf)?,
            mtp_extension: decode_string(buf)?,
            functional_mode: get_u16(buf)?,
            operations_supported: decode_u16_array(buf)?,
            events_supported: decode_u16_array(buf)?,
            device_properties_supported: decode_u16_array(buf)?,
            capture_formats: decode_u16_array(buf)?,
            playback_formats: decode_u16_array(buf)?,
            manufacturer: decode_string(buf)?,
            model: decode_string(buf)?,
            device_version: decode_string(buf)?,
            serial_number: decode_string(buf)?,
        })
    }
}

impl WireEncode for DeviceInfo {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u16_le(self.standard_version);
        out.put_u32_le(self.mtp_vendor_extension_id);
        out.put_u16_le(self.mtp_version);
        encode_string(&self.mtp_extension, out)?;
        out.put_u16_le(self.functional_mode);
        encode_u16_array(&self.operations_supported, out)?;
        encode_u16_array(&self.events_supported, out)?;
        encode_u16_array(&self.device_properties_supported, out)?;
        encode_u16_array(&self.capture_formats, out)?;
        encode_u16_array(&self.playback_formats, out)?;
        encode_string(&self.manufacturer, out)?;
        encode_string(&self.model, out)?;
        encode_string(&self.device_version, out)?;
        encode_string(&self.serial_number, out)
    }
}

/// The StorageInfo dataset for one store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageInfo {
    pub storage_type: u16,
    pub filesystem_type: u16,
    pub access_capability: u16,
    pub max_capability: u64,
    pub free_space_in_bytes: u64,
    pub free_space_in_images: u32,
    pub storage_description: String,
    pub volume_label: String,
}

impl StorageInfo {
    pub fn is_hierarchical(&self) -> bool {
        self.filesystem_type == FST_GENERIC_HIERARCHICAL
    }

    pub fn is_removable(&self) -> bool {
        self.storage_type == ST_REMOVABLE_ROM || self.storage_type == ST_REMOVABLE_RAM
    }
}

impl WireDecode for StorageInfo {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            storage_type: get_u16(buf)?,
            filesystem_type: get_u16(buf)?,
            access_capability: get_u16(buf)?,
            max_capability: get_u64(buf)?,
            free_space_in_bytes: get_u64(buf)?,
            free_space_in_images: get_u32(buf)?,
            storage_description: decode_string(buf)?,
            volume_label: decode_string(buf)?,
        })
    }
}

impl WireEncode for StorageInfo {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u16_le(self.storage_type);
        out.put_u16_le(self.filesystem_type);
        out.put_u16_le(self.access_capability);
        out.put_u64_le(self.max_capability);
        out.put_u64_le(self.free_space_in_bytes);
        out.put_u32_le(self.free_space_in_images);
        encode_string(&self.storage_description, out)?;
        encode_string(&self.volume_label, out)
    }
}

/// The ObjectInfo dataset describing one object in a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectInfo {
    pub storage_id: u32,
    pub object_format: u16,
    pub protection_status: u16,
    pub compressed_size: u32,
    pub thumb_format: u16,
    pub thumb_compressed_size: u32,
    pub thumb_pix_width: u32,
    pub thumb_pix_height: u32,
    pub image_pix_width: u32,
    pub image_pix_height: u32,
    pub image_bit_depth: u32,
    pub parent_object: u32,
    pub association_type: u16,
    pub association_desc: u32,
    pub sequence_number: u32,
    pub filename: String,
    pub capture_date: Option<NaiveDateTime>,
    pub modification_date: Option<NaiveDateTime>,
    pub keywords: String,
}

impl WireDecode for ObjectInfo {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            storage_id: get_u32(buf)?,
            object_format: get_u16(buf)?,
            protection_status: get_u16(buf)?,
            compressed_size: get_u32(buf)?,
            thumb_format: get_u16(buf)?,
            thumb_compressed_size: get_u32(buf)?,
            thumb_pix_width: get_u32(buf)?,
            thumb_pix_height: get_u32(buf)?,
            image_pix_width: get_u32(buf)?,
            image_pix_height: get_u32(buf)?,
            image_bit_depth: get_u32(buf)?,
            parent_object: get_u32(buf)?,
            association_type: get_u16(buf)?,
            association_desc: get_u32(buf)?,
            sequence_number: get_u32(buf)?,
            filename: decode_string(buf)?,
            capture_date: decode_datetime(buf)?,
            modification_date: decode_datetime(buf)?,
            keywords: decode_string(buf)?,
        })
    }
}

impl WireEncode for ObjectInfo {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u32_le(self.storage_id);
        out.put_u16_le(self.object_format);
        out.put_u16_le(self.protection_status);
        out.put_u32_le(self.compressed_size);
        out.put_u16_le(self.thumb_format);
        out.put_u32_le(self.thumb_compressed_size);
        out.put_u32_le(self.thumb_pix_width);
        out.put_u32_le(self.thumb_pix_height);
        out.put_u32_le(self.image_pix_width);
        out.put_u32_le(self.image_pix_height);
        out.put_u32_le(self.image_bit_depth);
        out.put_u32_le(self.parent_object);
        out.put_u16_le(self.association_type);
        out.put_u32_le(self.association_desc);
        out.put_u32_le(self.sequence_number);
        encode_string(&self.filename, out)?;
        encode_datetime(self.capture_date, out)?;
        encode_datetime(self.modification_date, out)?;
        encode_string(&self.keywords, out)
    }
}

/// A bare array of 32-bit values (object handles, storage ids).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uint32Array(pub Vec<u32>);

impl WireDecode for Uint32Array {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self(decode_u32_array(buf)?))
    }
}

impl WireEncode for Uint32Array {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_u32_array(&self.0, out)
    }
}

/// A bare array of 16-bit values (operation or property codes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uint16Array(pub Vec<u16>);

impl WireDecode for Uint16Array {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self(decode_u16_array(buf)?))
    }
}

impl WireEncode for Uint16Array {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_u16_array(&self.0, out)
    }
}

/// A bare 64-bit scalar payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uint64Value(pub u64);

impl WireDecode for Uint64Value {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self(get_u64(buf)?))
    }
}

impl WireEncode for Uint64Value {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u64_le(self.0);
        Ok(())
    }
}

/// A bare string payload (friendly name and similar properties).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringValue(pub String);

impl WireDecode for StringValue {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self(decode_string(buf)?))
    }
}

impl WireEncode for StringValue {
    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_string(&self.0, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_record, encode_record};

    // Captured GetDeviceInfo payload from a Nexus 7.
    const DEVICE_INFO_HEX: &str = "6400 0600
0000 6400 266d 0069 0063 0072 006f 0073
006f 0066 0074 002e 0063 006f 006d 003a
0020 0031 002e 0030 003b 0020 0061 006e
0064 0072 006f 0069 0064 002e 0063 006f
006d 003a 0020 0031 002e 0030 003b 0000
0000 001e 0000 0001 1002 1003 1004 1005
1006 1007 1008 1009 100a 100b 100c 100d
1014 1015 1016 1017 101b 1001 9802 9803
9804 9805 9810 9811 98c1 95c2 95c3 95c4
95c5 9504 0000 0002 4003 4004 4005 4003
0000 0001 d402 d403 5000 0000 001a 0000
0000 3001 3004 3005 3008 3009 300b 3001
3802 3804 3807 3808 380b 380d 3801 b902
b903 b982 b983 b984 b905 ba10 ba11 ba14
ba82 ba06 b905 6100 7300 7500 7300 0000
084e 0065 0078 0075 0073 0020 0037 0000
0004 3100 2e00 3000 0000 1130 0031 0035
0064 0032 0035 0036 0038 0035 0038 0034
0038 0030 0032 0031 0062 0000 00";

    // Captured ObjectInfo payload for a "Music" association.
    const OBJECT_INFO_HEX: &str = "0100 0100
0130 0000 0010 0000 0000 0000 0000 0000
0000 0000 0000 0000 0000 0000 0000 0000
0000 0000 0000 0000 0000 0000 0000 0000
064d 0075 0073 0069 0063 0000 0000 1032
0030 0030 0030 0030 0031 0030 0031 0054
0031 0039 0031 0031 0033 0030 0000 0000";

    fn parse_hex(s: &str) -> Vec<u8> {
        let digits: String = s.chars().filter(|c| c.is_ascii_hexdigit()).collect();
        assert_eq!(digits.len() % 2, 0);
        digits
            .as_bytes()
            .chunks(2)
            .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
            .collect()
    }

    #[test]
    fn device_info_decodes_and_reencodes_captured_bytes() {
        let bin = parse_hex(DEVICE_INFO_HEX);
        let info: DeviceInfo = decode_record(Bytes::from(bin.clone())).unwrap();

        assert_eq!(info.standard_version, 100);
        assert_eq!(info.model, "Nexus 7");
        assert_eq!(info.manufacturer, "asus");
        assert!(info.operations_supported.contains(&0x1002));

        let reencoded = encode_record(&info).unwrap();
        assert_eq!(reencoded.as_ref(), bin.as_slice());
    }

    #[test]
    fn object_info_decodes_and_reencodes_captured_bytes() {
        let bin = parse_hex(OBJECT_INFO_HEX);
        let info: ObjectInfo = decode_record(Bytes::from(bin.clone())).unwrap();

        assert_eq!(info.filename, "Music");
        assert_eq!(info.object_format, crate::consts::OFC_ASSOCIATION);
        assert!(info.capture_date.is_none());
        assert!(info.modification_date.is_some());

        let reencoded = encode_record(&info).unwrap();
        assert_eq!(reencoded.as_ref(), bin.as_slice());
    }

    #[test]
    fn storage_info_roundtrip_and_predicates() {
        let info = StorageInfo {
            storage_type: ST_REMOVABLE_RAM,
            filesystem_type: FST_GENERIC_HIERARCHICAL,
            access_capability: 0,
            max_capability: 32 << 30,
            free_space_in_bytes: 10 << 30,
            free_space_in_images: 0xFFFF_FFFF,
            storage_description: "SD card".to_string(),
            volume_label: String::new(),
        };
        assert!(info.is_hierarchical());
        assert!(info.is_removable());

        let wire = encode_record(&info).unwrap();
        let back: StorageInfo = decode_record(wire).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn array_wrappers_roundtrip() {
        let handles = Uint32Array(vec![0x10, 0x11, 0x12]);
        let wire = encode_record(&handles).unwrap();
        let back: Uint32Array = decode_record(wire).unwrap();
        assert_eq!(back, handles);

        let props = Uint16Array(vec![0xDC01, 0xDC07]);
        let wire = encode_record(&props).unwrap();
        let back: Uint16Array = decode_record(wire).unwrap();
        assert_eq!(back, props);
    }

    #[test]
    fn scalar_wrappers_roundtrip() {
        let wire = encode_record(&Uint64Value(0x0102_0304_0506_0708)).unwrap();
        assert_eq!(wire.as_ref(), &[8, 7, 6, 5, 4, 3, 2, 1]);
        let back: Uint64Value = decode_record(wire).unwrap();
        assert_eq!(back.0, 0x0102_0304_0506_0708);

        let wire = encode_record(&StringValue("cam".to_string())).unwrap();
        let back: StringValue = decode_record(wire).unwrap();
        assert_eq!(back.0, "cam");
    }
}
