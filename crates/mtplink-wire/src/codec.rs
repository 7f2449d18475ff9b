//! Field-level codec primitives.
//!
//! MTP records are self-describing only in the sense that every field kind
//! has a fixed wire shape; there is no tag/length framing between fields.
//! Records encode and decode field by field, in declared order, which makes
//! the order load-bearing: variant fields depend on a selector decoded
//! earlier in the same record (see [`crate::value`]).
//!
//! Wire shapes:
//! - integers: little-endian at natural width
//! - strings: 1-byte UTF-16 code-unit count (incl. trailing NUL), then that
//!   many LE code units; count 0 is the empty string with no further bytes
//! - arrays: 4-byte LE element count, then fixed-width elements
//! - timestamps: a string in `YYYYMMDDThhmmss`; unset encodes as empty

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, NaiveDateTime};

use crate::error::{Result, WireError};

/// Maximum UTF-16 code units in a wire string, including the trailing NUL.
pub const MAX_STRING_UNITS: usize = 254;

const TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const TIME_FORMAT_NUM_TZ: &str = "%Y%m%dT%H%M%S%z";

/// A record that encodes itself field by field.
pub trait WireEncode {
    fn encode(&self, out: &mut BytesMut) -> Result<()>;
}

/// A record that decodes itself field by field.
pub trait WireDecode: Sized {
    fn decode(buf: &mut Bytes) -> Result<Self>;
}

/// Encode a record into a fresh buffer.
pub fn encode_record(record: &impl WireEncode) -> Result<Bytes> {
    let mut out = BytesMut::new();
    record.encode(&mut out)?;
    Ok(out.freeze())
}

/// Decode a record from a captured payload.
///
/// Trailing bytes are ignored; devices routinely pad data phases.
pub fn decode_record<T: WireDecode>(mut buf: Bytes) -> Result<T> {
    T::decode(&mut buf)
}

pub(crate) fn ensure(buf: &Bytes, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(WireError::Truncated {
            needed: needed - buf.remaining(),
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub fn get_u8(buf: &mut Bytes) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn get_u16(buf: &mut Bytes) -> Result<u16> {
    ensure(buf, 2)?;
    Ok(buf.get_u16_le())
}

pub fn get_u32(buf: &mut Bytes) -> Result<u32> {
    ensure(buf, 4)?;
    Ok(buf.get_u32_le())
}

pub fn get_u64(buf: &mut Bytes) -> Result<u64> {
    ensure(buf, 8)?;
    Ok(buf.get_u64_le())
}

pub fn get_u128(buf: &mut Bytes) -> Result<u128> {
    ensure(buf, 16)?;
    Ok(buf.get_u128_le())
}

pub fn get_i8(buf: &mut Bytes) -> Result<i8> {
    ensure(buf, 1)?;
    Ok(buf.get_i8())
}

pub fn get_i16(buf: &mut Bytes) -> Result<i16> {
    ensure(buf, 2)?;
    Ok(buf.get_i16_le())
}

pub fn get_i32(buf: &mut Bytes) -> Result<i32> {
    ensure(buf, 4)?;
    Ok(buf.get_i32_le())
}

pub fn get_i64(buf: &mut Bytes) -> Result<i64> {
    ensure(buf, 8)?;
    Ok(buf.get_i64_le())
}

pub fn get_i128(buf: &mut Bytes) -> Result<i128> {
    ensure(buf, 16)?;
    Ok(buf.get_i128_le())
}

/// Decode a UTF-16 Pascal string.
///
/// The count byte is the number of code units including the trailing NUL;
/// the NUL is stripped if present. Lone surrogates decode lossily rather
/// than failing, since real devices emit them.
pub fn decode_string(buf: &mut Bytes) -> Result<String> {
    let count = get_u8(buf)? as usize;
    if count == 0 {
        return Ok(String::new());
    }
    ensure(buf, 2 * count)?;
    let mut units = Vec::with_capacity(count);
    for _ in 0..count {
        units.push(buf.get_u16_le());
    }
    if units.last() == Some(&0) {
        units.pop();
    }
    Ok(String::from_utf16_lossy(&units))
}

/// Encode a UTF-16 Pascal string. Empty strings encode as a single zero byte.
pub fn encode_string(s: &str, out: &mut BytesMut) -> Result<()> {
    if s.is_empty() {
        out.put_u8(0);
        return Ok(());
    }
    let units = s.encode_utf16().count() + 1; // trailing NUL
    if units > MAX_STRING_UNITS {
        return Err(WireError::StringTooLong(units));
    }
    out.put_u8(units as u8);
    for unit in s.encode_utf16() {
        out.put_u16_le(unit);
    }
    out.put_u16_le(0);
    Ok(())
}

/// Decode a string-encoded timestamp; `None` means unset.
///
/// Accepts the base `YYYYMMDDThhmmss` format with a tolerated trailing `.`
/// (Samsung) or `Z` (some Nokias), falling back to the numeric-timezone
/// form `YYYYMMDDThhmmss±hhmm` (Nokia Lumia).
pub fn decode_datetime(buf: &mut Bytes) -> Result<Option<NaiveDateTime>> {
    let s = decode_string(buf)?;
    if s.is_empty() {
        return Ok(None);
    }
    let trimmed = s.trim_end_matches(['.', 'Z']);
    if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, TIME_FORMAT) {
        return Ok(Some(t));
    }
    match DateTime::parse_from_str(trimmed, TIME_FORMAT_NUM_TZ) {
        Ok(t) => Ok(Some(t.naive_local())),
        Err(_) => Err(WireError::BadTimestamp(s)),
    }
}

/// Encode a timestamp as its wire string; `None` encodes as empty.
pub fn encode_datetime(t: Option<NaiveDateTime>, out: &mut BytesMut) -> Result<()> {
    match t {
        Some(t) => encode_string(&t.format(TIME_FORMAT).to_string(), out),
        None => encode_string("", out),
    }
}

pub fn decode_u16_array(buf: &mut Bytes) -> Result<Vec<u16>> {
    let len = get_u32(buf)? as usize;
    ensure(buf, 2 * len)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(buf.get_u16_le());
    }
    Ok(out)
}

pub fn encode_u16_array(values: &[u16], out: &mut BytesMut) -> Result<()> {
    let len = u32::try_from(values.len()).map_err(|_| WireError::ArrayTooLong {
        len: values.len(),
        max: u32::MAX as usize,
    })?;
    out.put_u32_le(len);
    for v in values {
        out.put_u16_le(*v);
    }
    Ok(())
}

pub fn decode_u32_array(buf: &mut Bytes) -> Result<Vec<u32>> {
    let len = get_u32(buf)? as usize;
    ensure(buf, 4 * len)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(buf.get_u32_le());
    }
    Ok(out)
}

pub fn encode_u32_array(values: &[u32], out: &mut BytesMut) -> Result<()> {
    let len = u32::try_from(values.len()).map_err(|_| WireError::ArrayTooLong {
        len: values.len(),
        max: u32::MAX as usize,
    })?;
    out.put_u32_le(len);
    for v in values {
        out.put_u32_le(*v);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roundtrip_string(s: &str) -> Bytes {
        let mut out = BytesMut::new();
        encode_string(s, &mut out).unwrap();
        let wire = out.freeze();
        let mut buf = wire.clone();
        assert_eq!(decode_string(&mut buf).unwrap(), s);
        assert!(buf.is_empty());
        wire
    }

    #[test]
    fn string_roundtrip() {
        roundtrip_string("Nexus 7");
        roundtrip_string("møøse");
        roundtrip_string("日本語");
    }

    #[test]
    fn empty_string_is_single_zero_byte() {
        let wire = roundtrip_string("");
        assert_eq!(wire.as_ref(), &[0u8]);
    }

    #[test]
    fn string_count_includes_trailing_nul() {
        let wire = roundtrip_string("ab");
        assert_eq!(wire.as_ref(), &[3, b'a', 0, b'b', 0, 0, 0]);
    }

    #[test]
    fn overlong_string_rejected() {
        let s = "x".repeat(254);
        let mut out = BytesMut::new();
        assert!(matches!(
            encode_string(&s, &mut out),
            Err(WireError::StringTooLong(255))
        ));
    }

    #[test]
    fn longest_legal_string_roundtrips() {
        roundtrip_string(&"y".repeat(253));
    }

    #[test]
    fn truncated_string_reports_shortfall() {
        let mut buf = Bytes::from_static(&[4, b'a', 0]);
        assert!(matches!(
            decode_string(&mut buf),
            Err(WireError::Truncated { .. })
        ));
    }

    #[test]
    fn datetime_roundtrip() {
        let t = NaiveDate::from_ymd_opt(2012, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 22)
            .unwrap();
        let mut out = BytesMut::new();
        encode_datetime(Some(t), &mut out).unwrap();
        let mut buf = out.freeze();
        assert_eq!(decode_datetime(&mut buf).unwrap(), Some(t));
    }

    #[test]
    fn datetime_tolerates_vendor_suffixes() {
        let expect = NaiveDate::from_ymd_opt(2012, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 22)
            .unwrap();
        for raw in ["20120101T010022.", "20120101T010022Z", "20120101T010022"] {
            let mut out = BytesMut::new();
            encode_string(raw, &mut out).unwrap();
            let mut buf = out.freeze();
            assert_eq!(decode_datetime(&mut buf).unwrap(), Some(expect), "{raw}");
        }
    }

    #[test]
    fn datetime_numeric_timezone_fallback() {
        let mut out = BytesMut::new();
        encode_string("20120101T010022+0300", &mut out).unwrap();
        let mut buf = out.freeze();
        let t = decode_datetime(&mut buf).unwrap().unwrap();
        // Wall time in the stated offset is what re-encodes.
        assert_eq!(t.format("%Y%m%dT%H%M%S").to_string(), "20120101T010022");
    }

    #[test]
    fn unset_datetime_is_empty_string() {
        let mut out = BytesMut::new();
        encode_datetime(None, &mut out).unwrap();
        assert_eq!(out.as_ref(), &[0u8]);
        let mut buf = out.freeze();
        assert_eq!(decode_datetime(&mut buf).unwrap(), None);
    }

    #[test]
    fn garbage_datetime_rejected() {
        let mut out = BytesMut::new();
        encode_string("yesterday", &mut out).unwrap();
        let mut buf = out.freeze();
        assert!(matches!(
            decode_datetime(&mut buf),
            Err(WireError::BadTimestamp(_))
        ));
    }

    #[test]
    fn u32_array_roundtrip() {
        let values = vec![1u32, 0xDEAD_BEEF, 0];
        let mut out = BytesMut::new();
        encode_u32_array(&values, &mut out).unwrap();
        let mut buf = out.freeze();
        assert_eq!(decode_u32_array(&mut buf).unwrap(), values);
        assert!(buf.is_empty());
    }

    #[test]
    fn u16_array_roundtrip_and_prefix_width() {
        let values = vec![0x1001u16, 0x1002];
        let mut out = BytesMut::new();
        encode_u16_array(&values, &mut out).unwrap();
        assert_eq!(out.as_ref(), &[2, 0, 0, 0, 0x01, 0x10, 0x02, 0x10]);
        let mut buf = out.freeze();
        assert_eq!(decode_u16_array(&mut buf).unwrap(), values);
    }

    #[test]
    fn array_claiming_more_than_available_is_truncated() {
        let mut buf = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0x0F, 1, 2, 3]);
        assert!(matches!(
            decode_u32_array(&mut buf),
            Err(WireError::Truncated { .. })
        ));
    }
}
