//! `Element`: one slot of a logical tuple, and the kind-byte dispatch that
//! makes heterogeneous tuples order-preserving (spec §3, §4.2.4-4.2.6).
//!
//! Kind bytes are assigned in the order spec §3 requires elements of
//! different kinds to sort: `NULL < negative integers < non-negative
//! integers < negative timestamps < non-negative timestamps < bool
//! < blobs < text < uuids`. Every kind byte is `< 0x80` so it can never be
//! confused with an escaped string-payload byte (spec §4.2.2), and `SEP`
//! (used between tuples in a batch) sorts below every element kind.
//! `Bool` is a single kind tag carrying a one-byte payload (`0x00`/`0x01`,
//! per spec §4.2.4) rather than two separate `True`/`False` tags — `false`
//! still sorts below `true` since `0x00 < 0x01`.

use bytes::Bytes;
use uuid::Uuid;

use crate::buffer::{Reader, Writer};
use crate::error::{Result, TupleError};
use crate::strcode;
use crate::timestamp::Timestamp;
use crate::varint;

/// Separates consecutive tuples inside a packed batch (spec §4.4). Sorts
/// below every element kind so a shorter tuple is always a prefix-ordered
/// predecessor of any tuple that extends it.
pub const SEP: u8 = 0x00;

/// Kind tag bytes, in ascending sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Kind {
    Null = 0x01,
    NegInteger = 0x02,
    Integer = 0x03,
    NegTime = 0x04,
    Time = 0x05,
    Bool = 0x06,
    Blob = 0x07,
    Text = 0x08,
    Uuid = 0x09,
}

impl Kind {
    fn from_byte(b: u8) -> Result<Self> {
        Ok(match b {
            0x01 => Kind::Null,
            0x02 => Kind::NegInteger,
            0x03 => Kind::Integer,
            0x04 => Kind::NegTime,
            0x05 => Kind::Time,
            0x06 => Kind::Bool,
            0x07 => Kind::Blob,
            0x08 => Kind::Text,
            0x09 => Kind::Uuid,
            other => return Err(TupleError::Malformed { reason: format!("unrecognized kind byte {other:#x}") }),
        })
    }
}

/// One logical value inside a tuple.
///
/// Integers are held as `i128` so the full dual-sign range of the packed
/// `u64` magnitude representation (spec §4.2.1) round-trips without a
/// separate widening type: both `i64::MIN` and `u64::MAX` fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Null,
    Int(i128),
    Bool(bool),
    Time(Timestamp),
    Blob(Bytes),
    Text(String),
    Uuid(Uuid),
}

impl Element {
    /// The kind byte this element encodes as, without materializing the
    /// rest of the encoding.
    pub fn kind(&self) -> Kind {
        match self {
            Element::Null => Kind::Null,
            Element::Int(v) if *v < 0 => Kind::NegInteger,
            Element::Int(_) => Kind::Integer,
            Element::Bool(_) => Kind::Bool,
            Element::Time(t) if t.epoch_millis() < 0 => Kind::NegTime,
            Element::Time(_) => Kind::Time,
            Element::Blob(_) => Kind::Blob,
            Element::Text(_) => Kind::Text,
            Element::Uuid(_) => Kind::Uuid,
        }
    }

    /// Encodes this element's kind byte and payload.
    pub fn encode(&self, w: &mut Writer) -> Result<()> {
        w.put_byte(self.kind() as u8);
        match self {
            Element::Null => {}
            Element::Int(v) => encode_integer(w, *v)?,
            Element::Bool(b) => w.put_byte(u8::from(*b)),
            Element::Time(t) => encode_time(w, *t)?,
            Element::Blob(b) => strcode::encode(w, b),
            Element::Text(s) => strcode::encode(w, s.as_bytes()),
            Element::Uuid(u) => w.put_bytes(u.as_bytes()),
        }
        Ok(())
    }

    /// Decodes one element, including its leading kind byte.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let kind = Kind::from_byte(r.get_byte()?)?;
        Ok(match kind {
            Kind::Null => Element::Null,
            Kind::NegInteger => Element::Int(-(i128::from(varint::decode_magnitude(r, 0xff)?))),
            Kind::Integer => Element::Int(i128::from(varint::decode_magnitude(r, 0)?)),
            Kind::NegTime => Element::Time(decode_time(r, 0xff)?),
            Kind::Time => Element::Time(decode_time(r, 0)?),
            Kind::Bool => {
                let b = r.get_byte()?;
                match b {
                    0x00 => Element::Bool(false),
                    0x01 => Element::Bool(true),
                    other => {
                        return Err(TupleError::Malformed { reason: format!("bool payload byte {other:#x} is neither 0x00 nor 0x01") });
                    }
                }
            }
            Kind::Blob => Element::Blob(Bytes::from(strcode::decode(r)?)),
            Kind::Text => {
                let bytes = strcode::decode(r)?;
                Element::Text(String::from_utf8(bytes).map_err(|e| TupleError::Malformed {
                    reason: format!("text element is not valid UTF-8: {e}"),
                })?)
            }
            Kind::Uuid => {
                let bytes = r.get_bytes(16)?;
                Element::Uuid(Uuid::from_slice(bytes).expect("exactly 16 bytes"))
            }
        })
    }

    /// Skips one element (kind byte plus payload) without materializing it.
    pub fn skip(r: &mut Reader<'_>) -> Result<()> {
        let kind = Kind::from_byte(r.get_byte()?)?;
        match kind {
            Kind::Null => {}
            Kind::Bool => r.advance(1)?,
            Kind::NegInteger | Kind::NegTime => varint::skip_magnitude(r, 0xff)?,
            Kind::Integer | Kind::Time => varint::skip_magnitude(r, 0)?,
            Kind::Blob | Kind::Text => strcode::skip(r)?,
            Kind::Uuid => r.advance(16)?,
        }
        Ok(())
    }
}

fn encode_integer(w: &mut Writer, v: i128) -> Result<()> {
    let magnitude = v.unsigned_abs();
    let magnitude: u64 = magnitude.try_into().map_err(|_| TupleError::UnsupportedType {
        reason: format!("integer magnitude {magnitude} exceeds the representable range"),
    })?;
    varint::encode_magnitude(w, magnitude, if v < 0 { 0xff } else { 0 });
    Ok(())
}

fn encode_time(w: &mut Writer, t: Timestamp) -> Result<()> {
    let packed = t.pack().ok_or_else(|| TupleError::UnsupportedType {
        reason: "timestamp millisecond count does not fit the packed representation".to_string(),
    })?;
    if packed < 0 {
        varint::encode_magnitude(w, (-packed) as u64, 0xff);
    } else {
        varint::encode_magnitude(w, packed as u64, 0);
    }
    Ok(())
}

fn decode_time(r: &mut Reader<'_>, xor: u8) -> Result<Timestamp> {
    let magnitude = varint::decode_magnitude(r, xor)?;
    let packed = if xor == 0xff { -(magnitude as i64) } else { magnitude as i64 };
    Ok(Timestamp::unpack(packed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use test_case::test_case;

    fn roundtrip(e: &Element) -> Element {
        let mut w = Writer::new();
        e.encode(&mut w).unwrap();
        let bytes = w.finalize();
        let mut r = Reader::new(&bytes);
        let decoded = Element::decode(&mut r).unwrap();
        assert!(r.is_empty());
        decoded
    }

    #[test_case(Element::Null)]
    #[test_case(Element::Int(0))]
    #[test_case(Element::Int(-1))]
    #[test_case(Element::Int(i128::from(i64::MIN)))]
    #[test_case(Element::Int(i128::from(u64::MAX)))]
    #[test_case(Element::Bool(true))]
    #[test_case(Element::Bool(false))]
    #[test_case(Element::Blob(Bytes::from_static(b"\x00\x01\xff")))]
    #[test_case(Element::Text(String::from("hello")))]
    #[test_case(Element::Uuid(Uuid::nil()))]
    fn roundtrips(e: Element) {
        assert_eq!(roundtrip(&e), e);
    }

    #[test]
    fn kind_order_matches_spec_ordering() {
        let ordered = [Kind::Null, Kind::NegInteger, Kind::Integer, Kind::NegTime, Kind::Time, Kind::Bool, Kind::Blob, Kind::Text, Kind::Uuid];
        for w in ordered.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn bool_payload_is_a_single_byte_and_orders_false_before_true() {
        let mut wf = Writer::new();
        Element::Bool(false).encode(&mut wf).unwrap();
        let fb = wf.finalize();
        assert_eq!(&fb[..], &[Kind::Bool as u8, 0x00]);

        let mut wt = Writer::new();
        Element::Bool(true).encode(&mut wt).unwrap();
        let tb = wt.finalize();
        assert_eq!(&tb[..], &[Kind::Bool as u8, 0x01]);

        assert!(fb < tb);
    }

    #[test]
    fn bool_rejects_payload_other_than_zero_or_one() {
        let mut r = Reader::new(&[Kind::Bool as u8, 0x02]);
        assert!(matches!(Element::decode(&mut r), Err(TupleError::Malformed { .. })));
    }

    #[test]
    fn null_sorts_before_every_kind() {
        assert!((Kind::Null as u8) < (Kind::NegInteger as u8));
        assert!((Kind::Null as u8) < (Kind::Uuid as u8));
    }

    #[test]
    fn sep_sorts_below_every_kind_byte() {
        assert!(SEP < Kind::Null as u8);
    }

    #[test]
    fn negative_and_nonnegative_integers_order_correctly() {
        let mut values = vec![i128::from(i64::MIN), -1000, -1, 0, 1, 1000, i128::from(u64::MAX)];
        let mut encodings: Vec<(i128, Bytes)> = values
            .drain(..)
            .map(|v| {
                let mut w = Writer::new();
                Element::Int(v).encode(&mut w).unwrap();
                (v, w.finalize())
            })
            .collect();
        encodings.sort_by(|a, b| a.1.cmp(&b.1));
        let sorted_values: Vec<i128> = encodings.iter().map(|(v, _)| *v).collect();
        assert_eq!(sorted_values, vec![i128::from(i64::MIN), -1000, -1, 0, 1, 1000, i128::from(u64::MAX)]);
    }

    #[test]
    fn time_roundtrips_through_element() {
        let ts = Timestamp::from_utc(Utc::now());
        let e = Element::Time(ts);
        let decoded = roundtrip(&e);
        match decoded {
            Element::Time(t) => assert_eq!(t.epoch_millis(), ts.epoch_millis()),
            other => panic!("expected Time, got {other:?}"),
        }
    }

    #[test]
    fn skip_consumes_same_bytes_as_decode() {
        let e = Element::Text(String::from("some payload"));
        let mut w = Writer::new();
        e.encode(&mut w).unwrap();
        let bytes = w.finalize();

        let mut r1 = Reader::new(&bytes);
        Element::decode(&mut r1).unwrap();
        let mut r2 = Reader::new(&bytes);
        Element::skip(&mut r2).unwrap();

        assert_eq!(r1.position(), r2.position());
    }

    #[test]
    fn scenario_int_one_is_kind_plus_one_byte() {
        // spec §8 scenario 1: pack("", (1,)) is 2 bytes, kind + varint payload.
        let mut w = Writer::new();
        Element::Int(1).encode(&mut w).unwrap();
        let bytes = w.finalize();
        assert_eq!(&bytes[..], &[Kind::Integer as u8, 0x01]);
    }

    #[test]
    fn scenario_neg_one_xors_the_varint_byte() {
        // spec §8 scenario 2: pack("", (-1,)) emits NEG_INTEGER then 0xfe
        // (0x01 XORed with 0xff).
        let mut w = Writer::new();
        Element::Int(-1).encode(&mut w).unwrap();
        let bytes = w.finalize();
        assert_eq!(&bytes[..], &[Kind::NegInteger as u8, 0xfe]);
    }

    #[test]
    fn rejects_unrecognized_kind_byte() {
        let mut r = Reader::new(&[0x7f]);
        assert!(matches!(Element::decode(&mut r), Err(TupleError::Malformed { .. })));
    }
}
