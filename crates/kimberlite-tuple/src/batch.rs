//! Batch packing: the `pack`/`unpack`/`unpacks` public surface (spec §4.4,
//! §6), plus the bare-varint helper (`pack_int`) and the offset-table
//! decoder (`decode_offsets`) a batch-value layer uses to locate values
//! inside a concatenated payload blob.
//!
//! Every packing/unpacking entry point takes a caller-supplied `prefix` that
//! is written ahead of the payload (on pack) or stripped from the front of
//! the input (on unpack) — this lets the codec coexist with other users of
//! the same byte-ordered key space. A prefix mismatch on unpack is not an
//! error: it returns `Ok(None)` so callers can use these functions as a
//! filter over a shared key space (spec §7).

use bytes::Bytes;

use crate::buffer::{Reader, Writer};
use crate::element::{Element, SEP};
use crate::error::Result;
use crate::key::Key;
use crate::varint;

/// What a single slot of a [`pack`] call can hold: one bare element, a whole
/// tuple's worth of elements encoded in sequence, or an already-encoded
/// [`Key`] copied in verbatim without re-encoding.
#[derive(Debug, Clone)]
pub enum PackItem<'a> {
    Element(Element),
    Tuple(&'a [Element]),
    Key(&'a Key),
}

impl<'a> From<Element> for PackItem<'a> {
    fn from(e: Element) -> Self {
        PackItem::Element(e)
    }
}

impl<'a> From<&'a [Element]> for PackItem<'a> {
    fn from(t: &'a [Element]) -> Self {
        PackItem::Tuple(t)
    }
}

impl<'a> From<&'a Key> for PackItem<'a> {
    fn from(k: &'a Key) -> Self {
        PackItem::Key(k)
    }
}

impl PackItem<'_> {
    fn encode(&self, w: &mut Writer) -> Result<()> {
        match self {
            PackItem::Element(e) => e.encode(w),
            PackItem::Tuple(elements) => {
                for e in *elements {
                    e.encode(w)?;
                }
                Ok(())
            }
            PackItem::Key(k) => {
                w.put_bytes(k.raw_bytes());
                Ok(())
            }
        }
    }
}

/// The `value` argument of [`pack`]: a single item, or a list of items
/// separated by [`SEP`] when packed (spec §4.4).
#[derive(Debug, Clone)]
pub enum PackValue<'a> {
    Single(PackItem<'a>),
    List(Vec<PackItem<'a>>),
}

impl<'a, T: Into<PackItem<'a>>> From<T> for PackValue<'a> {
    fn from(item: T) -> Self {
        PackValue::Single(item.into())
    }
}

/// Packs `value` (spec §6's `element | tuple | key | list[...]` union) after
/// `prefix`.
pub fn pack<'a>(prefix: &[u8], value: impl Into<PackValue<'a>>) -> Result<Bytes> {
    let mut w = Writer::new();
    w.put_bytes(prefix);
    match value.into() {
        PackValue::Single(item) => item.encode(&mut w)?,
        PackValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.put_byte(SEP);
                }
                item.encode(&mut w)?;
            }
        }
    }
    Ok(w.finalize())
}

/// Convenience constructor for [`pack`]'s list case: packs `tuples` with
/// [`SEP`] between consecutive tuples.
pub fn pack_batch(prefix: &[u8], tuples: &[&[Element]]) -> Result<Bytes> {
    pack(prefix, PackValue::List(tuples.iter().map(|t| PackItem::Tuple(t)).collect()))
}

fn strip_prefix<'a>(prefix: &[u8], bytes: &'a [u8]) -> Option<&'a [u8]> {
    bytes.strip_prefix(prefix)
}

/// Strips `prefix` and decodes the remainder as a single tuple's elements.
///
/// Returns `Ok(None)` if `bytes` does not begin with `prefix` (spec §7's
/// `NotMatched`, not an error).
pub fn unpack(prefix: &[u8], bytes: &[u8]) -> Result<Option<Vec<Element>>> {
    let Some(rest) = strip_prefix(prefix, bytes) else {
        tracing::debug!(prefix_len = prefix.len(), "unpack: prefix did not match");
        return Ok(None);
    };
    let mut r = Reader::new(rest);
    let mut elements = Vec::new();
    while !r.is_empty() {
        elements.push(Element::decode(&mut r)?);
    }
    Ok(Some(elements))
}

/// Strips `prefix` and decodes the remainder as a [`SEP`]-delimited batch of
/// tuples. Returns `Ok(None)` on a prefix mismatch, as [`unpack`] does.
pub fn unpacks(prefix: &[u8], bytes: &[u8]) -> Result<Option<Vec<Vec<Element>>>> {
    let Some(rest) = strip_prefix(prefix, bytes) else {
        tracing::debug!(prefix_len = prefix.len(), "unpacks: prefix did not match");
        return Ok(None);
    };
    if rest.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let mut r = Reader::new(rest);
    let mut tuples = Vec::new();
    let mut current = Vec::new();
    while !r.is_empty() {
        if r.peek_byte() == Some(SEP) {
            r.advance(1)?;
            tuples.push(std::mem::take(&mut current));
        } else {
            current.push(Element::decode(&mut r)?);
        }
    }
    tuples.push(current);
    Ok(Some(tuples))
}

/// Encodes a bare, order-preserving unsigned varint after `prefix`, with no
/// kind tag (spec §6).
pub fn pack_int(prefix: &[u8], v: u64) -> Bytes {
    let mut w = Writer::new();
    w.put_bytes(prefix);
    varint::encode_plain(&mut w, v);
    w.finalize()
}

/// Decodes a value written by [`pack_int`]. Returns `Ok(None)` on a prefix
/// mismatch.
pub fn unpack_int(prefix: &[u8], bytes: &[u8]) -> Result<Option<u64>> {
    let Some(rest) = strip_prefix(prefix, bytes) else {
        return Ok(None);
    };
    let mut r = Reader::new(rest);
    Ok(Some(varint::decode_plain(&mut r)?))
}

/// Encodes a varint-prefixed offset table: a `count` varint followed by
/// `count` delta varints, the inverse of [`decode_offsets`]. Not part of the
/// language-agnostic public surface in spec §6, but the natural producer
/// side of the helper spec §4.4 only names the decoder for.
pub fn encode_offsets(lengths: &[u64]) -> Bytes {
    let mut w = Writer::new();
    varint::encode_plain(&mut w, lengths.len() as u64);
    for &len in lengths {
        varint::encode_plain(&mut w, len);
    }
    w.finalize()
}

/// Decodes a varint `count` followed by `count` delta varints, returning the
/// cumulative offsets `[0, d1, d1+d2, ...]` (length `count + 1`) and the
/// number of bytes consumed from `bytes` (spec §4.4).
pub fn decode_offsets(bytes: &[u8]) -> Result<(Vec<u64>, usize)> {
    let mut r = Reader::new(bytes);
    let count = varint::decode_plain(&mut r)?;
    let mut offsets = Vec::with_capacity(count as usize + 1);
    offsets.push(0u64);
    let mut acc = 0u64;
    for _ in 0..count {
        acc += varint::decode_plain(&mut r)?;
        offsets.push(acc);
    }
    Ok((offsets, r.position()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_single_tuple() {
        let elements = vec![Element::Int(1), Element::Text("a".into())];
        let bytes = pack(b"", &elements[..]).unwrap();
        let decoded = unpack(b"", &bytes).unwrap().unwrap();
        assert_eq!(decoded, elements);
    }

    #[test]
    fn batch_roundtrip() {
        let a = vec![Element::Int(1)];
        let b = vec![Element::Text("x".into())];
        let c: Vec<Element> = vec![];
        let batch = pack_batch(b"", &[&a, &b, &c]).unwrap();
        let decoded = unpacks(b"", &batch).unwrap().unwrap();
        assert_eq!(decoded, vec![a, b, c]);
    }

    #[test]
    fn empty_input_yields_empty_list_of_tuples() {
        // Matches the original C extension's `py_unpacks`: its `while (rdr.p
        // < rdr.e)` loop body never runs on zero input bytes, so it appends
        // nothing and returns `[]`, not a single empty tuple. The encoded
        // bytes for `pack([])` and `pack([()])` are identical, so this
        // decoder convention is the only thing that disambiguates them.
        let decoded = unpacks(b"", &[]).unwrap().unwrap();
        assert_eq!(decoded, Vec::<Vec<Element>>::new());
    }

    #[test]
    fn pack_int_roundtrip() {
        for v in [0u64, 1, 1000, u64::MAX] {
            let bytes = pack_int(b"", v);
            assert_eq!(unpack_int(b"", &bytes).unwrap().unwrap(), v);
        }
    }

    #[test]
    fn prefix_is_written_ahead_of_payload_and_stripped_back_off() {
        let elements = vec![Element::Int(7)];
        let prefixed = pack(b"tbl/", &elements[..]).unwrap();
        let unprefixed = pack(b"", &elements[..]).unwrap();
        assert_eq!(&prefixed[..], [b"tbl/".as_slice(), &unprefixed[..]].concat());
        assert_eq!(unpack(b"tbl/", &prefixed).unwrap().unwrap(), elements);
        assert_eq!(unpack(b"", &unprefixed).unwrap().unwrap(), elements);
    }

    #[test]
    fn unpack_returns_none_on_prefix_mismatch() {
        let bytes = pack(b"tbl/", &[Element::Int(1)][..]).unwrap();
        assert_eq!(unpack(b"other/", &bytes).unwrap(), None);
        assert_eq!(unpacks(b"other/", &bytes).unwrap(), None);
        assert_eq!(unpack_int(b"other/", &bytes).unwrap(), None);
    }

    #[test]
    fn pack_single_element_and_key_variants() {
        let from_element = pack(b"", Element::Int(5)).unwrap();
        let key = Key::from_elements(&[Element::Int(5)]).unwrap();
        let from_key = pack(b"", &key).unwrap();
        assert_eq!(from_element, from_key);
    }

    #[test]
    fn decode_offsets_reads_count_and_deltas() {
        // spec §8 scenario 6.
        let mut w = Writer::new();
        varint::encode_plain(&mut w, 3);
        varint::encode_plain(&mut w, 10);
        varint::encode_plain(&mut w, 5);
        varint::encode_plain(&mut w, 7);
        let bytes = w.finalize();

        let (offsets, consumed) = decode_offsets(&bytes).unwrap();
        assert_eq!(offsets, vec![0, 10, 15, 22]);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn decode_offsets_roundtrips_through_encode_offsets() {
        let lengths = vec![10u64, 5, 7];
        let bytes = encode_offsets(&lengths);
        let (offsets, consumed) = decode_offsets(&bytes).unwrap();
        assert_eq!(offsets, vec![0, 10, 15, 22]);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn decode_offsets_empty_table() {
        let bytes = encode_offsets(&[]);
        let (offsets, consumed) = decode_offsets(&bytes).unwrap();
        assert_eq!(offsets, vec![0]);
        assert_eq!(consumed, bytes.len());
    }
}
