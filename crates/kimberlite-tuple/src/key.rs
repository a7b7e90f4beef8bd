//! `Key`: an encoded tuple held as raw, order-preserving bytes (spec §3, §4.3).
//!
//! Three storage variants back a `Key`, chosen at construction time rather
//! than exposed to callers:
//!
//! - `Inline` — small keys (the common case for index entries) live in a
//!   fixed-size array with no heap allocation.
//! - `Owned` — a `Key` built from elements that didn't fit inline owns a
//!   freshly allocated `Vec<u8>` outright.
//! - `Shared` — a `Key` built from a [`bytes::Bytes`] the caller already
//!   holds (e.g. a slice of a page buffer) shares that allocation instead of
//!   copying it, the same zero-copy path `kimberlite-storage` uses for
//!   record payloads.
//!
//! All three compare, hash, and iterate identically: every operation goes
//! through [`Key::raw_bytes`], so callers never need to know which variant
//! they hold.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

use crate::buffer::{Reader, Writer};
use crate::element::Element;
use crate::error::{Result, TupleError};

/// Keys up to this many bytes are stored inline with no heap allocation.
const INLINE_CAP: usize = 23;

#[derive(Clone)]
enum Storage {
    Inline([u8; INLINE_CAP], u8),
    Owned(Vec<u8>),
    Shared(Bytes),
}

/// An encoded, order-preserving tuple.
#[derive(Clone)]
pub struct Key {
    storage: Storage,
}

impl Key {
    /// Encodes `elements` into a new `Key`.
    pub fn from_elements(elements: &[Element]) -> Result<Self> {
        let mut w = Writer::new();
        for e in elements {
            e.encode(&mut w)?;
        }
        Ok(Self::from_bytes_owned(w.finalize()))
    }

    /// Wraps an already-encoded, already-validated byte string with no
    /// copy, sharing the caller's allocation.
    ///
    /// Unlike [`Self::from_raw`], this does not validate that `bytes` is a
    /// well-formed sequence of elements — callers that already trust the
    /// source (e.g. bytes read back from a store this crate wrote) can skip
    /// that cost. Use [`Self::from_raw`] for untrusted input.
    pub fn from_raw_bytes(bytes: Bytes) -> Self {
        Self { storage: Storage::Shared(bytes) }
    }

    /// Strips `prefix` off `bytes` and validates-and-copies the remainder
    /// into a new `Key` (spec §4.3). Returns `Ok(None)` — not an error — if
    /// `bytes` does not begin with `prefix`, so callers can use this as a
    /// filter over a shared key space (spec §7's `NotMatched`).
    pub fn from_raw(prefix: &[u8], bytes: &[u8]) -> Result<Option<Self>> {
        let Some(rest) = bytes.strip_prefix(prefix) else {
            tracing::debug!(prefix_len = prefix.len(), "Key::from_raw: prefix did not match");
            return Ok(None);
        };
        let mut r = Reader::new(rest);
        while !r.is_empty() {
            Element::skip(&mut r)?;
        }
        Ok(Some(Self::from_bytes_owned(Bytes::copy_from_slice(rest))))
    }

    /// Decodes a lowercase or uppercase hex string into a `Key`.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() % 2 != 0 {
            return Err(TupleError::Malformed { reason: "hex string has odd length".to_string() });
        }
        let mut bytes = Vec::with_capacity(s.len() / 2);
        let digits = s.as_bytes();
        for pair in digits.chunks(2) {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            bytes.push((hi << 4) | lo);
        }
        // An empty prefix always matches, so `from_raw` can't return `None` here.
        Ok(Self::from_raw(&[], &bytes)?.expect("empty prefix always matches"))
    }

    fn from_bytes_owned(bytes: Bytes) -> Self {
        if bytes.len() <= INLINE_CAP {
            let mut arr = [0u8; INLINE_CAP];
            arr[..bytes.len()].copy_from_slice(&bytes);
            Self { storage: Storage::Inline(arr, bytes.len() as u8) }
        } else {
            Self { storage: Storage::Owned(bytes.to_vec()) }
        }
    }

    /// The raw encoded bytes.
    pub fn raw_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Inline(arr, len) => &arr[..*len as usize],
            Storage::Owned(v) => v,
            Storage::Shared(b) => b,
        }
    }

    /// Returns `prefix ++ bytes` as an owned, cheaply-cloneable [`Bytes`]
    /// (spec §4.3). With an empty prefix this shares the underlying
    /// allocation when the storage is already [`Storage::Shared`]; any
    /// non-empty prefix requires a fresh allocation to hold the concatenation.
    pub fn to_raw(&self, prefix: &[u8]) -> Bytes {
        if prefix.is_empty() {
            return match &self.storage {
                Storage::Shared(b) => b.clone(),
                Storage::Inline(arr, len) => Bytes::copy_from_slice(&arr[..*len as usize]),
                Storage::Owned(v) => Bytes::copy_from_slice(v),
            };
        }
        let mut out = Vec::with_capacity(prefix.len() + self.raw_bytes().len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(self.raw_bytes());
        Bytes::from(out)
    }

    /// Hex-encodes the raw bytes.
    pub fn to_hex(&self) -> String {
        use fmt::Write;
        let mut s = String::with_capacity(self.raw_bytes().len() * 2);
        for b in self.raw_bytes() {
            write!(s, "{b:02x}").expect("writing to a String cannot fail");
        }
        s
    }

    /// Number of elements in this key (not byte length).
    pub fn len(&self) -> usize {
        let mut r = Reader::new(self.raw_bytes());
        let mut count = 0;
        while !r.is_empty() {
            Element::skip(&mut r).expect("Key invariant: raw bytes are always well-formed");
            count += 1;
        }
        count
    }

    /// `true` if this key encodes zero elements.
    pub fn is_empty(&self) -> bool {
        self.raw_bytes().is_empty()
    }

    /// Decodes the element at `index`. Negative indices count from the end,
    /// per spec §4.3. Two passes are required since elements are only
    /// reachable by skipping through their predecessors: one to establish
    /// the length (for negative indices), one to seek to and decode the
    /// resolved position.
    pub fn get(&self, index: i64) -> Result<Element> {
        let len = self.len();
        let resolved = if index < 0 { index + len as i64 } else { index };
        if resolved < 0 || resolved as usize >= len {
            return Err(TupleError::IndexOutOfRange { index, len });
        }
        let mut r = Reader::new(self.raw_bytes());
        for _ in 0..resolved {
            Element::skip(&mut r).expect("Key invariant: raw bytes are always well-formed");
        }
        Element::decode(&mut r)
    }

    /// Iterates over the decoded elements in order.
    pub fn iter(&self) -> ElementIter<'_> {
        ElementIter { reader: Reader::new(self.raw_bytes()) }
    }

    /// Concatenates this key's raw bytes with another key's raw bytes.
    pub fn concat_key(&self, other: &Key) -> Key {
        let mut w = Writer::new();
        w.put_bytes(self.raw_bytes());
        w.put_bytes(other.raw_bytes());
        Self::from_bytes_owned(w.finalize())
    }

    /// Appends freshly encoded elements onto this key's raw bytes.
    pub fn concat_elements(&self, elements: &[Element]) -> Result<Key> {
        let mut w = Writer::new();
        w.put_bytes(self.raw_bytes());
        for e in elements {
            e.encode(&mut w)?;
        }
        Ok(Self::from_bytes_owned(w.finalize()))
    }

    /// Compares this key's encoding against a freshly encoded `elements`,
    /// without ever materializing the full encoding of `elements` at once:
    /// each element is encoded and compared in turn, so the comparison can
    /// exit as soon as a difference is found.
    pub fn compare_tuple(&self, elements: &[Element]) -> Result<Ordering> {
        let raw = self.raw_bytes();
        let mut pos = 0usize;
        for e in elements {
            let mut w = Writer::new();
            e.encode(&mut w)?;
            let encoded = w.finalize();

            // Compare only the bytes of the key that belong to *this*
            // element, not everything left in the key — later elements
            // still need their turn. Having more key bytes left (because
            // further elements follow) must not end the comparison; only
            // running out of key bytes before this element's encoding ends
            // may.
            let available = raw.len() - pos;
            let this_element = &raw[pos..pos + available.min(encoded.len())];
            match this_element.cmp(&encoded[..this_element.len()]) {
                Ordering::Equal => {}
                other => return Ok(other),
            }
            if available < encoded.len() {
                return Ok(Ordering::Less);
            }
            pos += encoded.len();
        }
        Ok(raw.len().cmp(&pos))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.raw_bytes() == other.raw_bytes()
    }
}
impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    /// Byte-lexicographic order, which on slices already gives the
    /// shorter-is-a-prefix-sorts-lower semantics this codec relies on.
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw_bytes().cmp(other.raw_bytes())
    }
}

impl std::hash::Hash for Key {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw_bytes().hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Reader::new(self.raw_bytes());
        let mut elements = Vec::new();
        while !r.is_empty() {
            match Element::decode(&mut r) {
                Ok(e) => elements.push(e),
                Err(_) => return write!(f, "Key(invalid; hex={})", self.to_hex()),
            }
        }
        write!(f, "Key(")?;
        for (i, e) in elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e:?}")?;
        }
        write!(f, ")")
    }
}

/// Iterator over the decoded elements of a [`Key`].
pub struct ElementIter<'a> {
    reader: Reader<'a>,
}

impl Iterator for ElementIter<'_> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_empty() {
            return None;
        }
        Some(Element::decode(&mut self.reader))
    }
}

fn hex_digit(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        other => Err(TupleError::Malformed { reason: format!("invalid hex digit {:?}", other as char) }),
    }
}
