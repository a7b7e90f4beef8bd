//! Order-preserving tuple key codec.
//!
//! Encodes heterogeneous tuples (integers, booleans, timestamps, blobs,
//! text, UUIDs) into byte strings whose lexicographic order matches the
//! logical order of the tuples they came from, so they can be used directly
//! as keys in a byte-ordered store. See [`Key`] for the encoded
//! representation and [`Element`] for the value types a tuple can hold.
//!
//! ```
//! use kimberlite_tuple::{Element, Key};
//!
//! let a = Key::from_elements(&[Element::Int(1), Element::Text("a".into())]).unwrap();
//! let b = Key::from_elements(&[Element::Int(1), Element::Text("b".into())]).unwrap();
//! assert!(a < b);
//! ```
//!
//! Every `pack`/`unpack` entry point takes a caller-supplied prefix byte
//! string, written ahead of the payload and stripped back off on decode:
//!
//! ```
//! use kimberlite_tuple::{pack, unpack, Element};
//!
//! let tuple = [Element::Int(1), Element::Text("a".into())];
//! let bytes = pack(b"tbl/", &tuple[..]).unwrap();
//! assert_eq!(unpack(b"tbl/", &bytes).unwrap().unwrap(), tuple);
//! assert_eq!(unpack(b"other/", &bytes).unwrap(), None); // NotMatched, not an error
//! ```

mod batch;
mod buffer;
mod element;
mod error;
mod key;
mod strcode;
mod timestamp;
mod varint;

pub use batch::{
    decode_offsets, encode_offsets, pack, pack_batch, pack_int, unpack, unpack_int, unpacks, PackItem, PackValue,
};
pub use element::{Element, Kind, SEP};
pub use error::{Result, TupleError};
pub use key::Key;
pub use timestamp::Timestamp;
