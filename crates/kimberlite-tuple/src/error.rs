//! Error taxonomy for the tuple codec.

/// Errors surfaced by encode/decode operations.
///
/// A prefix mismatch in `unpack`/`unpacks`/`unpack_int`/`Key::from_raw` is
/// *not* an error: those return `Ok(None)` so callers can use the codec as a
/// filter over a shared key space (spec's `NotMatched` sentinel).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TupleError {
    /// Fewer bytes remained than a decode operation required.
    #[error("truncated: expected {expected} more byte(s), {remaining} remain")]
    Truncated { expected: usize, remaining: usize },

    /// An unrecognized kind byte, or a varint prefix that decodes to an
    /// impossible length.
    #[error("malformed encoding: {reason}")]
    Malformed { reason: String },

    /// The caller tried to encode a value with no wire representation
    /// (e.g. a magnitude or timestamp outside the representable range).
    #[error("unsupported type or value: {reason}")]
    UnsupportedType { reason: String },

    /// A `Key` was compared against a value it cannot be ordered against
    /// (spec §4.3/§7: relational ops against a foreign type fail with this
    /// variant, rather than equality's plain `false`/`true`).
    ///
    /// Never constructed by this crate today: `Key`'s relational operators
    /// are the statically typed `PartialOrd<Key>` (another `Key`) and
    /// `compare_tuple(&[Element])` (a tuple of elements), so a comparison
    /// against an incomparable type is a compile error here, not a runtime
    /// one. The variant is kept for API completeness with spec §7's error
    /// taxonomy and for a future dynamic comparison entry point (e.g. an FFI
    /// or scripting binding that compares a `Key` against an arbitrary
    /// caller-supplied value at runtime) that would need to report this.
    #[error("type mismatch: cannot compare Key with {0}")]
    TypeMismatch(String),

    /// `Key::get` was called with an index outside `0..len`.
    #[error("index {index} out of range for key of length {len}")]
    IndexOutOfRange { index: i64, len: usize },
}

pub type Result<T> = std::result::Result<T, TupleError>;
