#![no_main]

use kimberlite_tuple::{pack, unpack, Element, Key};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Test 1: Key::from_raw against arbitrary bytes.
    //
    // This tests:
    // - Truncated kind bytes / payloads
    // - Unrecognized kind byte rejection
    // - Malformed varint prefixes (impossible threshold bytes)
    // - Non-UTF-8 text payloads
    // - Prefix stripping against a prefix drawn from the same input
    if !data.is_empty() {
        let split = data[0] as usize % (data.len()).max(1);
        let (prefix, rest) = data.split_at(split.min(data.len()));
        let _ = Key::from_raw(prefix, rest);
        let _ = Key::from_raw(&[], data);
    } else {
        let _ = Key::from_raw(&[], data);
    }

    // Test 2: pack/unpack round trip over a tuple built deterministically
    // from the fuzz input, checking the decoded tuple always equals the one
    // that was packed and that skip/decode never disagree.
    let elements = elements_from_bytes(data);
    if let Ok(bytes) = pack(b"", &elements[..]) {
        match unpack(b"", &bytes) {
            Ok(Some(decoded)) => assert_eq!(decoded, elements),
            Ok(None) => panic!("empty prefix must always match"),
            Err(e) => panic!("freshly packed bytes must decode: {e}"),
        }
    }

    // Test 3: a `Key` built from the same tuple must order consistently
    // with `compare_tuple` against itself.
    if let Ok(key) = Key::from_elements(&elements) {
        assert_eq!(key.compare_tuple(&elements).unwrap(), std::cmp::Ordering::Equal);
    }
});

/// Maps arbitrary bytes onto a small tuple of elements, cycling through
/// every `Element` kind keyed off each input byte so the fuzzer can reach
/// every decode/skip branch without needing a structure-aware `Arbitrary`
/// derive for `Element`.
fn elements_from_bytes(data: &[u8]) -> Vec<Element> {
    data.chunks(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            let v = u64::from_le_bytes(buf);
            match chunk.first().copied().unwrap_or(0) % 4 {
                0 => Element::Int(i128::from(v as i64)),
                1 => Element::Bool(v % 2 == 0),
                2 => Element::Blob(bytes::Bytes::copy_from_slice(chunk)),
                _ => Element::Text(String::from_utf8_lossy(chunk).into_owned()),
            }
        })
        .collect()
}
