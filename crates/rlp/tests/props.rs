//! Property tests over the codec's universal invariants.

use ethrlp::*;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop::collection::vec(any::<u8>(), 0..48).prop_map(Value::Bytes);
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop::collection::vec(inner, 0..5).prop_map(Value::List)
    })
}

proptest! {
    #[test]
    fn roundtrip_u64(x in any::<u64>()) {
        let encoded = encode_to_bytes(&x);
        prop_assert_eq!(decode_from_bytes::<u64>(&encoded), Ok(x));
    }

    #[test]
    fn roundtrip_u128(x in any::<u128>()) {
        let encoded = encode_to_bytes(&x);
        prop_assert_eq!(decode_from_bytes::<u128>(&encoded), Ok(x));
    }

    #[test]
    fn roundtrip_byte_strings(b in prop::collection::vec(any::<u8>(), 0..200)) {
        let value = Bytes::from(b.clone());
        let encoded = encode_to_bytes(&value);
        prop_assert_eq!(decode_from_bytes::<Bytes>(&encoded), Ok(value));

        // Vec<u8> takes the same byte-string wire form as Bytes.
        prop_assert_eq!(&encode_to_bytes(&b), &encoded);
        prop_assert_eq!(decode_from_bytes::<Vec<u8>>(&encoded), Ok(b));
    }

    #[test]
    fn roundtrip_string(s in ".*") {
        let encoded = encode_to_bytes(s.as_str());
        prop_assert_eq!(decode_from_bytes::<String>(&encoded), Ok(s));
    }

    #[test]
    fn roundtrip_vec(v in prop::collection::vec(any::<u64>(), 0..64)) {
        let encoded = encode_to_bytes(&v);
        prop_assert_eq!(decode_from_bytes::<Vec<u64>>(&encoded), Ok(v));
    }

    #[test]
    fn roundtrip_nested(v in prop::collection::vec(prop::collection::vec(any::<u32>(), 0..8), 0..8)) {
        let encoded = encode_to_bytes(&v);
        prop_assert_eq!(decode_from_bytes::<Vec<Vec<u32>>>(&encoded), Ok(v));
    }

    #[test]
    fn roundtrip_dynamic(v in value_strategy()) {
        let encoded = encode_to_bytes(&v);
        prop_assert_eq!(decode_from_bytes::<Value>(&encoded), Ok(v));
    }

    #[test]
    fn encoding_is_a_function(v in value_strategy()) {
        prop_assert_eq!(encode_to_bytes(&v), encode_to_bytes(&v));
    }

    #[test]
    fn no_trailing_data_accepted(x in any::<u64>(), trailing in 0u8..0x7F) {
        let mut encoded = encode_to_bytes(&x);
        encoded.push(trailing);
        prop_assert_eq!(decode_from_bytes::<u64>(&encoded), Err(Error::MoreThanOneValue));
    }

    #[test]
    fn declared_sizes_add_up(v in value_strategy()) {
        // The declared payload of every list equals the sum of the encoded
        // sizes of its children.
        let encoded = encode_to_bytes(&v);
        check_sizes(&encoded)?;
    }

    #[test]
    fn padded_integers_rejected(x in 1u64..=0x00FF_FFFF_FFFF_FFFF) {
        // Re-encode the integer with one leading zero byte.
        let canonical = encode_to_bytes(&x);
        let payload = &canonical[1..];
        let mut padded = Vec::with_capacity(canonical.len() + 1);
        padded.push(0x80 + (payload.len() + 1) as u8);
        padded.push(0x00);
        padded.extend_from_slice(payload);
        prop_assert!(decode_from_bytes::<u64>(&padded).is_err());
    }

    #[test]
    fn wrapped_single_bytes_rejected(b in 0u8..0x80) {
        prop_assert!(decode_from_bytes::<u64>(&[0x81, b]).is_err());
        prop_assert!(decode_from_bytes::<Bytes>(&[0x81, b]).is_err());
    }

    #[test]
    fn truncated_inputs_never_panic(v in value_strategy(), cut in 0usize..8) {
        let encoded = encode_to_bytes(&v);
        if cut < encoded.len() {
            let truncated = &encoded[..encoded.len() - cut];
            // Any result is fine as long as it does not panic; a strict cut
            // must not decode successfully.
            let result = decode_from_bytes::<Value>(truncated);
            if cut > 0 {
                prop_assert!(result.is_err());
            }
        }
    }

    #[test]
    fn split_matches_stream(v in value_strategy()) {
        // The raw split helpers agree with the streaming classification.
        let encoded = encode_to_bytes(&v);
        let (kind, content, rest) = split(&encoded).unwrap();
        prop_assert!(rest.is_empty());
        let mut s = Stream::from_slice(&encoded);
        let (skind, ssize) = s.kind().unwrap();
        match kind {
            Kind::Byte => {
                prop_assert_eq!(skind, Kind::Byte);
                prop_assert_eq!(content.len(), 1);
            }
            _ => {
                prop_assert_eq!(skind, kind);
                prop_assert_eq!(ssize as usize, content.len());
            }
        }
    }

    #[test]
    fn append_uint_matches_encoder(x in any::<u64>()) {
        let mut out = Vec::new();
        append_uint64(&mut out, x);
        prop_assert_eq!(&out, &encode_to_bytes(&x));
        prop_assert_eq!(out.len(), int_size(x));
        let (decoded, rest) = split_uint64(&out).unwrap();
        prop_assert_eq!(decoded, x);
        prop_assert!(rest.is_empty());
    }
}

fn check_sizes(encoded: &[u8]) -> Result<(), TestCaseError> {
    let (kind, content, _) = split(encoded).unwrap();
    if kind != Kind::List {
        return Ok(());
    }
    let mut total = 0;
    for item in ListIterator::new(encoded).unwrap() {
        let item = item.unwrap();
        total += item.len();
        check_sizes(item)?;
    }
    prop_assert_eq!(total, content.len());
    Ok(())
}
