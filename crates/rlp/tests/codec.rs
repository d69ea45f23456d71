//! End-to-end codec behavior: wire fixtures, boundary sizes, and malformed
//! input handling.

use ethrlp::*;
use hex_literal::hex;

#[test]
fn integer_fixtures() {
    assert_eq!(encode_to_bytes(&1024u64), hex!("820400"));
    assert_eq!(decode_from_bytes::<u64>(&hex!("820400")), Ok(1024));

    assert_eq!(encode_to_bytes(&0u64), hex!("80"));
    assert_eq!(encode_to_bytes(&127u64), hex!("7F"));
    assert_eq!(encode_to_bytes(&128u64), hex!("8180"));
    assert_eq!(encode_to_bytes(&256u64), hex!("820100"));
}

#[test]
fn string_fixtures() {
    let dog = Bytes::from_static(b"dog");
    assert_eq!(encode_to_bytes(&dog), hex!("83646F67"));
    assert_eq!(decode_from_bytes::<Bytes>(&hex!("83646F67")), Ok(dog));

    // A sequence of u8 is a byte string, not a list: every byte container
    // produces the same wire form.
    assert_eq!(encode_to_bytes(&b"dog".to_vec()), hex!("83646F67"));
    assert_eq!(encode_to_bytes(b"dog".as_slice()), hex!("83646F67"));
    assert_eq!(decode_from_bytes::<Vec<u8>>(&hex!("83646F67")), Ok(b"dog".to_vec()));

    // Empty values.
    assert_eq!(encode_to_bytes(&Bytes::new()), hex!("80"));
    assert_eq!(encode_to_bytes(&Vec::<u8>::new()), hex!("80"));
    assert_eq!(encode_to_bytes(""), hex!("80"));
    assert_eq!(encode_to_bytes(&Vec::<u64>::new()), hex!("C0"));
}

#[test]
fn two_string_list() {
    let list = vec!["cat".to_string(), "dog".to_string()];
    let encoded = encode_to_bytes(&list);
    assert_eq!(encoded, hex!("C88363617483646F67"));
    assert_eq!(decode_from_bytes::<Vec<String>>(&encoded), Ok(list));
}

#[cfg(feature = "derive")]
#[test]
fn product_type_fixture() {
    #[derive(RlpEncodable, RlpDecodable, PartialEq, Debug)]
    struct Item {
        a: u64,
        b: Bytes,
        c: Vec<u64>,
    }

    let item = Item { a: 3, b: Bytes::from_static(&hex!("CAFE")), c: vec![1, 2] };
    let encoded = encode_to_bytes(&item);
    assert_eq!(encoded, hex!("C70382CAFEC20102"));
    assert_eq!(decode_from_bytes::<Item>(&encoded), Ok(item));
}

#[test]
fn recursive_empty_lists() {
    // [ [], [[]], [ [], [[]] ] ]
    let value = Value::List(vec![
        Value::List(vec![]),
        Value::List(vec![Value::List(vec![])]),
        Value::List(vec![Value::List(vec![]), Value::List(vec![Value::List(vec![])])]),
    ]);
    let encoded = encode_to_bytes(&value);
    assert_eq!(encoded, hex!("C7C0C1C0C3C0C1C0"));
    assert_eq!(decode_from_bytes::<Value>(&encoded), Ok(value));
}

#[test]
fn short_long_string_boundary() {
    // 55 payload bytes take the short form, 56 the long form.
    let fifty_five = Bytes::from(vec![0x61; 55]);
    let encoded = encode_to_bytes(&fifty_five);
    assert_eq!(encoded[0], 0x80 + 55);
    assert_eq!(encoded.len(), 56);
    assert_eq!(decode_from_bytes::<Bytes>(&encoded), Ok(fifty_five));

    let fifty_six = Bytes::from(vec![0x61; 56]);
    let encoded = encode_to_bytes(&fifty_six);
    assert_eq!(&encoded[..2], &hex!("B838"));
    assert_eq!(encoded.len(), 58);
    assert_eq!(decode_from_bytes::<Bytes>(&encoded), Ok(fifty_six));
}

#[test]
fn short_long_list_boundary() {
    // 55 single-byte elements: short form.
    let list = vec![1u64; 55];
    let encoded = encode_to_bytes(&list);
    assert_eq!(encoded[0], 0xC0 + 55);
    assert_eq!(decode_from_bytes::<Vec<u64>>(&encoded), Ok(list));

    let list = vec![1u64; 56];
    let encoded = encode_to_bytes(&list);
    assert_eq!(&encoded[..2], &hex!("F838"));
    assert_eq!(decode_from_bytes::<Vec<u64>>(&encoded), Ok(list));
}

#[test]
fn rejects_long_form_below_56() {
    let err = decode_from_bytes::<Bytes>(&hex!("B800")).unwrap_err();
    let Error::Decode(e) = err else { panic!("expected structured error, got {err:?}") };
    assert_eq!(e.message(), "non-canonical size information");
}

#[test]
fn rejects_single_byte_as_string() {
    let err = decode_from_bytes::<Bytes>(&hex!("8101")).unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "{err:?}");
}

#[test]
fn rejects_single_byte_string_at_index() {
    let err = decode_from_bytes::<Vec<u64>>(&hex!("C28101")).unwrap_err();
    let Error::Decode(e) = err else { panic!("expected structured error, got {err:?}") };
    let msg = e.to_string();
    assert!(msg.contains("non-canonical size"), "{msg}");
    assert!(msg.contains("[0]"), "{msg}");
}

#[test]
fn rejects_leading_zero_integers() {
    assert!(decode_from_bytes::<u64>(&hex!("00")).is_err());
    assert!(decode_from_bytes::<u64>(&hex!("820012")).is_err());
    assert!(decode_from_bytes::<BigUint>(&hex!("83001234")).is_err());
    assert!(decode_from_bytes::<U256>(&hex!("83001234")).is_err());
}

#[test]
fn rejects_leading_zero_length_of_length() {
    let mut input = hex!("B90038").to_vec();
    input.extend_from_slice(&[0x61; 56]);
    assert!(decode_from_bytes::<Bytes>(&input).is_err());
}

#[test]
fn encoding_is_deterministic() {
    let value = vec![vec![0u64, 1, 0xFFFF], vec![], vec![56]];
    let a = encode_to_bytes(&value);
    let b = encode_to_bytes(&value);
    assert_eq!(a, b);

    let mut through_writer = Vec::new();
    encode(&mut through_writer, &value).unwrap();
    assert_eq!(through_writer, a);

    let (size, mut reader) = encode_to_reader(&value);
    let mut through_reader = Vec::new();
    std::io::Read::read_to_end(&mut reader, &mut through_reader).unwrap();
    assert_eq!(through_reader.len(), size);
    assert_eq!(through_reader, a);
}

#[test]
fn list_size_accounting() {
    // The sum of the encoded children equals the declared parent payload.
    let value = vec![vec![1u64, 2], vec![0xFFCC_u64], vec![]];
    let encoded = encode_to_bytes(&value);
    let (payload, rest) = split_list(&encoded).unwrap();
    assert!(rest.is_empty());

    let mut total = 0;
    for item in ListIterator::new(&encoded).unwrap() {
        total += item.unwrap().len();
    }
    assert_eq!(total, payload.len());
    assert_eq!(count_values(payload).unwrap(), 3);
}

#[test]
fn stream_decoding_from_reader() {
    // Values arrive back to back on one reader; each decode consumes
    // exactly one of them.
    let mut data = encode_to_bytes(&vec![1u64, 2, 3]);
    data.extend_from_slice(&encode_to_bytes(&Bytes::from_static(b"dog")));
    data.extend_from_slice(&encode_to_bytes(&7u64));

    let mut rd = &data[..];
    let mut stream = Stream::new(&mut rd, None);
    assert_eq!(Vec::<u64>::decode(&mut stream), Ok(vec![1, 2, 3]));
    assert_eq!(Bytes::decode(&mut stream), Ok(Bytes::from_static(b"dog")));
    assert_eq!(u64::decode(&mut stream), Ok(7));
    assert_eq!(stream.kind(), Err(Error::Eof));
}

#[test]
fn big_integer_roundtrip() {
    let cases = [
        BigUint::default(),
        BigUint::from(1u8),
        BigUint::from(0xFFFF_FFFF_FFFF_FFFFu64),
        BigUint::parse_bytes(b"0100020003000400050006000700080009000A0B4B000C000D000E01", 16)
            .unwrap(),
    ];
    for value in cases {
        let encoded = encode_to_bytes(&value);
        assert_eq!(decode_from_bytes::<BigUint>(&encoded), Ok(value));
    }
    assert_eq!(
        encode_to_bytes(
            &BigUint::parse_bytes(b"0100020003000400050006000700080009000A0B4B000C000D000E01", 16)
                .unwrap()
        ),
        hex!("9C0100020003000400050006000700080009000A0B4B000C000D000E01")
    );
}

#[test]
fn u256_roundtrip() {
    let cases = [U256::ZERO, U256::ONE, U256::from(0xFFCCB5DDFFEE1483u64), U256::MAX];
    for value in cases {
        let encoded = encode_to_bytes(&value);
        assert_eq!(decode_from_bytes::<U256>(&encoded), Ok(value));
    }
    // 33-byte payloads overflow.
    let mut input = vec![0x80 + 33];
    input.extend_from_slice(&[0x01; 33]);
    assert!(decode_from_bytes::<U256>(&input).is_err());
}

#[test]
fn raw_value_passthrough() {
    // A pre-encoded field travels through an outer encode untouched.
    let inner = encode_to_bytes(&vec![1u64, 2, 3]);
    let raw = RawValue::from(inner.clone());
    let outer = encode_to_bytes(&vec![raw]);
    let (payload, _) = split_list(&outer).unwrap();
    assert_eq!(payload, &inner[..]);
}

#[test]
fn typed_value_wrapper_convention() {
    // Consumers prefix an inner RLP payload with a type byte below 0x80
    // using the raw helpers.
    let payload = encode_to_bytes(&vec![1u64, 2]);
    let mut wrapped = vec![0x02];
    wrapped.extend_from_slice(&payload);

    assert_eq!(wrapped[0], 0x02);
    let inner: Vec<u64> = decode_from_bytes(&wrapped[1..]).unwrap();
    assert_eq!(inner, vec![1, 2]);
}
