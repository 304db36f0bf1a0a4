use proptest::prelude::*;

use super::*;

fn encoded(value: i64) -> String {
    let mut out = String::new();
    encode(&mut out, value);
    out
}

#[test]
fn test_encode_small_values() {
    assert_eq!(encoded(0), "A");
    assert_eq!(encoded(1), "C");
    assert_eq!(encoded(-1), "D");
    assert_eq!(encoded(15), "e");
    assert_eq!(encoded(16), "gB");
    assert_eq!(encoded(-16), "hB");
}

#[test]
fn test_decode_advances_position() {
    let input = b"gBD";
    let mut pos = 0;
    assert_eq!(decode(input, &mut pos), Ok(16));
    assert_eq!(pos, 2);
    assert_eq!(decode(input, &mut pos), Ok(-1));
    assert_eq!(pos, 3);
}

#[test]
fn test_decode_rejects_invalid_digit() {
    let mut pos = 0;
    assert_eq!(decode(b"!", &mut pos), Err(VlqError::InvalidDigit('!')));
}

#[test]
fn test_decode_rejects_truncated_value() {
    // `g` carries the continuation bit with nothing after it
    let mut pos = 0;
    assert_eq!(decode(b"g", &mut pos), Err(VlqError::UnexpectedEnd));
}

#[test]
fn test_decode_rejects_overflow() {
    let input = "g".repeat(20);
    let mut pos = 0;
    assert_eq!(decode(input.as_bytes(), &mut pos), Err(VlqError::Overflow));
}

proptest! {
    #[test]
    fn prop_round_trip(value in -(1i64 << 40)..(1i64 << 40)) {
        let text = encoded(value);
        let mut pos = 0;
        prop_assert_eq!(decode(text.as_bytes(), &mut pos), Ok(value));
        prop_assert_eq!(pos, text.len());
    }
}
