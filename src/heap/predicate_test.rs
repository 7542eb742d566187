use crate::errors::{storage_error, StorageError};
use crate::heap::predicate::{Datatype, Operator, ScanPredicate};

fn int_filter(value: i32, op: Operator) -> ScanPredicate {
    ScanPredicate::new(0, 4, Datatype::Integer, &value.to_ne_bytes(), op).unwrap()
}

fn is_bad_parameter(result: crate::errors::Result<ScanPredicate>) -> bool {
    match result {
        Err(e) => matches!(storage_error(&e), Some(StorageError::BadScanParameter(_))),
        Ok(_) => false,
    }
}

#[test]
fn validates_parameters() {
    let four = 7i32.to_ne_bytes();
    assert!(is_bad_parameter(ScanPredicate::new(-1, 4, Datatype::Integer, &four, Operator::Eq)));
    assert!(is_bad_parameter(ScanPredicate::new(0, 0, Datatype::String, b"x", Operator::Eq)));
    assert!(is_bad_parameter(ScanPredicate::new(0, 2, Datatype::Integer, &four, Operator::Eq)));
    assert!(is_bad_parameter(ScanPredicate::new(0, 8, Datatype::Float, &[0u8; 8], Operator::Eq)));
    assert!(is_bad_parameter(ScanPredicate::new(0, 5, Datatype::String, b"abc", Operator::Eq)));

    assert!(ScanPredicate::new(3, 4, Datatype::Integer, &four, Operator::Ne).is_ok());
    assert!(ScanPredicate::new(0, 4, Datatype::Float, &1.5f32.to_ne_bytes(), Operator::Lt).is_ok());
    assert!(ScanPredicate::new(0, 3, Datatype::String, b"abcdef", Operator::Gte).is_ok());
}

#[test]
fn integer_operators() {
    let record = 42i32.to_ne_bytes();
    let cases = [
        (Operator::Lt, 43, true),
        (Operator::Lt, 42, false),
        (Operator::Lte, 42, true),
        (Operator::Lte, 41, false),
        (Operator::Eq, 42, true),
        (Operator::Eq, -42, false),
        (Operator::Gte, 42, true),
        (Operator::Gte, 43, false),
        (Operator::Gt, 41, true),
        (Operator::Gt, 42, false),
        (Operator::Ne, 0, true),
        (Operator::Ne, 42, false),
    ];
    for &(op, value, expected) in cases.iter() {
        assert_eq!(int_filter(value, op).matches(&record), expected, "{:?} {}", op, value);
    }
}

#[test]
fn integer_extremes_do_not_overflow() {
    let record = i32::MIN.to_ne_bytes();
    assert!(int_filter(i32::MAX, Operator::Lt).matches(&record));
    let record = i32::MAX.to_ne_bytes();
    assert!(int_filter(i32::MIN, Operator::Gt).matches(&record));
}

#[test]
fn float_comparison() {
    let filter = ScanPredicate::new(2, 4, Datatype::Float, &2.5f32.to_ne_bytes(), Operator::Gt)
        .unwrap();
    let mut record = vec![0u8; 6];
    record[2..6].copy_from_slice(&3.0f32.to_ne_bytes());
    assert!(filter.matches(&record));
    record[2..6].copy_from_slice(&(-3.0f32).to_ne_bytes());
    assert!(!filter.matches(&record));

    record[2..6].copy_from_slice(&f32::NAN.to_ne_bytes());
    assert!(!filter.matches(&record));
    let ne = ScanPredicate::new(2, 4, Datatype::Float, &2.5f32.to_ne_bytes(), Operator::Ne)
        .unwrap();
    assert!(ne.matches(&record));
}

#[test]
fn string_comparison_is_bytewise_and_ignores_nul() {
    let filter = ScanPredicate::new(1, 3, Datatype::String, b"b\0d", Operator::Eq).unwrap();
    assert!(filter.matches(b"ab\0d"));
    assert!(!filter.matches(b"ab\0e"));

    let lt = ScanPredicate::new(0, 3, Datatype::String, b"abc", Operator::Lt).unwrap();
    assert!(lt.matches(b"abb"));
    assert!(!lt.matches(b"abc"));
    // bytes above 0x7f sort after ASCII
    assert!(!lt.matches(&[0xC3, 0x00, 0x00]));
}

#[test]
fn attribute_past_record_end_never_matches() {
    let filter = ScanPredicate::new(4, 4, Datatype::Integer, &0i32.to_ne_bytes(), Operator::Ne)
        .unwrap();
    assert!(!filter.matches(&[1u8; 7]));
    assert!(filter.matches(&[1u8; 8]));
}
