#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::ui::forms::FormError;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn args(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

#[test]
fn test_add_args_with_date_and_description() {
    let input = parse_add_args(&args("1200 2024-03-05 lunch with team"), today()).unwrap();
    assert_eq!(input.amount, dec!(1200));
    assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    assert_eq!(input.description, "lunch with team");
}

#[test]
fn test_add_args_default_to_today() {
    let input = parse_add_args(&args("500 coffee"), today()).unwrap();
    assert_eq!(input.date, today());
    assert_eq!(input.description, "coffee");

    let input = parse_add_args(&args("500"), today()).unwrap();
    assert_eq!(input.date, today());
    assert!(input.description.is_empty());
}

#[test]
fn test_add_args_reject_malformed_date() {
    let err = parse_add_args(&args("500 2024-02-30 lunch"), today()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<FormError>(),
        Some(&FormError::InvalidDate("2024-02-30".into()))
    );
}

#[test]
fn test_add_args_reject_bad_amounts() {
    let err = parse_add_args(&args("79228162514264337593543950335"), today()).unwrap_err();
    assert_eq!(err.downcast_ref::<FormError>(), Some(&FormError::AmountTooLarge));

    let err = parse_add_args(&args("0"), today()).unwrap_err();
    assert_eq!(err.downcast_ref::<FormError>(), Some(&FormError::NonPositiveAmount));

    assert!(parse_add_args(&[], today()).is_err());
}
