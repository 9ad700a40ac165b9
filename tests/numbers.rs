use fluentseq::{Error, Fixed, Number, NumberExpr, Numberable, RoundMode};
use std::cmp::Ordering;
use std::sync::Arc;

#[test]
fn fixed_comparison_happens_at_the_left_scale() {
    // 100.005 vs 100.00499999999999999999999999999999: the right side is
    // truncated to three fractional digits (100.004) before comparing.
    let left: Fixed = "100.005".parse().unwrap();
    let right: Fixed = "100.00499999999999999999999999999999".parse().unwrap();

    assert_eq!(left.compare(&right), Ordering::Greater);
    // Swapping operands swaps the scale in charge: the left side is now
    // the high-precision one and keeps its digits.
    assert_eq!(right.compare(&left), Ordering::Less);

    // Equal at the left's scale even though the right has more digits.
    let a: Fixed = "1.50".parse().unwrap();
    let b: Fixed = "1.509".parse().unwrap();
    assert_eq!(a.compare(&b), Ordering::Equal);
    assert_eq!(b.compare(&a), Ordering::Greater);
}

#[test]
fn int_arithmetic_stays_int_until_it_cannot() {
    let six = Number::Int(6);
    let three = Number::Int(3);
    let four = Number::Int(4);

    assert_eq!(six.plus(&three), Number::Int(9));
    assert_eq!(six.times(&three), Number::Int(18));
    assert_eq!(six.divide(&three).unwrap(), Number::Int(2));
    // Inexact integer division promotes to Float.
    assert_eq!(six.divide(&four).unwrap(), Number::from(1.5));
    assert_eq!(six.modulo(&four).unwrap(), Number::Int(2));
}

#[test]
fn float_poisons_and_fixed_binds_ints() {
    let int = Number::Int(2);
    let float = Number::from(0.5);
    let cents = Number::from(Fixed::new(1_050, 2)); // 10.50

    assert!(matches!(int.plus(&float), Number::Float(_)));
    assert!(matches!(float.times(&cents), Number::Float(_)));

    // Fixed ∘ Int stays Fixed, at the Fixed operand's scale.
    assert_eq!(cents.plus(&int), Number::from(Fixed::new(1_250, 2)));
    assert_eq!(int.times(&cents), Number::from(Fixed::new(2_100, 2)));

    // Fixed ∘ Fixed works at the wider scale.
    let precise = Number::from(Fixed::new(10_500_5, 4)); // 10.5005
    assert_eq!(
        cents.plus(&precise),
        Number::from(Fixed::new(21_000_5, 4))
    );
}

#[test]
fn overflow_falls_back_to_float_instead_of_wrapping() {
    let max = Number::Int(i64::MAX);
    assert!(matches!(max.plus(&Number::Int(1)), Number::Float(_)));
    assert!(matches!(max.times(&Number::Int(2)), Number::Float(_)));
    assert!(matches!(
        Number::Int(i64::MIN).minus(&Number::Int(1)),
        Number::Float(_)
    ));
}

#[test]
fn int_min_edges_promote_instead_of_overflowing() {
    let min = Number::Int(i64::MIN);
    let minus_one = Number::Int(-1);

    // i64::MIN / -1 and i64::MIN % -1 have no i64 result.
    assert!(matches!(min.divide(&minus_one).unwrap(), Number::Float(_)));
    assert!(matches!(min.modulo(&minus_one).unwrap(), Number::Float(_)));
    assert!(matches!(min.negate(), Number::Float(_)));
    assert!(matches!(min.abs(), Number::Float(_)));

    // One above the edge still has an exact integer answer.
    assert_eq!(Number::Int(i64::MIN + 1).abs(), Number::Int(i64::MAX));
    assert_eq!(Number::Int(i64::MIN + 1).negate(), Number::Int(i64::MAX));
    assert_eq!(
        Number::Int(i64::MIN).divide(&Number::Int(2)).unwrap(),
        Number::Int(i64::MIN / 2)
    );
}

#[test]
fn oversized_literals_fail_to_parse_instead_of_overflowing() {
    // 45 significant digits cannot fit the i128 backing.
    let wide = "123456789012345678901234567890123456789012345";
    assert!(matches!(wide.parse::<Fixed>(), Err(Error::InvalidNumber(_))));

    let deep = format!("0.{}", "9".repeat(45));
    assert!(matches!(deep.parse::<Fixed>(), Err(Error::InvalidNumber(_))));

    // Number's parse delegates for decimal literals.
    assert!(matches!(wide.parse::<Number>(), Err(Error::InvalidNumber(_))));

    // The widest representable shapes still parse.
    let nines = "9".repeat(38);
    assert!(nines.parse::<Fixed>().is_ok());
    assert!(format!("0.{}", "1".repeat(38)).parse::<Fixed>().is_ok());
}

#[test]
fn division_by_zero_is_an_error_for_every_backing() {
    let zero_int = Number::Int(0);
    let zero_fixed = Number::from(Fixed::new(0, 2));

    assert_eq!(
        Number::Int(1).divide(&zero_int).unwrap_err(),
        Error::DivisionByZero
    );
    assert_eq!(
        Number::from(Fixed::new(100, 2)).divide(&zero_fixed).unwrap_err(),
        Error::DivisionByZero
    );
    assert_eq!(
        Number::Int(1).modulo(&zero_int).unwrap_err(),
        Error::DivisionByZero
    );
}

#[test]
fn rounding_modes_on_fixed_values() {
    let price = Number::from(Fixed::new(1_995, 3)); // 1.995

    assert_eq!(price.round(2), Number::from(Fixed::new(200, 2)));
    assert_eq!(price.floor(2), Number::from(Fixed::new(199, 2)));
    assert_eq!(price.ceil(2), Number::from(Fixed::new(200, 2)));

    let negative = Number::from(Fixed::new(-1_995, 3));
    assert_eq!(negative.round(2), Number::from(Fixed::new(-200, 2)));
    assert_eq!(negative.floor(2), Number::from(Fixed::new(-200, 2)));
    assert_eq!(negative.ceil(2), Number::from(Fixed::new(-199, 2)));

    // Ints are already integral at every scale.
    assert_eq!(Number::Int(7).round(2), Number::Int(7));
}

#[test]
fn fixed_arithmetic_never_rounds_implicitly() {
    let a: Fixed = "10.00".parse().unwrap();
    let b: Fixed = "3.0".parse().unwrap();

    // Division truncates toward zero at the wider scale.
    assert_eq!(a.divide(&b).unwrap(), Fixed::new(333, 2));
    assert_eq!(a.times(&b), Fixed::new(3_000, 2));
    assert_eq!(a.minus(&b), Fixed::new(700, 2));
}

#[test]
fn parsing_and_display_round_trip() {
    assert_eq!("42".parse::<Number>().unwrap(), Number::Int(42));
    assert_eq!(
        "19.99".parse::<Number>().unwrap(),
        Number::from(Fixed::new(1_999, 2))
    );
    assert_eq!(
        "not a number".parse::<Number>().unwrap_err(),
        Error::InvalidNumber("not a number".to_string())
    );
    assert_eq!("12.5.0".parse::<Number>().unwrap_err(), Error::InvalidNumber("12.5.0".to_string()));

    assert_eq!(Number::from(Fixed::new(-50, 2)).to_string(), "-0.50");
    assert_eq!(Number::Int(-7).to_string(), "-7");
}

#[test]
fn integer_accessors_respect_range() {
    assert_eq!(Number::Int(200).as_u8(), None);
    assert_eq!(Number::Int(200).as_i16(), Some(200));
    assert_eq!(Number::Int(-1).as_u32(), None);
    assert_eq!(Number::from(1.5).as_i64(), None);
}

#[test]
fn expression_trees_defer_evaluation_and_failures() {
    let subtotal = NumberExpr::new(Fixed::new(1_999, 2)); // 19.99
    let quantity = NumberExpr::new(3);
    let total = subtotal.times(&quantity).rounded(2, RoundMode::HalfAway);

    assert_eq!(total.to_number().unwrap(), Number::from(Fixed::new(5_997, 2)));

    // Building a division by zero is fine; evaluating it is not.
    let broken = total.divide(&NumberExpr::new(0));
    assert_eq!(broken.to_number().unwrap_err(), Error::DivisionByZero);

    // Re-evaluating the same tree is harmless (pure nodes).
    assert_eq!(total.to_number().unwrap(), Number::from(Fixed::new(5_997, 2)));
}

#[test]
fn external_numberables_plug_into_expressions() {
    struct Tally(Vec<i64>);
    impl Numberable for Tally {
        fn to_number(&self) -> fluentseq::Result<Number> {
            Ok(Number::Int(self.0.iter().sum()))
        }
    }

    let sum = NumberExpr::from_numberable(Arc::new(Tally(vec![1, 2, 3])));
    let average = sum.divide(&NumberExpr::new(3));
    assert_eq!(average.to_number().unwrap(), Number::Int(2));
}

#[test]
fn numbers_serialize_with_serde() -> anyhow::Result<()> {
    let n = Number::from(Fixed::new(1_999, 2));
    let json = serde_json::to_string(&n)?;
    let back: Number = serde_json::from_str(&json)?;
    assert_eq!(back, n);
    Ok(())
}
