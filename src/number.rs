//! Numeric value objects.
//!
//! [`Number`] is a small immutable value with three backings — integer,
//! float, and fixed-point decimal — and arithmetic that promotes by
//! fixed rules:
//!
//! - `Int ∘ Int → Int` (falling back to `Float` on overflow, and for
//!   inexact division);
//! - any `Float` operand poisons the result to `Float`;
//! - `Fixed ∘ Int → Fixed`, `Fixed ∘ Fixed → Fixed` at the wider scale.
//!
//! [`Fixed`] keeps an explicit decimal scale (cents-style fixed point)
//! and never rounds implicitly: narrowing truncates toward zero, and
//! comparison happens at the *left* operand's scale, so
//! `100.005 > 100.00499…` regardless of the right side's precision.
//!
//! [`NumberExpr`] is a deferred arithmetic expression tree over
//! [`Numberable`] nodes — the numeric twin of the
//! [`Arrayable`](crate::arrayable::Arrayable) composition pattern.
//! Nothing evaluates until `to_number`, and failures (division by zero)
//! surface there.

use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use paste::paste;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/* ===================== Fixed ===================== */

/// A fixed-scale decimal: `units / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixed {
    units: i128,
    scale: u32,
}

fn pow10(n: u32) -> i128 {
    10i128.pow(n)
}

// i128 holds every power of ten up to 10^38, so parsed scales are capped
// there; rescaling and Display stay within `pow10`'s range.
const MAX_SCALE: u32 = 38;

/// How to resolve a digit lost when narrowing scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    /// Round half away from zero.
    HalfAway,
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
}

impl Fixed {
    /// `units / 10^scale`, e.g. `Fixed::new(100_005, 3)` is `100.005`.
    #[must_use]
    pub const fn new(units: i128, scale: u32) -> Self {
        Self { units, scale }
    }

    #[must_use]
    pub const fn from_int(v: i64) -> Self {
        Self { units: v as i128, scale: 0 }
    }

    #[must_use]
    pub const fn units(&self) -> i128 {
        self.units
    }

    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.units == 0
    }

    /// Change scale. Widening is exact; narrowing truncates toward zero.
    #[must_use]
    pub fn rescale(&self, scale: u32) -> Self {
        if scale >= self.scale {
            Self { units: self.units * pow10(scale - self.scale), scale }
        } else {
            Self { units: self.units / pow10(self.scale - scale), scale }
        }
    }

    /// Change scale with an explicit policy for the lost digits.
    #[must_use]
    pub fn rescale_with(&self, scale: u32, mode: RoundMode) -> Self {
        if scale >= self.scale {
            return self.rescale(scale);
        }
        let div = pow10(self.scale - scale);
        let q = self.units / div;
        let r = self.units % div;
        let units = match mode {
            RoundMode::HalfAway => {
                if 2 * r.abs() >= div {
                    q + r.signum()
                } else {
                    q
                }
            }
            RoundMode::Floor => {
                if r < 0 {
                    q - 1
                } else {
                    q
                }
            }
            RoundMode::Ceil => {
                if r > 0 {
                    q + 1
                } else {
                    q
                }
            }
        };
        Self { units, scale }
    }

    /// Three-way comparison **at the left operand's scale**: the right
    /// side is truncated to `self.scale` before comparing, so extra
    /// precision on the right cannot flip the result.
    #[must_use]
    pub fn compare(&self, other: &Fixed) -> Ordering {
        self.units.cmp(&other.rescale(self.scale).units)
    }

    /// Addition at the wider of the two scales.
    #[must_use]
    pub fn plus(&self, other: &Fixed) -> Fixed {
        let scale = self.scale.max(other.scale);
        Fixed::new(self.rescale(scale).units + other.rescale(scale).units, scale)
    }

    /// Subtraction at the wider of the two scales.
    #[must_use]
    pub fn minus(&self, other: &Fixed) -> Fixed {
        let scale = self.scale.max(other.scale);
        Fixed::new(self.rescale(scale).units - other.rescale(scale).units, scale)
    }

    /// Multiplication, truncated back to the wider of the two scales.
    #[must_use]
    pub fn times(&self, other: &Fixed) -> Fixed {
        let scale = self.scale.max(other.scale);
        Fixed::new(self.units * other.units, self.scale + other.scale).rescale(scale)
    }

    /// Division at the wider of the two scales, truncating toward zero.
    /// [`Error::DivisionByZero`] on a zero divisor.
    pub fn divide(&self, other: &Fixed) -> Result<Fixed> {
        if other.units == 0 {
            return Err(Error::DivisionByZero);
        }
        let scale = self.scale.max(other.scale);
        let numerator = self.units * pow10(other.scale + scale);
        let denominator = other.units * pow10(self.scale);
        Ok(Fixed::new(numerator / denominator, scale))
    }

    /// Remainder at the wider of the two scales.
    pub fn modulo(&self, other: &Fixed) -> Result<Fixed> {
        if other.units == 0 {
            return Err(Error::DivisionByZero);
        }
        let scale = self.scale.max(other.scale);
        Ok(Fixed::new(
            self.rescale(scale).units % other.rescale(scale).units,
            scale,
        ))
    }

    #[must_use]
    pub fn abs(&self) -> Fixed {
        Fixed::new(self.units.abs(), self.scale)
    }

    #[must_use]
    pub fn neg(&self) -> Fixed {
        Fixed::new(-self.units, self.scale)
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.units as f64 / pow10(self.scale) as f64
    }
}

impl FromStr for Fixed {
    type Err = Error;

    /// Parses `[-+]digits[.digits]`; the scale is the fractional digit
    /// count. Anything else is [`Error::InvalidNumber`] — construction
    /// validates, there are no partial values. Literals that do not fit
    /// the `i128` backing, or carry more than 38 fractional digits, are
    /// rejected the same way rather than overflowing later.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidNumber(s.to_string());
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i128, rest),
            None => (1i128, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        let digits = |p: &str| {
            p.is_empty() || p.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(int_part) || !digits(frac_part) {
            return Err(bad());
        }
        if frac_part.len() > MAX_SCALE as usize {
            return Err(bad());
        }
        let scale = frac_part.len() as u32;
        let mut units: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(i128::from(b - b'0')))
                .ok_or_else(bad)?;
        }
        Ok(Fixed::new(sign * units, scale))
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let abs = self.units.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{abs}");
        }
        let div = pow10(self.scale) as u128;
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / div,
            abs % div,
            width = self.scale as usize
        )
    }
}

/* ===================== Number ===================== */

/// An immutable numeric value with promotion-aware arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(OrderedFloat<f64>),
    Fixed(Fixed),
}

impl Number {
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(x) => x.0,
            Number::Fixed(x) => x.to_f64(),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => *i == 0,
            Number::Float(x) => x.0 == 0.0,
            Number::Fixed(x) => x.is_zero(),
        }
    }

    fn float(v: f64) -> Number {
        Number::Float(OrderedFloat(v))
    }

    /// Addition under the promotion rules.
    #[must_use]
    pub fn plus(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(*b)
                .map_or_else(|| Self::float(*a as f64 + *b as f64), Number::Int),
            (Number::Fixed(a), Number::Fixed(b)) => Number::Fixed(a.plus(b)),
            (Number::Fixed(a), Number::Int(b)) => Number::Fixed(a.plus(&Fixed::from_int(*b))),
            (Number::Int(a), Number::Fixed(b)) => Number::Fixed(Fixed::from_int(*a).plus(b)),
            _ => Self::float(self.to_f64() + other.to_f64()),
        }
    }

    /// Subtraction under the promotion rules.
    #[must_use]
    pub fn minus(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(*b)
                .map_or_else(|| Self::float(*a as f64 - *b as f64), Number::Int),
            (Number::Fixed(a), Number::Fixed(b)) => Number::Fixed(a.minus(b)),
            (Number::Fixed(a), Number::Int(b)) => Number::Fixed(a.minus(&Fixed::from_int(*b))),
            (Number::Int(a), Number::Fixed(b)) => Number::Fixed(Fixed::from_int(*a).minus(b)),
            _ => Self::float(self.to_f64() - other.to_f64()),
        }
    }

    /// Multiplication under the promotion rules.
    #[must_use]
    pub fn times(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(*b)
                .map_or_else(|| Self::float(*a as f64 * *b as f64), Number::Int),
            (Number::Fixed(a), Number::Fixed(b)) => Number::Fixed(a.times(b)),
            (Number::Fixed(a), Number::Int(b)) => Number::Fixed(a.times(&Fixed::from_int(*b))),
            (Number::Int(a), Number::Fixed(b)) => Number::Fixed(Fixed::from_int(*a).times(b)),
            _ => Self::float(self.to_f64() * other.to_f64()),
        }
    }

    /// Division. `Int / Int` stays `Int` when exact and promotes to
    /// `Float` otherwise; [`Error::DivisionByZero`] on a zero divisor.
    pub fn divide(&self, other: &Number) -> Result<Number> {
        if other.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(match (self, other) {
            // checked_rem covers the i64::MIN / -1 overflow edge.
            (Number::Int(a), Number::Int(b)) => match (a.checked_rem(*b), a.checked_div(*b)) {
                (Some(0), Some(q)) => Number::Int(q),
                _ => Self::float(*a as f64 / *b as f64),
            },
            (Number::Fixed(a), Number::Fixed(b)) => Number::Fixed(a.divide(b)?),
            (Number::Fixed(a), Number::Int(b)) => Number::Fixed(a.divide(&Fixed::from_int(*b))?),
            (Number::Int(a), Number::Fixed(b)) => Number::Fixed(Fixed::from_int(*a).divide(b)?),
            _ => Self::float(self.to_f64() / other.to_f64()),
        })
    }

    /// Remainder; [`Error::DivisionByZero`] on a zero divisor.
    pub fn modulo(&self, other: &Number) -> Result<Number> {
        if other.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_rem(*b)
                .map_or_else(|| Self::float(*a as f64 % *b as f64), Number::Int),
            (Number::Fixed(a), Number::Fixed(b)) => Number::Fixed(a.modulo(b)?),
            (Number::Fixed(a), Number::Int(b)) => Number::Fixed(a.modulo(&Fixed::from_int(*b))?),
            (Number::Int(a), Number::Fixed(b)) => Number::Fixed(Fixed::from_int(*a).modulo(b)?),
            _ => Self::float(self.to_f64() % other.to_f64()),
        })
    }

    #[must_use]
    pub fn negate(&self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map_or_else(|| Self::float(-(*i as f64)), Number::Int),
            Number::Float(x) => Number::Float(OrderedFloat(-x.0)),
            Number::Fixed(x) => Number::Fixed(x.neg()),
        }
    }

    #[must_use]
    pub fn abs(&self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_abs()
                .map_or_else(|| Self::float((*i as f64).abs()), Number::Int),
            Number::Float(x) => Number::Float(OrderedFloat(x.0.abs())),
            Number::Fixed(x) => Number::Fixed(x.abs()),
        }
    }

    /// Rounds to `scale` fractional digits under the given mode. `Int`
    /// is already integral at every scale; `Fixed` narrows (or keeps its
    /// scale when already narrower).
    #[must_use]
    pub fn round_with(&self, scale: u32, mode: RoundMode) -> Number {
        match self {
            Number::Int(i) => Number::Int(*i),
            Number::Float(x) => {
                let p = 10f64.powi(scale as i32);
                let scaled = x.0 * p;
                let r = match mode {
                    RoundMode::HalfAway => scaled.round(),
                    RoundMode::Floor => scaled.floor(),
                    RoundMode::Ceil => scaled.ceil(),
                };
                Self::float(r / p)
            }
            Number::Fixed(x) => {
                if x.scale() <= scale {
                    Number::Fixed(*x)
                } else {
                    Number::Fixed(x.rescale_with(scale, mode))
                }
            }
        }
    }

    /// Round half away from zero at `scale`.
    #[must_use]
    pub fn round(&self, scale: u32) -> Number {
        self.round_with(scale, RoundMode::HalfAway)
    }

    /// Round toward negative infinity at `scale`.
    #[must_use]
    pub fn floor(&self, scale: u32) -> Number {
        self.round_with(scale, RoundMode::Floor)
    }

    /// Round toward positive infinity at `scale`.
    #[must_use]
    pub fn ceil(&self, scale: u32) -> Number {
        self.round_with(scale, RoundMode::Ceil)
    }

    /// Three-way numeric comparison across backings. `Fixed` vs `Fixed`
    /// compares at the left operand's scale ([`Fixed::compare`]); mixed
    /// float comparisons go through `f64`.
    #[must_use]
    pub fn compare(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            (Number::Fixed(a), Number::Fixed(b)) => a.compare(b),
            (Number::Fixed(a), Number::Int(b)) => a.compare(&Fixed::from_int(*b)),
            (Number::Int(a), Number::Fixed(b)) => Fixed::from_int(*a).compare(b),
            _ => OrderedFloat(self.to_f64()).cmp(&OrderedFloat(other.to_f64())),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{}", x.0),
            Number::Fixed(x) => write!(f, "{x}"),
        }
    }
}

impl FromStr for Number {
    type Err = Error;

    /// `Int` when the literal has no fractional part, `Fixed` otherwise.
    fn from_str(s: &str) -> Result<Self> {
        if s.contains('.') {
            Ok(Number::Fixed(s.parse()?))
        } else {
            s.parse::<i64>()
                .map(Number::Int)
                .map_err(|_| Error::InvalidNumber(s.to_string()))
        }
    }
}

macro_rules! number_int_conversions {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number::Int(v as i64)
                }
            }
            paste! {
                impl Number {
                    #[doc = concat!("The value as `", stringify!($t), "`, when integer-backed and in range.")]
                    #[must_use]
                    pub fn [<as_ $t>](&self) -> Option<$t> {
                        match self {
                            Number::Int(i) => <$t>::try_from(*i).ok(),
                            _ => None,
                        }
                    }
                }
            }
        )*
    };
}

number_int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(OrderedFloat(v))
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(OrderedFloat(f64::from(v)))
    }
}

impl From<Fixed> for Number {
    fn from(v: Fixed) -> Self {
        Number::Fixed(v)
    }
}

impl std::ops::Add for Number {
    type Output = Number;
    fn add(self, rhs: Number) -> Number {
        self.plus(&rhs)
    }
}

impl std::ops::Sub for Number {
    type Output = Number;
    fn sub(self, rhs: Number) -> Number {
        self.minus(&rhs)
    }
}

impl std::ops::Mul for Number {
    type Output = Number;
    fn mul(self, rhs: Number) -> Number {
        self.times(&rhs)
    }
}

impl std::ops::Neg for Number {
    type Output = Number;
    fn neg(self) -> Number {
        self.negate()
    }
}

/* ===================== expression tree ===================== */

/// Capability: evaluate to a [`Number`]. The numeric analog of
/// [`Arrayable`](crate::arrayable::Arrayable) — expression nodes hold
/// their operands and defer all work (and all failures) to `to_number`.
pub trait Numberable {
    fn to_number(&self) -> Result<Number>;
}

impl Numberable for Number {
    fn to_number(&self) -> Result<Number> {
        Ok(*self)
    }
}

impl Numberable for Fixed {
    fn to_number(&self) -> Result<Number> {
        Ok(Number::Fixed(*self))
    }
}

struct BinaryNode<F> {
    a: Arc<dyn Numberable>,
    b: Arc<dyn Numberable>,
    op: F,
}

impl<F> Numberable for BinaryNode<F>
where
    F: Fn(&Number, &Number) -> Result<Number>,
{
    fn to_number(&self) -> Result<Number> {
        (self.op)(&self.a.to_number()?, &self.b.to_number()?)
    }
}

struct RoundedNode {
    inner: Arc<dyn Numberable>,
    scale: u32,
    mode: RoundMode,
}

impl Numberable for RoundedNode {
    fn to_number(&self) -> Result<Number> {
        Ok(self.inner.to_number()?.round_with(self.scale, self.mode))
    }
}

/// A deferred arithmetic expression over [`Numberable`] operands.
#[derive(Clone)]
pub struct NumberExpr {
    node: Arc<dyn Numberable>,
}

impl NumberExpr {
    pub fn new(value: impl Into<Number>) -> Self {
        Self { node: Arc::new(value.into()) }
    }

    /// Admits any [`Numberable`] — including external implementors — as
    /// an expression leaf.
    pub fn from_numberable(node: Arc<dyn Numberable>) -> Self {
        Self { node }
    }

    fn binary(
        &self,
        other: &NumberExpr,
        op: impl Fn(&Number, &Number) -> Result<Number> + 'static,
    ) -> Self {
        Self {
            node: Arc::new(BinaryNode {
                a: Arc::clone(&self.node),
                b: Arc::clone(&other.node),
                op,
            }),
        }
    }

    #[must_use]
    pub fn plus(&self, other: &NumberExpr) -> Self {
        self.binary(other, |a, b| Ok(a.plus(b)))
    }

    #[must_use]
    pub fn minus(&self, other: &NumberExpr) -> Self {
        self.binary(other, |a, b| Ok(a.minus(b)))
    }

    #[must_use]
    pub fn times(&self, other: &NumberExpr) -> Self {
        self.binary(other, |a, b| Ok(a.times(b)))
    }

    /// Division node; a zero divisor surfaces at `to_number`, not here.
    #[must_use]
    pub fn divide(&self, other: &NumberExpr) -> Self {
        self.binary(other, Number::divide)
    }

    #[must_use]
    pub fn modulo(&self, other: &NumberExpr) -> Self {
        self.binary(other, Number::modulo)
    }

    #[must_use]
    pub fn rounded(&self, scale: u32, mode: RoundMode) -> Self {
        Self {
            node: Arc::new(RoundedNode {
                inner: Arc::clone(&self.node),
                scale,
                mode,
            }),
        }
    }

    /// Evaluates the whole tree; the single point where deferred
    /// arithmetic failures surface.
    pub fn to_number(&self) -> Result<Number> {
        self.node.to_number()
    }
}

impl Numberable for NumberExpr {
    fn to_number(&self) -> Result<Number> {
        self.node.to_number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_parses_and_displays() {
        let x: Fixed = "100.005".parse().unwrap();
        assert_eq!(x, Fixed::new(100_005, 3));
        assert_eq!(x.to_string(), "100.005");
        assert_eq!("-0.50".parse::<Fixed>().unwrap().to_string(), "-0.50");
        assert!("12,5".parse::<Fixed>().is_err());
        assert!("".parse::<Fixed>().is_err());
    }

    #[test]
    fn fixed_narrowing_truncates_toward_zero() {
        let x = Fixed::new(-1_999, 3); // -1.999
        assert_eq!(x.rescale(1), Fixed::new(-19, 1));
        assert_eq!(x.rescale_with(1, RoundMode::HalfAway), Fixed::new(-20, 1));
        assert_eq!(x.rescale_with(0, RoundMode::Floor), Fixed::new(-2, 0));
        assert_eq!(x.rescale_with(0, RoundMode::Ceil), Fixed::new(-1, 0));
    }

    #[test]
    fn int_overflow_promotes_to_float() {
        let big = Number::Int(i64::MAX);
        assert!(matches!(big.plus(&Number::Int(1)), Number::Float(_)));
    }
}
