//! Assertion predicates.
//!
//! Every predicate is `#[track_caller]`: the reported `<file>:<line>` is the line of the
//! test body that called it. A violated predicate never returns, see [`crate::channel`].

use core::{cmp::Ordering, fmt, panic::Location};

use crate::channel;

/// Relative epsilon used by the double precision helpers.
pub const DBL_EPSILON: f64 = 1e-12;
/// Relative epsilon used by the single precision helpers.
pub const FLT_EPSILON: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::NotEqual => "!=",
            Relation::Less => "<",
            Relation::LessEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterEqual => ">=",
        }
    }

    /// `ordering` is `expected.cmp(real)`, `eq` decides the tie.
    fn holds(self, ordering: Ordering, eq: bool) -> bool {
        match self {
            Relation::Equal => eq,
            Relation::NotEqual => !eq,
            Relation::Less => ordering.is_lt(),
            Relation::LessEqual => ordering.is_lt() || eq,
            Relation::Greater => ordering.is_gt(),
            Relation::GreaterEqual => ordering.is_gt() || eq,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrRelation {
    Equal,
    NotEqual,
    Contains,
    NotContains,
}

impl StrRelation {
    pub fn symbol(self) -> &'static str {
        match self {
            StrRelation::Equal => "==",
            StrRelation::NotEqual => "!=",
            StrRelation::Contains => "=~",
            StrRelation::NotContains => "!~",
        }
    }
}

/// Widening to the signed comparison domain. Behaves like an `as` cast.
pub trait IntMax: Copy {
    fn to_intmax(self) -> i64;
}

/// Widening to the unsigned comparison domain. Behaves like an `as` cast.
pub trait UIntMax: Copy {
    fn to_uintmax(self) -> u64;
}

macro_rules! impl_int_max {
    ($($t:ty),*) => {
        $(
            impl IntMax for $t {
                #[inline(always)]
                fn to_intmax(self) -> i64 {
                    self as i64
                }
            }

            impl UIntMax for $t {
                #[inline(always)]
                fn to_uintmax(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_int_max!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

pub trait Nullable {
    fn is_null_value(&self) -> bool;
}

impl<T> Nullable for Option<T> {
    fn is_null_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: ?Sized> Nullable for *const T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nullable for *mut T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<N: Nullable> Nullable for &N {
    fn is_null_value(&self) -> bool {
        (**self).is_null_value()
    }
}

#[track_caller]
fn failure(details: fmt::Arguments<'_>) -> ! {
    let caller = Location::caller();

    channel::fail(format_args!("{}:{}  {}", caller.file(), caller.line(), details))
}

struct NullableStr<'a>(Option<&'a str>);

impl fmt::Display for NullableStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or("(null)"))
    }
}

/// `printf("%.<precision>g")` style rendering.
struct General {
    value: f64,
    precision: usize,
}

impl General {
    fn trim(text: &str) -> &str {
        if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.')
        } else {
            text
        }
    }
}

impl fmt::Display for General {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self.precision.max(1);

        if !self.value.is_finite() || self.value == 0.0 {
            return write!(f, "{}", self.value);
        }

        let scientific = format!("{:.*e}", precision - 1, self.value);
        let Some((mantissa, exponent)) = scientific.split_once('e') else {
            return f.write_str(&scientific);
        };
        let Ok(exponent) = exponent.parse::<i32>() else {
            return f.write_str(&scientific);
        };

        if exponent < -4 || exponent >= precision as i32 {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", Self::trim(mantissa), sign, exponent.abs())
        } else {
            let decimals = (precision as i32 - 1 - exponent) as usize;
            f.write_str(Self::trim(&format!("{:.*}", decimals, self.value)))
        }
    }
}

fn approximately_equal(a: f64, b: f64, epsilon: f64) -> bool {
    let diff = (a - b).abs();

    diff <= a.abs().max(b.abs()) * epsilon
}

/// String relation. A missing operand only passes when both are missing.
#[track_caller]
pub fn assert_str_relation(relation: StrRelation, expected: Option<&str>, real: Option<&str>) {
    let holds = match (expected, real) {
        (None, None) => true,
        (Some(expected), Some(real)) => match relation {
            StrRelation::Equal => expected == real,
            StrRelation::NotEqual => expected != real,
            StrRelation::Contains => expected.contains(real),
            StrRelation::NotContains => !expected.contains(real),
        },
        _ => false,
    };

    if !holds {
        failure(format_args!(
            "assertion failed, '{}' {} '{}'",
            NullableStr(expected),
            relation.symbol(),
            NullableStr(real)
        ));
    }
}

#[track_caller]
pub fn assert_str<'a, 'b>(expected: impl Into<Option<&'a str>>, real: impl Into<Option<&'b str>>) {
    assert_str_relation(StrRelation::Equal, expected.into(), real.into());
}

#[track_caller]
pub fn assert_not_str<'a, 'b>(
    expected: impl Into<Option<&'a str>>,
    real: impl Into<Option<&'b str>>,
) {
    assert_str_relation(StrRelation::NotEqual, expected.into(), real.into());
}

/// `text` must contain `substr`.
#[track_caller]
pub fn assert_strstr<'a, 'b>(text: impl Into<Option<&'a str>>, substr: impl Into<Option<&'b str>>) {
    assert_str_relation(StrRelation::Contains, text.into(), substr.into());
}

#[track_caller]
pub fn assert_not_strstr<'a, 'b>(
    text: impl Into<Option<&'a str>>,
    substr: impl Into<Option<&'b str>>,
) {
    assert_str_relation(StrRelation::NotContains, text.into(), substr.into());
}

/// Lengths are compared first; contents only when the lengths agree.
#[track_caller]
pub fn assert_data(expected: &[u8], real: &[u8]) {
    if expected.len() != real.len() {
        failure(format_args!(
            "expected {} bytes, got {}",
            expected.len(),
            real.len()
        ));
    }

    if let Some((offset, (exp, act))) = expected
        .iter()
        .zip(real)
        .enumerate()
        .find(|(_, (exp, act))| exp != act)
    {
        failure(format_args!(
            "expected {:#04x} at offset {} got {:#04x}",
            exp, offset, act
        ));
    }
}

#[track_caller]
pub fn assert_compare(relation: Relation, expected: i64, real: i64) {
    let ordering = expected.cmp(&real);

    if !relation.holds(ordering, ordering.is_eq()) {
        failure(format_args!(
            "assertion failed, {} {} {}",
            expected, relation, real
        ));
    }
}

#[track_caller]
pub fn assert_compare_u(relation: Relation, expected: u64, real: u64) {
    let ordering = expected.cmp(&real);

    if !relation.holds(ordering, ordering.is_eq()) {
        failure(format_args!(
            "assertion failed, {} {} {}",
            expected, relation, real
        ));
    }
}

macro_rules! relation_helpers {
    ($compare:ident, $bound:ident, $widen:ident: $($name:ident => $relation:ident),* $(,)?) => {
        $(
            #[track_caller]
            pub fn $name(expected: impl $bound, real: impl $bound) {
                $compare(Relation::$relation, expected.$widen(), real.$widen());
            }
        )*
    };
}

relation_helpers!(assert_compare, IntMax, to_intmax:
    assert_equal => Equal,
    assert_not_equal => NotEqual,
    assert_lt => Less,
    assert_le => LessEqual,
    assert_gt => Greater,
    assert_ge => GreaterEqual,
);

relation_helpers!(assert_compare_u, UIntMax, to_uintmax:
    assert_equal_u => Equal,
    assert_not_equal_u => NotEqual,
    assert_lt_u => Less,
    assert_le_u => LessEqual,
    assert_gt_u => Greater,
    assert_ge_u => GreaterEqual,
);

/// `real` must lie in the closed interval `[lower, upper]`.
#[track_caller]
pub fn assert_interval(lower: impl IntMax, upper: impl IntMax, real: impl IntMax) {
    let (lower, upper, real) = (lower.to_intmax(), upper.to_intmax(), real.to_intmax());

    if real < lower || real > upper {
        failure(format_args!("expected {}-{}, got {}", lower, upper, real));
    }
}

/// A negative `tolerance` is a relative epsilon, anything else an absolute bound.
#[track_caller]
pub fn assert_dbl_compare(relation: Relation, expected: f64, real: f64, tolerance: f64) {
    let diff = expected - real;
    let ordering = expected.partial_cmp(&real).unwrap_or(Ordering::Equal);
    let eq = if tolerance < 0.0 {
        approximately_equal(expected, real, -tolerance)
    } else {
        diff.abs() <= tolerance
    };

    if !relation.holds(ordering, eq) {
        let (label, tolerance) = if tolerance < 0.0 {
            ("eps", -tolerance)
        } else {
            ("tol", tolerance)
        };

        failure(format_args!(
            "assertion failed, {} {} {} (diff {}, {} {})",
            General { value: expected, precision: 8 },
            relation,
            General { value: real, precision: 8 },
            General { value: diff, precision: 4 },
            label,
            General { value: tolerance, precision: 4 },
        ));
    }
}

#[track_caller]
pub fn assert_dbl_near(expected: f64, real: f64) {
    assert_dbl_compare(Relation::Equal, expected, real, -DBL_EPSILON);
}

#[track_caller]
pub fn assert_dbl_near_tol(expected: f64, real: f64, tolerance: f64) {
    assert_dbl_compare(Relation::Equal, expected, real, tolerance);
}

#[track_caller]
pub fn assert_dbl_far(expected: f64, real: f64) {
    assert_dbl_compare(Relation::NotEqual, expected, real, -DBL_EPSILON);
}

#[track_caller]
pub fn assert_dbl_far_tol(expected: f64, real: f64, tolerance: f64) {
    assert_dbl_compare(Relation::NotEqual, expected, real, tolerance);
}

#[track_caller]
pub fn assert_flt_near(expected: f32, real: f32) {
    assert_dbl_compare(Relation::Equal, expected.into(), real.into(), -FLT_EPSILON);
}

#[track_caller]
pub fn assert_flt_far(expected: f32, real: f32) {
    assert_dbl_compare(Relation::NotEqual, expected.into(), real.into(), -FLT_EPSILON);
}

#[track_caller]
pub fn assert_dbl_lt(v1: f64, v2: f64) {
    assert_dbl_compare(Relation::Less, v1, v2, 0.0);
}

#[track_caller]
pub fn assert_dbl_gt(v1: f64, v2: f64) {
    assert_dbl_compare(Relation::Greater, v1, v2, 0.0);
}

#[track_caller]
pub fn assert_null(real: impl Nullable) {
    if !real.is_null_value() {
        failure(format_args!("should be NULL"));
    }
}

#[track_caller]
pub fn assert_not_null(real: impl Nullable) {
    if real.is_null_value() {
        failure(format_args!("should not be NULL"));
    }
}

#[track_caller]
pub fn assert_true(real: bool) {
    if !real {
        failure(format_args!("should be true"));
    }
}

#[track_caller]
pub fn assert_false(real: bool) {
    if real {
        failure(format_args!("should be false"));
    }
}

#[track_caller]
pub fn assert_fail() -> ! {
    failure(format_args!("shouldn't come here"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, UnwindSafe};

    /// Runs `f` without an armed channel and returns the panic message, if any.
    fn failure_message(f: impl FnOnce() + UnwindSafe) -> Option<String> {
        let payload = panic::catch_unwind(f).err()?;

        payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
    }

    fn details(f: impl FnOnce() + UnwindSafe) -> String {
        let message = failure_message(f).expect("assertion should have failed");
        let (_, details) = message.split_once("  ").expect("missing location prefix");
        details.to_string()
    }

    fn passes(f: impl FnOnce() + UnwindSafe) -> bool {
        failure_message(f).is_none()
    }

    #[test]
    fn test_message_carries_caller_location() {
        let line = line!() + 1;
        let message = failure_message(|| assert_true(false)).unwrap();

        assert_eq!(message, format!("{}:{}  should be true", file!(), line));
    }

    #[test]
    fn test_str_relations() {
        assert!(passes(|| assert_str("foo", "foo")));
        assert!(passes(|| assert_not_str("foo", "bar")));
        assert!(passes(|| assert_strstr("football", "ball")));
        assert!(passes(|| assert_not_strstr("football", "golf")));

        assert_eq!(
            details(|| assert_str("foo", "bar")),
            "assertion failed, 'foo' == 'bar'"
        );
        assert_eq!(
            details(|| assert_strstr("foo", "bar")),
            "assertion failed, 'foo' =~ 'bar'"
        );
    }

    #[test]
    fn test_str_null_is_always_a_mismatch() {
        assert_eq!(
            details(|| assert_not_str(None::<&str>, "bar")),
            "assertion failed, '(null)' != 'bar'"
        );
        assert!(!passes(|| assert_str("foo", None::<&str>)));
        assert!(!passes(|| assert_not_strstr(None::<&str>, "x")));
        assert!(passes(|| assert_str(None::<&str>, None::<&str>)));
    }

    #[test]
    fn test_data_size_mismatch_reported_first() {
        assert_eq!(
            details(|| assert_data(&[1, 2, 3], &[1, 2, 3, 4, 5])),
            "expected 3 bytes, got 5"
        );
        assert_eq!(
            details(|| assert_data(&[0, 0, 0], &[9, 9, 9, 9, 9])),
            "expected 3 bytes, got 5"
        );
    }

    #[test]
    fn test_data_first_difference() {
        assert!(passes(|| assert_data(b"abc", b"abc")));
        assert_eq!(
            details(|| assert_data(&[0x01, 0x02, 0x03], &[0x01, 0xff, 0x00])),
            "expected 0x02 at offset 1 got 0xff"
        );
    }

    #[test]
    fn test_integer_relations() {
        assert!(passes(|| assert_equal(3, 3u8)));
        assert!(passes(|| assert_not_equal(3, -3)));
        assert!(passes(|| assert_lt(1, 2)));
        assert!(passes(|| assert_le(2, 2)));
        assert!(passes(|| assert_gt(3, 2)));
        assert!(passes(|| assert_ge(3, 3)));

        assert!(!passes(|| assert_lt(2, 2)));
        assert!(!passes(|| assert_gt(2, 2)));
        assert!(!passes(|| assert_le(3, 2)));

        assert_eq!(details(|| assert_equal(1, 2)), "assertion failed, 1 == 2");
        assert_eq!(details(|| assert_ge(1, 2)), "assertion failed, 1 >= 2");
    }

    #[test]
    fn test_unsigned_relations() {
        assert!(passes(|| assert_equal_u(3usize, 3u64)));
        assert!(passes(|| assert_gt_u(u64::MAX, 0u8)));
        assert_eq!(
            details(|| assert_lt_u(u64::MAX, 1u8)),
            format!("assertion failed, {} < 1", u64::MAX)
        );
    }

    #[test]
    fn test_interval_is_closed() {
        assert!(passes(|| assert_interval(1, 3, 1)));
        assert!(passes(|| assert_interval(1, 3, 3)));
        assert_eq!(details(|| assert_interval(1, 3, 4)), "expected 1-3, got 4");
        assert_eq!(details(|| assert_interval(1, 3, 0)), "expected 1-3, got 0");
    }

    #[test]
    fn test_relative_epsilon_accepts_rounding_error() {
        assert!(passes(|| assert_dbl_near(0.1 + 0.2, 0.3)));
        assert!(!passes(|| assert_dbl_near_tol(0.1 + 0.2, 0.3, 0.0)));
    }

    #[test]
    fn test_relative_epsilon_near_zero() {
        assert!(passes(|| assert_dbl_near(0.0, 0.0)));
        assert!(!passes(|| assert_dbl_near(0.0, 1e-300)));
        assert!(passes(|| assert_dbl_near_tol(0.0, 1e-300, 1e-9)));
    }

    #[test]
    fn test_float_relations() {
        assert!(passes(|| assert_dbl_far(1.0, 1.1)));
        assert!(passes(|| assert_dbl_far_tol(1.0, 1.1, 0.05)));
        assert!(!passes(|| assert_dbl_far_tol(1.0, 1.1, 0.2)));
        assert!(passes(|| assert_dbl_lt(1.0, 1.0000001)));
        assert!(!passes(|| assert_dbl_lt(1.0, 1.0)));
        assert!(passes(|| assert_dbl_gt(2.0, 1.0)));
        assert!(passes(|| assert_flt_near(0.1f32 + 0.2f32, 0.3f32)));
        assert!(!passes(|| assert_flt_far(1.0f32, 1.000001f32)));
    }

    #[test]
    fn test_float_message() {
        assert_eq!(
            details(|| assert_dbl_near_tol(0.1 + 0.2, 0.3, 0.0)),
            "assertion failed, 0.3 == 0.3 (diff 5.551e-17, tol 0)"
        );
        assert_eq!(
            details(|| assert_dbl_near(1.5, 2.0)),
            "assertion failed, 1.5 == 2 (diff -0.5, eps 1e-12)"
        );
    }

    #[test]
    fn test_general_format() {
        let g = |value, precision| General { value, precision }.to_string();

        assert_eq!(g(0.30000000000000004, 8), "0.3");
        assert_eq!(g(123456789.0, 8), "1.2345679e+08");
        assert_eq!(g(0.0001, 4), "0.0001");
        assert_eq!(g(0.00001, 4), "1e-05");
        assert_eq!(g(-2.5, 4), "-2.5");
        assert_eq!(g(100.0, 4), "100");
    }

    #[test]
    fn test_null_checks() {
        let value = 5;
        let some: Option<&i32> = Some(&value);

        assert!(passes(|| assert_null(None::<u8>)));
        assert!(passes(|| assert_not_null(some)));
        assert!(passes(|| assert_null(core::ptr::null::<u8>())));
        assert!(passes(|| assert_not_null(&value as *const i32)));
        assert_eq!(details(|| assert_null(some)), "should be NULL");
        assert_eq!(details(|| assert_not_null(None::<u8>)), "should not be NULL");
    }

    #[test]
    fn test_boolean_and_unconditional() {
        assert!(passes(|| assert_true(true)));
        assert!(passes(|| assert_false(false)));
        assert_eq!(details(|| assert_false(true)), "should be false");
        assert_eq!(details(|| assert_fail()), "shouldn't come here");
    }
}
