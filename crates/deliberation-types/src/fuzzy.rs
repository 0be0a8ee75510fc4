//! Triangular fuzzy numbers.
//!
//! Every agent characteristic and every edge constraint is a triangular
//! fuzzy number `Tri(a, b, c)`: membership rises linearly from `a` to the
//! peak `b` and falls linearly back to zero at `c`. The peak is the
//! number's *crisp value* and is what the decision engine compares.
//!
//! Components are [`Decimal`] so that thresholds written as `0.7` compare
//! and subtract exactly. Values are immutable; an update produces a new
//! number via [`FuzzyNumber::shift`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors produced when building or moving a fuzzy number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FuzzyError {
    /// The components violate `a <= b <= c`.
    #[error("invalid fuzzy number Tri({a}, {b}, {c}): expected a <= b <= c")]
    InvalidFuzzyNumber {
        /// Left bound.
        a: Decimal,
        /// Peak.
        b: Decimal,
        /// Right bound.
        c: Decimal,
    },

    /// Shifting moved a component outside the representable range.
    #[error("shifting Tri({a}, {b}, {c}) by {delta} overflows")]
    Overflow {
        /// Left bound before the shift.
        a: Decimal,
        /// Peak before the shift.
        b: Decimal,
        /// Right bound before the shift.
        c: Decimal,
        /// The requested shift.
        delta: Decimal,
    },
}

/// A triangular fuzzy number `Tri(a, b, c)` with `a <= b <= c`.
///
/// Serialized as a three-element array `[a, b, c]`; deserialization
/// validates the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[Decimal; 3]", into = "[Decimal; 3]")]
pub struct FuzzyNumber {
    a: Decimal,
    b: Decimal,
    c: Decimal,
}

impl FuzzyNumber {
    /// Build a fuzzy number from its left bound, peak, and right bound.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::InvalidFuzzyNumber`] unless `a <= b <= c`.
    pub fn new(a: Decimal, b: Decimal, c: Decimal) -> Result<Self, FuzzyError> {
        if a <= b && b <= c {
            Ok(Self { a, b, c })
        } else {
            Err(FuzzyError::InvalidFuzzyNumber { a, b, c })
        }
    }

    /// A degenerate number whose three components all equal `value`.
    pub const fn crisp_only(value: Decimal) -> Self {
        Self {
            a: value,
            b: value,
            c: value,
        }
    }

    /// Left bound.
    pub const fn a(&self) -> Decimal {
        self.a
    }

    /// Peak (membership 1.0).
    pub const fn b(&self) -> Decimal {
        self.b
    }

    /// Right bound.
    pub const fn c(&self) -> Decimal {
        self.c
    }

    /// The crisp value used for comparisons: the peak `b`.
    pub const fn crisp(&self) -> Decimal {
        self.b
    }

    /// Degree of membership of `x`, in `[0, 1]`.
    ///
    /// The peak always has membership 1, including degenerate numbers
    /// where `a == b` or `b == c`.
    pub fn membership(&self, x: Decimal) -> Decimal {
        if x == self.b {
            return Decimal::ONE;
        }
        if x <= self.a || x >= self.c {
            return Decimal::ZERO;
        }
        // Here a < x < c and x != b, so the ramp we are on has a non-zero width.
        let (rise, run) = if x < self.b {
            (x.checked_sub(self.a), self.b.checked_sub(self.a))
        } else {
            (self.c.checked_sub(x), self.c.checked_sub(self.b))
        };
        match (rise, run) {
            (Some(rise), Some(run)) => rise.checked_div(run).unwrap_or(Decimal::ONE),
            _ => Decimal::ZERO,
        }
    }

    /// Move the whole triangle by `delta`, keeping its shape.
    ///
    /// # Errors
    ///
    /// Returns [`FuzzyError::Overflow`] if any component leaves the
    /// [`Decimal`] range.
    pub fn shift(&self, delta: Decimal) -> Result<Self, FuzzyError> {
        let overflow = || FuzzyError::Overflow {
            a: self.a,
            b: self.b,
            c: self.c,
            delta,
        };
        Ok(Self {
            a: self.a.checked_add(delta).ok_or_else(overflow)?,
            b: self.b.checked_add(delta).ok_or_else(overflow)?,
            c: self.c.checked_add(delta).ok_or_else(overflow)?,
        })
    }
}

impl TryFrom<[Decimal; 3]> for FuzzyNumber {
    type Error = FuzzyError;

    fn try_from([a, b, c]: [Decimal; 3]) -> Result<Self, Self::Error> {
        Self::new(a, b, c)
    }
}

impl From<FuzzyNumber> for [Decimal; 3] {
    fn from(value: FuzzyNumber) -> Self {
        [value.a, value.b, value.c]
    }
}

/// Trailing zeros are dropped: `Tri(0.70, 0.80, 0.90)` prints as
/// `Tri(0.7, 0.8, 0.9)`.
impl core::fmt::Display for FuzzyNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Tri({}, {}, {})",
            self.a.normalize(),
            self.b.normalize(),
            self.c.normalize()
        )
    }
}
