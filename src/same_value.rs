//! SameValueZero key identity.
//!
//! Keys are equal when they are the same value, when both are NaN, or when
//! both are zero regardless of sign. Ordinary `==` on floats gets NaN wrong,
//! so the map never uses `PartialEq` on keys.

use core::hash::{Hash, Hasher};

/// Key identity used by [`SMap`](crate::SMap) for every lookup.
///
/// Implementations must keep hashing consistent with equality:
/// `a.same_value_zero(b)` implies `hash_same_value(a) == hash_same_value(b)`.
pub trait SameValueZero {
    fn same_value_zero(&self, other: &Self) -> bool;

    fn hash_same_value<H: Hasher>(&self, state: &mut H);
}

/// Bit pattern every NaN hashes as, whatever its payload or sign.
const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

#[inline]
pub(crate) fn f64_same_value_zero(a: f64, b: f64) -> bool {
    // `==` already treats +0 and -0 as equal.
    a == b || (a.is_nan() && b.is_nan())
}

#[inline]
pub(crate) fn f64_canonical_bits(x: f64) -> u64 {
    if x.is_nan() {
        CANONICAL_NAN
    } else if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

impl SameValueZero for f64 {
    #[inline]
    fn same_value_zero(&self, other: &Self) -> bool {
        f64_same_value_zero(*self, *other)
    }

    #[inline]
    fn hash_same_value<H: Hasher>(&self, state: &mut H) {
        state.write_u64(f64_canonical_bits(*self));
    }
}

impl SameValueZero for f32 {
    #[inline]
    fn same_value_zero(&self, other: &Self) -> bool {
        f64_same_value_zero(f64::from(*self), f64::from(*other))
    }

    #[inline]
    fn hash_same_value<H: Hasher>(&self, state: &mut H) {
        state.write_u64(f64_canonical_bits(f64::from(*self)));
    }
}

macro_rules! same_value_via_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl SameValueZero for $t {
                #[inline]
                fn same_value_zero(&self, other: &Self) -> bool {
                    self == other
                }

                #[inline]
                fn hash_same_value<H: Hasher>(&self, state: &mut H) {
                    self.hash(state);
                }
            }
        )*
    };
}

same_value_via_eq!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, (), str, String,
);

impl<T: SameValueZero + ?Sized> SameValueZero for &T {
    #[inline]
    fn same_value_zero(&self, other: &Self) -> bool {
        (**self).same_value_zero(*other)
    }

    #[inline]
    fn hash_same_value<H: Hasher>(&self, state: &mut H) {
        (**self).hash_same_value(state);
    }
}

impl<T: SameValueZero> SameValueZero for Option<T> {
    fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value_zero(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn hash_same_value<H: Hasher>(&self, state: &mut H) {
        match self {
            Some(v) => {
                state.write_u8(1);
                v.hash_same_value(state);
            }
            None => state.write_u8(0),
        }
    }
}

/// Adapter so a `SameValueZero` key can be fed to any `BuildHasher`.
pub(crate) struct SameValueHash<'a, Q: ?Sized>(pub(crate) &'a Q);

impl<Q: SameValueZero + ?Sized> Hash for SameValueHash<'_, Q> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_same_value(state);
    }
}
