//! Key and value traits.
//!
//! Every primitive-specific decision the maps need (bit identity, hash
//! mixing, Java-compatible hash codes, rendering) lives here, instantiated
//! per type with a macro. The tables themselves are written once over `K` and
//! `V`.

use core::fmt;

mod private {
    pub trait Sealed {}
}

/// murmur3 `fmix64` finalizer. Maps zero to zero.
#[inline(always)]
pub(crate) fn fmix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

/// A primitive map key.
///
/// Two keys are the same key iff their bit patterns are equal, so `-0.0` and
/// `0.0` are distinct `f64` keys and every `NaN` payload is its own key.
/// The all-zero bit pattern is reserved by the open-addressing table as its
/// empty marker; the table stores that one key out of line.
pub trait Key: Copy + fmt::Debug + 'static + private::Sealed {
    /// The key whose bit pattern is all zeroes.
    const ZERO: Self;

    /// Bit pattern identifying this key.
    fn key_bits(self) -> u64;

    /// Java-compatible hash code, used for entry hashes and `hash_code`.
    fn hash_code(self) -> i32;

    /// Writes the key the way map rendering expects (`1`, `2.5`, `a`).
    fn render(self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    #[inline(always)]
    fn is_zero(self) -> bool {
        self.key_bits() == 0
    }

    /// Well-mixed 64-bit hash used for table placement.
    #[inline(always)]
    fn mix(self) -> u64 {
        fmix64(self.key_bits())
    }

    #[inline(always)]
    fn same_key(self, other: Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

/// A map value.
pub trait Value: Clone + fmt::Debug + 'static {
    /// Equality as the maps see it: bitwise for floating point.
    fn same_as(&self, other: &Self) -> bool;

    /// Java-compatible hash code.
    fn hash_code(&self) -> i32;

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// The initial default return value of a fresh map (`0`, `false`,
    /// `'\0'`, `""`, `None`).
    fn natural_default() -> Self;
}

/// Values that `add_to` can accumulate into. Integer addition wraps.
pub trait Numeric: Value + Copy {
    fn accumulate(self, increment: Self) -> Self;
}

fn render_display<T: fmt::Display>(v: T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", v)
}

fn render_f32(v: f32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    render_float(v, v as f64, f)
}

fn render_f64(v: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    render_float(v, v, f)
}

/// Java `Float.toString` / `Double.toString`: shortest round-trip digits,
/// plain between 1e-3 and 1e7, `d.dddE±n` outside. `wide` is `v` widened
/// exactly, used only for classification.
fn render_float<T>(v: T, wide: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: fmt::Debug + fmt::LowerExp,
{
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
    }
    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return write!(f, "{:?}", v);
    }
    let sci = format!("{:e}", v);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    f.write_str(mantissa)?;
    if !mantissa.contains('.') {
        f.write_str(".0")?;
    }
    write!(f, "E{}", exponent)
}

macro_rules! impl_key_and_value {
    ($t:ty, $zero:expr, |$k:ident| bits = $bits:expr, hash = $hash:expr, render = $render:path) => {
        impl private::Sealed for $t {}

        impl Key for $t {
            const ZERO: Self = $zero;

            #[inline(always)]
            fn key_bits(self) -> u64 {
                let $k = self;
                $bits
            }

            #[inline(always)]
            fn hash_code(self) -> i32 {
                let $k = self;
                $hash
            }

            fn render(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $render(self, f)
            }
        }

        impl Value for $t {
            #[inline(always)]
            fn same_as(&self, other: &Self) -> bool {
                Key::same_key(*self, *other)
            }

            #[inline(always)]
            fn hash_code(&self) -> i32 {
                Key::hash_code(*self)
            }

            fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Key::render(*self, f)
            }

            #[inline(always)]
            fn natural_default() -> Self {
                $zero
            }
        }
    };
}

impl_key_and_value!(i8, 0, |k| bits = k as u8 as u64, hash = k as i32, render = render_display);
impl_key_and_value!(i16, 0, |k| bits = k as u16 as u64, hash = k as i32, render = render_display);
impl_key_and_value!(i32, 0, |k| bits = k as u32 as u64, hash = k, render = render_display);
impl_key_and_value!(i64, 0, |k| bits = k as u64, hash = (k ^ ((k as u64) >> 32) as i64) as i32, render = render_display);
impl_key_and_value!(u8, 0, |k| bits = k as u64, hash = k as i32, render = render_display);
impl_key_and_value!(u16, 0, |k| bits = k as u64, hash = k as i32, render = render_display);
impl_key_and_value!(u32, 0, |k| bits = k as u64, hash = k as i32, render = render_display);
impl_key_and_value!(u64, 0, |k| bits = k, hash = (k ^ (k >> 32)) as i32, render = render_display);
impl_key_and_value!(char, '\0', |k| bits = k as u64, hash = k as i32, render = render_display);
impl_key_and_value!(f32, 0.0, |k| bits = f32::to_bits(k) as u64, hash = f32::to_bits(k) as i32, render = render_f32);
impl_key_and_value!(f64, 0.0, |k| bits = f64::to_bits(k), hash = {
    let b = f64::to_bits(k);
    (b ^ (b >> 32)) as i32
}, render = render_f64);

impl Value for bool {
    #[inline(always)]
    fn same_as(&self, other: &Self) -> bool {
        self == other
    }

    #[inline(always)]
    fn hash_code(&self) -> i32 {
        if *self {
            1231
        } else {
            1237
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_display(self, f)
    }

    fn natural_default() -> Self {
        false
    }
}

impl Value for String {
    fn same_as(&self, other: &Self) -> bool {
        self == other
    }

    /// `s[0]*31^(n-1) + ... + s[n-1]` over UTF-16 code units.
    fn hash_code(&self) -> i32 {
        self.encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }

    fn natural_default() -> Self {
        String::new()
    }
}

/// Object-valued maps: `None` plays the role of `null`.
impl<T: Value> Value for Option<T> {
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_as(b),
            _ => false,
        }
    }

    fn hash_code(&self) -> i32 {
        self.as_ref().map_or(0, |v| v.hash_code())
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(v) => v.render(f),
            None => f.write_str("null"),
        }
    }

    fn natural_default() -> Self {
        None
    }
}

macro_rules! impl_numeric_wrapping {
    ($($t:ty),*) => {
        $(impl Numeric for $t {
            #[inline(always)]
            fn accumulate(self, increment: Self) -> Self {
                self.wrapping_add(increment)
            }
        })*
    };
}

impl_numeric_wrapping!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Numeric for f32 {
    #[inline(always)]
    fn accumulate(self, increment: Self) -> Self {
        self + increment
    }
}

impl Numeric for f64 {
    #[inline(always)]
    fn accumulate(self, increment: Self) -> Self {
        self + increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeyText<K>(K);
    impl<K: Key> fmt::Display for KeyText<K> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.render(f)
        }
    }

    struct ValueText<'a, V>(&'a V);
    impl<'a, V: Value> fmt::Display for ValueText<'a, V> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.render(f)
        }
    }

    fn key_text<K: Key>(k: K) -> String {
        KeyText(k).to_string()
    }

    fn value_text<V: Value>(v: &V) -> String {
        ValueText(v).to_string()
    }

    /// Invariant: only the all-zero bit pattern is the zero key; `-0.0` is not.
    #[test]
    fn zero_key_is_bitwise() {
        assert!(0i32.is_zero());
        assert!(0.0f64.is_zero());
        assert!(!(-0.0f64).is_zero());
        assert!(!(-0.0f32).is_zero());
        assert!('\0'.is_zero());
        assert!(!1u8.is_zero());
    }

    /// Invariant: float keys compare by bits, so `NaN` equals itself and the
    /// two zeroes differ.
    #[test]
    fn float_keys_compare_bitwise() {
        assert!(f64::NAN.same_key(f64::NAN));
        assert!(!0.0f64.same_key(-0.0));
        assert!(f32::NAN.same_as(&f32::NAN));
        assert!(!0.0f32.same_as(&-0.0));
    }

    /// Invariant: negative narrow integers do not collide with unrelated wide
    /// bit patterns, and the mix keeps zero at zero.
    #[test]
    fn bits_and_mix() {
        assert_eq!((-1i8).key_bits(), 0xff);
        assert_eq!((-1i16).key_bits(), 0xffff);
        assert_eq!((-1i32).key_bits(), 0xffff_ffff);
        assert_eq!(0u64.mix(), 0);
        assert_ne!(1u64.mix(), 2u64.mix());
    }

    /// Hash codes follow the Java conventions entry hashing relies on.
    #[test]
    fn java_hash_codes() {
        assert_eq!(Key::hash_code(7i32), 7);
        assert_eq!(Key::hash_code(-1i8), -1);
        assert_eq!(Key::hash_code(1i64 << 32), 1);
        assert_eq!(Key::hash_code('a'), 97);
        assert_eq!(Key::hash_code(1.0f32), 0x3f80_0000);
        assert_eq!(Value::hash_code(&true), 1231);
        assert_eq!(Value::hash_code(&false), 1237);
        assert_eq!(Value::hash_code(&"ab".to_string()), 97 * 31 + 98);
        assert_eq!(Value::hash_code(&None::<i32>), 0);
        assert_eq!(Value::hash_code(&Some(5i32)), 5);
    }

    #[test]
    fn rendering() {
        assert_eq!(key_text(42i32), "42");
        assert_eq!(key_text('b'), "b");
        assert_eq!(key_text(1.0f64), "1.0");
        assert_eq!(key_text(2.5f32), "2.5");
        assert_eq!(key_text(f64::NAN), "NaN");
        assert_eq!(key_text(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(value_text(&true), "true");
        assert_eq!(value_text(&"x".to_string()), "x");
        assert_eq!(value_text(&None::<String>), "null");
        assert_eq!(value_text(&Some(3u16)), "3");
    }

    /// Floats print their own shortest digits, in scientific form outside
    /// `[1e-3, 1e7)`.
    #[test]
    fn float_rendering_follows_java() {
        assert_eq!(key_text(0.1f32), "0.1");
        assert_eq!(value_text(&0.3f32), "0.3");
        assert_eq!(key_text(0.1f64), "0.1");
        assert_eq!(key_text(-0.0f64), "-0.0");
        assert_eq!(key_text(0.001f64), "0.001");
        assert_eq!(key_text(9_999_999.0f64), "9999999.0");
        assert_eq!(key_text(1e7f64), "1.0E7");
        assert_eq!(key_text(1e-4f64), "1.0E-4");
        assert_eq!(key_text(-1.5e10f64), "-1.5E10");
        assert_eq!(key_text(1.25e-7f32), "1.25E-7");
        assert_eq!(key_text(1e20f32), "1.0E20");
        assert_eq!(key_text(f64::MAX), "1.7976931348623157E308");
        assert_eq!(key_text(f32::INFINITY), "Infinity");
    }

    #[test]
    fn natural_defaults() {
        assert_eq!(<i32 as Value>::natural_default(), 0);
        assert!(!<bool as Value>::natural_default());
        assert_eq!(<char as Value>::natural_default(), '\0');
        assert_eq!(<String as Value>::natural_default(), "");
        assert_eq!(<Option<i64> as Value>::natural_default(), None);
    }

    #[test]
    fn accumulate_wraps_integers() {
        assert_eq!(i8::MAX.accumulate(1), i8::MIN);
        assert_eq!(250u8.accumulate(10), 4);
        assert_eq!(1.5f64.accumulate(2.0), 3.5);
    }
}
