//! Math helpers shared across the engine

/// FNV-1a 64-bit hash over raw bytes.
///
/// Stable across runs and platforms, so it is safe to persist or to use
/// for name-based lookups.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a 64-bit hash of a string.
#[must_use]
pub fn hash_str(s: &str) -> u64 {
    hash_bytes(s.as_bytes())
}

/// Linear interpolation between `a` and `b` by `t`.
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `v` sits between `a` and `b`, as a fraction.
///
/// Returns 0 when `a == b`.
#[must_use]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        0.0
    } else {
        (v - a) / (b - a)
    }
}

/// Map `v` from the range `[in_min, in_max]` to `[out_min, out_max]`.
#[must_use]
pub fn remap(v: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    lerp(out_min, out_max, inverse_lerp(in_min, in_max, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_vectors() {
        // Reference vectors for 64-bit FNV-1a.
        assert_eq!(hash_str(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(hash_str("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(hash_str("foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_bytes(b"res/sprite.png"), hash_bytes(b"res/sprite.png"));
        assert_ne!(hash_bytes(b"res/sprite.png"), hash_bytes(b"res/sprite2.png"));
    }

    #[test]
    fn test_lerp_and_remap() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(inverse_lerp(0.0, 10.0, 2.5), 0.25);
        assert_eq!(remap(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        assert_eq!(inverse_lerp(3.0, 3.0, 3.0), 0.0);
    }
}
