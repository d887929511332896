//! Math type re-exports and the small amount of vector math the codecs need.

pub use glam::{Vec2, Vec3};

/// Map a unit vector onto the octahedron, returning coordinates in [-1, 1]^2.
///
/// Zero-length input maps to the +Z pole.
pub fn octahedral_encode(n: Vec3) -> Vec2 {
    let l1 = n.x.abs() + n.y.abs() + n.z.abs();
    if l1 <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let p = n / l1;
    if p.z >= 0.0 {
        Vec2::new(p.x, p.y)
    } else {
        Vec2::new(
            (1.0 - p.y.abs()) * sign_not_zero(p.x),
            (1.0 - p.x.abs()) * sign_not_zero(p.y),
        )
    }
}

/// Inverse of [`octahedral_encode`]; the result is normalized.
pub fn octahedral_decode(e: Vec2) -> Vec3 {
    let z = 1.0 - e.x.abs() - e.y.abs();
    let v = if z >= 0.0 {
        Vec3::new(e.x, e.y, z)
    } else {
        Vec3::new(
            (1.0 - e.y.abs()) * sign_not_zero(e.x),
            (1.0 - e.x.abs()) * sign_not_zero(e.y),
            z,
        )
    };
    v.normalize_or(Vec3::Z)
}

#[inline]
fn sign_not_zero(v: f32) -> f32 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octahedral_axes() {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            let back = octahedral_decode(octahedral_encode(axis));
            assert!((back - axis).length() < 1e-5, "{axis:?} -> {back:?}");
        }
    }

    #[test]
    fn test_octahedral_lower_hemisphere() {
        let n = Vec3::new(0.3, -0.4, -0.8).normalize();
        let e = octahedral_encode(n);
        assert!(e.x.abs() <= 1.0 && e.y.abs() <= 1.0);
        let back = octahedral_decode(e);
        assert!(back.dot(n) > 0.9999);
    }

    #[test]
    fn test_octahedral_zero_vector() {
        assert_eq!(octahedral_encode(Vec3::ZERO), Vec2::ZERO);
        assert_eq!(octahedral_decode(Vec2::ZERO), Vec3::Z);
    }
}
