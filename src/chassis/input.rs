// Joystick input shaping: dead-band plus a sine response curve that keeps
// fine authority near center and full authority at the extremes.

/// Dead-band width for the translation axes
pub const JOYSTICK_DEADBAND: f32 = 0.06;

/// Dead-band width for the rotation axis (wider, applied to the scaled value)
pub const ROTATION_DEADBAND: f32 = 0.1;

/// Rotation authority relative to translation
const ROTATION_SCALE: f32 = 0.5;

/// Zero out values within `width` of neutral. Total over all of f32.
pub fn deadband(value: f32, width: f32) -> f32 {
    if value.abs() < width {
        0.0
    } else {
        value
    }
}

/// Sign-preserving power curve. Exponent 1 is the identity; kept as the
/// hook for steeper response curves.
pub fn raise_keep_sign(value: f32, exponent: i32) -> f32 {
    value.abs().powi(exponent).copysign(value)
}

/// Map a translation axis through dead-band then the sine curve.
///
/// Dividing by sin(1) means any input in [-1, 1] lands back in [-1, 1],
/// with an S-shaped response. The dead-band runs before the curve. Inputs
/// past the joystick range (a malformed wire command, say) are clamped so
/// the output stays bounded; on [-1, 1] the clamp is the identity.
pub fn curve(value: f32) -> f32 {
    let value = deadband(raise_keep_sign(value, 1), JOYSTICK_DEADBAND).clamp(-1.0, 1.0);
    value.sin() / 1.0_f32.sin()
}

/// Shape the rotation axis: inverted, half authority, wider dead-band,
/// no sine curve.
pub fn shape_rotation(value: f32) -> f32 {
    deadband(-value * ROTATION_SCALE, ROTATION_DEADBAND)
}

/// Linear remap of `value` from one range to another.
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_bounded_over_full_domain() {
        // Sweep well past the joystick range; the curve must stay in [-1, 1]
        // even where sin(x)/sin(1) alone would not (e.g. around x = 39.27)
        let mut x = -180.0f32;
        while x <= 180.0 {
            let out = curve(x);
            assert!(
                (-1.0..=1.0).contains(&out),
                "curve({}) = {} out of range",
                x,
                out
            );
            x += 0.01;
        }
    }

    #[test]
    fn curve_clamps_out_of_range_inputs_to_full_scale() {
        assert_eq!(curve(3.0), curve(1.0));
        assert_eq!(curve(-3.0), curve(-1.0));
    }

    #[test]
    fn curve_zero_inside_deadband() {
        let mut x = -JOYSTICK_DEADBAND + 0.001;
        while x < JOYSTICK_DEADBAND {
            assert_eq!(curve(x), 0.0, "curve({}) should be dead", x);
            x += 0.005;
        }
    }

    #[test]
    fn curve_hits_full_scale_at_extremes() {
        assert!((curve(1.0) - 1.0).abs() < 1e-6);
        assert!((curve(-1.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn curve_is_odd() {
        for x in [0.1, 0.25, 0.5, 0.9] {
            assert!((curve(x) + curve(-x)).abs() < 1e-6);
        }
    }

    #[test]
    fn curve_midrange_sits_below_the_linear_gain() {
        // sin is concave on [0, 1], so the curve flattens toward the
        // extremes: x < curve(x) < x / sin(1) for 0 < x < 1
        assert!(curve(0.5) < 0.5 / 0.841_471);
        assert!(curve(0.5) > 0.5);
    }

    #[test]
    fn raise_keep_sign_identity_at_exponent_one() {
        for x in [-1.0, -0.3, 0.0, 0.7, 1.0] {
            assert_eq!(raise_keep_sign(x, 1), x);
        }
    }

    #[test]
    fn raise_keep_sign_preserves_sign_for_even_exponents() {
        assert!((raise_keep_sign(-0.5, 2) + 0.25).abs() < 1e-6);
        assert!((raise_keep_sign(0.5, 2) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn remap_covers_the_output_range() {
        assert_eq!(remap(-1.0, -1.0, 1.0, -37.5, 37.5), -37.5);
        assert_eq!(remap(1.0, -1.0, 1.0, -37.5, 37.5), 37.5);
        assert_eq!(remap(0.0, -1.0, 1.0, -37.5, 37.5), 0.0);
    }

    #[test]
    fn rotation_inverted_scaled_and_deadbanded() {
        // Half authority, inverted
        assert!((shape_rotation(-1.0) - 0.5).abs() < 1e-6);
        assert!((shape_rotation(1.0) + 0.5).abs() < 1e-6);
        // Dead-band applies to the scaled value: |0.19 * 0.5| < 0.1
        assert_eq!(shape_rotation(0.19), 0.0);
        assert_ne!(shape_rotation(0.21), 0.0);
    }
}
