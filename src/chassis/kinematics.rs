// Mecanum inverse kinematics
// Combines body-frame commands (x, y, rotation) into four wheel speeds.

use serde::{Deserialize, Serialize};

/// Normalized wheel speed commands, each in [-1, 1] after scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub front_left: f32,
    pub front_right: f32,
    pub back_left: f32,
    pub back_right: f32,
}

impl WheelSpeeds {
    pub fn new(front_left: f32, front_right: f32, back_left: f32, back_right: f32) -> Self {
        Self {
            front_left,
            front_right,
            back_left,
            back_right,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Speeds as array [front left, front right, back left, back right]
    pub fn as_array(&self) -> [f32; 4] {
        [
            self.front_left,
            self.front_right,
            self.back_left,
            self.back_right,
        ]
    }

    /// Largest component magnitude
    pub fn max_magnitude(&self) -> f32 {
        self.as_array()
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max)
    }
}

/// Mix pre-shaped body commands into wheel speeds.
///
/// Inputs are nominally in [-1, 1], but `rotation` may be a substituted
/// compensation-loop output of any magnitude. If any raw component exceeds
/// unit magnitude, all four are divided by the largest one, so the commanded
/// direction in velocity space is preserved exactly; components are never
/// clipped independently.
pub fn mix(x: f32, y: f32, rotation: f32) -> WheelSpeeds {
    let mut speeds = WheelSpeeds::new(
        x + y + rotation,
        -x + y - rotation,
        -x + y + rotation,
        x + y - rotation,
    );

    let max = speeds.max_magnitude();
    if max > 1.0 {
        speeds.front_left /= max;
        speeds.front_right /= max;
        speeds.back_left /= max;
        speeds.back_right /= max;
    }

    speeds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn zero_command_is_full_stop() {
        assert_eq!(mix(0.0, 0.0, 0.0), WheelSpeeds::zero());
    }

    #[test]
    fn pure_forward_drives_all_wheels_equally() {
        let speeds = mix(0.0, 1.0, 0.0);
        for s in speeds.as_array() {
            assert_close(s, 1.0);
        }
    }

    #[test]
    fn pure_lateral_has_slide_signature() {
        // Strafe: front left / back right against front right / back left
        let speeds = mix(1.0, 0.0, 0.0);
        assert!(speeds.front_left > 0.0 && speeds.back_right > 0.0);
        assert!(speeds.front_right < 0.0 && speeds.back_left < 0.0);
        assert_close(speeds.front_left, -speeds.front_right);
        assert_close(speeds.back_right, -speeds.back_left);
        assert!(speeds.max_magnitude() <= 1.0);
    }

    #[test]
    fn pure_rotation_has_spin_signature() {
        let speeds = mix(0.0, 0.0, 1.0);
        assert!(speeds.front_left > 0.0 && speeds.back_left > 0.0);
        assert!(speeds.front_right < 0.0 && speeds.back_right < 0.0);
    }

    #[test]
    fn saturation_scales_all_components_uniformly() {
        // Raw components are {1.5, -1.5, 0.5, -0.5}; everything divides by 1.5
        let speeds = mix(0.5, 0.0, 1.0);
        assert_close(speeds.front_left, 1.0);
        assert_close(speeds.front_right, -1.0);
        assert_close(speeds.back_left, 1.0 / 3.0);
        assert_close(speeds.back_right, -1.0 / 3.0);
    }

    #[test]
    fn in_range_commands_pass_through_unscaled() {
        let speeds = mix(0.2, 0.3, 0.1);
        assert_close(speeds.front_left, 0.6);
        assert_close(speeds.front_right, 0.0);
        assert_close(speeds.back_left, 0.2);
        assert_close(speeds.back_right, 0.4);
    }

    #[test]
    fn output_never_exceeds_unit_magnitude() {
        let mut x = -2.0f32;
        while x <= 2.0 {
            let mut rot = -2.0f32;
            while rot <= 2.0 {
                let speeds = mix(x, 0.7, rot);
                assert!(
                    speeds.max_magnitude() <= 1.0 + 1e-6,
                    "mix({}, 0.7, {}) saturated past 1",
                    x,
                    rot
                );
                rot += 0.25;
            }
            x += 0.25;
        }
    }

    #[test]
    fn oversized_loop_output_preserves_direction() {
        // A compensation loop may hand us rotation far outside [-1, 1]
        let speeds = mix(0.0, 0.0, 5.0);
        let reference = mix(0.0, 0.0, 1.0);
        for (a, b) in speeds.as_array().iter().zip(reference.as_array()) {
            assert_close(*a, b);
        }
    }
}
