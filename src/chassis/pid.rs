// Positional PID controller for the compensation loops.
//
// Carries input/output ranges, a continuous-input (wraparound) mode for
// circular quantities like heading, and an on-target tolerance.

/// Tunable loop configuration: gains plus ranges.
#[derive(Debug, Clone, Copy)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,

    /// Expected measurement range (defines the wrap span in continuous mode)
    pub input_min: f32,
    pub input_max: f32,

    /// Output clamp
    pub output_min: f32,
    pub output_max: f32,

    /// On-target tolerance, in input units
    pub tolerance: f32,

    /// Treat the input as circular: error wraps at the range boundaries
    pub continuous: bool,
}

impl PidConfig {
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            input_min: -1.0,
            input_max: 1.0,
            output_min: -1.0,
            output_max: 1.0,
            tolerance: 0.0,
            continuous: false,
        }
    }

    pub fn with_input_range(mut self, min: f32, max: f32) -> Self {
        self.input_min = min;
        self.input_max = max;
        self
    }

    pub fn with_output_range(mut self, min: f32, max: f32) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }
}

/// PID loop state. Disabled controllers output zero and accumulate nothing.
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    setpoint: f32,
    enabled: bool,

    /// Integrator state (already scaled by ki)
    integral: f32,
    /// Last error, for the derivative term
    prev_error: f32,
    first_update: bool,
    last_output: f32,
}

impl PidController {
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            setpoint: 0.0,
            enabled: false,
            integral: 0.0,
            prev_error: 0.0,
            first_update: true,
            last_output: 0.0,
        }
    }

    /// Swap in new gains without touching loop state (gain hot-reload).
    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.config.kp = kp;
        self.config.ki = ki;
        self.config.kd = kd;
    }

    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn set_continuous(&mut self, continuous: bool) {
        self.config.continuous = continuous;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable the loop and drop its output to zero.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.last_output = 0.0;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reset integrator and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.first_update = true;
        self.last_output = 0.0;
    }

    /// Setpoint error for a measurement, wrapped into half the input span
    /// when the input is continuous.
    pub fn error(&self, measurement: f32) -> f32 {
        let mut error = self.setpoint - measurement;
        if self.config.continuous {
            let span = self.config.input_max - self.config.input_min;
            if span > 0.0 {
                error -= (error / span).round() * span;
            }
        }
        error
    }

    /// Whether the measurement is within tolerance of the setpoint.
    pub fn on_target(&self, measurement: f32) -> bool {
        self.error(measurement).abs() < self.config.tolerance
    }

    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    /// Run one cycle against a measurement. `dt` is the control period in
    /// seconds. Returns the clamped correction, or zero while disabled.
    pub fn calculate(&mut self, measurement: f32, dt: f32) -> f32 {
        if !self.enabled || dt <= 0.0 {
            return 0.0;
        }

        let error = self.error(measurement);

        let p = self.config.kp * error;

        self.integral += self.config.ki * error * dt;
        // Anti-windup: the integrator alone never exceeds the output clamp
        self.integral = self
            .integral
            .clamp(self.config.output_min, self.config.output_max);

        let d = if self.first_update {
            self.first_update = false;
            0.0
        } else {
            self.config.kd * (error - self.prev_error) / dt
        };
        self.prev_error = error;

        self.last_output =
            (p + self.integral + d).clamp(self.config.output_min, self.config.output_max);
        self.last_output
    }
}
