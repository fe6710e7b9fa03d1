use super::math::Scalar;

/// Coarse phase of a [`SimulationClock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockState {
    /// No step taken since construction or the last reset
    Idle,
    Running,
    /// Elapsed time reached the horizon; further steps are refused
    Finished,
}

/// Simulated time bookkeeping for a fixed-step run
///
/// Elapsed time is `steps * dt` rather than a running sum, so it carries no
/// accumulated rounding error.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    dt: Scalar,
    t_max: Scalar,
    steps: u64,
}

impl SimulationClock {
    pub fn new(dt: Scalar, t_max: Scalar) -> Self {
        Self {
            dt,
            t_max,
            steps: 0,
        }
    }

    #[inline]
    pub fn dt(&self) -> Scalar {
        self.dt
    }

    #[inline]
    pub fn t_max(&self) -> Scalar {
        self.t_max
    }

    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time `gt`
    #[inline]
    pub fn elapsed(&self) -> Scalar {
        self.steps as Scalar * self.dt
    }

    #[inline]
    pub fn can_step(&self) -> bool {
        self.elapsed() < self.t_max
    }

    /// Record one completed step
    pub fn advance(&mut self) {
        self.steps += 1;
    }

    pub fn state(&self) -> ClockState {
        if !self.can_step() {
            ClockState::Finished
        } else if self.steps == 0 {
            ClockState::Idle
        } else {
            ClockState::Running
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        !self.can_step()
    }

    /// Fraction of the horizon covered, in `[0, 1]`
    pub fn progress(&self) -> Scalar {
        if self.t_max > 0.0 {
            (self.elapsed() / self.t_max).min(1.0)
        } else {
            1.0
        }
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }
}
