use std::f64::consts::{FRAC_PI_2, TAU};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::layout::layout;
use crate::prize::Prize;

/// The stationary pointer sits at the top of the circle. With the raster
/// y-axis growing downward, "up" is −π/2 in the angle-0-along-+x convention.
pub const POINTER_ANGLE: f64 = -FRAC_PI_2;

/// Extra full revolutions added to every spin so the wheel always visibly
/// rotates forward, even when the chosen segment is already under the pointer.
pub const MIN_EXTRA_REVOLUTIONS: u32 = 2;
pub const MAX_EXTRA_REVOLUTIONS: u32 = 3;

/// Compute the absolute rotation the wheel must reach so that the chosen
/// prize's segment bisector ends up under the top pointer.
///
/// The renderer paints a segment at `start + rotation`, so the target must
/// satisfy `bisector + target ≡ POINTER_ANGLE (mod 2π)`. The forward delta
/// from the current rotation is taken mod 2π and a random 2..=3 whole
/// revolutions are added on top, so the result always advances by at least
/// two full turns.
pub fn target_angle(
    prizes: &[Prize],
    current_angle: f64,
    chosen_index: usize,
    rng: &mut impl Rng,
) -> f64 {
    let segments = layout(prizes);
    let bisector = segments
        .iter()
        .find(|s| s.index == chosen_index)
        .or_else(|| segments.last())
        .map(|s| s.bisector())
        .unwrap_or(0.0);

    let current = current_angle.rem_euclid(TAU);
    let desired = (POINTER_ANGLE - bisector).rem_euclid(TAU);
    let delta = (desired - current).rem_euclid(TAU);
    let revolutions = rng.random_range(MIN_EXTRA_REVOLUTIONS..=MAX_EXTRA_REVOLUTIONS) as f64;

    current_angle + revolutions * TAU + delta
}

/// Cubic ease-out: fast start, settling into the target. Input is clamped
/// to [0, 1].
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// One animated rotation from a start angle to a target angle over a fixed
/// duration. Purely time-driven: the event loop samples [`SpinAnimation::tick`]
/// once per frame. `cancel` is idempotent and safe after natural completion;
/// a cancelled animation yields no further frames.
#[derive(Debug)]
pub struct SpinAnimation {
    from: f64,
    to: f64,
    duration: Duration,
    started: Instant,
    cancelled: bool,
}

impl SpinAnimation {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            started: Instant::now(),
            cancelled: false,
        }
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    /// The eased angle after `elapsed` time. Snaps to exactly `to` once the
    /// duration is reached.
    pub fn angle_at(&self, elapsed: Duration) -> f64 {
        if elapsed >= self.duration || self.duration.is_zero() {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * ease_out_cubic(t)
    }

    pub fn finished_at(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Sample the animation against the wall clock. Returns the current
    /// angle and whether this frame completed the spin, or `None` once the
    /// animation has been cancelled.
    pub fn tick(&self) -> Option<(f64, bool)> {
        if self.cancelled {
            return None;
        }
        let elapsed = self.started.elapsed();
        Some((self.angle_at(elapsed), self.finished_at(elapsed)))
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
