use instant::Instant;

/// Timing of a single tick, both in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

/// Monotonic clock driving the render loop.
///
/// Every tick reads the time since construction and the delta to the tick
/// before it. The delta is never negative, so a clock fed out of order
/// just reports a still frame.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    previous: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            previous: 0.0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let elapsed = self.start.elapsed().as_secs_f32();
        self.advance_to(elapsed)
    }

    /// Moves the clock to an explicit elapsed time, as if a tick happened then.
    pub fn advance_to(&mut self, elapsed: f32) -> FrameTime {
        let delta = (elapsed - self.previous).max(0.0);
        self.previous = self.previous.max(elapsed);
        FrameTime { elapsed, delta }
    }

    pub fn elapsed(&self) -> f32 {
        self.previous
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_delta_since_previous_tick() {
        let mut clock = FrameClock::new();
        let first = clock.advance_to(0.5);
        assert_eq!(first.delta, 0.5);
        let second = clock.advance_to(0.75);
        assert_eq!(second.elapsed, 0.75);
        assert_eq!(second.delta, 0.25);
    }

    #[test]
    fn should_never_report_negative_delta() {
        let mut clock = FrameClock::new();
        clock.advance_to(1.0);
        let frame = clock.advance_to(0.5);
        assert_eq!(frame.delta, 0.0);
        assert_eq!(clock.elapsed(), 1.0);
    }

    #[test]
    fn should_tick_from_wall_time() {
        let mut clock = FrameClock::new();
        let first = clock.tick();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = clock.tick();
        assert!(second.elapsed > first.elapsed);
        assert!(second.delta > 0.0);
        assert_eq!(second.delta, second.elapsed - first.elapsed);
    }
}
