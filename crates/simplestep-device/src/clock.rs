use std::time::Duration;

/// Source of the pauses between ramp steps and position polls.
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}
