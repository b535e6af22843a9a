pub const TIMER_DEC_PER_SECOND: u32 = 60;

#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    /// Count down by one, never below zero. Returns true when this tick
    /// took the counter from 1 to 0.
    pub fn tick(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        self.count == 0
    }
}

/// Delay and sound timers, ticked together at [`TIMER_DEC_PER_SECOND`].
#[derive(Debug, Default)]
pub struct Timers {
    pub delay: Timer,
    pub sound: Timer,
    beep: bool,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self) {
        self.delay.tick();
        if self.sound.tick() {
            self.beep = true;
        }
    }

    pub fn sound_active(&self) -> bool {
        self.sound.count > 0
    }

    pub fn take_beep(&mut self) -> bool {
        std::mem::replace(&mut self.beep, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_stays_zero() {
        let mut timer = Timer::default();
        assert!(!timer.tick());
        assert_eq!(timer.count, 0);
    }

    #[test]
    fn expiring_sound_timer_beeps_once() {
        let mut timers = Timers::new();
        timers.sound.set(2);
        timers.tick();
        assert!(!timers.take_beep());
        assert!(timers.sound_active());
        timers.tick();
        assert!(!timers.sound_active());
        assert!(timers.take_beep());
        assert!(!timers.take_beep());
        timers.tick();
        assert!(!timers.take_beep());
    }

    #[test]
    fn delay_timer_never_beeps() {
        let mut timers = Timers::new();
        timers.delay.set(1);
        timers.tick();
        assert_eq!(timers.delay.count, 0);
        assert!(!timers.take_beep());
    }

    proptest! {
        #[test]
        fn timers_never_underflow(start in any::<u8>(), ticks in 0usize..600) {
            let mut timers = Timers::new();
            timers.delay.set(start);
            timers.sound.set(start);
            for _ in 0..ticks {
                timers.tick();
            }
            let expected = start.saturating_sub(ticks.min(255) as u8);
            prop_assert_eq!(timers.delay.count, expected);
            prop_assert_eq!(timers.sound.count, expected);
            prop_assert_eq!(timers.take_beep(), start > 0 && ticks >= start as usize);
        }
    }
}
