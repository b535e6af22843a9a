use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error};

use crate::emulator::Emulator;

/// Machine shared between the cycle loop and the timer thread. Every access,
/// cycles and ticks alike, goes through the one lock.
pub type SharedEmulator = Arc<Mutex<Emulator>>;

// don't try to catch up on more than this after a stall
const MAX_CATCH_UP: u32 = 64;

/// Fixed rate pacer: tells the caller how many periods have passed.
#[derive(Debug)]
pub struct Clock {
    period: Duration,
    next_due: Instant,
}

impl Clock {
    pub fn from_hz(hz: u32) -> Self {
        Self::starting_at(hz, Instant::now())
    }

    pub fn starting_at(hz: u32, start: Instant) -> Self {
        let period = Duration::from_secs(1) / hz.max(1);
        Self {
            period,
            next_due: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whole periods elapsed up to `now` since the last call.
    pub fn ticks_due(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while now >= self.next_due {
            ticks += 1;
            self.next_due += self.period;
            if ticks == MAX_CATCH_UP {
                self.next_due = now + self.period;
                break;
            }
        }
        ticks
    }

    /// How long until the next period is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

/// Ticks the timers of a shared machine on its own thread.
pub struct TimerThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TimerThread {
    pub fn spawn(emu: SharedEmulator, hz: u32) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || {
            let mut clock = Clock::from_hz(hz);
            while flag.load(Ordering::Relaxed) {
                let now = Instant::now();
                let ticks = clock.ticks_due(now);
                if ticks > 0 {
                    match emu.lock() {
                        Ok(mut emu) => (0..ticks).for_each(|_| emu.tick_timers()),
                        Err(_) => {
                            error!("machine lock poisoned, stopping timers");
                            break;
                        }
                    }
                }
                thread::sleep(clock.until_next(Instant::now()));
            }
            debug!("timer thread stopped");
        });
        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("timer thread panicked");
            }
        }
    }
}

impl Drop for TimerThread {
    fn drop(&mut self) {
        self.stop();
    }
}
