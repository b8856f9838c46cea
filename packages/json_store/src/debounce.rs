//! A single-shot, re-armable delayed task.
//!
//! Each disk-backed section owns one `DebounceTimer`. Arming it schedules the
//! callback to run once `delay` has passed without another arm; arming again
//! before then replaces the pending callback and pushes the deadline back
//! instead of queueing a second one.
//!
//! At most one worker thread exists per timer. It is spawned by the first arm
//! and sleeps until the current deadline, re-reading it on every wake-up, so
//! a burst of arms costs one thread. Once it has run the callback and finds
//! nothing else scheduled it exits; the next arm spawns a fresh one. A
//! callback that has already started is left to finish.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

type Callback = Box<dyn FnOnce() + Send>;

pub(crate) struct DebounceTimer {
    delay: Duration,
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<TimerState>,
    changed: Condvar,
}

#[derive(Default)]
struct TimerState {
    deadline: Option<Instant>,
    callback: Option<Callback>,
    worker_alive: bool,
    spawned: u64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DebounceTimer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            shared: Arc::new(Shared {
                state: Mutex::new(TimerState::default()),
                changed: Condvar::new(),
            }),
        }
    }

    /// Schedule `callback` to run after the quiet period, replacing whatever
    /// was pending.
    pub(crate) fn arm<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock();
        state.deadline = Some(Instant::now() + self.delay);
        state.callback = Some(Box::new(callback));

        // A live worker picks the later deadline up when it next wakes.
        if state.worker_alive {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("sectionfs-flush".to_string())
            .spawn(move || Self::run_worker(&shared));

        match spawned {
            Ok(_) => {
                state.worker_alive = true;
                state.spawned += 1;
                log::trace!("Spawned flush worker #{}", state.spawned);
            }
            Err(error) => {
                state.deadline = None;
                state.callback = None;
                log::error!("Failed to spawn flush timer thread: {}", error);
            }
        }
    }

    /// Drop the pending callback, if any.
    pub(crate) fn cancel(&self) {
        let mut state = self.shared.lock();
        state.deadline = None;
        state.callback = None;
        self.shared.changed.notify_all();
    }

    /// Whether a callback is waiting for its deadline.
    pub(crate) fn is_pending(&self) -> bool {
        self.shared.lock().deadline.is_some()
    }

    #[cfg(test)]
    fn workers_spawned(&self) -> u64 {
        self.shared.lock().spawned
    }

    fn run_worker(shared: &Shared) {
        let mut state = shared.lock();
        loop {
            let Some(deadline) = state.deadline else {
                state.worker_alive = false;
                return;
            };

            let now = Instant::now();
            if now < deadline {
                state = shared
                    .changed
                    .wait_timeout(state, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
                continue;
            }

            state.deadline = None;
            let callback = state.callback.take();
            drop(state);

            if let Some(callback) = callback {
                callback();
            }

            state = shared.lock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn arm_increment(timer: &DebounceTimer, count: &Arc<AtomicUsize>) {
        let count = Arc::clone(count);
        timer.arm(move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }

    #[test]
    fn fires_once_after_delay() {
        let timer = DebounceTimer::new(Duration::from_millis(20));
        let count = counter();

        arm_increment(&timer, &count);
        assert!(timer.is_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        thread::sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[test]
    fn rearming_coalesces() {
        let timer = DebounceTimer::new(Duration::from_millis(50));
        let count = counter();

        for _ in 0..5 {
            arm_increment(&timer, &count);
        }

        thread::sleep(Duration::from_millis(300));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn burst_of_arms_uses_one_worker() {
        let timer = DebounceTimer::new(Duration::from_millis(50));
        let count = counter();

        for _ in 0..100 {
            arm_increment(&timer, &count);
        }
        assert_eq!(timer.workers_spawned(), 1);

        thread::sleep(Duration::from_millis(300));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn only_latest_callback_runs() {
        let timer = DebounceTimer::new(Duration::from_millis(30));
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            timer.arm(move || seen.lock().unwrap().push(i));
        }

        thread::sleep(Duration::from_millis(250));
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn cancel_prevents_callback() {
        let timer = DebounceTimer::new(Duration::from_millis(20));
        let count = counter();

        arm_increment(&timer, &count);
        timer.cancel();
        assert!(!timer.is_pending());

        thread::sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn can_rearm_after_firing() {
        let timer = DebounceTimer::new(Duration::from_millis(10));
        let count = counter();

        arm_increment(&timer, &count);
        thread::sleep(Duration::from_millis(150));
        arm_increment(&timer, &count);
        thread::sleep(Duration::from_millis(150));

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(timer.workers_spawned(), 2);
    }
}
