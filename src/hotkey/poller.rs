//! Debounced polling loop over a [`KeyStateSource`].
//!
//! ```text
//! while monitoring:
//!     pressed?  ── yes ─▶ fire()
//!        │                 wait for release (same interval)
//!        │                 sleep(cooldown)
//!        ▼
//!     sleep(poll_interval)
//! ```

use std::thread::JoinHandle;
use std::time::Duration;

use super::{FireFn, KeyStateSource, MonitorFlag, TriggerSource};

/// Fires once per physical press of the watched key.
pub struct HotkeyPoller<K> {
    keys: K,
    poll_interval: Duration,
    cooldown: Duration,
}

impl<K: KeyStateSource> HotkeyPoller<K> {
    pub fn new(keys: K, poll_interval: Duration, cooldown: Duration) -> Self {
        Self {
            keys,
            poll_interval,
            cooldown,
        }
    }

    /// Run the loop on the calling thread until `flag` is cleared.
    pub fn run(&self, flag: &MonitorFlag, fire: &dyn Fn()) {
        log::debug!(
            "hotkey: polling every {:?}, cooldown {:?}",
            self.poll_interval,
            self.cooldown
        );

        while flag.is_enabled() {
            if self.keys.is_pressed() {
                fire();

                while flag.is_enabled() && self.keys.is_pressed() {
                    std::thread::sleep(self.poll_interval);
                }
                std::thread::sleep(self.cooldown);
            }
            std::thread::sleep(self.poll_interval);
        }

        log::debug!("hotkey: monitoring disabled, poller stopped");
    }
}

impl<K: KeyStateSource + 'static> TriggerSource for HotkeyPoller<K> {
    fn spawn(self, flag: MonitorFlag, fire: FireFn) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("hotkey-poller".into())
            .spawn(move || self.run(&flag, &*fire))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays a fixed sequence of key samples, then clears the flag.
    struct ScriptedKeys {
        samples: Mutex<VecDeque<bool>>,
        polls: AtomicUsize,
        flag: MonitorFlag,
    }

    impl ScriptedKeys {
        fn new(samples: &[bool], flag: &MonitorFlag) -> Self {
            Self {
                samples: Mutex::new(samples.iter().copied().collect()),
                polls: AtomicUsize::new(0),
                flag: flag.clone(),
            }
        }
    }

    impl KeyStateSource for ScriptedKeys {
        fn is_pressed(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst);
            match self.samples.lock().unwrap().pop_front() {
                Some(pressed) => pressed,
                None => {
                    self.flag.disable();
                    false
                }
            }
        }
    }

    fn poller(keys: ScriptedKeys) -> HotkeyPoller<ScriptedKeys> {
        HotkeyPoller::new(keys, Duration::from_millis(1), Duration::from_millis(1))
    }

    fn count_fires(samples: &[bool]) -> usize {
        let flag = MonitorFlag::new();
        flag.enable();
        let fired = AtomicUsize::new(0);
        poller(ScriptedKeys::new(samples, &flag)).run(&flag, &|| {
            fired.fetch_add(1, Ordering::SeqCst);
        });
        fired.load(Ordering::SeqCst)
    }

    #[test]
    fn held_key_fires_once() {
        assert_eq!(count_fires(&[false, true, true, true, true, false, false]), 1);
    }

    #[test]
    fn separate_presses_fire_separately() {
        assert_eq!(count_fires(&[true, false, false, true, false]), 2);
    }

    #[test]
    fn idle_key_never_fires() {
        assert_eq!(count_fires(&[false, false, false]), 0);
    }

    #[test]
    fn disabled_flag_stops_before_first_poll() {
        let flag = MonitorFlag::new();
        let keys = ScriptedKeys::new(&[true], &flag);
        let p = poller(keys);
        p.run(&flag, &|| panic!("must not fire"));
        assert_eq!(p.keys.polls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn disabling_while_held_ends_the_release_wait() {
        let flag = MonitorFlag::new();
        flag.enable();
        let keys = ScriptedKeys::new(&[true, true, true], &flag);
        let stopper = flag.clone();
        poller(keys).run(&flag, &|| stopper.disable());
        assert!(!flag.is_enabled());
    }

    #[test]
    fn shared_source_can_be_polled_through_arc() {
        let flag = MonitorFlag::new();
        flag.enable();
        let keys = Arc::new(ScriptedKeys::new(&[true, false], &flag));
        let fired = AtomicUsize::new(0);

        HotkeyPoller::new(Arc::clone(&keys), Duration::from_millis(1), Duration::ZERO)
            .run(&flag, &|| {
                fired.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(keys.polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn spawned_poller_runs_on_its_own_thread() {
        let flag = MonitorFlag::new();
        flag.enable();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = poller(ScriptedKeys::new(&[false, true, false], &flag))
            .spawn(
                flag.clone(),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        handle.join().unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!flag.is_enabled());
    }
}
