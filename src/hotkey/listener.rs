//! Global key-state mirror backed by `rdev::listen`.
//!
//! `rdev::listen` is a blocking call that must live on its own OS thread.
//! [`RdevKeyState`] owns that thread and flips an atomic on every press and
//! release of the watched key, so [`KeyStateSource::is_pressed`] is a plain
//! load.  The watched key can be swapped at runtime with
//! [`RdevKeyState::set_key`]; the callback reads it on every event.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has no shutdown API.  Dropping the handle sets a stop flag
//! and the callback ignores further events, but the thread stays blocked in
//! the rdev event loop until the process exits.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use super::KeyStateSource;

// ---------------------------------------------------------------------------
// KeyWatch
// ---------------------------------------------------------------------------

/// The watched key and whether it is currently down.
#[derive(Debug)]
struct KeyWatch {
    key: Mutex<rdev::Key>,
    pressed: AtomicBool,
}

impl KeyWatch {
    fn new(key: rdev::Key) -> Self {
        Self {
            key: Mutex::new(key),
            pressed: AtomicBool::new(false),
        }
    }

    fn key(&self) -> rdev::Key {
        *self.key.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap the watched key.  Any press of the old key is forgotten.
    fn set_key(&self, key: rdev::Key) {
        *self.key.lock().unwrap_or_else(PoisonError::into_inner) = key;
        self.pressed.store(false, Ordering::SeqCst);
    }

    fn handle(&self, event: &rdev::EventType) {
        let watched = self.key();
        match *event {
            rdev::EventType::KeyPress(k) if k == watched => {
                self.pressed.store(true, Ordering::SeqCst);
            }
            rdev::EventType::KeyRelease(k) if k == watched => {
                self.pressed.store(false, Ordering::SeqCst);
            }
            _ => {}
        }
    }

    fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// RdevKeyState
// ---------------------------------------------------------------------------

/// Tracks whether one key is held down, system-wide.
pub struct RdevKeyState {
    watch: Arc<KeyWatch>,
    stop: Arc<AtomicBool>,
    /// Never joined; `rdev::listen` does not return.
    _thread: std::thread::JoinHandle<()>,
}

impl RdevKeyState {
    /// Spawn the listener thread for `key`.
    ///
    /// Use [`crate::hotkey::parse_key`] to obtain `key` from a config string.
    pub fn start(key: rdev::Key) -> std::io::Result<Self> {
        let watch = Arc::new(KeyWatch::new(key));
        let stop = Arc::new(AtomicBool::new(false));
        let watch_cb = Arc::clone(&watch);
        let stop_cb = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if stop_cb.load(Ordering::Relaxed) {
                        return;
                    }
                    watch_cb.handle(&event.event_type);
                });

                if let Err(e) = result {
                    log::error!("hotkey: rdev::listen exited with error: {e:?}");
                }
            })?;

        log::info!("hotkey: listening for {key:?}");
        Ok(Self {
            watch,
            stop,
            _thread: thread,
        })
    }

    /// The key currently being watched.
    pub fn key(&self) -> rdev::Key {
        self.watch.key()
    }

    /// Watch `key` instead, effective from the next key event.
    pub fn set_key(&self, key: rdev::Key) {
        self.watch.set_key(key);
        log::info!("hotkey: now listening for {key:?}");
    }
}

impl KeyStateSource for RdevKeyState {
    fn is_pressed(&self) -> bool {
        self.watch.is_pressed()
    }
}

impl Drop for RdevKeyState {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.watch.pressed.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::{EventType, Key};

    #[test]
    fn press_and_release_of_watched_key_are_mirrored() {
        let watch = KeyWatch::new(Key::F9);
        watch.handle(&EventType::KeyPress(Key::F9));
        assert!(watch.is_pressed());
        watch.handle(&EventType::KeyRelease(Key::F9));
        assert!(!watch.is_pressed());
    }

    #[test]
    fn other_keys_are_ignored() {
        let watch = KeyWatch::new(Key::F9);
        watch.handle(&EventType::KeyPress(Key::KeyA));
        assert!(!watch.is_pressed());
    }

    #[test]
    fn swapped_key_takes_effect_immediately() {
        let watch = KeyWatch::new(Key::F9);
        watch.handle(&EventType::KeyPress(Key::F9));
        assert!(watch.is_pressed());

        watch.set_key(Key::F10);
        assert_eq!(watch.key(), Key::F10);
        assert!(!watch.is_pressed(), "held old key must not count");

        watch.handle(&EventType::KeyPress(Key::F9));
        assert!(!watch.is_pressed());
        watch.handle(&EventType::KeyPress(Key::F10));
        assert!(watch.is_pressed());
        watch.handle(&EventType::KeyRelease(Key::F10));
        assert!(!watch.is_pressed());
    }
}
