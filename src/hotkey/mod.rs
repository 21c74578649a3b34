//! Hotkey trigger source.
//!
//! # Design
//!
//! A [`TriggerSource`] watches for the capture key on its own OS thread and
//! calls a `fire` callback once per physical press.  The callback only
//! enqueues a trigger, so the source never waits on pipeline work.
//!
//! The default source is [`HotkeyPoller`], which samples a
//! [`KeyStateSource`] at a fixed interval.  On desktop the key state comes
//! from [`RdevKeyState`], a global `rdev` hook that mirrors the key's
//! up/down state into an atomic.
//!
//! Both sides observe a shared [`MonitorFlag`]; clearing it stops the loop
//! at its next poll.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use chat_translator::hotkey::{
//!     parse_key, HotkeyPoller, MonitorFlag, RdevKeyState, TriggerSource,
//! };
//!
//! let key = parse_key("f9").expect("unknown key");
//! let keys = RdevKeyState::start(key).unwrap();
//! let flag = MonitorFlag::new();
//! flag.enable();
//!
//! let poller = HotkeyPoller::new(keys, Duration::from_millis(50), Duration::from_millis(200));
//! let _thread = poller.spawn(flag.clone(), Box::new(|| println!("capture!"))).unwrap();
//! ```

pub mod listener;
pub mod poller;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;

pub use listener::RdevKeyState;
pub use poller::HotkeyPoller;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Reports whether the watched key is currently held down.
pub trait KeyStateSource: Send + Sync {
    fn is_pressed(&self) -> bool;
}

/// Lets the poller share a source with code that rebinds it.
impl<K: KeyStateSource + ?Sized> KeyStateSource for Arc<K> {
    fn is_pressed(&self) -> bool {
        (**self).is_pressed()
    }
}

/// Callback invoked once per detected press.  Must return quickly.
pub type FireFn = Box<dyn Fn() + Send + 'static>;

/// Something that turns key activity into trigger calls on its own thread.
///
/// Polling is one implementation; an event-driven hook can implement the
/// same trait without the orchestrator noticing.
pub trait TriggerSource: Send + 'static {
    /// Start watching.  Runs until `flag` is cleared.
    fn spawn(self, flag: MonitorFlag, fire: FireFn) -> std::io::Result<JoinHandle<()>>;
}

// ---------------------------------------------------------------------------
// MonitorFlag
// ---------------------------------------------------------------------------

/// Process-wide "monitoring enabled" switch.  Starts disabled.
#[derive(Debug, Clone, Default)]
pub struct MonitorFlag(Arc<AtomicBool>);

impl MonitorFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a hotkey name from a config string into an [`rdev::Key`].
///
/// Matching ignores case and surrounding whitespace.  Supports F1–F12,
/// common named keys and single ASCII letters.
///
/// # Examples
///
/// ```
/// use chat_translator::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"),      Some(rdev::Key::F9));
/// assert_eq!(parse_key("f9"),      Some(rdev::Key::F9));
/// assert_eq!(parse_key("escape"),  Some(rdev::Key::Escape));
/// assert_eq!(parse_key("a"),       Some(rdev::Key::KeyA));
/// assert_eq!(parse_key("xyz"),     None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    let key = match key_str.trim().to_ascii_uppercase().as_str() {
        // Function keys
        "F1" => rdev::Key::F1,
        "F2" => rdev::Key::F2,
        "F3" => rdev::Key::F3,
        "F4" => rdev::Key::F4,
        "F5" => rdev::Key::F5,
        "F6" => rdev::Key::F6,
        "F7" => rdev::Key::F7,
        "F8" => rdev::Key::F8,
        "F9" => rdev::Key::F9,
        "F10" => rdev::Key::F10,
        "F11" => rdev::Key::F11,
        "F12" => rdev::Key::F12,

        // Navigation / control
        "ESCAPE" | "ESC" => rdev::Key::Escape,
        "SPACE" => rdev::Key::Space,
        "RETURN" | "ENTER" => rdev::Key::Return,
        "TAB" => rdev::Key::Tab,
        "INSERT" | "INS" => rdev::Key::Insert,
        "DELETE" | "DEL" => rdev::Key::Delete,
        "HOME" => rdev::Key::Home,
        "END" => rdev::Key::End,
        "PAGEUP" => rdev::Key::PageUp,
        "PAGEDOWN" => rdev::Key::PageDown,

        // Lock / special
        "CAPSLOCK" => rdev::Key::CapsLock,
        "NUMLOCK" => rdev::Key::NumLock,
        "SCROLLLOCK" => rdev::Key::ScrollLock,
        "PRINTSCREEN" => rdev::Key::PrintScreen,
        "PAUSE" => rdev::Key::Pause,
        "BACKQUOTE" | "`" => rdev::Key::BackQuote,

        // Letters
        "A" => rdev::Key::KeyA,
        "B" => rdev::Key::KeyB,
        "C" => rdev::Key::KeyC,
        "D" => rdev::Key::KeyD,
        "E" => rdev::Key::KeyE,
        "F" => rdev::Key::KeyF,
        "G" => rdev::Key::KeyG,
        "H" => rdev::Key::KeyH,
        "I" => rdev::Key::KeyI,
        "J" => rdev::Key::KeyJ,
        "K" => rdev::Key::KeyK,
        "L" => rdev::Key::KeyL,
        "M" => rdev::Key::KeyM,
        "N" => rdev::Key::KeyN,
        "O" => rdev::Key::KeyO,
        "P" => rdev::Key::KeyP,
        "Q" => rdev::Key::KeyQ,
        "R" => rdev::Key::KeyR,
        "S" => rdev::Key::KeyS,
        "T" => rdev::Key::KeyT,
        "U" => rdev::Key::KeyU,
        "V" => rdev::Key::KeyV,
        "W" => rdev::Key::KeyW,
        "X" => rdev::Key::KeyX,
        "Y" => rdev::Key::KeyY,
        "Z" => rdev::Key::KeyZ,

        _ => return None,
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
