//! Engine start-up with a single non-accelerated retry.

use super::engine::OcrError;

/// Result of a successful start-up: the engine plus the mode it ended up in.
#[derive(Debug)]
pub struct Initialized<E> {
    pub engine: E,
    pub accelerated: bool,
}

/// Run `init` in the preferred mode and, if that was accelerated and failed,
/// exactly once more without acceleration.
///
/// `init` receives `true` when acceleration should be attempted.  A failure in
/// the last attempt is reported as [`OcrError::Initialization`].
///
/// ```
/// use chat_translator::ocr::{initialize_with_fallback, OcrError};
///
/// let started = initialize_with_fallback(true, |accelerated| {
///     if accelerated {
///         Err(OcrError::AccelerationUnavailable("no GPU".into()))
///     } else {
///         Ok("cpu engine")
///     }
/// })
/// .unwrap();
/// assert_eq!(started.engine, "cpu engine");
/// assert!(!started.accelerated);
/// ```
pub fn initialize_with_fallback<E, F>(
    prefer_acceleration: bool,
    mut init: F,
) -> Result<Initialized<E>, OcrError>
where
    F: FnMut(bool) -> Result<E, OcrError>,
{
    if prefer_acceleration {
        match init(true) {
            Ok(engine) => {
                log::info!("ocr: engine ready (accelerated)");
                return Ok(Initialized {
                    engine,
                    accelerated: true,
                });
            }
            Err(e) => {
                log::warn!("ocr: accelerated start failed ({e}); retrying without acceleration");
            }
        }
    }

    match init(false) {
        Ok(engine) => {
            log::info!("ocr: engine ready (cpu)");
            Ok(Initialized {
                engine,
                accelerated: false,
            })
        }
        Err(e) => Err(match e {
            OcrError::Initialization(_) => e,
            other => OcrError::Initialization(other.to_string()),
        }),
    }
}
