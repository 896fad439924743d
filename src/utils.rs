use std::any::Any;
use std::time::{Duration, Instant};

/// Logs the time spent in one pipeline stage and returns the new running total.
pub(crate) fn trace(l_step: &str, started: Instant, last_elapsed: Duration) -> Duration {
    let elapsed = started.elapsed();
    log::trace!("TIME | Total={:.2?} | {}={:.2?}", elapsed, l_step, elapsed - last_elapsed);
    elapsed
}

/// Rounds to the given number of decimal places; exact ties go to the even digit.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Best-effort text for a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scorer panicked".to_string()
    }
}
