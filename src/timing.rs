// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Wall-clock timing wrapper for harness operations
//!
//! Training, testing and data loading are each timed around a single call.
//! The wrapper never alters the semantics of the wrapped operation.

use std::time::Instant;

/// Result of a timed operation
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed_seconds: f64,
}

/// Execute `op` exactly once and capture its wall-clock duration
pub fn timed<T>(op: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let value = op();
    Timed {
        value,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    }
}

/// Timed variant for fallible operations; errors propagate unchanged
pub fn try_timed<T, E>(op: impl FnOnce() -> Result<T, E>) -> Result<Timed<T>, E> {
    let start = Instant::now();
    let value = op()?;
    Ok(Timed {
        value,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_value() {
        let result = timed(|| 2 + 2);
        assert_eq!(result.value, 4);
        assert!(result.elapsed_seconds >= 0.0);
    }

    #[test]
    fn test_timed_measures_duration() {
        let result = timed(|| std::thread::sleep(std::time::Duration::from_millis(10)));
        assert!(result.elapsed_seconds >= 0.01);
    }

    #[test]
    fn test_try_timed_ok() {
        let result: Result<Timed<i32>, String> = try_timed(|| Ok(7));
        let timed = result.expect("should succeed");
        assert_eq!(timed.value, 7);
    }

    #[test]
    fn test_try_timed_propagates_error() {
        let result: Result<Timed<i32>, String> = try_timed(|| Err("boom".to_string()));
        assert_eq!(result.unwrap_err(), "boom");
    }
}
