//! Wall-clock measurement around a single operation

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Timed<T> {
    pub label: String,
    pub value: T,
    pub elapsed: Duration,
}

impl<T, E> Timed<Result<T, E>> {
    /// Keep the measurement only when the timed call succeeded
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let value = self.value?;
        Ok(Timed {
            label: self.label,
            value,
            elapsed: self.elapsed,
        })
    }
}

/// Run `f`, timing only the call itself.
///
/// Start is taken immediately before `f` and end immediately after, so any
/// setup done by the caller beforehand is excluded.
pub fn measure<T>(label: impl Into<String>, f: impl FnOnce() -> T) -> Timed<T> {
    let label = label.into();
    log::info!("⏱️  Measuring: {}", label);

    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();

    log::info!("⏱️  {} took {:?}", label, elapsed);

    Timed {
        label,
        value,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_returns_value_and_label() {
        let timed = measure("sum", || (1..=10).sum::<u32>());

        assert_eq!(timed.value, 55);
        assert_eq!(timed.label, "sum");
    }

    #[test]
    fn test_measure_covers_the_call() {
        let timed = measure("sleep", || std::thread::sleep(Duration::from_millis(20)));
        assert!(timed.elapsed >= Duration::from_millis(20));
    }

    #[test]
    fn test_transpose() {
        let ok = measure("ok", || Ok::<u8, String>(7)).transpose().unwrap();
        assert_eq!(ok.value, 7);

        let err = measure("err", || Err::<u8, String>("boom".to_string())).transpose();
        assert_eq!(err.unwrap_err(), "boom");
    }
}
