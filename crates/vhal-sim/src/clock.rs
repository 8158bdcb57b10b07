//! Monotonic timestamps for property values

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic nanoseconds since the first call in this process
///
/// Never decreases; suitable for ordering updates, not for wall time.
pub fn elapsed_nanos() -> i64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    i64::try_from(epoch.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let a = elapsed_nanos();
        let b = elapsed_nanos();
        assert!(b >= a);
        assert!(a >= 0);
    }
}
