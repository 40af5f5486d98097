use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

/// Windowed suppression for repeated identical log events.
///
/// Each key gets its own window of `interval` length: the first event in
/// a window is emitted, the rest are counted. When the window rolls over,
/// the caller learns how many events were swallowed.
pub struct Throttle {
    interval: Duration,
    windows: Mutex<HashMap<&'static str, Window>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `Some(suppressed_count)` when an event for `key` should be
    /// logged, otherwise `None` and the event is counted against the
    /// active window.
    pub fn emit(&self, key: &'static str) -> Option<u64> {
        let mut windows = self.windows.lock().expect("log throttle mutex poisoned");
        let now = Instant::now();

        match windows.get_mut(key) {
            Some(window) if now.duration_since(window.started_at) < self.interval => {
                window.suppressed += 1;
                None
            }
            Some(window) => {
                let suppressed = window.suppressed;
                window.started_at = now;
                window.suppressed = 0;
                Some(suppressed)
            }
            None => {
                windows.insert(
                    key,
                    Window {
                        started_at: now,
                        suppressed: 0,
                    },
                );
                Some(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Throttle;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn emits_then_suppresses_then_emits_with_count() {
        let throttle = Throttle::new(Duration::from_millis(20));
        let key = "rejected";

        assert_eq!(throttle.emit(key), Some(0));
        assert_eq!(throttle.emit(key), None);
        assert_eq!(throttle.emit(key), None);

        sleep(Duration::from_millis(30));
        assert_eq!(throttle.emit(key), Some(2));
    }

    #[test]
    fn keys_are_throttled_independently() {
        let throttle = Throttle::new(Duration::from_secs(60));

        assert_eq!(throttle.emit("conflict"), Some(0));
        assert_eq!(throttle.emit("rejected"), Some(0));
        assert_eq!(throttle.emit("conflict"), None);
    }
}
