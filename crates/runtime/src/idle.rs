use foundation::time::Time;

/// Pointer-inactivity timer.
///
/// The host feeds timestamps; nothing here reads a wall clock. The timer
/// fires once per idle period: after firing it stays quiet until the next
/// pointer move re-arms it.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    timeout_s: Option<f64>,
    last_activity: Time,
    armed: bool,
}

impl IdleTimer {
    /// `timeout_s` of `None` or a non-positive value disables the timer.
    pub fn new(timeout_s: Option<f64>, now: Time) -> Self {
        Self {
            timeout_s: timeout_s.filter(|t| *t > 0.0),
            last_activity: now,
            armed: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.timeout_s.is_some()
    }

    pub fn set_timeout(&mut self, timeout_s: Option<f64>, now: Time) {
        self.timeout_s = timeout_s.filter(|t| *t > 0.0);
        self.touch(now);
    }

    /// Records pointer activity and re-arms the timer.
    pub fn touch(&mut self, now: Time) {
        self.last_activity = now;
        self.armed = true;
    }

    /// Returns `true` exactly once when the idle interval has elapsed.
    pub fn poll(&mut self, now: Time) -> bool {
        let Some(timeout) = self.timeout_s else {
            return false;
        };
        if self.armed && now.since(self.last_activity) >= timeout {
            self.armed = false;
            return true;
        }
        false
    }
}
