use anyhow::{Result, anyhow};

/// How many times a single request is attempted. There is no backoff between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    /// Attempts actually made; at least one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number. On exhaustion the error of the
    /// last attempt is returned.
    pub fn run<T>(&self, mut op: impl FnMut(u32) -> Result<T>) -> Result<T> {
        let mut last_err = None;
        for attempt in 1..=self.attempts() {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no attempt made")))
    }
}
