use serde::{Deserialize, Serialize};

pub const DEFAULT_TAIL_COUNT: i64 = 100;
pub const MAX_LOG_THRESHOLD: i64 = 5_000;
/// Negative means no time bound on the tailed logs.
pub const DEFAULT_SINCE_SECONDS: i64 = -1;

/// Log view tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logger {
    #[serde(default, rename = "tail")]
    pub tail_count: i64,
    #[serde(default, rename = "buffer")]
    pub buffer_size: i64,
    #[serde(default)]
    pub since_seconds: i64,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            tail_count: DEFAULT_TAIL_COUNT,
            buffer_size: MAX_LOG_THRESHOLD,
            since_seconds: DEFAULT_SINCE_SECONDS,
        }
    }
}

impl Logger {
    pub fn validate(&mut self) {
        if self.tail_count <= 0 {
            self.tail_count = DEFAULT_TAIL_COUNT;
        }
        if self.tail_count > MAX_LOG_THRESHOLD {
            self.tail_count = MAX_LOG_THRESHOLD;
        }
        if self.buffer_size <= 0 || self.buffer_size > MAX_LOG_THRESHOLD {
            self.buffer_size = MAX_LOG_THRESHOLD;
        }
        if self.since_seconds == 0 {
            self.since_seconds = DEFAULT_SINCE_SECONDS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Logger, MAX_LOG_THRESHOLD};

    #[test]
    fn validate_fills_zero_values() {
        let mut logger = Logger {
            tail_count: 0,
            buffer_size: 0,
            since_seconds: 0,
        };
        logger.validate();
        assert_eq!(logger, Logger::default());
    }

    #[test]
    fn validate_caps_oversized_tail() {
        let mut logger = Logger {
            tail_count: 10_000,
            buffer_size: 20_000,
            since_seconds: 300,
        };
        logger.validate();
        assert_eq!(logger.tail_count, MAX_LOG_THRESHOLD);
        assert_eq!(logger.buffer_size, MAX_LOG_THRESHOLD);
        assert_eq!(logger.since_seconds, 300);
    }
}
