use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_CRITICAL: i32 = 90;
const DEFAULT_WARN: i32 = 70;
const TRACKED: [&str; 2] = ["cpu", "memory"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    #[serde(default)]
    pub critical: i32,
    #[serde(default)]
    pub warn: i32,
}

impl Default for Severity {
    fn default() -> Self {
        Self {
            critical: DEFAULT_CRITICAL,
            warn: DEFAULT_WARN,
        }
    }
}

impl Severity {
    fn validate(&mut self) {
        if self.warn == 0 {
            self.warn = DEFAULT_WARN;
        }
        if self.critical == 0 {
            self.critical = DEFAULT_CRITICAL;
        }
    }
}

/// Resource usage thresholds keyed by resource name (`cpu`, `memory`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(BTreeMap<String, Severity>);

impl Threshold {
    pub fn new() -> Self {
        Self(
            TRACKED
                .iter()
                .map(|key| ((*key).to_string(), Severity::default()))
                .collect(),
        )
    }

    pub fn validate(&mut self) {
        for key in TRACKED {
            self.0.entry(key.to_string()).or_default().validate();
        }
    }
}
