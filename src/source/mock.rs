//! In-memory counter source for tests and demo mode.

use crate::error::SourceError;

use super::CounterSource;
use super::dump::parse_dump;

/// How a [`MockSource`] produces successive value snapshots.
#[derive(Debug, Clone)]
enum Script {
    /// Fixed snapshots, one per call; the last one repeats.
    Steps(Vec<Vec<u64>>),
    /// Call `k` yields `base[i] + k * step[i]`.
    Ramp { base: Vec<u64>, step: Vec<u64> },
}

/// Counter source backed by scripted values.
#[derive(Debug, Clone)]
pub struct MockSource {
    driver: String,
    names: Vec<String>,
    script: Script,
    calls: u64,
}

impl MockSource {
    /// Creates a source whose values are all zero until snapshots are pushed.
    pub fn new<S: Into<String>>(driver: impl Into<String>, names: impl IntoIterator<Item = S>) -> Self {
        Self {
            driver: driver.into(),
            names: names.into_iter().map(Into::into).collect(),
            script: Script::Steps(Vec::new()),
            calls: 0,
        }
    }

    /// Appends a snapshot to the script.
    ///
    /// Snapshots are returned verbatim, so a snapshot of the wrong length can
    /// be used to exercise contract violations.
    pub fn with_values(mut self, values: Vec<u64>) -> Self {
        if let Script::Steps(steps) = &mut self.script {
            steps.push(values);
        } else {
            self.script = Script::Steps(vec![values]);
        }
        self
    }

    /// Replaces the script with a linear ramp: every call adds `step` to the
    /// previous values, starting from `base`.
    pub fn with_ramp(mut self, base: Vec<u64>, step: Vec<u64>) -> Self {
        self.script = Script::Ramp { base, step };
        self
    }

    /// Builds a single-snapshot source from `ethtool -S` output.
    pub fn from_dump(driver: impl Into<String>, content: &str) -> Result<Self, SourceError> {
        let (names, values) = parse_dump(content)?;
        Ok(Self::new(driver, names).with_values(values))
    }

    /// Number of `values()` calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl CounterSource for MockSource {
    fn driver(&self) -> &str {
        &self.driver
    }

    fn names(&mut self) -> Result<Vec<String>, SourceError> {
        Ok(self.names.clone())
    }

    fn values(&mut self) -> Result<Vec<u64>, SourceError> {
        let k = self.calls;
        self.calls += 1;
        let values = match &self.script {
            Script::Steps(steps) => {
                let idx = usize::try_from(k).unwrap_or(usize::MAX).min(steps.len().saturating_sub(1));
                steps
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| vec![0; self.names.len()])
            }
            Script::Ramp { base, step } => base
                .iter()
                .zip(step.iter().chain(std::iter::repeat(&0)))
                .map(|(b, s)| b.wrapping_add(k.wrapping_mul(*s)))
                .collect(),
        };
        Ok(values)
    }
}
