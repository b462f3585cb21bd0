//! Regex matchers with configurable capture order.
//!
//! Vendors place the direction, metric and queue tokens in different orders,
//! so each pattern carries the capture index of every token it provides.

use regex::{Captures, Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::RegistryError;
use crate::model::{Direction, Metric, Slot};

/// Uncompiled pattern plus the capture index of each token.
///
/// Indices are 1-based capture group numbers. This is also the shape of a
/// `total` / `queue` table in a driver file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    pub pattern: String,
    pub direction: usize,
    pub metric: usize,
    #[serde(default)]
    pub queue: Option<usize>,
    /// Group that must repeat the direction token (e.g. `rx-3.rx_bytes`).
    #[serde(default)]
    pub echo: Option<usize>,
}

impl PatternSpec {
    pub fn new(pattern: impl Into<String>, direction: usize, metric: usize) -> Self {
        Self {
            pattern: pattern.into(),
            direction,
            metric,
            queue: None,
            echo: None,
        }
    }

    pub fn with_queue(mut self, queue: usize) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_echo(mut self, echo: usize) -> Self {
        self.echo = Some(echo);
        self
    }
}

/// Tokens extracted by a successful match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matched {
    pub slot: Slot,
    pub queue: Option<usize>,
}

/// A compiled pattern. A matcher without a regex never matches.
#[derive(Debug, Clone)]
pub struct Matcher {
    re: Option<Regex>,
    direction: usize,
    metric: usize,
    queue: Option<usize>,
    echo: Option<usize>,
}

impl Matcher {
    /// A matcher that never matches, for drivers lacking a class of counters.
    pub fn disabled() -> Self {
        Self {
            re: None,
            direction: 0,
            metric: 0,
            queue: None,
            echo: None,
        }
    }

    /// Compiles `spec`. The pattern must match the whole counter name and is
    /// matched case-insensitively. A pattern without capture groups yields
    /// a disabled matcher.
    pub fn compile(spec: &PatternSpec) -> Result<Self, RegistryError> {
        let re = RegexBuilder::new(&format!("^(?:{})$", spec.pattern))
            .case_insensitive(true)
            .build()
            .map_err(|source| RegistryError::InvalidPattern {
                pattern: spec.pattern.clone(),
                source,
            })?;

        let groups = re.captures_len() - 1;
        if groups == 0 {
            return Ok(Self::disabled());
        }

        let check = |field: &'static str, index: usize| {
            if index == 0 || index > groups {
                Err(RegistryError::CaptureOutOfRange {
                    pattern: spec.pattern.clone(),
                    field,
                    index,
                    groups,
                })
            } else {
                Ok(())
            }
        };
        check("direction", spec.direction)?;
        check("metric", spec.metric)?;
        if let Some(q) = spec.queue {
            check("queue", q)?;
        }
        if let Some(e) = spec.echo {
            check("echo", e)?;
        }

        Ok(Self {
            re: Some(re),
            direction: spec.direction,
            metric: spec.metric,
            queue: spec.queue,
            echo: spec.echo,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.re.is_some()
    }

    /// Returns `true` if this matcher extracts a queue number.
    pub fn has_queue(&self) -> bool {
        self.queue.is_some()
    }

    /// Matches `name` and extracts its tokens.
    pub fn matches(&self, name: &str) -> Option<Matched> {
        let caps = self.re.as_ref()?.captures(name)?;

        let direction_token = token(&caps, self.direction)?;
        let direction = Direction::from_token(&direction_token)?;
        if let Some(echo) = self.echo
            && token(&caps, echo)? != direction_token
        {
            return None;
        }

        let metric = Metric::from_token(&token(&caps, self.metric)?);
        let queue = match self.queue {
            Some(idx) => Some(caps.get(idx)?.as_str().parse::<usize>().ok()?),
            None => None,
        };

        Some(Matched {
            slot: Slot::new(direction, metric),
            queue,
        })
    }
}

fn token(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index).map(|m| m.as_str().to_ascii_lowercase())
}

/// Pattern-pair strategy: an optional device-total pattern and an optional
/// per-queue pattern, matched independently.
#[derive(Debug, Clone)]
pub struct PatternPairParser {
    total: Matcher,
    queue: Matcher,
}

impl PatternPairParser {
    pub fn new(total: Option<&PatternSpec>, queue: Option<&PatternSpec>) -> Result<Self, RegistryError> {
        let total = match total {
            Some(spec) => Matcher::compile(spec)?,
            None => Matcher::disabled(),
        };
        let queue = match queue {
            Some(spec) => Matcher::compile(spec)?,
            None => Matcher::disabled(),
        };
        // a queue pattern that yields no queue number can't place a counter
        let queue = if queue.has_queue() {
            queue
        } else {
            Matcher::disabled()
        };
        Ok(Self { total, queue })
    }

    pub fn classify_total(&self, name: &str) -> Option<Slot> {
        self.total.matches(name).map(|m| m.slot)
    }

    pub fn classify_queue(&self, name: &str) -> Option<(Slot, usize)> {
        let m = self.queue.matches(name)?;
        Some((m.slot, m.queue?))
    }

    pub fn has_total(&self) -> bool {
        self.total.is_enabled()
    }

    pub fn has_queue(&self) -> bool {
        self.queue.is_enabled()
    }
}
