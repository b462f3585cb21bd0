//! A monitored network interface.
//!
//! Ties a [`CounterSource`] to a [`StatsAggregator`]. Opening an interface
//! resolves the driver's parser, classifies the counter names and takes the
//! first snapshot as the baseline; each [`Interface::refresh`] then turns the
//! next snapshot into per-interval statistics.

use tracing::{debug, info};

use crate::aggregator::{IndexMap, QueueZeroPolicy, StatsAggregator};
use crate::error::InterfaceError;
use crate::model::IfStats;
use crate::registry::ParserRegistry;
use crate::source::CounterSource;

/// Options applied when opening an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceOptions {
    /// Use the generic parser for drivers the registry does not know.
    pub allow_generic: bool,
    pub zero_policy: QueueZeroPolicy,
}

pub struct Interface<S> {
    name: String,
    driver: String,
    parser_name: &'static str,
    fallback: bool,
    source: S,
    stats: StatsAggregator,
}

impl<S: CounterSource> Interface<S> {
    /// Opens `name`, reading counters from `source`.
    ///
    /// Fails if the driver has no parser (and the generic fallback is not
    /// allowed), or if no counter name could be classified.
    pub fn open(
        name: impl Into<String>,
        mut source: S,
        registry: &ParserRegistry,
        options: &InterfaceOptions,
    ) -> Result<Self, InterfaceError> {
        let name = name.into();
        let driver = source.driver().to_string();

        let Some(resolved) = registry.resolve(&driver, options.allow_generic) else {
            return Err(InterfaceError::UnsupportedDriver {
                driver,
                interface: name,
            });
        };
        if resolved.fallback {
            info!("{}: no parser for driver {}, using generic", name, driver);
        }

        let names = source.names()?;
        let baseline = source.values()?;
        if names.len() != baseline.len() {
            return Err(InterfaceError::SnapshotMismatch {
                interface: name,
                expected: names.len(),
                actual: baseline.len(),
            });
        }

        let map = IndexMap::build(resolved.parser, &names, &baseline, options.zero_policy);
        if map.is_empty() {
            return Err(InterfaceError::NoCountersMapped {
                driver,
                interface: name,
            });
        }

        debug!(
            "{}: driver={} parser={} fallback={} counters={} totals={} queue_fields={} queues={}",
            name,
            driver,
            resolved.parser.kind(),
            resolved.fallback,
            names.len(),
            map.totals().len(),
            map.queues().len(),
            map.queue_count()
        );

        Ok(Self {
            name,
            driver,
            parser_name: resolved.parser.kind(),
            fallback: resolved.fallback,
            source,
            stats: StatsAggregator::new(map, baseline),
        })
    }

    /// Reads a new snapshot and recomputes the statistics for the interval
    /// since the previous one.
    pub fn refresh(&mut self) -> Result<(), InterfaceError> {
        let values = self.source.values()?;
        self.stats
            .update(values)
            .map_err(|e| InterfaceError::SnapshotMismatch {
                interface: self.name.clone(),
                expected: e.expected,
                actual: e.actual,
            })
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S> Interface<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Strategy of the parser in use.
    pub fn parser_name(&self) -> &'static str {
        self.parser_name
    }

    /// `true` if the generic fallback parser is in use.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn queue_count(&self) -> usize {
        self.stats.queue_count()
    }

    /// `true` if any slot of queue `index` was fed in the last interval.
    pub fn queue_active(&self, index: usize) -> bool {
        self.stats.queue_stats(index).is_some_and(IfStats::any_set)
    }

    pub fn queue_stats(&self, index: usize) -> Option<&IfStats> {
        self.stats.queue_stats(index)
    }

    pub fn queues(&self) -> &[IfStats] {
        self.stats.queues()
    }

    pub fn total_stats(&self) -> &IfStats {
        self.stats.total_stats()
    }
}
