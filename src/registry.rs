//! Driver name to parser registry.
//!
//! Built once at startup and handed by reference to whatever opens
//! interfaces. Several driver names may share one parser.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::RegistryError;
use crate::parser::drivers::{self, DriverEntry};
use crate::parser::{DriverParser, PatternPairParser, PatternSpec};

/// Parser chosen for a driver.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub parser: &'a DriverParser,
    /// `true` if the generic fallback was used.
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: Vec<DriverParser>,
    by_driver: HashMap<String, usize>,
    generic: DriverParser,
}

/// On-disk driver definitions.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DriverFile {
    #[serde(default)]
    driver: Vec<DriverDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DriverDef {
    names: Vec<String>,
    total: Option<PatternSpec>,
    queue: Option<PatternSpec>,
}

impl ParserRegistry {
    /// Creates a registry with no drivers, only the generic fallback.
    pub fn empty() -> Result<Self, RegistryError> {
        Ok(Self {
            parsers: Vec::new(),
            by_driver: HashMap::new(),
            generic: drivers::generic()?,
        })
    }

    /// Creates a registry holding every builtin driver.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::empty()?;
        for DriverEntry { drivers, parser } in drivers::builtin()? {
            registry.register(&drivers, parser);
        }
        Ok(registry)
    }

    /// Registers `parser` under every name in `drivers`, replacing earlier
    /// registrations of those names.
    pub fn register<S: AsRef<str>>(&mut self, drivers: &[S], parser: DriverParser) {
        let idx = self.parsers.len();
        self.parsers.push(parser);
        for driver in drivers {
            self.by_driver.insert(driver.as_ref().to_string(), idx);
        }
    }

    /// Exact-match lookup.
    pub fn find(&self, driver: &str) -> Option<&DriverParser> {
        self.by_driver.get(driver).map(|&idx| &self.parsers[idx])
    }

    /// The generic fallback parser.
    pub fn generic(&self) -> &DriverParser {
        &self.generic
    }

    /// Exact-match lookup, falling back to the generic parser only when
    /// `allow_generic` is set.
    pub fn resolve(&self, driver: &str, allow_generic: bool) -> Option<Resolved<'_>> {
        if let Some(parser) = self.find(driver) {
            return Some(Resolved {
                parser,
                fallback: false,
            });
        }
        allow_generic.then_some(Resolved {
            parser: &self.generic,
            fallback: true,
        })
    }

    /// Registered driver names with their strategy kind, sorted by name.
    pub fn drivers(&self) -> BTreeMap<&str, &'static str> {
        self.by_driver
            .iter()
            .map(|(name, &idx)| (name.as_str(), self.parsers[idx].kind()))
            .collect()
    }

    /// Registers the pattern-pair drivers defined in a TOML file.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: DriverFile = toml::from_str(&content).map_err(|source| RegistryError::ParseFile {
            path: path.to_path_buf(),
            source,
        })?;
        let count = self.load_defs(file.driver)?;
        debug!("loaded {} driver definitions from {}", count, path.display());
        Ok(count)
    }

    fn load_defs(&mut self, defs: Vec<DriverDef>) -> Result<usize, RegistryError> {
        // compile everything before registering anything
        let mut compiled = Vec::with_capacity(defs.len());
        for (i, def) in defs.into_iter().enumerate() {
            if def.names.is_empty() {
                return Err(RegistryError::EmptyDriverNames(i + 1));
            }
            let parser = PatternPairParser::new(def.total.as_ref(), def.queue.as_ref())?;
            compiled.push((def.names, parser));
        }
        let count = compiled.len();
        for (names, parser) in compiled {
            self.register(&names, parser.into());
        }
        Ok(count)
    }
}
