//! Engine configuration: poll cadence and the builder tables that decide
//! which resources a page waits for.
//!
//! Values can be constructed programmatically or read from `DASHBOARD_*`
//! environment variables; builder tables can be loaded from JSON.

use crate::registry::ResourceId;
use anyhow::{Context as _, Result};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Poll cadence used when none is configured.
pub const DEFAULT_POLL_MS: u64 = 100;

/// File name of a builder's results inside its results directory.
pub const RESULTS_FILE: &str = "results.json";
/// File name of the expectations inside a builder's results directory.
pub const EXPECTATIONS_FILE: &str = "expectations.json";

/// One builder: the name shown in the waterfall and its URL path segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderEntry {
    pub name: String,
    pub path: String,
}

impl BuilderEntry {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Builders whose results a page needs, and where their files live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSet {
    /// Prefix of every results directory (URL or relative path, with trailing `/`).
    pub base: String,
    pub builders: Vec<BuilderEntry>,
    /// Builder whose directory provides the expectations file. The last
    /// builder of the table when unset.
    #[serde(default)]
    pub expectations_source: Option<String>,
}

impl BuilderSet {
    /// Builder serving the expectations file.
    pub fn expectations_builder(&self) -> Option<&BuilderEntry> {
        match self.expectations_source.as_deref() {
            Some(name) => self.builder(name),
            None => self.builders.last(),
        }
    }

    pub fn builder(&self, name: &str) -> Option<&BuilderEntry> {
        self.builders.iter().find(|entry| entry.name == name)
    }

    /// Directory holding `builder`'s files for the given results family.
    pub fn results_dir(&self, test_type: &str, builder: &BuilderEntry) -> String {
        format!("{}{test_type}/{}/", self.base, builder.path)
    }

    /// Path of the named builder's results file.
    pub fn results_path(&self, test_type: &str, name: &str) -> Option<String> {
        self.builder(name)
            .map(|entry| format!("{}{RESULTS_FILE}", self.results_dir(test_type, entry)))
    }

    /// Path of the expectations file.
    pub fn expectations_path(&self, test_type: &str) -> Option<String> {
        self.expectations_builder()
            .map(|entry| format!("{}{EXPECTATIONS_FILE}", self.results_dir(test_type, entry)))
    }

    /// One results resource per builder, in table order.
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.builders
            .iter()
            .map(|entry| ResourceId::results(entry.name.as_str()))
            .collect()
    }
}

/// Release and local-debug builder sets; the page's `debug` flag picks one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderTables {
    pub release: BuilderSet,
    pub debug: BuilderSet,
}

impl BuilderTables {
    /// The layout test builders of the Chromium waterfall, plus a debug table
    /// pointing at a locally built results tree.
    pub fn chromium() -> Self {
        let release = [
            ("Webkit", "webkit-rel"),
            ("Webkit (dbg)(1)", "webkit-dbg-1"),
            ("Webkit (dbg)(2)", "webkit-dbg-2"),
            ("Webkit (dbg)(3)", "webkit-dbg-3"),
            ("Webkit Linux", "webkit-rel-linux"),
            ("Webkit Linux (dbg)(1)", "webkit-dbg-linux-1"),
            ("Webkit Linux (dbg)(2)", "webkit-dbg-linux-2"),
            ("Webkit Linux (dbg)(3)", "webkit-dbg-linux-3"),
            ("Webkit Mac10.5", "webkit-rel-mac5"),
            ("Webkit Mac10.5 (dbg)(1)", "webkit-dbg-mac5-1"),
            ("Webkit Mac10.5 (dbg)(2)", "webkit-dbg-mac5-2"),
            ("Webkit Mac10.5 (dbg)(3)", "webkit-dbg-mac5-3"),
        ];
        Self {
            release: BuilderSet {
                base: String::from("http://build.chromium.org/buildbot/"),
                builders: release
                    .into_iter()
                    .map(|(name, path)| BuilderEntry::new(name, path))
                    .collect(),
                expectations_source: None,
            },
            debug: BuilderSet {
                base: String::from("../../Debug/"),
                builders: vec![BuilderEntry::new("DUMMY_BUILDER_NAME", "")],
                expectations_source: None,
            },
        }
    }

    /// # Errors
    /// Returns an error if `json` is not a valid table description.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid builder table")
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = read_to_string(path)
            .with_context(|| format!("reading builder table {}", path.display()))?;
        Self::from_json(&json)
    }

    #[inline]
    pub const fn select(&self, debug: bool) -> &BuilderSet {
        if debug { &self.debug } else { &self.release }
    }
}

impl Default for BuilderTables {
    fn default() -> Self {
        Self::chromium()
    }
}

/// Runtime configuration for the synchronization engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// Location poll cadence in milliseconds; 0 disables polling.
    pub poll_interval_ms: u64,
    /// JSON builder table to use instead of the built-in one.
    pub builders_path: Option<PathBuf>,
    /// Overrides the builder serving the expectations file.
    pub expectations_source: Option<String>,
}

impl SyncConfig {
    #[inline]
    #[must_use]
    pub const fn new(poll_interval_ms: u64) -> Self {
        Self {
            poll_interval_ms,
            builders_path: None,
            expectations_source: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `DASHBOARD_POLL_MS`: poll cadence in milliseconds (default: 100, 0 disables)
    /// - `DASHBOARD_BUILDERS`: path to a JSON builder table
    /// - `DASHBOARD_EXPECTATIONS_SOURCE`: builder serving the expectations file
    #[must_use]
    pub fn from_env() -> Self {
        let poll_interval_ms = env::var("DASHBOARD_POLL_MS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_MS);
        let builders_path = env::var_os("DASHBOARD_BUILDERS").map(PathBuf::from);
        let expectations_source = env::var("DASHBOARD_EXPECTATIONS_SOURCE")
            .ok()
            .filter(|val| !val.is_empty());
        Self {
            poll_interval_ms,
            builders_path,
            expectations_source,
        }
    }

    /// Poll cadence, or `None` when polling is disabled.
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Option<Duration> {
        if self.poll_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.poll_interval_ms))
        }
    }

    /// Builder tables for this configuration, with the expectations override applied.
    ///
    /// # Errors
    /// Returns an error if a configured table file cannot be loaded.
    pub fn builder_tables(&self) -> Result<BuilderTables> {
        let mut tables = match self.builders_path.as_deref() {
            Some(path) => BuilderTables::load(path)?,
            None => BuilderTables::chromium(),
        };
        if let Some(source) = self.expectations_source.as_ref() {
            tables.release.expectations_source = Some(source.clone());
        }
        Ok(tables)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn chromium_paths() {
        let tables = BuilderTables::chromium();
        let release = tables.select(false);

        assert_eq!(
            release.results_path("layout_test_results", "Webkit Linux").as_deref(),
            Some("http://build.chromium.org/buildbot/layout_test_results/webkit-rel-linux/results.json")
        );
        assert_eq!(
            release.expectations_path("layout_test_results").as_deref(),
            Some("http://build.chromium.org/buildbot/layout_test_results/webkit-dbg-mac5-3/expectations.json")
        );
        assert_eq!(release.resource_ids().len(), 12);
        assert_eq!(release.results_path("layout_test_results", "Nope"), None);
    }

    #[test]
    fn debug_table_points_at_local_tree() {
        let tables = BuilderTables::chromium();
        let debug = tables.select(true);

        assert_eq!(
            debug.results_path("layout_test_results", "DUMMY_BUILDER_NAME").as_deref(),
            Some("../../Debug/layout_test_results//results.json")
        );
    }

    #[test]
    fn named_expectations_source() {
        let mut set = BuilderTables::chromium().release;
        set.expectations_source = Some(String::from("Webkit"));

        assert_eq!(
            set.expectations_path("ui_tests").as_deref(),
            Some("http://build.chromium.org/buildbot/ui_tests/webkit-rel/expectations.json")
        );

        set.expectations_source = Some(String::from("Missing"));
        assert_eq!(set.expectations_path("ui_tests"), None);
    }

    #[test]
    fn tables_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "release": {{"base": "/results/", "builders": [{{"name": "Mac", "path": "mac"}}]}},
                "debug": {{"base": "./", "builders": [{{"name": "Local", "path": "out"}}], "expectations_source": "Local"}}
            }}"#
        )
        .unwrap();
        let config = SyncConfig {
            poll_interval_ms: 0,
            builders_path: Some(file.path().to_path_buf()),
            expectations_source: Some(String::from("Mac")),
        };

        let tables = config.builder_tables().unwrap();

        assert_eq!(config.poll_interval(), None);
        assert_eq!(tables.release.builders, vec![BuilderEntry::new("Mac", "mac")]);
        assert_eq!(tables.release.expectations_source.as_deref(), Some("Mac"));
        assert_eq!(
            tables.debug.expectations_path("t").as_deref(),
            Some("./t/out/expectations.json")
        );
    }

    #[test]
    fn bad_table_is_an_error() {
        assert!(BuilderTables::from_json("{\"release\": 3}").is_err());
    }
}
