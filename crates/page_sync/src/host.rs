//! Capabilities the hosting page provides to the engine.

use crate::context::PageContext;
use crate::registry::ResourceId;
use page_state::{ParameterExtension, StateRecord};
use log::warn;
use url::{ParseError, Url};

/// The page's navigable location.
pub trait Location {
    /// Full serialized location, used for change detection.
    fn href(&self) -> String;
    /// Path portion, used to build permalinks.
    fn pathname(&self) -> String;
    /// Fragment without the leading `#`; empty if there is none.
    fn fragment(&self) -> String;
    /// Replace the current location (no new history entry). `url` may be
    /// relative to the current location.
    fn replace(&mut self, url: &str);
}

/// A resource the engine wants loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: ResourceId,
    /// Path or URL of the file to load, relative to the page.
    pub path: String,
}

/// Starts asynchronous loads. Results are delivered back to the engine later,
/// in any order, any number of times, or never.
pub trait ResourceLoader {
    fn request_load(&mut self, request: LoadRequest);
}

/// Hooks implemented by a concrete dashboard page.
pub trait DashboardPage: ParameterExtension {
    /// Produce the page for the current state. Called only once every
    /// required resource has arrived.
    fn render(&mut self, context: &PageContext);

    /// Show or hide the page's loading indicator.
    fn set_loading_visible(&mut self, visible: bool) {
        let _unused = visible;
    }

    /// Page-specific defaults, applied under the cross-dashboard defaults.
    fn page_defaults(&self) -> StateRecord {
        StateRecord::new()
    }
}

/// In-memory location for headless hosts and tests.
#[derive(Clone, Debug)]
pub struct MemoryLocation {
    url: Url,
    replacements: u64,
}

impl MemoryLocation {
    /// # Errors
    /// Returns an error if `href` is not an absolute URL.
    pub fn new(href: &str) -> Result<Self, ParseError> {
        Ok(Self {
            url: Url::parse(href)?,
            replacements: 0,
        })
    }

    /// Simulate the user editing the fragment in the address bar.
    pub fn set_fragment(&mut self, fragment: &str) {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        self.url.set_fragment(Some(fragment));
    }

    #[inline]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Number of successful [`Location::replace`] calls.
    #[inline]
    pub const fn replacements(&self) -> u64 {
        self.replacements
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> String {
        self.url.as_str().to_owned()
    }

    fn pathname(&self) -> String {
        self.url.path().to_owned()
    }

    fn fragment(&self) -> String {
        self.url.fragment().unwrap_or_default().to_owned()
    }

    fn replace(&mut self, url: &str) {
        match self.url.join(url) {
            Ok(joined) => {
                self.url = joined;
                self.replacements = self.replacements.saturating_add(1);
            }
            Err(err) => warn!("MemoryLocation: cannot navigate to {url}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_resolves_against_current_location() {
        let mut location = MemoryLocation::new("file:///dash/flakiness.html#a=1").unwrap();
        location.replace("/dash/flakiness.html#testType=ui_tests&debug=false");

        assert_eq!(location.pathname(), "/dash/flakiness.html");
        assert_eq!(location.fragment(), "testType=ui_tests&debug=false");
        assert_eq!(location.replacements(), 1);
    }

    #[test]
    fn set_fragment_changes_href() {
        let mut location = MemoryLocation::new("http://localhost/d.html").unwrap();
        assert_eq!(location.fragment(), "");

        location.set_fragment("#debug=true");

        assert_eq!(location.href(), "http://localhost/d.html#debug=true");
    }
}
