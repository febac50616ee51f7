//! Flat `key=value` test descriptor parsing.
//!
//! A descriptor is a comma-separated list of `key=value` pairs selecting
//! and parameterizing one test capability, e.g.
//!
//! ```text
//! capability=pubsub,target=dapr,method=bulkpublish,store=memstore,topic=mytopic,numevents=100
//! ```
//!
//! Five keys are recognized and promoted to struct fields; everything else
//! is retained verbatim in an open extension mapping. Parsing is strictly
//! lexical -- capability/target/method validation happens once, at request
//! resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Recognized descriptor keys, in serialization order.
const KEY_CAPABILITY: &str = "capability";
const KEY_TARGET: &str = "target";
const KEY_METHOD: &str = "method";
const KEY_APP_ID: &str = "appid";
const KEY_STORE: &str = "store";

/// A parsed test descriptor.
///
/// Built once per test configuration and immutable afterwards. Unrecognized
/// keys round-trip through [`extensions`](Self::extensions) unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Category of remote operation under test (`invoke`, `state`, `pubsub`).
    pub capability: String,
    /// Backend surface receiving the request (`noop`, `dapr`, `appcallback`).
    pub target: String,
    /// Operation within the capability (`get`, `publish`, ...).
    pub method: String,
    /// Target application identifier for runtime-surface invokes.
    pub app_id: String,
    /// Component (state store or pub/sub) name.
    pub store: String,
    /// Open extension mapping for all other keys.
    pub extensions: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Looks up an extension value.
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).map(String::as_str)
    }

    /// Parses a descriptor string.
    ///
    /// Keys and values are whitespace-trimmed. A segment without exactly
    /// one `=` is rejected with [`ConfigError::MalformedSegment`].
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut descriptor = Self::default();
        for segment in input.split(',') {
            let parts: Vec<&str> = segment.split('=').collect();
            if parts.len() != 2 {
                return Err(ConfigError::MalformedSegment {
                    segment: segment.to_string(),
                });
            }
            let key = parts[0].trim();
            let value = parts[1].trim();
            match key {
                KEY_CAPABILITY => descriptor.capability = value.to_string(),
                KEY_TARGET => descriptor.target = value.to_string(),
                KEY_METHOD => descriptor.method = value.to_string(),
                KEY_APP_ID => descriptor.app_id = value.to_string(),
                KEY_STORE => descriptor.store = value.to_string(),
                _ => {
                    descriptor
                        .extensions
                        .insert(key.to_string(), value.to_string());
                },
            }
        }
        Ok(descriptor)
    }
}

impl FromStr for RequestDescriptor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RequestDescriptor {
    /// Re-serializes the descriptor. Recognized fields come first in a
    /// fixed order, empty ones omitted; extensions follow in key order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut write_pair = |f: &mut fmt::Formatter<'_>, k: &str, v: &str| -> fmt::Result {
            if v.is_empty() {
                return Ok(());
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{k}={v}")
        };
        write_pair(f, KEY_CAPABILITY, &self.capability)?;
        write_pair(f, KEY_TARGET, &self.target)?;
        write_pair(f, KEY_METHOD, &self.method)?;
        write_pair(f, KEY_APP_ID, &self.app_id)?;
        write_pair(f, KEY_STORE, &self.store)?;
        for (k, v) in &self.extensions {
            write_pair(f, k, v)?;
        }
        Ok(())
    }
}
