use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Lcd,
    Indexer,
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointKind::Lcd => write!(f, "lcd"),
            EndpointKind::Indexer => write!(f, "indexer"),
        }
    }
}

/// A redundant network address serving one logical data source.
///
/// `latency` and `working` are rewritten wholesale by each probe cycle and
/// are meaningless for ranking until the first speed test has run.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub chain: String,
    pub kind: EndpointKind,
    pub latency: Duration,
    pub working: bool,
}

impl Endpoint {
    pub fn new(url: &str, chain: &str, kind: EndpointKind) -> Self {
        Self {
            url: url.to_string(),
            chain: chain.to_string(),
            kind,
            latency: Duration::ZERO,
            // Untested endpoints stay eligible for fallback until a probe
            // proves otherwise.
            working: true,
        }
    }
}

/// Ordered endpoint lists per (chain, kind).
///
/// Readers get a full snapshot; the prober swaps a full replacement in.
/// The lock is held only for the copy or the swap, never across I/O.
pub struct EndpointRegistry {
    lists: RwLock<HashMap<(String, EndpointKind), Vec<Endpoint>>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self { lists: RwLock::new(HashMap::new()) }
    }

    /// Seeds a list in insertion order, replacing any previous list for the
    /// same (chain, kind).
    pub fn register(&self, chain: &str, kind: EndpointKind, urls: &[String]) {
        let endpoints = urls
            .iter()
            .map(|url| Endpoint::new(url, chain, kind))
            .collect();
        self.lists
            .write()
            .insert((chain.to_string(), kind), endpoints);
    }

    pub fn list(&self, chain: &str, kind: EndpointKind) -> Vec<Endpoint> {
        self.lists
            .read()
            .get(&(chain.to_string(), kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn replace(&self, chain: &str, kind: EndpointKind, ranked: Vec<Endpoint>) {
        self.lists
            .write()
            .insert((chain.to_string(), kind), ranked);
    }

    /// Every (chain, kind) pair currently registered.
    pub fn keys(&self) -> Vec<(String, EndpointKind)> {
        self.lists.read().keys().cloned().collect()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
