pub mod dydx;
pub mod endpoints;
pub mod fallback;
pub mod osmosis;
pub mod prober;

pub use endpoints::{Endpoint, EndpointKind, EndpointRegistry};
pub use prober::EndpointProber;

/// Failure of a single fetch attempt, or of a whole fallback sequence.
///
/// Transport, status and parse failures are treated identically by the
/// fallback loop: the endpoint is abandoned for the cycle and the next one
/// is tried. Only `Exhausted` crosses the fetcher boundary.
#[derive(Debug)]
pub enum FetchError {
    Network(String),
    Status(u16),
    Parse(String),
    NoData(&'static str),
    Exhausted { attempted: usize },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {}", e),
            FetchError::Status(code) => write!(f, "Unexpected status: {}", code),
            FetchError::Parse(e) => write!(f, "Parse error: {}", e),
            FetchError::NoData(what) => write!(f, "No data: {}", what),
            FetchError::Exhausted { attempted } => {
                write!(f, "All endpoints failed ({} attempted)", attempted)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Hostname shorthand for endpoint log lines.
pub fn hostname(url: &str) -> &str {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    stripped.split('/').next().unwrap_or(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_strips_scheme_and_path() {
        assert_eq!(hostname("https://lcd.osmosis.zone"), "lcd.osmosis.zone");
        assert_eq!(
            hostname("https://rest.lavenderfive.com:443/osmosis"),
            "rest.lavenderfive.com:443"
        );
        assert_eq!(hostname("http://localhost:8080/a/b"), "localhost:8080");
    }
}
