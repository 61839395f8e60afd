use futures::future::join_all;
use reqwest::Client;
use std::time::{Duration, Instant};

use super::endpoints::Endpoint;
use super::hostname;

/// Concurrent latency and availability measurement for a whole endpoint
/// list. One request per endpoint, all in flight at once, joined before the
/// ranking is produced.
pub struct EndpointProber {
    client: Client,
}

impl EndpointProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            // Redirects are not followed: anything but a direct 200 counts
            // as a failed endpoint.
            client: Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("reqwest client"),
        }
    }

    /// Probes every endpoint with a lightweight GET on `test_path` and
    /// returns the list re-ranked: working endpoints first, fastest first,
    /// failed endpoints after them in their original relative order.
    pub async fn probe(&self, endpoints: Vec<Endpoint>, test_path: &str) -> Vec<Endpoint> {
        let probes = endpoints.into_iter().map(|endpoint| {
            let client = self.client.clone();
            let url = format!("{}{}", endpoint.url, test_path);
            async move {
                let start = Instant::now();
                let working = match client.get(&url).send().await {
                    Ok(resp) => resp.status() == reqwest::StatusCode::OK,
                    Err(_) => false,
                };
                // Latency is recorded for failures too, for diagnostics.
                let latency = start.elapsed();

                if working {
                    tracing::debug!("✓ {}: {:?}", hostname(&endpoint.url), latency);
                } else {
                    tracing::debug!("✗ {}: unreachable or non-200", hostname(&endpoint.url));
                }

                Endpoint { latency, working, ..endpoint }
            }
        });

        // join_all keeps results in input order, so the failed group below
        // stays in original relative order.
        let probed = join_all(probes).await;
        let ranked = rank(probed);

        let working = ranked.iter().filter(|e| e.working).count();
        tracing::info!(
            "Speed test complete: {}/{} endpoints working, fastest: {}",
            working,
            ranked.len(),
            ranked
                .first()
                .filter(|e| e.working)
                .map(|e| hostname(&e.url))
                .unwrap_or("none"),
        );

        ranked
    }
}

/// Stable ranking: working endpoints ascending by latency, then every failed
/// endpoint in the relative order it arrived in.
pub fn rank(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    let (mut working, failed): (Vec<Endpoint>, Vec<Endpoint>) =
        endpoints.into_iter().partition(|e| e.working);
    working.sort_by_key(|e| e.latency);
    working.extend(failed);
    working
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::endpoints::EndpointKind;

    fn endpoint(url: &str, latency_ms: u64, working: bool) -> Endpoint {
        let mut e = Endpoint::new(url, "osmosis", EndpointKind::Lcd);
        e.latency = Duration::from_millis(latency_ms);
        e.working = working;
        e
    }

    fn urls(endpoints: &[Endpoint]) -> Vec<&str> {
        endpoints.iter().map(|e| e.url.as_str()).collect()
    }

    #[test]
    fn working_sorted_by_latency_before_all_failed() {
        let ranked = rank(vec![
            endpoint("https://slow", 900, true),
            endpoint("https://dead-1", 30000, false),
            endpoint("https://fast", 120, true),
            endpoint("https://dead-2", 15, false),
            endpoint("https://medium", 400, true),
        ]);

        assert_eq!(
            urls(&ranked),
            vec![
                "https://fast",
                "https://medium",
                "https://slow",
                "https://dead-1",
                "https://dead-2",
            ]
        );
        // Failed endpoints keep their original relative order even when one
        // of them recorded a lower latency.
        assert!(!ranked[3].working && !ranked[4].working);
    }

    #[test]
    fn equal_latencies_keep_original_order() {
        let ranked = rank(vec![
            endpoint("https://first", 100, true),
            endpoint("https://second", 100, true),
            endpoint("https://third", 100, true),
        ]);
        assert_eq!(urls(&ranked), vec!["https://first", "https://second", "https://third"]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let once = rank(vec![
            endpoint("https://b", 200, true),
            endpoint("https://a", 100, true),
            endpoint("https://x", 0, false),
        ]);
        let twice = rank(once.clone());
        assert_eq!(urls(&once), urls(&twice));
    }

    #[test]
    fn all_failed_list_is_unchanged() {
        let ranked = rank(vec![
            endpoint("https://a", 10, false),
            endpoint("https://b", 5, false),
        ]);
        assert_eq!(urls(&ranked), vec!["https://a", "https://b"]);
    }
}
