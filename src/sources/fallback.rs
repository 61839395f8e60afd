use std::future::Future;
use std::time::Duration;

use super::endpoints::Endpoint;
use super::{hostname, FetchError};

/// Pause between two consecutive endpoint attempts, and between pages of a
/// paged listing, so a degraded provider set is not hammered.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Hard ceiling on pages fetched from a single endpoint. Runaway protection
/// in case an endpoint keeps returning a continuation key.
pub const MAX_PAGES: usize = 20;

/// Tries endpoints strictly in the order given, skipping the ones flagged
/// not working, and returns the first success. Endpoint-level failures never
/// escape; callers only see the final result or an exhaustion error.
pub async fn fetch_with_fallback<T, F, Fut>(
    endpoints: &[Endpoint],
    mut fetch_one: F,
) -> Result<T, FetchError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempted = 0;

    for (i, endpoint) in endpoints.iter().enumerate() {
        if !endpoint.working {
            tracing::debug!("⏭ Skipping {}: flagged not working", hostname(&endpoint.url));
            continue;
        }

        tracing::debug!(
            "Trying {} ({:?})",
            hostname(&endpoint.url),
            endpoint.latency
        );
        attempted += 1;

        match fetch_one(endpoint.url.clone()).await {
            Ok(result) => {
                tracing::debug!("✓ Success with {}", hostname(&endpoint.url));
                return Ok(result);
            }
            Err(e) => {
                tracing::warn!("✗ {} failed: {}", hostname(&endpoint.url), e);
            }
        }

        if i < endpoints.len() - 1 {
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }

    Err(FetchError::Exhausted { attempted })
}

/// Drains a paged listing from one endpoint.
///
/// `fetch_page` receives the continuation key of the previous page (None for
/// the first request) and returns the page's items plus the next key. The
/// loop stops on an empty page, on an empty continuation key, or at the
/// `max_pages` ceiling, whichever comes first. Zero items collected overall
/// is a failure so the caller falls back to the next endpoint.
pub async fn collect_pages<T, F, Fut>(max_pages: usize, mut fetch_page: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), FetchError>>,
{
    let mut items = Vec::new();
    let mut next_key: Option<String> = None;

    for page in 1..=max_pages {
        let (page_items, key) = fetch_page(next_key.take()).await?;

        if page_items.is_empty() {
            tracing::debug!("End of listing at page {}", page);
            break;
        }
        items.extend(page_items);

        match key {
            Some(k) if !k.is_empty() => next_key = Some(k),
            _ => break,
        }

        if page == max_pages {
            tracing::warn!("Page ceiling reached ({}), keeping {} items", max_pages, items.len());
            break;
        }

        tokio::time::sleep(RETRY_BACKOFF).await;
    }

    if items.is_empty() {
        return Err(FetchError::NoData("empty paged listing"));
    }
    Ok(items)
}
