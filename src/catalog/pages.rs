use tracing::warn;

use super::client::Catalog;
use super::model::{SearchKind, Track};

/// Collect every page of a search.
///
/// Stops at the first empty page, once `offset` reaches the reported total,
/// or at the first failed request (treated as "no more pages").
pub fn fetch_all(catalog: &dyn Catalog, query: &str, kind: SearchKind) -> Vec<Track> {
    let mut all: Vec<Track> = Vec::new();
    let mut offset = 0usize;

    loop {
        let page = match catalog.search(query, kind, offset) {
            Ok(page) => page,
            Err(e) => {
                warn!(query, offset, error = %e, "search page failed; keeping what we have");
                break;
            }
        };

        if page.items.is_empty() {
            break;
        }

        // A zero limit would never advance.
        let limit = page.limit.filter(|&l| l > 0).unwrap_or(page.items.len());
        let total = page.total;
        all.extend(page.items);

        offset += limit;
        if offset >= total {
            break;
        }
    }

    all
}
