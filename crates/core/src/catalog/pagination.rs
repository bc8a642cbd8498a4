use std::future::Future;

use futures::future::try_join_all;
use tracing::debug;

/// Largest page the catalog serves.
pub(crate) const MAX_PAGE_SIZE: usize = 50;

/// One page of results plus the catalog's reported total.
#[derive(Debug)]
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    /// Entries the catalog sent, including ones dropped while mapping.
    pub raw_len: usize,
}

impl<T> Page<T> {
    /// A page whose items are exactly what the catalog sent.
    pub fn new(items: Vec<T>, total: usize) -> Self {
        let raw_len = items.len();
        Self {
            items,
            total,
            raw_len,
        }
    }
}

/// Collect up to `limit` items by paging from offset 0.
///
/// The first page is fetched alone to learn the total; the remaining pages are
/// requested concurrently and concatenated in offset order. `max_reach` bounds
/// `offset + page_size` for endpoints that refuse deep paging.
pub(crate) async fn collect_pages<T, F, Fut, E>(
    limit: usize,
    max_reach: Option<usize>,
    fetch: F,
) -> Result<Vec<T>, E>
where
    F: Fn(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let ceiling = max_reach.map_or(limit, |reach| limit.min(reach));
    if ceiling == 0 {
        return Ok(Vec::new());
    }

    let first_size = ceiling.min(MAX_PAGE_SIZE);
    let first = fetch(0, first_size).await?;
    let mut items = first.items;
    if first.raw_len < first_size {
        return Ok(items);
    }

    let target = ceiling.min(first.total);
    let offsets: Vec<(usize, usize)> = (first_size..target)
        .step_by(MAX_PAGE_SIZE)
        .map(|offset| (offset, MAX_PAGE_SIZE.min(target - offset)))
        .collect();

    if !offsets.is_empty() {
        debug!(
            total = first.total,
            target,
            pages = offsets.len() + 1,
            "Fetching remaining pages"
        );
    }

    let pages = try_join_all(offsets.iter().map(|&(offset, size)| fetch(offset, size))).await?;
    for (page, &(_, size)) in pages.into_iter().zip(&offsets) {
        let short = page.raw_len < size;
        items.extend(page.items);
        if short {
            break;
        }
    }

    items.truncate(limit);
    Ok(items)
}
