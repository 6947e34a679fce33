use std::future::Future;

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

/// One page of a cursor-paginated collection.
///
/// `next` is the opaque continuation handed back to the fetch-next capability;
/// its absence means the collection is exhausted.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Drains a paginated collection into one ordered `Vec`.
///
/// Every item of every page goes through `normalize`; `None` results are dropped.
/// Pages are fetched one at a time until the remote stops returning a cursor.
/// A failing fetch fails the whole drain, never yielding a truncated result.
pub async fn drain<T, R, F, Fut, N>(
    first_page: Page<T>,
    mut fetch_next: F,
    mut normalize: N,
) -> Result<Vec<R>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    N: FnMut(T) -> Option<R>,
{
    let mut results = Vec::with_capacity(first_page.items.len());
    let mut page = first_page;
    let mut page_number = 1usize;

    loop {
        results.extend(page.items.into_iter().filter_map(&mut normalize));

        let Some(cursor) = page.next else {
            break;
        };

        page_number += 1;
        tracing::debug!(page = page_number, "Fetching next page");
        page = fetch_next(cursor)
            .await
            .wrap_err_with(|| format!("Failed to fetch page {page_number}"))?;
    }

    Ok(results)
}
