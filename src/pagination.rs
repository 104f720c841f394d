//! Offset pagination over a collection's item listing.
//!
//! The loop trusts nothing the server reports: `total` may never be reached,
//! and `count` may be zero. The page budget is the only thing guaranteeing
//! termination, and exhausting it ends the walk quietly rather than failing.

use crate::items::{ItemPage, RawItem};
use crate::{Result, WebflowApi};

/// Items requested per page.
pub const PAGE_LIMIT: usize = 100;

/// Page budget used by [`WebflowApi::get_item`].
pub const ITEM_LOOKUP_MAX_PAGES: usize = 10;

/// A caller-supplied handler for one page of raw items.
pub type PageHandler<'a> = dyn FnMut(Vec<RawItem>) -> Result<()> + Send + 'a;

/// Feeds every page of `collection_id` to `on_page`.
///
/// At most `max_pages + 1` pages are fetched. A handler error stops the walk
/// and is returned unchanged.
pub(crate) async fn for_each_page<A>(
    api: &A,
    collection_id: &str,
    max_pages: usize,
    on_page: &mut PageHandler<'_>,
) -> Result<()>
where
    A: WebflowApi + ?Sized,
{
    let mut offset = 0;
    let mut pages_left = max_pages;

    loop {
        let ItemPage {
            items,
            count,
            offset: page_offset,
            total,
            ..
        } = api
            .fetch_item_page(collection_id, offset, PAGE_LIMIT)
            .await?;

        tracing::debug!(
            collection_id = collection_id,
            offset = page_offset,
            count = count,
            total = total,
            "Fetched item page"
        );

        on_page(items)?;

        offset = page_offset.saturating_add(count);
        if offset >= total {
            return Ok(());
        }

        if pages_left == 0 {
            tracing::warn!(
                collection_id = collection_id,
                max_pages = max_pages,
                offset = offset,
                total = total,
                "Page limit reached before the listing was exhausted"
            );
            return Ok(());
        }
        pages_left -= 1;
    }
}
