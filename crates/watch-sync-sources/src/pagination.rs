use crate::error::SourceError;
use std::future::Future;
use tracing::{debug, trace};

/// Offset/limit cursor for one page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start_index: usize,
    pub limit: u32,
}

/// One page as returned by the server
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items that survived filtering (may be fewer than `returned`)
    pub items: Vec<T>,
    /// Raw number of records the server sent for this page
    pub returned: usize,
    /// Server-reported total at the time of this request
    pub total_record_count: usize,
}

impl<T> Page<T> {
    /// A page whose items were not filtered
    pub fn unfiltered(items: Vec<T>, total_record_count: usize) -> Self {
        let returned = items.len();
        Self {
            items,
            returned,
            total_record_count,
        }
    }
}

/// Walk an offset/limit listing to the end
///
/// The offset advances by the number of records the server actually returned.
/// An empty page always ends the walk, so a total that shrinks or grows between
/// pages cannot cause an endless loop; reaching the reported total ends it early.
/// A failed page aborts the walk with that error.
pub async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> Result<Vec<T>, SourceError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, SourceError>>,
{
    let mut collected = Vec::new();
    let mut start_index = 0usize;

    loop {
        let request = PageRequest {
            start_index,
            limit: page_size,
        };
        let page = fetch(request).await?;
        if page.returned == 0 {
            trace!(start_index, "Empty page, listing complete");
            break;
        }

        start_index += page.returned;
        collected.extend(page.items);

        if start_index >= page.total_record_count {
            break;
        }
    }

    debug!(records = start_index, kept = collected.len(), "Pagination finished");
    Ok(collected)
}
