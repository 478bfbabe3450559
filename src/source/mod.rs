pub mod arcgis;
mod models;
mod normalize;
pub mod polyline;
pub mod transit;

pub use models::*;
pub use normalize::*;
pub use polyline::{decode_polyline, encode_polyline};

use std::future::Future;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Upstream request failed with status {status}: {body}")]
    UpstreamRequestFailed { status: u16, body: String },
    #[error("Upstream request could not be completed: {0}")]
    Transport(String),
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("Pagination exceeded the safety ceiling of {ceiling} records")]
    PaginationExceeded { ceiling: usize },
    #[error("No usable {0} in upstream data")]
    NoUsableData(String),
}

pub const ROUTE_PAGE_CEILING: usize = 10_000;
pub const SHAPE_PAGE_CEILING: usize = 100_000;
pub const STOP_PAGE_CEILING: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct PageConfig {
    /// Records requested per page.
    pub limit: usize,
    /// Hard cap on records for one listing. Guards against an upstream that never ends.
    pub ceiling: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            ceiling: ROUTE_PAGE_CEILING,
        }
    }
}

impl PageConfig {
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether the upstream advertised another page.
    pub has_next: bool,
}

/// Drives an offset-based listing to completion. `fetch` is called with
/// `(offset, limit)` until the upstream reports no next page or returns a
/// short page.
pub async fn paginate<T, F, Fut>(config: &PageConfig, mut fetch: F) -> Result<Vec<T>, self::Error>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page<T>, self::Error>>,
{
    let limit = config.limit.max(1);
    let mut items: Vec<T> = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch(offset, limit).await?;
        let received = page.items.len();
        items.extend(page.items);
        if items.len() > config.ceiling {
            return Err(self::Error::PaginationExceeded {
                ceiling: config.ceiling,
            });
        }
        if !page.has_next || received < limit {
            break;
        }
        offset += received;
    }
    debug!("Paginated {} records", items.len());
    Ok(items)
}
