pub mod error;
pub mod jellyfin;
pub mod pagination;
pub mod traits;

pub use error::SourceError;
pub use jellyfin::JellyfinClient;
pub use pagination::{collect_pages, Page, PageRequest};
pub use traits::CatalogClient;
