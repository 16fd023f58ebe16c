//! Result and addressing types shared by the template and repositories.

mod hits;
mod index;
mod pagination;

pub use hits::{Aggregations, Bucket, SearchHit, SearchHits, SearchResponse, Terms};
pub use index::IndexCoordinates;
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest};
