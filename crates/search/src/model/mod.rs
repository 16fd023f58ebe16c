//! Entity models stored in (or exchanged with) the search index.
//!
//! - [`Para`] - a blog paragraph with nested [`Writer`]s and keyword tags
//! - [`Writer`] - the author of a paragraph
//! - [`Company`] - a plain record mapped to JSON
//! - [`fixtures`] - the sample paragraphs used by the CLI and tests

mod company;
pub mod fixtures;
mod para;
mod writer;

pub use company::Company;
pub use para::Para;
pub use writer::Writer;
