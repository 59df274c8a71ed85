mod document;
mod ingest;

pub use document::*;
pub use ingest::*;
