mod client;
mod documents;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, ApiError};
pub use documents::DocumentApi;
