// src/lib.rs

pub mod browse; // dla src/browse.rs
pub mod client; // dla src/client.rs
pub mod config; // dla src/config.rs
pub mod controller; // dla src/controller.rs
pub mod errors; // dla src/errors.rs
pub mod filters; // dla src/filters.rs
pub mod local_store; // dla src/local_store.rs
pub mod models; // dla src/models.rs
pub mod pagination; // dla src/pagination.rs
pub mod paging; // dla src/paging.rs
pub mod pricing; // dla src/pricing.rs
pub mod repository; // dla src/repository.rs
pub mod response; // dla src/response.rs
pub mod upload; // dla src/upload.rs

#[cfg(test)]
mod test_support;

pub use browse::ProductBrowser;
pub use client::HubClient;
pub use config::HubConfig;
pub use controller::{LoadDirection, LoadOutcome, LoadState, PagedListController};
pub use errors::{ErrorKind, HubError, HubResult};
pub use filters::{FilterEvent, FilterState};
pub use pagination::{PageRequest, PageResult, PageToken, TokenScheme};
pub use paging::PagingSource;
pub use upload::ImageUploader;
