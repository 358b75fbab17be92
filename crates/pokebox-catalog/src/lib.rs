//! Incrementally-loaded, searchable species catalog
//!
//! This crate sits between [`pokeapi_client`] and a presentation layer. A
//! [`Catalog`] pages through the remote species list in canonical order,
//! prefetches a name/type search index at session start, and re-routes
//! pagination through that index while a search query is active.
//!
//! State changes are published on [`tokio::sync::watch`] channels, so any
//! number of consumers can subscribe to the visible item list, the loading
//! flag, and the empty-result flag, and tear down by dropping the receiver.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokeapi_client::PokeApiClient;
//! use pokebox_catalog::Catalog;
//!
//! # async fn example() {
//! let catalog = Catalog::new(Arc::new(PokeApiClient::new()));
//! let mut items = catalog.subscribe_items();
//!
//! catalog.prefetch_index().await;
//! catalog.refresh().await;
//! println!("{} species loaded", items.borrow_and_update().len());
//!
//! catalog.update_search("grass").await;
//! # }
//! ```

mod catalog;
mod search;

pub use catalog::{Catalog, DEFAULT_PAGE_SIZE, PREFETCH_THRESHOLD};
pub use pokeapi_client::Pokemon;
