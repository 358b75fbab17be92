//! Rust client for the [PokeAPI](https://pokeapi.co/) REST catalog
//!
//! This crate turns PokeAPI's paginated, multi-resource surface into typed
//! operations over a single domain value, [`Pokemon`]. Every raw response is
//! cached by exact URL in a bounded async cache, so repeated lookups of the
//! same resource perform a single network call per session.
//!
//! # Example
//!
//! ```no_run
//! use pokeapi_client::PokeApiClient;
//!
//! # async fn example() -> Result<(), pokeapi_client::PokeApiError> {
//! let client = PokeApiClient::new();
//!
//! // Load the first catalog page
//! let page = client.get_page(20, 0).await?;
//! println!("{} species total", page.total_count);
//!
//! // Resolve a single species (aliases collapse to their canonical form)
//! let pokemon = client.get_pokemon("bulbasaur").await?;
//! println!("{}: {:?}", pokemon.name, pokemon.flavor_text);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - `GET /pokemon-species?limit=&offset=` - Paginated species list
//! - `GET /pokemon-species?limit=100000` - Full species name list
//! - `GET /pokemon/{name}` - Species detail (types, species link, artwork)
//! - species resource by absolute URL - Flavor text entries
//! - `GET /type` - Type list
//! - type detail by absolute URL - Member species per type

mod client;
mod endpoint;
mod error;
mod types;

pub use client::{PokeApiClient, RequestCache, DEFAULT_CACHE_CAPACITY, MAX_ALIAS_DEPTH};
pub use endpoint::{Endpoint, DEFAULT_BASE_URL, LIST_ALL_LIMIT};
pub use error::{PokeApiError, Result};
pub use types::{
    FlavorTextEntry, NamedResource, NamedResourceLink, OfficialArtwork, OtherSprites, Pokemon,
    PokemonDetailResponse, PokemonPage, PokemonSpeciesResponse, SpeciesListResponse, Sprites,
    TypeDetailResponse, TypeListResponse, TypeMember, TypeSlot,
};
