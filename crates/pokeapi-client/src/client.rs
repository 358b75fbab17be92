//! PokeAPI HTTP client with per-URL response caching

use crate::endpoint::{Endpoint, DEFAULT_BASE_URL};
use crate::error::{PokeApiError, Result};
use crate::types::*;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default capacity of the raw response cache
///
/// Large enough to hold every resource a session touches; pass a custom
/// cache to change the policy.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Maximum number of alias hops followed when resolving a species
///
/// The alias graph is expected to be acyclic, so this ceiling only trips on
/// unexpected cycles in the remote data.
pub const MAX_ALIAS_DEPTH: usize = 5;

/// Cache of raw response bytes keyed by exact request URL
///
/// Two URLs differing only in query-parameter order are distinct entries.
pub type RequestCache = Cache<String, Arc<Vec<u8>>>;

/// Client for the PokeAPI catalog
///
/// All operations go through [`fetch`](Self::fetch)'s cache, so any resource
/// is downloaded at most once per cache lifetime. Safe to share across tasks;
/// concurrent fetches of different URLs proceed independently, and two
/// concurrent fetches of the same URL may both hit the network but insert
/// identical bytes.
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
    cache: RequestCache,
}

impl PokeApiClient {
    /// Create a client against the public PokeAPI with a default bounded cache
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API base URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_base_url_and_cache(base_url, Cache::new(DEFAULT_CACHE_CAPACITY))
    }

    /// Create a client with a custom base URL and an injected response cache
    pub fn with_base_url_and_cache(base_url: &str, cache: RequestCache) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Fetch raw bytes for a URL, consulting the response cache first
    ///
    /// Only 2xx responses are cached; any other status or transport failure
    /// surfaces as an error and leaves the cache untouched.
    async fn fetch(&self, url: &str) -> Result<Arc<Vec<u8>>> {
        if let Some(cached) = self.cache.get(url).await {
            debug!(url = %url, "Cache hit");
            return Ok(cached);
        }

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PokeApiError::Status(status));
        }

        let data = Arc::new(response.bytes().await?.to_vec());
        debug!(url = %url, size = data.len(), "Fetched and cached");
        self.cache.insert(url.to_string(), Arc::clone(&data)).await;
        Ok(data)
    }

    /// Fetch and decode a typed response for a logical endpoint
    async fn request<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let url = endpoint.url(&self.base_url);
        let data = self.fetch(&url).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Fetch one catalog page and resolve every listed species
    ///
    /// Species are resolved one at a time in list order so pages arrive in
    /// the server's canonical order. The total count comes from the list
    /// response and is stable across pages.
    pub async fn get_page(&self, limit: u32, offset: u32) -> Result<PokemonPage> {
        let list: SpeciesListResponse =
            self.request(&Endpoint::SpeciesList { limit, offset }).await?;

        let mut items = Vec::with_capacity(list.results.len());
        for entry in &list.results {
            items.push(self.get_pokemon(&entry.name).await?);
        }

        Ok(PokemonPage {
            total_count: list.count,
            items,
        })
    }

    /// Resolve a single species by name, collapsing aliases to their
    /// canonical form
    ///
    /// A detail resource whose embedded species name differs from its own
    /// name is an alternate form; resolution restarts from the canonical
    /// name, up to [`MAX_ALIAS_DEPTH`] hops.
    pub async fn get_pokemon(&self, name: &str) -> Result<Pokemon> {
        let mut current = name.to_string();

        for _ in 0..MAX_ALIAS_DEPTH {
            let detail: PokemonDetailResponse = self
                .request(&Endpoint::PokemonDetail { name: current.clone() })
                .await?;

            if detail.name != detail.species.name {
                debug!(alias = %detail.name, canonical = %detail.species.name, "Following species alias");
                current = detail.species.name;
                continue;
            }

            let species: PokemonSpeciesResponse = self
                .request(&Endpoint::SpeciesDetail { url: detail.species.url.clone() })
                .await?;

            let flavor_text = species
                .flavor_text_entries
                .iter()
                .find(|entry| entry.language.name == "en")
                .map(|entry| condense_flavor_text(&entry.flavor_text));

            let types = detail
                .types
                .into_iter()
                .map(|slot| slot.type_ref.name)
                .collect();

            return Ok(Pokemon {
                name: detail.name,
                flavor_text,
                types,
                artwork_url: detail.sprites.other.official_artwork.front_default,
            });
        }

        Err(PokeApiError::AliasDepth(name.to_string()))
    }

    /// Fetch the complete set of species names
    pub async fn get_name_set(&self) -> Result<HashSet<String>> {
        let list: SpeciesListResponse = self.request(&Endpoint::SpeciesListAll).await?;
        Ok(list.results.into_iter().map(|entry| entry.name).collect())
    }

    /// Fetch all species names grouped by type name
    ///
    /// Issues one type-detail request per type concurrently. All requests
    /// must succeed; a single failure fails the whole call with no partial
    /// map.
    pub async fn get_type_map(&self) -> Result<HashMap<String, HashSet<String>>> {
        let list: TypeListResponse = self.request(&Endpoint::TypeList).await?;

        let fetches = list.results.into_iter().map(|entry| async move {
            let detail: TypeDetailResponse =
                self.request(&Endpoint::TypeDetail { url: entry.url }).await?;
            let members: HashSet<String> = detail
                .pokemon
                .into_iter()
                .map(|member| member.pokemon.name)
                .collect();
            Ok::<_, PokeApiError>((entry.name, members))
        });

        let pairs = futures::future::try_join_all(fetches).await?;
        Ok(pairs.into_iter().collect())
    }
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize raw flavor text and keep only its first sentence
///
/// Literal newlines and form feeds become spaces. Text with more than one
/// sentence-terminating period keeps only the first fragment, trimmed, with
/// a single trailing period; otherwise the normalized text is unchanged.
fn condense_flavor_text(raw: &str) -> String {
    let normalized = raw.replace(['\n', '\u{0c}'], " ");
    let fragments: Vec<&str> = normalized.split('.').filter(|f| !f.is_empty()).collect();
    if fragments.len() > 1 {
        format!("{}.", fragments[0].trim())
    } else {
        normalized
    }
}
