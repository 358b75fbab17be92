//! Catalog orchestration: paging, search, and observable state

use crate::search::filter_names;
use futures::stream::{FuturesUnordered, StreamExt};
use pokeapi_client::{PokeApiClient, Pokemon};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

/// Default number of entities loaded per page or search chunk
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How close to the end of the loaded list a consumer may scroll before the
/// next page is requested
pub const PREFETCH_THRESHOLD: usize = 4;

/// Serialized catalog state; only touched while holding the state lock
#[derive(Default)]
struct CatalogState {
    total_count: Option<usize>,
    name_set: HashSet<String>,
    type_map: HashMap<String, HashSet<String>>,
    filtered_names: Vec<String>,
    search_offset: usize,
    current_search: String,
    is_loading: bool,
    /// Bumped on every search change or refresh; in-flight loads carrying an
    /// older epoch discard their results instead of appending stale data.
    epoch: u64,
}

/// What the next `load_next_page` call should fetch
enum LoadPlan {
    Page { offset: usize },
    SearchChunk { names: Vec<String> },
}

/// Incrementally-loaded, searchable species catalog
///
/// Wraps a shared [`PokeApiClient`] and owns all pagination and search
/// state. Catalog pages are resolved sequentially and appended in request
/// order; search chunks are resolved concurrently and appended in completion
/// order. Consumers observe the visible list, the loading flag, and the
/// empty-result flag through watch channels.
pub struct Catalog {
    client: Arc<PokeApiClient>,
    page_size: usize,
    state: Mutex<CatalogState>,
    items_tx: watch::Sender<Vec<Pokemon>>,
    loading_tx: watch::Sender<bool>,
    empty_tx: watch::Sender<bool>,
}

impl Catalog {
    /// Create a catalog with the default page size
    pub fn new(client: Arc<PokeApiClient>) -> Self {
        Self::with_page_size(client, DEFAULT_PAGE_SIZE)
    }

    /// Create a catalog with a custom page size
    pub fn with_page_size(client: Arc<PokeApiClient>, page_size: usize) -> Self {
        let (items_tx, _) = watch::channel(Vec::new());
        let (loading_tx, _) = watch::channel(false);
        let (empty_tx, _) = watch::channel(false);

        Self {
            client,
            page_size,
            state: Mutex::new(CatalogState::default()),
            items_tx,
            loading_tx,
            empty_tx,
        }
    }

    /// Subscribe to the visible item list
    pub fn subscribe_items(&self) -> watch::Receiver<Vec<Pokemon>> {
        self.items_tx.subscribe()
    }

    /// Subscribe to the loading flag
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    /// Subscribe to the empty-result flag
    pub fn subscribe_empty(&self) -> watch::Receiver<bool> {
        self.empty_tx.subscribe()
    }

    /// Snapshot of the currently visible items
    pub fn items(&self) -> Vec<Pokemon> {
        self.items_tx.borrow().clone()
    }

    /// Whether a page or chunk load is in flight
    pub fn is_loading(&self) -> bool {
        *self.loading_tx.borrow()
    }

    /// Whether the active search produced no results
    pub fn is_empty_state(&self) -> bool {
        *self.empty_tx.borrow()
    }

    /// Total species count, known after the first catalog page loads
    pub async fn total_count(&self) -> Option<usize> {
        self.state.lock().await.total_count
    }

    /// Build the name/type search index
    ///
    /// Intended to run once at session start; the name set and type map are
    /// fetched concurrently. On any failure the index stays empty and search
    /// degrades to returning no matches until the next session.
    pub async fn prefetch_index(&self) {
        let (names, types) = tokio::join!(self.client.get_name_set(), self.client.get_type_map());
        match (names, types) {
            (Ok(names), Ok(types)) => {
                debug!(names = names.len(), types = types.len(), "Search index ready");
                let mut state = self.state.lock().await;
                state.name_set = names;
                state.type_map = types;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to prefetch search index");
            }
        }
    }

    /// Reset all pagination and search state and reload from offset 0
    ///
    /// Already-loaded items are cleared, but a failure during the reload
    /// leaves the catalog empty rather than crashing; the consumer can
    /// refresh again.
    pub async fn refresh(&self) {
        {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.total_count = None;
            state.filtered_names.clear();
            state.search_offset = 0;
            state.current_search.clear();
            self.items_tx.send_modify(Vec::clear);
            self.empty_tx.send_replace(false);
        }
        self.load_next_page().await;
    }

    /// Apply a new search query
    ///
    /// An empty query clears the filtered state and resumes catalog
    /// pagination from offset 0. A non-empty query recomputes the filtered
    /// name list in full and restarts search pagination over it. Either way
    /// the visible list is cleared and any in-flight load for the previous
    /// query becomes stale.
    ///
    /// If a load is in flight when the query changes, the initial load for
    /// the new query is skipped by the single-flight guard; the next
    /// [`will_display`](Self::will_display) or
    /// [`load_next_page`](Self::load_next_page) call picks it up.
    pub async fn update_search(&self, text: &str) {
        let query = text.to_lowercase();
        let should_load = {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.current_search = query.clone();
            state.search_offset = 0;
            self.items_tx.send_modify(Vec::clear);

            if query.is_empty() {
                state.filtered_names.clear();
                self.empty_tx.send_replace(false);
                true
            } else {
                state.filtered_names = filter_names(&query, &state.name_set, &state.type_map);
                debug!(query = %query, matches = state.filtered_names.len(), "Search updated");
                let empty = state.filtered_names.is_empty();
                self.empty_tx.send_replace(empty);
                !empty
            }
        };
        if should_load {
            self.load_next_page().await;
        }
    }

    /// Load the next catalog page or search chunk
    ///
    /// Single-flight: a call made while a load is already in progress is a
    /// no-op. Failures are logged and leave previously loaded items intact.
    pub async fn load_next_page(&self) {
        let (plan, epoch) = {
            let mut state = self.state.lock().await;
            if state.is_loading {
                return;
            }
            let Some(plan) = self.next_plan(&mut state) else {
                return;
            };
            state.is_loading = true;
            (plan, state.epoch)
        };
        self.loading_tx.send_replace(true);

        match plan {
            LoadPlan::Page { offset } => self.load_catalog_page(offset, epoch).await,
            LoadPlan::SearchChunk { names } => self.load_search_chunk(names, epoch).await,
        }

        self.state.lock().await.is_loading = false;
        self.loading_tx.send_replace(false);
    }

    /// Prefetch trigger for list consumers
    ///
    /// Call with the index of the item currently becoming visible; the next
    /// page is requested once the position is within [`PREFETCH_THRESHOLD`]
    /// items of the end of the loaded list and more data remains.
    pub async fn will_display(&self, index: usize) {
        let should_load = {
            let state = self.state.lock().await;
            let loaded = self.items_tx.borrow().len();
            if index + PREFETCH_THRESHOLD < loaded {
                false
            } else if state.current_search.is_empty() {
                state.total_count.map_or(true, |total| loaded < total)
            } else {
                state.search_offset < state.filtered_names.len()
            }
        };
        if should_load {
            self.load_next_page().await;
        }
    }

    /// Decide what the next load should fetch, or `None` when exhausted
    ///
    /// Search mode consumes its slice of `filtered_names` here, so the
    /// search offset advances as soon as the chunk is planned.
    fn next_plan(&self, state: &mut CatalogState) -> Option<LoadPlan> {
        if state.current_search.is_empty() {
            let loaded = self.items_tx.borrow().len();
            match state.total_count {
                Some(total) if loaded >= total => None,
                _ => Some(LoadPlan::Page { offset: loaded }),
            }
        } else if state.search_offset < state.filtered_names.len() {
            let end = (state.search_offset + self.page_size).min(state.filtered_names.len());
            let names = state.filtered_names[state.search_offset..end].to_vec();
            state.search_offset = end;
            Some(LoadPlan::SearchChunk { names })
        } else {
            None
        }
    }

    /// Sequentially resolved catalog page, appended in request order
    async fn load_catalog_page(&self, offset: usize, epoch: u64) {
        match self.client.get_page(self.page_size as u32, offset as u32).await {
            Ok(page) => {
                let mut state = self.state.lock().await;
                if state.epoch != epoch {
                    debug!(offset, "Discarding catalog page for a stale epoch");
                    return;
                }
                if state.total_count.is_none() {
                    state.total_count = Some(page.total_count);
                }
                self.items_tx.send_modify(|items| items.extend(page.items));
            }
            Err(e) => warn!(offset, error = %e, "Failed to load catalog page"),
        }
    }

    /// Concurrently resolved search chunk, appended in completion order
    ///
    /// One failed member drops the whole chunk; the search offset stays
    /// advanced, matching the page-level all-or-nothing contract.
    async fn load_search_chunk(&self, names: Vec<String>, epoch: u64) {
        let mut pending: FuturesUnordered<_> =
            names.iter().map(|name| self.client.get_pokemon(name)).collect();

        let mut chunk = Vec::with_capacity(names.len());
        while let Some(result) = pending.next().await {
            match result {
                Ok(pokemon) => chunk.push(pokemon),
                Err(e) => {
                    warn!(error = %e, "Failed to resolve search result; dropping chunk");
                    return;
                }
            }
        }
        // Hold the state lock across the append so a concurrent query change
        // cannot interleave with it.
        let state = self.state.lock().await;
        if state.epoch != epoch {
            debug!("Discarding search chunk for a stale epoch");
            return;
        }
        self.items_tx.send_modify(|items| items.extend(chunk));
        let empty = self.items_tx.borrow().is_empty();
        self.empty_tx.send_replace(empty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::time::Duration;

    const SPECIES: [(&str, u32, &str); 4] = [
        ("bulbasaur", 1, "grass"),
        ("charmander", 4, "fire"),
        ("squirtle", 7, "water"),
        ("pikachu", 25, "electric"),
    ];

    #[derive(Clone)]
    struct MockApi {
        base: String,
        fail_types: bool,
        page_delay: Duration,
    }

    async fn species_list(
        State(api): State<MockApi>,
        Query(params): Query<HashMap<String, String>>,
    ) -> String {
        // Only paged requests carry an offset; the list-all index fetch
        // stays fast so tests can delay pagination in isolation.
        if params.contains_key("offset") {
            tokio::time::sleep(api.page_delay).await;
        }
        let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
        let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let results: Vec<String> = SPECIES
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(name, id, _)| {
                format!(
                    r#"{{"name": "{}", "url": "{}/pokemon-species/{}/"}}"#,
                    name, api.base, id
                )
            })
            .collect();
        format!(
            r#"{{"count": {}, "next": null, "previous": null, "results": [{}]}}"#,
            SPECIES.len(),
            results.join(", ")
        )
    }

    async fn pokemon_detail(
        State(api): State<MockApi>,
        Path(name): Path<String>,
    ) -> (StatusCode, String) {
        let Some((n, id, ty)) = SPECIES.iter().find(|(n, _, _)| *n == name).copied() else {
            return (StatusCode::NOT_FOUND, "{}".to_string());
        };
        let body = format!(
            r#"{{
                "name": "{}",
                "types": [{{"type": {{"name": "{}"}}}}],
                "species": {{"name": "{}", "url": "{}/pokemon-species/{}/"}},
                "sprites": {{"other": {{"official-artwork": {{"front_default": null}}}}}}
            }}"#,
            n, ty, n, api.base, id
        );
        (StatusCode::OK, body)
    }

    async fn species_detail(Path(_id): Path<u32>) -> String {
        r#"{"flavor_text_entries": [{"flavor_text": "A species.", "language": {"name": "en"}}]}"#
            .to_string()
    }

    async fn type_list(State(api): State<MockApi>) -> String {
        let results: Vec<String> = SPECIES
            .iter()
            .map(|(_, _, ty)| format!(r#"{{"name": "{}", "url": "{}/type/{}/"}}"#, ty, api.base, ty))
            .collect();
        format!(r#"{{"results": [{}]}}"#, results.join(", "))
    }

    async fn type_detail(
        State(api): State<MockApi>,
        Path(name): Path<String>,
    ) -> (StatusCode, String) {
        if api.fail_types {
            return (StatusCode::INTERNAL_SERVER_ERROR, "{}".to_string());
        }
        let members: Vec<String> = SPECIES
            .iter()
            .filter(|(_, _, ty)| *ty == name)
            .map(|(n, _, _)| format!(r#"{{"pokemon": {{"name": "{}"}}}}"#, n))
            .collect();
        (StatusCode::OK, format!(r#"{{"pokemon": [{}]}}"#, members.join(", ")))
    }

    async fn spawn_mock_api(fail_types: bool, page_delay: Duration) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let api = MockApi { base: base.clone(), fail_types, page_delay };
        let app = Router::new()
            .route("/pokemon-species", get(species_list))
            .route("/pokemon-species/{id}/", get(species_detail))
            .route("/pokemon/{name}", get(pokemon_detail))
            .route("/type", get(type_list))
            .route("/type/{name}/", get(type_detail))
            .with_state(api);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        base
    }

    async fn mock_catalog(page_size: usize) -> Catalog {
        let base = spawn_mock_api(false, Duration::ZERO).await;
        let client = Arc::new(PokeApiClient::with_base_url(&base));
        Catalog::with_page_size(client, page_size)
    }

    fn names(items: &[Pokemon]) -> Vec<&str> {
        items.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn refresh_loads_first_page_in_catalog_order() {
        let catalog = mock_catalog(2).await;
        catalog.refresh().await;

        assert_eq!(names(&catalog.items()), ["bulbasaur", "charmander"]);
        assert_eq!(catalog.total_count().await, Some(4));
        assert!(!catalog.is_loading());
        assert!(!catalog.is_empty_state());
    }

    #[tokio::test]
    async fn will_display_prefetches_near_the_end() {
        let catalog = mock_catalog(2).await;
        catalog.refresh().await;
        assert_eq!(catalog.items().len(), 2);

        // Second item becomes visible: within threshold of the end
        catalog.will_display(1).await;
        assert_eq!(
            names(&catalog.items()),
            ["bulbasaur", "charmander", "squirtle", "pikachu"]
        );

        // Everything is loaded; further displays must not page past the total
        catalog.will_display(3).await;
        assert_eq!(catalog.items().len(), 4);
    }

    #[tokio::test]
    async fn search_matching_a_type_lists_its_members() {
        let catalog = mock_catalog(2).await;
        catalog.prefetch_index().await;
        catalog.update_search("grass").await;

        assert_eq!(names(&catalog.items()), ["bulbasaur"]);
        assert!(!catalog.is_empty_state());
    }

    #[tokio::test]
    async fn search_falls_back_to_name_substring() {
        let catalog = mock_catalog(2).await;
        catalog.prefetch_index().await;
        catalog.update_search("pika").await;

        assert_eq!(names(&catalog.items()), ["pikachu"]);
    }

    #[tokio::test]
    async fn search_pages_through_filtered_names() {
        let catalog = mock_catalog(1).await;
        catalog.prefetch_index().await;

        // No type name contains "ch", so this falls back to the name set:
        // charmander and pikachu
        catalog.update_search("ch").await;
        assert_eq!(catalog.items().len(), 1);

        catalog.will_display(0).await;
        let items = catalog.items();
        assert_eq!(items.len(), 2);
        let mut loaded = names(&items);
        loaded.sort_unstable();
        assert_eq!(loaded, ["charmander", "pikachu"]);

        // Filtered list exhausted
        catalog.will_display(1).await;
        assert_eq!(catalog.items().len(), 2);
    }

    #[tokio::test]
    async fn unmatched_search_sets_empty_state() {
        let catalog = mock_catalog(2).await;
        catalog.prefetch_index().await;
        catalog.update_search("zzz").await;

        assert!(catalog.is_empty_state());
        assert!(catalog.items().is_empty());
    }

    #[tokio::test]
    async fn flags_stay_current_without_any_subscriber() {
        // No receiver is ever created; the getters must still track every
        // transition of the loading and empty-result flags.
        let catalog = mock_catalog(2).await;
        catalog.prefetch_index().await;

        catalog.update_search("zzz").await;
        assert!(catalog.is_empty_state());

        catalog.update_search("grass").await;
        assert!(!catalog.is_empty_state());
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn query_change_discards_in_flight_catalog_page() {
        let base = spawn_mock_api(false, Duration::from_millis(200)).await;
        let client = Arc::new(PokeApiClient::with_base_url(&base));
        let catalog = Arc::new(Catalog::with_page_size(client, 2));
        catalog.prefetch_index().await;

        let loader = {
            let catalog = Arc::clone(&catalog);
            tokio::spawn(async move { catalog.load_next_page().await })
        };
        // Let the first page request reach the server, then change the query
        // while it is still in flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        catalog.update_search("grass").await;
        loader.await.unwrap();

        // The delayed page belongs to the old query and must not surface
        assert!(catalog.items().is_empty());

        // The skipped initial search load is picked up on the next display
        catalog.will_display(0).await;
        assert_eq!(names(&catalog.items()), ["bulbasaur"]);
    }

    #[tokio::test]
    async fn clearing_search_resumes_catalog_from_offset_zero() {
        let catalog = mock_catalog(2).await;
        catalog.prefetch_index().await;
        catalog.update_search("grass").await;
        assert_eq!(names(&catalog.items()), ["bulbasaur"]);

        catalog.update_search("").await;
        assert_eq!(names(&catalog.items()), ["bulbasaur", "charmander"]);
        assert!(!catalog.is_empty_state());
    }

    #[tokio::test]
    async fn refresh_clears_search_state() {
        let catalog = mock_catalog(2).await;
        catalog.prefetch_index().await;
        catalog.update_search("fire").await;
        assert_eq!(names(&catalog.items()), ["charmander"]);

        catalog.refresh().await;
        assert_eq!(names(&catalog.items()), ["bulbasaur", "charmander"]);
    }

    #[tokio::test]
    async fn index_failure_degrades_search_to_no_matches() {
        let base = spawn_mock_api(true, Duration::ZERO).await;
        let client = Arc::new(PokeApiClient::with_base_url(&base));
        let catalog = Catalog::with_page_size(client, 2);

        // Type-map fan-out fails, so the whole index stays empty
        catalog.prefetch_index().await;
        catalog.update_search("grass").await;

        assert!(catalog.is_empty_state());
        assert!(catalog.items().is_empty());

        // Catalog pagination is unaffected
        catalog.update_search("").await;
        assert_eq!(catalog.items().len(), 2);
    }

    #[tokio::test]
    async fn watch_subscribers_observe_changes() {
        let catalog = mock_catalog(2).await;
        let mut items_rx = catalog.subscribe_items();
        let mut loading_rx = catalog.subscribe_loading();

        catalog.refresh().await;

        assert!(items_rx.has_changed().unwrap());
        assert_eq!(items_rx.borrow_and_update().len(), 2);
        assert!(loading_rx.has_changed().unwrap());
        assert!(!*loading_rx.borrow_and_update());
    }
}
