//! Data types for PokeAPI responses and the resolved domain model

use serde::Deserialize;

/// A resolved species with its display-ready properties
///
/// Immutable once constructed. `types` preserves the order and duplicates of
/// the source detail resource; `artwork_url` is opaque to this layer and is
/// consumed by a separate image loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokemon {
    pub name: String,
    pub flavor_text: Option<String>,
    pub types: Vec<String>,
    pub artwork_url: Option<String>,
}

/// One page of resolved species with total count metadata
#[derive(Debug, Clone)]
pub struct PokemonPage {
    /// Total number of species in the remote catalog
    pub total_count: usize,
    pub items: Vec<Pokemon>,
}

/// A named API resource reference
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

/// A named API resource reference with its canonical URL
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResourceLink {
    pub name: String,
    pub url: String,
}

/// Response for a paginated species list
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesListResponse {
    pub count: usize,
    pub results: Vec<NamedResourceLink>,
}

/// Detail response for a single species
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonDetailResponse {
    pub name: String,
    pub types: Vec<TypeSlot>,
    pub species: NamedResourceLink,
    pub sprites: Sprites,
}

/// One slot in a detail response's ordered type list
#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub type_ref: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sprites {
    pub other: OtherSprites,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork")]
    pub official_artwork: OfficialArtwork,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfficialArtwork {
    pub front_default: Option<String>,
}

/// Response for species-level data, including localized flavor text
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonSpeciesResponse {
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

/// Response listing all types
#[derive(Debug, Clone, Deserialize)]
pub struct TypeListResponse {
    pub results: Vec<NamedResourceLink>,
}

/// Detail response for a single type, listing its member species
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDetailResponse {
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedResource,
}
