//! Logical API endpoints and URL construction

/// Default base URL for the PokeAPI
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Limit used when requesting the complete species list in one page
pub const LIST_ALL_LIMIT: u32 = 100_000;

const SPECIES_PATH: &str = "pokemon-species";
const POKEMON_PATH: &str = "pokemon";
const TYPE_PATH: &str = "type";

/// A logical request against the PokeAPI
///
/// Species and type detail resources are addressed by the absolute URLs
/// embedded in earlier responses, so those variants carry the URL verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Paginated species list
    SpeciesList { limit: u32, offset: u32 },
    /// Full species list in a single oversized page
    SpeciesListAll,
    /// Detail resource for a single named species
    PokemonDetail { name: String },
    /// Species resource referenced by a detail response
    SpeciesDetail { url: String },
    /// List of all types
    TypeList,
    /// Type detail resource referenced by the type list
    TypeDetail { url: String },
}

impl Endpoint {
    /// Build the concrete request URL for this endpoint
    pub fn url(&self, base: &str) -> String {
        match self {
            Self::SpeciesList { limit, offset } => {
                format!("{}/{}?limit={}&offset={}", base, SPECIES_PATH, limit, offset)
            }
            Self::SpeciesListAll => {
                format!("{}/{}?limit={}", base, SPECIES_PATH, LIST_ALL_LIMIT)
            }
            Self::PokemonDetail { name } => {
                format!("{}/{}/{}", base, POKEMON_PATH, urlencoding::encode(name))
            }
            Self::SpeciesDetail { url } => url.clone(),
            Self::TypeList => format!("{}/{}", base, TYPE_PATH),
            Self::TypeDetail { url } => url.clone(),
        }
    }
}
