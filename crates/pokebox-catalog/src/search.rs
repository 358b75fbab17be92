//! Query-to-name-list filtering over the prefetched search index

use std::collections::{HashMap, HashSet};

/// Compute the pagination source for a non-empty search query
///
/// The query is matched case-insensitively as a substring against type
/// names first; members of all matched types (that still exist in the name
/// set) form the candidate list. When no type matches contribute anything,
/// the query falls back to a substring match over the species names
/// themselves. The returned order is unspecified.
///
/// `query` must already be lowercased by the caller.
pub(crate) fn filter_names(
    query: &str,
    name_set: &HashSet<String>,
    type_map: &HashMap<String, HashSet<String>>,
) -> Vec<String> {
    let candidates: HashSet<&String> = type_map
        .iter()
        .filter(|(type_name, _)| type_name.to_lowercase().contains(query))
        .flat_map(|(_, members)| members.iter())
        // The type index may reference forms absent from the species list
        .filter(|name| name_set.contains(*name))
        .collect();

    if candidates.is_empty() {
        name_set
            .iter()
            .filter(|name| name.to_lowercase().contains(query))
            .cloned()
            .collect()
    } else {
        candidates.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> (HashSet<String>, HashMap<String, HashSet<String>>) {
        let name_set: HashSet<String> = ["bulbasaur", "charmander", "charizard"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut type_map = HashMap::new();
        type_map.insert(
            "grass".to_string(),
            HashSet::from(["bulbasaur".to_string()]),
        );
        type_map.insert(
            "fire".to_string(),
            HashSet::from(["charmander".to_string(), "charizard".to_string()]),
        );
        (name_set, type_map)
    }

    #[test]
    fn type_name_match_yields_member_names() {
        let (names, types) = index();
        let result = filter_names("grass", &names, &types);
        assert_eq!(result, vec!["bulbasaur".to_string()]);
    }

    #[test]
    fn type_substring_match_unions_members() {
        let (names, types) = index();
        let mut result = filter_names("ir", &names, &types); // matches "fire"
        result.sort();
        assert_eq!(result, vec!["charizard".to_string(), "charmander".to_string()]);
    }

    #[test]
    fn falls_back_to_name_substring_when_no_type_matches() {
        let (names, types) = index();
        let mut result = filter_names("char", &names, &types);
        result.sort();
        assert_eq!(result, vec!["charizard".to_string(), "charmander".to_string()]);
    }

    #[test]
    fn stale_type_members_are_dropped() {
        let (names, mut types) = index();
        types
            .get_mut("grass")
            .unwrap()
            .insert("bulbasaur-ancient".to_string());
        let result = filter_names("grass", &names, &types);
        assert_eq!(result, vec!["bulbasaur".to_string()]);
    }

    #[test]
    fn unmatched_query_yields_nothing() {
        let (names, types) = index();
        assert!(filter_names("zzz", &names, &types).is_empty());
    }
}
