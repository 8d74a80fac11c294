use serde_json::Value;
use std::collections::HashMap;

/// Identifier to display slug, e.g. work-type id to its URL slug.
pub type SlugLookup = HashMap<i64, String>;

/// Extract the numeric entries of a normalized list.
///
/// Strings holding an integer count as numeric since historical rows stored
/// ids both ways. Other entries are dropped.
pub fn numeric_ids(list: &[Value]) -> Vec<i64> {
    list.iter()
        .filter_map(|entry| match entry {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
        .collect()
}

/// Map ids to slugs, silently dropping ids without a match.
pub fn resolve_slugs(ids: &[i64], lookup: &SlugLookup) -> Vec<String> {
    ids.iter().filter_map(|id| lookup.get(id).cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup() -> SlugLookup {
        HashMap::from([(1, "a".to_string()), (2, "b".to_string())])
    }

    #[test]
    fn unresolvable_ids_are_dropped() {
        assert_eq!(resolve_slugs(&[1, 2, 99], &lookup()), vec!["a", "b"]);
    }

    #[test]
    fn keeps_input_order() {
        assert_eq!(resolve_slugs(&[2, 1, 2], &lookup()), vec!["b", "a", "b"]);
        assert!(resolve_slugs(&[], &lookup()).is_empty());
    }

    #[test]
    fn numeric_ids_accepts_numbers_and_integer_strings() {
        let list = vec![json!(1), json!("2"), json!(" 3 "), json!(4.0), json!("x"), json!(null), json!(1.5)];
        assert_eq!(numeric_ids(&list), vec![1, 2, 3, 4]);
    }
}
