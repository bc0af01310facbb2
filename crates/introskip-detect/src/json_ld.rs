//! Series/movie names from `application/ld+json` blocks.

use serde_json::Value;

/// Name of the show or film described by the structured data, if any.
///
/// Checks `TVEpisode.partOfSeries.name` first, then `TVSeries.name`, then
/// `Movie.name`. Invalid JSON blocks are skipped.
pub fn series_title(blocks: &[String]) -> Option<String> {
    let nodes: Vec<Value> = blocks
        .iter()
        .filter_map(|raw| serde_json::from_str::<Value>(raw).ok())
        .flat_map(flatten)
        .collect();

    let by_type = |ty: &'static str| nodes.iter().filter(move |n| has_type(n, ty));

    by_type("TVEpisode")
        .find_map(|n| name_of(n.get("partOfSeries")?))
        .or_else(|| by_type("TVSeries").find_map(name_of))
        .or_else(|| by_type("Movie").find_map(name_of))
}

/// Top-level nodes of a block: plain objects, arrays and `@graph` lists.
fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(flatten).collect(),
        Value::Object(mut map) => match map.remove("@graph") {
            Some(graph) => flatten(graph),
            None => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    }
}

fn has_type(node: &Value, ty: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(s)) => s == ty,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(ty)),
        _ => false,
    }
}

fn name_of(node: &Value) -> Option<String> {
    let name = node.get("name")?.as_str()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}
