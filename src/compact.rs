//! Compaction algorithm: rewrites an expanded node back into a shorter form
//! guided by the active context.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#compaction-algorithm>.

use serde_json::{Map as JsonMap, Value};

use crate::{
    context::{definition::TypeMapping, Context},
    error::Result,
    json::{is_id_only_object, is_value_object, to_array},
};

/// Compacts `node` (already in expanded form) under `active_context`.
///
/// `active_property` is the term under which `node` is nested in its
/// parent (used to decide whether `@type`/`@language` coercion already
/// implied by the term definition can be dropped from the compacted
/// value), and `optimize` permits the single-element-array-to-scalar
/// collapse described in the crate-level documentation (Open Question
/// #1: collapse by default).
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#compaction-algorithm>.
pub fn compact(
    node: &Value,
    active_context: &Context,
    active_property: Option<&str>,
    optimize: bool,
) -> Result<Value> {
    match node {
        Value::Array(items) => compact_array(items, active_context, active_property, optimize),
        Value::Object(obj) if is_value_object(obj) || is_id_only_object(obj) => {
            Ok(compact_value(obj, active_context, active_property))
        }
        Value::Object(obj) => compact_object(obj, active_context, active_property, optimize),
        other => Ok(other.clone()),
    }
}

/// Compacts every element of an array, then applies the optional
/// single-element collapse (blocked only when the active property has a
/// `@set` container, per spec §4.C — a `@set` must always serialize as an
/// array, never a bare scalar).
fn compact_array(
    items: &[Value],
    active_context: &Context,
    active_property: Option<&str>,
    optimize: bool,
) -> Result<Value> {
    compact_array_with_collapse(items, active_context, active_property, optimize, true)
}

/// Shared implementation behind [`compact_array`], with the single-element
/// collapse gated by `allow_collapse` so callers that must never collapse
/// (e.g. the contents of a `@list`) can opt out regardless of container.
fn compact_array_with_collapse(
    items: &[Value],
    active_context: &Context,
    active_property: Option<&str>,
    optimize: bool,
    allow_collapse: bool,
) -> Result<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(compact(item, active_context, active_property, optimize)?);
    }

    let has_set_container = active_property
        .and_then(|p| active_context.term_definition(p))
        .map_or(false, |def| def.has_set_container());

    if allow_collapse && optimize && !has_set_container && out.len() == 1 {
        return Ok(out.into_iter().next().unwrap());
    }
    Ok(Value::Array(out))
}

/// Compacts a node object, list object or identifier object.
fn compact_object(
    obj: &JsonMap<String, Value>,
    active_context: &Context,
    active_property: Option<&str>,
    optimize: bool,
) -> Result<Value> {
    if obj.len() == 1 && obj.contains_key("@list") {
        let items = obj.get("@list").map(to_array).unwrap_or_default();
        // A `@list`'s own contents must never collapse to a bare scalar,
        // regardless of the outer property's container: it is always an
        // ordered sequence, list-container or not.
        let compacted =
            compact_array_with_collapse(&items, active_context, active_property, optimize, false)?;

        let has_list_container = active_property
            .and_then(|p| active_context.term_definition(p))
            .map_or(false, |def| def.has_list_container());

        // Without a `@list`-mapped active property the list wrapper must be
        // kept: a bare array at this position would be indistinguishable
        // from a `@set`. See Open Question #4.
        if has_list_container {
            return Ok(compacted);
        }
        let mut m = JsonMap::new();
        m.insert("@list".into(), compacted);
        return Ok(Value::Object(m));
    }

    let mut out = JsonMap::new();
    for (key, value) in obj {
        match key.as_str() {
            "@id" => {
                let compacted_id = value
                    .as_str()
                    .map(|s| Value::String(compact_iri(s, active_context, false)))
                    .unwrap_or_else(|| value.clone());
                out.insert("@id".into(), compacted_id);
            }
            "@type" => {
                let types: Vec<Value> = to_array(value)
                    .iter()
                    .map(|t| match t.as_str() {
                        Some(s) => Value::String(compact_iri(s, active_context, true)),
                        None => t.clone(),
                    })
                    .collect();
                let compacted_types = if optimize && types.len() == 1 {
                    types.into_iter().next().unwrap()
                } else {
                    Value::Array(types)
                };
                out.insert("@type".into(), compacted_types);
            }
            _ => {
                let compact_key = compact_iri(key, active_context, true);
                let compacted_value =
                    compact(value, active_context, Some(compact_key.as_str()), optimize)?;
                out.insert(compact_key, compacted_value);
            }
        }
    }

    Ok(Value::Object(out))
}

/// Finds the shortest term or compact IRI mapping to `iri` in
/// `active_context`, falling back to the IRI itself when no term fits.
///
/// `is_type` loosely distinguishes `@type`-position compaction (were
/// it to ever need different tie-breaking than property-position
/// compaction); both currently share the same shortest-match search.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#iri-compaction>.
pub(crate) fn compact_iri(iri: &str, ctx: &Context, is_type: bool) -> String {
    let _ = is_type;

    let mut exact: Vec<&str> = ctx
        .term_definitions()
        .filter_map(|(term, def)| if def.id() == iri { Some(term) } else { None })
        .collect();
    if !exact.is_empty() {
        exact.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        return exact[0].to_owned();
    }

    let mut candidates: Vec<String> = ctx
        .term_definitions()
        .filter_map(|(term, def)| {
            let prefix = def.id();
            if !prefix.is_empty() && iri.starts_with(prefix) && iri.len() > prefix.len() {
                Some(format!("{}:{}", term, &iri[prefix.len()..]))
            } else {
                None
            }
        })
        .collect();

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    candidates.into_iter().next().unwrap_or_else(|| iri.to_owned())
}

/// Compacts a value object.
///
/// When the active property's term definition already implies the
/// value's `@type` or `@language`, the redundant key is dropped and, if
/// nothing else remains, the value collapses to the bare `@value`
/// scalar.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#value-compaction>.
pub(crate) fn compact_value(
    obj: &JsonMap<String, Value>,
    ctx: &Context,
    active_property: Option<&str>,
) -> Value {
    let def = active_property.and_then(|p| ctx.term_definition(p));

    if let (Some(Value::String(id)), true) = (
        obj.get("@id"),
        obj.len() == 1 && def.map_or(false, |d| d.ty() == Some(&TypeMapping::Id)),
    ) {
        return Value::String(compact_iri(id, ctx, false));
    }
    if obj.len() == 1 && obj.contains_key("@id") {
        let mut m = JsonMap::new();
        if let Some(Value::String(id)) = obj.get("@id") {
            m.insert("@id".into(), Value::String(compact_iri(id, ctx, false)));
        }
        return Value::Object(m);
    }

    let value = match obj.get("@value") {
        Some(v) => v.clone(),
        None => return Value::Object(obj.clone()),
    };

    let implied_type = def.and_then(|d| match d.ty() {
        Some(TypeMapping::Datatype(ty)) => Some(ty.as_str()),
        _ => None,
    });
    let implied_language = def.and_then(|d| d.language()).or_else(|| ctx.default_language());

    let type_matches = match (obj.get("@type").and_then(Value::as_str), implied_type) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    };
    let language_matches = match (obj.get("@language").and_then(Value::as_str), implied_language) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    };

    let only_recognized_keys = obj
        .keys()
        .all(|k| matches!(k.as_str(), "@value" | "@type" | "@language"));

    if only_recognized_keys && type_matches && language_matches {
        return value;
    }

    let mut out = JsonMap::new();
    out.insert("@value".into(), value);
    if let Some(ty) = obj.get("@type").and_then(Value::as_str) {
        out.insert("@type".into(), Value::String(compact_iri(ty, ctx, true)));
    }
    if let Some(lang) = obj.get("@language") {
        out.insert("@language".into(), lang.clone());
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use serde_json::json;

    fn ctx(local: Value) -> Context {
        Context::new().process(&local).unwrap()
    }

    #[test]
    fn s5_shortest_iri_is_selected() {
        let ctx = ctx(json!({
            "name": "http://schema.org/name",
            "n": "http://schema.org/name",
        }));
        let out = compact(
            &json!({"http://schema.org/name": [{"@value": "A"}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"n": "A"}));
    }

    #[test]
    fn s7_round_trip_with_type_coercion() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "xsd": "http://w/",
            "age": {"@id": "ex:age", "@type": "xsd:int"},
        }));
        let expanded =
            crate::expand::expand(&json!({"age": 30}), &ctx, None, None).unwrap();
        let compacted = compact(&expanded, &ctx, None, true).unwrap();
        assert_eq!(compacted, json!({"age": 30}));
    }

    #[test]
    fn value_object_with_mismatched_type_is_kept_explicit() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "xsd": "http://w/",
            "age": {"@id": "ex:age", "@type": "xsd:int"},
        }));
        let out = compact(
            &json!({"http://e/age": [{"@value": 30, "@type": "http://w/string"}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"age": {"@value": 30, "@type": "xsd:string"}})
        );
    }

    #[test]
    fn list_without_container_mapping_keeps_the_wrapper() {
        let ctx = ctx(json!({"tags": "http://e/tags"}));
        let out = compact(
            &json!({"http://e/tags": [{"@list": [{"@value": "x"}]}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"tags": {"@list": ["x"]}}));
    }

    #[test]
    fn list_with_container_mapping_drops_the_wrapper() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "tags": {"@id": "ex:tags", "@container": "@list"},
        }));
        let out = compact(
            &json!({"http://e/tags": [{"@list": [{"@value": "x"}, {"@value": "y"}]}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"tags": ["x", "y"]}));
    }

    #[test]
    fn identifier_object_compacts_its_id() {
        let ctx = ctx(json!({"ex": "http://e/"}));
        let out = compact(
            &json!({"http://e/knows": [{"@id": "http://e/bob"}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"ex:knows": {"@id": "ex:bob"}}));
    }

    #[test]
    fn id_coerced_property_compacts_to_a_bare_string() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "knows": {"@id": "ex:knows", "@type": "@id"},
        }));
        let out = compact(
            &json!({"http://e/knows": [{"@id": "http://p/bob"}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"knows": "http://p/bob"}));
    }

    #[test]
    fn single_item_list_container_still_compacts_to_an_array() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "tags": {"@id": "ex:tags", "@container": "@list"},
        }));
        let out = compact(
            &json!({"http://e/tags": [{"@list": [{"@value": "x"}]}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"tags": ["x"]}));
    }

    #[test]
    fn set_container_blocks_single_element_collapse() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "tags": {"@id": "ex:tags", "@container": "@set"},
        }));
        let out = compact(
            &json!({"http://e/tags": [{"@value": "x"}]}),
            &ctx,
            None,
            true,
        )
        .unwrap();
        assert_eq!(out, json!({"tags": ["x"]}));
    }
}
