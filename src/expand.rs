//! Expansion algorithm: rewrites any node into canonical expanded form
//! using the active context.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#expansion-algorithm>.

use serde_json::{Map as JsonMap, Value};

use crate::{
    context::{definition::TypeMapping, Context},
    error::{ErrorKind, Result},
    iri::to_prefix_and_suffix,
    json::{is_list_object, to_array},
};

/// Reserved keys handled explicitly by the expansion algorithm's object
/// dispatch (§4.B point 3). `@context` is consumed separately before this
/// set is consulted.
const RESERVED: &[&str] = &["@id", "@type", "@value", "@language", "@list", "@set"];

/// Expands `node` under `active_context`.
///
/// `active_property` is the term (or IRI) under which `node` was
/// encountered, used to select container/type/language coercion; `base` is
/// the base IRI used when relative IRI resolution is permitted.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#expansion-algorithm>.
pub fn expand(
    node: &Value,
    active_context: &Context,
    active_property: Option<&str>,
    base: Option<&str>,
) -> Result<Value> {
    match node {
        Value::Array(arr) => expand_array(arr, active_context, active_property, base),
        Value::Object(obj) => expand_object(obj, active_context, active_property, base),
        Value::Null => Ok(Value::Null),
        scalar => expand_value(scalar, active_property, active_context, base),
    }
}

/// Expands every element of an array, flattening nested arrays into the
/// result unless the active property has a `@list` container (in which
/// case a nested array is kept as a single element), and dropping `Null`
/// elements.
fn expand_array(
    arr: &[Value],
    active_context: &Context,
    active_property: Option<&str>,
    base: Option<&str>,
) -> Result<Value> {
    let has_list_container = active_property
        .and_then(|p| active_context.term_definition(p))
        .map_or(false, |def| def.has_list_container());

    let mut result = Vec::new();
    for el in arr {
        let expanded = expand(el, active_context, active_property, base)?;
        match expanded {
            Value::Null => {}
            Value::Array(inner) if !has_list_container => result.extend(inner),
            other => result.push(other),
        }
    }
    Ok(Value::Array(result))
}

/// Expands a document object: folds in any embedded `@context`, expands
/// each remaining entry, and runs the node/value/list/set post-pass.
fn expand_object(
    obj: &JsonMap<String, Value>,
    active_context: &Context,
    active_property: Option<&str>,
    base: Option<&str>,
) -> Result<Value> {
    let folded;
    let ctx: &Context = match obj.get("@context") {
        Some(local) => {
            folded = active_context.process(local)?;
            &folded
        }
        None => active_context,
    };

    let mut out = JsonMap::new();
    for (k, v) in obj {
        if k == "@context" {
            continue;
        }

        let expanded_key = expand_iri(k, ctx, false, base);

        if v.is_null() && expanded_key != "@value" {
            continue;
        }
        if !RESERVED.contains(&expanded_key.as_str()) && !expanded_key.contains(':') {
            continue;
        }

        match expanded_key.as_str() {
            "@id" => {
                let s = v
                    .as_str()
                    .ok_or_else(|| ErrorKind::Syntax.with_node("@id value must be a string", v))?;
                if out.contains_key("@id") {
                    return Err(ErrorKind::Syntax.with_node("duplicate @id", v));
                }
                out.insert("@id".into(), Value::String(expand_iri(s, ctx, true, base)));
            }
            "@type" => {
                if out.contains_key("@type") {
                    return Err(ErrorKind::Syntax.with_node("duplicate @type", v));
                }
                let types: Vec<Value> = to_array(v)
                    .iter()
                    .map(|t| {
                        t.as_str()
                            .ok_or_else(|| {
                                ErrorKind::Syntax.with_node("@type values must be strings", t)
                            })
                            .map(|s| Value::String(expand_iri(s, ctx, true, base)))
                    })
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .filter(|t| t.as_str() != Some(""))
                    .collect();
                out.insert("@type".into(), Value::Array(types));
            }
            "@value" | "@language" => {
                if matches!(v, Value::Object(_) | Value::Array(_)) {
                    return Err(ErrorKind::Syntax
                        .with_node(format!("{} must be a scalar", expanded_key), v));
                }
                if out.contains_key(expanded_key.as_str()) {
                    return Err(
                        ErrorKind::Syntax.with_node(format!("duplicate {}", expanded_key), v)
                    );
                }
                out.insert(expanded_key, v.clone());
            }
            "@list" | "@set" => {
                if out.contains_key(expanded_key.as_str()) {
                    return Err(
                        ErrorKind::Syntax.with_node(format!("duplicate {}", expanded_key), v)
                    );
                }
                let mut items = Vec::new();
                for item in to_array(v) {
                    let expanded_item = expand(&item, ctx, active_property, base)?;
                    if is_list_object(&expanded_item) {
                        return Err(ErrorKind::Syntax
                            .with_node("a list must not directly contain another list", &item));
                    }
                    if expanded_item != Value::Null {
                        items.push(expanded_item);
                    }
                }
                out.insert(expanded_key, Value::Array(items));
            }
            _ => {
                let expanded_value = match v {
                    Value::Object(_) | Value::Array(_) => {
                        expand(v, ctx, Some(k.as_str()), base)?
                    }
                    scalar => expand_value(scalar, Some(k.as_str()), ctx, base)?,
                };
                if expanded_value == Value::Null {
                    continue;
                }

                let has_list_container = ctx
                    .term_definition(k)
                    .map_or(false, |def| def.has_list_container());

                let to_merge = if has_list_container && !is_list_object(&expanded_value) {
                    let items = to_array(&expanded_value);
                    for item in &items {
                        if is_list_object(item) {
                            return Err(ErrorKind::Syntax.with_node(
                                "a list must not directly contain another list",
                                item,
                            ));
                        }
                    }
                    let mut list_obj = JsonMap::new();
                    list_obj.insert("@list".into(), Value::Array(items));
                    Value::Array(vec![Value::Object(list_obj)])
                } else {
                    expanded_value
                };

                merge_into_property(&mut out, &expanded_key, to_merge);
            }
        }
    }

    post_process(out)
}

/// Merges `value` into the array-valued entry at `key`, appending rather
/// than overwriting (every property value in an expanded node object is an
/// ordered sequence).
fn merge_into_property(out: &mut JsonMap<String, Value>, key: &str, value: Value) {
    let entry = out
        .entry(key.to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));
    let arr = entry.as_array_mut().expect("property entries are arrays");
    match value {
        Value::Array(items) => arr.extend(items),
        other => arr.push(other),
    }
}

/// Runs the post-pass that decides, and enforces, the final shape of an
/// expanded object: value object, list-or-set object, or plain node
/// object.
fn post_process(mut out: JsonMap<String, Value>) -> Result<Value> {
    if let Some(value) = out.get("@value").cloned() {
        if let Some(Value::Array(types)) = out.get("@type").cloned() {
            if types.len() != 1 {
                return Err(ErrorKind::Syntax
                    .with_node("@type in a value object must be a single string", &Value::Array(types)));
            }
            out.insert("@type".into(), types.into_iter().next().unwrap());
        }

        let extra = out
            .keys()
            .any(|k| !matches!(k.as_str(), "@value" | "@type" | "@language"));
        if extra {
            return Err(ErrorKind::Syntax
                .with_node("value object has disallowed extra keys", &Value::Object(out)));
        }
        if out.contains_key("@type") && out.contains_key("@language") {
            return Err(ErrorKind::Syntax.with_node(
                "value object cannot have both @type and @language",
                &Value::Object(out),
            ));
        }

        if out.len() == 1 {
            return Ok(value);
        }
        if value == Value::Null {
            return Ok(Value::Null);
        }
        return Ok(Value::Object(out));
    }

    if out.len() == 1 && out.contains_key("@language") {
        return Ok(Value::Null);
    }
    if out.contains_key("@language") {
        out.remove("@language");
    }

    if out.contains_key("@list") || out.contains_key("@set") {
        let extra = out
            .keys()
            .any(|k| !matches!(k.as_str(), "@list" | "@set"));
        if extra {
            return Err(ErrorKind::Syntax.with_node(
                "@list/@set object has disallowed extra keys",
                &Value::Object(out),
            ));
        }
        if let Some(set) = out.remove("@set") {
            return Ok(set);
        }
        return Ok(Value::Object(out));
    }

    Ok(Value::Object(out))
}

/// Expands a scalar (or `Null`) value under `active_property`.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#value-expansion>.
pub(crate) fn expand_value(
    v: &Value,
    active_property: Option<&str>,
    ctx: &Context,
    base: Option<&str>,
) -> Result<Value> {
    if matches!(v, Value::Object(_) | Value::Array(_)) {
        return Err(ErrorKind::Syntax.with_node("expected a scalar value", v));
    }

    let def = active_property.and_then(|p| ctx.term_definition(p));

    if let Some(def) = def {
        match def.ty() {
            Some(TypeMapping::Id) => {
                let s = v
                    .as_str()
                    .ok_or_else(|| ErrorKind::Syntax.with_node("@id-coerced value must be a string", v))?;
                let mut m = JsonMap::new();
                m.insert("@id".into(), Value::String(expand_iri(s, ctx, true, base)));
                return Ok(Value::Object(m));
            }
            Some(TypeMapping::Datatype(ty)) => {
                let mut m = JsonMap::new();
                m.insert("@value".into(), v.clone());
                m.insert("@type".into(), Value::String(ty.clone()));
                return Ok(Value::Object(m));
            }
            None => {}
        }
    }

    let language = def
        .and_then(|d| d.language())
        .or_else(|| ctx.default_language());

    let mut m = JsonMap::new();
    m.insert("@value".into(), v.clone());
    if let (Value::String(_), Some(lang)) = (v, language) {
        m.insert("@language".into(), Value::String(lang.to_owned()));
    }
    Ok(Value::Object(m))
}

/// Expands `s` to an absolute IRI (or blank-node label, or verbatim string
/// if it cannot be resolved) under `ctx`.
///
/// `allow_relative` controls whether a string with no colon at all is
/// resolved against `base` (string concatenation; see Open Question #3).
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#iri-expansion>.
pub(crate) fn expand_iri(s: &str, ctx: &Context, allow_relative: bool, base: Option<&str>) -> String {
    if let Some(def) = ctx.term_definition(s) {
        return def.id().to_owned();
    }

    if let Some((prefix, suffix)) = to_prefix_and_suffix(s) {
        if suffix.starts_with("//") {
            return s.to_owned();
        }
        if prefix == "_" {
            return s.to_owned();
        }
        if let Some(def) = ctx.term_definition(prefix) {
            return format!("{}{}", def.id(), suffix);
        }
    }

    if allow_relative {
        return format!("{}{}", base.unwrap_or(""), s);
    }

    s.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(local: Value) -> Context {
        Context::new().process(&local).unwrap()
    }

    #[test]
    fn s1_iri_expansion_via_term() {
        let ctx = ctx(json!({"name": "http://schema.org/name"}));
        let out = expand(&json!({"name": "A"}), &ctx, None, None).unwrap();
        assert_eq!(
            out,
            json!({"http://schema.org/name": [{"@value": "A"}]})
        );
    }

    #[test]
    fn s2_typed_literal() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "xsd": "http://w/",
            "age": {"@id": "ex:age", "@type": "xsd:int"},
        }));
        let out = expand(&json!({"age": 30}), &ctx, None, None).unwrap();
        assert_eq!(
            out,
            json!({"http://e/age": [{"@value": 30, "@type": "http://w/int"}]})
        );
    }

    #[test]
    fn s3_identifier_coercion() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "knows": {"@id": "ex:knows", "@type": "@id"},
        }));
        let out = expand(&json!({"knows": "http://p/bob"}), &ctx, None, None).unwrap();
        assert_eq!(
            out,
            json!({"http://e/knows": [{"@id": "http://p/bob"}]})
        );
    }

    #[test]
    fn s4_list_container() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "tags": {"@id": "ex:tags", "@container": "@list"},
        }));
        let out = expand(&json!({"tags": ["x", "y"]}), &ctx, None, None).unwrap();
        assert_eq!(
            out,
            json!({"http://e/tags": [{"@list": [{"@value": "x"}, {"@value": "y"}]}]})
        );
    }

    #[test]
    fn unmapped_term_is_dropped() {
        let ctx = Context::new();
        let out = expand(&json!({"unmapped": "x"}), &ctx, None, None).unwrap();
        assert_eq!(out, json!({}));
    }

    #[test]
    fn null_elements_are_dropped_from_arrays() {
        let ctx = ctx(json!({"name": "http://schema.org/name"}));
        let out = expand(&json!({"name": ["A", null]}), &ctx, None, None).unwrap();
        assert_eq!(
            out,
            json!({"http://schema.org/name": [{"@value": "A"}]})
        );
    }

    #[test]
    fn list_of_lists_is_rejected() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "tags": {"@id": "ex:tags", "@container": "@list"},
        }));
        let err = expand(
            &json!({"tags": [{"@list": ["x"]}]}),
            &ctx,
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn duplicate_id_is_a_syntax_error() {
        // Two distinct JSON keys that IRI-expand to the same `@id` key are
        // a practical impossibility under serde_json's map; instead check
        // the explicit reserved-key path directly rejects non-string @id.
        let ctx = Context::new();
        let err = expand(&json!({"@id": 1}), &ctx, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn embedded_context_scopes_to_the_object() {
        let ctx = Context::new();
        let out = expand(
            &json!({"@context": {"name": "http://schema.org/name"}, "name": "A"}),
            &ctx,
            None,
            None,
        )
        .unwrap();
        assert_eq!(out, json!({"http://schema.org/name": [{"@value": "A"}]}));
    }

    #[test]
    fn lone_language_collapses_to_null() {
        let ctx = Context::new();
        let out = expand(&json!({"@language": "en"}), &ctx, None, None).unwrap();
        assert_eq!(out, Value::Null);
    }

    #[test]
    fn set_only_object_unwraps_to_its_array() {
        let ctx = ctx(json!({"name": "http://schema.org/name"}));
        let out = expand(
            &json!({"name": {"@set": ["A", "B"]}}),
            &ctx,
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"http://schema.org/name": [{"@value": "A"}, {"@value": "B"}]})
        );
    }

    #[test]
    fn default_language_applies_to_plain_strings() {
        let mut ctx = Context::new();
        ctx = ctx.process(&json!({"@nonexistent": "ignored"})).unwrap();
        // Default language is only settable via the context processor's
        // internal API; exercise it through `expand_value` directly using
        // a context built with a language-bearing term instead.
        let ctx = ctx
            .process(&json!({"name": {"@id": "http://schema.org/name", "@language": "en"}}))
            .unwrap();
        let out = expand_value(&Value::String("A".into()), Some("name"), &ctx, None).unwrap();
        assert_eq!(out, json!({"@value": "A", "@language": "en"}));
    }

    #[test]
    fn id_sentinel_coercion_resolves_relative_values_against_base() {
        let ctx = ctx(json!({
            "ex": "http://e/",
            "knows": {"@id": "ex:knows", "@type": "@id"},
        }));
        let out = expand(
            &json!({"knows": "bob"}),
            &ctx,
            None,
            Some("http://example.org/"),
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"http://e/knows": [{"@id": "http://example.org/bob"}]})
        );
    }
}
