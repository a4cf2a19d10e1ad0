//! JSON-LD context processing.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#context-processing-algorithm>.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
    context::definition::{Container, TypeMapping},
    error::{ErrorKind, Result},
    iri::to_prefix_and_suffix,
};

pub(crate) use self::definition::Definition;

pub(crate) mod definition;

/// Active context: a mapping from term to term definition, used by the
/// expansion and compaction engines.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#the-context>.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Context {
    /// Term definitions.
    term_definitions: HashMap<String, Definition>,
    /// Default language (optional).
    default_language: Option<String>,
}

impl Context {
    /// Creates a new, empty `Context`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns a term definition, if the term is defined.
    pub(crate) fn term_definition(&self, term: &str) -> Option<&Definition> {
        self.term_definitions.get(term)
    }

    /// Returns the default language, if set.
    pub(crate) fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    /// Returns an iterator over all term definitions, for use by
    /// `compactIri`'s shortest-match search.
    pub(crate) fn term_definitions(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.term_definitions
            .iter()
            .map(|(term, def)| (term.as_str(), def))
    }

    /// Runs the context processing algorithm, folding `local_context` into
    /// this active context and returning the updated copy.
    ///
    /// `local_context` is the value associated with an `@context` key; it
    /// must be `Null` (reset), an object (term definitions), or an array of
    /// such, evaluated left to right.
    ///
    /// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#context-processing-algorithm>.
    pub fn process(&self, local_context: &Value) -> Result<Self> {
        match local_context {
            Value::Null => Ok(Self::new()),
            Value::Array(entries) => {
                let mut acc = self.clone();
                for entry in entries {
                    acc = acc.process(entry)?;
                }
                Ok(acc)
            }
            Value::Object(map) => {
                let mut acc = self.clone();
                for (key, value) in map {
                    if is_reserved_context_key(key) {
                        continue;
                    }
                    apply_entry(&mut acc, self, map, key, value)?;
                }
                Ok(acc)
            }
            Value::String(_) => {
                Err(ErrorKind::Process.with_message("remote contexts are not supported"))
            }
            other => Err(ErrorKind::Process.with_node("invalid local context", other)),
        }
    }
}

/// Checks whether a context-definition key is reserved (and therefore
/// ignored by the context processor rather than defining a term).
fn is_reserved_context_key(key: &str) -> bool {
    key.starts_with('@')
}

/// Applies a single `(key, value)` entry of a local context object to the
/// accumulating active context `acc`.
///
/// `local` is the full local-context object the entry came from (needed so
/// prefix expansion can see sibling term definitions that are still being
/// folded in), and `base` is the active context as it stood *before* this
/// local context started folding in (used as the fallback for prefix
/// expansion when the local context itself doesn't define the prefix).
fn apply_entry(
    acc: &mut Context,
    base: &Context,
    local: &serde_json::Map<String, Value>,
    term: &str,
    value: &Value,
) -> Result<()> {
    match value {
        Value::Null => {
            acc.term_definitions.remove(term);
            Ok(())
        }
        Value::String(s) => {
            let mut path = Vec::new();
            let resolved = expand_prefix(s, local, base, &mut path)?;
            acc.term_definitions
                .insert(term.to_owned(), Definition::from_id(resolved));
            Ok(())
        }
        Value::Object(def) => {
            let mut definition = match def.get("@id") {
                Some(Value::String(id)) => {
                    let mut path = Vec::new();
                    Definition::from_id(expand_prefix(id, local, base, &mut path)?)
                }
                Some(other) => {
                    return Err(ErrorKind::Syntax.with_node("invalid @id in term definition", other));
                }
                None => Definition::from_id(term),
            };

            match def.get("@type") {
                Some(Value::String(ty)) if ty == "@id" => definition.set_ty(TypeMapping::Id),
                Some(Value::String(ty)) => {
                    let mut path = Vec::new();
                    definition.set_ty(TypeMapping::Datatype(expand_prefix(
                        ty, local, base, &mut path,
                    )?));
                }
                Some(other) => {
                    return Err(ErrorKind::Syntax.with_node("invalid @type in term definition", other));
                }
                None => {
                    if let Some(lang) = def.get("@language") {
                        match lang {
                            Value::String(lang) => definition.set_language(lang.clone()),
                            Value::Null => {}
                            other => {
                                return Err(ErrorKind::Syntax
                                    .with_node("invalid @language in term definition", other));
                            }
                        }
                    }
                }
            }

            if let Some(container) = def.get("@container") {
                match container {
                    Value::String(s) if s == "@list" => definition.set_container(Container::List),
                    Value::String(s) if s == "@set" => definition.set_container(Container::Set),
                    other => {
                        return Err(
                            ErrorKind::Syntax.with_node("invalid @container mapping", other)
                        );
                    }
                }
            }

            acc.term_definitions.insert(term.to_owned(), definition);
            Ok(())
        }
        other => Err(ErrorKind::Syntax.with_node("invalid term definition", other)),
    }
}

/// Runs the prefix expansion algorithm on `s`, resolving it against the
/// pending `local` context and the `active` context, detecting cycles via
/// `path`.
///
/// See §4.A of the crate-level documentation: splits `s` at its first `:`
/// and recursively resolves the prefix, unless `s` contains no `:` at all
/// (in which case it is returned unchanged).
fn expand_prefix(
    s: &str,
    local: &serde_json::Map<String, Value>,
    active: &Context,
    path: &mut Vec<String>,
) -> Result<String> {
    let (prefix, suffix) = match to_prefix_and_suffix(s) {
        Some(parts) => parts,
        None => return Ok(s.to_owned()),
    };

    if path.iter().any(|p| p == prefix) {
        path.push(prefix.to_owned());
        return Err(ErrorKind::Process.with_message(format!(
            "cyclic IRI mapping detected: {}",
            path.join(" -> ")
        )));
    }
    path.push(prefix.to_owned());

    if let Some(Value::String(prefix_def)) = local.get(prefix) {
        let resolved = expand_prefix(prefix_def, local, active, path)?;
        return Ok(format!("{}{}", resolved, suffix));
    }
    if let Some(def) = active.term_definition(prefix) {
        return Ok(format!("{}{}", def.id(), suffix));
    }
    Ok(s.to_owned())
}
