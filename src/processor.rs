//! JSON-LD processor: the external interface tying the context processor,
//! the expansion engine and the compaction engine together.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#the-jsonldprocessor-interface>.

use crate::{
    compact::compact,
    context::Context,
    error::Result,
    expand::expand,
};

/// JSON-LD processor options.
///
/// See <https://www.w3.org/TR/2014/REC-json-ld-api-20140116/#the-jsonldoptions-type>.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Base IRI, used by `expandIri` when relative resolution is permitted.
    ///
    /// Relative-IRI resolution against this base is plain string
    /// concatenation rather than full IRI-reference resolution: a known
    /// gap inherited from the algorithm this crate implements (see the
    /// design notes on Open Question #3).
    base: Option<String>,
}

impl ProcessorOptions {
    /// Creates options with no base IRI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options with the given base IRI.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    /// Returns the base IRI, if any.
    pub(crate) fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Checks whether a string has the form of a JSON-LD keyword (an `@`
    /// followed by one or more ASCII letters).
    ///
    /// See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#syntax-tokens-and-keywords>.
    pub(crate) fn is_keyword(&self, s: &str) -> bool {
        crate::syntax::has_form_of_keyword(s)
    }
}

/// JSON-LD processor.
///
/// Ties together the three algorithms this crate implements: context
/// processing, expansion and compaction. Textual parsing, remote context
/// fetching, framing and canonical hashing are out of scope and are left
/// to external collaborators.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#the-jsonldprocessor-interface>.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processor {
    /// Processor options.
    options: ProcessorOptions,
}

impl Processor {
    /// Creates a new processor with no base IRI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new processor with the given options.
    pub fn with_options(options: ProcessorOptions) -> Self {
        Self { options }
    }

    /// Returns the processor options.
    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Folds a local context into `active_context`.
    ///
    /// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#context-processing-algorithm>.
    pub fn process_context(
        &self,
        local_context: &serde_json::Value,
        active_context: &Context,
    ) -> Result<Context> {
        active_context.process(local_context)
    }

    /// Expands `node` under `active_context`.
    ///
    /// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#expansion-algorithm>.
    pub fn expand(
        &self,
        node: &serde_json::Value,
        active_context: &Context,
    ) -> Result<serde_json::Value> {
        expand(node, active_context, None, self.options.base())
    }

    /// Compacts `node` (already in expanded form) under `active_context`.
    ///
    /// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#compaction-algorithm>.
    pub fn compact(
        &self,
        node: &serde_json::Value,
        active_context: &Context,
        optimize: bool,
    ) -> Result<serde_json::Value> {
        compact(node, active_context, None, optimize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn processor_round_trips_through_context() {
        let processor = Processor::new();
        let ctx = processor
            .process_context(&json!({"name": "http://schema.org/name"}), &Context::new())
            .unwrap();
        let expanded = processor.expand(&json!({"name": "A"}), &ctx).unwrap();
        assert_eq!(
            expanded,
            json!({"http://schema.org/name": [{"@value": "A"}]})
        );
    }

    #[test]
    fn is_keyword_recognizes_at_forms() {
        let options = ProcessorOptions::new();
        assert!(options.is_keyword("@id"));
        assert!(!options.is_keyword("id"));
    }
}
