//! Term definition.

/// A property's coercion target: either the identifier sentinel (`@id`) or
/// a concrete datatype IRI.
///
/// A term definition's `type` being the identifier sentinel forces string
/// values of properties bound to that term to become identifier objects
/// rather than value objects during expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeMapping {
    /// The `@id` sentinel: values are coerced to identifier objects.
    Id,
    /// A datatype IRI: values are coerced to typed value objects.
    Datatype(String),
}

/// `@container` mapping: either `@list` or `@set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    /// `@list`.
    List,
    /// `@set`.
    Set,
}

/// Term definition.
///
/// Deliberately a dense struct with optional fields rather than a generic
/// map, so invariants (`type` and `language` mutually exclusive in
/// practice, since the context processor only reads `@language` when
/// `@type` is absent) stay checkable at the call site instead of being
/// re-derived from a loosely-typed bag of properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    /// IRI the term maps to.
    id: String,
    /// Type coercion (optional).
    ty: Option<TypeMapping>,
    /// Language coercion (optional).
    language: Option<String>,
    /// Container mapping (optional).
    container: Option<Container>,
}

impl Definition {
    /// Creates a definition that only carries an IRI mapping.
    pub(crate) fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ty: None,
            language: None,
            container: None,
        }
    }

    /// Returns the IRI mapping.
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    /// Returns the type coercion, if any.
    pub(crate) fn ty(&self) -> Option<&TypeMapping> {
        self.ty.as_ref()
    }

    /// Sets the type coercion.
    pub(crate) fn set_ty(&mut self, ty: TypeMapping) {
        self.ty = Some(ty);
    }

    /// Returns the language coercion, if any.
    pub(crate) fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Sets the language coercion.
    ///
    /// Only meaningful when no type coercion is set; the context processor
    /// only calls this when `@type` was absent from the term definition.
    pub(crate) fn set_language(&mut self, language: impl Into<String>) {
        self.language = Some(language.into());
    }

    /// Returns the container mapping, if any.
    pub(crate) fn container(&self) -> Option<Container> {
        self.container
    }

    /// Sets the container mapping.
    pub(crate) fn set_container(&mut self, container: Container) {
        self.container = Some(container);
    }

    /// Checks whether this definition has a `@list` container.
    pub(crate) fn has_list_container(&self) -> bool {
        self.container == Some(Container::List)
    }

    /// Checks whether this definition has a `@set` container.
    pub(crate) fn has_set_container(&self) -> bool {
        self.container == Some(Container::Set)
    }
}
