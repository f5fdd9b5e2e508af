use crate::collation::Collation;

/// The attribute name pinned first when sorting attributes and no other name
/// was configured.
pub const DEFAULT_PRIMARY_ATTRIBUTE: &str = "GUID";

/// Options controlling [`canonicalize`](super::canonicalize).
///
/// Uses a builder pattern:
///
/// ```
/// use sortxml::{Collation, SortOptions};
///
/// let opts = SortOptions::default()
///     .attribute_collation(Collation::ordinal())
///     .primary_attribute("id");
/// assert!(opts.sort_nodes);
/// assert_eq!(opts.effective_primary_attribute(), Some("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Reorder sibling elements.
    pub sort_nodes: bool,
    /// Reorder the attributes of every element.
    pub sort_attributes: bool,
    /// Ordering of tag names.
    pub node_collation: Collation,
    /// Ordering of attribute names and values.
    pub attribute_collation: Collation,
    /// Attribute name pinned first in every element's attribute list.
    pub primary_attribute: Option<String>,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            sort_nodes: true,
            sort_attributes: true,
            node_collation: Collation::default(),
            attribute_collation: Collation::default(),
            primary_attribute: None,
        }
    }
}

impl SortOptions {
    #[must_use]
    pub fn sort_nodes(mut self, enabled: bool) -> Self {
        self.sort_nodes = enabled;
        self
    }

    #[must_use]
    pub fn sort_attributes(mut self, enabled: bool) -> Self {
        self.sort_attributes = enabled;
        self
    }

    #[must_use]
    pub fn node_collation(mut self, collation: Collation) -> Self {
        self.node_collation = collation;
        self
    }

    #[must_use]
    pub fn attribute_collation(mut self, collation: Collation) -> Self {
        self.attribute_collation = collation;
        self
    }

    /// Uses the same collation for tag names and attributes.
    #[must_use]
    pub fn collation(self, collation: Collation) -> Self {
        self.node_collation(collation).attribute_collation(collation)
    }

    /// Sets the attribute name pinned first. An empty name means none.
    #[must_use]
    pub fn primary_attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.primary_attribute = (!name.is_empty()).then_some(name);
        self
    }

    /// Returns the primary attribute name in effect.
    ///
    /// Falls back to [`DEFAULT_PRIMARY_ATTRIBUTE`] while attribute sorting is
    /// enabled. With attribute sorting disabled there is nothing to pin.
    #[must_use]
    pub fn effective_primary_attribute(&self) -> Option<&str> {
        if !self.sort_attributes {
            return None;
        }
        Some(
            self.primary_attribute
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_PRIMARY_ATTRIBUTE),
        )
    }
}
