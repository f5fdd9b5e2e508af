//! Attribute and sibling comparators.
//!
//! Neither comparator is a total order. [`AttributeComparator`] pins one
//! attribute name ahead of everything, which breaks transitivity, and
//! [`NodeComparator`] walks the longer attribute list against the shorter
//! one, so `compare(a, b)` and `compare(b, a)` can both be `Greater`. Output
//! files depend on these exact answers; sort with
//! [`merge::sorted_order`](super::merge::sorted_order), never with a sort
//! that assumes a total order.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::collation::Collation;
use crate::tree::{Attribute, Document, NodeId, NodeKind};

use super::options::SortOptions;

/// Orders the attributes of a single element.
#[derive(Debug, Clone)]
pub struct AttributeComparator<'a> {
    collation: Collation,
    primary: Option<&'a str>,
}

impl<'a> AttributeComparator<'a> {
    /// An empty `primary` is the same as none.
    #[must_use]
    pub fn new(collation: Collation, primary: Option<&'a str>) -> Self {
        Self {
            collation,
            primary: primary.filter(|p| !p.is_empty()),
        }
    }

    /// Builds the comparator the attribute pass uses for `options`.
    #[must_use]
    pub fn from_options(options: &'a SortOptions) -> Self {
        Self::new(
            options.attribute_collation,
            options.effective_primary_attribute(),
        )
    }

    /// Compares two attributes.
    ///
    /// Names are compared first; equal names fall back to the values. When
    /// the names differ, an attribute whose name equals the primary name
    /// sorts first. The left operand is checked before the right one.
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use sortxml::{Attribute, Collation};
    /// use sortxml::sort::AttributeComparator;
    ///
    /// let cmp = AttributeComparator::new(Collation::ordinal(), Some("id"));
    /// let id = Attribute::new("id", "7");
    /// let a = Attribute::new("a", "1");
    /// assert_eq!(cmp.compare(&id, &a), Ordering::Less);
    /// assert_eq!(cmp.compare(&a, &id), Ordering::Greater);
    /// ```
    #[must_use]
    pub fn compare(&self, a: &Attribute, b: &Attribute) -> Ordering {
        let a_name = a.qualified_name();
        let b_name = b.qualified_name();
        let by_name = self.collation.compare(&a_name, &b_name);
        if by_name == Ordering::Equal {
            return self.collation.compare(&a.value, &b.value);
        }
        let Some(primary) = self.primary else {
            return by_name;
        };
        if self.collation.equals(&a_name, primary) {
            Ordering::Less
        } else if self.collation.equals(&b_name, primary) {
            Ordering::Greater
        } else {
            by_name
        }
    }
}

/// The parts of a node the sibling comparator looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingKey<'a> {
    /// Qualified tag name, or a `#`-prefixed name for non-elements.
    pub name: Cow<'a, str>,
    /// `None` for nodes that cannot carry attributes.
    pub attributes: Option<&'a [Attribute]>,
}

impl<'a> SiblingKey<'a> {
    #[must_use]
    pub fn new(name: impl Into<Cow<'a, str>>, attributes: Option<&'a [Attribute]>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Reads the key of a node in `doc`.
    #[must_use]
    pub fn of(doc: &'a Document, id: NodeId) -> Self {
        let name = match &doc.node(id).kind {
            NodeKind::Element { .. } | NodeKind::ProcessingInstruction { .. } => {
                doc.node_name(id).unwrap_or_default()
            }
            NodeKind::Document => Cow::Borrowed("#document"),
            NodeKind::Text { .. } => Cow::Borrowed("#text"),
            NodeKind::CData { .. } => Cow::Borrowed("#cdata-section"),
            NodeKind::Comment { .. } => Cow::Borrowed("#comment"),
            NodeKind::DocumentType { name, .. } => Cow::Borrowed(name.as_str()),
        };
        Self::new(name, doc.attribute_list(id))
    }
}

/// Orders sibling nodes by tag name, then positionally by attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeComparator {
    names: Collation,
    attributes: Collation,
}

impl NodeComparator {
    #[must_use]
    pub fn new(names: Collation, attributes: Collation) -> Self {
        Self { names, attributes }
    }

    #[must_use]
    pub fn from_options(options: &SortOptions) -> Self {
        Self::new(options.node_collation, options.attribute_collation)
    }

    /// Compares two siblings.
    ///
    /// Different tag names decide the order. Otherwise, if either node has
    /// no attribute list the two are equal. Otherwise the longer list (the
    /// first one on a length tie) is walked index by index against the
    /// shorter: the first pair whose names or values differ decides, and
    /// running past the end of the shorter list yields `Greater`. The answer
    /// is not mapped back to argument order, so a strict attribute prefix
    /// compares `Greater` in both directions:
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use sortxml::{Attribute, Collation};
    /// use sortxml::sort::{NodeComparator, SiblingKey};
    ///
    /// let short = [Attribute::new("k", "1")];
    /// let long = [Attribute::new("k", "1"), Attribute::new("m", "2")];
    /// let a = SiblingKey::new("item", Some(&short[..]));
    /// let b = SiblingKey::new("item", Some(&long[..]));
    ///
    /// let cmp = NodeComparator::default();
    /// assert_eq!(cmp.compare(&a, &b), Ordering::Greater);
    /// assert_eq!(cmp.compare(&b, &a), Ordering::Greater);
    /// ```
    #[must_use]
    pub fn compare(&self, a: &SiblingKey<'_>, b: &SiblingKey<'_>) -> Ordering {
        let by_name = self.names.compare(&a.name, &b.name);
        if by_name != Ordering::Equal {
            return by_name;
        }
        let (Some(a_attrs), Some(b_attrs)) = (a.attributes, b.attributes) else {
            return Ordering::Equal;
        };
        let (longer, shorter) = if a_attrs.len() >= b_attrs.len() {
            (a_attrs, b_attrs)
        } else {
            (b_attrs, a_attrs)
        };
        for (i, attr) in longer.iter().enumerate() {
            let Some(other) = shorter.get(i) else {
                return Ordering::Greater;
            };
            let ord = self
                .attributes
                .compare(&attr.qualified_name(), &other.qualified_name())
                .then_with(|| self.attributes.compare(&attr.value, &other.value));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
        pairs.iter().map(|(n, v)| Attribute::new(n, v)).collect()
    }

    // --- AttributeComparator ---

    #[test]
    fn test_attribute_names_then_values() {
        let cmp = AttributeComparator::new(Collation::ordinal(), None);
        let a1 = Attribute::new("a", "1");
        let a2 = Attribute::new("a", "2");
        let b1 = Attribute::new("b", "1");
        assert_eq!(cmp.compare(&a1, &b1), Ordering::Less);
        assert_eq!(cmp.compare(&b1, &a1), Ordering::Greater);
        assert_eq!(cmp.compare(&a1, &a2), Ordering::Less);
        assert_eq!(cmp.compare(&a1, &a1.clone()), Ordering::Equal);
    }

    #[test]
    fn test_primary_pins_first() {
        let cmp = AttributeComparator::new(Collation::linguistic(), Some("GUID"));
        let guid = Attribute::new("GUID", "x");
        let a = Attribute::new("a", "1");
        let z = Attribute::new("z", "1");
        assert_eq!(cmp.compare(&guid, &a), Ordering::Less);
        assert_eq!(cmp.compare(&z, &guid), Ordering::Greater);
        assert_eq!(cmp.compare(&a, &z), Ordering::Less);
    }

    #[test]
    fn test_primary_respects_case_sensitivity() {
        let guid = Attribute::new("guid", "x");
        let a = Attribute::new("a", "1");

        let sensitive = AttributeComparator::new(Collation::ordinal(), Some("GUID"));
        assert_eq!(sensitive.compare(&guid, &a), Ordering::Greater);

        let folded = AttributeComparator::new(Collation::ordinal().ignore_case(), Some("GUID"));
        assert_eq!(folded.compare(&guid, &a), Ordering::Less);
    }

    #[test]
    fn test_empty_primary_is_ignored() {
        let cmp = AttributeComparator::new(Collation::ordinal(), Some(""));
        assert_eq!(
            cmp.compare(&Attribute::new("b", ""), &Attribute::new("a", "")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_prefixed_attribute_names_compare_qualified() {
        let cmp = AttributeComparator::new(Collation::ordinal(), None);
        let xml_lang = Attribute::new("xml:lang", "en");
        let lang = Attribute::new("lang", "en");
        // "lang" < "xml:lang"
        assert_eq!(cmp.compare(&lang, &xml_lang), Ordering::Less);
    }

    #[test]
    fn test_from_options_uses_default_primary() {
        let opts = SortOptions::default();
        let cmp = AttributeComparator::from_options(&opts);
        assert_eq!(
            cmp.compare(&Attribute::new("a", "1"), &Attribute::new("GUID", "1")),
            Ordering::Greater
        );
    }

    // --- NodeComparator ---

    #[test]
    fn test_nodes_by_name() {
        let cmp = NodeComparator::default();
        let a = SiblingKey::new("alpha", None);
        let b = SiblingKey::new("beta", None);
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
        assert_eq!(cmp.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_absent_attribute_list_is_equal() {
        let cmp = NodeComparator::default();
        let list = attrs(&[("k", "1")]);
        let with = SiblingKey::new("x", Some(&list[..]));
        let without = SiblingKey::new("x", None);
        assert_eq!(cmp.compare(&with, &without), Ordering::Equal);
        assert_eq!(cmp.compare(&without, &with), Ordering::Equal);
    }

    #[test]
    fn test_empty_lists_are_equal() {
        let cmp = NodeComparator::default();
        let a = SiblingKey::new("x", Some(&[][..]));
        let b = SiblingKey::new("x", Some(&[][..]));
        assert_eq!(cmp.compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_empty_list_vs_nonempty_is_greater_both_ways() {
        let cmp = NodeComparator::default();
        let list = attrs(&[("k", "1")]);
        let empty = SiblingKey::new("x", Some(&[][..]));
        let full = SiblingKey::new("x", Some(&list[..]));
        assert_eq!(cmp.compare(&empty, &full), Ordering::Greater);
        assert_eq!(cmp.compare(&full, &empty), Ordering::Greater);
    }

    #[test]
    fn test_first_difference_is_not_remapped() {
        let cmp = NodeComparator::new(Collation::ordinal(), Collation::ordinal());
        let short = attrs(&[("k", "2")]);
        let long = attrs(&[("k", "1"), ("m", "0")]);
        let a = SiblingKey::new("x", Some(&short[..]));
        let b = SiblingKey::new("x", Some(&long[..]));
        // The longer list is on the left of the comparison either way:
        // "1" vs "2" is Less regardless of argument order.
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
        assert_eq!(cmp.compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_equal_lengths_compare_in_argument_order() {
        let cmp = NodeComparator::new(Collation::ordinal(), Collation::ordinal());
        let one = attrs(&[("k", "1")]);
        let two = attrs(&[("k", "2")]);
        let a = SiblingKey::new("x", Some(&one[..]));
        let b = SiblingKey::new("x", Some(&two[..]));
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
        assert_eq!(cmp.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_names_before_values() {
        let cmp = NodeComparator::new(Collation::ordinal(), Collation::ordinal());
        let first = attrs(&[("a", "9")]);
        let second = attrs(&[("b", "0")]);
        let a = SiblingKey::new("x", Some(&first[..]));
        let b = SiblingKey::new("x", Some(&second[..]));
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_ignore_case_on_tag_names() {
        let cmp = NodeComparator::new(Collation::ordinal().ignore_case(), Collation::ordinal());
        let a = SiblingKey::new("Item", Some(&[][..]));
        let b = SiblingKey::new("item", Some(&[][..]));
        assert_eq!(cmp.compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_sibling_key_of_document_nodes() {
        let doc = Document::parse_str("<r><!--c--><p:e q:a=\"1\"/>t</r>").unwrap();
        let root = doc.root_element().unwrap();
        let keys: Vec<SiblingKey<'_>> = doc.children(root).map(|c| SiblingKey::of(&doc, c)).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], SiblingKey::new("#comment", None));
        assert_eq!(keys[1].name, "p:e");
        assert_eq!(keys[1].attributes.map(<[Attribute]>::len), Some(1));
        assert_eq!(keys[2], SiblingKey::new("#text", None));
    }
}
