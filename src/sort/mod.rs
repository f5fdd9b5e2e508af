//! Canonical ordering of elements and attributes.
//!
//! Canonicalization runs up to two passes over the subtree of the document
//! element:
//!
//! 1. The attribute pass ([`sort_attributes`]) visits every element in
//!    pre-order and stably sorts its attribute list with an
//!    [`AttributeComparator`].
//! 2. The node pass ([`sort_nodes`]) visits elements in post-order. Each
//!    element's children are sorted first; then its own element children are
//!    detached, stably sorted with a [`NodeComparator`], and reattached.
//!
//! The node comparator reads attribute lists, so the attribute pass has to
//! run first for the output to be canonical. [`canonicalize`] always runs
//! them in that order.
//!
//! Text, comments, CDATA sections and processing instructions are never
//! reordered: they keep their positions among their siblings and sorted
//! elements fill the slots the elements occupied. Moved elements keep their
//! `NodeId`s.

pub mod compare;
pub mod merge;
mod options;

pub use compare::{AttributeComparator, NodeComparator, SiblingKey};
pub use options::{SortOptions, DEFAULT_PRIMARY_ATTRIBUTE};

use crate::tree::{Document, NodeId};

use merge::{apply_order, sorted_order};

/// Sorts the attributes and element children of the document element, in
/// that order, as enabled by `options`.
///
/// A document without a document element is left untouched.
///
/// ```
/// use sortxml::{canonicalize, serial, Document, SortOptions};
///
/// let mut doc = Document::parse_str(r#"<r><b y="2" x="1"/><a/></r>"#).unwrap();
/// canonicalize(&mut doc, &SortOptions::default());
/// assert_eq!(serial::serialize(&doc), r#"<r><a/><b x="1" y="2"/></r>"#);
/// ```
pub fn canonicalize(doc: &mut Document, options: &SortOptions) {
    let Some(root) = doc.root_element() else {
        log::debug!("document has no document element; nothing to sort");
        return;
    };
    if options.sort_attributes {
        log::debug!(
            "sorting attributes (collation: {}, primary: {})",
            options.attribute_collation,
            options.effective_primary_attribute().unwrap_or("none")
        );
        let changed = sort_attributes(doc, root, options);
        log::debug!("reordered the attributes of {changed} element(s)");
    }
    if options.sort_nodes {
        log::debug!("sorting nodes (collation: {})", options.node_collation);
        let changed = sort_nodes(doc, root, options);
        log::debug!("reordered the children of {changed} element(s)");
    }
}

/// Sorts the attribute list of `node` and of every element below it.
///
/// Does nothing when `options.sort_attributes` is off. Returns the number of
/// elements whose attribute order changed.
pub fn sort_attributes(doc: &mut Document, node: NodeId, options: &SortOptions) -> usize {
    if !options.sort_attributes {
        return 0;
    }
    let comparator = AttributeComparator::from_options(options);
    sort_attributes_in(doc, node, &comparator)
}

fn sort_attributes_in(doc: &mut Document, node: NodeId, comparator: &AttributeComparator<'_>) -> usize {
    let mut changed = 0;
    if let Some(attrs) = doc.attributes_mut(node) {
        let current = &*attrs;
        let order = sorted_order(current.len(), |i, j| comparator.compare(&current[i], &current[j]));
        if !is_identity(&order) {
            apply_order(attrs, &order);
            changed += 1;
        }
    }
    let children: Vec<NodeId> = doc.element_children(node).collect();
    for child in children {
        changed += sort_attributes_in(doc, child, comparator);
    }
    changed
}

/// Sorts the element children of `node` and of every element below it,
/// deepest first.
///
/// Does nothing when `options.sort_nodes` is off. Returns the number of
/// elements whose child order changed.
pub fn sort_nodes(doc: &mut Document, node: NodeId, options: &SortOptions) -> usize {
    if !options.sort_nodes {
        return 0;
    }
    let comparator = NodeComparator::from_options(options);
    sort_nodes_in(doc, node, &comparator)
}

fn sort_nodes_in(doc: &mut Document, node: NodeId, comparator: &NodeComparator) -> usize {
    let children: Vec<NodeId> = doc.element_children(node).collect();
    let mut changed = 0;
    for &child in &children {
        changed += sort_nodes_in(doc, child, comparator);
    }
    if children.len() < 2 {
        return changed;
    }

    // Each element slot is remembered by the first non-element sibling
    // after it (or the end of the list), which survives the detach.
    let anchors: Vec<Option<NodeId>> = children
        .iter()
        .map(|&child| next_non_element(doc, child))
        .collect();
    for &child in &children {
        doc.detach(child);
    }

    let order = {
        let keys: Vec<SiblingKey<'_>> = children.iter().map(|&c| SiblingKey::of(doc, c)).collect();
        sorted_order(keys.len(), |i, j| comparator.compare(&keys[i], &keys[j]))
    };

    for (&index, anchor) in order.iter().zip(anchors) {
        let child = children[index];
        match anchor {
            Some(anchor) => doc.insert_before(anchor, child),
            None => doc.append_child(node, child),
        }
    }

    if is_identity(&order) {
        changed
    } else {
        log::trace!("reordered {} element children of {node:?}", children.len());
        changed + 1
    }
}

fn next_non_element(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut next = doc.next_sibling(id);
    while let Some(sibling) = next {
        if !doc.is_element(sibling) {
            return Some(sibling);
        }
        next = doc.next_sibling(sibling);
    }
    None
}

fn is_identity(order: &[usize]) -> bool {
    order.iter().enumerate().all(|(i, &j)| i == j)
}
