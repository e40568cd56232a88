//! Reordering children
//!
//! `sort` reorders the children of every node, recursively, mounted subtrees
//! included. The sort is stable and sizes are left untouched; only the order
//! seen by a later traversal changes.

use std::cmp::Ordering;

use crate::node::{ArchiveEntry, ArchiveNode};

pub fn sort<F>(root: &mut ArchiveNode, mut compare: F)
where
    F: FnMut(&ArchiveEntry, &ArchiveEntry) -> Ordering,
{
    sort_node(root, &mut compare);
}

fn sort_node<F>(node: &mut ArchiveNode, compare: &mut F)
where
    F: FnMut(&ArchiveEntry, &ArchiveEntry) -> Ordering,
{
    let children = node.children_mut();
    children.sort_by(|a, b| compare(a.entry(), b.entry()));
    for child in children.iter_mut() {
        sort_node(child, compare);
    }
}

/// Largest raw size first; entries without a size go last.
pub fn by_raw_size_desc(a: &ArchiveEntry, b: &ArchiveEntry) -> Ordering {
    b.raw_size().cmp(&a.raw_size())
}

/// Largest download size first; entries without a size go last.
pub fn by_download_size_desc(a: &ArchiveEntry, b: &ArchiveEntry) -> Ordering {
    b.download_size().cmp(&a.download_size())
}

pub fn by_name(a: &ArchiveEntry, b: &ArchiveEntry) -> Ordering {
    a.name().cmp(b.name())
}
