//! # Archive tree model
//!
//! An archive is presented as a tree of `ArchiveNode`s. Each node owns its
//! `ArchiveEntry` and its children outright; there are no parent pointers.
//!
//! Paths follow a few simple rules:
//! - the root is exactly `/`;
//! - directories end in `/` (`/res/anim/`);
//! - files and mount points do not (`/res/anim/fade.xml`, `/instant-run.zip`);
//! - a mounted archive continues right below its mount point
//!   (`/instant-run.zip/instant-run/classes1.dex`).
//!
//! A mount point is a file whose content is itself a zip. It keeps the sizes of
//! the stored blob like any other file while its children describe the inside
//! of the nested archive.

use crate::session::ContainerId;
use crate::size::SizeMetric;

/// Where the bytes of an entry live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntrySource {
    pub container: ContainerId,
    /// Entry name inside `container`, as stored.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    name: String,
    #[serde(rename = "path")]
    full_path: String,
    #[serde(rename = "isDirectory")]
    is_directory: bool,
    #[serde(rename = "isMountPoint")]
    is_mount_point: bool,
    #[serde(rename = "rawSize", skip_serializing_if = "Option::is_none")]
    raw_size: Option<u64>,
    #[serde(rename = "downloadSize", skip_serializing_if = "Option::is_none")]
    download_size: Option<u64>,
    #[serde(skip)]
    source: Option<EntrySource>,
}

impl ArchiveEntry {
    fn root() -> Self {
        ArchiveEntry {
            name: String::new(),
            full_path: "/".to_string(),
            is_directory: true,
            is_mount_point: false,
            raw_size: None,
            download_size: None,
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_mount_point(&self) -> bool {
        self.is_mount_point
    }

    pub fn raw_size(&self) -> Option<u64> {
        self.raw_size
    }

    pub fn download_size(&self) -> Option<u64> {
        self.download_size
    }

    pub fn size(&self, metric: SizeMetric) -> Option<u64> {
        match metric {
            SizeMetric::Raw => self.raw_size,
            SizeMetric::Download => self.download_size,
        }
    }

    /// `None` for synthetic directories.
    pub fn source(&self) -> Option<&EntrySource> {
        self.source.as_ref()
    }

    pub(crate) fn set_size(&mut self, metric: SizeMetric, size: Option<u64>) {
        match metric {
            SizeMetric::Raw => self.raw_size = size,
            SizeMetric::Download => self.download_size = size,
        }
    }

    pub(crate) fn set_mount_point(&mut self, is_mount_point: bool) {
        self.is_mount_point = is_mount_point;
    }
}

fn child_path(parent: &str, name: &str, is_directory: bool) -> String {
    let mut path = String::with_capacity(parent.len() + name.len() + 2);
    path.push_str(parent);
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(name);
    if is_directory {
        path.push('/');
    }
    path
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveNode {
    #[serde(flatten)]
    entry: ArchiveEntry,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ArchiveNode>,
}

impl ArchiveNode {
    pub fn new_root() -> Self {
        ArchiveNode {
            entry: ArchiveEntry::root(),
            children: Vec::new(),
        }
    }

    pub fn entry(&self) -> &ArchiveEntry {
        &self.entry
    }

    pub fn path(&self) -> &str {
        &self.entry.full_path
    }

    pub fn children(&self) -> &[ArchiveNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        crate::traversal::preorder(self).count()
    }

    /// Looks a node up by its full path.
    pub fn find(&self, path: &str) -> Option<&ArchiveNode> {
        if self.path() == path {
            return Some(self);
        }
        self.children
            .iter()
            .filter(|c| path.starts_with(c.path().trim_end_matches('/')))
            .find_map(|c| c.find(path))
    }

    pub(crate) fn entry_mut(&mut self) -> &mut ArchiveEntry {
        &mut self.entry
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<ArchiveNode> {
        &mut self.children
    }

    /// Returns the index of the child directory `name`, creating it if needed.
    pub(crate) fn ensure_directory(&mut self, name: &str) -> usize {
        if let Some(i) = self
            .children
            .iter()
            .position(|c| c.entry.is_directory && c.entry.name == name)
        {
            return i;
        }
        let entry = ArchiveEntry {
            name: name.to_string(),
            full_path: child_path(&self.entry.full_path, name, true),
            is_directory: true,
            is_mount_point: false,
            raw_size: None,
            download_size: None,
            source: None,
        };
        self.children.push(ArchiveNode {
            entry,
            children: Vec::new(),
        });
        self.children.len() - 1
    }

    /// Appends a file child, or returns `None` when a file of that name is
    /// already present.
    pub(crate) fn add_file(&mut self, name: &str, source: EntrySource) -> Option<usize> {
        if self
            .children
            .iter()
            .any(|c| !c.entry.is_directory && c.entry.name == name)
        {
            return None;
        }
        let entry = ArchiveEntry {
            name: name.to_string(),
            full_path: child_path(&self.entry.full_path, name, false),
            is_directory: false,
            is_mount_point: false,
            raw_size: None,
            download_size: None,
            source: Some(source),
        };
        self.children.push(ArchiveNode {
            entry,
            children: Vec::new(),
        });
        Some(self.children.len() - 1)
    }
}
