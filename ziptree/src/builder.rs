//! Tree construction
//!
//! `build` walks the entry list of the session's root container and turns it
//! into an `ArchiveNode` tree. Intermediate path segments become directory
//! nodes on demand. A file whose content is itself a zip becomes a mount point:
//! the nested container is opened through the session and its entries are
//! attached directly below the file node, without an extra wrapper directory.
//!
//! Mounting is best-effort. With `NestedFailurePolicy::RetainAsLeaf` a nested
//! archive that can't be opened, is malformed, or sits deeper than
//! `max_mount_depth` stays a plain file and a warning goes to the session's
//! diagnostics. The same happens to a mount point that shares its name with
//! a directory of the enclosing archive.

use crate::config::NestedFailurePolicy;
use crate::error::{Error, Result};
use crate::node::{ArchiveNode, EntrySource};
use crate::session::{ArchiveSession, ContainerId};

/// Builds the tree for everything reachable from the session's root container.
pub fn build(session: &mut ArchiveSession) -> Result<ArchiveNode> {
    let root_id = session.root_id()?;
    let mut root = ArchiveNode::new_root();
    populate(session, root_id, &mut root, 0)?;
    log::debug!(
        "built tree for {} with {} nodes",
        session.path().display(),
        root.node_count()
    );
    Ok(root)
}

/// Splits an entry name into its segments, rejecting empty ones.
fn split_segments(path: &str, is_directory: bool) -> Result<Vec<&str>> {
    let trimmed = if is_directory {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::MalformedArchive(format!(
            "entry '{path}' has an empty path segment"
        )));
    }
    Ok(segments)
}

/// Attaches the entries of container `id` below `target`.
fn populate(
    session: &mut ArchiveSession,
    id: ContainerId,
    target: &mut ArchiveNode,
    depth: usize,
) -> Result<()> {
    let entries = session.container(id)?.entries().to_vec();

    for entry in entries {
        let segments = split_segments(&entry.path, entry.is_directory)?;
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut node = &mut *target;
        for segment in parents {
            let i = node.ensure_directory(segment);
            node = &mut node.children_mut()[i];
        }

        if entry.is_directory {
            node.ensure_directory(last);
            continue;
        }

        let source = EntrySource {
            container: id,
            path: entry.path.clone(),
        };
        let i = match node.add_file(last, source) {
            Some(i) => i,
            None => {
                log::trace!("skipping duplicate entry {}", entry.path);
                continue;
            }
        };

        if entry.is_nested_container {
            mount(session, id, &entry.path, &mut node.children_mut()[i], depth + 1)?;
        }
    }
    unmount_shadowed(session, target)
}

/// A mount point next to a directory of the same name would give both
/// subtrees the same paths. The directory is kept and the mount point is
/// left unexpanded. Mounted subtrees were already checked by their own
/// `populate` and are not descended into.
fn unmount_shadowed(session: &ArchiveSession, node: &mut ArchiveNode) -> Result<()> {
    let directories: Vec<String> = node
        .children()
        .iter()
        .filter(|c| c.entry().is_directory())
        .map(|c| c.entry().name().to_string())
        .collect();

    for child in node.children_mut().iter_mut() {
        if child.entry().is_directory() {
            unmount_shadowed(session, child)?;
            continue;
        }
        if !child.entry().is_mount_point()
            || !directories.iter().any(|d| d == child.entry().name())
        {
            continue;
        }

        let message = format!(
            "{}: nested archive collides with directory {}/, not expanded",
            child.path(),
            child.path()
        );
        if session.options().nested_failure == NestedFailurePolicy::Abort {
            return Err(Error::MalformedArchive(message));
        }
        child.children_mut().clear();
        child.entry_mut().set_mount_point(false);
        log::warn!("{message}");
        session.diagnostics().warning(&message);
    }
    Ok(())
}

/// Mounts the nested archive stored as `path` in container `parent` under `leaf`.
fn mount(
    session: &mut ArchiveSession,
    parent: ContainerId,
    path: &str,
    leaf: &mut ArchiveNode,
    depth: usize,
) -> Result<()> {
    let policy = session.options().nested_failure;
    let max_depth = session.options().max_mount_depth;

    if depth > max_depth {
        let message = format!(
            "{}: nested archive exceeds the mount depth limit of {max_depth}, not expanded",
            leaf.path()
        );
        log::warn!("{message}");
        session.diagnostics().warning(&message);
        return Ok(());
    }

    let result = match session.open_nested(parent, path) {
        Ok(nested) => {
            leaf.entry_mut().set_mount_point(true);
            populate(session, nested, leaf, depth)
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => Ok(()),
        Err(err @ Error::SessionClosed) => Err(err),
        Err(err) if policy == NestedFailurePolicy::Abort => Err(err),
        Err(err) => {
            leaf.children_mut().clear();
            leaf.entry_mut().set_mount_point(false);
            let message = format!("{}: cannot mount nested archive: {err}", leaf.path());
            log::warn!("{message}");
            session.diagnostics().warning(&message);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segments() {
        assert_eq!(
            split_segments("res/anim/fade.xml", false).unwrap(),
            vec!["res", "anim", "fade.xml"]
        );
        assert_eq!(split_segments("res/", true).unwrap(), vec!["res"]);
        assert_eq!(split_segments("a", false).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_split_segments_rejects_empty() {
        for bad in ["a//b", "/a", "", "a/"] {
            assert!(
                matches!(split_segments(bad, false), Err(Error::MalformedArchive(_))),
                "{bad} should be rejected"
            );
        }
        assert!(split_segments("a//", true).is_err());
    }
}
