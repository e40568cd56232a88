//! Preorder traversal and text dumps of archive trees.

use crate::node::ArchiveNode;

/// Depth-first, node before children, children in their current order.
pub struct PreOrder<'a> {
    stack: Vec<&'a ArchiveNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ArchiveNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

pub fn preorder(root: &ArchiveNode) -> PreOrder<'_> {
    PreOrder { stack: vec![root] }
}

/// One line per node in preorder, joined with `\n`.
pub fn dump_tree<F>(root: &ArchiveNode, mapper: F) -> String
where
    F: FnMut(&ArchiveNode) -> String,
{
    preorder(root).map(mapper).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EntrySource;
    use crate::session::ContainerId;

    fn source(path: &str) -> EntrySource {
        EntrySource {
            container: ContainerId(0),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_preorder_order() {
        let mut root = ArchiveNode::new_root();
        let a = root.ensure_directory("a");
        root.children_mut()[a].add_file("x", source("a/x"));
        root.children_mut()[a].add_file("y", source("a/y"));
        root.add_file("b", source("b"));

        let dump = dump_tree(&root, |n| n.path().to_string());
        assert_eq!(dump, "/\n/a/\n/a/x\n/a/y\n/b");
    }

    #[test]
    fn test_single_node_dump_has_no_newline() {
        let root = ArchiveNode::new_root();
        assert_eq!(dump_tree(&root, |n| n.path().to_string()), "/");
    }
}
