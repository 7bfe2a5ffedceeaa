//! Storage-backed campaign tree service.
//!
//! Invoked only from effects, never from the synchronous reduction
//! path. Each call maps to a handful of per-operation-atomic store
//! calls; last write wins across concurrent effects.

use std::sync::Arc;

use crate::storage::{KeyValueStore, KeyValueStoreExt, Keyed, StorageError};

use super::node::CampaignNode;

#[derive(Clone)]
pub struct CampaignBrowser {
    store: Arc<dyn KeyValueStore>,
}

impl CampaignBrowser {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Direct children of `node`, in key order.
    pub fn nodes_in(&self, node: &CampaignNode) -> Result<Vec<CampaignNode>, StorageError> {
        let prefix = format!("{}/", node.key_prefix_for_children());
        self.store
            .fetch_all_raw(&prefix)?
            .into_iter()
            .map(|record| {
                serde_json::from_value(record.value).map_err(|err| StorageError::Decode {
                    key: record.key,
                    message: err.to_string(),
                })
            })
            .collect()
    }

    pub fn put(&self, node: &CampaignNode) -> Result<(), StorageError> {
        self.store.put(node)
    }

    /// Remove `node` and everything below it.
    ///
    /// Keys are flat per parent, so this walks the tree instead of
    /// relying on a single prefix sweep.
    pub fn remove(&self, node: &CampaignNode) -> Result<(), StorageError> {
        for child in self.nodes_in(node)? {
            self.remove(&child)?;
        }
        self.store.remove(&node.key())?;
        Ok(())
    }

    /// Re-parent `node` under `destination`.
    ///
    /// Only the node itself is re-keyed; its children stay put because
    /// their keys derive from the node's id, not its ancestry.
    pub fn move_node(
        &self,
        node: &CampaignNode,
        destination: &CampaignNode,
    ) -> Result<(), StorageError> {
        self.store.remove(&node.key())?;
        let mut moved = node.clone();
        moved.parent_key_prefix = Some(destination.key_prefix_for_children());
        self.store.put(&moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use uuid::Uuid;

    fn browser() -> CampaignBrowser {
        CampaignBrowser::new(Arc::new(InMemoryStore::new()))
    }

    fn folder(parent: &CampaignNode, title: &str) -> CampaignNode {
        CampaignNode {
            id: Uuid::new_v4(),
            title: title.to_string(),
            contents: None,
            special: None,
            parent_key_prefix: Some(parent.key_prefix_for_children()),
        }
    }

    #[test]
    fn nodes_in_lists_only_direct_children() {
        let browser = browser();
        let root = CampaignNode::root();
        let child = folder(&root, "child");
        let grandchild = folder(&child, "grandchild");
        browser.put(&child).expect("put child");
        browser.put(&grandchild).expect("put grandchild");

        let children = browser.nodes_in(&root).expect("list");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }

    #[test]
    fn remove_is_recursive() {
        let browser = browser();
        let root = CampaignNode::root();
        let child = folder(&root, "child");
        let grandchild = folder(&child, "grandchild");
        browser.put(&child).expect("put child");
        browser.put(&grandchild).expect("put grandchild");

        browser.remove(&child).expect("remove");
        assert!(browser.nodes_in(&root).expect("list root").is_empty());
        assert!(browser.nodes_in(&child).expect("list child").is_empty());
    }

    #[test]
    fn move_node_reparents_and_keeps_subtree() {
        let browser = browser();
        let root = CampaignNode::root();
        let source = folder(&root, "source");
        let target = folder(&root, "target");
        let moved = folder(&source, "moved");
        let nested = folder(&moved, "nested");
        for node in [&source, &target, &moved, &nested] {
            browser.put(node).expect("put");
        }

        browser.move_node(&moved, &target).expect("move");

        assert!(browser.nodes_in(&source).expect("old parent").is_empty());
        let relocated = browser.nodes_in(&target).expect("new parent");
        assert_eq!(relocated.len(), 1);
        assert_eq!(relocated[0].id, moved.id);
        // Subtree untouched: children still found under the moved node.
        assert_eq!(browser.nodes_in(&relocated[0]).expect("subtree").len(), 1);
    }
}
