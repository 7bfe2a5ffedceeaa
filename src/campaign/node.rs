//! Campaign tree node and its storage key scheme.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Keyed;

/// One node in the campaign tree: a folder, or a reference to a
/// content record such as an encounter.
///
/// Keys are flat per parent: a node is stored under its parent's
/// child prefix, while its own children live under a prefix derived
/// from the node's id alone. Moving a node therefore re-keys only the
/// node itself, never its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignNode {
    pub id: Uuid,
    pub title: String,
    pub contents: Option<CampaignNodeContents>,
    pub special: Option<SpecialNodeKind>,
    pub parent_key_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignNodeContents {
    pub key: String,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Encounter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialNodeKind {
    CampaignRoot,
}

impl CampaignNode {
    /// The virtual root everything hangs under. Not persisted.
    pub fn root() -> Self {
        Self {
            id: Uuid::nil(),
            title: "Adventure".to_string(),
            contents: None,
            special: Some(SpecialNodeKind::CampaignRoot),
            parent_key_prefix: None,
        }
    }

    /// Prefix shared by the keys of this node's direct children.
    pub fn key_prefix_for_children(&self) -> String {
        format!("cn/{}", self.id)
    }

    pub fn is_folder(&self) -> bool {
        self.contents.is_none()
    }
}

impl Keyed for CampaignNode {
    fn key(&self) -> String {
        format!(
            "{}/{}",
            self.parent_key_prefix.as_deref().unwrap_or("cn"),
            self.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_of(parent: &CampaignNode, title: &str) -> CampaignNode {
        CampaignNode {
            id: Uuid::new_v4(),
            title: title.to_string(),
            contents: None,
            special: None,
            parent_key_prefix: Some(parent.key_prefix_for_children()),
        }
    }

    #[test]
    fn child_key_lives_under_parent_prefix() {
        let root = CampaignNode::root();
        let child = child_of(&root, "folder");
        assert!(child
            .key()
            .starts_with(&format!("{}/", root.key_prefix_for_children())));
    }

    #[test]
    fn grandchild_key_is_independent_of_grandparent() {
        let root = CampaignNode::root();
        let child = child_of(&root, "folder");
        let grandchild = child_of(&child, "nested");
        // Flat per-parent keys: an ancestor's id appears only in its
        // direct children's keys.
        assert!(!grandchild.key().contains(&root.id.to_string()));
        assert!(grandchild
            .key()
            .starts_with(&format!("{}/", child.key_prefix_for_children())));
    }

    #[test]
    fn own_key_does_not_match_child_scan_prefix() {
        let node = child_of(&CampaignNode::root(), "folder");
        let child_scan = format!("{}/", node.key_prefix_for_children());
        assert!(!node.key().starts_with(&child_scan));
    }
}
