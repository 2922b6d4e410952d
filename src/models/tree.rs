//! Render-ready tree node produced by the tree builder.
//!
//! Nodes are derived from the member roster on every read and never persisted.

use serde::{Deserialize, Serialize};

use super::FamilyTitle;

/// Descriptive attributes shown on a tree node card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
}

impl NodeAttributes {
    pub fn is_empty(&self) -> bool {
        self.birth_date.is_none() && self.current_location.is_none() && self.situation.is_none()
    }
}

/// One member of the rendered family tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    /// First and last name concatenated.
    pub name: String,
    pub title: FamilyTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "NodeAttributes::is_empty")]
    pub attributes: NodeAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}
