//! Per-resource visibility summary and breadcrumb types.

use serde::{Deserialize, Serialize};

use crate::identity::DirectoryResource;

/// Raw view/modify capability booleans for the grants directly on a
/// resource, split by whether the grantee is public.
///
/// This is a per-node summary of the grants *on* the node, not an
/// effective-permission computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilitySummary {
    /// An active public grant includes VIEW.
    pub public_view: bool,
    /// An active public grant includes a modify-capable type.
    pub public_modify: bool,
    /// An active non-public grant includes VIEW.
    pub private_view: bool,
    /// An active non-public grant includes a modify-capable type.
    pub private_modify: bool,
}

/// Display label derived from a [`VisibilitySummary`].
///
/// Modify wins over view, public is reported before private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityLabel {
    /// Anyone can modify.
    PublicModify,
    /// Anyone can view.
    PublicView,
    /// Some named grantee can modify.
    PrivateModify,
    /// Some named grantee can view.
    PrivateView,
    /// No active grant on the node; only the drive owner can see it.
    Restricted,
}

impl VisibilitySummary {
    /// Collapse the four booleans into the display label.
    pub fn label(&self) -> VisibilityLabel {
        if self.public_modify {
            VisibilityLabel::PublicModify
        } else if self.public_view {
            VisibilityLabel::PublicView
        } else if self.private_modify {
            VisibilityLabel::PrivateModify
        } else if self.private_view {
            VisibilityLabel::PrivateView
        } else {
            VisibilityLabel::Restricted
        }
    }
}

/// One entry of a permission-filtered breadcrumb trail, root-to-leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// The resource this entry points at.
    pub resource: DirectoryResource,
    /// Display name (disk name for a drive-root folder).
    pub name: String,
    /// Visibility label for the node.
    pub visibility: VisibilityLabel,
}
