//! Inheritance-chain construction.
//!
//! The chain for a resource is the resource itself followed by its folder
//! ancestors, stopping at (and including) the first sovereign node or the
//! drive root. A file is only ever the leaf; folders above it are the
//! inheritance nodes. The result is ordered root-most first.

use std::sync::Arc;

use tracing::error;

use drivehub_core::types::DiskId;
use drivehub_core::{AppError, AppResult};
use drivehub_entity::DirectoryResource;
use drivehub_entity::store::ResourceMetadata;

/// Hard upper bound on ancestor hops. A chain longer than this is treated
/// as a parent-pointer cycle and aborts with `CorruptHierarchy`.
pub const MAX_CHAIN_DEPTH: usize = 256;

/// One node of an inheritance chain.
#[derive(Debug, Clone)]
pub struct ChainNode {
    /// The resource at this node.
    pub resource: DirectoryResource,
    /// The disk the node resides on.
    pub disk_id: DiskId,
    /// Node name.
    pub name: String,
    /// Full disk-qualified path.
    pub full_path: String,
    /// Whether this node is an inheritance boundary.
    pub is_sovereign: bool,
}

/// Builds ancestor chains from resource metadata.
#[derive(Clone)]
pub struct ChainWalker {
    /// Metadata accessor for parent/path/sovereign lookups.
    metadata: Arc<dyn ResourceMetadata>,
}

impl ChainWalker {
    /// Creates a new chain walker.
    pub fn new(metadata: Arc<dyn ResourceMetadata>) -> Self {
        Self { metadata }
    }

    /// Build the inheritance chain for `resource`, root-most first.
    ///
    /// A resource that does not exist yields an empty chain (not an
    /// error); callers surface "not found" at the metadata layer where
    /// they need to.
    pub async fn build(&self, resource: &DirectoryResource) -> AppResult<Vec<ChainNode>> {
        // Collected leaf-first, reversed before returning.
        let mut nodes: Vec<ChainNode> = Vec::new();

        let mut next = match resource {
            DirectoryResource::File(id) => {
                let Some(file) = self.metadata.file(*id).await? else {
                    return Ok(nodes);
                };
                let sovereign = file.is_sovereign;
                nodes.push(ChainNode {
                    resource: *resource,
                    disk_id: file.disk_id,
                    name: file.name,
                    full_path: file.full_path,
                    is_sovereign: sovereign,
                });
                if sovereign { None } else { file.parent_id }
            }
            DirectoryResource::Folder(id) => {
                let Some(folder) = self.metadata.folder(*id).await? else {
                    return Ok(nodes);
                };
                let sovereign = folder.is_sovereign;
                let parent = folder.parent_id;
                nodes.push(ChainNode {
                    resource: *resource,
                    disk_id: folder.disk_id,
                    name: folder.name,
                    full_path: folder.full_path,
                    is_sovereign: sovereign,
                });
                if sovereign { None } else { parent }
            }
        };

        let mut hops = 0usize;
        while let Some(folder_id) = next {
            hops += 1;
            if hops > MAX_CHAIN_DEPTH {
                error!(
                    resource = %resource,
                    max_depth = MAX_CHAIN_DEPTH,
                    "Ancestor walk exceeded depth bound; parent chain is cyclic or corrupt"
                );
                return Err(AppError::corrupt_hierarchy(format!(
                    "Ancestor chain for {resource} exceeds {MAX_CHAIN_DEPTH} hops"
                )));
            }

            // A dangling parent pointer ends the walk at the last
            // resolvable node.
            let Some(folder) = self.metadata.folder(folder_id).await? else {
                break;
            };

            let sovereign = folder.is_sovereign;
            let parent = folder.parent_id;
            nodes.push(ChainNode {
                resource: DirectoryResource::Folder(folder_id),
                disk_id: folder.disk_id,
                name: folder.name,
                full_path: folder.full_path,
                is_sovereign: sovereign,
            });

            // The sovereign node is included, then the walk stops.
            if sovereign {
                break;
            }
            next = parent;
        }

        nodes.reverse();
        Ok(nodes)
    }
}

impl std::fmt::Debug for ChainWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainWalker").finish()
    }
}
