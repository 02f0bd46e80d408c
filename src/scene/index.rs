use crate::error::{SceneError, SceneResult};
use crate::scene::node::{NodePath, SceneNode};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    FirstMatch,
}

/// Name → node paths, built once from a loaded hierarchy.
///
/// Every occurrence of a name is kept in pre-order, so lookups can tell a
/// missing name from an ambiguous one instead of silently picking a node.
#[derive(Debug, Default)]
pub struct NodeIndex {
    paths: HashMap<String, Vec<NodePath>>,
}

impl NodeIndex {
    pub fn build(root: &SceneNode) -> Self {
        let mut paths: HashMap<String, Vec<NodePath>> = HashMap::new();
        root.visit_paths(&mut Vec::new(), &mut |node, path| {
            paths
                .entry(node.name.clone())
                .or_default()
                .push(path.to_vec());
        });
        Self { paths }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.paths.get(name).map_or(0, Vec::len)
    }

    pub fn lookup(&self, name: &str, policy: DuplicatePolicy) -> SceneResult<&[usize]> {
        let paths = self
            .paths
            .get(name)
            .ok_or_else(|| SceneError::MissingNode(name.to_string()))?;

        match (paths.as_slice(), policy) {
            ([only], _) => Ok(only.as_slice()),
            ([first, ..], DuplicatePolicy::FirstMatch) => Ok(first.as_slice()),
            (all, DuplicatePolicy::Reject) => Err(SceneError::DuplicateNode {
                name: name.to_string(),
                count: all.len(),
            }),
            ([], DuplicatePolicy::FirstMatch) => Err(SceneError::MissingNode(name.to_string())),
        }
    }

    pub fn duplicates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .paths
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
