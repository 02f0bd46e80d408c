//! Material assignment over a loaded hierarchy.
//!
//! Binding happens in two passes. The traversal pass walks the hierarchy in
//! pre-order, gives every node the default material and then lets each
//! matching rule override it in declaration order. The override pass then
//! force-assigns dedicated materials to exactly named nodes. Overrides always
//! win over traversal rules.

use crate::error::SceneResult;
use crate::scene::index::{DuplicatePolicy, NodeIndex};
use crate::scene::material::MaterialDescriptor;
use crate::scene::node::{NodePath, SceneNode};
use std::{collections::HashMap, sync::Arc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamePredicate {
    Any,
    Contains(String),
    Exact(String),
}

impl NamePredicate {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Contains(marker) => name.contains(marker.as_str()),
            Self::Exact(expected) => name == expected,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BindingRule {
    pub predicate: NamePredicate,
    pub material: Arc<MaterialDescriptor>,
}

#[derive(Clone, Debug)]
pub struct NamedOverride {
    pub node: String,
    pub material: Arc<MaterialDescriptor>,
}

/// Ordered rules, forced overrides and structural names for one model.
///
/// A plan always starts with an unconditional rule, so every visited node
/// ends up with exactly one material.
#[derive(Clone, Debug)]
pub struct BindingPlan {
    rules: Vec<BindingRule>,
    overrides: Vec<NamedOverride>,
    structural: Vec<String>,
    duplicates: DuplicatePolicy,
}

impl BindingPlan {
    pub fn new(default: Arc<MaterialDescriptor>) -> Self {
        Self {
            rules: vec![BindingRule {
                predicate: NamePredicate::Any,
                material: default,
            }],
            overrides: Vec::new(),
            structural: Vec::new(),
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn rule(mut self, predicate: NamePredicate, material: Arc<MaterialDescriptor>) -> Self {
        self.rules.push(BindingRule {
            predicate,
            material,
        });
        self
    }

    pub fn override_node(mut self, node: &str, material: Arc<MaterialDescriptor>) -> Self {
        self.overrides.push(NamedOverride {
            node: node.to_string(),
            material,
        });
        self
    }

    pub fn structural(mut self, names: &[&str]) -> Self {
        self.structural
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn rules(&self) -> &[BindingRule] {
        &self.rules
    }

    pub fn overrides(&self) -> &[NamedOverride] {
        &self.overrides
    }

    fn baseline(&self) -> usize {
        self.rules
            .iter()
            .position(|rule| rule.predicate == NamePredicate::Any)
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingReport {
    pub visited: usize,
    pub rule_overrides: usize,
    pub forced_overrides: usize,
    pub missing_structural: Vec<String>,
}

#[derive(Debug)]
pub struct BoundScene {
    root: SceneNode,
    index: NodeIndex,
    structural: HashMap<String, NodePath>,
    report: BindingReport,
}

impl BoundScene {
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    pub fn report(&self) -> &BindingReport {
        &self.report
    }

    pub fn structural_node(&self, name: &str) -> Option<&SceneNode> {
        self.structural
            .get(name)
            .and_then(|path| self.root.node_at(path))
    }

    pub fn into_root(self) -> SceneNode {
        self.root
    }
}

pub struct SceneBinder {
    plan: BindingPlan,
}

impl SceneBinder {
    pub fn new(plan: BindingPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &BindingPlan {
        &self.plan
    }

    /// Assigns materials in place.
    ///
    /// Every forced override is looked up before any slot changes, so on
    /// error the hierarchy is left exactly as loaded.
    pub fn apply(&self, root: &mut SceneNode, index: &NodeIndex) -> SceneResult<BindingReport> {
        let forced = self
            .plan
            .overrides
            .iter()
            .map(|o| {
                index
                    .lookup(&o.node, self.plan.duplicates)
                    .map(|path| (path.to_vec(), Arc::clone(&o.material)))
            })
            .collect::<SceneResult<Vec<_>>>()?;

        let mut report = BindingReport::default();
        let baseline = self.plan.baseline();
        let rules = &self.plan.rules;

        root.visit_mut(&mut |node| {
            report.visited += 1;
            let mut chosen = &rules[baseline];
            for (i, rule) in rules.iter().enumerate() {
                if i != baseline && rule.predicate.matches(&node.name) {
                    chosen = rule;
                }
            }
            if !Arc::ptr_eq(&chosen.material, &rules[baseline].material) {
                report.rule_overrides += 1;
            }
            node.assign(Arc::clone(&chosen.material));
        });

        for (path, material) in forced {
            if let Some(node) = root.node_at_mut(&path) {
                log::debug!("`{}` -> `{}`", node.name, material.name);
                node.assign(material);
                report.forced_overrides += 1;
            }
        }

        for name in &self.plan.structural {
            if !index.contains(name) {
                log::warn!("structural node `{name}` not present in model");
                report.missing_structural.push(name.clone());
            }
        }

        Ok(report)
    }

    pub fn bind(&self, mut root: SceneNode) -> SceneResult<BoundScene> {
        let index = NodeIndex::build(&root);
        for name in index.duplicates() {
            log::warn!(
                "model has {} nodes named `{name}`",
                index.occurrences(name)
            );
        }

        let report = self.apply(&mut root, &index)?;
        log::info!(
            "bound {} nodes: {} rule overrides, {} forced overrides",
            report.visited,
            report.rule_overrides,
            report.forced_overrides
        );

        let structural = self
            .plan
            .structural
            .iter()
            .filter_map(|name| {
                index
                    .lookup(name, DuplicatePolicy::FirstMatch)
                    .ok()
                    .map(|path| (name.clone(), path.to_vec()))
            })
            .collect();

        Ok(BoundScene {
            root,
            index,
            structural,
            report,
        })
    }
}
