//! Locator transforms sharing a base name are numbered 1..n

use crate::naming::{canonical_ls, rebase_all, sequence_order};
use crate::result::Finding;
use crate::types::{Capabilities, Category, CheckMeta};
use crate::unit::{Evaluation, FixTally, Rule};
use scenecheck_core::{DagPath, NodeName, Result};
use scenecheck_scene::{NodeKind, SceneGraph};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

const META: CheckMeta = CheckMeta {
    id: "unique_names",
    name: "Unique locator names",
    category: Category::Scene,
    capabilities: Capabilities::new(true, true),
};

/// Locator transforms grouped by base name must be uniquely named and
/// carry the suffixes `1..=n`, zero-padded to the configured width
pub struct UniqueNames {
    width: usize,
}

impl UniqueNames {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Locator transforms grouped by parsed base name, each group in
    /// renumbering order
    fn groups(scene: &dyn SceneGraph) -> BTreeMap<String, Vec<(DagPath, NodeName)>> {
        let mut groups: BTreeMap<String, Vec<(DagPath, NodeName)>> = BTreeMap::new();
        for shape in canonical_ls(scene, NodeKind::Locator) {
            let Some(transform) = shape.parent() else {
                continue;
            };
            let Ok(name) = NodeName::parse(transform.leaf()) else {
                continue;
            };
            let group = groups.entry(name.base().to_string()).or_default();
            if !group.iter().any(|(p, _)| *p == transform) {
                group.push((transform, name));
            }
        }
        for members in groups.values_mut() {
            members.sort_by(|a, b| sequence_order(&a.0, &b.0));
        }
        groups
    }

    fn is_offending(&self, members: &[(DagPath, NodeName)]) -> bool {
        if members.len() == 1 && members[0].1.suffix().is_none() {
            return false;
        }
        let mut seen = HashSet::new();
        if !members.iter().all(|(p, _)| seen.insert(p.leaf())) {
            return true;
        }
        let mut suffixes: Vec<u64> = Vec::with_capacity(members.len());
        for (_, name) in members {
            match name.suffix() {
                Some(n) if name.is_padded_to(self.width) => suffixes.push(n),
                _ => return true,
            }
        }
        suffixes.sort_unstable();
        !suffixes.iter().copied().eq(1..=members.len() as u64)
    }
}

impl Rule for UniqueNames {
    type Plan = ();

    fn meta(&self) -> CheckMeta {
        META
    }

    fn evaluate(&self, scene: &dyn SceneGraph) -> Result<Evaluation<()>> {
        let mut findings = Vec::new();
        for (base, members) in Self::groups(scene) {
            if !self.is_offending(&members) {
                continue;
            }
            for (path, _) in members {
                let detail = format!("{} is not uniquely numbered among '{}' locators", path, base);
                findings.push(Finding::new(path, detail));
            }
        }
        Ok(Evaluation::findings(findings))
    }

    fn summary(&self, count: usize) -> String {
        format!("{} are non unique", count)
    }

    /// Renumbers each offending group in two passes through temporary names,
    /// so members can trade names without colliding with each other.
    fn repair(
        &self,
        scene: &mut dyn SceneGraph,
        offenders: &[DagPath],
        _plan: &(),
    ) -> Result<FixTally> {
        let mut tally = FixTally::default();

        let mut groups: BTreeMap<String, Vec<(DagPath, NodeName)>> = BTreeMap::new();
        for path in offenders {
            if !scene.exists(path) {
                tally.skip(META.id, path, "node no longer exists");
                continue;
            }
            let name = NodeName::parse(path.leaf())?;
            groups
                .entry(name.base().to_string())
                .or_default()
                .push((path.clone(), name));
        }

        // (current path, original name, target name)
        let mut queue: Vec<(DagPath, String, String)> = Vec::new();
        for members in groups.values_mut() {
            members.sort_by(|a, b| sequence_order(&a.0, &b.0));
            for (i, (path, name)) in members.iter().enumerate() {
                let target = name.with_suffix(i as u64 + 1, self.width).to_string();
                if path.leaf() == target {
                    continue;
                }
                queue.push((path.clone(), path.leaf().to_string(), target));
            }
        }

        // a target held by a node that is not moving blocks only that member
        loop {
            let batch: Vec<DagPath> = queue.iter().map(|(p, _, _)| p.clone()).collect();
            let before = queue.len();
            queue.retain(|(path, _, target)| {
                let blocked = path
                    .with_leaf(target)
                    .map(|t| scene.exists(&t) && !batch.contains(&t))
                    .unwrap_or(true);
                if blocked {
                    tally.skip(META.id, path, &format!("'{}' already exists", target));
                }
                !blocked
            });
            if queue.len() == before {
                break;
            }
        }

        // pass 1: move every member out of the way
        let mut parked: Vec<(DagPath, String, String)> = Vec::with_capacity(queue.len());
        for i in 0..queue.len() {
            let (path, original, target) = queue[i].clone();
            let temp = format!("{}_renumber_tmp{}", original, i);
            match scene.rename(&path, &temp) {
                Ok(moved) => {
                    rebase_all(queue[i + 1..].iter_mut().map(|q| &mut q.0), &path, &moved);
                    rebase_all(parked.iter_mut().map(|q| &mut q.0), &path, &moved);
                    parked.push((moved, original, target));
                }
                Err(e) => tally.record(META.id, &path, Err(e))?,
            }
        }

        // pass 2: settle on the targets, falling back to the original name
        for i in 0..parked.len() {
            let (path, original, target) = parked[i].clone();
            let renamed = match scene.rename(&path, &target) {
                Ok(new_path) => {
                    info!(check = META.id, from = %original, to = %new_path, "renumbered");
                    tally.applied();
                    new_path
                }
                Err(e) if e.is_element_failure() => {
                    tally.skip(META.id, &path, &e.to_string());
                    match scene.rename(&path, &original) {
                        Ok(restored) => restored,
                        Err(e) => {
                            warn!(check = META.id, node = %path, error = %e, "could not restore name");
                            continue;
                        }
                    }
                }
                Err(e) => return Err(e),
            };
            rebase_all(parked[i + 1..].iter_mut().map(|q| &mut q.0), &path, &renamed);
        }

        Ok(tally)
    }
}
