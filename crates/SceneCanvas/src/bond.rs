//! # Bond Graph
//!
//! Bonds relate two objects. Each bond is stored on its source only; the mirror is
//! a separate bond stored on the target. Two bonds are equal when they are the same
//! triple or each other's mirror, so a bond can be removed from either side by
//! passing the same value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::model::{ObjectId, SceneState};

/// How the source relates to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Source is the parent of target (`-->`).
    ParentOf,
    /// Source is a child of target (`<--`).
    ChildOf,
    /// Undirected connection (`--`).
    ConnectedWith,
}

impl Relation {
    pub fn reverse(self) -> Self {
        match self {
            Self::ParentOf => Self::ChildOf,
            Self::ChildOf => Self::ParentOf,
            Self::ConnectedWith => Self::ConnectedWith,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::ParentOf => "-->",
            Self::ChildOf => "<--",
            Self::ConnectedWith => "--",
        }
    }
}

/// A relation owned by `source`.
#[derive(Clone, Copy, Debug, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub source: ObjectId,
    pub relation: Relation,
    pub target: ObjectId,
}

impl Bond {
    pub fn new(source: ObjectId, relation: Relation, target: ObjectId) -> Self {
        Self {
            source,
            relation,
            target,
        }
    }

    /// The same relation seen from the target.
    pub fn mirror(&self) -> Self {
        Self::new(self.target, self.relation.reverse(), self.source)
    }
}

impl PartialEq for Bond {
    fn eq(&self, other: &Self) -> bool {
        let same = self.source == other.source
            && self.relation == other.relation
            && self.target == other.target;
        let crossed = self.source == other.target
            && self.target == other.source
            && self.relation == other.relation.reverse();
        same || crossed
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {} {:?}",
            self.source,
            self.relation.symbol(),
            self.target
        )
    }
}

/// Adds a bond to `source`, and its mirror to `target` when `mirror` is set.
///
/// Adding a bond that is already owned is a no-op.
pub fn add_bond(
    scene: &mut SceneState,
    source: ObjectId,
    relation: Relation,
    target: ObjectId,
    mirror: bool,
) -> Result<()> {
    if source == target {
        return Err(SceneError::SelfBond(scene.object(source)?.tag.clone()));
    }
    scene.object(target)?;

    let bond = Bond::new(source, relation, target);
    let owner = scene.object_mut(source)?;
    if owner.bonds.contains(&bond) {
        tracing::debug!(owner = %owner.tag, %bond, "bond already present");
    } else {
        owner.bonds.push(bond);
    }

    if mirror {
        add_bond(scene, target, relation.reverse(), source, false)?;
    }
    Ok(())
}

/// Removes a bond (or its mirror) from `source`'s own set.
pub fn remove_bond(scene: &mut SceneState, source: ObjectId, bond: &Bond) -> Result<()> {
    let owner = scene.object_mut(source)?;
    match owner.bonds.iter().position(|owned| owned == bond) {
        Some(index) => {
            owner.bonds.remove(index);
            Ok(())
        }
        None => Err(SceneError::BondNotOwned {
            owner: owner.tag.clone(),
            bond: bond.to_string(),
        }),
    }
}

/// Severs every bond `id` owns, including the mirrors held by its neighbours.
///
/// Must run before the object leaves the scene. A neighbour missing the mirror means
/// the graph is corrupt and fails fast.
pub fn delete_all_bonds(scene: &mut SceneState, id: ObjectId) -> Result<()> {
    let bonds = std::mem::take(&mut scene.object_mut(id)?.bonds);
    for bond in &bonds {
        remove_bond(scene, bond.target, bond)?;
    }
    Ok(())
}

/// The object (optionally) followed by every direct bond target, without repeats.
pub fn collect_reachable(
    scene: &SceneState,
    id: ObjectId,
    include_self: bool,
) -> Result<Vec<ObjectId>> {
    let object = scene.object(id)?;
    let mut reachable = Vec::with_capacity(object.bonds.len() + 1);
    if include_self {
        reachable.push(id);
    }
    for bond in &object.bonds {
        if !reachable.contains(&bond.target) {
            reachable.push(bond.target);
        }
    }
    Ok(reachable)
}

/// Objects `id` is a child of.
pub fn parents_of(scene: &SceneState, id: ObjectId) -> Result<Vec<ObjectId>> {
    targets_with(scene, id, Relation::ChildOf)
}

/// Objects `id` is the parent of.
pub fn children_of(scene: &SceneState, id: ObjectId) -> Result<Vec<ObjectId>> {
    targets_with(scene, id, Relation::ParentOf)
}

fn targets_with(scene: &SceneState, id: ObjectId, relation: Relation) -> Result<Vec<ObjectId>> {
    Ok(scene
        .object(id)?
        .bonds
        .iter()
        .filter(|bond| bond.relation == relation)
        .map(|bond| bond.target)
        .collect())
}
