//! # Errors
//!
//! Every fallible operation in the crate returns [`SceneError`]. Some variants are
//! recoverable refusals that the editor logs and turns into no-ops; the rest mean
//! the scene graph or its configuration is broken and the host should stop.

use thiserror::Error;

use crate::model::{ObjectId, ObjectTag, ShapeKind};

/// Errors raised by the scene core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// More objects are live than the id buffer can tell apart.
    #[error(
        "{count} objects exceed the id buffer capacity of {capacity}; remove objects or widen the id space"
    )]
    ConfigurationOverflow { count: usize, capacity: usize },
    /// Absolute position written while an anchor is assigned.
    #[error("cannot reposition anchored object {0}; clear the anchor or change its offset")]
    InvalidAnchorMutation(ObjectTag),
    /// The tag pool handed out a tag that is still live.
    #[error("object tag {0} is already assigned to a live object")]
    DuplicateIdentity(ObjectTag),
    /// All tags of the alphabet are in use.
    #[error("no free object tags left ({0} objects live)")]
    IdentityExhausted(usize),
    /// An interaction produced an object the editor has no handler for.
    #[error("interaction produced a {produced} object, which has no handler")]
    UnknownInteraction { produced: ShapeKind },
    /// The pair of objects cannot interact. Recoverable.
    #[error("{active} cannot interact with {other}")]
    UnsupportedInteractionPair { active: ShapeKind, other: ShapeKind },
    /// Assigning the anchor would make the object follow itself.
    #[error("anchoring {0} would create an anchor cycle")]
    AnchorCycle(ObjectTag),
    /// The bond is not in the owner's set.
    #[error("bond {bond} is not owned by {owner}")]
    BondNotOwned { owner: ObjectTag, bond: String },
    /// An object cannot bond with itself.
    #[error("object {0} cannot bond with itself")]
    SelfBond(ObjectTag),
    /// The handle does not point at a live object.
    #[error("object {0:?} is not in the scene")]
    UnknownObject(ObjectId),
    /// Connector thickness must be odd and at least 1.
    #[error("connector thickness must be an odd number >= 1, got {0}")]
    InvalidLineThickness(u32),
    /// Deletion attempted on an object flagged as non-deletable. Recoverable.
    #[error("object {0} is not deletable")]
    NotDeletable(ObjectTag),
    /// The optional id buffer sink failed. Never fatal to the tick.
    #[error("diagnostic sink failed: {0}")]
    DiagnosticSink(String),
}

impl SceneError {
    /// Returns true for refusals the editor turns into a logged no-op.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedInteractionPair { .. } | Self::NotDeletable(_) | Self::DiagnosticSink(_)
        )
    }
}

/// Crate-wide result alias.
pub type Result<T, E = SceneError> = std::result::Result<T, E>;
