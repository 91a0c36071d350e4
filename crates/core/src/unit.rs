//! The `Unit` entity.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{ClassId, UnitId};

/// A unit: the sole resource owned by this service, scoped to exactly one class.
///
/// # Invariants
/// - `class_id` never changes after creation (no setter exists).
/// - `title` is the only mutable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    class_id: ClassId,
    title: String,
}

impl Unit {
    pub fn new(id: UnitId, class_id: ClassId, title: impl Into<String>) -> Self {
        Self {
            id,
            class_id,
            title: title.into(),
        }
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
