use serde::{Deserialize, Serialize};

use unitsvc_core::{ClassId, Entity, Unit, UnitId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ListUnitsQuery {
    #[serde(rename = "classID")]
    pub class_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUnitRequest {
    pub class_id: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenameUnitRequest {
    pub title: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct UnitBody {
    pub id: UnitId,
    pub class_id: ClassId,
    pub title: String,
}

impl From<Unit> for UnitBody {
    fn from(unit: Unit) -> Self {
        Self {
            id: *unit.id(),
            class_id: unit.class_id(),
            title: unit.title().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnitResponse {
    pub unit: UnitBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListUnitsResponse {
    pub units: Vec<UnitId>,
}
