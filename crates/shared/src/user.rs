use serde::{Deserialize, Serialize};
use time::Date;

/// Resident record, reduced to the fields the schedule engine reads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserRecord {
    pub id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "grupoId")]
    pub group_id: Option<String>,
    #[serde(rename = "activo")]
    pub active: bool,
}

/// Alternatives members of a user group may not choose.
///
/// The restriction is advisory: restricted alternatives stay visible and
/// flagged, enforcement happens at write time outside this engine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupRestriction {
    pub id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "grupoId")]
    pub group_id: String,
    #[serde(rename = "restriccionAlternativas")]
    pub restrict_alternatives: bool,
    #[serde(rename = "alternativasRestringidas")]
    pub alternative_ids: Vec<String>,
}

/// Date range during which a user is absent from all meals.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Absence {
    pub id: String,
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "fechaInicio")]
    pub starts: Date,
    #[serde(rename = "fechaFin")]
    pub ends: Date,
}

impl Absence {
    pub fn covers(&self, date: Date) -> bool {
        self.starts <= date && date <= self.ends
    }
}
