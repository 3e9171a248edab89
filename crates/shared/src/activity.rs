use serde::{Deserialize, Serialize};
use time::Date;

/// Special activity occupying a date range for its participants.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "residenciaId")]
    pub residence_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "fechaInicio")]
    pub starts: Date,
    #[serde(rename = "fechaFin")]
    pub ends: Date,
    #[serde(rename = "activa")]
    pub active: bool,
}

impl Activity {
    pub fn covers(&self, date: Date) -> bool {
        self.starts <= date && date <= self.ends
    }
}

/// The unique alternative an activity imposes in place of the normal
/// meal slot for its participants on one date.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MealSubstitution {
    pub id: String,
    #[serde(rename = "actividadId")]
    pub activity_id: String,
    #[serde(rename = "fecha")]
    pub date: Date,
    #[serde(rename = "tiempoComidaId")]
    pub slot_id: String,
    #[serde(rename = "alternativaId")]
    pub alternative_id: String,
}

/// Links a user to an activity for specific dates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ActivityEnrollment {
    pub id: String,
    #[serde(rename = "actividadId")]
    pub activity_id: String,
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "fechas")]
    pub dates: Vec<Date>,
    #[serde(rename = "incluyeComidas")]
    pub meals_included: bool,
}
