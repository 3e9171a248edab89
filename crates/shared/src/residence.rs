use serde::{Deserialize, Serialize};

/// Residential facility; the timezone drives all local-date arithmetic.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Residence {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "zonaHoraria")]
    pub timezone: String,
}
