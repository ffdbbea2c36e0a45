use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i32,
    pub name: String,
    pub license_number: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub license_number: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}
