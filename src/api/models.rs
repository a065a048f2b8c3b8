use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DepartmentsQuery {
    #[serde(default)]
    pub school: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartmentsResponse {
    pub school: String,
    pub departments: Vec<String>,
}
