// 🏢 Organization - departments and the employees who submit expenses

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: i64,
    pub department_name: String,
}

/// Employee - belongs to exactly one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub full_name: String,

    /// References Department.department_id (not enforced)
    pub department_id: i64,
}
