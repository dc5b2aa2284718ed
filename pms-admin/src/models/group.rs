use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;
use crate::matrix::PermissionMatrix;
use crate::permissions::PermissionRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionRecord>,
    #[serde(default)]
    pub user_count: u32,
}

/// Name and description submitted with a matrix save.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GroupInput {
    #[validate(custom(function = "not_blank", message = "Group name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl GroupInput {
    pub fn into_body(self, matrix: PermissionMatrix) -> GroupBody {
        GroupBody {
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            permissions: matrix.into_records(),
        }
    }
}

/// Body of `POST /api/groups` and `PUT /api/groups/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub permissions: Vec<PermissionRecord>,
}
