use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::FormInput;

/// Subscription price band: each room in `from_rooms..=to_rooms` costs `rate_per_room`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub from_rooms: u32,
    pub to_rooms: u32,
    pub rate_per_room: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Plan form as submitted; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_room_range"))]
pub struct PlanInput {
    #[validate(
        required(message = "From rooms is required"),
        range(min = 1, message = "From rooms must be at least 1")
    )]
    pub from_rooms: Option<u32>,

    #[validate(
        required(message = "To rooms is required"),
        range(min = 1, message = "To rooms must be at least 1")
    )]
    pub to_rooms: Option<u32>,

    #[validate(
        required(message = "Rate per room is required"),
        range(min = 0.0, message = "Rate per room must be >= 0")
    )]
    pub rate_per_room: Option<f64>,
}

fn validate_room_range(input: &PlanInput) -> Result<(), ValidationError> {
    match (input.from_rooms, input.to_rooms) {
        (Some(from), Some(to)) if to < from => Err(ValidationError::new("room_range")
            .with_message(Cow::Borrowed("To rooms must be >= From rooms"))),
        _ => Ok(()),
    }
}

/// Body of `POST /api/plans` and `PUT /api/plans/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBody {
    pub from_rooms: u32,
    pub to_rooms: u32,
    pub rate_per_room: f64,
}

impl FormInput for PlanInput {
    type Body = PlanBody;

    fn into_body(self) -> PlanBody {
        PlanBody {
            from_rooms: self.from_rooms.unwrap_or_default(),
            to_rooms: self.to_rooms.unwrap_or_default(),
            rate_per_room: self.rate_per_room.unwrap_or_default(),
        }
    }
}

/// Selected plan ids for `POST /api/plans/bulk-delete`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "Select at least one plan"))]
    pub ids: Vec<String>,
}
