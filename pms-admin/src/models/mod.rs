pub mod group;
pub mod plan;
pub mod user;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub use group::{Group, GroupBody, GroupInput};
pub use plan::{BulkDeleteRequest, Plan, PlanBody, PlanInput};
pub use user::{
    CreateUserBody, CreateUserInput, SessionUser, UpdateUserBody, UpdateUserInput, User,
};

/// `{ "data": [...] }` wrapper used by every backend list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
}

/// Rejects empty and whitespace-only text, which `into_body` would trim to nothing.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A form that is validated locally before it becomes a request body.
pub trait FormInput: Validate {
    type Body: Serialize + Send + Sync;

    fn into_body(self) -> Self::Body;

    /// Validate, then convert. Invalid input never reaches the backend.
    fn validated(self) -> Result<Self::Body, ValidationErrors>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self.into_body())
    }
}
