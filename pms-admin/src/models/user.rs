use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, FormInput};
use crate::permissions::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Account as reported by the authentication provider at sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group_id: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.email.split('@').next().unwrap_or("User")
        } else {
            &self.name
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Body of `POST /api/users`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl FormInput for CreateUserInput {
    type Body = CreateUserBody;

    fn into_body(self) -> CreateUserBody {
        CreateUserBody {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            role: self.role,
            group_id: self.group_id.filter(|id| !id.is_empty()),
        }
    }
}

/// Email and password cannot be changed through an update.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Body of `PUT /api/users/:id`. `groupId` is always sent; `null` unassigns.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub name: String,
    pub role: Role,
    pub group_id: Option<String>,
}

impl FormInput for UpdateUserInput {
    type Body = UpdateUserBody;

    fn into_body(self) -> UpdateUserBody {
        UpdateUserBody {
            name: self.name.trim().to_string(),
            role: self.role,
            group_id: self.group_id.filter(|id| !id.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_core::error::validation_messages;

    fn create_input(email: &str, password: &str) -> CreateUserInput {
        CreateUserInput {
            name: "Ana Front".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::User,
            group_id: None,
        }
    }

    #[test]
    fn create_body_omits_missing_group() {
        let body = create_input("ana@hotel.test", "s3cret-pass").validated().unwrap();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "name": "Ana Front",
                "email": "ana@hotel.test",
                "password": "s3cret-pass",
                "role": "user"
            })
        );
    }

    #[test]
    fn create_rejects_bad_email_and_short_password() {
        let errors = create_input("not-an-email", "short").validated().unwrap_err();
        let messages = validation_messages(&errors);
        assert!(messages.contains(&"Enter a valid email address".to_string()));
        assert!(messages.contains(&"Password must be at least 8 characters".to_string()));
    }

    #[test]
    fn update_body_sends_null_group() {
        let input = UpdateUserInput {
            name: "Ana".to_string(),
            role: Role::Admin,
            group_id: Some(String::new()),
        };
        let body = input.validated().unwrap();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "name": "Ana", "role": "admin", "groupId": null })
        );
    }

    #[test]
    fn whitespace_names_are_rejected() {
        let mut create = create_input("ana@hotel.test", "s3cret-pass");
        create.name = "  ".to_string();
        let messages = validation_messages(&create.validated().unwrap_err());
        assert_eq!(messages, vec!["Name is required".to_string()]);

        let update = UpdateUserInput {
            name: "\t".to_string(),
            role: Role::User,
            group_id: None,
        };
        assert!(update.validated().is_err());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = SessionUser {
            id: "u-1".to_string(),
            name: String::new(),
            email: "night.audit@hotel.test".to_string(),
            role: Role::User,
            group_id: None,
        };
        assert_eq!(user.display_name(), "night.audit");
    }
}
