//! Admin resources: the backend collection each screen edits and the menu pair
//! that gates it.

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{
    CreateUserInput, FormInput, Group, Plan, PlanInput, UpdateUserInput, User,
};

pub trait AdminResource: Send + Sync + 'static {
    /// Collection name under `/api/`.
    const NAME: &'static str;
    const MAIN_MENU: &'static str;
    const SUB_MENU: &'static str;

    type Item: DeserializeOwned + Serialize + Send;
}

/// A resource with plain create/update forms.
pub trait EditableResource: AdminResource {
    type Create: FormInput + DeserializeOwned + Send;
    type Update: FormInput + DeserializeOwned + Send;
}

pub struct Plans;

impl AdminResource for Plans {
    const NAME: &'static str = "plans";
    const MAIN_MENU: &'static str = "Billing";
    const SUB_MENU: &'static str = "Plans";
    type Item = Plan;
}

impl EditableResource for Plans {
    type Create = PlanInput;
    type Update = PlanInput;
}

pub struct Users;

impl AdminResource for Users {
    const NAME: &'static str = "users";
    const MAIN_MENU: &'static str = "Team";
    const SUB_MENU: &'static str = "Users";
    type Item = User;
}

impl EditableResource for Users {
    type Create = CreateUserInput;
    type Update = UpdateUserInput;
}

/// Groups are created and updated through the permission matrix.
pub struct Groups;

impl AdminResource for Groups {
    const NAME: &'static str = "groups";
    const MAIN_MENU: &'static str = "Team";
    const SUB_MENU: &'static str = "Groups";
    type Item = Group;
}
