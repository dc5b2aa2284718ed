use serde::{Deserialize, Serialize};

/// Account role. Anything the backend sends that is not `admin` is treated as `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// One of the three per-submenu actions a group can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Add,
    Change,
    Delete,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Add => "add",
            Capability::Change => "change",
            Capability::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionFlags {
    #[serde(default)]
    pub add: bool,
    #[serde(default)]
    pub change: bool,
    #[serde(default)]
    pub delete: bool,
}

impl PermissionFlags {
    pub const NONE: Self = Self {
        add: false,
        change: false,
        delete: false,
    };

    pub const ALL: Self = Self {
        add: true,
        change: true,
        delete: true,
    };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }

    pub fn is_full(self) -> bool {
        self == Self::ALL
    }

    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Add => self.add,
            Capability::Change => self.change,
            Capability::Delete => self.delete,
        }
    }

    pub fn toggled(self, capability: Capability) -> Self {
        let mut flags = self;
        match capability {
            Capability::Add => flags.add = !flags.add,
            Capability::Change => flags.change = !flags.change,
            Capability::Delete => flags.delete = !flags.delete,
        }
        flags
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            add: self.add || other.add,
            change: self.change || other.change,
            delete: self.delete || other.delete,
        }
    }
}

/// Composite key of a catalog pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuKey {
    pub main_menu: String,
    pub sub_menu: String,
}

impl MenuKey {
    pub fn new(main_menu: impl Into<String>, sub_menu: impl Into<String>) -> Self {
        Self {
            main_menu: main_menu.into(),
            sub_menu: sub_menu.into(),
        }
    }
}

/// A group's grant for one submenu, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    pub main_menu: String,
    pub sub_menu: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub can_add: bool,
    #[serde(default)]
    pub can_change: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl PermissionRecord {
    pub fn new(key: MenuKey, url: impl Into<String>, flags: PermissionFlags) -> Self {
        Self {
            main_menu: key.main_menu,
            sub_menu: key.sub_menu,
            url: url.into(),
            can_add: flags.add,
            can_change: flags.change,
            can_delete: flags.delete,
        }
    }

    pub fn key(&self) -> MenuKey {
        MenuKey::new(self.main_menu.clone(), self.sub_menu.clone())
    }

    pub fn flags(&self) -> PermissionFlags {
        PermissionFlags {
            add: self.can_add,
            change: self.can_change,
            delete: self.can_delete,
        }
    }
}

/// Effective permissions of the signed-in account, as resolved by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPermissions {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub menus: Vec<MenuPermissions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPermissions {
    pub main_menu: String,
    #[serde(rename = "sub_menu", default)]
    pub sub_menus: Vec<SubMenuPermissions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMenuPermissions {
    pub menu_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub permissions: PermissionFlags,
}
