//! Access decisions over a session's resolved permissions.
//!
//! All queries go through [`Resolver::resolve`], which holds the only admin
//! short-circuit; the boolean and flag helpers are projections of its answer.

use super::model::{Capability, PermissionFlags, SessionPermissions};

/// Outcome of a single access query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No data, or the menu is not listed for this account.
    Denied,
    /// Admin override: everything is granted.
    Universal,
    /// Listed for this account with these action flags.
    Granted(PermissionFlags),
}

impl Access {
    pub fn is_visible(self) -> bool {
        !matches!(self, Access::Denied)
    }

    pub fn flags(self) -> PermissionFlags {
        match self {
            Access::Denied => PermissionFlags::NONE,
            Access::Universal => PermissionFlags::ALL,
            Access::Granted(flags) => flags,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    data: Option<&'a SessionPermissions>,
}

impl<'a> Resolver<'a> {
    pub fn new(data: Option<&'a SessionPermissions>) -> Self {
        Self { data }
    }

    /// Resolve access to a main menu, or to one of its sub menus when `sub_menu` is given.
    ///
    /// A main menu without a sub menu argument is granted the union of its
    /// listed sub menus' flags, and is denied when it lists none.
    pub fn resolve(&self, main_menu: &str, sub_menu: Option<&str>) -> Access {
        let Some(data) = self.data else {
            return Access::Denied;
        };

        if data.role.is_admin() {
            return Access::Universal;
        }

        let Some(menu) = data.menus.iter().find(|m| m.main_menu == main_menu) else {
            return Access::Denied;
        };

        match sub_menu {
            Some(sub_menu) => menu
                .sub_menus
                .iter()
                .find(|s| s.menu_name == sub_menu)
                .map(|s| Access::Granted(s.permissions))
                .unwrap_or(Access::Denied),
            None if menu.sub_menus.is_empty() => Access::Denied,
            None => Access::Granted(
                menu.sub_menus
                    .iter()
                    .fold(PermissionFlags::NONE, |acc, s| acc.union(s.permissions)),
            ),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.data.is_some_and(|d| d.role.is_admin())
    }

    pub fn has_menu_access(&self, main_menu: &str, sub_menu: Option<&str>) -> bool {
        self.resolve(main_menu, sub_menu).is_visible()
    }

    pub fn get_permissions(&self, main_menu: &str, sub_menu: &str) -> PermissionFlags {
        self.resolve(main_menu, Some(sub_menu)).flags()
    }

    /// `None` asks for visibility only.
    pub fn allows(&self, main_menu: &str, sub_menu: &str, capability: Option<Capability>) -> bool {
        let access = self.resolve(main_menu, Some(sub_menu));
        match capability {
            None => access.is_visible(),
            Some(capability) => access.flags().allows(capability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MenuCatalog;
    use crate::permissions::model::{MenuPermissions, Role, SubMenuPermissions};

    fn team_users_add(role: Role) -> SessionPermissions {
        SessionPermissions {
            role,
            group_id: Some("g-1".to_string()),
            group_name: Some("Front desk".to_string()),
            menus: vec![MenuPermissions {
                main_menu: "Team".to_string(),
                sub_menus: vec![SubMenuPermissions {
                    menu_name: "Users".to_string(),
                    url: None,
                    permissions: PermissionFlags {
                        add: true,
                        change: false,
                        delete: false,
                    },
                }],
            }],
        }
    }

    #[test]
    fn user_scenario() {
        let data = team_users_add(Role::User);
        let resolver = Resolver::new(Some(&data));

        assert!(!resolver.is_admin());
        assert!(resolver.has_menu_access("Team", None));
        assert!(resolver.has_menu_access("Team", Some("Users")));
        assert!(!resolver.has_menu_access("Team", Some("Groups")));
        assert!(!resolver.has_menu_access("Billing", None));
        assert_eq!(
            resolver.get_permissions("Team", "Users"),
            PermissionFlags {
                add: true,
                change: false,
                delete: false
            }
        );
        assert_eq!(
            resolver.get_permissions("Team", "Groups"),
            PermissionFlags::NONE
        );
    }

    #[test]
    fn admin_is_granted_every_catalog_pair() {
        let data = team_users_add(Role::Admin);
        let resolver = Resolver::new(Some(&data));
        let catalog = MenuCatalog::standard();

        assert!(resolver.is_admin());
        for (main, sub) in catalog.pairs() {
            assert!(resolver.has_menu_access(&main.main_menu, None));
            assert!(resolver.has_menu_access(&main.main_menu, Some(&sub.title)));
            assert_eq!(
                resolver.get_permissions(&main.main_menu, &sub.title),
                PermissionFlags::ALL
            );
        }
    }

    #[test]
    fn no_data_denies_everything() {
        let resolver = Resolver::new(None);
        assert!(!resolver.is_admin());
        assert!(!resolver.has_menu_access("Team", None));
        assert!(!resolver.has_menu_access("Team", Some("Users")));
        assert_eq!(
            resolver.get_permissions("Team", "Users"),
            PermissionFlags::NONE
        );
    }

    #[test]
    fn main_menu_access_matches_any_sub_menu_access() {
        let mut data = team_users_add(Role::User);
        data.menus.push(MenuPermissions {
            main_menu: "Billing".to_string(),
            sub_menus: Vec::new(),
        });
        let resolver = Resolver::new(Some(&data));
        let catalog = MenuCatalog::standard();

        for entry in catalog.entries() {
            let any_sub = entry
                .sub_menus
                .iter()
                .any(|s| resolver.has_menu_access(&entry.main_menu, Some(&s.title)));
            assert_eq!(
                resolver.has_menu_access(&entry.main_menu, None),
                any_sub,
                "{}",
                entry.main_menu
            );
        }
    }

    #[test]
    fn allows_checks_the_requested_action() {
        let data = team_users_add(Role::User);
        let resolver = Resolver::new(Some(&data));

        assert!(resolver.allows("Team", "Users", None));
        assert!(resolver.allows("Team", "Users", Some(Capability::Add)));
        assert!(!resolver.allows("Team", "Users", Some(Capability::Delete)));
        assert!(!resolver.allows("Team", "Groups", None));
    }
}
