//! Sidebar menu filtering.

use serde::Serialize;

use crate::catalog::{MenuCatalog, MenuCatalogEntry, SubMenuEntry};
use crate::permissions::PermissionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub url: String,
}

impl From<&SubMenuEntry> for MenuItem {
    fn from(entry: &SubMenuEntry) -> Self {
        Self {
            title: entry.title.clone(),
            url: entry.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub title: String,
    pub expanded: bool,
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    fn new(catalog: &MenuCatalog, entry: &MenuCatalogEntry, items: Vec<MenuItem>) -> Self {
        Self {
            title: entry.main_menu.clone(),
            expanded: catalog.is_home(&entry.main_menu),
            items,
        }
    }
}

/// The menu groups this account may see, in catalog order.
///
/// Nothing is returned while permissions are loading, so a half-resolved menu is
/// never rendered.
pub fn filter_menu(catalog: &MenuCatalog, permissions: &PermissionSnapshot) -> Vec<MenuGroup> {
    if permissions.is_loading() {
        return Vec::new();
    }

    let resolver = permissions.resolver();

    if resolver.is_admin() {
        return catalog
            .entries()
            .iter()
            .map(|entry| {
                MenuGroup::new(
                    catalog,
                    entry,
                    entry.sub_menus.iter().map(MenuItem::from).collect(),
                )
            })
            .collect();
    }

    catalog
        .entries()
        .iter()
        .filter(|entry| resolver.has_menu_access(&entry.main_menu, None))
        .filter_map(|entry| {
            let items: Vec<MenuItem> = entry
                .sub_menus
                .iter()
                .filter(|sub| resolver.has_menu_access(&entry.main_menu, Some(&sub.title)))
                .map(MenuItem::from)
                .collect();

            (!items.is_empty()).then(|| MenuGroup::new(catalog, entry, items))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{
        LoadPhase, MenuPermissions, PermissionFlags, Role, SessionPermissions,
        SubMenuPermissions,
    };

    fn menu(main: &str, subs: &[&str]) -> MenuPermissions {
        MenuPermissions {
            main_menu: main.to_string(),
            sub_menus: subs
                .iter()
                .map(|s| SubMenuPermissions {
                    menu_name: s.to_string(),
                    url: None,
                    permissions: PermissionFlags::NONE,
                })
                .collect(),
        }
    }

    fn ready(role: Role, menus: Vec<MenuPermissions>) -> PermissionSnapshot {
        PermissionSnapshot::new(
            LoadPhase::Ready,
            Some(SessionPermissions {
                role,
                group_id: None,
                group_name: None,
                menus,
            }),
        )
    }

    fn titles(groups: &[MenuGroup]) -> Vec<(&str, Vec<&str>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.title.as_str(),
                    g.items.iter().map(|i| i.title.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn loading_yields_nothing_even_for_admin() {
        let snapshot = PermissionSnapshot::new(
            LoadPhase::Loading,
            Some(SessionPermissions {
                role: Role::Admin,
                ..Default::default()
            }),
        );
        assert!(filter_menu(&MenuCatalog::standard(), &snapshot).is_empty());
    }

    #[test]
    fn failed_fetch_yields_nothing() {
        let snapshot = PermissionSnapshot::new(LoadPhase::Ready, None);
        assert!(filter_menu(&MenuCatalog::standard(), &snapshot).is_empty());
    }

    #[test]
    fn admin_sees_whole_catalog_with_home_expanded() {
        let catalog = MenuCatalog::standard();
        let groups = filter_menu(&catalog, &ready(Role::Admin, Vec::new()));

        assert_eq!(groups.len(), catalog.entries().len());
        for (group, entry) in groups.iter().zip(catalog.entries()) {
            assert_eq!(group.title, entry.main_menu);
            assert_eq!(group.items.len(), entry.sub_menus.len());
            assert_eq!(group.expanded, entry.main_menu == "Dashboard");
        }
    }

    #[test]
    fn user_sees_catalog_order_not_permission_order() {
        let snapshot = ready(
            Role::User,
            vec![
                menu("Team", &["Groups", "Users"]),
                menu("Dashboard", &["Reports"]),
            ],
        );
        let groups = filter_menu(&MenuCatalog::standard(), &snapshot);

        assert_eq!(
            titles(&groups),
            vec![("Dashboard", vec!["Reports"]), ("Team", vec!["Users", "Groups"])]
        );
        assert!(groups[0].expanded);
        assert!(!groups[1].expanded);
    }

    #[test]
    fn entries_outside_the_catalog_are_ignored() {
        let snapshot = ready(
            Role::User,
            vec![
                menu("Housekeeping", &["Tasks"]),
                menu("Billing", &["Refunds"]),
                menu("Billing", &["Plans"]),
            ],
        );
        let groups = filter_menu(&MenuCatalog::standard(), &snapshot);

        // "Billing" matches the first listing, whose only sub menu is unknown.
        assert!(groups.is_empty());
    }

    #[test]
    fn output_is_a_subsequence_of_the_catalog() {
        let catalog = MenuCatalog::standard();
        let snapshot = ready(
            Role::User,
            vec![
                menu("Settings", &["Languages"]),
                menu("Billing", &["Invoices", "Plans"]),
                menu("Reservations", &["Guests", "Bookings"]),
            ],
        );
        let groups = filter_menu(&catalog, &snapshot);

        let mut entries = catalog.entries().iter();
        for group in &groups {
            let entry = entries
                .by_ref()
                .find(|e| e.main_menu == group.title)
                .expect("group must appear in catalog order");
            let mut subs = entry.sub_menus.iter();
            for item in &group.items {
                assert!(subs.by_ref().any(|s| s.title == item.title && s.url == item.url));
            }
        }
        assert_eq!(groups.len(), 3);
    }
}
