//! Menu catalog: the complete, ordered set of sidebar sections the console can expose.
//!
//! Every permission check is keyed by a `(main menu, sub menu)` pair from this
//! catalog. Permission data naming pairs outside it is kept but never rendered.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Main menu that starts expanded in the sidebar.
pub const HOME_MENU: &str = "Dashboard";

const STANDARD_CATALOG: &[(&str, &[(&str, &str)])] = &[
    (
        "Dashboard",
        &[("Overview", "/dashboard"), ("Reports", "/dashboard/reports")],
    ),
    (
        "Properties",
        &[("Properties", "/properties"), ("Rooms", "/properties/rooms")],
    ),
    (
        "Reservations",
        &[
            ("Bookings", "/reservations"),
            ("Calendar", "/reservations/calendar"),
            ("Guests", "/reservations/guests"),
        ],
    ),
    (
        "Billing",
        &[("Plans", "/billing/plans"), ("Invoices", "/billing/invoices")],
    ),
    ("Team", &[("Users", "/team/users"), ("Groups", "/team/groups")]),
    (
        "Settings",
        &[("General", "/settings"), ("Languages", "/settings/languages")],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubMenuEntry {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCatalogEntry {
    pub main_menu: String,
    pub sub_menus: Vec<SubMenuEntry>,
}

impl MenuCatalogEntry {
    pub fn new(main_menu: &str, sub_menus: &[(&str, &str)]) -> Self {
        Self {
            main_menu: main_menu.to_string(),
            sub_menus: sub_menus
                .iter()
                .map(|(title, url)| SubMenuEntry {
                    title: title.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }

    pub fn sub_menu(&self, title: &str) -> Option<&SubMenuEntry> {
        self.sub_menus.iter().find(|s| s.title == title)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("main menu '{0}' appears more than once")]
    DuplicateMainMenu(String),

    #[error("sub menu '{sub_menu}' appears more than once under '{main_menu}'")]
    DuplicateSubMenu { main_menu: String, sub_menu: String },

    #[error("home menu '{0}' is not in the catalog")]
    UnknownHome(String),
}

#[derive(Debug, Clone)]
pub struct MenuCatalog {
    entries: Vec<MenuCatalogEntry>,
    home: Option<String>,
}

impl MenuCatalog {
    /// Build a catalog, rejecting duplicate keys and an unknown home entry.
    pub fn new(entries: Vec<MenuCatalogEntry>, home: Option<&str>) -> Result<Self, CatalogError> {
        let mut seen_main = HashSet::new();
        for entry in &entries {
            if !seen_main.insert(entry.main_menu.as_str()) {
                return Err(CatalogError::DuplicateMainMenu(entry.main_menu.clone()));
            }

            let mut seen_sub = HashSet::new();
            for sub in &entry.sub_menus {
                if !seen_sub.insert(sub.title.as_str()) {
                    return Err(CatalogError::DuplicateSubMenu {
                        main_menu: entry.main_menu.clone(),
                        sub_menu: sub.title.clone(),
                    });
                }
            }
        }

        if let Some(home) = home {
            if !seen_main.contains(home) {
                return Err(CatalogError::UnknownHome(home.to_string()));
            }
        }

        Ok(Self {
            entries,
            home: home.map(str::to_string),
        })
    }

    /// The catalog shipped with the console.
    pub fn standard() -> Self {
        Self {
            entries: standard_entries(),
            home: Some(HOME_MENU.to_string()),
        }
    }

    pub fn entries(&self) -> &[MenuCatalogEntry] {
        &self.entries
    }

    pub fn is_home(&self, main_menu: &str) -> bool {
        self.home.as_deref() == Some(main_menu)
    }

    pub fn find(&self, main_menu: &str) -> Option<&MenuCatalogEntry> {
        self.entries.iter().find(|e| e.main_menu == main_menu)
    }

    pub fn contains(&self, main_menu: &str, sub_menu: &str) -> bool {
        self.find(main_menu)
            .and_then(|e| e.sub_menu(sub_menu))
            .is_some()
    }

    /// Every `(main menu, sub menu)` pair in catalog order.
    pub fn pairs(&self) -> impl Iterator<Item = (&MenuCatalogEntry, &SubMenuEntry)> {
        self.entries
            .iter()
            .flat_map(|entry| entry.sub_menus.iter().map(move |sub| (entry, sub)))
    }
}

fn standard_entries() -> Vec<MenuCatalogEntry> {
    STANDARD_CATALOG
        .iter()
        .map(|(main_menu, subs)| MenuCatalogEntry::new(main_menu, subs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_well_formed() {
        let catalog = MenuCatalog::new(standard_entries(), Some(HOME_MENU)).unwrap();
        assert_eq!(catalog.entries().len(), MenuCatalog::standard().entries().len());
        assert!(catalog.is_home("Dashboard"));
        assert!(catalog.contains("Team", "Users"));
        assert!(catalog.contains("Billing", "Plans"));
        assert!(!catalog.contains("Team", "Plans"));
    }

    #[test]
    fn duplicate_main_menu_is_rejected() {
        let entries = vec![
            MenuCatalogEntry::new("Team", &[("Users", "/team/users")]),
            MenuCatalogEntry::new("Team", &[("Groups", "/team/groups")]),
        ];
        assert_eq!(
            MenuCatalog::new(entries, None).unwrap_err(),
            CatalogError::DuplicateMainMenu("Team".to_string())
        );
    }

    #[test]
    fn duplicate_sub_menu_is_rejected() {
        let entries = vec![MenuCatalogEntry::new(
            "Team",
            &[("Users", "/team/users"), ("Users", "/team/people")],
        )];
        assert!(matches!(
            MenuCatalog::new(entries, None),
            Err(CatalogError::DuplicateSubMenu { .. })
        ));
    }

    #[test]
    fn same_sub_menu_title_under_different_parents_is_allowed() {
        let entries = vec![
            MenuCatalogEntry::new("Properties", &[("Settings", "/properties/settings")]),
            MenuCatalogEntry::new("Billing", &[("Settings", "/billing/settings")]),
        ];
        assert!(MenuCatalog::new(entries, None).is_ok());
    }

    #[test]
    fn unknown_home_is_rejected() {
        let entries = vec![MenuCatalogEntry::new("Team", &[("Users", "/team/users")])];
        assert_eq!(
            MenuCatalog::new(entries, Some("Dashboard")).unwrap_err(),
            CatalogError::UnknownHome("Dashboard".to_string())
        );
    }

    #[test]
    fn pairs_follow_catalog_order() {
        let catalog = MenuCatalog::standard();
        let first: Vec<_> = catalog
            .pairs()
            .take(3)
            .map(|(main, sub)| (main.main_menu.as_str(), sub.title.as_str()))
            .collect();
        assert_eq!(
            first,
            vec![
                ("Dashboard", "Overview"),
                ("Dashboard", "Reports"),
                ("Properties", "Properties")
            ]
        );
    }
}
