//! Permission matrix editing for the group admin screen.
//!
//! The matrix is a working copy of one group's permission records. It is edited
//! in place and submitted as a whole; a record whose three flags are all off is
//! never kept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::MenuCatalog;
use crate::permissions::{Capability, MenuKey, PermissionFlags, PermissionRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PermissionRecord>", into = "Vec<PermissionRecord>")]
pub struct PermissionMatrix {
    records: BTreeMap<MenuKey, PermissionRecord>,
}

/// One checkbox row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub main_menu: String,
    pub sub_menu: String,
    pub url: String,
    pub can_add: bool,
    pub can_change: bool,
    pub can_delete: bool,
    pub all: bool,
}

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load stored records. All-false records are dropped and a later record for
    /// the same pair replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = PermissionRecord>) -> Self {
        let mut matrix = Self::new();
        for record in records {
            matrix.put(record.key(), record.url.clone(), record.flags());
        }
        matrix
    }

    pub fn get(&self, main_menu: &str, sub_menu: &str) -> PermissionFlags {
        self.records
            .get(&MenuKey::new(main_menu, sub_menu))
            .map(PermissionRecord::flags)
            .unwrap_or_default()
    }

    /// Flip one flag of a pair, creating or removing its record as needed.
    pub fn toggle(&mut self, main_menu: &str, sub_menu: &str, url: &str, field: Capability) {
        let flags = self.get(main_menu, sub_menu).toggled(field);
        self.put(MenuKey::new(main_menu, sub_menu), url.to_string(), flags);
    }

    /// Grant all three flags, or revoke the record if all three are already set.
    ///
    /// Two calls restore an absent or full pair only; a partial record ends up absent.
    pub fn toggle_all(&mut self, main_menu: &str, sub_menu: &str, url: &str) {
        let flags = if self.get(main_menu, sub_menu).is_full() {
            PermissionFlags::NONE
        } else {
            PermissionFlags::ALL
        };
        self.put(MenuKey::new(main_menu, sub_menu), url.to_string(), flags);
    }

    fn put(&mut self, key: MenuKey, url: String, flags: PermissionFlags) {
        if flags.is_empty() {
            self.records.remove(&key);
        } else {
            self.records
                .insert(key.clone(), PermissionRecord::new(key, url, flags));
        }
    }

    /// One row per catalog pair, whether or not a record exists for it.
    pub fn rows(&self, catalog: &MenuCatalog) -> Vec<MatrixRow> {
        catalog
            .pairs()
            .map(|(entry, sub)| {
                let flags = self.get(&entry.main_menu, &sub.title);
                MatrixRow {
                    main_menu: entry.main_menu.clone(),
                    sub_menu: sub.title.clone(),
                    url: sub.url.clone(),
                    can_add: flags.add,
                    can_change: flags.change,
                    can_delete: flags.delete,
                    all: flags.is_full(),
                }
            })
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &PermissionRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<PermissionRecord> {
        self.records.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<PermissionRecord>> for PermissionMatrix {
    fn from(records: Vec<PermissionRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<PermissionMatrix> for Vec<PermissionRecord> {
    fn from(matrix: PermissionMatrix) -> Self {
        matrix.into_records()
    }
}
