//! Role/group permission resolution for the signed-in account.

pub mod model;
pub mod registry;
pub mod resolver;
pub mod store;

pub use model::{
    Capability, MenuKey, MenuPermissions, PermissionFlags, PermissionRecord, Role,
    SessionPermissions, SubMenuPermissions,
};
pub use registry::PermissionStores;
pub use resolver::{Access, Resolver};
pub use store::{FetchOutcome, LoadPhase, PermissionSnapshot, PermissionSource, PermissionStore};
