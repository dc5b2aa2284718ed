pub mod admin;
pub mod app;
pub mod auth;
pub mod extract;
pub mod groups;
pub mod menu;
pub mod metrics;
pub mod permissions;
