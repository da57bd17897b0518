pub mod auth;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod workspaces;
