//! Domain operations over the pool. Handlers authorize first, then call in here.

pub mod accounts;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod workspaces;
