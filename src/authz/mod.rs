//! Workspace authorization.
//!
//! Access to anything scoped to a workspace goes through two steps:
//! - resolve the caller's role from their membership ([`resolve_role`])
//! - check that role's fixed grant against the action ([`authorize`])
//!
//! Roles never inherit from each other; the grant table in [`registry`] lists
//! every permission of every role explicitly.

mod guard;
mod membership;
pub mod registry;

pub use guard::authorize;
pub use membership::{resolve_role, WorkspaceAccess};
pub use registry::{permission_set, permissions_for, seed_roles, Permission, RoleName};
