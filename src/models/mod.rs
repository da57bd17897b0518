pub mod account;
pub mod membership;
pub mod pagination;
pub mod project;
pub mod role;
pub mod task;
pub mod user;
pub mod workspace;
