//! Who may see and administer which repository.
//!
//! - `permission`: the three-level `Permission` and the pure resolver
//! - `manage`: typed management requests and the rules that gate them

pub mod manage;
pub mod permission;

pub use manage::{ManageRequest, apply, parse_request};
pub use permission::{Caller, GrantLookup, Permission, explicit_permission, resolve};
