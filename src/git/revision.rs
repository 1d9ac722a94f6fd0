//! Revision strings to commits.
//!
//! A revision is a local branch name or a full hex object id; an absent
//! revision (or `HEAD`) means the current HEAD.

use git2::Oid;

use crate::error::{AppError, Result};
use crate::git::object::Commit;
use crate::git::store::ObjectStore;

const OID_HEX_LEN: usize = 40;

/// Commit named by `rev`. `Ok(None)` only when HEAD is asked for and the
/// repository has no commits yet.
pub fn resolve_revision<S: ObjectStore + ?Sized>(store: &S, rev: Option<&str>) -> Result<Option<Commit>> {
    let rev = rev.map(str::trim).filter(|r| !r.is_empty() && *r != "HEAD");

    let oid = match rev {
        None => match store.head_oid()? {
            Some(oid) => oid,
            None => return Ok(None),
        },
        Some(name) => match store.heads()?.into_iter().find(|(head, _)| head == name) {
            Some((_, oid)) => oid,
            None => parse_oid(name)?,
        },
    };

    store
        .commit(oid)?
        .map(Some)
        .ok_or_else(|| AppError::CommitNotFound(oid.to_string()))
}

/// Parse a full object id. Hex of the wrong length is a caller error; any
/// other string is treated as an unknown branch.
pub fn parse_oid(rev: &str) -> Result<Oid> {
    if !rev.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::RevisionNotFound(rev.to_string()));
    }
    if rev.len() != OID_HEX_LEN {
        return Err(AppError::InvalidArgument(format!("malformed object id: {}", rev)));
    }
    Oid::from_str(rev).map_err(|_| AppError::InvalidArgument(format!("malformed object id: {}", rev)))
}
