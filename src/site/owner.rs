//! Run-as user resolution and recursive ownership/permission changes

use std::os::unix::fs::{PermissionsExt, lchown};
use std::path::Path;

use nix::unistd::{Group, User};
use walkdir::WalkDir;

use crate::error::{Result, SiteError};

/// Value of the first `user` directive in a web server configuration.
///
/// Comment lines are ignored, the statement terminator is stripped, and any
/// group given after the user (`user nginx nginx;`) is dropped.
pub fn parse_user_directive(config: &str) -> Option<String> {
    config.lines().find_map(|line| {
        let line = line.trim();
        if line.starts_with('#') {
            return None;
        }
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "user" {
            return None;
        }
        let user = tokens.next()?.trim_end_matches(';');
        (!user.is_empty()).then(|| user.to_string())
    })
}

/// Numeric owner resolved from a user name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub user: String,
    pub group: String,
    pub uid: u32,
    pub gid: u32,
}

/// Look up `user`; the group is the one named like the user when it exists,
/// otherwise the user's primary group.
pub fn lookup_owner(user: &str) -> Result<Owner> {
    let lookup_failed = |e: nix::Error| SiteError::DirectoryProvisionFailed {
        path: String::new(),
        reason: format!("failed to look up '{user}': {e}"),
    };

    let account = User::from_name(user)
        .map_err(lookup_failed)?
        .ok_or_else(|| SiteError::UserNotFound {
            user: user.to_string(),
        })?;

    let group = match Group::from_name(user).map_err(lookup_failed)? {
        Some(group) => group,
        None => Group::from_gid(account.gid)
            .map_err(lookup_failed)?
            .ok_or_else(|| SiteError::DirectoryProvisionFailed {
                path: String::new(),
                reason: format!("primary group of '{user}' does not exist"),
            })?,
    };

    Ok(Owner {
        user: account.name,
        group: group.name,
        uid: account.uid.as_raw(),
        gid: group.gid.as_raw(),
    })
}

/// Change owner of `root` and everything beneath it without following links.
pub fn chown_recursive(root: &Path, owner: &Owner) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| provision_failed(root, &e.to_string()))?;
        lchown(entry.path(), Some(owner.uid), Some(owner.gid))
            .map_err(|e| provision_failed(entry.path(), &format!("chown failed: {e}")))?;
    }
    Ok(())
}

/// Set `mode` on `root` and every directory and regular file beneath it.
pub fn chmod_recursive(root: &Path, mode: u32) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| provision_failed(root, &e.to_string()))?;
        if entry.path_is_symlink() {
            continue;
        }
        std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(mode))
            .map_err(|e| provision_failed(entry.path(), &format!("chmod failed: {e}")))?;
    }
    Ok(())
}

fn provision_failed(path: &Path, reason: &str) -> SiteError {
    SiteError::DirectoryProvisionFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
