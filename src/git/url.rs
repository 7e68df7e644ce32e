//! URL handling for libgit2
//!
//! libgit2 does not accept SCP-style SSH addresses (`git@host:org/repo.git`)
//! everywhere, and is picky about relative `file://` URLs.

use std::borrow::Cow;
use std::path::Path;

/// True for `file://` URLs and absolute filesystem paths.
pub fn is_local(url: &str) -> bool {
    url.starts_with("file://") || Path::new(url).is_absolute()
}

/// True for `ssh://` URLs and SCP-style `user@host:path` addresses.
pub fn is_ssh(url: &str) -> bool {
    url.starts_with("ssh://") || scp_parts(url).is_some()
}

/// Split an SCP-style address into `(user@host, path)`.
fn scp_parts(url: &str) -> Option<(&str, &str)> {
    if url.contains("://") {
        return None;
    }
    let (host, path) = url.split_once(':')?;
    (host.contains('@') && !host.contains('/')).then_some((host, path))
}

/// Rewrite `url` into a form libgit2 resolves reliably.
pub fn normalize_for_libgit2(url: &str) -> Cow<'_, str> {
    if let Some((host, path)) = scp_parts(url) {
        let path = path.trim_start_matches('/');
        return Cow::Owned(format!("ssh://{host}/{path}"));
    }

    if let Some(rest) = url.strip_prefix("file://") {
        if !rest.starts_with('/') && !rest.is_empty() {
            return Cow::Owned(format!("file:///{rest}"));
        }
    }

    Cow::Borrowed(url)
}
