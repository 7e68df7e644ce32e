//! Git credentials
//!
//! Credentials come from the operator's environment only: the SSH agent,
//! default key files in `~/.ssh/`, and configured git credential helpers.
//! Public repositories need none of these.
//!
//! libgit2 asks again after every rejected credential, so each source is
//! offered once per connection and then the callback gives up.

use std::path::{Path, PathBuf};

use git2::{Config, Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};

/// Key files tried in order after the agent
const SSH_KEY_NAMES: &[&str] = &["id_ed25519", "id_ecdsa", "id_rsa"];

fn auth_error(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Ssh, message)
}

fn ssh_key_files(ssh_dir: &Path) -> Vec<PathBuf> {
    SSH_KEY_NAMES
        .iter()
        .map(|name| ssh_dir.join(name))
        .filter(|private| private.is_file())
        .collect()
}

fn credential_helper(url: &str, username: Option<&str>) -> Result<Cred, Error> {
    let config = Config::open_default().or_else(|_| Config::new())?;
    Cred::credential_helper(&config, url, username)
}

/// What has already been offered to the server on one connection
#[derive(Debug)]
struct CredentialAttempts {
    ssh_dir: Option<PathBuf>,
    agent_tried: bool,
    keys_tried: usize,
    helper_tried: bool,
    default_tried: bool,
}

impl CredentialAttempts {
    fn new(ssh_dir: Option<PathBuf>) -> Self {
        Self {
            ssh_dir,
            agent_tried: false,
            keys_tried: 0,
            helper_tried: false,
            default_tried: false,
        }
    }

    fn next(
        &mut self,
        url: &str,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, Error> {
        if allowed.contains(CredentialType::SSH_KEY) {
            return self.next_ssh_key(username_from_url.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !self.helper_tried {
            self.helper_tried = true;
            return credential_helper(url, username_from_url);
        }
        if allowed.contains(CredentialType::DEFAULT) && !self.default_tried {
            self.default_tried = true;
            return Cred::default();
        }
        Err(auth_error("authentication failed with every available credential"))
    }

    fn next_ssh_key(&mut self, username: &str) -> Result<Cred, Error> {
        if !self.agent_tried {
            self.agent_tried = true;
            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        let keys = self.ssh_dir.as_deref().map(ssh_key_files).unwrap_or_default();
        while let Some(private) = keys.get(self.keys_tried) {
            self.keys_tried += 1;
            let public = private.with_extension("pub");
            let public = public.is_file().then_some(public);
            if let Ok(cred) = Cred::ssh_key(username, public.as_deref(), private, None) {
                return Ok(cred);
            }
        }

        Err(auth_error("SSH authentication failed with every available key"))
    }
}

/// Install a credentials callback on `callbacks`.
pub fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks<'_>) {
    let mut attempts = CredentialAttempts::new(dirs::home_dir().map(|home| home.join(".ssh")));
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts.next(url, username_from_url, allowed)
    });
}
