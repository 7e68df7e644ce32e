//! Parser for the freedesktop `os-release` format

use super::OsFamily;

const DEBIAN_IDS: &[&str] = &["debian", "ubuntu", "raspbian", "linuxmint", "pop", "kali"];
const REDHAT_IDS: &[&str] = &[
    "rhel",
    "centos",
    "fedora",
    "rocky",
    "almalinux",
    "ol",
    "amzn",
];

/// The fields of `os-release` that matter for family detection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: Option<String>,
    pub id_like: Vec<String>,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    pub fn parse(content: &str) -> Self {
        let mut release = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim() {
                "ID" => release.id = Some(value.to_lowercase()),
                "ID_LIKE" => {
                    release.id_like = value
                        .split_whitespace()
                        .map(str::to_lowercase)
                        .collect();
                }
                "PRETTY_NAME" => release.pretty_name = Some(value.to_string()),
                _ => {}
            }
        }
        release
    }

    /// Family from `ID`, falling back to the `ID_LIKE` list.
    pub fn family(&self) -> Option<OsFamily> {
        self.id
            .iter()
            .chain(self.id_like.iter())
            .find_map(|id| family_of(id))
    }

    pub fn display_name(&self) -> String {
        self.pretty_name
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn family_of(id: &str) -> Option<OsFamily> {
    if DEBIAN_IDS.contains(&id) {
        Some(OsFamily::Debian)
    } else if REDHAT_IDS.contains(&id) {
        Some(OsFamily::RedHat)
    } else {
        None
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}
