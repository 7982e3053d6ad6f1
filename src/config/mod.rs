// ABOUTME: Environment-file configuration, reread fresh on every call

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed token substituted for secret values in the config snapshot.
pub const MASK_TOKEN: &str = "\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}";

/// One snapshot of the `.env` file. Loaded per call and passed down as a
/// value, never cached in a global: edits to the file take effect on the
/// next call without a restart.
#[derive(Debug, Clone, Default)]
pub struct DevboxConfig {
    values: HashMap<String, String>,
}

impl DevboxConfig {
    /// Reads the environment file. A missing or unreadable file is not an
    /// error; every recognized key has a documented default.
    pub fn load(env_file: &Path) -> Self {
        match std::fs::read_to_string(env_file) {
            Ok(text) => Self::parse(&text),
            Err(err) => {
                debug!("no config at {}: {err}; using defaults", env_file.display());
                Self::default()
            }
        }
    }

    /// Parses `KEY=value` lines. Blank lines, `#` comments and lines without
    /// a `=` past the first column are skipped.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.find('=') {
                Some(idx) if idx > 0 => {
                    values.insert(line[..idx].to_string(), line[idx + 1..].to_string());
                }
                _ => continue,
            }
        }
        Self { values }
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn port_or(&self, key: &str, default: u16) -> u16 {
        self.values
            .get(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    /// Compose project name; scopes container listing and names the
    /// database container.
    pub fn compose_project(&self) -> String {
        self.get_or("COMPOSE_PROJECT_NAME", "wpdevbox")
    }

    /// Directory holding one subdirectory per site.
    pub fn sites_root(&self) -> PathBuf {
        PathBuf::from(self.get_or("SITES_ROOT", "sites"))
    }

    /// Domain suffix appended to site names.
    pub fn tld_suffix(&self) -> String {
        self.get_or("TLD_SUFFIX", "localhost")
    }

    pub fn http_port(&self) -> u16 {
        self.port_or("HTTP_PORT", 18080)
    }

    pub fn https_port(&self) -> u16 {
        self.port_or("HTTPS_PORT", 18443)
    }

    pub fn adminer_port(&self) -> u16 {
        self.port_or("ADMINER_PORT", 18081)
    }

    pub fn dashboard_port(&self) -> u16 {
        self.port_or("DASHBOARD_PORT", 19000)
    }

    pub fn mysql_root_password(&self) -> String {
        self.get_or("MYSQL_ROOT_PASSWORD", "root")
    }

    pub fn docker_socket(&self) -> PathBuf {
        PathBuf::from(self.get_or("DOCKER_SOCKET", "/var/run/docker.sock"))
    }

    /// Compose v2 names containers `<project>-<service>-<index>`.
    pub fn db_container(&self) -> String {
        format!("{}-db-1", self.compose_project())
    }

    /// Ordered snapshot for the config endpoint, with secret-bearing keys
    /// replaced by the fixed mask token.
    pub fn masked(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| {
                let shown = if is_secret_key(key) {
                    MASK_TOKEN.to_string()
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect()
    }
}

fn is_secret_key(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    ["PASSWORD", "SECRET", "TOKEN", "KEY"]
        .iter()
        .any(|marker| upper.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_all_defaults() {
        let config = DevboxConfig::load(Path::new("/nonexistent/.env"));

        assert_eq!(config.compose_project(), "wpdevbox");
        assert_eq!(config.sites_root(), PathBuf::from("sites"));
        assert_eq!(config.tld_suffix(), "localhost");
        assert_eq!(config.http_port(), 18080);
        assert_eq!(config.https_port(), 18443);
        assert_eq!(config.adminer_port(), 18081);
        assert_eq!(config.dashboard_port(), 19000);
        assert_eq!(config.mysql_root_password(), "root");
        assert_eq!(config.docker_socket(), PathBuf::from("/var/run/docker.sock"));
        assert_eq!(config.db_container(), "wpdevbox-db-1");
        assert!(config.masked().is_empty());
    }

    #[test]
    fn parse_skips_comments_blanks_and_malformed_lines() {
        let config = DevboxConfig::parse(
            "# WPDevBox settings\n\nHTTP_PORT=8080\nnot a pair\n=orphan\nTLD_SUFFIX=test\n",
        );

        assert_eq!(config.http_port(), 8080);
        assert_eq!(config.tld_suffix(), "test");
        assert_eq!(config.masked().len(), 2);
    }

    #[test]
    fn values_keep_everything_after_the_first_equals() {
        let config = DevboxConfig::parse("MYSQL_ROOT_PASSWORD=p=ss=word\n");
        assert_eq!(config.mysql_root_password(), "p=ss=word");
    }

    #[test]
    fn unparsable_port_falls_back_to_the_default() {
        let config = DevboxConfig::parse("HTTP_PORT=eighty\n");
        assert_eq!(config.http_port(), 18080);
    }

    #[test]
    fn project_name_drives_the_db_container_name() {
        let config = DevboxConfig::parse("COMPOSE_PROJECT_NAME=clientwork\n");
        assert_eq!(config.db_container(), "clientwork-db-1");
    }

    #[test]
    fn masked_snapshot_hides_secret_keys_only() {
        let config = DevboxConfig::parse(
            "MYSQL_ROOT_PASSWORD=hunter2\nAPI_TOKEN=abc\nHTTP_PORT=8080\nPHP_VERSION=8.2\n",
        );
        let masked = config.masked();

        assert_eq!(masked["MYSQL_ROOT_PASSWORD"], MASK_TOKEN);
        assert_eq!(masked["API_TOKEN"], MASK_TOKEN);
        assert_eq!(masked["HTTP_PORT"], "8080");
        assert_eq!(masked["PHP_VERSION"], "8.2");
    }
}
