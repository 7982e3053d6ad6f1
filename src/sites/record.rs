// ABOUTME: Site records derived from the sites directory at query time

use super::name::{db_name, RESERVED_SITE};
use crate::config::DevboxConfig;
use serde::Serialize;
use std::path::Path;

/// One site as the dashboard sees it. Recomputed from the filesystem on
/// every call; a record exists exactly when a directory of that name exists
/// under the sites root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub name: String,
    pub domain: String,
    pub http_url: String,
    pub https_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wp_admin_url: Option<String>,
    pub db_name: String,
    pub adminer_url: String,
    #[serde(rename = "hasWordPress")]
    pub has_wordpress: bool,
}

impl SiteRecord {
    pub fn for_site(name: &str, site_dir: &Path, config: &DevboxConfig) -> Self {
        let domain = format!("{name}.{}", config.tld_suffix());
        let http_url = format!("http://{domain}:{}/", config.http_port());
        let https_url = format!("https://{domain}:{}/", config.https_port());

        let has_wordpress =
            site_dir.join("wp-config.php").is_file() || site_dir.join("wp-admin").is_dir();
        let wp_admin_url = has_wordpress.then(|| format!("{http_url}wp-admin/"));

        let db_name = db_name(name);
        let adminer_url = format!(
            "http://localhost:{}/?server=db&username=root&db={db_name}",
            config.adminer_port()
        );

        Self {
            name: name.to_string(),
            domain,
            http_url,
            https_url,
            wp_admin_url,
            db_name,
            adminer_url,
            has_wordpress,
        }
    }
}

/// Enumerates the sites root, excluding the reserved shared-code directory,
/// and returns records ordered by name. A missing root means no sites yet.
pub fn site_records(config: &DevboxConfig) -> std::io::Result<Vec<SiteRecord>> {
    let root = config.sites_root();
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == RESERVED_SITE {
            continue;
        }
        names.push(name);
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| {
            let site_dir = root.join(&name);
            SiteRecord::for_site(&name, &site_dir, config)
        })
        .collect())
}
