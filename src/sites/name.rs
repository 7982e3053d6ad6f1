// ABOUTME: Site name validation and the site-to-database name mapping

use super::error::SiteError;
use lazy_static::lazy_static;
use regex::Regex;

/// Shared code lives in this subdirectory; it is not a site and can never be
/// created or deleted through the lifecycle.
pub const RESERVED_SITE: &str = "general";

lazy_static! {
    static ref SITE_NAME: Regex = Regex::new("^[a-z0-9-]+$").expect("site name pattern is valid");
}

pub fn validate_name(name: &str) -> Result<(), SiteError> {
    if !SITE_NAME.is_match(name) {
        return Err(SiteError::InvalidName(name.to_string()));
    }
    if name == RESERVED_SITE {
        return Err(SiteError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// Deterministic database name for a validated site name. Hyphens are the
/// only allowed character MySQL dislikes in identifiers, so they map to
/// underscores and nothing else changes; the mapping is collision-free over
/// the validated character set.
pub fn db_name(name: &str) -> String {
    format!("wp_{}", name.replace('-', "_"))
}
