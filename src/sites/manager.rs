// ABOUTME: Site lifecycle: directory tree plus database, created and destroyed together

use super::error::SiteError;
use super::name::{db_name, validate_name};
use crate::config::DevboxConfig;
use crate::docker::CommandRunner;
use std::path::PathBuf;
use tracing::{info, warn};

/// Drives the two-resource lifecycle of a site: its directory under the
/// sites root and its database inside the db container.
///
/// Both flows are single-attempt and non-transactional. There is no
/// compensation step across the two resources: a create whose database step
/// fails leaves the directory in place, and a delete whose database drop
/// fails leaves everything in place. That gap is deliberate for a
/// single-operator local tool and is part of the documented behavior.
pub struct SiteManager<R> {
    config: DevboxConfig,
    runner: R,
}

impl<R: CommandRunner> SiteManager<R> {
    pub fn new(config: DevboxConfig, runner: R) -> Self {
        Self { config, runner }
    }

    fn site_dir(&self, name: &str) -> PathBuf {
        self.config.sites_root().join(name)
    }

    /// Creates the site directory with a placeholder entry point, then the
    /// database. The directory is not rolled back if the database step
    /// fails; rerunning create after fixing the database reports a conflict,
    /// which is the signal to clean up by deleting the site.
    pub async fn create_site(&self, name: &str) -> Result<(), SiteError> {
        validate_name(name)?;

        let site_dir = self.site_dir(name);
        if site_dir.exists() {
            return Err(SiteError::AlreadyExists(name.to_string()));
        }

        std::fs::create_dir_all(&site_dir)?;
        std::fs::write(site_dir.join("index.php"), placeholder_contents(name))?;
        info!("created site directory {}", site_dir.display());

        let db = db_name(name);
        let result = self
            .runner
            .run_command(
                &self.config.db_container(),
                &create_database_command(&db, &self.config.mysql_root_password()),
            )
            .await?;
        if !result.succeeded() {
            warn!("database creation for site {name} failed: {}", result.output);
            return Err(SiteError::CommandFailed {
                code: result.exit_code,
                output: result.output,
            });
        }

        info!("created database {db} for site {name}");
        Ok(())
    }

    /// Drops the database first and only removes the directory tree after a
    /// successful drop, so a failed drop never strands a database without
    /// its site. A tree that disappeared in the meantime is a no-op.
    pub async fn delete_site(&self, name: &str) -> Result<(), SiteError> {
        validate_name(name)?;

        let site_dir = self.site_dir(name);
        if !site_dir.exists() {
            return Err(SiteError::NotFound(name.to_string()));
        }

        let db = db_name(name);
        let result = self
            .runner
            .run_command(
                &self.config.db_container(),
                &drop_database_command(&db, &self.config.mysql_root_password()),
            )
            .await?;
        if !result.succeeded() {
            warn!("database drop for site {name} failed: {}", result.output);
            return Err(SiteError::CommandFailed {
                code: result.exit_code,
                output: result.output,
            });
        }
        info!("dropped database {db} for site {name}");

        if let Err(err) = std::fs::remove_dir_all(&site_dir) {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(err.into());
            }
        }
        info!("removed site directory {}", site_dir.display());
        Ok(())
    }
}

fn placeholder_contents(name: &str) -> String {
    format!("<?php\n\necho 'New WPDevBox site: {name}. Replace this file with your site.';\n")
}

fn create_database_command(db: &str, root_password: &str) -> Vec<String> {
    mysql_command(
        root_password,
        &format!("CREATE DATABASE IF NOT EXISTS `{db}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"),
    )
}

fn drop_database_command(db: &str, root_password: &str) -> Vec<String> {
    mysql_command(root_password, &format!("DROP DATABASE IF EXISTS `{db}`"))
}

fn mysql_command(root_password: &str, statement: &str) -> Vec<String> {
    vec![
        "mysql".to_string(),
        "-uroot".to_string(),
        format!("-p{root_password}"),
        "-e".to_string(),
        statement.to_string(),
    ]
}
