//! Application configuration.
//!
//! Read from `crafter.toml` when present, then overridden by environment
//! variables:
//!
//! | Variable | Setting |
//! |---|---|
//! | `HOST` | `server.host` |
//! | `PORT` | `server.port` |
//! | `CATALOG_SEED` | `catalog.seed_path` |
//! | `MAX_SEMESTER_CREDITS` | `limits.max_semester_credits` |
//! | `MAX_SEMESTER_COURSES` | `limits.max_semester_courses` |
//!
//! Store selection lives separately in [`crate::db::RepositoryConfig`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::services::{SemesterLimits, DEFAULT_MAX_SEMESTER_COURSES, DEFAULT_MAX_SEMESTER_CREDITS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_credits")]
    pub max_semester_credits: u32,
    #[serde(default = "default_max_courses")]
    pub max_semester_courses: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_semester_credits: default_max_credits(),
            max_semester_courses: default_max_courses(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON catalog seed loaded at startup.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_credits() -> u32 {
    DEFAULT_MAX_SEMESTER_CREDITS
}

fn default_max_courses() -> usize {
    DEFAULT_MAX_SEMESTER_COURSES
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `crafter.toml` from the working directory or `backend/`, falling back
    /// to defaults, then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = ["crafter.toml", "backend/crafter.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .map(|p| {
                log::info!("Loading configuration from {}", p.display());
                Self::from_file(&p)
            })
            .transpose()?
            .unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        if let Some(seed) = lookup("CATALOG_SEED") {
            self.catalog.seed_path = Some(PathBuf::from(seed)).filter(|p| !p.as_os_str().is_empty());
        }
        if let Some(credits) = lookup("MAX_SEMESTER_CREDITS") {
            self.limits.max_semester_credits = credits
                .trim()
                .parse()
                .context("MAX_SEMESTER_CREDITS must be a non-negative integer")?;
        }
        if let Some(courses) = lookup("MAX_SEMESTER_COURSES") {
            self.limits.max_semester_courses = courses
                .trim()
                .parse()
                .context("MAX_SEMESTER_COURSES must be a non-negative integer")?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_semester_credits == 0 {
            bail!("limits.max_semester_credits must be positive");
        }
        if self.limits.max_semester_courses == 0 {
            bail!("limits.max_semester_courses must be positive");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid bind address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }

    pub fn semester_limits(&self) -> SemesterLimits {
        SemesterLimits {
            max_credits: self.limits.max_semester_credits,
            max_courses: self.limits.max_semester_courses,
        }
    }
}
