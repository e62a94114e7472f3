//! Server configuration loaded via OrthoConfig.
//!
//! Every value can come from the environment (`SAKURA_*`), a config file
//! or CLI flags; accessors supply the defaults so "unset" stays visible in
//! the parsed struct.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Top-level server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SAKURA")]
pub struct AppSettings {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Required.
    pub database_url: Option<String>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow an ephemeral session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Set the `Secure` flag on session cookies.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Directory holding uploaded files (product images, attachments).
    pub uploads_dir: Option<PathBuf>,
}

impl AppSettings {
    /// The configured bind address, falling back to the default.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// The configured uploads directory, falling back to `uploads/`.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR))
    }
}

/// Demo seeding settings, active only with the `seed-data` feature.
#[cfg(feature = "seed-data")]
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SEED_DATA")]
pub struct SeedSettings {
    /// Enable demo catalogue and account seeding at startup.
    #[ortho_config(default = false)]
    pub enabled: bool,
    /// RNG seed for demo account generation.
    pub seed: Option<u64>,
    /// Number of demo customer accounts to generate.
    pub customer_count: Option<usize>,
}

#[cfg(feature = "seed-data")]
impl SeedSettings {
    /// Default RNG seed for demo data.
    const DEFAULT_SEED: u64 = 42;

    /// Default number of demo customers.
    const DEFAULT_CUSTOMER_COUNT: usize = 8;

    /// The configured RNG seed, falling back to the default.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(Self::DEFAULT_SEED)
    }

    /// The configured customer count, falling back to the default.
    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.customer_count.unwrap_or(Self::DEFAULT_CUSTOMER_COUNT)
    }
}
