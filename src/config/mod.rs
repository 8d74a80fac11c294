use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub ordering: OrderingConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When unset the URL is assembled from the DB_* parts.
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub name: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub hash_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Position given to the first id of a reorder batch
    pub base_offset: i64,
    /// Fail a reorder when an id matches no row instead of skipping it
    pub strict: bool,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub directory: String,
    pub public_base_url: String,
    pub max_bytes: usize,
    pub timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = Some(v);
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = Some(v);
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = Some(v);
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_HASH_TIMEOUT_MS") {
            self.security.hash_timeout_ms = v.parse().unwrap_or(self.security.hash_timeout_ms);
        }

        // Ordering overrides
        if let Ok(v) = env::var("ORDERING_BASE_OFFSET") {
            self.ordering.base_offset = v.parse().unwrap_or(self.ordering.base_offset);
        }
        if let Ok(v) = env::var("ORDERING_STRICT") {
            self.ordering.strict = v.parse().unwrap_or(self.ordering.strict);
        }
        if let Ok(v) = env::var("ORDERING_TIMEOUT_MS") {
            self.ordering.timeout_ms = v.parse().unwrap_or(self.ordering.timeout_ms);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.directory = v;
        }
        if let Ok(v) = env::var("UPLOAD_PUBLIC_BASE_URL") {
            self.uploads.public_base_url = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_bytes = v.parse().unwrap_or(self.uploads.max_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_TIMEOUT_MS") {
            self.uploads.timeout_ms = v.parse().unwrap_or(self.uploads.timeout_ms);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                host: None,
                port: 3306,
                user: None,
                password: None,
                name: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 20 * 1024 * 1024, // 20MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                jwt_secret: "sergas-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 4,
                hash_timeout_ms: 5_000,
            },
            ordering: OrderingConfig {
                base_offset: 0,
                strict: false,
                timeout_ms: 10_000,
            },
            uploads: UploadConfig {
                directory: "uploads".to_string(),
                public_base_url: "http://localhost:3000/uploads".to_string(),
                max_bytes: 20 * 1024 * 1024,
                timeout_ms: 30_000,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                host: None,
                port: 3306,
                user: None,
                password: None,
                name: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 20 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.sergas.ar".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
                hash_timeout_ms: 5_000,
            },
            ordering: OrderingConfig {
                base_offset: 0,
                strict: false,
                timeout_ms: 5_000,
            },
            uploads: UploadConfig {
                directory: "/var/www/staging/uploads".to_string(),
                public_base_url: "https://staging.sergas.ar/uploads".to_string(),
                max_bytes: 20 * 1024 * 1024,
                timeout_ms: 30_000,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                host: None,
                port: 3306,
                user: None,
                password: None,
                name: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://sergas.ar".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
                bcrypt_cost: 10,
                hash_timeout_ms: 3_000,
            },
            ordering: OrderingConfig {
                base_offset: 0,
                strict: false,
                timeout_ms: 5_000,
            },
            uploads: UploadConfig {
                directory: "/var/www/sergas/uploads".to_string(),
                public_base_url: "https://sergas.ar/uploads".to_string(),
                max_bytes: 10 * 1024 * 1024,
                timeout_ms: 30_000,
            },
        }
    }
}

impl DatabaseConfig {
    /// Resolve the connection URL, assembling a `mysql://` URL from the
    /// individual DB_* settings when no DATABASE_URL was given.
    pub fn connection_url(&self) -> Result<String, DatabaseError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let host = self.host.as_deref().ok_or(DatabaseError::ConfigMissing("DB_HOST"))?;
        let user = self.user.as_deref().ok_or(DatabaseError::ConfigMissing("DB_USER"))?;
        let name = self.name.as_deref().ok_or(DatabaseError::ConfigMissing("DB_NAME"))?;

        let mut url = url::Url::parse("mysql://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(self.port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_password(self.password.as_deref()).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", name));
        Ok(url.into())
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }
}

impl SecurityConfig {
    pub fn hash_timeout(&self) -> Duration {
        Duration::from_millis(self.hash_timeout_ms)
    }
}

impl OrderingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
