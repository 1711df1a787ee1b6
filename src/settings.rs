use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PawnestSettings {
    pub application: ApplicationSettings,
    pub platform: PlatformSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub redirect_base_url: String,
    pub cors_origins: String,
}

/// Connection details for the hosted auth + data platform.
///
/// The anon key authenticates end-user flows (sign-in, sign-up); the service
/// key authorizes server-side table writes such as profile upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    pub base_url: String,

    // Direct values (can be overridden by environment variables)
    pub anon_key: Option<String>,
    pub service_key: Option<String>,

    // Environment variable names for overrides
    pub anon_key_env: Option<String>,
    pub service_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            anon_key: None,
            service_key: None,
            anon_key_env: None,
            service_key_env: None,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PawnestSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment initialization fails
    /// - Settings file cannot be read or parsed
    /// - TOML parsing fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Initialize environment and logging
        Self::initialize_environment()?;

        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Initialize environment and logging
    ///
    /// # Errors
    ///
    /// Returns an error if logger initialization fails
    fn initialize_environment() -> Result<(), Box<dyn std::error::Error>> {
        Self::load_env_file();
        env_logger::try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `PAWNEST_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        // 1. Start with default settings
        let mut settings = Self::default();

        // 2. Try to load from Settings.toml in current directory (lower priority)
        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            let toml_content = fs::read_to_string(&default_config_path)?;
            settings = basic_toml::from_str(&toml_content)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        // 3. If PAWNEST_SECRETS_DIR is set and contains Settings.toml, override with those settings (higher priority)
        if let Ok(secrets_dir) = std::env::var("PAWNEST_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                let secrets_toml_content = fs::read_to_string(&secrets_path)?;
                let secrets_settings: Self = basic_toml::from_str(&secrets_toml_content)?;

                println!("✓ Overriding settings from {}", secrets_path.display());

                // Replace settings with those from secrets directory
                settings = secrets_settings;
            } else {
                println!(
                    "ℹ PAWNEST_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        // Environment variables will be applied next, after this function returns

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_platform_env_overrides(&mut settings.platform);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for application settings
    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url = redirect_base_url;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    /// Apply environment overrides for platform settings
    pub fn apply_platform_env_overrides(platform_settings: &mut PlatformSettings) {
        if let Ok(base_url) = std::env::var("PLATFORM_URL") {
            platform_settings.base_url = base_url;
        }
        if let Ok(anon_key) = std::env::var("PLATFORM_ANON_KEY") {
            if !anon_key.is_empty() {
                platform_settings.anon_key = Some(anon_key);
            }
        }
        if let Ok(service_key) = std::env::var("PLATFORM_SERVICE_KEY") {
            if !service_key.is_empty() {
                platform_settings.service_key = Some(service_key);
            }
        }
    }

    /// Apply environment overrides for cookie settings
    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect()
    }
}

impl PlatformSettings {
    /// Get the anon key, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_anon_key(&self) -> Option<String> {
        if let Some(env_var) = &self.anon_key_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.anon_key.clone()
    }

    /// Get the service key, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_service_key(&self) -> Option<String> {
        if let Some(env_var) = &self.service_key_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.service_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Helper function to clean all relevant environment variables for tests
    fn clean_env_vars() {
        std::env::remove_var("PLATFORM_URL");
        std::env::remove_var("PLATFORM_ANON_KEY");
        std::env::remove_var("PLATFORM_SERVICE_KEY");
        std::env::remove_var("PAWNEST_SECRETS_DIR");
    }

    #[test]
    fn test_platform_defaults() {
        let platform_settings = PlatformSettings::default();
        assert_eq!(platform_settings.base_url, "http://localhost:54321");
        assert!(platform_settings.anon_key.is_none());
        assert!(platform_settings.service_key.is_none());
    }

    #[test]
    #[serial]
    fn test_platform_env_override() {
        // Make sure the environment is clean
        clean_env_vars();

        let mut platform_settings = PlatformSettings {
            base_url: "http://localhost:54321".to_string(),
            anon_key: Some("toml-anon-key".to_string()),
            service_key: None,
            anon_key_env: None,
            service_key_env: None,
        };

        // Set environment variables
        std::env::set_var("PLATFORM_URL", "https://platform.example.com");
        std::env::set_var("PLATFORM_ANON_KEY", "env-anon-key");
        std::env::set_var("PLATFORM_SERVICE_KEY", "env-service-key");

        // Apply environment overrides
        PawnestSettings::apply_platform_env_overrides(&mut platform_settings);

        assert_eq!(platform_settings.base_url, "https://platform.example.com");
        assert_eq!(platform_settings.anon_key, Some("env-anon-key".to_string()));
        assert_eq!(
            platform_settings.service_key,
            Some("env-service-key".to_string())
        );

        // Clean up
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_empty_platform_env_ignored() {
        // Make sure the environment is clean
        clean_env_vars();

        let mut platform_settings = PlatformSettings {
            base_url: "http://localhost:54321".to_string(),
            anon_key: Some("toml-anon-key".to_string()),
            service_key: Some("toml-service-key".to_string()),
            anon_key_env: None,
            service_key_env: None,
        };

        // Empty values should not clobber configured keys
        std::env::set_var("PLATFORM_ANON_KEY", "");
        std::env::set_var("PLATFORM_SERVICE_KEY", "");

        PawnestSettings::apply_platform_env_overrides(&mut platform_settings);

        assert_eq!(
            platform_settings.anon_key,
            Some("toml-anon-key".to_string())
        );
        assert_eq!(
            platform_settings.service_key,
            Some("toml-service-key".to_string())
        );

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_key_env_indirection() {
        clean_env_vars();
        std::env::remove_var("MY_SERVICE_KEY_VAR");

        let platform_settings = PlatformSettings {
            base_url: "http://localhost:54321".to_string(),
            anon_key: None,
            service_key: Some("direct-service-key".to_string()),
            anon_key_env: None,
            service_key_env: Some("MY_SERVICE_KEY_VAR".to_string()),
        };

        // Without the named variable set, the direct value wins
        assert_eq!(
            platform_settings.get_service_key(),
            Some("direct-service-key".to_string())
        );

        // With the named variable set, the indirect value wins
        std::env::set_var("MY_SERVICE_KEY_VAR", "indirect-service-key");
        assert_eq!(
            platform_settings.get_service_key(),
            Some("indirect-service-key".to_string())
        );

        std::env::remove_var("MY_SERVICE_KEY_VAR");
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_secrets_dir_precedence() {
        clean_env_vars();

        // Settings.toml in PAWNEST_SECRETS_DIR replaces the base settings wholesale
        let secrets_dir = tempfile::tempdir().expect("failed to create temp dir");
        let secrets_path = secrets_dir.path().join("Settings.toml");
        std::fs::write(
            &secrets_path,
            r#"
[application]
host = "127.0.0.1"
port = 9090
redirect_base_url = "https://pawnest.example.com"
cors_origins = "https://pawnest.example.com"

[platform]
base_url = "https://secrets.example.com"
anon_key = "secrets-anon-key"

[cookies]
secure = true

[logging]
level = "debug"
"#,
        )
        .expect("failed to write secrets Settings.toml");

        std::env::set_var("PAWNEST_SECRETS_DIR", secrets_dir.path());

        let settings = PawnestSettings::load_base_settings().expect("load_base_settings failed");
        assert_eq!(settings.application.port, 9090);
        assert_eq!(settings.platform.base_url, "https://secrets.example.com");
        assert_eq!(
            settings.platform.anon_key,
            Some("secrets-anon-key".to_string())
        );

        // Environment variables still override the secrets file
        let mut settings_with_env = settings.clone();
        std::env::set_var("PLATFORM_ANON_KEY", "env-anon-key");
        PawnestSettings::apply_platform_env_overrides(&mut settings_with_env.platform);
        assert_eq!(
            settings_with_env.platform.anon_key,
            Some("env-anon-key".to_string())
        );

        clean_env_vars();
    }

    #[test]
    fn test_bind_address_and_cors_origins() {
        let settings = PawnestSettings::default();
        assert_eq!(settings.get_bind_address(), "0.0.0.0:8080");
        assert_eq!(
            settings.get_cors_origins(),
            vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string()
            ]
        );
    }
}
