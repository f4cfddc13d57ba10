use anyhow::{Context, Result as AnyhowResult};
use std::fmt;

/// Selects how the exporter reaches the logical table.
///
/// Exactly one mode is used per invocation; the two are never combined.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    /// Direct PostgreSQL connection configured by the `DB_*` variables.
    Direct,
    /// Hosted Supabase endpoint configured by the `SUPABASE_*` variables.
    Supabase,
}

/// Parameters for a direct PostgreSQL connection.
#[derive(Clone)]
pub struct DirectParams {
    /// Database host name or address.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database name.
    pub dbname: String,
    /// Role to authenticate as.
    pub user: String,
    /// Password for the role. Redacted from `Debug` output.
    pub password: String,
}

impl fmt::Debug for DirectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters for a hosted Supabase (PostgREST) endpoint.
#[derive(Clone)]
pub struct SupabaseParams {
    /// Project URL (e.g. "https://abc.supabase.co").
    pub url: String,
    /// Service role key granting full table access. Redacted from
    /// `Debug` output.
    pub service_role: String,
}

impl fmt::Debug for SupabaseParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseParams")
            .field("url", &self.url)
            .field("service_role", &"<redacted>")
            .finish()
    }
}

/// The set of credentials/parameters needed to open one database session,
/// tagged by access mode. Immutable for the lifetime of one export.
#[derive(Clone, Debug)]
pub enum ConnectionDescriptor {
    /// Direct PostgreSQL connection.
    Direct(DirectParams),
    /// Hosted Supabase endpoint.
    Supabase(SupabaseParams),
}

impl ConnectionDescriptor {
    /// Access mode this descriptor selects.
    pub fn mode(&self) -> AccessMode {
        match self {
            ConnectionDescriptor::Direct(_) => AccessMode::Direct,
            ConnectionDescriptor::Supabase(_) => AccessMode::Supabase,
        }
    }

    /// Short mode label for logs and confirmations.
    pub fn mode_name(&self) -> &'static str {
        match self {
            ConnectionDescriptor::Direct(_) => "direct",
            ConnectionDescriptor::Supabase(_) => "supabase",
        }
    }
}

/// Unvalidated connection settings as read from the environment or CLI.
///
/// Every field mirrors one input variable; [`ConnectionSettings::resolve`]
/// picks the access mode and checks that the variables it requires are
/// present.
#[derive(Clone, Debug, Default)]
pub struct ConnectionSettings {
    /// Explicit access-mode selection; auto-detected when `None`.
    pub source: Option<AccessMode>,
    /// `DB_HOST`.
    pub db_host: String,
    /// `DB_PORT`.
    pub db_port: u16,
    /// `DB_NAME`.
    pub db_name: Option<String>,
    /// `DB_USER`.
    pub db_user: Option<String>,
    /// `DB_PASSWORD`.
    pub db_password: Option<String>,
    /// `SUPABASE_URL`.
    pub supabase_url: Option<String>,
    /// `SUPABASE_SERVICE_ROLE`.
    pub supabase_service_role: Option<String>,
}

impl ConnectionSettings {
    /// Validates the settings into a [`ConnectionDescriptor`].
    ///
    /// When no explicit mode was requested, the hosted mode is selected if
    /// `SUPABASE_URL` is present, otherwise the direct mode. The variables
    /// of the unselected mode are ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionDescriptor)` - A descriptor for the selected mode.
    /// * `Err(anyhow::Error)` - A required variable for the selected mode
    ///   is missing.
    pub fn resolve(self) -> AnyhowResult<ConnectionDescriptor> {
        let mode = self.source.unwrap_or(if self.supabase_url.is_some() {
            AccessMode::Supabase
        } else {
            AccessMode::Direct
        });

        match mode {
            AccessMode::Direct => {
                let dbname = self
                    .db_name
                    .context("DB_NAME (or --db-name) must be set for direct exports")?;
                let user = self
                    .db_user
                    .context("DB_USER (or --db-user) must be set for direct exports")?;
                let password = self
                    .db_password
                    .context("DB_PASSWORD (or --db-password) must be set for direct exports")?;
                Ok(ConnectionDescriptor::Direct(DirectParams {
                    host: self.db_host,
                    port: self.db_port,
                    dbname,
                    user,
                    password,
                }))
            }
            AccessMode::Supabase => {
                let url = self
                    .supabase_url
                    .context("SUPABASE_URL (or --supabase-url) must be set for hosted exports")?;
                let service_role = self.supabase_service_role.context(
                    "SUPABASE_SERVICE_ROLE (or --supabase-service-role) must be set for hosted exports",
                )?;
                Ok(ConnectionDescriptor::Supabase(SupabaseParams {
                    url,
                    service_role,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_settings() -> ConnectionSettings {
        ConnectionSettings {
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: Some("app".to_string()),
            db_user: Some("postgres".to_string()),
            db_password: Some("hunter2".to_string()),
            ..Default::default()
        }
    }

    /// Tests that a full direct configuration resolves to the direct mode.
    #[test]
    fn test_resolve_direct() {
        let descriptor = direct_settings().resolve().unwrap();
        assert_eq!(descriptor.mode(), AccessMode::Direct);
        match descriptor {
            ConnectionDescriptor::Direct(params) => {
                assert_eq!(params.host, "localhost");
                assert_eq!(params.port, 5432);
                assert_eq!(params.dbname, "app");
            }
            other => panic!("unexpected descriptor: {:?}", other),
        }
    }

    /// Tests that a present SUPABASE_URL auto-selects the hosted mode.
    #[test]
    fn test_resolve_auto_detects_supabase() {
        let settings = ConnectionSettings {
            supabase_url: Some("https://abc.supabase.co".to_string()),
            supabase_service_role: Some("service-key".to_string()),
            ..Default::default()
        };
        let descriptor = settings.resolve().unwrap();
        assert_eq!(descriptor.mode(), AccessMode::Supabase);
        assert_eq!(descriptor.mode_name(), "supabase");
    }

    /// Tests that an explicit --source wins over auto-detection.
    #[test]
    fn test_resolve_explicit_source_overrides_detection() {
        let mut settings = direct_settings();
        settings.source = Some(AccessMode::Direct);
        settings.supabase_url = Some("https://abc.supabase.co".to_string());
        let descriptor = settings.resolve().unwrap();
        assert_eq!(descriptor.mode(), AccessMode::Direct);
    }

    /// Tests that a missing direct-mode variable is reported by name.
    #[test]
    fn test_resolve_missing_password() {
        let mut settings = direct_settings();
        settings.db_password = None;
        let err = settings.resolve().unwrap_err();
        assert!(err.to_string().contains("DB_PASSWORD"));
    }

    /// Tests that a hosted selection without a service role key fails.
    #[test]
    fn test_resolve_missing_service_role() {
        let settings = ConnectionSettings {
            supabase_url: Some("https://abc.supabase.co".to_string()),
            ..Default::default()
        };
        let err = settings.resolve().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_SERVICE_ROLE"));
    }

    /// Tests that secrets never appear in Debug output.
    #[test]
    fn test_debug_redacts_secrets() {
        let descriptor = direct_settings().resolve().unwrap();
        let rendered = format!("{:?}", descriptor);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));

        let descriptor = ConnectionDescriptor::Supabase(SupabaseParams {
            url: "https://abc.supabase.co".to_string(),
            service_role: "service-key".to_string(),
        });
        let rendered = format!("{:?}", descriptor);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("service-key"));
    }
}
