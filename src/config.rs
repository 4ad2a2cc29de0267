//! Startup configuration: fixed locations, pool limits and the credential loader.
//!
//! The service takes no flags and reads no environment for its behaviour.
//! Everything it needs comes from two files mounted into the container:
//! a YAML database source and a PEM bundle of CA roots.

use crate::error::{PersonalityError, Result};
use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde::{Deserialize, Deserializer};
use std::{fmt, fs, path::Path, time::Duration};
use tracing::info;
use x509_parser::pem::Pem;

pub const DB_SOURCE_FILE_PATH: &str = "/etc/credentials/db-connection.yml";
pub const PEM_FILE_PATH: &str = "/etc/credentials/rds-ca-root.pem";

pub const LISTEN_ADDR: &str = "0.0.0.0:1323";

/// Name under which the CA pool is registered and referenced from the DSN.
pub const TLS_PROFILE_NAME: &str = "custom";

const MAX_OPEN_CONNS: u32 = 50;

/// Connection pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_open: u32,
    pub max_idle: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_open: MAX_OPEN_CONNS,
            max_idle: MAX_OPEN_CONNS * 2,
            max_lifetime: Duration::from_secs(u64::from(MAX_OPEN_CONNS)),
        }
    }
}

/// Database location and login, as read from the credential file.
///
/// Every field takes any YAML scalar, so `port: 3306` or `password: 123456`
/// load as their text.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct DbSource {
    #[serde(deserialize_with = "scalar_as_string")]
    pub host: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub port: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub user: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub password: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub database: String,
}

impl fmt::Debug for DbSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSource")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Bool(bool),
        UInt(u64),
        Int(i64),
        Float(f64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s,
        Scalar::Bool(b) => b.to_string(),
        Scalar::UInt(n) => n.to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(x) => x.to_string(),
    })
}

/// A validated bundle of CA certificates.
///
/// The raw PEM is kept as-is for the driver; subjects are kept for logging.
#[derive(Debug, Clone)]
pub struct CertificatePool {
    pem: Vec<u8>,
    subjects: Vec<String>,
}

impl CertificatePool {
    /// Parse every `CERTIFICATE` block; one bad block rejects the whole bundle.
    pub fn from_pem(pem: &[u8]) -> Result<Self, String> {
        let mut subjects = Vec::new();
        for (idx, block) in Pem::iter_from_buffer(pem).enumerate() {
            let block = block.map_err(|e| format!("malformed PEM block #{idx}: {e}"))?;
            if block.label != "CERTIFICATE" {
                continue;
            }
            let cert = block
                .parse_x509()
                .map_err(|e| format!("certificate #{idx} is not valid X.509: {e}"))?;
            subjects.push(cert.subject().to_string());
        }

        if subjects.is_empty() {
            return Err("no certificate found".to_string());
        }

        Ok(Self {
            pem: pem.to_vec(),
            subjects,
        })
    }

    pub fn pem(&self) -> &[u8] {
        &self.pem
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Read the database source and the CA bundle. Any failure is fatal to startup.
pub fn load(source_path: &Path, pem_path: &Path) -> Result<(DbSource, CertificatePool)> {
    let source = load_db_source(source_path)?;
    let certs = load_certificates(pem_path)?;
    info!(
        source = %source_path.display(),
        certs = %pem_path.display(),
        ca_count = certs.len(),
        "database credentials loaded"
    );
    Ok((source, certs))
}

/// [`load`] from the fixed mount locations.
pub fn load_default() -> Result<(DbSource, CertificatePool)> {
    load(Path::new(DB_SOURCE_FILE_PATH), Path::new(PEM_FILE_PATH))
}

fn load_db_source(path: &Path) -> Result<DbSource> {
    Figment::from(Yaml::file_exact(path))
        .extract()
        .map_err(|e| PersonalityError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
}

fn load_certificates(path: &Path) -> Result<CertificatePool> {
    let pem = fs::read(path).map_err(|e| PersonalityError::Cert {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    CertificatePool::from_pem(&pem).map_err(|reason| PersonalityError::Cert {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CA_PEM: &str = include_str!("../tests/fixtures/ca.pem");

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().expect("create temp file");
        f.write_all(contents.as_bytes()).expect("write temp file");
        f
    }

    const SOURCE_YAML: &str = "host: db.internal\nport: \"3306\"\nuser: app\npassword: s3cret\ndatabase: speakers\n";

    #[test]
    fn pool_settings_defaults() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_open, 50);
        assert_eq!(settings.max_idle, 100);
        assert_eq!(settings.max_lifetime, Duration::from_secs(50));
    }

    #[test]
    fn loads_source_and_certificates() {
        let source = write_temp(SOURCE_YAML);
        let pem = write_temp(CA_PEM);

        let (src, certs) = load(source.path(), pem.path()).expect("load should succeed");
        assert_eq!(
            src,
            DbSource {
                host: "db.internal".into(),
                port: "3306".into(),
                user: "app".into(),
                password: "s3cret".into(),
                database: "speakers".into(),
            }
        );
        assert_eq!(certs.len(), 1);
        assert!(certs.subjects()[0].contains("Personality Test Root CA"));
        assert_eq!(certs.pem(), CA_PEM.as_bytes());
    }

    #[test]
    fn numeric_port_is_accepted() {
        let source = write_temp("host: h\nport: 3306\nuser: u\npassword: p\ndatabase: d\n");
        let src = load_db_source(source.path()).expect("numeric port");
        assert_eq!(src.port, "3306");
    }

    #[test]
    fn numeric_and_boolean_values_load_as_text() {
        let source = write_temp(
            "host: 10\nport: 3306\nuser: true\npassword: 123456\ndatabase: 2019\n",
        );
        let src = load_db_source(source.path()).expect("scalars accepted");
        assert_eq!(src.host, "10");
        assert_eq!(src.user, "true");
        assert_eq!(src.password, "123456");
        assert_eq!(src.database, "2019");
    }

    #[test]
    fn negative_and_float_values_load_as_text() {
        let source = write_temp("host: h\nport: 3306\nuser: -7\npassword: 1.5\ndatabase: d\n");
        let src = load_db_source(source.path()).expect("scalars accepted");
        assert_eq!(src.user, "-7");
        assert_eq!(src.password, "1.5");
    }

    #[test]
    fn debug_output_hides_password() {
        let source = write_temp(SOURCE_YAML);
        let src = load_db_source(source.path()).unwrap();
        let dbg = format!("{src:?}");
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn missing_source_file_is_config_error() {
        let pem = write_temp(CA_PEM);
        let err = load(Path::new("/nonexistent/db-connection.yml"), pem.path()).unwrap_err();
        assert!(matches!(err, PersonalityError::Config { .. }), "{err}");
    }

    #[test]
    fn malformed_source_file_is_config_error() {
        let source = write_temp("host: [unterminated\n");
        let pem = write_temp(CA_PEM);
        let err = load(source.path(), pem.path()).unwrap_err();
        assert!(matches!(err, PersonalityError::Config { .. }), "{err}");
    }

    #[test]
    fn incomplete_source_file_is_config_error() {
        let source = write_temp("host: h\nport: \"3306\"\n");
        let err = load_db_source(source.path()).unwrap_err();
        assert!(matches!(err, PersonalityError::Config { .. }), "{err}");
    }

    #[test]
    fn missing_certificate_file_is_cert_error() {
        let source = write_temp(SOURCE_YAML);
        let err = load(source.path(), Path::new("/nonexistent/ca.pem")).unwrap_err();
        assert!(matches!(err, PersonalityError::Cert { .. }), "{err}");
    }

    #[test]
    fn certificate_file_without_certificates_is_rejected() {
        assert!(CertificatePool::from_pem(b"just some text\n").is_err());
        assert!(CertificatePool::from_pem(b"").is_err());
    }

    #[test]
    fn one_bad_certificate_rejects_the_bundle() {
        let bogus = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        let bundle = format!("{CA_PEM}{bogus}");
        assert!(CertificatePool::from_pem(bundle.as_bytes()).is_err());
    }

    #[test]
    fn bundle_of_two_certificates() {
        let bundle = format!("{CA_PEM}{CA_PEM}");
        let pool = CertificatePool::from_pem(bundle.as_bytes()).expect("two certs");
        assert_eq!(pool.len(), 2);
    }
}
