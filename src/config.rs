use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `db.url` is not set in the file.
pub const DB_URL_ENV: &str = "CATALOG_DB_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub source: SourceConfig,
}

#[derive(Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    "products".to_string()
}

// The connection string may carry credentials.
impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("collection", &self.collection)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
}

impl DbConfig {
    /// The store connection string: `db.url`, else `$CATALOG_DB_URL`.
    pub fn connection_string(&self) -> Result<String> {
        if let Some(url) = self.url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.clone());
        }
        match std::env::var(DB_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(url),
            _ => bail!(
                "no store connection string: set db.url in the config file or {}",
                DB_URL_ENV
            ),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if !is_identifier(&config.db.collection) {
        bail!(
            "db.collection must match [A-Za-z_][A-Za-z0-9_]*, got '{}'",
            config.db.collection
        );
    }

    if config.source.path.as_os_str().is_empty() {
        bail!("source.path must not be empty");
    }

    Ok(config)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("catalog.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_with_default_collection() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[db]
url = "sqlite:/tmp/catalog.sqlite"

[source]
path = "catalog.xml"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.db.collection, "products");
        assert_eq!(cfg.source.path, PathBuf::from("catalog.xml"));
        assert_eq!(
            cfg.db.connection_string().unwrap(),
            "sqlite:/tmp/catalog.sqlite"
        );
    }

    #[test]
    fn rejects_bad_collection_name() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[db]
url = "sqlite::memory:"
collection = "demo; DROP TABLE x"

[source]
path = "catalog.xml"
"#,
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("db.collection"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn debug_output_hides_connection_string() {
        let db = DbConfig {
            url: Some("sqlite:/secret/path.sqlite".to_string()),
            collection: "products".to_string(),
        };
        let printed = format!("{:?}", db);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("products"));
        assert!(is_identifier("_demo2"));
        assert!(!is_identifier("2demo"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("demo-products"));
    }
}
