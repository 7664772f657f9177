//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::MAX_PARALLEL;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::provider::ProviderSpec;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("type") {
            let v = v.trim().to_lowercase();
            let valid_providers = ["bing", "yandex", "pkk"];
            if !valid_providers.contains(&v.as_str()) {
                return Err(invalid(
                    "provider",
                    "type",
                    &v,
                    "must be one of: bing, yandex, pkk",
                ));
            }
            config.provider.provider_type = v;
        }
        if let Some(v) = section.get("mode") {
            config.provider.mode = v.trim().to_lowercase();
        }
        ProviderSpec::from_names(&config.provider.provider_type, &config.provider.mode)
            .map_err(|e| invalid("provider", "mode", &config.provider.mode, &e.to_string()))?;
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("parallel") {
            let parallel: usize = v
                .trim()
                .parse()
                .ok()
                .filter(|n| (1..=MAX_PARALLEL).contains(n))
                .ok_or_else(|| {
                    invalid(
                        "download",
                        "parallel",
                        v,
                        &format!("must be an integer between 1 and {}", MAX_PARALLEL),
                    )
                })?;
            config.download.parallel = parallel;
        }
        if let Some(v) = section.get("timeout") {
            config.download.timeout = v
                .trim()
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    invalid("download", "timeout", v, "must be a positive integer (seconds)")
                })?;
        }
        if let Some(v) = section.get("max_retries") {
            config.download.max_retries = v.trim().parse().map_err(|_| {
                invalid("download", "max_retries", v, "must be a non-negative integer")
            })?;
        }
        if let Some(v) = section.get("polite_delay_ms") {
            config.download.polite_delay_ms = v.trim().parse().map_err(|_| {
                invalid(
                    "download",
                    "polite_delay_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("polite_jitter_ms") {
            config.download.polite_jitter_ms = v.trim().parse().map_err(|_| {
                invalid(
                    "download",
                    "polite_jitter_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("user_agents") {
            config.download.user_agents = optional_path(v);
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            if let Some(dir) = optional_path(v) {
                config.output.directory = dir;
            }
        }
        if let Some(v) = section.get("sentinel") {
            config.output.sentinel = optional_path(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            if let Some(file) = optional_path(v) {
                config.logging.file = file;
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(expand_tilde(value))
    }
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_invalid_provider_type() {
        let err = load("[provider]\ntype = google\n").unwrap_err();
        assert!(err.to_string().contains("must be one of:"));
        assert!(err.to_string().contains("[provider] type"));
    }

    #[test]
    fn test_unsupported_mode_for_provider() {
        let err = load("[provider]\ntype = pkk\nmode = satellite\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section, key, value, ..
            } => {
                assert_eq!(section, "provider");
                assert_eq!(key, "mode");
                assert_eq!(value, "satellite");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_yandex_map_alias_accepted() {
        let config = load("[provider]\ntype = Yandex\nmode = map\n").unwrap();
        assert_eq!(config.provider.provider_type, "yandex");
        assert_eq!(config.provider_spec(), Ok(ProviderSpec::YandexRoad));
    }

    #[test]
    fn test_download_values_parsed() {
        let config = load(
            r#"
[download]
parallel = 16
timeout = 10
max_retries = 0
polite_delay_ms = 250
polite_jitter_ms = 50
user_agents = /etc/tilemosaic/agents.txt
"#,
        )
        .unwrap();

        assert_eq!(config.download.parallel, 16);
        assert_eq!(config.download.timeout, 10);
        assert_eq!(config.download.max_retries, 0);
        assert_eq!(config.download.polite_delay_ms, 250);
        assert_eq!(config.download.polite_jitter_ms, 50);
        assert_eq!(
            config.download.user_agents,
            Some(PathBuf::from("/etc/tilemosaic/agents.txt"))
        );
    }

    #[test]
    fn test_parallel_out_of_range() {
        for value in ["0", "65", "many"] {
            let err = load(&format!("[download]\nparallel = {}\n", value)).unwrap_err();
            assert!(
                err.to_string().contains("[download] parallel"),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(load("[download]\ntimeout = 0\n").is_err());
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = load("[output]\ndirectory =\nsentinel =\n[logging]\nfile =\n").unwrap();
        assert_eq!(
            config.output.directory,
            PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)
        );
        assert!(config.output.sentinel.is_none());
        assert_eq!(config.logging.file, default_log_file());
    }

    #[test]
    fn test_tilde_expansion() {
        let config = load("[output]\ndirectory = ~/tiles\n").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.output.directory, home.join("tiles"));
        }
    }
}
