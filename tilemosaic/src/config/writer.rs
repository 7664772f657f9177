//! Renders a `ConfigFile` as commented INI text.

use std::path::Path;

use super::settings::ConfigFile;

/// Every key is written, with a comment describing it.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let user_agents = config
        .download
        .user_agents
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let sentinel = config
        .output
        .sentinel
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[provider]
; Tile provider:
;   bing   - Bing Maps (modes: satellite, road)
;   yandex - Yandex Maps (modes: satellite, road; "map" is accepted for road)
;            Rate limited: requests are spaced by the polite delay below
;   pkk    - Public cadastral map export service (modes: cadastre, thematic)
type = {}
mode = {}

[download]
; Number of simultaneous downloads (default: 4, max: 64)
parallel = {}
; Timeout in seconds for each HTTP request (default: 30)
timeout = {}
; Extra attempts after a timeout or network error (default: 2)
max_retries = {}
; Pause after each request to a rate-limited provider, in milliseconds (default: 5000)
polite_delay_ms = {}
; Random extra pause added to polite_delay_ms, in milliseconds (default: 1000)
polite_jitter_ms = {}
; File with one User-Agent string per line, rotated per request
; If empty, a fixed browser User-Agent is sent
user_agents = {}

[output]
; Directory tiles are stored in (default: ./tiles)
directory = {}
; Image of the provider's "no imagery" tile; matching tiles are left
; transparent in the mosaic. If empty, no-data detection is disabled.
sentinel = {}

[logging]
; Log file path (default: ~/.tilemosaic/tilemosaic.log)
file = {}
"#,
        config.provider.provider_type,
        config.provider.mode,
        config.download.parallel,
        config.download.timeout,
        config.download.max_retries,
        config.download.polite_delay_ms,
        config.download.polite_jitter_ms,
        user_agents,
        path_to_string(&config.output.directory),
        sentinel,
        path_to_string(&config.logging.file),
    )
}

/// Renders a path, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_contains_every_section() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[provider]", "[download]", "[output]", "[logging]"] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("type = bing"));
        assert!(content.contains("parallel = 4"));
        assert!(content.contains("polite_delay_ms = 5000"));
    }

    #[test]
    fn test_output_parses_as_ini() {
        let content = to_config_string(&ConfigFile::default());
        let ini = ini::Ini::load_from_str(&content).unwrap();
        let download = ini.section(Some("download")).unwrap();
        assert_eq!(download.get("timeout"), Some("30"));
        assert_eq!(download.get("user_agents"), Some(""));
    }

    #[test]
    fn test_home_paths_abbreviated() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path_to_string(&home.join("tiles")), "~/tiles");
        }
        assert_eq!(path_to_string(&PathBuf::from("/srv/tiles")), "/srv/tiles");
    }
}
