//! A single resolved tile download.

use std::path::{Path, PathBuf};

use crate::coord::TileCoord;
use crate::provider::ProviderSpec;

/// Everything needed to download one tile and store it.
///
/// Requests are produced by the provider resolver and consumed exactly once
/// by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub tile: TileCoord,
    pub spec: ProviderSpec,
    pub url: String,
    /// Final location of the tile; existence means the tile is done.
    pub destination: PathBuf,
    /// Provider headers; the scheduler adds the user agent.
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Sibling path the body is written to before the atomic rename.
    pub fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.destination)
    }
}

pub(crate) fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling_with_part_suffix() {
        let request = FetchRequest {
            tile: TileCoord {
                x: 2,
                y: 1,
                zoom: 2,
            },
            spec: ProviderSpec::BingSatellite,
            url: "http://example.com".to_string(),
            destination: PathBuf::from("/tmp/tiles/bing_satellite_2_2_1.jpeg"),
            headers: Vec::new(),
        };

        assert_eq!(
            request.temp_path(),
            PathBuf::from("/tmp/tiles/bing_satellite_2_2_1.jpeg.part")
        );
    }
}
