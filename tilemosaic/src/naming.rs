//! Tile filename convention shared by the fetcher and the assembler.
//!
//! Tiles are stored flat in one directory as
//! `{provider}_{mode}_{zoom}_{x}_{y}.{ext}`, for example
//! `bing_satellite_17_78912_46541.jpeg`.
//!
//! The name is both the dedup key for the fetcher (an existing file means the
//! tile is done) and the grid index for the assembler, so it must stay stable
//! across runs.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::coord::TileCoord;

/// Parsed tile filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFileName {
    /// Provider token, e.g. "bing"
    pub provider: String,
    /// Mode token, e.g. "satellite"
    pub mode: String,
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    /// Extension without the dot
    pub extension: String,
}

impl TileFileName {
    pub fn new(provider: &str, mode: &str, tile: &TileCoord, extension: &str) -> Self {
        Self {
            provider: provider.to_string(),
            mode: mode.to_string(),
            zoom: tile.zoom,
            x: tile.x,
            y: tile.y,
            extension: extension.to_string(),
        }
    }

    /// Tile index encoded in the name.
    pub fn tile(&self) -> TileCoord {
        TileCoord {
            x: self.x,
            y: self.y,
            zoom: self.zoom,
        }
    }

    /// Returns true when the name belongs to the given provider, mode and zoom.
    pub fn matches(&self, provider: &str, mode: &str, zoom: u8) -> bool {
        self.provider == provider && self.mode == mode && self.zoom == zoom
    }
}

impl fmt::Display for TileFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}.{}",
            self.provider, self.mode, self.zoom, self.x, self.y, self.extension
        )
    }
}

/// Error parsing a tile filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Filename doesn't match the naming convention
    InvalidPattern,
    /// A numeric component overflowed its type
    InvalidNumber(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidPattern => write!(f, "Filename doesn't match tile pattern"),
            ParseError::InvalidNumber(s) => write!(f, "Invalid tile number: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

fn tile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z0-9]+)_([a-z0-9]+)_(\d{1,2})_(\d{1,10})_(\d{1,10})\.([A-Za-z0-9]+)$")
            .expect("tile filename pattern is valid")
    })
}

/// Parses a filename produced by [`TileFileName`]'s `Display`.
///
/// Temporary download files (`*.part`) never match because the extension is
/// followed by another suffix.
pub fn parse_tile_filename(filename: &str) -> Result<TileFileName, ParseError> {
    let captures = tile_pattern()
        .captures(filename)
        .ok_or(ParseError::InvalidPattern)?;

    let number = |i: usize| captures[i].to_string();
    let zoom = captures[3]
        .parse::<u8>()
        .map_err(|_| ParseError::InvalidNumber(number(3)))?;
    let x = captures[4]
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber(number(4)))?;
    let y = captures[5]
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber(number(5)))?;

    Ok(TileFileName {
        provider: captures[1].to_string(),
        mode: captures[2].to_string(),
        zoom,
        x,
        y,
        extension: captures[6].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_convention() {
        let tile = TileCoord {
            x: 78912,
            y: 46541,
            zoom: 17,
        };
        let name = TileFileName::new("bing", "satellite", &tile, "jpeg");
        assert_eq!(name.to_string(), "bing_satellite_17_78912_46541.jpeg");
    }

    #[test]
    fn test_parse_valid_filename() {
        let parsed = parse_tile_filename("pkk_cadastre_15_19733_11634.png").unwrap();
        assert_eq!(parsed.provider, "pkk");
        assert_eq!(parsed.mode, "cadastre");
        assert_eq!(parsed.zoom, 15);
        assert_eq!(parsed.x, 19733);
        assert_eq!(parsed.y, 11634);
        assert_eq!(parsed.extension, "png");
    }

    #[test]
    fn test_parse_roundtrips_display() {
        let tile = TileCoord {
            x: 2,
            y: 1,
            zoom: 2,
        };
        let name = TileFileName::new("yandex", "road", &tile, "png");
        assert_eq!(parse_tile_filename(&name.to_string()).unwrap(), name);
    }

    #[test]
    fn test_parse_rejects_temp_files() {
        assert_eq!(
            parse_tile_filename("bing_satellite_2_2_1.jpeg.part"),
            Err(ParseError::InvalidPattern)
        );
    }

    #[test]
    fn test_parse_rejects_unrelated_files() {
        for name in [
            "stitched.png",
            "mosaic.json",
            "bing_satellite_2_2.jpeg",
            "bing_satellite_2_2_x.jpeg",
            "bing_satellite_2_2_1",
            ".hidden",
        ] {
            assert_eq!(
                parse_tile_filename(name),
                Err(ParseError::InvalidPattern),
                "{} should not parse",
                name
            );
        }
    }

    #[test]
    fn test_parse_rejects_number_overflow() {
        assert_eq!(
            parse_tile_filename("bing_satellite_99_1_1.jpeg").map(|n| n.zoom),
            Ok(99)
        );
        assert!(matches!(
            parse_tile_filename("bing_satellite_1_9999999999_1.jpeg"),
            Err(ParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_matches_selection() {
        let parsed = parse_tile_filename("bing_road_12_1_2.jpeg").unwrap();
        assert!(parsed.matches("bing", "road", 12));
        assert!(!parsed.matches("bing", "satellite", 12));
        assert!(!parsed.matches("bing", "road", 13));
    }
}
