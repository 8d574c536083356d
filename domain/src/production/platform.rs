//! Target platform value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tolerance used for platforms without a known profile (±20%).
pub const DEFAULT_TOLERANCE: f64 = 0.20;

/// Acceptable deviation band around the requested total duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Symmetric fraction of the total duration (0.1 = ±10%)
    pub fraction: f64,
}

impl Tolerance {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// Lower and upper duration bounds for a given total.
    pub fn bounds(&self, total: f64) -> (f64, f64) {
        (total * (1.0 - self.fraction), total * (1.0 + self.fraction))
    }

    /// Whether `actual` lies inside the band around `total`.
    pub fn contains(&self, total: f64, actual: f64) -> bool {
        let (min, max) = self.bounds(total);
        actual >= min && actual <= max
    }

    /// Tolerance as a whole percentage, for prompts and display.
    pub fn percent(&self) -> u32 {
        (self.fraction * 100.0).round() as u32
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

/// Platform the finished video is published to (Value Object)
///
/// Parsing never fails: unrecognized names become [`Platform::Other`] and
/// receive the default tolerance band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    YouTubeShorts,
    TikTok,
    InstagramReels,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::YouTubeShorts => "youtube-shorts",
            Platform::TikTok => "tiktok",
            Platform::InstagramReels => "instagram-reels",
            Platform::Other(s) => s,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Platform::YouTubeShorts => "YouTube Shorts",
            Platform::TikTok => "TikTok",
            Platform::InstagramReels => "Instagram Reels",
            Platform::Other(s) => s,
        }
    }

    /// Duration tolerance for this platform.
    pub fn tolerance(&self) -> Tolerance {
        match self {
            Platform::YouTubeShorts => Tolerance::new(0.10),
            Platform::TikTok => Tolerance::new(0.10),
            Platform::InstagramReels => Tolerance::new(0.15),
            Platform::Other(_) => Tolerance::default(),
        }
    }

    /// Longest video the platform accepts, in seconds (if known).
    pub fn max_duration(&self) -> Option<f64> {
        match self {
            Platform::YouTubeShorts => Some(60.0),
            Platform::TikTok => Some(600.0),
            Platform::InstagramReels => Some(90.0),
            Platform::Other(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Platform::Other(_))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Ok(match normalized.as_str() {
            "youtube-shorts" | "youtube" | "shorts" | "yt-shorts" | "yt" => Platform::YouTubeShorts,
            "tiktok" | "tik-tok" => Platform::TikTok,
            "instagram-reels" | "instagram" | "reels" | "ig" => Platform::InstagramReels,
            _ => Platform::Other(normalized),
        })
    }
}

impl Serialize for Platform {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // FromStr is infallible
        Ok(s.parse().unwrap_or_default())
    }
}
