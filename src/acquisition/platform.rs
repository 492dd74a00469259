use reqwest::Url;
use serde::Serialize;
use std::fmt;

use crate::error::AcquisitionError;

/// Video hosts recognised as such but without an acquisition strategy.
const UNSUPPORTED_HOSTS: [&str; 8] = [
    "youtube.com",
    "youtu.be",
    "facebook.com",
    "fb.watch",
    "vimeo.com",
    "x.com",
    "twitter.com",
    "twitch.tv",
];

const INSTAGRAM_POST_PREFIXES: [&str; 4] = ["/reel/", "/reels/", "/p/", "/tv/"];

/// Where a URL points, which decides how captions are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    TikTok,
    Instagram,
    /// Any other http(s) page, treated as a recipe webpage
    Web,
}

impl Platform {
    pub fn detect(url: &str) -> Result<Platform, AcquisitionError> {
        let unsupported = || AcquisitionError::UnsupportedPlatform(url.to_string());

        let parsed = Url::parse(url.trim()).map_err(|_| unsupported())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(unsupported());
        }
        let host = parsed.host_str().ok_or_else(unsupported)?.to_lowercase();

        if host_matches(&host, "tiktok.com") {
            return Ok(Platform::TikTok);
        }
        if host_matches(&host, "instagram.com") {
            let path = parsed.path();
            return if INSTAGRAM_POST_PREFIXES.iter().any(|p| path.starts_with(p)) {
                Ok(Platform::Instagram)
            } else {
                Err(unsupported())
            };
        }
        if UNSUPPORTED_HOSTS.iter().any(|h| host_matches(&host, h)) {
            return Err(unsupported());
        }

        Ok(Platform::Web)
    }

    /// Social video platforms carry captions; webpages carry descriptions.
    pub fn is_video(&self) -> bool {
        !matches!(self, Platform::Web)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Web => "web",
        };
        write!(f, "{}", name)
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}
