//! Station constants
//!
//! The player serves exactly one station. Its endpoint and link catalogue
//! are fixed at compile time.

use serde::Serialize;

/// Live MP3 stream endpoint
pub const STREAM_URL: &str = "https://radioserver.krushiradio.lk/listen/krushi_radio/radio.mp3";

pub const STATION_NAME: &str = "Krushi Radio";

pub const TAGLINE: &str = "Official Agricultural Media Network in Sri Lanka";

pub const CREDIT: &str = "Developed by Krushi Radio Team";

/// External link shown in the station menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationLink {
    /// Stable key
    pub id: &'static str,
    pub label: &'static str,
    pub url: &'static str,
}

/// Link catalogue in display order
pub static LINKS: [StationLink; 7] = [
    StationLink {
        id: "programLibrary",
        label: "Programme Library",
        url: "https://www.programmeslibrary.krushiradio.lk",
    },
    StationLink {
        id: "newsWebsite",
        label: "News Website",
        url: "https://www.krushiradionews.lk",
    },
    StationLink {
        id: "stationWebsite",
        label: "Krushi Radio Website",
        url: "https://www.krushiradio.lk",
    },
    StationLink {
        id: "facebook",
        label: "Facebook",
        url: "https://www.facebook.com/krushiradio/",
    },
    StationLink {
        id: "youtube",
        label: "YouTube",
        url: "https://www.youtube.com/@KrushiRadio",
    },
    StationLink {
        id: "linkedin",
        label: "LinkedIn",
        url: "https://www.linkedin.com/company/73046085/admin/dashboard/",
    },
    StationLink {
        id: "twitter",
        label: "X (Twitter)",
        url: "https://x.com/i/flow/login?redirect_after_login=%2FRadioKrush81648",
    },
];

/// Static station description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationInfo {
    pub name: &'static str,
    pub tagline: &'static str,
    pub stream_url: &'static str,
    pub credit: &'static str,
}

/// Description of the station this player serves
pub fn station_info() -> StationInfo {
    StationInfo {
        name: STATION_NAME,
        tagline: TAGLINE,
        stream_url: STREAM_URL,
        credit: CREDIT,
    }
}

/// Look up a link by its key
pub fn link(id: &str) -> Option<&'static StationLink> {
    LINKS.iter().find(|link| link.id == id)
}
