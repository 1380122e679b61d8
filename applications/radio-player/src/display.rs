//! Terminal rendering and key handling for `listen`

use radio_connectivity::ConnectivityStatus;
use radio_playback::station::{StationInfo, StationLink};
use radio_playback::{Intent, SessionSnapshot, SessionState};

/// One line of listener input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key {
    Toggle,
    VolumeUp,
    VolumeDown,
    Quit,
}

impl Key {
    /// Parse a line read from stdin
    ///
    /// `p` or a lone space toggles, `+`/`=` and `-` change volume, `q` quits.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == " " {
            return Some(Key::Toggle);
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "p" => Some(Key::Toggle),
            "+" | "=" => Some(Key::VolumeUp),
            "-" => Some(Key::VolumeDown),
            "q" | "quit" => Some(Key::Quit),
            _ => None,
        }
    }

    /// Session intent for this key; `None` for quit
    pub fn intent(self) -> Option<Intent> {
        match self {
            Key::Toggle => Some(Intent::Toggle),
            Key::VolumeUp => Some(Intent::VolumeUp),
            Key::VolumeDown => Some(Intent::VolumeDown),
            Key::Quit => None,
        }
    }
}

fn state_label(snapshot: &SessionSnapshot) -> &'static str {
    match snapshot.state {
        SessionState::Idle => "Stopped",
        SessionState::Loading => "Buffering...",
        SessionState::Playing => "Live",
        SessionState::Paused => "Paused",
        SessionState::Error if snapshot.retry_pending => "Reconnecting",
        SessionState::Error => "Offline",
    }
}

/// Status line for a snapshot
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let control = if snapshot.controls_enabled() {
        match snapshot.state {
            SessionState::Playing => "[p] pause",
            _ => "[p] play",
        }
    } else {
        "[p] --"
    };

    let mut line = format!(
        "{:<13} {:>3}%  network: {:<13} {}",
        state_label(snapshot),
        snapshot.volume_percent(),
        snapshot.connectivity.quality.label(),
        control,
    );

    if let Some(message) = snapshot.status_message() {
        line.push_str("\n  ");
        line.push_str(message);
        if snapshot.reconnect_attempts > 0 {
            line.push_str(&format!(" (attempt {})", snapshot.reconnect_attempts));
        }
    }

    line
}

pub fn render_station(info: &StationInfo) -> String {
    format!(
        "{}\n{}\n\nStream: {}\n{}",
        info.name, info.tagline, info.stream_url, info.credit
    )
}

pub fn render_links(links: &[StationLink]) -> String {
    let width = links.iter().map(|link| link.label.len()).max().unwrap_or(0);
    links
        .iter()
        .map(|link| format!("{:<width$}  {}", link.label, link.url, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_connectivity(status: &ConnectivityStatus) -> String {
    let reachability = if status.reachable {
        "reachable"
    } else {
        "unreachable"
    };
    format!("Stream host {} (quality: {})", reachability, status.quality.label())
}
