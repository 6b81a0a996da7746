//! Chat, call, meeting and mail deep links

use crate::{Error, Result};
use std::io;

const TEAMS_BASE: &str = "https://teams.microsoft.com/l";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Chat,
    Call,
    Meeting,
    Mail,
}

impl LinkKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Chat => "chat",
            LinkKind::Call => "call",
            LinkKind::Meeting => "meeting",
            LinkKind::Mail => "mail",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(LinkKind::Chat),
            "call" => Ok(LinkKind::Call),
            "meeting" => Ok(LinkKind::Meeting),
            "mail" | "email" => Ok(LinkKind::Mail),
            _ => Err(format!("unknown link kind '{s}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub kind: LinkKind,
    pub url: String,
}

/// Build the link for `kind` addressed to `emails` (joined with commas).
pub fn deep_link(kind: LinkKind, emails: &[String]) -> Result<DeepLink> {
    let recipients: Vec<&str> = emails
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if recipients.is_empty() {
        return Err(Error::InvalidInput("no recipients selected".to_string()));
    }

    let joined = recipients.join(",");
    let url = match kind {
        LinkKind::Chat => format!("{TEAMS_BASE}/chat/0/0?users={joined}"),
        LinkKind::Call => format!("{TEAMS_BASE}/call/0/0?users={joined}"),
        LinkKind::Meeting => format!("{TEAMS_BASE}/meeting/new?attendees={joined}"),
        LinkKind::Mail => format!("mailto:{joined}"),
    };

    Ok(DeepLink { kind, url })
}

/// Opens URLs in the host application or a plain window.
pub trait LinkLauncher {
    fn open_in_host(&self, url: &str) -> io::Result<()>;
    fn open_window(&self, url: &str) -> io::Result<()>;
}

/// Open `link`, falling back to a plain window when the host refuses.
///
/// Mail links always go straight to the window opener.
pub fn launch(launcher: &dyn LinkLauncher, link: &DeepLink) -> io::Result<()> {
    if link.kind == LinkKind::Mail {
        return launcher.open_window(&link.url);
    }

    launcher.open_in_host(&link.url).or_else(|err| {
        log::warn!("Host could not open {} link ({err}); opening a window", link.kind);
        launcher.open_window(&link.url)
    })
}
