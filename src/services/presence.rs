//! Presence batching and merging

use crate::Result;
use crate::models::Presence;
use std::collections::{HashMap, HashSet};

/// Fetches presence for a batch of email addresses.
pub trait PresenceSource {
    fn fetch(&self, emails: &[String]) -> Result<Vec<Presence>>;
}

/// Display tone of an availability value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTone {
    Available,
    Busy,
    Away,
    OutOfOffice,
    Offline,
}

impl PresenceTone {
    #[must_use]
    pub fn from_availability(availability: &str) -> Self {
        match availability {
            "Available" | "AvailableIdle" => PresenceTone::Available,
            "Busy" | "BusyIdle" | "OnThePhone" | "InACall" | "InAMeeting" | "DoNotDisturb"
            | "Presenting" | "UrgentInterruptionsOnly" => PresenceTone::Busy,
            "BeRightBack" | "Away" | "Inactive" => PresenceTone::Away,
            "OutOfOffice" => PresenceTone::OutOfOffice,
            _ => PresenceTone::Offline,
        }
    }

    /// ANSI color used by terminal output.
    #[must_use]
    pub fn ansi_color(&self) -> &'static str {
        match self {
            PresenceTone::Available => "\x1b[32m",
            PresenceTone::Busy => "\x1b[31m",
            PresenceTone::Away => "\x1b[33m",
            PresenceTone::OutOfOffice => "\x1b[35m",
            PresenceTone::Offline => "\x1b[90m",
        }
    }
}

/// Known presence per email plus the set of emails already requested.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    statuses: HashMap<String, Presence>,
    requested: HashSet<String>,
}

impl PresenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deduplicated, non-empty emails to request next.
    ///
    /// When `incremental` is set, emails already requested are skipped.
    #[must_use]
    pub fn pending<'a, I>(&self, emails: I, incremental: bool) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        emails
            .into_iter()
            .filter(|email| !email.is_empty())
            .filter(|email| !incremental || !self.requested.contains(*email))
            .filter(|email| seen.insert(*email))
            .map(str::to_string)
            .collect()
    }

    pub fn mark_requested(&mut self, emails: &[String]) {
        self.requested.extend(emails.iter().cloned());
    }

    /// Merge a batch; later results overwrite earlier ones per email.
    pub fn merge(&mut self, batch: Vec<Presence>) {
        for presence in batch {
            self.statuses.insert(presence.email.clone(), presence);
        }
    }

    #[must_use]
    pub fn get(&self, email: &str) -> Option<&Presence> {
        self.statuses.get(email)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
