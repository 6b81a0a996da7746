//! View state synchronization
//!
//! [`ViewSynchronizer`] owns the canonical UI state. Every mutation arrives as
//! a named [`Action`]; `dispatch` applies it and then saves the full
//! [`UiStateSnapshot`](crate::models::UiStateSnapshot) exactly once. Saving is
//! skipped until the directory has loaded, and restoration only happens after
//! it has, since cached ids are validated against the loaded org map.

mod action;
mod selection;
mod synchronizer;

pub use action::Action;
pub use selection::SelectionSet;
pub use synchronizer::ViewSynchronizer;

use crate::io::cache::UI_STATE_TTL;
use crate::models::ALL_COMPANIES;
use crate::services::tree::OrphanPolicy;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub const MIN_SIDEBAR_WIDTH: u32 = 220;
pub const MAX_SIDEBAR_WIDTH: u32 = 400;
pub const DEFAULT_SIDEBAR_WIDTH: u32 = 320;

/// Options for the synchronizer
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Organization selected when the current user cannot be located.
    pub default_org_id: Option<String>,
    /// Partition shown before any state is restored.
    pub default_company: String,
    pub orphan_policy: OrphanPolicy,
    pub ui_state_ttl: Duration,
    pub default_sidebar_width: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            default_org_id: None,
            default_company: ALL_COMPANIES.to_string(),
            orphan_policy: OrphanPolicy::Drop,
            ui_state_ttl: UI_STATE_TTL,
            default_sidebar_width: DEFAULT_SIDEBAR_WIDTH,
        }
    }
}

/// Progress of the initial directory load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Handed to asynchronous work; reports whether its owner is still mounted.
#[derive(Debug, Clone)]
pub struct LivenessToken {
    alive: Rc<Cell<bool>>,
}

impl LivenessToken {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.alive.get()
    }
}

#[must_use]
pub fn clamp_sidebar_width(width: u32) -> u32 {
    width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH)
}
