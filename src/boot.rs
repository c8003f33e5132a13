use std::thread;

use tracing::{debug, info};

use crate::domain::SortConfig;
use crate::dom::Document;
use crate::host::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStatus {
    /// No account yet, or no panel yet. Poll again.
    Waiting,
    /// The account lacks the capability. Polling stops for good.
    Declined,
    Ready,
}

/// Decides whether the sorting session should start on this page.
pub fn check<A: Account>(account: Option<&A>, doc: &Document, config: &SortConfig) -> BootStatus {
    let Some(account) = account.filter(|a| a.uid().is_some()) else {
        return BootStatus::Waiting;
    };
    if !account.can(&config.capability) {
        debug!("{} lacks \"{}\"", account.username(), config.capability);
        return BootStatus::Declined;
    }
    if doc.get_element_by_id(&config.panel_id).is_some() {
        BootStatus::Ready
    } else {
        BootStatus::Waiting
    }
}

/// Calls `poll` every `config.poll_interval` until it stops answering
/// `Waiting` or `max_attempts` is used up.
pub fn wait_for_activation(
    config: &SortConfig,
    max_attempts: usize,
    mut poll: impl FnMut() -> BootStatus,
) -> BootStatus {
    for attempt in 1..=max_attempts {
        let status = poll();
        if status != BootStatus::Waiting {
            info!("Boot finished after {attempt} attempt(s): {status:?}");
            return status;
        }
        if attempt < max_attempts {
            thread::sleep(config.poll_interval);
        }
    }
    BootStatus::Waiting
}
