//! Rewarded-ad providers.
//!
//! The game only needs one capability from an ad SDK: show a rewarded ad and
//! report whether the reward was earned. Which provider runs is decided by
//! configuration at startup.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};
use uuid::Uuid;

/// Invoked once when the player earns the reward.
pub type GrantCallback = Box<dyn FnOnce() + Send>;

#[async_trait]
pub trait RewardProvider: Send + Sync {
    /// Shows a rewarded ad. Resolves `true` and runs `on_granted` exactly
    /// once if the reward was earned; otherwise resolves `false` and never
    /// runs it.
    async fn show_rewarded_ad(&self, on_granted: GrantCallback) -> bool;

    /// Ticket of the ad currently waiting for an outcome, if any.
    fn pending_ticket(&self) -> Option<Uuid> {
        None
    }

    /// Reports the outcome of a pending ad. Returns `false` for unknown tickets.
    fn complete(&self, _ticket: Uuid, _earned: bool) -> bool {
        false
    }
}

/// Stand-in for the ad SDK: waits a fixed delay, then resolves with a
/// configured outcome.
#[derive(Debug, Clone)]
pub struct MockRewardProvider {
    delay: Duration,
    grant: bool,
}

impl MockRewardProvider {
    pub fn new(delay: Duration, grant: bool) -> Self {
        Self { delay, grant }
    }
}

#[async_trait]
impl RewardProvider for MockRewardProvider {
    async fn show_rewarded_ad(&self, on_granted: GrantCallback) -> bool {
        tokio::time::sleep(self.delay).await;
        if self.grant {
            info!("[Ads] mock rewarded ad granted");
            on_granted();
        } else {
            info!("[Ads] mock rewarded ad declined");
        }
        self.grant
    }
}

struct PendingAd {
    ticket: Uuid,
    respond: oneshot::Sender<bool>,
}

/// Waits for the ad SDK bridge to report the outcome of a real ad.
///
/// One ad is shown at a time; opening a new one resolves the previous ad as
/// not earned. Ads that get no outcome within `timeout` are not earned.
pub struct ExternalRewardProvider {
    pending: Mutex<Option<PendingAd>>,
    timeout: Duration,
}

impl ExternalRewardProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(None),
            timeout,
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<PendingAd>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open(&self) -> (Uuid, oneshot::Receiver<bool>) {
        let (respond, outcome) = oneshot::channel();
        let ticket = Uuid::new_v4();
        if let Some(previous) = self.pending().replace(PendingAd { ticket, respond }) {
            warn!("[Ads] ad {} superseded before completing", previous.ticket);
            let _ = previous.respond.send(false);
        }
        (ticket, outcome)
    }

    fn abandon(&self, ticket: Uuid) {
        let mut pending = self.pending();
        if pending.as_ref().is_some_and(|ad| ad.ticket == ticket) {
            pending.take();
        }
    }
}

// Clears the ticket when the waiting future finishes or is dropped, so an
// outcome reported after the caller went away is refused.
struct AbandonOnDrop<'a> {
    provider: &'a ExternalRewardProvider,
    ticket: Uuid,
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        self.provider.abandon(self.ticket);
    }
}

#[async_trait]
impl RewardProvider for ExternalRewardProvider {
    async fn show_rewarded_ad(&self, on_granted: GrantCallback) -> bool {
        let (ticket, outcome) = self.open();
        let _abandon = AbandonOnDrop { provider: self, ticket };
        info!("[Ads] waiting for rewarded ad {}", ticket);

        let earned = match tokio::time::timeout(self.timeout, outcome).await {
            Ok(Ok(earned)) => earned,
            Ok(Err(_)) => false,
            Err(_) => {
                warn!("[Ads] rewarded ad {} timed out", ticket);
                false
            }
        };

        if earned {
            on_granted();
        }
        earned
    }

    fn pending_ticket(&self) -> Option<Uuid> {
        self.pending().as_ref().map(|ad| ad.ticket)
    }

    fn complete(&self, ticket: Uuid, earned: bool) -> bool {
        let mut pending = self.pending();
        match pending.take() {
            Some(ad) if ad.ticket == ticket => {
                info!("[Ads] rewarded ad {} completed, earned: {}", ticket, earned);
                ad.respond.send(earned).is_ok()
            }
            other => {
                *pending = other;
                false
            }
        }
    }
}
