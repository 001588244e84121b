//! Bridge between resolution and an external presentation layer.
//!
//! Resolution never waits for animations unboundedly: every attack gets one
//! time budget covering both the impact and the completion acknowledgment.
//! HP changes happen exactly once, at impact or when the impact wait ends.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use combat_core::UnitId;

/// One attack to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRequest {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub damage: u32,
}

/// Acknowledgment channels handed back by the presentation layer.
///
/// The bridge sends on `impact` when the hit lands and on `done` when the
/// animation finishes. Dropping a sender counts as an acknowledgment.
#[derive(Debug)]
pub struct AnimationTicket {
    pub impact: oneshot::Receiver<()>,
    pub done: oneshot::Receiver<()>,
}

impl AnimationTicket {
    /// A ticket whose acknowledgments are already sent.
    pub fn completed() -> Self {
        let (impact_tx, impact) = oneshot::channel();
        let (done_tx, done) = oneshot::channel();
        let _ = impact_tx.send(());
        let _ = done_tx.send(());
        Self { impact, done }
    }
}

/// Consumer-provided animation player.
pub trait AnimationBridge: Send + Sync {
    fn play_attack(&self, request: &AttackRequest) -> AnimationTicket;
}

/// Acknowledges every animation immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnimationBridge;

impl AnimationBridge for InstantAnimationBridge {
    fn play_attack(&self, _request: &AttackRequest) -> AnimationTicket {
        AnimationTicket::completed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationAck {
    Acknowledged,
    /// The sender was dropped without acknowledging.
    Dropped,
    TimedOut,
}

impl AnimationAck {
    pub fn timed_out(self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationReport {
    pub impact: AnimationAck,
    pub done: AnimationAck,
}

/// Plays one attack and runs `on_impact` exactly once.
///
/// `on_impact` runs after the impact acknowledgment or when the wait for it
/// gives up. The completion wait only gets what is left of `timeout`.
pub async fn play_attack<F>(
    bridge: &dyn AnimationBridge,
    request: AttackRequest,
    timeout: Duration,
    on_impact: F,
) -> AnimationReport
where
    F: FnOnce(),
{
    let deadline = Instant::now() + timeout;
    let ticket = bridge.play_attack(&request);

    let impact = wait(ticket.impact, deadline).await;
    if impact.timed_out() {
        warn!(
            target: "runtime::animation",
            attacker = %request.attacker,
            defender = %request.defender,
            ?timeout,
            "impact acknowledgment timed out, applying damage anyway"
        );
    }
    on_impact();

    let done = wait(ticket.done, deadline).await;
    if done.timed_out() {
        warn!(
            target: "runtime::animation",
            attacker = %request.attacker,
            "animation did not finish in time, continuing"
        );
    }

    debug!(target: "runtime::animation", ?impact, ?done, "attack animation settled");
    AnimationReport { impact, done }
}

async fn wait(rx: oneshot::Receiver<()>, deadline: Instant) -> AnimationAck {
    match time::timeout_at(deadline, rx).await {
        Ok(Ok(())) => AnimationAck::Acknowledged,
        Ok(Err(_)) => AnimationAck::Dropped,
        Err(_) => AnimationAck::TimedOut,
    }
}
