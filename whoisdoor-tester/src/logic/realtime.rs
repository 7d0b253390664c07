//! Scenarios that run a session on the tokio driver against the wall clock.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use tokio::time::{Instant, sleep, timeout};
use whoisdoor_game::driver;
use whoisdoor_game::{
    Activity, EngineCommand, EngineConfig, GamePhase, Language, LifeSession, SessionHandle,
};

const SCHEDULING_SLACK: Duration = Duration::from_millis(25);
const ARRIVAL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct RealtimePlan {
    /// Overrides the configured delay so runs stay short.
    pub arrival_delay_ms: u64,
    /// Press Escape while the arrival is pending.
    pub escape_before_arrival: bool,
}

impl RealtimePlan {
    #[must_use]
    pub const fn arrival(arrival_delay_ms: u64) -> Self {
        Self {
            arrival_delay_ms,
            escape_before_arrival: false,
        }
    }

    #[must_use]
    pub const fn cancelled(arrival_delay_ms: u64) -> Self {
        Self {
            arrival_delay_ms,
            escape_before_arrival: true,
        }
    }
}

async fn finish_chores(handle: &SessionHandle, cfg: &EngineConfig) -> Result<()> {
    handle
        .send(EngineCommand::StartGame {
            language: Language::English,
        })
        .await?;
    handle.send(EngineCommand::ChildDeparts).await?;
    for _ in 0..cfg.ironing_max.div_ceil(cfg.ironing_step) {
        handle
            .send(EngineCommand::PerformActivity {
                activity: Activity::Ironing,
            })
            .await?;
    }
    let max = cfg.ironing_max;
    let mut snapshots = handle.subscribe();
    timeout(
        ARRIVAL_TIMEOUT,
        snapshots.wait_for(|s| s.ironing_complete(max)),
    )
    .await
    .context("ironing never completed")??;
    Ok(())
}

/// Drive one realtime playthrough up to the arrival.
///
/// # Errors
///
/// Fails when the arrival fires early, late, or despite a cancellation.
pub async fn run_realtime(plan: &RealtimePlan, base: &EngineConfig, seed: u64) -> Result<()> {
    let cfg = EngineConfig {
        arrival_delay_ms: plan.arrival_delay_ms,
        ..base.clone()
    };
    cfg.validate()?;
    let delay = cfg.arrival_delay();

    let (handle, task) = driver::spawn(LifeSession::with_seed(cfg.clone(), seed));
    finish_chores(&handle, &cfg).await?;
    let armed = Instant::now();
    ensure!(
        handle.snapshot().phase == GamePhase::Waiting,
        "child arrived before the delay elapsed"
    );

    if plan.escape_before_arrival {
        handle.send(EngineCommand::ReturnToMenu).await?;
        sleep(delay * 2 + SCHEDULING_SLACK).await;
        let phase = handle.snapshot().phase;
        ensure!(
            phase == GamePhase::Menu,
            "cancelled arrival still fired (phase {phase})"
        );
    } else {
        let mut snapshots = handle.subscribe();
        timeout(
            delay + ARRIVAL_TIMEOUT,
            snapshots.wait_for(|s| s.phase == GamePhase::Arrival),
        )
        .await
        .context("child never arrived")??;
        let waited = armed.elapsed();
        ensure!(
            waited + SCHEDULING_SLACK >= delay,
            "arrival after {waited:?}, expected at least {delay:?}"
        );
        log::debug!("seed {seed}: arrival after {waited:?}");
    }

    drop(handle);
    let session = task.await.context("session task panicked")?;
    log::trace!("seed {seed}: {} companion draws", session.draws());
    Ok(())
}
