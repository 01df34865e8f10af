// Tick-Scheduler auf Basis von embassy_time::Ticker
//
// Der Taster-Task wartet in `next_tick()` auf den nächsten fälligen Tick
// und ruft dann `ButtonMonitor::poll()` bzw. `heartbeat()` auf.

use core::future::pending;

use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Ticker};
use pushbutton_core::{ScheduleError, Scheduler, TickTask};

/// Zwei unabhängige Ticker (Taster-Abfrage + Watchdog)
pub struct TickerScheduler {
    poll: Option<Ticker>,
    heartbeat: Option<Ticker>,
}

impl TickerScheduler {
    pub const fn new() -> Self {
        Self {
            poll: None,
            heartbeat: None,
        }
    }

    fn slot(&mut self, task: TickTask) -> &mut Option<Ticker> {
        match task {
            TickTask::ButtonPoll => &mut self.poll,
            TickTask::Heartbeat => &mut self.heartbeat,
        }
    }

    /// Wartet auf den nächsten Tick
    ///
    /// Ohne registrierte Ticks wartet die Funktion für immer
    /// (der Aufrufer selektiert parallel auf Events).
    pub async fn next_tick(&mut self) -> TickTask {
        let Self { poll, heartbeat } = self;
        match select(wait(poll), wait(heartbeat)).await {
            Either::First(()) => TickTask::ButtonPoll,
            Either::Second(()) => TickTask::Heartbeat,
        }
    }
}

impl Default for TickerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait(ticker: &mut Option<Ticker>) {
    match ticker {
        Some(ticker) => ticker.next().await,
        None => pending().await,
    }
}

impl Scheduler for TickerScheduler {
    fn schedule_repeating(
        &mut self,
        task: TickTask,
        period: core::time::Duration,
    ) -> Result<(), ScheduleError> {
        let slot = self.slot(task);
        if slot.is_some() {
            return Err(ScheduleError::AlreadyScheduled);
        }
        let period = Duration::from_millis(period.as_millis() as u64);
        *slot = Some(Ticker::every(period));
        Ok(())
    }

    fn cancel(&mut self, task: TickTask) -> Result<(), ScheduleError> {
        self.slot(task)
            .take()
            .map(|_| ())
            .ok_or(ScheduleError::NotScheduled)
    }
}
