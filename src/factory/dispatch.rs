use crate::core::process::{Command, Process, SimContext};
use crate::core::types::ContainerId;
use crate::factory::config::PickupConfig;
use crate::factory::metrics::Counter;
use log::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DispatchState {
    /// Below the trigger; re-check each poll interval.
    Watching,
    /// Pickup called; waiting out the courier's lead time.
    CourierEnRoute,
    /// The removal of everything present at arrival time is in flight.
    Collecting { amount: u64 },
    /// Hand-off done; waiting before watching again.
    CoolingDown,
}

/// Finished-goods pickup loop.
///
/// The trigger is a minimum: the courier takes the *entire* level present
/// when it arrives, which can exceed the trigger because production keeps
/// running during the lead time. Every hand-off is credited to the shipment
/// ledger, which the factory reads after the run.
pub struct DispatchControl {
    name: String,
    dispatch: ContainerId,
    trigger_level: u64,
    lead_time_hours: f64,
    cooldown_hours: f64,
    poll_interval_hours: f64,
    hours_per_day: f64,
    shipped: Counter,
    pickup_id: Option<Uuid>,
    state: DispatchState,
}

impl DispatchControl {
    pub fn new(
        dispatch: ContainerId,
        pickup: &PickupConfig,
        poll_interval_hours: f64,
        hours_per_day: f64,
        shipped: Counter,
    ) -> Self {
        Self {
            name: "dispatch_control".to_string(),
            dispatch,
            trigger_level: pickup.trigger_level,
            lead_time_hours: pickup.lead_time_hours,
            cooldown_hours: pickup.cooldown_hours,
            poll_interval_hours,
            hours_per_day,
            shipped,
            pickup_id: None,
            state: DispatchState::Watching,
        }
    }
}

impl Process for DispatchControl {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Command {
        loop {
            match self.state {
                DispatchState::Watching => {
                    let level = ctx.level(self.dispatch);
                    if level >= self.trigger_level {
                        let pickup_id = Uuid::new_v4();
                        self.pickup_id = Some(pickup_id);
                        info!(
                            "[DispatchControl] {} sticks ready at {}; calling for pickup ({})",
                            level,
                            ctx.now().clock(self.hours_per_day),
                            pickup_id,
                        );
                        self.state = DispatchState::CourierEnRoute;
                        return Command::Hold(self.lead_time_hours);
                    }
                    return Command::Hold(self.poll_interval_hours);
                }
                DispatchState::CourierEnRoute => {
                    // Take whatever is present now, not just the trigger
                    // quantity.
                    let amount = ctx.level(self.dispatch);
                    info!(
                        "[DispatchControl] courier picking up {} sticks at {} ({})",
                        amount,
                        ctx.now().clock(self.hours_per_day),
                        self.pickup_id.unwrap_or_default(),
                    );
                    self.state = DispatchState::Collecting { amount };
                    return Command::Get(self.dispatch, amount);
                }
                DispatchState::Collecting { amount } => {
                    self.shipped.add(amount);
                    info!(
                        "[DispatchControl] {} sticks handed off ({} shipped in total, {})",
                        amount,
                        self.shipped.get(),
                        self.pickup_id.take().unwrap_or_default(),
                    );
                    self.state = DispatchState::CoolingDown;
                    return Command::Hold(self.cooldown_hours);
                }
                DispatchState::CoolingDown => {
                    self.state = DispatchState::Watching;
                }
            }
        }
    }
}
