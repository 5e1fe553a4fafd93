use super::container::Container;
use super::error::SimulationError;
use super::process::{Command, Process, SimContext};
use super::scheduler::WakeupQueue;
use super::types::{ContainerId, ProcessId, SimTime};
use log::debug;

/// Cooperative discrete-event engine.
///
/// Owns the virtual clock, the containers, and every spawned process. Many
/// processes exist but only one executes at a time: a resumed process runs
/// until it suspends on a timed delay or a container operation, then the
/// engine picks the next wakeup in time order (same-instant wakeups in
/// scheduling order).
pub struct SimulationEngine {
    clock: SimTime,
    scheduler: WakeupQueue,
    containers: Vec<Container>,
    processes: Vec<Box<dyn Process>>,
}

impl SimulationEngine {
    pub fn new() -> Self {
        Self {
            clock: SimTime::ZERO,
            scheduler: WakeupQueue::new(),
            containers: Vec::new(),
            processes: Vec::new(),
        }
    }

    /// Register a bounded container with its starting stock.
    pub fn add_container(
        &mut self,
        name: &str,
        capacity: u64,
        initial: u64,
    ) -> Result<ContainerId, SimulationError> {
        if capacity == 0 {
            return Err(SimulationError::ZeroCapacity {
                container: name.to_string(),
            });
        }
        if initial > capacity {
            return Err(SimulationError::InitialExceedsCapacity {
                container: name.to_string(),
                initial,
                capacity,
            });
        }
        let id = ContainerId(self.containers.len());
        self.containers.push(Container::new(name, capacity, initial));
        Ok(id)
    }

    /// Register a process and schedule its first resumption at the current
    /// simulated time.
    pub fn spawn(&mut self, process: Box<dyn Process>) -> ProcessId {
        let id = ProcessId(self.processes.len());
        debug!("spawning process [{}]", process.name());
        self.processes.push(process);
        self.scheduler.schedule(id, self.clock);
        id
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.clock
    }

    pub fn container_level(&self, id: ContainerId) -> u64 {
        self.containers[id.0].level()
    }

    pub fn container_capacity(&self, id: ContainerId) -> u64 {
        self.containers[id.0].capacity()
    }

    /// Run until no wakeup remains before `horizon`, then park the clock at
    /// the horizon. Work pending at that point is abandoned mid-state; a
    /// horizon of zero therefore runs nothing at all.
    pub fn run(&mut self, horizon: SimTime) -> Result<SimTime, SimulationError> {
        while let Some(at) = self.scheduler.next_time() {
            if at >= horizon {
                break;
            }
            if let Some((at, process)) = self.scheduler.pop() {
                self.clock = at;
                self.step(process)?;
            }
        }
        self.clock = horizon;
        Ok(self.clock)
    }

    /// Resume one process and execute the suspension it requests.
    fn step(&mut self, id: ProcessId) -> Result<(), SimulationError> {
        let command = {
            let process = &mut self.processes[id.0];
            debug!("t={} resuming [{}]", self.clock, process.name());
            let mut ctx = SimContext::new(self.clock, &self.containers);
            process.resume(&mut ctx)
        };

        match command {
            Command::Hold(hours) => {
                if !hours.is_finite() || hours < 0.0 {
                    return Err(SimulationError::InvalidHold {
                        process: self.processes[id.0].name().to_string(),
                        hours,
                    });
                }
                self.scheduler.schedule(id, self.clock.after(hours));
            }
            Command::Get(container, amount) => {
                self.check_amount(id, container, amount)?;
                self.containers[container.0].enqueue_get(id, amount);
                self.settle(container);
            }
            Command::Put(container, amount) => {
                self.check_amount(id, container, amount)?;
                self.containers[container.0].enqueue_put(id, amount);
                self.settle(container);
            }
        }
        Ok(())
    }

    /// Resolve whatever became satisfiable on `container` and schedule the
    /// released processes for zero-delay resumption, preserving the order in
    /// which their requests completed.
    fn settle(&mut self, container: ContainerId) {
        for process in self.containers[container.0].drain() {
            self.scheduler.schedule(process, self.clock);
        }
    }

    /// A request must be well-formed and satisfiable in principle; anything
    /// else is a configuration error that would otherwise block forever.
    fn check_amount(
        &self,
        process: ProcessId,
        container: ContainerId,
        amount: u64,
    ) -> Result<(), SimulationError> {
        let target = &self.containers[container.0];
        if amount == 0 {
            return Err(SimulationError::ZeroAmount {
                process: self.processes[process.0].name().to_string(),
                container: target.name().to_string(),
            });
        }
        if amount > target.capacity() {
            return Err(SimulationError::AmountExceedsCapacity {
                process: self.processes[process.0].name().to_string(),
                container: target.name().to_string(),
                amount,
                capacity: target.capacity(),
            });
        }
        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Holds for a fixed interval forever, counting resumptions.
    struct Pulser {
        name: String,
        interval: f64,
        resumptions: Rc<Cell<u64>>,
    }

    impl Process for Pulser {
        fn name(&self) -> &str {
            &self.name
        }

        fn resume(&mut self, _ctx: &mut SimContext<'_>) -> Command {
            self.resumptions.set(self.resumptions.get() + 1);
            Command::Hold(self.interval)
        }
    }

    /// Waits, takes one unit from a container, records its name, then idles.
    struct Taker {
        name: String,
        source: ContainerId,
        start_delay: f64,
        phase: u8,
        order: Rc<RefCell<Vec<String>>>,
    }

    impl Process for Taker {
        fn name(&self) -> &str {
            &self.name
        }

        fn resume(&mut self, _ctx: &mut SimContext<'_>) -> Command {
            self.phase += 1;
            match self.phase {
                1 => Command::Hold(self.start_delay),
                2 => Command::Get(self.source, 1),
                3 => {
                    self.order.borrow_mut().push(self.name.clone());
                    Command::Hold(1_000.0)
                }
                _ => Command::Hold(1_000.0),
            }
        }
    }

    /// Waits one hour, delivers a fixed amount, then idles.
    struct DelayedGiver {
        name: String,
        target: ContainerId,
        amount: u64,
        phase: u8,
    }

    impl Process for DelayedGiver {
        fn name(&self) -> &str {
            &self.name
        }

        fn resume(&mut self, _ctx: &mut SimContext<'_>) -> Command {
            self.phase += 1;
            match self.phase {
                1 => Command::Hold(1.0),
                2 => Command::Put(self.target, self.amount),
                _ => Command::Hold(1_000.0),
            }
        }
    }

    #[test]
    fn test_zero_horizon_runs_nothing() {
        let mut engine = SimulationEngine::new();
        let resumptions = Rc::new(Cell::new(0));
        engine.spawn(Box::new(Pulser {
            name: "pulser".to_string(),
            interval: 1.0,
            resumptions: Rc::clone(&resumptions),
        }));

        let end = engine.run(SimTime::ZERO).unwrap();
        assert_eq!(end, SimTime::ZERO);
        assert_eq!(resumptions.get(), 0);
    }

    #[test]
    fn test_horizon_cuts_off_pending_wakeups() {
        let mut engine = SimulationEngine::new();
        let resumptions = Rc::new(Cell::new(0));
        engine.spawn(Box::new(Pulser {
            name: "pulser".to_string(),
            interval: 1.0,
            resumptions: Rc::clone(&resumptions),
        }));

        let end = engine.run(SimTime::hours(5.0)).unwrap();
        // Resumed at t = 0, 1, 2, 3, 4; the t = 5 wakeup is past the horizon.
        assert_eq!(resumptions.get(), 5);
        assert_eq!(end, SimTime::hours(5.0));
    }

    #[test]
    fn test_blocked_getters_resume_in_request_order() {
        let mut engine = SimulationEngine::new();
        let stock = engine.add_container("stock", 10, 0).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second"] {
            engine.spawn(Box::new(Taker {
                name: name.to_string(),
                source: stock,
                start_delay: 0.0,
                phase: 0,
                order: Rc::clone(&order),
            }));
        }
        engine.spawn(Box::new(DelayedGiver {
            name: "supplier".to_string(),
            target: stock,
            amount: 2,
            phase: 0,
        }));

        engine.run(SimTime::hours(10.0)).unwrap();
        assert_eq!(*order.borrow(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(engine.container_level(stock), 0);
    }

    #[test]
    fn test_oversized_request_fails_fast() {
        let mut engine = SimulationEngine::new();
        let stock = engine.add_container("stock", 5, 0).unwrap();
        engine.spawn(Box::new(DelayedGiver {
            name: "supplier".to_string(),
            target: stock,
            amount: 6,
            phase: 0,
        }));

        let result = engine.run(SimTime::hours(10.0));
        assert!(matches!(
            result,
            Err(SimulationError::AmountExceedsCapacity { amount: 6, capacity: 5, .. })
        ));
    }

    #[test]
    fn test_invalid_container_registration() {
        let mut engine = SimulationEngine::new();
        assert!(matches!(
            engine.add_container("empty", 0, 0),
            Err(SimulationError::ZeroCapacity { .. })
        ));
        assert!(matches!(
            engine.add_container("overfull", 5, 6),
            Err(SimulationError::InitialExceedsCapacity { .. })
        ));
    }

    #[test]
    fn test_put_blocks_until_capacity_frees() {
        let mut engine = SimulationEngine::new();
        let stock = engine.add_container("stock", 4, 4).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));

        // The put at t=1 finds the container full and must wait for the
        // consumer's withdrawal at t=2.
        engine.spawn(Box::new(DelayedGiver {
            name: "supplier".to_string(),
            target: stock,
            amount: 1,
            phase: 0,
        }));
        engine.spawn(Box::new(Taker {
            name: "consumer".to_string(),
            source: stock,
            start_delay: 2.0,
            phase: 0,
            order: Rc::clone(&order),
        }));

        engine.run(SimTime::hours(10.0)).unwrap();
        assert_eq!(engine.container_level(stock), 4);
        assert_eq!(*order.borrow(), vec!["consumer".to_string()]);
    }
}
