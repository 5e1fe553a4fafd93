pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod stock;
pub mod workers;

use self::config::{ConfigError, FactoryConfig};
use self::dispatch::DispatchControl;
use self::metrics::{Counter, FactoryMetrics, MetricsSnapshot};
use self::stock::StockControl;
use self::workers::{ProductionWorker, BLADES_PER_GRAPHITE, PAINT_BATCH};
use crate::core::engine::SimulationEngine;
use crate::core::error::SimulationError;
use crate::core::types::{ContainerId, SimTime};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Anything that can stop a factory run.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// The wired-up production line, ready to run to its horizon.
///
/// Construction creates the seven buffers and spawns the control loops and
/// every worker instance; the start order (stock controls, dispatch control,
/// then workers) fixes how same-instant wakeups interleave, so runs with the
/// same seed are reproducible.
pub struct Factory {
    engine: SimulationEngine,
    config: FactoryConfig,
    metrics: FactoryMetrics,
    shipped: Counter,

    graphite: ContainerId,
    polyurethane: ContainerId,
    shaft_pre_paint: ContainerId,
    blade_pre_paint: ContainerId,
    shaft_post_paint: ContainerId,
    blade_post_paint: ContainerId,
    dispatch: ContainerId,
}

impl Factory {
    pub fn new(config: FactoryConfig) -> Result<Self, FactoryError> {
        config.validate()?;

        let mut engine = SimulationEngine::new();
        let graphite =
            engine.add_container("graphite", config.graphite.capacity, config.graphite.initial)?;
        let polyurethane = engine.add_container(
            "polyurethane",
            config.polyurethane.capacity,
            config.polyurethane.initial,
        )?;
        let shaft_pre_paint = engine.add_container(
            "shaft_pre_paint",
            config.shaft_pre_paint.capacity,
            config.shaft_pre_paint.initial,
        )?;
        let blade_pre_paint = engine.add_container(
            "blade_pre_paint",
            config.blade_pre_paint.capacity,
            config.blade_pre_paint.initial,
        )?;
        let shaft_post_paint = engine.add_container(
            "shaft_post_paint",
            config.shaft_post_paint.capacity,
            config.shaft_post_paint.initial,
        )?;
        let blade_post_paint = engine.add_container(
            "blade_post_paint",
            config.blade_post_paint.capacity,
            config.blade_post_paint.initial,
        )?;
        let dispatch =
            engine.add_container("dispatch", config.dispatch.capacity, config.dispatch.initial)?;

        let metrics = FactoryMetrics::default();
        let shipped = Counter::new();

        engine.spawn(Box::new(StockControl::new(
            "graphite",
            graphite,
            &config.graphite_supplier,
            config.graphite_critical_stock(),
            config.poll_interval_hours,
            config.hours_per_day,
            metrics.graphite_restocks.clone(),
        )));
        engine.spawn(Box::new(StockControl::new(
            "polyurethane",
            polyurethane,
            &config.polyurethane_supplier,
            config.polyurethane_critical_stock(),
            config.poll_interval_hours,
            config.hours_per_day,
            metrics.polyurethane_restocks.clone(),
        )));
        engine.spawn(Box::new(DispatchControl::new(
            dispatch,
            &config.pickup,
            config.poll_interval_hours,
            config.hours_per_day,
            shipped.clone(),
        )));

        let mut factory = Self {
            engine,
            config,
            metrics,
            shipped,
            graphite,
            polyurethane,
            shaft_pre_paint,
            blade_pre_paint,
            shaft_post_paint,
            blade_post_paint,
            dispatch,
        };
        factory.spawn_workers()?;
        Ok(factory)
    }

    fn spawn_workers(&mut self) -> Result<(), FactoryError> {
        let config = self.config.clone();
        let mut worker_seq: u64 = 0;

        for index in 0..config.shaft_crew.workers {
            worker_seq += 1;
            let worker = ProductionWorker::new(
                format!("shaft_builder_{}", index + 1),
                vec![(self.graphite, 1)],
                vec![(self.shaft_pre_paint, 1)],
                &config.shaft_crew,
                "shaft",
                config.random_seed.wrapping_add(worker_seq),
                self.metrics.shafts_built.clone(),
                1,
            )?;
            self.engine.spawn(Box::new(worker));
        }

        for index in 0..config.blade_crew.workers {
            worker_seq += 1;
            let worker = ProductionWorker::new(
                format!("blade_builder_{}", index + 1),
                vec![(self.graphite, 1)],
                vec![(self.blade_pre_paint, BLADES_PER_GRAPHITE)],
                &config.blade_crew,
                "blade",
                config.random_seed.wrapping_add(worker_seq),
                self.metrics.blades_built.clone(),
                BLADES_PER_GRAPHITE,
            )?;
            self.engine.spawn(Box::new(worker));
        }

        for index in 0..config.paint_crew.workers {
            worker_seq += 1;
            let worker = ProductionWorker::new(
                format!("painter_{}", index + 1),
                vec![(self.shaft_pre_paint, PAINT_BATCH), (self.blade_pre_paint, PAINT_BATCH)],
                vec![
                    (self.shaft_post_paint, PAINT_BATCH),
                    (self.blade_post_paint, PAINT_BATCH),
                ],
                &config.paint_crew,
                "paint",
                config.random_seed.wrapping_add(worker_seq),
                self.metrics.paint_batches.clone(),
                1,
            )?;
            self.engine.spawn(Box::new(worker));
        }

        for index in 0..config.assembly_crew.workers {
            worker_seq += 1;
            let worker = ProductionWorker::new(
                format!("assembler_{}", index + 1),
                vec![
                    (self.shaft_post_paint, 1),
                    (self.blade_post_paint, 1),
                    (self.polyurethane, 1),
                ],
                vec![(self.dispatch, 1)],
                &config.assembly_crew,
                "assembly",
                config.random_seed.wrapping_add(worker_seq),
                self.metrics.sticks_assembled.clone(),
                1,
            )?;
            self.engine.spawn(Box::new(worker));
        }

        Ok(())
    }

    /// Drive the line to the configured horizon and report what it did.
    pub fn run(mut self) -> Result<FactoryReport, FactoryError> {
        let horizon = SimTime::hours(self.config.total_hours());
        info!(
            "starting factory run: {} business days of {} h (horizon {})",
            self.config.business_days, self.config.hours_per_day, horizon
        );
        self.engine.run(horizon)?;

        let dispatch_level = self.engine.container_level(self.dispatch);
        let sticks_shipped = self.shipped.get();
        let report = FactoryReport {
            horizon_hours: horizon.as_hours(),
            graphite_level: self.engine.container_level(self.graphite),
            polyurethane_level: self.engine.container_level(self.polyurethane),
            shaft_pre_paint_level: self.engine.container_level(self.shaft_pre_paint),
            blade_pre_paint_level: self.engine.container_level(self.blade_pre_paint),
            shaft_post_paint_level: self.engine.container_level(self.shaft_post_paint),
            blade_post_paint_level: self.engine.container_level(self.blade_post_paint),
            dispatch_level,
            sticks_shipped,
            total_sticks: sticks_shipped + dispatch_level,
            metrics: self.metrics.snapshot(),
        };
        info!("factory run finished: {} sticks in total", report.total_sticks);
        Ok(report)
    }
}

/// End-of-run counters: final buffer levels plus the production accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactoryReport {
    pub horizon_hours: f64,
    pub graphite_level: u64,
    pub polyurethane_level: u64,
    pub shaft_pre_paint_level: u64,
    pub blade_pre_paint_level: u64,
    pub shaft_post_paint_level: u64,
    pub blade_post_paint_level: u64,
    pub dispatch_level: u64,
    /// Sticks handed off to pickups during the run.
    pub sticks_shipped: u64,
    /// Shipped plus whatever was still sitting in dispatch at the horizon.
    pub total_sticks: u64,
    pub metrics: MetricsSnapshot,
}

impl fmt::Display for FactoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Raw stock: {} graphite, {} polyurethane",
            self.graphite_level, self.polyurethane_level
        )?;
        writeln!(
            f,
            "Pre-paint has {} shafts and {} blades ready to be painted",
            self.shaft_pre_paint_level, self.blade_pre_paint_level
        )?;
        writeln!(
            f,
            "Post-paint has {} shafts and {} blades ready to be assembled",
            self.shaft_post_paint_level, self.blade_post_paint_level
        )?;
        writeln!(
            f,
            "Dispatch has {} hockey sticks ready to go ({} already shipped)",
            self.dispatch_level, self.sticks_shipped
        )?;
        write!(f, "Total hockey sticks made: {}", self.total_sticks)
    }
}

/// Run the same configuration across `runs` consecutive seeds in parallel
/// and collect one report per run. Seed `i` is `config.random_seed + i`, so a
/// replication set is as reproducible as a single run.
pub fn run_replications(
    config: &FactoryConfig,
    runs: u32,
) -> Result<Vec<FactoryReport>, FactoryError> {
    config.validate()?;
    (0..runs)
        .into_par_iter()
        .map(|run| {
            let seeded = config
                .clone()
                .with_random_seed(config.random_seed.wrapping_add(u64::from(run)));
            Factory::new(seeded)?.run()
        })
        .collect()
}
