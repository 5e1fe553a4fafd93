use crate::factory::workers::{BLADES_PER_GRAPHITE, PAINT_BATCH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures surfaced before a run starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("buffer {name}: capacity must be greater than 0")]
    ZeroCapacity { name: &'static str },

    #[error("buffer {name}: initial level {initial} exceeds capacity {capacity}")]
    InitialExceedsCapacity {
        name: &'static str,
        initial: u64,
        capacity: u64,
    },

    #[error("crew {name}: {reason}")]
    InvalidCrew { name: &'static str, reason: String },

    #[error("supplier {name}: {reason}")]
    InvalidSupplier { name: &'static str, reason: String },

    #[error(
        "supplier {name}: restock amount {amount} exceeds the buffer capacity {capacity} \
         and the delivery could never be unloaded"
    )]
    RestockExceedsCapacity {
        name: &'static str,
        amount: u64,
        capacity: u64,
    },

    #[error("{role} moves {amount} units through {buffer} whose capacity is only {capacity}")]
    BatchExceedsCapacity {
        role: &'static str,
        buffer: &'static str,
        amount: u64,
        capacity: u64,
    },

    #[error("pickup trigger level must be greater than 0")]
    ZeroTrigger,

    #[error("pickup lead and cooldown times must be non-negative and finite")]
    InvalidPickupTiming,

    #[error("poll interval must be a positive number of hours")]
    InvalidPollInterval,

    #[error("working hours per day must be a positive number")]
    InvalidWorkday,
}

/// Capacity and starting stock of one bounded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub capacity: u64,
    pub initial: u64,
}

/// Headcount and processing-time distribution of one worker role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrewConfig {
    /// Number of concurrent worker instances.
    pub workers: u32,
    /// Mean processing time per cycle, in hours.
    pub mean_hours: f64,
    /// Standard deviation of the processing time, in hours.
    pub std_dev_hours: f64,
    /// Lower clamp applied to every sampled duration.
    pub min_hours: f64,
}

/// Replenishment policy for one raw material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplierConfig {
    /// Hours between the supplier call and the delivery arriving.
    pub lead_time_hours: f64,
    /// Units delivered per replenishment.
    pub restock_amount: u64,
    /// Hours spent unloading after the delivery lands.
    pub unload_hours: f64,
    /// Reorder point. `None` derives it from the throughput parameters.
    pub critical_stock: Option<f64>,
}

/// Finished-goods pickup policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupConfig {
    /// Minimum dispatch level that triggers a pickup call.
    pub trigger_level: u64,
    /// Hours between the pickup call and the courier arriving.
    pub lead_time_hours: f64,
    /// Hours before the dispatch loop starts watching again.
    pub cooldown_hours: f64,
}

/// Complete parameter set for one factory run. All values are read-only for
/// the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub hours_per_day: f64,
    pub business_days: u32,

    pub graphite: BufferConfig,
    pub polyurethane: BufferConfig,
    pub shaft_pre_paint: BufferConfig,
    pub blade_pre_paint: BufferConfig,
    pub shaft_post_paint: BufferConfig,
    pub blade_post_paint: BufferConfig,
    pub dispatch: BufferConfig,

    pub shaft_crew: CrewConfig,
    pub blade_crew: CrewConfig,
    pub paint_crew: CrewConfig,
    pub assembly_crew: CrewConfig,

    pub graphite_supplier: SupplierConfig,
    pub polyurethane_supplier: SupplierConfig,
    pub pickup: PickupConfig,

    /// How often the control loops re-check their container.
    pub poll_interval_hours: f64,
    pub random_seed: u64,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            hours_per_day: 8.0,
            business_days: 23,

            graphite: BufferConfig {
                capacity: 500,
                initial: 200,
            },
            polyurethane: BufferConfig {
                capacity: 100,
                initial: 60,
            },
            shaft_pre_paint: BufferConfig {
                capacity: 60,
                initial: 0,
            },
            blade_pre_paint: BufferConfig {
                capacity: 60,
                initial: 0,
            },
            shaft_post_paint: BufferConfig {
                capacity: 120,
                initial: 0,
            },
            blade_post_paint: BufferConfig {
                capacity: 120,
                initial: 0,
            },
            dispatch: BufferConfig {
                capacity: 500,
                initial: 0,
            },

            shaft_crew: CrewConfig {
                workers: 2,
                mean_hours: 1.0,
                std_dev_hours: 0.1,
                min_hours: 0.1,
            },
            blade_crew: CrewConfig {
                workers: 1,
                mean_hours: 1.0,
                std_dev_hours: 0.2,
                min_hours: 0.1,
            },
            paint_crew: CrewConfig {
                workers: 3,
                mean_hours: 3.0,
                std_dev_hours: 0.3,
                min_hours: 0.1,
            },
            assembly_crew: CrewConfig {
                workers: 2,
                mean_hours: 1.0,
                std_dev_hours: 0.2,
                min_hours: 1.0,
            },

            graphite_supplier: SupplierConfig {
                lead_time_hours: 16.0,
                restock_amount: 300,
                unload_hours: 8.0,
                critical_stock: None,
            },
            polyurethane_supplier: SupplierConfig {
                lead_time_hours: 9.0,
                restock_amount: 30,
                unload_hours: 8.0,
                critical_stock: None,
            },
            pickup: PickupConfig {
                trigger_level: 50,
                lead_time_hours: 4.0,
                cooldown_hours: 8.0,
            },

            poll_interval_hours: 1.0,
            random_seed: 23,
        }
    }
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_business_days(mut self, days: u32) -> Self {
        self.business_days = days;
        self
    }

    pub fn with_hours_per_day(mut self, hours: f64) -> Self {
        self.hours_per_day = hours;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_worker_counts(mut self, shaft: u32, blade: u32, paint: u32, assembly: u32) -> Self {
        self.shaft_crew.workers = shaft;
        self.blade_crew.workers = blade;
        self.paint_crew.workers = paint;
        self.assembly_crew.workers = assembly;
        self
    }

    pub fn with_pickup_trigger(mut self, trigger_level: u64) -> Self {
        self.pickup.trigger_level = trigger_level;
        self
    }

    /// Simulation horizon in hours.
    pub fn total_hours(&self) -> f64 {
        self.hours_per_day * f64::from(self.business_days)
    }

    /// Reorder point for graphite: two days of full-crew consumption plus a
    /// one-day margin, unless overridden.
    pub fn graphite_critical_stock(&self) -> f64 {
        self.graphite_supplier.critical_stock.unwrap_or_else(|| {
            (self.hours_per_day / self.shaft_crew.mean_hours * f64::from(self.shaft_crew.workers)
                + self.hours_per_day / self.blade_crew.mean_hours
                    * f64::from(self.blade_crew.workers))
                * 3.0
        })
    }

    /// Reorder point for polyurethane: one day of assembly consumption plus a
    /// one-day margin, unless overridden.
    pub fn polyurethane_critical_stock(&self) -> f64 {
        self.polyurethane_supplier.critical_stock.unwrap_or_else(|| {
            self.hours_per_day / self.assembly_crew.mean_hours
                * f64::from(self.assembly_crew.workers)
                * 2.0
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hours_per_day.is_finite() || self.hours_per_day <= 0.0 {
            return Err(ConfigError::InvalidWorkday);
        }
        if !self.poll_interval_hours.is_finite() || self.poll_interval_hours <= 0.0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        for (name, buffer) in self.buffers() {
            if buffer.capacity == 0 {
                return Err(ConfigError::ZeroCapacity { name });
            }
            if buffer.initial > buffer.capacity {
                return Err(ConfigError::InitialExceedsCapacity {
                    name,
                    initial: buffer.initial,
                    capacity: buffer.capacity,
                });
            }
        }

        for (name, crew) in self.crews() {
            validate_crew(name, crew)?;
        }

        validate_supplier("graphite", &self.graphite_supplier, self.graphite.capacity)?;
        validate_supplier(
            "polyurethane",
            &self.polyurethane_supplier,
            self.polyurethane.capacity,
        )?;

        if self.pickup.trigger_level == 0 {
            return Err(ConfigError::ZeroTrigger);
        }
        if !self.pickup.lead_time_hours.is_finite()
            || self.pickup.lead_time_hours < 0.0
            || !self.pickup.cooldown_hours.is_finite()
            || self.pickup.cooldown_hours < 0.0
        {
            return Err(ConfigError::InvalidPickupTiming);
        }

        // Worker batch sizes must fit the buffers they move through, or the
        // matching request would block forever at runtime.
        let painted_legs: [(&'static str, u64); 4] = [
            ("shaft pre-paint", self.shaft_pre_paint.capacity),
            ("blade pre-paint", self.blade_pre_paint.capacity),
            ("shaft post-paint", self.shaft_post_paint.capacity),
            ("blade post-paint", self.blade_post_paint.capacity),
        ];
        for (buffer, capacity) in painted_legs {
            if PAINT_BATCH > capacity {
                return Err(ConfigError::BatchExceedsCapacity {
                    role: "painter",
                    buffer,
                    amount: PAINT_BATCH,
                    capacity,
                });
            }
        }
        if BLADES_PER_GRAPHITE > self.blade_pre_paint.capacity {
            return Err(ConfigError::BatchExceedsCapacity {
                role: "blade builder",
                buffer: "blade pre-paint",
                amount: BLADES_PER_GRAPHITE,
                capacity: self.blade_pre_paint.capacity,
            });
        }

        Ok(())
    }

    fn buffers(&self) -> [(&'static str, &BufferConfig); 7] {
        [
            ("graphite", &self.graphite),
            ("polyurethane", &self.polyurethane),
            ("shaft pre-paint", &self.shaft_pre_paint),
            ("blade pre-paint", &self.blade_pre_paint),
            ("shaft post-paint", &self.shaft_post_paint),
            ("blade post-paint", &self.blade_post_paint),
            ("dispatch", &self.dispatch),
        ]
    }

    fn crews(&self) -> [(&'static str, &CrewConfig); 4] {
        [
            ("shaft", &self.shaft_crew),
            ("blade", &self.blade_crew),
            ("paint", &self.paint_crew),
            ("assembly", &self.assembly_crew),
        ]
    }
}

fn validate_crew(name: &'static str, crew: &CrewConfig) -> Result<(), ConfigError> {
    if !crew.mean_hours.is_finite() || crew.mean_hours <= 0.0 {
        return Err(ConfigError::InvalidCrew {
            name,
            reason: format!("mean processing time must be positive, got {}", crew.mean_hours),
        });
    }
    if !crew.std_dev_hours.is_finite() || crew.std_dev_hours < 0.0 {
        return Err(ConfigError::InvalidCrew {
            name,
            reason: format!(
                "processing-time std dev must be non-negative, got {}",
                crew.std_dev_hours
            ),
        });
    }
    if !crew.min_hours.is_finite() || crew.min_hours <= 0.0 {
        return Err(ConfigError::InvalidCrew {
            name,
            reason: format!("minimum duration must be positive, got {}", crew.min_hours),
        });
    }
    Ok(())
}

fn validate_supplier(
    name: &'static str,
    supplier: &SupplierConfig,
    capacity: u64,
) -> Result<(), ConfigError> {
    if supplier.restock_amount == 0 {
        return Err(ConfigError::InvalidSupplier {
            name,
            reason: "restock amount must be greater than 0".to_string(),
        });
    }
    if supplier.restock_amount > capacity {
        return Err(ConfigError::RestockExceedsCapacity {
            name,
            amount: supplier.restock_amount,
            capacity,
        });
    }
    if !supplier.lead_time_hours.is_finite()
        || supplier.lead_time_hours < 0.0
        || !supplier.unload_hours.is_finite()
        || supplier.unload_hours < 0.0
    {
        return Err(ConfigError::InvalidSupplier {
            name,
            reason: "lead and unload times must be non-negative and finite".to_string(),
        });
    }
    if let Some(critical) = supplier.critical_stock {
        if !critical.is_finite() || critical < 0.0 {
            return Err(ConfigError::InvalidSupplier {
                name,
                reason: format!("critical stock override must be non-negative, got {critical}"),
            });
        }
    }
    Ok(())
}
