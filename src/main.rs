use sticksim::factory::Factory;
use sticksim::FactoryConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    println!("🏒 Hockey Stick Factory Simulator");
    println!("----------------------------------");

    let config = FactoryConfig::default();
    println!("Configuration:");
    println!(
        "  Horizon: {} business days of {} h ({} h total)",
        config.business_days,
        config.hours_per_day,
        config.total_hours()
    );
    println!(
        "  Crews: {} shaft, {} blade, {} paint, {} assembly",
        config.shaft_crew.workers,
        config.blade_crew.workers,
        config.paint_crew.workers,
        config.assembly_crew.workers
    );
    println!(
        "  Raw stock: graphite {}/{} (critical {:.0}), polyurethane {}/{} (critical {:.0})",
        config.graphite.initial,
        config.graphite.capacity,
        config.graphite_critical_stock(),
        config.polyurethane.initial,
        config.polyurethane.capacity,
        config.polyurethane_critical_stock()
    );
    println!(
        "  Dispatch: pickup at {} sticks, {} h lead time",
        config.pickup.trigger_level, config.pickup.lead_time_hours
    );
    println!("  Random seed: {}", config.random_seed);
    println!("----------------------------------");

    let report = Factory::new(config)?.run()?;

    println!("----------------------------------");
    println!("{report}");
    println!("----------------------------------");
    println!("SIMULATION STOPPED");
    Ok(())
}
