//! Consumer pool sizing

use sysinfo::{System, SystemExt};

use crate::error::CoordError;

/// Inputs to the sizing heuristic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSizing {
    /// Explicit pool size; 0 means derive it from the host
    pub fixed_consumer_count: usize,
    /// Multiplier applied to the CPU-derived size
    pub load_factor: f64,
}

impl Default for PoolSizing {
    fn default() -> Self {
        Self { fixed_consumer_count: 0, load_factor: 1.0 }
    }
}

/// 1/5/15-minute system load averages
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAverage {
    pub fn mean(&self) -> f64 {
        (self.one + self.five + self.fifteen) / 3.0
    }
}

/// Host facts the sizer depends on
pub trait SystemProbe: Send + Sync {
    /// Logical CPU count, if it can be determined
    fn cpu_count(&self) -> Option<usize>;
    fn load_average(&self) -> LoadAverage;
}

/// Reads the running host
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl SystemProbe for HostProbe {
    fn cpu_count(&self) -> Option<usize> {
        Some(num_cpus::get()).filter(|count| *count > 0)
    }

    fn load_average(&self) -> LoadAverage {
        let load = System::new().load_average();
        LoadAverage { one: load.one, five: load.five, fifteen: load.fifteen }
    }
}

/// Number of consumer workers to start
///
/// A fixed count wins outright. Otherwise the size is
/// `ceil(cpus / min(load, 1.0) * load_factor)`, with an idle load of 0 read as 1.0,
/// and never less than one worker.
pub fn consumer_count(sizing: &PoolSizing, probe: &dyn SystemProbe) -> Result<usize, CoordError> {
    if sizing.fixed_consumer_count > 0 {
        tracing::info!("Using configured consumer count {}", sizing.fixed_consumer_count);
        return Ok(sizing.fixed_consumer_count);
    }

    if !sizing.load_factor.is_finite() || sizing.load_factor <= 0.0 {
        return Err(CoordError::InvalidLoadFactor(sizing.load_factor));
    }

    let cpus = probe.cpu_count().ok_or(CoordError::CpuCountUnavailable)?;

    let mut load = probe.load_average().mean();
    if load == 0.0 {
        load = 1.0;
    }
    // Load above 1.0 is clamped rather than used to shrink the pool
    let effective_load = load.min(1.0);

    let count = (cpus as f64 / effective_load * sizing.load_factor).ceil() as usize;
    let count = count.max(1);

    tracing::info!(
        "Sized consumer pool: {} workers (cpus={}, load={:.2}, effective={:.2}, factor={})",
        count,
        cpus,
        load,
        effective_load,
        sizing.load_factor
    );
    Ok(count)
}
