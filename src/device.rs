//! Device selection from command-line style specs.

use crate::error::{Error, Result};
use tch::Device;
use tracing::{info, warn};

/// Parse a device spec: `"cpu"`, `"cuda"`, `"cuda:N"`, or an empty string,
/// which selects the CPU.
pub fn parse_device(spec: &str) -> Result<Device> {
    let spec = spec.trim();
    if spec.is_empty() {
        warn!("no device given, using CPU");
        return Ok(Device::Cpu);
    }

    let device = match spec.to_ascii_lowercase().as_str() {
        "cpu" => Device::Cpu,
        "cuda" | "gpu" => Device::Cuda(0),
        other => {
            let ordinal = other
                .strip_prefix("cuda:")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::InvalidDevice(spec.to_string()))?;
            Device::Cuda(ordinal)
        }
    };

    if let Device::Cuda(_) = device {
        if !tch::Cuda::is_available() {
            warn!(spec, "CUDA requested but not available");
        }
    }
    info!(?device, "using device");
    Ok(device)
}
