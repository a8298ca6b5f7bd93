//! Environment probe.
//!
//! Hardware binding and request telemetry need facts about the machine the
//! SDK runs on. Those lookups live behind this trait rather than as
//! ambient calls, so tests inject fixed values and production code keeps a
//! single place that touches the platform.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use std::env;

/// Facts about the current machine.
pub trait EnvironmentProbe: Send + Sync {
    /// Operating system name (e.g. `linux`, `macos`).
    fn os_name(&self) -> String;

    /// Machine hostname, when resolvable.
    fn hostname(&self) -> Option<String>;

    /// A stable hardware identifier for device-bound licenses, when the
    /// platform exposes enough to derive one.
    fn hardware_id(&self) -> Option<String>;
}

/// The production probe.
///
/// The hardware identifier is a SHA-256 digest over stable machine facts
/// (OS, architecture, hostname, platform machine ID, user), encoded like a
/// fingerprint: base64 of the first 16 digest bytes. It survives reboots
/// and changes only when the hardware identity changes significantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl EnvironmentProbe for SystemProbe {
    fn os_name(&self) -> String {
        env::consts::OS.to_string()
    }

    fn hostname(&self) -> Option<String> {
        hostname::get().ok().and_then(|h| h.into_string().ok())
    }

    fn hardware_id(&self) -> Option<String> {
        let mut components = vec![
            env::consts::OS.to_string(),
            env::consts::ARCH.to_string(),
        ];
        components.push(self.hostname().unwrap_or_else(|| "unknown".to_string()));
        if let Some(machine_id) = machine_id() {
            components.push(machine_id);
        }
        if let Ok(user) = env::var("USER").or_else(|_| env::var("USERNAME")) {
            components.push(user);
        }

        let mut hasher = Sha256::new();
        hasher.update(components.join("|").as_bytes());
        let digest = hasher.finalize();
        Some(BASE64.encode(&digest[..16]))
    }
}

/// Platform-specific stable machine identifier.
fn machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// A probe with fixed answers, for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    /// Reported OS name.
    pub os: String,
    /// Reported hostname.
    pub host: Option<String>,
    /// Reported hardware identifier.
    pub hardware: Option<String>,
}

impl FixedProbe {
    /// Creates a probe reporting the given OS and hardware ID.
    #[must_use]
    pub fn new(os: impl Into<String>, hardware: Option<String>) -> Self {
        Self {
            os: os.into(),
            host: None,
            hardware,
        }
    }
}

impl EnvironmentProbe for FixedProbe {
    fn os_name(&self) -> String {
        self.os.clone()
    }

    fn hostname(&self) -> Option<String> {
        self.host.clone()
    }

    fn hardware_id(&self) -> Option<String> {
        self.hardware.clone()
    }
}
