use crate::{GridleError, Result};
use std::sync::RwLock;

/// Rectangle describing monitor bounds.
///
/// Origins may be negative in multi-monitor setups; dimensions must be
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GridleError::ValidationError(
                "Monitor dimensions must be positive".to_string(),
            )
            .into());
        }

        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }
}

/// Monitor snapshot reported by the display collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub id: String,
    pub name: String,
    pub bounds: Bounds,
    pub is_primary: bool,
}

impl MonitorInfo {
    pub fn primary(id: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            name: "Primary".to_string(),
            bounds,
            is_primary: true,
        }
    }
}

/// Abstraction over OS display enumeration.
///
/// `list_monitors` returns monitors in a stable, OS-defined order; callers
/// cache the snapshot until the next detect.
pub trait DisplayProvider: Send + Sync {
    /// Snapshot all monitors currently available
    fn list_monitors(&self) -> Result<Vec<MonitorInfo>>;

    /// Query a monitor by identifier
    fn get_monitor(&self, id: &str) -> Result<Option<MonitorInfo>>;
}

/// Default system-backed display provider placeholder
#[derive(Debug, Default)]
pub struct SystemDisplayProvider;

impl SystemDisplayProvider {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayProvider for SystemDisplayProvider {
    fn list_monitors(&self) -> Result<Vec<MonitorInfo>> {
        // The concrete desktop integration populates this. Surfacing an
        // error here lets higher layers report the missing backend cleanly.
        Err(GridleError::PlatformError(
            "SystemDisplayProvider is not implemented in this environment".into(),
        )
        .into())
    }

    fn get_monitor(&self, _id: &str) -> Result<Option<MonitorInfo>> {
        Err(GridleError::PlatformError(
            "SystemDisplayProvider is not implemented in this environment".into(),
        )
        .into())
    }
}

/// In-memory display provider used for tests and the stubbed entry point.
///
/// Monitors are kept in insertion order to mirror the enumeration-order
/// contract of the real collaborator.
#[derive(Debug, Default)]
pub struct InMemoryDisplayProvider {
    monitors: RwLock<Vec<MonitorInfo>>,
}

impl InMemoryDisplayProvider {
    pub fn new_with(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            monitors: RwLock::new(monitors),
        }
    }
}

impl DisplayProvider for InMemoryDisplayProvider {
    fn list_monitors(&self) -> Result<Vec<MonitorInfo>> {
        Ok(self.monitors.read().unwrap().clone())
    }

    fn get_monitor(&self, id: &str) -> Result<Option<MonitorInfo>> {
        Ok(self
            .monitors
            .read()
            .unwrap()
            .iter()
            .find(|monitor| monitor.id == id)
            .cloned())
    }
}
