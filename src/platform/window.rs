use crate::{GridleError, Result};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Window frame in desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Window metadata reported by the window collaborator.
///
/// The title may be empty for tool windows and the like; such records are
/// filtered out at the discovery stage, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopWindow {
    pub window_id: u32,
    pub title: String,
    pub frame: Frame,
    pub is_minimized: bool,
}

impl DesktopWindow {
    pub fn new(window_id: u32, title: impl Into<String>, frame: Frame, is_minimized: bool) -> Self {
        Self {
            window_id,
            title: title.into(),
            frame,
            is_minimized,
        }
    }
}

/// Tracks window-automation permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Unknown,
    Granted,
    Denied,
}

/// Abstraction over OS window enumeration and manipulation.
///
/// `list_windows` returns every top-level window in enumeration order,
/// minimized ones included. The four mutation operations fail independently;
/// a failure on one window must not affect another.
pub trait WindowProvider: Send + Sync {
    /// Ensure window-automation permissions are granted
    fn ensure_permissions(&self) -> Result<()>;

    /// Snapshot all top-level windows in enumeration order
    fn list_windows(&self) -> Result<Vec<DesktopWindow>>;

    /// Retrieve a single window by handle
    fn get_window(&self, window_id: u32) -> Result<Option<DesktopWindow>>;

    /// Resize a window
    fn resize(&self, window_id: u32, width: u32, height: u32) -> Result<()>;

    /// Move a window
    fn move_to(&self, window_id: u32, x: i32, y: i32) -> Result<()>;

    /// Raise and focus a window
    fn activate(&self, window_id: u32) -> Result<()>;

    /// Restore a minimized window
    fn restore(&self, window_id: u32) -> Result<()>;
}

/// Default system-backed provider placeholder
#[derive(Debug)]
pub struct SystemWindowProvider {
    status: Arc<RwLock<PermissionStatus>>, // shared so tests can simulate state
}

impl SystemWindowProvider {
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(PermissionStatus::Unknown)),
        }
    }

    fn unimplemented(&self) -> anyhow::Error {
        GridleError::PlatformError(
            "SystemWindowProvider is not implemented in this environment".into(),
        )
        .into()
    }
}

impl Default for SystemWindowProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowProvider for SystemWindowProvider {
    fn ensure_permissions(&self) -> Result<()> {
        match *self.status.read().expect("poisoned lock") {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::Unknown | PermissionStatus::Denied => {
                Err(GridleError::PermissionDenied(
                    "Window-automation permission is required to arrange windows".into(),
                )
                .into())
            }
        }
    }

    fn list_windows(&self) -> Result<Vec<DesktopWindow>> {
        Err(self.unimplemented())
    }

    fn get_window(&self, _window_id: u32) -> Result<Option<DesktopWindow>> {
        Err(self.unimplemented())
    }

    fn resize(&self, _window_id: u32, _width: u32, _height: u32) -> Result<()> {
        Err(self.unimplemented())
    }

    fn move_to(&self, _window_id: u32, _x: i32, _y: i32) -> Result<()> {
        Err(self.unimplemented())
    }

    fn activate(&self, _window_id: u32) -> Result<()> {
        Err(self.unimplemented())
    }

    fn restore(&self, _window_id: u32) -> Result<()> {
        Err(self.unimplemented())
    }
}

/// In-memory window provider for testing the higher level services.
///
/// Windows are kept in insertion order so the discovery-order contract can
/// be asserted. Individual handles can be marked as failing to exercise
/// per-window error isolation, and activations are logged in call order.
#[derive(Debug)]
pub struct InMemoryWindowProvider {
    windows: RwLock<Vec<DesktopWindow>>,
    failing: RwLock<HashSet<u32>>,
    activation_log: RwLock<Vec<u32>>,
    status: RwLock<PermissionStatus>,
}

impl Default for InMemoryWindowProvider {
    fn default() -> Self {
        Self {
            windows: RwLock::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
            activation_log: RwLock::new(Vec::new()),
            status: RwLock::new(PermissionStatus::Unknown),
        }
    }
}

impl InMemoryWindowProvider {
    pub fn new_with(windows: Vec<DesktopWindow>) -> Self {
        Self {
            windows: RwLock::new(windows),
            status: RwLock::new(PermissionStatus::Granted),
            ..Self::default()
        }
    }

    /// Make every operation on the given handle fail
    pub fn set_failing(&self, window_id: u32) {
        self.failing.write().unwrap().insert(window_id);
    }

    pub fn set_permission_status(&self, status: PermissionStatus) {
        *self.status.write().unwrap() = status;
    }

    /// Handles passed to `activate`, in call order
    pub fn activated(&self) -> Vec<u32> {
        self.activation_log.read().unwrap().clone()
    }

    fn check_failure(&self, window_id: u32) -> Result<()> {
        if self.failing.read().unwrap().contains(&window_id) {
            return Err(GridleError::PlatformError(format!(
                "Operation rejected for window {window_id}"
            ))
            .into());
        }
        Ok(())
    }

    fn with_window<F>(&self, window_id: u32, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut DesktopWindow),
    {
        self.check_failure(window_id)?;

        let mut windows = self.windows.write().unwrap();
        match windows.iter_mut().find(|w| w.window_id == window_id) {
            Some(window) => {
                mutate(window);
                Ok(())
            }
            None => Err(GridleError::WindowNotFound(window_id).into()),
        }
    }
}

impl WindowProvider for InMemoryWindowProvider {
    fn ensure_permissions(&self) -> Result<()> {
        match *self.status.read().unwrap() {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::Unknown | PermissionStatus::Denied => {
                Err(GridleError::PermissionDenied(
                    "Window-automation permission denied in in-memory provider".to_string(),
                )
                .into())
            }
        }
    }

    fn list_windows(&self) -> Result<Vec<DesktopWindow>> {
        Ok(self.windows.read().unwrap().clone())
    }

    fn get_window(&self, window_id: u32) -> Result<Option<DesktopWindow>> {
        Ok(self
            .windows
            .read()
            .unwrap()
            .iter()
            .find(|w| w.window_id == window_id)
            .cloned())
    }

    fn resize(&self, window_id: u32, width: u32, height: u32) -> Result<()> {
        self.with_window(window_id, |window| {
            window.frame.width = width;
            window.frame.height = height;
        })
    }

    fn move_to(&self, window_id: u32, x: i32, y: i32) -> Result<()> {
        self.with_window(window_id, |window| {
            window.frame.x = x;
            window.frame.y = y;
        })
    }

    fn activate(&self, window_id: u32) -> Result<()> {
        self.check_failure(window_id)?;

        if self
            .windows
            .read()
            .unwrap()
            .iter()
            .all(|w| w.window_id != window_id)
        {
            return Err(GridleError::WindowNotFound(window_id).into());
        }

        self.activation_log.write().unwrap().push(window_id);
        Ok(())
    }

    fn restore(&self, window_id: u32) -> Result<()> {
        self.with_window(window_id, |window| {
            window.is_minimized = false;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_window(window_id: u32, title: &str, minimized: bool) -> DesktopWindow {
        DesktopWindow::new(
            window_id,
            title,
            Frame {
                x: 0,
                y: 0,
                width: 1280,
                height: 720,
            },
            minimized,
        )
    }

    #[test]
    fn list_windows_keeps_enumeration_order() {
        let provider = InMemoryWindowProvider::new_with(vec![
            sample_window(7, "Editor", false),
            sample_window(2, "Browser", false),
            sample_window(5, "Terminal", true),
        ]);

        let ids: Vec<_> = provider
            .list_windows()
            .unwrap()
            .into_iter()
            .map(|w| w.window_id)
            .collect();
        assert_eq!(ids, vec![7, 2, 5]);
    }

    #[test]
    fn restore_clears_minimized_flag() {
        let provider = InMemoryWindowProvider::new_with(vec![sample_window(1, "Editor", true)]);

        provider.restore(1).unwrap();
        assert!(!provider.get_window(1).unwrap().unwrap().is_minimized);
    }

    #[test]
    fn resize_and_move_update_frame() {
        let provider = InMemoryWindowProvider::new_with(vec![sample_window(1, "Editor", false)]);

        provider.resize(1, 639, 1079).unwrap();
        provider.move_to(1, 640, 0).unwrap();

        let frame = provider.get_window(1).unwrap().unwrap().frame;
        assert_eq!(
            frame,
            Frame {
                x: 640,
                y: 0,
                width: 639,
                height: 1079
            }
        );
    }

    #[test]
    fn failing_window_rejects_every_operation() {
        let provider = InMemoryWindowProvider::new_with(vec![sample_window(1, "Editor", true)]);
        provider.set_failing(1);

        assert!(provider.resize(1, 100, 100).is_err());
        assert!(provider.move_to(1, 0, 0).is_err());
        assert!(provider.activate(1).is_err());
        assert!(provider.restore(1).is_err());
    }

    #[test]
    fn activations_are_logged_in_call_order() {
        let provider = InMemoryWindowProvider::new_with(vec![
            sample_window(1, "Editor", false),
            sample_window(2, "Browser", false),
        ]);

        provider.activate(2).unwrap();
        provider.activate(1).unwrap();
        assert_eq!(provider.activated(), vec![2, 1]);
    }

    #[test]
    fn operations_on_unknown_windows_fail() {
        let provider = InMemoryWindowProvider::default();
        assert!(provider.resize(99, 10, 10).is_err());
        assert!(provider.activate(99).is_err());
    }
}
