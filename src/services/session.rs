use crate::models::grid::TileRect;
use crate::models::layer::{Layer, LayerCreateRequest};
use crate::platform::display::{DisplayProvider, MonitorInfo};
use crate::platform::window::{DesktopWindow, WindowProvider};
use crate::services::layout::{monitor_area, LayoutPlanner};
use crate::services::matcher::WindowMatcher;
use crate::{GridleError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configuration for the tiler session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Pause inserted after each window activation so the OS can process
    /// the focus change before the next window is moved
    pub activation_pause: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            activation_pause: Duration::from_millis(50),
        }
    }
}

/// Counts reported after a detect run
#[derive(Debug, Clone, Serialize)]
pub struct DetectReport {
    pub monitors: usize,
    pub titles: usize,
}

/// One window that could not be placed
#[derive(Debug, Clone, Serialize)]
pub struct PlacementFailure {
    pub window_id: u32,
    pub title: String,
    pub reason: String,
}

/// Aggregated outcome of a sort or layer apply.
///
/// Individual placement failures are collected here instead of aborting the
/// batch; windows placed before a failure stay where they were put.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    /// Windows (sort) or assigned tiles (layer) that matched a query
    pub matched: usize,
    /// Windows successfully resized, moved and activated
    pub placed: usize,
    /// Layer tiles whose query matched nothing
    pub unmatched_tiles: usize,
    pub failures: Vec<PlacementFailure>,
}

impl ApplyReport {
    /// True when no window matched at all
    pub fn nothing_to_do(&self) -> bool {
        self.matched == 0
    }
}

/// Counts surfaced by the status readout
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub monitors: usize,
    pub titles: usize,
    pub matched_windows: usize,
    pub layers: usize,
}

/// Telemetry for session operations
#[derive(Debug, Default, Clone)]
pub struct SessionMetrics {
    pub detect_count: u64,
    pub sort_count: u64,
    pub layer_apply_count: u64,
    pub windows_placed: u64,
    pub placement_failures: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    monitors: Vec<MonitorInfo>,
    titles: Vec<String>,
    layers: Vec<Layer>,
    last_matched: usize,
    detected: bool,
}

/// Owns the cached detection state and drives the sort operations.
///
/// All monitor, title and layer state lives here and nowhere else; the
/// planner and matcher are passed what they need as plain arguments. The
/// cache is refreshed only by [`detect`](TilerSession::detect).
pub struct TilerSession {
    displays: Arc<dyn DisplayProvider>,
    windows: Arc<dyn WindowProvider>,
    planner: LayoutPlanner,
    matcher: WindowMatcher,
    state: Arc<RwLock<SessionState>>,
    metrics: Arc<RwLock<SessionMetrics>>,
    config: SessionConfig,
}

impl TilerSession {
    pub fn new(
        displays: Arc<dyn DisplayProvider>,
        windows: Arc<dyn WindowProvider>,
        config: SessionConfig,
    ) -> Self {
        let matcher = WindowMatcher::new(windows.clone());
        Self {
            displays,
            windows,
            planner: LayoutPlanner::new(),
            matcher,
            state: Arc::new(RwLock::new(SessionState::default())),
            metrics: Arc::new(RwLock::new(SessionMetrics::default())),
            config,
        }
    }

    /// Re-read monitors and window titles from the providers and cache the
    /// snapshot until the next detect.
    ///
    /// Titles are deduplicated keeping the first occurrence, in enumeration
    /// order; untitled windows are dropped here.
    pub async fn detect(&self) -> Result<DetectReport> {
        self.windows.ensure_permissions()?;

        let monitors = self.displays.list_monitors()?;
        let windows = self.windows.list_windows()?;

        let mut seen = HashSet::new();
        let mut titles = Vec::new();
        for window in &windows {
            if window.title.is_empty() {
                continue;
            }
            if seen.insert(window.title.clone()) {
                titles.push(window.title.clone());
            }
        }

        info!(
            "Detected {} monitor(s) and {} distinct window title(s)",
            monitors.len(),
            titles.len()
        );

        let report = DetectReport {
            monitors: monitors.len(),
            titles: titles.len(),
        };

        let mut state = self.state.write().await;
        state.monitors = monitors;
        state.titles = titles;
        state.detected = true;
        drop(state);

        self.metrics.write().await.detect_count += 1;
        Ok(report)
    }

    /// Cached monitor snapshot from the last detect
    pub async fn monitors(&self) -> Vec<MonitorInfo> {
        self.state.read().await.monitors.clone()
    }

    /// Cached distinct titles from the last detect
    pub async fn titles(&self) -> Vec<String> {
        self.state.read().await.titles.clone()
    }

    /// Counts for the status readout
    pub async fn status(&self) -> StatusSummary {
        let state = self.state.read().await;
        StatusSummary {
            monitors: state.monitors.len(),
            titles: state.titles.len(),
            matched_windows: state.last_matched,
            layers: state.layers.len(),
        }
    }

    pub async fn metrics(&self) -> SessionMetrics {
        self.metrics.read().await.clone()
    }

    /// Tile every window whose title contains `query` into a grid on the
    /// selected monitor.
    ///
    /// An empty match set is reported through the returned
    /// [`ApplyReport::nothing_to_do`], not as an error.
    pub async fn sort(&self, monitor_index: usize, query: &str) -> Result<ApplyReport> {
        let area = self.target_area(monitor_index).await?;

        let matched = self.matcher.match_windows(query).await?;
        self.state.write().await.last_matched = matched.len();

        let mut report = ApplyReport::default();
        if matched.is_empty() {
            info!("No matching windows containing '{}'", query);
            self.finish_batch(&report, true).await;
            return Ok(report);
        }

        report.matched = matched.len();
        let rects = self.planner.plan_for_count(area, matched.len()).await?;
        for (window, rect) in matched.iter().zip(rects) {
            self.place(window, rect, &mut report).await;
        }

        info!(
            "Sorted {}/{} window(s) matching '{}'",
            report.placed, report.matched, query
        );
        self.finish_batch(&report, true).await;
        Ok(report)
    }

    /// Register a new layer. Requires a prior detect so the monitor index
    /// can be validated against a real monitor list.
    pub async fn add_layer(&self, request: LayerCreateRequest) -> Result<Uuid> {
        let mut state = self.state.write().await;
        if !state.detected {
            return Err(precondition("Run detect before adding layers"));
        }
        if request.monitor_index >= state.monitors.len() {
            return Err(GridleError::ValidationError(format!(
                "Monitor index {} is not available ({} detected)",
                request.monitor_index,
                state.monitors.len()
            ))
            .into());
        }

        let layer =
            Layer::new(request).map_err(|err| GridleError::ValidationError(err.to_string()))?;
        let id = layer.id;
        info!(
            "Added layer '{}' ({} assignment(s))",
            layer.display_name,
            layer.assignment_count()
        );
        state.layers.push(layer);
        Ok(id)
    }

    /// Remove a layer, returning it
    pub async fn remove_layer(&self, id: Uuid) -> Result<Layer> {
        let mut state = self.state.write().await;
        let position = state
            .layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| GridleError::LayerNotFound(id.to_string()))?;
        let layer = state.layers.remove(position);
        info!("Removed layer '{}'", layer.display_name);
        Ok(layer)
    }

    pub async fn get_layer(&self, id: Uuid) -> Option<Layer> {
        self.state
            .read()
            .await
            .layers
            .iter()
            .find(|layer| layer.id == id)
            .cloned()
    }

    pub async fn list_layers(&self) -> Vec<Layer> {
        self.state.read().await.layers.clone()
    }

    /// Apply one layer: for each assigned tile, place the first window the
    /// query matches. Tiles without an assignment, and assignments without
    /// a match, leave the desktop untouched. Applying a layer does not
    /// change the sort operation's matched-window count.
    pub async fn apply_layer(&self, id: Uuid) -> Result<ApplyReport> {
        let (layer, area) = {
            let state = self.state.read().await;
            if !state.detected {
                return Err(precondition("Run detect before applying layers"));
            }
            let layer = state
                .layers
                .iter()
                .find(|layer| layer.id == id)
                .cloned()
                .ok_or_else(|| GridleError::LayerNotFound(id.to_string()))?;
            let monitor = state.monitors.get(layer.monitor_index).ok_or_else(|| {
                GridleError::MonitorNotFound(format!(
                    "index {} referenced by layer '{}'",
                    layer.monitor_index, layer.display_name
                ))
            })?;
            let area = monitor_area(&monitor.bounds);
            (layer, area)
        };

        let mut report = ApplyReport::default();
        for (&index, query) in &layer.tile_assignments {
            let matched = self.matcher.match_windows(query).await?;
            let Some(window) = matched.into_iter().next() else {
                debug!("Tile {} query '{}' matched no window", index, query);
                report.unmatched_tiles += 1;
                continue;
            };

            report.matched += 1;
            let rect = self.planner.plan_tile(area, layer.grid, index).await?;
            self.place(&window, rect, &mut report).await;
        }

        {
            let mut state = self.state.write().await;
            if let Some(stored) = state.layers.iter_mut().find(|layer| layer.id == id) {
                stored.mark_applied();
            }
        }

        info!(
            "Applied layer '{}': {} placed, {} unmatched tile(s)",
            layer.display_name, report.placed, report.unmatched_tiles
        );
        self.finish_batch(&report, false).await;
        Ok(report)
    }

    async fn target_area(&self, monitor_index: usize) -> Result<TileRect> {
        let state = self.state.read().await;
        if !state.detected {
            return Err(precondition("Run detect before sorting"));
        }
        let monitor = state
            .monitors
            .get(monitor_index)
            .ok_or_else(|| GridleError::MonitorNotFound(format!("index {monitor_index}")))?;
        Ok(monitor_area(&monitor.bounds))
    }

    /// Resize, move and activate one window, then pause so the OS settles.
    /// A failure is recorded in the report and the batch carries on.
    async fn place(&self, window: &DesktopWindow, rect: TileRect, report: &mut ApplyReport) {
        match self.place_window(window.window_id, rect).await {
            Ok(()) => report.placed += 1,
            Err(err) => {
                warn!("Could not move/resize '{}': {}", window.title, err);
                report.failures.push(PlacementFailure {
                    window_id: window.window_id,
                    title: window.title.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    async fn place_window(&self, window_id: u32, rect: TileRect) -> Result<()> {
        self.windows.resize(window_id, rect.width, rect.height)?;
        self.windows.move_to(window_id, rect.x, rect.y)?;
        self.windows.activate(window_id)?;
        sleep(self.config.activation_pause).await;
        Ok(())
    }

    async fn finish_batch(&self, report: &ApplyReport, is_sort: bool) {
        let mut metrics = self.metrics.write().await;
        if is_sort {
            metrics.sort_count += 1;
        } else {
            metrics.layer_apply_count += 1;
        }
        metrics.windows_placed += report.placed as u64;
        metrics.placement_failures += report.failures.len() as u64;
    }
}

fn precondition(message: &str) -> anyhow::Error {
    GridleError::PreconditionFailed(message.to_string()).into()
}
