use crate::models::grid::{GridSpec, TileRect};
use crate::platform::display::Bounds;
use crate::{GridleError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metrics captured for layout computations
#[derive(Debug, Default, Clone)]
pub struct LayoutPlannerMetrics {
    pub layout_requests: u64,
    pub last_window_count: usize,
    pub last_grid: Option<GridSpec>,
}

/// Computes grid tile rectangles for a monitor area.
///
/// The arithmetic lives on [`GridSpec`]; this service wraps it with the
/// count-driven grid policy and request metrics.
pub struct LayoutPlanner {
    metrics: Arc<RwLock<LayoutPlannerMetrics>>,
}

impl Default for LayoutPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutPlanner {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(LayoutPlannerMetrics::default())),
        }
    }

    /// Compute target rectangles for `count` windows on the given monitor
    /// area, one per window in row-major order.
    pub async fn plan_for_count(&self, area: TileRect, count: usize) -> Result<Vec<TileRect>> {
        let grid = GridSpec::for_count(count)
            .map_err(|err| GridleError::ValidationError(err.to_string()))?;

        let mut rects = Vec::with_capacity(count);
        for index in 0..count {
            let rect = grid
                .tile_rect(&area, index)
                .map_err(|err| GridleError::ValidationError(err.to_string()))?;
            rects.push(rect);
        }

        self.record(count, grid).await;
        Ok(rects)
    }

    /// Compute the target rectangle for a single tile of an explicit grid
    /// (the layer feature). Tiles without an assignment are never computed.
    pub async fn plan_tile(&self, area: TileRect, grid: GridSpec, index: usize) -> Result<TileRect> {
        let rect = grid
            .tile_rect(&area, index)
            .map_err(|err| GridleError::ValidationError(err.to_string()))?;

        self.record(1, grid).await;
        Ok(rect)
    }

    pub async fn metrics(&self) -> LayoutPlannerMetrics {
        self.metrics.read().await.clone()
    }

    async fn record(&self, count: usize, grid: GridSpec) {
        let mut metrics = self.metrics.write().await;
        metrics.layout_requests += 1;
        metrics.last_window_count = count;
        metrics.last_grid = Some(grid);
    }
}

/// Convert monitor bounds into the area rectangle the planner works on
pub fn monitor_area(bounds: &Bounds) -> TileRect {
    TileRect {
        x: bounds.x,
        y: bounds.y,
        width: bounds.width,
        height: bounds.height,
    }
}
