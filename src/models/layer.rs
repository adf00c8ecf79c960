//! Layer model for the manual tile-assignment feature
//!
//! A layer names a rows x cols grid on a target monitor and assigns a
//! window-title query to individual tiles. Layers live only in memory for
//! the lifetime of the session; nothing is persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::grid::{GridError, GridSpec};

/// A named per-tile window assignment on an explicit grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable layer name
    pub display_name: String,

    /// Grid the assignments refer to (1x1 up to 5x5)
    pub grid: GridSpec,

    /// Index of the target monitor in detection order
    pub monitor_index: usize,

    /// Tile index -> title query. Unassigned tiles are left untouched when
    /// the layer is applied. Keyed by a BTreeMap so application order is
    /// deterministic even though the source of the assignments is not.
    pub tile_assignments: BTreeMap<usize, String>,

    /// Timestamp of layer creation
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful apply
    pub last_applied: Option<DateTime<Utc>>,
}

/// Request structure for creating a new layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerCreateRequest {
    pub display_name: String,
    pub rows: u32,
    pub cols: u32,
    pub monitor_index: usize,
    pub tile_assignments: BTreeMap<usize, String>,
}

impl Layer {
    /// Create a new layer from a creation request, rejecting invalid states
    /// (bad grid dimensions, out-of-range tile index, empty query) up front
    /// instead of silently ignoring them at apply time.
    pub fn new(request: LayerCreateRequest) -> Result<Self, LayerError> {
        let grid = GridSpec::explicit(request.rows, request.cols)?;

        if request.display_name.trim().is_empty() {
            return Err(LayerError::EmptyName);
        }

        if request.display_name.len() > 100 {
            return Err(LayerError::NameTooLong(request.display_name.len()));
        }

        let mut layer = Layer {
            id: Uuid::new_v4(),
            display_name: request.display_name,
            grid,
            monitor_index: request.monitor_index,
            tile_assignments: BTreeMap::new(),
            created_at: Utc::now(),
            last_applied: None,
        };

        for (index, query) in request.tile_assignments {
            layer.assign_tile(index, query)?;
        }

        Ok(layer)
    }

    /// Assign (or replace) the title query for a tile
    pub fn assign_tile(&mut self, index: usize, query: impl Into<String>) -> Result<(), LayerError> {
        // Validates the index against the grid
        self.grid.tile_position(index)?;

        let query = query.into();
        if query.trim().is_empty() {
            return Err(LayerError::EmptyQuery { index });
        }

        self.tile_assignments.insert(index, query);
        Ok(())
    }

    /// Remove the assignment for a tile, returning the previous query
    pub fn clear_tile(&mut self, index: usize) -> Option<String> {
        self.tile_assignments.remove(&index)
    }

    /// Record a successful apply
    pub fn mark_applied(&mut self) {
        self.last_applied = Some(Utc::now());
    }

    /// Number of tiles with an assignment
    pub fn assignment_count(&self) -> usize {
        self.tile_assignments.len()
    }
}

/// Errors that can occur when building or editing a layer
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("Layer name cannot be empty")]
    EmptyName,

    #[error("Layer name cannot exceed 100 characters, got {0}")]
    NameTooLong(usize),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Title query for tile {index} cannot be empty")]
    EmptyQuery { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LayerCreateRequest {
        LayerCreateRequest {
            display_name: "Editors left, terminals right".to_string(),
            rows: 2,
            cols: 2,
            monitor_index: 0,
            tile_assignments: BTreeMap::from([
                (0, "emacs".to_string()),
                (3, "terminal".to_string()),
            ]),
        }
    }

    #[test]
    fn layer_creation_accepts_valid_request() {
        let layer = Layer::new(request()).unwrap();

        assert_eq!(layer.grid, GridSpec { rows: 2, cols: 2 });
        assert_eq!(layer.assignment_count(), 2);
        assert_eq!(layer.tile_assignments.get(&3).map(String::as_str), Some("terminal"));
        assert!(layer.last_applied.is_none());
    }

    #[test]
    fn layer_creation_rejects_empty_name() {
        let mut req = request();
        req.display_name = "   ".to_string();
        assert!(matches!(Layer::new(req), Err(LayerError::EmptyName)));
    }

    #[test]
    fn layer_creation_rejects_oversized_grid() {
        let mut req = request();
        req.rows = 6;
        assert!(matches!(Layer::new(req), Err(LayerError::Grid(_))));
    }

    #[test]
    fn layer_creation_rejects_out_of_range_tile() {
        let mut req = request();
        req.tile_assignments.insert(4, "browser".to_string());
        assert!(matches!(Layer::new(req), Err(LayerError::Grid(_))));
    }

    #[test]
    fn layer_creation_rejects_empty_query() {
        let mut req = request();
        req.tile_assignments.insert(1, "  ".to_string());
        assert!(matches!(
            Layer::new(req),
            Err(LayerError::EmptyQuery { index: 1 })
        ));
    }

    #[test]
    fn assignments_iterate_in_tile_order() {
        let mut layer = Layer::new(request()).unwrap();
        layer.assign_tile(1, "browser").unwrap();

        let indices: Vec<_> = layer.tile_assignments.keys().copied().collect();
        assert_eq!(indices, vec![0, 1, 3]);
    }

    #[test]
    fn clear_tile_returns_previous_query() {
        let mut layer = Layer::new(request()).unwrap();

        assert_eq!(layer.clear_tile(0), Some("emacs".to_string()));
        assert_eq!(layer.clear_tile(0), None);
        assert_eq!(layer.assignment_count(), 1);
    }

    #[test]
    fn mark_applied_sets_timestamp() {
        let mut layer = Layer::new(request()).unwrap();
        layer.mark_applied();
        assert!(layer.last_applied.is_some());
    }
}
