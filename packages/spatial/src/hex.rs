//! H3 hex-grid assignment.
//!
//! Maps coordinates onto cells of the global H3 hexagonal tiling at a
//! fixed resolution and derives each cell's outline as a WGS84 polygon.
//! Both directions are deterministic, so a cell's outline recomputes to
//! the same cell from its centroid.

use geo::{Coord, LineString, Polygon};
use h3o::{CellIndex, LatLng, Resolution};

use crate::SpatialError;

/// A hexagonal grid at one H3 resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexGrid {
    resolution: Resolution,
}

impl HexGrid {
    /// Creates a grid at the given H3 resolution (`0..=15`).
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::Resolution`] if the resolution is out of range.
    pub fn new(resolution: u8) -> Result<Self, SpatialError> {
        Ok(Self {
            resolution: Resolution::try_from(resolution)?,
        })
    }

    /// The grid resolution as a plain number.
    #[must_use]
    pub fn resolution(&self) -> u8 {
        u8::from(self.resolution)
    }

    /// Returns the cell containing the coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::LatLng`] for non-finite coordinates.
    pub fn cell(&self, lat: f64, lng: f64) -> Result<CellIndex, SpatialError> {
        Ok(LatLng::new(lat, lng)?.to_cell(self.resolution))
    }

    /// Returns the outline of a cell as a closed polygon in longitude/latitude.
    ///
    /// Cells straddling the antimeridian are unwrapped eastwards so the ring
    /// stays contiguous; their longitudes may then exceed 180.
    #[must_use]
    pub fn boundary(cell: CellIndex) -> Polygon<f64> {
        let mut coords: Vec<Coord<f64>> = cell
            .boundary()
            .iter()
            .map(|vertex| Coord {
                x: vertex.lng(),
                y: vertex.lat(),
            })
            .collect();

        let (min_x, max_x) = coords
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), c| {
                (min.min(c.x), max.max(c.x))
            });
        if max_x - min_x > 180.0 {
            for coord in &mut coords {
                if coord.x < 0.0 {
                    coord.x += 360.0;
                }
            }
        }

        Polygon::new(LineString::from(coords), vec![])
    }
}
