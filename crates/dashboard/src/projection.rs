//! Projection of GPS traces onto a fixed-size drawing surface.
//!
//! The projection is a plain equirectangular fit: one uniform scale for both
//! axes, so the trace keeps its shape, and the vertical axis flipped so north
//! is up. Samples with a missing or non-finite coordinate are dropped.

use geo::{BoundingRect, Coord, LineString};
use serde::Serialize;

use crate::models::GeoSample;

/// Range substituted for an axis with no extent (single point, or a trace
/// running straight north/south or east/west).
pub const DEGENERATE_RANGE: f64 = 0.001;

/// Target drawing dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for ProjectionFrame {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            padding: 20.0,
        }
    }
}

impl ProjectionFrame {
    pub const fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    fn drawable_width(&self) -> f64 {
        (self.width - 2.0 * self.padding).max(0.0)
    }

    fn drawable_height(&self) -> f64 {
        (self.height - 2.0 * self.padding).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

/// A trace mapped into frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedTrace {
    /// Projected points in input order.
    pub points: Vec<ProjectedPoint>,
    pub start: ProjectedPoint,
    pub end: ProjectedPoint,
    /// Pixels per degree, shared by both axes.
    pub scale: f64,
    pub frame: ProjectionFrame,
}

/// Projects `trace` into `frame`.
///
/// Returns `None` when the trace has no valid sample; callers render their
/// "no GPS data" placeholder in that case.
pub fn project(trace: &[GeoSample], frame: &ProjectionFrame) -> Option<ProjectedTrace> {
    let valid: LineString<f64> = trace.iter().filter_map(GeoSample::coord).collect();
    let bounds = valid.bounding_rect()?;

    let lon_range = non_degenerate(bounds.width());
    let lat_range = non_degenerate(bounds.height());

    let scale_x = frame.drawable_width() / lon_range;
    let scale_y = frame.drawable_height() / lat_range;
    let scale = scale_x.min(scale_y);

    let min = bounds.min();
    let to_frame = |c: &Coord<f64>| ProjectedPoint {
        x: frame.padding + (c.x - min.x) * scale,
        y: frame.height - frame.padding - (c.y - min.y) * scale,
    };

    let points: Vec<ProjectedPoint> = valid.coords().map(to_frame).collect();
    let start = *points.first()?;
    let end = *points.last()?;

    Some(ProjectedTrace {
        points,
        start,
        end,
        scale,
        frame: *frame,
    })
}

fn non_degenerate(range: f64) -> f64 {
    if range > 0.0 { range } else { DEGENERATE_RANGE }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_inside(trace: &ProjectedTrace) {
        let f = trace.frame;
        for p in &trace.points {
            assert!(p.x >= f.padding - EPS && p.x <= f.width - f.padding + EPS, "x out of frame: {}", p.x);
            assert!(p.y >= f.padding - EPS && p.y <= f.height - f.padding + EPS, "y out of frame: {}", p.y);
        }
    }

    #[test]
    fn test_empty_trace_projects_to_none() {
        let frame = ProjectionFrame::default();
        assert!(project(&[], &frame).is_none());
    }

    #[test]
    fn test_all_invalid_projects_to_none() {
        let frame = ProjectionFrame::default();
        let trace = vec![
            GeoSample { lat: None, lon: Some(6.0) },
            GeoSample::new(f64::NAN, f64::NAN),
            GeoSample { lat: Some(45.0), lon: None },
        ];
        assert!(project(&trace, &frame).is_none());
    }

    #[test]
    fn test_single_point_markers_coincide() {
        let frame = ProjectionFrame::default();
        let projected = project(&[GeoSample::new(45.9, 6.1)], &frame).unwrap();

        assert_eq!(projected.points.len(), 1);
        assert_eq!(projected.start, projected.end);
        assert!(projected.scale.is_finite());
        assert_eq!(projected.start, ProjectedPoint { x: 20.0, y: 380.0 });
        assert_inside(&projected);
    }

    #[test]
    fn test_north_south_line_stays_visible() {
        let frame = ProjectionFrame::default();
        let trace = vec![GeoSample::new(45.0, 6.0), GeoSample::new(45.01, 6.0)];
        let projected = project(&trace, &frame).unwrap();

        assert_inside(&projected);
        // lon range falls back to the epsilon, lat range decides the scale
        assert!((projected.scale - 360.0 / 0.01).abs() < 1e-6);
        assert!((projected.end.y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        let frame = ProjectionFrame::default();
        // lat range is twice the lon range
        let trace = vec![
            GeoSample::new(45.0, 6.0),
            GeoSample::new(45.02, 6.01),
            GeoSample::new(45.01, 6.005),
        ];
        let projected = project(&trace, &frame).unwrap();

        let scale_x: f64 = 360.0 / 0.01;
        let scale_y = 360.0 / 0.02;
        assert!((projected.scale - scale_x.min(scale_y)).abs() < 1e-6);
        assert_inside(&projected);

        let width = projected.points[1].x - projected.points[0].x;
        let height = projected.points[0].y - projected.points[1].y;
        assert!((height / width - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_north_is_up_and_order_kept() {
        let frame = ProjectionFrame::new(200.0, 100.0, 10.0);
        let trace = vec![
            GeoSample::new(45.0, 6.0),
            GeoSample { lat: None, lon: None },
            GeoSample::new(45.1, 6.3),
        ];
        let projected = project(&trace, &frame).unwrap();

        assert_eq!(projected.points.len(), 2);
        assert!(projected.end.y < projected.start.y);
        assert!(projected.end.x > projected.start.x);
        assert_eq!(projected.start, projected.points[0]);
        assert_inside(&projected);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let frame = ProjectionFrame::default();
        let trace: Vec<GeoSample> = (0..50)
            .map(|i| GeoSample::new(45.0 + (i as f64 * 0.3).sin() * 0.01, 6.0 + i as f64 * 0.001))
            .collect();

        let first = project(&trace, &frame).unwrap();
        let second = project(&trace, &frame).unwrap();
        assert_eq!(first, second);
        assert_inside(&first);
    }

    #[test]
    fn test_frame_smaller_than_padding() {
        let frame = ProjectionFrame::new(10.0, 10.0, 20.0);
        let trace = vec![GeoSample::new(45.0, 6.0), GeoSample::new(45.1, 6.1)];
        let projected = project(&trace, &frame).unwrap();

        assert_eq!(projected.scale, 0.0);
        assert!(projected.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
