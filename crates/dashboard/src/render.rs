//! Drawing of projected traces and goal progress.
//!
//! Rendering state lives in explicit values owned by the caller; nothing in
//! here is global.

use std::fmt::Write as _;

use crate::{
    goals::{Band, GoalCategory, ProgressResult},
    models::GeoSample,
    projection::{ProjectedTrace, ProjectionFrame, project},
};

/// SVG drawing surface for activity traces.
#[derive(Debug, Clone)]
pub struct TraceCanvas {
    pub frame: ProjectionFrame,
    pub background: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub start_color: String,
    pub end_color: String,
    pub marker_radius: f64,
}

impl Default for TraceCanvas {
    fn default() -> Self {
        Self {
            frame: ProjectionFrame::default(),
            background: "#f8f9fa".into(),
            stroke: "#667eea".into(),
            stroke_width: 3.0,
            start_color: "#28a745".into(),
            end_color: "#dc3545".into(),
            marker_radius: 6.0,
        }
    }
}

impl TraceCanvas {
    pub fn with_frame(frame: ProjectionFrame) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    /// Projects and draws `trace`; `None` when there is nothing to draw.
    pub fn draw(&self, trace: &[GeoSample]) -> Option<String> {
        project(trace, &self.frame).map(|projected| self.render(&projected))
    }

    pub fn render(&self, trace: &ProjectedTrace) -> String {
        let f = trace.frame;
        let points = trace
            .points
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
            f.width, f.height
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            escape_xml(&self.background)
        );
        let _ = writeln!(
            svg,
            r#"  <polyline points="{points}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            escape_xml(&self.stroke),
            self.stroke_width
        );
        for (p, color) in [(trace.start, &self.start_color), (trace.end, &self.end_color)] {
            let _ = writeln!(
                svg,
                r##"  <circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}" stroke="#fff" stroke-width="2"/>"##,
                p.x,
                p.y,
                self.marker_radius,
                escape_xml(color)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Placeholder shown when an activity has no usable GPS data.
    pub fn placeholder(&self, message: &str) -> String {
        let (w, h) = (self.frame.width, self.frame.height);
        let message = escape_xml(message);
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}">
  <text x="{}" y="{}" text-anchor="middle" fill="#666">{message}</text>
</svg>
"##,
            w / 2.0,
            h / 2.0
        )
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Fixed-width text progress bar.
#[derive(Debug, Clone, Copy)]
pub struct ProgressBar {
    pub width: usize,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self { width: 20 }
    }
}

impl ProgressBar {
    /// `Run + Trail  [################....]  80% 8.0/10.0 km (good)`.
    pub fn render(&self, category: GoalCategory, result: &ProgressResult) -> String {
        if !result.has_goal() {
            return format!(
                "{:<12} {:.1} km (no goal set)",
                category.label(),
                result.current_km
            );
        }

        let filled = ((result.percentage / 100.0) * self.width as f64).round() as usize;
        let filled = filled.min(self.width);
        format!(
            "{:<12} [{}{}] {:>3.0}% {:.1}/{:.1} km ({})",
            category.label(),
            "#".repeat(filled),
            ".".repeat(self.width - filled),
            result.percentage,
            result.current_km,
            result.goal_km,
            band_label(result.band)
        )
    }
}

pub fn band_label(band: Band) -> &'static str {
    match band {
        Band::Deficient => "deficient",
        Band::Moderate => "moderate",
        Band::Good => "good",
        Band::Complete => "complete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_trace() {
        let canvas = TraceCanvas::default();
        let svg = canvas
            .draw(&[GeoSample::new(45.0, 6.0), GeoSample::new(45.01, 6.02)])
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polyline points=\"20.00,380.00 380.00,200.00\""));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_draw_without_data() {
        let canvas = TraceCanvas::default();
        assert!(canvas.draw(&[]).is_none());
        assert!(canvas.placeholder("Aucune donnée GPS").contains("Aucune donnée GPS"));
    }

    #[test]
    fn test_markup_in_text_and_colors_escaped() {
        let canvas = TraceCanvas {
            stroke: r#"red" onload="x"#.into(),
            ..Default::default()
        };

        let svg = canvas.placeholder("Pas de GPS <trace & carte>");
        assert!(svg.contains("Pas de GPS &lt;trace &amp; carte&gt;"));
        assert!(!svg.contains("<trace"));

        let svg = canvas
            .draw(&[GeoSample::new(45.0, 6.0), GeoSample::new(45.01, 6.02)])
            .unwrap();
        assert!(svg.contains(r#"stroke="red&quot; onload=&quot;x""#));
        assert!(!svg.contains(r#"onload="x""#));
    }

    #[test]
    fn test_progress_bar() {
        let bar = ProgressBar { width: 10 };
        let line = bar.render(GoalCategory::RunTrail, &ProgressResult::new(8.0, 10.0));
        assert!(line.contains("[########..]"));
        assert!(line.contains(" 80%"));
        assert!(line.ends_with("(good)"));

        let line = bar.render(GoalCategory::Swim, &ProgressResult::new(1.0, 0.0));
        assert!(line.contains("no goal set"));
    }
}
