//! Depth legend, derived from the same bucket table that colors markers.

use crate::{
    layers::vector::Color,
    style::{DepthBucket, DepthScale},
    ui::elements::ControlPosition,
};

#[cfg(feature = "egui")]
use egui::{Color32, Ui, Vec2};

/// One swatch and its depth range
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub color: Color,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub rows: Vec<LegendRow>,
    pub position: ControlPosition,
}

impl Legend {
    /// Rows read `"{lo} km – {hi} km"`; the open-ended last row reads `"{lo}+"`
    pub fn from_buckets(buckets: &[DepthBucket]) -> Self {
        let rows = buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| {
                let label = match buckets.get(i + 1) {
                    Some(next) => format!("{} km \u{2013} {} km", bucket.lower_km, next.lower_km),
                    None => format!("{}+", bucket.lower_km),
                };
                LegendRow {
                    color: bucket.color,
                    label,
                }
            })
            .collect();

        Self {
            rows,
            position: ControlPosition::BottomRight,
        }
    }

    pub fn from_scale(scale: &DepthScale) -> Self {
        Self::from_buckets(scale.buckets())
    }

    /// Markup for an `info legend` container: an `<i>` swatch per row
    pub fn to_html(&self) -> String {
        let last = self.rows.len().saturating_sub(1);
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let label = row.label.replace('\u{2013}', "&ndash;");
                let tail = if i == last { "" } else { "<br>" };
                format!(
                    "<i style = 'background: {}'></i>{}{}",
                    row.color.to_hex(),
                    label,
                    tail
                )
            })
            .collect()
    }

    #[cfg(feature = "egui")]
    pub fn render(&self, ctx: &egui::Context, margin: f32) {
        egui::Window::new("Depth")
            .id(egui::Id::new("quakemap_legend"))
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(self.position.align(), self.position.anchor_offset(margin))
            .show(ctx, |ui| self.ui(ui));
    }

    #[cfg(feature = "egui")]
    fn ui(&self, ui: &mut Ui) {
        ui.spacing_mut().item_spacing = Vec2::new(6.0, 2.0);
        for row in &self.rows {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 0.0, Color32::from(row.color));
                ui.label(row.label.as_str());
            });
        }
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::from_scale(&DepthScale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::DEPTH_BUCKETS;

    #[test]
    fn test_legend_rows() {
        let legend = Legend::default();
        assert_eq!(legend.rows.len(), 6);
        assert_eq!(legend.rows[0].label, "-10 km \u{2013} 10 km");
        assert_eq!(legend.rows[4].label, "70 km \u{2013} 90 km");
        assert_eq!(legend.rows[5].label, "90+");
        assert!(legend.rows.last().unwrap().label.ends_with('+'));
        assert_eq!(legend.position, ControlPosition::BottomRight);

        for (row, bucket) in legend.rows.iter().zip(DEPTH_BUCKETS.iter()) {
            assert_eq!(row.color, bucket.color);
        }
    }

    #[test]
    fn test_legend_html() {
        let html = Legend::default().to_html();
        assert!(html.starts_with(
            "<i style = 'background: #03fc62'></i>-10 km &ndash; 10 km<br>"
        ));
        assert!(html.ends_with("<i style = 'background: #fc0303'></i>90+"));
        assert_eq!(html.matches("<br>").count(), 5);
    }

    #[test]
    fn test_single_bucket_legend() {
        let scale = DepthScale::new(vec![DepthBucket::new(0.0, Color::WHITE)]).unwrap();
        let legend = Legend::from_scale(&scale);
        assert_eq!(legend.rows.len(), 1);
        assert_eq!(legend.rows[0].label, "0+");
    }
}
