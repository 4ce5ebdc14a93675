use crate::{core::geo::LatLng, data::earthquake::Earthquake};

#[cfg(feature = "egui")]
use crate::core::viewport::Viewport;
#[cfg(feature = "egui")]
use egui::{Color32, FontId, Rect, Response, Ui, Vec2};

const MISSING: &str = "n/a";

/// Label/value lines shown inside a popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub lines: Vec<(String, String)>,
}

impl PopupContent {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn with_line(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.lines.push((label.into(), value.into()));
        self
    }

    /// Magnitude, depth and place of an event, values shown as received
    pub fn for_earthquake(quake: &Earthquake) -> Self {
        Self::new()
            .with_line("Magnitude", format_number(quake.magnitude))
            .with_line("Depth", format_number(Some(quake.depth_km)))
            .with_line("Location", quake.place.as_deref().unwrap_or(MISSING))
    }

    /// Plain text, one `Label: value` per line
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Markup with bold values separated by `<br>`
    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|(label, value)| format!("{}: <b>{}</b>", label, value))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

impl Default for PopupContent {
    fn default() -> Self {
        Self::new()
    }
}

// Shortest round-trip form: 4.0 prints as "4", 4.5 as "4.5".
fn format_number(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

#[cfg(feature = "egui")]
#[derive(Debug, Clone)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    pub rounding: f32,
    pub padding: f32,
    pub font_id: FontId,
    pub text_color: Color32,
    pub max_width: f32,
}

#[cfg(feature = "egui")]
impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_color: Color32::GRAY,
            border_width: 1.0,
            rounding: 4.0,
            padding: 8.0,
            font_id: FontId::proportional(12.0),
            text_color: Color32::BLACK,
            max_width: 300.0,
        }
    }
}

/// Popup anchored at a geographic position
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub position: LatLng,
    pub content: PopupContent,
}

impl Popup {
    pub fn new(position: LatLng, content: PopupContent) -> Self {
        Self { position, content }
    }

    pub fn for_earthquake(quake: &Earthquake) -> Self {
        Self::new(quake.location, PopupContent::for_earthquake(quake))
    }

    /// Draws the popup with its tip at `anchor`. Returns the click response
    /// of the popup body.
    #[cfg(feature = "egui")]
    pub fn render_at(&self, ui: &mut Ui, anchor: egui::Pos2, style: &PopupStyle) -> Response {
        let galley = ui.fonts(|f| {
            f.layout(
                self.content.text(),
                style.font_id.clone(),
                style.text_color,
                style.max_width,
            )
        });

        let size = galley.size() + Vec2::splat(style.padding * 2.0);
        let tip = 8.0;
        let min = egui::pos2(anchor.x - size.x / 2.0, anchor.y - size.y - tip);
        let rect = Rect::from_min_size(min, size);

        let painter = ui.painter();
        painter.rect_filled(rect, style.rounding, style.background_color);
        painter.rect_stroke(rect, style.rounding, (style.border_width, style.border_color));
        painter.add(egui::Shape::convex_polygon(
            vec![
                egui::pos2(anchor.x - tip, rect.max.y),
                egui::pos2(anchor.x + tip, rect.max.y),
                anchor,
            ],
            style.background_color,
            (style.border_width, style.border_color),
        ));
        painter.galley(rect.min + Vec2::splat(style.padding), galley, style.text_color);

        ui.allocate_rect(rect, egui::Sense::click())
    }
}

/// Holds the single open popup; opening another replaces it
#[derive(Debug, Default)]
pub struct PopupManager {
    open: Option<Popup>,
    #[cfg(feature = "egui")]
    style: PopupStyle,
}

impl PopupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, popup: Popup) {
        self.open = Some(popup);
    }

    pub fn close(&mut self) -> Option<Popup> {
        self.open.take()
    }

    pub fn current(&self) -> Option<&Popup> {
        self.open.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Draws the open popup; clicking its body closes it
    #[cfg(feature = "egui")]
    pub fn render(&mut self, ui: &mut Ui, rect: Rect, viewport: &Viewport) {
        let Some(popup) = &self.open else {
            return;
        };

        let pixel = viewport.lat_lng_to_pixel(&popup.position);
        let anchor = rect.min + Vec2::new(pixel.x as f32, pixel.y as f32);
        if !rect.contains(anchor) {
            return;
        }

        if popup.render_at(ui, anchor, &self.style).clicked() {
            self.open = None;
        }
    }
}
