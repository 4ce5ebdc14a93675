use crate::{
    core::{
        config::MapConfig,
        geo::{LatLng, Point},
        map::Map,
        viewport::Viewport,
    },
    layers::{
        base::LayerTrait,
        vector::{Color, VectorFeature},
    },
    tiles::{cache::TileCache, loader::TileLoader, source::TileSource, TileKey},
    ui::controls::LayerControl,
    Result,
};
use egui::{
    Align2, Color32, ColorImage, FontId, Pos2, Rect, Response, Sense, Shape, Stroke,
    TextureHandle, TextureOptions, Ui, Vec2,
};

/// Zoom levels per scroll point
const ZOOM_PER_SCROLL: f64 = 1.0 / 120.0;

/// Tiles requested per frame at most
const MAX_REQUESTS_PER_FRAME: usize = 8;

/// Draws a [`Map`] session and forwards pan, zoom and clicks to it.
///
/// The widget owns the GPU textures of downloaded tiles and the tile
/// loader; the map session itself stays with the caller.
pub struct MapWidget {
    textures: TileCache<TextureHandle>,
    loader: Option<TileLoader>,
    margin: f32,
    background: Color32,
}

impl MapWidget {
    /// Widget without network access: only overlays are drawn
    pub fn new(cache_size: usize) -> Self {
        Self {
            textures: TileCache::new(cache_size),
            loader: None,
            margin: 10.0,
            background: Color32::from_rgb(0xdd, 0xdd, 0xdd),
        }
    }

    /// Widget that downloads basemap tiles as configured
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        let mut widget = Self::new(config.tiles.cache_size);
        widget.loader = Some(TileLoader::new(&config.fetch, config.tiles.clone())?);
        Ok(widget)
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn show(&mut self, ui: &mut Ui, map: &mut Map) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        map.viewport_mut()
            .set_size(Point::new(rect.width() as f64, rect.height() as f64));

        self.handle_input(ui, &response, rect, map);
        self.receive_tiles(ui.ctx());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.background);
        self.draw_tiles(&painter, rect, map);
        draw_overlays(&painter, rect, map);

        let viewport = map.viewport().clone();
        map.popups_mut().render(ui, rect, &viewport);

        painter.text(
            rect.left_bottom() + Vec2::new(5.0, -4.0),
            Align2::LEFT_BOTTOM,
            map.active_basemap().attribution(),
            FontId::proportional(10.0),
            Color32::from_gray(60),
        );
        painter.text(
            rect.left_top() + Vec2::new(5.0, 4.0),
            Align2::LEFT_TOP,
            map.status_line(),
            FontId::proportional(12.0),
            Color32::from_gray(30),
        );

        map.legend().render(ui.ctx(), self.margin);

        let mut control = LayerControl::from_map(map);
        if control.render(ui.ctx(), self.margin) {
            if let Err(e) = control.apply(map) {
                log::warn!("layer control: {}", e);
            }
        }

        if self.loader.as_ref().is_some_and(TileLoader::is_loading) {
            ui.ctx().request_repaint();
        }

        response
    }

    fn handle_input(&self, ui: &Ui, response: &Response, rect: Rect, map: &mut Map) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                map.viewport_mut()
                    .pan(Point::new(delta.x as f64, delta.y as f64));
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                let anchor = ui
                    .input(|i| i.pointer.hover_pos())
                    .map(|pos| to_point(pos, rect))
                    .unwrap_or_else(|| {
                        Point::new(rect.width() as f64 / 2.0, rect.height() as f64 / 2.0)
                    });
                map.viewport_mut()
                    .zoom_around(anchor, scroll as f64 * ZOOM_PER_SCROLL);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                map.handle_click(to_point(pos, rect));
            }
        }
    }

    fn receive_tiles(&mut self, ctx: &egui::Context) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };

        for result in loader.poll() {
            match result.data.and_then(|bytes| decode_tile(&bytes)) {
                Ok(image) => {
                    let name = format!(
                        "tile_{}_{}_{}_{}",
                        result.key.layer, result.key.coord.z, result.key.coord.x, result.key.coord.y
                    );
                    let texture = ctx.load_texture(name, image, TextureOptions::LINEAR);
                    self.textures.put(result.key, texture);
                    ctx.request_repaint();
                }
                Err(e) => log::debug!("tile {:?} unavailable: {}", result.key, e),
            }
        }
    }

    fn draw_tiles(&mut self, painter: &egui::Painter, rect: Rect, map: &Map) {
        let basemap = map.active_basemap();
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        let mut requested = 0;

        for placement in basemap.visible_tiles(map.viewport()) {
            let key = TileKey::new(basemap.source_id(), placement.coord);
            match self.textures.get(&key) {
                Some(texture) => {
                    let min = rect.min + Vec2::new(placement.min.x as f32, placement.min.y as f32);
                    let tile_rect = Rect::from_min_size(min, Vec2::splat(placement.size as f32));
                    painter.image(texture.id(), tile_rect, uv, Color32::WHITE);
                }
                None => {
                    if requested < MAX_REQUESTS_PER_FRAME {
                        if let Some(loader) = self.loader.as_mut() {
                            if loader.request(basemap, placement.coord) {
                                requested += 1;
                            }
                        }
                    }
                }
            }
        }
    }
}

fn draw_overlays(painter: &egui::Painter, rect: Rect, map: &Map) {
    let viewport = map.viewport();
    for layer in map.overlays() {
        if !layer.is_visible() {
            continue;
        }
        for feature in layer.features() {
            draw_feature(painter, rect, viewport, feature);
        }
    }
}

fn draw_feature(painter: &egui::Painter, rect: Rect, viewport: &Viewport, feature: &VectorFeature) {
    let to_screen = |lat_lng: &LatLng| {
        let p = viewport.lat_lng_to_pixel(lat_lng);
        rect.min + Vec2::new(p.x as f32, p.y as f32)
    };

    match feature {
        VectorFeature::CircleMarker { position, style, .. } => {
            let center = to_screen(position);
            let radius = style.radius.abs() as f32;
            if !rect.expand(radius).contains(center) {
                return;
            }
            painter.circle(
                center,
                radius,
                tinted(style.fill_color, style.fill_opacity),
                Stroke::new(
                    style.stroke_weight,
                    tinted(style.stroke_color, style.stroke_opacity),
                ),
            );
        }
        VectorFeature::Polyline { points, style } => {
            let points: Vec<Pos2> = points.iter().map(to_screen).collect();
            painter.add(Shape::line(
                points,
                Stroke::new(style.weight, tinted(style.color, style.opacity)),
            ));
        }
        VectorFeature::Polygon { rings, style } => {
            // outlines only; egui fills convex shapes alone
            for ring in rings {
                let points: Vec<Pos2> = ring.iter().map(to_screen).collect();
                painter.add(Shape::closed_line(
                    points,
                    Stroke::new(style.weight, tinted(style.color, style.opacity)),
                ));
            }
        }
    }
}

fn tinted(color: Color, opacity: f32) -> Color32 {
    Color32::from(color.with_opacity(opacity))
}

fn to_point(pos: Pos2, rect: Rect) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn decode_tile(bytes: &[u8]) -> Result<ColorImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| crate::MapError::Parse(format!("tile image: {}", e)))?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tile() {
        let mut png = Vec::new();
        let pixels = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        image::DynamicImage::ImageRgba8(pixels)
            .write_to(
                &mut std::io::Cursor::new(&mut png),
                image::ImageOutputFormat::Png,
            )
            .unwrap();

        let decoded = decode_tile(&png).unwrap();
        assert_eq!(decoded.size, [2, 3]);
        assert_eq!(decoded.pixels[0], Color32::from_rgb(10, 20, 30));
        assert!(decode_tile(b"not an image").is_err());
    }

    #[test]
    fn test_to_point_is_container_relative() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 300.0));
        assert_eq!(to_point(Pos2::new(110.0, 70.0), rect), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_tint_applies_opacity() {
        let color = tinted(Color::rgb(0, 0, 255), 0.5);
        assert_eq!(color.a(), 128);
    }
}
