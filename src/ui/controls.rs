use crate::{
    core::map::Map,
    layers::base::LayerTrait,
    ui::elements::ControlPosition,
    Result,
};

/// One basemap radio button
#[derive(Debug, Clone, PartialEq)]
pub struct BasemapOption {
    pub name: String,
    pub selected: bool,
}

/// One overlay checkbox
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayToggle {
    pub name: String,
    pub visible: bool,
}

/// Snapshot of the layer switcher: exclusive basemaps, independent overlays
#[derive(Debug, Clone, PartialEq)]
pub struct LayerControl {
    basemaps: Vec<BasemapOption>,
    overlays: Vec<OverlayToggle>,
    pub position: ControlPosition,
}

impl LayerControl {
    pub fn from_map(map: &Map) -> Self {
        let active = map.active_basemap().name();
        let basemaps = map
            .basemaps()
            .names()
            .map(|name| BasemapOption {
                name: name.to_string(),
                selected: name == active,
            })
            .collect();

        let overlays = map
            .overlays()
            .iter()
            .map(|layer| OverlayToggle {
                name: layer.name().to_string(),
                visible: layer.is_visible(),
            })
            .collect();

        Self {
            basemaps,
            overlays,
            position: ControlPosition::TopRight,
        }
    }

    pub fn basemap_options(&self) -> &[BasemapOption] {
        &self.basemaps
    }

    pub fn overlay_toggles(&self) -> &[OverlayToggle] {
        &self.overlays
    }

    pub fn selected_basemap(&self) -> Option<&str> {
        self.basemaps
            .iter()
            .find(|option| option.selected)
            .map(|option| option.name.as_str())
    }

    /// Marks `name` as the only selected basemap; unknown names are ignored
    pub fn choose_basemap(&mut self, name: &str) {
        if self.basemaps.iter().any(|option| option.name == name) {
            for option in &mut self.basemaps {
                option.selected = option.name == name;
            }
        }
    }

    pub fn set_overlay(&mut self, name: &str, visible: bool) {
        if let Some(toggle) = self.overlays.iter_mut().find(|t| t.name == name) {
            toggle.visible = visible;
        }
    }

    /// Pushes the control state into the map
    pub fn apply(&self, map: &mut Map) -> Result<()> {
        if let Some(name) = self.selected_basemap() {
            if name != map.active_basemap().name() {
                map.select_basemap(name)?;
            }
        }
        for toggle in &self.overlays {
            map.set_overlay_visible(&toggle.name, toggle.visible)?;
        }
        Ok(())
    }

    /// Draws the control; returns true when the user changed something
    #[cfg(feature = "egui")]
    pub fn render(&mut self, ctx: &egui::Context, margin: f32) -> bool {
        let mut changed = false;

        egui::Window::new("Layers")
            .id(egui::Id::new("quakemap_layer_control"))
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(self.position.align(), self.position.anchor_offset(margin))
            .show(ctx, |ui| {
                let mut chosen = None;
                for option in &self.basemaps {
                    if ui.radio(option.selected, option.name.as_str()).clicked() && !option.selected {
                        chosen = Some(option.name.clone());
                    }
                }
                if let Some(name) = chosen {
                    self.choose_basemap(&name);
                    changed = true;
                }

                ui.separator();

                for toggle in &mut self.overlays {
                    changed |= ui.checkbox(&mut toggle.visible, toggle.name.as_str()).changed();
                }
            });

        changed
    }
}
