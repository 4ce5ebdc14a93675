use std::sync::Arc;

use quakemap::{
    background::OverlayLoader, ui::widget::MapWidget, FeatureSource, HttpFeatureSource, Map,
    MapBuilder,
};

/// Standalone earthquake map viewer
fn main() -> anyhow::Result<()> {
    env_logger::init();

    // built by hand: the blocking tile client must not be created inside a runtime
    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Earthquakes of the past week"),
        ..Default::default()
    };

    let app = QuakemapApp::new(&runtime)?;
    eframe::run_native("quakemap-app", options, Box::new(|_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))?;

    Ok(())
}

struct QuakemapApp {
    map: Map,
    widget: MapWidget,
    loader: OverlayLoader,
}

impl QuakemapApp {
    fn new(runtime: &tokio::runtime::Runtime) -> anyhow::Result<Self> {
        let map = MapBuilder::new().with_size(1200.0, 800.0).build()?;
        let widget = MapWidget::from_config(map.config())?;

        let source: Arc<dyn FeatureSource> =
            Arc::new(HttpFeatureSource::new(&map.config().fetch)?);
        let loader = OverlayLoader::spawn(runtime.handle(), source, map.config());

        Ok(Self {
            map,
            widget,
            loader,
        })
    }
}

impl eframe::App for QuakemapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.loader.is_finished() {
            match self.loader.poll(&mut self.map) {
                Ok(outcomes) => {
                    for (kind, outcome) in outcomes {
                        log::info!("{} settled: {:?}", kind, outcome);
                    }
                }
                Err(e) => log::error!("applying feed failed: {}", e),
            }
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.widget.show(ui, &mut self.map);
            });
    }
}
