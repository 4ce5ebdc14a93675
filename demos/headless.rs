use quakemap::{
    core::map::EARTHQUAKES_OVERLAY, HttpFeatureSource, LayerControl, MapBuilder, VectorFeature,
};

/// Loads both feeds without any UI and prints what the map would show
#[tokio::main]
async fn main() -> quakemap::Result<()> {
    println!("quakemap headless");
    println!("=================");

    let mut map = MapBuilder::new().with_size(1024.0, 768.0).build()?;
    let source = HttpFeatureSource::new(&map.config().fetch)?;

    let report = map.load_overlays(&source).await?;
    println!("plates:      {:?}", report.plates);
    println!("earthquakes: {:?}", report.earthquakes);
    println!("status:      {}", map.status_line());

    println!("\nLegend (depth):");
    for row in &map.legend().rows {
        println!("  {}  {}", row.color.to_hex(), row.label);
    }

    println!("\nLayers:");
    let control = LayerControl::from_map(&map);
    for option in control.basemap_options() {
        let mark = if option.selected { "(*)" } else { "( )" };
        println!("  {} {}", mark, option.name);
    }
    for toggle in control.overlay_toggles() {
        let mark = if toggle.visible { "[x]" } else { "[ ]" };
        println!("  {} {}", mark, toggle.name);
    }

    if let Some(layer) = map.overlay(EARTHQUAKES_OVERLAY) {
        let mut popups: Vec<_> = layer
            .features()
            .iter()
            .filter_map(|feature| match feature {
                VectorFeature::CircleMarker { style, popup, .. } => {
                    popup.as_ref().map(|content| (style.radius, content))
                }
                _ => None,
            })
            .collect();
        popups.sort_by(|a, b| b.0.total_cmp(&a.0));

        println!("\nLargest events:");
        for (_, content) in popups.iter().take(5) {
            println!("  {}", content.text().replace('\n', " | "));
        }
    }

    Ok(())
}

