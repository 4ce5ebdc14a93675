pub mod controls;
pub mod elements;
pub mod legend;
pub mod popup;

#[cfg(feature = "egui")]
pub mod widget;

pub use controls::{BasemapOption, LayerControl, OverlayToggle};
pub use elements::ControlPosition;
pub use legend::{Legend, LegendRow};
pub use popup::{Popup, PopupContent, PopupManager};

#[cfg(feature = "egui")]
pub use popup::PopupStyle;
#[cfg(feature = "egui")]
pub use widget::MapWidget;
