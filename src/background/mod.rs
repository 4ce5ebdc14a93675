#[cfg(feature = "tokio-runtime")]
pub mod tasks;

#[cfg(feature = "tokio-runtime")]
pub use tasks::OverlayLoader;
