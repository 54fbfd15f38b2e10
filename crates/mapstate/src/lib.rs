pub mod coordinator;
pub mod error;
pub mod headless;
pub mod popup;
pub mod proximity;
pub mod selection;
pub mod surface;

pub use coordinator::*;
pub use error::MapStateError;
pub use headless::HeadlessSurface;
pub use popup::Popup;
pub use selection::SelectedPlaces;
pub use surface::{MarkerColor, MarkerId, MarkerSpec, RenderSurface};
