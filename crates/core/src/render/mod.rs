pub mod export;
pub mod format;
pub mod raster;
pub mod share_card;
pub mod surface;
