//! Static advisory content: the UV band ladder and the sun safety tips

pub mod bands;
pub mod tips;

pub use bands::{ADVISORY_BANDS, AdvisoryBand, UvLevel, band_for};
pub use tips::SUN_SAFETY_TIPS;
