//! UV index advisory bands
//!
//! The ladder is an ordered table evaluated top to bottom; the first band whose
//! upper bound is greater than or equal to the reading wins. The last band is
//! unbounded.

/// Risk level of an advisory band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

/// One row of the advisory ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisoryBand {
    pub level: UvLevel,
    /// Inclusive upper bound, `f64::INFINITY` for the last band
    pub upper_bound: f64,
    pub title: &'static str,
    /// Background color as a CSS hex string
    pub color: &'static str,
    pub burn_time: &'static str,
    pub message: &'static str,
}

pub static ADVISORY_BANDS: [AdvisoryBand; 5] = [
    AdvisoryBand {
        level: UvLevel::Low,
        upper_bound: 2.5,
        title: "All Clear!",
        color: "#32a852",
        burn_time: "Estimated time to burn: 60+ minutes",
        message: "Minimal risk. Sunscreen optional.",
    },
    AdvisoryBand {
        level: UvLevel::Moderate,
        upper_bound: 5.5,
        title: "Moderate Risk",
        color: "#dedb33",
        burn_time: "Estimated time to burn: 30–45 minutes",
        message: "Wear sunscreen, hat, and sunglasses.",
    },
    AdvisoryBand {
        level: UvLevel::High,
        upper_bound: 7.5,
        title: "High Risk",
        color: "#de8633",
        burn_time: "Estimated time to burn: 20–30 minutes",
        message: "Limit sun exposure midday. Cover up.",
    },
    AdvisoryBand {
        level: UvLevel::VeryHigh,
        upper_bound: 10.5,
        title: "Very High Risk",
        color: "#de3333",
        burn_time: "Estimated time to burn: 10–20 minutes",
        message: "Use SPF 30+, reapply often. Stay in shade.",
    },
    AdvisoryBand {
        level: UvLevel::Extreme,
        upper_bound: f64::INFINITY,
        title: "Extreme UV",
        color: "#bb23cf",
        burn_time: "Estimated time to burn: <10 minutes",
        message: "Avoid direct sun exposure. Full protection needed.",
    },
];

/// Band for a UV reading. NaN falls through to the extreme band.
#[must_use]
pub fn band_for(uv_index: f64) -> &'static AdvisoryBand {
    let extreme = &ADVISORY_BANDS[ADVISORY_BANDS.len() - 1];
    ADVISORY_BANDS
        .iter()
        .find(|band| uv_index <= band.upper_bound)
        .unwrap_or(extreme)
}
