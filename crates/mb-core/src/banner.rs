//! Banner sizes passed to the engine on banner creation and load

use serde::{Deserialize, Serialize};

/// Requested banner container size (density-independent units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerSize {
    pub name: String,
    pub width: f32,
    pub height: f32,
}

impl BannerSize {
    /// 320 x 50
    pub fn standard() -> Self {
        Self::named("STANDARD", 320.0, 50.0)
    }

    /// 300 x 250
    pub fn medium() -> Self {
        Self::named("MEDIUM", 300.0, 250.0)
    }

    /// 728 x 90
    pub fn leaderboard() -> Self {
        Self::named("LEADERBOARD", 728.0, 90.0)
    }

    /// Engine picks the best fit within the container
    pub fn adaptive(width: f32, height: f32) -> Self {
        Self::named("ADAPTIVE", width.max(0.0), height.max(0.0))
    }

    fn named(name: &str, width: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        self.name == "ADAPTIVE"
    }
}

impl Default for BannerSize {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(BannerSize::standard().width, 320.0);
        assert_eq!(BannerSize::medium().height, 250.0);
        assert_eq!(BannerSize::leaderboard().name, "LEADERBOARD");
        assert!(!BannerSize::default().is_adaptive());
    }

    #[test]
    fn test_adaptive_clamps_negative_dimensions() {
        let size = BannerSize::adaptive(-10.0, 60.0);
        assert!(size.is_adaptive());
        assert_eq!(size.width, 0.0);
        assert_eq!(size.height, 60.0);
    }
}
