use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use automation_dashboard::config::Country;
use automation_dashboard::data::model::RiskTier;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used for occupation lines, which have no colour of their own.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.70, 0.60);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Display colour of a country; grey when its configured colour is invalid.
pub fn country_color(country: &Country) -> Color32 {
    parse_hex(&country.color).unwrap_or(Color32::GRAY)
}

pub fn risk_color(tier: RiskTier) -> Color32 {
    match tier {
        RiskTier::High => Color32::from_rgb(0xd6, 0x27, 0x28),
        RiskTier::Medium => Color32::from_rgb(0xe6, 0xb4, 0x00),
        RiskTier::Low => Color32::from_rgb(0x2c, 0xa0, 0x2c),
    }
}
