use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Per-parameter colours
// ---------------------------------------------------------------------------

/// Hue step between consecutive parameters (golden angle), so neighbouring
/// subplots never share a similar colour however many there are.
const HUE_STEP: f32 = 137.507_77;

/// Colour of the `idx`-th parameter.
pub fn param_color(idx: usize) -> Color32 {
    let hue = (idx as f32 * HUE_STEP) % 360.0;
    let hsl = Hsl::new(hue, 0.65, 0.55);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}
