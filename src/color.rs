/// HSL color as used by the smoke shading. Hue in degrees, saturation and lightness in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Hsl { hue, saturation, lightness }
    }

    /// Standard HSL -> RGB. Hue wraps around the color wheel, so 480 renders as 120.
    pub fn to_rgb(self) -> [u8; 3] {
        let h = if self.hue.is_finite() { self.hue.rem_euclid(360.0) } else { 0.0 };
        let s = self.saturation.clamp(0.0, 1.0);
        let l = self.lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h_prime = h / 60.0;
        let x = chroma * (1.0 - (h_prime % 2.0 - 1.0).abs());
        let (r, g, b) = match h_prime as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma * 0.5;
        let to_byte = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        [to_byte(r), to_byte(g), to_byte(b)]
    }
}

/// Smoke hue: blue at freestream speed, shifting toward red/magenta as the flow speeds up
/// and toward cyan/green as it slows down.
pub fn speed_hue(speed: f64, freestream: f64) -> f64 {
    240.0 + 120.0 * (speed - freestream) / freestream
}
