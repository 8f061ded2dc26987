//! fixed color tables for discrete color sampling.
//!
//! the gene model draws from these when discrete sampling is configured. a
//! smaller color space converges faster at the cost of color fidelity.

/// a named, fully saturated RGB entry in [0,1] per channel
#[derive(Clone, Copy, Debug)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: [f32; 3],
}

const fn named(name: &'static str, r: f32, g: f32, b: f32) -> NamedColor {
    NamedColor { name, rgb: [r, g, b] }
}

/// the fixed palette used by discrete color sampling and the
/// palette-replacement mutation operator
pub const PALETTE: &[NamedColor] = &[
    named("black", 0.0, 0.0, 0.0),
    named("white", 1.0, 1.0, 1.0),
    named("red", 1.0, 0.0, 0.0),
    named("green", 0.0, 0.5, 0.0),
    named("blue", 0.0, 0.0, 1.0),
    named("yellow", 1.0, 1.0, 0.0),
    named("cyan", 0.0, 1.0, 1.0),
    named("magenta", 1.0, 0.0, 1.0),
    named("orange", 1.0, 0.65, 0.0),
    named("purple", 0.5, 0.0, 0.5),
    named("brown", 0.65, 0.16, 0.16),
    named("pink", 1.0, 0.75, 0.8),
    named("gray", 0.5, 0.5, 0.5),
    named("lime", 0.0, 1.0, 0.0),
    named("navy", 0.0, 0.0, 0.5),
    named("teal", 0.0, 0.5, 0.5),
];

/// the fixed discrete alpha set used by discrete sampling and the
/// alpha-replacement mutation operator
pub const ALPHA_LEVELS: [f32; 3] = [0.5, 0.75, 1.0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_channels_in_range() {
        for entry in PALETTE {
            for c in entry.rgb {
                assert!((0.0..=1.0).contains(&c), "{} out of range", entry.name);
            }
        }
    }

    #[test]
    fn test_alpha_levels_sorted_and_opaque_last() {
        assert_eq!(ALPHA_LEVELS, [0.5, 0.75, 1.0]);
    }
}
