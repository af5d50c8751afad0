//! Table colour selection from a fixed muted palette.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Muted pastel colours assigned to new tables.
pub const MUTED_PALETTE: [&str; 20] = [
    "#d4c5f9", // lavender
    "#c5e8f9", // light blue
    "#c5f9d4", // mint
    "#f9e8c5", // peach
    "#f9c5d4", // pink
    "#e8c5f9", // light purple
    "#c5f9e8", // aqua
    "#f9d4c5", // coral
    "#d4f9c5", // light green
    "#c5d4f9", // periwinkle
    "#f9c5e8", // rose
    "#e8f9c5", // light lime
    "#c5f9f9", // cyan
    "#f9f9c5", // light yellow
    "#f9c5c5", // light red
    "#c5e8e8", // teal
    "#e8c5e8", // orchid
    "#e8e8c5", // beige
    "#c5c5f9", // soft blue
    "#f9c5f9", // magenta
];

/// Source of table colours.
pub trait ColorSource: Send {
    fn next_color(&mut self) -> &'static str;
}

fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    MUTED_PALETTE[rng.gen_range(0..MUTED_PALETTE.len())]
}

/// Uniform pick per call from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPalette;

impl ColorSource for RandomPalette {
    fn next_color(&mut self) -> &'static str {
        pick(&mut rand::thread_rng())
    }
}

/// Deterministic picks from a seed.
#[derive(Debug, Clone)]
pub struct SeededPalette(StdRng);

impl SeededPalette {
    pub fn new(seed: u64) -> Self {
        SeededPalette(StdRng::seed_from_u64(seed))
    }
}

impl ColorSource for SeededPalette {
    fn next_color(&mut self) -> &'static str {
        pick(&mut self.0)
    }
}
