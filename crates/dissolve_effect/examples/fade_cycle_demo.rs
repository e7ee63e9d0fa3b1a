//! # Fade Cycle Demo
//!
//! Runs one materialize / dissolve cycle on a sampled sphere and prints the
//! progress, phase and coverage as the boundary sweeps across it.
//!
//! ```text
//! cargo run --package dissolve_effect --example fade_cycle_demo [config.toml]
//! ```

use dissolve_effect::{
    Attachment, DissolveConfig, DissolveMaterialEffect, DissolveResult, FadeFlags,
    SurfaceGeometry,
};

const DEFAULT_CONFIG: &str = include_str!("../data/default_dissolve.toml");
const FRAME: f32 = 1.0 / 60.0;
const FRAMES_PER_FADE: u32 = 600;

fn main() -> DissolveResult<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("   DISSOLVE - Fade Cycle Demo");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading configuration from {path}");
            DissolveConfig::from_toml_file(path)?
        }
        None => DissolveConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    println!(
        "Edge {} x{:.0}, thickness {:.2}, duration {:.2}s, {} octaves",
        config.color, config.intensity, config.thickness, config.duration, config.noise.octaves
    );
    println!();

    let mut effect =
        DissolveMaterialEffect::from_config(&config, Attachment::surface(SurfaceGeometry::sphere(2048)));
    effect.set_on_fade_out(|| println!("  >>> on_fade_out: surface can be removed"));

    for (label, flags) in [("FADE IN", FadeFlags::FADE_IN), ("FADE OUT", FadeFlags::FADE_OUT)] {
        println!("--- {label} ---");
        println!("{:>6} {:>9} {:>11} {:>7} {:>6} {:>7} {:>8}", "frame", "progress", "phase", "opaque", "edge", "hidden", "shadows");

        for frame in 0..FRAMES_PER_FADE {
            let side = effect.update(flags, FRAME);
            if frame % 30 == 0 || side.completion_fired {
                let coverage = effect.coverage();
                println!(
                    "{:>6} {:>9.4} {:>11} {:>7} {:>6} {:>7} {:>8}",
                    frame,
                    effect.progress(),
                    format!("{:?}", effect.phase()),
                    coverage.opaque,
                    coverage.edge,
                    coverage.hidden,
                    side.shadows_enabled()
                );
            }
        }
        println!();
    }

    println!("Final: progress {:.3}, phase {:?}", effect.progress(), effect.phase());
    Ok(())
}
