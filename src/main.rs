use std::fs;
use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

use evoraster::render::unpremultiply;
use evoraster::{CanvasSize, CpuRenderer, Engine, Individual, Result, RunConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // worker threads get nice names like "rayon-0" in profiler output
    let _ = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{i}"))
        .build_global();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "configs/config.json".into());

    match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &str) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    info!("loaded config from {config_path}");

    let target = image::open(&config.image)?.to_rgba8();
    let canvas = CanvasSize::new(target.width(), target.height());
    info!(
        "target {} ({}x{}), population {}, {} {:?} genes per genome",
        config.image,
        canvas.width,
        canvas.height,
        config.population_amount,
        config.shape_count,
        config.shape_type,
    );

    let mut engine = Engine::new(
        target.into_raw(),
        canvas,
        config.engine_config(),
        config.strategies(),
        CpuRenderer,
    )?;

    fs::create_dir_all(&config.output_dir)?;
    let mut last_saved = 0.0f64;

    while engine.generation() < config.max_gen_count {
        engine.step(
            config.population_amount,
            Some(config.generated_child_amount),
        )?;

        let best = engine.fittest()?.fitness_scored();
        let champion = engine
            .champion()
            .map(|c| c.fitness_scored())
            .unwrap_or(best);

        if engine.generation() % 100 == 0 {
            info!(
                "generation {}: best {best:.6}, champion {champion:.6}",
                engine.generation()
            );
        }

        // snapshot the champion only when it moved meaningfully
        if champion - last_saved >= 0.01 {
            if let Some(champ) = engine.champion() {
                save_phenotype(champ, canvas, &config.output_dir, engine.generation())?;
                last_saved = champion;
            }
        }

        if champion >= config.min_fitness_goal {
            info!(
                "fitness goal {} reached at generation {}",
                config.min_fitness_goal,
                engine.generation()
            );
            break;
        }
    }

    let final_fitness = engine
        .champion()
        .map(|c| c.fitness_scored())
        .unwrap_or(last_saved);
    info!(
        "finished after {} generations, champion fitness {final_fitness:.6}",
        engine.generation()
    );
    if let Some(champ) = engine.champion() {
        save_phenotype(champ, canvas, &config.output_dir, engine.generation())?;
    }
    Ok(())
}

/// write the individual's cached raster as a straight-alpha PNG
fn save_phenotype(
    ind: &Individual,
    canvas: CanvasSize,
    output_dir: &str,
    generation: u64,
) -> Result<()> {
    let Some(premul) = ind.phenotype.as_ref() else {
        return Ok(());
    };
    let straight = unpremultiply(premul);
    let path = Path::new(output_dir).join(format!("gen_{generation:06}.png"));
    image::save_buffer(
        &path,
        &straight,
        canvas.width,
        canvas.height,
        image::ColorType::Rgba8,
    )?;
    info!("saved {}", path.display());
    Ok(())
}
