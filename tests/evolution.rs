//! end-to-end behavior of the evolution pipeline on tiny synthetic targets.

use evoraster::dna::DrawCmd;
use evoraster::render::premultiply;
use evoraster::{
    CanvasSize, CpuRenderer, DecaySchedule, Engine, EngineConfig, Evaluator, FitnessFormula,
    Renderer, Strategies,
};

fn strategies() -> Strategies {
    Strategies {
        selection: Box::new(evoraster::select::Elite),
        crossover: Box::new(evoraster::crossover::TwoPoint),
        mutation: Box::new(evoraster::mutation::Uniform),
        replacement: Box::new(evoraster::replacement::YoungBias),
    }
}

fn solid(canvas: CanvasSize, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat(canvas.pixel_count())
}

/// a phenotype that reproduces the target exactly scores 1.0
#[test]
fn exact_match_scores_one() {
    let canvas = CanvasSize::new(2, 2);
    let target = premultiply(&solid(canvas, [255, 0, 0, 255]));
    let evaluator =
        Evaluator::new(target, canvas, FitnessFormula::MeanAbsolute { exponent: 2 }).unwrap();

    // one opaque red triangle overshooting every canvas edge, so coverage is
    // total even with anti-aliasing on
    let cmds = [DrawCmd::Polygon {
        points: vec![(-5.0, -5.0), (15.0, -5.0), (-5.0, 15.0)],
        rgba: [1.0, 0.0, 0.0, 1.0],
    }];
    let phenotype = CpuRenderer.render(canvas, &cmds);
    let fitness = evaluator.score(&phenotype).unwrap();
    assert!((fitness - 1.0).abs() < 1e-9, "got {fitness}");
}

/// a wrong-sized phenotype is rejected, never silently resized
#[test]
fn mismatched_phenotype_is_rejected() {
    let canvas = CanvasSize::new(2, 2);
    let target = premultiply(&solid(canvas, [255, 0, 0, 255]));
    let evaluator = Evaluator::new(target, canvas, FitnessFormula::default()).unwrap();
    assert!(evaluator.score(&[0u8; 12]).is_err());
}

fn half_and_half(canvas: CanvasSize) -> Vec<u8> {
    let mut out = Vec::with_capacity(canvas.pixel_count() * 4);
    for y in 0..canvas.height {
        for _ in 0..canvas.width {
            if y < canvas.height / 2 {
                out.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                out.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
    }
    out
}

/// fifty generations on a two-color target with a flat 0.1 mutation
/// probability: the champion improves monotonically and every fitness stays
/// in the unit interval
#[test]
fn champion_is_monotone_over_a_short_run() {
    let canvas = CanvasSize::new(4, 4);
    let config = EngineConfig {
        population_size: 20,
        genome_len: 4,
        mutation_schedule: DecaySchedule::new(0.1, 0.1, 0.0),
        seed: 99,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(
        half_and_half(canvas),
        canvas,
        config,
        strategies(),
        CpuRenderer,
    )
    .unwrap();

    let mut last = 0.0f64;
    for _ in 0..50 {
        engine.step(20, Some(10)).unwrap();
        let champ = engine.champion().expect("tracking on by default");
        let fitness = champ.fitness_scored();
        assert!((0.0..=1.0).contains(&fitness));
        assert!(fitness >= last, "champion regressed: {fitness} < {last}");
        last = fitness;
        assert_eq!(engine.population().len(), 20);
    }
    assert_eq!(engine.generation(), 50);

    // the champion carries a renderable raster of the right size
    let raster = engine
        .champion()
        .and_then(|c| c.phenotype.as_deref())
        .expect("champion keeps its phenotype cache");
    assert_eq!(raster.len(), canvas.pixel_count() * 4);
}

/// a degenerate canvas fails construction with an error, never a panic in
/// geometry sampling or the rasterizer
#[test]
fn zero_canvas_is_rejected() {
    let result = Engine::new(
        Vec::new(),
        CanvasSize::new(0, 0),
        EngineConfig::default(),
        strategies(),
        CpuRenderer,
    );
    assert!(result.is_err());
}

/// two engines with the same seed walk the same trajectory
#[test]
fn identical_seeds_give_identical_runs() {
    let canvas = CanvasSize::new(4, 4);
    let build = || {
        Engine::new(
            half_and_half(canvas),
            canvas,
            EngineConfig {
                population_size: 10,
                genome_len: 3,
                seed: 1234,
                ..EngineConfig::default()
            },
            strategies(),
            CpuRenderer,
        )
        .unwrap()
    };
    let mut a = build();
    let mut b = build();
    for _ in 0..10 {
        a.step(10, None).unwrap();
        b.step(10, None).unwrap();
    }
    let fa = a.fittest().unwrap();
    let fb = b.fittest().unwrap();
    assert_eq!(fa.fitness_scored(), fb.fitness_scored());
    assert_eq!(fa.genome, fb.genome);
}
