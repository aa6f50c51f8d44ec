//! End-to-end scenarios driving the full stack: masks through the
//! pipeline, CD measurement, Bossung sweeps, and the observable store.

use litho_sim::{
    mask, measure_cd, run_bossung_sweep, BossungParams, ManualScheduler, Noll, OpticalParam,
    Pipeline, PupilParams, SimStore, GRID_DIM, PIXEL_SIZE_NM,
};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn blank_mask_prints_nothing() {
    let mut pipeline = Pipeline::new();
    let image = pipeline
        .run(&mask::blank(GRID_DIM), &PupilParams::default())
        .unwrap();

    assert!(image.intensity.iter().all(|&i| i == 0.0));
    assert_eq!(measure_cd(&image.intensity, 1.0), 0.0);
}

#[test]
fn impulse_through_a_wide_open_aperture_is_reproduced() {
    let mut impulse = mask::blank(GRID_DIM);
    impulse[[128, 128]] = 1.0;

    // aperture beyond the grid's corner frequency passes every bin
    let params = PupilParams {
        wavelength_nm: 193.0,
        na: 4.0,
        sigma: 1.0,
        ..PupilParams::default()
    };
    assert!(params.is_wide_open(GRID_DIM));

    let mut pipeline = Pipeline::new();
    let image = pipeline.run(&impulse, &params).unwrap();

    assert_eq!(image.intensity[[128, 128]], 1.0);
    for ((r, c), &i) in image.intensity.indexed_iter() {
        if (r, c) != (128, 128) {
            assert!(i < 1e-6, "energy leaked to ({}, {})", r, c);
        }
    }
}

#[test]
fn isolated_line_blurs_symmetrically() {
    let mut pipeline = Pipeline::new();
    let image = pipeline
        .run(&mask::isolated_line(GRID_DIM, 6), &PupilParams::default())
        .unwrap();
    let row = image.intensity.row(128);

    // the slit spans 125..=130, mirror-symmetric under c -> 255 - c
    for c in 0..GRID_DIM {
        assert!(
            (row[c] - row[GRID_DIM - 1 - c]).abs() < 1e-5,
            "asymmetry at column {}",
            c
        );
    }

    // the peak sits on the slit center
    assert!(row.iter().any(|&v| v == 1.0));

    // diffraction spreads the printed band beyond the six mask columns
    let above_threshold = (0..GRID_DIM).filter(|&c| row[c] >= 0.25).count();
    assert!(
        above_threshold > 6,
        "band is only {} columns wide",
        above_threshold
    );
    assert!(row[124] > 0.1, "no blur past the left slit edge");
    assert!(row[131] > 0.1, "no blur past the right slit edge");
}

#[test]
fn bossung_curves_are_symmetric_in_defocus() {
    let mut pipeline = Pipeline::new();
    let grating = mask::line_space(GRID_DIM, 10, 5);
    let sweep = BossungParams {
        focus_range: (-1.0, 1.0),
        focus_steps: 11,
        dose_range: (1.0, 1.0),
        dose_steps: 1,
    };
    let result =
        run_bossung_sweep(&mut pipeline, &grating, &PupilParams::default(), &sweep).unwrap();

    assert_eq!(result.pipeline_runs, 11);
    assert_eq!(result.curves.len(), 1);

    // the defocus phase is even in focus, so +f and -f print alike
    let points = &result.curves[0].points;
    for f in 0..points.len() / 2 {
        let mirrored = points.len() - 1 - f;
        assert!(
            (points[f].cd_nm - points[mirrored].cd_nm).abs() <= 2.0 * PIXEL_SIZE_NM,
            "cd at focus {} and {} diverged",
            points[f].focus_um,
            points[mirrored].focus_um
        );
    }
}

#[test]
fn spherical_aberration_changes_the_printed_cd() {
    let line = mask::isolated_line(GRID_DIM, 6);
    let mut pipeline = Pipeline::new();

    let baseline = pipeline.run(&line, &PupilParams::default()).unwrap();

    let mut aberrated_params = PupilParams::default();
    aberrated_params.zernike.set(Noll::Z9, 0.5);
    let aberrated = pipeline.run(&line, &aberrated_params).unwrap();

    // half a wave of spherical reshapes the whole profile
    let mut largest_change = 0.0f32;
    let base_row = baseline.intensity.row(128);
    let ab_row = aberrated.intensity.row(128);
    for c in 0..GRID_DIM {
        largest_change = largest_change.max((base_row[c] - ab_row[c]).abs());
    }
    assert!(largest_change > 0.1);

    // and moves the measured CD somewhere on the dose axis
    let doses: Vec<f64> = (0..10).map(|k| 1.05 + 0.05 * k as f64).collect();
    let moved = doses.iter().any(|&dose| {
        (measure_cd(&baseline.intensity, dose) - measure_cd(&aberrated.intensity, dose)).abs()
            > 0.0
    });
    assert!(moved, "aberration left every measured CD unchanged");
}

#[test]
fn slider_drag_coalesces_to_one_recompute() {
    let scheduler = ManualScheduler::new();
    let store = SimStore::new(scheduler.clone());

    let runs = Rc::new(Cell::new(0usize));
    let pipeline = Rc::new(std::cell::RefCell::new(Pipeline::new()));
    {
        let runs = runs.clone();
        let pipeline = pipeline.clone();
        store.subscribe(move |state| {
            pipeline
                .borrow_mut()
                .run(&state.mask, &state.params)
                .unwrap();
            runs.set(runs.get() + 1);
        });
    }

    store.set_mask(mask::isolated_line(GRID_DIM, 6));
    store.set_param(OpticalParam::Na, 0.7).unwrap();
    store.set_param(OpticalParam::Na, 0.8).unwrap();
    store.set_param(OpticalParam::Sigma, 0.3).unwrap();

    assert_eq!(runs.get(), 0);
    assert!(scheduler.run_next());
    assert_eq!(runs.get(), 1);

    let state = store.get_state();
    assert_eq!(state.params.na, 0.8);
    assert_eq!(state.params.sigma, 0.3);
}
