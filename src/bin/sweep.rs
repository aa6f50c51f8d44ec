use litho_sim::{
    mask, measure_cd, resist, run_bossung_sweep, BossungParams, ManualScheduler, OpticalParam,
    Pipeline, SimStore, GRID_DIM,
};
use std::cell::RefCell;
use std::rc::Rc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // interactive half: edits coalesce onto one display tick, the
    // subscriber renders once per tick
    let scheduler = ManualScheduler::new();
    let store = SimStore::new(scheduler.clone());
    let pipeline = Rc::new(RefCell::new(Pipeline::new()));

    {
        let pipeline = pipeline.clone();
        store.subscribe(move |state| {
            let image = pipeline
                .borrow_mut()
                .run(&state.mask, &state.params)
                .expect("store state always matches the pipeline grid");

            let printed = resist::resist_print(&image.intensity, state.view.threshold as f32);
            let coverage = printed.iter().filter(|&&p| p).count();
            let profile = resist::cross_section(&image.intensity, state.view.cross_section_row);
            let peak = profile.iter().cloned().fold(0.0f32, f32::max);

            println!(
                "render: {:.1} ms, {} resist pixels at threshold {}, row {} peak {:.3}, cd {:.1} nm",
                image.time_ms,
                coverage,
                state.view.threshold,
                state.view.cross_section_row,
                peak,
                measure_cd(&image.intensity, 1.2),
            );
        });
    }

    store.set_mask(mask::line_space(GRID_DIM, 10, 5));
    store.set_param(OpticalParam::Defocus, 0.3)?;
    store.set_param(OpticalParam::Defocus, 0.0)?;
    scheduler.run_next();

    // batch half: Bossung sweep over the same state
    let state = store.get_state();
    let sweep = BossungParams::default();
    let result = run_bossung_sweep(
        &mut pipeline.borrow_mut(),
        &state.mask,
        &state.params,
        &sweep,
    )?;
    println!(
        "bossung sweep: {} pipeline runs in {:.1} ms",
        result.pipeline_runs, result.time_ms
    );

    print!("{:>12}", "focus um");
    for dose in &result.dose_values {
        print!("{:>12}", format!("d={:.2}", dose));
    }
    println!();
    for (f, &focus) in result.focus_values.iter().enumerate() {
        print!("{:>12.2}", focus);
        for curve in &result.curves {
            print!("{:>12.1}", curve.points[f].cd_nm);
        }
        println!();
    }

    Ok(())
}
