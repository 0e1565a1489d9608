pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Advance `routine` with a fixed `step` until it finishes, returning the
/// number of advances it took.
///
/// ### Panics
/// Panics if the routine is still running after `limit` advances.
#[allow(dead_code)]
pub fn run_to_end<R>(routine: &mut R, step: f32, limit: usize) -> usize
where
    R: stride_routine::Routine + ?Sized,
{
    for ticks in 1..=limit {
        if routine.advance(step) {
            return ticks;
        }
    }
    panic!("routine still running after {limit} advances");
}
