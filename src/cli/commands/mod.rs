//! CLI command implementations

pub mod gridworld;
pub mod racetrack;
pub mod rasterize;
pub mod track;
pub mod windy;

use anyhow::Result;
use rand::{SeedableRng, rngs::StdRng};

use super::{
    config::DemoArgs,
    output::{format_number, print_kv, print_subsection},
};
use crate::pipeline::{Environment, Learner, rollout};

/// Print a greedy run of `learner`, one frame per visited state.
pub(crate) fn play_demo<E: Environment>(
    env: &E,
    learner: &dyn Learner<E>,
    demo: &DemoArgs,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let run = rollout(env, learner, demo.max_steps, &mut rng)?;

    print_subsection("Greedy run");
    for (step, state) in run.states.iter().enumerate() {
        match env.render(state) {
            Some(frame) => println!("step {step}\n{frame}"),
            None => println!("step {step}: {state:?}"),
        }
        demo.pause();
    }

    print_kv("Steps", &format_number(run.steps()));
    print_kv("Return", &format!("{:.1}", run.total_return));
    print_kv("Reached goal", if run.terminated { "yes" } else { "no" });
    Ok(())
}
