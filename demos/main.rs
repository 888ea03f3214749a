//! Command-line driver over the seed scenarios in `radau5::test_models`,
//! for manual inspection of step counts and accuracy without writing a
//! throwaway test. Mirrors the teacher's pattern of a small `clap` binary
//! sitting alongside the library rather than a REPL or script runner.

use clap::{Parser, ValueEnum};
use radau5::test_models::{
    exponential_decay, jacobian_reuse_stiff, linear_oscillator, pendulum_dae, step_event, van_der_pol,
};
use radau5::{OdeEquations, OdeSolverProblem, Radau5, RadauOptions, StepResult};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Scenario {
    ExponentialDecay,
    VanDerPol,
    LinearOscillator,
    StepEvent,
    PendulumDae,
    JacobianReuseStiff,
}

#[derive(Parser, Debug)]
#[command(about = "Run one of the Radau5 seed scenarios and report its statistics")]
struct Cli {
    #[arg(value_enum)]
    scenario: Scenario,

    /// Relative tolerance.
    #[arg(long, default_value_t = 1.0e-6)]
    rtol: f64,

    /// Absolute tolerance.
    #[arg(long, default_value_t = 1.0e-6)]
    atol: f64,
}

fn run<Eqn: OdeEquations>(eqn: Eqn, t0: f64, y0: radau5::RVector, t_final: f64, rtol: f64, atol: f64) {
    let mut opts = RadauOptions::default();
    opts.rtol = rtol;
    opts.atol = atol;

    let problem = OdeSolverProblem::new(eqn, t0, y0);
    let mut solver = match Radau5::new(problem, opts) {
        Ok(solver) => solver,
        Err(err) => {
            eprintln!("failed to construct solver: {err}");
            std::process::exit(1);
        }
    };

    match solver.integrate(t_final) {
        Ok(StepResult::Complete { t, y }) => {
            println!("reached t = {t}");
            println!("y = {y:?}");
        }
        Ok(StepResult::Event { t, y, crossings }) => {
            println!("event located at t = {t}");
            println!("y = {y:?}");
            for crossing in crossings {
                println!("  root {} ({:?}) at t = {}", crossing.root_index, crossing.direction, crossing.t);
            }
        }
        Err(err) => {
            eprintln!("integration failed: {err}");
            std::process::exit(1);
        }
    }

    let stats = solver.statistics();
    println!("{stats:#?}");
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.scenario {
        Scenario::ExponentialDecay => {
            let (eqn, t0, y0) = exponential_decay::problem();
            run(eqn, t0, y0, 5.0, cli.rtol, cli.atol);
        }
        Scenario::VanDerPol => {
            let (eqn, t0, y0) = van_der_pol::problem();
            run(eqn, t0, y0, 3000.0, cli.rtol, cli.atol);
        }
        Scenario::LinearOscillator => {
            let (eqn, t0, y0) = linear_oscillator::problem();
            run(eqn, t0, y0, std::f64::consts::TAU, cli.rtol, cli.atol);
        }
        Scenario::StepEvent => {
            let (eqn, t0, y0) = step_event::problem();
            run(eqn, t0, y0, 1.0, cli.rtol, cli.atol);
        }
        Scenario::PendulumDae => {
            let (eqn, t0, y0) = pendulum_dae::problem();
            run(eqn, t0, y0, 10.0, cli.rtol, cli.atol);
        }
        Scenario::JacobianReuseStiff => {
            let (eqn, t0, y0) = jacobian_reuse_stiff::problem();
            run(eqn, t0, y0, 100.0, cli.rtol, cli.atol);
        }
    }
}
