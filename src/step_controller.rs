//! Gustafsson predictive step-size controller.
//!
//! Grounded on `adjust_stepsize()` in the original reference
//! (`radau5.py:792-824`): the `fac`/`quot` formula shared by both the
//! rejection path and the accept-and-predict path, the Gustafsson
//! `facgus` term blended in only when predicting past an *accepted* step,
//! and the `quot1`/`quot2` hysteresis band that keeps `h` unchanged for
//! small adjustments. Constants cross-checked against `russell_ode`'s
//! `OdeParams` (`Mmin`/`Mmax` ~ `fac1`/`fac2`, `C1h`/`C2h` ~ `quot1`/`quot2`).

use crate::errors::{RadauError, RadauResult};
use crate::options::RadauOptions;

pub struct StepControllerInput {
    pub h: f64,
    pub err: f64,
    pub newt_max: usize,
    pub newton_iterations_used: usize,
    pub is_first_step: bool,
    pub was_rejected: bool,
    /// Only used when predicting past an accepted step: the step size and
    /// error of the *previous* accepted step.
    pub h_accepted_prev: f64,
    pub err_prev: f64,
}

/// `adjust_stepsize(err)` — the plain rejection-path sizing (no Gustafsson
/// term, no hysteresis band collapse to `h` unchanged).
pub fn adjust_stepsize_on_rejection(input: &StepControllerInput, opts: &RadauOptions, t: f64) -> RadauResult<f64> {
    let h = plain_quotient_step(input, opts);
    clamp_and_validate(h, input.h, opts, t, false, input.err, input.is_first_step)
}

/// `adjust_stepsize(err, predict=True)` — the accept-path sizing including
/// the Gustafsson predictive term and the hysteresis band.
pub fn adjust_stepsize_on_accept(input: &StepControllerInput, opts: &RadauOptions, t: f64) -> RadauResult<f64> {
    let hnormal = plain_quotient_step(input, opts);

    let h = if input.is_first_step {
        hnormal
    } else {
        let fac = safety_factor(input, opts);
        let mut quot = (1.0 / opts.fac2).max((1.0 / opts.fac1).min((input.err.powf(0.25)) / fac));
        let facgus = ((input.h_accepted_prev / input.h)
            * (input.err.powi(2) / input.err_prev).powf(0.25)
            / opts.safe)
            .clamp(1.0 / opts.fac2, 1.0 / opts.fac1);
        quot = quot.max(facgus);
        input.h / quot
    };

    clamp_and_validate(h, input.h, opts, t, true, input.err, input.is_first_step)
}

fn safety_factor(input: &StepControllerInput, opts: &RadauOptions) -> f64 {
    let newt = input.newt_max as f64;
    let k = input.newton_iterations_used as f64;
    opts.safe.min(opts.safe * (2.0 * newt + 1.0) / (2.0 * newt + k))
}

fn plain_quotient_step(input: &StepControllerInput, opts: &RadauOptions) -> f64 {
    let fac = safety_factor(input, opts);
    let quot = (1.0 / opts.fac2).max((1.0 / opts.fac1).min(input.err.powf(0.25) / fac));
    input.h / quot
}

fn clamp_and_validate(
    mut h: f64,
    h_current: f64,
    opts: &RadauOptions,
    t: f64,
    apply_hysteresis: bool,
    err: f64,
    is_first_step: bool,
) -> RadauResult<f64> {
    if apply_hysteresis {
        let qt = h / h_current;
        if qt >= opts.quot1 && qt <= opts.quot2 {
            h = h_current;
        }
    }

    if is_first_step && err >= 1.0 {
        // First-step rejection with no history to extrapolate from: shrink
        // hard rather than trust the quotient formula.
        h = h_current / 10.0;
    }

    if h.abs() < f64::EPSILON * 100.0 {
        return Err(RadauError::StepSizeTooSmall { t, h });
    }
    if h > opts.max_h {
        h = opts.max_h;
    }
    Ok(h)
}
