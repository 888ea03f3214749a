//! Jacobian/LU reuse decision.
//!
//! Grounded on the `_needjac`/`_needLU` bookkeeping inside `_step()`
//! (`radau5.py:588-635`): after a rejected step, reuse the Jacobian only if
//! it was already fresh this attempt or the failure happened on the very
//! first Newton iteration; after an accepted step, reuse both Jacobian and
//! LU only if the step size repeated exactly *and* the observed contraction
//! factor stayed under `thet`. A negative `thet` forces a refresh every
//! step (used by tests that want to disable reuse entirely).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReuseDecision {
    pub need_jacobian: bool,
    pub need_lu: bool,
}

/// Decision after a rejected step.
pub fn on_rejection(jacobian_is_current: bool, first_newton_iteration: bool) -> ReuseDecision {
    if jacobian_is_current || first_newton_iteration {
        ReuseDecision {
            need_jacobian: false,
            need_lu: true,
        }
    } else {
        ReuseDecision {
            need_jacobian: true,
            need_lu: true,
        }
    }
}

/// Decision after an accepted step. `h_prev` is the step size used one
/// step back, compared against the newly predicted `h_new` to see whether
/// the controller is repeating itself.
pub fn on_acceptance(h_prev: f64, h_new: f64, theta: f64, thet: f64) -> ReuseDecision {
    if thet < 0.0 {
        return ReuseDecision {
            need_jacobian: true,
            need_lu: true,
        };
    }

    if h_prev == h_new && theta <= thet {
        ReuseDecision {
            need_jacobian: false,
            need_lu: false,
        }
    } else if theta <= thet {
        ReuseDecision {
            need_jacobian: false,
            need_lu: true,
        }
    } else {
        ReuseDecision {
            need_jacobian: true,
            need_lu: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_step_with_small_theta_reuses_everything() {
        let d = on_acceptance(0.1, 0.1, 1e-5, 1e-3);
        assert!(!d.need_jacobian && !d.need_lu);
    }

    #[test]
    fn changed_step_with_small_theta_refreshes_lu_only() {
        let d = on_acceptance(0.1, 0.2, 1e-5, 1e-3);
        assert!(!d.need_jacobian && d.need_lu);
    }

    #[test]
    fn large_theta_forces_full_refresh() {
        let d = on_acceptance(0.1, 0.1, 0.5, 1e-3);
        assert!(d.need_jacobian && d.need_lu);
    }

    #[test]
    fn negative_thet_always_forces_refresh() {
        let d = on_acceptance(0.1, 0.1, 1e-8, -1.0);
        assert!(d.need_jacobian && d.need_lu);
    }
}
