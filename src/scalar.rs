//! The floating-point type the integrator works with.
//!
//! The teacher threads a generic `T: Scalar` through every layer; we keep
//! the trait seam (so the linear-algebra and complex-arithmetic bounds stay
//! named and documented) but concretely only ever instantiate it with `f64`.

use nalgebra::RealField;
use num_traits::{Float, FromPrimitive};

/// Bound satisfied by `f64`; kept as a trait (rather than hard-coding `f64`
/// everywhere) so a `f32` instantiation only requires satisfying this bound.
pub trait Scalar: RealField + Float + FromPrimitive + Copy + 'static {}

impl Scalar for f64 {}
