//! Interpolators and color helpers backing the zoom animation and node fills.

use std::f64::consts::SQRT_2;

/// A camera view as `[center x, center y, visible width]`.
pub type View = [f64; 3];

/// Cubic ease-in-out, the default transition easing.
pub fn cubic_in_out(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// Smooth zoom-and-pan interpolation between two views, after van Wijk &
/// Nuij: the width term moves along a hyperbolic path so the perceived zoom
/// velocity stays constant while the center follows the induced track.
pub struct ZoomInterpolator {
	start: View,
	end: View,
	path: Path,
}

enum Path {
	/// Coincident centers: translate (degenerately) and scale exponentially.
	Scale { s: f64 },
	/// General case parameters.
	Arc { dx: f64, dy: f64, d1: f64, r0: f64, s: f64 },
}

impl ZoomInterpolator {
	/// Builds the interpolator from `start` toward `end`.
	pub fn new(start: View, end: View) -> Self {
		const EPSILON2: f64 = 1e-12;
		let rho2 = 2.0;
		let rho4 = 4.0;

		let [ux0, uy0, w0] = start;
		let [ux1, uy1, w1] = end;
		let dx = ux1 - ux0;
		let dy = uy1 - uy0;
		let d2 = dx * dx + dy * dy;

		let path = if d2 < EPSILON2 {
			Path::Scale { s: (w1 / w0).ln() / SQRT_2 }
		} else {
			let d1 = d2.sqrt();
			let b0 = (w1 * w1 - w0 * w0 + rho4 * d2) / (2.0 * w0 * rho2 * d1);
			let b1 = (w1 * w1 - w0 * w0 - rho4 * d2) / (2.0 * w1 * rho2 * d1);
			let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
			let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
			Path::Arc { dx, dy, d1, r0, s: (r1 - r0) / SQRT_2 }
		};

		Self { start, end, path }
	}

	/// The interpolated view at `t` in `[0, 1]`; the endpoints are exact.
	pub fn at(&self, t: f64) -> View {
		if t <= 0.0 {
			return self.start;
		}
		if t >= 1.0 {
			return self.end;
		}

		let [ux0, uy0, w0] = self.start;
		match self.path {
			Path::Scale { s } => {
				let [ux1, uy1, _] = self.end;
				[
					ux0 + t * (ux1 - ux0),
					uy0 + t * (uy1 - uy0),
					w0 * (SQRT_2 * t * s).exp(),
				]
			}
			Path::Arc { dx, dy, d1, r0, s } => {
				let rho2 = 2.0;
				let u = w0 / (rho2 * d1)
					* (r0.cosh() * (SQRT_2 * t * s + r0).tanh() - r0.sinh());
				[ux0 + u * dx, uy0 + u * dy, w0 * r0.cosh() / (SQRT_2 * t * s + r0).cosh()]
			}
		}
	}
}

/// An sRGB color with d3-style brightness adjustment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
	pub r: f64,
	pub g: f64,
	pub b: f64,
}

impl Rgb {
	pub const fn new(r: f64, g: f64, b: f64) -> Self {
		Self { r, g, b }
	}

	/// Brightens (`k > 0`) or darkens (`k < 0`) by multiplying every channel
	/// with `(1/0.7)^k`.
	pub fn brighter(self, k: f64) -> Self {
		let t = (1.0_f64 / 0.7).powf(k);
		Self { r: self.r * t, g: self.g * t, b: self.b * t }
	}

	/// CSS `rgb(...)` string; channels are clamped on output.
	pub fn to_css(self) -> String {
		let clamp = |v: f64| v.clamp(0.0, 255.0).round() as u8;
		format!("rgb({}, {}, {})", clamp(self.r), clamp(self.g), clamp(self.b))
	}
}
