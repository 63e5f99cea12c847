//! Breed statistics core
//!
//! Three layers, composed by the question handlers in `routes::questions`:
//! unit conversion (`units`), per-record derived metrics (`extract`), and
//! generic aggregation primitives (`aggregate`). Raw records flow one way
//! through them; nothing here holds state between requests.

pub mod aggregate;
pub mod extract;
pub mod units;

/// Round to 2 decimal places. Applied only at the response boundary;
/// internal computation keeps full precision.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
