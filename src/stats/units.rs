//! Unit conversion
//!
//! Pure, total functions over floating-point input. Non-finite input
//! yields `None`; no rounding happens here.

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.45359237;

/// Convert kilograms to pounds
pub fn kg_to_lb(kg: f64) -> Option<f64> {
    kg.is_finite().then(|| kg / KG_PER_LB)
}

/// Convert pounds to kilograms
pub fn lb_to_kg(lb: f64) -> Option<f64> {
    lb.is_finite().then(|| lb * KG_PER_LB)
}

/// Convert inches to centimeters
pub fn cm_from_inches(inches: f64) -> Option<f64> {
    inches.is_finite().then(|| inches * 2.54)
}
