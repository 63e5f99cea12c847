//! Per-record derived metrics
//!
//! Each function takes one breed record and returns a nullable scalar (or
//! token list), treating missing or partial data as absent rather than
//! failing. An incomplete `{min, max}` pair is unusable for that unit
//! system; the other system is used as a fallback. Bounds are never mixed
//! across unit systems.

use crate::db::schemas::{BreedDoc, Range, Temperament, UnitRange};
use crate::stats::units::{cm_from_inches, kg_to_lb, lb_to_kg};

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Average of both bounds; `None` unless both are finite
fn range_avg(range: Option<&Range>) -> Option<f64> {
    let r = range?;
    match (finite(r.min), finite(r.max)) {
        (Some(min), Some(max)) => Some((min + max) / 2.0),
        _ => None,
    }
}

/// Spread between the bounds; `None` unless both are finite
fn range_span(range: Option<&Range>) -> Option<f64> {
    let r = range?;
    match (finite(r.min), finite(r.max)) {
        (Some(min), Some(max)) => Some(max - min),
        _ => None,
    }
}

fn metric(unit_range: Option<&UnitRange>) -> Option<&Range> {
    unit_range.and_then(|u| u.metric.as_ref())
}

fn imperial(unit_range: Option<&UnitRange>) -> Option<&Range> {
    unit_range.and_then(|u| u.imperial.as_ref())
}

/// Average weight in kg: metric bounds if both present, else imperial
/// bounds converted, else `None`
pub fn average_weight_kg(dog: &BreedDoc) -> Option<f64> {
    let weight = dog.weight.as_ref();
    range_avg(metric(weight)).or_else(|| range_avg(imperial(weight)).and_then(lb_to_kg))
}

/// Average weight in lbs
pub fn average_weight_lb(dog: &BreedDoc) -> Option<f64> {
    average_weight_kg(dog).and_then(kg_to_lb)
}

/// Weight spread (max − min) in kg, from whichever unit system has both
/// bounds
pub fn weight_range_kg(dog: &BreedDoc) -> Option<f64> {
    let weight = dog.weight.as_ref();
    range_span(metric(weight)).or_else(|| range_span(imperial(weight)).and_then(lb_to_kg))
}

/// Maximum height in cm: metric max if present, else imperial max
/// converted from inches
pub fn max_height_cm(dog: &BreedDoc) -> Option<f64> {
    let height = dog.height.as_ref();
    finite(metric(height).and_then(|r| r.max))
        .or_else(|| imperial(height).and_then(|r| r.max).and_then(cm_from_inches))
}

/// Average lifespan in years; requires both bounds
pub fn average_lifespan_years(dog: &BreedDoc) -> Option<f64> {
    range_avg(dog.life_span.as_ref())
}

/// Normalized temperament tokens, lowercased and trimmed
///
/// Accepts both the list shape and the historical comma-separated string.
pub fn temperament_tokens(dog: &BreedDoc) -> Vec<String> {
    match &dog.temperament {
        Temperament::List(items) => items.iter().map(|t| t.trim().to_lowercase()).collect(),
        Temperament::Text(text) => text.split(',').map(|t| t.trim().to_lowercase()).collect(),
    }
}

/// First candidate that is a non-empty string after trimming
pub fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| *c)
        .find(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::units::KG_PER_LB;

    fn range(min: f64, max: f64) -> Range {
        Range {
            min: Some(min),
            max: Some(max),
        }
    }

    fn with_weight(metric: Option<Range>, imperial: Option<Range>) -> BreedDoc {
        BreedDoc {
            name: "Test".to_string(),
            weight: Some(UnitRange { imperial, metric }),
            ..BreedDoc::default()
        }
    }

    #[test]
    fn weight_prefers_complete_metric_range() {
        let dog = with_weight(Some(range(30.0, 40.0)), Some(range(900.0, 1000.0)));
        assert_eq!(average_weight_kg(&dog), Some(35.0));
    }

    #[test]
    fn weight_falls_back_to_converted_imperial() {
        let dog = with_weight(None, Some(range(10.0, 30.0)));
        let kg = average_weight_kg(&dog).unwrap();
        assert!((kg - 20.0 * KG_PER_LB).abs() < 1e-9);
    }

    #[test]
    fn incomplete_metric_range_is_unusable() {
        let half_metric = Range {
            min: Some(30.0),
            max: None,
        };
        let dog = with_weight(Some(half_metric), Some(range(10.0, 30.0)));
        let kg = average_weight_kg(&dog).unwrap();
        assert!((kg - 20.0 * KG_PER_LB).abs() < 1e-9);
    }

    #[test]
    fn weight_absent_everywhere_is_none() {
        assert_eq!(average_weight_kg(&BreedDoc::default()), None);
        assert_eq!(average_weight_kg(&with_weight(None, None)), None);
        assert_eq!(average_weight_lb(&BreedDoc::default()), None);
    }

    #[test]
    fn range_never_mixes_unit_systems() {
        // Metric has only a max, imperial only a min: neither pair is
        // complete, so no range can be computed.
        let dog = with_weight(
            Some(Range {
                min: None,
                max: Some(40.0),
            }),
            Some(Range {
                min: Some(10.0),
                max: None,
            }),
        );
        assert_eq!(weight_range_kg(&dog), None);
    }

    #[test]
    fn range_comes_from_a_single_unit_system() {
        let metric_only = with_weight(Some(range(50.0, 90.0)), None);
        assert_eq!(weight_range_kg(&metric_only), Some(40.0));

        let imperial_only = with_weight(None, Some(range(10.0, 30.0)));
        let kg = weight_range_kg(&imperial_only).unwrap();
        assert!((kg - 20.0 * KG_PER_LB).abs() < 1e-9);
    }

    #[test]
    fn height_prefers_metric_max() {
        let dog = BreedDoc {
            height: Some(UnitRange {
                imperial: Some(range(20.0, 30.0)),
                metric: Some(range(60.0, 85.0)),
            }),
            ..BreedDoc::default()
        };
        assert_eq!(max_height_cm(&dog), Some(85.0));
    }

    #[test]
    fn height_falls_back_to_converted_inches() {
        let dog = BreedDoc {
            height: Some(UnitRange {
                imperial: Some(range(20.0, 30.0)),
                metric: None,
            }),
            ..BreedDoc::default()
        };
        let cm = max_height_cm(&dog).unwrap();
        assert!((cm - 76.2).abs() < 1e-9);
    }

    #[test]
    fn lifespan_requires_both_bounds() {
        let dog = BreedDoc {
            life_span: Some(range(15.0, 20.0)),
            ..BreedDoc::default()
        };
        assert_eq!(average_lifespan_years(&dog), Some(17.5));

        let partial = BreedDoc {
            life_span: Some(Range {
                min: Some(10.0),
                max: None,
            }),
            ..BreedDoc::default()
        };
        assert_eq!(average_lifespan_years(&partial), None);
        assert_eq!(average_lifespan_years(&BreedDoc::default()), None);
    }

    #[test]
    fn temperament_accepts_list_and_string() {
        let list = BreedDoc {
            temperament: Temperament::List(vec!["  Loyal ".to_string(), "Intelligent".to_string()]),
            ..BreedDoc::default()
        };
        assert_eq!(temperament_tokens(&list), vec!["loyal", "intelligent"]);

        let text = BreedDoc {
            temperament: Temperament::Text("Loyal, Intelligent".to_string()),
            ..BreedDoc::default()
        };
        assert_eq!(temperament_tokens(&text), vec!["loyal", "intelligent"]);

        assert!(temperament_tokens(&BreedDoc::default()).is_empty());
    }

    #[test]
    fn first_non_empty_skips_blank_strings() {
        assert_eq!(
            first_non_empty(&[None, Some("  "), Some("Lapdog")]),
            Some("Lapdog")
        );
        assert_eq!(first_non_empty(&[None, Some("")]), None);
        assert_eq!(first_non_empty(&[]), None);
    }
}
