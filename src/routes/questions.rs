//! The eight read-only "question" endpoints
//!
//! Each handler performs one bulk read of the record set, computes the
//! statistic in memory, and shapes the response payload. The answer
//! builders are pure functions over the fetched records so they can be
//! exercised without a running store. Numeric answers are rounded to 2
//! decimals here at the boundary; everything upstream keeps full
//! precision.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use bson::doc;

use crate::db::schemas::BreedDoc;
use crate::server::AppState;
use crate::stats::aggregate::{group_averages, max_with_ties, median, tied_leaders, GroupAverage};
use crate::stats::extract::{
    average_lifespan_years, average_weight_kg, average_weight_lb, first_non_empty, max_height_cm,
    temperament_tokens, weight_range_kg,
};
use crate::stats::round2;
use crate::stats::units::kg_to_lb;

use super::{db_error_response, json_response};

/// Pounds for a kilogram value already known to be usable
fn lb_from_kg(kg: f64) -> f64 {
    kg_to_lb(kg).unwrap_or(f64::NAN)
}

/// Fetch the full record set and shape an answer from it
async fn with_dogs<F, R>(state: Arc<AppState>, build: F) -> Response<Full<Bytes>>
where
    F: FnOnce(&[BreedDoc]) -> R,
    R: Serialize,
{
    match state.dogs.find_many(doc! {}).await {
        Ok(dogs) => json_response(StatusCode::OK, build(&dogs)),
        Err(e) => db_error_response(e),
    }
}

// ---------------------------------------------------------------------------
// 1) Average weight across all breeds

#[derive(Debug, Serialize)]
pub struct AverageWeightAnswer {
    pub kilograms: f64,
    pub pounds: f64,
}

#[derive(Debug, Serialize)]
pub struct AverageWeightResponse {
    pub question: &'static str,
    pub answer: Option<AverageWeightAnswer>,
    #[serde(rename = "countBreedsUsed")]
    pub count_breeds_used: usize,
}

pub fn average_weight(dogs: &[BreedDoc]) -> AverageWeightResponse {
    let per_breed: Vec<f64> = dogs.iter().filter_map(average_weight_kg).collect();

    let answer = (!per_breed.is_empty()).then(|| {
        let avg_kg = per_breed.iter().sum::<f64>() / per_breed.len() as f64;
        AverageWeightAnswer {
            kilograms: round2(avg_kg),
            pounds: round2(lb_from_kg(avg_kg)),
        }
    });

    AverageWeightResponse {
        question: "What is the average weight across all dog breeds?",
        answer,
        count_breeds_used: per_breed.len(),
    }
}

pub async fn handle_average_weight(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, average_weight).await
}

// ---------------------------------------------------------------------------
// 2) Longest average lifespan

#[derive(Debug, Serialize)]
pub struct LifespanWinner {
    pub name: String,
    #[serde(rename = "avgYears")]
    pub avg_years: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LongestLifespanResponse {
    pub question: &'static str,
    pub answer: Vec<LifespanWinner>,
    /// Raw maximum; serializes as null when no record was usable
    pub best: f64,
}

pub fn longest_average_lifespan(dogs: &[BreedDoc]) -> LongestLifespanResponse {
    let top = max_with_ties(dogs, average_lifespan_years);

    LongestLifespanResponse {
        question: "Which breed has the longest average lifespan?",
        answer: top
            .winners
            .iter()
            .map(|d| LifespanWinner {
                name: d.name.clone(),
                avg_years: average_lifespan_years(d).map(round2),
            })
            .collect(),
        best: top.best,
    }
}

pub async fn handle_longest_average_lifespan(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, longest_average_lifespan).await
}

// ---------------------------------------------------------------------------
// 3) Tallest breed

#[derive(Debug, Serialize)]
pub struct TallestWinner {
    pub name: String,
    #[serde(rename = "maxHeightCm")]
    pub max_height_cm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TallestBreedResponse {
    pub question: &'static str,
    pub answer: Vec<TallestWinner>,
    pub best: f64,
}

pub fn tallest_breed(dogs: &[BreedDoc]) -> TallestBreedResponse {
    let top = max_with_ties(dogs, max_height_cm);

    TallestBreedResponse {
        question: "Which breed is the tallest?",
        answer: top
            .winners
            .iter()
            .map(|d| TallestWinner {
                name: d.name.clone(),
                max_height_cm: max_height_cm(d).map(round2),
            })
            .collect(),
        best: top.best,
    }
}

pub async fn handle_tallest_breed(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, tallest_breed).await
}

// ---------------------------------------------------------------------------
// 4) Heaviest breed group by average weight

#[derive(Debug, Serialize)]
pub struct GroupWeightStats {
    pub group: String,
    #[serde(rename = "averageKg")]
    pub average_kg: f64,
    #[serde(rename = "averageLb")]
    pub average_lb: f64,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HeaviestGroupResponse {
    pub question: &'static str,
    pub answer: Vec<GroupWeightStats>,
    #[serde(rename = "allGroups")]
    pub all_groups: Vec<GroupWeightStats>,
}

fn group_stats(group: &GroupAverage) -> GroupWeightStats {
    GroupWeightStats {
        group: group.key.clone(),
        average_kg: round2(group.average),
        average_lb: round2(lb_from_kg(group.average)),
        count: group.count,
    }
}

pub fn heaviest_group_by_average(dogs: &[BreedDoc]) -> HeaviestGroupResponse {
    let groups = group_averages(
        dogs,
        |d| {
            d.breed_group
                .clone()
                .unwrap_or_else(|| "Unknown".to_string())
        },
        average_weight_kg,
    );

    HeaviestGroupResponse {
        question: "Which breed group has the heaviest average weight?",
        answer: tied_leaders(&groups).into_iter().map(group_stats).collect(),
        all_groups: groups.iter().map(group_stats).collect(),
    }
}

pub async fn handle_heaviest_group(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, heaviest_group_by_average).await
}

// ---------------------------------------------------------------------------
// 5) Median weight of small breeds (< 20 lbs)

#[derive(Debug, Serialize)]
pub struct MedianSmallBreedsResponse {
    pub question: &'static str,
    pub answer: Option<f64>,
    #[serde(rename = "countBreedsUsed")]
    pub count_breeds_used: usize,
    pub unit: &'static str,
    pub note: &'static str,
}

pub fn median_weight_small_breeds(dogs: &[BreedDoc]) -> MedianSmallBreedsResponse {
    let small: Vec<f64> = dogs
        .iter()
        .filter_map(average_weight_lb)
        .filter(|lb| *lb < 20.0)
        .collect();

    MedianSmallBreedsResponse {
        question: "What is the median weight of small breeds (under 20 lbs)?",
        answer: median(&small).map(round2),
        count_breeds_used: small.len(),
        unit: "lbs",
        note: "Per-breed average lbs used to determine small-breed set and median.",
    }
}

pub async fn handle_median_weight_small_breeds(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, median_weight_small_breeds).await
}

// ---------------------------------------------------------------------------
// 6) Widest weight range

#[derive(Debug, Serialize)]
pub struct RangeWinner {
    pub name: String,
    #[serde(rename = "rangeKg")]
    pub range_kg: Option<f64>,
    #[serde(rename = "rangeLb")]
    pub range_lb: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WidestRangeResponse {
    pub question: &'static str,
    pub answer: Vec<RangeWinner>,
    #[serde(rename = "bestKg")]
    pub best_kg: Option<f64>,
}

pub fn widest_weight_range(dogs: &[BreedDoc]) -> WidestRangeResponse {
    let top = max_with_ties(dogs, weight_range_kg);

    WidestRangeResponse {
        question: "Which breed has the widest weight range between min and max?",
        answer: top
            .winners
            .iter()
            .map(|d| {
                let range_kg = weight_range_kg(d);
                RangeWinner {
                    name: d.name.clone(),
                    range_kg: range_kg.map(round2),
                    range_lb: range_kg.and_then(kg_to_lb).map(round2),
                }
            })
            .collect(),
        best_kg: top.best.is_finite().then(|| round2(top.best)),
    }
}

pub async fn handle_widest_weight_range(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, widest_weight_range).await
}

// ---------------------------------------------------------------------------
// 7) Breeds with "intelligent" in their temperament

#[derive(Debug, Serialize)]
pub struct IntelligentTemperamentResponse {
    pub question: &'static str,
    pub answer: usize,
    pub breeds: Vec<String>,
}

pub fn count_intelligent_temperament(dogs: &[BreedDoc]) -> IntelligentTemperamentResponse {
    let breeds: Vec<String> = dogs
        .iter()
        .filter(|d| {
            temperament_tokens(d)
                .iter()
                .any(|t| t.contains("intelligent"))
        })
        .map(|d| d.name.clone())
        .collect();

    IntelligentTemperamentResponse {
        question: "How many breeds list \"intelligent\" in their temperament?",
        answer: breeds.len(),
        breeds,
    }
}

pub async fn handle_count_intelligent_temperament(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, count_intelligent_temperament).await
}

// ---------------------------------------------------------------------------
// 8) Breeds bred for lapdog purposes

#[derive(Debug, Serialize)]
pub struct LapdogEntry {
    pub name: String,
    /// Original casing, as stored
    pub bred_for: String,
}

#[derive(Debug, Serialize)]
pub struct LapdogBreedsResponse {
    pub question: &'static str,
    pub answer: Vec<LapdogEntry>,
}

pub fn lapdog_breeds(dogs: &[BreedDoc]) -> LapdogBreedsResponse {
    let mut answer = Vec::new();

    for dog in dogs {
        let Some(bred_for) = first_non_empty(&[dog.bred_for.as_deref()]) else {
            continue;
        };
        let lowered = bred_for.to_lowercase();
        if lowered.contains("lap") || lowered.contains("companion") {
            answer.push(LapdogEntry {
                name: dog.name.clone(),
                bred_for: bred_for.to_string(),
            });
        }
    }

    LapdogBreedsResponse {
        question: "Which breeds were bred for lapdog purposes?",
        answer,
    }
}

pub async fn handle_lapdog_breeds(state: Arc<AppState>) -> Response<Full<Bytes>> {
    with_dogs(state, lapdog_breeds).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Range, Temperament, UnitRange};

    fn metric_range(min: f64, max: f64) -> Option<UnitRange> {
        Some(UnitRange {
            imperial: None,
            metric: Some(Range {
                min: Some(min),
                max: Some(max),
            }),
        })
    }

    fn seed() -> Vec<BreedDoc> {
        vec![
            BreedDoc {
                id: Some(1),
                name: "Test Tall".to_string(),
                breed_group: Some("Working".to_string()),
                life_span: Some(Range {
                    min: Some(10.0),
                    max: Some(12.0),
                }),
                weight: metric_range(30.0, 40.0),
                height: metric_range(60.0, 85.0),
                temperament: Temperament::List(vec![
                    "Loyal".to_string(),
                    "Strong".to_string(),
                    "Intelligent".to_string(),
                ]),
                bred_for: Some("Guarding, Companionship".to_string()),
                origin: vec!["USA".to_string()],
                ..BreedDoc::default()
            },
            BreedDoc {
                id: Some(2),
                name: "Test Heavy".to_string(),
                breed_group: Some("Herding".to_string()),
                life_span: Some(Range {
                    min: Some(12.0),
                    max: Some(14.0),
                }),
                weight: metric_range(50.0, 90.0),
                height: metric_range(55.0, 60.0),
                temperament: Temperament::List(vec![
                    "Friendly".to_string(),
                    "Confident".to_string(),
                    "Brave".to_string(),
                    "Calm".to_string(),
                ]),
                bred_for: Some("Work".to_string()),
                origin: vec!["Germany".to_string(), "France".to_string()],
                ..BreedDoc::default()
            },
            BreedDoc {
                id: Some(3),
                name: "Test LongLife".to_string(),
                breed_group: Some("Toy".to_string()),
                life_span: Some(Range {
                    min: Some(15.0),
                    max: Some(20.0),
                }),
                weight: metric_range(3.0, 6.0),
                height: metric_range(20.0, 28.0),
                temperament: Temperament::List(vec!["Playful".to_string()]),
                bred_for: Some("Lapdog, Companion".to_string()),
                origin: vec![],
                ..BreedDoc::default()
            },
        ]
    }

    #[test]
    fn average_weight_over_seed_records() {
        // Per-breed averages: 35, 70, 4.5 -> mean 36.5 kg
        let resp = average_weight(&seed());
        let answer = resp.answer.expect("usable weights");
        assert_eq!(answer.kilograms, 36.5);
        assert!((answer.pounds - 80.47).abs() < 0.01);
        assert_eq!(resp.count_breeds_used, 3);
    }

    #[test]
    fn longest_lifespan_finds_the_long_life_breed() {
        let resp = longest_average_lifespan(&seed());
        let names: Vec<&str> = resp.answer.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Test LongLife"]);
        assert_eq!(resp.answer[0].avg_years, Some(17.5));
        assert_eq!(resp.best, 17.5);
    }

    #[test]
    fn tallest_breed_uses_metric_height() {
        let resp = tallest_breed(&seed());
        assert_eq!(resp.answer.len(), 1);
        assert_eq!(resp.answer[0].name, "Test Tall");
        assert_eq!(resp.answer[0].max_height_cm, Some(85.0));
    }

    #[test]
    fn heaviest_group_ranks_groups_by_average() {
        let resp = heaviest_group_by_average(&seed());
        assert_eq!(resp.answer.len(), 1);
        assert_eq!(resp.answer[0].group, "Herding");
        assert_eq!(resp.answer[0].average_kg, 70.0);
        assert_eq!(resp.answer[0].count, 1);

        let order: Vec<&str> = resp.all_groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(order, vec!["Herding", "Working", "Toy"]);
    }

    #[test]
    fn missing_breed_group_falls_into_unknown() {
        let mut dogs = seed();
        dogs.push(BreedDoc {
            name: "No Group".to_string(),
            weight: metric_range(100.0, 120.0),
            ..BreedDoc::default()
        });

        let resp = heaviest_group_by_average(&dogs);
        assert_eq!(resp.answer[0].group, "Unknown");
        assert_eq!(resp.answer[0].average_kg, 110.0);
    }

    #[test]
    fn median_small_breeds_counts_only_under_20_lb() {
        // Only Test LongLife (4.5 kg, about 9.92 lb) is under 20 lb
        let resp = median_weight_small_breeds(&seed());
        assert_eq!(resp.count_breeds_used, 1);
        let median = resp.answer.expect("one small breed");
        assert!((median - 9.92).abs() < 0.01);
        assert_eq!(resp.unit, "lbs");
    }

    #[test]
    fn widest_range_winner_is_the_heavy_breed() {
        let resp = widest_weight_range(&seed());
        assert_eq!(resp.answer.len(), 1);
        assert_eq!(resp.answer[0].name, "Test Heavy");
        assert_eq!(resp.answer[0].range_kg, Some(40.0));
        assert_eq!(resp.best_kg, Some(40.0));
    }

    #[test]
    fn intelligent_count_accepts_both_temperament_shapes() {
        let mut dogs = seed();
        dogs.push(BreedDoc {
            name: "Comma String".to_string(),
            temperament: Temperament::Text("Loyal, Intelligent".to_string()),
            ..BreedDoc::default()
        });

        let resp = count_intelligent_temperament(&dogs);
        assert_eq!(resp.answer, 2);
        assert_eq!(resp.breeds, vec!["Test Tall", "Comma String"]);
    }

    #[test]
    fn lapdog_breeds_match_lap_or_companion() {
        let resp = lapdog_breeds(&seed());
        let names: Vec<&str> = resp.answer.iter().map(|e| e.name.as_str()).collect();
        // "Companionship" contains "companion"; "Lapdog, Companion" matches both
        assert_eq!(names, vec!["Test Tall", "Test LongLife"]);
        assert_eq!(resp.answer[1].bred_for, "Lapdog, Companion");
    }

    #[test]
    fn empty_record_set_yields_null_answers() {
        let resp = average_weight(&[]);
        assert!(resp.answer.is_none());
        assert_eq!(resp.count_breeds_used, 0);

        let resp = longest_average_lifespan(&[]);
        assert!(resp.answer.is_empty());
        // Non-finite best serializes as JSON null
        assert_eq!(
            serde_json::to_value(resp.best).unwrap(),
            serde_json::Value::Null
        );

        let resp = widest_weight_range(&[]);
        assert_eq!(resp.best_kg, None);

        assert!(median_weight_small_breeds(&[]).answer.is_none());
        assert!(heaviest_group_by_average(&[]).all_groups.is_empty());
    }
}
