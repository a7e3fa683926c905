//! Assemble the final analysis result

use crate::config::CategoryWeights;
use crate::error::{Result, ResumeScorerError};
use crate::processing::rewriter::BulletRewrite;
use crate::processing::scoring::{CategoryId, CategoryResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: u32,
    pub category_scores: BTreeMap<CategoryId, u8>,
    pub feedback: BTreeMap<CategoryId, String>,
    #[serde(default)]
    pub recommended_keywords: Vec<String>,
    #[serde(default, rename = "bullet_point_rewrites")]
    pub bullet_rewrites: Vec<BulletRewrite>,
    #[serde(default)]
    pub summary: String,
}

/// round(10 * sum(weight * score)), clamped to 0..=100.
pub fn overall_score_from(scores: &BTreeMap<CategoryId, u8>, weights: &CategoryWeights) -> u32 {
    let weighted: f64 = scores
        .iter()
        .map(|(category, score)| weights.get(*category) * f64::from(*score))
        .sum();
    (weighted * 10.0).round().clamp(0.0, 100.0) as u32
}

pub struct ResultComposer {
    weights: CategoryWeights,
}

impl ResultComposer {
    pub fn new(weights: CategoryWeights) -> Self {
        Self { weights }
    }

    /// Fails unless there is exactly one result per category.
    pub fn compose(
        &self,
        results: Vec<CategoryResult>,
        recommended_keywords: Vec<String>,
        bullet_rewrites: Vec<BulletRewrite>,
    ) -> Result<AnalysisResult> {
        let mut category_scores = BTreeMap::new();
        let mut feedback = BTreeMap::new();

        for result in results {
            if category_scores.insert(result.category_id, result.score.min(10)).is_some() {
                return Err(ResumeScorerError::Processing(format!(
                    "Category {} was scored twice",
                    result.category_id
                )));
            }
            feedback.insert(result.category_id, result.feedback);
        }

        if let Some(missing) = CategoryId::ALL.iter().find(|c| !category_scores.contains_key(c)) {
            return Err(ResumeScorerError::Processing(format!(
                "Category {} was not scored",
                missing
            )));
        }

        let overall_score = overall_score_from(&category_scores, &self.weights);
        let summary = summarize(&category_scores, &recommended_keywords);

        Ok(AnalysisResult {
            overall_score,
            category_scores,
            feedback,
            recommended_keywords,
            bullet_rewrites,
            summary,
        })
    }
}

/// One sentence for the strongest category, one for the weakest, one for the
/// top missing keyword.
fn summarize(scores: &BTreeMap<CategoryId, u8>, recommended: &[String]) -> String {
    let mut sentences = Vec::new();

    // First category wins ties in both directions.
    let strongest = scores.iter().fold(None, |best: Option<(&CategoryId, &u8)>, entry| match best {
        Some(b) if b.1 >= entry.1 => Some(b),
        _ => Some(entry),
    });
    let weakest = scores.iter().fold(None, |worst: Option<(&CategoryId, &u8)>, entry| match worst {
        Some(w) if w.1 <= entry.1 => Some(w),
        _ => Some(entry),
    });

    match (strongest, weakest) {
        (Some((best, best_score)), Some((worst, worst_score))) if best_score != worst_score => {
            sentences.push(format!(
                "Strongest area is {} ({}/10).",
                best.label().to_lowercase(),
                best_score
            ));
            sentences.push(format!(
                "Weakest area is {} ({}/10), so focus there next.",
                worst.label().to_lowercase(),
                worst_score
            ));
        }
        (Some((_, score)), _) => {
            sentences.push(format!("All categories scored evenly at {}/10.", score));
        }
        _ => {}
    }

    if let Some(keyword) = recommended.first() {
        sentences.push(format!("Adding \"{}\" would improve keyword coverage for this role.", keyword));
    }

    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(scores: [u8; 6]) -> Vec<CategoryResult> {
        CategoryId::ALL
            .iter()
            .zip(scores)
            .map(|(category, score)| CategoryResult {
                category_id: *category,
                score,
                feedback: format!("feedback for {}", category),
            })
            .collect()
    }

    #[test]
    fn test_overall_score_is_weighted() {
        let composer = ResultComposer::new(CategoryWeights::default());
        let all_ten = composer.compose(results([10; 6]), Vec::new(), Vec::new()).unwrap();
        assert_eq!(all_ten.overall_score, 100);

        let all_zero = composer.compose(results([0; 6]), Vec::new(), Vec::new()).unwrap();
        assert_eq!(all_zero.overall_score, 0);

        // 0.30*4 + 0.20*2 + 0.10*10 + 0.15*6 + 0.10*10 + 0.15*6 = 5.4
        let mixed = composer.compose(results([4, 2, 10, 6, 10, 6]), Vec::new(), Vec::new()).unwrap();
        assert_eq!(mixed.overall_score, 54);
    }

    #[test]
    fn test_overall_score_is_monotonic() {
        let weights = CategoryWeights::default();
        let base: BTreeMap<CategoryId, u8> = CategoryId::ALL.iter().map(|c| (*c, 5)).collect();
        let base_score = overall_score_from(&base, &weights);

        for category in CategoryId::ALL {
            let mut raised = base.clone();
            raised.insert(category, 6);
            assert!(overall_score_from(&raised, &weights) >= base_score);
        }
    }

    #[test]
    fn test_missing_category_is_an_error() {
        let composer = ResultComposer::new(CategoryWeights::default());
        let mut partial = results([5; 6]);
        partial.pop();
        assert!(matches!(
            composer.compose(partial, Vec::new(), Vec::new()),
            Err(ResumeScorerError::Processing(_))
        ));

        let mut duplicated = results([5; 6]);
        duplicated.push(duplicated[0].clone());
        assert!(composer.compose(duplicated, Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_summary_names_extremes_and_top_keyword() {
        let composer = ResultComposer::new(CategoryWeights::default());
        let result = composer
            .compose(
                results([2, 9, 7, 7, 7, 7]),
                vec!["api".to_string(), "docker".to_string()],
                Vec::new(),
            )
            .unwrap();

        assert_eq!(
            result.summary,
            "Strongest area is quantified impact (9/10). \
             Weakest area is keyword match (2/10), so focus there next. \
             Adding \"api\" would improve keyword coverage for this role."
        );
    }

    #[test]
    fn test_summary_for_even_scores() {
        let composer = ResultComposer::new(CategoryWeights::default());
        let result = composer.compose(results([7; 6]), Vec::new(), Vec::new()).unwrap();
        assert!(result.summary.contains("evenly at 7/10"));
    }

    #[test]
    fn test_json_field_names() {
        let composer = ResultComposer::new(CategoryWeights::default());
        let result = composer
            .compose(
                results([5; 6]),
                vec!["sql".to_string()],
                vec![BulletRewrite {
                    original: "Worked on reports".to_string(),
                    suggested: "Developed reports".to_string(),
                }],
            )
            .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["overall_score"].is_u64());
        assert_eq!(json["category_scores"]["keyword_match"], 5);
        assert_eq!(json["category_scores"].as_object().unwrap().len(), 6);
        assert!(json["feedback"]["seniority_alignment"].is_string());
        assert_eq!(json["recommended_keywords"][0], "sql");
        assert_eq!(json["bullet_point_rewrites"][0]["suggested"], "Developed reports");
        assert!(json["summary"].is_string());

        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
