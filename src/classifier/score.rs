//! Keyword statistics and the keyword-based prediction (§4.3 steps 2, 4).

use super::keywords::Category;

/// Per-category keyword statistics computed over a document's text.
#[derive(Debug, Clone)]
pub struct CategoryStats {
    pub category: String,
    pub count: u32,
    pub unique: u32,
    pub density: f64,
}

/// Count case-insensitive, non-overlapping occurrences of `needle` in
/// `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0u32;
    let mut start = 0usize;
    while let Some(pos) = haystack[start..].find(needle) {
        count += 1;
        start += pos + needle.len();
    }
    count
}

pub fn category_stats(text: &str, categories: &[Category]) -> Vec<CategoryStats> {
    let lower = text.to_lowercase();
    let word_count = lower.split_whitespace().count().max(1) as f64;

    categories
        .iter()
        .map(|category| {
            let mut count = 0u32;
            let mut unique = 0u32;
            for keyword in category.keywords {
                let occurrences = count_occurrences(&lower, keyword);
                if occurrences > 0 {
                    unique += 1;
                    count += occurrences;
                }
            }
            CategoryStats {
                category: category.name.to_string(),
                count,
                unique,
                density: count as f64 / word_count,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct KeywordPrediction {
    pub category: String,
    pub score: u32,
    pub confidence: f64,
}

/// Rank categories by unique-keyword-match count and derive a
/// confidence from the top two scores (§4.3 step 4, and §9's fix of
/// the "highest score" ambiguity to unique-matches).
pub fn keyword_prediction(text: &str, categories: &[Category]) -> KeywordPrediction {
    let mut stats = category_stats(text, categories);
    stats.sort_by(|a, b| b.unique.cmp(&a.unique).then_with(|| a.category.cmp(&b.category)));

    let top = &stats[0];
    let second = stats.get(1);

    let confidence = match second {
        Some(second) if second.unique > 0 => {
            top.unique as f64 / (top.unique + second.unique) as f64
        }
        _ => 1.0,
    };

    KeywordPrediction {
        category: top.category.clone(),
        score: top.unique,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::keywords::CATEGORIES;

    #[test]
    fn bank_statement_text_scores_highest_on_bank_statement() {
        let text = "Account balance statement checking savings deposit withdraw ATM";
        let prediction = keyword_prediction(text, CATEGORIES);
        assert_eq!(prediction.category, "bank_statement");
        assert!(prediction.score >= 3);
    }

    #[test]
    fn ties_break_lexicographically() {
        let text = "no matches at all here";
        let prediction = keyword_prediction(text, CATEGORIES);
        // No keywords hit -> every category has unique = 0 -> tie ->
        // earliest lexicographically among category names.
        assert_eq!(prediction.category, "bank_statement");
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn case_insensitive_matching() {
        let text = "INVOICE Bill PAYMENT Due Date Amount Due Total Subtotal";
        let prediction = keyword_prediction(text, CATEGORIES);
        assert_eq!(prediction.category, "invoice");
    }
}
