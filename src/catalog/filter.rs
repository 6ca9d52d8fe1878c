//! 翻訳率によるロケール選別

use super::types::TranslationSet;

/// `percent_translated >= threshold` の翻訳セットだけを残す（順序は維持）
///
/// 除外したロケールはログに出力するだけで、エラーにはしない。
#[must_use]
pub fn filter_by_completion(sets: Vec<TranslationSet>, threshold: u32) -> Vec<TranslationSet> {
    sets.into_iter()
        .filter(|set| {
            let qualifies = set.percent_translated >= threshold;
            if !qualifies {
                tracing::info!(
                    locale = %set.canonical_locale_code,
                    "Skipping {} as it is only {}% translated.",
                    set.name,
                    set.percent_translated
                );
            }
            qualifies
        })
        .collect()
}
