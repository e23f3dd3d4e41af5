//! Console output of the drivers

use textcat_core::ScoreResult;

/// Characters of each sample echoed next to its score
pub const PREVIEW_CHARS: usize = 50;

/// `Document <n>: <label> -> <confidence> : <preview>`
pub fn score_line(number: usize, result: &ScoreResult) -> String {
    let preview: String = result.sample.chars().take(PREVIEW_CHARS).collect();
    format!(
        "Document {number}: {} -> {} : {preview}",
        result.predicted_label, result.prediction_confidence
    )
}
