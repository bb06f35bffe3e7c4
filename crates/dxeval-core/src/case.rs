use tracing::warn;

use crate::redact::{extract_case_id, extract_ground_truth, redact_for_api, split_id_header};

/// Placeholder ground truth for blocks without a header line.
pub const UNKNOWN_GROUND_TRUTH: &str = "<UNKNOWN_GT>";

/// One case ready for the batch runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// Position of the block in the input file.
    pub idx: usize,
    /// Resume key; unique within one log.
    pub id: String,
    /// Dataset identifier found in the block, if any.
    pub dataset_id: Option<String>,
    pub ground_truth: Option<String>,
    /// Text sent to the remote bot.
    pub body: String,
}

impl Case {
    /// Case from a clinical prompt block: identifier and ground truth are
    /// extracted and redacted out of the body.
    pub fn from_prompt_block(idx: usize, block: &str, method: &str) -> Self {
        let dataset_id = extract_case_id(block);
        let ground_truth =
            extract_ground_truth(block).unwrap_or_else(|| UNKNOWN_GROUND_TRUTH.to_string());
        let id = dataset_id
            .clone()
            .unwrap_or_else(|| synthesize_id(method, idx));
        let body = redact_for_api(block);
        if leaks_ground_truth(&body, &ground_truth) {
            warn!(%id, "ground-truth line could not be redacted and will be sent");
        }

        Self {
            idx,
            id,
            dataset_id,
            ground_truth: Some(ground_truth),
            body,
        }
    }

    /// Case from a verification prompt block (`ID:` header, then prompt).
    pub fn from_verification_block(idx: usize, block: &str, method: &str) -> Self {
        let (dataset_id, body) = split_id_header(block);

        Self {
            idx,
            id: dataset_id
                .clone()
                .unwrap_or_else(|| synthesize_id(method, idx)),
            dataset_id,
            ground_truth: None,
            body,
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// True when a line of `body` is exactly the extracted ground truth.
fn leaks_ground_truth(body: &str, ground_truth: &str) -> bool {
    ground_truth != UNKNOWN_GROUND_TRUTH && body.lines().any(|line| line.trim() == ground_truth)
}

/// Identifier for a block without one: `<method>_<idx:04>`.
pub fn synthesize_id(method: &str, idx: usize) -> String {
    format!("{}_{:04}", method, idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_case_with_header() {
        let block = "DxBench_94\nEctopic pregnancy\nPatient Symptoms:\npelvic pain";
        let case = Case::from_prompt_block(3, block, "zero_shot_direct");
        assert_eq!(case.idx, 3);
        assert_eq!(case.id, "dxbench_94");
        assert_eq!(case.dataset_id.as_deref(), Some("dxbench_94"));
        assert_eq!(case.ground_truth.as_deref(), Some("Ectopic pregnancy"));
        assert_eq!(case.body, "Patient Symptoms:\npelvic pain\n");
        assert!(case.has_body());
    }

    #[test]
    fn test_prompt_case_without_id_is_synthesized() {
        let case = Case::from_prompt_block(7, "Symptoms: cough", "least_to_most");
        assert_eq!(case.id, "least_to_most_0007");
        assert_eq!(case.dataset_id, None);
        assert_eq!(case.ground_truth.as_deref(), Some(UNKNOWN_GROUND_TRUTH));
    }

    #[test]
    fn test_unredactable_ground_truth_is_detected() {
        // No id line and no section header: the first line stays in the body.
        let case = Case::from_prompt_block(0, "Influenza\nfever and cough", "m");
        assert_eq!(case.ground_truth.as_deref(), Some("Influenza"));
        assert!(leaks_ground_truth(&case.body, "Influenza"));

        let case = Case::from_prompt_block(0, "DxBench_9\nInfluenza\nfever and cough", "m");
        assert!(!leaks_ground_truth(&case.body, "Influenza"));
        assert!(!leaks_ground_truth("<UNKNOWN_GT>", UNKNOWN_GROUND_TRUTH));
    }

    #[test]
    fn test_prompt_case_header_only_has_no_body() {
        let case = Case::from_prompt_block(0, "DxBench_1\nFlu", "m");
        assert!(!case.has_body());
    }

    #[test]
    fn test_verification_case() {
        let block = "ID: dxbench_5\n>> VERIFICATION PROMPT\nbody";
        let case = Case::from_verification_block(12, block, "single_step_cot");
        assert_eq!(case.id, "dxbench_5");
        assert_eq!(case.ground_truth, None);
        assert_eq!(case.body, ">> VERIFICATION PROMPT\nbody");

        let case = Case::from_verification_block(12, "no header", "single_step_cot");
        assert_eq!(case.id, "single_step_cot_0012");
    }
}
