//! Verification prompts for the judge model.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::blocks::BUNDLE_SENTINEL;
use crate::config::Synonym;

/// Render the judge prompt for one case.
///
/// The first line is `ID: <id>` so the judge stage can recover the case
/// identifier from the bundle.
pub fn build_verification_prompt(
    id: &str,
    ground_truth: &str,
    assistant_output: &str,
    synonyms: &[Synonym],
) -> String {
    let synonyms = synonyms
        .iter()
        .map(|(a, b)| format!("{}\u{2194}{}", a, b))
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "ID: {id}\n\
>> VERIFICATION PROMPT\n\
GROUND-TRUTH DIAGNOSIS: {ground_truth}\n\
\n\
Assistant_output:\n\
<<<\n\
{assistant_output}\n\
>>>\n\
\n\
You are a strict medical judge.\n\
\n\
INPUT:\n\
\u{2022} GT: the ground-truth diagnosis (string)\n\
\u{2022} Assistant_output: free text (may be narrative, lists, or mixed)\n\
\n\
TASK:\n\
Decide whether the assistant\u{2019}s BEST diagnosis (Top-1) matches GT, and also whether GT appears within the assistant\u{2019}s Top-3 and Top-5 diagnoses.\n\
\n\
HOW TO FIND THE SINGLE BEST DIAGNOSIS (\u{201c}BEST\u{201d}) \u{2014} priority order:\n\
1) If the text explicitly names a final/primary/most-likely/definitive diagnosis, use that.\n\
2) Else if any diagnoses are ranked, numbered, or given probabilities/likelihoods,\n   \
pick the highest-ranked/probability item; ties \u{2192} pick the one appearing earliest.\n\
3) Else if multiple diagnoses are discussed narratively, pick the one the text argues\n   \
FOR most strongly (most supportive reasons, least hedging), not merely mentioned.\n\
4) Else if only one diagnosis is meaningfully proposed, use it.\n\
5) If you cannot extract any diagnosis the assistant endorses \u{2192} UNSCORABLE.\n\
\n\
MATCHING (normalize before comparing):\n\
\u{2022} Lowercase; remove punctuation and parentheticals.\n\
\u{2022} Accept common clinical synonyms (non-exhaustive): {synonyms}.\n\
\u{2022} Do NOT credit broader categories unless clearly meant as the specific disease (no parent/child credit).\n\
\n\
SECONDARY CHECKS:\n\
Also note whether GT appears among the assistant\u{2019}s Top-3 diagnoses, and whether it appears among the Top-5 diagnoses. Mentions only for exclusion do NOT count.\n\
\n\
OUTPUT \u{2014} single JSON line, no prose:\n\
{{\"TOP1\":\"YES|NO|UNSCORABLE\",\"TOP3\":\"YES|NO\",\"TOP5\":\"YES|NO\",\"BEST\":\"<assistant_best_dx>\"}}"
    )
}

/// Writes verification prompts of one method: one file per case plus a
/// bundle of all cases separated by [`BUNDLE_SENTINEL`] lines.
#[derive(Debug, Clone)]
pub struct VerificationWriter {
    case_dir: PathBuf,
    bundle: PathBuf,
    synonyms: Vec<Synonym>,
}

impl VerificationWriter {
    /// Layout under `dir`: `<method>/<id>.txt` and `<method>.all.txt`.
    pub fn create(dir: &Path, method: &str, synonyms: Vec<Synonym>) -> Result<Self> {
        let case_dir = dir.join(method);
        fs::create_dir_all(&case_dir)
            .with_context(|| format!("failed to create {}", case_dir.display()))?;

        Ok(Self {
            case_dir,
            bundle: dir.join(format!("{}.all.txt", method)),
            synonyms,
        })
    }

    pub fn bundle_path(&self) -> &Path {
        &self.bundle
    }

    pub fn case_path(&self, id: &str) -> PathBuf {
        self.case_dir.join(format!("{}.txt", id))
    }

    pub fn write(&self, id: &str, ground_truth: &str, assistant_output: &str) -> Result<()> {
        let prompt = build_verification_prompt(id, ground_truth, assistant_output, &self.synonyms);

        let path = self.case_path(id);
        fs::write(&path, &prompt).with_context(|| format!("failed to write {}", path.display()))?;

        let mut bundle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.bundle)
            .with_context(|| format!("failed to open {}", self.bundle.display()))?;
        write!(bundle, "{}\n{}\n\n", prompt, BUNDLE_SENTINEL)
            .with_context(|| format!("failed to append {}", self.bundle.display()))?;
        bundle.flush()?;
        Ok(())
    }
}
