//! Splitting of flat text files into case blocks.
//!
//! A separator is a line that equals the sentinel once trailing whitespace
//! is stripped. Blocks that are blank after trimming are dropped.

/// Separator used by case prompt files: 22 `=` characters.
pub const PROMPT_SENTINEL: &str = "======================";

/// Separator written between verification prompts: 80 `-` characters.
pub const BUNDLE_SENTINEL: &str =
    "--------------------------------------------------------------------------------";

/// Sentinels recognized when the input format is not known up front.
pub const KNOWN_SENTINELS: [&str; 2] = [PROMPT_SENTINEL, BUNDLE_SENTINEL];

fn is_separator(line: &str, sentinel: &str) -> bool {
    line.trim_end() == sentinel
}

/// Return the first candidate that appears as a separator line in `text`,
/// scanning lines in order; `default` when none does.
pub fn detect_sentinel<'a>(text: &str, candidates: &[&'a str], default: &'a str) -> &'a str {
    text.lines()
        .find_map(|line| {
            candidates
                .iter()
                .copied()
                .find(|sentinel| is_separator(line, sentinel))
        })
        .unwrap_or(default)
}

/// Split `text` on separator lines, keeping non-blank blocks in order.
pub fn split_blocks(text: &str, sentinel: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if is_separator(line, sentinel) {
            push_block(&mut blocks, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_block(&mut blocks, &current);

    blocks
}

fn push_block(blocks: &mut Vec<String>, lines: &[&str]) {
    let block = lines.join("\n");
    if !block.trim().is_empty() {
        blocks.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_returns_blocks_in_order() {
        let text = format!(
            "DxBench_1\nflu\n{s}\nDxBench_2\nmigraine\n{s}\nDxBench_3\nasthma\n",
            s = PROMPT_SENTINEL
        );
        let blocks = split_blocks(&text, PROMPT_SENTINEL);
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("DxBench_1"));
        assert!(blocks[1].contains("migraine"));
        assert!(blocks[2].contains("asthma"));
    }

    #[test]
    fn test_split_drops_blank_blocks() {
        let text = format!(
            "{s}\n\n   \n{s}\nonly block\n{s}\n{s}\n",
            s = PROMPT_SENTINEL
        );
        let blocks = split_blocks(&text, PROMPT_SENTINEL);
        assert_eq!(blocks, vec!["only block".to_string()]);
    }

    #[test]
    fn test_split_allows_trailing_whitespace_only() {
        let text = format!(
            "a\n{s}   \t\nb\n  {s}\nc\n{s}=\nd",
            s = PROMPT_SENTINEL
        );
        let blocks = split_blocks(&text, PROMPT_SENTINEL);
        // Leading spaces and a longer run are content, not separators.
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "a");
        assert!(blocks[1].contains(&format!("  {}", PROMPT_SENTINEL)));
        assert!(blocks[1].ends_with('d'));
    }

    #[test]
    fn test_split_preserves_content_modulo_trim() {
        let parts = ["first case\nline two", "second case", "third\n\ncase"];
        let text = parts.join(&format!("\n{}\n", PROMPT_SENTINEL));
        let blocks = split_blocks(&text, PROMPT_SENTINEL);
        let got: Vec<&str> = blocks.iter().map(|b| b.trim()).collect();
        assert_eq!(got, parts);
    }

    #[test]
    fn test_split_is_idempotent() {
        let text = format!("x\n{s}\ny\n", s = BUNDLE_SENTINEL);
        assert_eq!(
            split_blocks(&text, BUNDLE_SENTINEL),
            split_blocks(&text, BUNDLE_SENTINEL)
        );
    }

    #[test]
    fn test_detect_prefers_first_found() {
        let text = format!("a\n{}\nb\n{}\nc", BUNDLE_SENTINEL, PROMPT_SENTINEL);
        assert_eq!(
            detect_sentinel(&text, &KNOWN_SENTINELS, PROMPT_SENTINEL),
            BUNDLE_SENTINEL
        );

        let text = format!("a\n{}\nb", PROMPT_SENTINEL);
        assert_eq!(
            detect_sentinel(&text, &KNOWN_SENTINELS, BUNDLE_SENTINEL),
            PROMPT_SENTINEL
        );
    }

    #[test]
    fn test_detect_falls_back_to_default() {
        assert_eq!(
            detect_sentinel("no separators here\n***", &KNOWN_SENTINELS, BUNDLE_SENTINEL),
            BUNDLE_SENTINEL
        );
    }
}
