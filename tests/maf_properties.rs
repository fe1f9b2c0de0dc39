//! MAF block parser property tests
//!
//! Block counting, ancestral suppression and the end-of-stream boundary.

use ensembl_install::formats::maf::{parse_maf_bytes, MafReader};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// One sequence line for species `idx`; every line in a block is 6 columns wide
fn seq_line(species: &str, idx: usize) -> String {
    format!("s {}.chr{} {} 4 + 1000 AC-GT-", species, idx, idx * 10)
}

/// Blocks described by (real species lines, ancestral lines)
fn arb_blocks() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..5, 0usize..3), 0..12)
}

fn render(blocks: &[(usize, usize)]) -> String {
    let mut text = String::from("##maf version=1 scoring=none\n# generated\n\n");
    for (real, ancestral) in blocks {
        text.push_str("a score=0.0\n");
        for i in 0..*real {
            text.push_str(&seq_line(&format!("sp{}", i), i));
            text.push('\n');
            if i < *ancestral {
                text.push_str(&seq_line("ancestral_sequences", i));
                text.push('\n');
            }
        }
        if *real == 0 {
            for i in 0..*ancestral {
                text.push_str(&seq_line("ancestral_sequences", i));
                text.push('\n');
            }
        }
        text.push_str("i ignored line\n\n");
    }
    text
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// One block per block header, each holding its real species lines
    #[test]
    fn prop_block_count_matches_markers(blocks in arb_blocks()) {
        let text = render(&blocks);
        let parsed = parse_maf_bytes(text.as_bytes()).unwrap();
        let markers = text.lines().filter(|l| l.starts_with('a')).count();
        prop_assert_eq!(parsed.len(), markers);
        prop_assert_eq!(parsed.len(), blocks.len());
        for (block, (real, _)) in parsed.iter().zip(&blocks) {
            prop_assert_eq!(block.len(), *real);
        }
    }

    /// Ancestral rows never reach a block
    #[test]
    fn prop_ancestral_suppressed(blocks in arb_blocks()) {
        let text = render(&blocks);
        let mut reader = MafReader::new(text.as_bytes());
        let parsed: Vec<_> = (&mut reader).collect::<Result<_, _>>().unwrap();
        for block in &parsed {
            prop_assert!(block.sequences.keys().all(|id| !id.species().contains("ancestral")));
        }
        let expected: usize = blocks.iter().map(|(real, anc)| if *real == 0 { *anc } else { (*anc).min(*real) }).sum();
        prop_assert_eq!(reader.stats().ancestral, expected);
    }

    /// Text without block headers yields nothing
    #[test]
    fn prop_no_markers_no_blocks(lines in prop::collection::vec("[#si][ -~]{0,40}", 0..20)) {
        let text = lines.join("\n");
        prop_assert!(parse_maf_bytes(text.as_bytes()).unwrap().is_empty());
    }
}

// ============================================================================
// Boundary cases
// ============================================================================

#[test]
fn test_single_marker_spans_to_end() {
    let text = "a score=1\ns h.1 0 2 + 10 AC\ns m.1 0 2 + 10 AC\ns r.1 0 2 + 10 AC\n\n";
    let blocks = parse_maf_bytes(text.as_bytes()).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].len(), 3);
}

#[test]
fn test_final_line_is_not_part_of_last_block() {
    // no trailing newline: the last sequence line is the final line
    let text = "a score=1\ns h.1 0 2 + 10 AC\ns m.1 0 2 + 10 AC";
    let blocks = parse_maf_bytes(text.as_bytes()).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].len(), 1);
    assert_eq!(blocks[0].sequences.keys().next().unwrap().species(), "h");
}

#[test]
fn test_marker_on_last_line_gives_empty_block() {
    let text = "a score=1\ns h.1 0 2 + 10 AC\n\na score=2";
    let blocks = parse_maf_bytes(text.as_bytes()).unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].len(), 1);
    assert!(blocks[1].is_empty());
}

#[test]
fn test_ancestral_token_beyond_window_is_kept() {
    let padding = "A".repeat(120);
    let text = format!("a\ns h.1 0 120 + 1000 {}ancestral\n\n", padding);
    let blocks = parse_maf_bytes(text.as_bytes()).unwrap();
    assert_eq!(blocks[0].len(), 1);
}

#[test]
fn test_duplicate_identity_last_wins() {
    let text = "a\ns h.1 0 2 + 10 AC\ns h.1 0 2 + 10 GT\n\n";
    let mut reader = MafReader::new(text.as_bytes());
    let block = reader.next().unwrap().unwrap();
    assert_eq!(block.len(), 1);
    assert_eq!(block.overwritten, 1);
    assert_eq!(block.sequences.values().next().unwrap(), "GT");
    assert!(reader.next().is_none());
    assert_eq!(reader.stats().overwritten, 1);
}

#[test]
fn test_ragged_block_is_flagged_not_rejected() {
    let text = "a\ns h.1 0 2 + 10 AC\ns m.1 0 2 + 10 A-C\n\n";
    let blocks = parse_maf_bytes(text.as_bytes()).unwrap();
    assert!(blocks[0].is_ragged());
    assert_eq!(blocks[0].len(), 2);
}

#[test]
fn test_malformed_line_stops_iteration() {
    let text = "a\ns h.1 0 two + 10 AC\n\na\ns h.1 0 2 + 10 AC\n\n";
    let mut reader = MafReader::new(text.as_bytes());
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}
