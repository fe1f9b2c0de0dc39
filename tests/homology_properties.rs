//! Homology filter property tests

use ensembl_install::formats::homology::{HomologyLoader, SOURCE_COLUMNS};
use proptest::prelude::*;
use std::path::Path;

const SPECIES: [&str; 5] = ["homo_sapiens", "mus_musculus", "rattus_norvegicus", "danio_rerio", "gallus_gallus"];

fn arb_species() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SPECIES.to_vec())
}

fn arb_row() -> impl Strategy<Value = (&'static str, &'static str)> {
    (arb_species(), arb_species())
}

fn render(rows: &[(&str, &str)]) -> Vec<String> {
    let mut lines = vec![SOURCE_COLUMNS.join("\t")];
    for (i, (a, b)) in rows.iter().enumerate() {
        lines.push(format!("ortholog_one2one\t{}\tGA{}\tPA{}\t{}\tGB{}\tPB{}", a, i, i, b, i, i));
    }
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A row survives iff both of its species are allowed
    #[test]
    fn prop_filter_requires_both_species(
        allowed in prop::sample::subsequence(SPECIES.to_vec(), 0..=SPECIES.len()),
        rows in prop::collection::vec(arb_row(), 0..30),
    ) {
        let loader = HomologyLoader::new(allowed.iter().copied());
        let loaded = loader.load_lines(&render(&rows), Path::new("h.tsv.gz")).unwrap();
        let expected: Vec<_> = rows
            .iter()
            .enumerate()
            .filter(|(_, (a, b))| allowed.contains(a) && allowed.contains(b))
            .map(|(i, _)| format!("GA{}", i))
            .collect();
        let got: Vec<_> = loaded.iter().map(|r| r.gene_id_1.clone()).collect();
        prop_assert_eq!(got, expected);
        prop_assert!(loaded.iter().all(|r| r.source == "h.tsv.gz"));
    }

    /// Swapping the two sides of a relationship never changes whether it survives
    #[test]
    fn prop_filter_is_symmetric(
        allowed in prop::sample::subsequence(SPECIES.to_vec(), 0..=SPECIES.len()),
        (a, b) in arb_row(),
    ) {
        let loader = HomologyLoader::new(allowed.iter().copied());
        prop_assert_eq!(loader.matching_species(a, b), loader.matching_species(b, a));
    }
}

#[test]
fn test_human_mouse_example() {
    let loader = HomologyLoader::new(["human", "mouse"]);
    assert!(loader.matching_species("human", "mouse"));
    assert!(!loader.matching_species("human", "rat"));
}
