//! GFF3 annotation property tests
//!
//! Coordinate conversion and attribute extraction on the way into the
//! annotation store.

use ensembl_install::core::Strand;
use ensembl_install::formats::gff::GffRecordView;
use ensembl_install::install::parse_gff_lines;
use ensembl_install::store::GffFeature;
use proptest::prelude::*;

/// Generate a valid chromosome name
fn arb_seqid() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=22).prop_map(|n| n.to_string()),
        Just("X".to_string()),
        Just("MT".to_string()),
        Just("KI270728.1".to_string()),
    ]
}

fn arb_feature() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("gene".to_string()),
        Just("mRNA".to_string()),
        Just("exon".to_string()),
        Just("CDS".to_string()),
        Just("five_prime_UTR".to_string()),
    ]
}

fn arb_strand_char() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("+"), Just("-"), Just(".")]
}

/// (line, start, end, strand, name, parent)
fn arb_gff_line() -> impl Strategy<Value = (String, u64, u64, &'static str, String, Option<String>)> {
    (
        arb_seqid(),
        arb_feature(),
        1u64..100_000_000,
        0u64..100_000,
        arb_strand_char(),
        "[A-Za-z0-9]{1,12}",
        proptest::option::of("[A-Za-z0-9]{1,12}"),
    )
        .prop_map(|(seqid, feature, start, len, strand, name, parent)| {
            let end = start + len;
            let mut attributes = format!("ID={}:{};Name={}", feature, name, name);
            if let Some(parent) = &parent {
                attributes.push_str(&format!(";Parent={}", parent));
            }
            let line = format!("{}\tensembl\t{}\t{}\t{}\t.\t{}\t.\t{}", seqid, feature, start, end, strand, attributes);
            (line, start, end, strand, name, parent)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// 1-based closed coordinates become 0-based half-open with the same length
    #[test]
    fn prop_coordinates_become_half_open((line, start, end, _, _, _) in arb_gff_line()) {
        let view = GffRecordView::parse(line.as_bytes(), 1).unwrap();
        let feature = GffFeature::from_view(&view);
        prop_assert_eq!(feature.start, start - 1);
        prop_assert_eq!(feature.end, end);
        prop_assert_eq!(feature.end - feature.start, view.size());
    }

    /// Strand, name and parent are carried into the feature
    #[test]
    fn prop_attributes_extracted((line, _, _, strand, name, parent) in arb_gff_line()) {
        let feature = GffFeature::from_view(&GffRecordView::parse(line.as_bytes(), 1).unwrap());
        let expected_strand = match strand {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        };
        prop_assert_eq!(feature.strand, expected_strand);
        prop_assert_eq!(feature.name, Some(name));
        prop_assert_eq!(feature.parent_id, parent);
    }

    /// Nothing after the ##FASTA directive is read as a feature
    #[test]
    fn prop_fasta_section_ignored(
        lines in prop::collection::vec(arb_gff_line(), 0..10),
        split in 0usize..10,
    ) {
        let split = split.min(lines.len());
        let mut text: Vec<String> = vec!["##gff-version 3".to_string()];
        text.extend(lines[..split].iter().map(|l| l.0.clone()));
        text.push("##FASTA".to_string());
        text.push(">1".to_string());
        text.extend(lines[split..].iter().map(|l| l.0.clone()));
        prop_assert_eq!(parse_gff_lines(&text).unwrap().len(), split);
    }
}

#[test]
fn test_start_zero_rejected() {
    assert!(GffRecordView::parse(b"1\t.\tgene\t0\t10\t.\t+\t.\tID=x", 1).is_err());
    assert!(GffRecordView::parse(b"1\t.\tgene\t20\t10\t.\t+\t.\tID=x", 1).is_err());
}
