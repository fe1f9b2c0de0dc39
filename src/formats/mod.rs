//! File format adapters
//!
//! Readers for the staging inputs: MAF alignments, FASTA genomes, GFF3
//! annotations and Compara homology tables.

pub mod fasta;
pub mod gff;
pub mod homology;
pub mod maf;

pub use fasta::{read_fasta_file, FastaRecord};
pub use gff::GffRecordView;
pub use homology::{HomologyLoader, HomologyRow};
pub use maf::{parse_maf_bytes, read_maf_file, MafBlock, MafParseStats, MafReader};
