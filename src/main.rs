//! ensembl-install CLI entry point
//!
//! Installs staged Ensembl genomes, alignments and homologies into local stores.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ensembl_install::core::config::DEFAULT_MAX_WORKERS;
use ensembl_install::core::{Config, SpeciesNameMap};
use ensembl_install::install::{
    local_install_annotations, local_install_compara, local_install_genomes, local_install_homology,
};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ensembl-install")]
#[command(about = "Install Ensembl genomes, alignments and homologies into local stores")]
#[command(version)]
struct Cli {
    /// Species table with `Species name` and `Common name` columns, amending the bundled one
    #[arg(long = "species-table", global = true)]
    species_table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install staged data
    Install {
        /// Root of the downloaded files
        #[arg(long)]
        staging: PathBuf,
        /// Root of the installed stores
        #[arg(long)]
        install: PathBuf,
        /// Species to install (latin, common or db prefix)
        #[arg(long, num_args = 1.., required = true)]
        species: Vec<String>,
        /// Alignment names, e.g. 10_primates.epo
        #[arg(long = "align-names", num_args = 1..)]
        align_names: Vec<String>,
        /// Delete existing installed output before each stage
        #[arg(long = "force-overwrite")]
        force_overwrite: bool,
        /// Upper bound on worker threads per stage
        #[arg(short = 't', long, default_value_t = DEFAULT_MAX_WORKERS)]
        threads: usize,
        #[arg(long = "skip-genomes")]
        skip_genomes: bool,
        #[arg(long = "skip-aligns")]
        skip_aligns: bool,
        #[arg(long = "skip-homologies")]
        skip_homologies: bool,
    },
    /// Print the species table
    Species,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();

    let names = SpeciesNameMap::load(cli.species_table.as_deref()).context("Failed to load species table")?;

    match cli.command {
        Commands::Species => {
            println!("Species name\tCommon name\tDb prefix");
            for (latin, common, prefix) in names.rows() {
                println!("{}\t{}\t{}", latin, common, prefix);
            }
        }
        Commands::Install {
            staging,
            install,
            species,
            align_names,
            force_overwrite,
            threads,
            skip_genomes,
            skip_aligns,
            skip_homologies,
        } => {
            let config = Config::new(&staging, &install)
                .with_species(&species, &names)?
                .with_align_names(&align_names)
                .with_max_workers(threads);
            info!("Installing {} species from {}", config.db_names.len(), staging.display());

            if !skip_genomes {
                let genomes = local_install_genomes(&config, &names, force_overwrite)?;
                let annotations = local_install_annotations(&config, &names)?;
                eprintln!("\n=== Genomes ===");
                for summary in &genomes {
                    eprintln!("{:<28} {:>8} sequence(s)", summary.db_name, summary.sequences);
                }
                eprintln!("Annotation stores:  {}", annotations.len());
            }
            if !skip_aligns {
                let aligns = local_install_compara(&config, &names, force_overwrite)?;
                eprintln!("\n=== Alignments ===");
                for summary in &aligns {
                    eprintln!(
                        "{:<28} {:>8} record(s) from {} file(s)",
                        summary.align_name, summary.records, summary.files
                    );
                }
            }
            if !skip_homologies {
                let homologies = local_install_homology(&config, &names, force_overwrite)?;
                eprintln!("\n=== Homologies ===");
                eprintln!("Records:         {}", homologies.records);
                eprintln!("Files:           {}", homologies.files);
            }
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}
