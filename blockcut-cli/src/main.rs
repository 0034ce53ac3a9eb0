//! Command-line entry point: loads one god file's dataset from a SQLite
//! subject database, runs the clustering driver, and writes the resulting
//! block assignment plus DV8 DSM/DRH files to an output directory.

use std::path::PathBuf;

use blockcut_analysis::adapters::{candidate_files, dsm, drh, load_dataset};
use blockcut_analysis::cluster;
use blockcut_core::ClusterConfig;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

#[derive(Debug, Parser)]
#[command(name = "blockcut", version, about = "Balanced block decomposition of a god file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decompose one file entity into blocks and write the results.
    Decompose {
        /// Path to the SQLite subject database.
        db: PathBuf,
        /// Name of the file entity to decompose.
        filename: String,
        /// Directory to write block-assignment.csv / .dsm.json / .drh.json into.
        #[arg(long, default_value = "blockcut-out")]
        output_dir: PathBuf,
        /// Path to a TOML file overriding clustering defaults.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List files whose child-entity count meets a minimum, as decomposition candidates.
    Candidates {
        db: PathBuf,
        #[arg(long, default_value = "main")]
        ref_name: String,
        #[arg(long, default_value_t = 10)]
        min_children: i64,
    },
}

fn main() {
    blockcut_core::tracing_init::init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Decompose { db, filename, output_dir, config } => {
            decompose(&db, &filename, &output_dir, config.as_deref())
        }
        Command::Candidates { db, ref_name, min_children } => {
            let conn = Connection::open(&db)?;
            for name in candidate_files(&conn, &ref_name, min_children)? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn decompose(db: &std::path::Path, filename: &str, output_dir: &std::path::Path, config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let conn = Connection::open(db)?;
    let dataset = load_dataset(&conn, filename)?;

    let config: ClusterConfig = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            toml::from_str(&text)?
        }
        None => ClusterConfig::default(),
    };

    let entities = dataset.entities();
    let deps = dataset.deps();
    let target_ids = dataset.target_ids();
    let mut table = blockcut_core::EntityTable::new(entities);

    let report = cluster::run(&mut table, &deps, &target_ids, &config);
    tracing::info!(bisections = report.bisections.len(), "clustering complete");

    std::fs::create_dir_all(output_dir)?;
    write_assignment_csv(&table, &output_dir.join(format!("{filename}.csv")))?;

    let targets: Vec<_> = table
        .entities
        .iter()
        .filter(|e| target_ids.contains(&e.id))
        .cloned()
        .collect();
    dsm::write_dsm(&output_dir.join(format!("{filename}.dsm.json")), filename, &targets, &dataset.target_deps)?;

    let with_blocks: Vec<(blockcut_core::Entity, String)> = targets
        .iter()
        .map(|e| (e.clone(), table.block_name_of(e.id).to_string()))
        .collect();
    drh::write_drh(&output_dir.join(format!("{filename}.drh.json")), &format!("{filename}-drh"), &with_blocks)?;

    Ok(())
}

/// Quotes a field per RFC 4180 if it contains a comma, quote, or newline.
/// Entity names are frequently method signatures (`foo(int, int)`), which
/// would otherwise corrupt the column layout.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_assignment_csv(table: &blockcut_core::EntityTable, path: &std::path::Path) -> anyhow::Result<()> {
    use std::io::Write;
    let mut out = std::fs::File::create(path)?;
    writeln!(out, "id,name,kind,name_id,strong_id,weak_id,block_name,block_id")?;
    for e in &table.entities {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            e.id,
            csv_field(&e.name),
            csv_field(e.kind.as_str()),
            table.name_id_of(e.id),
            table.strong_id_of(e.id),
            table.weak_id_of(e.id),
            csv_field(table.block_name_of(e.id)),
            table.block_id_of(e.id),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::csv_field;

    #[test]
    fn plain_field_is_untouched() {
        assert_eq!(csv_field("render"), "render");
    }

    #[test]
    fn field_with_comma_is_quoted() {
        assert_eq!(csv_field("foo(int, int)"), "\"foo(int, int)\"");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
