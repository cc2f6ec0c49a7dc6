//! BYAML CLI - Command-line tool for converting BYAML game files.
//!
//! This is the main entry point for the `byaml` command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use walkdir::WalkDir;

use byaml::{Byaml, Endian};

/// BYAML - convert BYAML binary files to and from XML
#[derive(Parser)]
#[command(name = "byaml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a BYAML file to XML
    ToXml {
        /// Input BYAML file
        #[arg(short, long, env = "BYAML_INPUT")]
        input: PathBuf,

        /// Output XML file
        #[arg(short, long, env = "BYAML_OUTPUT")]
        output: PathBuf,
    },

    /// Convert an XML file back to BYAML
    FromXml {
        /// Input XML file
        #[arg(short, long, env = "BYAML_INPUT")]
        input: PathBuf,

        /// Output BYAML file
        #[arg(short, long, env = "BYAML_OUTPUT")]
        output: PathBuf,

        /// Byte order to write (big or little), overriding the XML root
        #[arg(short, long)]
        endian: Option<Endian>,
    },

    /// Convert a BYAML file to JSON
    ToJson {
        /// Input BYAML file
        #[arg(short, long, env = "BYAML_INPUT")]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long, env = "BYAML_OUTPUT")]
        output: PathBuf,
    },

    /// Convert every BYAML and XML file under a directory
    Batch {
        /// Input directory
        #[arg(short, long, env = "BYAML_INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "BYAML_OUTPUT")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::fmt::Target::Stderr)
        .init();

    match cli.command {
        Commands::ToXml { input, output } => {
            cmd_to_xml(&input, &output)?;
        }
        Commands::FromXml {
            input,
            output,
            endian,
        } => {
            cmd_from_xml(&input, &output, endian)?;
        }
        Commands::ToJson { input, output } => {
            cmd_to_json(&input, &output)?;
        }
        Commands::Batch { input, output } => {
            cmd_batch(&input, &output)?;
        }
    }

    Ok(())
}

fn read_byaml(input: &Path) -> Result<Byaml> {
    let data = fs::read(input).context("Failed to read input file")?;

    if !Byaml::is_byaml(&data) {
        anyhow::bail!("{} is not a BYAML file", input.display());
    }

    Byaml::parse(&data).context("Failed to parse BYAML")
}

fn cmd_to_xml(input: &Path, output: &Path) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let byaml = read_byaml(input)?;
    let xml = byaml.to_xml_string().context("Failed to convert to XML")?;
    fs::write(output, xml).context("Failed to write output file")?;

    println!("Conversion complete");

    Ok(())
}

fn cmd_from_xml(input: &Path, output: &Path, endian: Option<Endian>) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let xml = fs::read(input).context("Failed to read input file")?;
    let mut byaml = Byaml::from_xml_bytes(&xml).context("Failed to parse XML")?;

    if let Some(endian) = endian {
        byaml
            .set_endian(endian)
            .context("Failed to change byte order")?;
    }

    let data = byaml.to_bytes().context("Failed to encode BYAML")?;
    fs::write(output, data).context("Failed to write output file")?;

    println!(
        "Conversion complete ({}-endian, {} names, {} strings, {} paths)",
        byaml.endian,
        byaml.names.len(),
        byaml.strings.len(),
        byaml.paths.len()
    );

    Ok(())
}

fn cmd_to_json(input: &Path, output: &Path) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let byaml = read_byaml(input)?;
    let json = byaml.to_json_string().context("Failed to convert to JSON")?;
    fs::write(output, json).context("Failed to write output file")?;

    println!("Conversion complete");

    Ok(())
}

/// What a batch entry converts into.
enum Conversion {
    ToXml,
    FromXml,
}

fn conversion_for(path: &Path) -> Option<Conversion> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "byaml" | "byml" => Some(Conversion::ToXml),
        "xml" => Some(Conversion::FromXml),
        _ => None,
    }
}

fn cmd_batch(input: &Path, output: &Path) -> Result<()> {
    println!("Scanning: {}", input.display());

    let files: Vec<(PathBuf, Conversion)> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let conversion = conversion_for(entry.path())?;
            Some((entry.into_path(), conversion))
        })
        .collect();

    println!("Converting {} files to {}...", files.len(), output.display());

    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut converted = 0;
    let mut errors = 0;

    for (path, conversion) in &files {
        let relative = path.strip_prefix(input).unwrap_or(path.as_path());

        match convert_one(path, &output.join(relative), conversion) {
            Ok(()) => converted += 1,
            Err(e) => {
                log::debug!("{:?}", e);
                pb.suspend(|| eprintln!("Error converting {}: {:#}", relative.display(), e));
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Converted {} files in {:?} ({} errors)",
        converted,
        start.elapsed(),
        errors
    );

    Ok(())
}

fn convert_one(path: &Path, target: &Path, conversion: &Conversion) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    match conversion {
        Conversion::ToXml => {
            let byaml = read_byaml(path)?;
            let xml = byaml.to_xml_string().context("Failed to convert to XML")?;
            fs::write(target.with_extension("xml"), xml)?;
        }
        Conversion::FromXml => {
            let xml = fs::read(path)?;
            let byaml = Byaml::from_xml_bytes(&xml).context("Failed to parse XML")?;
            let data = byaml.to_bytes().context("Failed to encode BYAML")?;
            fs::write(target.with_extension("byaml"), data)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_for_extension() {
        assert!(matches!(
            conversion_for(Path::new("course/course_muunt.byaml")),
            Some(Conversion::ToXml)
        ));
        assert!(matches!(
            conversion_for(Path::new("Map.BYML")),
            Some(Conversion::ToXml)
        ));
        assert!(matches!(
            conversion_for(Path::new("dump/course.xml")),
            Some(Conversion::FromXml)
        ));
        assert!(conversion_for(Path::new("readme.txt")).is_none());
        assert!(conversion_for(Path::new("noext")).is_none());
    }

    #[test]
    fn test_cli_parses_endian() {
        let cli = Cli::try_parse_from([
            "byaml", "-vv", "from-xml", "-i", "a.xml", "-o", "a.byaml", "--endian", "little",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::FromXml {
                endian: Some(Endian::Little),
                ..
            }
        ));
    }
}
