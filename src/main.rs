//! # Vitae CLI
//!
//! Usage:
//!   vitae example > cv.json
//!   vitae pdf cv.json -o cv.pdf
//!   vitae html --preview cv.json -o preview.html
//!   vitae paginate cv.json
//!   cat cv.json | vitae validate
//!
//! Input is either an export bundle (`{name, data, style}`) or a bare
//! document. Read from stdin when no file is given.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use vitae::model::{Document, UuidIds};
use vitae::store::{export_json, safe_file_name, CvExport};
use vitae::style::{CvStyle, PaperSize};
use vitae::{HtmlTarget, VitaeError};

#[derive(Parser)]
#[command(name = "vitae")]
#[command(version)]
#[command(about = "Paginate and export CVs as fixed-size pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the starter CV as an export bundle
    Example,

    /// Check that input is a usable CV
    Validate {
        /// CV JSON file (stdin if not specified)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Print the page assignment as JSON
    Paginate {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Override the paper size
        #[arg(long, value_enum, env = "VITAE_PAPER")]
        paper: Option<Paper>,
    },

    /// Render to a standalone HTML page
    Html {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include the on-screen ruler and page-end markers
        #[arg(long)]
        preview: bool,

        #[arg(long, value_enum, env = "VITAE_PAPER")]
        paper: Option<Paper>,
    },

    /// Render to PDF
    Pdf {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output file (defaults to the CV's name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, value_enum, env = "VITAE_PAPER")]
        paper: Option<Paper>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Paper {
    A4,
    Letter,
}

impl From<Paper> for PaperSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A4 => PaperSize::A4,
            Paper::Letter => PaperSize::Letter,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Example => cmd_example(),
        Commands::Validate { input } => cmd_validate(input.as_deref()),
        Commands::Paginate { input, paper } => cmd_paginate(input.as_deref(), paper),
        Commands::Html {
            input,
            output,
            preview,
            paper,
        } => cmd_html(input.as_deref(), output.as_deref(), preview, paper),
        Commands::Pdf { input, output, paper } => cmd_pdf(input.as_deref(), output.as_deref(), paper),
    };

    if let Err(e) = result {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

fn read_input(input: Option<&Path>, paper: Option<Paper>) -> Result<CvExport, VitaeError> {
    let json = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let mut cv = vitae::read_cv(&json)?;
    if let Some(paper) = paper {
        cv.style.paper_size = paper.into();
    }
    Ok(cv)
}

fn cmd_example() -> Result<(), VitaeError> {
    let document = Document::sample(&mut UuidIds);
    println!("{}", export_json("Untitled CV", &document, &CvStyle::default())?);
    Ok(())
}

fn cmd_validate(input: Option<&Path>) -> Result<(), VitaeError> {
    let cv = read_input(input, None)?;
    let entries: usize = cv.data.sections.iter().map(|s| s.items.len()).sum();
    eprintln!(
        "✓ `{}` is valid: {} section(s), {} entr{}",
        cv.name,
        cv.data.sections.len(),
        entries,
        if entries == 1 { "y" } else { "ies" }
    );
    Ok(())
}

fn cmd_paginate(input: Option<&Path>, paper: Option<Paper>) -> Result<(), VitaeError> {
    let cv = read_input(input, paper)?;
    let pass = vitae::paginate(&cv.data, &cv.style);
    println!("{}", serde_json::to_string_pretty(&pass.assignment)?);
    Ok(())
}

fn cmd_html(input: Option<&Path>, output: Option<&Path>, preview: bool, paper: Option<Paper>) -> Result<(), VitaeError> {
    let cv = read_input(input, paper)?;
    let target = if preview { HtmlTarget::Preview } else { HtmlTarget::Export };
    let html = vitae::render_html(&cv.data, &cv.style, target);
    match output {
        Some(path) => {
            fs::write(path, &html)?;
            eprintln!("✓ Written {} bytes to {}", html.len(), path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

fn cmd_pdf(input: Option<&Path>, output: Option<&Path>, paper: Option<Paper>) -> Result<(), VitaeError> {
    let cv = read_input(input, paper)?;
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{}.pdf", safe_file_name(&cv.name))),
    };
    let pdf_bytes = vitae::render_pdf(&cv.data, &cv.style);
    fs::write(&path, &pdf_bytes)?;
    eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), path.display());
    Ok(())
}
