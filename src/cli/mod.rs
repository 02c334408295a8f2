//! CLI module for docvec.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Embed a directory of documents into normalized vectors.
#[derive(Debug, Parser)]
#[command(name = "docvec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        help = "Output format: text, json, or markdown"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        short = 'c',
        global = true,
        env = "DOCVEC_CONFIG",
        help = "Path to a config file (defaults to the user config directory)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count tokens and project the cost of embedding a directory
    Estimate(commands::EstimateArgs),

    /// Embed every document in a directory and write the entries as JSONL
    Embed(commands::EmbedArgs),

    /// Embed a single piece of text and print its vector
    Vector(commands::VectorArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
