use clap::{Parser, Subcommand};
use clap_complete::Shell;
use neutscape::samples::DEFAULT_GROUP_COLUMN;
use std::path::PathBuf;

/// Inspect phylogenetic trees and align antigenic measurements on their leaves
#[derive(Parser, Debug)]
pub struct Args {
    #[command(subcommand)]
    /// The command to execute
    pub command: Commands,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fail on branch lengths that are not numbers instead of reading them as NaN
    #[arg(long, global = true)]
    pub strict: bool,
}

/// The available commands in the `neutscape` tool
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree hierarchy
    Show {
        /// Input newick file of the tree
        tree: PathBuf,
    },

    /// Print the leaf order of the tree, one name per line
    Order {
        /// Input newick file of the tree
        tree: PathBuf,
    },

    /// Get statistics about trees
    Stats {
        /// Input newick files
        trees: Vec<PathBuf>,
    },

    /// Draw the tree as an SVG dendrogram
    Draw {
        /// Input newick file of the tree
        tree: PathBuf,
        /// Extent of the axis the leaves are spread over (vertical)
        #[arg(long, default_value_t = 340.)]
        breadth: f64,
        /// Extent of the axis from the root to the leaves (horizontal)
        #[arg(long, default_value_t = 200.)]
        depth: f64,
        /// Titer file used to colour the leaves
        #[arg(short, long, requires = "participant")]
        titers: Option<PathBuf>,
        /// Participant whose titers colour the leaves
        #[arg(short, long, requires = "titers")]
        participant: Option<String>,
        /// Column of the titer file holding the values
        #[arg(long, default_value = "log_hi_titer")]
        value_column: String,
        /// Multiply all coordinates of the drawing by this factor
        #[arg(long, default_value_t = 1.)]
        scale: f64,
        /// Do not draw a white background
        #[arg(long)]
        transparent: bool,
        /// File to save the SVG to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Output the titers of a participant in the leaf order of the tree
    Density {
        /// Input newick file of the tree
        tree: PathBuf,
        /// Titer file
        titers: PathBuf,
        /// Participant to extract
        participant: String,
        /// Column of the titer file holding the values
        #[arg(long, default_value = "log_hi_titer")]
        value_column: String,
        /// Tab separated file to save values to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the samples of an embedding file: groups and coordinate ranges
    Samples {
        /// Comma separated file with participant_id, UMAP1 and UMAP2 columns
        samples: PathBuf,
        /// Column used to group samples
        #[arg(long, default_value = DEFAULT_GROUP_COLUMN)]
        group_column: String,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate the completion script for
        #[arg(value_enum)]
        shell: Shell,
    },
}
