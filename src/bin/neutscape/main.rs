#![warn(missing_docs)]
//! The `neutscape` binary is a command line tool, using the `[neutscape]` crate.
//! It reads newick trees, titer tables and sample embeddings and writes leaf
//! orders, aligned titers, embedding summaries and dendrogram drawings.

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use log::info;
use neutscape::{
    samples::SampleTable,
    selection::{Selection, SelectionEvent},
    titers::{Assay, TiterTable},
    tree::{
        layout::{cluster_layout, Branch},
        LengthPolicy, NewickParseError, NewickParser, TreeNode,
    },
    view::{scale_fraction, LinkedView},
};
use serde::Serialize;
use std::{
    error::Error,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tinytemplate::TinyTemplate;

/// contains the struct representing the command line arguments
/// parsed by [`clap`] and used to execute this binary
pub mod cli;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Room left on the right of the leaves for their labels
const LABEL_MARGIN: f64 = 150.;
const MARGIN: f64 = 20.;

fn read_tree(path: &Path, strict: bool) -> std::result::Result<TreeNode, NewickParseError> {
    let policy = if strict {
        LengthPolicy::Strict
    } else {
        LengthPolicy::Lenient
    };
    let newick = fs::read_to_string(path)?;
    info!("Read {} bytes from {path:?}", newick.len());
    NewickParser::new().with_length_policy(policy).parse(&newick)
}

fn output_writer(output: Option<PathBuf>) -> Result<BufWriter<Box<dyn Write>>> {
    Ok(BufWriter::new(match output {
        Some(path) => Box::new(File::create(path)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    }))
}

fn print_stats(path: &Path, strict: bool, name: bool) -> Result<()> {
    let tree = read_tree(path, strict)?;

    let name = if name {
        format!("{:?}\t", path)
    } else {
        "".into()
    };
    let named = tree.preorder().filter(|node| node.name.is_some()).count();
    let nan_lengths = tree
        .preorder()
        .filter(|node| node.branch_length.map_or(false, f64::is_nan))
        .count();

    println!(
        "{name}{}\t{}\t{}\t{}\t{}",
        tree.size(),
        tree.n_leaves(),
        named,
        tree.depth(),
        nan_lengths,
    );

    Ok(())
}

/// Light to dark purple
fn purple(fraction: f64) -> String {
    let channel = |light: f64, dark: f64| (light + (dark - light) * fraction).round() as u8;
    format!(
        "rgb({},{},{})",
        channel(252., 63.),
        channel(251., 0.),
        channel(253., 125.)
    )
}

#[derive(Serialize)]
struct DrawnLeaf {
    x: f64,
    y: f64,
    label: Option<String>,
    fill: String,
}

#[derive(Serialize)]
struct Context {
    xmin: f64,
    ymin: f64,
    width: f64,
    height: f64,
    transparent: bool,
    branches: Vec<Branch>,
    leaves: Vec<DrawnLeaf>,
}

static SVG: &str = "\
<?xml version=\"1.0\" standalone=\"no\"?>
<svg viewBox=\"{xmin} {ymin} {width} {height}\" width='100%' height='100%' xmlns='http://www.w3.org/2000/svg'>
    {{ if not transparent }}
    <rect fill=\"white\" x=\"{xmin}\" y=\"{ymin}\" width=\"100%\" height=\"100%\"/>
    {{ endif }}
    {{ for branch in branches }}
    <path stroke=\"black\" fill=\"none\" d=\"M{branch.source_y},{branch.source_x} V{branch.target_x} H{branch.target_y}\"/>
    {{ endfor }}
    {{ for leaf in leaves }}
    <circle transform=\"translate({leaf.y},{leaf.x})\" r=\"5.5\" fill=\"{leaf.fill}\" stroke=\"black\" stroke-width=\"0.9\"/>
    {{ if leaf.label }}
    <text transform=\"translate({leaf.y},{leaf.x})\" dy=\"0.31em\" dx=\"10\" font-size=\"13px\">{leaf.label}</text>
    {{ endif }}
    {{ endfor }}
</svg>
";

fn run(args: cli::Args) -> Result<()> {
    let strict = args.strict;
    match args.command {
        cli::Commands::Show { tree } => {
            read_tree(&tree, strict)?.print()?;
        }
        cli::Commands::Order { tree } => {
            let tree = read_tree(&tree, strict)?;
            let mut writer = output_writer(None)?;
            for name in tree.leaf_order() {
                writeln!(writer, "{name}")?;
            }
            writer.flush()?;
        }
        cli::Commands::Stats { trees } => {
            let print_name = trees.len() > 1;
            if print_name {
                println!("filename\tnodes\tleaves\tnamed\tdepth\tnan_lengths")
            } else {
                println!("nodes\tleaves\tnamed\tdepth\tnan_lengths")
            }
            for tree in trees {
                print_stats(&tree, strict, print_name)?
            }
        }
        cli::Commands::Draw {
            tree,
            breadth,
            depth,
            titers,
            participant,
            value_column,
            scale,
            transparent,
            output,
        } => {
            let tree = read_tree(&tree, strict)?;
            let mut layout = cluster_layout(&tree, breadth, depth);
            layout.rescale(scale);

            let mut selection = Selection::new();
            let titers = match (titers, participant) {
                (Some(path), Some(participant)) => {
                    selection.apply(SelectionEvent::Click(participant.as_str().into()));
                    TiterTable::from_file(&path, &Assay::from_column(&value_column))?
                }
                _ => TiterTable::new(Assay::from_column(&value_column), vec![]),
            };
            let extent = titers.extent();
            let values = LinkedView::new(&tree).leaf_values(&titers, &selection);

            let leaves = layout
                .leaves()
                .into_iter()
                .zip(values)
                .map(|(leaf, value)| DrawnLeaf {
                    x: leaf.x,
                    y: leaf.y,
                    label: leaf.label.clone(),
                    fill: match (value.value, extent) {
                        (Some(v), Some(extent)) => purple(scale_fraction(v, extent)),
                        _ => "white".into(),
                    },
                })
                .collect();

            let ctx = Context {
                xmin: -MARGIN,
                ymin: -MARGIN,
                width: depth * scale + 2. * MARGIN + LABEL_MARGIN,
                height: breadth * scale + 2. * MARGIN,
                transparent,
                branches: layout.branches,
                leaves,
            };

            let mut tt = TinyTemplate::new();
            tt.add_template("svg", SVG)?;
            let mut writer = output_writer(output)?;
            writer.write_all(tt.render("svg", &ctx)?.as_bytes())?;
            writer.flush()?;
        }
        cli::Commands::Density {
            tree,
            titers,
            participant,
            value_column,
            output,
        } => {
            let tree = read_tree(&tree, strict)?;
            let titers = TiterTable::from_file(&titers, &Assay::from_column(&value_column))?;

            let mut selection = Selection::new();
            selection.apply(SelectionEvent::Click(participant.as_str().into()));

            let mut writer = output_writer(output)?;
            writeln!(writer, "strain\t{value_column}")?;
            for point in LinkedView::new(&tree).density(&titers, &selection) {
                writeln!(writer, "{}\t{}", point.strain, point.value)?;
            }
            writer.flush()?;
        }
        cli::Commands::Samples {
            samples,
            group_column,
        } => {
            let samples = SampleTable::from_file(&samples, &group_column)?;
            let range = |extent: Option<(f64, f64)>| match extent {
                Some((min, max)) => format!("{min}\t{max}"),
                None => "NA\tNA".into(),
            };

            println!("samples\t{}", samples.samples().len());
            println!("{group_column}\t{}", samples.groups().join(","));
            println!("UMAP1\t{}", range(samples.extent_x()));
            println!("UMAP2\t{}", range(samples.extent_y()));
        }
        cli::Commands::Completion { shell } => {
            let mut cmd = cli::Args::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    let args = cli::Args::parse();

    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
