use anyhow::{Context, Result};
use clap::Parser;
use netview_core::NodeId;
use netview_graph::{DisplayList, DrawCommand, NetworkScene, NetworkStyle, demo};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of nodes in the generated network
    #[arg(short, long, default_value_t = 50)]
    nodes: usize,

    /// Built-in theme (bright, dark, print)
    #[arg(short, long, default_value = "bright")]
    theme: String,

    /// JSON theme file, takes precedence over --theme
    #[arg(long)]
    theme_file: Option<PathBuf>,

    /// Level of detail to render at (zoom factor)
    #[arg(short, long, default_value_t = 1.0)]
    lod: f32,

    /// Hide the pie chart overlays
    #[arg(long)]
    no_pies: bool,

    /// Comma-separated node indexes to select
    #[arg(short, long, value_delimiter = ',')]
    select: Vec<i64>,

    /// Scale applied to the layout
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Print the resolved theme as JSON and exit
    #[arg(long)]
    dump_theme: bool,

    /// Print every draw command instead of a summary
    #[arg(short, long)]
    verbose: bool,
}

fn load_style(args: &Args) -> Result<NetworkStyle> {
    match &args.theme_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading theme file {}", path.display()))?;
            NetworkStyle::from_json(&json)
                .with_context(|| format!("parsing theme file {}", path.display()))
        }
        None => Ok(NetworkStyle::from_name(&args.theme)?),
    }
}

fn summarize(list: &DisplayList) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for command in &list.commands {
        *counts.entry(command.kind()).or_insert(0) += 1;
    }
    counts
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let style = load_style(&args)?;
    if args.dump_theme {
        println!("{}", style.to_json()?);
        return Ok(());
    }

    let mut scene = NetworkScene::new();
    scene.set_network_style(Some(style));
    demo::populate(&mut scene, args.nodes).context("building demo network")?;
    scene.set_scale(args.scale);
    scene.set_pie_charts_visibility(!args.no_pies);
    let selection: Vec<NodeId> = args.select.iter().copied().map(NodeId).collect();
    scene.set_nodes_selection(&selection);

    let mut list = DisplayList::new();
    scene.paint(&mut list, args.lod);
    tracing::info!(commands = list.len(), "Rendered frame");

    println!(
        "Network: {} nodes, {} edges, theme '{}', lod {:.2}",
        scene.node_count(),
        scene.edge_count(),
        scene.network_style().name,
        args.lod
    );
    let bounds = scene.items_bounding_rect();
    println!(
        "Bounds: ({:.1}, {:.1}) - ({:.1}, {:.1})",
        bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
    );
    if !selection.is_empty() {
        let selected = scene.selected_nodes_bounding_rect();
        println!(
            "Selected {} nodes around ({:.1}, {:.1})",
            scene.selected_nodes().len(),
            selected.center().x,
            selected.center().y
        );
    }

    if args.verbose {
        for command in &list.commands {
            match command {
                DrawCommand::Ellipse { rect, fill, .. } => {
                    println!("ellipse {:?} {}", rect.center(), fill)
                }
                DrawCommand::Pie {
                    rect,
                    start,
                    span,
                    fill,
                    ..
                } => println!(
                    "pie     {:?} {:.1}+{:.1} {}",
                    rect.center(),
                    start,
                    span,
                    fill
                ),
                DrawCommand::Text { rect, text, .. } => {
                    println!("text    {:?} {:?}", rect.center(), text)
                }
                DrawCommand::Line { from, to, .. } => println!("line    {:?} -> {:?}", from, to),
            }
        }
    } else {
        println!("Draw commands: {}", list.len());
        for (kind, count) in summarize(&list) {
            println!("  {:<8}{}", kind, count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_selection_list() {
        let args = Args::parse_from(["netview-cli", "--select", "1,4,9", "--theme", "dark"]);
        assert_eq!(args.select, vec![1, 4, 9]);
        assert_eq!(load_style(&args).unwrap().name, "dark");
    }

    #[test]
    fn test_unknown_theme_is_an_error() {
        let args = Args::parse_from(["netview-cli", "--theme", "neon"]);
        assert!(load_style(&args).is_err());
    }

    #[test]
    fn test_summary_counts_by_kind() {
        let mut scene = NetworkScene::new();
        demo::populate(&mut scene, 5).unwrap();
        let mut list = DisplayList::new();
        scene.paint(&mut list, 1.0);
        let counts = summarize(&list);
        assert_eq!(counts.get("ellipse"), Some(&5));
        assert_eq!(counts.get("text"), Some(&5));
        assert_eq!(counts.get("pie"), Some(&15));
    }
}
