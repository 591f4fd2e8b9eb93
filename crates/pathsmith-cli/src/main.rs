use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::fmt::SubscriberBuilder;

use pathsmith::error::{ScenarioError, SearchError};
use pathsmith::flags::{ProgressSink, SearchFlags};
use pathsmith::heuristics::{Heuristic, HeuristicKind};
use pathsmith::io::{export_scen, load_move_file, load_scenario};
use pathsmith::module::{ModuleData, ModulePropertySet};
use pathsmith::moves::{MoveCatalog, MoveTemplate, PropertyFunctionRegistry};
use pathsmith::search::{find_path_with_sink, SearchKind};

#[derive(Parser)]
#[command(name = "pathsmith")]
#[command(about = "Plan a reconfiguration path between two modular-robot lattice states")]
struct Cli {
    /// Scenario JSON describing the starting configuration.
    #[arg(long, short = 'I')]
    initial_file: PathBuf,

    /// Scenario JSON describing the goal configuration.
    #[arg(long, short = 'F')]
    final_file: PathBuf,

    /// Folder of move-definition JSON files to load.
    #[arg(long, short = 'm')]
    moves_folder: PathBuf,

    /// Write the resolved path as a `.scen` visualizer document.
    #[arg(long, short = 'e')]
    export_file: Option<PathBuf>,

    /// Write a JSON summary of the search (expansion count, path length).
    #[arg(long, short = 'a')]
    analysis_file: Option<PathBuf>,

    /// BFS | BDBFS | A* | BDA*
    #[arg(long, short = 's', default_value = "A*")]
    search_method: String,

    /// MRSH-1 | SymDiff | Manhattan | Chebyshev | "Nearest Chebyshev"
    #[arg(long, short = 'h', default_value = "MRSH-1")]
    heuristic: String,

    /// cube | rd
    #[arg(long, short = 'c', default_value = "cube")]
    edge_check: String,

    /// Strip color properties before matching the goal.
    #[arg(long, short = 'i')]
    ignore_colors: bool,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => Ok(()),
        Err(e) if e.downcast_ref::<SearchError>().is_some() => {
            tracing::error!(error = %e, "search did not reach the goal");
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let search_kind = parse_search_kind(&cli.search_method)?;
    let heuristic_kind = parse_heuristic_kind(&cli.heuristic)?;
    let rd_edgecheck = match cli.edge_check.as_str() {
        "cube" => false,
        "rd" => true,
        other => bail!("unknown --edge-check '{other}', expected cube|rd"),
    };

    let mut initial = load_scenario(&cli.initial_file).map_err(wrap_scenario_error)?;
    let goal_scenario = load_scenario(&cli.final_file).map_err(wrap_scenario_error)?;
    // The initial and final files are loaded (and boundary-padded) independently;
    // re-express the goal snapshot in the initial lattice's coordinate frame before
    // it's used for matching or heuristic construction.
    let frame_delta = initial.lattice.boundary_size() - goal_scenario.lattice.boundary_size();
    let mut goal = shift_modules(&goal_scenario.modules, frame_delta);

    initial.lattice.set_ignore_properties(cli.ignore_colors);
    if cli.ignore_colors {
        initial.modules = strip_color(&initial.modules);
        goal = strip_color(&goal);
    }

    let templates = load_moves_folder(&cli.moves_folder)?;
    let catalog = MoveCatalog::from_templates(&templates);
    let funcs = PropertyFunctionRegistry::with_builtins();
    let flags = SearchFlags { rd_edgecheck, ..SearchFlags::default() };

    let heuristic = matches!(search_kind, SearchKind::AStar | SearchKind::BDAStar)
        .then(|| Heuristic::build(heuristic_kind, &mut initial.lattice, &catalog, &goal, &flags));
    let heuristic_to_start = matches!(search_kind, SearchKind::BDAStar)
        .then(|| Heuristic::build(heuristic_kind, &mut initial.lattice, &catalog, &initial.modules, &flags));

    let mut sink = TracingSink;
    let outcome = find_path_with_sink(
        search_kind,
        &mut initial.lattice,
        &catalog,
        &funcs,
        &flags,
        heuristic.as_ref(),
        heuristic_to_start.as_ref(),
        initial.modules.clone(),
        goal.clone(),
        &mut sink,
    )
    .map_err(anyhow::Error::from)
    .context("search")?;

    tracing::info!(path_length = outcome.path.len(), expanded = outcome.expanded, "search finished");
    if flags.print_path {
        for (step, state) in outcome.path.iter().enumerate() {
            tracing::info!(step, ?state, "path step");
        }
    }

    if let Some(export_path) = &cli.export_file {
        fs::write(export_path, export_scen(&outcome.path))
            .with_context(|| format!("writing {}", export_path.display()))?;
    }

    if let Some(analysis_path) = &cli.analysis_file {
        let mut summary = serde_json::json!({
            "expanded": outcome.expanded,
            "path_length": outcome.path.len(),
        });
        if flags.generate_final_state {
            let final_state = outcome.path.last().expect("a search outcome's path always has at least the start state");
            summary["final_state"] = coords_json(final_state.as_slice());
        }
        fs::write(analysis_path, serde_json::to_vec_pretty(&summary)?)
            .with_context(|| format!("writing {}", analysis_path.display()))?;
    }

    if flags.output_json {
        let path_json: Vec<_> = outcome.path.iter().map(|state| coords_json(state)).collect();
        println!("{}", serde_json::to_string_pretty(&path_json)?);
    }

    Ok(())
}

fn load_moves_folder(folder: &std::path::Path) -> Result<Vec<MoveTemplate>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(folder)
        .with_context(|| format!("reading moves folder {}", folder.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    let mut templates = Vec::new();
    for path in entries {
        templates.extend(load_move_file(&path).map_err(wrap_scenario_error)?);
    }
    Ok(templates)
}

/// Rebuilds each module's property set without its `color` entry, so
/// `--ignore-colors` affects goal matching the same way
/// `Lattice::set_ignore_properties` already affects move legality checks
/// (`moves/check.rs`).
fn strip_color(state: &[ModuleData]) -> Vec<ModuleData> {
    state
        .iter()
        .map(|m| match m {
            ModuleData::Full { coords, properties } => {
                let mut kept = ModulePropertySet::new();
                for p in properties.iter().filter(|p| p.key() != "color") {
                    kept.insert(p.clone());
                }
                ModuleData::full(coords.clone(), kept)
            }
            compact @ ModuleData::Compact { .. } => compact.clone(),
        })
        .collect()
}

/// Shift every module's coordinates by `delta` on every axis. Used to
/// reconcile the independent boundary padding `io::load_scenario` applies to
/// the initial and final scenario files.
fn shift_modules(modules: &[ModuleData], delta: i32) -> Vec<ModuleData> {
    modules
        .iter()
        .map(|m| {
            let shifted: Vec<i32> = m.coords().iter().map(|c| c + delta).collect();
            let properties = m.properties_full().cloned().unwrap_or_default();
            ModuleData::full(shifted, properties)
        })
        .collect()
}

fn parse_search_kind(s: &str) -> Result<SearchKind> {
    Ok(match s {
        "BFS" => SearchKind::Bfs,
        "BDBFS" => SearchKind::BiDirectionalBfs,
        "A*" => SearchKind::AStar,
        "BDA*" => SearchKind::BDAStar,
        other => bail!("unknown --search-method '{other}', expected BFS|BDBFS|A*|BDA*"),
    })
}

fn parse_heuristic_kind(s: &str) -> Result<HeuristicKind> {
    Ok(match s {
        "MRSH-1" => HeuristicKind::Mrsh1,
        "SymDiff" => HeuristicKind::SymDiff,
        "Manhattan" => HeuristicKind::ManhattanDistance,
        "Chebyshev" => HeuristicKind::ChebyshevDistanceLegacy,
        "Nearest Chebyshev" => HeuristicKind::TrueChebyshevDistance,
        other => bail!("unknown --heuristic '{other}'"),
    })
}

fn wrap_scenario_error(e: ScenarioError) -> anyhow::Error {
    anyhow::Error::from(e)
}

/// `ModuleData` carries a `Box<dyn PropertyOps>` variant and has no general
/// `Serialize` impl; analysis/`--output-json` output only needs coordinates.
fn coords_json(state: &[ModuleData]) -> serde_json::Value {
    serde_json::Value::Array(state.iter().map(|m| serde_json::json!(m.coords())).collect())
}

/// Logs search progress through `tracing` rather than a bespoke progress bar,
/// matching the teacher CLI's observability stance.
struct TracingSink;

impl ProgressSink for TracingSink {
    fn depth_changed(&mut self, depth: usize, estimated_total: Option<usize>) {
        tracing::debug!(depth, estimated_total, "frontier depth advanced");
    }

    fn expansion_snapshot(&mut self, found: bool, expanded: usize, unexpanded: usize) {
        tracing::trace!(found, expanded, unexpanded, "configuration expanded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsmith::module::{ColorProperty, ModuleProperty, OrientationProperty};
    use std::fs;

    #[test]
    fn parses_every_named_search_method() {
        assert!(matches!(parse_search_kind("BFS").unwrap(), SearchKind::Bfs));
        assert!(matches!(parse_search_kind("BDBFS").unwrap(), SearchKind::BiDirectionalBfs));
        assert!(matches!(parse_search_kind("A*").unwrap(), SearchKind::AStar));
        assert!(matches!(parse_search_kind("BDA*").unwrap(), SearchKind::BDAStar));
        assert!(parse_search_kind("dijkstra").is_err());
    }

    #[test]
    fn parses_every_named_heuristic() {
        assert!(matches!(parse_heuristic_kind("MRSH-1").unwrap(), HeuristicKind::Mrsh1));
        assert!(matches!(parse_heuristic_kind("SymDiff").unwrap(), HeuristicKind::SymDiff));
        assert!(matches!(parse_heuristic_kind("Manhattan").unwrap(), HeuristicKind::ManhattanDistance));
        assert!(matches!(parse_heuristic_kind("Chebyshev").unwrap(), HeuristicKind::ChebyshevDistanceLegacy));
        assert!(matches!(
            parse_heuristic_kind("Nearest Chebyshev").unwrap(),
            HeuristicKind::TrueChebyshevDistance
        ));
        assert!(parse_heuristic_kind("euclidean").is_err());
    }

    #[test]
    fn strip_color_drops_only_the_color_property() {
        let mut properties = ModulePropertySet::new();
        properties.insert(ModuleProperty::Color(ColorProperty::new([1, 2, 3])));
        properties.insert(ModuleProperty::Orientation(OrientationProperty::new(0, false)));
        let module = ModuleData::full(vec![0, 0], properties);

        let stripped = strip_color(std::slice::from_ref(&module));
        let kept = stripped[0].properties_full().unwrap();
        assert!(kept.find("color").is_none());
        assert!(kept.find("orientation").is_some());
    }

    #[test]
    fn shift_modules_translates_every_axis() {
        let module = ModuleData::full(vec![2, 5], ModulePropertySet::new());
        let shifted = shift_modules(std::slice::from_ref(&module), -2);
        assert_eq!(shifted[0].coords(), vec![0, 3]);
    }

    #[test]
    fn coords_json_emits_one_array_per_module() {
        let state = vec![
            ModuleData::full(vec![0, 0], ModulePropertySet::new()),
            ModuleData::full(vec![1, 2], ModulePropertySet::new()),
        ];
        let value = coords_json(&state);
        assert_eq!(value, serde_json::json!([[0, 0], [1, 2]]));
    }

    #[test]
    fn load_moves_folder_combines_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("01_first.json"),
            r#"{"moves": [{"name": "first", "order": 2, "def": ["x!", "?#"]}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("02_second.json"),
            r#"{"moves": [{"name": "second", "order": 2, "def": ["x!", "?#"]}]}"#,
        )
        .unwrap();

        let templates = load_moves_folder(dir.path()).unwrap();
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
