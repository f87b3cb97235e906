//! # er-analyze
//!
//! CLI shell around `er-core`: loads a constraint graph from JSON, selects
//! analysis targets from the command line, and prints (or writes) the
//! chosen instruction recording set.

use clap::Parser;
use er_analyze::cli::Cli;
use er_analyze::error::CliError;
use er_analyze::{loader, report};
use er_core::types::{Category, KInst, VertexId};
use er_core::{recursive_optimize, update_list_targets, Config, GraphStore};
use std::collections::BTreeSet;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let log_format = std::env::var("ER_ANALYZE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "er_analyze=info,er_core=info".into());

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let graph = loader::load(&cli.graph_json)?;

    if cli.get_un {
        report::print_array_ranking(&graph);
        return Ok(());
    }

    let config = Config {
        ptwrite: !cli.noptwrite,
        ..Config::default()
    };

    let mut targets = collect_targets(&graph, cli)?;

    let mut preselected = BTreeSet::new();
    if let Some(csv) = &cli.preselected_kinsts {
        for raw in csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(kinst) = KInst::parse(raw) {
                if let Some(nodes) = graph.kinst_index().nodes_of(&kinst) {
                    targets.extend(nodes.iter().cloned());
                }
                preselected.insert(kinst);
            }
        }
    }

    if !cli.record_un.is_empty() {
        let names: BTreeSet<String> = cli.record_un.iter().cloned().collect();
        targets.extend(update_list_targets(&graph, &names, cli.indep_thres));
    }

    let mut chosen = recursive_optimize(&graph, &targets, config);
    chosen.extend(preselected);

    if !cli.record_un_cfg.is_empty() {
        let seed: BTreeSet<KInst> = cli.record_un_cfg.iter().filter_map(|s| KInst::parse(s)).collect();
        chosen.extend(cross_graph_optimize(cli.un_constraints.as_deref(), &seed, config)?);
    }

    report::print_ranked_report(&graph, &config)?;
    report::print_plan(&chosen);

    if let Some(out) = &cli.datarec_out {
        report::write_datarec_cfg(out, &chosen)?;
    }

    Ok(())
}

/// Targets come from `Category::Query` auto-selection (unless disabled),
/// explicit `--evalinst` kinsts, and explicit `--evalnid` vertex ids.
fn collect_targets(graph: &GraphStore, cli: &Cli) -> Result<BTreeSet<VertexId>, CliError> {
    let mut targets = BTreeSet::new();

    if !cli.ignore_evaluation {
        targets.extend(
            graph
                .vertices()
                .values()
                .filter(|v| v.category == Category::Query)
                .map(|v| v.id.clone()),
        );
    }

    for raw in &cli.evalinst {
        if let Some(kinst) = KInst::parse(raw) {
            if let Some(nodes) = graph.kinst_index().nodes_of(&kinst) {
                targets.extend(nodes.iter().cloned());
            }
        }
    }

    for raw in &cli.evalnid {
        let id = VertexId::new(raw.as_str());
        if !graph.contains(&id) {
            return Err(CliError::UnknownTarget(id));
        }
        targets.insert(id);
    }

    Ok(targets)
}

/// `--UN-constraints`/`--recordUNCFG`: re-run the optimizer over every
/// listed graph (one path per line) against whichever `seed` kinsts appear
/// in it, unioning the resulting recording sets.
fn cross_graph_optimize(
    list_path: Option<&Path>,
    seed: &BTreeSet<KInst>,
    config: Config,
) -> Result<BTreeSet<KInst>, CliError> {
    let Some(list_path) = list_path else {
        return Ok(BTreeSet::new());
    };

    let contents = std::fs::read_to_string(list_path).map_err(|source| CliError::Io {
        path: list_path.to_path_buf(),
        source,
    })?;

    let mut result = BTreeSet::new();
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let other = loader::load(Path::new(line))?;
        let targets: BTreeSet<VertexId> = seed
            .iter()
            .filter_map(|k| other.kinst_index().nodes_of(k))
            .flat_map(|nodes| nodes.iter().cloned())
            .collect();
        if targets.is_empty() {
            continue;
        }
        result.extend(recursive_optimize(&other, &targets, config));
    }

    Ok(result)
}
