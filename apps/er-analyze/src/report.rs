//! Stdout report formatting and the `datarec.cfg` writer.

use crate::error::CliError;
use er_core::rank::{
    sort_by_coverage_score, sort_by_coverage_score_freq, sort_by_node_reduction, sort_by_node_reduction_per_byte,
    sort_worst_first,
};
use er_core::types::{EdgeWeight, KInst, VertexKind};
use er_core::{analyze_recordable, Config, GraphStore, RecordableInst};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

type Heuristic = (&'static str, fn(&mut [Vec<RecordableInst<'_>>]));

const HEURISTICS: &[Heuristic] = &[
    ("coverage_score", sort_by_coverage_score),
    ("coverage_score_freq", sort_by_coverage_score_freq),
    ("node_reduction", sort_by_node_reduction),
    ("node_reduction_per_byte", sort_by_node_reduction_per_byte),
    ("worst_first", sort_worst_first),
];

/// Print one block per heuristic in `HEURISTICS`, naming the kinst each
/// heuristic would record next given an empty starting selection.
pub fn print_ranked_report(graph: &GraphStore, config: &Config) -> Result<(), CliError> {
    let mut plans = analyze_recordable(graph, config, &[])?;
    if plans.is_empty() {
        println!("no recordable instructions in this graph");
        return Ok(());
    }

    for (name, sort_fn) in HEURISTICS {
        sort_fn(&mut plans);
        let Some(best) = plans[0].last() else {
            continue;
        };
        println!(
            "[{name}] kinst={} record_size={} node_reduction={} coverage_score={:.3}",
            best.kinst, best.record_size, best.node_reduction, best.coverage_score
        );
    }
    Ok(())
}

/// Write the chosen recording plan, one kinst per line.
pub fn write_datarec_cfg(path: &Path, kinsts: &BTreeSet<KInst>) -> Result<(), CliError> {
    let mut out = String::new();
    for kinst in kinsts {
        out.push_str(kinst.as_str());
        out.push('\n');
    }
    std::fs::write(path, out).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Print the chosen recording plan to stdout, one kinst per line.
pub fn print_plan(kinsts: &BTreeSet<KInst>) {
    let mut stdout = std::io::stdout().lock();
    for kinst in kinsts {
        let _ = writeln!(stdout, "{kinst}");
    }
}

/// `--getUN`: for every array name reachable as an `UpdateNode`/`Read`
/// vertex's `root`, print the number of indirect (`1.5`-weight) successor
/// edges and their indirect-depth range, sorted by count descending.
pub fn print_array_ranking(graph: &GraphStore) {
    let mut counts: std::collections::BTreeMap<String, (usize, u32, u32)> = std::collections::BTreeMap::new();

    for (id, vertex) in graph.vertices() {
        if !matches!(vertex.kind, VertexKind::UpdateNode | VertexKind::Read) {
            continue;
        }
        let Some(root) = vertex.root_name() else { continue };

        for edge in graph.outgoing(id) {
            if edge.weight != EdgeWeight::Indirect {
                continue;
            }
            let idep = graph.idep_of(&edge.to);
            let entry = counts.entry(root.to_string()).or_insert((0, idep, idep));
            entry.0 += 1;
            entry.1 = entry.1.min(idep);
            entry.2 = entry.2.max(idep);
        }
    }

    let mut rows: Vec<(String, usize, u32, u32)> = counts.into_iter().map(|(name, (n, lo, hi))| (name, n, lo, hi)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (name, count, lo, hi) in rows {
        println!("{name}: {count} indirect accesses, idep range [{lo}, {hi}]");
    }
}
