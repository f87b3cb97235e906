//! Command-line surface: a single entry point, not a subcommand tree — the
//! underlying tool answers one question ("what should I record?") with a
//! handful of flags controlling target selection, not a family of verbs.

use clap::Parser;
use std::path::PathBuf;

/// Select a minimum-cost instruction recording set from a symbolic
/// execution constraint graph.
#[derive(Parser, Debug)]
#[command(name = "er-analyze", version, about, long_about = None)]
pub struct Cli {
    /// Path to the input constraint graph (JSON).
    pub graph_json: PathBuf,

    /// Pre-selected kinsts to seed the recording set with (comma-separated).
    pub preselected_kinsts: Option<String>,

    /// Skip auto-selection of `Category=Q` vertices as targets.
    #[arg(long)]
    pub ignore_evaluation: bool,

    /// Additional target kinsts (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub evalinst: Vec<String>,

    /// Additional target vertex ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub evalnid: Vec<String>,

    /// Array names whose symbolic index accesses must be concretized.
    #[arg(long = "recordUN", value_delimiter = ',')]
    pub record_un: Vec<String>,

    /// Minimum indirect depth for update-list targets.
    #[arg(long = "indep-thres", default_value_t = 0)]
    pub indep_thres: u32,

    /// Write the chosen kinst list, one per line, to this path.
    #[arg(long = "datarec-out")]
    pub datarec_out: Option<PathBuf>,

    /// File of additional graph paths for cross-graph recursive optimization
    /// of the `--recordUNCFG` seed kinst set.
    #[arg(long = "UN-constraints")]
    pub un_constraints: Option<PathBuf>,

    /// Seed kinst set for `--UN-constraints` (comma-separated).
    #[arg(long = "recordUNCFG", value_delimiter = ',')]
    pub record_un_cfg: Vec<String>,

    /// Print the array-ranking report and exit without computing a plan.
    #[arg(long = "getUN")]
    pub get_un: bool,

    /// Disable the 8-byte minimum record unit.
    #[arg(long)]
    pub noptwrite: bool,
}
