//! Analysis knobs shared by the concretization engine and the optimizer.

/// Tunables threaded through recordable-instruction scoring and the
/// recursive optimizer.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Whether a kinst that labels a pointer-valued vertex may still be
    /// chosen for recording. The optimizer always runs a
    /// pointer-disallowed pass before a pointer-allowed one regardless of
    /// this flag; this controls the one-shot entry points
    /// (`ConcretizationEngine`, `MustConcretize`) directly.
    pub allow_pointer: bool,
    /// `true`: every recorded kinst costs a flat 8-byte PT-write minimum
    /// unit (`freq * 8`), matching the `--noptwrite`-absent default.
    /// `false`: cost is `freq * width / 8`, the natural byte width.
    pub ptwrite: bool,
    /// Whether to compute the (expensive) `remain_score`/`max_idep`
    /// subgraph-scoring fields on every `RecordableInst`.
    pub subgraph_scoring: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_pointer: true,
            ptwrite: true,
            subgraph_scoring: true,
        }
    }
}
