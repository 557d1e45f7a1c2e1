//! The analysis core: one shared CFG per function, five passes over it.
//!
//! Per function the driver builds the control-flow graph once, computes
//! the semantic reachable set, and feeds both to every pass. The passes
//! only append diagnostics — none of them aborts on a defect, so a single
//! run reports everything it can find.

pub mod const_fold;
pub mod definite_assignment;
pub mod liveness;
pub mod reachability;
pub mod returns;
pub mod zero;

use crate::cfg::builder;
use crate::diagnostics::DiagnosticSink;
use crate::semantic::typed::Function;
use tracing::debug;

/// Run every core analysis over one function.
pub fn analyze_function(function: &Function, sink: &mut DiagnosticSink) {
    let cfg = builder::build(function);
    debug!(
        function = %function.name,
        blocks = cfg.len(),
        "built control-flow graph"
    );

    const_fold::report_overflows(function, sink);

    let reachable = reachability::reachable_blocks(&cfg);
    reachability::report_unreachable(&cfg, &reachable, sink);
    returns::check(&cfg, &reachable, function, sink);
    definite_assignment::check(&cfg, &reachable, function, sink);
    liveness::check(&cfg, &reachable, function, sink);
    zero::check(&cfg, &reachable, function, sink);

    debug!(function = %function.name, "analyses complete");
}
