//! Model identifiers and aggregator name resolution.
//!
//! The aggregator routes by vendor-prefixed identifiers, so canonical model
//! ids must be resolved before any request is built. The table is static and
//! total on its known keys; resolving anything else yields `None`, which
//! fails adapter construction instead of surfacing at request time.

/// Anthropic model constants.
pub mod anthropic {
    pub const CLAUDE_3_OPUS: &str = "claude-3-opus-20240229";
    pub const CLAUDE_3_5_SONNET: &str = "claude-3-5-sonnet-20240620";
}

/// Vendor-prefixed identifiers the aggregator routes.
pub mod routed {
    pub const CLAUDE_3_OPUS: &str = "anthropic/claude-3-opus";
    pub const CLAUDE_3_5_SONNET: &str = "anthropic/claude-3.5-sonnet";
}

/// Canonical (or already-prefixed) identifier → aggregator identifier.
/// Prefixed identifiers map to themselves so callers may pass either form.
const ROUTED_MODELS: &[(&str, &str)] = &[
    (anthropic::CLAUDE_3_OPUS, routed::CLAUDE_3_OPUS),
    (routed::CLAUDE_3_OPUS, routed::CLAUDE_3_OPUS),
    (routed::CLAUDE_3_5_SONNET, routed::CLAUDE_3_5_SONNET),
    (anthropic::CLAUDE_3_5_SONNET, routed::CLAUDE_3_5_SONNET),
];

/// Resolve a model identifier to the aggregator's vendor-prefixed form.
///
/// Returns `None` for identifiers outside the table; there is deliberately
/// no default.
pub fn resolve_routed_model(model: &str) -> Option<&'static str> {
    ROUTED_MODELS
        .iter()
        .find(|(canonical, _)| *canonical == model)
        .map(|(_, routed)| *routed)
}
