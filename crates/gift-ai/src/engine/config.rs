use std::time::Duration;

/// Engine tunables. The semantic thresholds are heuristics, not behavioral
/// contracts; tests pin their relationships (relaxed ≤ strict) rather than
/// the exact values.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Blend weight for normalized explicit evidence. Biased above the
    /// semantic weight: a literal preference hit is a stronger signal than
    /// embedding similarity.
    pub explicit_weight: f64,
    /// Blend weight for semantic similarity.
    pub semantic_weight: f64,
    /// Per-tag weight when a loved tag hits a declared attribute.
    pub attribute_weight: f64,
    /// Per-tag weight when a loved tag hits only name/description text.
    pub text_weight: f64,
    /// Multiplier applied to hits from tags outside the closed vocabulary.
    pub unverified_tag_factor: f64,
    /// Initial cosine-similarity bar; similarity must exceed it, equality is
    /// not a match.
    pub semantic_threshold: f64,
    /// Bar after the single relaxation step, exceeded the same way.
    pub relaxed_threshold: f64,
    /// Relax when fewer than this many candidates clear the initial bar.
    pub min_semantic_matches: usize,
    /// Per-attempt timeout for collaborator calls.
    pub call_timeout: Duration,
    /// Pause before the single retry of a failed collaborator call.
    pub retry_backoff: Duration,
    /// Upper bound on one whole recommendation request, retries and
    /// explanation calls included.
    pub request_deadline: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            explicit_weight: 0.7,
            semantic_weight: 0.3,
            attribute_weight: 1.0,
            text_weight: 0.8,
            unverified_tag_factor: 0.5,
            semantic_threshold: 0.8,
            relaxed_threshold: 0.7,
            min_semantic_matches: 3,
            call_timeout: Duration::from_secs(10),
            retry_backoff: Duration::from_millis(250),
            request_deadline: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    pub fn with_collaborator_timing(mut self, timeout: Duration, backoff: Duration) -> Self {
        self.call_timeout = timeout;
        self.retry_backoff = backoff;
        self
    }

    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }
}
