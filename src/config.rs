use serde::Deserialize;

/// AWS's character ceiling for managed policies.
pub const DEFAULT_MAX_LENGTH: usize = 6144;

/// How an assembled policy is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub max_length: usize,
    /// Escalate through minimization and compaction until the policy fits.
    pub auto_shorten: bool,
    pub minimize: bool,
    pub compact: bool,
    /// Replace wildcard actions with the concrete actions they cover.
    pub no_wildcards: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions {
            max_length: DEFAULT_MAX_LENGTH,
            auto_shorten: false,
            minimize: false,
            compact: false,
            no_wildcards: false,
        }
    }
}

/// How requests are turned into actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// With a resource type, also grant the service's actions that take no resource.
    pub include_service_wide_actions: bool,
}
