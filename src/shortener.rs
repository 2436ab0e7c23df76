//! Fitting a rendered policy into a character budget.
//!
//! The baseline rendering uses the caller's own `minimize`/`compact` choice.
//! When it is too long and auto-shortening was asked for, the shortener walks
//! [`SHORTEN_STAGES`] in order, never going back to a stage it has passed and
//! never switching off an option that is already on.

use tracing::{debug, info};

use crate::config::OutputOptions;
use crate::error::GeneratorError;
use crate::safe_minimizer::minimize_with_recovery;
use crate::traits::Minimizer;
use crate::types::PolicyDocument;

/// One way of rendering a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortenStage {
    pub minimize: bool,
    pub compact: bool,
}

impl ShortenStage {
    pub const fn new(minimize: bool, compact: bool) -> Self {
        ShortenStage { minimize, compact }
    }

    /// This stage with anything `floor` already switched on kept on.
    fn at_least(self, floor: ShortenStage) -> Self {
        ShortenStage {
            minimize: self.minimize || floor.minimize,
            compact: self.compact || floor.compact,
        }
    }
}

/// The escalation ladder, from longest to shortest rendering.
pub const SHORTEN_STAGES: [ShortenStage; 3] = [
    ShortenStage::new(false, false),
    ShortenStage::new(true, false),
    ShortenStage::new(true, true),
];

/// Renders one policy at different stages, minimizing at most once.
struct Renderer<'a> {
    policy: &'a PolicyDocument,
    minimizer: &'a dyn Minimizer,
    minimized: Option<PolicyDocument>,
}

impl Renderer<'_> {
    fn render(&mut self, stage: ShortenStage) -> Result<String, GeneratorError> {
        if stage.minimize && self.minimized.is_none() {
            self.minimized = Some(minimize_with_recovery(self.policy, self.minimizer)?);
        }
        let policy = match &self.minimized {
            Some(minimized) if stage.minimize => minimized,
            _ => self.policy,
        };
        policy.to_json(stage.compact)
    }
}

fn length(rendered: &str) -> usize {
    rendered.chars().count()
}

/// Render `policy` within `options.max_length` characters.
///
/// Without `auto_shorten`, the baseline rendering either fits or fails with
/// [`GeneratorError::PolicyTooLong`] reporting its length. With it, every
/// remaining stage is tried before failing with the last stage's length.
pub fn shorten(
    policy: &PolicyDocument,
    minimizer: &dyn Minimizer,
    options: &OutputOptions,
) -> Result<String, GeneratorError> {
    let mut renderer = Renderer {
        policy,
        minimizer,
        minimized: None,
    };

    let baseline = ShortenStage::new(options.minimize, options.compact);
    let mut stage = baseline;
    let mut cursor = 0;

    loop {
        let rendered = renderer.render(stage)?;
        let rendered_length = length(&rendered);

        debug!(
            event = "Shorten",
            phase = "Rendered",
            minimize = stage.minimize,
            compact = stage.compact,
            length = rendered_length,
            max_length = options.max_length
        );

        if rendered_length <= options.max_length {
            if stage != baseline {
                info!(
                    event = "Shorten",
                    phase = "Shortened",
                    minimize = stage.minimize,
                    compact = stage.compact,
                    length = rendered_length
                );
            }
            return Ok(rendered);
        }

        if !options.auto_shorten {
            return Err(GeneratorError::PolicyTooLong {
                length: rendered_length,
                max_length: options.max_length,
                auto_shortened: false,
            });
        }

        let next = SHORTEN_STAGES[cursor..]
            .iter()
            .position(|candidate| candidate.at_least(stage) != stage);

        match next {
            Some(offset) => {
                cursor += offset + 1;
                stage = SHORTEN_STAGES[cursor - 1].at_least(stage);
            }
            None => {
                return Err(GeneratorError::PolicyTooLong {
                    length: rendered_length,
                    max_length: options.max_length,
                    auto_shortened: true,
                });
            }
        }
    }
}
