//! Maps user color specifications onto the entities of a draw call.

/// A single color for everything, or a list mapped onto entities by a [`ColorMapStrategy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    Single(String),
    List(Vec<String>),
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Single("#ff0000".to_string())
    }
}

impl From<&str> for ColorSpec {
    fn from(value: &str) -> Self {
        ColorSpec::Single(value.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(value: String) -> Self {
        ColorSpec::Single(value)
    }
}

impl From<Vec<String>> for ColorSpec {
    fn from(value: Vec<String>) -> Self {
        ColorSpec::List(value)
    }
}

impl<const N: usize> From<[&str; N]> for ColorSpec {
    fn from(value: [&str; N]) -> Self {
        ColorSpec::List(value.iter().map(|c| c.to_string()).collect())
    }
}

/// How a list of `k` colors is spread over `n` entities when `k != n`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ColorMapStrategy {
    /// Every entity uses the first color
    FirstColorForAll,
    /// Colors are assigned positionally, the last color covers the remaining entities
    #[default]
    LastColorRemainder,
    /// Colors repeat from the start once exhausted
    RepeatColors,
    /// Colors bounce back and forth through the list: `a b c b a b c ..`
    ReversedColors,
}

impl ColorMapStrategy {
    fn pick(&self, entity: usize, color_count: usize) -> usize {
        debug_assert!(color_count > 0);
        match self {
            ColorMapStrategy::FirstColorForAll => 0,
            ColorMapStrategy::LastColorRemainder => entity.min(color_count - 1),
            ColorMapStrategy::RepeatColors => entity % color_count,
            ColorMapStrategy::ReversedColors => {
                if color_count == 1 {
                    return 0;
                }
                let period = 2 * (color_count - 1);
                let phase = entity % period;
                if phase < color_count {
                    phase
                } else {
                    period - phase
                }
            }
        }
    }
}

/// Resolves `spec` into exactly `count` colors.
///
/// An empty list falls back to `fallback` for every entity. A list that already matches
/// `count` maps one to one regardless of the strategy.
pub fn resolve(
    spec: &ColorSpec,
    count: usize,
    strategy: ColorMapStrategy,
    fallback: &str,
) -> Vec<String> {
    match spec {
        ColorSpec::Single(color) => vec![color.clone(); count],
        ColorSpec::List(colors) if colors.is_empty() => vec![fallback.to_string(); count],
        ColorSpec::List(colors) if colors.len() == count => colors.clone(),
        ColorSpec::List(colors) => (0..count)
            .map(|entity| colors[strategy.pick(entity, colors.len())].clone())
            .collect(),
    }
}

/// Overrides resolved colors with colors baked into kernel output, entity by entity.
pub fn apply_baked(resolved: &mut [String], baked: &[Option<String>]) {
    for (color, baked) in resolved.iter_mut().zip(baked) {
        if let Some(baked) = baked {
            color.clone_from(baked);
        }
    }
}
