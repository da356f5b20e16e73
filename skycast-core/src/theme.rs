use serde::{Deserialize, Serialize};

/// Visual category for the current weather. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Clear,
    Clouds,
    Rain,
    Snow,
    Storm,
    Night,
    #[default]
    Default,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Clear => "clear",
            Theme::Clouds => "clouds",
            Theme::Rain => "rain",
            Theme::Snow => "snow",
            Theme::Storm => "storm",
            Theme::Night => "night",
            Theme::Default => "default",
        }
    }

    /// Terminal glyph shown next to the headline.
    pub fn glyph(&self) -> &'static str {
        match self {
            Theme::Clear => "☀",
            Theme::Clouds => "☁",
            Theme::Rain => "☂",
            Theme::Snow => "❄",
            Theme::Storm => "⚡",
            Theme::Night => "☾",
            Theme::Default => "⛅",
        }
    }

    pub const fn all() -> &'static [Theme] {
        &[
            Theme::Clear,
            Theme::Clouds,
            Theme::Rain,
            Theme::Snow,
            Theme::Storm,
            Theme::Night,
            Theme::Default,
        ]
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a free-text condition label and day flag to a theme.
///
/// First match wins: night overrides any condition text, then the label is
/// searched case-insensitively for "clear", "rain", "cloud", "snow" and
/// "storm" in that order. "clear" is checked before "cloud" so a label like
/// "clear and cloudy" resolves to [`Theme::Clear`].
pub fn resolve(condition: &str, is_day: bool) -> Theme {
    if !is_day {
        return Theme::Night;
    }

    let cond = condition.to_lowercase();
    const RULES: [(&str, Theme); 5] = [
        ("clear", Theme::Clear),
        ("rain", Theme::Rain),
        ("cloud", Theme::Clouds),
        ("snow", Theme::Snow),
        ("storm", Theme::Storm),
    ];

    RULES
        .iter()
        .find(|(needle, _)| cond.contains(needle))
        .map(|(_, theme)| *theme)
        .unwrap_or(Theme::Default)
}
