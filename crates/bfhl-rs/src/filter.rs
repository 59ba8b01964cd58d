//! Display filters over an [`ApiResult`](crate::ApiResult).
//!
//! The set of filters is fixed: [`FilterOption::ALL`] lists them in display
//! order. [`SelectedFilters`] remembers which ones the user has switched on,
//! in the order they were switched on (that order drives chip rendering).
//! [`render`] is the pure derivation from result × selection to display lines.

use serde::{Deserialize, Serialize};

use crate::ApiResult;

/// One of the three fixed response categories that can be shown or hidden.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterOption {
    Numbers,
    HighestLowercaseAlphabet,
    Alphabets,
}

impl FilterOption {
    /// All options, in the fixed display order used for rendered lines and
    /// the checkbox list.
    pub const ALL: [FilterOption; 3] = [
        FilterOption::Numbers,
        FilterOption::HighestLowercaseAlphabet,
        FilterOption::Alphabets,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FilterOption::Numbers => "Numbers",
            FilterOption::HighestLowercaseAlphabet => "Highest Lowercase Alphabet",
            FilterOption::Alphabets => "Alphabets",
        }
    }

    /// Name used in config files, CLI flags and JSON payloads.
    pub fn wire_name(self) -> &'static str {
        match self {
            FilterOption::Numbers => "numbers",
            FilterOption::HighestLowercaseAlphabet => "highest_lowercase_alphabet",
            FilterOption::Alphabets => "alphabets",
        }
    }

    /// Separator placed between values of this category.
    fn separator(self) -> &'static str {
        match self {
            FilterOption::Numbers | FilterOption::Alphabets => ", ",
            FilterOption::HighestLowercaseAlphabet => "",
        }
    }

    /// The values of this category in a result.
    fn values(self, result: &ApiResult) -> &[String] {
        match self {
            FilterOption::Numbers => &result.numbers,
            FilterOption::HighestLowercaseAlphabet => &result.highest_lowercase_alphabet,
            FilterOption::Alphabets => &result.alphabets,
        }
    }

    /// Format this category's line for a result, e.g. `"Numbers: 1, 2"`.
    pub fn format_line(self, result: &ApiResult) -> String {
        format!(
            "{}: {}",
            self.label(),
            self.values(result).join(self.separator())
        )
    }
}

impl std::fmt::Display for FilterOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for FilterOption {
    type Err = String;

    /// Accepts the wire name or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        FilterOption::ALL
            .into_iter()
            .find(|f| {
                f.wire_name().eq_ignore_ascii_case(needle) || f.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let names: Vec<&str> = FilterOption::ALL.iter().map(|f| f.wire_name()).collect();
                format!("unknown filter '{needle}' (expected one of: {})", names.join(", "))
            })
    }
}

/// The user's active filters, kept in insertion order without duplicates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct SelectedFilters(Vec<FilterOption>);

impl SelectedFilters {
    /// An empty selection.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Every option selected, in display order.
    pub fn all() -> Self {
        Self(FilterOption::ALL.to_vec())
    }

    /// Build a selection from an iterator, dropping repeats.
    pub fn from_options(options: impl IntoIterator<Item = FilterOption>) -> Self {
        let mut selected = Self::none();
        for option in options {
            if !selected.contains(option) {
                selected.0.push(option);
            }
        }
        selected
    }

    pub fn contains(&self, option: FilterOption) -> bool {
        self.0.contains(&option)
    }

    /// Flip membership of `option`. Returns `true` if it is now selected.
    ///
    /// Newly selected options go to the end of the insertion order.
    pub fn toggle(&mut self, option: FilterOption) -> bool {
        if let Some(idx) = self.0.iter().position(|f| *f == option) {
            self.0.remove(idx);
            false
        } else {
            self.0.push(option);
            true
        }
    }

    /// Selected options in insertion order (chip order).
    pub fn iter(&self) -> impl Iterator<Item = FilterOption> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SelectedFilters {
    fn default() -> Self {
        Self(vec![
            FilterOption::Numbers,
            FilterOption::HighestLowercaseAlphabet,
        ])
    }
}

/// Derive the filtered display lines for a result.
///
/// Lines follow [`FilterOption::ALL`] order regardless of selection order.
/// Returns nothing when there is no result.
pub fn render(result: Option<&ApiResult>, selected: &SelectedFilters) -> Vec<String> {
    let Some(result) = result else {
        return Vec::new();
    };
    FilterOption::ALL
        .into_iter()
        .filter(|f| selected.contains(*f))
        .map(|f| f.format_line(result))
        .collect()
}
