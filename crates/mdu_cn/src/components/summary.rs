//! Closed-state summary policy
//!
//! With nothing selected the placeholder is shown. Otherwise one removable
//! tag per selected option, in option order, up to `max_visible_tags`, then a
//! single `+N` counter for the rest. `max_visible_tags == 0` collapses every
//! selection into the counter.

use super::checkbox_dropdown::DropdownOption;

/// One element of the closed-state summary
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryItem {
    /// Shown when nothing is selected
    Placeholder(String),
    /// A removable tag for one selected option
    Tag { value: String, label: String },
    /// Number of selected options without their own tag
    Counter { hidden: usize },
}

impl SummaryItem {
    /// Display text
    pub fn text(&self) -> String {
        match self {
            SummaryItem::Placeholder(text) => text.clone(),
            SummaryItem::Tag { label, .. } => label.clone(),
            SummaryItem::Counter { hidden } => format!("+{hidden}"),
        }
    }

    /// Whether this item has an inline remove affordance
    pub fn is_removable(&self) -> bool {
        matches!(self, SummaryItem::Tag { .. })
    }
}

/// Build the summary for `selected`, which must already be in option order.
pub fn summarize(
    selected: &[&DropdownOption],
    placeholder: &str,
    max_visible_tags: usize,
) -> Vec<SummaryItem> {
    if selected.is_empty() {
        return vec![SummaryItem::Placeholder(placeholder.to_string())];
    }

    let mut items: Vec<SummaryItem> = selected
        .iter()
        .take(max_visible_tags)
        .map(|o| SummaryItem::Tag {
            value: o.value.clone(),
            label: o.label.clone(),
        })
        .collect();

    let hidden = selected.len().saturating_sub(max_visible_tags);
    if hidden > 0 {
        items.push(SummaryItem::Counter { hidden });
    }
    items
}
