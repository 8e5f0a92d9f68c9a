//! Genre multi-select and the row filter it drives.

use polars::prelude::*;
use std::collections::HashSet;

use crate::movies::{MovieTable, GENRE, MISSING_GENRE_LABEL};

/// Display label for a genre option
pub fn genre_label(genre: &Option<String>) -> &str {
    genre.as_deref().unwrap_or(MISSING_GENRE_LABEL)
}

/// The genre options of the current table and which of them are selected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenreSelection {
    options: Vec<Option<String>>,
    selected: Vec<bool>,
}

impl GenreSelection {
    /// Every option selected
    pub fn all(options: Vec<Option<String>>) -> Self {
        let selected = vec![true; options.len()];
        Self { options, selected }
    }

    /// Options from the table's distinct genres, all selected.
    pub fn from_table(table: &MovieTable) -> PolarsResult<Self> {
        Ok(Self::all(table.genres()?))
    }

    /// Restrict the selection to the named genres. Names match case-insensitively;
    /// names not present in the table are logged and ignored.
    pub fn only(&mut self, names: &[String]) {
        let wanted: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
        for name in &wanted {
            if !self
                .options
                .iter()
                .any(|o| genre_label(o).to_lowercase() == *name)
            {
                tracing::warn!(genre = %name, "requested genre not present in dataset");
            }
        }
        for (option, selected) in self.options.iter().zip(self.selected.iter_mut()) {
            *selected = wanted.contains(&genre_label(option).to_lowercase());
        }
    }

    pub fn options(&self) -> &[Option<String>] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(selected) = self.selected.get_mut(index) {
            *selected = !*selected;
        }
    }

    pub fn select_all(&mut self) {
        self.selected.iter_mut().for_each(|s| *s = true);
    }

    pub fn select_none(&mut self) {
        self.selected.iter_mut().for_each(|s| *s = false);
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    pub fn is_all_selected(&self) -> bool {
        self.selected.iter().all(|&s| s)
    }

    pub fn selected(&self) -> impl Iterator<Item = &Option<String>> {
        self.options
            .iter()
            .zip(&self.selected)
            .filter(|(_, s)| **s)
            .map(|(o, _)| o)
    }

    /// Labels of the selected options, in option order
    pub fn selected_labels(&self) -> Vec<String> {
        self.selected().map(|g| genre_label(g).to_string()).collect()
    }
}

/// Keep rows whose genre is selected, preserving row order.
pub fn filter_by_genres(frame: &DataFrame, selection: &GenreSelection) -> PolarsResult<DataFrame> {
    let keep: HashSet<Option<&str>> = selection.selected().map(|g| g.as_deref()).collect();
    let mask: BooleanChunked = frame
        .column(GENRE)?
        .str()?
        .into_iter()
        .map(|genre| keep.contains(&genre))
        .collect();
    frame.filter(&mask)
}
