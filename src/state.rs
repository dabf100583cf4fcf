use crate::config::ExplorerConfig;
use crate::data::filter::{Filters, GrantIndex, QueryResult, RangeInput};
use crate::data::model::{GrantDataset, Record};

// ---------------------------------------------------------------------------
// Explorer state
// ---------------------------------------------------------------------------

/// Which numeric range control an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    FiscalYear,
    Amount,
}

/// The explorer's state, independent of rendering.
///
/// The view is recomputed from `(dataset, filters, query)` after every
/// action; nothing else feeds into it.
pub struct ExplorerState {
    pub config: ExplorerConfig,

    /// Loaded dataset (None until artifacts are loaded).
    pub dataset: Option<GrantDataset>,

    index: Option<GrantIndex>,

    /// Per-column selections and numeric ranges.
    pub filters: Filters,

    /// Free-text search as typed.
    pub query: String,

    /// Records passing the current filters (cached).
    pub view: QueryResult,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new(ExplorerConfig::default())
    }
}

impl ExplorerState {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            dataset: None,
            index: None,
            filters: Filters::default(),
            query: String::new(),
            view: QueryResult::default(),
        }
    }

    /// Ingest a newly loaded dataset and clear every filter.
    pub fn set_dataset(&mut self, dataset: GrantDataset) {
        self.index = Some(GrantIndex::new(&dataset.records, &self.config));
        self.dataset = Some(dataset);
        self.reset();
    }

    /// Recompute `view` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(index) = &self.index {
            self.view = index.evaluate(&self.filters, &self.query);
        }
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_filter_value(&mut self, column: &str, value: &str) {
        self.filters.toggle(column, value);
        self.refilter();
    }

    /// Replace a column's selection.
    pub fn set_selection<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .selected
            .insert(column.to_string(), values.into_iter().map(Into::into).collect());
        self.refilter();
    }

    /// Deselect everything in a column (no constraint).
    pub fn clear_selection(&mut self, column: &str) {
        self.filters.selected.remove(column);
        self.refilter();
    }

    pub fn set_range(&mut self, kind: RangeKind, range: impl Into<RangeInput>) {
        *self.range_slot(kind) = Some(range.into());
        self.refilter();
    }

    pub fn clear_range(&mut self, kind: RangeKind) {
        *self.range_slot(kind) = None;
        self.refilter();
    }

    fn range_slot(&mut self, kind: RangeKind) -> &mut Option<RangeInput> {
        match kind {
            RangeKind::FiscalYear => &mut self.filters.fiscal_year,
            RangeKind::Amount => &mut self.filters.amount,
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Clear selections, ranges and the search in one step.
    pub fn reset(&mut self) {
        self.filters.reset();
        self.query.clear();
        self.refilter();
    }

    /// The records currently in view.
    pub fn visible_records(&self) -> Vec<&Record> {
        match &self.dataset {
            Some(ds) => self.view.records(&ds.records).collect(),
            None => Vec::new(),
        }
    }

    /// `"3 matches out of 120"`.
    pub fn summary_line(&self) -> String {
        let total = self.dataset.as_ref().map_or(0, GrantDataset::len);
        format!("{} matches out of {total}", self.view.count())
    }

    pub fn formatted_total(&self) -> String {
        self.view.formatted_total()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::filter::Range;
    use crate::data::model::CellValue;

    fn loaded() -> ExplorerState {
        let config = ExplorerConfig::default();
        let raw: Vec<Record> = vec![
            [
                ("Agency", CellValue::from("NIH")),
                ("Fiscal Year", "2012".into()),
                ("Amount", "$1,000".into()),
                ("Project Title", "Pediatric cancer trial".into()),
            ]
            .into_iter()
            .collect(),
            [
                ("Agency", CellValue::from("DoD")),
                ("Fiscal Year", "2016".into()),
                ("Amount", "$2,500".into()),
                ("Project Title", "Wearable device".into()),
            ]
            .into_iter()
            .collect(),
        ];
        let mut state = ExplorerState::new(config.clone());
        state.set_dataset(GrantDataset::from_raw(&raw, &config));
        state
    }

    #[test]
    fn loading_shows_everything() {
        let state = loaded();
        assert_eq!(state.summary_line(), "2 matches out of 2");
        assert_eq!(state.formatted_total(), "$3,500");
    }

    #[test]
    fn actions_recompute_the_view() {
        let mut state = loaded();
        state.toggle_filter_value("Agency", "dod");
        assert_eq!(state.view.indices, vec![1]);

        state.toggle_filter_value("Agency", "dod");
        assert_eq!(state.view.count(), 2);

        state.set_range(RangeKind::FiscalYear, Range::new(2010.0, 2012.0));
        assert_eq!(state.view.indices, vec![0]);
        state.clear_range(RangeKind::FiscalYear);

        state.set_query("CANCER");
        assert_eq!(state.visible_records()[0].text("Agency").as_deref(), Some("NIH"));
    }

    #[test]
    fn reset_matches_a_fresh_load() {
        let mut state = loaded();
        state.set_selection("Agency", ["NIH"]);
        state.set_range(RangeKind::Amount, (0.0, 10.0));
        state.set_query("device");
        assert_eq!(state.view.count(), 0);

        state.reset();
        assert_eq!(state.filters, Filters::default());
        assert_eq!(state.query, "");
        assert_eq!(state.view, loaded().view);
    }

    #[test]
    fn no_dataset_means_empty_view() {
        let mut state = ExplorerState::default();
        state.set_query("anything");
        assert!(state.visible_records().is_empty());
        assert_eq!(state.summary_line(), "0 matches out of 0");
    }
}
