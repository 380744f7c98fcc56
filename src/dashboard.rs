//! One-shot pipeline: load once, derive the four view models.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::TrackerConfig;
use crate::errors::ShelfError;
use crate::hierarchy::{CompositionView, evaluation_composition, overview_composition};
use crate::source::{InputFormat, RecordStore};
use crate::status::{StatusView, build_status_view};
use crate::timeline::{TimelineView, build_timeline_view};
use crate::types::SourceId;

/// All derived view models. Built once and never modified.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardViews {
    pub source_id: SourceId,
    pub as_of: NaiveDate,
    pub records: usize,
    pub status: StatusView,
    pub timeline: TimelineView,
    pub overview: CompositionView,
    pub evaluations: CompositionView,
}

/// Entry point for deriving dashboard views.
pub struct Dashboard;

impl Dashboard {
    /// Derive every view from an already loaded store.
    ///
    /// `as_of` is the end date substituted for unfinished readings; callers
    /// evaluate it once so all views agree.
    pub fn build(
        store: &RecordStore,
        as_of: NaiveDate,
        config: &TrackerConfig,
    ) -> Result<DashboardViews, ShelfError> {
        config.validate()?;
        let records = store.records();
        let palette = &config.palette;

        let status = build_status_view(records, &palette.status);
        let timeline =
            build_timeline_view(records, as_of, &palette.categorical, config.interval_policy)?;
        let overview =
            overview_composition(records, &palette.categorical, config.overview_depth_limit);
        let evaluations = evaluation_composition(
            records,
            &config.completed_status,
            palette.continuous,
            config.evaluation_depth_limit,
        );

        info!(
            source = store.source_id(),
            records = records.len(),
            statuses = status.slices.len(),
            timeline_entries = timeline.entries.len(),
            %as_of,
            "dashboard views built"
        );
        Ok(DashboardViews {
            source_id: store.source_id().to_string(),
            as_of,
            records: records.len(),
            status,
            timeline,
            overview,
            evaluations,
        })
    }

    /// Open `path`, load it with `config.columns`, and derive every view.
    ///
    /// Workbooks are read from the `config.sheet` worksheet.
    pub fn open(
        path: impl AsRef<Path>,
        format: InputFormat,
        as_of: NaiveDate,
        config: &TrackerConfig,
    ) -> Result<DashboardViews, ShelfError> {
        config.validate()?;
        let store = RecordStore::open_sheet(path, format, &config.sheet, &config.columns)?;
        Self::build(&store, as_of, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntervalPolicy;
    use crate::data::BookRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> RecordStore {
        RecordStore::from_records(
            "memory",
            vec![
                BookRecord::new(0, "Dune", "Fiction", "Read")
                    .with_sub_category("Sci-Fi")
                    .with_dates(Some(date(2023, 1, 1)), Some(date(2023, 2, 1)))
                    .with_evaluation(8.0),
                BookRecord::new(1, "SPQR", "History", "Reading")
                    .with_dates(Some(date(2023, 9, 1)), None)
                    .with_evaluation(9.0),
                BookRecord::new(2, "Backwards", "History", "Read")
                    .with_dates(Some(date(2023, 5, 1)), Some(date(2023, 4, 1))),
            ],
        )
    }

    #[test]
    fn build_derives_all_views() {
        let views = Dashboard::build(&store(), date(2024, 1, 1), &TrackerConfig::default())
            .unwrap();
        assert_eq!(views.records, 3);
        assert_eq!(views.status.total, 3);
        assert_eq!(views.timeline.entries.len(), 2);
        assert_eq!(views.timeline.skipped.len(), 1);
        assert_eq!(views.overview.tree.roots.len(), 2);
        let leaves = views.evaluations.tree.leaves();
        assert!(leaves.iter().all(|leaf| leaf.label != "SPQR"));
    }

    #[test]
    fn build_honours_reject_policy_and_validates_config() {
        let reject = TrackerConfig::default().with_interval_policy(IntervalPolicy::Reject);
        assert!(matches!(
            Dashboard::build(&store(), date(2024, 1, 1), &reject),
            Err(ShelfError::InvalidInterval { .. })
        ));

        let invalid = TrackerConfig::default().with_depth_limits(2, 0);
        assert!(matches!(
            Dashboard::build(&store(), date(2024, 1, 1), &invalid),
            Err(ShelfError::Configuration(_))
        ));
    }

    #[test]
    fn views_serialize_to_json() {
        let views = Dashboard::build(&store(), date(2024, 1, 1), &TrackerConfig::default())
            .unwrap();
        let json = serde_json::to_value(&views).unwrap();
        assert_eq!(json["as_of"], "2024-01-01");
        assert_eq!(json["status"]["slices"][0]["label"], "Read");
        assert_eq!(json["status"]["slices"][0]["color"], "#008000");
    }
}
