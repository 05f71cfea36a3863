//! Weighted combination of category series into monthly aggregate records.
//!
//! ```text
//! portfolio_value    = streaming + popularity + retail
//! live_content_value = concert + twitter + youtube + instagram + merchandise
//! management_value   = management + broadcast
//! total              = fan_value + portfolio_value + live_content_value + management_value
//! ```
//!
//! Every term on the right is already multiplied by its weight, and the
//! record stores those weighted terms, so `total` is exactly the sum of the
//! named fields.

use std::collections::BTreeMap;

use mov_types::{AggregateGroup, AggregateRecord, Category, TrendPoint};

use crate::cumulative::cumulative;
use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;
use crate::weights::WeightTable;

/// Integrated series keyed by category. Missing categories read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySeries {
    series: BTreeMap<Category, MonthlySeries>,
}

impl CategorySeries {
    /// No categories.
    pub const fn new() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }

    /// Store the series for `category`, replacing any previous one.
    pub fn insert(&mut self, category: Category, series: MonthlySeries) {
        self.series.insert(category, series);
    }

    /// Series for `category`, if present.
    pub fn get(&self, category: Category) -> Option<&MonthlySeries> {
        self.series.get(&category)
    }

    /// Unweighted value of `category` at grid position `index`.
    pub fn value(&self, category: Category, index: usize) -> f64 {
        self.get(category).map_or(0.0, |s| s.value_at(index))
    }

    /// Unweighted sum of each category over the whole grid.
    pub fn totals(&self) -> BTreeMap<Category, f64> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.get(*c).map_or(0.0, MonthlySeries::sum)))
            .collect()
    }
}

impl FromIterator<(Category, MonthlySeries)> for CategorySeries {
    fn from_iter<I: IntoIterator<Item = (Category, MonthlySeries)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

/// The two externally supplied trend series, aligned to the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalSeries {
    /// Fandom value trend (`FV_t`).
    pub fan_value: MonthlySeries,
    /// Management value from the broadcast-valuation collaborator.
    pub management: MonthlySeries,
}

impl ExternalSeries {
    /// Both series all zero.
    pub fn zeros(grid: &TimelineGrid) -> Self {
        Self {
            fan_value: MonthlySeries::for_grid(grid),
            management: MonthlySeries::for_grid(grid),
        }
    }

    /// Left-join raw trend points onto `grid`, filling gaps with zero.
    pub fn from_points(grid: &TimelineGrid, fan_value: &[TrendPoint], management: &[TrendPoint]) -> Self {
        Self {
            fan_value: MonthlySeries::from_points(grid, fan_value),
            management: MonthlySeries::from_points(grid, management),
        }
    }
}

/// Build one [`AggregateRecord`] per grid month, with running totals.
///
/// An empty grid yields an empty vector.
pub fn combine(
    grid: &TimelineGrid,
    categories: &CategorySeries,
    external: &ExternalSeries,
    weights: &WeightTable,
) -> Vec<AggregateRecord> {
    let weighted = |category: Category, index: usize| {
        categories.value(category, index) * weights.category(category)
    };

    let mut records: Vec<AggregateRecord> = grid
        .months()
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let mut r = AggregateRecord::zero(*date);
            r.fan_value = external.fan_value.value_at(i) * weights.fan_value;

            r.streaming = weighted(Category::Streaming, i);
            r.popularity = weighted(Category::Popularity, i);
            r.retail = weighted(Category::Retail, i);

            r.concert = weighted(Category::Concert, i);
            r.social_twitter = weighted(Category::SocialTwitter, i);
            r.social_youtube = weighted(Category::SocialYoutube, i);
            r.social_instagram = weighted(Category::SocialInstagram, i);
            r.merchandise = weighted(Category::Merchandise, i);
            r.broadcast = weighted(Category::Broadcast, i);
            r.management = external.management.value_at(i) * weights.management;

            r.portfolio_value = group_value(&r, AggregateGroup::Portfolio);
            r.live_content_value = group_value(&r, AggregateGroup::LiveContent);
            r.management_value = r.management + group_value(&r, AggregateGroup::Management);

            r.total = r.fan_value + r.portfolio_value + r.live_content_value + r.management_value;
            r
        })
        .collect();

    let totals = MonthlySeries::from_values(records.iter().map(|r| r.total).collect());
    for (record, running) in records.iter_mut().zip(cumulative(&totals).iter()) {
        record.cumulative_total = running;
    }
    records
}

/// Sum of the weighted category fields that roll up into `group`.
fn group_value(record: &AggregateRecord, group: AggregateGroup) -> f64 {
    Category::ALL
        .iter()
        .filter(|c| c.group() == group)
        .map(|c| record.category_value(*c))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn total_is_sum_of_weighted_parts() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 2, 28));
        let categories: CategorySeries = [
            (Category::Streaming, MonthlySeries::from_values(vec![1.0, 2.0])),
            (Category::SocialTwitter, MonthlySeries::from_values(vec![0.001, 0.0])),
            (Category::Broadcast, MonthlySeries::from_values(vec![10.0, 5.0])),
        ]
        .into_iter()
        .collect();
        let external = ExternalSeries {
            fan_value: MonthlySeries::from_values(vec![100.0, 50.0]),
            management: MonthlySeries::from_values(vec![0.0, 7.0]),
        };
        let records = combine(&grid, &categories, &external, &WeightTable::default());
        assert_eq!(records.len(), 2);

        let first = records.first().cloned().unwrap_or_else(|| AggregateRecord::zero(date(2023, 1, 31)));
        assert!(close(first.streaming, 10.0));
        assert!(close(first.social_twitter, 40.0));
        assert!(close(first.broadcast, 2.0));
        assert!(close(first.management_value, 2.0));
        assert!(close(first.total, 100.0 + 10.0 + 40.0 + 2.0));

        let second = records.get(1).cloned().unwrap_or_else(|| AggregateRecord::zero(date(2023, 2, 28)));
        assert!(close(second.total, 50.0 + 20.0 + 1.0 + 7.0));
        assert!(close(second.cumulative_total, first.total + second.total));
    }

    #[test]
    fn aggregates_follow_category_groups() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 1, 31));
        let categories: CategorySeries = Category::ALL
            .into_iter()
            .map(|c| (c, MonthlySeries::from_values(vec![1.0])))
            .collect();
        let weights = WeightTable {
            streaming: 1.0,
            popularity: 2.0,
            retail: 4.0,
            concert: 8.0,
            social_twitter: 16.0,
            social_youtube: 32.0,
            social_instagram: 64.0,
            merchandise: 128.0,
            broadcast: 256.0,
            fan_value: 0.0,
            management: 0.0,
        };
        let records = combine(&grid, &categories, &ExternalSeries::zeros(&grid), &weights);
        let Some(record) = records.first() else {
            panic!("one month of records");
        };
        assert!(close(record.portfolio_value, 7.0));
        assert!(close(record.live_content_value, 248.0));
        assert!(close(record.management_value, 256.0));
        assert!(close(record.total, 511.0));
    }

    #[test]
    fn empty_grid_gives_no_records() {
        let records = combine(
            &TimelineGrid::empty(),
            &CategorySeries::new(),
            &ExternalSeries::default(),
            &WeightTable::default(),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn external_points_are_left_joined() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 3, 31));
        let external = ExternalSeries::from_points(
            &grid,
            &[TrendPoint::new(date(2023, 2, 14), 4.0)],
            &[],
        );
        assert_eq!(external.fan_value.values(), &[0.0, 4.0, 0.0]);
        assert_eq!(external.management.values(), &[0.0, 0.0, 0.0]);
    }
}
