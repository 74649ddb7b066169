use core_types::{NumericField, Record, SortOrder};
use serde::Serialize;
use std::collections::HashSet;

/// Bubble size used when no size column is chosen.
pub const DEFAULT_POINT_SIZE: f64 = 10.0;

/// Case-insensitive substring search over name, country and investment type.
/// A blank query matches everything.
pub fn search_records<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| {
            [&r.name, &r.country_name, &r.investment_type]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

/// Stable sort by a numeric column. Equal values keep input order.
pub fn sort_records<'a>(
    records: &'a [Record],
    field: NumericField,
    order: SortOrder,
) -> Vec<&'a Record> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| {
        let ordering = field.value_of(a).total_cmp(&field.value_of(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// Keeps the first record seen for each name.
pub fn deduplicate_by_name(records: &[Record]) -> Vec<&Record> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.name.as_str()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub label: String,
}

/// Projects records onto two numeric columns, optionally sized by a third.
pub fn chart_points(
    records: &[Record],
    x: NumericField,
    y: NumericField,
    size: Option<NumericField>,
) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|r| ChartPoint {
            x: x.value_of(r),
            y: y.value_of(r),
            size: size.map_or(DEFAULT_POINT_SIZE, |field| field.value_of(r)),
            label: r.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn records() -> Vec<Record> {
        vec![
            Record {
                country_name: "Taiwan".into(),
                total_funding_usd: dec!(500),
                num_funding_rounds: 3,
                ..Record::new("Volt Storage")
            },
            Record {
                investment_type: "seed".into(),
                total_funding_usd: dec!(100),
                ..Record::new("GridCo")
            },
            Record {
                country_name: "Japan".into(),
                total_funding_usd: dec!(500),
                ..Record::new("Volt Storage")
            },
        ]
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = records();
        let names: Vec<&str> = search_records(&records, "volt")
            .iter()
            .map(|r| r.country_name.as_str())
            .collect();
        assert_eq!(names, vec!["Taiwan", "Japan"]);
        assert_eq!(search_records(&records, "SEED").len(), 1);
        assert_eq!(search_records(&records, "  ").len(), 3);
    }

    #[test]
    fn sort_is_stable() {
        let records = records();
        let desc = sort_records(&records, NumericField::TotalFundingUsd, SortOrder::Desc);
        let countries: Vec<&str> = desc.iter().map(|r| r.country_name.as_str()).collect();
        assert_eq!(countries, vec!["Taiwan", "Japan", ""]);

        let asc = sort_records(&records, NumericField::TotalFundingUsd, SortOrder::Asc);
        assert_eq!(asc[0].name, "GridCo");
        assert_eq!(asc[1].country_name, "Taiwan");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let records = records();
        let unique = deduplicate_by_name(&records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].country_name, "Taiwan");
    }

    #[test]
    fn chart_points_default_size() {
        let records = records();
        let points = chart_points(
            &records,
            NumericField::TotalFundingUsd,
            NumericField::NumFundingRounds,
            None,
        );
        assert_eq!(points[0].x, 500.0);
        assert_eq!(points[0].y, 3.0);
        assert_eq!(points[0].size, DEFAULT_POINT_SIZE);

        let sized = chart_points(
            &records,
            NumericField::TotalFundingUsd,
            NumericField::NumFundingRounds,
            Some(NumericField::TotalFundingUsd),
        );
        assert_eq!(sized[1].size, 100.0);
        assert_eq!(sized[1].label, "GridCo");
    }
}
