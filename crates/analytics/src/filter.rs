use core_types::{split_multi_value, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive year bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// A compound predicate over records. Empty fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Matched case-insensitively as substrings of the record's labels.
    pub sub_industries: Vec<String>,
    pub product_service_types: Vec<String>,
    /// Matched exactly against the raw value.
    pub countries: Vec<String>,
    pub investment_types: Vec<String>,
    pub founded_year_range: Option<YearRange>,
    pub funding_year_range: Option<YearRange>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &Record) -> bool {
        any_label_contains(&self.sub_industries, &record.sub_industry_raw)
            && any_label_contains(&self.product_service_types, &record.product_service_type_raw)
            && is_member(&self.countries, &record.country_name)
            && is_member(&self.investment_types, &record.investment_type)
            && in_range(self.founded_year_range, record.founded_year)
            && in_range(self.funding_year_range, record.funding_year)
    }

    pub fn is_active(&self) -> bool {
        !self.sub_industries.is_empty()
            || !self.product_service_types.is_empty()
            || !self.countries.is_empty()
            || !self.investment_types.is_empty()
            || self.founded_year_range.is_some()
            || self.funding_year_range.is_some()
    }

    /// One line per active criterion.
    pub fn summary(&self) -> Vec<String> {
        let mut summary = Vec::new();
        let sets = [
            ("Sub-industries", &self.sub_industries),
            ("Product/service types", &self.product_service_types),
            ("Countries", &self.countries),
            ("Investment types", &self.investment_types),
        ];
        for (label, values) in sets {
            if !values.is_empty() {
                summary.push(format!("{label}: {} selected", values.len()));
            }
        }
        if let Some(range) = self.founded_year_range {
            summary.push(format!("Founded: {}-{}", range.min, range.max));
        }
        if let Some(range) = self.funding_year_range {
            summary.push(format!("Funded: {}-{}", range.min, range.max));
        }
        summary
    }
}

fn any_label_contains(selected: &[String], raw: &str) -> bool {
    if selected.is_empty() {
        return true;
    }
    let labels: Vec<String> = split_multi_value(raw)
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    selected.iter().any(|wanted| {
        let wanted = wanted.to_lowercase();
        labels.iter().any(|label| label.contains(&wanted))
    })
}

fn is_member(selected: &[String], value: &str) -> bool {
    selected.is_empty() || selected.iter().any(|s| s == value)
}

fn in_range(range: Option<YearRange>, year: i32) -> bool {
    range.is_none_or(|r| r.contains(year))
}

/// Records passing every active criterion, in input order.
pub fn apply_filters<'a>(records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// The distinct values present in a record set, sorted, for building filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub sub_industries: Vec<String>,
    pub product_service_types: Vec<String>,
    pub countries: Vec<String>,
    pub investment_types: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let mut sub_industries = BTreeSet::new();
        let mut product_service_types = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut investment_types = BTreeSet::new();

        for record in records {
            sub_industries.extend(record.sub_industries());
            product_service_types.extend(record.product_service_types());
            let country = record.country_name.trim();
            if !country.is_empty() {
                countries.insert(country);
            }
            let investment = record.investment_type.trim();
            if !investment.is_empty() {
                investment_types.insert(investment);
            }
        }

        let owned = |set: BTreeSet<&str>| -> Vec<String> {
            set.into_iter().map(str::to_string).collect()
        };
        Self {
            sub_industries: owned(sub_industries),
            product_service_types: owned(product_service_types),
            countries: owned(countries),
            investment_types: owned(investment_types),
        }
    }
}
