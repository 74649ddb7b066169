use crate::statistics::{count_in_order, top_n};
use core_types::{sum_funding, Record};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

const TOP_INDUSTRIES_PER_COUNTRY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

/// Aggregates for the companies of one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryData {
    pub name: String,
    pub company_count: usize,
    pub total_funding: Decimal,
    pub average_funding: Decimal,
    pub max_funding: Decimal,
    /// Most frequent sub-industries, at most five.
    pub industries: Vec<NamedCount>,
    /// How many companies closed each number of funding rounds, by round count.
    pub funding_rounds: Vec<NamedCount>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoAnalysis {
    pub countries: Vec<CountryData>,
    pub total_countries: usize,
    pub total_companies: usize,
    pub total_funding: Decimal,
    pub average_funding: Decimal,
}

/// Per-country breakdown, largest countries first.
///
/// Records with a blank country are left out of every figure.
pub fn country_breakdown(records: &[Record]) -> GeoAnalysis {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Record>> = HashMap::new();
    for record in records {
        let country = record.country_name.trim();
        if country.is_empty() {
            continue;
        }
        groups
            .entry(country)
            .or_insert_with(|| {
                order.push(country);
                Vec::new()
            })
            .push(record);
    }

    let mut countries: Vec<CountryData> = order
        .into_iter()
        .filter_map(|name| groups.remove(name).map(|members| summarize(name, &members)))
        .collect();
    countries.sort_by(|a, b| b.company_count.cmp(&a.company_count));

    let total_companies: usize = countries.iter().map(|c| c.company_count).sum();
    let total_funding = sum_funding(countries.iter().map(|c| c.total_funding));
    let average_funding = if total_companies == 0 {
        Decimal::ZERO
    } else {
        total_funding / Decimal::from(total_companies)
    };

    GeoAnalysis {
        total_countries: countries.len(),
        countries,
        total_companies,
        total_funding,
        average_funding,
    }
}

fn summarize(name: &str, members: &[&Record]) -> CountryData {
    let total_funding = sum_funding(members.iter().map(|r| r.total_funding_usd));
    let max_funding = members
        .iter()
        .map(|r| r.total_funding_usd)
        .max()
        .unwrap_or(Decimal::ZERO);

    let industries = top_n(
        count_in_order(members.iter().copied().flat_map(Record::sub_industries)),
        TOP_INDUSTRIES_PER_COUNTRY,
    )
    .into_iter()
    .map(|(name, count)| NamedCount {
        name: name.to_string(),
        count,
    })
    .collect();

    let mut rounds: Vec<(u32, usize)> = Vec::new();
    for record in members {
        match rounds.iter_mut().find(|(n, _)| *n == record.num_funding_rounds) {
            Some((_, count)) => *count += 1,
            None => rounds.push((record.num_funding_rounds, 1)),
        }
    }
    rounds.sort_by_key(|(n, _)| *n);

    CountryData {
        name: name.to_string(),
        company_count: members.len(),
        total_funding,
        average_funding: total_funding / Decimal::from(members.len().max(1)),
        max_funding,
        industries,
        funding_rounds: rounds
            .into_iter()
            .map(|(n, count)| NamedCount {
                name: n.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn company(name: &str, country: &str, sub: &str, rounds: u32, funding: Decimal) -> Record {
        Record {
            country_name: country.into(),
            sub_industry_raw: sub.into(),
            num_funding_rounds: rounds,
            total_funding_usd: funding,
            ..Record::new(name)
        }
    }

    #[test]
    fn groups_by_country_largest_first() {
        let records = vec![
            company("A", "Germany", "Storage", 1, dec!(100)),
            company("B", "Taiwan", "Storage, Grid", 2, dec!(300)),
            company("C", "Taiwan", "Grid", 2, dec!(100)),
            company("D", " ", "Grid", 1, dec!(999)),
        ];
        let geo = country_breakdown(&records);

        assert_eq!(geo.total_countries, 2);
        assert_eq!(geo.total_companies, 3);
        assert_eq!(geo.total_funding, dec!(500));

        let taiwan = &geo.countries[0];
        assert_eq!(taiwan.name, "Taiwan");
        assert_eq!(taiwan.company_count, 2);
        assert_eq!(taiwan.average_funding, dec!(200));
        assert_eq!(taiwan.max_funding, dec!(300));
        assert_eq!(
            taiwan.industries,
            vec![
                NamedCount { name: "Grid".into(), count: 2 },
                NamedCount { name: "Storage".into(), count: 1 },
            ]
        );
        assert_eq!(
            taiwan.funding_rounds,
            vec![NamedCount { name: "2".into(), count: 2 }]
        );
    }

    #[test]
    fn empty_input_is_zeroed() {
        assert_eq!(country_breakdown(&[]), GeoAnalysis::default());
    }

    #[test]
    fn oversized_funding_saturates() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let records = vec![
            company("A", "Taiwan", "Storage", 1, huge),
            company("B", "Taiwan", "Storage", 1, huge),
        ];
        let geo = country_breakdown(&records);

        assert_eq!(geo.countries[0].total_funding, Decimal::MAX);
        assert_eq!(geo.total_funding, Decimal::MAX);
        assert!(geo.average_funding > Decimal::ZERO);
    }
}
