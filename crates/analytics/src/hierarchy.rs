use crate::inference::CategoryInference;
use core_types::{sum_funding, ChartMetric, Record};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// One product/service label aggregated across every entity that lists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub name: String,
    pub count: u64,
    pub total_funding: Decimal,
    pub average_funding: Decimal,
}

/// A canonical parent category with its rolled-up labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentNode {
    pub name: String,
    pub count: u64,
    pub total_funding: Decimal,
    pub average_funding: Decimal,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyResult {
    pub parents: Vec<ParentNode>,
    pub total_entities: u64,
    pub total_funding: Decimal,
    pub average_funding: Decimal,
}

impl HierarchyResult {
    pub fn empty() -> Self {
        Self {
            parents: Vec::new(),
            total_entities: 0,
            total_funding: Decimal::ZERO,
            average_funding: Decimal::ZERO,
        }
    }

    /// Labels that appear under more than one parent, with the parents they
    /// appear under. Any entry here is a rule-table conflict.
    pub fn cross_parent_duplicates(&self) -> Vec<(String, Vec<String>)> {
        let mut seen: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for parent in &self.parents {
            for child in &parent.children {
                seen.entry(child.name.as_str())
                    .or_default()
                    .push(parent.name.clone());
            }
        }
        seen.into_iter()
            .filter(|(_, parents)| parents.len() > 1)
            .map(|(name, parents)| (name.to_string(), parents))
            .collect()
    }

    pub fn find_parent(&self, name: &str) -> Option<&ParentNode> {
        self.parents.iter().find(|p| p.name == name)
    }

    /// Looks up a label and the parent it was filed under.
    pub fn find_leaf(&self, label: &str) -> Option<(&ParentNode, &CategoryNode)> {
        self.parents.iter().find_map(|parent| {
            parent
                .children
                .iter()
                .find(|child| child.name == label)
                .map(|child| (parent, child))
        })
    }
}

fn average(total: Decimal, count: u64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

#[derive(Default)]
struct LabelAccumulator<'a> {
    order: Vec<&'a str>,
    totals: HashMap<&'a str, (u64, Decimal)>,
}

impl<'a> LabelAccumulator<'a> {
    fn add(&mut self, label: &'a str, funding: Decimal) {
        let entry = self.totals.entry(label).or_insert_with(|| {
            self.order.push(label);
            (0, Decimal::ZERO)
        });
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(funding);
    }
}

/// Builds the parent → label rollup for a record set.
///
/// An entity contributes at most once to a given label, but its full funding
/// is added to every distinct label it lists, so parent funding can exceed the
/// funding actually raised.
pub fn build_hierarchy(records: &[Record], inference: &CategoryInference) -> HierarchyResult {
    let mut parent_order: Vec<&str> = Vec::new();
    let mut by_parent: HashMap<&str, LabelAccumulator> = HashMap::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for record in records {
        if record.name.is_empty() || record.product_service_type_raw.is_empty() {
            continue;
        }
        for label in record.product_service_types() {
            if !seen.insert((record.name.as_str(), label)) {
                continue;
            }
            let parent = inference.infer(label);
            by_parent
                .entry(parent)
                .or_insert_with(|| {
                    parent_order.push(parent);
                    LabelAccumulator::default()
                })
                .add(label, record.total_funding_usd);
        }
    }

    let mut parents: Vec<ParentNode> = parent_order
        .into_iter()
        .filter_map(|name| by_parent.remove(name).map(|acc| (name, acc)))
        .map(|(name, acc)| {
            let mut children: Vec<CategoryNode> = acc
                .order
                .iter()
                .filter_map(|label| {
                    acc.totals.get(label).map(|&(count, total)| CategoryNode {
                        name: label.to_string(),
                        count,
                        total_funding: total,
                        average_funding: average(total, count),
                    })
                })
                .collect();
            children.sort_by(|a, b| b.count.cmp(&a.count));

            let count = children.iter().map(|c| c.count).sum();
            let total_funding = sum_funding(children.iter().map(|c| c.total_funding));
            ParentNode {
                name: name.to_string(),
                count,
                total_funding,
                average_funding: average(total_funding, count),
                children,
            }
        })
        .collect();
    parents.sort_by(|a, b| b.count.cmp(&a.count));

    let total_entities = parents.iter().map(|p| p.count).sum();
    let total_funding = sum_funding(parents.iter().map(|p| p.total_funding));
    let result = HierarchyResult {
        parents,
        total_entities,
        total_funding,
        average_funding: average(total_funding, total_entities),
    };

    for (label, parents) in result.cross_parent_duplicates() {
        warn!(label = %label, parents = ?parents, "Label filed under more than one parent category");
    }
    debug!(
        parents = result.parents.len(),
        entities = result.total_entities,
        "Built category hierarchy"
    );

    result
}

/// A node of a chart-ready tree. Leaves carry no children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartNode {
    pub name: String,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChartNode>,
}

/// Converts a hierarchy into chart nodes valued by `metric`.
///
/// A parent whose leaves sum to zero is shown with a value of 1 so it stays
/// visible. The hierarchy itself is left untouched.
pub fn to_chart_nodes(result: &HierarchyResult, metric: ChartMetric) -> Vec<ChartNode> {
    result
        .parents
        .iter()
        .filter_map(|parent| {
            let children: Vec<ChartNode> = parent
                .children
                .iter()
                .filter(|child| !child.name.trim().is_empty())
                .map(|child| ChartNode {
                    name: child.name.clone(),
                    value: leaf_value(child, metric),
                    children: Vec::new(),
                })
                .collect();
            if children.is_empty() {
                return None;
            }

            let sum = sum_funding(children.iter().map(|c| c.value));
            Some(ChartNode {
                name: parent.name.clone(),
                value: if sum.is_zero() { Decimal::ONE } else { sum },
                children,
            })
        })
        .collect()
}

fn leaf_value(node: &CategoryNode, metric: ChartMetric) -> Decimal {
    match metric {
        ChartMetric::CompanyCount => Decimal::from(node.count),
        ChartMetric::TotalFunding => node.total_funding,
        ChartMetric::AverageFunding => node.average_funding,
    }
}

/// The three chart trees derived from one hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SunburstData {
    pub company_count: Vec<ChartNode>,
    pub total_funding: Vec<ChartNode>,
    pub average_funding: Vec<ChartNode>,
}

impl SunburstData {
    pub fn metric(&self, metric: ChartMetric) -> &[ChartNode] {
        match metric {
            ChartMetric::CompanyCount => &self.company_count,
            ChartMetric::TotalFunding => &self.total_funding,
            ChartMetric::AverageFunding => &self.average_funding,
        }
    }
}

pub fn to_sunburst(result: &HierarchyResult) -> SunburstData {
    SunburstData {
        company_count: to_chart_nodes(result, ChartMetric::CompanyCount),
        total_funding: to_chart_nodes(result, ChartMetric::TotalFunding),
        average_funding: to_chart_nodes(result, ChartMetric::AverageFunding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn company(name: &str, products: &str, funding: Decimal) -> Record {
        Record {
            product_service_type_raw: products.to_string(),
            total_funding_usd: funding,
            ..Record::new(name)
        }
    }

    #[test]
    fn deduplicates_by_entity_and_label() {
        let records = vec![
            company("A", "系統整合, 系統整合", dec!(100)),
            company("B", "系統整合", dec!(50)),
        ];
        let result = build_hierarchy(&records, &CategoryInference::default());

        let (parent, leaf) = result.find_leaf("系統整合").unwrap();
        assert_eq!(parent.name, "儲能系統整合");
        assert_eq!(leaf.count, 2);
        assert_eq!(leaf.total_funding, dec!(150));
        assert_eq!(leaf.average_funding, dec!(75));
        assert_eq!(result.total_entities, 2);
    }

    #[test]
    fn funding_is_counted_once_per_label() {
        let records = vec![company("A", "鋰離子電池, 液流電池", dec!(1000))];
        let result = build_hierarchy(&records, &CategoryInference::default());

        let parent = result.find_parent("電化學儲能").unwrap();
        assert_eq!(parent.count, 2);
        assert_eq!(parent.total_funding, dec!(2000));
        assert_eq!(result.total_funding, dec!(2000));
    }

    #[test]
    fn oversized_funding_saturates_instead_of_panicking() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let records = vec![company("A", "鋰離子電池, 液流電池", huge)];
        let result = build_hierarchy(&records, &CategoryInference::default());

        let parent = result.find_parent("電化學儲能").unwrap();
        assert_eq!(parent.count, 2);
        assert_eq!(parent.total_funding, Decimal::MAX);
        assert_eq!(result.total_funding, Decimal::MAX);

        let nodes = to_chart_nodes(&result, ChartMetric::TotalFunding);
        assert_eq!(nodes[0].value, Decimal::MAX);
    }

    #[test]
    fn skips_records_without_name_or_products() {
        let records = vec![
            company("", "鋰電池", dec!(10)),
            company("A", "", dec!(10)),
            company("B", " , ", dec!(10)),
        ];
        let result = build_hierarchy(&records, &CategoryInference::default());
        assert_eq!(result, HierarchyResult::empty());
    }

    #[test]
    fn sums_roll_up_and_order_is_stable() {
        let records = vec![
            company("A", "重力儲能", dec!(10)),
            company("B", "鋰電池", dec!(20)),
            company("C", "飛輪", dec!(30)),
            company("D", "鋰電池, Consulting", dec!(40)),
        ];
        let result = build_hierarchy(&records, &CategoryInference::default());

        // 機械儲能 and 電化學儲能 tie at 2 and keep first-seen order.
        let names: Vec<&str> = result.parents.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["機械儲能", "電化學儲能", "其它"]);

        for parent in &result.parents {
            let child_sum: u64 = parent.children.iter().map(|c| c.count).sum();
            assert_eq!(child_sum, parent.count);
        }
        let parent_sum: u64 = result.parents.iter().map(|p| p.count).sum();
        assert_eq!(parent_sum, result.total_entities);
        assert_eq!(result.total_entities, 5);
        assert!(result.cross_parent_duplicates().is_empty());
    }

    #[test]
    fn zero_valued_parent_is_displayed_as_one() {
        let records = vec![company("A", "電池回收", Decimal::ZERO)];
        let result = build_hierarchy(&records, &CategoryInference::default());

        let nodes = to_chart_nodes(&result, ChartMetric::TotalFunding);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].value, Decimal::ONE);
        assert_eq!(nodes[0].children[0].value, Decimal::ZERO);
        assert_eq!(result.parents[0].total_funding, Decimal::ZERO);
    }

    #[test]
    fn blank_children_and_empty_parents_are_dropped() {
        let result = HierarchyResult {
            parents: vec![
                ParentNode {
                    name: "Blank".into(),
                    count: 1,
                    total_funding: dec!(5),
                    average_funding: dec!(5),
                    children: vec![CategoryNode {
                        name: "  ".into(),
                        count: 1,
                        total_funding: dec!(5),
                        average_funding: dec!(5),
                    }],
                },
                ParentNode {
                    name: "Kept".into(),
                    count: 3,
                    total_funding: dec!(30),
                    average_funding: dec!(10),
                    children: vec![
                        CategoryNode {
                            name: "x".into(),
                            count: 2,
                            total_funding: dec!(20),
                            average_funding: dec!(10),
                        },
                        CategoryNode {
                            name: "y".into(),
                            count: 1,
                            total_funding: dec!(10),
                            average_funding: dec!(10),
                        },
                    ],
                },
            ],
            total_entities: 4,
            total_funding: dec!(35),
            average_funding: dec!(8.75),
        };

        let nodes = to_chart_nodes(&result, ChartMetric::CompanyCount);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "Kept");
        assert_eq!(nodes[0].value, dec!(3));

        let averages = to_chart_nodes(&result, ChartMetric::AverageFunding);
        assert_eq!(averages[0].value, dec!(20));
    }

    #[test]
    fn reports_cross_parent_duplicates() {
        let leaf = CategoryNode {
            name: "shared".into(),
            count: 1,
            total_funding: Decimal::ZERO,
            average_funding: Decimal::ZERO,
        };
        let parent = |name: &str| ParentNode {
            name: name.into(),
            count: 1,
            total_funding: Decimal::ZERO,
            average_funding: Decimal::ZERO,
            children: vec![leaf.clone()],
        };
        let result = HierarchyResult {
            parents: vec![parent("P1"), parent("P2")],
            total_entities: 2,
            ..HierarchyResult::empty()
        };
        assert_eq!(
            result.cross_parent_duplicates(),
            vec![("shared".to_string(), vec!["P1".to_string(), "P2".to_string()])]
        );
    }

    #[test]
    fn sunburst_leaves_have_no_children_when_serialized() {
        let records = vec![company("A", "鋰電池", dec!(10))];
        let sunburst = to_sunburst(&build_hierarchy(&records, &CategoryInference::default()));
        let json = serde_json::to_value(sunburst.metric(ChartMetric::CompanyCount)).unwrap();
        assert!(json[0]["children"][0].get("children").is_none());
        assert_eq!(sunburst.company_count[0].value, dec!(1));
    }
}
