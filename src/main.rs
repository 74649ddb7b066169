use analytics::{
    calculate_field_statistics, calculate_value_range, correlate_fields, group_statistics,
    AnalyticsEngine, FilterCriteria, FilterOptions, GroupField, YearRange,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::{ChartMetric, Level, NumericField, Quadrant, Record};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The main entry point for the storage-insights command-line tool.
fn main() -> Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let _log_guard =
        configuration::init_logging(&config.logging).context("Failed to initialize logging")?;

    let records = read_records(&cli.input)?;
    info!(records = records.len(), input = %cli.input.display(), "Loaded records");

    let mut engine = AnalyticsEngine::new(&config).context("Invalid scoring configuration")?;
    if let Some(year) = cli.reference_year {
        engine = engine.with_reference_year(year);
    }

    match cli.command {
        Commands::Stats(args) => handle_stats(&engine, &records, args, cli.json),
        Commands::GeMatrix(args) => handle_ge_matrix(&engine, &records, args, cli.json),
        Commands::RiskQuadrant => handle_risk_quadrant(&engine, &records, cli.json),
        Commands::Hierarchy(args) => handle_hierarchy(&mut engine, &records, args, cli.json),
        Commands::Filter(args) => handle_filter(&engine, &records, args, cli.json),
        Commands::Group(args) => handle_group(&records, args, cli.json),
        Commands::Correlate(args) => handle_correlate(&records, args, cli.json),
        Commands::Countries => handle_countries(&records, cli.json),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Investment analytics for energy-storage companies.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON array of normalized company records.
    #[arg(long, short, global = true, default_value = "data.json")]
    input: PathBuf,

    /// TOML configuration file. Defaults to ./storage-insights.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Year used for company age in risk scoring. Defaults to the current year.
    #[arg(long, global = true)]
    reference_year: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline statistics, optionally with a summary of one numeric column.
    Stats(StatsArgs),
    /// Classify companies into the 3x3 GE matrix.
    GeMatrix(GeMatrixArgs),
    /// Classify companies into risk/return quadrants.
    RiskQuadrant,
    /// Roll product/service labels up into parent categories.
    Hierarchy(HierarchyArgs),
    /// List the companies matching a set of criteria.
    Filter(FilterArgs),
    /// Per-group statistics of a numeric column.
    Group(GroupArgs),
    /// Pearson correlation between two numeric columns.
    Correlate(CorrelateArgs),
    /// Per-country breakdown.
    Countries,
}

#[derive(Args)]
struct StatsArgs {
    /// Numeric column to summarize (e.g. "total_funding_usd").
    #[arg(long)]
    field: Option<NumericField>,
}

#[derive(Args)]
struct GeMatrixArgs {
    /// X axis column. Defaults to the configured axis.
    #[arg(long)]
    x: Option<NumericField>,

    /// Y axis column. Defaults to the configured axis.
    #[arg(long)]
    y: Option<NumericField>,
}

#[derive(Args)]
struct HierarchyArgs {
    /// Value shown per node: count, total_funding or average_funding.
    #[arg(long, default_value = "count")]
    metric: ChartMetric,
}

#[derive(Args)]
struct FilterArgs {
    /// Sub-industry substring. Repeat for alternatives.
    #[arg(long = "sub-industry")]
    sub_industries: Vec<String>,

    /// Product/service substring. Repeat for alternatives.
    #[arg(long = "product")]
    product_service_types: Vec<String>,

    /// Exact country name. Repeat for alternatives.
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Exact investment type. Repeat for alternatives.
    #[arg(long = "investment-type")]
    investment_types: Vec<String>,

    /// Inclusive founded-year range, e.g. "2015..2020".
    #[arg(long, value_parser = parse_year_range)]
    founded: Option<YearRange>,

    /// Inclusive funding-year range, e.g. "2021..2024".
    #[arg(long, value_parser = parse_year_range)]
    funded: Option<YearRange>,

    /// Print the available filter values instead of filtering.
    #[arg(long)]
    options: bool,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            sub_industries: args.sub_industries,
            product_service_types: args.product_service_types,
            countries: args.countries,
            investment_types: args.investment_types,
            founded_year_range: args.founded,
            funding_year_range: args.funded,
        }
    }
}

#[derive(Args)]
struct GroupArgs {
    /// Column to group by (country, investment_type, sub_industry, ...).
    #[arg(long)]
    by: GroupField,

    /// Numeric column to aggregate.
    #[arg(long, default_value = "total_funding_usd")]
    value: NumericField,
}

#[derive(Args)]
struct CorrelateArgs {
    a: NumericField,
    b: NumericField,
}

fn parse_year_range(raw: &str) -> Result<YearRange, String> {
    let (min, max) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected MIN..MAX, got '{raw}'"))?;
    let min: i32 = min.trim().parse().map_err(|_| format!("invalid year '{min}'"))?;
    let max: i32 = max.trim().parse().map_err(|_| format!("invalid year '{max}'"))?;
    if min > max {
        return Err(format!("range start {min} is after its end {max}"));
    }
    Ok(YearRange::new(min, max))
}

fn read_records(path: &Path) -> Result<Vec<Record>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_stats(
    engine: &AnalyticsEngine,
    records: &[Record],
    args: StatsArgs,
    json: bool,
) -> Result<()> {
    let stats = engine.statistics(records);

    if json {
        return match args.field {
            Some(field) => print_json(&serde_json::json!({
                "statistics": stats,
                "field": field,
                "fieldStatistics": calculate_field_statistics(records, field),
                "valueRange": calculate_value_range(records, field),
            })),
            None => print_json(&stats),
        };
    }

    let mut summary = new_table(vec!["Metric", "Value"]);
    summary.add_row(vec!["Companies".to_string(), stats.total_records.to_string()]);
    summary.add_row(vec!["Total funding".to_string(), format_currency(stats.total_funding)]);
    summary.add_row(vec!["Average funding".to_string(), format_currency(stats.average_funding)]);
    println!("{summary}");

    let mut countries = new_table(vec!["Country", "Companies"]);
    for entry in &stats.top_countries {
        countries.add_row(vec![entry.country.clone(), entry.count.to_string()]);
    }
    println!("{countries}");

    let mut industries = new_table(vec!["Sub-industry", "Companies"]);
    for entry in &stats.top_industries {
        industries.add_row(vec![entry.industry.clone(), entry.count.to_string()]);
    }
    println!("{industries}");

    if let Some(field) = args.field {
        let s = calculate_field_statistics(records, field);
        let mut table = new_table(vec!["Field", "Count", "Sum", "Avg", "Min", "Median", "Max"]);
        table.add_row(vec![
            field.to_string(),
            s.count.to_string(),
            format_number(s.sum),
            format_number(s.avg),
            format_number(s.min),
            format_number(s.median),
            format_number(s.max),
        ]);
        println!("{table}");
    }
    Ok(())
}

fn handle_ge_matrix(
    engine: &AnalyticsEngine,
    records: &[Record],
    args: GeMatrixArgs,
    json: bool,
) -> Result<()> {
    let (default_x, default_y) = engine.default_axes();
    let x = args.x.unwrap_or(default_x);
    let y = args.y.unwrap_or(default_y);
    let result = engine.ge_matrix(records, x, y);
    info!(x = %x, y = %y, "GE matrix classified");

    if json {
        return print_json(&result);
    }

    println!(
        "X = {x} (cuts {}/{}/{}), Y = {y} (cuts {}/{}/{})",
        result.x_thresholds.low,
        result.x_thresholds.medium,
        result.x_thresholds.high,
        result.y_thresholds.low,
        result.y_thresholds.medium,
        result.y_thresholds.high,
    );
    let mut table = new_table(vec![
        format!("{y} \\ {x}"),
        "Low".to_string(),
        "Medium".to_string(),
        "High".to_string(),
    ]);
    for y_level in Level::ALL {
        let mut row = vec![y_level.capitalized().to_string()];
        for x_level in [Level::Low, Level::Medium, Level::High] {
            row.push(result.bucket(y_level, x_level).len().to_string());
        }
        table.add_row(row);
    }
    println!("{table}");

    let mut members = new_table(vec!["Bucket", "Companies"]);
    for (key, bucket) in result.buckets() {
        if bucket.is_empty() {
            continue;
        }
        members.add_row(vec![key, join_names(bucket.iter().map(|r| r.name.as_str()))]);
    }
    println!("{members}");
    Ok(())
}

fn handle_risk_quadrant(engine: &AnalyticsEngine, records: &[Record], json: bool) -> Result<()> {
    let result = engine
        .risk_quadrant(records)
        .context("Failed to classify risk/return quadrants")?;

    if json {
        return print_json(&result);
    }

    println!(
        "Cuts at the {}th percentile: risk >= {:.2}, return >= {:.2}",
        result.high_percentile, result.risk_cut, result.return_cut
    );
    let mut table = new_table(vec!["Quadrant", "Companies", "Members"]);
    for quadrant in [
        Quadrant::HighRiskHighReturn,
        Quadrant::HighRiskLowReturn,
        Quadrant::LowRiskHighReturn,
        Quadrant::LowRiskLowReturn,
    ] {
        let members = result.quadrant(quadrant);
        table.add_row(vec![
            quadrant.as_str().to_string(),
            members.len().to_string(),
            join_names(members.iter().map(|s| s.record.name.as_str())),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_hierarchy(
    engine: &mut AnalyticsEngine,
    records: &[Record],
    args: HierarchyArgs,
    json: bool,
) -> Result<()> {
    let hierarchy = engine.hierarchy(records);

    if json {
        let sunburst = engine.sunburst(records);
        return print_json(&serde_json::json!({
            "hierarchy": &*hierarchy,
            "sunburst": sunburst,
        }));
    }

    let mut table = new_table(vec!["Category", "Label", "Companies", "Total funding", "Average"]);
    for parent in &hierarchy.parents {
        table.add_row(vec![
            parent.name.clone(),
            String::new(),
            parent.count.to_string(),
            format_currency(parent.total_funding),
            format_currency(parent.average_funding),
        ]);
        for child in &parent.children {
            table.add_row(vec![
                String::new(),
                child.name.clone(),
                child.count.to_string(),
                format_currency(child.total_funding),
                format_currency(child.average_funding),
            ]);
        }
    }
    println!("{table}");
    println!(
        "{} entity-label pairs, {} attributed funding",
        hierarchy.total_entities,
        format_currency(hierarchy.total_funding)
    );

    let nodes = analytics::to_chart_nodes(&hierarchy, args.metric);
    let mut chart = new_table(vec!["Category", "Chart value"]);
    for node in &nodes {
        chart.add_row(vec![node.name.clone(), node.value.round_dp(2).to_string()]);
    }
    println!("{chart}");

    for (label, parents) in hierarchy.cross_parent_duplicates() {
        eprintln!("warning: '{label}' appears under {}", parents.join(", "));
    }
    Ok(())
}

fn handle_filter(
    engine: &AnalyticsEngine,
    records: &[Record],
    args: FilterArgs,
    json: bool,
) -> Result<()> {
    if args.options {
        let options = FilterOptions::from_records(records);
        if json {
            return print_json(&options);
        }
        let mut table = new_table(vec!["Filter", "Values"]);
        table.add_row(vec!["--sub-industry".to_string(), options.sub_industries.join(", ")]);
        table.add_row(vec!["--product".to_string(), options.product_service_types.join(", ")]);
        table.add_row(vec!["--country".to_string(), options.countries.join(", ")]);
        table.add_row(vec!["--investment-type".to_string(), options.investment_types.join(", ")]);
        println!("{table}");
        return Ok(());
    }

    let criteria = FilterCriteria::from(args);
    let matches = engine.filter(records, &criteria);
    info!(
        matched = matches.len(),
        total = records.len(),
        active = criteria.is_active(),
        "Filter applied"
    );

    if json {
        return print_json(&matches);
    }

    for line in criteria.summary() {
        println!("{line}");
    }
    let mut table = new_table(vec!["Name", "Country", "Investment", "Founded", "Funding"]);
    for record in &matches {
        table.add_row(vec![
            record.name.clone(),
            record.country_name.clone(),
            record.investment_type.clone(),
            record.founded_year.to_string(),
            format_currency(record.total_funding_usd),
        ]);
    }
    println!("{table}");
    println!("{} of {} companies match", matches.len(), records.len());
    Ok(())
}

fn handle_group(records: &[Record], args: GroupArgs, json: bool) -> Result<()> {
    let groups = group_statistics(records, args.by, args.value);
    if json {
        return print_json(&groups);
    }

    let mut table = new_table(vec!["Group", "Count", "Sum", "Avg", "Min", "Max"]);
    for g in &groups {
        table.add_row(vec![
            g.group.clone(),
            g.count.to_string(),
            format_number(g.sum),
            format_number(g.avg),
            format_number(g.min),
            format_number(g.max),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[derive(Serialize)]
struct CorrelationOutput {
    a: NumericField,
    b: NumericField,
    correlation: f64,
}

fn handle_correlate(records: &[Record], args: CorrelateArgs, json: bool) -> Result<()> {
    let correlation = correlate_fields(records, args.a, args.b);
    if json {
        return print_json(&CorrelationOutput {
            a: args.a,
            b: args.b,
            correlation,
        });
    }
    println!("corr({}, {}) = {correlation:.4}", args.a, args.b);
    Ok(())
}

fn handle_countries(records: &[Record], json: bool) -> Result<()> {
    let geo = analytics::country_breakdown(records);
    if json {
        return print_json(&geo);
    }

    let mut table = new_table(vec![
        "Country",
        "Companies",
        "Total funding",
        "Average",
        "Largest",
        "Top sub-industries",
    ]);
    for country in &geo.countries {
        table.add_row(vec![
            country.name.clone(),
            country.company_count.to_string(),
            format_currency(country.total_funding),
            format_currency(country.average_funding),
            format_currency(country.max_funding),
            join_names(country.industries.iter().map(|i| i.name.as_str())),
        ]);
    }
    println!("{table}");
    println!(
        "{} countries, {} companies, {} total",
        geo.total_countries,
        geo.total_companies,
        format_currency(geo.total_funding)
    );
    Ok(())
}

// ==============================================================================
// Output Helpers
// ==============================================================================

fn new_table<T: ToString>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

const MAX_LISTED_NAMES: usize = 5;

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.len() <= MAX_LISTED_NAMES {
        return names.join(", ");
    }
    format!(
        "{}, … (+{})",
        names[..MAX_LISTED_NAMES].join(", "),
        names.len() - MAX_LISTED_NAMES
    )
}

/// Formats a USD amount with a B/M/K suffix.
fn format_currency(amount: Decimal) -> String {
    let units = [
        (Decimal::from(1_000_000_000u64), "B"),
        (Decimal::from(1_000_000u64), "M"),
        (Decimal::from(1_000u64), "K"),
    ];
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    let abs = amount.abs();
    for (scale, suffix) in units {
        if abs >= scale {
            return format!("{sign}${}{suffix}", (abs / scale).round_dp(1));
        }
    }
    format!("{sign}${}", abs.round_dp(0))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
