//! PEPM Analytics CLI
//!
//! Command-line access to the calculation, what-if, peer ranking and grid engines

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use pepm_analytics::format::{format_compact_currency, format_currency, format_signed_percent, CurrencyUnit};
use pepm_analytics::grid::{GridModel, SortColumn, SortDirection, SortSpec, ViewMode};
use pepm_analytics::loader::{load_peers, load_periods, split_reference};
use pepm_analytics::peers::{sparkline_points, CohortFilter, Dimension, DimensionSet};
use pepm_analytics::whatif::{shift_rebates, RebateSchedule, ShiftMode, WhatIfScenario, WhatIfState};
use pepm_analytics::{AnalyticsConfig, AnalyticsService, PepmInput};

#[derive(Parser, Debug)]
#[command(name = "pepm_analytics")]
#[command(about = "PEPM cost metrics, what-if modeling, peer ranking and reporting grid")]
struct Args {
    /// JSON configuration file (defaults apply to anything omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-employee-per-month cost
    Pepm {
        #[arg(long)]
        claims: f64,
        #[arg(long)]
        member_months: f64,
        #[arg(long, default_value_t = 0.0)]
        admin_fees: f64,
        #[arg(long, default_value_t = 0.0)]
        stop_loss: f64,
    },

    /// Variance of an actual value against its target
    Variance {
        #[arg(long)]
        actual: f64,
        #[arg(long)]
        target: f64,
    },

    /// Headcount adjustment with total cost held constant
    WhatIf {
        #[arg(long)]
        employees: u32,
        #[arg(long)]
        pepm: f64,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value_t = 0.0)]
        savings: f64,
        /// Adjustment in percent, clamped to the configured range
        #[arg(long, allow_hyphen_values = true)]
        adjust: f64,
        /// Commit the adjustment into the baseline
        #[arg(long)]
        apply: bool,
    },

    /// Shift quarterly rebate receipts by a number of months
    Rebates {
        /// Q1..Q4 amounts
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        quarters: Vec<f64>,
        #[arg(long, allow_hyphen_values = true)]
        months: i32,
        #[arg(long, default_value = "rotate")]
        mode: ShiftMode,
        #[arg(long, default_value_t = 0.0)]
        member_months: f64,
    },

    /// Rank a roster against one of its organizations
    Peers {
        /// Peer roster CSV
        #[arg(long)]
        roster: PathBuf,
        /// Id of the reference organization in the roster
        #[arg(long)]
        reference: String,
        /// Active dimensions (size, industry, planType, carrier, network)
        #[arg(long, value_delimiter = ',')]
        dimensions: Vec<Dimension>,
        /// Show every candidate instead of the top-K
        #[arg(long)]
        expanded: bool,
    },

    /// Build and page through the reporting grid
    Grid {
        /// Period records CSV
        #[arg(long)]
        periods: PathBuf,
        /// Row ids to expand
        #[arg(long, value_delimiter = ',')]
        expand: Vec<String>,
        /// Sort column (month, actualPEPM, targetPEPM, variance)
        #[arg(long)]
        sort: Option<SortColumn>,
        #[arg(long)]
        desc: bool,
        /// Scroll offset in pixels
        #[arg(long, default_value_t = 0.0)]
        scroll: f64,
        /// Root row ids to keep (cohort filter)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        #[arg(long)]
        advanced: bool,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serializing output")?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AnalyticsConfig::from_json_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalyticsConfig::default(),
    };
    let service = AnalyticsService::new(config);

    match args.command {
        Command::Pepm { claims, member_months, admin_fees, stop_loss } => {
            let input = PepmInput::new(claims, member_months)
                .with_admin_fees(admin_fees)
                .with_stop_loss_recovery(stop_loss);
            let result = service.pepm(&input).context("calculating PEPM")?;

            if args.json {
                return print_json(&result);
            }
            println!("PEPM:      {}", format_currency(result.pepm_actual, CurrencyUnit::Dollars, true));
            println!("Formula:   {}", result.formula);
            println!("  Medical    {:>12.2}", result.breakdown.medical);
            println!("  Pharmacy   {:>12.2}", result.breakdown.rx);
            println!("  Admin      {:>12.2}", result.breakdown.admin);
            println!("  Stop-loss  {:>12.2}", result.breakdown.stop_loss);
            if let Some(error) = &result.error {
                println!("Note: {}", error);
            }
        }

        Command::Variance { actual, target } => {
            let result = service.variance(actual, target);
            if args.json {
                return print_json(&result);
            }
            println!("Variance:  {:+.2}", result.variance);
            println!("Percent:   {}", format_signed_percent(result.variance_percent, 2));
            println!("Direction: {:?}", result.direction);
            if let Some(warning) = &result.warning {
                println!("Warning:   {}", warning);
            }
        }

        Command::WhatIf { employees, pepm, target, savings, adjust, apply } => {
            let mut session = service.what_if_session(WhatIfScenario::new(employees, pepm, target, savings));
            let view = session.set_adjustment(adjust);

            if apply && session.state() == WhatIfState::Adjusted {
                session.apply();
            }
            if args.json {
                return print_json(&view);
            }

            let a = &view.adjusted;
            println!("Adjustment:  {}", format_signed_percent(view.scenario.employee_adjustment, 1));
            println!("Employees:   {} -> {} ({:+})", employees, a.adjusted_employee_count, a.employee_delta);
            println!(
                "PEPM:        {} -> {}",
                format_currency(pepm, CurrencyUnit::Dollars, true),
                format_currency(a.adjusted_pepm, CurrencyUnit::Dollars, true)
            );
            println!(
                "Savings:     {} ({})",
                format_compact_currency(a.adjusted_savings, CurrencyUnit::Dollars),
                format_compact_currency(a.savings_delta, CurrencyUnit::Dollars)
            );
            if apply {
                info!("baseline after apply: {:?}", session.scenario());
                println!("Applied; new baseline {} employees", session.scenario().employee_count);
            }
        }

        Command::Rebates { quarters, months, mode, member_months } => {
            let quarters: [f64; 4] = match quarters.as_slice() {
                [q1, q2, q3, q4] => [*q1, *q2, *q3, *q4],
                _ => bail!("--quarters needs exactly four amounts"),
            };
            let schedule = RebateSchedule::from_quarters(quarters);
            let shift = shift_rebates(&schedule, months, mode, member_months);

            if args.json {
                return print_json(&shift);
            }
            println!("{:>4} {:>14} {:>14}", "Qtr", "Original", "Shifted");
            for (i, (before, after)) in schedule.quarters().iter().zip(shift.rebates.quarters()).enumerate() {
                println!("{:>4} {:>14.2} {:>14.2}", format!("Q{}", i + 1), before, after);
            }
            println!("PEPM impact: {:+.2}", shift.impact);
        }

        Command::Peers { roster, reference, dimensions, expanded } => {
            let roster = load_peers(&roster).with_context(|| format!("loading roster {}", roster.display()))?;
            let (reference, candidates) = split_reference(&roster, &reference)?;
            let dimensions = (!dimensions.is_empty()).then(|| dimensions.into_iter().collect::<DimensionSet>());
            let ranking = service.rank_peers(&reference, &candidates, dimensions, expanded);

            if args.json {
                return print_json(&ranking);
            }
            println!("{:<24} {:>6} {:>10}  {}", "Organization", "Score", "PEPM", "Matches");
            println!("{}", "-".repeat(72));
            for peer in &ranking.peers {
                println!(
                    "{:<24} {:>6} {:>10.2}  {}",
                    peer.organization.name,
                    peer.similarity_score,
                    peer.organization.pepm_actual,
                    peer.match_factors.join(", ")
                );
                if let Some(series) = &peer.organization.sparkline_data {
                    log::debug!("{} sparkline: {:?}", peer.organization.id, sparkline_points(series));
                }
            }
            if let Some(stats) = ranking.stats {
                println!();
                println!("Cohort avg PEPM:    {:.2}", stats.avg_pepm);
                println!("Cohort avg savings: {}", format_compact_currency(stats.avg_savings, CurrencyUnit::Dollars));
                if stats.current_rank > 0 {
                    println!(
                        "Rank {} of {} ({}th percentile){}",
                        stats.current_rank,
                        stats.total_peers,
                        stats.percentile,
                        ranking.badge.map(|b| format!(" - {}", b.label())).unwrap_or_default()
                    );
                }
            }
        }

        Command::Grid { periods, expand, sort, desc, scroll, only, advanced } => {
            let records = load_periods(&periods).with_context(|| format!("loading periods {}", periods.display()))?;
            let mut grid: GridModel = service.build_grid(&records).context("building grid rows")?;

            for id in &expand {
                grid.toggle_expansion(id);
            }
            if let Some(column) = sort {
                let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                grid.set_sort(Some(SortSpec { column, direction }));
            }
            if !only.is_empty() {
                grid.set_filter(Some(CohortFilter::from_ids(only)));
            }
            if advanced {
                grid.set_view_mode(ViewMode::Advanced);
            }
            grid.scroll_to(scroll);

            let window = grid.visible();
            if args.json {
                return print_json(&serde_json::json!({
                    "start": window.start,
                    "end": window.end,
                    "totalHeight": window.total_height(),
                    "rows": window.rows,
                    "summary": grid.summary(),
                }));
            }

            println!("{:>7} {:<28} {:>12} {:>12} {:>12} {:>9}", "Top", "Month", "Actual", "Target", "Variance", "Diff");
            println!("{}", "-".repeat(86));
            for (top, row) in window.positioned() {
                let marker = match (row.has_line_items, row.is_expanded) {
                    (true, true) => "v ",
                    (true, false) => "> ",
                    _ => "  ",
                };
                let label = format!("{}{}{}", "  ".repeat(row.level), marker, row.month);
                println!(
                    "{:>7.0} {:<28} {:>12.2} {:>12.2} {:>12.2} {:>9}",
                    top,
                    label,
                    row.actual_pepm,
                    row.target_pepm,
                    row.variance,
                    format_signed_percent(row.percent_diff, 1)
                );
            }

            let summary = grid.summary();
            match (summary.expanded, summary.visible) {
                (Some(expanded), Some(visible)) => {
                    println!("Total Rows: {} | Expanded: {} | Visible: {}", summary.total_rows, expanded, visible)
                }
                _ => println!("Total Rows: {}", summary.total_rows),
            }
        }
    }

    Ok(())
}
