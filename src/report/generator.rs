//! Markdown and JSON report generation.
//!
//! This module renders client and portfolio reports. Rounding happens here
//! only: currency with two decimals, percentages with one, projected
//! volumes as whole numbers, and absent values as "-".

use crate::analysis::{
    objectives, stage_name, HistoryRow, HistoryWindow, Projection, SectorBenchmark, Status,
};
use crate::models::{MetricField, MetricUnit, StageMetrics, StageRecord};
use crate::report::builder::{ClientReport, PortfolioReport, Report, ReportMetadata};
use anyhow::Result;

/// Placeholder for values that were never recorded.
const MISSING: &str = "-";

/// Separators used when rendering numbers for a display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    decimal: char,
    thousands: char,
}

impl NumberFormat {
    /// Portuguese and Spanish style for `pt-*`/`es-*`, English style otherwise.
    pub fn for_language(language: &str) -> Self {
        let lang = language.to_lowercase();
        if lang.starts_with("pt") || lang.starts_with("es") {
            Self {
                decimal: ',',
                thousands: '.',
            }
        } else {
            Self {
                decimal: '.',
                thousands: ',',
            }
        }
    }

    /// Render `value` with `decimals` places and grouped thousands.
    pub fn number(&self, value: f64, decimals: usize) -> String {
        let fixed = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, digit) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.thousands);
            }
            grouped.push(digit);
        }

        let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push(self.decimal);
            out.push_str(frac);
        }
        out
    }

    pub fn currency(&self, value: f64) -> String {
        format!("R$ {}", self.number(value, 2))
    }

    pub fn percent(&self, value: f64) -> String {
        format!("{}%", self.number(value, 1))
    }

    pub fn value(&self, value: f64, unit: MetricUnit) -> String {
        match unit {
            MetricUnit::Currency => self.currency(value),
            MetricUnit::Percent => self.percent(value),
            MetricUnit::Multiplier => format!("{}x", self.number(value, 1)),
            MetricUnit::Count => self.number(value, 0),
        }
    }

    /// Like [`NumberFormat::value`], with "-" for absent values.
    pub fn optional(&self, value: Option<f64>, unit: MetricUnit) -> String {
        value
            .map(|v| self.value(v, unit))
            .unwrap_or_else(|| MISSING.to_string())
    }

    fn signed_percent(&self, value: f64) -> String {
        if value > 0.0 {
            format!("+{}", self.percent(value))
        } else {
            self.percent(value)
        }
    }
}

/// Metrics shown for the latest month of a stage.
fn stage_fields(stage: u8) -> &'static [MetricField] {
    match stage {
        2 => &[
            MetricField::Investment,
            MetricField::Leads,
            MetricField::Cpl,
            MetricField::CplMarket,
            MetricField::Reach,
            MetricField::Impressions,
            MetricField::Frequency,
        ],
        3 => &[
            MetricField::Investment,
            MetricField::Leads,
            MetricField::Mqls,
            MetricField::MqlCost,
            MetricField::Frequency,
        ],
        4 => &[MetricField::LandingConversion],
        5 => &[
            MetricField::Investment,
            MetricField::Mqls,
            MetricField::Sales,
            MetricField::Revenue,
            MetricField::Cac,
            MetricField::Roas,
            MetricField::FunnelConversion,
        ],
        _ => &[],
    }
}

/// Generate the Markdown rendering of either report kind.
pub fn generate_markdown_report(report: &Report) -> String {
    match report {
        Report::Client(client) => generate_client_markdown(client),
        Report::Portfolio(portfolio) => generate_portfolio_markdown(portfolio),
    }
}

/// Generate a complete Markdown client report.
pub fn generate_client_markdown(report: &ClientReport) -> String {
    let fmt = NumberFormat::for_language(&report.metadata.display.language);
    let mut output = String::new();

    output.push_str(&format!(
        "# {} - Stage {}: {}\n\n",
        report.client.name, report.stage, report.stage_name
    ));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_client_section(report));

    if let Some(ref obj) = report.objectives {
        output.push_str("## Objectives\n\n");
        for goal in obj.goals {
            output.push_str(&format!("- {}\n", goal));
        }
        if let Some((title, summary)) = obj.next {
            output.push_str(&format!("\n**Next stage:** {} - {}\n", title, summary));
        }
        output.push('\n');
    }

    output.push_str(&generate_latest_section(report, &fmt));
    output.push_str(&generate_totals_section(report, &fmt));
    output.push_str(&generate_cost_funnel_section(report, &fmt));

    if let Some(ref benchmark) = report.benchmark {
        output.push_str(&generate_benchmark_section(benchmark, &fmt));
    }

    output.push_str(&generate_projection_section(
        &report.projection.window,
        report.projection.projection.as_ref(),
        &fmt,
    ));
    output.push_str(&generate_timeline_section(report));

    if !report.history.is_empty() {
        output.push_str(&generate_history_section(report.stage, &report.history, &fmt));
    }

    output.push_str(&generate_alerts_section(report));

    if !report.notes.is_empty() {
        output.push_str("## Notes\n\n");
        for note in &report.notes {
            let date = note
                .created_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| MISSING.to_string());
            let author = note.created_by.as_deref().unwrap_or("unknown");
            output.push_str(&format!("- **{}** ({}): {}\n", date, author, note.content));
        }
        output.push('\n');
    }

    output.push_str(&generate_footer(&report.metadata));
    output
}

/// Generate a complete Markdown portfolio report.
pub fn generate_portfolio_markdown(report: &PortfolioReport) -> String {
    let fmt = NumberFormat::for_language(&report.metadata.display.language);
    let mut output = String::new();

    output.push_str(&format!("# Portfolio Report - {}\n\n", report.scope));
    output.push_str(&generate_metadata_section(&report.metadata));

    // Consolidated funnel
    let funnel = &report.funnel;
    output.push_str("## Consolidated Funnel\n\n");
    output.push_str("| Investment | Leads | MQLs | Sales | Revenue | Conversion |\n");
    output.push_str("|---:|---:|---:|---:|---:|---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} |\n\n",
        fmt.currency(funnel.investment),
        fmt.number(funnel.leads, 0),
        fmt.number(funnel.mqls, 0),
        fmt.number(funnel.sales, 0),
        fmt.currency(funnel.revenue),
        fmt.percent(report.conversion_rate),
    ));

    // Clients
    output.push_str("## Clients\n\n");
    if report.clients.is_empty() {
        output.push_str("No clients registered.\n\n");
    } else {
        output.push_str("| Client | Sector | Stage | Status | Alerts |\n");
        output.push_str("|:---|:---|:---|:---|:---:|\n");
        for client in &report.clients {
            let alerts = match client.worst_alert() {
                Some(level) => format!("{} {}", level.emoji(), client.alerts.len()),
                None => "0".to_string(),
            };
            output.push_str(&format!(
                "| {} | {} | {}. {} | {} {} | {} |\n",
                client.name,
                client.sector,
                client.current_stage,
                stage_name(client.current_stage),
                client.status.emoji(),
                client.status,
                alerts
            ));
        }
        output.push('\n');
    }

    // Squads
    if !report.squads.is_empty() {
        output.push_str("## Squads\n\n");
        output.push_str("| Squad | Clients | Investment | Leads | MQLs | Sales | Conversion |\n");
        output.push_str("|:---|:---:|---:|---:|---:|---:|---:|\n");
        for squad in &report.squads {
            output.push_str(&format!(
                "| {} ({}) | {} | {} | {} | {} | {} | {} |\n",
                squad.name,
                squad.color,
                squad.clients,
                fmt.currency(squad.totals.investment),
                fmt.number(squad.totals.leads, 0),
                fmt.number(squad.totals.mqls, 0),
                fmt.number(squad.totals.sales, 0),
                fmt.percent(squad.totals.conversion_rate()),
            ));
        }
        output.push('\n');
    }

    // Sectors
    if !report.sectors.is_empty() {
        output.push_str("## Sector Comparison\n\n");
        output.push_str("| Sector | Clients | CPL | MQL cost | Conversion | CAC | ROAS |\n");
        output.push_str("|:---|:---:|---:|---:|---:|---:|---:|\n");
        for sector in &report.sectors {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                sector.sector,
                sector.clients,
                fmt.currency(sector.cpl),
                fmt.currency(sector.mql_cost),
                fmt.percent(sector.conversion),
                fmt.currency(sector.cac),
                fmt.value(sector.roas, MetricUnit::Multiplier),
            ));
        }
        output.push('\n');
    }

    output.push_str(&generate_footer(&report.metadata));
    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    if !metadata.display.logo_url.is_empty() {
        section.push_str(&format!("![logo]({})\n\n", metadata.display.logo_url));
    }

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data source:** `{}`\n", metadata.data_source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Display:** {} theme, {} charts, {}\n",
        metadata.display.theme_color, metadata.display.chart_type, metadata.display.language
    ));
    section.push('\n');

    section
}

fn generate_client_section(report: &ClientReport) -> String {
    let client = &report.client;
    let mut section = String::new();

    section.push_str("## Client\n\n");
    section.push_str(&format!(
        "- **Status:** {} {}\n",
        client.status.emoji(),
        client.status
    ));
    section.push_str(&format!(
        "- **Current stage:** {}. {}\n",
        client.current_stage,
        stage_name(client.current_stage)
    ));
    section.push_str(&format!("- **Sector:** {}\n", client.sector_or_other()));
    if let Some(ref responsible) = client.responsible {
        section.push_str(&format!("- **Responsible:** {}\n", responsible));
    }
    if let Some(start) = client.start_date {
        section.push_str(&format!("- **Started:** {}\n", start.format("%Y-%m-%d")));
    }
    section.push('\n');

    section
}

fn field_status(report: &ClientReport, field: MetricField) -> Option<Status> {
    match field {
        MetricField::Cpl => report.statuses.cpl,
        MetricField::MqlCost => report.statuses.mql_cost,
        MetricField::Frequency => report.statuses.frequency,
        _ => None,
    }
}

/// Latest month of the selected stage, with status colours.
fn generate_latest_section(report: &ClientReport, fmt: &NumberFormat) -> String {
    let mut section = String::new();
    section.push_str("## Latest Metrics\n\n");

    let Some(ref record) = report.latest else {
        section.push_str("No data recorded for this stage yet.\n\n");
        return section;
    };

    section.push_str(&format!("*Month: {}*\n\n", record.month));

    match &record.metrics {
        StageMetrics::Validation(outcome) => {
            let verdict = if outcome.stages_ok {
                "All stages validated"
            } else {
                "Stages need adjustments"
            };
            section.push_str(&format!("- **Result:** {}\n", verdict));
            section.push_str(&format!(
                "- **Bottlenecks:** {}\n",
                outcome.bottlenecks.as_deref().unwrap_or(MISSING)
            ));
            section.push_str(&format!(
                "- **Next steps:** {}\n\n",
                outcome.next_steps.as_deref().unwrap_or(MISSING)
            ));
            return section;
        }
        StageMetrics::Conversion(pages) => {
            section.push_str("| Page | Conversion |\n");
            section.push_str("|:---|---:|\n");
            for (name, value) in [
                ("Base", pages.conversion_lp_base),
                ("Version A", pages.conversion_lp_a),
                ("Version B", pages.conversion_lp_b),
            ] {
                section.push_str(&format!(
                    "| {} | {} |\n",
                    name,
                    fmt.optional(value, MetricUnit::Percent)
                ));
            }
            section.push('\n');
        }
        _ => {}
    }

    let fields = stage_fields(report.stage);
    if !fields.is_empty() {
        section.push_str("| Metric | Value | Status |\n");
        section.push_str("|:---|---:|:---:|\n");
        for field in fields {
            let status = field_status(report, *field)
                .map(|s| format!("{} {}", s.emoji(), s))
                .unwrap_or_default();
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                field,
                fmt.optional(record.metric(*field), field.unit()),
                status
            ));
        }
        section.push('\n');
    }

    if report.stage == 3 {
        section.push_str(&format!(
            "MQL cost target: {}\n\n",
            fmt.currency(report.statuses.mql_cost_meta)
        ));
    }

    let h = &report.highlights;
    let mut lines = Vec::new();
    if let Some(change) = h.month_over_month {
        lines.push(format!("Change vs previous month: {}", fmt.signed_percent(change)));
    }
    if let Some(improvement) = h.cpl_improvement {
        lines.push(format!("CPL vs market: {}", fmt.signed_percent(improvement)));
    }
    if let Some(leads) = h.expected_leads {
        lines.push(format!("Leads expected at market CPL: {}", fmt.number(leads, 0)));
    }
    if let Some(conversion) = h.landing_conversion {
        lines.push(format!("Lead to MQL conversion: {}", fmt.percent(conversion)));
    }
    for line in lines {
        section.push_str(&format!("- {}\n", line));
    }
    section.push('\n');

    section
}

fn generate_totals_section(report: &ClientReport, fmt: &NumberFormat) -> String {
    let acc = &report.accumulated;
    let ratios = &report.ratios;
    let mut section = String::new();

    section.push_str(&format!("## Accumulated up to Stage {}\n\n", report.stage));
    section.push_str("| Investment | Leads | MQLs | Sales | Revenue |\n");
    section.push_str("|---:|---:|---:|---:|---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        fmt.currency(acc.investment),
        fmt.number(acc.leads, 0),
        fmt.number(acc.mqls, 0),
        fmt.number(acc.sales, 0),
        fmt.currency(acc.revenue),
    ));
    section.push_str(&format!(
        "- **Conversion:** {}\n- **CAC:** {}\n- **ROAS:** {}\n\n",
        fmt.percent(ratios.conversion_rate),
        fmt.currency(ratios.cac),
        fmt.value(ratios.roas, MetricUnit::Multiplier),
    ));

    section
}

/// CPL at stage 2, MQL cost at stage 3 and CAC at stage 5.
fn generate_cost_funnel_section(report: &ClientReport, fmt: &NumberFormat) -> String {
    let steps = [
        (2u8, MetricField::Cpl),
        (3, MetricField::MqlCost),
        (5, MetricField::Cac),
    ];
    let latest = |stage: u8, field: MetricField| -> Option<f64> {
        report
            .latest_by_stage
            .get(&stage)
            .and_then(|r: &StageRecord| r.metric(field))
    };

    if steps.iter().all(|(s, f)| latest(*s, *f).is_none()) {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Cost Funnel\n\n");
    section.push_str("| Stage | Metric | Cost | Market |\n");
    section.push_str("|:---|:---|---:|---:|\n");
    for (stage, field) in steps {
        // Only CPL has a market reference
        let market = match field {
            MetricField::Cpl => latest(stage, MetricField::CplMarket),
            _ => None,
        };
        section.push_str(&format!(
            "| {}. {} | {} | {} | {} |\n",
            stage,
            stage_name(stage),
            field,
            fmt.optional(latest(stage, field), MetricUnit::Currency),
            fmt.optional(market, MetricUnit::Currency)
        ));
    }
    section.push('\n');

    section
}

fn generate_benchmark_section(benchmark: &SectorBenchmark, fmt: &NumberFormat) -> String {
    let unit = benchmark.field.unit();
    let mut section = String::new();

    section.push_str("## Sector Benchmark\n\n");
    section.push_str(&format!(
        "{} at stage {} against the `{}` sector.\n\n",
        benchmark.field, benchmark.stage, benchmark.sector
    ));
    section.push_str("| Client | Sector average | Difference |\n");
    section.push_str("|---:|---:|---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        fmt.optional(benchmark.client_value, unit),
        fmt.value(benchmark.sector_average, unit),
        benchmark
            .difference_percent
            .map(|d| fmt.signed_percent(d))
            .unwrap_or_else(|| MISSING.to_string()),
    ));

    section
}

fn generate_projection_section(
    window: &HistoryWindow,
    projection: Option<&Projection>,
    fmt: &NumberFormat,
) -> String {
    let mut section = String::new();
    section.push_str("## Projection\n\n");

    let (first_month, last_month, projection) = match (window, projection) {
        (
            HistoryWindow::Ready {
                first_month,
                last_month,
                ..
            },
            Some(projection),
        ) => (first_month, last_month, projection),
        (HistoryWindow::Insufficient { found, required }, _) => {
            section.push_str(&format!(
                "Not enough history for a projection: {} of {} months recorded.\n\n",
                found, required
            ));
            return section;
        }
        _ => return String::new(),
    };

    section.push_str(&format!(
        "Average of {} to {} with investment raised by {}.\n\n",
        first_month,
        last_month,
        fmt.percent(projection.increase_percent)
    ));
    section.push_str("| Metric | Current | Projected |\n");
    section.push_str("|:---|---:|---:|\n");

    let current = &projection.current;
    let projected = &projection.projected;
    let rows = [
        ("Investment", fmt.currency(current.investment), fmt.currency(projected.investment)),
        ("Leads", fmt.number(current.leads, 0), fmt.number(projected.leads.round(), 0)),
        ("MQLs", fmt.number(current.mqls, 0), fmt.number(projected.mqls.round(), 0)),
        ("Sales", fmt.number(current.sales, 0), fmt.number(projected.sales.round(), 0)),
        ("CPL", fmt.currency(current.cpl), fmt.currency(projected.cpl)),
        ("MQL cost", fmt.currency(current.mql_cost), fmt.currency(projected.mql_cost)),
    ];
    for (label, now, then) in rows {
        section.push_str(&format!("| {} | {} | {} |\n", label, now, then));
    }
    section.push('\n');

    section
}

fn generate_timeline_section(report: &ClientReport) -> String {
    let timeline = &report.timeline;
    if timeline.spans.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Timeline\n\n");
    section.push_str("| Stage | From | To | Months |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for span in &timeline.spans {
        section.push_str(&format!(
            "| {}. {} | {} | {} | {} |\n",
            span.stage,
            stage_name(span.stage),
            span.first_month,
            span.last_month,
            span.months
        ));
    }
    section.push_str(&format!(
        "\nAverage of {:.1} months per stage.\n\n",
        timeline.average_months
    ));

    section
}

fn generate_history_section(stage: u8, rows: &[HistoryRow], fmt: &NumberFormat) -> String {
    let fields = stage_fields(stage);
    let mut section = String::new();

    section.push_str("## History\n\n");
    if fields.is_empty() {
        for row in rows {
            section.push_str(&format!("- {}\n", row.record.month));
        }
        section.push('\n');
        return section;
    }

    let header: Vec<&str> = fields.iter().map(|f| f.label()).collect();
    section.push_str(&format!("| Month | {} | On target |\n", header.join(" | ")));
    section.push_str(&format!("|:---|{}:---:|\n", "---:|".repeat(fields.len())));

    for row in rows {
        let values: Vec<String> = fields
            .iter()
            .map(|f| fmt.optional(row.record.metric(*f), f.unit()))
            .collect();
        let flag = match row.on_target {
            Some(true) => Status::Success.emoji(),
            Some(false) => Status::Danger.emoji(),
            None => MISSING,
        };
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            row.record.month,
            values.join(" | "),
            flag
        ));
    }
    section.push('\n');

    section
}

fn generate_alerts_section(report: &ClientReport) -> String {
    let mut section = String::new();
    section.push_str("## Alerts\n\n");

    if report.alerts.is_empty() {
        section.push_str("No alerts. Every tracked metric is within its target band.\n\n");
        return section;
    }

    let mut alerts = report.alerts.clone();
    alerts.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.stage.cmp(&b.stage)));
    for alert in &alerts {
        section.push_str(&format!(
            "- {} **{}** (stage {}): {}\n",
            alert.level.emoji(),
            alert.level,
            alert.stage,
            alert.message
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer(metadata: &ReportMetadata) -> String {
    format!(
        "---\n\n*Report generated by StagePulse v{}*\n",
        metadata.app_version
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Title of the objectives block for a stage, used in console summaries.
pub fn stage_title(stage: u8) -> String {
    objectives(stage)
        .map(|o| o.title.to_string())
        .unwrap_or_else(|| stage_name(stage).to_string())
}
