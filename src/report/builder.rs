//! Assembles report structures from a data snapshot.
//!
//! Every figure is recomputed from the snapshot on each build; nothing is
//! cached between reports.

use crate::analysis::{
    self, Accumulated, Alert, FunnelTotals, HistoryRow, HistoryWindow, Projection, Ratios,
    SectorBenchmark, SectorSummary, SquadSummary, StageObjectives, StageStatuses, StageTimeline,
    Status,
};
use crate::config::{Config, DisplaySettings};
use crate::models::{Client, ClientStatus, MetricField, Note, StageRecord};
use crate::store::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the data snapshot came from.
    pub data_source: String,
    pub generated_at: DateTime<Utc>,
    /// Active release from the snapshot, or the tool version.
    pub app_version: String,
    pub display: DisplaySettings,
}

impl ReportMetadata {
    pub fn new(data_source: &str, snapshot: &Snapshot, display: DisplaySettings) -> Self {
        let app_version = snapshot
            .system_versions
            .iter()
            .find(|v| v.is_active)
            .map(|v| v.version.clone())
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        Self {
            data_source: data_source.to_string(),
            generated_at: Utc::now(),
            app_version,
            display,
        }
    }
}

/// A generated report of either kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Client(Box<ClientReport>),
    Portfolio(PortfolioReport),
}

impl Report {
    /// Every alert the report raised.
    pub fn alerts(&self) -> Vec<&Alert> {
        match self {
            Report::Client(report) => report.alerts.iter().collect(),
            Report::Portfolio(report) => report.clients.iter().flat_map(|c| &c.alerts).collect(),
        }
    }
}

/// Secondary figures derived from the latest month of the selected stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageHighlights {
    pub cpl_improvement: Option<f64>,
    pub expected_leads: Option<f64>,
    pub landing_conversion: Option<f64>,
    /// Headline metric change against the previous month, in percent.
    pub month_over_month: Option<f64>,
}

/// Baseline history and the simulated projection on top of it.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionSection {
    pub window: HistoryWindow,
    pub projection: Option<Projection>,
}

/// Dashboard for one client at one stage.
#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub metadata: ReportMetadata,
    pub client: Client,
    pub stage: u8,
    pub stage_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectives: Option<StageObjectives>,
    pub latest: Option<StageRecord>,
    pub latest_by_stage: BTreeMap<u8, StageRecord>,
    pub statuses: StageStatuses,
    pub highlights: StageHighlights,
    pub accumulated: Accumulated,
    pub ratios: Ratios,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<SectorBenchmark>,
    pub projection: ProjectionSection,
    pub timeline: StageTimeline,
    pub history: Vec<HistoryRow>,
    pub alerts: Vec<Alert>,
    pub notes: Vec<Note>,
}

/// One line of the portfolio client list.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub current_stage: u8,
    pub status: ClientStatus,
    pub alerts: Vec<Alert>,
}

impl ClientSummary {
    /// Most severe alert level raised for the client.
    pub fn worst_alert(&self) -> Option<Status> {
        self.alerts.iter().map(|a| a.level).max()
    }
}

/// Cross-client view over all clients or one squad.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub metadata: ReportMetadata,
    pub scope: String,
    pub clients: Vec<ClientSummary>,
    pub funnel: FunnelTotals,
    pub conversion_rate: f64,
    pub squads: Vec<SquadSummary>,
    pub sectors: Vec<SectorSummary>,
}

/// Find a client by id, or by name ignoring case.
pub fn find_client<'a>(snapshot: &'a Snapshot, key: &str) -> Option<&'a Client> {
    snapshot
        .clients
        .iter()
        .find(|c| c.id == key)
        .or_else(|| {
            snapshot
                .clients
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(key))
        })
}

fn client_records(snapshot: &Snapshot, client_id: &str) -> Vec<StageRecord> {
    snapshot
        .stage_records
        .iter()
        .filter(|r| r.client_id == client_id)
        .cloned()
        .collect()
}

fn highlights(records: &[StageRecord], stage: u8) -> StageHighlights {
    let history = analysis::stage_history(records, stage);
    let Some(latest) = history.last() else {
        return StageHighlights::default();
    };

    let month_over_month = MetricField::headline_for_stage(stage).and_then(|field| {
        let previous = history.len().checked_sub(2).map(|i| history[i])?;
        analysis::percent_change(previous.metric(field)?, latest.metric(field)?)
    });

    let landing_conversion = match (
        latest.metric(MetricField::Leads),
        latest.metric(MetricField::Mqls),
    ) {
        (Some(leads), Some(mqls)) => Some(analysis::landing_conversion(leads, mqls)),
        _ => None,
    };

    StageHighlights {
        cpl_improvement: analysis::cpl_improvement(
            latest.metric(MetricField::CplMarket),
            latest.metric(MetricField::Cpl),
        ),
        expected_leads: analysis::expected_leads(
            latest.investment_value(),
            latest.metric(MetricField::CplMarket),
        ),
        landing_conversion,
        month_over_month,
    }
}

/// Build the dashboard for `client`. `stage` defaults to the client's
/// current stage.
pub fn build_client_report(
    snapshot: &Snapshot,
    client: &Client,
    stage: Option<u8>,
    config: &Config,
    metadata: ReportMetadata,
) -> ClientReport {
    let stage = stage.unwrap_or(client.current_stage);
    let records = client_records(snapshot, &client.id);
    debug!(
        "Building report for {} at stage {} from {} records",
        client.name,
        stage,
        records.len()
    );

    let latest_refs = analysis::latest_by_stage(&records);
    let statuses = analysis::stage_statuses(&latest_refs, stage);
    let alerts = if config.report.include_alerts {
        analysis::client_alerts(&latest_refs)
    } else {
        Vec::new()
    };
    let latest_by_stage: BTreeMap<u8, StageRecord> = latest_refs
        .into_iter()
        .map(|(stage, record)| (stage, record.clone()))
        .collect();

    let accumulated = analysis::accumulate_up_to(&records, stage);
    let ratios = analysis::derived_ratios(&accumulated);

    let benchmark = if config.report.include_sector_benchmark {
        MetricField::headline_for_stage(stage).and_then(|field| {
            analysis::sector_benchmark(
                client,
                &snapshot.clients,
                &snapshot.stage_records,
                stage,
                field,
            )
        })
    } else {
        None
    };

    let window = analysis::historical_average(&records, stage, config.projection.window_size);
    let projection = window
        .average()
        .map(|avg| analysis::naive_projection(avg, config.projection.increase_percent));

    let history = if config.report.include_history {
        analysis::history_rows(&records, stage)
    } else {
        Vec::new()
    };

    let mut notes: Vec<Note> = snapshot
        .notes
        .iter()
        .filter(|n| n.client_id == client.id)
        .cloned()
        .collect();
    notes.sort_by(|a, b| b.created_date.cmp(&a.created_date));

    ClientReport {
        metadata,
        client: client.clone(),
        stage,
        stage_name: analysis::stage_name(stage).to_string(),
        objectives: if config.report.include_objectives {
            analysis::objectives(stage).copied()
        } else {
            None
        },
        latest: latest_by_stage.get(&stage).cloned(),
        latest_by_stage,
        statuses,
        highlights: highlights(&records, stage),
        accumulated,
        ratios,
        benchmark,
        projection: ProjectionSection { window, projection },
        timeline: analysis::stage_timeline(&records),
        history,
        alerts,
        notes,
    }
}

/// Build the portfolio view over every client, or over one squad's clients
/// when `squad` names a squad by id or name.
pub fn build_portfolio_report(
    snapshot: &Snapshot,
    squad: Option<&str>,
    metadata: ReportMetadata,
) -> Option<PortfolioReport> {
    let (scope, clients, squads): (String, Vec<Client>, Vec<_>) = match squad {
        Some(key) => {
            let squad = snapshot
                .squads
                .iter()
                .find(|s| s.id == key || s.name.eq_ignore_ascii_case(key))?;
            let members = snapshot
                .clients
                .iter()
                .filter(|c| squad.contains(&c.id))
                .cloned()
                .collect();
            (format!("Squad {}", squad.name), members, vec![squad.clone()])
        }
        None => (
            "All clients".to_string(),
            snapshot.clients.clone(),
            snapshot.squads.clone(),
        ),
    };

    let summaries = clients
        .iter()
        .map(|client| {
            let records = client_records(snapshot, &client.id);
            let latest = analysis::latest_by_stage(&records);
            ClientSummary {
                id: client.id.clone(),
                name: client.name.clone(),
                sector: client.sector_or_other().to_string(),
                current_stage: client.current_stage,
                status: client.status,
                alerts: analysis::client_alerts(&latest),
            }
        })
        .collect();

    let funnel = analysis::consolidated_funnel(&clients, &snapshot.stage_records);

    Some(PortfolioReport {
        metadata,
        scope,
        clients: summaries,
        conversion_rate: funnel.conversion_rate(),
        funnel,
        squads: analysis::squad_totals(&squads, &clients, &snapshot.stage_records),
        sectors: analysis::sector_comparison(&clients, &snapshot.stage_records),
    })
}
