//! Data models for client funnel reporting.
//!
//! This module contains the entities persisted by the data store
//! (clients, stage records, squads, notes, settings) and the typed
//! per-stage metric variants the aggregator works on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while turning a raw stored record into a typed one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid month '{0}': expected zero-padded YYYY-MM")]
    InvalidMonth(String),
    #[error("stage {0} carries no metrics (expected 2 through 6)")]
    StageOutOfRange(u8),
}

/// Calendar month a stage record belongs to.
///
/// Ordering is chronological: year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month, rejecting anything outside 1..=12 or a four digit year.
    pub fn new(year: i32, month: u32) -> Result<Self, RecordError> {
        if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(RecordError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }
}

impl FromStr for Month {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecordError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Month {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Health status an operator assigns to a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    #[serde(alias = "saudavel")]
    Healthy,
    #[serde(alias = "atencao")]
    Attention,
    #[serde(alias = "critico")]
    Critical,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientStatus::Healthy => write!(f, "Healthy"),
            ClientStatus::Attention => write!(f, "Attention"),
            ClientStatus::Critical => write!(f, "Critical"),
        }
    }
}

impl ClientStatus {
    /// Returns an emoji representation of the status.
    pub fn emoji(&self) -> &'static str {
        match self {
            ClientStatus::Healthy => "🟢",
            ClientStatus::Attention => "🟡",
            ClientStatus::Critical => "🔴",
        }
    }
}

fn default_current_stage() -> u8 {
    1
}

/// A client of the agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    /// Category tag used for sector benchmarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Funnel stage the client is currently in (1-6).
    #[serde(default = "default_current_stage")]
    pub current_stage: u8,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
}

impl Client {
    /// Sector tag, with untagged clients grouped under "other".
    pub fn sector_or_other(&self) -> &str {
        match self.sector.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => "other",
        }
    }
}

/// Stage 2: demand generation (lead and brand-awareness campaigns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandMetrics {
    pub investment_lead_generation: Option<f64>,
    pub investment_brand_awareness: Option<f64>,
    pub cpl_market: Option<f64>,
    pub cpl_basetech: Option<f64>,
    pub cpl_client: Option<f64>,
    pub cpl_accumulated: Option<f64>,
    pub leads_whatsapp: Option<f64>,
    pub reach: Option<f64>,
    pub impressions: Option<f64>,
    pub frequency: Option<f64>,
    pub projection_mql_quantity: Option<f64>,
    pub projection_mql_cost: Option<f64>,
}

/// Stage 3: qualified leads (MQLs) and the A/B improvement plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualificationMetrics {
    pub mql_quantity: Option<f64>,
    pub mql_cost: Option<f64>,
    pub mql_cost_accumulated: Option<f64>,
    pub leads_whatsapp: Option<f64>,
    pub current_conversion_rate: Option<f64>,
    pub target_conversion_improvement: Option<f64>,
    pub projected_mql_cost_improved: Option<f64>,
    pub reach: Option<f64>,
    pub impressions: Option<f64>,
    pub frequency: Option<f64>,
}

/// Stage 4: landing page conversion rates (percent).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionMetrics {
    pub conversion_lp_base: Option<f64>,
    pub conversion_lp_a: Option<f64>,
    pub conversion_lp_b: Option<f64>,
}

impl ConversionMetrics {
    /// Best conversion among the tested landing pages, missing pages as 0.
    pub fn best(&self) -> f64 {
        [self.conversion_lp_base, self.conversion_lp_a, self.conversion_lp_b]
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .fold(0.0, f64::max)
    }
}

/// Stage 5: sales indicators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesMetrics {
    pub cac: Option<f64>,
    pub roas: Option<f64>,
    pub mql_quantity: Option<f64>,
    pub funnel_conversion: Option<f64>,
    pub sales_count: Option<f64>,
    pub revenue: Option<f64>,
}

/// Stage 6: qualitative validation of the funnel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub stages_ok: bool,
    pub bottlenecks: Option<String>,
    pub next_steps: Option<String>,
}

/// Stage-specific metrics, one case per funnel stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageMetrics {
    Demand(DemandMetrics),
    Qualification(QualificationMetrics),
    Conversion(ConversionMetrics),
    Sales(SalesMetrics),
    Validation(ValidationOutcome),
}

impl StageMetrics {
    /// Numeric stage tag (2-6).
    pub fn stage(&self) -> u8 {
        match self {
            StageMetrics::Demand(_) => 2,
            StageMetrics::Qualification(_) => 3,
            StageMetrics::Conversion(_) => 4,
            StageMetrics::Sales(_) => 5,
            StageMetrics::Validation(_) => 6,
        }
    }
}

/// A metric that can be read generically off any stage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Investment,
    Leads,
    Mqls,
    Sales,
    Revenue,
    Cpl,
    CplMarket,
    MqlCost,
    Frequency,
    Reach,
    Impressions,
    LandingConversion,
    FunnelConversion,
    Cac,
    Roas,
}

/// How a metric value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Currency,
    Percent,
    Multiplier,
    Count,
}

impl MetricField {
    pub fn label(&self) -> &'static str {
        match self {
            MetricField::Investment => "Investment",
            MetricField::Leads => "Leads",
            MetricField::Mqls => "MQLs",
            MetricField::Sales => "Sales",
            MetricField::Revenue => "Revenue",
            MetricField::Cpl => "CPL",
            MetricField::CplMarket => "Market CPL",
            MetricField::MqlCost => "MQL cost",
            MetricField::Frequency => "Frequency",
            MetricField::Reach => "Reach",
            MetricField::Impressions => "Impressions",
            MetricField::LandingConversion => "Landing page conversion",
            MetricField::FunnelConversion => "Funnel conversion",
            MetricField::Cac => "CAC",
            MetricField::Roas => "ROAS",
        }
    }

    pub fn unit(&self) -> MetricUnit {
        match self {
            MetricField::Investment
            | MetricField::Revenue
            | MetricField::Cpl
            | MetricField::CplMarket
            | MetricField::MqlCost
            | MetricField::Cac => MetricUnit::Currency,
            MetricField::LandingConversion | MetricField::FunnelConversion => MetricUnit::Percent,
            MetricField::Frequency | MetricField::Roas => MetricUnit::Multiplier,
            MetricField::Leads
            | MetricField::Mqls
            | MetricField::Sales
            | MetricField::Reach
            | MetricField::Impressions => MetricUnit::Count,
        }
    }

    /// Headline metric benchmarked against the sector for a stage.
    pub fn headline_for_stage(stage: u8) -> Option<MetricField> {
        match stage {
            2 => Some(MetricField::Cpl),
            3 => Some(MetricField::MqlCost),
            4 => Some(MetricField::LandingConversion),
            5 => Some(MetricField::Roas),
            _ => None,
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One month of metrics for one client at one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStageRecord", into = "RawStageRecord")]
pub struct StageRecord {
    pub id: String,
    pub client_id: String,
    pub month: Month,
    /// Explicit total investment for the month.
    pub investment_ads: Option<f64>,
    pub accumulated_investment: Option<f64>,
    pub notes: Option<String>,
    pub metrics: StageMetrics,
}

impl StageRecord {
    pub fn stage(&self) -> u8 {
        self.metrics.stage()
    }

    /// Total investment, preferring the explicit total over the campaign split.
    pub fn investment_value(&self) -> Option<f64> {
        match self.investment_ads {
            Some(total) if total != 0.0 => Some(total),
            _ => match &self.metrics {
                StageMetrics::Demand(d)
                    if d.investment_lead_generation.is_some()
                        || d.investment_brand_awareness.is_some() =>
                {
                    Some(
                        d.investment_lead_generation.unwrap_or(0.0)
                            + d.investment_brand_awareness.unwrap_or(0.0),
                    )
                }
                _ => self.investment_ads,
            },
        }
    }

    pub fn investment(&self) -> f64 {
        self.investment_value().unwrap_or(0.0)
    }

    pub fn leads(&self) -> f64 {
        self.metric(MetricField::Leads).unwrap_or(0.0)
    }

    pub fn mqls(&self) -> f64 {
        self.metric(MetricField::Mqls).unwrap_or(0.0)
    }

    pub fn sales(&self) -> f64 {
        self.metric(MetricField::Sales).unwrap_or(0.0)
    }

    pub fn revenue(&self) -> f64 {
        self.metric(MetricField::Revenue).unwrap_or(0.0)
    }

    /// Read a metric off this record; `None` when the stage does not carry it
    /// or it was left blank.
    pub fn metric(&self, field: MetricField) -> Option<f64> {
        use StageMetrics::*;

        match (field, &self.metrics) {
            (MetricField::Investment, _) => self.investment_value(),
            (MetricField::Leads, Demand(d)) => d.leads_whatsapp,
            (MetricField::Leads, Qualification(q)) => q.leads_whatsapp,
            (MetricField::Mqls, Qualification(q)) => q.mql_quantity,
            (MetricField::Mqls, Sales(s)) => s.mql_quantity,
            (MetricField::Sales, Sales(s)) => s.sales_count,
            (MetricField::Revenue, Sales(s)) => s.revenue,
            (MetricField::Cpl, Demand(d)) => d.cpl_client,
            (MetricField::CplMarket, Demand(d)) => d.cpl_market,
            (MetricField::MqlCost, Qualification(q)) => q.mql_cost,
            (MetricField::Frequency, Demand(d)) => d.frequency,
            (MetricField::Frequency, Qualification(q)) => q.frequency,
            (MetricField::Reach, Demand(d)) => d.reach,
            (MetricField::Reach, Qualification(q)) => q.reach,
            (MetricField::Impressions, Demand(d)) => d.impressions,
            (MetricField::Impressions, Qualification(q)) => q.impressions,
            (MetricField::LandingConversion, Conversion(c)) => Some(c.best()),
            (MetricField::FunnelConversion, Sales(s)) => s.funnel_conversion,
            (MetricField::Cac, Sales(s)) => s.cac,
            (MetricField::Roas, Sales(s)) => s.roas,
            _ => None,
        }
    }
}

/// Flat, loosely-typed shape of a stage record as stored.
///
/// Every numeric field is optional; the `stage` tag decides which of them
/// survive the conversion into [`StageMetrics`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStageRecord {
    pub id: String,
    pub client_id: String,
    pub stage: u8,
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_ads: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accumulated_investment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_lead_generation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_brand_awareness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpl_market: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpl_basetech: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpl_client: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpl_accumulated: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leads_whatsapp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_mql_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_mql_cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mql_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mql_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mql_cost_accumulated: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_conversion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_conversion_improvement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_mql_cost_improved: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_lp_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_lp_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_lp_b: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cac: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roas: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel_conversion: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_stages_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_bottlenecks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_next_steps: Option<String>,
}

impl TryFrom<RawStageRecord> for StageRecord {
    type Error = RecordError;

    fn try_from(raw: RawStageRecord) -> Result<Self, Self::Error> {
        let month: Month = raw.month.parse()?;

        let metrics = match raw.stage {
            2 => StageMetrics::Demand(DemandMetrics {
                investment_lead_generation: raw.investment_lead_generation,
                investment_brand_awareness: raw.investment_brand_awareness,
                cpl_market: raw.cpl_market,
                cpl_basetech: raw.cpl_basetech,
                cpl_client: raw.cpl_client,
                cpl_accumulated: raw.cpl_accumulated,
                leads_whatsapp: raw.leads_whatsapp,
                reach: raw.reach,
                impressions: raw.impressions,
                frequency: raw.frequency,
                projection_mql_quantity: raw.projection_mql_quantity,
                projection_mql_cost: raw.projection_mql_cost,
            }),
            3 => StageMetrics::Qualification(QualificationMetrics {
                mql_quantity: raw.mql_quantity,
                mql_cost: raw.mql_cost,
                mql_cost_accumulated: raw.mql_cost_accumulated,
                leads_whatsapp: raw.leads_whatsapp,
                current_conversion_rate: raw.current_conversion_rate,
                target_conversion_improvement: raw.target_conversion_improvement,
                projected_mql_cost_improved: raw.projected_mql_cost_improved,
                reach: raw.reach,
                impressions: raw.impressions,
                frequency: raw.frequency,
            }),
            4 => StageMetrics::Conversion(ConversionMetrics {
                conversion_lp_base: raw.conversion_lp_base,
                conversion_lp_a: raw.conversion_lp_a,
                conversion_lp_b: raw.conversion_lp_b,
            }),
            5 => StageMetrics::Sales(SalesMetrics {
                cac: raw.cac,
                roas: raw.roas,
                mql_quantity: raw.mql_quantity,
                funnel_conversion: raw.funnel_conversion,
                sales_count: raw.sales_count,
                revenue: raw.revenue,
            }),
            6 => StageMetrics::Validation(ValidationOutcome {
                stages_ok: raw.validation_stages_ok.unwrap_or(false),
                bottlenecks: raw.validation_bottlenecks,
                next_steps: raw.validation_next_steps,
            }),
            other => return Err(RecordError::StageOutOfRange(other)),
        };

        Ok(StageRecord {
            id: raw.id,
            client_id: raw.client_id,
            month,
            investment_ads: raw.investment_ads,
            accumulated_investment: raw.accumulated_investment,
            notes: raw.notes,
            metrics,
        })
    }
}

impl From<StageRecord> for RawStageRecord {
    fn from(record: StageRecord) -> Self {
        let mut raw = RawStageRecord {
            id: record.id,
            client_id: record.client_id,
            stage: record.metrics.stage(),
            month: record.month.to_string(),
            investment_ads: record.investment_ads,
            accumulated_investment: record.accumulated_investment,
            notes: record.notes,
            ..Default::default()
        };

        match record.metrics {
            StageMetrics::Demand(d) => {
                raw.investment_lead_generation = d.investment_lead_generation;
                raw.investment_brand_awareness = d.investment_brand_awareness;
                raw.cpl_market = d.cpl_market;
                raw.cpl_basetech = d.cpl_basetech;
                raw.cpl_client = d.cpl_client;
                raw.cpl_accumulated = d.cpl_accumulated;
                raw.leads_whatsapp = d.leads_whatsapp;
                raw.reach = d.reach;
                raw.impressions = d.impressions;
                raw.frequency = d.frequency;
                raw.projection_mql_quantity = d.projection_mql_quantity;
                raw.projection_mql_cost = d.projection_mql_cost;
            }
            StageMetrics::Qualification(q) => {
                raw.mql_quantity = q.mql_quantity;
                raw.mql_cost = q.mql_cost;
                raw.mql_cost_accumulated = q.mql_cost_accumulated;
                raw.leads_whatsapp = q.leads_whatsapp;
                raw.current_conversion_rate = q.current_conversion_rate;
                raw.target_conversion_improvement = q.target_conversion_improvement;
                raw.projected_mql_cost_improved = q.projected_mql_cost_improved;
                raw.reach = q.reach;
                raw.impressions = q.impressions;
                raw.frequency = q.frequency;
            }
            StageMetrics::Conversion(c) => {
                raw.conversion_lp_base = c.conversion_lp_base;
                raw.conversion_lp_a = c.conversion_lp_a;
                raw.conversion_lp_b = c.conversion_lp_b;
            }
            StageMetrics::Sales(s) => {
                raw.cac = s.cac;
                raw.roas = s.roas;
                raw.mql_quantity = s.mql_quantity;
                raw.funnel_conversion = s.funnel_conversion;
                raw.sales_count = s.sales_count;
                raw.revenue = s.revenue;
            }
            StageMetrics::Validation(v) => {
                raw.validation_stages_ok = Some(v.stages_ok);
                raw.validation_bottlenecks = v.bottlenecks;
                raw.validation_next_steps = v.next_steps;
            }
        }

        raw
    }
}

/// A named group of clients handled by one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub client_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_photo_url: Option<String>,
}

impl Squad {
    pub fn contains(&self, client_id: &str) -> bool {
        self.client_ids.iter().any(|id| id == client_id)
    }
}

/// Free-text note attached to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    pub client_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
}

/// Persisted key/value application setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    #[serde(default)]
    pub id: String,
    pub setting_key: String,
    pub setting_value: String,
}

/// Release entry shown in the report footer when active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemVersion {
    #[serde(default)]
    pub id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Role of an operator account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// Operator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}
