//! Business thresholds used to colour metrics and raise alerts.

use crate::analysis::aggregator::stage_history;
use crate::models::{MetricField, StageMetrics, StageRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Client CPL may exceed the market CPL by this factor before it is danger.
pub const CPL_WARNING_FACTOR: f64 = 1.2;
/// MQL cost target is this many times the stage 2 client CPL.
pub const MQL_META_MULTIPLIER: f64 = 4.0;
/// CPL assumed for the MQL target when stage 2 has no data.
pub const MQL_FALLBACK_CPL: f64 = 10.0;
pub const MQL_WARNING_FACTOR: f64 = 1.3;
pub const FREQUENCY_SUCCESS: f64 = 2.0;
pub const FREQUENCY_WARNING: f64 = 1.5;
/// ROAS below this raises a warning.
pub const ROAS_ALERT: f64 = 2.0;

/// Traffic-light status of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Danger,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "On target"),
            Status::Warning => write!(f, "Warning"),
            Status::Danger => write!(f, "Danger"),
        }
    }
}

impl Status {
    pub fn emoji(&self) -> &'static str {
        match self {
            Status::Success => "🟢",
            Status::Warning => "🟡",
            Status::Danger => "🔴",
        }
    }
}

pub fn cpl_status(client_cpl: f64, market_cpl: f64) -> Status {
    if client_cpl <= market_cpl {
        Status::Success
    } else if client_cpl <= market_cpl * CPL_WARNING_FACTOR {
        Status::Warning
    } else {
        Status::Danger
    }
}

/// MQL cost target derived from the stage 2 client CPL.
pub fn mql_cost_meta(stage2_cpl: Option<f64>) -> f64 {
    let cpl = match stage2_cpl {
        Some(cpl) if cpl != 0.0 => cpl,
        _ => MQL_FALLBACK_CPL,
    };
    cpl * MQL_META_MULTIPLIER
}

pub fn mql_cost_status(mql_cost: f64, meta: f64) -> Status {
    if mql_cost <= meta {
        Status::Success
    } else if mql_cost <= meta * MQL_WARNING_FACTOR {
        Status::Warning
    } else {
        Status::Danger
    }
}

pub fn frequency_status(frequency: f64) -> Status {
    if frequency >= FREQUENCY_SUCCESS {
        Status::Success
    } else if frequency >= FREQUENCY_WARNING {
        Status::Warning
    } else {
        Status::Danger
    }
}

/// Statuses for the headline metrics of a client's latest records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageStatuses {
    pub cpl: Option<Status>,
    pub mql_cost: Option<Status>,
    pub mql_cost_meta: f64,
    pub frequency: Option<Status>,
}

/// Colour the latest metrics. `stage` picks whose frequency is shown.
pub fn stage_statuses(latest: &BTreeMap<u8, &StageRecord>, stage: u8) -> StageStatuses {
    let stage2 = latest.get(&2).copied();
    let stage2_cpl = stage2.and_then(|r| r.metric(MetricField::Cpl));

    let cpl = stage2.and_then(|r| {
        match (r.metric(MetricField::Cpl), r.metric(MetricField::CplMarket)) {
            (Some(client), Some(market)) => Some(cpl_status(client, market)),
            _ => None,
        }
    });

    let meta = mql_cost_meta(stage2_cpl);
    let mql_cost = latest
        .get(&3)
        .and_then(|r| r.metric(MetricField::MqlCost))
        .map(|cost| mql_cost_status(cost, meta));

    let frequency = latest
        .get(&stage)
        .and_then(|r| r.metric(MetricField::Frequency))
        .map(frequency_status);

    StageStatuses {
        cpl,
        mql_cost,
        mql_cost_meta: meta,
        frequency,
    }
}

/// Something an operator should look at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: Status,
    pub stage: u8,
    pub message: String,
}

/// Alert rules over the latest record of each stage.
pub fn client_alerts(latest: &BTreeMap<u8, &StageRecord>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(record) = latest.get(&2) {
        if let (Some(client), Some(market)) = (
            record.metric(MetricField::Cpl),
            record.metric(MetricField::CplMarket),
        ) {
            if market != 0.0 && client > market * CPL_WARNING_FACTOR {
                alerts.push(Alert {
                    level: Status::Danger,
                    stage: 2,
                    message: "CPL more than 20% above the market reference".to_string(),
                });
            }
        }
    }

    if let Some(cost) = latest.get(&3).and_then(|r| r.metric(MetricField::MqlCost)) {
        let meta = mql_cost_meta(latest.get(&2).and_then(|r| r.metric(MetricField::Cpl)));
        if cost > meta * MQL_WARNING_FACTOR {
            alerts.push(Alert {
                level: Status::Danger,
                stage: 3,
                message: "MQL cost more than 30% above target".to_string(),
            });
        }
    }

    for (stage, record) in latest {
        if let Some(frequency) = record.metric(MetricField::Frequency) {
            if frequency != 0.0 && frequency < FREQUENCY_WARNING {
                alerts.push(Alert {
                    level: Status::Warning,
                    stage: *stage,
                    message: format!("Low frequency ({:.1}x) at stage {}", frequency, stage),
                });
            }
        }
    }

    if let Some(roas) = latest.get(&5).and_then(|r| r.metric(MetricField::Roas)) {
        if roas != 0.0 && roas < ROAS_ALERT {
            alerts.push(Alert {
                level: Status::Warning,
                stage: 5,
                message: format!("Low ROAS ({:.1}x)", roas),
            });
        }
    }

    alerts
}

/// A month of history with its on-target flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub record: StageRecord,
    /// `None` when the stage has no target rule, or no previous month to beat.
    pub on_target: Option<bool>,
}

/// Stage history, oldest first, flagged against each stage's target.
pub fn history_rows(records: &[StageRecord], stage: u8) -> Vec<HistoryRow> {
    let history = stage_history(records, stage);

    history
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let on_target = match &record.metrics {
                StageMetrics::Demand(d) => match (d.cpl_client, d.cpl_market) {
                    (Some(client), Some(market)) => Some(client <= market),
                    _ => None,
                },
                // The row carries no CPL of its own, so the fallback CPL sets the target.
                StageMetrics::Qualification(q) => q.mql_cost.map(|cost| cost <= mql_cost_meta(None)),
                StageMetrics::Conversion(c) if index > 0 => match &history[index - 1].metrics {
                    StageMetrics::Conversion(previous) => Some(c.best() > previous.best()),
                    _ => None,
                },
                _ => None,
            };

            HistoryRow {
                record: (*record).clone(),
                on_target,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawStageRecord;

    fn record(id: &str, stage: u8, month: &str, fill: impl FnOnce(&mut RawStageRecord)) -> StageRecord {
        let mut raw = RawStageRecord {
            id: id.to_string(),
            client_id: "c1".to_string(),
            stage,
            month: month.to_string(),
            ..Default::default()
        };
        fill(&mut raw);
        StageRecord::try_from(raw).unwrap()
    }

    #[test]
    fn test_cpl_bands() {
        assert_eq!(cpl_status(10.0, 10.0), Status::Success);
        assert_eq!(cpl_status(12.0, 10.0), Status::Warning);
        assert_eq!(cpl_status(12.01, 10.0), Status::Danger);
    }

    #[test]
    fn test_mql_meta_and_bands() {
        assert_eq!(mql_cost_meta(Some(8.0)), 32.0);
        assert_eq!(mql_cost_meta(None), 40.0);
        assert_eq!(mql_cost_meta(Some(0.0)), 40.0);

        assert_eq!(mql_cost_status(40.0, 40.0), Status::Success);
        assert_eq!(mql_cost_status(52.0, 40.0), Status::Warning);
        assert_eq!(mql_cost_status(52.5, 40.0), Status::Danger);
    }

    #[test]
    fn test_frequency_bands() {
        assert_eq!(frequency_status(2.0), Status::Success);
        assert_eq!(frequency_status(1.5), Status::Warning);
        assert_eq!(frequency_status(1.49), Status::Danger);
    }

    #[test]
    fn test_stage_statuses() {
        let demand = record("a", 2, "2024-01", |r| {
            r.cpl_client = Some(11.0);
            r.cpl_market = Some(10.0);
            r.frequency = Some(1.8);
        });
        let mql = record("b", 3, "2024-02", |r| r.mql_cost = Some(40.0));
        let latest: BTreeMap<u8, &StageRecord> = [(2, &demand), (3, &mql)].into_iter().collect();

        let statuses = stage_statuses(&latest, 2);
        assert_eq!(statuses.cpl, Some(Status::Warning));
        assert_eq!(statuses.mql_cost_meta, 44.0);
        assert_eq!(statuses.mql_cost, Some(Status::Success));
        assert_eq!(statuses.frequency, Some(Status::Warning));

        let statuses = stage_statuses(&latest, 4);
        assert_eq!(statuses.frequency, None);
    }

    #[test]
    fn test_alerts() {
        let demand = record("a", 2, "2024-01", |r| {
            r.cpl_client = Some(13.0);
            r.cpl_market = Some(10.0);
            r.frequency = Some(1.2);
        });
        let mql = record("b", 3, "2024-02", |r| r.mql_cost = Some(70.0));
        let sales = record("c", 5, "2024-03", |r| r.roas = Some(1.4));
        let latest: BTreeMap<u8, &StageRecord> =
            [(2, &demand), (3, &mql), (5, &sales)].into_iter().collect();

        let alerts = client_alerts(&latest);
        assert_eq!(alerts.len(), 4);
        assert_eq!(alerts.iter().filter(|a| a.level == Status::Danger).count(), 2);
        assert!(alerts.iter().any(|a| a.message.contains("1.2x")));
        assert!(alerts.iter().any(|a| a.message.contains("ROAS")));
    }

    #[test]
    fn test_no_alerts_when_healthy_or_missing() {
        let demand = record("a", 2, "2024-01", |r| {
            r.cpl_client = Some(9.0);
            r.cpl_market = Some(10.0);
        });
        let latest: BTreeMap<u8, &StageRecord> = [(2, &demand)].into_iter().collect();
        assert!(client_alerts(&latest).is_empty());
        assert!(client_alerts(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_history_rows_landing_pages() {
        let records = vec![
            record("b", 4, "2024-02", |r| r.conversion_lp_a = Some(4.0)),
            record("a", 4, "2024-01", |r| r.conversion_lp_base = Some(3.0)),
            record("c", 4, "2024-03", |r| r.conversion_lp_b = Some(3.5)),
        ];

        let rows = history_rows(&records, 4);
        let flags: Vec<Option<bool>> = rows.iter().map(|r| r.on_target).collect();
        assert_eq!(flags, vec![None, Some(true), Some(false)]);
        assert_eq!(rows[0].record.id, "a");
    }

    #[test]
    fn test_history_rows_cpl_target() {
        let records = vec![
            record("a", 2, "2024-01", |r| {
                r.cpl_client = Some(9.0);
                r.cpl_market = Some(10.0);
            }),
            record("b", 2, "2024-02", |r| {
                r.cpl_client = Some(11.0);
                r.cpl_market = Some(10.0);
            }),
        ];
        let flags: Vec<Option<bool>> = history_rows(&records, 2).iter().map(|r| r.on_target).collect();
        assert_eq!(flags, vec![Some(true), Some(false)]);
    }

    #[test]
    fn test_history_rows_missing_values_carry_no_flag() {
        let records = vec![
            record("a", 2, "2024-01", |r| r.cpl_market = Some(12.0)),
            record("b", 3, "2024-01", |_| {}),
            record("c", 3, "2024-02", |r| r.mql_cost = Some(38.0)),
        ];

        let demand: Vec<Option<bool>> = history_rows(&records, 2).iter().map(|r| r.on_target).collect();
        assert_eq!(demand, vec![None]);

        let qualified: Vec<Option<bool>> = history_rows(&records, 3).iter().map(|r| r.on_target).collect();
        assert_eq!(qualified, vec![None, Some(true)]);
    }
}
