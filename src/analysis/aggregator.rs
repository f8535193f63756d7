//! Per-client stage metrics aggregation.
//!
//! Every function here is pure: it takes an immutable slice of stage
//! records and returns derived values. Missing fields count as zero in
//! sums, zero denominators yield zero, and thin history is reported with
//! a sentinel instead of an error.

use crate::models::{Client, MetricField, Month, StageRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Number of months averaged for a projection.
pub const DEFAULT_WINDOW: usize = 3;

/// Volume efficiency applied when scaling investment up.
pub const EFFICIENCY_FACTOR: f64 = 0.85;

/// Chronological order, ties broken by the record id compared as a string,
/// so "rec-9" sorts after "rec-10".
fn chronological(a: &StageRecord, b: &StageRecord) -> Ordering {
    a.month.cmp(&b.month).then_with(|| a.id.cmp(&b.id))
}

/// `numerator / denominator`, or 0 when the result would not be finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// The latest record at `stage`, or `None` if the stage has no data.
pub fn latest_per_stage(records: &[StageRecord], stage: u8) -> Option<&StageRecord> {
    records
        .iter()
        .filter(|r| r.stage() == stage)
        .max_by(|a, b| chronological(a, b))
}

/// Latest record for every stage that has data.
pub fn latest_by_stage(records: &[StageRecord]) -> BTreeMap<u8, &StageRecord> {
    let mut latest: BTreeMap<u8, &StageRecord> = BTreeMap::new();

    for record in records {
        latest
            .entry(record.stage())
            .and_modify(|current| {
                if chronological(record, current) == Ordering::Greater {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    latest
}

/// Records at `stage`, oldest first.
pub fn stage_history(records: &[StageRecord], stage: u8) -> Vec<&StageRecord> {
    let mut history: Vec<&StageRecord> = records.iter().filter(|r| r.stage() == stage).collect();
    history.sort_by(|a, b| chronological(a, b));
    history
}

/// Field-wise totals across stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Accumulated {
    pub investment: f64,
    pub leads: f64,
    pub mqls: f64,
    pub sales: f64,
    pub revenue: f64,
}

/// Sum investment, leads, MQLs, sales and revenue over every record whose
/// stage is at most `stage_ceiling`.
pub fn accumulate_up_to(records: &[StageRecord], stage_ceiling: u8) -> Accumulated {
    records
        .iter()
        .filter(|r| r.stage() <= stage_ceiling)
        .fold(Accumulated::default(), |acc, r| Accumulated {
            investment: acc.investment + r.investment(),
            leads: acc.leads + r.leads(),
            mqls: acc.mqls + r.mqls(),
            sales: acc.sales + r.sales(),
            revenue: acc.revenue + r.revenue(),
        })
}

/// Ratios derived from accumulated totals, at full precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Ratios {
    /// Sales per lead, in percent.
    pub conversion_rate: f64,
    pub cac: f64,
    pub roas: f64,
}

pub fn derived_ratios(accumulated: &Accumulated) -> Ratios {
    Ratios {
        conversion_rate: safe_ratio(accumulated.sales, accumulated.leads) * 100.0,
        cac: safe_ratio(accumulated.investment, accumulated.sales),
        roas: safe_ratio(accumulated.revenue, accumulated.investment),
    }
}

/// Monthly averages used as the projection baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub investment: f64,
    pub leads: f64,
    pub mqls: f64,
    pub sales: f64,
    pub cpl: f64,
    pub mql_cost: f64,
}

/// Result of asking for a historical average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HistoryWindow {
    /// Fewer matching months than the window needs.
    Insufficient { found: usize, required: usize },
    Ready {
        average: MonthlyAverage,
        first_month: Month,
        last_month: Month,
    },
}

impl HistoryWindow {
    pub fn average(&self) -> Option<&MonthlyAverage> {
        match self {
            HistoryWindow::Ready { average, .. } => Some(average),
            HistoryWindow::Insufficient { .. } => None,
        }
    }
}

/// Mean of the most recent `window` months at `stage`.
///
/// A window of 0 is treated as 1.
pub fn historical_average(records: &[StageRecord], stage: u8, window: usize) -> HistoryWindow {
    let required = window.max(1);
    let history = stage_history(records, stage);

    if history.len() < required {
        debug!(
            "Stage {} has {} months of history, {} required",
            stage,
            history.len(),
            required
        );
        return HistoryWindow::Insufficient {
            found: history.len(),
            required,
        };
    }

    let recent = &history[history.len() - required..];
    let count = recent.len() as f64;
    let sum = |field: MetricField| -> f64 {
        recent.iter().map(|r| r.metric(field).unwrap_or(0.0)).sum()
    };

    HistoryWindow::Ready {
        average: MonthlyAverage {
            investment: sum(MetricField::Investment) / count,
            leads: sum(MetricField::Leads) / count,
            mqls: sum(MetricField::Mqls) / count,
            sales: sum(MetricField::Sales) / count,
            cpl: sum(MetricField::Cpl) / count,
            mql_cost: sum(MetricField::MqlCost) / count,
        },
        first_month: recent[0].month,
        last_month: recent[recent.len() - 1].month,
    }
}

/// A current average and its simulated counterpart at higher investment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub current: MonthlyAverage,
    pub projected: MonthlyAverage,
    pub increase_percent: f64,
}

/// Fixed-formula simulation of raising investment by `increase_percent`.
///
/// Volumes scale by the investment multiplier times [`EFFICIENCY_FACTOR`];
/// unit costs are divided by it. The efficiency penalty applies even at a
/// zero increase.
pub fn naive_projection(average: &MonthlyAverage, increase_percent: f64) -> Projection {
    let multiplier = 1.0 + increase_percent / 100.0;

    let projected = MonthlyAverage {
        investment: average.investment * multiplier,
        leads: average.leads * multiplier * EFFICIENCY_FACTOR,
        mqls: average.mqls * multiplier * EFFICIENCY_FACTOR,
        sales: average.sales * multiplier * EFFICIENCY_FACTOR,
        cpl: average.cpl / EFFICIENCY_FACTOR,
        mql_cost: average.mql_cost / EFFICIENCY_FACTOR,
    };

    Projection {
        current: *average,
        projected,
        increase_percent,
    }
}

/// Mean of `field` over records at `stage` that belong to one of
/// `clients_in_sector` and actually carry the field.
pub fn sector_average(
    records: &[StageRecord],
    clients_in_sector: &[&Client],
    stage: u8,
    field: MetricField,
) -> Option<f64> {
    let values: Vec<f64> = records
        .iter()
        .filter(|r| r.stage() == stage)
        .filter(|r| clients_in_sector.iter().any(|c| c.id == r.client_id))
        .filter_map(|r| r.metric(field))
        .filter(|v| *v != 0.0)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// A client's latest value for a metric next to its sector's average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorBenchmark {
    pub sector: String,
    pub field: MetricField,
    pub stage: u8,
    pub client_value: Option<f64>,
    pub sector_average: f64,
    /// Client value relative to the sector average, in percent.
    pub difference_percent: Option<f64>,
}

pub fn sector_benchmark(
    client: &Client,
    clients: &[Client],
    records: &[StageRecord],
    stage: u8,
    field: MetricField,
) -> Option<SectorBenchmark> {
    let sector = client.sector.as_deref()?;
    let peers: Vec<&Client> = clients
        .iter()
        .filter(|c| c.sector.as_deref() == Some(sector))
        .collect();

    let sector_average = sector_average(records, &peers, stage, field)?;

    let own: Vec<StageRecord> = records
        .iter()
        .filter(|r| r.client_id == client.id)
        .cloned()
        .collect();
    let client_value = latest_per_stage(&own, stage).and_then(|r| r.metric(field));

    Some(SectorBenchmark {
        sector: sector.to_string(),
        field,
        stage,
        client_value,
        sector_average,
        difference_percent: client_value.and_then(|v| percent_change(sector_average, v)),
    })
}

/// Relative change from `previous` to `current`, in percent.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// How far the client CPL sits below the market CPL, in percent.
pub fn cpl_improvement(market_cpl: Option<f64>, client_cpl: Option<f64>) -> Option<f64> {
    match (market_cpl, client_cpl) {
        (Some(market), Some(client)) if market != 0.0 && client != 0.0 => {
            Some((market - client) / market * 100.0)
        }
        _ => None,
    }
}

/// Leads the investment would buy at market CPL.
pub fn expected_leads(investment: Option<f64>, market_cpl: Option<f64>) -> Option<f64> {
    match (investment, market_cpl) {
        (Some(investment), Some(market)) if investment != 0.0 && market != 0.0 => {
            Some(investment / market)
        }
        _ => None,
    }
}

/// Share of leads that became MQLs, in percent.
pub fn landing_conversion(leads: f64, mqls: f64) -> f64 {
    safe_ratio(mqls, leads) * 100.0
}

/// Months a client spent at one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSpan {
    pub stage: u8,
    pub first_month: Month,
    pub last_month: Month,
    pub months: usize,
}

/// Stage-by-stage progress of a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageTimeline {
    pub spans: Vec<StageSpan>,
    /// Mean months per visited stage; 0 when no stage has data.
    pub average_months: f64,
}

pub fn stage_timeline(records: &[StageRecord]) -> StageTimeline {
    let spans: Vec<StageSpan> = (2..=6)
        .filter_map(|stage| {
            let history = stage_history(records, stage);
            let first = history.first()?;
            let last = history.last()?;
            Some(StageSpan {
                stage,
                first_month: first.month,
                last_month: last.month,
                months: history.len(),
            })
        })
        .collect();

    let average_months = if spans.is_empty() {
        0.0
    } else {
        spans.iter().map(|s| s.months as f64).sum::<f64>() / spans.len() as f64
    };

    StageTimeline {
        spans,
        average_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawStageRecord;

    fn raw(id: &str, stage: u8, month: &str) -> RawStageRecord {
        RawStageRecord {
            id: id.to_string(),
            client_id: "c1".to_string(),
            stage,
            month: month.to_string(),
            ..Default::default()
        }
    }

    fn demand(id: &str, month: &str, investment: f64, leads: f64) -> StageRecord {
        StageRecord::try_from(RawStageRecord {
            investment_ads: Some(investment),
            leads_whatsapp: Some(leads),
            ..raw(id, 2, month)
        })
        .unwrap()
    }

    fn sales(id: &str, month: &str, sales: f64, revenue: f64) -> StageRecord {
        StageRecord::try_from(RawStageRecord {
            sales_count: Some(sales),
            revenue: Some(revenue),
            ..raw(id, 5, month)
        })
        .unwrap()
    }

    fn client(id: &str, sector: &str) -> Client {
        Client {
            id: id.to_string(),
            name: id.to_string(),
            responsible: None,
            sector: Some(sector.to_string()),
            current_stage: 2,
            status: Default::default(),
            brand_color: None,
            logo_url: None,
            start_date: None,
            created_date: None,
        }
    }

    #[test]
    fn test_latest_per_stage_picks_max_month() {
        let records = vec![
            demand("a", "2024-03", 1.0, 1.0),
            demand("b", "2024-11", 2.0, 2.0),
            demand("c", "2024-07", 3.0, 3.0),
            sales("d", "2025-01", 1.0, 1.0),
        ];

        assert_eq!(latest_per_stage(&records, 2).map(|r| r.id.as_str()), Some("b"));
        assert_eq!(latest_per_stage(&records, 5).map(|r| r.id.as_str()), Some("d"));
        assert!(latest_per_stage(&records, 3).is_none());
    }

    #[test]
    fn test_latest_per_stage_single_record() {
        let records = vec![demand("only", "2024-01", 10.0, 5.0)];
        assert_eq!(latest_per_stage(&records, 2), Some(&records[0]));
    }

    #[test]
    fn test_latest_tie_breaks_on_highest_id() {
        let records = vec![
            demand("rec-2", "2024-05", 1.0, 1.0),
            demand("rec-9", "2024-05", 2.0, 2.0),
            demand("rec-5", "2024-05", 3.0, 3.0),
        ];
        assert_eq!(latest_per_stage(&records, 2).map(|r| r.id.as_str()), Some("rec-9"));
        assert_eq!(latest_by_stage(&records)[&2].id, "rec-9");
    }

    #[test]
    fn test_latest_tie_break_is_lexicographic() {
        let records = vec![
            demand("rec-9", "2024-05", 1.0, 1.0),
            demand("rec-10", "2024-05", 2.0, 2.0),
        ];
        assert_eq!(latest_per_stage(&records, 2).map(|r| r.id.as_str()), Some("rec-9"));
    }

    #[test]
    fn test_latest_by_stage_covers_every_stage() {
        let records = vec![
            demand("a", "2024-01", 1.0, 1.0),
            demand("b", "2024-02", 1.0, 1.0),
            sales("c", "2024-03", 1.0, 1.0),
        ];
        let latest = latest_by_stage(&records);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&2].id, "b");
        assert_eq!(latest[&5].id, "c");
    }

    #[test]
    fn test_accumulate_and_ratios_example() {
        let records = vec![
            demand("a", "2024-01", 1000.0, 100.0),
            sales("b", "2024-02", 10.0, 5000.0),
        ];

        let acc = accumulate_up_to(&records, 5);
        assert_eq!(
            acc,
            Accumulated {
                investment: 1000.0,
                leads: 100.0,
                mqls: 0.0,
                sales: 10.0,
                revenue: 5000.0,
            }
        );

        let ratios = derived_ratios(&acc);
        assert_eq!(ratios.cac, 100.0);
        assert_eq!(ratios.roas, 5.0);
        assert_eq!(ratios.conversion_rate, 10.0);
    }

    #[test]
    fn test_accumulate_respects_ceiling() {
        let records = vec![
            demand("a", "2024-01", 1000.0, 100.0),
            sales("b", "2024-02", 10.0, 5000.0),
        ];
        let acc = accumulate_up_to(&records, 4);
        assert_eq!(acc.sales, 0.0);
        assert_eq!(acc.investment, 1000.0);
    }

    #[test]
    fn test_accumulate_is_monotonic_in_ceiling() {
        let mut mql = raw("m", 3, "2024-02");
        mql.mql_quantity = Some(30.0);
        mql.investment_ads = Some(250.0);
        let records = vec![
            demand("a", "2024-01", 1000.0, 100.0),
            StageRecord::try_from(mql).unwrap(),
            sales("b", "2024-03", 10.0, 5000.0),
        ];

        let mut previous = accumulate_up_to(&records, 0);
        for ceiling in 1..=7 {
            let current = accumulate_up_to(&records, ceiling);
            assert!(current.investment >= previous.investment);
            assert!(current.leads >= previous.leads);
            assert!(current.mqls >= previous.mqls);
            assert!(current.sales >= previous.sales);
            assert!(current.revenue >= previous.revenue);
            previous = current;
        }
    }

    #[test]
    fn test_ratios_zero_denominators() {
        let ratios = derived_ratios(&Accumulated {
            investment: 1000.0,
            ..Default::default()
        });
        assert_eq!(ratios.cac, 0.0);
        assert_eq!(ratios.conversion_rate, 0.0);
        assert_eq!(ratios.roas, 0.0);

        let empty = derived_ratios(&Accumulated::default());
        assert!(empty.cac.is_finite() && empty.roas.is_finite() && empty.conversion_rate.is_finite());
    }

    #[test]
    fn test_historical_average_example() {
        let records = vec![
            demand("a", "2024-01", 1000.0, 100.0),
            demand("b", "2024-02", 1200.0, 110.0),
            demand("c", "2024-03", 1100.0, 105.0),
        ];

        let window = historical_average(&records, 2, 3);
        let avg = window.average().expect("three months is enough");
        assert!((avg.investment - 1100.0).abs() < 1e-9);
        assert!((avg.leads - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_historical_average_uses_most_recent_months() {
        let records = vec![
            demand("d", "2024-04", 400.0, 40.0),
            demand("a", "2024-01", 100.0, 10.0),
            demand("c", "2024-03", 300.0, 30.0),
            demand("b", "2024-02", 200.0, 20.0),
        ];

        match historical_average(&records, 2, 3) {
            HistoryWindow::Ready {
                average,
                first_month,
                last_month,
            } => {
                assert!((average.investment - 300.0).abs() < 1e-9);
                assert_eq!(first_month.to_string(), "2024-02");
                assert_eq!(last_month.to_string(), "2024-04");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_historical_average_insufficient() {
        let records = vec![
            demand("a", "2024-01", 1000.0, 100.0),
            demand("b", "2024-02", 1200.0, 110.0),
            sales("c", "2024-03", 1.0, 1.0),
        ];

        assert_eq!(
            historical_average(&records, 2, 3),
            HistoryWindow::Insufficient {
                found: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_projection_applies_efficiency_at_zero_increase() {
        let avg = MonthlyAverage {
            investment: 1000.0,
            leads: 100.0,
            mqls: 40.0,
            sales: 10.0,
            cpl: 10.0,
            mql_cost: 25.0,
        };

        let projection = naive_projection(&avg, 0.0);
        assert_eq!(projection.current, avg);
        assert!((projection.projected.investment - 1000.0).abs() < 1e-9);
        assert!((projection.projected.leads - 85.0).abs() < 1e-9);
        assert!((projection.projected.mqls - 34.0).abs() < 1e-9);
        assert!((projection.projected.sales - 8.5).abs() < 1e-9);
        assert!((projection.projected.cpl - 10.0 / 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_projection_scales_with_increase() {
        let avg = MonthlyAverage {
            investment: 1000.0,
            leads: 100.0,
            mql_cost: 34.0,
            ..Default::default()
        };

        let projection = naive_projection(&avg, 20.0);
        assert!((projection.projected.investment - 1200.0).abs() < 1e-9);
        assert!((projection.projected.leads - 102.0).abs() < 1e-9);
        assert!((projection.projected.mql_cost - 40.0).abs() < 1e-9);
        assert!(projection.projected.mql_cost > avg.mql_cost);
        assert_eq!(projection.increase_percent, 20.0);
    }

    #[test]
    fn test_sector_average() {
        let gym_a = client("a", "gym");
        let gym_b = client("b", "gym");

        let mut r1 = raw("1", 2, "2024-01");
        r1.cpl_client = Some(10.0);
        let mut r2 = raw("2", 2, "2024-01");
        r2.client_id = "b".to_string();
        r2.cpl_client = Some(20.0);
        let mut r3 = raw("3", 2, "2024-02");
        r3.client_id = "b".to_string();
        r3.cpl_client = None;
        r1.client_id = "a".to_string();

        let records: Vec<StageRecord> = [r1, r2, r3]
            .into_iter()
            .map(|r| StageRecord::try_from(r).unwrap())
            .collect();

        let avg = sector_average(&records, &[&gym_a, &gym_b], 2, MetricField::Cpl);
        assert_eq!(avg, Some(15.0));

        assert_eq!(sector_average(&records, &[], 2, MetricField::Cpl), None);
        assert_eq!(sector_average(&records, &[&gym_a], 3, MetricField::Cpl), None);
    }

    #[test]
    fn test_sector_benchmark() {
        let a = client("a", "gym");
        let b = client("b", "gym");
        let other = client("x", "vet");

        let mk = |id: &str, client: &str, cpl: f64| {
            let mut r = raw(id, 2, "2024-01");
            r.client_id = client.to_string();
            r.cpl_client = Some(cpl);
            StageRecord::try_from(r).unwrap()
        };
        let records = vec![mk("1", "a", 9.0), mk("2", "b", 15.0), mk("3", "x", 100.0)];
        let clients = vec![a.clone(), b, other];

        let bench = sector_benchmark(&a, &clients, &records, 2, MetricField::Cpl).unwrap();
        assert_eq!(bench.sector, "gym");
        assert_eq!(bench.sector_average, 12.0);
        assert_eq!(bench.client_value, Some(9.0));
        assert!((bench.difference_percent.unwrap() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_formulas() {
        assert_eq!(percent_change(0.0, 5.0), None);
        assert_eq!(percent_change(100.0, 110.0), Some(10.0));
        assert_eq!(cpl_improvement(Some(12.0), Some(9.0)), Some(25.0));
        assert_eq!(cpl_improvement(None, Some(9.0)), None);
        assert_eq!(expected_leads(Some(1200.0), Some(12.0)), Some(100.0));
        assert_eq!(landing_conversion(0.0, 10.0), 0.0);
        assert_eq!(landing_conversion(200.0, 50.0), 25.0);
    }

    #[test]
    fn test_stage_timeline() {
        let records = vec![
            demand("a", "2024-01", 1.0, 1.0),
            demand("b", "2024-03", 1.0, 1.0),
            demand("c", "2024-02", 1.0, 1.0),
            sales("d", "2024-04", 1.0, 1.0),
        ];

        let timeline = stage_timeline(&records);
        assert_eq!(timeline.spans.len(), 2);
        assert_eq!(timeline.spans[0].stage, 2);
        assert_eq!(timeline.spans[0].first_month.to_string(), "2024-01");
        assert_eq!(timeline.spans[0].last_month.to_string(), "2024-03");
        assert_eq!(timeline.spans[0].months, 3);
        assert_eq!(timeline.average_months, 2.0);

        assert_eq!(stage_timeline(&[]).average_months, 0.0);
    }
}
