//! Cross-client comparisons: consolidated funnel, squads and sectors.

use crate::analysis::aggregator::{latest_by_stage, safe_ratio};
use crate::models::{Client, MetricField, Squad, StageRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Funnel totals built from each client's latest month per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FunnelTotals {
    pub investment: f64,
    pub leads: f64,
    pub mqls: f64,
    pub sales: f64,
    pub revenue: f64,
}

impl FunnelTotals {
    /// Sales per lead, in percent.
    pub fn conversion_rate(&self) -> f64 {
        safe_ratio(self.sales, self.leads) * 100.0
    }

    fn add_client(&mut self, records: &[StageRecord]) {
        let latest = latest_by_stage(records);

        if let Some(demand) = latest.get(&2) {
            self.investment += demand.investment();
            self.leads += demand.leads();
        }
        if let Some(qualified) = latest.get(&3) {
            self.mqls += qualified.mqls();
        }
        if let Some(sales) = latest.get(&5) {
            self.sales += sales.sales();
            self.revenue += sales.revenue();
        }
    }
}

fn records_of(records: &[StageRecord], client_id: &str) -> Vec<StageRecord> {
    records
        .iter()
        .filter(|r| r.client_id == client_id)
        .cloned()
        .collect()
}

/// Stage 2 investment and leads, stage 3 MQLs and stage 5 sales and
/// revenue, each from the client's latest month, summed over `clients`.
pub fn consolidated_funnel(clients: &[Client], records: &[StageRecord]) -> FunnelTotals {
    let mut totals = FunnelTotals::default();
    for client in clients {
        totals.add_client(&records_of(records, &client.id));
    }
    totals
}

/// Funnel totals for one squad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSummary {
    pub name: String,
    pub color: String,
    pub clients: usize,
    pub totals: FunnelTotals,
}

pub fn squad_totals(
    squads: &[Squad],
    clients: &[Client],
    records: &[StageRecord],
) -> Vec<SquadSummary> {
    squads
        .iter()
        .map(|squad| {
            let members: Vec<Client> = clients
                .iter()
                .filter(|c| squad.contains(&c.id))
                .cloned()
                .collect();

            SquadSummary {
                name: squad.name.clone(),
                color: squad.color.clone().unwrap_or_else(|| "purple".to_string()),
                clients: members.len(),
                totals: consolidated_funnel(&members, records),
            }
        })
        .collect()
}

/// Average cost and efficiency metrics of one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub sector: String,
    pub clients: usize,
    pub cpl: f64,
    pub mql_cost: f64,
    pub conversion: f64,
    pub cac: f64,
    pub roas: f64,
}

#[derive(Default)]
struct SectorSamples {
    clients: usize,
    cpl: Vec<f64>,
    mql_cost: Vec<f64>,
    conversion: Vec<f64>,
    cac: Vec<f64>,
    roas: Vec<f64>,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Per sector, the mean of every recorded CPL, MQL cost, funnel conversion,
/// CAC and ROAS across all months of its clients. Sorted by sector.
pub fn sector_comparison(clients: &[Client], records: &[StageRecord]) -> Vec<SectorSummary> {
    let mut sectors: BTreeMap<String, SectorSamples> = BTreeMap::new();

    for client in clients {
        let samples = sectors.entry(client.sector_or_other().to_string()).or_default();
        samples.clients += 1;

        for record in records.iter().filter(|r| r.client_id == client.id) {
            let push = |field: MetricField, into: &mut Vec<f64>| {
                if let Some(value) = record.metric(field).filter(|v| *v != 0.0) {
                    into.push(value);
                }
            };
            push(MetricField::Cpl, &mut samples.cpl);
            push(MetricField::MqlCost, &mut samples.mql_cost);
            push(MetricField::FunnelConversion, &mut samples.conversion);
            push(MetricField::Cac, &mut samples.cac);
            push(MetricField::Roas, &mut samples.roas);
        }
    }

    sectors
        .into_iter()
        .map(|(sector, s)| SectorSummary {
            sector,
            clients: s.clients,
            cpl: mean(&s.cpl),
            mql_cost: mean(&s.mql_cost),
            conversion: mean(&s.conversion),
            cac: mean(&s.cac),
            roas: mean(&s.roas),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Snapshot;

    const SAMPLE: &str = include_str!("../../fixtures/sample_data.json");

    fn sample() -> Snapshot {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_consolidated_funnel_uses_latest_months() {
        let data = sample();
        let totals = consolidated_funnel(&data.clients, &data.stage_records);

        // FitLife 2024-03 (1100) + PowerHouse split (600 + 200) + VetCare (900)
        assert_eq!(totals.investment, 2800.0);
        assert_eq!(totals.leads, 105.0 + 50.0 + 60.0);
        assert_eq!(totals.mqls, 50.0);
        assert_eq!(totals.sales, 12.0);
        assert_eq!(totals.revenue, 9600.0);
        assert!((totals.conversion_rate() - 12.0 / 215.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_funnel_has_zero_conversion() {
        let totals = consolidated_funnel(&[], &[]);
        assert_eq!(totals, FunnelTotals::default());
        assert_eq!(totals.conversion_rate(), 0.0);
    }

    #[test]
    fn test_squad_totals() {
        let data = sample();
        let squads = squad_totals(&data.squads, &data.clients, &data.stage_records);

        assert_eq!(squads.len(), 2);
        assert_eq!(squads[0].name, "Alpha");
        assert_eq!(squads[0].clients, 2);
        assert_eq!(squads[0].totals.leads, 155.0);
        assert_eq!(squads[1].color, "blue");
        assert_eq!(squads[1].totals.mqls, 10.0);
    }

    #[test]
    fn test_sector_comparison() {
        let data = sample();
        let sectors = sector_comparison(&data.clients, &data.stage_records);

        assert_eq!(sectors.len(), 2);
        let gyms = &sectors[0];
        assert_eq!(gyms.sector, "academia_low_cost");
        assert_eq!(gyms.clients, 2);
        // 10.0, 10.9, 10.5 from FitLife and 16.0 from PowerHouse
        assert!((gyms.cpl - 47.4 / 4.0).abs() < 1e-9);
        assert_eq!(gyms.roas, 2.9);

        let vets = &sectors[1];
        assert_eq!(vets.mql_cost, 90.0);
        assert_eq!(vets.cac, 0.0);
    }
}
