//! Funnel stage catalogue: names, objectives and what comes next.

use serde::Serialize;

/// Objectives of one funnel stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageObjectives {
    pub title: &'static str,
    pub goals: &'static [&'static str],
    /// Title and summary of the following stage, if any.
    pub next: Option<(&'static str, &'static str)>,
}

pub fn stage_name(stage: u8) -> &'static str {
    match stage {
        1 => "Onboard",
        2 => "Demand Generation",
        3 => "Qualified Lead (MQL)",
        4 => "Page Conversion",
        5 => "Sales Indicators",
        6 => "Validation",
        _ => "Unknown",
    }
}

const DEMAND: StageObjectives = StageObjectives {
    title: "Demand Generation",
    goals: &[
        "Generate an initial volume of leads",
        "Build a strong brand presence",
    ],
    next: Some((
        "Qualified Lead (MQL)",
        "Turn leads into MQLs through a sign-up form",
    )),
};

const QUALIFICATION: StageObjectives = StageObjectives {
    title: "Qualified Lead (MQL)",
    goals: &[
        "Turn leads into marketing qualified leads",
        "Run search campaigns focused on qualified sign-ups",
        "Run sign-up campaigns that attract qualified leads",
    ],
    next: Some(("Page Conversion", "Optimise landing pages with A/B tests")),
};

const CONVERSION: StageObjectives = StageObjectives {
    title: "Page Conversion",
    goals: &[
        "Improve landing page conversion rates",
        "Reduce the cost per qualified lead",
        "Test three landing page versions",
    ],
    next: Some(("Sales Indicators", "Measure the efficiency of the whole funnel")),
};

const SALES: StageObjectives = StageObjectives {
    title: "Sales Indicators",
    goals: &[
        "Understand the real efficiency of the funnel",
        "Find where clients are lost",
        "Improve every step of the sales funnel",
    ],
    next: Some(("Validation", "Validate results and define adjustments")),
};

const VALIDATION: StageObjectives = StageObjectives {
    title: "Validation",
    goals: &[
        "Validate the results obtained",
        "Identify bottlenecks",
        "Define the next adjustments",
    ],
    next: None,
};

pub fn objectives(stage: u8) -> Option<&'static StageObjectives> {
    match stage {
        2 => Some(&DEMAND),
        3 => Some(&QUALIFICATION),
        4 => Some(&CONVERSION),
        5 => Some(&SALES),
        6 => Some(&VALIDATION),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_metric_stage_has_objectives() {
        for stage in 2..=6 {
            let obj = objectives(stage).unwrap();
            assert_eq!(obj.title, stage_name(stage));
            assert!(!obj.goals.is_empty());
        }
        assert!(objectives(1).is_none());
        assert!(objectives(6).unwrap().next.is_none());
    }
}
