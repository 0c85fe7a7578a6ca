//! The triple evaluation run.

use std::time::Instant;

use mapf_core::{Deadline, PlannerParams, Solution};
use mapf_engine::mapf;
use mapf_map::Scenario;

use crate::writer::EvalWriter;
use crate::{EvalResult, EvalRow};

/// Which map variant a run planned on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapMode {
    /// The scenario's edge set as given.
    Directed,
    /// Every edge mirrored by [`mapf_map::GridMap::undirect`].
    Undirected,
    /// The alternating rule with the params' frequency, floored at 1.
    Dynamic,
}

/// Run `scenario` through its configured planner on the directed,
/// undirected-by-copy, and dynamic map variants, writing one row each.
///
/// Unsolvable and timed-out runs are recorded with `solved = false`, not
/// dropped; only writer faults abort.
pub fn evaluate<W: EvalWriter>(
    name: &str,
    scenario: &Scenario,
    params: &PlannerParams,
    deadline: &Deadline,
    writer: &mut W,
) -> EvalResult<()> {
    for mode in [MapMode::Directed, MapMode::Undirected, MapMode::Dynamic] {
        let (scenario, params) = prepare(scenario, params, mode);
        let started = Instant::now();
        let outcome = mapf(&scenario, &params, deadline);
        let planning_ns = started.elapsed().as_nanos();

        let row = match outcome {
            Ok(Some(solution)) => EvalRow {
                scenario: name.to_owned(),
                algorithm: params.algorithm,
                map_mode: mode,
                solved: true,
                makespan: solution.plan.makespan(),
                flowtime: solution.plan.flowtime(),
                service_time: service_time(&scenario, &solution),
                planning_ns,
            },
            Ok(None) | Err(mapf_core::MapfError::Timeout) => EvalRow {
                scenario: name.to_owned(),
                algorithm: params.algorithm,
                map_mode: mode,
                solved: false,
                makespan: 0,
                flowtime: 0,
                service_time: 0.0,
                planning_ns,
            },
            Err(fault) => return Err(fault.into()),
        };
        writer.write_row(&row)?;
    }
    writer.finish()
}

/// Evaluate many scenarios on Rayon's thread pool, one row set per entry.
/// Rows come back grouped per scenario in input order.
#[cfg(feature = "parallel")]
pub fn evaluate_batch(
    scenarios: &[(String, Scenario)],
    params: &PlannerParams,
    deadline: &Deadline,
) -> EvalResult<Vec<EvalRow>> {
    use rayon::prelude::*;

    let groups: Vec<EvalResult<Vec<EvalRow>>> = scenarios
        .par_iter()
        .map(|(name, scenario)| {
            let mut writer = crate::writer::VecEvalWriter::default();
            evaluate(name, scenario, params, deadline, &mut writer)?;
            Ok(writer.rows)
        })
        .collect();

    let mut rows = Vec::with_capacity(groups.len() * 3);
    for group in groups {
        rows.extend(group?);
    }
    Ok(rows)
}

/// Clone the scenario into the requested map variant.
fn prepare(scenario: &Scenario, params: &PlannerParams, mode: MapMode) -> (Scenario, PlannerParams) {
    let mut scenario = scenario.clone();
    let mut params = params.clone();
    match mode {
        MapMode::Directed => params.direction_change_frequency = 0,
        MapMode::Undirected => {
            scenario.map.undirect();
            params.direction_change_frequency = 0;
        }
        MapMode::Dynamic => params.direction_change_frequency = params.direction_change_frequency.max(1),
    }
    (scenario, params)
}

/// Mean task service time for MAPD, mean plan length for MAPF.
fn service_time(scenario: &Scenario, solution: &Solution) -> f64 {
    if scenario.is_pickup_delivery() {
        let times: Vec<u32> = solution.tasks.iter().filter_map(|t| t.service_time()).collect();
        if times.is_empty() {
            return 0.0;
        }
        f64::from(times.iter().sum::<u32>()) / times.len() as f64
    } else {
        let n = solution.plan.plans.len();
        if n == 0 {
            return 0.0;
        }
        solution.plan.flowtime() as f64 / n as f64
    }
}
