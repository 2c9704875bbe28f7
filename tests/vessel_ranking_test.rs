// ==========================================
// 船舶排名集成测试
// ==========================================

mod test_helpers;

use osv_tank_planner::engine::{
    CapacityCalculator, CompatibilityEvaluator, RankingCriterion, VesselFilter, VesselRanker,
};
use osv_tank_planner::{AppState, TankType, Vessel};
use test_helpers::{bundled_master_data, vessel, TankBuilder};

fn liquid_vessel(id: u32, name: &str, pumps: &[u32], level: f64) -> Vessel {
    let tanks = pumps
        .iter()
        .enumerate()
        .map(|(i, pump)| {
            TankBuilder::new(&format!("Tk {}S", i + 1), TankType::Liquid)
                .capacity(1000.0)
                .holding("KCl", level)
                .pump_system(Some(*pump))
                .build()
        })
        .collect();
    vessel(id, name, tanks)
}

#[test]
fn test_equal_pump_counts_keep_input_order() {
    let (fleet, matrix) = bundled_master_data();
    let ranker = VesselRanker::new(
        CapacityCalculator::new(0.8),
        CompatibilityEvaluator::new(&matrix, &fleet.fluids),
    );

    let first = liquid_vessel(7, "M/V Zulu", &[1, 2], 100.0);
    let second = liquid_vessel(3, "M/V Alpha", &[1, 3], 500.0);

    let ranked = ranker.rank_vessels(&[&first, &second], RankingCriterion::PumpSystemCount);
    let order: Vec<u32> = ranked.iter().map(|v| v.id).collect();
    assert_eq!(order, vec![7, 3]);

    let ranked = ranker.rank_vessels(&[&second, &first], RankingCriterion::PumpSystemCount);
    let order: Vec<u32> = ranked.iter().map(|v| v.id).collect();
    assert_eq!(order, vec![3, 7]);
}

#[test]
fn test_rank_by_criteria() {
    let (fleet, matrix) = bundled_master_data();
    let ranker = VesselRanker::new(
        CapacityCalculator::new(0.8),
        CompatibilityEvaluator::new(&matrix, &fleet.fluids),
    );

    let small = liquid_vessel(1, "M/V Bravo", &[1], 0.0);
    let large = liquid_vessel(2, "M/V Alpha", &[1, 2, 3], 0.0);
    let mut marked = liquid_vessel(3, "M/V Charlie", &[1, 2], 0.0);
    marked.best_candidate = true;
    let vessels = [&small, &large, &marked];

    let ids = |criterion: RankingCriterion| -> Vec<u32> {
        ranker
            .rank_vessels(&vessels, criterion)
            .iter()
            .map(|v| v.id)
            .collect()
    };

    // 标记船恒居首位, 其余按主准则
    assert_eq!(ids(RankingCriterion::AvailableCapacity), vec![3, 2, 1]);
    assert_eq!(ids(RankingCriterion::PumpSystemCount), vec![3, 2, 1]);
    assert_eq!(ids(RankingCriterion::Name), vec![3, 2, 1]);
    assert_eq!(ids(RankingCriterion::BestCandidateFirst), vec![3, 2, 1]);
}

#[test]
fn test_tagged_vessel_outranks_larger_capacity() {
    let (fleet, matrix) = bundled_master_data();
    let ranker = VesselRanker::new(
        CapacityCalculator::new(0.8),
        CompatibilityEvaluator::new(&matrix, &fleet.fluids),
    );

    let big = liquid_vessel(1, "M/V Big", &[1, 2, 3, 4, 5], 0.0);
    let mut tagged = liquid_vessel(2, "M/V Small", &[1], 0.0);
    tagged.best_candidate = true;

    for criterion in [
        RankingCriterion::AvailableCapacity,
        RankingCriterion::PumpSystemCount,
        RankingCriterion::Name,
    ] {
        let ranked = ranker.rank_vessels(&[&big, &tagged], criterion);
        let order: Vec<u32> = ranked.iter().map(|v| v.id).collect();
        assert_eq!(order, vec![2, 1], "criterion={}", criterion);
    }

    tagged.best_candidate = false;
    let ranked = ranker.rank_vessels(&[&big, &tagged], RankingCriterion::AvailableCapacity);
    assert_eq!(ranked[0].id, 1);
}

#[test]
fn test_candidate_fluid_prefers_ready_tanks() {
    let (fleet, matrix) = bundled_master_data();
    let ranker = VesselRanker::new(
        CapacityCalculator::new(0.8),
        CompatibilityEvaluator::new(&matrix, &fleet.fluids),
    )
    .with_candidate_fluid(Some("KCl"));

    // 大船装满不相容流体, 小船有空舱
    let big = vessel(
        1,
        "M/V Big",
        vec![TankBuilder::new("Tk 1S", TankType::Liquid)
            .capacity(5000.0)
            .holding("Liquid Mud", 10.0)
            .build()],
    );
    let small = vessel(
        2,
        "M/V Small",
        vec![TankBuilder::new("Tk 1S", TankType::Liquid).capacity(500.0).build()],
    );

    let ranked = ranker.rank_vessels(&[&big, &small], RankingCriterion::AvailableCapacity);
    assert_eq!(ranked[0].id, 2);
    assert_eq!(ranker.score(&small).ready_tank_count, Some(1));
    assert_eq!(ranker.score(&big).ready_tank_count, Some(0));
}

#[test]
fn test_filters_are_intersected() {
    let (fleet, matrix) = bundled_master_data();
    let ranker = VesselRanker::new(
        CapacityCalculator::new(0.8),
        CompatibilityEvaluator::new(&matrix, &fleet.fluids),
    );

    let methanol = ranker.filter_vessels(
        &fleet.vessels,
        &[VesselFilter::HasCompatibleTank("Methanol".to_string())],
    );
    assert_eq!(methanol.len(), 2);

    let none = ranker.filter_vessels(
        &fleet.vessels,
        &[
            VesselFilter::HasCompatibleTank("Methanol".to_string()),
            VesselFilter::BestCandidate,
        ],
    );
    assert!(none.is_empty());

    let huge = ranker.filter_vessels(&fleet.vessels, &[VesselFilter::AvailableCapacityAbove(1e9)]);
    assert!(huge.is_empty());
}

#[test]
fn test_suggest_does_not_mark_vessels() {
    let state = AppState::new(":memory:").expect("Failed to build AppState");
    let api = &state.fleet_api;

    let top = api
        .suggest_best_candidates(RankingCriterion::PumpSystemCount, None, 1)
        .unwrap();
    assert_eq!(top, vec![1]);
    assert!(api.vessels().unwrap().iter().all(|v| !v.best_candidate));

    api.set_best_candidate(2, true).unwrap();
    let ranked = api
        .rank_vessels(RankingCriterion::BestCandidateFirst, None, &[])
        .unwrap();
    assert_eq!(ranked[0].vessel_id, 2);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].rank, 2);

    let marked = api
        .rank_vessels(RankingCriterion::Name, None, &[VesselFilter::BestCandidate])
        .unwrap();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].vessel_name, "M/V Gulf Carrier");
}

#[test]
fn test_criterion_parsing() {
    assert_eq!(
        RankingCriterion::from_str("pump_system_count"),
        Some(RankingCriterion::PumpSystemCount)
    );
    assert_eq!(RankingCriterion::from_str("bogus"), None);
    assert_eq!(RankingCriterion::Name.to_string(), "NAME");
}
