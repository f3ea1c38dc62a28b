//! Saving and restoring trained agents

mod common;

use std::path::Path;

use common::corridor;
use racetrack_rl::{
    Coordinate, Error, MonteCarloAgent, SarsaAgent, WindyGridworld,
    adapters::{InMemoryRepository, MsgPackRepository},
    monte_carlo::SavedMonteCarloAgent,
    pipeline::{TrainingConfig, TrainingMetadata, TrainingPipeline, rollout},
    ports::SnapshotRepository,
    racetrack::{RaceTrack, TrackSpec, VelocityLimits},
    td_learning::{SavedTdAgent, TdAlgorithm, TdConfig, TdLearner},
    windy::Move,
};
use rand::{SeedableRng, rngs::StdRng};
use tempfile::tempdir;

fn trained_sarsa(world: &WindyGridworld) -> SarsaAgent<Coordinate, Move> {
    let mut agent: SarsaAgent<Coordinate, Move> =
        SarsaAgent::new(TdConfig::windy()).with_state_value(world.goal(), 0.0);
    let config = TrainingConfig {
        num_episodes: 30,
        seed: Some(4),
        ..TrainingConfig::default()
    };
    TrainingPipeline::new(config).run(world, &mut agent).unwrap();
    agent
}

#[test]
fn test_restored_sarsa_follows_the_same_greedy_path() {
    let world = WindyGridworld::default();
    let agent = trained_sarsa(&world);

    let tmp = tempdir().unwrap();
    let path = tmp.path().join("windy.msgpack");
    let metadata = TrainingMetadata {
        environment: Some("windy-gridworld".to_string()),
        episodes_trained: Some(30),
        ..TrainingMetadata::default()
    };
    SavedTdAgent::from_sarsa(&agent, metadata).save_to_file(&path).unwrap();

    let loaded: SavedTdAgent<Coordinate, Move> = SavedTdAgent::load_from_file(&path).unwrap();
    assert_eq!(loaded.algorithm, TdAlgorithm::Sarsa);
    assert_eq!(loaded.metadata.episodes_trained, Some(30));

    let restored = loaded.to_agent().unwrap().into_box::<WindyGridworld>();
    assert_eq!(restored.table_size(), agent.q_table().size());

    let before = rollout(&world, &agent, 30, &mut StdRng::seed_from_u64(0)).unwrap();
    let after = rollout(&world, &*restored, 30, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_monte_carlo_snapshot_keeps_track_layout() {
    let track = corridor(5);
    let mut agent = MonteCarloAgent::default();
    let config = TrainingConfig {
        num_episodes: 200,
        seed: Some(21),
        ..TrainingConfig::default()
    };
    let result = TrainingPipeline::new(config).run(&track, &mut agent).unwrap();

    let spec = TrackSpec::classic();
    let saved = SavedMonteCarloAgent::new(
        &agent,
        TrainingMetadata::from_result("racetrack", &result, Some(21)),
    )
    .with_track(spec.clone(), VelocityLimits::forward_only());

    let repo = InMemoryRepository::new();
    repo.save(&saved, Path::new("mc")).unwrap();
    let loaded: SavedMonteCarloAgent = repo.load(Path::new("mc")).unwrap();

    assert_eq!(loaded.track, Some(spec));
    assert_eq!(loaded.limits, VelocityLimits::forward_only());
    assert_eq!(loaded.metadata.total_steps, Some(result.total_steps));
    assert_eq!(loaded.metadata.seed, Some(21));

    let restored = loaded.to_agent().unwrap();
    assert_eq!(restored.policy_size(), agent.policy_size());
    for state in track
        .geometry()
        .drivable_cells()
        .map(racetrack_rl::CarState::at_rest)
    {
        assert_eq!(
            restored.policy_action(&track, &state),
            agent.policy_action(&track, &state)
        );
    }
}

#[test]
fn test_loading_missing_snapshot_fails() {
    let tmp = tempdir().unwrap();
    let result: racetrack_rl::Result<SavedMonteCarloAgent> =
        MsgPackRepository::new().load(&tmp.path().join("missing.msgpack"));
    assert!(matches!(result, Err(Error::Io { .. })));

    let repo = InMemoryRepository::new();
    let result: racetrack_rl::Result<SavedMonteCarloAgent> = repo.load(Path::new("missing"));
    assert!(matches!(result, Err(Error::SnapshotNotFound { .. })));
}

#[test]
fn test_snapshot_for_other_algorithm_restores_that_algorithm() {
    let agent: racetrack_rl::QLearningAgent<Coordinate, Move> =
        racetrack_rl::QLearningAgent::new(TdConfig::windy());
    let saved = SavedTdAgent::from_q_learning(&agent, TrainingMetadata::default());
    assert!(matches!(saved.to_agent(), Ok(TdLearner::QLearning(_))));

    // A track file written for one layout still builds after a round trip.
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("track.json");
    TrackSpec::classic().save(&path).unwrap();
    let track = RaceTrack::new(TrackSpec::load(&path).unwrap().build().unwrap());
    assert_eq!(track.geometry(), RaceTrack::classic().unwrap().geometry());
}
