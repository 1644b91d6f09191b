//! End-to-end tests for curriculum training and evaluation

mod common;

use std::sync::{Arc, Mutex};

use common::quick_config;
use qttt::{
    CurriculumTrainer, Evaluator, Opponent, StartingPlayer, TrainConfig,
    pipeline::{CancellationToken, EpisodeOpponent, MetricsSnapshot, Observer, TrainingMetrics},
    q_learning::QAgent,
    tictactoe::MatchResult,
    train,
};

#[test]
fn test_seeded_runs_are_identical() {
    let config = quick_config(400, 2024).with_reward_shaping(qttt::RewardShaping::tactical());
    let first = train(config.clone()).unwrap();
    let second = train(config).unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.agent.export(), second.agent.export());
}

#[test]
fn test_different_seeds_diverge() {
    let a = train(quick_config(200, 1)).unwrap();
    let b = train(quick_config(200, 2)).unwrap();
    assert_ne!(a.agent.export(), b.agent.export());
}

#[test]
fn test_training_against_heuristic_does_not_lose_more() {
    let evaluator = Evaluator::new(20, StartingPlayer::Agent).with_seed(0);
    let before = evaluator
        .evaluate(&QAgent::default(), &Opponent::Heuristic)
        .unwrap();

    let config = TrainConfig::default()
        .with_episodes(200)
        .with_opponent_mix(1.0)
        .with_curriculum_opponent(Opponent::Heuristic)
        .with_seed(7);
    let outcome = train(config).unwrap();
    assert_eq!(outcome.metrics.vs_fixed.total(), 200);

    let after = evaluator
        .evaluate(&outcome.agent, &Opponent::Heuristic)
        .unwrap();
    assert!(
        after.losses <= before.losses,
        "losses went from {} to {}",
        before.losses,
        after.losses
    );
}

#[test]
fn test_untrained_agent_is_not_strong_against_random() {
    let tally = Evaluator::new(1000, StartingPlayer::Agent)
        .with_seed(99)
        .evaluate(&QAgent::default(), &Opponent::Random)
        .unwrap();

    assert_eq!(tally.total(), 1000);
    let win_rate = tally.win_rate();
    assert!(
        win_rate > 0.5 && win_rate < 0.9,
        "untrained win rate {win_rate}"
    );
}

#[test]
fn test_training_improves_against_random() {
    let config = TrainConfig::default()
        .with_episodes(3000)
        .with_opponent_mix(0.5)
        .with_curriculum_opponent(Opponent::Random)
        .with_seed(11);
    let outcome = train(config).unwrap();

    let tally = Evaluator::new(500, StartingPlayer::Agent)
        .with_seed(5)
        .evaluate(&outcome.agent, &Opponent::Random)
        .unwrap();
    assert!(tally.loss_rate() < 0.25, "loss rate {}", tally.loss_rate());
}

#[test]
fn test_observer_event_ordering() {
    struct TestObserver {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Observer for TestObserver {
        fn on_training_start(&mut self, total: usize) -> qttt::Result<()> {
            self.events.lock().unwrap().push(format!("start_{total}"));
            Ok(())
        }

        fn on_episode_end(
            &mut self,
            episode: usize,
            _opponent: EpisodeOpponent,
            _result: MatchResult,
        ) -> qttt::Result<()> {
            self.events.lock().unwrap().push(format!("episode_{episode}"));
            Ok(())
        }

        fn on_snapshot(&mut self, snapshot: &MetricsSnapshot, _agent: &QAgent) -> qttt::Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("snapshot_{}", snapshot.episode));
            Ok(())
        }

        fn on_training_end(&mut self, metrics: &TrainingMetrics) -> qttt::Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("end_{}", metrics.episodes_completed));
            Ok(())
        }
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let observer = TestObserver {
        events: events.clone(),
    };

    let config = TrainConfig::default()
        .with_episodes(4)
        .with_snapshot_every(2)
        .with_seed(333);
    CurriculumTrainer::new(config)
        .unwrap()
        .with_observer(Box::new(observer))
        .train()
        .unwrap();

    let log = events.lock().unwrap();
    assert_eq!(
        *log,
        [
            "start_4",
            "episode_0",
            "episode_1",
            "snapshot_2",
            "episode_2",
            "episode_3",
            "snapshot_4",
            "end_4",
        ]
    );
}

#[test]
fn test_cancellation_returns_partial_results() {
    struct CancelAfter {
        token: CancellationToken,
        after: usize,
    }

    impl Observer for CancelAfter {
        fn on_episode_end(
            &mut self,
            episode: usize,
            _opponent: EpisodeOpponent,
            _result: MatchResult,
        ) -> qttt::Result<()> {
            if episode + 1 == self.after {
                self.token.cancel();
            }
            Ok(())
        }
    }

    let token = CancellationToken::new();
    let outcome = CurriculumTrainer::new(quick_config(1000, 4))
        .unwrap()
        .with_cancellation(token.clone())
        .with_observer(Box::new(CancelAfter { token, after: 120 }))
        .train()
        .unwrap();

    assert!(outcome.cancelled);
    assert!(!outcome.completed);
    let metrics = &outcome.metrics;
    assert_eq!(metrics.episodes_completed, 120);
    assert_eq!(metrics.wins + metrics.draws + metrics.losses, 120);
    assert_eq!(metrics.snapshots.len(), 2);
    assert_eq!(outcome.agent.episodes_decayed(), 120);
    assert_eq!(metrics.q_table_size, outcome.agent.state_count());
}

#[test]
fn test_alternating_seats_learn_both_sides() {
    let config = quick_config(200, 21)
        .with_opponent_mix(1.0)
        .with_curriculum_opponent(Opponent::Random)
        .with_starting_player(StartingPlayer::Alternate);
    let outcome = train(config).unwrap();

    let mut x_to_move = false;
    let mut o_to_move = false;
    for (state, _) in outcome.agent.table().iter() {
        let own = state.values().iter().filter(|&&v| v == 1).count();
        let theirs = state.values().iter().filter(|&&v| v == -1).count();
        if own == theirs {
            x_to_move = true;
        } else {
            o_to_move = true;
        }
    }
    assert!(x_to_move && o_to_move);
}

#[test]
fn test_self_play_only_run() {
    let outcome = train(quick_config(300, 8).with_opponent_mix(0.0)).unwrap();
    let metrics = &outcome.metrics;
    assert_eq!(metrics.self_play.total(), 300);
    assert_eq!(metrics.vs_fixed.total(), 0);
    let episodes: Vec<usize> = metrics.snapshots.iter().map(|s| s.episode).collect();
    assert_eq!(episodes, vec![50, 100, 150, 200, 250, 300]);
}
