use clap::Parser;
use qttt::cli::commands::{
    evaluate::{self, EvaluateArgs},
    play::{self, PlayArgs},
    stats::{self, StatsArgs},
    train::{TrainArgs, execute},
    watch::{self, WatchArgs},
};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn summary_without_extension_appends_json() {
    let tmp = tempdir().unwrap();
    let summary_stem = tmp.path().join("run_overview");

    let args = parse_args([
        "qttt-train",
        "--episodes",
        "5",
        "--seed",
        "1",
        "--quiet",
        "--summary",
        summary_stem.to_str().unwrap(),
        "--eval-games",
        "0",
    ]);

    execute(args).expect("training with summary should succeed");

    let expected_path = summary_stem.with_extension("json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["games"], 5);
    assert_eq!(parsed["episodes_completed"], 5);
    assert_eq!(parsed["cancelled"], false);
    assert!(parsed["eval_vs_random"].is_null());
    assert_eq!(parsed["config"]["curriculum_opponent"], "heuristic");
}

#[test]
fn summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}/", summary_dir.display());

    let args = parse_args([
        "qttt-train",
        "--episodes",
        "3",
        "--opponent",
        "random",
        "--quiet",
        "--summary",
        &summary_arg,
        "--eval-games",
        "0",
    ]);

    execute(args).expect("training with directory summary should succeed");

    let expected_path = summary_dir.join("training_summary.json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["games"], 3);
    assert_eq!(parsed["config"]["curriculum_opponent"], "random");
}

#[test]
fn config_file_with_flag_overrides() {
    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("train.json");
    std::fs::write(
        &config_path,
        r#"{ "episodes": 500, "opponent_mix": 0.0, "agent": { "gamma": 0.9 } }"#,
    )
    .unwrap();
    let summary = tmp.path().join("summary.json");

    let args = parse_args([
        "qttt-train",
        "--config",
        config_path.to_str().unwrap(),
        "--episodes",
        "20",
        "--seed",
        "9",
        "--quiet",
        "--eval-games",
        "0",
        "--summary",
        summary.to_str().unwrap(),
    ]);
    execute(args).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(parsed["episodes_requested"], 20);
    assert_eq!(parsed["config"]["agent"]["gamma"], 0.9);
    assert_eq!(parsed["vs_fixed"]["games"], 0);
}

#[test]
fn train_records_stats_then_evaluate_and_resume() {
    let tmp = tempdir().unwrap();
    let agent_path = tmp.path().join("agent.msgpack");
    let stats_path = tmp.path().join("stats.json");
    let export_path = tmp.path().join("eval.json");

    for _ in 0..2 {
        let args = parse_args([
            "qttt-train",
            "--episodes",
            "40",
            "--seed",
            "5",
            "--quiet",
            "--eval-games",
            "10",
            "--resume",
            agent_path.to_str().unwrap(),
            "--output",
            agent_path.to_str().unwrap(),
            "--stats",
            stats_path.to_str().unwrap(),
        ]);
        execute(args).unwrap();
    }

    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
    assert_eq!(record["training"]["sessions"], 2);
    assert_eq!(record["training"]["total_episodes"], 80);
    assert_eq!(record["training"]["history"][1]["run_id"], 2);
    assert_eq!(record["training"]["last_evaluation"]["games"], 10);

    let saved = qttt::SavedQAgent::load_from_file(&agent_path).unwrap().unwrap();
    assert_eq!(saved.episodes_trained, 80);

    evaluate::execute(EvaluateArgs::parse_from([
        "qttt-evaluate",
        agent_path.to_str().unwrap(),
        "--opponent",
        "heuristic",
        "--games",
        "6",
        "--starting-player",
        "alternate",
        "--runs",
        "2",
        "--export",
        export_path.to_str().unwrap(),
    ]))
    .unwrap();

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(exported["result"]["games"], 6);
    assert_eq!(exported["agent_episodes"], 80);
    assert_eq!(exported["multirun"]["runs"].as_array().unwrap().len(), 2);

    stats::execute(StatsArgs::parse_from([
        "qttt-stats",
        "--stats",
        stats_path.to_str().unwrap(),
        "--reset",
    ]))
    .unwrap();
    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
    assert_eq!(record["training"]["sessions"], 0);
}

#[test]
fn json_output_is_a_plain_q_table() {
    let tmp = tempdir().unwrap();
    let table_path = tmp.path().join("q_table.json");

    execute(parse_args([
        "qttt-train",
        "--episodes",
        "10",
        "--seed",
        "2",
        "--quiet",
        "--eval-games",
        "0",
        "--output",
        table_path.to_str().unwrap(),
    ]))
    .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&table_path).unwrap()).unwrap();
    let table = parsed.as_object().unwrap();
    assert!(table.contains_key("0,0,0,0,0,0,0,0,0"));
    assert!(table.values().all(|actions| actions.is_object()));

    watch::execute(WatchArgs::parse_from([
        "qttt-watch",
        table_path.to_str().unwrap(),
        "--opponent",
        "random",
        "--agent-second",
        "--seed",
        "3",
    ]))
    .unwrap();
}

#[test]
fn play_with_online_learning_saves_agent_and_stats() {
    let tmp = tempdir().unwrap();
    let table_path = tmp.path().join("q_table.json");
    let stats_path = tmp.path().join("stats.json");
    std::fs::write(&table_path, "{}").unwrap();

    let args = |games: &str| {
        PlayArgs::parse_from([
            "qttt-play",
            table_path.to_str().unwrap(),
            "--seat",
            "x",
            "--games",
            games,
            "--online-learning",
            "--stats",
            stats_path.to_str().unwrap(),
        ])
    };

    // Every cell in order; occupied ones are rejected and the next is read.
    let moves = "0\n1\n2\n3\n4\n5\n6\n7\n8\n";
    let mut out = Vec::new();
    play::execute_with(args("1"), moves.as_bytes(), &mut out).unwrap();
    let transcript = String::from_utf8(out).unwrap();
    assert!(transcript.contains("Game 1: you play X"));

    let table: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&table_path).unwrap()).unwrap();
    assert!(!table.as_object().unwrap().is_empty());

    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
    let played = &record["play"]["human_vs_trained"];
    assert_eq!(played["games"], 1);
    assert_eq!(played["online_learning_games"], 1);

    // Quitting at once records nothing.
    play::execute_with(args("2"), "q\n".as_bytes(), Vec::<u8>::new()).unwrap();
    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
    assert_eq!(record["play"]["human_vs_trained"]["games"], 1);

    stats::execute(StatsArgs::parse_from([
        "qttt-stats",
        "--stats",
        stats_path.to_str().unwrap(),
        "--reset-play",
    ]))
    .unwrap();
    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
    assert_eq!(record["play"]["human_vs_trained"]["games"], 0);
}
