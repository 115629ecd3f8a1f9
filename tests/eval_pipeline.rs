mod support;

use sft_toolkit::{EvalProcessor, Judge, LlmError, ScoreResult, WorkItem};
use std::sync::Arc;
use std::time::Duration;
use support::{FakeChatModel, InFlight};

fn items(count: usize) -> Vec<WorkItem> {
    (1..=count)
        .map(|i| WorkItem::new(format!("Q{i}"), "", format!("A{i}")))
        .collect()
}

/// 被测模型把问题原样复述为 "answer to Qn"
fn echo_subject() -> FakeChatModel {
    FakeChatModel::new("subject", |request| Ok(format!("answer to {}", request.user)))
}

#[tokio::test]
async fn scores_follow_input_order_with_sentinel() {
    let subject = Arc::new(echo_subject());
    let judge_model = Arc::new(FakeChatModel::new("judge", |request| {
        if request.user.contains("answer to Q1") {
            Ok("7".to_string())
        } else if request.user.contains("answer to Q2") {
            Ok("abc".to_string())
        } else if request.user.contains("answer to Q3") {
            Ok("10 points".to_string())
        } else {
            Err(LlmError::api_call_failed("judge", "connection reset"))
        }
    }));

    let processor = EvalProcessor::new(Judge::new(subject, judge_model), 16, 100);
    let report = processor.run(&items(4)).await;

    assert_eq!(
        report.scores,
        vec![
            ScoreResult::Scored(7),
            ScoreResult::Scored(5),
            ScoreResult::Scored(10),
            ScoreResult::Failed,
        ]
    );
    assert_eq!(report.evaluated, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total_score, 21);
    assert_eq!(report.max_possible_score, 40);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["scores"], serde_json::json!([7, 5, 10, -1]));
}

#[tokio::test]
async fn only_first_n_items_are_evaluated() {
    let subject = Arc::new(echo_subject());
    let judge_model = Arc::new(FakeChatModel::new("judge", |_| Ok("8".to_string())));

    let processor = EvalProcessor::new(Judge::new(subject.clone(), judge_model), 4, 2);
    let report = processor.run(&items(5)).await;

    assert_eq!(report.evaluated, 2);
    assert_eq!(report.total_score, 16);
    let mut asked: Vec<String> = subject.requests().into_iter().map(|r| r.user).collect();
    asked.sort();
    assert_eq!(asked, vec!["Q1", "Q2"]);
}

#[tokio::test]
async fn zero_limit_evaluates_everything() {
    let judge_model = Arc::new(FakeChatModel::new("judge", |_| Ok("6".to_string())));
    let processor = EvalProcessor::new(Judge::new(Arc::new(echo_subject()), judge_model), 4, 0);

    let report = processor.run(&items(3)).await;
    assert_eq!(report.evaluated, 3);
    assert!((report.normalized_percent - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn subject_failure_is_sentinel_without_judging() {
    let subject = Arc::new(FakeChatModel::new("subject", |request| {
        if request.user == "Q2" {
            Err(LlmError::api_call_failed("subject", "timeout"))
        } else {
            Ok("ok".to_string())
        }
    }));
    let judge_model = Arc::new(FakeChatModel::new("judge", |_| Ok("9".to_string())));

    let processor = EvalProcessor::new(Judge::new(subject, judge_model.clone()), 4, 100);
    let report = processor.run(&items(3)).await;

    assert_eq!(
        report.scores,
        vec![ScoreResult::Scored(9), ScoreResult::Failed, ScoreResult::Scored(9)]
    );
    assert_eq!(judge_model.call_count(), 2);
}

#[tokio::test]
async fn in_flight_items_never_exceed_limit() {
    let in_flight = Arc::new(InFlight::default());
    let subject = Arc::new(
        echo_subject()
            .with_delay(Duration::from_millis(10))
            .with_in_flight(in_flight.clone()),
    );
    let judge_model = Arc::new(
        FakeChatModel::new("judge", |_| Ok("5".to_string()))
            .with_delay(Duration::from_millis(10))
            .with_in_flight(in_flight.clone()),
    );

    let processor = EvalProcessor::new(Judge::new(subject, judge_model), 3, 100);
    let report = processor.run(&items(10)).await;

    assert_eq!(report.evaluated, 10);
    // 作答与打分在同一个槽位内串行进行
    assert!(in_flight.peak() <= 3);
    assert!(in_flight.peak() > 1);
}
