use serde::Serialize;
use std::fmt;

/// 单条评测得分
///
/// 序列化为整数，失败时为哨兵值 `-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i32")]
pub enum ScoreResult {
    /// 裁判给出的 0-10 分
    Scored(u8),
    /// 调用失败
    Failed,
}

impl ScoreResult {
    pub const FAILED_SENTINEL: i32 = -1;
    pub const MAX_SCORE: i32 = 10;

    pub fn value(self) -> i32 {
        match self {
            ScoreResult::Scored(score) => i32::from(score),
            ScoreResult::Failed => Self::FAILED_SENTINEL,
        }
    }

    pub fn is_failed(self) -> bool {
        matches!(self, ScoreResult::Failed)
    }
}

impl From<ScoreResult> for i32 {
    fn from(score: ScoreResult) -> Self {
        score.value()
    }
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value(), Self::MAX_SCORE)
    }
}

/// 评测汇总报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    /// 参与评测的条目数
    pub evaluated: usize,
    /// 成功打分的条目数
    pub scored: usize,
    /// 调用失败的条目数
    pub failed: usize,
    /// 总分（失败条目按 -1 计入）
    pub total_score: i32,
    pub max_possible_score: i32,
    /// 百分制得分
    pub normalized_percent: f64,
    /// 与输入顺序一致的逐条得分
    pub scores: Vec<ScoreResult>,
}

impl EvalReport {
    pub fn from_scores(scores: Vec<ScoreResult>) -> Self {
        let evaluated = scores.len();
        let failed = scores.iter().filter(|s| s.is_failed()).count();
        let total_score: i32 = scores.iter().map(|s| s.value()).sum();
        let max_possible_score = evaluated as i32 * ScoreResult::MAX_SCORE;
        let normalized_percent = if max_possible_score > 0 {
            f64::from(total_score) / f64::from(max_possible_score) * 100.0
        } else {
            0.0
        };

        Self {
            evaluated,
            scored: evaluated - failed,
            failed,
            total_score,
            max_possible_score,
            normalized_percent,
            scores,
        }
    }
}
