//! Plain-text report bodies.
//!
//! Name columns are padded by display width, counting full-width characters
//! as two columns, so the text lines up in a monospace chat font.

use chrono::NaiveDateTime;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::query::ReportOptions;
use crate::member::text::{display_width, padding};
use crate::record::ZeroSumMismatch;
use crate::settings::ReportDefaults;
use crate::stats::{PlayerDetail, RankingMetric, RankingReport, Summary, VersusMatrix};
use crate::window::TimeWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub body: String,
}

impl Report {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Appends the remarks footer when there is anything to remark on.
    pub fn with_remarks(mut self, remarks: &[String]) -> Self {
        if !remarks.is_empty() {
            self.body.push_str("\n【特記事項】\n");
            for remark in remarks {
                self.body.push_str(&format!("・{remark}\n"));
            }
        }
        self
    }
}

/// `+12.3` for gains, `▲12.3` for losses.
pub fn signed_points(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.1}")
    } else if value < 0.0 {
        format!("▲{:.1}", value.abs())
    } else {
        "0.0".to_string()
    }
}

fn time(moment: NaiveDateTime) -> String {
    moment.format("%Y/%m/%d %H:%M").to_string()
}

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

fn window_line(window: &TimeWindow) -> String {
    format!("集計範囲：{} 〜 {}\n", time(window.start), time(window.end))
}

fn name_width<'n>(names: impl IntoIterator<Item = &'n str>) -> usize {
    names.into_iter().map(display_width).max().unwrap_or(0)
}

fn padded(name: &str, width: usize) -> String {
    format!("{name}{}", padding(name, width))
}

/// Options that differ from the configured defaults, worded for the footer.
pub fn remarks(options: &ReportOptions, defaults: &ReportDefaults) -> Vec<String> {
    let mut remarks = Vec::new();
    if options.guest_skip != defaults.guest_skip {
        remarks.push(if options.guest_skip {
            "2ゲスト戦の結果を除外".to_string()
        } else {
            "2ゲスト戦の結果を含む".to_string()
        });
    }
    if !options.names.apply_alias_replacement {
        remarks.push("名前の置換なし".to_string());
    } else if !options.names.substitute_unregistered {
        remarks.push("未登録プレイヤーを個別に集計".to_string());
    }
    if options.archive {
        remarks.push("アーカイブから集計".to_string());
    }
    remarks
}

pub fn no_matches(title: &str, window: &TimeWindow) -> Report {
    let mut body = window_line(window);
    body.push_str("記録が見つかりませんでした。\n");
    Report::new(title, body)
}

pub fn summary(summary: &Summary, options: &ReportOptions) -> Report {
    let mut body = window_line(&summary.window);
    body.push_str(&format!(
        "集計期間：{} 〜 {}\n総ゲーム数：{} 回 / トビ：{} 回\n\n",
        time(summary.first_game),
        time(summary.last_game),
        summary.game_count,
        summary.bust_total,
    ));

    let width = name_width(summary.rows.iter().map(|row| row.tally.name.as_str()));
    for row in &summary.rows {
        let tally = &row.tally;
        let counts = tally
            .rank_counts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("-");
        body.push_str(&format!(
            "{:>2}位 {} : {:>7}pt ({}-{}) 平均 {} / 平均順位 {:.2}",
            row.position,
            padded(&tally.name, width),
            signed_points(tally.total_points),
            counts,
            tally.busts,
            signed_points(tally.average_points()),
            tally.average_rank(),
        ));
        if options.score_comparisons {
            if let Some(gap) = row.gap {
                body.push_str(&format!(" (差 {gap:.1}pt)"));
            }
        }
        body.push('\n');
    }
    Report::new("成績サマリー", body)
}

fn metric_value(metric: RankingMetric, value: f64) -> String {
    match metric {
        RankingMetric::TotalPoints | RankingMetric::AveragePoints => {
            format!("{}pt", signed_points(value))
        }
        RankingMetric::AverageRank => format!("{value:.2}"),
        RankingMetric::Participation | RankingMetric::TopRate | RankingMetric::TopTwoRate => {
            percent(value)
        }
    }
}

pub fn ranking(report: &RankingReport, window: &TimeWindow) -> Report {
    let mut body = window_line(window);
    body.push_str(&format!(
        "集計期間：{} 〜 {}\n総ゲーム数：{} 回 (規定数 {} 回以上)\n",
        time(report.first_game),
        time(report.last_game),
        report.game_count,
        report.qualification,
    ));

    for board in &report.boards {
        body.push_str(&format!("\n*{}*\n", board.metric.title()));
        let width = name_width(board.entries.iter().map(|e| e.name.as_str()));
        for entry in &board.entries {
            body.push_str(&format!(
                "{:>2}位 {} : {} ({} 回)\n",
                entry.rank,
                padded(&entry.name, width),
                metric_value(board.metric, entry.value),
                entry.games,
            ));
        }
    }
    Report::new("ランキング", body)
}

pub fn versus(matrix: &VersusMatrix) -> Report {
    let mut body = window_line(&matrix.window);
    body.push_str(&format!(
        "{} の対戦数：{} 回\n\n",
        matrix.focal, matrix.game_count
    ));

    let width = name_width(matrix.records.iter().map(|r| r.opponent.as_str()));
    for record in &matrix.records {
        body.push_str(&format!(
            "{} : {:>3} 戦 {} 勝 {} 敗 ({:>6}) {} / {}\n",
            padded(&record.opponent, width),
            record.games(),
            record.wins,
            record.losses,
            percent(record.win_rate()),
            signed_points(record.focal_points),
            signed_points(record.opponent_points),
        ));
    }
    Report::new(format!("対戦結果 ({})", matrix.focal), body)
}

pub fn detail(detail: &PlayerDetail, options: &ReportOptions) -> Report {
    let tally = &detail.tally;
    let mut body = window_line(&detail.window);
    body.push_str(&format!(
        "総ゲーム数：{} 回 / 参加：{} 回\n",
        detail.window_games, tally.games
    ));

    if tally.games > 0 {
        body.push_str(&format!(
            "勝敗：{} 勝 {} 敗 {} 分\n累積ポイント：{}pt / 平均ポイント：{}pt\n",
            detail.wins,
            detail.losses,
            detail.draws,
            signed_points(tally.total_points),
            signed_points(tally.average_points()),
        ));
        for rank in 1..=4 {
            body.push_str(&format!(
                "{rank}位：{} 回 ({})\n",
                tally.rank_counts[rank - 1],
                percent(tally.rank_rate(rank)),
            ));
        }
        body.push_str(&format!(
            "トビ：{} 回 ({})\n平均順位：{:.2}\n",
            tally.busts,
            percent(tally.bust_rate()),
            tally.average_rank(),
        ));
    }

    if options.show_game_results && !detail.history.is_empty() {
        body.push_str("\n【戦績】\n");
        for line in &detail.history {
            body.push_str(&format!(
                "{} {} {}位 {} ({}pt){}\n",
                time(line.timestamp),
                line.seat,
                line.entry.rank,
                line.entry.score_text,
                signed_points(line.entry.point),
                if line.guest_game { " ※2ゲスト戦" } else { "" },
            ));
        }
    }
    Report::new(format!("個人成績 ({})", detail.name), body)
}

fn over_or_under(mismatch: &ZeroSumMismatch) -> String {
    format!(
        "点数合計が {} です。{} 点{}しています。",
        mismatch.actual,
        mismatch.difference().abs(),
        if mismatch.difference() > 0 { "超過" } else { "不足" },
    )
}

fn expected_total(mismatch: &ZeroSumMismatch) -> String {
    format!(
        "素点の合計が {} になっていません (合計 {})。",
        mismatch.expected, mismatch.actual
    )
}

fn please_check(mismatch: &ZeroSumMismatch) -> String {
    format!(
        "合計点が合いません ({:+})。入力内容を確認してください。",
        mismatch.difference()
    )
}

const NOTICES: [fn(&ZeroSumMismatch) -> String; 3] = [over_or_under, expected_total, please_check];

/// Message for the submitter of a game whose scores do not add up.
pub fn zero_sum_notice(mismatch: &ZeroSumMismatch) -> String {
    NOTICES
        .choose(&mut rand::rng())
        .map_or_else(|| expected_total(mismatch), |notice| notice(mismatch))
}
