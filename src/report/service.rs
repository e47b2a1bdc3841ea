use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::format::{self, Report};
use super::query::{ReportOptions, ReportQuery};
use crate::member::{NameCanonicalizer, NameOptions, PlayerRegistry};
use crate::record::{Extraction, GameRecord, RecordBuilder};
use crate::settings::Settings;
use crate::shared::{AppError, AppState};
use crate::source::RawMessage;
use crate::stats::{AggregationEngine, GameFilter, StatsError};
use crate::window::TimeWindowResolver;

/// Everything one report request works from. Settings and registry are the
/// snapshots taken when the request started.
struct Prepared {
    settings: Arc<Settings>,
    query: ReportQuery,
    records: Vec<GameRecord>,
}

impl Prepared {
    fn engine(&self) -> AggregationEngine<'_> {
        let filter = GameFilter::new(
            self.query.window,
            self.query.options.guest_skip,
            &self.settings.member.guest_name,
        );
        AggregationEngine::new(&self.records, filter)
    }

    fn finish(&self, title: &str, outcome: Result<Report, StatsError>) -> Result<Report, AppError> {
        let report = match outcome {
            Ok(report) => report,
            Err(StatsError::NoMatches { start, end }) => {
                info!(%start, %end, title, "No games in window");
                format::no_matches(title, &self.query.window)
            }
            Err(e) => return Err(e.into()),
        };
        let remarks = format::remarks(&self.query.options, &self.settings.defaults);
        Ok(report.with_remarks(&remarks))
    }
}

/// Produces result, ranking and versus reports from the configured sources.
#[derive(Clone)]
pub struct ReportService {
    state: AppState,
}

impl ReportService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Builds the record for a single chat message if it is a game report,
    /// using the default name handling.
    pub async fn inspect(&self, message: &RawMessage) -> Result<Option<Extraction>, AppError> {
        let settings = self.state.settings().await;
        let registry = self.state.registry().await;
        let builder = RecordBuilder::new(&settings)?;
        let canonicalizer = NameCanonicalizer::from_settings(&registry, &settings.member);
        let options = ReportOptions::from_defaults(&settings.defaults).names;
        Ok(builder.extract(message, &canonicalizer, options))
    }

    async fn load_records(
        &self,
        settings: &Settings,
        registry: &PlayerRegistry,
        archive: bool,
        names: NameOptions,
    ) -> Result<Vec<GameRecord>, AppError> {
        let builder = RecordBuilder::new(settings)?;
        let canonicalizer = NameCanonicalizer::from_settings(registry, &settings.member);

        let records = if archive {
            let rows = self.state.archive.fetch_rows().await?;
            builder.from_rows(&rows, &canonicalizer, names)?
        } else {
            let messages = self.state.messages.fetch_messages().await?;
            builder.build_all(&messages, &canonicalizer, names)
        };
        debug!(count = records.len(), archive, "Loaded game records");
        Ok(records)
    }

    async fn prepare(&self, args: &[&str]) -> Result<Prepared, AppError> {
        let settings = self.state.settings().await;
        let registry = self.state.registry().await;
        let canonicalizer = NameCanonicalizer::from_settings(&registry, &settings.member);
        let resolver = TimeWindowResolver::new(self.state.now());

        let query = ReportQuery::parse(
            args.iter().copied(),
            &settings.defaults,
            &canonicalizer,
            &resolver,
        )?;
        let records = self
            .load_records(
                &settings,
                &registry,
                query.options.archive,
                query.options.names,
            )
            .await?;

        Ok(Prepared {
            settings,
            query,
            records,
        })
    }

    /// Summary of every player, or a personal report when exactly one player
    /// is named.
    #[instrument(skip(self))]
    pub async fn results(&self, args: &[&str]) -> Result<Report, AppError> {
        let prepared = self.prepare(args).await?;
        let engine = prepared.engine();
        let options = &prepared.query.options;

        if let [player] = prepared.query.players.as_slice() {
            let title = format!("個人成績 ({player})");
            let outcome = engine
                .player_detail(player)
                .map(|detail| format::detail(&detail, options));
            return prepared.finish(&title, outcome);
        }

        let outcome = engine
            .summary(&prepared.query.players)
            .map(|summary| format::summary(&summary, options));
        prepared.finish("成績サマリー", outcome)
    }

    #[instrument(skip(self))]
    pub async fn ranking(&self, args: &[&str]) -> Result<Report, AppError> {
        let prepared = self.prepare(args).await?;
        let engine = prepared.engine();
        let ranking = &prepared.settings.ranking;

        let outcome = engine
            .rankings(
                &prepared.query.players,
                ranking.slots,
                ranking.qualification_ratio,
            )
            .map(|report| format::ranking(&report, &prepared.query.window));
        prepared.finish("ランキング", outcome)
    }

    /// The first named player against the others, or against everyone when
    /// only one player is named.
    #[instrument(skip(self))]
    pub async fn versus(&self, args: &[&str]) -> Result<Report, AppError> {
        let prepared = self.prepare(args).await?;
        let Some((focal, opponents)) = prepared.query.players.split_first() else {
            return Err(StatsError::MissingPlayer.into());
        };

        let outcome = prepared
            .engine()
            .versus(focal, opponents)
            .map(|matrix| format::versus(&matrix));
        prepared.finish(&format!("対戦結果 ({focal})"), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::source::{InMemoryMessageSource, InMemoryResultTable};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn registry() -> PlayerRegistry {
        PlayerRegistry::from_json_str(
            r#"[{"name": "たろう", "alias": ""}, {"name": "じろう", "alias": ""},
                {"name": "さぶろう", "alias": ""}, {"name": "しろう", "alias": ""}]"#,
        )
        .unwrap()
    }

    async fn service_with(lines: &[(&str, NaiveDateTime)]) -> ReportService {
        let messages = Arc::new(InMemoryMessageSource::new());
        for (text, posted) in lines {
            messages.push(RawMessage::at(*text, *posted)).await;
        }
        let state = AppStateBuilder::new()
            .with_registry(registry())
            .with_messages(messages)
            .at(at(23, 0))
            .build();
        ReportService::new(state)
    }

    #[tokio::test]
    async fn results_summarize_todays_games() {
        let service = service_with(&[
            ("御無礼 たろう350 じろう250 さぶろう250 しろう150", at(20, 0)),
            ("御無礼 たろう150 じろう250 さぶろう250 しろう350", at(21, 0)),
            ("おつかれさまでした", at(22, 0)),
        ])
        .await;

        let report = service.results(&[]).await.unwrap();
        assert_eq!(report.title, "成績サマリー");
        assert!(report.body.contains("総ゲーム数：2 回"));
    }

    #[tokio::test]
    async fn one_player_gives_personal_report() {
        let service = service_with(&[(
            "御無礼 たろう350 じろう250 さぶろう250 しろう150",
            at(20, 0),
        )])
        .await;

        let report = service.results(&["たろう", "戦績"]).await.unwrap();
        assert_eq!(report.title, "個人成績 (たろう)");
        assert!(report.body.contains("【戦績】"));
    }

    #[tokio::test]
    async fn empty_window_reports_no_matches() {
        let service = service_with(&[]).await;
        let report = service.ranking(&[]).await.unwrap();
        assert!(report.body.contains("記録が見つかりませんでした"));
    }

    #[tokio::test]
    async fn versus_without_player_is_an_error() {
        let service = service_with(&[]).await;
        assert!(matches!(
            service.versus(&[]).await,
            Err(AppError::Stats(StatsError::MissingPlayer))
        ));
    }

    #[tokio::test]
    async fn archive_flag_reads_result_table() {
        let archive = Arc::new(InMemoryResultTable::new());
        let state = AppStateBuilder::new()
            .with_registry(registry())
            .with_archive(archive.clone())
            .at(at(23, 0))
            .build();
        let service = ReportService::new(state);

        let message = RawMessage::at("御無礼 たろう350 じろう250 さぶろう250 しろう150", at(20, 0));
        let extraction = service.inspect(&message).await.unwrap().unwrap();
        archive.archive(&extraction.record).await;

        let from_chat = service.results(&[]).await.unwrap();
        assert!(from_chat.body.contains("記録が見つかりませんでした"));

        let from_archive = service.results(&["アーカイブ"]).await.unwrap();
        assert!(from_archive.body.contains("総ゲーム数：1 回"));
        assert!(from_archive.body.contains("アーカイブから集計"));
    }
}
