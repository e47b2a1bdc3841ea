use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use mahjong_ledger::{
    member::MemberSection, AppState, InMemoryMessageSource, InMemoryResultTable, MemberService,
    PlayerRegistry, RawMessage, ReportService, Settings,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Wall-clock time on the reference test day, 1 May 2024.
pub fn game_time(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|day| day.and_hms_opt(hour, minute, 0))
        .expect("valid test time")
}

pub struct TestSetup {
    #[allow(dead_code)]
    pub state: AppState,
    pub messages: Arc<InMemoryMessageSource>,
    pub archive: Arc<InMemoryResultTable>,
    pub reports: ReportService,
    pub members: MemberService,
}

impl TestSetup {
    /// Posts a chat line the way the binary does: stored as a message and,
    /// when it is a game report, archived.
    pub async fn post(&self, text: &str, posted: NaiveDateTime) {
        let message = RawMessage::at(text, posted);
        if let Some(extraction) = self
            .reports
            .inspect(&message)
            .await
            .expect("inspecting a message should succeed")
        {
            self.archive.archive(&extraction.record).await;
        }
        self.messages.push(message).await;
    }
}

pub struct TestSetupBuilder {
    settings: Settings,
    players: Vec<MemberSection>,
    now: NaiveDateTime,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            players: vec![],
            now: game_time(23, 30),
        }
    }

    pub fn with_player(mut self, name: &str, aliases: &[&str]) -> Self {
        self.players.push(MemberSection {
            name: name.to_string(),
            alias: aliases.join(","),
        });
        self
    }

    pub fn with_four_players(self) -> Self {
        self.with_player("たろう", &["タロウ"])
            .with_player("じろう", &[])
            .with_player("さぶろう", &[])
            .with_player("しろう", &["シロ"])
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn build(self) -> TestSetup {
        let messages = Arc::new(InMemoryMessageSource::new());
        let archive = Arc::new(InMemoryResultTable::new());
        let now = self.now;
        let state = AppState::new(
            self.settings,
            PlayerRegistry::from_sections(self.players),
            messages.clone(),
            archive.clone(),
        )
        .with_clock(move || now);

        TestSetup {
            reports: ReportService::new(state.clone()),
            members: MemberService::new(state.clone()),
            state,
            messages,
            archive,
        }
    }
}
