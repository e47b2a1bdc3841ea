use std::io::ErrorKind;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mahjong_ledger::member::MemberAction;
use mahjong_ledger::report::format::zero_sum_notice;
use mahjong_ledger::{
    AppError, AppState, InMemoryMessageSource, InMemoryResultTable, MemberService,
    PlayerRegistry, RawMessage, Report, ReportService, Settings,
};

const SETTINGS_VAR: &str = "LEDGER_SETTINGS";
const MEMBERS_VAR: &str = "LEDGER_MEMBERS";

fn load_settings() -> Result<Settings, AppError> {
    match std::env::var(SETTINGS_VAR) {
        Ok(path) => Ok(Settings::load(path)?),
        Err(_) => Ok(Settings::default()),
    }
}

fn load_members() -> Result<PlayerRegistry, AppError> {
    let Ok(path) = std::env::var(MEMBERS_VAR) else {
        return Ok(PlayerRegistry::new());
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(PlayerRegistry::from_json_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path, "Member list not found, starting empty");
            Ok(PlayerRegistry::new())
        }
        Err(e) => Err(e.into()),
    }
}

async fn save_members(members: &MemberService) -> Result<(), AppError> {
    let Ok(path) = std::env::var(MEMBERS_VAR) else {
        return Ok(());
    };
    let text = serde_json::to_string_pretty(&members.sections().await)?;
    tokio::fs::write(&path, text).await?;
    info!(path = %path, "Saved member list");
    Ok(())
}

struct Ledger {
    state: AppState,
    messages: Arc<InMemoryMessageSource>,
    archive: Arc<InMemoryResultTable>,
    reports: ReportService,
    members: MemberService,
}

impl Ledger {
    fn print(report: &Report) {
        println!("== {} ==\n{}", report.title, report.body);
    }

    async fn handle_line(&self, line: &str) -> Result<(), AppError> {
        let settings = self.state.settings().await;
        let commands = &settings.commands;
        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        if command == commands.results {
            Self::print(&self.reports.results(&args).await?);
        } else if command == commands.ranking {
            Self::print(&self.reports.ranking(&args).await?);
        } else if command == commands.versus {
            Self::print(&self.reports.versus(&args).await?);
        } else if command == commands.member {
            Self::print(&self.members.handle(&args).await);
            let action = args.first().and_then(|token| MemberAction::from_token(token));
            if matches!(action, Some(MemberAction::Add | MemberAction::Remove)) {
                save_members(&self.members).await?;
            }
        } else if command == commands.reload {
            self.state.replace_settings(load_settings()?).await;
            self.state.replace_registry(load_members()?).await;
        } else {
            self.record_message(line).await?;
        }
        Ok(())
    }

    async fn record_message(&self, line: &str) -> Result<(), AppError> {
        let message = RawMessage::at(line, self.state.now());
        if let Some(extraction) = self.reports.inspect(&message).await? {
            if let Some(mismatch) = extraction.mismatch {
                println!("{}", zero_sum_notice(&mismatch));
            }
            self.archive.archive(&extraction.record).await;
        }
        self.messages.push(message).await;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mahjong_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting mahjong ledger");

    let messages = Arc::new(InMemoryMessageSource::new());
    let archive = Arc::new(InMemoryResultTable::new());
    let state = AppState::new(
        load_settings()?,
        load_members()?,
        messages.clone(),
        archive.clone(),
    );
    let ledger = Ledger {
        reports: ReportService::new(state.clone()),
        members: MemberService::new(state.clone()),
        state,
        messages,
        archive,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = ledger.handle_line(&line).await {
            error!(error = %e, "Failed to handle line");
            println!("{e}");
        }
    }

    info!("Input closed, shutting down");
    Ok(())
}
