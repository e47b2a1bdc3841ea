use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::{instrument, warn};

use super::registry::{AliasRemoval, MemberSection, RegistryError, RegistryLimits};
use crate::report::Report;
use crate::shared::AppState;

/// Sub-commands of the member command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MemberAction {
    List,
    Add,
    Remove,
}

impl MemberAction {
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            MemberAction::List => &["一覧", "list"],
            MemberAction::Add => &["追加", "add"],
            MemberAction::Remove => &["削除", "del"],
        }
    }

    pub fn from_token(token: &str) -> Option<MemberAction> {
        let lowered = token.to_lowercase();
        MemberAction::iter().find(|action| action.tokens().contains(&lowered.as_str()))
    }
}

/// Lists and edits the player registry held in [`AppState`].
#[derive(Clone)]
pub struct MemberService {
    state: AppState,
}

impl MemberService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Runs a member command. The first argument picks the action; without
    /// one the registry is listed.
    #[instrument(skip(self))]
    pub async fn handle(&self, args: &[&str]) -> Report {
        let (action, rest) = match args.split_first() {
            Some((first, rest)) => match MemberAction::from_token(first) {
                Some(action) => (action, rest),
                None => return Report::new("メンバー管理", usage()),
            },
            None => (MemberAction::List, args),
        };

        let body = match action {
            MemberAction::List => self.list().await,
            MemberAction::Add => self.add(rest).await,
            MemberAction::Remove => self.remove(rest).await,
        };
        Report::new("メンバー管理", body)
    }

    pub async fn list(&self) -> String {
        let registry = self.state.registry().await;
        if registry.is_empty() {
            return "登録されているメンバーはいません。\n".to_string();
        }
        registry
            .players()
            .iter()
            .map(|player| {
                let aliases: Vec<&str> = player
                    .aliases
                    .iter()
                    .filter(|alias| **alias != player.name)
                    .map(String::as_str)
                    .collect();
                if aliases.is_empty() {
                    format!("{}\n", player.name)
                } else {
                    format!("{} ({})\n", player.name, aliases.join(", "))
                }
            })
            .collect()
    }

    /// `[name]` registers a player, `[name, alias]` adds an alias.
    pub async fn add(&self, args: &[&str]) -> String {
        let settings = self.state.settings().await;
        let limits = RegistryLimits::from_settings(&settings.member);

        let outcome = match args {
            [name] => self
                .state
                .update_registry(|registry| registry.add_player(name, &limits))
                .await
                .map(|name| format!("「{name}」を登録しました。\n")),
            [name, alias] => self
                .state
                .update_registry(|registry| registry.add_alias(name, alias, &limits))
                .await
                .map(|(name, alias)| format!("「{name}」に「{alias}」を追加しました。\n")),
            _ => return usage(),
        };
        outcome.unwrap_or_else(|e| rejection(args, e))
    }

    /// `[name]` removes a player, `[name, alias]` removes one alias.
    pub async fn remove(&self, args: &[&str]) -> String {
        let outcome = match args {
            [name] => self
                .state
                .update_registry(|registry| registry.remove_player(name))
                .await
                .map(|player| format!("「{}」を削除しました。\n", player.name)),
            [name, alias] => self
                .state
                .update_registry(|registry| registry.remove_alias(name, alias))
                .await
                .map(|removal| match removal {
                    AliasRemoval::AliasRemoved => {
                        format!("「{name}」から「{alias}」を削除しました。\n")
                    }
                    AliasRemoval::PlayerRemoved => format!("「{name}」を削除しました。\n"),
                }),
            _ => return usage(),
        };
        outcome.unwrap_or_else(|e| rejection(args, e))
    }

    /// Current registry in its persisted form.
    pub async fn sections(&self) -> Vec<MemberSection> {
        self.state.registry().await.to_sections()
    }
}

fn rejection(args: &[&str], error: RegistryError) -> String {
    warn!(?args, error = %error, "Rejected member change");
    format!("{error}\n")
}

fn usage() -> String {
    "使い方：一覧 / 追加 <名前> [別名] / 削除 <名前> [別名]\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use rstest::rstest;

    #[rstest]
    #[case("一覧", Some(MemberAction::List))]
    #[case("ADD", Some(MemberAction::Add))]
    #[case("削除", Some(MemberAction::Remove))]
    #[case("たろう", None)]
    fn parses_actions(#[case] token: &str, #[case] expected: Option<MemberAction>) {
        assert_eq!(MemberAction::from_token(token), expected);
    }

    #[tokio::test]
    async fn add_list_and_remove() {
        let service = MemberService::new(AppStateBuilder::new().build());

        let added = service.handle(&["追加", "たろう"]).await;
        assert_eq!(added.body, "「たろう」を登録しました。\n");
        service.handle(&["追加", "たろう", "タロ"]).await;

        let listed = service.handle(&[]).await;
        assert_eq!(listed.body, "たろう (タロ)\n");

        let removed = service.handle(&["削除", "たろう", "タロ"]).await;
        assert_eq!(removed.body, "「たろう」から「タロ」を削除しました。\n");
        assert_eq!(
            service.sections().await,
            vec![MemberSection {
                name: "たろう".into(),
                alias: "たろう".into()
            }]
        );
    }

    #[tokio::test]
    async fn rejections_keep_registry_and_explain() {
        let service = MemberService::new(AppStateBuilder::new().build());
        service.add(&["たろう"]).await;

        let duplicate = service.add(&["たろう"]).await;
        assert_eq!(duplicate, "「たろう」はすでに登録されています。\n");

        let guest = service.add(&["ゲスト"]).await;
        assert!(guest.contains("命名規則に違反"));

        let missing = service.remove(&["じろう"]).await;
        assert_eq!(missing, "「じろう」は登録されていません。\n");

        assert_eq!(service.sections().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_action_prints_usage() {
        let service = MemberService::new(AppStateBuilder::new().build());
        let report = service.handle(&["変更"]).await;
        assert!(report.body.starts_with("使い方"));
    }
}
