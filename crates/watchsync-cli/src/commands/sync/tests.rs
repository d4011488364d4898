use super::*;
use crate::commands::prompts::tests::ScriptedChoices;
use crate::output::OutputFormat;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use watch_sync_models::{ItemUserData, User, WatchedItem};
use watch_sync_sources::{CatalogClient, SourceError};

/// Minimal server: users, played items and the marks it received
#[derive(Default)]
struct MemoryServer {
    users: Mutex<Vec<User>>,
    watched: HashMap<String, Vec<WatchedItem>>,
    marked: Mutex<Vec<(String, String)>>,
    trigger_on_create: Option<Interrupt>,
}

impl MemoryServer {
    fn with_users(names: &[(&str, &str)]) -> Self {
        Self {
            users: Mutex::new(names.iter().map(|(id, name)| User::new(*id, *name)).collect()),
            ..Self::default()
        }
    }

    fn watched_by(mut self, user_id: &str, ids: &[&str]) -> Self {
        self.watched
            .insert(user_id.to_string(), ids.iter().map(|id| item(id)).collect());
        self
    }

    fn user_names(&self) -> Vec<String> {
        self.users.lock().unwrap().iter().map(|u| u.name.clone()).collect()
    }

    fn marked(&self) -> Vec<(String, String)> {
        self.marked.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MemoryServer {
    fn server_name(&self) -> &str {
        "memory"
    }

    async fn list_users(&self) -> Result<Vec<User>, SourceError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, name: &str, _has_password: bool) -> Result<String, SourceError> {
        if let Some(interrupt) = &self.trigger_on_create {
            interrupt.trigger();
        }
        let mut users = self.users.lock().unwrap();
        let id = format!("new-{}", users.len());
        users.push(User::new(id.clone(), name));
        Ok(id)
    }

    async fn list_watched_items(&self, user_id: &str) -> Result<Vec<WatchedItem>, SourceError> {
        Ok(self.watched.get(user_id).cloned().unwrap_or_default())
    }

    async fn get_item_user_status(
        &self,
        _user_id: &str,
        _item_id: &str,
    ) -> Result<Option<ItemUserData>, SourceError> {
        Ok(Some(ItemUserData::default()))
    }

    async fn mark_played(
        &self,
        user_id: &str,
        item_id: &str,
        _played_date: Option<DateTime<Utc>>,
    ) -> Result<(), SourceError> {
        self.marked
            .lock()
            .unwrap()
            .push((user_id.to_string(), item_id.to_string()));
        Ok(())
    }

    async fn update_progress(
        &self,
        _user_id: &str,
        _item_id: &str,
        _position_ticks: i64,
        _is_paused: bool,
    ) -> Result<(), SourceError> {
        Ok(())
    }
}

fn item(id: &str) -> WatchedItem {
    WatchedItem {
        id: id.to_string(),
        name: format!("Item {}", id),
        item_type: "Episode".to_string(),
        played: true,
        played_date: None,
        play_count: 1,
        position_ticks: 0,
        runtime_ticks: 0,
    }
}

fn quiet() -> Output {
    Output::new(OutputFormat::Human, true)
}

fn script(user_sync: &[UserSyncChoice], scope: &[SyncScope], user: &[usize]) -> ScriptedChoices {
    ScriptedChoices {
        user_sync: user_sync.iter().copied().collect::<VecDeque<_>>(),
        scope: scope.iter().copied().collect(),
        user: user.iter().copied().collect(),
    }
}

#[tokio::test]
async fn test_creates_missing_users_then_syncs_all() {
    let source = Arc::new(
        MemoryServer::with_users(&[("s1", "alice"), ("s2", "bob")])
            .watched_by("s1", &["a", "b"])
            .watched_by("s2", &["c"]),
    );
    let destination = Arc::new(MemoryServer::with_users(&[("d1", "alice")]));
    let reconciler = Reconciler::new(source.clone(), destination.clone());
    let mut choices = script(&[UserSyncChoice::CreateMissing], &[SyncScope::All], &[]);

    let status = drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .unwrap();

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(destination.user_names(), vec!["alice", "bob"]);
    assert_eq!(
        destination.marked(),
        vec![
            ("d1".to_string(), "a".to_string()),
            ("d1".to_string(), "b".to_string()),
            ("new-1".to_string(), "c".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_skip_user_creation_syncs_one_user() {
    let source = Arc::new(
        MemoryServer::with_users(&[("s1", "alice"), ("s2", "bob"), ("s3", "carol")])
            .watched_by("s1", &["a"])
            .watched_by("s2", &["b"]),
    );
    let destination = Arc::new(MemoryServer::with_users(&[("d1", "alice"), ("d2", "bob")]));
    let reconciler = Reconciler::new(source, destination.clone());
    let mut choices = script(&[UserSyncChoice::Skip], &[SyncScope::One], &[1]);

    let status = drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .unwrap();

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(destination.user_names(), vec!["alice", "bob"]);
    assert_eq!(destination.marked(), vec![("d2".to_string(), "b".to_string())]);
}

#[tokio::test]
async fn test_no_prompt_when_nothing_is_missing() {
    let source = Arc::new(MemoryServer::with_users(&[("s1", "alice")]));
    let destination = Arc::new(MemoryServer::with_users(&[("d1", "alice")]));
    let reconciler = Reconciler::new(source, destination);
    // No user sync answer scripted; being asked would panic
    let mut choices = script(&[], &[SyncScope::All], &[]);

    let status = drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .unwrap();
    assert_eq!(status, RunStatus::Completed);
}

#[tokio::test]
async fn test_no_common_users_fails() {
    let source = Arc::new(MemoryServer::with_users(&[("s1", "alice")]));
    let destination = Arc::new(MemoryServer::with_users(&[("d1", "bob")]));
    let reconciler = Reconciler::new(source, destination.clone());
    let mut choices = script(&[UserSyncChoice::Skip], &[], &[]);

    let status = drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .unwrap();

    assert_eq!(status, RunStatus::NoCommonUsers);
    assert_eq!(status.exit_code(), ExitCode::FAILURE);
    assert!(destination.marked().is_empty());
}

#[tokio::test]
async fn test_out_of_range_user_index_is_an_error() {
    let source = Arc::new(MemoryServer::with_users(&[("s1", "alice")]));
    let destination = Arc::new(MemoryServer::with_users(&[("d1", "alice")]));
    let reconciler = Reconciler::new(source, destination);
    let mut choices = script(&[], &[SyncScope::One], &[4]);

    assert!(drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .is_err());
}

#[tokio::test]
async fn test_interrupted_run_exits_cleanly() {
    let source = Arc::new(MemoryServer::with_users(&[("s1", "alice")]).watched_by("s1", &["a", "b"]));
    let destination = Arc::new(MemoryServer::with_users(&[("d1", "alice")]));
    let interrupt = Interrupt::new();
    interrupt.trigger();
    let reconciler = Reconciler::new(source, destination.clone()).with_interrupt(interrupt);
    let mut choices = script(&[], &[SyncScope::All], &[]);

    let status = drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .unwrap();

    assert_eq!(status, RunStatus::Interrupted);
    assert_eq!(status.exit_code(), ExitCode::SUCCESS);
    assert!(destination.marked().is_empty());
}

#[tokio::test]
async fn test_interrupt_during_user_creation_stops_before_history() {
    let interrupt = Interrupt::new();
    let source = Arc::new(MemoryServer::with_users(&[("s1", "alice"), ("s2", "bob")]));
    let destination = Arc::new(MemoryServer {
        trigger_on_create: Some(interrupt.clone()),
        ..MemoryServer::with_users(&[("d2", "bob")])
    });
    let reconciler = Reconciler::new(source, destination.clone()).with_interrupt(interrupt);
    let mut choices = script(&[UserSyncChoice::CreateMissing], &[SyncScope::One], &[0]);

    let status = drive(&reconciler, &mut choices, &SyncPhase::new(), &quiet())
        .await
        .unwrap();

    assert_eq!(status, RunStatus::Interrupted);
    assert_eq!(destination.user_names(), vec!["bob", "alice"]);
    // Neither the scope nor the user was asked for
    assert_eq!(choices.scope.len(), 1);
    assert_eq!(choices.user.len(), 1);
}

#[test]
fn test_exit_codes() {
    assert_eq!(RunStatus::Completed.exit_code(), ExitCode::SUCCESS);
    assert_eq!(RunStatus::NoCommonUsers.exit_code(), ExitCode::FAILURE);
}
