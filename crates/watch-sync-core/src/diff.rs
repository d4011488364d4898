use serde::Serialize;
use std::collections::{HashMap, HashSet};
use watch_sync_models::{User, WatchedItem};

/// A user name present on both servers, with each server's own id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonUser {
    pub name: String,
    pub source_id: String,
    pub destination_id: String,
}

impl CommonUser {
    pub fn new(name: impl Into<String>, source_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_id: source_id.into(),
            destination_id: destination_id.into(),
        }
    }
}

// Names are unique per server; should a listing repeat one, the last id wins
fn ids_by_name(users: &[User]) -> HashMap<&str, &str> {
    users.iter().map(|u| (u.name.as_str(), u.id.as_str())).collect()
}

/// Users matched by exact, case-sensitive name, in source order
pub fn common_users(source: &[User], destination: &[User]) -> Vec<CommonUser> {
    let destination_ids = ids_by_name(destination);
    let source_ids = ids_by_name(source);
    let mut seen = HashSet::new();

    source
        .iter()
        .filter(|u| seen.insert(u.name.as_str()))
        .filter_map(|u| {
            let destination_id = destination_ids.get(u.name.as_str())?;
            let source_id = source_ids.get(u.name.as_str()).copied().unwrap_or(u.id.as_str());
            Some(CommonUser::new(u.name.clone(), source_id, *destination_id))
        })
        .collect()
}

/// Source users whose name does not exist on the destination, in source order
pub fn missing_users<'a>(source: &'a [User], destination: &[User]) -> Vec<&'a User> {
    let destination_names: HashSet<&str> = destination.iter().map(|u| u.name.as_str()).collect();
    let mut seen = HashSet::new();

    source
        .iter()
        .filter(|u| seen.insert(u.name.as_str()))
        .filter(|u| !destination_names.contains(u.name.as_str()))
        .collect()
}

/// Source items whose id is not already played on the destination
///
/// The destination id set is built once; source order is preserved.
pub fn items_to_sync<'a>(source: &'a [WatchedItem], destination: &[WatchedItem]) -> Vec<&'a WatchedItem> {
    let destination_ids: HashSet<&str> = destination.iter().map(|i| i.id.as_str()).collect();
    source
        .iter()
        .filter(|item| !destination_ids.contains(item.id.as_str()))
        .collect()
}
