//! Per-type command registry.
//!
//! Maps each concrete instrument type, by its `TypeId`, to the immutable
//! command map compiled from its declaration table. Discovery runs exactly
//! once per type for the lifetime of the process; nothing is ever evicted.
//!
//! Build-or-wait protocol: the first thread to see a type claims it under
//! the write lock by inserting a building marker, releases the lock, runs
//! discovery, then publishes the finished map under the write lock. Any
//! thread that finds the building marker polls under the read lock with a
//! fixed sleep between polls: discovery can take hundreds of milliseconds,
//! so sleeping beats spinning. Every caller ends up holding the same
//! published `Arc`.

use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use crate::command::CommandSpec;
use crate::config::settings;
use crate::dispatch;
use crate::error::RegistrationError;
use crate::metadata::CommandMap;

/// `None` marks a type whose discovery is in progress.
type TypeMap = HashMap<TypeId, Option<Arc<CommandMap>>>;

static TYPE_MAP: Lazy<RwLock<TypeMap>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Shared map for every type that declares no commands.
static EMPTY_MAP: Lazy<Arc<CommandMap>> = Lazy::new(|| Arc::new(CommandMap::new()));

/// Return the committed command map for a type, building it on first use.
///
/// `type_name` is used only in diagnostics; `table` is invoked at most once
/// per process, by whichever caller wins the claim.
pub fn commands_for(
    type_id: TypeId,
    type_name: &str,
    table: impl FnOnce() -> Vec<CommandSpec>,
) -> Arc<CommandMap> {
    {
        let mut map = TYPE_MAP.write().unwrap_or_else(PoisonError::into_inner);
        match map.get(&type_id) {
            Some(Some(ready)) => return ready.clone(),
            Some(None) => {
                drop(map);
                return wait_for_publication(type_id);
            }
            None => {
                map.insert(type_id, None);
            }
        }
    }

    let built = build_map(type_name, table());

    let mut map = TYPE_MAP.write().unwrap_or_else(PoisonError::into_inner);
    map.insert(type_id, Some(built.clone()));
    built
}

fn wait_for_publication(type_id: TypeId) -> Arc<CommandMap> {
    let poll = Duration::from_millis(settings().registry.poll_interval_ms);
    loop {
        {
            let map = TYPE_MAP.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(Some(ready)) = map.get(&type_id) {
                return ready.clone();
            }
        }
        thread::sleep(poll);
    }
}

fn build_map(type_name: &str, specs: Vec<CommandSpec>) -> Arc<CommandMap> {
    let mut commands = CommandMap::new();
    for spec in &specs {
        match dispatch::compile(type_name, spec) {
            Ok(definition) => {
                if commands.contains_key(definition.name()) {
                    let err = RegistrationError::DuplicateCommand {
                        instrument: type_name.to_string(),
                        command: definition.name().to_string(),
                    };
                    log::error!("{err}");
                } else {
                    commands.insert(definition.name().to_string(), definition);
                }
            }
            Err(err) => {
                log::error!(
                    "skipping command {} on {type_name}: {err}",
                    spec.effective_name()
                );
            }
        }
    }

    if commands.is_empty() {
        EMPTY_MAP.clone()
    } else {
        Arc::new(commands)
    }
}
