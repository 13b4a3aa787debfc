//! Save/Load — versioned snapshots of the full game state.
//!
//! Binary saves use bincode for compactness; JSON saves exist for tooling
//! and debugging. Loading merges the save against the current catalogs:
//! ids the content no longer knows are dropped, newly shipped artifacts are
//! seeded in locked, and every derived field (rates, capacity, worker
//! availability) is recomputed so invariants hold before the first tick.
//! The core never touches the filesystem — callers own transport.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalogs;
use crate::engine::external_capacity;
use crate::state::{Artifact, GameState};

use outpost_logic::flow;

/// Version number for the save format (increment when the shape changes).
pub const SAVE_VERSION: u32 = 1;

/// Serializable envelope around the state snapshot.
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub state: GameState,
}

/// Errors that can occur during save/load.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}

/// Write a binary save.
pub fn save_game<W: Write>(writer: W, state: &GameState) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        state: state.clone(),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Read a binary save and rebuild a valid snapshot from it.
pub fn load_game<R: Read>(reader: R, catalogs: &Catalogs) -> Result<GameState, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    restore(save_data, catalogs)
}

/// JSON form of the save, for tooling and inspection.
pub fn save_json(state: &GameState) -> Result<String, SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_string(&save_data)?)
}

pub fn load_json(json: &str, catalogs: &Catalogs) -> Result<GameState, SaveError> {
    let save_data: SaveData = serde_json::from_str(json)?;
    restore(save_data, catalogs)
}

/// Merge a parsed save against the current catalogs and rederive every
/// computed field.
fn restore(save_data: SaveData, catalogs: &Catalogs) -> Result<GameState, SaveError> {
    if save_data.version == 0 || save_data.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut state = save_data.state;

    // Content may have shrunk since the save was written.
    state
        .completed_milestones
        .retain(|id| catalogs.milestone(id).is_some());
    state.researched.retain(|id| catalogs.technology(id).is_some());
    state
        .artifacts
        .retain(|a| catalogs.artifacts.iter().any(|def| def.name == a.name));

    // …or grown: newly shipped artifacts arrive locked.
    for def in &catalogs.artifacts {
        if state.artifact(def.name).is_none() {
            state.artifacts.push(Artifact {
                name: def.name.to_string(),
                stars: 0,
                copies: 0,
                locked: true,
                expedition_tier: def.expedition_tier,
                effects: def.effects.clone(),
            });
        }
    }

    // Rederive everything a tick would recompute, so the loaded snapshot
    // already satisfies the amount/capacity invariants. Saved rate counters
    // are left alone; the next tick overwrites them anyway.
    let modifiers = state.flow_modifiers();
    let extra = external_capacity(&state);
    flow::recompute_capacities(&state.buildings, &mut state.resources, modifiers, &extra);
    state.refresh_available();

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{dispatch, Command};
    use crate::engine::new_game;
    use outpost_logic::buildings::BuildingKind;
    use outpost_logic::resources::ResourceKind;

    fn populated_state() -> GameState {
        let catalogs = Catalogs::standard();
        let state = new_game(&catalogs, 123_456);
        let (state, _) = dispatch(
            &state,
            &catalogs,
            Command::ConstructBuilding {
                kind: BuildingKind::OxygenGenerator,
            },
        );
        let id = state.buildings[0].id;
        let (mut state, _) = dispatch(
            &state,
            &catalogs,
            Command::AssignWorkers {
                building_id: id,
                delta: 2,
            },
        );
        state.resources.get_mut(ResourceKind::Science).amount = 12.345678901234567;
        state
    }

    #[test]
    fn test_binary_roundtrip_is_lossless() {
        let catalogs = Catalogs::standard();
        let state = populated_state();
        let mut buffer = Vec::new();
        save_game(&mut buffer, &state).unwrap();
        let loaded = load_game(buffer.as_slice(), &catalogs).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_json_roundtrip_preserves_f64_exactly() {
        let catalogs = Catalogs::standard();
        let state = populated_state();
        let json = save_json(&state).unwrap();
        let loaded = load_json(&json, &catalogs).unwrap();
        assert_eq!(
            loaded.resources.get(ResourceKind::Science).amount,
            state.resources.get(ResourceKind::Science).amount
        );
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_future_version_is_refused() {
        let catalogs = Catalogs::standard();
        let save_data = SaveData {
            version: SAVE_VERSION + 1,
            state: populated_state(),
        };
        let json = serde_json::to_string(&save_data).unwrap();
        match load_json(&json, &catalogs) {
            Err(SaveError::VersionMismatch { found, .. }) => {
                assert_eq!(found, SAVE_VERSION + 1)
            }
            other => panic!("expected version mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_content_ids_are_dropped() {
        let catalogs = Catalogs::standard();
        let mut state = populated_state();
        state.completed_milestones.insert("retired_milestone".into());
        state.researched.insert("retired_tech".into());

        let json = save_json(&state).unwrap();
        let loaded = load_json(&json, &catalogs).unwrap();
        assert!(!loaded.completed_milestones.contains("retired_milestone"));
        assert!(!loaded.researched.contains("retired_tech"));
    }

    #[test]
    fn test_new_catalog_artifacts_seed_locked() {
        let catalogs = Catalogs::standard();
        let mut state = populated_state();
        state.artifacts.clear();
        let json = save_json(&state).unwrap();
        let loaded = load_json(&json, &catalogs).unwrap();
        assert_eq!(loaded.artifacts.len(), catalogs.artifacts.len());
        assert!(loaded.artifacts.iter().all(|a| a.locked));
    }

    #[test]
    fn test_load_reclamps_amounts_to_capacity() {
        let catalogs = Catalogs::standard();
        let mut state = populated_state();
        // Hand-edited or corrupted saves must not smuggle in an
        // over-capacity pool.
        state.resources.get_mut(ResourceKind::Metals).amount = 1e9;
        let json = save_json(&state).unwrap();
        let loaded = load_json(&json, &catalogs).unwrap();
        let pool = loaded.resources.get(ResourceKind::Metals);
        assert!(pool.amount <= pool.capacity);
    }
}
