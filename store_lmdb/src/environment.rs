//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::station::LmdbStationStore;
use crate::LmdbError;

const MAX_DBS: u32 = 4;
const STATIONS_DB: &str = "stations";
const HISTORY_DB: &str = "price_history";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
    pub(crate) stations_db: Database<Str, Bytes>,
    pub(crate) history_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process and per path;
        // the engine never opens the same directory twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let stations_db = env.create_database::<Str, Bytes>(&mut wtxn, Some(STATIONS_DB))?;
        let history_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some(HISTORY_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            stations_db,
            history_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A store handle sharing this environment.
    pub fn station_store(&self) -> LmdbStationStore {
        LmdbStationStore {
            env: Arc::clone(&self.env),
            stations_db: self.stations_db,
            history_db: self.history_db,
        }
    }
}
