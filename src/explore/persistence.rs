use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;

use super::config::ExploreConfig;
use super::graph::Vertex;

/// Well-known key for the single destination record.
const POSITION_KEY: &str = "last_position";

/// Cross-session storage of the hero's last resolved destination. One string
/// record, format `"{session}/{x}/{y}/{z}"`; the z segment is fixed at 0 by
/// the record contract even though navigation vertices are 2-D.
#[derive(Resource, Debug, Clone)]
pub struct PositionStore {
    root: PathBuf,
    session: String,
}

impl PositionStore {
    pub fn new(root: impl Into<PathBuf>, session: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            session: session.into(),
        }
    }

    fn record_path(&self) -> PathBuf {
        self.root.join(POSITION_KEY)
    }

    /// Overwrite the stored destination for this session. Storage failures
    /// are logged and tolerated; navigation does not depend on them.
    pub fn store(&self, vertex: Vertex) {
        let record = format!("{}/{}/{}/0", self.session, vertex.x, vertex.y);
        if let Err(err) = fs::create_dir_all(&self.root) {
            warn!("Could not create save directory {:?}: {err}", self.root);
            return;
        }
        if let Err(err) = fs::write(self.record_path(), &record) {
            warn!("Could not persist position record: {err}");
        }
    }

    /// Last stored destination, if a record exists for this session. A
    /// record from another session reads as absent, not as corrupt.
    pub fn load(&self) -> Option<Vertex> {
        let raw = fs::read_to_string(self.record_path()).ok()?;
        decode(raw.trim(), &self.session)
    }
}

/// Split the record from the right so an opaque session id may itself
/// contain `/`.
fn decode(record: &str, session: &str) -> Option<Vertex> {
    let mut parts = record.rsplitn(4, '/');
    let z = parts.next()?;
    let y = parts.next()?;
    let x = parts.next()?;
    let stored_session = parts.next()?;

    if stored_session != session {
        debug!("Stored position belongs to session {stored_session:?}, ignoring");
        return None;
    }

    let _z: i32 = z.parse().ok()?;
    match (x.parse(), y.parse()) {
        (Ok(x), Ok(y)) => Some(Vertex::new(x, y)),
        _ => {
            warn!("Malformed position record {record:?}");
            None
        }
    }
}

pub fn setup_position_store(mut commands: Commands, config: Res<ExploreConfig>) {
    commands.insert_resource(PositionStore::new(&config.save_dir, &config.session_id));
}
