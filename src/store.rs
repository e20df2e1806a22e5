//! Persisted form of a [`FriendGraph`] and the on-disk formats it is written
//! in.
//!
//! A graph is saved as two JSON objects mapping a username to a list of
//! usernames: friend lists in [`Config::friends_path`] and pending requests,
//! keyed by receiver, in [`Config::pending_path`]. The same tables can also
//! be written in a flat line format, one `owner,name,name,...` record per
//! line.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::friend_graph::{FriendGraph, RestoreReport};

/// Username to a list of usernames.
pub type Table = BTreeMap<String, Vec<String>>;

/// Friend lists and pending requests, detached from any graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    /// Every user's friends.
    pub friends: Table,
    /// Receiver to the senders of requests waiting on it.
    pub pending: Table,
}

/// Writes `snapshot` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// [`GraphError::Io`] or [`GraphError::Json`].
pub fn save_json(path: &Path, snapshot: &GraphSnapshot) -> Result<()> {
    write_json(path, snapshot)
}

/// Reads a snapshot written by [`save_json`]. A missing file reads as an
/// empty snapshot.
///
/// # Errors
///
/// [`GraphError::Io`] or [`GraphError::Json`].
pub fn load_json(path: &Path) -> Result<GraphSnapshot> {
    Ok(read_json(path)?.unwrap_or_default())
}

/// Writes `table` in the line format.
///
/// # Errors
///
/// [`GraphError::Io`] if the writer fails.
pub fn write_csv<W: Write>(mut writer: W, table: &Table) -> Result<()> {
    for (owner, names) in table {
        write!(writer, "{owner}")?;
        for name in names {
            write!(writer, ",{name}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a table in the line format. Blank lines and empty names are
/// ignored; repeated owners are merged.
///
/// # Errors
///
/// [`GraphError::Corrupt`] for a record without an owner, [`GraphError::Io`]
/// if the reader fails.
pub fn read_csv<R: BufRead>(reader: R) -> Result<Table> {
    let mut table = Table::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);
        let owner = match fields.next() {
            Some(owner) if !owner.is_empty() => owner,
            _ => {
                return Err(GraphError::Corrupt {
                    line: index + 1,
                    reason: "record has no owner",
                });
            }
        };
        table
            .entry(owner.to_owned())
            .or_default()
            .extend(fields.filter(|name| !name.is_empty()).map(str::to_owned));
    }
    Ok(table)
}

/// Saves `graph` to the paths named by `config`.
///
/// # Errors
///
/// [`GraphError::Io`] or [`GraphError::Json`].
pub fn save_graph(config: &Config, graph: &FriendGraph) -> Result<()> {
    let snapshot = graph.snapshot();
    write_json(&config.friends_path(), &snapshot.friends)?;
    write_json(&config.pending_path(), &snapshot.pending)?;
    info!(
        dir = %config.data_dir.display(),
        users = snapshot.friends.len(),
        "saved friend graph"
    );
    Ok(())
}

/// Loads the files named by `config` into `graph`, whose users must already
/// be registered. Missing files load as empty tables.
///
/// # Errors
///
/// [`GraphError::Io`] or [`GraphError::Json`].
pub fn load_graph(config: &Config, graph: &mut FriendGraph) -> Result<RestoreReport> {
    let snapshot = GraphSnapshot {
        friends: read_json(&config.friends_path())?.unwrap_or_default(),
        pending: read_json(&config.pending_path())?.unwrap_or_default(),
    };
    Ok(graph.restore(&snapshot))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "file not found, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_reader(BufReader::new(file))?))
}
