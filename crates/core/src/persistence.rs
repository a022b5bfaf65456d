// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - PERSISTENCE
//
// A plain append-only file of line-delimited BlockFs JSON records, opened
// for append-read and flushed synchronously after every write. Deliberately
// not the teacher's sled database: sled is a transactional KV store with no
// notion of "close, remove, reopen empty" as a line-log operation, and the
// truncate contract here is exactly that file-log operation. serde_json
// stays, matching every kept teacher crate.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::block::{Block, BlockFs};
use crate::error::StateError;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct Log {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl Log {
    /// Opens `path` for append, creating it if absent. Does not read it —
    /// callers pair this with [`load_and_replay`] at startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StateError::Io(format!("opening block log {}: {e}", path.display())))?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    fn writer_mut(&mut self) -> &mut BufWriter<File> {
        self.writer
            .as_mut()
            .expect("Log writer is only ever None mid-truncate")
    }

    /// Reads every record in file order. Does not mutate the open writer;
    /// callers typically call this once at startup, right after `open`.
    pub fn load_and_replay(&self) -> Result<Vec<BlockFs>, StateError> {
        let file = File::open(&self.path)
            .map_err(|e| StateError::Io(format!("reading block log: {e}")))?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| StateError::Io(format!("reading block log line: {e}")))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: BlockFs = serde_json::from_str(&line)
                .map_err(|e| StateError::Io(format!("malformed block log record: {e}")))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Appends one record and flushes it to disk before returning. A
    /// committed block is not considered durable until this returns `Ok`.
    pub fn append(&mut self, hash: &str, block: &Block) -> Result<(), StateError> {
        let record = BlockFs {
            hash: hash.to_string(),
            block: block.clone(),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| StateError::Io(format!("serializing block record: {e}")))?;
        let writer = self.writer_mut();
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush())
            .map_err(|e| StateError::Io(format!("appending block record: {e}")))
    }

    /// Closes the current handle, removes the file, and reopens an empty
    /// one at the same path. The caller is responsible for resetting the
    /// in-memory balance sheet / mempool / latest block alongside this.
    pub fn truncate(&mut self) -> Result<(), StateError> {
        self.writer_mut()
            .flush()
            .map_err(|e| StateError::Io(format!("flushing before truncate: {e}")))?;
        self.writer = None; // drops the handle, releasing the file
        std::fs::remove_file(&self.path)
            .map_err(|e| StateError::Io(format!("removing block log: {e}")))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StateError::Io(format!("reopening block log: {e}")))?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::zero_block;

    #[test]
    fn append_then_replay_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.log");
        let mut log = Log::open(&path).unwrap();

        let mut b1 = zero_block();
        b1.header.number = 1;
        let h1 = b1.hash();
        log.append(&h1, &b1).unwrap();

        let mut b2 = zero_block();
        b2.header.number = 2;
        b2.header.parent_hash = h1.clone();
        let h2 = b2.hash();
        log.append(&h2, &b2).unwrap();

        let records = log.load_and_replay().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hash, h1);
        assert_eq!(records[1].block.header.parent_hash, h1);
    }

    #[test]
    fn truncate_empties_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.log");
        let mut log = Log::open(&path).unwrap();

        let mut b1 = zero_block();
        b1.header.number = 1;
        let h1 = b1.hash();
        log.append(&h1, &b1).unwrap();
        assert_eq!(log.load_and_replay().unwrap().len(), 1);

        log.truncate().unwrap();
        assert_eq!(log.load_and_replay().unwrap().len(), 0);
    }

    #[test]
    fn blank_lines_are_skipped_on_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.log");
        std::fs::write(&path, "\n\n").unwrap();
        let log = Log::open(&path).unwrap();
        assert_eq!(log.load_and_replay().unwrap().len(), 0);
    }
}
