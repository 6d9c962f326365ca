use crate::error::ReshapeResult;
use crate::relational::types::TableCollection;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes tables to JSON Lines files, one `{table}.jsonl` per table name
pub struct TableWriter {
    output_dir: PathBuf,
    writers: HashMap<String, BufWriter<File>>,
}

impl TableWriter {
    /// Create a writer appending to files in `output_dir`, creating it if needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> ReshapeResult<Self> {
        std::fs::create_dir_all(&output_dir)?;

        Ok(TableWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
            writers: HashMap::new(),
        })
    }

    /// Append every row of every table to its file
    pub fn write_tables(&mut self, tables: &TableCollection) -> ReshapeResult<()> {
        for table in tables.iter() {
            if !self.writers.contains_key(&table.name) {
                let path = self.output_dir.join(format!("{}.jsonl", table.name));
                debug!(table = %table.name, path = %path.display(), "opening table file");
                let file = OpenOptions::new().create(true).append(true).open(&path)?;
                self.writers.insert(table.name.clone(), BufWriter::new(file));
            }

            if let Some(writer) = self.writers.get_mut(&table.name) {
                for row in &table.rows {
                    serde_json::to_writer(&mut *writer, row)?;
                    writer.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }

    /// Flush all writers
    pub fn flush(&mut self) -> ReshapeResult<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Writes the rows of all tables into one stream, tagging each with `_table`
pub struct SingleWriter<W: Write> {
    writer: W,
}

impl<W: Write> SingleWriter<W> {
    pub fn new(writer: W) -> Self {
        SingleWriter { writer }
    }

    pub fn write_tables(&mut self, tables: &TableCollection) -> ReshapeResult<()> {
        for table in tables.iter() {
            for row in &table.rows {
                let mut data = row.clone();
                data.insert("_table".to_string(), Value::String(table.name.clone()));
                serde_json::to_writer(&mut self.writer, &data)?;
                self.writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> ReshapeResult<()> {
        Ok(self.writer.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relational::{RelationalizeConfig, Relationalizer};
    use serde_json::json;

    fn sample_tables() -> TableCollection {
        Relationalizer::new(RelationalizeConfig::default())
            .relationalize(json!({"name": "Alice", "tags": ["a", "b"]}))
    }

    #[test]
    fn test_single_writer() {
        let mut writer = SingleWriter::new(Vec::new());
        writer.write_tables(&sample_tables()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Alice"));
        assert!(lines[0].contains(r#""_table":"root""#));
        assert!(lines[2].contains(r#""_table":"root_tags""#));
    }

    #[test]
    fn test_table_writer_appends_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = TableWriter::new(dir.path()).unwrap();

        writer.write_tables(&sample_tables()).unwrap();
        writer.write_tables(&sample_tables()).unwrap();
        writer.flush().unwrap();

        let root = std::fs::read_to_string(dir.path().join("root.jsonl")).unwrap();
        assert_eq!(root.lines().count(), 2);

        let tags = std::fs::read_to_string(dir.path().join("root_tags.jsonl")).unwrap();
        assert_eq!(tags.lines().count(), 4);
        assert!(tags.lines().next().unwrap().contains(r#""tags.val":"a""#));
    }
}
