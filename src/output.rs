//! Delimited sample and prediction file writing.
//!
//! One record per line, semicolon-separated, double-quote-delimited fields:
//! `"user";"resource";"timestamp";"tag1,tag2";"cat1,cat2"[;"rating"]`.
//! Tag and category tokens are percent-encoded; embedded double quotes are
//! stripped before quoting. Prediction files replace the category group with
//! the predicted ID vector.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::constants::output::{
    DEFAULT_METRICS_DIR, DEFAULT_OUTPUT_DIR, SAMPLE_EXTENSION, TIMING_SUFFIX,
};
use crate::data::{Interaction, InteractionStore};
use crate::errors::SplitError;
use crate::types::PredictedId;

/// Writes sample, prediction, and timing files under fixed directories.
pub struct SampleWriter {
    output_dir: PathBuf,
    metrics_dir: PathBuf,
}

impl Default for SampleWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl SampleWriter {
    /// Create a writer rooted at `output_dir`, with the default metrics dir.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            metrics_dir: PathBuf::from(DEFAULT_METRICS_DIR),
        }
    }

    /// Override the directory used for timing diagnostics.
    pub fn with_metrics_dir(mut self, metrics_dir: impl Into<PathBuf>) -> Self {
        self.metrics_dir = metrics_dir.into();
        self
    }

    /// Path of the sample file `name` under the output directory.
    pub fn sample_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.{SAMPLE_EXTENSION}"))
    }

    /// Write `records` as one sample file, resolving labels through `store`.
    pub fn write_sample(
        &self,
        store: &InteractionStore,
        records: &[Interaction],
        name: &str,
    ) -> Result<(), SplitError> {
        self.write_lines(name, records.iter().map(|record| {
            let categories = record
                .categories
                .iter()
                .map(|category| store.category_label(*category).map(encode_token))
                .collect::<Result<Vec<_>, _>>()?
                .join(",");
            format_record(store, record, &categories)
        }))
    }

    /// Write tag prediction rows aligned with `records` (the test region).
    pub fn write_tag_predictions(
        &self,
        store: &InteractionStore,
        records: &[Interaction],
        rows: &[Vec<PredictedId>],
        name: &str,
    ) -> Result<(), SplitError> {
        self.write_predictions(store, records, rows, name, |store, id| {
            store.tag_label(id).map(encode_token)
        })
    }

    /// Write resource prediction rows aligned with `records`.
    pub fn write_resource_predictions(
        &self,
        store: &InteractionStore,
        records: &[Interaction],
        rows: &[Vec<PredictedId>],
        name: &str,
    ) -> Result<(), SplitError> {
        self.write_predictions(store, records, rows, name, |store, id| {
            store.resource_label(id).map(encode_token)
        })
    }

    /// Write a timing diagnostics file `<name>_TIME` under the metrics dir.
    pub fn write_timings(&self, name: &str, text: &str) -> Result<(), SplitError> {
        fs::create_dir_all(&self.metrics_dir)?;
        let path = self
            .metrics_dir
            .join(format!("{name}{TIMING_SUFFIX}.{SAMPLE_EXTENSION}"));
        fs::write(path, text)?;
        Ok(())
    }

    fn write_predictions<F>(
        &self,
        store: &InteractionStore,
        records: &[Interaction],
        rows: &[Vec<PredictedId>],
        name: &str,
        label: F,
    ) -> Result<(), SplitError>
    where
        F: Fn(&InteractionStore, usize) -> Result<String, SplitError>,
    {
        self.write_lines(name, records.iter().zip(rows).map(|(record, row)| {
            let predicted = row
                .iter()
                .map(|id| {
                    if *id < 0 {
                        Ok(id.to_string())
                    } else {
                        label(store, *id as usize)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
                .join(",");
            format_record(store, record, &predicted)
        }))
    }

    fn write_lines(
        &self,
        name: &str,
        lines: impl Iterator<Item = Result<String, SplitError>>,
    ) -> Result<(), SplitError> {
        fs::create_dir_all(&self.output_dir)?;
        let file = File::create(self.sample_path(name))?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{}", line?)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn format_record(
    store: &InteractionStore,
    record: &Interaction,
    third_group: &str,
) -> Result<String, SplitError> {
    let user = strip_quotes(store.user_label(record.user)?);
    let resource = strip_quotes(store.resource_label(record.resource)?);
    let timestamp = strip_quotes(&record.timestamp);
    let tags = record
        .tags
        .iter()
        .map(|tag| store.tag_label(*tag).map(encode_token))
        .collect::<Result<Vec<_>, _>>()?
        .join(",");
    let mut line = format!("\"{user}\";\"{resource}\";\"{timestamp}\";\"{tags}\";\"{third_group}\"");
    if record.has_rating() {
        line.push_str(&format!(";\"{}\"", record.rating));
    }
    Ok(line)
}

fn strip_quotes(value: &str) -> String {
    value.replace('"', "")
}

fn encode_token(label: &str) -> String {
    utf8_percent_encode(&strip_quotes(label), NON_ALPHANUMERIC).to_string()
}

/// Read back a sample file written by [`SampleWriter`].
pub fn read_lines(path: &Path) -> Result<Vec<String>, SplitError> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_store() -> InteractionStore {
        let interactions = vec![
            Interaction::new(0, 0, vec![0, 1], "2011-01-01 10:00:00", 4.0, vec![0]),
            Interaction::unrated(1, 1, vec![1], "2011-01-02 11:30:00"),
        ];
        InteractionStore::with_dictionaries(
            interactions,
            vec!["alice".into(), "bob \"the\" builder".into()],
            vec!["Rust (book)".into(), "intro page".into()],
            vec!["systems lang".into(), "tutorial".into()],
            vec!["programming".into()],
        )
    }

    #[test]
    fn sample_lines_follow_the_wire_format() {
        let dir = tempdir().unwrap();
        let writer = SampleWriter::new(dir.path());
        let store = sample_store();
        writer.write_sample(&store, store.data(), "sample").unwrap();
        let lines = read_lines(&writer.sample_path("sample")).unwrap();
        assert_eq!(
            lines[0],
            "\"alice\";\"Rust (book)\";\"2011-01-01 10:00:00\";\"systems%20lang,tutorial\";\"programming\";\"4\""
        );
        // No rating on the second record, so the trailing field is absent.
        assert_eq!(
            lines[1],
            "\"bob the builder\";\"intro page\";\"2011-01-02 11:30:00\";\"tutorial\";\"\""
        );
    }

    #[test]
    fn prediction_rows_replace_the_category_group() {
        let dir = tempdir().unwrap();
        let writer = SampleWriter::new(dir.path());
        let store = sample_store();
        let rows = vec![vec![1, 0, -1], vec![0, -1, -1]];
        writer
            .write_tag_predictions(&store, store.data(), &rows, "pred")
            .unwrap();
        let lines = read_lines(&writer.sample_path("pred")).unwrap();
        assert!(lines[0].contains("\"tutorial,systems%20lang,-1\""));
        assert!(lines[1].contains("\"systems%20lang,-1,-1\""));
    }

    #[test]
    fn timing_files_land_in_the_metrics_dir() {
        let dir = tempdir().unwrap();
        let writer = SampleWriter::new(dir.path().join("csv"))
            .with_metrics_dir(dir.path().join("metrics"));
        writer.write_timings("sample_mp", "Full training time: 1\n").unwrap();
        let path = dir.path().join("metrics").join("sample_mp_TIME.txt");
        assert!(path.is_file());
    }
}
