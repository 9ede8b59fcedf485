//! Demonstration files.
//!
//! A demonstration is a recording of expert experiences together with the
//! [`BehaviorSpec`] they were recorded with. Files with the extension `json`
//! are (de)serialized with serde_json; any other file is read and written
//! with bincode.
use crate::{behavior::BehaviorSpec, buffer::AgentBuffer, error::GailError};
use anyhow::{Context, Result};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// Extensions of files picked up when a demonstration directory is given.
const DEMO_EXTENSIONS: [&str; 2] = ["demo", "json"];

/// Expert experiences and the behavior they were recorded with.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Demonstration {
    /// Specification of the recorded behavior.
    pub behavior_spec: BehaviorSpec,

    /// Recorded experiences.
    pub buffer: AgentBuffer,
}

impl Demonstration {
    /// Constructs a demonstration.
    pub fn new(behavior_spec: BehaviorSpec, buffer: AgentBuffer) -> Self {
        Self {
            behavior_spec,
            buffer,
        }
    }

    /// Reads a demonstration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rdr = BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        );
        let demo: Self = if is_json(path) {
            serde_json::from_reader(rdr)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            bincode::deserialize_from(rdr)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };
        demo.buffer.validate()?;
        info!(
            "Load demonstration of {} experiences from {}",
            demo.buffer.num_experiences(),
            path.display()
        );
        Ok(demo)
    }

    /// Writes the demonstration into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let wtr = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        if is_json(path) {
            serde_json::to_writer(wtr, self)?;
        } else {
            bincode::serialize_into(wtr, self)?;
        }
        info!("Save demonstration into {}", path.display());
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

/// Lists demonstration files.
///
/// If `path` is a file, it is returned as is. If it is a directory, the files in
/// it with extension `demo` or `json` are returned sorted by name.
pub fn demo_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(GailError::Demo(format!("{} does not exist", path.display())).into());
    }

    let mut files = vec![];
    for entry in fs::read_dir(path)? {
        let file = entry?.path();
        let is_demo = file.is_file()
            && file
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| DEMO_EXTENSIONS.contains(&ext));
        if is_demo {
            trace!("Found demonstration file {}", file.display());
            files.push(file);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(GailError::Demo(format!(
            "no demonstration file in {}",
            path.display()
        ))
        .into());
    }
    Ok(files)
}

/// Loads demonstrations into a single buffer.
///
/// `path` is a demonstration file or a directory of them. Every demonstration
/// must have been recorded with `spec`, and the concatenated buffer must hold at
/// least one experience.
pub fn demo_to_buffer(path: impl AsRef<Path>, spec: &BehaviorSpec) -> Result<AgentBuffer> {
    let mut buffer = AgentBuffer::new();
    for file in demo_files(&path)? {
        let demo = Demonstration::load(&file)?;
        if &demo.behavior_spec != spec {
            return Err(GailError::Demo(format!(
                "behavior of {} is {:?}, expected {:?}",
                file.display(),
                demo.behavior_spec,
                spec
            ))
            .into());
        }
        buffer.extend(&demo.buffer)?;
    }

    if buffer.is_empty() {
        return Err(GailError::Demo(format!(
            "no experience in {}",
            path.as_ref().display()
        ))
        .into());
    }
    buffer.check_spec(spec, true)?;
    info!(
        "Demonstration buffer has {} experiences",
        buffer.num_experiences()
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        behavior::ActionSpec,
        buffer::{Column, VECTOR_OBS},
    };
    use tempdir::TempDir;

    fn demo(n: usize, value: f32) -> Demonstration {
        let spec = BehaviorSpec::new(vec![vec![3]], ActionSpec::Continuous(2));
        let mut buffer = AgentBuffer::zeros(&spec, n);
        buffer
            .insert(VECTOR_OBS, Column::new(vec![3], vec![value; 3 * n]).unwrap())
            .unwrap();
        Demonstration::new(spec, buffer)
    }

    #[test]
    fn test_save_load_formats() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = TempDir::new("gail_demo")?;
        let demo = demo(4, 1.5);

        for name in ["expert.json", "expert.demo"] {
            let path = dir.path().join(name);
            demo.save(&path)?;
            assert_eq!(Demonstration::load(&path)?, demo);
        }
        Ok(())
    }

    #[test]
    fn test_directory_concatenates_sorted_files() -> Result<()> {
        let dir = TempDir::new("gail_demo_dir")?;
        demo(2, 2.0).save(dir.path().join("b.demo"))?;
        demo(3, 1.0).save(dir.path().join("a.json"))?;
        fs::write(dir.path().join("notes.txt"), "not a demonstration")?;

        let spec = demo(0, 0.0).behavior_spec;
        let buffer = demo_to_buffer(dir.path(), &spec)?;
        let obs = buffer.get(VECTOR_OBS)?;

        assert_eq!(buffer.num_experiences(), 5);
        assert_eq!(obs.row(0), &[1.0; 3]);
        assert_eq!(obs.row(4), &[2.0; 3]);
        Ok(())
    }

    #[test]
    fn test_behavior_mismatch() -> Result<()> {
        let dir = TempDir::new("gail_demo_mismatch")?;
        let path = dir.path().join("expert.json");
        demo(2, 0.0).save(&path)?;

        let spec = BehaviorSpec::new(vec![vec![3]], ActionSpec::Discrete(vec![2, 2]));
        let err = demo_to_buffer(&path, &spec).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GailError>(),
            Some(GailError::Demo(_))
        ));
        Ok(())
    }

    #[test]
    fn test_malformed_columns() -> Result<()> {
        let dir = TempDir::new("gail_demo_malformed")?;
        let spec = r#"{"observation_shapes":[[3]],"action_spec":{"Continuous":2}}"#;
        let done = r#""done":{"shape":[1],"data":[0,0]}"#;
        let cases = [
            (
                "ragged.json",
                r#""actions":{"shape":[2],"data":[0,0,0,0]},"vector_obs":{"shape":[3],"data":[0,0,0,0,0,0,0]}"#,
                "Shape mismatch",
            ),
            (
                "no_action.json",
                r#""actions":{"shape":[0],"data":[]},"vector_obs":{"shape":[3],"data":[0,0,0,0,0,0]}"#,
                "no elements",
            ),
        ];

        for (name, columns, message) in cases {
            let path = dir.path().join(name);
            let json = format!(
                r#"{{"behavior_spec":{},"buffer":{{"columns":{{{},{}}}}}}}"#,
                spec, columns, done
            );
            fs::write(&path, json)?;

            let err = Demonstration::load(&path).unwrap_err();
            assert!(format!("{:#}", err).contains(message), "{:#}", err);
        }
        Ok(())
    }

    #[test]
    fn test_empty_inputs() -> Result<()> {
        let dir = TempDir::new("gail_demo_empty")?;
        assert!(demo_files(dir.path()).is_err());
        assert!(demo_files(dir.path().join("missing.demo")).is_err());

        let path = dir.path().join("empty.json");
        demo(0, 0.0).save(&path)?;
        assert!(demo_to_buffer(&path, &demo(0, 0.0).behavior_spec).is_err());
        Ok(())
    }
}
