//! Shared fixtures for the CLI end-to-end tests.

use std::fs;
use std::path::{Path, PathBuf};

pub struct Fixture {
    pub dirs: PathBuf,
    pub files: PathBuf,
    pub observations: PathBuf,
    pub runs: PathBuf,
}

/// Tree `. -> a -> a/b`, file f1 in `a` (loc 10), file f2 in `a/b`
/// (loc 20), plus a registry with one scc run and one layout run sharing a
/// collection.
pub fn two_level(dir: &Path) -> Fixture {
    let fixture = Fixture {
        dirs: dir.join("dirs.jsonl"),
        files: dir.join("files.jsonl"),
        observations: dir.join("observations.jsonl"),
        runs: dir.join("runs.jsonl"),
    };

    fs::write(
        &fixture.dirs,
        concat!(
            r#"{"dir_id":"root","path":".","parent_id":null,"depth":0}"#,
            "\n",
            r#"{"dir_id":"a","path":"a","parent_id":"root","depth":1}"#,
            "\n",
            r#"{"dir_id":"ab","path":"a/b","parent_id":"a","depth":2}"#,
            "\n",
        ),
    )
    .unwrap();

    fs::write(
        &fixture.files,
        concat!(
            r#"{"file_id":"f1","dir_id":"a","path":"a/one.rs"}"#,
            "\n",
            r#"{"file_id":"f2","dir_id":"ab","path":"a/b/two.rs"}"#,
            "\n",
        ),
    )
    .unwrap();

    fs::write(
        &fixture.observations,
        concat!(
            r#"{"run_id":"r-scc","producer":"scc","file_id":"f1","metric":"loc","value":10.0,"seq":1}"#,
            "\n",
            r#"{"run_id":"r-scc","producer":"scc","file_id":"f2","metric":"loc","value":20.0,"seq":2}"#,
            "\n",
        ),
    )
    .unwrap();

    fs::write(
        &fixture.runs,
        concat!(
            r#"{"run_id":"r-scc","producer":"scc","collection_id":"col-1"}"#,
            "\n",
            r#"{"run_id":"r-layout","producer":"layout-scanner","collection_id":"col-1"}"#,
            "\n",
        ),
    )
    .unwrap();

    fixture
}

/// Append one more observation line to the fixture.
pub fn push_observation(fixture: &Fixture, line: &str) {
    let mut content = fs::read_to_string(&fixture.observations).unwrap();
    content.push_str(line);
    content.push('\n');
    fs::write(&fixture.observations, content).unwrap();
}

/// Append one more registry line to the fixture.
pub fn push_run(fixture: &Fixture, line: &str) {
    let mut content = fs::read_to_string(&fixture.runs).unwrap();
    content.push_str(line);
    content.push('\n');
    fs::write(&fixture.runs, content).unwrap();
}
