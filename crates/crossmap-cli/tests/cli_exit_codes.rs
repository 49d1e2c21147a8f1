//! Integration tests: run the `crossmap` binary and check output and exit codes.
//!
//! Exit codes: 0 success, 1 I/O, 2 configuration, 3 trainer process, 4 format.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SEP: char = '\u{1}';

fn crossmap(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crossmap"))
        .args(args)
        .current_dir(workdir)
        .env_remove("CROSSMAP_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run crossmap binary")
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("terminated by signal")
}

/// Two tweets, two words, `tw` edges and one `ww` edge.
fn write_graph(dir: &Path) -> (PathBuf, PathBuf) {
    let nodes = dir.join("graph_nodes.txt");
    let edges = dir.join("graph_edges.tsv");
    fs::write(
        &nodes,
        format!(
            "0{s}t{s}0{s}sunny day at the beach\n\
             1{s}t{s}1{s}shopping at the mall\n\
             2{s}w{s}0{s}beach\n\
             3{s}w{s}1{s}mall\n",
            s = SEP
        ),
    )
    .unwrap();
    fs::write(&edges, "tw\t0\t2\t5\ntw\t1\t3\t3\nww\t2\t3\t0.5\n").unwrap();
    (nodes, edges)
}

fn write_query_files(dir: &Path, embeddings: &str) {
    fs::write(
        dir.join("node_dict.txt"),
        format!(
            "0{s}t{s}0{s}sunny day at the beach\n\
             1{s}t{s}1{s}shopping at the mall\n\
             2{s}w{s}0{s}beach\n",
            s = SEP
        ),
    )
    .unwrap();
    fs::write(dir.join("embed_init.txt"), embeddings).unwrap();
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("crossmap.toml");
    fs::write(&path, body).unwrap();
    path
}

// =============================================================================
// NEIGHBORS
// =============================================================================

#[test]
fn test_neighbors_success() {
    let dir = tempfile::tempdir().unwrap();
    write_query_files(dir.path(), "0 1 0\n1 0 1\n2 1 0\n");
    let config = write_config(dir.path(), "[trainer]\ndim = 2\n\n[query]\nembed_dim = 2\n");

    let out = crossmap(
        dir.path(),
        &["--config", config.to_str().unwrap(), "neighbors", "beach", "--type", "t", "-k", "1"],
    );
    assert_eq!(code(&out), 0, "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), "1\t0\t1.000000\tsunny day at the beach");
}

#[test]
fn test_neighbors_unknown_query_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    write_query_files(dir.path(), "0 1 0\n");
    let config = write_config(dir.path(), "[trainer]\ndim = 2\n\n[query]\nembed_dim = 2\n");

    let out = crossmap(
        dir.path(),
        &["--config", config.to_str().unwrap(), "neighbors", "volcano", "--type", "tweet"],
    );
    assert_eq!(code(&out), 2);
    assert!(String::from_utf8_lossy(&out.stderr).contains("volcano"));
}

#[test]
fn test_neighbors_malformed_embeddings_exit_4() {
    let dir = tempfile::tempdir().unwrap();
    write_query_files(dir.path(), "0 1 0\n1 zero 1\n");
    let config = write_config(dir.path(), "[trainer]\ndim = 2\n\n[query]\nembed_dim = 2\n");

    let out = crossmap(
        dir.path(),
        &["--config", config.to_str().unwrap(), "neighbors", "beach", "--type", "t"],
    );
    assert_eq!(code(&out), 4);
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 2"));
}

#[test]
fn test_neighbors_missing_files_exit_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = crossmap(dir.path(), &["neighbors", "beach", "--type", "t"]);
    assert_eq!(code(&out), 1);
}

// =============================================================================
// CONFIG AND MATRIX
// =============================================================================

#[test]
fn test_missing_config_file_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let out = crossmap(dir.path(), &["--config", "absent.toml", "config"]);
    assert_eq!(code(&out), 2);
}

#[test]
fn test_dimension_mismatch_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[trainer]\ndim = 16\n");
    let out = crossmap(dir.path(), &["--config", config.to_str().unwrap(), "config"]);
    assert_eq!(code(&out), 2);
    assert!(String::from_utf8_lossy(&out.stderr).contains("query.embed_dim"));
}

#[test]
fn test_config_env_override_printed() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_crossmap"))
        .arg("config")
        .current_dir(dir.path())
        .env_remove("CROSSMAP_CONFIG")
        .env("CROSSMAP_THREADS", "3")
        .output()
        .unwrap();
    assert_eq!(code(&out), 0);
    assert!(String::from_utf8_lossy(&out.stdout).contains("threads = 3"));
}

#[test]
fn test_matrix_summary_with_derivation() {
    let dir = tempfile::tempdir().unwrap();
    let (nodes, edges) = write_graph(dir.path());
    let base = [
        "matrix",
        "--nodes",
        nodes.to_str().unwrap(),
        "--edges",
        edges.to_str().unwrap(),
        "--edge-type",
        "tw",
    ];
    let out = crossmap(dir.path(), &base);
    assert_eq!(code(&out), 0, "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        "edge type tw: 2 x 2, 2 non-zero cells, sum 8, min 3, max 5"
    );

    // beach -> mall has no second hop, so the squared relation is empty
    let mut derived: Vec<&str> = base.to_vec();
    derived[6] = "ww";
    derived.push("--derive");
    let out = crossmap(dir.path(), &derived);
    assert_eq!(code(&out), 0);
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        "edge type ww: 2 x 2, 0 non-zero cells, sum 0"
    );
}

// =============================================================================
// TRAIN
// =============================================================================

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

/// Train with a script trainer and query the exported vectors, then swap in a
/// failing trainer. One test, so the script is never rewritten while running.
#[cfg(unix)]
#[test]
fn test_train_then_query_and_trainer_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (nodes, edges) = write_graph(dir.path());
    let trainer = dir.path().join("trainer.sh");
    write_script(
        &trainer,
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -job_id) JOB="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf '0\t1 0\n1\t0 1\n' > "output-t-$JOB.txt"
printf 'beach\t1 0\nmall\t0 1\n' > "output-w-$JOB.txt"
cp "output-t-$JOB.txt" "context-t-$JOB.txt"
cp "output-w-$JOB.txt" "context-w-$JOB.txt"
"#,
    );
    let config = write_config(
        dir.path(),
        &format!(
            "[trainer]\nbinary = \"{}\"\ninterchange_dir = \"GraphEmbed\"\ndim = 2\n\n[query]\nembed_dim = 2\n",
            trainer.display()
        ),
    );
    let config = config.to_str().unwrap();
    let train_args = [
        "--config",
        config,
        "train",
        "--nodes",
        nodes.to_str().unwrap(),
        "--edges",
        edges.to_str().unwrap(),
        "--job-id",
        "e2e",
    ];

    let out = crossmap(dir.path(), &train_args);
    assert_eq!(code(&out), 0, "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("4 vectors"));
    assert_eq!(fs::read_dir(dir.path().join("GraphEmbed")).unwrap().count(), 0);

    let out = crossmap(
        dir.path(),
        &["--config", config, "neighbors", "mall", "--type", "t", "-k", "2"],
    );
    assert_eq!(code(&out), 0);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let first = stdout.lines().next().unwrap();
    assert!(first.ends_with("shopping at the mall"), "got {stdout}");

    write_script(&trainer, "#!/bin/sh\nexit 9\n");
    let out = crossmap(dir.path(), &train_args);
    assert_eq!(code(&out), 3);
    assert_eq!(fs::read_dir(dir.path().join("GraphEmbed")).unwrap().count(), 0);
}
