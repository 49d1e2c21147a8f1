//! End-to-end runs of `ProcessTrainer` against a shell script standing in
//! for the trainer executable.
//!
//! Both scenarios live in one test so that no other test thread forks while a
//! freshly written script is still open (ETXTBSY).

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crossmap_core::{EdgeType, InMemorySource, JobId, LocalKey, NodeType};
use crossmap_embeddings::{EmbeddingError, Gateway, InterchangeLayout, TrainerConfig};
use crossmap_graph::TypedGraph;

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn unit_vector_script(args_log: &Path) -> String {
    format!(
        r#"#!/bin/sh
echo "$@" > "{log}"
while [ $# -gt 0 ]; do
  case "$1" in
    -job_id) JOB="$2"; shift 2 ;;
    *) shift ;;
  esac
done
for t in t w; do
  while IFS= read -r k; do
    printf '%s\t1 0\n' "$k"
  done < "node-$t-$JOB.txt" > "output-$t-$JOB.txt"
  cp "output-$t-$JOB.txt" "context-$t-$JOB.txt"
done
"#,
        log = args_log.display()
    )
}

fn graph() -> TypedGraph {
    let tw = EdgeType::new(NodeType::Tweet, NodeType::Word);
    let mut src = InMemorySource::new();
    src.add_node(0, NodeType::Tweet, 0, "at the beach")
        .add_node(1, NodeType::Word, 0, "beach")
        .add_edge(tw, 0, 1, 5.0);
    TypedGraph::from_source(&src).unwrap()
}

#[test]
fn test_process_trainer_scenarios() {
    let root = tempfile::tempdir().unwrap();
    let workdir = root.path().join("GraphEmbed");
    fs::create_dir_all(&workdir).unwrap();

    // Relative binary resolved inside the interchange directory.
    let args_log = root.path().join("args.log");
    write_script(&workdir.join("fake-trainer.sh"), &unit_vector_script(&args_log));
    let config = TrainerConfig {
        binary: "./fake-trainer.sh".into(),
        interchange_dir: workdir.clone(),
        dim: 2,
        threads: 3,
        second_order: true,
        ..Default::default()
    };
    let job = JobId::new("31337").unwrap();
    let vectors = Gateway::new(config).unwrap().fit(&graph(), 5_000_000, &job).unwrap();

    assert_eq!(
        vectors.center[&NodeType::Word][&LocalKey::from("beach")],
        vec![1.0, 0.0]
    );
    assert_eq!(
        vectors.context[&NodeType::Tweet][&LocalKey::Index(0)],
        vec![1.0, 0.0]
    );
    let args = fs::read_to_string(&args_log).unwrap();
    assert_eq!(
        args.trim(),
        "-size 2 -negative 5 -alpha 0.025 -samples 5 -threads 3 -second_order 1 -job_id 31337"
    );
    assert!(InterchangeLayout::new(&workdir, &job)
        .job_files()
        .unwrap()
        .is_empty());

    // Absolute binary that fails.
    let failing = root.path().join("failing-trainer.sh");
    write_script(&failing, "#!/bin/sh\nexit 3\n");
    let config = TrainerConfig {
        binary: failing,
        interchange_dir: workdir.clone(),
        ..Default::default()
    };
    let job = JobId::new("31338").unwrap();
    let err = Gateway::new(config).unwrap().fit(&graph(), 0, &job).unwrap_err();
    assert!(matches!(err, EmbeddingError::TrainerFailed { code: Some(3) }));
    assert!(InterchangeLayout::new(&workdir, &job)
        .job_files()
        .unwrap()
        .is_empty());
}
