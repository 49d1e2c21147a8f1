//! Training → export → query, wired through the public APIs of every crate.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crossmap_core::{EdgeType, InMemorySource, JobId, NodeId, NodeType, FIELD_SEPARATOR};
use crossmap_embeddings::{
    EmbeddingResult, Gateway, Trainer, TrainerConfig, TrainerInvocation, VectorStore,
};
use crossmap_graph::TypedGraph;
use crossmap_query::{export_vectors, QueryConfig, QueryEngine, QueryError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// TRAINER DOUBLE
// =============================================================================

/// Words get one-hot vectors by node file position; each tweet gets the
/// weighted sum of the words it links to in `edge-tw`.
struct AlignedTrainer;

impl Trainer for AlignedTrainer {
    fn train(&self, inv: &TrainerInvocation, workdir: &Path) -> EmbeddingResult<()> {
        let suffix = inv.job_id.file_suffix();
        let read = |name: String| fs::read_to_string(workdir.join(name));

        let words: Vec<String> = read(format!("node-w{suffix}"))?
            .lines()
            .map(str::to_string)
            .collect();
        let mut word_vecs: HashMap<&str, Vec<f32>> = HashMap::new();
        for (i, w) in words.iter().enumerate() {
            let mut v = vec![0.0; inv.dim];
            v[i % inv.dim] = 1.0;
            word_vecs.insert(w.as_str(), v);
        }

        let mut tweet_vecs: HashMap<String, Vec<f32>> = read(format!("node-t{suffix}"))?
            .lines()
            .map(|t| (t.to_string(), vec![0.0; inv.dim]))
            .collect();
        for line in read(format!("edge-tw{suffix}"))?.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            let weight: f32 = fields[2].parse().unwrap_or(0.0);
            if let (Some(tv), Some(wv)) = (tweet_vecs.get_mut(fields[0]), word_vecs.get(fields[1])) {
                for (a, b) in tv.iter_mut().zip(wv) {
                    *a += weight * b;
                }
            }
        }

        let render = |key: &str, v: &[f32]| {
            let values: Vec<String> = v.iter().map(|x| x.to_string()).collect();
            format!("{}\t{}\n", key, values.join(" "))
        };
        let word_body: String = words.iter().map(|w| render(w, &word_vecs[w.as_str()])).collect();
        let tweet_body: String = tweet_vecs.iter().map(|(t, v)| render(t, v)).collect();
        for kind in ["output", "context"] {
            fs::write(workdir.join(format!("{kind}-w{suffix}")), &word_body)?;
            fs::write(workdir.join(format!("{kind}-t{suffix}")), &tweet_body)?;
        }
        Ok(())
    }
}

fn beach_graph() -> TypedGraph {
    let tw = EdgeType::new(NodeType::Tweet, NodeType::Word);
    let mut src = InMemorySource::new();
    src.add_node(0, NodeType::Tweet, 0, "sunny day at the beach")
        .add_node(1, NodeType::Tweet, 1, "shopping at the mall")
        .add_node(2, NodeType::Word, 0, "beach")
        .add_node(3, NodeType::Word, 1, "mall")
        .add_edge(tw, 0, 2, 5.0)
        .add_edge(tw, 1, 3, 3.0);
    TypedGraph::from_source(&src).unwrap()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_beach_query_returns_first_tweet() {
    let dir = tempfile::tempdir().unwrap();
    let trainer_config = TrainerConfig {
        interchange_dir: dir.path().join("GraphEmbed"),
        dim: 2,
        ..Default::default()
    };
    let gateway = Gateway::with_trainer(trainer_config, AlignedTrainer).unwrap();
    let graph = beach_graph();
    let store = VectorStore::new();
    store.update_from(gateway.fit(&graph, 0, &JobId::new("1").unwrap()).unwrap());

    let query_config = QueryConfig {
        node_dict_path: dir.path().join("node_dict.txt"),
        embedding_path: dir.path().join("embed_init.txt"),
        embed_dim: 2,
        placeholder_seed: Some(3),
        ..Default::default()
    };
    let summary = export_vectors(
        &graph,
        &store,
        2,
        &query_config.node_dict_path,
        &query_config.embedding_path,
    )
    .unwrap();
    assert_eq!(summary.vectors, 4);

    let engine = QueryEngine::load(&query_config).unwrap();
    assert_eq!(engine.table().placeholder_count(), 0);

    let top = engine.neighbors("beach", NodeType::Tweet, 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].global_id, 0);
    assert_eq!(top[0].value, "sunny day at the beach");
    assert!((top[0].similarity - 1.0).abs() < 1e-6);

    let words = engine.neighbors("mall", NodeType::Word, 5).unwrap();
    assert_eq!(words[0].value, "mall");
    assert_eq!(words.len(), 2);
}

#[test]
fn test_missing_embedding_row_uses_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let dict = dir.path().join("node_dict.txt");
    let embed = dir.path().join("embed_init.txt");
    let s = FIELD_SEPARATOR;
    fs::write(
        &dict,
        format!("0{s}t{s}0{s}tweet a\n1{s}t{s}1{s}tweet b\n2{s}w{s}0{s}beach\n"),
    )
    .unwrap();
    // row 1 is absent
    fs::write(&embed, "0 1.0 0.0\n2 1.0 0.0\n").unwrap();

    let config = QueryConfig {
        node_dict_path: dict,
        embedding_path: embed,
        embed_dim: 2,
        placeholder_seed: Some(11),
        ..Default::default()
    };
    let engine = QueryEngine::load(&config).unwrap();
    assert!(engine.table().is_placeholder(1));

    let result = engine.neighbors("beach", NodeType::Tweet, 2).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].global_id, 0);
    assert!(result[1].similarity.is_finite());

    // querying the placeholder row itself also works, and a seeded reload agrees
    let first = engine.neighbors("tweet b", NodeType::Word, 1).unwrap();
    let again = QueryEngine::load(&config)
        .unwrap()
        .neighbors("tweet b", NodeType::Word, 1)
        .unwrap();
    assert_eq!(first, again);
}

#[test]
fn test_unknown_query_value() {
    let dir = tempfile::tempdir().unwrap();
    let dict = dir.path().join("node_dict.txt");
    let embed = dir.path().join("embed_init.txt");
    fs::write(&dict, format!("0{s}w{s}0{s}beach\n", s = FIELD_SEPARATOR)).unwrap();
    fs::write(&embed, "0 1 0\n").unwrap();
    let engine = QueryEngine::load(&QueryConfig {
        node_dict_path: dict,
        embedding_path: embed,
        embed_dim: 2,
        ..Default::default()
    })
    .unwrap();
    assert!(matches!(
        engine.neighbors("mountain", NodeType::Word, 3),
        Err(QueryError::UnknownQuery(_))
    ));
}

#[test]
fn test_neighbor_count_order_and_type_on_random_tables() {
    let types = [NodeType::Tweet, NodeType::Location, NodeType::Word];
    for seed in 0..10u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dir = tempfile::tempdir().unwrap();
        let dict = dir.path().join("node_dict.txt");
        let embed = dir.path().join("embed_init.txt");

        let n = rng.gen_range(2..30u64);
        let mut dict_body = String::new();
        let mut embed_body = String::new();
        let mut per_type: HashMap<NodeType, usize> = HashMap::new();
        for id in 0..n {
            let nt = types[rng.gen_range(0..types.len())];
            let local = per_type.entry(nt).or_default();
            dict_body.push_str(&format!(
                "{id}{s}{nt}{s}{local}{s}node{id}\n",
                s = FIELD_SEPARATOR
            ));
            *local += 1;
            if rng.gen_bool(0.8) {
                let v: Vec<String> = (0..4).map(|_| rng.gen_range(-1.0..1.0f32).to_string()).collect();
                embed_body.push_str(&format!("{id} {}\n", v.join(" ")));
            }
        }
        fs::write(&dict, dict_body).unwrap();
        fs::write(&embed, embed_body).unwrap();

        let engine = QueryEngine::load(&QueryConfig {
            node_dict_path: dict,
            embedding_path: embed,
            embed_dim: 4,
            placeholder_seed: Some(seed),
            ..Default::default()
        })
        .unwrap();

        let query = format!("node{}", rng.gen_range(0..n));
        for nt in types {
            let available = per_type.get(&nt).copied().unwrap_or(0);
            let k = rng.gen_range(0..8usize);
            let result = engine.neighbors(&query, nt, k).unwrap();
            assert_eq!(result.len(), k.min(available), "seed {seed}");
            assert!(result.iter().all(|r| r.node_type == nt));
            assert!(result
                .windows(2)
                .all(|w| w[0].similarity >= w[1].similarity));
            let ids: Vec<NodeId> = result.iter().map(|r| r.global_id).collect();
            let mut dedup = ids.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(ids.len(), dedup.len());
        }
    }
}
