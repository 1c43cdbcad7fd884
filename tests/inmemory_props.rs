//! Property tests for in-memory store search ordering and retriever
//! filtering invariants.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use ragcore::{Chunk, InMemoryVectorStore, Retriever, VectorStore};

const DIM: usize = 8;

/// Generate a non-zero L2-normalized embedding.
fn arb_normalized_embedding() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, DIM).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-6 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

fn arb_chunk() -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding()).prop_map(
        |(id, text, embedding)| Chunk {
            id,
            text,
            sequence_index: 0,
            document_id: "doc_1".to_string(),
            metadata: HashMap::new(),
            embedding,
        },
    )
}

/// Deduplicate generated chunks by id; the store keys on chunk id.
fn dedupe(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut seen: HashMap<String, Chunk> = HashMap::new();
    for chunk in chunks {
        seen.entry(chunk.id.clone()).or_insert(chunk);
    }
    seen.into_values().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Search results are ordered by descending cosine similarity and
    /// bounded by `top_k`.
    #[test]
    fn search_is_ordered_and_bounded(
        chunks in proptest::collection::vec(arb_chunk(), 1..20),
        query in arb_normalized_embedding(),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, unique_count) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.create_collection("test", DIM).await.unwrap();
            let unique = dedupe(chunks);
            let count = unique.len();
            store.upsert_document("test", "doc_1", &unique).await.unwrap();
            (store.search("test", &query, top_k).await.unwrap(), count)
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= unique_count);
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    /// Every retrieved match passes the threshold, the result is at most
    /// `top_k` long, and descending order survives filtering.
    #[test]
    fn retrieval_respects_threshold_and_top_k(
        chunks in proptest::collection::vec(arb_chunk(), 1..20),
        query in arb_normalized_embedding(),
        top_k in 1usize..10,
        threshold in -1.0f32..1.0f32,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let matches = rt.block_on(async {
            let store = Arc::new(InMemoryVectorStore::new());
            store.create_collection("test", DIM).await.unwrap();
            store.upsert_document("test", "doc_1", &dedupe(chunks)).await.unwrap();
            let retriever = Retriever::new(store);
            retriever.retrieve("test", &query, top_k, threshold).await.unwrap()
        });

        prop_assert!(matches.len() <= top_k);
        for m in &matches {
            prop_assert!(m.score >= threshold);
        }
        for pair in matches.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
