//! Property tests: stores against a model, views against a naive evaluation.

use std::sync::Arc;

use proptest::prelude::*;

use recdao_store::{MemoryStore, SqliteStore, StoreExt, StoreRef};
use recdao_testkit::generators::{apply, by_id, comparator, model, ops, predicate};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_stores_match_model(history in ops(48)) {
        let expected = model(&history);

        runtime().block_on(async {
            let memory: StoreRef = Arc::new(MemoryStore::new());
            let sqlite: StoreRef = Arc::new(SqliteStore::open_memory().unwrap());

            for store in [memory, sqlite] {
                apply(&store, &history).await.unwrap();
                let records = store.select_all().await.unwrap().into_records();
                prop_assert_eq!(records.len(), expected.len());
                prop_assert_eq!(by_id(&records), expected.clone());
            }
            Ok::<_, TestCaseError>(())
        })?;
    }

    #[test]
    fn test_memory_and_sqlite_agree_on_natural_order(history in ops(48)) {
        runtime().block_on(async {
            let memory: StoreRef = Arc::new(MemoryStore::new());
            let sqlite: StoreRef = Arc::new(SqliteStore::open_memory().unwrap());
            apply(&memory, &history).await.unwrap();
            apply(&sqlite, &history).await.unwrap();

            let a = memory.select_all().await.unwrap().into_records();
            let b = sqlite.select_all().await.unwrap().into_records();
            prop_assert_eq!(a, b);
            Ok::<_, TestCaseError>(())
        })?;
    }

    #[test]
    fn test_view_chain_matches_naive_evaluation(
        history in ops(32),
        p in predicate(),
        c in comparator(),
        limit in 0usize..6,
        skip in 0usize..6,
    ) {
        runtime().block_on(async {
            let store: StoreRef = Arc::new(MemoryStore::new());
            apply(&store, &history).await.unwrap();

            let all = store.select_all().await.unwrap().into_records();
            let mut expected: Vec<_> = all.into_iter().filter(|r| p.matches(r)).collect();
            c.sort(&mut expected);
            let expected: Vec<_> = expected.into_iter().take(limit).skip(skip).collect();

            let actual = store
                .filter(p.clone())
                .order_by(c.clone())
                .limit(limit)
                .skip(skip)
                .select_all()
                .await
                .unwrap();
            prop_assert!(actual.is_eof());
            prop_assert_eq!(actual.into_records(), expected);
            Ok::<_, TestCaseError>(())
        })?;
    }

    #[test]
    fn test_stacked_filters_equal_conjunction(
        history in ops(32),
        p in predicate(),
        q in predicate(),
    ) {
        runtime().block_on(async {
            let store: StoreRef = Arc::new(MemoryStore::new());
            apply(&store, &history).await.unwrap();

            let stacked = store.filter(p.clone()).filter(q.clone()).select_all().await.unwrap();
            let conjoined = store.filter(p.and(q)).select_all().await.unwrap();
            prop_assert_eq!(stacked.into_records(), conjoined.into_records());
            Ok::<_, TestCaseError>(())
        })?;
    }
}
