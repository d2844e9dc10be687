use std::sync::Arc;

use drill_core::model::{Lesson, LessonKey, Sentence, SentenceId, UserId};
use drill_core::time::fixed_now;
use storage::{InMemoryGateway, PersistenceGateway, ProgressStore};

fn build_lesson() -> Lesson {
    Lesson::new(
        "Greetings",
        vec![
            Sentence::new(SentenceId::new("s1"), "Good morning.", "صباح الخير"),
            Sentence::new(SentenceId::new("s2"), "How are you?", "كيف حالك؟"),
        ],
    )
}

#[tokio::test]
async fn progress_survives_across_sessions_through_the_gateway() {
    let gateway = Arc::new(InMemoryGateway::new());
    let key = LessonKey::new("greetings-1");
    let lesson = build_lesson();

    // First session: initialize, advance, sync out.
    let first = ProgressStore::new(UserId::new("u1"), gateway.clone());
    first.ensure_initialized(&key, &lesson);
    let mut record = first.get(&key).unwrap();
    record.stage = 1;
    record.last_completion = Some(fixed_now());
    first.upsert(&key, record.clone()).await.unwrap();

    // Second session for the same user hydrates the synced record.
    let second = ProgressStore::new(UserId::new("u1"), gateway.clone());
    assert_eq!(second.hydrate().await.unwrap(), 1);
    assert_eq!(second.get(&key), Some(record));

    // A different user starts empty.
    let stranger = ProgressStore::new(UserId::new("u2"), gateway);
    assert_eq!(stranger.hydrate().await.unwrap(), 0);
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn modify_then_persist_reaches_the_gateway() {
    let gateway = Arc::new(InMemoryGateway::new());
    let user = UserId::new("u1");
    let key = LessonKey::new("greetings-1");
    let store = ProgressStore::new(user.clone(), gateway.clone());
    store.ensure_initialized(&key, &build_lesson());

    let (committed, _) = store
        .modify::<_, std::convert::Infallible>(&key, |current| {
            let mut next = current.clone();
            *next.sentence_reps.entry(SentenceId::new("s1")).or_insert(0) += 1;
            Ok((next, ()))
        })
        .unwrap();
    store.persist(&key, &committed).await.unwrap();

    let remote = gateway.load_all_progress(&user).await.unwrap();
    assert_eq!(remote.get(&key), Some(&committed));
}
