use chrono::Duration;
use quiz_core::model::{
    CategoryId, DailyQuizRecord, Difficulty, QuizHistoryRecord, QuizSetId, ReviewEntry,
    ReviewStatus, UserId,
};
use quiz_core::time::fixed_now;
use storage::repository::{
    DailyUpsert, QuizHistoryRepository, SettingsRepository, Storage, settings_keys,
};
use storage::sqlite::SqliteRepository;

fn user(n: u128) -> UserId {
    UserId::new(uuid::Uuid::from_u128(n))
}

fn review() -> Vec<ReviewEntry> {
    vec![
        ReviewEntry {
            number: 1,
            question: "Capital of France?".into(),
            correct_answer: "Paris".into(),
            selected_answer: Some("Paris".into()),
            status: ReviewStatus::Correct,
        },
        ReviewEntry {
            number: 2,
            question: "2 + 2?".into(),
            correct_answer: "4".into(),
            selected_answer: None,
            status: ReviewStatus::Unanswered,
        },
    ]
}

fn daily(user_id: UserId, score: u8) -> DailyQuizRecord {
    DailyQuizRecord {
        user_id,
        date: fixed_now().date_naive(),
        score,
        xp: u32::from(score) * 2,
        time_taken_seconds: 95,
        review_data: review(),
        completed_at: fixed_now(),
    }
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_persists_regular_attempt_with_review_data() {
    let repo = connect("memdb_attempt").await;
    let record = QuizHistoryRecord {
        user_id: user(1),
        category_id: CategoryId::new(17),
        category_title: "Science".into(),
        quiz_title: "#2 Science".into(),
        difficulty: Difficulty::Medium,
        score: 50,
        xp: 73,
        time_taken_seconds: 61,
        review_data: review(),
        quiz_set_id: QuizSetId::new("cat17_medium_2"),
        completed_at: fixed_now(),
    };

    let id = repo.insert_attempt(&record).await.unwrap();
    let rows = repo.list_history(user(1), 5).await.unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, id);
    assert_eq!(row.category_id, CategoryId::new(17));
    assert_eq!(row.difficulty, "medium");
    assert_eq!(row.review_data, review());
    assert_eq!(row.quiz_set_id, Some(QuizSetId::new("cat17_medium_2")));
    assert!(!row.is_daily);
}

#[tokio::test]
async fn sqlite_daily_upsert_keeps_higher_score_per_day() {
    let repo = connect("memdb_daily").await;

    let first = repo.upsert_daily(&daily(user(2), 70)).await.unwrap();
    assert!(matches!(first, DailyUpsert::Inserted(_)));

    let lower = repo.upsert_daily(&daily(user(2), 30)).await.unwrap();
    assert_eq!(lower, DailyUpsert::KeptExisting(first.id()));

    let higher = repo.upsert_daily(&daily(user(2), 100)).await.unwrap();
    assert_eq!(higher, DailyUpsert::Improved(first.id()));

    let stored = repo
        .get_daily(user(2), fixed_now().date_naive())
        .await
        .unwrap()
        .expect("daily row");
    assert_eq!(stored.score, 100);
    assert_eq!(stored.xp, 200);
    assert_eq!(stored.category_title, "Mixed");
    assert_eq!(stored.difficulty, "random");
    assert!(stored.is_daily);

    // A new day gets its own row.
    let mut tomorrow = daily(user(2), 10);
    tomorrow.date += Duration::days(1);
    tomorrow.completed_at += Duration::days(1);
    let next = repo.upsert_daily(&tomorrow).await.unwrap();
    assert!(matches!(next, DailyUpsert::Inserted(id) if id != first.id()));

    let rows = repo.list_history(user(2), 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, next.id());
}

#[tokio::test]
async fn sqlite_settings_overwrite_values() {
    let repo = connect("memdb_settings").await;
    assert_eq!(repo.get_value(settings_keys::HAPTICS_ENABLED).await.unwrap(), None);

    repo.set_value(settings_keys::HAPTICS_ENABLED, "true").await.unwrap();
    repo.set_value(settings_keys::HAPTICS_ENABLED, "false").await.unwrap();

    assert_eq!(
        repo.get_value(settings_keys::HAPTICS_ENABLED)
            .await
            .unwrap()
            .as_deref(),
        Some("false")
    );
}

#[tokio::test]
async fn storage_sqlite_bootstraps_both_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage
        .settings
        .set_value(settings_keys::LAST_DAILY_QUIZ_DATE, "2023-11-14")
        .await
        .unwrap();
    storage.history.upsert_daily(&daily(user(3), 90)).await.unwrap();

    assert!(
        storage
            .history
            .get_daily(user(3), fixed_now().date_naive())
            .await
            .unwrap()
            .is_some()
    );
}
