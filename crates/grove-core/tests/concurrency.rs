//! Racing completions against a shared on-disk store.
//!
//! Two writers with their own connections try to settle the same
//! (task, user) pair in the same window. Exactly one may win; the loser
//! must see a duplicate rejection and credit nothing.

use chrono::{TimeZone, Utc};
use grove_core::db::open_store;
use grove_core::engine::{CompleteError, CompletionRequest, complete_task};
use grove_core::model::task::{Cadence, Category, Difficulty, TaskDraft};
use grove_core::store::tasks::create_task;
use grove_core::store::users::{create_user, get_user};
use std::sync::Barrier;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

#[test]
fn racing_writers_settle_exactly_one_completion() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("grove.db");

    let conn = open_store(&db_path).expect("open store");
    let task = create_task(
        &conn,
        &TaskDraft {
            title: "Cycle to work".to_string(),
            description: "Leave the car at home and cycle instead.".to_string(),
            cadence: Cadence::Daily,
            category: Category::Environment,
            difficulty: Difficulty::Easy,
            points: 10,
        },
    )
    .expect("create task");
    let user = create_user(&conn, "Ada", "ada@example.org").expect("create user");
    drop(conn);

    let req = CompletionRequest {
        task_id: task.id,
        user_id: user.id.clone(),
        group_id: None,
    };
    let now = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();

    let writers = 4;
    let barrier = Barrier::new(writers);
    let wins = AtomicU32::new(0);
    let duplicates = AtomicU32::new(0);

    thread::scope(|scope| {
        for _ in 0..writers {
            scope.spawn(|| {
                let mut conn = open_store(&db_path).expect("open store in writer");
                barrier.wait();
                match complete_task(&mut conn, &req, now) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(CompleteError::Duplicate(_)) => {
                        duplicates.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(other) => panic!("unexpected completion error: {other:?}"),
                }
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1, "exactly one writer settles");
    assert_eq!(duplicates.load(Ordering::SeqCst), 3);

    let conn = open_store(&db_path).expect("reopen store");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))
        .expect("count completions");
    assert_eq!(count, 1);

    let user = get_user(&conn, &user.id)
        .expect("get user")
        .expect("user exists");
    assert_eq!(user.points, 10, "only the winning writer credits points");
}
