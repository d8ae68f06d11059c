use std::sync::Arc;

use interview_core::model::{Difficulty, QuestionDraft, SessionStatus, UserId};
use interview_core::time::fixed_now;
use services::{AppServices, Clock, PlaceholderScorer, SelectionCriteria, SessionConfig};

const OWNER: UserId = UserId::new(1);

async fn services(questions: usize) -> AppServices {
    let services = AppServices::in_memory(
        Clock::fixed(fixed_now()),
        SessionConfig {
            max_question_count: 100,
            seed: Some(7),
            ..SessionConfig::default()
        },
        Arc::new(PlaceholderScorer::seeded(7)),
    )
    .unwrap();
    let drafts = (1..=questions).map(|i| QuestionDraft {
        title: format!("Q{i}"),
        category: "general".into(),
        difficulty: Difficulty::Medium,
        field: "common".into(),
        company: None,
        tags: Vec::new(),
    });
    services.seed_questions(drafts.collect::<Vec<_>>()).await.unwrap();
    services
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_answers_for_distinct_questions_all_land() {
    let services = services(40).await;
    let manager = services.sessions();
    let session = manager
        .create_session(
            OWNER,
            &SelectionCriteria {
                count: Some(40),
                ..SelectionCriteria::default()
            },
        )
        .await
        .unwrap();
    let id = session.id();

    let mut handles = Vec::new();
    for question in session.questions() {
        let manager = Arc::clone(&manager);
        let qid = question.id();
        handles.push(tokio::spawn(async move {
            manager
                .record_answer(id, OWNER, qid, format!("answer {qid}"), 3)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let view = manager.get_session(id, OWNER).await.unwrap();
    assert_eq!(view.summary.answers.len(), 40);
    assert_eq!(view.summary.total_time_spent, 120);
    assert!(view.summary.answers.iter().all(|a| (70..=100).contains(&a.score)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_finishes_resolve_to_one_completion() {
    let services = services(3).await;
    let manager = services.sessions();
    let session = manager
        .create_session(OWNER, &SelectionCriteria::default())
        .await
        .unwrap();
    let id = session.id();
    for question in session.questions() {
        manager
            .record_answer(id, OWNER, question.id(), "answer".into(), 10)
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..16 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            manager.finish_session(id, OWNER, None).await
        }));
    }

    let mut views = Vec::new();
    for handle in handles {
        views.push(handle.await.unwrap().unwrap());
    }
    let first = &views[0];
    assert_eq!(first.status, SessionStatus::Completed);
    assert_eq!(first.total_time, Some(30));
    assert!(views.iter().all(|v| v == first));
}
