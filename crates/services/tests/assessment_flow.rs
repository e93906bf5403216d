use std::sync::Arc;

use assess_core::grading::AnswerKeyGrader;
use assess_core::model::{AssessmentDefinition, AssessmentId, AssessmentStatus, Question};
use assess_core::time::fixed_clock;
use async_trait::async_trait;
use services::{AssessmentService, AssessmentServiceError, AssessmentSessionManager, ManagerConfig};
use storage::repository::{
    AttemptRepository, InMemoryRepository, QuestionBank, Storage, StorageError,
};

fn manager() -> AssessmentSessionManager {
    AssessmentSessionManager::build(Arc::new(AnswerKeyGrader), fixed_clock(), ManagerConfig::default())
}

async fn service_with(definition: &AssessmentDefinition) -> (AssessmentService, InMemoryRepository) {
    let repo = InMemoryRepository::with_canonical_pool().unwrap();
    repo.upsert_definition(definition).await.unwrap();
    let storage = Storage::from_repo(repo.clone());
    let service = AssessmentService::new(manager(), storage.questions, storage.attempts);
    (service, repo)
}

#[tokio::test]
async fn two_question_scenario() {
    let definition =
        AssessmentDefinition::new(AssessmentId::new(1), "Scenario", "", 2, 50, 10, 3).unwrap();
    let (service, _repo) = service_with(&definition).await;

    let snapshot = service.start(definition.id()).await.unwrap();
    assert_eq!(snapshot.answers.as_slice(), &[None, None]);
    assert_eq!(snapshot.remaining_seconds, 600);

    service.manager().answer_question(0, 1);
    service.manager().answer_question(1, 3);
    assert_eq!(service.manager().answers().unwrap(), vec![Some(1), Some(3)]);

    let result = service.submit().await.unwrap().unwrap();
    assert_eq!(result.attempts(), 1);
    assert!(result.score() <= 100);
    assert_eq!(result.passed(), result.score() >= 50);
    assert!(service.submit().await.unwrap().is_none());
}

#[tokio::test]
async fn submissions_are_recorded_and_gate_attempts() {
    let definition =
        AssessmentDefinition::new(AssessmentId::new(4), "Gated", "", 3, 60, 5, 2).unwrap();
    let (service, repo) = service_with(&definition).await;

    for expected_attempts in 1..=2 {
        service.start(definition.id()).await.unwrap();
        let result = service.submit().await.unwrap().unwrap();
        assert_eq!(result.attempts(), expected_attempts);
        assert_eq!(result.status(), AssessmentStatus::Failed);
    }

    let stored = repo.get_definition(definition.id()).await.unwrap();
    assert_eq!(stored.attempts(), 2);
    assert_eq!(service.history(definition.id()).await.unwrap().len(), 2);

    let err = service.start(definition.id()).await.unwrap_err();
    assert!(matches!(err, AssessmentServiceError::AttemptsExhausted { max: 2, .. }));
}

#[tokio::test]
async fn canonical_answers_pass() {
    let definition =
        AssessmentDefinition::new(AssessmentId::new(1), "Key", "", 4, 100, 5, 1).unwrap();
    let (service, _repo) = service_with(&definition).await;

    let snapshot = service.start(definition.id()).await.unwrap();
    for (index, question) in snapshot.questions.iter().enumerate() {
        service.manager().answer_question(index, question.correct_answer());
    }

    let result = service.submit().await.unwrap().unwrap();
    assert_eq!(result.score(), 100);
    assert_eq!(result.status(), AssessmentStatus::Passed);
}

#[tokio::test]
async fn second_start_scores_only_second_session() {
    let first = AssessmentDefinition::new(AssessmentId::new(1), "First", "", 3, 50, 5, 3).unwrap();
    let second = AssessmentDefinition::new(AssessmentId::new(2), "Second", "", 2, 50, 5, 3).unwrap();
    let (service, repo) = service_with(&first).await;
    repo.upsert_definition(&second).await.unwrap();

    let snapshot = service.start(first.id()).await.unwrap();
    for (index, question) in snapshot.questions.iter().enumerate() {
        service.manager().answer_question(index, question.correct_answer());
    }

    service.start(second.id()).await.unwrap();
    let result = service.submit().await.unwrap().unwrap();

    assert_eq!(result.definition().id(), second.id());
    assert_eq!(result.total_questions(), 2);
    assert_eq!(result.correct_count(), 0);
    assert!(service.history(first.id()).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_definition_surfaces_storage_error() {
    let repo = InMemoryRepository::with_canonical_pool().unwrap();
    let storage = Storage::from_repo(repo);
    let service = AssessmentService::new(manager(), storage.questions, storage.attempts);

    let err = service.start(AssessmentId::new(77)).await.unwrap_err();
    assert!(matches!(err, AssessmentServiceError::Storage(StorageError::NotFound)));
    assert!(!service.manager().is_active());
}

struct EmptyBank;

#[async_trait]
impl QuestionBank for EmptyBank {
    async fn questions(
        &self,
        _assessment_id: AssessmentId,
        _limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn empty_question_bank_is_rejected() {
    let definition =
        AssessmentDefinition::new(AssessmentId::new(1), "Empty", "", 2, 50, 5, 3).unwrap();
    let repo = InMemoryRepository::new();
    repo.upsert_definition(&definition).await.unwrap();
    let service = AssessmentService::new(manager(), Arc::new(EmptyBank), Arc::new(repo));

    let err = service.start(definition.id()).await.unwrap_err();
    assert!(matches!(err, AssessmentServiceError::NoQuestions(id) if id == definition.id()));
}
