use assess_core::model::{AssessmentDefinition, AssessmentId, AssessmentResult, Question};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::pool;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
}

/// Source of questions for an attempt.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Questions for the assessment in canonical order, truncated to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read.
    async fn questions(
        &self,
        assessment_id: AssessmentId,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError>;
}

/// Definitions and finished attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Persist or replace a definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the definition cannot be stored.
    async fn upsert_definition(&self, definition: &AssessmentDefinition)
    -> Result<(), StorageError>;

    /// Fetch a definition by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_definition(&self, id: AssessmentId)
    -> Result<AssessmentDefinition, StorageError>;

    /// All definitions ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    async fn list_definitions(&self) -> Result<Vec<AssessmentDefinition>, StorageError>;

    /// Append a finished attempt to the history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &AssessmentResult) -> Result<(), StorageError>;

    /// Finished attempts for an assessment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    async fn results_for(&self, id: AssessmentId) -> Result<Vec<AssessmentResult>, StorageError>;
}

/// Simple in-memory repository used by the app and in tests.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    definitions: Arc<Mutex<HashMap<AssessmentId, AssessmentDefinition>>>,
    results: Arc<Mutex<HashMap<AssessmentId, Vec<AssessmentResult>>>>,
    pools: Arc<Mutex<HashMap<AssessmentId, Vec<Question>>>>,
    default_pool: Arc<Mutex<Vec<Question>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository whose fallback pool is the built-in canonical pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSeed` if the built-in pool is invalid.
    pub fn with_canonical_pool() -> Result<Self, StorageError> {
        let pool = pool::canonical_pool().map_err(|e| StorageError::InvalidSeed(e.to_string()))?;
        let repo = Self::new();
        repo.set_default_pool(pool)?;
        Ok(repo)
    }

    /// Replace the pool served to assessments without a dedicated one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn set_default_pool(&self, questions: Vec<Question>) -> Result<(), StorageError> {
        let mut guard = self
            .default_pool
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = questions;
        Ok(())
    }

    /// Register a dedicated pool for one assessment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn set_pool(&self, id: AssessmentId, questions: Vec<Question>) -> Result<(), StorageError> {
        let mut guard = self
            .pools
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, questions);
        Ok(())
    }
}

#[async_trait]
impl QuestionBank for InMemoryRepository {
    async fn questions(
        &self,
        assessment_id: AssessmentId,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        let pools = self
            .pools
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(pool) = pools.get(&assessment_id) {
            return Ok(pool.iter().take(limit).cloned().collect());
        }
        drop(pools);

        let fallback = self
            .default_pool
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(fallback.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn upsert_definition(
        &self,
        definition: &AssessmentDefinition,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(definition.id(), definition.clone());
        Ok(())
    }

    async fn get_definition(
        &self,
        id: AssessmentId,
    ) -> Result<AssessmentDefinition, StorageError> {
        let guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_definitions(&self) -> Result<Vec<AssessmentDefinition>, StorageError> {
        let guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut defs: Vec<_> = guard.values().cloned().collect();
        defs.sort_by_key(AssessmentDefinition::id);
        Ok(defs)
    }

    async fn append_result(&self, result: &AssessmentResult) -> Result<(), StorageError> {
        if !result.status().is_final() {
            return Err(StorageError::Conflict);
        }
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(result.definition().id())
            .or_default()
            .push(result.clone());
        Ok(())
    }

    async fn results_for(&self, id: AssessmentId) -> Result<Vec<AssessmentResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned().unwrap_or_default())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionBank>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    /// In-memory storage seeded with the canonical pool and sample catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSeed` if built-in data fails validation.
    pub async fn in_memory_seeded() -> Result<Self, StorageError> {
        let repo = InMemoryRepository::with_canonical_pool()?;
        let catalog =
            pool::sample_catalog().map_err(|e| StorageError::InvalidSeed(e.to_string()))?;
        for definition in &catalog {
            repo.upsert_definition(definition).await?;
        }
        Ok(Self::from_repo(repo))
    }

    #[must_use]
    pub fn from_repo(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionBank> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo);
        Self {
            questions,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AnswerSheet, AssessmentStatus, QuestionId};
    use assess_core::time::fixed_now;

    fn build_definition(id: u64) -> AssessmentDefinition {
        AssessmentDefinition::new(AssessmentId::new(id), format!("Assessment {id}"), "", 3, 60, 5, 2)
            .unwrap()
    }

    fn build_question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["yes".into(), "no".into()],
            0,
            "",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn questions_truncate_canonical_order() {
        let repo = InMemoryRepository::with_canonical_pool().unwrap();
        let questions = repo.questions(AssessmentId::new(9), 3).await.unwrap();
        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn dedicated_pool_wins_over_default() {
        let repo = InMemoryRepository::with_canonical_pool().unwrap();
        repo.set_pool(AssessmentId::new(5), vec![build_question(100), build_question(101)])
            .unwrap();

        let questions = repo.questions(AssessmentId::new(5), 10).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id(), QuestionId::new(100));
    }

    #[tokio::test]
    async fn missing_definition_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_definition(AssessmentId::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn results_append_in_order() {
        let repo = InMemoryRepository::new();
        let def = build_definition(1);
        repo.upsert_definition(&def).await.unwrap();

        for score in [40, 90] {
            let status = if score >= 60 {
                AssessmentStatus::Passed
            } else {
                AssessmentStatus::Failed
            };
            let result = AssessmentResult::new(
                def.conclude(score, status),
                AnswerSheet::new(3),
                0,
                3,
                fixed_now(),
                fixed_now(),
            );
            repo.append_result(&result).await.unwrap();
        }

        let history = repo.results_for(def.id()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].score(), 40);
        assert!(history[1].passed());
    }

    #[tokio::test]
    async fn open_attempts_are_rejected() {
        let repo = InMemoryRepository::new();
        let def = build_definition(2).begin();
        let result = AssessmentResult::new(def, AnswerSheet::new(3), 0, 3, fixed_now(), fixed_now());

        let err = repo.append_result(&result).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn seeded_storage_lists_catalog() {
        let storage = Storage::in_memory_seeded().await.unwrap();
        let defs = storage.attempts.list_definitions().await.unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].id(), AssessmentId::new(1));
    }
}
