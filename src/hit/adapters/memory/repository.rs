//! In-memory repository for HITs and their assignments.

use crate::hit::{
    domain::{
        AnswerRecord, Assignment, CompletionResult, CompletionResultId, Hit, HitId,
        RemoteAssignmentId, RemoteHitId, WorkerId,
    },
    ports::{GetOrCreated, HitRepository, HitRepositoryError, HitRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory HIT repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHitRepository {
    state: Arc<RwLock<InMemoryHitState>>,
}

#[derive(Debug, Default)]
struct InMemoryHitState {
    hits: HashMap<HitId, Hit>,
    remote_index: HashMap<RemoteHitId, HitId>,
    assignments: BTreeMap<RemoteAssignmentId, Assignment>,
    workers: BTreeMap<WorkerId, DateTime<Utc>>,
    answers: BTreeMap<(RemoteAssignmentId, String), AnswerRecord>,
    results: HashMap<CompletionResultId, CompletionResult>,
}

impl InMemoryHitRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> HitRepositoryResult<RwLockReadGuard<'_, InMemoryHitState>> {
        self.state
            .read()
            .map_err(|err| HitRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> HitRepositoryResult<RwLockWriteGuard<'_, InMemoryHitState>> {
        self.state
            .write()
            .map_err(|err| HitRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryHitState {
    fn index_remote_id(&mut self, hit: &Hit) -> HitRepositoryResult<()> {
        let Some(remote_id) = hit.remote_id() else {
            return Ok(());
        };
        if let Some(&indexed_id) = self.remote_index.get(remote_id)
            && indexed_id != hit.id()
        {
            return Err(HitRepositoryError::DuplicateRemoteHit(remote_id.clone()));
        }
        self.remote_index.insert(remote_id.clone(), hit.id());
        Ok(())
    }

    fn check_result_references(&self, result: &CompletionResult) -> HitRepositoryResult<()> {
        if !self.workers.contains_key(&result.worker_id) {
            return Err(HitRepositoryError::WorkerNotFound(result.worker_id.clone()));
        }
        if !self.assignments.contains_key(&result.assignment_id) {
            return Err(HitRepositoryError::AssignmentNotFound(
                result.assignment_id.clone(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl HitRepository for InMemoryHitRepository {
    async fn store_hit(&self, hit: &Hit) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        if state.hits.contains_key(&hit.id()) {
            return Err(HitRepositoryError::DuplicateHit(hit.id()));
        }
        state.index_remote_id(hit)?;
        state.hits.insert(hit.id(), hit.clone());
        Ok(())
    }

    async fn update_hit(&self, hit: &Hit) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.hits.contains_key(&hit.id()) {
            return Err(HitRepositoryError::HitNotFound(hit.id()));
        }
        state.index_remote_id(hit)?;
        state.hits.insert(hit.id(), hit.clone());
        Ok(())
    }

    async fn find_hit(&self, id: HitId) -> HitRepositoryResult<Option<Hit>> {
        let state = self.read()?;
        Ok(state.hits.get(&id).cloned())
    }

    async fn find_hit_by_remote_id(
        &self,
        remote_id: &RemoteHitId,
    ) -> HitRepositoryResult<Option<Hit>> {
        let state = self.read()?;
        let hit = state
            .remote_index
            .get(remote_id)
            .and_then(|id| state.hits.get(id))
            .cloned();
        Ok(hit)
    }

    async fn list_hits(&self) -> HitRepositoryResult<Vec<Hit>> {
        let state = self.read()?;
        let mut hits: Vec<Hit> = state.hits.values().cloned().collect();
        hits.sort_by_key(Hit::created_at);
        Ok(hits)
    }

    async fn get_or_create_assignment(
        &self,
        id: &RemoteAssignmentId,
        hit_id: HitId,
    ) -> HitRepositoryResult<GetOrCreated<Assignment>> {
        let mut state = self.write()?;
        if !state.hits.contains_key(&hit_id) {
            return Err(HitRepositoryError::HitNotFound(hit_id));
        }
        if let Some(existing) = state.assignments.get(id) {
            if existing.hit_id() != hit_id {
                return Err(HitRepositoryError::AssignmentHitMismatch {
                    assignment: id.clone(),
                    owner: existing.hit_id(),
                    requested: hit_id,
                });
            }
            return Ok(GetOrCreated::existing(existing.clone()));
        }
        let assignment = Assignment::new(id.clone(), hit_id);
        state.assignments.insert(id.clone(), assignment.clone());
        Ok(GetOrCreated::created(assignment))
    }

    async fn update_assignment(&self, assignment: &Assignment) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .assignments
            .get_mut(assignment.id())
            .ok_or_else(|| HitRepositoryError::AssignmentNotFound(assignment.id().clone()))?;
        *slot = assignment.clone();
        Ok(())
    }

    async fn find_assignment(
        &self,
        id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Option<Assignment>> {
        let state = self.read()?;
        Ok(state.assignments.get(id).cloned())
    }

    async fn list_assignments_for_hit(
        &self,
        hit_id: HitId,
    ) -> HitRepositoryResult<Vec<Assignment>> {
        let state = self.read()?;
        Ok(state
            .assignments
            .values()
            .filter(|assignment| assignment.hit_id() == hit_id)
            .cloned()
            .collect())
    }

    async fn get_or_create_worker(
        &self,
        id: &WorkerId,
        first_seen_at: DateTime<Utc>,
    ) -> HitRepositoryResult<GetOrCreated<WorkerId>> {
        let mut state = self.write()?;
        if state.workers.contains_key(id) {
            return Ok(GetOrCreated::existing(id.clone()));
        }
        state.workers.insert(id.clone(), first_seen_at);
        Ok(GetOrCreated::created(id.clone()))
    }

    async fn find_answer(
        &self,
        assignment_id: &RemoteAssignmentId,
        key: &str,
    ) -> HitRepositoryResult<Option<AnswerRecord>> {
        let state = self.read()?;
        Ok(state
            .answers
            .get(&(assignment_id.clone(), key.to_owned()))
            .cloned())
    }

    async fn store_answer(&self, answer: &AnswerRecord) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.assignments.contains_key(answer.assignment_id()) {
            return Err(HitRepositoryError::AssignmentNotFound(
                answer.assignment_id().clone(),
            ));
        }
        let slot_key = (answer.assignment_id().clone(), answer.key().to_owned());
        if state.answers.contains_key(&slot_key) {
            return Err(HitRepositoryError::DuplicateAnswer {
                assignment: answer.assignment_id().clone(),
                key: answer.key().to_owned(),
            });
        }
        state.answers.insert(slot_key, answer.clone());
        Ok(())
    }

    async fn update_answer(&self, answer: &AnswerRecord) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        let slot_key = (answer.assignment_id().clone(), answer.key().to_owned());
        match state.answers.get_mut(&slot_key) {
            Some(stored) if stored.id() == answer.id() => {
                *stored = answer.clone();
                Ok(())
            }
            _ => Err(HitRepositoryError::AnswerNotFound(answer.id())),
        }
    }

    async fn list_answers(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Vec<AnswerRecord>> {
        let state = self.read()?;
        Ok(state
            .answers
            .values()
            .filter(|answer| answer.assignment_id() == assignment_id)
            .cloned()
            .collect())
    }

    async fn store_result(&self, result: &CompletionResult) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_result_references(result)?;
        let key = result.key();
        if state.results.values().any(|stored| stored.key() == key) {
            return Err(HitRepositoryError::DuplicateResult(key));
        }
        state.results.insert(result.id, result.clone());
        Ok(())
    }

    async fn update_result(&self, result: &CompletionResult) -> HitRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.results.contains_key(&result.id) {
            return Err(HitRepositoryError::ResultNotFound(result.id));
        }
        state.check_result_references(result)?;
        let key = result.key();
        if state
            .results
            .values()
            .any(|stored| stored.id != result.id && stored.key() == key)
        {
            return Err(HitRepositoryError::DuplicateResult(key));
        }
        let slot = state
            .results
            .get_mut(&result.id)
            .ok_or(HitRepositoryError::ResultNotFound(result.id))?;
        *slot = result.clone();
        Ok(())
    }

    async fn list_results_for_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Vec<CompletionResult>> {
        let state = self.read()?;
        Ok(state
            .results
            .values()
            .filter(|result| result.assignment_id == *assignment_id)
            .cloned()
            .collect())
    }
}
