use aptocom_ai::evaluation::{
    EvaluationId, EvaluationRepository, EvaluationResult, ProposalId, RepositoryError,
    StoredEvaluation,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct EvaluationLog {
    next_id: u64,
    records: Vec<StoredEvaluation>,
}

/// Process-local evaluation store; identifiers are sequential `eval-NNNNNN`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    log: Arc<Mutex<EvaluationLog>>,
}

impl InMemoryEvaluationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, EvaluationLog>, RepositoryError> {
        self.log
            .lock()
            .map_err(|_| RepositoryError::Unavailable("evaluation store poisoned".to_string()))
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn save(&self, evaluation: EvaluationResult) -> Result<StoredEvaluation, RepositoryError> {
        let mut guard = self.lock()?;
        guard.next_id += 1;
        let stored = StoredEvaluation {
            id: EvaluationId(format!("eval-{:06}", guard.next_id)),
            evaluation,
        };
        guard.records.push(stored.clone());
        Ok(stored)
    }

    fn update(&self, stored: StoredEvaluation) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let slot = guard
            .records
            .iter_mut()
            .find(|existing| existing.id == stored.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = stored;
        Ok(())
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<StoredEvaluation>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.iter().find(|stored| &stored.id == id).cloned())
    }

    fn latest_for_proposal(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<StoredEvaluation>, RepositoryError> {
        Ok(self.history(proposal_id)?.into_iter().next())
    }

    fn history(&self, proposal_id: &ProposalId) -> Result<Vec<StoredEvaluation>, RepositoryError> {
        let guard = self.lock()?;
        // Insertion order breaks ties between identical timestamps.
        let mut history: Vec<StoredEvaluation> = guard
            .records
            .iter()
            .rev()
            .filter(|stored| &stored.evaluation.proposal_id == proposal_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.evaluation.evaluated_at.cmp(&a.evaluation.evaluated_at));
        Ok(history)
    }
}
