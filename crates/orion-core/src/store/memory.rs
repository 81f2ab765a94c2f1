//! In-process plan store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{newest_first, validate_plan, PlanStore};
use crate::error::{OrionError, Result};
use crate::models::{Plan, PlanSummary};

/// Plans held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: RwLock<HashMap<String, Plan>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn put(&self, plan: Plan) -> Result<()> {
        validate_plan(&plan)?;
        let mut plans = self.plans.write().await;
        if plans.contains_key(&plan.id) {
            return Err(OrionError::DuplicatePlan { id: plan.id });
        }
        plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Plan>> {
        Ok(self.plans.read().await.get(id).cloned())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.plans.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<PlanSummary>> {
        let mut summaries: Vec<PlanSummary> =
            self.plans.read().await.values().map(PlanSummary::from).collect();
        newest_first(&mut summaries);
        Ok(summaries)
    }
}
