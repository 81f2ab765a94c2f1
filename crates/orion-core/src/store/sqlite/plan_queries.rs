//! Plan insert, lookup, removal and listing.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, OrionError, Result},
    models::{Plan, PlanMetadata, PlanSummary, Step},
};

const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM plans WHERE id = ?1)";
const INSERT_PLAN_SQL: &str =
    "INSERT INTO plans (id, goal, environment, author, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_STEP_SQL: &str = "INSERT INTO steps (plan_id, position, step_id, title, summary, tool_refs, params, estimated_duration) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const SELECT_PLAN_SQL: &str =
    "SELECT goal, environment, author, created_at FROM plans WHERE id = ?1";
const SELECT_STEPS_SQL: &str = "SELECT step_id, title, summary, tool_refs, params, estimated_duration FROM steps WHERE plan_id = ?1 ORDER BY position";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE id = ?1";
const SELECT_SUMMARIES_SQL: &str =
    "SELECT id, goal, environment, author, created_at, total_steps FROM plan_summaries";

fn timestamp_at(row: &Row, index: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(index)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn json_at<T: serde::de::DeserializeOwned>(row: &Row, index: usize) -> rusqlite::Result<T> {
    let text: String = row.get(index)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

impl super::Database {
    /// Inserts a plan and its steps in one transaction.
    pub fn insert_plan(&mut self, plan: &Plan) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_PLAN_EXISTS_SQL, params![&plan.id], |row| row.get(0))
            .db_context("Failed to check plan existence")?;
        if exists {
            return Err(OrionError::DuplicatePlan {
                id: plan.id.clone(),
            });
        }

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                &plan.id,
                &plan.metadata.goal,
                &plan.metadata.environment,
                &plan.metadata.author,
                plan.metadata.created_at.to_string(),
            ],
        )
        .db_context("Failed to insert plan")?;

        for (position, step) in (1_i64..).zip(&plan.steps) {
            let tool_refs = serde_json::to_string(&step.tool_refs)?;
            let step_params = step.params.as_ref().map(serde_json::to_string).transpose()?;
            tx.execute(
                INSERT_STEP_SQL,
                params![
                    &plan.id,
                    position,
                    &step.step_id,
                    &step.title,
                    &step.summary,
                    tool_refs,
                    step_params,
                    step.estimated_duration.as_deref(),
                ],
            )
            .db_context("Failed to insert step")?;
        }

        tx.commit().db_context("Failed to commit transaction")
    }

    /// Retrieves a plan with its steps in order.
    pub fn get_plan(&self, id: &str) -> Result<Option<Plan>> {
        let metadata = self
            .connection
            .query_row(SELECT_PLAN_SQL, params![id], |row| {
                Ok(PlanMetadata {
                    goal: row.get(0)?,
                    environment: row.get(1)?,
                    author: row.get(2)?,
                    created_at: timestamp_at(row, 3)?,
                })
            })
            .optional()
            .db_context("Failed to query plan")?;

        let Some(metadata) = metadata else {
            return Ok(None);
        };

        Ok(Some(Plan {
            id: id.to_string(),
            steps: self.get_steps(id)?,
            metadata,
        }))
    }

    fn get_steps(&self, plan_id: &str) -> Result<Vec<Step>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_STEPS_SQL)
            .db_context("Failed to prepare query")?;

        let steps = stmt
            .query_map(params![plan_id], |row| {
                let params_text: Option<String> = row.get(4)?;
                let step_params = params_text
                    .map(|text| serde_json::from_str(&text))
                    .transpose()
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
                    })?;
                Ok(Step {
                    step_id: row.get(0)?,
                    title: row.get(1)?,
                    summary: row.get(2)?,
                    tool_refs: json_at(row, 3)?,
                    params: step_params,
                    estimated_duration: row.get(5)?,
                })
            })
            .db_context("Failed to query steps")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read steps")?;

        Ok(steps)
    }

    /// Deletes a plan; its steps go with it. Returns whether it existed.
    pub fn delete_plan(&mut self, id: &str) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_PLAN_SQL, params![id])
            .db_context("Failed to delete plan")?;
        Ok(deleted > 0)
    }

    /// Lists summaries of every stored plan, unordered.
    pub fn list_plans(&self) -> Result<Vec<PlanSummary>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_SUMMARIES_SQL)
            .db_context("Failed to prepare query")?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(PlanSummary {
                    id: row.get(0)?,
                    goal: row.get(1)?,
                    environment: row.get(2)?,
                    author: row.get(3)?,
                    created_at: timestamp_at(row, 4)?,
                    total_steps: row.get(5)?,
                })
            })
            .db_context("Failed to query plans")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read plans")?;

        Ok(summaries)
    }
}
