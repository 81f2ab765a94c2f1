//! Display implementations for domain models.
//!
//! Output is markdown, rendered by the CLI for the terminal.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{Phase, Plan, PlanSummary, RunOutcome, Step, StepUpdate};
use crate::webhook::{DeliveryOutcome, FanoutReport};

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Goal: {}", self.metadata.goal)?;
        writeln!(f, "- Environment: {}", self.metadata.environment)?;
        writeln!(f, "- Author: {}", self.metadata.author)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.metadata.created_at))?;

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        for (index, step) in self.steps.iter().enumerate() {
            step.fmt_step(f, Some(index + 1))?;
        }
        Ok(())
    }
}

impl Step {
    fn fmt_step(&self, f: &mut fmt::Formatter<'_>, position: Option<usize>) -> fmt::Result {
        match position {
            Some(position) => writeln!(f, "### {position}. {} (`{}`)", self.title, self.step_id)?,
            None => writeln!(f, "### {} (`{}`)", self.title, self.step_id)?,
        }
        writeln!(f)?;

        if !self.summary.is_empty() {
            writeln!(f, "{}", self.summary)?;
            writeln!(f)?;
        }

        if !self.tool_refs.is_empty() {
            let tools: Vec<String> = self.tool_refs.iter().map(|t| format!("`{t}`")).collect();
            writeln!(f, "- Tools: {}", tools.join(", "))?;
        }
        if let Some(estimate) = &self.estimated_duration {
            writeln!(f, "- Estimate: {estimate}")?;
        }
        if let Some(params) = self.params.as_ref().filter(|p| !p.is_empty()) {
            let json = serde_json::to_string(params).map_err(|_| fmt::Error)?;
            writeln!(f, "- Params: `{json}`")?;
        }
        if !self.tool_refs.is_empty() || self.estimated_duration.is_some() || self.params.is_some() {
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_step(f, None)
    }
}

impl fmt::Display for StepUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} **{}** `{}` {}: {}",
            self.phase.icon(),
            self.title,
            self.step_id,
            self.phase,
            self.summary
        )
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.goal, self.id)?;
        writeln!(f)?;
        writeln!(f, "- **Environment**: {}", self.environment)?;
        writeln!(f, "- **Author**: {}", self.author)?;
        writeln!(f, "- **Steps**: {}", self.total_steps)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Succeeded { plan_id, steps } => {
                writeln!(f, "✅ Plan {plan_id} succeeded through all {steps} steps.")
            }
            RunOutcome::Failed {
                plan_id,
                step_id,
                position,
                reason,
            } => writeln!(
                f,
                "❌ Plan {plan_id} failed at step {position} (`{step_id}`): {reason}"
            ),
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Delivered { status } => write!(f, "delivered (HTTP {status})"),
            DeliveryOutcome::Rejected { status } => write!(f, "rejected (HTTP {status})"),
            DeliveryOutcome::Unreachable { reason } => write!(f, "unreachable ({reason})"),
        }
    }
}

impl fmt::Display for FanoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(key) = self.idempotency_key else {
            return writeln!(f, "No webhooks subscribed to {}.", self.channel);
        };

        writeln!(
            f,
            "Fan-out to {}: {} delivered, {} failed",
            self.channel,
            self.delivered(),
            self.failed()
        )?;
        writeln!(f)?;
        writeln!(f, "- Idempotency key: `{key}`")?;
        for delivery in &self.deliveries {
            writeln!(f, "- {}: {}", delivery.endpoint, delivery.outcome)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use reqwest::Url;
    use uuid::Uuid;

    use super::*;
    use crate::models::PlanMetadata;
    use crate::webhook::Delivery;

    fn plan() -> Plan {
        Plan {
            id: "plan_1".into(),
            steps: vec![
                Step::new("step_1", "Triage")
                    .with_summary("Sort the inbox")
                    .with_tools(["inbox.triage"])
                    .with_estimate("5m"),
                Step::new("step_2", "Report"),
            ],
            metadata: PlanMetadata {
                goal: "Morning routine".into(),
                environment: "production".into(),
                author: "U1".into(),
                created_at: Timestamp::from_second(1_640_995_200).unwrap(),
            },
        }
    }

    #[test]
    fn test_plan_display() {
        let output = plan().to_string();
        assert!(output.starts_with("# plan_1\n"));
        assert!(output.contains("- Goal: Morning routine"));
        assert!(output.contains("### 1. Triage (`step_1`)"));
        assert!(output.contains("- Tools: `inbox.triage`"));
        assert!(output.contains("- Estimate: 5m"));
        assert!(output.contains("### 2. Report (`step_2`)"));
    }

    #[test]
    fn test_step_update_display() {
        let plan = plan();
        let update = StepUpdate::failed(&plan.id, &plan.steps[0], "inbox.triage", "HTTP 500");
        assert_eq!(
            update.to_string(),
            "❌ **Triage** `step_1` failed: Failed: HTTP 500\n"
        );
    }

    #[test]
    fn test_run_outcome_display() {
        let failed = RunOutcome::Failed {
            plan_id: "plan_1".into(),
            step_id: "step_2".into(),
            position: 2,
            reason: "timeout".into(),
        };
        assert!(failed.to_string().contains("failed at step 2 (`step_2`): timeout"));

        let succeeded = RunOutcome::Succeeded {
            plan_id: "plan_1".into(),
            steps: 2,
        };
        assert!(succeeded.to_string().contains("succeeded through all 2 steps"));
    }

    #[test]
    fn test_fanout_report_display() {
        let skipped = FanoutReport {
            channel: "#quiet".into(),
            idempotency_key: None,
            deliveries: Vec::new(),
        };
        assert_eq!(skipped.to_string(), "No webhooks subscribed to #quiet.\n");

        let sent = FanoutReport {
            channel: "#ops".into(),
            idempotency_key: Some(Uuid::nil()),
            deliveries: vec![Delivery {
                endpoint: Url::parse("https://hooks.example.com/a").unwrap(),
                outcome: DeliveryOutcome::Rejected { status: 502 },
            }],
        };
        let output = sent.to_string();
        assert!(output.contains("0 delivered, 1 failed"));
        assert!(output.contains("https://hooks.example.com/a: rejected (HTTP 502)"));
    }
}
