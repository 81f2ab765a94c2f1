//! Prompt sent to the drafting oracle.

use super::oracle::OraclePrompt;
use crate::params::DraftPlan;

/// Tools advertised to the oracle unless configured otherwise.
pub const DEFAULT_TOOL_CATALOGUE: [&str; 5] = [
    "inbox.triage",
    "content.nightly.start",
    "leads.queue",
    "ops.report.daily",
    "vector.refresh",
];

pub(crate) fn build_prompt(request: &DraftPlan, tools: &[String]) -> OraclePrompt {
    let catalogue: String = tools.iter().map(|tool| format!("- {tool}\n")).collect();

    let system = format!(
        "You are an operations agent with access to these tools:\n\
         {catalogue}\n\
         Create a step-by-step plan to achieve: {goal}\n\
         Environment: {environment}\n\
         Author: {author}\n\n\
         Break this into 3-7 concrete steps. Each step should have a clear title, \
         a brief summary, the tool(s) it uses, and be actionable and measurable.\n\n\
         Return a JSON object with:\n\
         {{\n  \"steps\": [\n    {{\n      \"step_id\": \"step_1\",\n      \
         \"title\": \"Step title\",\n      \"summary\": \"What this step does\",\n      \
         \"mcp_tools\": [\"tool_name\"],\n      \"params\": {{}},\n      \
         \"estimated_duration\": \"5m\"\n    }}\n  ]\n}}",
        goal = request.goal,
        environment = request.environment,
        author = request.author,
    );
    let user = format!(
        "Create a plan for: {}\n\nEnvironment: {}",
        request.goal, request.environment
    );

    OraclePrompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_tools_and_goal() {
        let request = DraftPlan::new("Refresh the search index").with_environment("staging");
        let tools: Vec<String> = DEFAULT_TOOL_CATALOGUE.iter().map(ToString::to_string).collect();
        let prompt = build_prompt(&request, &tools);

        for tool in DEFAULT_TOOL_CATALOGUE {
            assert!(prompt.system.contains(&format!("- {tool}")));
        }
        assert!(prompt.system.contains("3-7 concrete steps"));
        assert!(prompt.user.contains("Refresh the search index"));
        assert!(prompt.user.contains("Environment: staging"));
    }
}
