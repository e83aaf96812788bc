use std::collections::HashMap;

pub struct TemplateEngine;

impl TemplateEngine {
    // Templates embedded at compile time
    const AGENT_SYSTEM_PROMPT: &'static str = include_str!("../templates/agent_system_prompt.txt");
    const MCP_AGENT_SYSTEM_PROMPT: &'static str = include_str!("../templates/mcp_agent_system_prompt.txt");

    #[must_use]
    pub fn render(
        template: &str,
        variables: &HashMap<&str, &str>,
    ) -> String {
        let mut result = template.to_string();

        for (key, value) in variables {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }

        result
    }

    /// Render the fixed-tool-set agent preamble for the acting user.
    #[must_use]
    pub fn render_agent_prompt(user_id: &str) -> String {
        let mut variables = HashMap::new();
        variables.insert("USER_ID", user_id);

        Self::render(Self::AGENT_SYSTEM_PROMPT, &variables)
    }

    /// Render the discovered-tool-set agent preamble, which mandates that any
    /// arbitrary-query tool use echoes the query text in the response.
    #[must_use]
    pub fn render_mcp_agent_prompt(user_id: &str) -> String {
        let mut variables = HashMap::new();
        variables.insert("USER_ID", user_id);

        Self::render(Self::MCP_AGENT_SYSTEM_PROMPT, &variables)
    }
}
