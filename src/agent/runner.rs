//! Agent runner with tool calling loop.

use super::toolset::Toolset;
use crate::error::{Result, SpotifyMcpError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionObject,
};
use async_openai::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Agent whose tools are the union of the tools its toolsets advertise.
pub struct Agent {
    client: Client<OpenAIConfig>,
    model: String,
    instructions: String,
    max_iterations: usize,
    tools: Vec<ChatCompletionTool>,
    routes: HashMap<String, Arc<dyn Toolset>>,
}

impl Agent {
    /// Create an agent over `toolsets`. Fails if two toolsets advertise the
    /// same tool name.
    pub fn new(
        client: Client<OpenAIConfig>,
        model: &str,
        instructions: &str,
        toolsets: &[Arc<dyn Toolset>],
    ) -> Result<Self> {
        let mut routes: HashMap<String, Arc<dyn Toolset>> = HashMap::new();
        let mut tools = Vec::new();

        for toolset in toolsets {
            for definition in toolset.tools() {
                if let Some(existing) = routes.get(&definition.name) {
                    return Err(SpotifyMcpError::Agent(format!(
                        "Tool '{}' is offered by both '{}' and '{}'",
                        definition.name,
                        existing.name(),
                        toolset.name()
                    )));
                }
                routes.insert(definition.name.clone(), toolset.clone());

                tools.push(ChatCompletionTool {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name: definition.name.clone(),
                        description: (!definition.description.is_empty())
                            .then(|| definition.description.clone()),
                        parameters: Some(definition.input_schema.clone()),
                        strict: None,
                    },
                });
            }
        }

        Ok(Self {
            client,
            model: model.to_string(),
            instructions: instructions.to_string(),
            max_iterations: 15,
            tools,
            routes,
        })
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Number of tools available to the model.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Run the agent on a single user query.
    pub async fn run(&self, query: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.instructions.clone())
                .build()
                .map_err(|e| SpotifyMcpError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(query)
                .build()
                .map_err(|e| SpotifyMcpError::Agent(e.to_string()))?
                .into(),
        ];

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(SpotifyMcpError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request.model(&self.model).messages(messages.clone());
            if !self.tools.is_empty() {
                request.tools(self.tools.clone());
            }
            let request = request
                .build()
                .map_err(|e| SpotifyMcpError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| SpotifyMcpError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| SpotifyMcpError::Agent("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.clone().unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    })
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| SpotifyMcpError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await?;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| SpotifyMcpError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Route a tool call to the toolset that advertised it. Errors reaching
    /// the toolset propagate; anything the model got wrong goes back to it
    /// as text.
    async fn execute_tool_call(
        &self,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> Result<ToolCallRecord> {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match self.routes.get(name) {
            None => format!("Unknown tool: {}", name),
            Some(toolset) => match parse_arguments(arguments) {
                Ok(args) => toolset.call_tool(name, args).await?,
                Err(e) => format!("Failed to parse tool arguments: {}", e),
            },
        };

        Ok(ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        })
    }
}

fn parse_arguments(raw: &str) -> serde_json::Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    /// JSON arguments as sent by the model.
    pub arguments: String,
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
