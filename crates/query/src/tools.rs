//! ToolDispatcher - routes tool calls to façade operations

use crate::facade::QueryFacade;
use serde_json::Value;
use shared::{hub_tools, optional_str, required_str, HubError, Logger, Result, Tool};
use std::sync::Arc;

/// Tool-call entry point for the chat-completion layer
pub struct ToolDispatcher {
    facade: Arc<QueryFacade>,
    tools: Vec<Tool>,
    logger: Arc<dyn Logger>,
}

impl ToolDispatcher {
    pub fn new(facade: Arc<QueryFacade>, logger: Arc<dyn Logger>) -> Self {
        Self {
            facade,
            tools: hub_tools::all(),
            logger,
        }
    }

    /// Advertised tool definitions
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Run tool `name` with JSON `args` and return its JSON result
    pub async fn dispatch(&self, name: &str, args: &Value) -> Result<Value> {
        if self.get_tool(name).is_none() {
            return Err(HubError::usage(format!("unknown tool '{}'", name)));
        }
        if !args.is_object() && !args.is_null() {
            return Err(HubError::usage("tool arguments must be a JSON object"));
        }

        self.logger.debug(&format!("Dispatching tool '{}'", name), None);

        let result = match name {
            hub_tools::SEARCH_CONDITION => {
                let condition = required_str(args, "condition")?;
                serde_json::to_value(self.facade.search_condition(&condition).await?)?
            }
            hub_tools::FIND_LAW_FIRMS => {
                let specialty = optional_str(args, "specialty")?;
                let location = optional_str(args, "location")?;
                let firms = self
                    .facade
                    .get_law_firms(specialty.as_deref(), location.as_deref())
                    .await;
                serde_json::to_value(firms)?
            }
            hub_tools::GET_SETTLEMENT_DATA => {
                let condition = required_str(args, "condition")?;
                let state = optional_str(args, "state")?;
                let settlements = self
                    .facade
                    .get_settlement_data(&condition, state.as_deref())
                    .await?;
                serde_json::to_value(settlements)?
            }
            hub_tools::LIST_ARTICLES => serde_json::to_value(self.facade.get_all_articles().await)?,
            other => return Err(HubError::usage(format!("unknown tool '{}'", other))),
        };

        Ok(result)
    }
}
