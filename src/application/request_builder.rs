//! Upstream request bodies for the `:search` and `:answer` serving config
//! methods. Policy sub-objects are fixed and not configurable per request.

use serde::Serialize;

use crate::domain::resource_name::session_resource_path;
use crate::domain::{AgentInfo, SessionInfo};

pub const DEFAULT_MODEL_VERSION: &str = "gemini-2.0-flash-001/answer_gen/v1";

const AUTO: &str = "AUTO";
const MAX_EXTRACTIVE_ANSWER_COUNT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    pub session: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    pub query_expansion_spec: QueryExpansionSpec,
    pub spell_correction_spec: SpellCorrectionSpec,
    pub content_search_spec: ContentSearchSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryExpansionSpec {
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellCorrectionSpec {
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchSpec {
    pub extractive_content_spec: ExtractiveContentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveContentSpec {
    pub max_extractive_answer_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequestBody {
    pub session: String,
    pub query: AnswerQuery,
    pub answer_generation_spec: AnswerGenerationSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuery {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerGenerationSpec {
    pub ignore_adversarial_query: bool,
    pub ignore_non_answer_seeking_query: bool,
    pub ignore_low_relevant_content: bool,
    pub include_citations: bool,
    pub model_spec: ModelSpec,
    pub prompt_spec: PromptSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptSpec {
    pub preamble: String,
}

pub fn build_search_request(project_id: &str, agent_info: &AgentInfo) -> SearchRequestBody {
    SearchRequestBody {
        session: session_resource_path(
            project_id,
            &agent_info.engine_id,
            agent_info.session_id.as_deref(),
        ),
        query: agent_info.query.clone(),
        page_size: agent_info.page_size,
        query_expansion_spec: QueryExpansionSpec {
            condition: AUTO.to_string(),
        },
        spell_correction_spec: SpellCorrectionSpec {
            mode: AUTO.to_string(),
        },
        content_search_spec: ContentSearchSpec {
            extractive_content_spec: ExtractiveContentSpec {
                max_extractive_answer_count: MAX_EXTRACTIVE_ANSWER_COUNT,
            },
        },
    }
}

/// Answer request chained onto the session opened (or continued) by the
/// preceding search call.
pub fn build_answer_request(
    agent_info: &AgentInfo,
    session_info: &SessionInfo,
    model_version: &str,
) -> AnswerRequestBody {
    AnswerRequestBody {
        session: session_info.name.clone(),
        query: AnswerQuery {
            text: agent_info.query.clone(),
            query_id: session_info.query_id.clone(),
        },
        answer_generation_spec: AnswerGenerationSpec {
            ignore_adversarial_query: true,
            ignore_non_answer_seeking_query: true,
            ignore_low_relevant_content: true,
            include_citations: true,
            model_spec: ModelSpec {
                model_version: model_version.to_string(),
            },
            prompt_spec: PromptSpec {
                preamble: agent_info.prompt.clone(),
            },
        },
    }
}
