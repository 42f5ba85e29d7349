use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::JSONSchema;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::error::AppError;
use crate::features::comparison::dto::ComparisonResult;
use crate::features::comparison::helpers::{
    ComparisonFields, comparison_output_schema, compile_output_schema, parse_comparison_output,
    single_outlet_output_schema,
};
use crate::features::comparison::prompt::{
    PromptContext, build_prompt, build_single_outlet_prompt,
};
use crate::features::generation::GeminiClient;
use crate::features::news::Outlet;
use crate::features::topics::Topic;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        GeminiClient::generate(self, prompt).await
    }
}

pub struct ComparisonService {
    generator: Arc<dyn TextGenerator>,
    liberal_name: String,
    conservative_name: String,
    max_prompt_chars: usize,
    output_schema: JSONSchema,
    liberal_only_schema: JSONSchema,
    conservative_only_schema: JSONSchema,
}

impl ComparisonService {
    pub fn new(config: &AppConfig, generator: Arc<dyn TextGenerator>) -> Result<Self, AppError> {
        Ok(Self {
            generator,
            liberal_name: config.liberal.name.clone(),
            conservative_name: config.conservative.name.clone(),
            max_prompt_chars: config.max_prompt_chars,
            output_schema: compile_output_schema(&comparison_output_schema())?,
            liberal_only_schema: compile_output_schema(&single_outlet_output_schema(
                Outlet::Liberal,
            ))?,
            conservative_only_schema: compile_output_schema(&single_outlet_output_schema(
                Outlet::Conservative,
            ))?,
        })
    }

    pub async fn compare(&self, topic: &Topic) -> Result<ComparisonResult, AppError> {
        if !topic.is_comparable() {
            return Err(AppError::generation(format!(
                "topic \"{}\" needs at least one article from each outlet",
                topic.label
            )));
        }

        let prompt = build_prompt(topic, &self.prompt_context())?;
        let fields = self.request(topic, &prompt, &self.output_schema).await?;

        info!(
            target: "comparison",
            topic = %topic.label,
            liberal_articles = topic.liberal_articles.len(),
            conservative_articles = topic.conservative_articles.len(),
            prompt_chars = prompt.chars().count(),
            "comparison ready"
        );

        Ok(ComparisonResult {
            topic: topic.clone(),
            liberal_summary: fields.liberal_summary,
            conservative_summary: fields.conservative_summary,
            bias_notes: fields.bias_notes,
            blind_spots: fields.blind_spots,
            unavailable_outlet: None,
        })
    }

    /// Summary, framing and blind spots for a topic only one outlet covered,
    /// used while the other outlet cannot be reached.
    pub async fn analyze_single_outlet(&self, topic: &Topic) -> Result<ComparisonResult, AppError> {
        let Some(outlet) = topic.single_outlet() else {
            return Err(AppError::generation(format!(
                "topic \"{}\" needs coverage from exactly one outlet",
                topic.label
            )));
        };
        let missing = outlet.other();

        let prompt = build_single_outlet_prompt(topic, &self.prompt_context())?;
        let schema = match outlet {
            Outlet::Liberal => &self.liberal_only_schema,
            Outlet::Conservative => &self.conservative_only_schema,
        };
        let mut fields = self.request(topic, &prompt, schema).await?;

        let unavailable = format!(
            "Unavailable: no coverage from {} could be fetched for this run.",
            self.outlet_name(missing)
        );
        match missing {
            Outlet::Liberal => fields.liberal_summary = unavailable,
            Outlet::Conservative => fields.conservative_summary = unavailable,
        }

        info!(
            target: "comparison",
            topic = %topic.label,
            outlet = outlet.as_str(),
            articles = topic.article_count(),
            prompt_chars = prompt.chars().count(),
            "single-outlet analysis ready"
        );

        Ok(ComparisonResult {
            topic: topic.clone(),
            liberal_summary: fields.liberal_summary,
            conservative_summary: fields.conservative_summary,
            bias_notes: fields.bias_notes,
            blind_spots: fields.blind_spots,
            unavailable_outlet: Some(missing),
        })
    }

    fn prompt_context(&self) -> PromptContext<'_> {
        PromptContext {
            liberal_name: &self.liberal_name,
            conservative_name: &self.conservative_name,
            max_chars: self.max_prompt_chars,
        }
    }

    fn outlet_name(&self, outlet: Outlet) -> &str {
        match outlet {
            Outlet::Liberal => &self.liberal_name,
            Outlet::Conservative => &self.conservative_name,
        }
    }

    async fn request(
        &self,
        topic: &Topic,
        prompt: &str,
        schema: &JSONSchema,
    ) -> Result<ComparisonFields, AppError> {
        let raw = self.generator.generate(prompt).await.inspect_err(|error| {
            warn!(target: "comparison", %error, topic = %topic.label, "generation failed");
        })?;

        parse_comparison_output(schema, &raw).inspect_err(|error| {
            warn!(target: "comparison", %error, topic = %topic.label, "malformed model output");
        })
    }
}
