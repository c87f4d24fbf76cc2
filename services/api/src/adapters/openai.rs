//! services/api/src/adapters/openai.rs
//!
//! This module contains the adapter for the study-aid LLM features.
//! It implements the `StudyAiService` port from the `core` crate on top of an
//! OpenAI-compatible chat-completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use chrono::Utc;
use studyspark_core::{
    dashboard::format_date,
    domain::{ChatRole, ChatTurn, FlashcardDraft, NewStudyPlan, QuestionDraft, QuestionType, SummaryContent},
    generation::{self, CHAT_FALLBACK, GENERATION_CONTENT_LIMIT, SUMMARY_CONTENT_LIMIT},
    ports::{PortError, PortResult, StudyAiService},
};
use tracing::{debug, info};

const SUMMARY_TEMPERATURE: f32 = 0.3;
const CREATIVE_TEMPERATURE: f32 = 0.7;

const SUMMARY_INSTRUCTIONS: &str = r#"You are an expert study assistant. Turn the student's notes into a structured study summary.

Respond with a single JSON object with exactly these keys:
- "keyPoints": array of short strings, the most important takeaways in order
- "definitions": array of objects {"term": string, "definition": string}
- "formulas": array of strings, every formula or equation worth memorising (empty if none)
- "mainConcepts": array of strings naming the core concepts
- "fullSummary": string, a clear paragraph-length summary of the whole text

Only use information from the notes. Do not wrap the JSON in Markdown."#;

const CHAT_PERSONA: &str = r#"You are StudySpark, a friendly and patient AI tutor.
Help students understand concepts, work through problems step by step and prepare for exams.
Explain things simply, use examples when they help, and check understanding with a short follow-up question when appropriate.
If you are not sure about something, say so instead of guessing."#;

const FLASHCARD_INSTRUCTIONS: &str = r#"You create flashcards for active recall practice.
Each card has a concise question or term on the "front" and a clear, complete answer on the "back".
Rate each card's "difficulty" as "easy", "medium" or "hard".
Respond with a JSON object of the form {"flashcards": [{"front": string, "back": string, "difficulty": string}]}."#;

const QUESTION_INSTRUCTIONS: &str = r#"You write practice exam questions from study material.
Every question has a "type" ("mcq", "short", "long" or "numerical"), the "question" text, the correct "answer",
a short "explanation" and a "difficulty" ("easy", "medium" or "hard").
Multiple choice questions also include an "options" array of 4 strings, one of which is the answer.
Respond with a JSON object of the form {"questions": [...]}."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StudyAiService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStudyAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiStudyAdapter {
    /// Creates a new `OpenAiStudyAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Sends one chat completion and returns the first choice's text, if any.
    /// `json_mode` asks the provider to constrain the reply to a JSON object.
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        temperature: f32,
        json_mode: bool,
        action: &str,
    ) -> PortResult<String> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .n(1);
        if json_mode {
            args.response_format(ResponseFormat::JsonObject);
        }
        let request = args
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(format!("Failed to {}: {}", action, e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!("LLM reply for '{}': {} chars", action, content.len());
        Ok(content)
    }
}

fn system_message(text: impl Into<String>) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(text.into())
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .into())
}

fn user_message(text: impl Into<String>) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(text.into())
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .into())
}

fn assistant_message(text: impl Into<String>) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestAssistantMessageArgs::default()
        .content(text.into())
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .into())
}

fn unreadable(action: &str, e: serde_json::Error) -> PortError {
    PortError::Provider(format!("Failed to {}: reply was not valid JSON ({})", action, e))
}

//=========================================================================================
// `StudyAiService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyAiService for OpenAiStudyAdapter {
    async fn summarize(&self, content: &str, title: &str) -> PortResult<SummaryContent> {
        const ACTION: &str = "summarize content";
        let notes = generation::truncate_chars(content, SUMMARY_CONTENT_LIMIT);

        let messages = vec![
            system_message(SUMMARY_INSTRUCTIONS)?,
            user_message(format!("TITLE: {}\n\nNOTES:\n{}", title, notes))?,
        ];
        let raw = self
            .complete(messages, SUMMARY_TEMPERATURE, true, ACTION)
            .await?;

        generation::parse_summary(&raw).map_err(|e| unreadable(ACTION, e))
    }

    async fn chat(&self, message: &str, history: &[ChatTurn]) -> PortResult<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(system_message(CHAT_PERSONA)?);
        for turn in history {
            messages.push(match turn.role {
                ChatRole::User => user_message(turn.content.as_str())?,
                ChatRole::Assistant => assistant_message(turn.content.as_str())?,
            });
        }
        messages.push(user_message(message)?);

        let reply = self
            .complete(messages, CREATIVE_TEMPERATURE, false, "chat")
            .await?;
        let reply = reply.trim();
        if reply.is_empty() {
            Ok(CHAT_FALLBACK.to_string())
        } else {
            Ok(reply.to_string())
        }
    }

    async fn generate_flashcards(
        &self,
        content: &str,
        count: usize,
    ) -> PortResult<Vec<FlashcardDraft>> {
        const ACTION: &str = "generate flashcards";
        let count = generation::clamp_flashcard_count(count);
        if count == 0 {
            return Ok(Vec::new());
        }
        let material = generation::truncate_chars(content, GENERATION_CONTENT_LIMIT);

        let messages = vec![
            system_message(FLASHCARD_INSTRUCTIONS)?,
            user_message(format!(
                "Create exactly {} flashcards from this material:\n\n{}",
                count, material
            ))?,
        ];
        let raw = self
            .complete(messages, CREATIVE_TEMPERATURE, true, ACTION)
            .await?;

        let cards = generation::parse_flashcards(&raw, count).map_err(|e| unreadable(ACTION, e))?;
        info!("Generated {} of {} requested flashcards", cards.len(), count);
        Ok(cards)
    }

    async fn generate_questions(
        &self,
        content: &str,
        types: &[QuestionType],
        count: usize,
    ) -> PortResult<Vec<QuestionDraft>> {
        const ACTION: &str = "generate questions";
        let count = generation::clamp_question_count(count);
        if count == 0 {
            return Ok(Vec::new());
        }
        let types = if types.is_empty() {
            &[QuestionType::Short][..]
        } else {
            types
        };
        let wanted = types
            .iter()
            .map(QuestionType::prompt_description)
            .collect::<Vec<_>>()
            .join(", ");
        let material = generation::truncate_chars(content, GENERATION_CONTENT_LIMIT);

        let messages = vec![
            system_message(QUESTION_INSTRUCTIONS)?,
            user_message(format!(
                "Write exactly {} questions mixing these kinds: {}.\n\nMATERIAL:\n{}",
                count, wanted, material
            ))?,
        ];
        let raw = self
            .complete(messages, CREATIVE_TEMPERATURE, true, ACTION)
            .await?;

        let questions =
            generation::parse_questions(&raw, types, count).map_err(|e| unreadable(ACTION, e))?;
        info!("Generated {} of {} requested questions", questions.len(), count);
        Ok(questions)
    }

    async fn generate_study_plan(
        &self,
        prompt: &str,
        subjects: &[String],
    ) -> PortResult<NewStudyPlan> {
        const ACTION: &str = "generate study plan";
        let today = Utc::now().date_naive();
        let subject_hint = if subjects.is_empty() {
            "The student has not set up any subjects yet, so choose sensible subject names yourself.".to_string()
        } else {
            format!(
                "Use these subject names for the \"subject\" field of each task: {}.",
                subjects.join(", ")
            )
        };

        let instructions = format!(
            r#"You are a study planner. Today's date is {today}.
{subject_hint}
Build a realistic, balanced schedule starting no earlier than today.
Respond with a JSON object:
{{"title": string, "description": string, "startDate": "YYYY-MM-DD", "endDate": "YYYY-MM-DD",
 "tasks": [{{"topic": string, "subject": string, "duration": minutes as a number,
            "priority": "high" | "medium" | "low", "date": "YYYY-MM-DD", "timeSlot": "HH:MM-HH:MM"}}]}}"#,
            today = format_date(today),
            subject_hint = subject_hint,
        );

        let messages = vec![system_message(instructions)?, user_message(prompt)?];
        let raw = self
            .complete(messages, CREATIVE_TEMPERATURE, true, ACTION)
            .await?;

        generation::parse_study_plan(&raw, today).map_err(|e| unreadable(ACTION, e))
    }
}
