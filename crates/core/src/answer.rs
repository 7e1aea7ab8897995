use crate::traits::ChatModel;
use crate::{LlmError, RetrievedChunk};

/// Grounding policy sent verbatim as the system message.
pub const SYSTEM_PROMPT: &str = "You answer only from the CONTEXT. \
If the CONTEXT does not contain the answer, say that the notes have no information on it and ask the user to clarify.\n\n\
Strictness requirements:\n\
- Do not add facts, commands, flags or steps that are not explicitly present in the CONTEXT\n\
- If the user asks for a command or an example that is not in the CONTEXT, say plainly that the notes do not contain it\n\n\
Format requirements:\n\
- Return Telegram HTML only (no Markdown)\n\
- Use <b> for headings, <code> for inline code, <pre> for code blocks\n\
- Do not append a list of sources to the answer\n";

/// Joins ranked chunks into one context block, each labelled with its file.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("SOURCE: {}\n{}", chunk.file, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct AnswerComposer<M>
where
    M: ChatModel,
{
    model: M,
    system_prompt: String,
}

impl<M> AnswerComposer<M>
where
    M: ChatModel,
{
    pub fn new(model: M) -> Self {
        Self::with_system_prompt(model, SYSTEM_PROMPT)
    }

    pub fn with_system_prompt(model: M, system_prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Asks the model to answer `question` from `chunks`, in the order given.
    pub async fn compose(&self, question: &str, chunks: &[RetrievedChunk]) -> Result<String, LlmError> {
        let context = build_context(chunks);
        self.model
            .complete(&self.system_prompt, question, &context)
            .await
    }
}
