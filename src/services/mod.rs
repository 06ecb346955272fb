pub mod gemini;
pub mod llm;
