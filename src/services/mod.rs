// Service exports
pub mod gemini;
pub mod supabase;

pub use gemini::{classify_failure, FailureKind, GeminiClient, GeminiError};
pub use supabase::{SupabaseClient, SupabaseError};
