/*!
 * Transcript translation.
 *
 * - `orchestrator`: Fans a transcript out to one job per target language
 * - `cache`: Per-language memo of provider answers
 * - `concurrency`: Provider-specific job limits and timeouts
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::concurrency::ProviderProfile;
pub use self::orchestrator::{OrchestratorOptions, TranslationOrchestrator, TranslationResults};

// Submodules
pub mod cache;
pub mod concurrency;
pub mod orchestrator;
