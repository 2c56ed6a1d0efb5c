/*!
 * # subgen - subtitles from speech
 *
 * A Rust library that turns time-stamped transcripts into WebVTT subtitle
 * tracks and translates them into several languages at once.
 *
 * ## Features
 *
 * - Transcribe audio through any Whisper-compatible HTTP server
 * - Lay segments out as cues under line width and line count limits
 * - Render standards-compliant WebVTT, with optional per-word timing markup
 * - Translate a transcript into many languages concurrently:
 *   - DeepL API
 *   - Anthropic API
 * - Per-language failure isolation and timeouts
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `segment`: Words, segments and transcripts
 * - `style`: Subtitle layout options
 * - `cue_builder`: Segments to cues
 * - `track_renderer`: Cues to WebVTT bytes
 * - `translation`: Multi-language translation:
 *   - `translation::orchestrator`: One concurrent job per language
 *   - `translation::cache`: Per-language memo of provider answers
 *   - `translation::concurrency`: Provider-specific limits
 * - `speech`: Speech-to-text engine boundary and HTTP client
 * - `transcript_service`: The boundary composing all of the above
 * - `providers`: Translation provider clients:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cue_builder;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod segment;
pub mod speech;
pub mod style;
pub mod track_renderer;
pub mod transcript_service;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cue_builder::{build_cues, Cue, Highlight};
pub use segment::{Segment, Transcript, TranscriptionInfo, Word};
pub use speech::{AudioSource, SpeechEngine, WhisperHttpEngine};
pub use style::StyleOptions;
pub use track_renderer::{render, render_to_bytes};
pub use transcript_service::TranscriptService;
pub use translation::{TranslationOrchestrator, TranslationResults};
pub use language_utils::{language_codes_match, normalize_target_language, get_language_name};
pub use errors::{AppError, ProviderError, RenderError, ServiceError, SpeechEngineError, TranslationError, ValidationError};
