use anyhow::{Result, Context, anyhow};
use log::{error, warn, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};

use crate::app_config::Config;
use crate::errors::{AppError, ServiceError, TranslationError};
use crate::file_utils::{FileManager, TRACK_EXTENSION};
use crate::providers;
use crate::speech::{AudioSource, SpeechEngine, WhisperHttpEngine};
use crate::style::StyleOptions;
use crate::transcript_service::TranscriptService;
use crate::translation::{OrchestratorOptions, TranslationOrchestrator};

// @module: Application controller for subtitle generation

/// Name of the log file translation failures are appended to
pub const ISSUES_LOG_FILE: &str = "subgen.issues.log";

/// What a subtitle run produced for one input file
#[derive(Debug, Default)]
pub struct RunSummary {
    // @field: Track files written, source language first
    pub written: Vec<PathBuf>,

    // @field: Languages whose translation failed
    pub failed: Vec<(String, TranslationError)>,

    // @field: Whether the file was skipped because its track already exists
    pub skipped: bool,
}

/// Main application controller for subtitle generation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Transcription, rendering and translation boundary
    service: TranscriptService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let engine = WhisperHttpEngine::from_config(&config.speech)
            .context("Failed to create speech engine client")?
            .with_language(config.source_language.clone());

        let orchestrator = if config.target_languages.is_empty() {
            None
        } else {
            let provider = providers::create_provider(&config.translation)
                .context("Failed to create translation provider")?;
            Some(TranslationOrchestrator::new(provider, OrchestratorOptions::from_config(&config.translation)))
        };

        Ok(Self::with_parts(config, Arc::new(engine), orchestrator))
    }

    /// Create a controller around an existing engine and orchestrator
    pub fn with_parts(
        config: Config,
        engine: Arc<dyn SpeechEngine>,
        orchestrator: Option<TranslationOrchestrator>,
    ) -> Self {
        let service = TranscriptService::new(engine, orchestrator, config.speech.vad_filter);
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &TranscriptService {
        &self.service
    }

    /// Fail early when the translation provider rejects the configured credentials
    pub async fn preflight(&self) -> Result<()> {
        if self.config.target_languages.is_empty() {
            return Ok(());
        }
        self.service
            .check_translation()
            .await
            .with_context(|| format!("{} is not usable", self.config.translation.provider.display_name()))
    }

    /// Transcribe one file and write the transcript (and optionally the cue list) as JSON
    pub async fn transcribe(&self, input_file: PathBuf, output_dir: PathBuf, with_cues: bool) -> Result<Vec<PathBuf>> {
        let audio = Self::open_audio(&input_file).await?;
        let spinner = Self::spinner("Transcribing");

        let transcript = self.service.get_transcript(&audio).await;
        spinner.finish_and_clear();
        let transcript = transcript.with_context(|| format!("Failed to transcribe {:?}", input_file))?;

        let mut written = Vec::new();
        let transcript_path = FileManager::generate_output_path(&input_file, &output_dir, "transcript", "json");
        let json = serde_json::to_vec_pretty(&transcript).context("Failed to serialize transcript")?;
        FileManager::write_bytes(&transcript_path, &json)?;
        info!("Success: {}", transcript_path.display());
        written.push(transcript_path);

        if with_cues {
            let cues = self.service.get_cues(&audio, &self.config.style).await?;
            let cues_path = FileManager::generate_output_path(&input_file, &output_dir, "cues", "json");
            let json = serde_json::to_vec_pretty(&cues).context("Failed to serialize cues")?;
            FileManager::write_bytes(&cues_path, &json)?;
            info!("Success: {}", cues_path.display());
            written.push(cues_path);
        }

        Ok(written)
    }

    /// Run the subtitle workflow for one audio file
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<RunSummary> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite).await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();
        let style = self.config.style;
        let audio = Self::open_audio(input_file).await?;

        FileManager::ensure_dir(output_dir)?;

        // A known spoken language lets us skip before transcribing
        if let Some(language) = &self.config.source_language {
            let source_path = FileManager::generate_output_path(input_file, output_dir, language, TRACK_EXTENSION);
            if source_path.exists() && !force_overwrite {
                warn!("Skipping file, subtitles already exist (use -f to force overwrite)");
                return Ok(RunSummary { skipped: true, ..RunSummary::default() });
            }
        }

        let spinner = multi_progress.add(Self::spinner("Transcribing"));
        let transcript = self.service.get_transcript(&audio).await;
        spinner.finish_and_clear();
        let transcript = transcript.with_context(|| format!("Failed to transcribe {:?}", input_file))?;

        let source_path = FileManager::generate_output_path(input_file, output_dir, &transcript.language, TRACK_EXTENSION);
        if source_path.exists() && !force_overwrite {
            warn!("Skipping file, subtitles already exist (use -f to force overwrite)");
            return Ok(RunSummary { skipped: true, ..RunSummary::default() });
        }

        let mut summary = RunSummary::default();
        let track = self.service.write_subtitles(&audio, &style).await?;
        FileManager::write_bytes(&source_path, &track)?;
        info!("Success: {}", source_path.display());
        summary.written.push(source_path);

        let transcription_elapsed = start_time.elapsed();

        if !self.config.target_languages.is_empty() {
            let translation_start = Instant::now();
            let spinner = multi_progress.add(Self::spinner(&format!(
                "Translating into {}",
                self.config.target_languages.join(", ")
            )));

            let tracks = self.service
                .write_subtitles_multilang(&audio, &self.config.target_languages, &style)
                .await;
            spinner.finish_and_clear();

            for (language, result) in tracks? {
                match result {
                    Ok(bytes) => {
                        let path = FileManager::generate_output_path(input_file, output_dir, &language, TRACK_EXTENSION);
                        FileManager::write_bytes(&path, &bytes)?;
                        info!("Success: {}", path.display());
                        summary.written.push(path);
                    }
                    Err(e) => {
                        error!("Translation to {} failed: {}", language, e);
                        summary.failed.push((language, e));
                    }
                }
            }

            info!(
                "Transcription: {} - Translation: {}",
                Self::format_duration(transcription_elapsed),
                Self::format_duration(translation_start.elapsed())
            );
        } else {
            info!("Transcription: {}", Self::format_duration(transcription_elapsed));
        }

        if !summary.failed.is_empty() {
            self.write_issues(input_file, output_dir, &summary.failed);
        }

        Ok(summary)
    }

    /// Run the subtitle workflow for every audio file below a directory
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let audio_files = FileManager::find_audio_files(&input_dir)?;
        if audio_files.is_empty() {
            return Err(anyhow!("No audio files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(audio_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut success_count = 0;
        let mut skip_count = 0;
        let mut error_count = 0;

        for audio_file in &audio_files {
            let file_name = audio_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = audio_file.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());

            match self.run_with_progress(audio_file, &output_dir, &multi_progress, force_overwrite).await {
                Ok(summary) if summary.skipped => skip_count += 1,
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            success_count,
            skip_count,
            error_count
        );

        Ok(())
    }

    async fn open_audio(input_file: &Path) -> Result<AudioSource, AppError> {
        if !FileManager::file_exists(input_file) {
            return Err(AppError::File(format!("Input file does not exist: {:?}", input_file)));
        }
        if !FileManager::is_supported_audio(input_file) {
            return Err(AppError::File(format!("Unsupported audio format: {:?}", input_file)));
        }

        AudioSource::open(input_file)
            .await
            .map_err(|e| AppError::Service(ServiceError::SpeechEngine(e)))
    }

    /// Append failed languages to the issues log next to the tracks
    fn write_issues(&self, input_file: &Path, output_dir: &Path, failed: &[(String, TranslationError)]) {
        let log_path = output_dir.join(ISSUES_LOG_FILE);
        for (language, e) in failed {
            let line = format!("{:?} [{}] {}: {}", input_file, language, e.kind(), e);
            if let Err(e) = FileManager::append_to_log_file(&log_path, &line) {
                warn!("Failed to write issues log: {}", e);
                return;
            }
        }
        info!("Issues written to {}", log_path.display());
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Style with CLI overrides applied on top of the configured one
    pub fn style_with_overrides(
        base: StyleOptions,
        max_line_width: Option<usize>,
        max_line_count: Option<usize>,
        highlight_words: bool,
    ) -> StyleOptions {
        StyleOptions {
            max_line_width: max_line_width.unwrap_or(base.max_line_width),
            max_line_count: max_line_count.unwrap_or(base.max_line_count),
            highlight_words: highlight_words || base.highlight_words,
        }
    }
}
