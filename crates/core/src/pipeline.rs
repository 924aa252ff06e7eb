use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::chunker::split_into_chunks;
use crate::config::{PipelineConfig, RetryPolicy};
use crate::error::{Error, Result, Stage};
use crate::generator::{GroqGenerator, SummaryGenerator};
use crate::merge::merge_partials;
use crate::provider::Provider;
use crate::transcript::{TranscriptSource, YoutubeCaptionSource};
use crate::types::{Chunk, PartialSummary, VideoSummary};
use crate::video_id::extract_video_id;

/// Drives one URL through the whole transcript-to-summary pipeline:
/// id resolution, caption fetch, chunking, bounded-parallel generation
/// with retry, timestamp resolution, and the final merge.
///
/// Invocations share no mutable state; a `Pipeline` can serve any number
/// of concurrent `run` calls.
pub struct Pipeline {
    source: Arc<dyn TranscriptSource>,
    generator: Arc<dyn SummaryGenerator>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        generator: Arc<dyn SummaryGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            generator,
            config,
        }
    }

    /// Production wiring: YouTube captions in, the given provider's
    /// generation endpoint out.
    pub fn for_provider(provider: Provider, config: PipelineConfig) -> Result<Self> {
        let source = YoutubeCaptionSource::new()?;
        let generator = GroqGenerator::new(provider, config.call_timeout)?;
        Ok(Self::new(Arc::new(source), Arc::new(generator), config))
    }

    /// Summarize the video behind `url`, writing the digest in
    /// `language`.
    pub async fn run(&self, url: &str, language: &str) -> Result<VideoSummary> {
        self.run_with_cancel(url, language, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but abortable. A cancelled invocation
    /// yields [`Error::Cancelled`] and discards all chunk results;
    /// outstanding generation calls are dropped with the future.
    pub async fn run_with_cancel(
        &self,
        url: &str,
        language: &str,
        cancel: CancellationToken,
    ) -> Result<VideoSummary> {
        let limit = self.config.overall_timeout;
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            outcome = tokio::time::timeout(limit, self.run_inner(url, language)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => Err(Error::DeadlineExceeded { limit }),
                }
            }
        }
    }

    async fn run_inner(&self, url: &str, language: &str) -> Result<VideoSummary> {
        tracing::info!(stage = %Stage::ResolvingId, url, "pipeline started");
        let video_id = extract_video_id(url)?;

        tracing::info!(stage = %Stage::FetchingTranscript, video_id, language);
        let transcript = self.source.fetch_transcript(&video_id, language).await?;
        let video_title = self.source.fetch_title(&video_id).await;

        tracing::info!(
            stage = %Stage::Chunking,
            video_id,
            segments = transcript.segments.len(),
            chars = transcript.char_count(),
        );
        let chunks = split_into_chunks(&transcript, self.config.max_chunk_chars);
        if chunks.is_empty() {
            return Err(Error::TranscriptUnavailable {
                video_id,
                language: language.to_string(),
            });
        }

        tracing::info!(stage = %Stage::Summarizing, video_id, chunks = chunks.len());
        let partials = self
            .summarize_chunks(&chunks, language, video_title.as_deref())
            .await?;

        tracing::info!(stage = %Stage::Merging, video_id);
        let duration_seconds = transcript.duration_seconds().map(|d| d.round() as u64);
        let summary = merge_partials(
            &partials,
            &chunks,
            &video_id,
            video_title.as_deref(),
            duration_seconds,
        );

        tracing::info!(
            video_id,
            key_points = summary.key_points.len(),
            topics = summary.topics.len(),
            "pipeline finished"
        );
        Ok(summary)
    }

    /// Fan out generation calls under the worker limit and fan the
    /// results back in by chunk index.
    ///
    /// Each task writes into its own slot, so the merge input is ordered
    /// by chunk position regardless of completion order. Fail-fast: the
    /// first chunk that exhausts its retries aborts the rest.
    async fn summarize_chunks(
        &self,
        chunks: &[Chunk],
        language: &str,
        video_title: Option<&str>,
    ) -> Result<Vec<PartialSummary>> {
        let semaphore = Arc::new(Semaphore::new(self.config.worker_limit.max(1)));
        let mut tasks: JoinSet<Result<(usize, PartialSummary)>> = JoinSet::new();

        for chunk in chunks {
            let generator = Arc::clone(&self.generator);
            let semaphore = Arc::clone(&semaphore);
            let retry = self.config.retry.clone();
            let chunk = chunk.clone();
            let total_parts = chunks.len();
            let language = language.to_string();
            let video_title = video_title.map(str::to_string);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Cancelled)?;
                let index = chunk.index;
                let partial = summarize_with_retry(
                    generator.as_ref(),
                    &chunk,
                    total_parts,
                    &language,
                    video_title.as_deref(),
                    &retry,
                )
                .await?;
                Ok((index, partial))
            });
        }

        let mut slots: Vec<Option<PartialSummary>> = chunks.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((index, partial))) => {
                    slots[index] = Some(partial);
                }
                Ok(Err(err)) => {
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) if join_err.is_cancelled() => {
                    return Err(Error::Cancelled);
                }
                Err(join_err) => {
                    std::panic::resume_unwind(join_err.into_panic());
                }
            }
        }

        let partials: Vec<PartialSummary> = slots.into_iter().flatten().collect();
        debug_assert_eq!(partials.len(), chunks.len());
        Ok(partials)
    }
}

/// Run one chunk's generation call under the retry policy.
///
/// Transient failures (rate limiting, transport timeouts) are retried
/// with exponential backoff; a parse failure is a stable defect and is
/// escalated immediately. Either way the terminal error is wrapped into
/// [`Error::Summarization`] tagged with the chunk index.
async fn summarize_with_retry(
    generator: &dyn SummaryGenerator,
    chunk: &Chunk,
    total_parts: usize,
    language: &str,
    video_title: Option<&str>,
    retry: &RetryPolicy,
) -> Result<PartialSummary> {
    let mut attempt = 1u32;
    loop {
        match generator
            .summarize(chunk, total_parts, language, video_title)
            .await
        {
            Ok(partial) => return Ok(partial),
            Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                let delay = retry.delay_for(attempt);
                tracing::warn!(
                    chunk_index = chunk.index,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "chunk generation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(
                    chunk_index = chunk.index,
                    attempt,
                    error = %err,
                    "chunk generation failed"
                );
                return Err(Error::Summarization {
                    chunk_index: chunk.index,
                    source: Box::new(err),
                });
            }
        }
    }
}
