//! Agent controller
//!
//! Owns the persona's background work: a comment on every new post, and a
//! polling loop that answers comments mentioning or addressed to the persona.
//!
//! Duplicate replies are prevented twice. An in-memory set remembers the
//! candidates this process already handled, and before answering the store
//! is asked whether the persona already replied to the same author on the
//! same post after the candidate. The second check survives restarts, which
//! is what lets the watermark start in the past.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use board_common::AgentConfig;
use board_core::{
    agent_placement, Author, Comment, CommentRepository, CommentTree, DomainError, Post,
    PostRepository, RepoResult, Snowflake, SnowflakeGenerator,
};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashSet;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use super::generator::{GenerationRequest, ReplyGenerator};
use super::mention::MentionMatcher;
use super::prompt::{post_prompt, thread_prompt};

/// Comments fetched per page while polling
const POLL_BATCH: i64 = 100;

/// Every poll re-reads this much time before the watermark, picking up
/// comments whose timestamp was taken before a newer comment was stored
const SCAN_OVERLAP_SECS: i64 = 5;

/// Ancestors included as conversation context
const CONTEXT_HOPS: usize = 5;

/// Result of one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Comments read since the watermark
    pub scanned: usize,
    /// Comments that mention or address the persona
    pub candidates: usize,
    pub replied: usize,
    pub skipped: usize,
}

/// What happened to one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Replied,
    Skipped,
}

struct PollState {
    /// Newest creation time scanned so far
    watermark: DateTime<Utc>,
    last_reset: Instant,
}

/// The persona's background participant
pub struct AgentController {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    generator: Arc<dyn ReplyGenerator>,
    ids: Arc<SnowflakeGenerator>,

    persona: Author,
    persona_id: Snowflake,
    instructions: String,
    matcher: MentionMatcher,

    poll_interval: Duration,
    dedup_reset_interval: Duration,
    max_dedup_entries: usize,

    state: Mutex<PollState>,
    handled: DashSet<Snowflake>,
    running: AtomicBool,
    shutdown: Notify,
}

impl AgentController {
    /// Create a stopped controller; the watermark starts `startup_lookback` ago
    pub fn new(
        config: &AgentConfig,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        generator: Arc<dyn ReplyGenerator>,
        ids: Arc<SnowflakeGenerator>,
    ) -> Self {
        let persona = &config.persona;
        let persona_id = Snowflake::new(persona.id);
        let lookback = TimeDelta::from_std(config.startup_lookback()).unwrap_or(TimeDelta::zero());

        Self {
            posts,
            comments,
            generator,
            ids,
            persona: Author::user(persona_id, persona.name.clone(), persona.avatar.clone()),
            persona_id,
            instructions: persona.instructions.clone(),
            matcher: MentionMatcher::new(persona.mention_names()),
            poll_interval: config.poll_interval(),
            dedup_reset_interval: config.dedup_reset_interval(),
            max_dedup_entries: config.max_dedup_entries.max(1),
            state: Mutex::new(PollState {
                watermark: Utc::now() - lookback,
                last_reset: Instant::now(),
            }),
            handled: DashSet::new(),
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    /// Persona user id
    pub fn persona_id(&self) -> Snowflake {
        self.persona_id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the polling loop; `None` if it is already running
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            return None;
        }

        let this = Arc::clone(self);
        info!(
            persona_id = %this.persona_id,
            interval_secs = this.poll_interval.as_secs(),
            "Agent polling started"
        );

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match this.poll_once().await {
                            Ok(report) if report.candidates > 0 => {
                                info!(
                                    scanned = report.scanned,
                                    replied = report.replied,
                                    skipped = report.skipped,
                                    "Agent poll finished"
                                );
                            }
                            Ok(report) => debug!(scanned = report.scanned, "Agent poll finished"),
                            Err(e) => error!(error = %e, "Agent poll failed"),
                        }
                    }
                    () = this.shutdown.notified() => break,
                }
            }

            this.running.store(false, Ordering::SeqCst);
            info!("Agent polling stopped");
        }))
    }

    /// Ask the polling loop to exit after the current poll
    pub fn stop(&self) {
        if self.is_running() {
            self.shutdown.notify_one();
        }
    }

    /// Scan comments from shortly before the watermark and answer the
    /// candidates
    ///
    /// Pages are read in `(created_at, id)` order until one comes back short.
    /// A store failure while answering stops the scan and holds the
    /// watermark at the failed candidate, so the next poll retries it.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> RepoResult<PollReport> {
        self.reset_dedup_if_due();

        let since = self.state.lock().watermark;
        let mut watermark = since;
        let mut position = (since - TimeDelta::seconds(SCAN_OVERLAP_SECS), Snowflake::new(0));
        let mut report = PollReport::default();

        'scan: loop {
            let page = self
                .comments
                .find_created_after(position.0, position.1, POLL_BATCH)
                .await?;
            report.scanned += page.len();

            for candidate in &page {
                if self.matcher.is_candidate(candidate, self.persona_id) {
                    report.candidates += 1;
                    match self.answer(candidate).await {
                        Ok(Outcome::Replied) => report.replied += 1,
                        Ok(Outcome::Skipped) => report.skipped += 1,
                        Err(e) => {
                            error!(
                                comment_id = %candidate.id,
                                post_id = %candidate.post_id,
                                error = %e,
                                "Agent reply could not be stored, will retry"
                            );
                            watermark = watermark.min(candidate.created_at);
                            break 'scan;
                        }
                    }
                }
                watermark = watermark.max(candidate.created_at);
            }

            match page.last() {
                Some(last) if page.len() as i64 == POLL_BATCH => position = (last.created_at, last.id),
                _ => break,
            }
        }

        self.state.lock().watermark = watermark;
        Ok(report)
    }

    /// Comment on a freshly created post, off the request path
    pub fn react_to_post(self: &Arc<Self>, post: Post) {
        if post.author.is_user(self.persona_id) {
            return;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.comment_on_post(&post).await;
        });
    }

    // === Helper Methods ===

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn comment_on_post(&self, post: &Post) {
        let request = GenerationRequest {
            system_instruction: self.instructions.clone(),
            prompt: post_prompt(post),
            image_urls: post.images.clone(),
        };

        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Agent could not comment on post");
                return;
            }
        };

        let comment = Comment::new_root(self.ids.generate(), post.id, text, self.persona.clone());
        match self.comments.create(&comment).await {
            Ok(()) => info!(comment_id = %comment.id, "Agent commented on new post"),
            Err(e) => error!(error = %e, "Agent comment could not be stored"),
        }
    }

    /// Reply to one candidate; `Err` only for store failures
    async fn answer(&self, candidate: &Comment) -> Result<Outcome, DomainError> {
        if self.handled.contains(&candidate.id) {
            return Ok(Outcome::Skipped);
        }

        let target = candidate.author.as_reply_target();
        if self
            .comments
            .reply_exists(candidate.post_id, self.persona_id, &target, candidate.created_at)
            .await?
        {
            debug!(comment_id = %candidate.id, "Candidate already answered");
            self.mark_handled(candidate.id);
            return Ok(Outcome::Skipped);
        }

        let Some(post) = self.posts.find_by_id(candidate.post_id).await? else {
            warn!(comment_id = %candidate.id, post_id = %candidate.post_id, "Candidate's post is gone");
            self.mark_handled(candidate.id);
            return Ok(Outcome::Skipped);
        };

        let (prompt, placement) = {
            let tree = CommentTree::build(self.comments.find_by_post(post.id).await?);
            let mut chain = tree.context_chain(candidate.id, CONTEXT_HOPS);
            if chain.is_empty() {
                chain.push(candidate);
            }
            (
                thread_prompt(&post, &chain),
                agent_placement(candidate, tree.root_of(candidate.id)),
            )
        };

        let request = GenerationRequest {
            system_instruction: self.instructions.clone(),
            prompt,
            image_urls: post.images.clone(),
        };
        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(comment_id = %candidate.id, error = %e, "Agent generation failed, skipping candidate");
                self.mark_handled(candidate.id);
                return Ok(Outcome::Skipped);
            }
        };

        let reply = Comment::new_placed(
            self.ids.generate(),
            post.id,
            text,
            self.persona.clone(),
            placement,
            target,
        );
        self.comments.create(&reply).await?;
        self.mark_handled(candidate.id);

        info!(
            comment_id = %reply.id,
            candidate_id = %candidate.id,
            post_id = %post.id,
            depth = reply.depth,
            "Agent replied"
        );

        Ok(Outcome::Replied)
    }

    fn mark_handled(&self, id: Snowflake) {
        self.handled.insert(id);
    }

    fn reset_dedup_if_due(&self) {
        let mut state = self.state.lock();
        if state.last_reset.elapsed() >= self.dedup_reset_interval
            || self.handled.len() >= self.max_dedup_entries
        {
            let cleared = self.handled.len();
            self.handled.clear();
            state.last_reset = Instant::now();
            debug!(cleared, "Agent dedup set reset");
        }
    }
}

impl std::fmt::Debug for AgentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentController")
            .field("persona_id", &self.persona_id)
            .field("running", &self.is_running())
            .field("handled", &self.handled.len())
            .finish_non_exhaustive()
    }
}
