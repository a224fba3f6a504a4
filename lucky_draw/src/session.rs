/*!
The draw interaction, as seen by a user interface.

A [`DrawSession`] owns everything that lives for the duration of a session: the
current participants, the requested number of winners and the state of the draw.
The state goes through `Idle -> Drawing -> Succeeded | Failed -> Idle`. A draw stays
in `Drawing` for a fixed suspense delay, during which the rest of the session stays
responsive. The delay runs as a `tokio` task, which is aborted if the session is
cancelled or dropped.

User interfaces follow the session through [`DrawSession::subscribe`]: every change of
state or notice is published on a `watch` channel.
*/

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::*;
use crate::{draw_with_rng, parse_with_options};

/// How long a draw stays pending before the winners are revealed.
pub const DEFAULT_SUSPENSE: Duration = Duration::from_secs(3);
/// How long a notice stays visible.
pub const DEFAULT_NOTICE_LIFETIME: Duration = Duration::from_secs(6);
/// The number of winners requested when a session starts.
pub const DEFAULT_WINNERS: i64 = 5;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DrawState {
    Idle,
    Drawing,
    Succeeded(DrawResult),
    Failed(DrawError),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Severity {
    Success,
    Error,
}

/// A transient message for the user. A notice is either a success or an error,
/// never both.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub raised_at: Instant,
    pub lifetime: Duration,
}

impl Notice {
    fn new(severity: Severity, message: String, lifetime: Duration) -> Notice {
        Notice {
            severity,
            message,
            raised_at: Instant::now(),
            lifetime,
        }
    }

    /// False once the notice has dismissed itself.
    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.raised_at + self.lifetime
    }
}

/// What a user interface needs to render the session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Snapshot {
    pub state: DrawState,
    pub notice: Option<Notice>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionSettings {
    pub suspense: Duration,
    pub notice_lifetime: Duration,
    /// Makes the sequence of draws reproducible.
    pub seed: Option<u64>,
    pub parse_options: ParseOptions,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            suspense: DEFAULT_SUSPENSE,
            notice_lifetime: DEFAULT_NOTICE_LIFETIME,
            seed: None,
            parse_options: ParseOptions::default(),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("A draw is already in progress"))]
    DrawPending {},
    #[snafu(display("{source}"))]
    Upload { source: ParseError },
    #[snafu(display("{source}"))]
    Draw { source: DrawError },
}

pub struct DrawSession {
    settings: SessionSettings,
    // Shared with the pending draw, which works on the pool as it was when the draw started.
    participants: Arc<ParticipantSet>,
    rejected: Vec<RejectedRow>,
    requested_winners: i64,
    rng: StdRng,
    snapshot: Arc<watch::Sender<Snapshot>>,
    pending: Option<JoinHandle<()>>,
}

impl DrawSession {
    pub fn new(settings: SessionSettings) -> DrawSession {
        let seed = match settings.seed {
            Some(seed) => seed,
            None => rand::rng().random(),
        };
        let (tx, _) = watch::channel(Snapshot {
            state: DrawState::Idle,
            notice: None,
        });
        DrawSession {
            settings,
            participants: Arc::new(ParticipantSet::default()),
            rejected: Vec::new(),
            requested_winners: DEFAULT_WINNERS,
            rng: StdRng::seed_from_u64(seed),
            snapshot: Arc::new(tx),
            pending: None,
        }
    }

    pub fn participants(&self) -> &ParticipantSet {
        &self.participants
    }

    /// The rows dropped by the last successful upload.
    pub fn rejected_rows(&self) -> &[RejectedRow] {
        &self.rejected
    }

    pub fn requested_winners(&self) -> i64 {
        self.requested_winners
    }

    /// Sets the number of winners for the next draw. The value is only checked when
    /// the draw starts.
    pub fn set_requested_winners(&mut self, requested_winners: i64) {
        self.requested_winners = requested_winners;
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> DrawState {
        self.snapshot.borrow().state.clone()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.snapshot.borrow().state, DrawState::Drawing)
    }

    /// The notice to display at this instant, if any.
    pub fn notice(&self, now: Instant) -> Option<Notice> {
        self.snapshot
            .borrow()
            .notice
            .clone()
            .filter(|n| n.is_visible(now))
    }

    pub fn dismiss_notice(&mut self) {
        self.snapshot.send_modify(|s| s.notice = None);
    }

    /// Replaces the participants with the content of a new file.
    ///
    /// A failed upload leaves the session without participants. In both cases, the
    /// outcome of the previous draw is discarded.
    pub fn upload(&mut self, raw: &str) -> Result<&ParticipantSet, SessionError> {
        if self.is_drawing() {
            return Err(self.reject_pending());
        }
        match parse_with_options(raw, &self.settings.parse_options) {
            Ok(report) => {
                let msg = format!("Loaded {} participants", report.participants.len());
                info!("{}", msg);
                self.participants = Arc::new(report.participants);
                self.rejected = report.rejected;
                self.publish(DrawState::Idle, Some(self.notice_for(Severity::Success, msg)));
                Ok(self.participants.as_ref())
            }
            Err(e) => {
                warn!("Upload rejected: {}", e);
                self.participants = Arc::new(ParticipantSet::default());
                self.rejected.clear();
                self.publish(
                    DrawState::Idle,
                    Some(self.notice_for(Severity::Error, e.to_string())),
                );
                Err(e).context(UploadSnafu {})
            }
        }
    }

    /// Starts a draw. The winners are published once the suspense delay has elapsed.
    ///
    /// Must be called from within a `tokio` runtime.
    pub fn start_draw(&mut self) -> Result<(), SessionError> {
        if self.is_drawing() {
            return Err(self.reject_pending());
        }
        let request = match DrawRequest::new(self.participants.len(), self.requested_winners) {
            Ok(request) => request,
            Err(e) => {
                warn!("Draw rejected: {}", e);
                let notice = self.notice_for(Severity::Error, e.to_string());
                self.publish(DrawState::Failed(e.clone()), Some(notice));
                return Err(e).context(DrawSnafu {});
            }
        };
        info!(
            "Starting a draw of {} winners among {} participants",
            request.requested_winners(),
            request.pool_size()
        );

        let pool = Arc::clone(&self.participants);
        let requested = self.requested_winners;
        let mut rng = StdRng::seed_from_u64(self.rng.random());
        let suspense = self.settings.suspense;
        let lifetime = self.settings.notice_lifetime;
        let snapshot = Arc::clone(&self.snapshot);

        self.publish(DrawState::Drawing, None);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(suspense).await;
            let (state, notice) = match draw_with_rng(&pool, requested, &mut rng) {
                Ok(winners) => (
                    DrawState::Succeeded(winners),
                    Notice::new(
                        Severity::Success,
                        "The lucky draw completed successfully!".to_string(),
                        lifetime,
                    ),
                ),
                Err(e) => {
                    let msg = e.to_string();
                    (DrawState::Failed(e), Notice::new(Severity::Error, msg, lifetime))
                }
            };
            debug!("draw completed: {:?}", state);
            snapshot.send_replace(Snapshot {
                state,
                notice: Some(notice),
            });
        }));
        Ok(())
    }

    /// Waits until no draw is pending and returns the resulting state.
    pub async fn wait_for_draw(&self) -> DrawState {
        let mut rx = self.snapshot.subscribe();
        let res = rx
            .wait_for(|s| s.state != DrawState::Drawing)
            .await
            .map(|s| s.state.clone());
        res.unwrap_or(DrawState::Idle)
    }

    /// Goes back to `Idle` after a draw has succeeded or failed, and returns the
    /// outcome that was acknowledged.
    pub fn acknowledge(&mut self) -> Option<DrawState> {
        let current = self.state();
        match current {
            DrawState::Succeeded(_) | DrawState::Failed(_) => {
                self.snapshot.send_modify(|s| s.state = DrawState::Idle);
                Some(current)
            }
            _ => None,
        }
    }

    /// Abandons the pending draw, if any. No winners will be published for it.
    pub fn cancel(&mut self) -> bool {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        if self.is_drawing() {
            info!("Draw cancelled");
            self.publish(DrawState::Idle, None);
            true
        } else {
            false
        }
    }

    fn reject_pending(&mut self) -> SessionError {
        debug!("rejecting a request: a draw is pending");
        let err = SessionError::DrawPending {};
        let notice = self.notice_for(Severity::Error, err.to_string());
        self.snapshot.send_modify(|s| s.notice = Some(notice));
        err
    }

    fn notice_for(&self, severity: Severity, message: String) -> Notice {
        Notice::new(severity, message, self.settings.notice_lifetime)
    }

    fn publish(&self, state: DrawState, notice: Option<Notice>) {
        self.snapshot.send_replace(Snapshot { state, notice });
    }
}

impl Drop for DrawSession {
    fn drop(&mut self) {
        // No completion may fire after the session is gone.
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
