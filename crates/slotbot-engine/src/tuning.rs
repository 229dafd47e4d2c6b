//! Engine timing and retry tuning.
//!
//! Defaults mirror the behavior proven against the live site. Tests shrink
//! these to milliseconds; nothing else should need to touch them.

use std::time::Duration;

use crate::vote::VoteParams;

#[derive(Debug, Clone)]
pub struct EngineTuning {
    /// Tick between predicate checks in every wait.
    pub poll_interval: Duration,

    /// Page-open body wait.
    pub open_timeout: Duration,
    /// Wait for the service catalog controls to appear.
    pub services_present_timeout: Duration,
    /// Wait for every requested service to report selected.
    pub selection_verify_timeout: Duration,
    /// Wait for the choose-time affordance to be clickable.
    pub choose_time_timeout: Duration,
    /// Wait for the calendar widget to render.
    pub calendar_visible_timeout: Duration,

    /// Wait for day cells to (re)populate.
    pub cells_timeout: Duration,
    /// Best-effort wait for the slot container to differ from baseline.
    pub changed_timeout: Duration,
    /// Best-effort wait for the slot container to stop changing.
    pub stable_timeout: Duration,
    /// Quiet period the slot container must hold to count as stable.
    pub stable_for: Duration,
    /// Best-effort wait for non-placeholder content or a remote error.
    pub ready_timeout: Duration,

    /// Calendar navigation attempt budget.
    pub max_nav_attempts: usize,
    /// Stale click retries on one day cell.
    pub max_cell_click_retries: usize,
    /// Stale retries when resolving one service control.
    pub max_service_click_retries: usize,
    /// Pause before re-resolving a stale element.
    pub stale_retry_pause: Duration,
    /// Pause between successive service clicks.
    pub service_click_pause: Duration,
    /// Pause after clearing all selections.
    pub post_clear_pause: Duration,

    /// Date-click attempts inside slot discovery.
    pub date_attempts: usize,
    /// Base backoff after a server-error state.
    pub date_backoff_base: Duration,
    /// Backoff increment per attempt.
    pub date_backoff_step: Duration,
    /// Pause when the container stayed a placeholder.
    pub placeholder_pause: Duration,
    /// Pause between the first OK result and the confirmation pass.
    pub pre_confirm_pause: Duration,

    /// Main voting pass.
    pub vote: VoteParams,
    /// Short confirmation pass after an initial OK.
    pub confirm_vote: VoteParams,
    /// Single pass after the full-reload fallback.
    pub fallback_vote: VoteParams,

    /// Wait for a specific slot control to become clickable.
    pub slot_click_timeout: Duration,
    /// Wait for the submission control to become clickable.
    pub submit_timeout: Duration,
    /// Window watched for success/failure keywords after submission.
    pub outcome_watch: Duration,
    /// Tick inside the outcome watch window.
    pub outcome_poll: Duration,

    /// Wait for the login/registration modal to show.
    pub modal_timeout: Duration,
    /// Wait for the modal to close (or an inline error to appear).
    pub modal_close_timeout: Duration,
    /// Wait for the login/register affordance to be clickable.
    pub auth_button_timeout: Duration,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),

            open_timeout: Duration::from_secs(20),
            services_present_timeout: Duration::from_secs(15),
            selection_verify_timeout: Duration::from_secs(15),
            choose_time_timeout: Duration::from_secs(18),
            calendar_visible_timeout: Duration::from_secs(12),

            cells_timeout: Duration::from_secs(12),
            changed_timeout: Duration::from_secs(8),
            stable_timeout: Duration::from_secs(12),
            stable_for: Duration::from_millis(700),
            ready_timeout: Duration::from_secs(8),

            max_nav_attempts: 14,
            max_cell_click_retries: 10,
            max_service_click_retries: 8,
            stale_retry_pause: Duration::from_millis(120),
            service_click_pause: Duration::from_millis(80),
            post_clear_pause: Duration::from_millis(120),

            date_attempts: 5,
            date_backoff_base: Duration::from_millis(800),
            date_backoff_step: Duration::from_millis(400),
            placeholder_pause: Duration::from_millis(500),
            pre_confirm_pause: Duration::from_millis(250),

            vote: VoteParams::main(),
            confirm_vote: VoteParams::confirm(),
            fallback_vote: VoteParams::fallback(),

            slot_click_timeout: Duration::from_secs(10),
            submit_timeout: Duration::from_secs(10),
            outcome_watch: Duration::from_secs(15),
            outcome_poll: Duration::from_millis(300),

            modal_timeout: Duration::from_secs(8),
            modal_close_timeout: Duration::from_secs(12),
            auth_button_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineTuning {
    /// A uniformly fast variant for tests: every wait in milliseconds,
    /// attempt budgets unchanged.
    pub fn fast() -> Self {
        let ms = Duration::from_millis(1);
        Self {
            poll_interval: ms,
            open_timeout: Duration::from_millis(50),
            services_present_timeout: Duration::from_millis(50),
            selection_verify_timeout: Duration::from_millis(50),
            choose_time_timeout: Duration::from_millis(50),
            calendar_visible_timeout: Duration::from_millis(50),
            cells_timeout: Duration::from_millis(50),
            changed_timeout: Duration::from_millis(30),
            stable_timeout: Duration::from_millis(50),
            stable_for: Duration::from_millis(2),
            ready_timeout: Duration::from_millis(30),
            stale_retry_pause: ms,
            service_click_pause: ms,
            post_clear_pause: ms,
            date_backoff_base: ms,
            date_backoff_step: ms,
            placeholder_pause: ms,
            pre_confirm_pause: ms,
            vote: VoteParams {
                tries: 5,
                interval: ms,
                min_votes: 2,
            },
            confirm_vote: VoteParams {
                tries: 3,
                interval: ms,
                min_votes: 1,
            },
            fallback_vote: VoteParams {
                tries: 5,
                interval: ms,
                min_votes: 1,
            },
            slot_click_timeout: Duration::from_millis(30),
            submit_timeout: Duration::from_millis(30),
            outcome_watch: Duration::from_millis(50),
            outcome_poll: ms,
            modal_timeout: Duration::from_millis(30),
            modal_close_timeout: Duration::from_millis(50),
            auth_button_timeout: Duration::from_millis(30),
            ..Self::default()
        }
    }

    pub(crate) fn poll(&self, timeout: Duration) -> crate::poll::Poll {
        crate::poll::Poll::with_interval(timeout, self.poll_interval)
    }
}
