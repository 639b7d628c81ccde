//! Embed Controller
//!
//! One controller per mounted embedding view. Widget calls are always made
//! with the state lock released, since widgets may call back synchronously.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::EmbedError;
use crate::machine::{EmbedMachine, InitRequest};
use crate::script::ScriptLoader;
use crate::session::EmbedSession;
use crate::status::EmbedStatus;
use crate::widget::{EmbedWidget, WidgetCallbacks, WidgetConfig};
use crate::Result;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How `retry` brings a failed widget back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Use the widget's native refresh when it has one
    #[default]
    PreferRefresh,
    /// Always tear down and run `init` again
    AlwaysReinitialize,
}

#[derive(Debug, Clone)]
pub struct EmbedConfig {
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    pub partner_id: Option<String>,
    pub debug: bool,
    /// Overrides [`EmbedConfig::timeout`] for this run
    pub timeout: Option<Duration>,
}

/// What `initialize` or `retry` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new run was started and the widget's `init` called
    Started { generation: u64 },
    /// The widget's native refresh was used within the current run
    Refreshing { generation: u64 },
    /// The bootstrap script was reloaded; nothing to initialize yet
    ScriptReloaded,
    /// The last run failed; only `retry` starts another
    NeedsRetry,
    AlreadyInFlight,
    NotMounted,
    MissingToken,
    ScriptNotLoaded,
}

impl InitOutcome {
    pub fn is_started(&self) -> bool {
        matches!(
            self,
            InitOutcome::Started { .. } | InitOutcome::Refreshing { .. }
        )
    }
}

pub struct EmbedController {
    machine: Arc<Mutex<EmbedMachine>>,
    widget: Arc<dyn EmbedWidget>,
    loader: Arc<dyn ScriptLoader>,
    config: EmbedConfig,
}

impl EmbedController {
    pub fn new(
        widget: Arc<dyn EmbedWidget>,
        loader: Arc<dyn ScriptLoader>,
        config: EmbedConfig,
    ) -> Self {
        Self {
            machine: Arc::new(Mutex::new(EmbedMachine::default())),
            widget,
            loader,
            config,
        }
    }

    pub fn session(&self) -> EmbedSession {
        self.machine.lock().session.clone()
    }

    pub fn status(&self) -> EmbedStatus {
        self.machine.lock().session.status
    }

    pub fn generation(&self) -> u64 {
        self.machine.lock().generation
    }

    pub fn mounted_container(&self) -> Option<String> {
        self.machine.lock().mounted.clone()
    }

    /// Last URL the widget reported through `on_navigate`
    pub fn last_navigation(&self) -> Option<String> {
        self.machine.lock().last_navigation.clone()
    }

    pub fn widget_version(&self) -> Option<String> {
        self.widget.version()
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Register the container the widget renders into.
    pub fn mount(&self, container_id: &str) {
        let remount = {
            let machine = self.machine.lock();
            machine
                .mounted
                .as_deref()
                .is_some_and(|current| current != container_id)
        };

        if remount {
            self.destroy();
        }

        self.machine.lock().mounted = Some(container_id.to_string());
        tracing::debug!(container_id = %container_id, "Mounted embed container");
    }

    /// Tear down and forget the container.
    pub fn unmount(&self) {
        self.destroy();
        if let Some(container_id) = self.machine.lock().mounted.take() {
            tracing::debug!(container_id = %container_id, "Unmounted embed container");
        }
    }

    /// Fetch the bootstrap script. Failure moves to `Error`.
    pub async fn attach_script(&self, url: &str) -> Result<()> {
        {
            let mut machine = self.machine.lock();
            machine.script_url = Some(url.to_string());
            if machine.session.script_loaded {
                return Ok(());
            }
        }

        match self.loader.load(url).await {
            Ok(()) => {
                let mut machine = self.machine.lock();
                machine.session.script_loaded = true;
                // A script error with no run behind it is resolved now
                if machine.session.status == EmbedStatus::Error && machine.last_request.is_none() {
                    machine.session.error_message = None;
                    machine.transition_to(EmbedStatus::Idle);
                }
                drop(machine);
                tracing::info!(url = %url, "Embed script loaded");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Embed script failed to load");
                self.machine.lock().fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Start a run. A no-op unless the container is mounted, a token is
    /// present, the script is loaded and the controller is idle.
    pub fn initialize(
        &self,
        container_id: &str,
        token: Option<&str>,
        options: InitOptions,
    ) -> InitOutcome {
        self.start_run(container_id, token, options, false)
    }

    fn start_run(
        &self,
        container_id: &str,
        token: Option<&str>,
        options: InitOptions,
        retrying: bool,
    ) -> InitOutcome {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return InitOutcome::MissingToken;
        };

        let timeout = options.timeout.unwrap_or(self.config.timeout);

        let callbacks = {
            let mut machine = self.machine.lock();

            if machine.mounted.as_deref() != Some(container_id) {
                tracing::debug!(container_id = %container_id, "Container not mounted, skipping init");
                return InitOutcome::NotMounted;
            }
            if !machine.session.script_loaded {
                return InitOutcome::ScriptNotLoaded;
            }
            if machine.session.status == EmbedStatus::Error && !retrying {
                return InitOutcome::NeedsRetry;
            }
            if machine.session.initialized || !machine.transition_to(EmbedStatus::Loading) {
                return InitOutcome::AlreadyInFlight;
            }

            machine.session.initialized = true;
            machine.session.error_message = None;
            machine.generation += 1;
            machine.last_request = Some(InitRequest {
                container_id: container_id.to_string(),
                token: token.to_string(),
                options: options.clone(),
            });
            self.arm_timer(&mut machine, timeout);

            WidgetCallbacks::new(Arc::downgrade(&self.machine), machine.generation)
        };

        let generation = callbacks.generation();
        tracing::info!(
            generation,
            container_id = %container_id,
            partner_id = ?options.partner_id,
            "Initializing embedded dashboard"
        );

        let config = WidgetConfig {
            container_id: container_id.to_string(),
            token: token.to_string(),
            partner_id: options.partner_id,
            debug: options.debug,
            timeout,
            callbacks: callbacks.clone(),
        };

        if let Err(info) = self.widget.init(config) {
            callbacks.on_error(info);
        }

        InitOutcome::Started { generation }
    }

    /// Recover from `Error`: reload the script if that is what failed,
    /// otherwise refresh or re-initialize according to the retry policy.
    pub async fn retry(&self) -> Result<InitOutcome> {
        let (needs_script, script_url, request) = {
            let mut machine = self.machine.lock();
            if machine.session.status != EmbedStatus::Error {
                return Err(EmbedError::NothingToRetry);
            }

            machine.session.initialized = false;
            (
                !machine.session.script_loaded,
                machine.script_url.clone(),
                machine.last_request.clone(),
            )
        };

        tracing::info!(needs_script, "Retrying embedded dashboard");

        if needs_script {
            let url = script_url.ok_or(EmbedError::NothingToRetry)?;
            self.attach_script(&url).await?;

            if request.is_none() {
                let mut machine = self.machine.lock();
                machine.session.error_message = None;
                machine.transition_to(EmbedStatus::Idle);
                return Ok(InitOutcome::ScriptReloaded);
            }
        }

        let request = request.ok_or(EmbedError::NothingToRetry)?;

        let use_refresh = !needs_script
            && self.config.retry_policy == RetryPolicy::PreferRefresh
            && self.widget.supports_refresh();

        if use_refresh {
            return Ok(self.refresh(&request));
        }

        self.widget.destroy();
        Ok(self.start_run(
            &request.container_id,
            Some(request.token.as_str()),
            request.options,
            true,
        ))
    }

    fn refresh(&self, request: &InitRequest) -> InitOutcome {
        let timeout = request.options.timeout.unwrap_or(self.config.timeout);

        let callbacks = {
            let mut machine = self.machine.lock();
            if machine.session.initialized || !machine.transition_to(EmbedStatus::Loading) {
                return InitOutcome::AlreadyInFlight;
            }
            machine.session.initialized = true;
            machine.session.error_message = None;
            self.arm_timer(&mut machine, timeout);

            WidgetCallbacks::new(Arc::downgrade(&self.machine), machine.generation)
        };

        tracing::info!(generation = callbacks.generation(), "Refreshing embedded dashboard");

        if let Err(info) = self.widget.refresh() {
            callbacks.on_error(info);
        }

        InitOutcome::Refreshing {
            generation: callbacks.generation(),
        }
    }

    /// Cancel the timer, tear the widget down and return to `Idle`.
    pub fn destroy(&self) {
        let had_run = {
            let mut machine = self.machine.lock();
            let had_run = machine.session.initialized || machine.last_request.is_some();
            machine.reset();
            machine.last_request = None;
            had_run
        };

        if had_run {
            self.widget.destroy();
            tracing::info!("Destroyed embedded dashboard");
        }
    }

    /// Tear down a run that was started with a different token.
    /// Returns whether a teardown happened.
    pub fn token_changed(&self, token: Option<&str>) -> bool {
        let stale = {
            let machine = self.machine.lock();
            // A script failure alone has no run to tear down
            let active = machine.session.initialized || machine.last_request.is_some();
            let current = machine.last_request.as_ref().map(|r| r.token.as_str());
            active && current != token
        };

        if stale {
            tracing::info!("Session token changed, resetting embedded dashboard");
            self.destroy();
        }
        stale
    }

    fn arm_timer(&self, machine: &mut EmbedMachine, timeout: Duration) {
        machine.cancel_timer();
        machine.timer_seq += 1;

        let generation = machine.generation;
        let timer_seq = machine.timer_seq;
        let weak = Arc::downgrade(&self.machine);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                machine.timer = Some(handle.spawn(async move {
                    tokio::time::sleep(timeout).await;
                    if let Some(machine) = weak.upgrade() {
                        machine.lock().expire(generation, timer_seq);
                    }
                }));
            }
            Err(_) => {
                tracing::warn!(generation, "No async runtime, embed load timeout disabled");
            }
        }
    }
}

impl Clone for EmbedController {
    fn clone(&self) -> Self {
        Self {
            machine: Arc::clone(&self.machine),
            widget: Arc::clone(&self.widget),
            loader: Arc::clone(&self.loader),
            config: self.config.clone(),
        }
    }
}
