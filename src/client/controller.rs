//! Advisory controller state machine
//!
//! `AwaitingPermission` leads to either a terminal `Error(PermissionDenied)`
//! or to a fetch cycle that runs immediately and then on every refresh tick.
//! Each cycle passes through `Loading` and settles in `Displaying` or
//! `Error`. At most one cycle is in flight: a tick that fires while a cycle
//! is still running drops the old cycle and starts a new one, so the screen
//! always reflects the most recently started cycle.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::view::{Renderer, View};
use super::{
    ClientError, LocationError, LocationProvider, PermissionProvider, PermissionState,
    PositionOptions, UvFetcher,
};
use crate::advisory::{SUN_SAFETY_TIPS, UvLevel, band_for};
use crate::config::ClientConfig;
use crate::models::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientState {
    AwaitingPermission,
    Loading,
    Displaying { uv_index: f64, level: UvLevel },
    Error(ClientError),
}

/// User input delivered to a running controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Swap the UV panel and the tips panel
    ToggleTips,
    /// Throw all state away and start over from the permission query
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub refresh_interval: Duration,
    /// Abort timer for one proxy call
    pub request_timeout: Duration,
    pub position: PositionOptions,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(10 * 60),
            request_timeout: Duration::from_secs(8),
            position: PositionOptions::default(),
        }
    }
}

impl From<&ClientConfig> for ControllerSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            request_timeout: config.request_timeout(),
            position: PositionOptions::from(config),
        }
    }
}

type CycleResult = Result<f64, ClientError>;
type CycleFuture<'a> = Pin<Box<dyn Future<Output = CycleResult> + 'a>>;

/// The platform capabilities the controller drives
pub struct Platform<P, L, F> {
    pub permission: P,
    pub location: L,
    pub fetcher: F,
}

impl<P, L, F> Platform<P, L, F>
where
    P: PermissionProvider,
    L: LocationProvider,
    F: UvFetcher,
{
    pub fn new(permission: P, location: L, fetcher: F) -> Self {
        Self {
            permission,
            location,
            fetcher,
        }
    }

    /// Whether geolocation may be used. A pending decision is resolved by
    /// asking for one position fix, which prompts the user.
    pub async fn request_permission(&self, options: &PositionOptions) -> bool {
        match self.permission.query().await {
            Ok(PermissionState::Granted) => true,
            Ok(PermissionState::Prompt) => self.locate(options).await.is_ok(),
            Ok(PermissionState::Denied) => false,
            Err(e) => {
                error!("Permission request error: {:#}", e);
                false
            }
        }
    }

    async fn locate(&self, options: &PositionOptions) -> Result<Coordinates, LocationError> {
        timeout(options.timeout, self.location.current_position(options))
            .await
            .unwrap_or(Err(LocationError::Timeout))
    }

    /// One fetch cycle: position fix, then the proxy call under the abort timer.
    /// The timer is dropped together with the call on every path.
    #[instrument(skip_all)]
    pub async fn fetch_cycle(&self, settings: &ControllerSettings) -> CycleResult {
        let coordinates = self.locate(&settings.position).await.map_err(|e| {
            warn!("Could not obtain a position: {}", e);
            ClientError::PermissionDenied
        })?;

        debug!("Fetching UV index for {}", coordinates.format_coordinates());

        match timeout(settings.request_timeout, self.fetcher.fetch_uv(&coordinates)).await {
            Err(_) => {
                warn!(
                    "UV request aborted after {:.1}s",
                    settings.request_timeout.as_secs_f64()
                );
                Err(ClientError::TimedOut)
            }
            Ok(Err(e)) => {
                error!("Error fetching UV: {}", e);
                Err(ClientError::FetchFailed)
            }
            Ok(Ok(None)) => Err(ClientError::Unavailable),
            Ok(Ok(Some(uv_index))) => Ok(uv_index),
        }
    }
}

/// The view, its renderer and the state they reflect
struct Screen<R> {
    view: View,
    renderer: R,
    state: ClientState,
}

impl<R: Renderer> Screen<R> {
    fn reset(&mut self) {
        self.view = View::default();
        self.state = ClientState::AwaitingPermission;
        self.draw();
    }

    fn loading(&mut self) {
        self.view.show_loading();
        self.state = ClientState::Loading;
        self.draw();
    }

    fn settle(&mut self, outcome: CycleResult) {
        match outcome {
            Ok(uv_index) => {
                let band = band_for(uv_index);
                info!("UV index {:.1} ({:?})", uv_index, band.level);
                self.view.show_reading(uv_index, band, Utc::now());
                self.state = ClientState::Displaying {
                    uv_index,
                    level: band.level,
                };
            }
            Err(error) => {
                self.view.show_error(error);
                self.state = ClientState::Error(error);
            }
        }
        self.draw();
    }

    fn toggle_tips(&mut self) {
        self.view.toggle_tips(&SUN_SAFETY_TIPS);
        self.draw();
    }

    /// Apply a received command. Returns true when the session has to start
    /// over; a closed channel clears `open`.
    fn command(&mut self, command: Option<Command>, open: &mut bool) -> bool {
        match command {
            Some(Command::ToggleTips) => {
                self.toggle_tips();
                false
            }
            Some(Command::Refresh) => {
                info!("Manual refresh, starting over");
                true
            }
            None => {
                debug!("Command channel closed");
                *open = false;
                false
            }
        }
    }

    fn draw(&mut self) {
        self.renderer.render(&self.view);
    }
}

pub struct Controller<P, L, F, R> {
    platform: Platform<P, L, F>,
    settings: ControllerSettings,
    screen: Screen<R>,
}

impl<P, L, F, R> Controller<P, L, F, R>
where
    P: PermissionProvider,
    L: LocationProvider,
    F: UvFetcher,
    R: Renderer,
{
    pub fn new(platform: Platform<P, L, F>, settings: ControllerSettings, renderer: R) -> Self {
        Self {
            platform,
            settings,
            screen: Screen {
                view: View::default(),
                renderer,
                state: ClientState::AwaitingPermission,
            },
        }
    }

    pub fn state(&self) -> ClientState {
        self.screen.state
    }

    pub fn view(&self) -> &View {
        &self.screen.view
    }

    /// Reset, ask for permission and, when granted, run the first cycle.
    /// Returns whether permission was granted.
    pub async fn start(&mut self) -> bool {
        self.screen.reset();
        let granted = self.platform.request_permission(&self.settings.position).await;
        if granted {
            self.refresh_now().await;
        } else {
            self.screen.settle(Err(ClientError::PermissionDenied));
        }
        granted
    }

    /// Run one fetch cycle to completion
    pub async fn refresh_now(&mut self) {
        self.screen.loading();
        let outcome = self.platform.fetch_cycle(&self.settings).await;
        self.screen.settle(outcome);
    }

    pub fn toggle_tips(&mut self) {
        self.screen.toggle_tips();
    }

    /// Drive the controller until `shutdown` fires.
    ///
    /// Commands are handled at any point, including while the permission
    /// answer is pending and while a cycle is in flight. If the command sender
    /// goes away the controller keeps refreshing on its own.
    pub async fn run(&mut self, commands: &mut mpsc::Receiver<Command>, shutdown: CancellationToken) {
        let mut commands_open = true;

        'session: loop {
            self.screen.reset();

            let permission = self.platform.request_permission(&self.settings.position);
            tokio::pin!(permission);

            let granted = loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    granted = &mut permission => break granted,
                    command = commands.recv(), if commands_open => {
                        if self.screen.command(command, &mut commands_open) {
                            continue 'session;
                        }
                    }
                }
            };

            let mut ticker = if granted {
                Some(refresh_ticker(self.settings.refresh_interval))
            } else {
                info!("Location permission denied, no refresh scheduled");
                self.screen.settle(Err(ClientError::PermissionDenied));
                None
            };

            let mut in_flight: Option<CycleFuture<'_>> = None;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Controller shutting down");
                        return;
                    }
                    _ = next_tick(&mut ticker) => {
                        if in_flight.is_some() {
                            debug!("Superseding unfinished fetch cycle");
                        }
                        self.screen.loading();
                        in_flight = Some(Box::pin(self.platform.fetch_cycle(&self.settings)));
                    }
                    outcome = settle_cycle(&mut in_flight) => {
                        in_flight = None;
                        self.screen.settle(outcome);
                    }
                    command = commands.recv(), if commands_open => {
                        if self.screen.command(command, &mut commands_open) {
                            continue 'session;
                        }
                    }
                }
            }
        }
    }
}

fn refresh_ticker(period: Duration) -> Interval {
    // First tick completes immediately, which runs the initial cycle
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn settle_cycle<'a>(slot: &mut Option<CycleFuture<'a>>) -> CycleResult {
    match slot {
        Some(cycle) => cycle.await,
        None => std::future::pending().await,
    }
}
