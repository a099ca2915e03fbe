use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::api::{ApiError, NotificationBackend, generate_push_token};
use crate::config::types::{Permission, SyncConfig};
use crate::platform::PlatformNotifier;
use crate::types::{Notification, NotificationId};

use super::interface::{Engine, EngineHandle, Event, Request};
use super::refresh::PollTimer;
use super::state::SyncState;

/// Timing and rollback knobs of the sync engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub push_display: Duration,
    pub rollback_mark_read: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for EngineSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            push_display: Duration::from_secs(config.push_display_secs),
            rollback_mark_read: config.rollback_mark_read,
        }
    }
}

/// Results of spawned backend calls, fed back into the run loop.
enum Completion {
    PageLoaded {
        seq: u64,
        page: u32,
        result: Result<Vec<Notification>, ApiError>,
    },
    CountFetched {
        seq: u64,
        result: Result<u64, ApiError>,
    },
    MarkedRead {
        id: NotificationId,
        was_unread: bool,
        list_epoch: u64,
        result: Result<(), ApiError>,
    },
    MarkedAllRead {
        flipped: Vec<NotificationId>,
        list_epoch: u64,
        result: Result<(), ApiError>,
    },
    PushRegistered {
        result: Result<(), ApiError>,
    },
    PushExpired {
        id: NotificationId,
        generation: u64,
    },
}

/// The notification sync engine.
///
/// Owns the notification state; every mutation happens on its run loop, so
/// requests and backend responses interleave but never race on the state.
pub struct SyncEngine<B: NotificationBackend> {
    backend: Arc<B>,
    notifier: Box<dyn PlatformNotifier>,
    settings: EngineSettings,
    events: Sender<Event>,
}

impl<B: NotificationBackend> SyncEngine<B> {
    pub fn new(
        backend: B,
        notifier: impl PlatformNotifier,
        settings: EngineSettings,
        events: Sender<Event>,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            notifier: Box::new(notifier),
            settings,
            events,
        }
    }
}

impl<B: NotificationBackend> Engine for SyncEngine<B> {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        let handle = EngineHandle::new(tx);
        let _ = std::thread::Builder::new()
            .name("notify-engine".to_owned())
            .spawn(move || {
                let rt = tokio::runtime::Runtime::new().expect("tokio runtime init");
                rt.block_on(self.run_loop(rx));
            });
        handle
    }
}

impl<B: NotificationBackend> SyncEngine<B> {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel::<Completion>();
        let mut ctx = LoopCtx {
            backend: self.backend,
            notifier: self.notifier,
            settings: self.settings,
            events: self.events,
            state: SyncState::new(),
            poll: PollTimer::new(self.settings.poll_interval),
            done_tx,
        };

        ctx.initialize();

        loop {
            tokio::select! {
                biased;
                maybe_req = rx.recv() => {
                    match maybe_req {
                        None | Some(Request::Shutdown) => {
                            tracing::debug!("engine: shutting down");
                            break;
                        }
                        Some(req) => ctx.handle_request(req),
                    }
                }
                Some(done) = done_rx.recv() => {
                    ctx.apply(done);
                }
                () = ctx.poll.tick() => {
                    tracing::debug!("engine: poll tick");
                    ctx.spawn_count_refresh();
                }
            }
        }

        ctx.poll.stop();
    }
}

/// Everything the run loop mutates.
struct LoopCtx<B: NotificationBackend> {
    backend: Arc<B>,
    notifier: Box<dyn PlatformNotifier>,
    settings: EngineSettings,
    events: Sender<Event>,
    state: SyncState,
    poll: PollTimer,
    done_tx: UnboundedSender<Completion>,
}

impl<B: NotificationBackend> LoopCtx<B> {
    fn emit(&self, event: Event) {
        // The surface may have gone away; the engine keeps syncing regardless.
        let _ = self.events.send(event);
    }

    /// Initial page load, permission negotiation, then polling.
    fn initialize(&mut self) {
        self.spawn_page_load(1);
        self.init_push();
        self.start_polling();
    }

    fn init_push(&mut self) {
        let permission = match self.notifier.permission() {
            Permission::Default => self.notifier.request_permission(),
            decided => decided,
        };
        tracing::debug!("engine: platform permission {permission:?}");
        self.emit(Event::PermissionResolved { permission });
        if permission == Permission::Granted {
            self.spawn_push_registration();
        }
    }

    fn start_polling(&mut self) {
        if self.poll.start() {
            tracing::debug!("engine: polling every {:?}", self.poll.period());
            self.emit(Event::PollingChanged { active: true });
        } else {
            tracing::debug!("engine: polling already active, start ignored");
        }
    }

    fn stop_polling(&mut self) {
        if self.poll.stop() {
            tracing::debug!("engine: polling stopped");
            self.emit(Event::PollingChanged { active: false });
        }
    }

    // -----------------------------------------------------------------------
    // Request dispatch
    // -----------------------------------------------------------------------

    fn handle_request(&mut self, req: Request) {
        match req {
            Request::LoadNotifications { page } => self.spawn_page_load(page),
            Request::RefreshUnreadCount => self.spawn_count_refresh(),
            Request::Snapshot { reply_tx } => {
                let _ = reply_tx.send(self.state.snapshot(self.poll.is_active()));
            }

            Request::MarkRead { id } => self.mark_read(id),
            Request::Activate { id } => {
                self.dismiss(&id);
                self.mark_read(id);
            }
            Request::Dismiss { id } => self.dismiss(&id),

            Request::MarkAllRead => {
                let list_epoch = self.state.list_epoch();
                let flipped = self.state.mark_all_read();
                if !flipped.is_empty() {
                    self.emit(Event::ReadFlagsChanged {
                        ids: flipped.clone(),
                        is_read: true,
                    });
                }
                let backend = Arc::clone(&self.backend);
                let done_tx = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = backend.mark_all_read().await;
                    let _ = done_tx.send(Completion::MarkedAllRead {
                        flipped,
                        list_epoch,
                        result,
                    });
                });
            }

            Request::DisplayPushed { notification } => self.display_pushed(notification),
            Request::RegisterPushToken => {
                if self.notifier.permission() == Permission::Granted {
                    self.spawn_push_registration();
                } else {
                    tracing::debug!("engine: push registration skipped, permission not granted");
                }
            }

            Request::StartPolling => self.start_polling(),
            Request::StopPolling => self.stop_polling(),
            Request::Shutdown => unreachable!("handled at run_loop level"),
        }
    }

    fn mark_read(&mut self, id: NotificationId) {
        let list_epoch = self.state.list_epoch();
        let was_unread = self.state.set_read(&id, true) == Some(false);
        if was_unread {
            self.emit(Event::ReadFlagsChanged {
                ids: vec![id.clone()],
                is_read: true,
            });
        }
        let backend = Arc::clone(&self.backend);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = backend.mark_read(&id).await;
            let _ = done_tx.send(Completion::MarkedRead {
                id,
                was_unread,
                list_epoch,
                result,
            });
        });
    }

    /// Close a pushed entry before its display window ends.
    fn dismiss(&mut self, id: &NotificationId) {
        if self.state.dismiss(id) {
            self.emit(Event::PushedDismissed { id: id.clone() });
        } else {
            tracing::debug!("engine: nothing to dismiss for {id}");
        }
    }

    fn display_pushed(&mut self, notification: Notification) {
        let id = notification.id.clone();
        let generation = self.state.push(notification.clone());
        if self.notifier.permission() == Permission::Granted {
            self.notifier.show(&notification);
        }
        self.emit(Event::PushedShown { notification });

        let done_tx = self.done_tx.clone();
        let window = self.settings.push_display;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = done_tx.send(Completion::PushExpired { id, generation });
        });
    }

    // -----------------------------------------------------------------------
    // Spawned reads
    // -----------------------------------------------------------------------

    fn spawn_page_load(&mut self, page: u32) {
        let page = page.max(1);
        let seq = self.state.list_seq.issue();
        let backend = Arc::clone(&self.backend);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = backend.fetch_page(page).await;
            let _ = done_tx.send(Completion::PageLoaded { seq, page, result });
        });
    }

    fn spawn_count_refresh(&mut self) {
        let seq = self.state.count_seq.issue();
        let backend = Arc::clone(&self.backend);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = backend.fetch_unread_count().await;
            let _ = done_tx.send(Completion::CountFetched { seq, result });
        });
    }

    fn spawn_push_registration(&mut self) {
        let backend = Arc::clone(&self.backend);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let token = generate_push_token();
            let result = backend.register_push_token(&token).await;
            let _ = done_tx.send(Completion::PushRegistered { result });
        });
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn apply(&mut self, done: Completion) {
        match done {
            Completion::PageLoaded { seq, page, result } => match result {
                Ok(notifications) => {
                    if !self.state.list_seq.accept(seq) {
                        tracing::debug!("engine: discarding stale page {page} (seq {seq})");
                        return;
                    }
                    let notifications = self.state.replace_list(notifications).to_vec();
                    tracing::debug!(
                        "engine: sending ListReplaced[{page}] count={}",
                        notifications.len()
                    );
                    self.emit(Event::ListReplaced {
                        page,
                        notifications,
                    });
                }
                Err(e) => {
                    tracing::warn!("engine: LoadNotifications[{page}] error: {e}");
                    self.emit(Event::FetchError {
                        context: format!("LoadNotifications[{page}]"),
                        message: e.to_string(),
                    });
                }
            },

            Completion::CountFetched { seq, result } => match result {
                Ok(count) => {
                    if !self.state.count_seq.accept(seq) {
                        tracing::debug!("engine: discarding stale unread count (seq {seq})");
                        return;
                    }
                    let badge = self.state.set_unread_count(count);
                    tracing::debug!("engine: sending BadgeUpdated count={count}");
                    self.emit(Event::BadgeUpdated { badge });
                }
                Err(e) => {
                    tracing::warn!("engine: RefreshUnreadCount error: {e}");
                    self.emit(Event::FetchError {
                        context: "RefreshUnreadCount".to_owned(),
                        message: e.to_string(),
                    });
                }
            },

            Completion::MarkedRead {
                id,
                was_unread,
                list_epoch,
                result,
            } => match result {
                Ok(()) => {
                    self.emit(Event::MutationOk {
                        description: format!("Marked notification {id} as read"),
                    });
                    self.spawn_count_refresh();
                }
                Err(e) => {
                    tracing::warn!("engine: MarkRead {id} error: {e}");
                    if self.settings.rollback_mark_read && was_unread {
                        let restored = self.state.restore_unread(&[id.clone()], list_epoch);
                        if restored.is_empty() {
                            tracing::debug!("engine: newer list applied, keeping {id} as is");
                        } else {
                            self.emit(Event::ReadFlagsChanged {
                                ids: restored,
                                is_read: false,
                            });
                        }
                    }
                    self.emit(Event::MutationError {
                        description: format!("Mark notification {id} as read"),
                        message: e.to_string(),
                    });
                }
            },

            Completion::MarkedAllRead {
                flipped,
                list_epoch,
                result,
            } => match result {
                Ok(()) => {
                    self.emit(Event::MutationOk {
                        description: "Marked all notifications as read".to_owned(),
                    });
                    self.spawn_count_refresh();
                }
                Err(e) => {
                    tracing::warn!("engine: MarkAllRead error: {e}");
                    let restored = self.state.restore_unread(&flipped, list_epoch);
                    if !restored.is_empty() {
                        self.emit(Event::ReadFlagsChanged {
                            ids: restored,
                            is_read: false,
                        });
                    }
                    self.emit(Event::MutationError {
                        description: "Mark all notifications as read".to_owned(),
                        message: e.to_string(),
                    });
                }
            },

            Completion::PushRegistered { result } => match result {
                Ok(()) => tracing::info!("engine: push token registered"),
                Err(e) => {
                    tracing::warn!("engine: push token registration failed: {e}");
                    self.emit(Event::MutationError {
                        description: "Register push token".to_owned(),
                        message: e.to_string(),
                    });
                }
            },

            Completion::PushExpired { id, generation } => {
                if self.state.expire(&id, generation) {
                    self.emit(Event::PushedExpired { id });
                }
            }
        }
    }
}
