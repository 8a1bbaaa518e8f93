//! Daemon - wires configuration, transport, media and ingestion together
//!
//! Checks the bot identity, then runs exactly one ingestion mode until a
//! shutdown signal arrives.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::ApiServer;
use crate::channels::telegram::{self, TelegramClient};
use crate::channels::{Transport, User};
use crate::config::RunMode;
use crate::dispatch::{DispatchOptions, Dispatcher};
use crate::media::YtDlp;
use crate::{Config, Error, Result};

/// The clip-relay daemon
pub struct Daemon {
    config: Config,
    transport: Arc<dyn Transport>,
    dispatcher: Arc<Dispatcher>,
}

impl Daemon {
    /// Create a daemon talking to the real Bot API and `yt-dlp`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is incomplete
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let transport: Arc<dyn Transport> = Arc::new(telegram_client(&config));
        let ytdlp = YtDlp::new(&config.ytdlp_path, &config.download_dir);
        if !ytdlp.is_available() {
            tracing::warn!(
                program = %config.ytdlp_path.display(),
                "yt-dlp not found, downloads will fail"
            );
        }
        let ytdlp = Arc::new(ytdlp);

        Ok(Self::with_parts(config, transport, ytdlp.clone(), ytdlp))
    }

    /// Create a daemon from explicit collaborators
    #[must_use]
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn crate::media::MetadataResolver>,
        materializer: Arc<dyn crate::media::Materializer>,
    ) -> Self {
        let options = DispatchOptions {
            plain_text: config.plain_text_reply,
            ..DispatchOptions::default()
        };
        let dispatcher = Arc::new(Dispatcher::new(
            transport.clone(),
            resolver,
            materializer,
            options,
        ));

        Self {
            config,
            transport,
            dispatcher,
        }
    }

    /// Run until SIGINT or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns error if the identity check, webhook registration or the
    /// listener fails
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            wait_for_signal().await;
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        });

        self.run_until(shutdown_rx).await
    }

    /// Run until `shutdown` flips to `true`
    ///
    /// # Errors
    ///
    /// Returns error if the identity check, webhook registration or the
    /// listener fails
    pub async fn run_until(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let me = self.identify().await?;
        tracing::info!(
            name = %me.first_name,
            username = me.username.as_deref().unwrap_or_default(),
            mode = %self.config.mode,
            "bot started"
        );

        match self.config.mode {
            RunMode::Polling => self.run_polling(shutdown).await,
            RunMode::Webhook => self.run_webhook(shutdown).await,
        }
    }

    async fn identify(&self) -> Result<User> {
        self.transport
            .get_me()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to get bot info"))
    }

    async fn run_polling(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!("starting in polling mode");

        let handle = tokio::spawn(telegram::run_polling(
            self.transport.clone(),
            self.dispatcher.clone(),
            self.config.polling_options(),
            shutdown,
        ));

        let cursor = handle
            .await
            .map_err(|e| Error::Channel(format!("polling task failed: {e}")))?;
        tracing::debug!(cursor, "polling task finished");
        Ok(())
    }

    async fn run_webhook(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let endpoint = self
            .config
            .webhook_endpoint()
            .ok_or_else(|| Error::Config("WEBHOOK_URL must be set for webhook mode".to_string()))?;

        tracing::info!(endpoint = %endpoint, "starting in webhook mode");

        if let Err(e) = self.transport.deregister_callback().await {
            tracing::warn!(error = %e, "failed to delete existing webhook");
        }

        self.transport
            .register_callback(&endpoint)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to set webhook"))?;

        let server = ApiServer::new(self.dispatcher.clone(), self.config.port);
        let served = server.run(shutdown).await;

        match self.transport.deregister_callback().await {
            Ok(()) => tracing::info!("webhook deleted on shutdown"),
            Err(e) => tracing::warn!(error = %e, "failed to delete webhook on shutdown"),
        }

        served
    }
}

/// Build the Bot API client for `config`
#[must_use]
pub fn telegram_client(config: &Config) -> TelegramClient {
    match &config.telegram_api_base {
        Some(base) => TelegramClient::with_api_base(config.telegram_token.clone(), base.clone()),
        None => TelegramClient::new(config.telegram_token.clone()),
    }
}

/// Resolve when the process is asked to stop
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
