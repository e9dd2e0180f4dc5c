//! `LogicClientBuilder` and the assembled Logic-side client.
//!
//! Ties every layer together: one connection, one session on top of it,
//! and every category sharing that session.

use std::sync::Arc;

use f2l_categories::messages::connect::CategoryVersion;
use f2l_categories::{
    AutoPlay, AutoPlayCallbacks, Connect, ConnectCallbacks, GameControl, GameControlCallbacks,
    VoucherPrint, VoucherPrintCallbacks, WapSign,
};
use f2l_category::VersionNegotiable;
use f2l_protocol::JsonCodec;
use f2l_session::{Session, SessionConfig, TransactionScope};
use f2l_transport::Connection;

use crate::F2lError;

/// Builder for a [`LogicClient`].
///
/// Game control and connect callbacks are required; auto play and
/// voucher print are only built when their callbacks are given.
///
/// # Example
///
/// ```rust,ignore
/// use f2l::prelude::*;
///
/// let client = LogicClient::builder()
///     .game_control(logic.clone())
///     .connect_callbacks(logic.clone())
///     .auto_play(logic)
///     .connect_websocket("ws://127.0.0.1:9100")
///     .await?;
/// client.negotiate().await?;
/// ```
#[derive(Default)]
pub struct LogicClientBuilder {
    session_config: SessionConfig,
    game_control: Option<Arc<dyn GameControlCallbacks>>,
    connect: Option<Arc<dyn ConnectCallbacks>>,
    auto_play: Option<Arc<dyn AutoPlayCallbacks>>,
    voucher_print: Option<Arc<dyn VoucherPrintCallbacks>>,
}

impl LogicClientBuilder {
    /// Creates a builder with default session settings and no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn game_control(mut self, callbacks: Arc<dyn GameControlCallbacks>) -> Self {
        self.game_control = Some(callbacks);
        self
    }

    pub fn connect_callbacks(mut self, callbacks: Arc<dyn ConnectCallbacks>) -> Self {
        self.connect = Some(callbacks);
        self
    }

    pub fn auto_play(mut self, callbacks: Arc<dyn AutoPlayCallbacks>) -> Self {
        self.auto_play = Some(callbacks);
        self
    }

    pub fn voucher_print(mut self, callbacks: Arc<dyn VoucherPrintCallbacks>) -> Self {
        self.voucher_print = Some(callbacks);
        self
    }

    /// Starts a session over `connection` and builds every category on it.
    ///
    /// Must be called from inside a Tokio runtime. No traffic is sent
    /// until [`LogicClient::negotiate`].
    ///
    /// # Errors
    /// [`F2lError::MissingCallbacks`] if game control or connect callbacks
    /// were not given. Nothing is started in that case.
    pub fn build<C: Connection>(self, connection: C) -> Result<LogicClient, F2lError> {
        let game_callbacks = self
            .game_control
            .ok_or(F2lError::MissingCallbacks("game control"))?;
        let connect_callbacks = self.connect.ok_or(F2lError::MissingCallbacks("connect"))?;

        let session = Session::start(connection, JsonCodec, self.session_config);

        let game_control = GameControl::new(Arc::clone(&session), game_callbacks)?;
        let mut negotiables: Vec<Arc<dyn VersionNegotiable>> =
            vec![game_control.clone() as Arc<dyn VersionNegotiable>];

        let auto_play = match self.auto_play {
            Some(callbacks) => {
                let auto_play = AutoPlay::new(Arc::clone(&session), callbacks)?;
                negotiables.push(auto_play.clone());
                Some(auto_play)
            }
            None => None,
        };
        let voucher_print = self
            .voucher_print
            .map(|callbacks| VoucherPrint::new(Arc::clone(&session), callbacks))
            .transpose()?;
        let wap_sign = WapSign::new(Arc::clone(&session))?;
        let connect = Connect::new(Arc::clone(&session), connect_callbacks, negotiables)?;

        tracing::info!(connection = %session.connection_id(), "logic client ready");
        Ok(LogicClient {
            session,
            connect,
            game_control,
            auto_play,
            voucher_print,
            wap_sign,
        })
    }

    /// Dials a WebSocket Foundation at `url` and builds the client on it.
    #[cfg(feature = "websocket")]
    pub async fn connect_websocket(self, url: &str) -> Result<LogicClient, F2lError> {
        let connection = f2l_transport::WebSocketConnection::connect(url).await?;
        self.build(connection)
    }
}

/// The Logic side of one Foundation connection.
pub struct LogicClient {
    session: Arc<Session>,
    connect: Arc<Connect<Session>>,
    game_control: Arc<GameControl<Session>>,
    auto_play: Option<Arc<AutoPlay<Session>>>,
    voucher_print: Option<Arc<VoucherPrint<Session>>>,
    wap_sign: Arc<WapSign<Session>>,
}

impl LogicClient {
    /// Creates a new builder.
    pub fn builder() -> LogicClientBuilder {
        LogicClientBuilder::new()
    }

    /// Negotiates versions for every negotiable category.
    pub async fn negotiate(&self) -> Result<Vec<CategoryVersion>, F2lError> {
        let selected = self.connect.negotiate().await?;
        for CategoryVersion { category, version } in &selected {
            tracing::info!(%category, %version, "category version in effect");
        }
        Ok(selected)
    }

    /// Opens a transaction scope with a fresh token. Transactional
    /// requests built while it is alive carry the token.
    pub fn begin_transaction(&self) -> TransactionScope<'_> {
        self.session.begin_transaction()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn connect(&self) -> &Arc<Connect<Session>> {
        &self.connect
    }

    pub fn game_control(&self) -> &Arc<GameControl<Session>> {
        &self.game_control
    }

    /// `None` if the builder was given no auto play callbacks.
    pub fn auto_play(&self) -> Option<&Arc<AutoPlay<Session>>> {
        self.auto_play.as_ref()
    }

    /// `None` if the builder was given no voucher print callbacks.
    pub fn voucher_print(&self) -> Option<&Arc<VoucherPrint<Session>>> {
        self.voucher_print.as_ref()
    }

    pub fn wap_sign(&self) -> &Arc<WapSign<Session>> {
        &self.wap_sign
    }

    /// Closes the session. Categories stay usable as values but every
    /// call fails from here on.
    pub async fn close(&self) {
        self.session.close().await;
    }
}
