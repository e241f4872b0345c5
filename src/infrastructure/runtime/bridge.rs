//! Runtime bridge - connects the sync prompt thread with the async Tokio runtime

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use tokio::runtime::Builder;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::domain::abi::FunctionSignature;
use crate::infrastructure::ethereum::{
    CallRequest, ContractProvider, ProviderConfig, ProviderError, SignerHandle,
};
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::modules::toolkit::result::ResultValue;

/// Commands sent from the workbench to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Resolve the signer
    Connect,
    /// Broadcast a transaction
    SendTransaction { request: CallRequest },
    /// Execute a read-only call
    Call {
        target: Address,
        function: FunctionSignature,
        calldata: Bytes,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Which request a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Send,
    Read,
}

/// Events sent from the async worker to the workbench
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Signer resolved
    Connected {
        endpoint: String,
        signer: SignerHandle,
    },
    /// Transaction mined successfully
    TransactionSent { hash: TxHash },
    /// Read-only call returned
    CallReturned { value: ResultValue },
    /// Operation failed; the error still needs classifying
    Failed {
        operation: Operation,
        error: ProviderError,
    },
}

/// Where the worker gets its provider from
pub enum ProviderSource {
    /// Build an Alloy provider on the worker's runtime
    Config {
        config: ProviderConfig,
        private_key: Option<String>,
    },
    /// Use an already constructed provider
    Ready(Box<dyn ContractProvider>),
}

/// Bridge between the sync prompt thread and the async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: UnboundedSender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Create a bridge whose worker connects to the configured endpoint
    pub fn new(config: ProviderConfig, private_key: Option<String>) -> anyhow::Result<Self> {
        Self::spawn(ProviderSource::Config {
            config,
            private_key,
        })
    }

    /// Create a bridge around an existing provider
    pub fn with_provider(provider: Box<dyn ContractProvider>) -> anyhow::Result<Self> {
        Self::spawn(ProviderSource::Ready(provider))
    }

    fn spawn(source: ProviderSource) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded_channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        // The worker thread owns its own Tokio runtime
        thread::Builder::new()
            .name("callsmith-runtime".into())
            .spawn(move || {
                runtime.block_on(run_async_worker(source, cmd_rx, evt_tx));
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        match self.evt_rx.recv_timeout(timeout) {
            Ok(evt) => Some(evt),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

/// Event sink used by the worker
pub(crate) type EventSender = Sender<RuntimeEvent>;
