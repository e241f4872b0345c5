//! Async worker - runs in the Tokio runtime and handles provider operations

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info};

use crate::infrastructure::ethereum::{create_provider, ContractProvider, ProviderError};
use crate::infrastructure::runtime::bridge::{
    EventSender, Operation, ProviderSource, RuntimeCommand, RuntimeEvent,
};

/// Run the async worker loop until shutdown or until the bridge is dropped
pub async fn run_async_worker(
    source: ProviderSource,
    mut cmd_rx: UnboundedReceiver<RuntimeCommand>,
    evt_tx: EventSender,
) {
    let mut pending_config = None;
    let mut provider: Option<Arc<dyn ContractProvider>> = match source {
        ProviderSource::Ready(provider) => Some(Arc::from(provider)),
        ProviderSource::Config {
            config,
            private_key,
        } => {
            pending_config = Some((config, private_key));
            None
        }
    };

    while let Some(cmd) = cmd_rx.recv().await {
        let operation = match &cmd {
            RuntimeCommand::Shutdown => {
                debug!("runtime worker shutting down");
                return;
            }
            RuntimeCommand::Connect => Operation::Connect,
            RuntimeCommand::SendTransaction { .. } => Operation::Send,
            RuntimeCommand::Call { .. } => Operation::Read,
        };

        // Build the provider lazily so a bad endpoint can be retried
        if provider.is_none() {
            if let Some((config, private_key)) = &pending_config {
                match create_provider(config.clone(), private_key.clone()).await {
                    Ok(p) => {
                        info!(endpoint = %config.display(), "provider ready");
                        provider = Some(Arc::from(p));
                    }
                    Err(err) => {
                        error!(endpoint = %config.display(), error = %format!("{:#}", err), "provider setup failed");
                        let _ = evt_tx.send(RuntimeEvent::Failed {
                            operation,
                            error: ProviderError::new(format!(
                                "Connection failed ({}): {:#}",
                                config.display(),
                                err
                            )),
                        });
                        continue;
                    }
                }
            }
        }

        let Some(p) = provider.clone() else {
            let _ = evt_tx.send(RuntimeEvent::Failed {
                operation,
                error: ProviderError::new("no provider configured"),
            });
            continue;
        };

        // Reads and sends run concurrently; the workbench limits each to one
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            let event = handle_command(p.as_ref(), cmd).await;
            let _ = evt_tx.send(event);
        });
    }
}

async fn handle_command(provider: &dyn ContractProvider, cmd: RuntimeCommand) -> RuntimeEvent {
    match cmd {
        RuntimeCommand::Connect => match provider.connect().await {
            Ok(signer) => RuntimeEvent::Connected {
                endpoint: provider.endpoint_name(),
                signer,
            },
            Err(error) => RuntimeEvent::Failed {
                operation: Operation::Connect,
                error,
            },
        },
        RuntimeCommand::SendTransaction { request } => {
            match provider.send_transaction(request).await {
                Ok(hash) => RuntimeEvent::TransactionSent { hash },
                Err(error) => RuntimeEvent::Failed {
                    operation: Operation::Send,
                    error,
                },
            }
        }
        RuntimeCommand::Call {
            target,
            function,
            calldata,
        } => match provider.call(target, &function, calldata).await {
            Ok(value) => RuntimeEvent::CallReturned { value },
            Err(error) => RuntimeEvent::Failed {
                operation: Operation::Read,
                error,
            },
        },
        // Handled by the loop
        RuntimeCommand::Shutdown => RuntimeEvent::Failed {
            operation: Operation::Connect,
            error: ProviderError::new("worker shutting down"),
        },
    }
}
