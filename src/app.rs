//! Workbench - owns the session state and every mutation of it

use std::path::Path;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{Action, Command, CopyTarget, NotifyLevel, HELP};
use crate::domain::abi::{Catalog, CatalogError, FunctionSignature, Interface, InterfaceOrigin};
use crate::infrastructure::abi::{load_file, parse_interface};
use crate::infrastructure::ethereum::{CallRequest, ProviderError, SignerHandle};
use crate::infrastructure::runtime::{Operation, RuntimeCommand, RuntimeEvent};
use crate::modules::form::{FieldValue, FormError, FormState};
use crate::modules::toolkit::checksum::{validate_address, AddressValidity};
use crate::modules::toolkit::encode::{self, encode_call, EncodeError, EncodedCall};
use crate::modules::toolkit::errors::{classify, ExecutionError};
use crate::modules::toolkit::result::{render, Rendered, ResultValue};
use crate::modules::toolkit::units::{
    to_raw, UnitsError, DECIMAL_CHOICES, DEFAULT_DECIMALS, MAX_DECIMALS,
};

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: NotifyLevel,
}

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error("failed to load interface: {0}")]
    Load(String),
    #[error("no interface selected (try `use erc20`)")]
    NoInterface,
    #[error("no function selected (try `fn transfer`)")]
    NoFunction,
    #[error("invalid value for '{param}': {message}")]
    Field { param: String, message: String },
    #[error("target address is missing or invalid")]
    InvalidTarget,
    #[error("{0} is not payable")]
    NotPayable(String),
    #[error("{0} is read-only, use `read`")]
    ReadOnly(String),
    #[error("not connected (run `connect` first)")]
    NotConnected,
    #[error("a {0} is already in flight")]
    InFlight(&'static str),
    #[error("nothing encoded yet")]
    NoPayload,
    #[error("no read result yet")]
    NoResult,
}

/// Read-only call waiting to be handed to the runtime
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub target: Address,
    pub function: FunctionSignature,
    pub calldata: Bytes,
}

/// Native value attached to payable calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedValue {
    pub display: String,
    pub decimals: u8,
    pub raw: U256,
}

/// Session controller: interface, function, form, payload and execution state
pub struct Workbench {
    catalog: Catalog,
    default_decimals: u8,
    interface: Option<String>,
    function: Option<FunctionSignature>,
    form: Option<FormState>,

    /// Last successful encode; kept when a later encode fails
    encoded: Option<EncodedCall>,
    /// Set when the form changed after the last successful encode
    payload_stale: bool,

    target: String,
    target_validity: AddressValidity,
    value: Option<AttachedValue>,

    read_result: Option<ResultValue>,
    read_scale: u8,
    last_error: Option<ExecutionError>,
    last_tx: Option<TxHash>,
    signer: Option<SignerHandle>,

    connect_in_flight: bool,
    send_in_flight: bool,
    read_in_flight: bool,
    pending_connect_request: bool,
    pending_send_request: Option<CallRequest>,
    pending_read_request: Option<ReadRequest>,

    status: Option<StatusMessage>,
}

impl Workbench {
    pub fn new(catalog: Catalog, default_decimals: u8) -> Self {
        Self {
            catalog,
            default_decimals: default_decimals.min(MAX_DECIMALS),
            interface: None,
            function: None,
            form: None,
            encoded: None,
            payload_stale: false,
            target: String::new(),
            target_validity: AddressValidity::NotApplicable,
            value: None,
            read_result: None,
            read_scale: DEFAULT_DECIMALS,
            last_error: None,
            last_tx: None,
            signer: None,
            connect_in_flight: false,
            send_in_flight: false,
            read_in_flight: false,
            pending_connect_request: false,
            pending_send_request: None,
            pending_read_request: None,
            status: None,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: NotifyLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
        });
    }

    pub fn take_status(&mut self) -> Option<StatusMessage> {
        self.status.take()
    }

    // === Catalog and selection ===

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Add an interface and select it, returning its function count
    pub fn add_interface(&mut self, interface: Interface) -> usize {
        let name = interface.name.clone();
        let count = interface.functions.len();
        self.catalog.insert(interface);
        info!(interface = %name, functions = count, "interface added");
        self.reset_selection(Some(name));
        count
    }

    /// Parse pasted JSON as a custom interface and select it
    pub fn load_custom_interface(&mut self, name: &str, json: &str) -> Result<usize, WorkbenchError> {
        let interface = parse_interface(name, json, InterfaceOrigin::Custom)?;
        Ok(self.add_interface(interface))
    }

    pub fn select_interface(&mut self, name: &str) -> Result<&Interface, WorkbenchError> {
        let resolved = self.catalog.get(name)?.name.clone();
        self.reset_selection(Some(resolved));
        self.interface().ok_or(WorkbenchError::NoInterface)
    }

    pub fn interface(&self) -> Option<&Interface> {
        let name = self.interface.as_deref()?;
        self.catalog.interfaces().find(|i| i.name == name)
    }

    /// Select a function by name or full signature; the form starts fresh
    pub fn select_function(&mut self, key: &str) -> Result<&FunctionSignature, WorkbenchError> {
        let interface = self.interface().ok_or(WorkbenchError::NoInterface)?;
        let function = interface.function(key)?.clone();

        self.form = Some(FormState::with_decimals(&function, self.default_decimals));
        self.encoded = None;
        self.payload_stale = false;
        self.value = None;
        self.read_result = None;
        self.last_error = None;
        info!(function = %function.signature, "function selected");

        Ok(&*self.function.insert(function))
    }

    pub fn function(&self) -> Option<&FunctionSignature> {
        self.function.as_ref()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    fn reset_selection(&mut self, interface: Option<String>) {
        self.interface = interface;
        self.function = None;
        self.form = None;
        self.encoded = None;
        self.payload_stale = false;
        self.value = None;
        self.read_result = None;
        self.last_error = None;
    }

    // === Form editing ===

    fn edit_form<T>(
        &mut self,
        edit: impl FnOnce(&mut FormState) -> Result<T, FormError>,
    ) -> Result<T, WorkbenchError> {
        let form = self.form.as_mut().ok_or(WorkbenchError::NoFunction)?;
        let result = edit(form)?;
        self.payload_stale = self.encoded.is_some();
        debug!(stale = self.payload_stale, "form edited");
        Ok(result)
    }

    pub fn set_param(
        &mut self,
        param: &str,
        index: Option<usize>,
        value: &str,
    ) -> Result<(), WorkbenchError> {
        self.edit_form(|form| match index {
            Some(i) => form.set_element(param, i, value),
            None => form.set_value(param, value),
        })
    }

    pub fn push_element(&mut self, param: &str) -> Result<usize, WorkbenchError> {
        self.edit_form(|form| form.add_element(param))
    }

    pub fn remove_element(&mut self, param: &str, index: usize) -> Result<usize, WorkbenchError> {
        self.edit_form(|form| form.remove_element(param, index))
    }

    pub fn set_array_text(&mut self, param: &str, text: &str) -> Result<usize, WorkbenchError> {
        self.edit_form(|form| form.set_array_text(param, text))
    }

    pub fn toggle_raw_mode(&mut self, param: &str) -> Result<bool, WorkbenchError> {
        self.edit_form(|form| form.toggle_raw_mode(param))
    }

    pub fn set_decimal_scale(&mut self, param: &str, scale: u8) -> Result<(), WorkbenchError> {
        self.edit_form(|form| form.set_decimal_scale(param, scale))
    }

    // === Call setup ===

    pub fn set_target(&mut self, target: &str) -> AddressValidity {
        self.target = target.trim().to_string();
        self.target_validity = validate_address(&self.target);
        self.target_validity
    }

    pub fn target_validity(&self) -> AddressValidity {
        self.target_validity
    }

    /// Attach native value to a payable function
    pub fn set_attached_value(
        &mut self,
        amount: &str,
        decimals: Option<u8>,
    ) -> Result<U256, WorkbenchError> {
        let function = self.function.as_ref().ok_or(WorkbenchError::NoFunction)?;
        if !function.is_payable() {
            return Err(WorkbenchError::NotPayable(function.name.clone()));
        }

        let decimals = decimals.unwrap_or(DEFAULT_DECIMALS);
        let raw = to_raw(amount, decimals)?;
        let raw = U256::from_str_radix(&raw, 10)
            .map_err(|_| UnitsError::InvalidNumber(amount.trim().to_string()))?;
        self.value = Some(AttachedValue {
            display: amount.trim().to_string(),
            decimals,
            raw,
        });
        Ok(raw)
    }

    pub fn attached_value(&self) -> Option<&AttachedValue> {
        self.value.as_ref()
    }

    // === Encoding ===

    /// Encode the current form; on failure the previous payload is kept
    pub fn encode(&mut self) -> Result<&EncodedCall, WorkbenchError> {
        let function = self.function.as_ref().ok_or(WorkbenchError::NoFunction)?;
        let form = self.form.as_ref().ok_or(WorkbenchError::NoFunction)?;

        if let Some((param, message)) = form.first_error() {
            return Err(WorkbenchError::Field {
                param: param.to_string(),
                message: message.to_string(),
            });
        }

        let call = encode_call(function, &form.raw_args())?;
        debug!(calldata = %call.to_hex(), "payload updated");
        self.payload_stale = false;
        Ok(&*self.encoded.insert(call))
    }

    pub fn encoded(&self) -> Option<&EncodedCall> {
        self.encoded.as_ref()
    }

    pub fn is_payload_stale(&self) -> bool {
        self.payload_stale
    }

    fn checked_target(&self) -> Result<Address, WorkbenchError> {
        if self.target_validity != AddressValidity::Valid {
            return Err(WorkbenchError::InvalidTarget);
        }
        self.target
            .parse::<Address>()
            .map_err(|_| WorkbenchError::InvalidTarget)
    }

    // === Execution requests ===

    pub fn request_connect(&mut self) -> Result<(), WorkbenchError> {
        if self.connect_in_flight {
            return Err(WorkbenchError::InFlight("connect"));
        }
        self.connect_in_flight = true;
        self.pending_connect_request = true;
        Ok(())
    }

    /// Queue a broadcast of the freshly encoded form
    pub fn request_send(&mut self) -> Result<(), WorkbenchError> {
        if self.send_in_flight {
            return Err(WorkbenchError::InFlight("transaction"));
        }
        let function = self.function.as_ref().ok_or(WorkbenchError::NoFunction)?;
        if function.is_read_only() {
            return Err(WorkbenchError::ReadOnly(function.name.clone()));
        }
        if self.signer.is_none() {
            return Err(WorkbenchError::NotConnected);
        }
        let to = self.checked_target()?;
        let value = match (&self.value, function.is_payable()) {
            (Some(value), true) => value.raw,
            _ => U256::ZERO,
        };

        let data = Bytes::from(self.encode()?.data.clone());
        info!(%to, %value, "transaction queued");
        self.send_in_flight = true;
        self.pending_send_request = Some(CallRequest { to, data, value });
        Ok(())
    }

    /// Queue a read-only call of the freshly encoded form
    pub fn request_read(&mut self) -> Result<(), WorkbenchError> {
        if self.read_in_flight {
            return Err(WorkbenchError::InFlight("read"));
        }
        let target = self.checked_target()?;
        let calldata = Bytes::from(self.encode()?.data.clone());
        let function = self.function.clone().ok_or(WorkbenchError::NoFunction)?;

        info!(%target, function = %function.signature, "read queued");
        self.read_in_flight = true;
        self.pending_read_request = Some(ReadRequest {
            target,
            function,
            calldata,
        });
        Ok(())
    }

    pub fn take_connect_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_connect_request)
    }

    pub fn take_send_request(&mut self) -> Option<CallRequest> {
        self.pending_send_request.take()
    }

    pub fn take_read_request(&mut self) -> Option<ReadRequest> {
        self.pending_read_request.take()
    }

    /// Drain every queued request as runtime commands, tagged with their operation
    pub fn take_runtime_commands(&mut self) -> Vec<(Operation, RuntimeCommand)> {
        let mut commands = Vec::new();
        if self.take_connect_request() {
            commands.push((Operation::Connect, RuntimeCommand::Connect));
        }
        if let Some(request) = self.take_send_request() {
            commands.push((Operation::Send, RuntimeCommand::SendTransaction { request }));
        }
        if let Some(read) = self.take_read_request() {
            commands.push((
                Operation::Read,
                RuntimeCommand::Call {
                    target: read.target,
                    function: read.function,
                    calldata: read.calldata,
                },
            ));
        }
        commands
    }

    /// A queued request never reached the runtime; clear its in-flight flag
    pub fn abort_request(&mut self, operation: Operation, reason: impl Into<String>) -> Action {
        self.apply_event(RuntimeEvent::Failed {
            operation,
            error: ProviderError::new(reason),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.connect_in_flight || self.send_in_flight || self.read_in_flight
    }

    pub fn signer(&self) -> Option<&SignerHandle> {
        self.signer.as_ref()
    }

    pub fn last_tx(&self) -> Option<TxHash> {
        self.last_tx
    }

    pub fn last_error(&self) -> Option<&ExecutionError> {
        self.last_error.as_ref()
    }

    // === Results ===

    pub fn read_result(&self) -> Option<&ResultValue> {
        self.read_result.as_ref()
    }

    pub fn set_read_scale(&mut self, scale: u8) -> Result<(), WorkbenchError> {
        if scale > MAX_DECIMALS {
            return Err(UnitsError::ScaleTooLarge(scale).into());
        }
        self.read_scale = scale;
        Ok(())
    }

    pub fn rendered_result(&self) -> Option<Rendered> {
        self.read_result
            .as_ref()
            .map(|value| render(value, self.read_scale))
    }

    /// Apply a completion event from the runtime
    pub fn apply_event(&mut self, event: RuntimeEvent) -> Action {
        match event {
            RuntimeEvent::Connected { endpoint, signer } => {
                self.connect_in_flight = false;
                let msg = format!(
                    "Connected {} on chain {} via {}{}",
                    signer.address,
                    signer.chain_id,
                    endpoint,
                    if signer.local { "" } else { " (node account)" }
                );
                self.signer = Some(signer);
                Action::Notify(msg, NotifyLevel::Info)
            }
            RuntimeEvent::TransactionSent { hash } => {
                self.send_in_flight = false;
                self.last_tx = Some(hash);
                self.last_error = None;
                Action::Notify(format!("Transaction mined: {}", hash), NotifyLevel::Info)
            }
            RuntimeEvent::CallReturned { value } => {
                self.read_in_flight = false;
                self.last_error = None;
                let rendered = render(&value, self.read_scale);
                self.read_result = Some(value);
                Action::Notify(format!("Result: {}", rendered.human), NotifyLevel::Info)
            }
            RuntimeEvent::Failed { operation, error } => {
                match operation {
                    Operation::Connect => self.connect_in_flight = false,
                    Operation::Send => self.send_in_flight = false,
                    Operation::Read => self.read_in_flight = false,
                }
                let classified = classify(&error.into_raw());
                let msg = classified.to_string();
                self.last_error = Some(classified);
                Action::Notify(msg, NotifyLevel::Error)
            }
        }
    }

    /// Apply an action returned by a command
    pub fn apply_action(&mut self, action: &Action) {
        if let Action::Notify(msg, level) = action {
            self.set_status(msg.clone(), *level);
        }
    }

    // === Listings ===

    pub fn standards_listing(&self) -> Vec<String> {
        self.catalog
            .interfaces()
            .map(|i| {
                let origin = match &i.origin {
                    InterfaceOrigin::Standard => "standard".to_string(),
                    InterfaceOrigin::Custom => "custom".to_string(),
                    InterfaceOrigin::File(path) => path.display().to_string(),
                };
                format!("{:<34} {:>3} functions  [{}]", i.name, i.functions.len(), origin)
            })
            .collect()
    }

    pub fn functions_listing(&self) -> Result<Vec<String>, WorkbenchError> {
        let interface = self.interface().ok_or(WorkbenchError::NoInterface)?;
        Ok(interface
            .functions
            .iter()
            .map(|f| {
                let key = if interface.is_overloaded(&f.name) {
                    f.signature.clone()
                } else {
                    f.name.clone()
                };
                format!("{}  {:<8} {}", f.selector_hex(), f.mutability.label(), key)
            })
            .collect())
    }

    pub fn form_listing(&self) -> Result<Vec<String>, WorkbenchError> {
        let function = self.function.as_ref().ok_or(WorkbenchError::NoFunction)?;
        let form = self.form.as_ref().ok_or(WorkbenchError::NoFunction)?;

        let mut lines = vec![format!(
            "{} [{}] {}",
            function.signature,
            function.mutability.label(),
            function.selector_hex()
        )];

        for param in form.params() {
            let mut header = format!("  {} ({})", param.key, param.param.kind);
            if param.kind.is_numeric() {
                header.push_str(&format!(
                    " decimals={}{}",
                    param.decimal_scale,
                    if param.raw_mode { " raw" } else { "" }
                ));
            }
            lines.push(header);

            let entries = param.value.entries();
            for (i, entry) in entries.iter().enumerate() {
                let label = match &param.value {
                    FieldValue::Scalar(_) => "    =".to_string(),
                    FieldValue::Array(_) => format!("    [{}]", i),
                };
                let mut line = format!(
                    "{} {} {}",
                    label,
                    entry.validity.symbol(),
                    if entry.display.is_empty() { "<empty>" } else { entry.display.as_str() }
                );
                if entry.raw != entry.display && !entry.raw.is_empty() {
                    line.push_str(&format!("  -> {}", entry.raw));
                }
                if let Some(error) = &entry.error {
                    line.push_str(&format!("  ! {}", error));
                }
                lines.push(line);
            }
            if entries.is_empty() {
                lines.push("    (no elements)".to_string());
            }
        }

        lines.push(format!(
            "  target {} {}",
            self.target_validity.symbol(),
            if self.target.is_empty() { "<unset>" } else { self.target.as_str() }
        ));
        if let Some(value) = &self.value {
            lines.push(format!("  value {} ({} wei)", value.display, value.raw));
        }
        if let Some(call) = &self.encoded {
            lines.push(format!(
                "  calldata{} {}",
                if self.payload_stale { " (stale)" } else { "" },
                call.to_hex()
            ));
        }
        Ok(lines)
    }

    // === Commands ===

    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match self.try_execute(cmd) {
            Ok(action) => action,
            Err(err) => Action::Notify(err.to_string(), NotifyLevel::Error),
        }
    }

    fn try_execute(&mut self, cmd: &Command) -> Result<Action, WorkbenchError> {
        let action = match cmd {
            Command::Standards => Action::Print(self.standards_listing()),
            Command::Use(name) => {
                let interface = self.select_interface(name)?;
                notify(format!(
                    "Using {} ({} functions)",
                    interface.name,
                    interface.functions.len()
                ))
            }
            Command::Abi(path) => {
                let interface = load_file(Path::new(path))
                    .map_err(|e| WorkbenchError::Load(format!("{:#}", e)))?;
                let name = interface.name.clone();
                let count = self.add_interface(interface);
                notify(format!("Loaded {} ({} functions)", name, count))
            }
            Command::AbiJson { name, json } => {
                let count = self.load_custom_interface(name, json)?;
                notify(format!("Added {} ({} functions)", name, count))
            }
            Command::Functions => Action::Print(self.functions_listing()?),
            Command::Function(key) => {
                let function = self.select_function(key)?;
                notify(format!("Selected {}", function.signature))
            }

            Command::Set {
                param,
                index,
                value,
            } => {
                self.set_param(param, *index, value)?;
                self.field_feedback(param, *index)
            }
            Command::Push(param) => {
                let len = self.push_element(param)?;
                notify(format!("{} now has {} elements", param, len))
            }
            Command::Pop { param, index } => {
                let len = self.remove_element(param, *index)?;
                notify(format!("{} now has {} elements", param, len))
            }
            Command::Text { param, text } => {
                let len = self.set_array_text(param, text)?;
                notify(format!("{} set to {} elements", param, len))
            }
            Command::Raw(param) => {
                let raw = self.toggle_raw_mode(param)?;
                notify(format!(
                    "{} input is now {}",
                    param,
                    if raw { "raw base units" } else { "decimal scaled" }
                ))
            }
            Command::Decimals { param, scale } => {
                self.set_decimal_scale(param, *scale)?;
                let mut msg = format!("{} uses {} decimals (value cleared)", param, scale);
                if !DECIMAL_CHOICES.contains(scale) {
                    msg.push_str(&format!(
                        "; common scales are {}",
                        DECIMAL_CHOICES.map(|d| d.to_string()).join(", ")
                    ));
                }
                notify(msg)
            }

            Command::Target(address) => match self.set_target(address) {
                AddressValidity::Valid => notify(format!("Target {}", self.target)),
                AddressValidity::Invalid => Action::Notify(
                    format!("Target {} is not a valid address", self.target),
                    NotifyLevel::Warn,
                ),
                AddressValidity::NotApplicable => Action::Notify(
                    "Target must be a 0x-prefixed address".to_string(),
                    NotifyLevel::Warn,
                ),
            },
            Command::Value { amount, decimals } => {
                let raw = self.set_attached_value(amount, *decimals)?;
                notify(format!("Attached value {} ({} wei)", amount, raw))
            }

            Command::Encode(Some(args)) => encode::encode(Some(args.clone())),
            Command::Encode(None) => {
                let call = self.encode()?;
                Action::Print(vec![call.to_hex()])
            }
            Command::Connect => {
                self.request_connect()?;
                notify("Connecting...".to_string())
            }
            Command::Send => {
                self.request_send()?;
                notify("Sending transaction...".to_string())
            }
            Command::Read => {
                self.request_read()?;
                notify("Reading...".to_string())
            }
            Command::Result(scale) => {
                if let Some(scale) = scale {
                    self.set_read_scale(*scale)?;
                }
                let rendered = self.rendered_result().ok_or(WorkbenchError::NoResult)?;
                Action::Print(vec![
                    format!("human: {}", rendered.human),
                    format!("raw:   {}", rendered.raw),
                ])
            }
            Command::Copy(target) => Action::Copy(self.copy_text(*target)?),

            Command::Show => Action::Print(self.form_listing()?),
            Command::Help => Action::Print(
                HELP.iter()
                    .map(|(usage, about)| format!("{:<28} {}", usage, about))
                    .collect(),
            ),
            Command::Quit => Action::Quit,
            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        };
        Ok(action)
    }

    fn copy_text(&self, target: CopyTarget) -> Result<String, WorkbenchError> {
        match target {
            CopyTarget::Calldata => self
                .encoded
                .as_ref()
                .map(EncodedCall::to_hex)
                .ok_or(WorkbenchError::NoPayload),
            CopyTarget::Raw => self
                .rendered_result()
                .map(|r| r.raw)
                .ok_or(WorkbenchError::NoResult),
            CopyTarget::Human => self
                .rendered_result()
                .map(|r| r.human)
                .ok_or(WorkbenchError::NoResult),
        }
    }

    /// Per-field feedback after an edit
    fn field_feedback(&self, param: &str, index: Option<usize>) -> Action {
        let Some(state) = self.form.as_ref().and_then(|f| f.param(param).ok()) else {
            return Action::None;
        };
        let entry = match index {
            Some(i) => state.value.entries().get(i),
            None => state.value.entries().first(),
        };
        let Some(entry) = entry else {
            return Action::None;
        };

        if let Some(error) = &entry.error {
            return Action::Notify(format!("{}: {}", param, error), NotifyLevel::Warn);
        }
        if entry.validity == AddressValidity::Invalid {
            return Action::Notify(
                format!("{}: invalid address or checksum", param),
                NotifyLevel::Warn,
            );
        }
        if state.is_scaled() && !entry.raw.is_empty() {
            return notify(format!("{} = {} (raw {})", param, entry.display, entry.raw));
        }
        Action::None
    }
}

fn notify(msg: String) -> Action {
    Action::Notify(msg, NotifyLevel::Info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::abi::standard_catalog;

    const RECIPIENT: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

    fn workbench() -> Workbench {
        Workbench::new(standard_catalog(), DEFAULT_DECIMALS)
    }

    fn transfer_workbench() -> Workbench {
        let mut bench = workbench();
        bench.select_interface("erc20").unwrap();
        bench.select_function("transfer").unwrap();
        bench
    }

    fn connected(bench: &mut Workbench) {
        bench.apply_event(RuntimeEvent::Connected {
            endpoint: "mock".into(),
            signer: SignerHandle {
                address: Address::ZERO,
                chain_id: 31337,
                local: true,
            },
        });
    }

    #[test]
    fn test_function_requires_interface() {
        let mut bench = workbench();
        assert!(matches!(
            bench.select_function("transfer"),
            Err(WorkbenchError::NoInterface)
        ));
        assert!(matches!(bench.encode(), Err(WorkbenchError::NoFunction)));
    }

    #[test]
    fn test_encode_transfer() {
        let mut bench = transfer_workbench();
        bench.set_param("to", None, RECIPIENT).unwrap();
        bench.set_param("amount", None, "1.5").unwrap();

        let call = bench.encode().unwrap();
        assert!(call.to_hex().starts_with("0xa9059cbb"));
        assert!(!bench.is_payload_stale());
    }

    #[test]
    fn test_failed_encode_keeps_payload() {
        let mut bench = transfer_workbench();
        bench.set_param("to", None, RECIPIENT).unwrap();
        bench.set_param("amount", None, "1").unwrap();
        let before = bench.encode().unwrap().clone();

        bench.set_param("to", None, "0x1234").unwrap();
        assert!(bench.is_payload_stale());
        assert!(matches!(bench.encode(), Err(WorkbenchError::Encode(_))));
        assert_eq!(bench.encoded(), Some(&before));
    }

    #[test]
    fn test_field_error_blocks_encode() {
        let mut bench = transfer_workbench();
        bench.set_param("to", None, RECIPIENT).unwrap();
        bench.set_param("amount", None, "1.x").unwrap();
        assert!(matches!(
            bench.encode(),
            Err(WorkbenchError::Field { ref param, .. }) if param == "amount"
        ));
    }

    #[test]
    fn test_selecting_function_resets_state() {
        let mut bench = transfer_workbench();
        bench.set_param("to", None, RECIPIENT).unwrap();
        bench.set_param("amount", None, "1").unwrap();
        bench.encode().unwrap();

        bench.select_function("approve").unwrap();
        assert!(bench.encoded().is_none());
        let form = bench.form().unwrap();
        assert!(form
            .params()
            .iter()
            .all(|p| p.value.entries().iter().all(|e| e.display.is_empty())));
    }

    #[test]
    fn test_send_requires_connection_and_target() {
        let mut bench = transfer_workbench();
        bench.set_param("to", None, RECIPIENT).unwrap();
        bench.set_param("amount", None, "1").unwrap();

        assert!(matches!(bench.request_send(), Err(WorkbenchError::NotConnected)));
        connected(&mut bench);
        assert!(matches!(bench.request_send(), Err(WorkbenchError::InvalidTarget)));

        bench.set_target(RECIPIENT);
        bench.request_send().unwrap();
        assert!(matches!(
            bench.request_send(),
            Err(WorkbenchError::InFlight(_))
        ));

        let request = bench.take_send_request().unwrap();
        assert_eq!(request.value, U256::ZERO);
        assert_eq!(&request.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert!(bench.take_send_request().is_none());

        bench.apply_event(RuntimeEvent::TransactionSent {
            hash: TxHash::ZERO,
        });
        assert!(!bench.is_busy());
        assert_eq!(bench.last_tx(), Some(TxHash::ZERO));
    }

    #[test]
    fn test_read_only_functions_cannot_be_sent() {
        let mut bench = workbench();
        bench.select_interface("erc20").unwrap();
        bench.select_function("totalSupply").unwrap();
        connected(&mut bench);
        bench.set_target(RECIPIENT);
        assert!(matches!(bench.request_send(), Err(WorkbenchError::ReadOnly(_))));
        bench.request_read().unwrap();
        assert!(bench.take_read_request().is_some());
    }

    #[test]
    fn test_read_result_and_scale() {
        let mut bench = workbench();
        bench.select_interface("erc20").unwrap();
        bench.select_function("totalSupply").unwrap();
        bench.set_target(RECIPIENT);
        bench.request_read().unwrap();

        bench.apply_event(RuntimeEvent::CallReturned {
            value: ResultValue::integer("2500000"),
        });
        assert_eq!(bench.rendered_result().unwrap().human, "0.0000000000025");

        bench.set_read_scale(6).unwrap();
        let rendered = bench.rendered_result().unwrap();
        assert_eq!(rendered.human, "2.5");
        assert_eq!(rendered.raw, "2500000");
        assert_eq!(
            bench.execute_command(&Command::Copy(CopyTarget::Human)),
            Action::Copy("2.5".into())
        );
    }

    #[test]
    fn test_failure_is_classified_and_clears_flag() {
        let mut bench = workbench();
        bench.select_interface("erc20").unwrap();
        bench.select_function("totalSupply").unwrap();
        bench.set_target(RECIPIENT);
        bench.request_read().unwrap();

        let action = bench.apply_event(RuntimeEvent::Failed {
            operation: Operation::Read,
            error: ProviderError::new("execution reverted: Pausable: paused"),
        });
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Error)));
        assert!(!bench.is_busy());
        assert_eq!(bench.last_error().unwrap().title, "Transaction Would Fail");
    }

    #[test]
    fn test_aborted_request_clears_in_flight() {
        let mut bench = workbench();
        bench.select_interface("erc20").unwrap();
        bench.select_function("totalSupply").unwrap();
        bench.set_target(RECIPIENT);
        bench.request_read().unwrap();

        let commands = bench.take_runtime_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].0, Operation::Read);
        assert!(bench.is_busy());

        let action = bench.abort_request(Operation::Read, "Worker channel closed");
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Error)));
        assert!(!bench.is_busy());
        bench.request_read().unwrap();
    }

    #[test]
    fn test_uncommon_scale_lists_choices() {
        let mut bench = transfer_workbench();
        let Action::Notify(msg, _) = bench.execute_command(&Command::Decimals {
            param: "amount".into(),
            scale: 7,
        }) else {
            panic!("expected notification");
        };
        assert!(msg.ends_with("common scales are 0, 6, 8, 18"), "{msg}");

        let Action::Notify(msg, _) = bench.execute_command(&Command::Decimals {
            param: "amount".into(),
            scale: 6,
        }) else {
            panic!("expected notification");
        };
        assert!(!msg.contains("common scales"));
    }

    #[test]
    fn test_attached_value_only_for_payable() {
        let mut bench = transfer_workbench();
        assert!(matches!(
            bench.set_attached_value("1", None),
            Err(WorkbenchError::NotPayable(_))
        ));

        let action = bench.execute_command(&crate::core::parse_command(
            r#"abi-json Vault [{"type": "function", "name": "deposit", "inputs": [], "outputs": [], "stateMutability": "payable"}]"#,
        ));
        assert_eq!(
            action,
            Action::Notify("Added Vault (1 functions)".into(), NotifyLevel::Info)
        );
        assert_eq!(bench.interface().unwrap().name, "Vault");
        bench.select_function("deposit").unwrap();
        let raw = bench.set_attached_value("0.1", None).unwrap();
        assert_eq!(raw, U256::from(100_000_000_000_000_000u64));
    }

    #[test]
    fn test_execute_command_flow() {
        let mut bench = workbench();
        for line in ["use erc20", "fn transfer", "set amount 2"] {
            let action = bench.execute_command(&crate::core::parse_command(line));
            assert!(matches!(action, Action::Notify(_, NotifyLevel::Info)), "{line}");
        }
        let action = bench.execute_command(&crate::core::parse_command(&format!("set to {}", RECIPIENT)));
        assert_eq!(action, Action::None);

        let Action::Print(lines) = bench.execute_command(&Command::Encode(None)) else {
            panic!("expected calldata");
        };
        assert!(lines[0].starts_with("0xa9059cbb"));
        assert_eq!(
            bench.execute_command(&Command::Copy(CopyTarget::Calldata)),
            Action::Copy(lines[0].clone())
        );

        let action = bench.execute_command(&crate::core::parse_command("fn nope"));
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Error)));
    }
}
