//! Command parser for the : command prompt

/// What `copy` puts on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Calldata,
    Raw,
    Human,
}

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Interface selection
    Standards,
    Use(String),
    Abi(String),
    AbiJson {
        name: String,
        json: String,
    },
    Functions,
    Function(String),

    // Form editing
    Set {
        param: String,
        index: Option<usize>,
        value: String,
    },
    Push(String),
    Pop {
        param: String,
        index: usize,
    },
    Text {
        param: String,
        text: String,
    },
    Raw(String),
    Decimals {
        param: String,
        scale: u8,
    },

    // Call setup
    Target(String),
    Value {
        amount: String,
        decimals: Option<u8>,
    },

    // Execution
    Encode(Option<String>),
    Connect,
    Send,
    Read,
    Result(Option<u8>),
    Copy(CopyTarget),

    Show,
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (the leading : is optional)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let input = input.strip_prefix(':').unwrap_or(input);
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let unknown = || Command::Unknown(input.to_string());

    match cmd.to_lowercase().as_str() {
        "standards" | "std" => Command::Standards,
        "use" => args.map(Command::Use).unwrap_or_else(unknown),
        "abi" | "load" => args.map(Command::Abi).unwrap_or_else(unknown),
        "abi-json" | "paste" => args
            .and_then(|a| {
                let (name, json) = a.split_once(char::is_whitespace)?;
                Some(Command::AbiJson {
                    name: name.to_string(),
                    json: json.trim().to_string(),
                })
            })
            .unwrap_or_else(unknown),
        "functions" | "fns" | "ls" => Command::Functions,
        "fn" | "function" | "select" => args.map(Command::Function).unwrap_or_else(unknown),

        "set" => args.and_then(|a| parse_set(&a)).unwrap_or_else(unknown),
        "push" | "add" => args.map(Command::Push).unwrap_or_else(unknown),
        "pop" | "rm" => args
            .and_then(|a| {
                let (param, index) = a.split_once(' ')?;
                Some(Command::Pop {
                    param: param.to_string(),
                    index: index.trim().parse().ok()?,
                })
            })
            .unwrap_or_else(unknown),
        "text" => args
            .and_then(|a| {
                let (param, text) = a.split_once(' ')?;
                Some(Command::Text {
                    param: param.to_string(),
                    text: text.trim().to_string(),
                })
            })
            .unwrap_or_else(unknown),
        "raw" => args.map(Command::Raw).unwrap_or_else(unknown),
        "decimals" | "dec" => args
            .and_then(|a| {
                let (param, scale) = a.split_once(' ')?;
                Some(Command::Decimals {
                    param: param.to_string(),
                    scale: scale.trim().parse().ok()?,
                })
            })
            .unwrap_or_else(unknown),

        "target" | "to" => args.map(Command::Target).unwrap_or_else(unknown),
        "value" => args
            .and_then(|a| {
                let mut words = a.split_whitespace();
                let amount = words.next()?.to_string();
                let decimals = match words.next() {
                    Some(d) => Some(d.parse().ok()?),
                    None => None,
                };
                Some(Command::Value { amount, decimals })
            })
            .unwrap_or_else(unknown),

        "encode" | "enc" => Command::Encode(args),
        "connect" | "conn" => Command::Connect,
        "send" => Command::Send,
        "read" | "call" => Command::Read,
        "result" | "res" => match args {
            None => Command::Result(None),
            Some(a) => a
                .parse()
                .map(|d| Command::Result(Some(d)))
                .unwrap_or_else(|_| unknown()),
        },
        "copy" | "cp" => match args.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("calldata") | Some("data") => Command::Copy(CopyTarget::Calldata),
            Some("raw") => Command::Copy(CopyTarget::Raw),
            Some("human") => Command::Copy(CopyTarget::Human),
            Some(_) => unknown(),
        },

        "show" | "form" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,

        _ => unknown(),
    }
}

/// `<param> <value>` or `<param>[<i>] <value>`; the value may contain spaces
fn parse_set(args: &str) -> Option<Command> {
    let (target, value) = match args.split_once(' ') {
        Some((target, value)) => (target, value.trim()),
        None => (args, ""),
    };

    let (param, index) = match target.split_once('[') {
        Some((param, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            (param, Some(index))
        }
        None => (target, None),
    };
    if param.is_empty() {
        return None;
    }

    Some(Command::Set {
        param: param.to_string(),
        index,
        value: value.to_string(),
    })
}

/// One line per command for `help`
pub const HELP: &[(&str, &str)] = &[
    ("standards", "list built-in and loaded interfaces"),
    ("use <name>", "select an interface (e.g. use erc20)"),
    ("abi <file>", "load a custom interface from a JSON file"),
    ("abi-json <name> <json>", "add a custom interface from pasted JSON"),
    ("functions", "list functions of the selected interface"),
    ("fn <name|signature>", "select a function and reset the form"),
    ("set <param>[<i>] <value>", "set a parameter or array element"),
    ("push <param>", "append an empty array element"),
    ("pop <param> <i>", "remove an array element"),
    ("text <param> <a,b,c>", "replace all array elements from text"),
    ("raw <param>", "toggle raw base-unit input"),
    ("decimals <param> <n>", "set the decimal scale (clears the value)"),
    ("target <address>", "contract address for send/read"),
    ("value <amount> [decimals]", "native value for payable functions"),
    ("encode [<sig> <args..>]", "encode the form, or a one-off signature"),
    ("connect", "connect the signer"),
    ("send", "broadcast the encoded call"),
    ("read", "execute the encoded call read-only"),
    ("result [decimals]", "show the last read result"),
    ("copy calldata|raw|human", "copy to the clipboard"),
    ("show", "show the current form"),
    ("quit", "exit"),
];
