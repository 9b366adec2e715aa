//! Line-oriented command grammar for the terminal shell.

use linkscope_core::{Msg, PresetKind, VendorField};

#[derive(Debug)]
pub(crate) enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

/// Parses one input line. `Ok(None)` for blank lines; `Err` carries a
/// usage hint for the terminal.
pub(crate) fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let head = match words.next() {
        Some(head) => head,
        None => return Ok(None),
    };

    let command = match head {
        "start" => Command::Dispatch(parse_start(words)?),
        "lan" => Command::Dispatch(Msg::PresetClicked(PresetKind::Lan)),
        "wan" => Command::Dispatch(Msg::PresetClicked(PresetKind::Wan)),
        "show" => Command::Dispatch(Msg::HistorySelected(required(words.next(), "show <run-id>")?)),
        "pin" => Command::Dispatch(Msg::ComparePinned(required(words.next(), "pin <run-id>")?)),
        "unpin" => Command::Dispatch(Msg::CompareCleared),
        "vendor" => Command::Dispatch(parse_vendor(words.next())?),
        "set" => Command::Dispatch(parse_set(line)?),
        "bundle" => Command::Dispatch(Msg::BundleRequested),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command {other:?} (try 'help')")),
    };
    Ok(Some(command))
}

pub(crate) fn help_text() -> &'static str {
    "commands:\n\
     \x20 start [target] [noscan]   start a diagnostics run\n\
     \x20 lan | wan                 guided troubleshooter presets\n\
     \x20 show <run-id>             display a run from the history list\n\
     \x20 pin <run-id> | unpin      pin a run as the compare reference\n\
     \x20 vendor open|dismiss|submit\n\
     \x20 set <field> <value>       fill a vendor credential field\n\
     \x20                           (forti-host forti-user forti-pass cisco-host\n\
     \x20                            cisco-user cisco-pass cisco-secret cisco-port)\n\
     \x20 bundle                    download the displayed run's evidence bundle\n\
     \x20 help | quit"
}

fn required(word: Option<&str>, usage: &str) -> Result<String, String> {
    word.map(str::to_string)
        .ok_or_else(|| format!("usage: {usage}"))
}

fn parse_start<'a>(words: impl Iterator<Item = &'a str>) -> Result<Msg, String> {
    let mut target = String::new();
    let mut scan = true;
    for word in words {
        match word {
            "scan" => scan = true,
            "noscan" => scan = false,
            other if target.is_empty() => target = other.to_string(),
            other => return Err(format!("unexpected start argument {other:?}")),
        }
    }
    Ok(Msg::StartClicked { target, scan })
}

fn parse_vendor(action: Option<&str>) -> Result<Msg, String> {
    match action {
        Some("open") => Ok(Msg::VendorPromptOpened),
        Some("dismiss") => Ok(Msg::VendorPromptDismissed),
        Some("submit") => Ok(Msg::VendorSubmitClicked),
        _ => Err("usage: vendor open|dismiss|submit".to_string()),
    }
}

/// `set` keeps the raw line so values may contain spaces.
fn parse_set(line: &str) -> Result<Msg, String> {
    const USAGE: &str = "usage: set <field> <value>";
    let rest = line
        .trim_start()
        .strip_prefix("set")
        .map(str::trim_start)
        .unwrap_or_default();
    let (name, value) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| USAGE.to_string())?;
    let field = match name {
        "forti-host" => VendorField::FortiHost,
        "forti-user" => VendorField::FortiUser,
        "forti-pass" => VendorField::FortiPass,
        "cisco-host" => VendorField::CiscoHost,
        "cisco-user" => VendorField::CiscoUser,
        "cisco-pass" => VendorField::CiscoPass,
        "cisco-secret" => VendorField::CiscoSecret,
        "cisco-port" => VendorField::CiscoPort,
        other => return Err(format!("unknown field {other:?}")),
    };
    Ok(Msg::VendorFieldEdited {
        field,
        value: value.trim().to_string(),
    })
}
