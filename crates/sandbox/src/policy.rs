//! Command security policy: block-lists, allow-list, and environment
//! sanitisation. All tables are data, not code.

/// Commands never allowed, matched exact or as a leading word.
const BLOCKED_COMMANDS: &[&str] = &[
    // file deletion
    "rm", "rm -rf", "rm -r", "rmdir", "del", "erase", "rd", "shred", "unlink",
    // destructive disk operations
    "format", "fdisk", "mkfs", "dd",
    // privilege escalation
    "sudo", "su", "runas", "doas",
    // system power and init
    "shutdown", "reboot", "poweroff", "halt", "init",
    // network attack tooling
    "nmap", "netcat", "nc", "curl -X DELETE", "wget --delete",
    // process and permission abuse
    ":(){:|:&};:", "chmod 777", "chown", "kill", "killall", "pkill",
    // windows administration
    "reg delete", "wmic", "net user", "net localgroup", "takeown", "icacls",
];

/// Substrings never allowed anywhere in a command.
const BLOCKED_PATTERNS: &[&str] = &[
    // path traversal
    "../", "..\\",
    // chaining and substitution that could smuggle a second command
    ";", "&&", "||", "|", "`", "$(", ">(", "<(",
    // redirection into system locations
    "> /dev/", "> /etc/", "> C:\\Windows",
    // environment manipulation
    "export PATH", "set PATH",
    // root-level file moves
    "mv /", "cp -r /",
];

/// Keywords that signal destructive intent regardless of the command.
const BLOCKED_KEYWORDS: &[&str] = &[
    "delete",
    "remove",
    "destroy",
    "wipe",
    "erase",
    "truncate",
    "purge",
    "clean --all",
    "reset --hard",
    "drop database",
    "drop table",
];

/// Allow-list entry: either any arguments, or a fixed set of permitted
/// first arguments.
enum Allow {
    Any,
    Subcommands(&'static [&'static str]),
}

const ALLOWED_COMMANDS: &[(&str, Allow)] = &[
    // package managers
    (
        "npm",
        Allow::Subcommands(&[
            "install", "run", "build", "test", "start", "init", "ci", "--version", "-v", "list",
            "outdated", "update",
        ]),
    ),
    ("npx", Allow::Any),
    (
        "pip",
        Allow::Subcommands(&["install", "list", "freeze", "--version", "-V", "show", "check"]),
    ),
    ("python", Allow::Any),
    ("python3", Allow::Any),
    ("node", Allow::Any),
    // build tools
    ("vite", Allow::Subcommands(&["dev", "build", "preview"])),
    ("webpack", Allow::Any),
    ("tsc", Allow::Any),
    // test runners
    ("pytest", Allow::Any),
    ("jest", Allow::Any),
    ("vitest", Allow::Any),
    // git, read-only operations only
    ("git", Allow::Subcommands(&["status", "log", "diff", "branch"])),
    // utilities
    ("mkdir", Allow::Any),
    ("cd", Allow::Any),
    ("ls", Allow::Any),
    ("dir", Allow::Any),
    ("cat", Allow::Any),
    ("type", Allow::Any),
    ("echo", Allow::Any),
];

/// Environment key fragments that are never forwarded to a child.
const SENSITIVE_ENV_FRAGMENTS: &[&str] = &["SECRET", "KEY", "TOKEN", "PASSWORD", "PRIVATE"];

/// Check a command against all four deny layers.
///
/// Returns `Err(reason)` when the command must not run. The caller is
/// responsible for never spawning in that case.
pub fn check_command(command: &str) -> Result<(), String> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return Err("empty command".to_string());
    }
    let lower = trimmed.to_lowercase();

    // Layer 1: blocked commands at the start or as a separate word.
    for blocked in BLOCKED_COMMANDS {
        if lower == *blocked
            || lower.starts_with(&format!("{blocked} "))
            || lower.contains(&format!(" {blocked} "))
            || lower.ends_with(&format!(" {blocked}"))
        {
            return Err(format!("'{blocked}' is a dangerous command"));
        }
    }

    // Layer 2: blocked patterns anywhere (case-sensitive, paths matter).
    for pattern in BLOCKED_PATTERNS {
        if trimmed.contains(pattern) {
            return Err(format!("pattern '{pattern}' not allowed"));
        }
    }

    // Layer 3: blocked keywords anywhere.
    for keyword in BLOCKED_KEYWORDS {
        if lower.contains(keyword) {
            return Err(format!("keyword '{keyword}' not allowed"));
        }
    }

    // Layer 4: leading token must be allow-listed.
    let mut parts = trimmed.split_whitespace();
    let head = match parts.next() {
        Some(head) => head,
        None => return Err("empty command".to_string()),
    };
    // Strip any leading path (/usr/bin/python → python).
    let base = head
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(head)
        .to_lowercase();

    let allow = ALLOWED_COMMANDS
        .iter()
        .find(|(name, _)| *name == base)
        .map(|(_, allow)| allow);

    match allow {
        None => Err(format!("'{base}' not in allow-list")),
        Some(Allow::Any) => Ok(()),
        Some(Allow::Subcommands(permitted)) => match parts.next() {
            None => Ok(()),
            Some(sub) if permitted.contains(&sub) => Ok(()),
            Some(sub) => Err(format!("subcommand '{sub}' not allowed for {base}")),
        },
    }
}

/// Drop environment entries whose key contains a sensitive fragment.
pub fn sanitize_env(
    vars: impl Iterator<Item = (String, String)>,
) -> Vec<(String, String)> {
    vars.filter(|(key, _)| {
        let upper = key.to_uppercase();
        !SENSITIVE_ENV_FRAGMENTS.iter().any(|f| upper.contains(f))
    })
    .collect()
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
