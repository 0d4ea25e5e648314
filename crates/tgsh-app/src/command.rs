//! Shell command grammar.

use crate::AppError;
use tgsh_types::RightSet;

/// A parsed shell command.
///
/// Entities are referenced by name or id; right-sets use the symbol
/// grammar of [`RightSet`] (`r,w` or `read,write`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `register <username> <password>`
    Register {
        username: String,
        password: String,
    },
    /// `login <username> <password>`
    Login {
        username: String,
        password: String,
    },
    /// `logout`
    Logout,
    /// `whoami`
    Whoami,
    /// `mkfile <name> [directory]`
    CreateFile {
        name: String,
        parent: Option<String>,
    },
    /// `mkdir <name> [directory]`
    CreateDir {
        name: String,
        parent: Option<String>,
    },
    /// `read <file>`
    Read { identifier: String },
    /// `write <file> <content...>`
    Write {
        identifier: String,
        content: String,
    },
    /// `exec <file>`
    Execute { identifier: String },
    /// `rm <object>`
    Delete { identifier: String },
    /// `ls [directory]`
    List { directory: Option<String> },
    /// `take <source> <target> <rights>`
    Take {
        source: String,
        target: String,
        rights: RightSet,
    },
    /// `grant <source> <target-subject> <rights>`
    Grant {
        source: String,
        target_subject: String,
        rights: RightSet,
    },
    /// `check <object> <rights>`
    Check { object: String, rights: RightSet },
    /// `admin <subcommand> ...`
    Admin(AdminCommand),
    /// `audit [all|failed|ok]`
    Audit(AuditFilter),
    /// `help`
    Help,
    /// `exit`
    Exit,
}

/// Admin-only subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// `admin users`
    ListUsers,
    /// `admin objects`
    ListObjects,
    /// `admin matrix`
    Matrix,
    /// `admin grant <subject> <object> <rights>`
    Grant {
        subject: String,
        object: String,
        rights: RightSet,
    },
    /// `admin revoke <subject> <object> <rights>`
    Revoke {
        subject: String,
        object: String,
        rights: RightSet,
    },
    /// `admin promote <username>` / `admin demote <username>`
    SetAdmin { username: String, admin: bool },
    /// `admin rmuser <username>`
    DeleteUser { username: String },
}

/// Which slice of the audit trail to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditFilter {
    All,
    Failed,
    Success,
}

fn usage(message: &str) -> AppError {
    AppError::Usage {
        message: message.to_string(),
    }
}

impl Command {
    /// Parses one line of shell input.
    ///
    /// # Errors
    ///
    /// [`AppError::Usage`] when arguments are missing or malformed,
    /// [`AppError::UnknownCommand`] for an unrecognized verb, and
    /// [`AppError::Rights`] when a right-set argument does not parse.
    pub fn parse(line: &str) -> Result<Self, AppError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (verb, args) = tokens
            .split_first()
            .ok_or_else(|| usage("expected a command, try 'help'"))?;

        match *verb {
            "register" => match args {
                [username, password] => Ok(Self::Register {
                    username: (*username).to_string(),
                    password: (*password).to_string(),
                }),
                _ => Err(usage("register <username> <password>")),
            },
            "login" => match args {
                [username, password] => Ok(Self::Login {
                    username: (*username).to_string(),
                    password: (*password).to_string(),
                }),
                _ => Err(usage("login <username> <password>")),
            },
            "logout" => Ok(Self::Logout),
            "whoami" => Ok(Self::Whoami),
            "mkfile" => match args {
                [name] => Ok(Self::CreateFile {
                    name: (*name).to_string(),
                    parent: None,
                }),
                [name, parent] => Ok(Self::CreateFile {
                    name: (*name).to_string(),
                    parent: Some((*parent).to_string()),
                }),
                _ => Err(usage("mkfile <name> [directory]")),
            },
            "mkdir" => match args {
                [name] => Ok(Self::CreateDir {
                    name: (*name).to_string(),
                    parent: None,
                }),
                [name, parent] => Ok(Self::CreateDir {
                    name: (*name).to_string(),
                    parent: Some((*parent).to_string()),
                }),
                _ => Err(usage("mkdir <name> [directory]")),
            },
            "read" => match args {
                [identifier] => Ok(Self::Read {
                    identifier: (*identifier).to_string(),
                }),
                _ => Err(usage("read <file>")),
            },
            "write" => match args {
                [identifier, content @ ..] if !content.is_empty() => Ok(Self::Write {
                    identifier: (*identifier).to_string(),
                    content: content.join(" "),
                }),
                _ => Err(usage("write <file> <content>")),
            },
            "exec" => match args {
                [identifier] => Ok(Self::Execute {
                    identifier: (*identifier).to_string(),
                }),
                _ => Err(usage("exec <file>")),
            },
            "rm" => match args {
                [identifier] => Ok(Self::Delete {
                    identifier: (*identifier).to_string(),
                }),
                _ => Err(usage("rm <object>")),
            },
            "ls" => match args {
                [] => Ok(Self::List { directory: None }),
                [directory] => Ok(Self::List {
                    directory: Some((*directory).to_string()),
                }),
                _ => Err(usage("ls [directory]")),
            },
            "take" => match args {
                [source, target, rights] => Ok(Self::Take {
                    source: (*source).to_string(),
                    target: (*target).to_string(),
                    rights: rights.parse()?,
                }),
                _ => Err(usage("take <source> <target> <rights>")),
            },
            "grant" => match args {
                [source, target, rights] => Ok(Self::Grant {
                    source: (*source).to_string(),
                    target_subject: (*target).to_string(),
                    rights: rights.parse()?,
                }),
                _ => Err(usage("grant <source> <target-subject> <rights>")),
            },
            "check" => match args {
                [object, rights] => Ok(Self::Check {
                    object: (*object).to_string(),
                    rights: rights.parse()?,
                }),
                _ => Err(usage("check <object> <rights>")),
            },
            "admin" => AdminCommand::parse(args).map(Self::Admin),
            "audit" => match args {
                [] | ["all"] => Ok(Self::Audit(AuditFilter::All)),
                ["failed"] => Ok(Self::Audit(AuditFilter::Failed)),
                ["ok"] => Ok(Self::Audit(AuditFilter::Success)),
                _ => Err(usage("audit [all|failed|ok]")),
            },
            "help" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(AppError::UnknownCommand {
                verb: other.to_string(),
            }),
        }
    }
}

impl AdminCommand {
    fn parse(args: &[&str]) -> Result<Self, AppError> {
        match args {
            ["users"] => Ok(Self::ListUsers),
            ["objects"] => Ok(Self::ListObjects),
            ["matrix"] => Ok(Self::Matrix),
            ["grant", subject, object, rights] => Ok(Self::Grant {
                subject: (*subject).to_string(),
                object: (*object).to_string(),
                rights: rights.parse()?,
            }),
            ["revoke", subject, object, rights] => Ok(Self::Revoke {
                subject: (*subject).to_string(),
                object: (*object).to_string(),
                rights: rights.parse()?,
            }),
            ["promote", username] => Ok(Self::SetAdmin {
                username: (*username).to_string(),
                admin: true,
            }),
            ["demote", username] => Ok(Self::SetAdmin {
                username: (*username).to_string(),
                admin: false,
            }),
            ["rmuser", username] => Ok(Self::DeleteUser {
                username: (*username).to_string(),
            }),
            _ => Err(usage(
                "admin <users|objects|matrix|grant|revoke|promote|demote|rmuser> ...",
            )),
        }
    }
}

/// The `help` text, one line per command.
pub(crate) const HELP: &str = "\
commands:
  register <username> <password>      create an account
  login <username> <password>         open a session
  logout                              close the session
  whoami                              show the current session
  mkfile <name> [directory]           create a file (full rights to you)
  mkdir <name> [directory]            create a directory
  read <file>                         print file content (needs r)
  write <file> <content>              replace file content (needs w)
  exec <file>                         run a file (needs x)
  rm <object>                         delete an object (owner or o)
  ls [directory]                      list your objects, or a directory
  take <source> <target> <rights>     take rights via a t edge
  grant <source> <subject> <rights>   pass your rights via a g edge
  check <object> <rights>             ask the kernel about reachability
  audit [all|failed|ok]               show the audit trail (admin)
  admin users|objects|matrix          inspect users, objects, edges
  admin grant|revoke <s> <o> <rights> edit edges directly
  admin promote|demote <username>     toggle the admin flag
  admin rmuser <username>             remove a user without objects
  help                                this text
  exit                                leave the shell";

#[cfg(test)]
mod tests {
    use super::*;
    use tgsh_types::assert_error_code;

    #[test]
    fn parses_session_commands() {
        assert_eq!(
            Command::parse("login alice secret").expect("parse"),
            Command::Login {
                username: "alice".into(),
                password: "secret".into(),
            }
        );
        assert_eq!(Command::parse("logout").expect("parse"), Command::Logout);
        assert_eq!(Command::parse("exit").expect("parse"), Command::Exit);
        assert_eq!(Command::parse("quit").expect("parse"), Command::Exit);
    }

    #[test]
    fn write_joins_remaining_tokens() {
        assert_eq!(
            Command::parse("write notes.txt hello take grant world").expect("parse"),
            Command::Write {
                identifier: "notes.txt".into(),
                content: "hello take grant world".into(),
            }
        );
    }

    #[test]
    fn rewrite_commands_parse_right_sets() {
        assert_eq!(
            Command::parse("take proxy secret.txt r,w").expect("parse"),
            Command::Take {
                source: "proxy".into(),
                target: "secret.txt".into(),
                rights: RightSet::READ | RightSet::WRITE,
            }
        );
        assert_eq!(
            Command::parse("grant secret.txt bob read").expect("parse"),
            Command::Grant {
                source: "secret.txt".into(),
                target_subject: "bob".into(),
                rights: RightSet::READ,
            }
        );
    }

    #[test]
    fn unknown_rights_token_is_rejected() {
        let err = Command::parse("take proxy secret.txt r,q").unwrap_err();
        assert_error_code(&err, "RIGHT_UNKNOWN_TOKEN");
    }

    #[test]
    fn admin_subcommands() {
        assert_eq!(
            Command::parse("admin matrix").expect("parse"),
            Command::Admin(AdminCommand::Matrix)
        );
        assert_eq!(
            Command::parse("admin grant bob secret.txt t").expect("parse"),
            Command::Admin(AdminCommand::Grant {
                subject: "bob".into(),
                object: "secret.txt".into(),
                rights: RightSet::TAKE,
            })
        );
        assert_eq!(
            Command::parse("admin demote alice").expect("parse"),
            Command::Admin(AdminCommand::SetAdmin {
                username: "alice".into(),
                admin: false,
            })
        );
    }

    #[test]
    fn audit_filters() {
        assert_eq!(
            Command::parse("audit").expect("parse"),
            Command::Audit(AuditFilter::All)
        );
        assert_eq!(
            Command::parse("audit failed").expect("parse"),
            Command::Audit(AuditFilter::Failed)
        );
        assert_eq!(
            Command::parse("audit ok").expect("parse"),
            Command::Audit(AuditFilter::Success)
        );
    }

    #[test]
    fn bad_shapes_are_usage_errors() {
        assert_error_code(&Command::parse("login alice").unwrap_err(), "APP_USAGE");
        assert_error_code(&Command::parse("write notes.txt").unwrap_err(), "APP_USAGE");
        assert_error_code(&Command::parse("   ").unwrap_err(), "APP_USAGE");
        assert_error_code(
            &Command::parse("frobnicate").unwrap_err(),
            "APP_UNKNOWN_COMMAND",
        );
    }
}
