//! NNTP command types and encoding.

use crate::error::{Error, Result};

/// NNTP commands that can be sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Request server capabilities
    Capabilities,

    /// Switch to reader mode
    ModeReader,

    /// Authenticate with username
    AuthInfoUser(String),

    /// Authenticate with password
    AuthInfoPass(String),

    /// Select a newsgroup
    Group(String),

    /// Select a newsgroup and list its article numbers; `None` re-lists the
    /// currently selected group
    ListGroup(Option<String>),

    /// Retrieve a full article
    Article(ArticleSpec),

    /// Retrieve article headers only
    Head(ArticleSpec),

    /// Retrieve an article body only
    Body(ArticleSpec),

    /// Check article existence without retrieving it
    Stat(ArticleSpec),

    /// List server information
    List(ListVariant),

    /// List newsgroups created since date/time
    NewGroups {
        /// Date in YYMMDD or YYYYMMDD format
        date: String,
        /// Time in HHMMSS format
        time: String,
        /// Whether the time is given in GMT
        gmt: bool,
    },

    /// List articles posted since date/time
    NewNews {
        /// Wildmat selecting the newsgroups of interest
        wildmat: String,
        /// Date in YYMMDD or YYYYMMDD format
        date: String,
        /// Time in HHMMSS format
        time: String,
        /// Whether the time is given in GMT
        gmt: bool,
    },

    /// Move to the previous article in the selected group
    Last,

    /// Move to the next article in the selected group
    Next,

    /// Request the server's date and time
    Date,

    /// Request the server help text
    Help,

    /// Begin TLS negotiation (RFC 4642)
    StartTls,

    /// Terminate the connection
    Quit,
}

/// Article specification: the id parameter accepted by ARTICLE, HEAD, BODY
/// and STAT.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleSpec {
    /// Article number within the currently selected group
    Number(u64),
    /// Message-ID in angle brackets; works without a selected group
    MessageId(String),
    /// The currently selected article (no parameter)
    Current,
}

/// The LIST command variants the client supports.
#[derive(Debug, Clone, PartialEq)]
pub enum ListVariant {
    /// LIST ACTIVE with an optional wildmat
    Active(Option<String>),
    /// LIST ACTIVE.TIMES with an optional wildmat
    ActiveTimes(Option<String>),
    /// LIST DISTRIB.PATS
    DistribPats,
    /// LIST NEWSGROUPS with an optional wildmat
    Newsgroups(Option<String>),
}

impl Command {
    /// Encode the command as bytes for transmission, CRLF terminator
    /// included.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let command_line = match self {
            Command::Capabilities => "CAPABILITIES".to_string(),
            Command::ModeReader => "MODE READER".to_string(),
            Command::AuthInfoUser(user) => {
                validate_parameter(user)?;
                format!("AUTHINFO USER {user}")
            }
            Command::AuthInfoPass(pass) => {
                validate_parameter(pass)?;
                format!("AUTHINFO PASS {pass}")
            }
            Command::Group(group) => {
                validate_parameter(group)?;
                format!("GROUP {group}")
            }
            Command::ListGroup(group) => match group {
                Some(group) => {
                    validate_parameter(group)?;
                    format!("LISTGROUP {group}")
                }
                None => "LISTGROUP".to_string(),
            },
            Command::Article(spec) => spec.command_line("ARTICLE")?,
            Command::Head(spec) => spec.command_line("HEAD")?,
            Command::Body(spec) => spec.command_line("BODY")?,
            Command::Stat(spec) => spec.command_line("STAT")?,
            Command::List(variant) => variant.command_line()?,
            Command::NewGroups { date, time, gmt } => {
                validate_parameter(date)?;
                validate_parameter(time)?;
                if *gmt {
                    format!("NEWGROUPS {date} {time} GMT")
                } else {
                    format!("NEWGROUPS {date} {time}")
                }
            }
            Command::NewNews {
                wildmat,
                date,
                time,
                gmt,
            } => {
                validate_parameter(wildmat)?;
                validate_parameter(date)?;
                validate_parameter(time)?;
                if *gmt {
                    format!("NEWNEWS {wildmat} {date} {time} GMT")
                } else {
                    format!("NEWNEWS {wildmat} {date} {time}")
                }
            }
            Command::Last => "LAST".to_string(),
            Command::Next => "NEXT".to_string(),
            Command::Date => "DATE".to_string(),
            Command::Help => "HELP".to_string(),
            Command::StartTls => "STARTTLS".to_string(),
            Command::Quit => "QUIT".to_string(),
        };

        let mut bytes = command_line.into_bytes();
        bytes.extend_from_slice(b"\r\n");
        Ok(bytes)
    }

    /// The command keyword, for logging.
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            Command::Capabilities => "CAPABILITIES",
            Command::ModeReader => "MODE READER",
            Command::AuthInfoUser(_) | Command::AuthInfoPass(_) => "AUTHINFO",
            Command::Group(_) => "GROUP",
            Command::ListGroup(_) => "LISTGROUP",
            Command::Article(_) => "ARTICLE",
            Command::Head(_) => "HEAD",
            Command::Body(_) => "BODY",
            Command::Stat(_) => "STAT",
            Command::List(_) => "LIST",
            Command::NewGroups { .. } => "NEWGROUPS",
            Command::NewNews { .. } => "NEWNEWS",
            Command::Last => "LAST",
            Command::Next => "NEXT",
            Command::Date => "DATE",
            Command::Help => "HELP",
            Command::StartTls => "STARTTLS",
            Command::Quit => "QUIT",
        }
    }
}

impl ArticleSpec {
    fn command_line(&self, name: &str) -> Result<String> {
        match self {
            ArticleSpec::Number(num) => Ok(format!("{name} {num}")),
            ArticleSpec::MessageId(id) => {
                if !id.starts_with('<') || !id.ends_with('>') {
                    return Err(Error::InvalidCommand(
                        "Message-ID must be enclosed in angle brackets".to_string(),
                    ));
                }
                validate_parameter(id)?;
                Ok(format!("{name} {id}"))
            }
            ArticleSpec::Current => Ok(name.to_string()),
        }
    }
}

impl ListVariant {
    fn command_line(&self) -> Result<String> {
        let (keyword, wildmat) = match self {
            ListVariant::Active(wildmat) => ("LIST ACTIVE", wildmat.as_deref()),
            ListVariant::ActiveTimes(wildmat) => ("LIST ACTIVE.TIMES", wildmat.as_deref()),
            ListVariant::DistribPats => ("LIST DISTRIB.PATS", None),
            ListVariant::Newsgroups(wildmat) => ("LIST NEWSGROUPS", wildmat.as_deref()),
        };

        match wildmat {
            Some(wildmat) => {
                validate_parameter(wildmat)?;
                Ok(format!("{keyword} {wildmat}"))
            }
            None => Ok(keyword.to_string()),
        }
    }
}

/// Validate that a parameter doesn't contain invalid characters
fn validate_parameter(param: &str) -> Result<()> {
    if param.contains('\r') || param.contains('\n') {
        return Err(Error::InvalidCommand(
            "Parameters cannot contain line breaks".to_string(),
        ));
    }
    if param.is_empty() {
        return Err(Error::InvalidCommand(
            "Parameters cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_command() {
        let encoded = Command::Capabilities.encode().unwrap();
        assert_eq!(encoded, b"CAPABILITIES\r\n");
    }

    #[test]
    fn test_group_command() {
        let encoded = Command::Group("alt.test".to_string()).encode().unwrap();
        assert_eq!(encoded, b"GROUP alt.test\r\n");
    }

    #[test]
    fn test_article_by_number() {
        let encoded = Command::Article(ArticleSpec::Number(123)).encode().unwrap();
        assert_eq!(encoded, b"ARTICLE 123\r\n");
    }

    #[test]
    fn test_article_by_message_id() {
        let encoded = Command::Article(ArticleSpec::MessageId("<test@example.com>".to_string()))
            .encode()
            .unwrap();
        assert_eq!(encoded, b"ARTICLE <test@example.com>\r\n");
    }

    #[test]
    fn test_article_current_has_no_trailing_space() {
        let encoded = Command::Article(ArticleSpec::Current).encode().unwrap();
        assert_eq!(encoded, b"ARTICLE\r\n");
    }

    #[test]
    fn test_message_id_requires_brackets() {
        let cmd = Command::Stat(ArticleSpec::MessageId("test@example.com".to_string()));
        assert!(cmd.encode().is_err());
    }

    #[test]
    fn test_listgroup_command() {
        let encoded = Command::ListGroup(Some("misc.test".to_string()))
            .encode()
            .unwrap();
        assert_eq!(encoded, b"LISTGROUP misc.test\r\n");

        let encoded = Command::ListGroup(None).encode().unwrap();
        assert_eq!(encoded, b"LISTGROUP\r\n");
    }

    #[test]
    fn test_list_variants() {
        let encoded = Command::List(ListVariant::Active(None)).encode().unwrap();
        assert_eq!(encoded, b"LIST ACTIVE\r\n");

        let encoded = Command::List(ListVariant::Active(Some("comp.*".to_string())))
            .encode()
            .unwrap();
        assert_eq!(encoded, b"LIST ACTIVE comp.*\r\n");

        let encoded = Command::List(ListVariant::ActiveTimes(None)).encode().unwrap();
        assert_eq!(encoded, b"LIST ACTIVE.TIMES\r\n");

        let encoded = Command::List(ListVariant::DistribPats).encode().unwrap();
        assert_eq!(encoded, b"LIST DISTRIB.PATS\r\n");

        let encoded = Command::List(ListVariant::Newsgroups(Some("misc.*".to_string())))
            .encode()
            .unwrap();
        assert_eq!(encoded, b"LIST NEWSGROUPS misc.*\r\n");
    }

    #[test]
    fn test_newgroups_command() {
        let encoded = Command::NewGroups {
            date: "20231106".to_string(),
            time: "123456".to_string(),
            gmt: true,
        }
        .encode()
        .unwrap();
        assert_eq!(encoded, b"NEWGROUPS 20231106 123456 GMT\r\n");

        let encoded = Command::NewGroups {
            date: "20231106".to_string(),
            time: "123456".to_string(),
            gmt: false,
        }
        .encode()
        .unwrap();
        assert_eq!(encoded, b"NEWGROUPS 20231106 123456\r\n");
    }

    #[test]
    fn test_newnews_command() {
        let encoded = Command::NewNews {
            wildmat: "comp.lang.*".to_string(),
            date: "20231106".to_string(),
            time: "000000".to_string(),
            gmt: true,
        }
        .encode()
        .unwrap();
        assert_eq!(encoded, b"NEWNEWS comp.lang.* 20231106 000000 GMT\r\n");
    }

    #[test]
    fn test_invalid_parameter() {
        let cmd = Command::Group("test\r\nQUIT".to_string());
        assert!(cmd.encode().is_err());

        let cmd = Command::Group(String::new());
        assert!(cmd.encode().is_err());
    }

    #[test]
    fn test_starttls_command() {
        let encoded = Command::StartTls.encode().unwrap();
        assert_eq!(encoded, b"STARTTLS\r\n");
    }
}
