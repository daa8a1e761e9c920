//! Newsgroup and server metadata types.
//!
//! Plain data types parsed out of status-line messages and list-style
//! response bodies:
//! - [`GroupSummary`] / [`GroupListing`] - GROUP and LISTGROUP results
//! - [`ArticlePointer`] - STAT/LAST/NEXT results
//! - [`Capabilities`] - the CAPABILITIES label map
//! - [`ActiveGroup`], [`GroupCreation`], [`DistribPattern`],
//!   [`NewsgroupDescription`] - LIST variant entries
//! - [`ServerDate`] - the DATE reply

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Details about a selected group, from a GROUP or LISTGROUP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Group name.
    pub name: String,
    /// Estimated number of articles in the group.
    pub count: u64,
    /// Lowest article number in the group.
    pub low: u64,
    /// Highest article number in the group.
    pub high: u64,
}

impl GroupSummary {
    /// Parse the `count low high name` message of a 211 reply.
    pub(crate) fn parse(message: &str) -> Result<Self> {
        let parts: Vec<&str> = message.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(Error::MalformedResponse(format!(
                "invalid group summary: {message:?}"
            )));
        }

        let number = |s: &str| {
            s.parse::<u64>().map_err(|_| {
                Error::MalformedResponse(format!("invalid article number in group summary: {s:?}"))
            })
        };

        Ok(Self {
            count: number(parts[0])?,
            low: number(parts[1])?,
            high: number(parts[2])?,
            name: parts[3].to_string(),
        })
    }
}

/// A group summary together with the article numbers present in the group,
/// from a LISTGROUP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListing {
    /// The selected group's summary.
    pub summary: GroupSummary,
    /// Group-local article numbers, in server order.
    pub article_numbers: Vec<u64>,
}

/// The current article position: group-local number and global message-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePointer {
    /// Article number within the selected group.
    pub number: u64,
    /// Message-ID, including angle brackets.
    pub message_id: String,
}

impl ArticlePointer {
    /// Parse the `number message-id` message of a 223 reply.
    pub(crate) fn parse(message: &str) -> Result<Self> {
        let parts: Vec<&str> = message.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(Error::MalformedResponse(format!(
                "invalid article pointer: {message:?}"
            )));
        }

        let number = parts[0].parse::<u64>().map_err(|_| {
            Error::MalformedResponse(format!("invalid article number: {:?}", parts[0]))
        })?;

        Ok(Self {
            number,
            message_id: parts[1].to_string(),
        })
    }
}

/// Server capabilities: a map of capability labels to their arguments.
///
/// For example the `COMPRESS` label may carry the arguments `["DEFLATE"]`.
/// Labels are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    labels: HashMap<String, Vec<String>>,
}

impl Capabilities {
    /// Parse a CAPABILITIES response body, one label per line.
    pub(crate) fn parse(body: &str) -> Self {
        let mut labels = HashMap::new();
        for line in body.lines() {
            let mut parts = line.split_whitespace();
            let Some(label) = parts.next() else {
                continue;
            };
            labels.insert(
                label.to_ascii_uppercase(),
                parts.map(|s| s.to_string()).collect(),
            );
        }
        Self { labels }
    }

    /// Whether the server advertises `label`.
    pub fn supports(&self, label: &str) -> bool {
        self.labels.contains_key(&label.to_ascii_uppercase())
    }

    /// The arguments advertised for `label`, if present.
    pub fn arguments(&self, label: &str) -> Option<&[String]> {
        self.labels
            .get(&label.to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    /// Iterate over `(label, arguments)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.labels
            .iter()
            .map(|(label, args)| (label.as_str(), args.as_slice()))
    }

    /// Number of advertised labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no labels were advertised.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A group information line from LIST ACTIVE or NEWGROUPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGroup {
    /// Group name.
    pub name: String,
    /// Lowest reported article number.
    pub low: u64,
    /// Highest reported article number.
    pub high: u64,
    /// Posting status field (`y`, `n`, `m`, or an `=target` alias).
    pub status: String,
}

impl ActiveGroup {
    /// Parse a `name high low status` line. Short lines yield `None`.
    pub(crate) fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return None;
        }

        Some(Self {
            name: parts[0].to_string(),
            high: parts[1].parse().ok()?,
            low: parts[2].parse().ok()?,
            status: parts[3].to_string(),
        })
    }
}

/// A group creation line from LIST ACTIVE.TIMES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCreation {
    /// Group name.
    pub name: String,
    /// Creation time as seconds since the Unix epoch.
    pub created: u64,
    /// Who created the group (usually a mailbox).
    pub creator: String,
}

impl GroupCreation {
    pub(crate) fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return None;
        }

        Some(Self {
            name: parts[0].to_string(),
            created: parts[1].parse().ok()?,
            creator: parts[2].to_string(),
        })
    }
}

/// A distribution pattern line from LIST DISTRIB.PATS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistribPattern {
    /// Pattern weight.
    pub weight: u32,
    /// Wildmat the pattern applies to.
    pub wildmat: String,
    /// Distribution header value.
    pub value: String,
}

impl DistribPattern {
    pub(crate) fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, ':');
        let weight = parts.next()?.parse().ok()?;
        let wildmat = parts.next()?.to_string();
        let value = parts.next()?.to_string();

        Some(Self {
            weight,
            wildmat,
            value,
        })
    }
}

/// A newsgroup description line from LIST NEWSGROUPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsgroupDescription {
    /// Group name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl NewsgroupDescription {
    pub(crate) fn parse_line(line: &str) -> Option<Self> {
        let sep = line.find([' ', '\t'])?;
        let (name, rest) = line.split_at(sep);

        Some(Self {
            name: name.to_string(),
            description: rest.trim().to_string(),
        })
    }
}

/// The server's clock from a DATE reply, in `yyyymmddhhmmss` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDate(String);

impl ServerDate {
    /// Parse the message of a 111 reply. The server must send exactly
    /// fourteen decimal digits.
    pub(crate) fn parse(message: &str) -> Result<Self> {
        if message.len() != 14 || !message.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedResponse(format!(
                "invalid server date: {message:?}"
            )));
        }
        Ok(Self(message.to_string()))
    }

    /// The raw `yyyymmddhhmmss` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn field(&self, range: std::ops::Range<usize>) -> u16 {
        self.0[range].parse().unwrap_or(0)
    }

    /// Four-digit year.
    pub fn year(&self) -> u16 {
        self.field(0..4)
    }

    /// Month (1-12).
    pub fn month(&self) -> u8 {
        self.field(4..6) as u8
    }

    /// Day of month.
    pub fn day(&self) -> u8 {
        self.field(6..8) as u8
    }

    /// Hour (0-23).
    pub fn hour(&self) -> u8 {
        self.field(8..10) as u8
    }

    /// Minute.
    pub fn minute(&self) -> u8 {
        self.field(10..12) as u8
    }

    /// Second.
    pub fn second(&self) -> u8 {
        self.field(12..14) as u8
    }
}

impl std::fmt::Display for ServerDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_summary_parse() {
        let summary = GroupSummary::parse("1234 3000 4234 misc.test").unwrap();
        assert_eq!(summary.count, 1234);
        assert_eq!(summary.low, 3000);
        assert_eq!(summary.high, 4234);
        assert_eq!(summary.name, "misc.test");
    }

    #[test]
    fn test_group_summary_parse_incomplete() {
        assert!(GroupSummary::parse("1234 3000").is_err());
        assert!(GroupSummary::parse("x y z misc.test").is_err());
    }

    #[test]
    fn test_article_pointer_parse() {
        let pointer = ArticlePointer::parse("3000 <45223423@example.com>").unwrap();
        assert_eq!(pointer.number, 3000);
        assert_eq!(pointer.message_id, "<45223423@example.com>");

        assert!(ArticlePointer::parse("incomplete").is_err());
    }

    #[test]
    fn test_capabilities_parse() {
        let caps = Capabilities::parse("VERSION 2\nREADER\nCOMPRESS DEFLATE\n");
        assert_eq!(caps.len(), 3);
        assert!(caps.supports("reader"));
        assert!(!caps.supports("IHAVE"));
        assert_eq!(
            caps.arguments("compress"),
            Some(["DEFLATE".to_string()].as_slice())
        );
        assert_eq!(caps.arguments("VERSION"), Some(["2".to_string()].as_slice()));
    }

    #[test]
    fn test_active_group_parse_line() {
        let group = ActiveGroup::parse_line("misc.test 3002322 3000234 y").unwrap();
        assert_eq!(group.name, "misc.test");
        assert_eq!(group.high, 3002322);
        assert_eq!(group.low, 3000234);
        assert_eq!(group.status, "y");

        assert!(ActiveGroup::parse_line("short line").is_none());
    }

    #[test]
    fn test_group_creation_parse_line() {
        let creation = GroupCreation::parse_line("misc.test 930445408 <creatme@isc.org>").unwrap();
        assert_eq!(creation.name, "misc.test");
        assert_eq!(creation.created, 930445408);
        assert_eq!(creation.creator, "<creatme@isc.org>");
    }

    #[test]
    fn test_distrib_pattern_parse_line() {
        let pattern = DistribPattern::parse_line("10:local.*:local").unwrap();
        assert_eq!(pattern.weight, 10);
        assert_eq!(pattern.wildmat, "local.*");
        assert_eq!(pattern.value, "local");

        assert!(DistribPattern::parse_line("nocolons").is_none());
    }

    #[test]
    fn test_newsgroup_description_parse_line() {
        let desc = NewsgroupDescription::parse_line("misc.test\tGeneral Usenet testing").unwrap();
        assert_eq!(desc.name, "misc.test");
        assert_eq!(desc.description, "General Usenet testing");
    }

    #[test]
    fn test_server_date() {
        let date = ServerDate::parse("20231106123456").unwrap();
        assert_eq!(date.as_str(), "20231106123456");
        assert_eq!(date.year(), 2023);
        assert_eq!(date.month(), 11);
        assert_eq!(date.day(), 6);
        assert_eq!(date.hour(), 12);
        assert_eq!(date.minute(), 34);
        assert_eq!(date.second(), 56);

        assert!(ServerDate::parse("not a date").is_err());
        assert!(ServerDate::parse("2023110612345").is_err());
    }
}
