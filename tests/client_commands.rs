//! End-to-end command flows against a local test server.

use std::sync::Arc;

use nntp_client::mock::{CommandHandler, TestServer};
use nntp_client::{ArticleSpec, Client, Error};

fn connect(handler: CommandHandler) -> Client<std::net::TcpStream> {
    let server = TestServer::spawn(handler).expect("spawn test server");
    Client::connect(&server.host(), server.port()).expect("connect")
}

#[test]
fn reader_session_flow() {
    let handler: CommandHandler = Arc::new(|name, params| match name {
        "capabilities" => vec![
            "101 Capability list:".to_string(),
            "VERSION 2".to_string(),
            "READER".to_string(),
            ".".to_string(),
        ],
        "mode" => vec!["200 posting allowed".to_string()],
        "group" => {
            assert_eq!(params, ["misc.test"]);
            vec!["211 1234 3000 4234 misc.test".to_string()]
        }
        "stat" => vec!["223 3000 <45223423@example.com>".to_string()],
        "quit" => vec!["205 bye".to_string()],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);
    assert!(client.posting_allowed());

    let caps = client.capabilities().unwrap();
    assert!(caps.supports("READER"));

    assert!(client.mode_reader().unwrap());

    let summary = client.group("misc.test").unwrap();
    assert_eq!(summary.count, 1234);
    assert_eq!(summary.name, "misc.test");

    let pointer = client.stat(&ArticleSpec::Number(3000)).unwrap();
    assert_eq!(pointer.message_id, "<45223423@example.com>");

    client.quit().unwrap();
}

#[test]
fn article_retrieval_flow() {
    let handler: CommandHandler = Arc::new(|name, _params| match name {
        "article" => vec![
            "220 3000 <45223423@example.com> article".to_string(),
            "From: nobody@example.com".to_string(),
            "Subject: I am just a test article".to_string(),
            "".to_string(),
            "This is just a test article body.".to_string(),
            ".".to_string(),
        ],
        "head" => vec![
            "221 3000 <45223423@example.com>".to_string(),
            "Subject: I am just a test article".to_string(),
            ".".to_string(),
        ],
        "body" => vec![
            "222 3000 <45223423@example.com>".to_string(),
            "This is just a test article body.".to_string(),
            ".".to_string(),
        ],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);

    let article = client
        .article_as_bytes(&ArticleSpec::MessageId("<45223423@example.com>".to_string()))
        .unwrap();
    assert_eq!(
        article.subject().as_deref(),
        Some("I am just a test article")
    );
    assert_eq!(article.body(), b"This is just a test article body.\r\n");

    let headers = client.head(&ArticleSpec::Number(3000)).unwrap();
    assert_eq!(headers.get("Subject"), Some("I am just a test article"));

    let body = client.body_as_bytes(&ArticleSpec::Number(3000)).unwrap();
    assert_eq!(body, b"This is just a test article body.\r\n");
}

#[test]
fn folded_headers_over_the_wire() {
    let handler: CommandHandler = Arc::new(|name, _params| match name {
        "head" => vec![
            "221 1 <folded@example.com>".to_string(),
            "References: <a@example.com>".to_string(),
            " <b@example.com>".to_string(),
            ".".to_string(),
        ],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);
    let headers = client.head(&ArticleSpec::Current).unwrap();
    assert_eq!(
        headers.get("References"),
        Some("<a@example.com> <b@example.com>")
    );
}

#[test]
fn authentication_flow() {
    let handler: CommandHandler = Arc::new(|name, params| match name {
        "authinfo" => match params[0].to_ascii_lowercase().as_str() {
            "user" => vec!["381 password required".to_string()],
            "pass" if params[1] == "sekret" => vec!["281 authentication accepted".to_string()],
            _ => vec!["481 authentication failed".to_string()],
        },
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(Arc::clone(&handler));
    client.authenticate("reader", "sekret").unwrap();

    let mut client = connect(handler);
    let err = client.authenticate("reader", "wrong").unwrap_err();
    assert!(matches!(err, Error::Auth { code: 481, .. }));
}

#[test]
fn list_queries() {
    let handler: CommandHandler = Arc::new(|name, params| match name {
        "list" => match params.first().map(|p| p.to_ascii_lowercase()).as_deref() {
            Some("active") => vec![
                "215 list follows".to_string(),
                "misc.test 3002322 3000234 y".to_string(),
                "comp.lang.rust 444 1 m".to_string(),
                ".".to_string(),
            ],
            Some("newsgroups") => vec![
                "215 descriptions follow".to_string(),
                "misc.test\tGeneral Usenet testing".to_string(),
                ".".to_string(),
            ],
            other => panic!("unexpected list variant: {other:?}"),
        },
        "listgroup" => vec![
            "211 3 3000 3002 misc.test list follows".to_string(),
            "3000".to_string(),
            "3001".to_string(),
            "3002".to_string(),
            ".".to_string(),
        ],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);

    let active = client.list_active(None).unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active["misc.test"].low, 3000234);

    let descriptions = client.list_newsgroups(None).unwrap();
    assert_eq!(
        descriptions["misc.test"].description,
        "General Usenet testing"
    );

    let listing = client.listgroup(Some("misc.test")).unwrap();
    assert_eq!(listing.article_numbers, vec![3000, 3001, 3002]);
}

#[test]
fn new_groups_and_new_news() {
    let handler: CommandHandler = Arc::new(|name, params| match name {
        "newgroups" => {
            assert_eq!(params, ["20231106", "000000", "GMT"]);
            vec![
                "231 new newsgroups follow".to_string(),
                "alt.fresh 10 1 y".to_string(),
                ".".to_string(),
            ]
        }
        "newnews" => vec![
            "230 new articles follow".to_string(),
            "<a@example.com>".to_string(),
            ".".to_string(),
        ],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);

    let groups = client.newgroups("20231106", "000000", true).unwrap();
    assert!(groups.contains_key("alt.fresh"));

    let ids = client.newnews("alt.*", "20231106", "000000", true).unwrap();
    assert_eq!(ids, vec!["<a@example.com>"]);
}

#[test]
fn typed_command_errors() {
    let handler: CommandHandler = Arc::new(|name, _params| match name {
        "group" => vec!["411 no such newsgroup".to_string()],
        "next" => vec!["421 no next article".to_string()],
        "date" => vec!["503 DATE not supported".to_string()],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);

    assert_eq!(client.group("no.such.group").unwrap_err(), Error::NoSuchGroup);
    assert_eq!(client.next().unwrap_err(), Error::NoNextArticle);
    assert!(matches!(
        client.date().unwrap_err(),
        Error::Unexpected { code: 503, .. }
    ));
}

#[test]
fn help_and_date() {
    let handler: CommandHandler = Arc::new(|name, _params| match name {
        "help" => vec![
            "100 help follows".to_string(),
            "CAPABILITIES".to_string(),
            "GROUP".to_string(),
            ".".to_string(),
        ],
        "date" => vec!["111 20231106123456".to_string()],
        other => panic!("unexpected command: {other}"),
    });

    let mut client = connect(handler);

    let help = client.help().unwrap();
    assert!(help.contains("CAPABILITIES"));

    let date = client.date().unwrap();
    assert_eq!((date.year(), date.month(), date.day()), (2023, 11, 6));
}
