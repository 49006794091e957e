use spam_ingest::{IngestError, IngestSummary, Ingestor, ingest};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Debug)]
struct FetchError(String);

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch failed: {}", self.0)
    }
}

impl std::error::Error for FetchError {}

fn raw_message(id: &str) -> Vec<u8> {
    format!(
        "From: sender-{id}@example.com\r\n\
         Subject: Message {id}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         [image: Google]  Body of   MESSAGE {id}\r\n\r\n"
    )
    .into_bytes()
}

fn fetch_raw(id: &str) -> Result<Vec<u8>, FetchError> {
    if id == "b" {
        Err(FetchError(format!("permission denied for {id}")))
    } else {
        Ok(raw_message(id))
    }
}

#[test]
fn test_partial_failure_keeps_order_and_length() {
    let outcomes = ingest(["a", "b", "c"], fetch_raw);

    assert_eq!(outcomes.len(), 3);

    let first = outcomes[0].as_ref().unwrap();
    assert_eq!(first.subject(), ["Message a"]);
    assert_eq!(first.text(), "body of message a");

    let marker = outcomes[1].as_ref().unwrap_err();
    assert_eq!(marker.message_id, "b");
    assert!(marker.cause.to_string().contains("permission denied"));
    assert!(marker.to_string().contains("b"));

    let third = outcomes[2].as_ref().unwrap();
    assert_eq!(third.from_sender(), ["sender-c@example.com"]);
    assert_eq!(third.text(), "body of message c");
}

#[test]
fn test_html_is_passed_through_unnormalized() {
    let raw = b"Subject: Html\r\n\
                Content-Type: text/html; charset=utf-8\r\n\
                \r\n\
                <P>Big   <B>SALE</B></P>\r\n"
        .to_vec();

    let outcomes = ingest(["x"], |_: &str| Ok::<_, FetchError>(raw.clone()));
    let email = outcomes[0].as_ref().unwrap();

    assert_eq!(email.text(), "big sale");
    assert_eq!(email.html(), "<P>Big   <B>SALE</B></P>");
}

#[test]
fn test_duplicates_are_not_removed() {
    let outcomes = ingest(vec!["a".to_string(), "a".to_string()], fetch_raw);

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(Result::is_ok));
}

#[test]
fn test_empty_batch() {
    let outcomes = ingest(Vec::<String>::new(), fetch_raw);

    assert!(outcomes.is_empty());
    assert_eq!(IngestSummary::from_outcomes(&outcomes), IngestSummary::default());
}

#[test]
fn test_summary_counts() {
    let outcomes = ingest(["a", "b", "c", "b"], fetch_raw);

    assert_eq!(
        IngestSummary::from_outcomes(&outcomes),
        IngestSummary {
            total: 4,
            succeeded: 2,
            failed: 2,
        }
    );
}

#[test]
fn test_ingest_listed_passes_max_results() {
    let ingestor = Ingestor::default();

    let outcomes = ingestor
        .ingest_listed(
            |max| {
                assert_eq!(max, 40);
                Ok::<_, FetchError>(vec!["c".to_string(), "a".to_string()])
            },
            fetch_raw,
        )
        .unwrap();

    let subjects: Vec<&str> = outcomes
        .iter()
        .map(|o| o.as_ref().unwrap().subject()[0].as_str())
        .collect();
    assert_eq!(subjects, ["Message c", "Message a"]);
}

#[test]
fn test_listing_failure_aborts_batch() {
    let ingestor = Ingestor::default();
    let mut fetched = 0;

    let result = ingestor.ingest_listed(
        |_| Err::<Vec<String>, _>(FetchError("token expired".into())),
        |id: &str| {
            fetched += 1;
            fetch_raw(id)
        },
    );

    assert!(matches!(result, Err(IngestError::Listing(_))));
    assert_eq!(fetched, 0);
}

#[test]
fn test_malformed_message_degrades_to_empty_record() {
    let outcomes = ingest(["empty"], |_: &str| Ok::<_, FetchError>(Vec::new()));
    let email = outcomes[0].as_ref().unwrap();

    assert_eq!(email.text(), "");
    assert!(email.subject().is_empty());
}

/// Completes after being polled `remaining + 1` times
struct YieldTimes {
    remaining: usize,
}

impl Future for YieldTimes {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.remaining == 0 {
            Poll::Ready(())
        } else {
            self.remaining -= 1;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[test]
fn test_concurrent_ingest_preserves_input_order() {
    let ingestor = Ingestor::default();
    let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();

    let outcomes = tokio_test::block_on(ingestor.ingest_concurrent(ids, |id| async move {
        // Earlier ids finish later
        let remaining = match id.as_str() {
            "a" => 6,
            "b" => 4,
            "c" => 2,
            _ => 0,
        };
        YieldTimes { remaining }.await;
        fetch_raw(&id)
    }));

    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].as_ref().unwrap().subject(), ["Message a"]);
    assert_eq!(outcomes[1].as_ref().unwrap_err().message_id, "b");
    assert_eq!(outcomes[2].as_ref().unwrap().subject(), ["Message c"]);
    assert_eq!(outcomes[3].as_ref().unwrap().subject(), ["Message d"]);
}

#[test]
fn test_normalized_email_serializes_like_parsed_email() {
    let outcomes = ingest(["a"], fetch_raw);
    let email = outcomes[0].as_ref().unwrap();

    let value = serde_json::to_value(email).unwrap();

    assert_eq!(value["text"], "body of message a");
    assert_eq!(value["subject"][0], "Message a");
    assert_eq!(value["html"], "");
}
