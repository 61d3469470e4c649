use hangle::transcript::sqlite::SqliteTranscript;
use hangle::transcript::{Transcript, TurnRecord};

fn turn(seq: u64, kind: &str, outgoing: &str, incoming: &str) -> TurnRecord {
    TurnRecord {
        seq,
        kind: kind.to_string(),
        outgoing: outgoing.to_string(),
        incoming: incoming.to_string(),
    }
}

#[tokio::test]
async fn record_and_list_turns() {
    let transcript = SqliteTranscript::in_memory().unwrap();
    transcript
        .record(turn(1, "evaluate", "__READY", "1+1"))
        .await
        .unwrap();

    let turns = transcript.turns().await.unwrap();
    assert_eq!(turns, vec![turn(1, "evaluate", "__READY", "1+1")]);
}

#[tokio::test]
async fn turns_come_back_in_sequence_order() {
    let transcript = SqliteTranscript::in_memory().unwrap();
    transcript
        .record(turn(2, "timeout", "2", "__USER_INPUT_TIMEOUT"))
        .await
        .unwrap();
    transcript
        .record(turn(1, "evaluate", "__READY", "1+1"))
        .await
        .unwrap();

    let seqs: Vec<u64> = transcript
        .turns()
        .await
        .unwrap()
        .iter()
        .map(|t| t.seq)
        .collect();
    assert_eq!(seqs, vec![1, 2]);
}

#[tokio::test]
async fn sessions_sharing_a_file_are_separate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.db");
    let path = path.to_str().unwrap();

    let first = SqliteTranscript::new(path).unwrap();
    first
        .record(turn(1, "evaluate", "__READY", "1"))
        .await
        .unwrap();

    // session ids include a millisecond timestamp
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = SqliteTranscript::new(path).unwrap();
    assert_ne!(first.session(), second.session());
    assert!(second.turns().await.unwrap().is_empty());

    second
        .record(turn(1, "disconnect", "__READY", "__DISCONNECT"))
        .await
        .unwrap();
    assert_eq!(first.turns().await.unwrap().len(), 1);
    assert_eq!(second.turns().await.unwrap()[0].kind, "disconnect");
}

#[tokio::test]
async fn persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.db");
    let path = path.to_str().unwrap();

    {
        let transcript = SqliteTranscript::new(path).unwrap();
        transcript
            .record(turn(1, "evaluate", "__READY", "1"))
            .await
            .unwrap();
    }

    let conn = rusqlite::Connection::open(path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM turns", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
