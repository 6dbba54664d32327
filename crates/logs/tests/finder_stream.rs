//! End-to-end scenarios for the reverse line finder.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use tailgate_logs::{Error, LineFinder, LogsConfig, LogsConfigBuilder, SearchRequest};
use tempfile::TempDir;

/// Writes `count` lines of the form `<i> is even` / `<i> is odd`.
fn write_parity_lines(dir: &Path, name: &str, count: u64) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    for i in 0..count {
        let parity = if i % 2 == 0 { "even" } else { "odd" };
        writeln!(file, "{i} is {parity}").unwrap();
    }
    file.flush().unwrap();
}

fn write_raw(dir: &Path, name: &str, content: &[u8]) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn search(file: &str, total: u64, keywords: &[&str]) -> SearchRequest {
    SearchRequest {
        file: file.to_string(),
        total,
        keywords: keywords.iter().map(ToString::to_string).collect(),
    }
}

async fn collect_items(
    config: &LogsConfig,
    request: &SearchRequest,
) -> Vec<Result<Vec<u8>, Error>> {
    let finder = LineFinder::build(config, request).await.unwrap();
    finder
        .find_latest_lines()
        .map(|item| item.map(|line| line.to_vec()))
        .collect()
        .await
}

/// Unwraps every item, panicking if the stream carried an error.
async fn collect_lines(config: &LogsConfig, request: &SearchRequest) -> Vec<Vec<u8>> {
    collect_items(config, request)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect()
}

#[tokio::test]
async fn test_latest_lines_without_keywords() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 100);
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 3, &[])).await;

    assert_eq!(
        lines,
        [&b"99 is odd\n"[..], &b"98 is even\n"[..], &b"97 is odd\n"[..]]
    );
}

#[tokio::test]
async fn test_keyword_filters_lines() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 100);
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 2, &["odd"])).await;

    assert_eq!(lines, [&b"99 is odd\n"[..], &b"97 is odd\n"[..]]);
}

#[tokio::test]
async fn test_keyword_conjunction() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 100);
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 1, &["odd", "1"])).await;

    assert_eq!(lines, [b"91 is odd\n"]);
}

#[tokio::test]
async fn test_quota_exceeding_file_ends_cleanly() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 10);
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 100, &[])).await;

    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], b"9 is odd\n");
    assert_eq!(lines[9], b"0 is even\n");
}

#[tokio::test]
async fn test_round_trip_drops_unterminated_tail() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"alpha\nbeta\ngamma");
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 100, &[])).await;

    assert_eq!(lines, [&b"beta\n"[..], &b"alpha\n"[..]]);

    // Reversed concatenation reproduces the file minus the tail.
    let mut reassembled = Vec::new();
    for line in lines.iter().rev() {
        reassembled.extend_from_slice(line);
    }
    assert_eq!(reassembled, b"alpha\nbeta\n");
}

#[tokio::test]
async fn test_file_without_newline_yields_its_only_line() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"no terminator");
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 5, &[])).await;

    assert_eq!(lines, [b"no terminator"]);
}

#[tokio::test]
async fn test_first_line_fallback_respects_keywords() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"needle here\nother\n");
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 5, &["needle"])).await;

    assert_eq!(lines, [b"needle here\n"]);
}

#[tokio::test]
async fn test_single_empty_line() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"\n");
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 5, &[])).await;

    assert_eq!(lines, [b"\n"]);
}

#[tokio::test]
async fn test_empty_file_yields_nothing() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"");
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 5, &[])).await;

    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_total_zero_yields_nothing() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 10);
    let config = LogsConfig::new(dir.path());

    let lines = collect_lines(&config, &search("app.log", 0, &[])).await;

    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_tiny_pages_reassemble_boundary_crossing_lines() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"abcdefgh\nijklmnop\nqrstuvwx\n");
    let config = LogsConfigBuilder::new(dir.path()).page_length(4).build();

    let lines = collect_lines(&config, &search("app.log", 10, &[])).await;

    assert_eq!(
        lines,
        [
            &b"qrstuvwx\n"[..],
            &b"ijklmnop\n"[..],
            &b"abcdefgh\n"[..],
        ]
    );
}

#[tokio::test]
async fn test_overflow_after_partial_output() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"abcdefghij\nxx\nyy\n");
    let config = LogsConfigBuilder::new(dir.path())
        .page_length(4)
        .max_line_length(6)
        .build();

    let items = collect_items(&config, &search("app.log", 10, &[])).await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap(), b"yy\n");
    assert_eq!(items[1].as_ref().unwrap(), b"xx\n");
    assert!(matches!(items[2], Err(Error::LineOverflow { max: 6 })));
}

#[tokio::test]
async fn test_overflow_before_any_output() {
    let dir = TempDir::new().unwrap();
    write_raw(dir.path(), "app.log", b"aa\nabcdefg\nhi\n");
    let config = LogsConfigBuilder::new(dir.path()).max_line_length(4).build();

    let items = collect_items(&config, &search("app.log", 10, &[])).await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(Error::LineOverflow { max: 4 })));
}

#[tokio::test]
async fn test_truncation_after_build_ends_stream_silently() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 100);
    let config = LogsConfig::new(dir.path());

    let finder = LineFinder::build(&config, &search("app.log", 5, &[]))
        .await
        .unwrap();

    // Shrink the file after the length snapshot: the next page read hits
    // the event horizon and the stream ends cleanly instead of erroring.
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(dir.path().join("app.log"))
        .unwrap();
    file.set_len(10).unwrap();

    let items = finder
        .find_latest_lines()
        .map(|item| item.map(|line| line.to_vec()))
        .collect::<Vec<_>>()
        .await;

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_missing_file_is_invalid_search() {
    let dir = TempDir::new().unwrap();
    let config = LogsConfig::new(dir.path());

    let result = LineFinder::build(&config, &search("missing.log", 3, &[])).await;

    assert!(matches!(result, Err(Error::InvalidSearch(_))));
}

#[tokio::test]
async fn test_path_escape_is_invalid_search() {
    let parent = TempDir::new().unwrap();
    let logs = parent.path().join("logs");
    std::fs::create_dir(&logs).unwrap();
    write_raw(parent.path(), "secret.log", b"secret\n");
    let config = LogsConfig::new(&logs);

    let result = LineFinder::build(&config, &search("../secret.log", 3, &[])).await;

    assert!(matches!(result, Err(Error::InvalidSearch(_))));
}

#[cfg(target_os = "linux")]
fn open_fd_count() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_cancelled_search_releases_the_file() {
    let dir = TempDir::new().unwrap();
    write_parity_lines(dir.path(), "app.log", 1_000);
    let config = LogsConfig::new(dir.path());

    let baseline = open_fd_count();

    let finder = LineFinder::build(&config, &search("app.log", 1_000, &[]))
        .await
        .unwrap();
    let mut stream = finder.find_latest_lines();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(&first[..], b"999 is odd\n");
    drop(stream);

    // The driving task notices the closed channel on its next send and
    // drops the file handle. Other tests in this binary also open
    // files, so poll rather than asserting a single snapshot.
    for _ in 0..200 {
        if open_fd_count() <= baseline {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("file handle still open after cancellation");
}
