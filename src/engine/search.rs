//! Multi-source grep scan.
//!
//! Compiles the caller's pattern once, then scans every registered source
//! in registry order. The request is all-or-nothing: the first unavailable
//! source or read error aborts it and no partial result is returned.

use log::*;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::common::error::SearchError;
use crate::engine::report::SearchReport;
use crate::sources::{LogSource, SourceRegistry};

/// Run a grep across every source in the registry.
///
/// Each source is scanned on the blocking pool with its file handle scoped
/// to that one scan, so handles are never held across sources. The await
/// between sources doubles as the cancellation checkpoint: when the
/// surrounding request future is dropped, no further source is opened.
pub async fn search_sources(
    pattern: &str,
    registry: &SourceRegistry,
) -> Result<SearchReport, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let re = Regex::new(pattern).map_err(SearchError::BadPattern)?;

    let mut report = SearchReport::new();
    for source in registry.all() {
        let src = source.clone();
        let matcher = re.clone();
        let scanned = tokio::task::spawn_blocking(move || scan_source(&src, &matcher))
            .await
            .unwrap_or_else(|e| {
                Err(SearchError::Scan {
                    name: source.name.clone(),
                    err: io::Error::new(io::ErrorKind::Other, e),
                })
            })?;

        debug!("scanned {}: {} matching lines", source.name, scanned.len());
        report.push_section(&source.name, scanned);
    }
    Ok(report)
}

/// Scan a single source, returning its matching lines in file order.
///
/// The read handle lives only for this call. Records are newline-delimited;
/// the trailing `\n` and a preceding `\r` are stripped, and a final line
/// without a terminator still counts. Bytes are decoded lossily so a stray
/// non-UTF-8 byte in a log line degrades to U+FFFD instead of failing the
/// scan.
fn scan_source(source: &LogSource, re: &Regex) -> Result<Vec<String>, SearchError> {
    let unavailable = || SearchError::SourceUnavailable {
        name: source.name.clone(),
    };

    let meta = std::fs::metadata(&source.path).map_err(|_| unavailable())?;
    if !meta.is_file() {
        return Err(unavailable());
    }
    let file = File::open(&source.path).map_err(|_| unavailable())?;

    let mut reader = BufReader::new(file);
    let mut matched = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| SearchError::Scan {
                name: source.name.clone(),
                err,
            })?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf);
        if re.is_match(&line) {
            matched.push(line.into_owned());
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry_with(files: &[(&str, &str)], dir: &tempfile::TempDir) -> SourceRegistry {
        let mut reg = SourceRegistry::new();
        for &(name, contents) in files {
            let path = dir.path().join(format!("{name}.log"));
            let mut f = File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            reg.register(name, path);
        }
        reg
    }

    #[tokio::test]
    async fn matches_preserve_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry_with(
            &[("app", "ERROR: one\nINFO: skip\nERROR: two\nERROR: three\n")],
            &dir,
        );

        let report = search_sources("ERROR", &reg).await.unwrap();
        assert_eq!(report.total_matches(), 3);
        assert_eq!(
            report.sections()[0].1,
            ["ERROR: one", "ERROR: two", "ERROR: three"]
        );
    }

    #[tokio::test]
    async fn sources_scanned_in_registry_order() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry_with(
            &[("zulu", "hit z\n"), ("alpha", "hit a\n"), ("mike", "miss\n")],
            &dir,
        );

        let report = search_sources("hit", &reg).await.unwrap();
        let names: Vec<&str> = report.sections().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["zulu", "alpha", "mike"]);
        assert_eq!(report.total_matches(), 2);
        // The miss still gets an (empty) section.
        assert!(report.sections()[2].1.is_empty());
    }

    #[tokio::test]
    async fn empty_pattern_fails_before_io() {
        let mut reg = SourceRegistry::new();
        reg.register("gone", "/definitely/not/here.log");

        // The broken source never matters: validation runs first.
        assert!(matches!(
            search_sources("", &reg).await,
            Err(SearchError::EmptyPattern)
        ));
    }

    #[tokio::test]
    async fn invalid_pattern_fails_before_io() {
        let mut reg = SourceRegistry::new();
        reg.register("gone", "/definitely/not/here.log");

        assert!(matches!(
            search_sources("[", &reg).await,
            Err(SearchError::BadPattern(_))
        ));
    }

    #[tokio::test]
    async fn missing_source_aborts_whole_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = SourceRegistry::new();
        let good = dir.path().join("good.log");
        std::fs::write(&good, "ERROR: present\n").unwrap();
        reg.register("good", good);
        reg.register("gone", dir.path().join("gone.log"));

        match search_sources("ERROR", &reg).await {
            Err(SearchError::SourceUnavailable { name }) => assert_eq!(name, "gone"),
            other => panic!("expected SourceUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn directory_as_source_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = SourceRegistry::new();
        reg.register("dir", dir.path());

        assert!(matches!(
            search_sources("x", &reg).await,
            Err(SearchError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn crlf_terminators_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry_with(&[("win", "ERROR: crlf\r\nINFO: ok\r\n")], &dir);

        let report = search_sources("ERROR", &reg).await.unwrap();
        assert_eq!(report.sections()[0].1, ["ERROR: crlf"]);
    }

    #[tokio::test]
    async fn final_line_without_newline_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry_with(&[("tail", "INFO: ok\nERROR: no terminator")], &dir);

        let report = search_sources("ERROR", &reg).await.unwrap();
        assert_eq!(report.sections()[0].1, ["ERROR: no terminator"]);
    }

    #[tokio::test]
    async fn match_is_anywhere_unless_anchored() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry_with(&[("app", "prefix ERROR suffix\nERROR at start\n")], &dir);

        let report = search_sources("ERROR", &reg).await.unwrap();
        assert_eq!(report.total_matches(), 2);

        let report = search_sources("^ERROR", &reg).await.unwrap();
        assert_eq!(report.sections()[0].1, ["ERROR at start"]);
    }

    #[tokio::test]
    async fn empty_registry_yields_empty_report() {
        let reg = SourceRegistry::new();
        let report = search_sources("anything", &reg).await.unwrap();
        assert_eq!(report.total_matches(), 0);
        assert!(report.sections().is_empty());
    }
}
