use assert_matches::assert_matches;
use css_analyzer::{
    analyze, analyze_with_config, collect_classes, AnalyzeError, AnalyzerConfig,
    CancellationToken, SinkError, WarningKind,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config(workers: usize) -> AnalyzerConfig {
    AnalyzerConfig::default()
        .with_workers(workers)
        .with_channel_capacity(16)
        .with_follow_links(false)
        .with_max_file_size(None)
}

fn run(root: &Path, output: &Path, workers: usize) -> Result<String, AnalyzeError> {
    analyze_with_config(root, output, &config(workers), &CancellationToken::new())?;
    Ok(fs::read_to_string(output).unwrap())
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn test_example_document_tokens() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(
        site.path(),
        "index.html",
        r#"<!DOCTYPE html>
<html>
  <body class="bg-slate-950 text-gray-100 max-w-4xl mx-auto rounded-lg shadow-lg">
    <div class="flex flex-col gap-4">
      <section class="flex gap-4 shadow-lg"></section>
    </div>
  </body>
</html>"#,
    );

    let output = out.path().join("classes.txt");
    let text = run(site.path(), &output, 4).unwrap();

    assert_eq!(
        text,
        "bg-slate-950\nflex\nflex-col\ngap-4\nmax-w-4xl\nmx-auto\nrounded-lg\nshadow-lg\ntext-gray-100\n"
    );
}

#[test]
fn test_dedup_across_files() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(site.path(), "a.html", r#"<p class="btn btn primary"></p>"#);
    write(site.path(), "nested/b.html", r#"<p class="btn"></p><a class="primary link"></a>"#);
    write(site.path(), "nested/deeper/c.html", r#"<span class="link btn"></span>"#);

    let text = run(site.path(), &out.path().join("classes.txt"), 3).unwrap();

    assert_eq!(text, "btn\nlink\nprimary\n");
}

#[test]
fn test_output_sorted_and_stable_across_worker_counts() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    for i in 0..60 {
        write(
            site.path(),
            &format!("d{}/page{}.html", i % 7, i),
            &format!(r#"<div class="z-{} A-{} m{}"><b class="Zed alpha _x"></b></div>"#, i, i % 5, i % 3),
        );
    }

    let baseline = run(site.path(), &out.path().join("one.txt"), 1).unwrap();
    let lines: Vec<&str> = baseline.lines().collect();
    assert!(lines.windows(2).all(|pair| pair[0].as_bytes() < pair[1].as_bytes()));
    // 60 z-*, 5 A-*, 3 m*, Zed, alpha, _x
    assert_eq!(lines.len(), 60 + 5 + 3 + 3);
    assert_eq!(lines[0], "A-0");

    for workers in [2, 5, 16] {
        let output = out.path().join(format!("w{}.txt", workers));
        assert_eq!(run(site.path(), &output, workers).unwrap(), baseline);
    }
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(site.path(), "a.html", r#"<p class="one two"></p>"#);
    write(site.path(), "b.html", r#"<p class="three"></p>"#);

    let output = out.path().join("classes.txt");

    run(site.path(), &output, 2).unwrap();
    let first = fs::read(&output).unwrap();
    run(site.path(), &output, 2).unwrap();
    let second = fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_malformed_file_does_not_abort() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(site.path(), "good1.html", r#"<p class="alpha beta"></p>"#);
    write(site.path(), "good2.html", r#"<div class="gamma"><p class="alpha">"#);
    fs::write(site.path().join("bad.html"), b"<p class=\"delta\xc3\x28\"></p>").unwrap();

    let output = out.path().join("classes.txt");
    let report = analyze_with_config(
        site.path(),
        &output,
        &config(2),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "alpha\nbeta\ngamma\n");
    assert_eq!(report.stats.files_discovered, 3);
    assert_eq!(report.stats.files_skipped, 1);

    let parse_warnings: Vec<_> = report.warnings_of(WarningKind::Parse).collect();
    assert_eq!(parse_warnings.len(), 1);
    assert_eq!(parse_warnings[0].path, site.path().join("bad.html"));
    assert!(report
        .diagnostics
        .format_cargo_style()
        .contains("warning[E011]"));
}

#[test]
fn test_non_html_files_ignored() {
    let site = tempdir().unwrap();
    write(site.path(), "page.html", r#"<p class="kept"></p>"#);
    write(site.path(), "page.htm", r#"<p class="htm"></p>"#);
    write(site.path(), "PAGE.HTML", r#"<p class="upper"></p>"#);
    write(site.path(), "notes.txt", r#"<p class="text"></p>"#);

    let report = collect_classes(site.path(), &config(2), &CancellationToken::new()).unwrap();

    assert_eq!(report.result.as_slice(), ["kept"]);
}

#[test]
fn test_empty_tree_writes_empty_output() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::create_dir(site.path().join("empty-subdir")).unwrap();

    let text = run(site.path(), &out.path().join("classes.txt"), 2).unwrap();

    assert_eq!(text, "");
}

#[test]
fn test_existing_output_is_truncated() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(site.path(), "a.html", r#"<p class="fresh"></p>"#);

    let output = out.path().join("classes.txt");
    fs::write(&output, "old-1\nold-2\nold-3\nold-4\n").unwrap();

    assert_eq!(run(site.path(), &output, 1).unwrap(), "fresh\n");
}

#[test]
fn test_missing_root_fails_without_creating_output() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    let output = out.path().join("classes.txt");

    let err = analyze(site.path().join("missing"), &output).unwrap_err();

    assert_matches!(err, AnalyzeError::Traversal { .. });
    assert!(!output.exists());
}

#[test]
fn test_unwritable_destination_fails() {
    let site = tempdir().unwrap();
    write(site.path(), "a.html", r#"<p class="x"></p>"#);

    let output = site.path().join("missing-dir").join("classes.txt");
    let err = analyze_with_config(site.path(), &output, &config(2), &CancellationToken::new())
        .unwrap_err();

    assert_matches!(err, AnalyzeError::Write(SinkError::Create { .. }));
}

#[test]
fn test_cancelled_run_leaves_output_untouched() {
    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(site.path(), "a.html", r#"<p class="x"></p>"#);

    let output = out.path().join("classes.txt");
    fs::write(&output, "previous\n").unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let err = analyze_with_config(site.path(), &output, &config(2), &token).unwrap_err();

    assert_matches!(err, AnalyzeError::Cancelled);
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let site = tempdir().unwrap();
    write(site.path(), "open/a.html", r#"<p class="visible"></p>"#);
    write(site.path(), "locked/b.html", r#"<p class="hidden"></p>"#);

    let locked = site.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not restrict root
    let restricted = fs::read_dir(&locked).is_err();
    let report = collect_classes(site.path(), &config(2), &CancellationToken::new());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let report = report.unwrap();
    if restricted {
        assert_eq!(report.result.as_slice(), ["visible"]);
        assert_eq!(report.warnings_of(WarningKind::SubPath).count(), 1);
    } else {
        assert_eq!(report.result.as_slice(), ["hidden", "visible"]);
    }
}

#[cfg(unix)]
#[test]
fn test_symlinked_document_is_analyzed() {
    let site = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    write(site.path(), "plain.html", r#"<p class="plain"></p>"#);
    write(elsewhere.path(), "real.html", r#"<p class="from-link"></p>"#);
    std::os::unix::fs::symlink(elsewhere.path().join("real.html"), site.path().join("link.html"))
        .unwrap();

    let report = collect_classes(site.path(), &config(2), &CancellationToken::new()).unwrap();

    assert_eq!(report.result.as_slice(), ["from-link", "plain"]);
    assert_eq!(report.stats.files_discovered, 2);
    assert!(!report.has_warnings());
}

/// A worker blocks reading a FIFO until the run is cancelled from outside
#[cfg(unix)]
#[test]
fn test_cancel_during_run_leaves_output_untouched() {
    use std::io::Write;
    use std::process::Command;

    let site = tempdir().unwrap();
    let out = tempdir().unwrap();
    let pipes = tempdir().unwrap();
    for i in 0..20 {
        write(site.path(), &format!("page-{:02}.html", i), r#"<p class="early"></p>"#);
    }

    let fifo = pipes.path().join("gate");
    let created = Command::new("mkfifo").arg(&fifo).status();
    if !matches!(created, Ok(status) if status.success()) {
        return;
    }
    std::os::unix::fs::symlink(&fifo, site.path().join("gate.html")).unwrap();

    let output = out.path().join("classes.txt");
    fs::write(&output, "previous\n").unwrap();

    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        let fifo = fifo.clone();
        std::thread::spawn(move || {
            // Opening the write end waits for a worker to open the read end
            let mut gate = fs::OpenOptions::new().write(true).open(&fifo).unwrap();
            token.cancel();
            gate.write_all(br#"<p class="late"></p>"#).unwrap();
        })
    };

    let outcome = analyze_with_config(
        site.path(),
        &output,
        &config(2).with_channel_capacity(1),
        &token,
    );
    canceller.join().unwrap();

    assert_matches!(outcome, Err(AnalyzeError::Cancelled));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
}
