use std::{fs, path::Path, sync::Arc, thread};

use gridstage_model::{ErrorMask, ResultRecord, WorkUnit, WorkUnitFlag};
use gridstage_observe::{MemoryReporter, Severity};
use tempfile::TempDir;

use super::*;
use crate::resolve::RecordedPathResolver;

struct Fixture {
    results: TempDir,
    scratch: TempDir,
    reporter: Arc<MemoryReporter>,
    assimilator: Assimilator<RecordedPathResolver>,
}

impl Fixture {
    fn new() -> Self {
        let results = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let reporter = Arc::new(MemoryReporter::new());
        let cfg = AssimilatorConfig::default().with_results_root(results.path());
        let assimilator = Assimilator::new(&cfg, RecordedPathResolver, reporter.clone()).unwrap();
        Self {
            results,
            scratch,
            reporter,
            assimilator,
        }
    }

    /// Write an artifact in scratch space and return a canonical result pointing at it.
    fn result_with_artifact(&self, id: u64, content: &[u8], metadata: &str) -> ResultRecord {
        let dir = self.scratch.path().join(format!("r{id}"));
        fs::create_dir_all(&dir).unwrap();
        let output = dir.join("output");
        fs::write(&output, content).unwrap();
        ResultRecord::new(id, format!("r{id}"))
            .with_output_path(output)
            .with_metadata(metadata)
    }

    fn root(&self) -> &Path {
        self.assimilator.staging_area().root()
    }

    fn staged_files(&self) -> usize {
        count_files(self.results.path())
    }
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| {
            // DirEntry::file_type does not follow symlinks
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir { count_files(&e.path()) } else { 1 }
        })
        .sum()
}

fn mask_of(combo: u32) -> ErrorMask {
    WorkUnitFlag::ALL
        .into_iter()
        .enumerate()
        .filter(|(i, _)| combo & (1 << i) != 0)
        .map(|(_, flag)| flag)
        .collect()
}

#[test]
fn assimilator_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Assimilator<RecordedPathResolver>>();
}

#[test]
fn no_canonical_result_stages_nothing() {
    let fx = Fixture::new();
    let wu = WorkUnit::new("wu1");

    let out = fx.assimilator.assimilate(&wu, &[], None);

    assert_eq!(out.staging, Staging::NoCanonicalResult);
    assert!(out.flags.is_empty());
    assert_eq!(fx.staged_files(), 0);
    assert!(fx.reporter.critical_reports().is_empty());
    assert!(
        fx.reporter
            .for_subject("wu1")
            .iter()
            .any(|r| r.message == "No canonical result")
    );
}

#[test]
fn canonical_result_is_ignored_without_canonical_id() {
    let fx = Fixture::new();
    let result = fx.result_with_artifact(1, b"x", "<open_name>out.dat</open_name>");
    let wu = WorkUnit::new("wu1");

    let out = fx
        .assimilator
        .assimilate(&wu, std::slice::from_ref(&result), Some(&result));

    assert_eq!(out.staging, Staging::NoCanonicalResult);
    assert_eq!(fx.staged_files(), 0);
}

#[test]
fn wu42_stages_nested_open_name() {
    let fx = Fixture::new();
    let result = fx.result_with_artifact(
        1,
        b"batch seven output",
        "<file_ref><file_name>pymw_out</file_name><open_name>batch7/out.dat</open_name></file_ref>",
    );
    let wu = WorkUnit::new("wu42").with_canonical(1);

    let out = fx
        .assimilator
        .assimilate(&wu, std::slice::from_ref(&result), Some(&result));

    let target = fx.root().join("batch7/out.dat");
    assert_eq!(
        out.staging,
        Staging::Staged {
            target: target.clone(),
            replaced: false
        }
    );
    assert_eq!(fs::read(&target).unwrap(), b"batch seven output");
    assert!(fx.reporter.critical_reports().is_empty());
}

#[test]
fn directory_artifacts_are_copied_recursively() {
    let fx = Fixture::new();
    let src = fx.scratch.path().join("outdir");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::write(src.join("sub/a"), b"a").unwrap();
    let result = ResultRecord::new(5, "r5")
        .with_output_path(&src)
        .with_metadata(r#"{"open_name":"run5"}"#);
    let wu = WorkUnit::new("wu5").with_canonical(5);

    let out = fx.assimilator.assimilate(&wu, &[], Some(&result));

    assert!(out.is_staged());
    assert_eq!(fs::read(fx.root().join("run5/sub/a")).unwrap(), b"a");
}

#[test]
fn brace_prefixed_free_text_metadata_is_staged() {
    let fx = Fixture::new();
    let result = fx.result_with_artifact(9, b"job seven", "{job 7} <open_name>out.dat</open_name>");
    let wu = WorkUnit::new("wu9").with_canonical(9);

    let out = fx.assimilator.assimilate(&wu, &[], Some(&result));

    assert_eq!(out.target(), Some(&fx.root().join("out.dat")));
    assert_eq!(fs::read(fx.root().join("out.dat")).unwrap(), b"job seven");
}

#[cfg(unix)]
#[test]
fn symlinks_inside_directory_artifacts_are_not_followed() {
    let fx = Fixture::new();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret"), b"not part of the artifact").unwrap();

    let src = fx.scratch.path().join("outdir");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a"), b"a").unwrap();
    std::os::unix::fs::symlink(outside.path(), src.join("link")).unwrap();
    let result = ResultRecord::new(6, "r6")
        .with_output_path(&src)
        .with_metadata("<open_name>run</open_name>");
    let wu = WorkUnit::new("wu6").with_canonical(6);

    let out = fx.assimilator.assimilate(&wu, &[], Some(&result));

    assert!(out.is_staged());
    let link = fx.root().join("run/link");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&link).unwrap(), outside.path());
    assert_eq!(fs::read(fx.root().join("run/a")).unwrap(), b"a");
    // `a` plus the link itself
    assert_eq!(fx.staged_files(), 2);
}

#[test]
fn malformed_metadata_skips_staging() {
    let cases = [
        ("no markers here", MetadataError::MissingOpenMarker),
        ("<open_name>out.dat", MetadataError::MissingCloseMarker),
        ("</open_name>out.dat<open_name>", MetadataError::MissingCloseMarker),
        ("<open_name></open_name>", MetadataError::EmptyName),
    ];

    for (metadata, expected) in cases {
        let fx = Fixture::new();
        let result = fx.result_with_artifact(1, b"x", metadata);
        let wu = WorkUnit::new("wu-bad").with_canonical(1);

        let out = fx.assimilator.assimilate(&wu, &[], Some(&result));

        assert_eq!(out.staging, Staging::Skipped(SkipReason::Metadata(expected)));
        assert_eq!(fx.staged_files(), 0, "metadata {metadata:?}");
        let reports = fx.reporter.for_subject("wu-bad");
        assert!(reports.iter().any(|r| r.message.contains("unusable metadata")));
        assert!(fx.reporter.critical_reports().is_empty());
    }
}

#[test]
fn traversal_names_are_rejected() {
    let fx = Fixture::new();
    let result = fx.result_with_artifact(1, b"x", "<open_name>../../etc/cron.d/job</open_name>");
    let wu = WorkUnit::new("wu-evil").with_canonical(1);

    let out = fx.assimilator.assimilate(&wu, &[], Some(&result));

    assert_eq!(
        out.staging,
        Staging::Skipped(SkipReason::InvalidName("../../etc/cron.d/job".into()))
    );
    assert_eq!(fx.staged_files(), 0);
}

#[test]
fn unresolved_artifact_is_reported_and_skipped() {
    let fx = Fixture::new();
    let missing = fx.scratch.path().join("gone");
    let result = ResultRecord::new(1, "r1")
        .with_output_path(&missing)
        .with_metadata("<open_name>out.dat</open_name>");
    let wu = WorkUnit::new("wu7")
        .with_canonical(1)
        .with_error_mask(WorkUnitFlag::TooManyErrorResults.bit());

    let out = fx.assimilator.assimilate(&wu, &[], Some(&result));

    assert_eq!(
        out.staging,
        Staging::Skipped(SkipReason::Unresolved(ResolveError::NotFound(missing)))
    );
    // classification still ran
    assert_eq!(out.flags, vec![WorkUnitFlag::TooManyErrorResults]);
    let critical = fx.reporter.critical_reports();
    assert_eq!(critical.len(), 2);
    assert!(critical[0].message.starts_with("Cannot resolve output"));
    assert_eq!(critical[1].message, "Error: too many error results");
}

#[test]
fn canonical_id_without_record_is_skipped() {
    let fx = Fixture::new();
    let wu = WorkUnit::new("wu8").with_canonical(3);

    let out = fx.assimilator.assimilate(&wu, &[], None);

    assert_eq!(out.staging, Staging::Skipped(SkipReason::CanonicalNotSupplied));
    assert_eq!(fx.staged_files(), 0);
}

#[test]
fn wu43_reports_exactly_two_conditions() {
    let fx = Fixture::new();
    let wu = WorkUnit::new("wu43").with_error_mask(
        WorkUnitFlag::CouldntSendResult.bit() | WorkUnitFlag::TooManyTotalResults.bit(),
    );

    let out = fx.assimilator.assimilate(&wu, &[], None);

    let critical = fx.reporter.critical_reports();
    assert_eq!(critical.len(), 2);
    assert!(critical.iter().all(|r| r.subject == "wu43"));
    assert_eq!(critical[0].message, "Error: couldn't send a result");
    assert_eq!(critical[1].message, "Error: too many total results");
    assert_eq!(out.staging, Staging::NoCanonicalResult);
    assert_eq!(fx.staged_files(), 0);
}

#[test]
fn every_flag_combination_reports_once_per_bit_in_stable_order() {
    let fx = Fixture::new();

    for combo in 0u32..16 {
        let wu = WorkUnit::new(format!("wu-mask-{combo}")).with_error_mask(mask_of(combo));
        fx.reporter.drain();

        let out = fx.assimilator.assimilate(&wu, &[], None);

        let critical = fx.reporter.critical_reports();
        assert_eq!(critical.len(), combo.count_ones() as usize, "combo {combo:#06b}");

        let expected: Vec<String> = WorkUnitFlag::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| combo & (1 << i) != 0)
            .map(|(_, f)| format!("Error: {f}"))
            .collect();
        let got: Vec<String> = critical.iter().map(|r| r.message.clone()).collect();
        assert_eq!(got, expected);
        assert_eq!(out.flags.len(), expected.len());
        assert!(critical.iter().all(|r| r.severity == Severity::Critical));
    }
}

#[test]
fn reserved_bits_are_not_reported() {
    let fx = Fixture::new();
    let wu = WorkUnit::new("wu9").with_error_mask(ErrorMask(0x10 | 0x20 | 0x40));

    let out = fx.assimilator.assimilate(&wu, &[], None);

    assert!(out.flags.is_empty());
    assert!(fx.reporter.critical_reports().is_empty());
}

#[test]
fn double_invocation_is_idempotent() {
    let fx = Fixture::new();
    let result = fx.result_with_artifact(1, b"same bytes", "<open_name>out.dat</open_name>");
    let wu = WorkUnit::new("wu10")
        .with_canonical(1)
        .with_error_mask(WorkUnitFlag::CouldntSendResult.bit());

    let first = fx.assimilator.assimilate(&wu, &[], Some(&result));
    let second = fx.assimilator.assimilate(&wu, &[], Some(&result));

    let target = fx.root().join("out.dat");
    assert_eq!(first.target(), Some(&target));
    assert_eq!(second.target(), Some(&target));
    assert_eq!(
        second.staging,
        Staging::Staged {
            target: target.clone(),
            replaced: true
        }
    );
    assert_eq!(fs::read(&target).unwrap(), b"same bytes");
    assert_eq!(fx.staged_files(), 1);
    // reports are repeated, never deduplicated
    assert_eq!(fx.reporter.critical_reports().len(), 2);
}

#[test]
fn concurrent_distinct_work_units() {
    let fx = Fixture::new();
    let results: Vec<ResultRecord> = (0..8)
        .map(|i| {
            fx.result_with_artifact(
                i,
                format!("artifact {i}").as_bytes(),
                &format!("<open_name>batch/out{i}.dat</open_name>"),
            )
        })
        .collect();

    thread::scope(|s| {
        for result in &results {
            let assimilator = &fx.assimilator;
            s.spawn(move || {
                let wu = WorkUnit::new(format!("wu-{}", result.id)).with_canonical(result.id.get());
                assert!(assimilator.assimilate(&wu, &[], Some(result)).is_staged());
            });
        }
    });

    for i in 0..8 {
        let content = fs::read(fx.root().join(format!("batch/out{i}.dat"))).unwrap();
        assert_eq!(content, format!("artifact {i}").as_bytes());
    }
}

#[test]
fn missing_root_fails_at_startup() {
    let dir = TempDir::new().unwrap();
    let cfg = AssimilatorConfig::default().with_results_root(dir.path().join("missing"));

    let err = Assimilator::new(&cfg, RecordedPathResolver, Arc::new(MemoryReporter::new()));

    assert!(matches!(err, Err(CoreError::ResultsRoot { .. })));
}
