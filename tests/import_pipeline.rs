//! End-to-end import pipeline tests: parsing, conflict resolution by
//! policy, identifier remapping, and atomic commit.

use std::collections::BTreeSet;

use seqlabel::error::SeqlabelError;
use seqlabel::import::{
    run_import, DuplicatePolicy, ImportPolicy, MissingDependencyPolicy,
};
use seqlabel::model::{Id, NamedRecord, Record, RecordKind, VideoRecord};
use seqlabel::store::{MemoryStore, Store, Transaction};

const ANNOTATION_LINE: &str = concat!(
    "{\"type\":\"annotation\",\"data\":{\"id\":\"a1\",\"videoId\":\"v1\",",
    "\"kind\":\"object\",\"linkedKind\":\"entity\",\"linkedId\":\"e1\",",
    "\"sequence\":{\"boxes\":[",
    "{\"x\":10.0,\"y\":20.0,\"width\":30.0,\"height\":40.0,\"frameNumber\":0,\"isKeyframe\":true},",
    "{\"x\":50.0,\"y\":60.0,\"width\":30.0,\"height\":40.0,\"frameNumber\":10,\"isKeyframe\":true}",
    "],\"interpolationSegments\":[{\"startFrame\":0,\"endFrame\":10,\"kind\":\"linear\"}],",
    "\"totalFrames\":11,\"keyframeCount\":2,\"interpolatedFrameCount\":9}}}"
);

fn batch_with_video() -> String {
    format!(
        "{}\n{}\n{}\n",
        "{\"type\":\"video\",\"data\":{\"id\":\"v1\",\"name\":\"clip\"}}",
        "{\"type\":\"world-entity\",\"data\":{\"id\":\"e1\",\"name\":\"Car\"}}",
        ANNOTATION_LINE
    )
}

#[test]
fn clean_batch_commits_everything() {
    let mut store = MemoryStore::new();
    let summary = run_import(
        batch_with_video().as_bytes(),
        &mut store,
        &ImportPolicy::default(),
    )
    .expect("import succeeds");

    assert_eq!(summary.imported, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.replaced, 0);
    assert!(summary.conflicts.is_empty());
    assert_eq!(store.len(RecordKind::Video), 1);
    assert_eq!(store.len(RecordKind::WorldEntity), 1);
    assert_eq!(store.annotations().len(), 1);
}

#[test]
fn duplicate_skip_keeps_existing_record() {
    let mut store = MemoryStore::new();
    store.seed(Record::Video(VideoRecord {
        id: Id::new("v1"),
        name: Some("original".into()),
        extra: Default::default(),
    }));

    let summary = run_import(
        batch_with_video().as_bytes(),
        &mut store,
        &ImportPolicy::default(),
    )
    .expect("import succeeds");

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.conflicts.len(), 1);

    // The seeded video survives untouched.
    match store.get(RecordKind::Video, &Id::new("v1")) {
        Some(Record::Video(v)) => assert_eq!(v.name.as_deref(), Some("original")),
        other => panic!("expected video, got {other:?}"),
    }
}

#[test]
fn duplicate_replace_overwrites_existing_record() {
    let mut store = MemoryStore::new();
    store.seed(Record::Video(VideoRecord {
        id: Id::new("v1"),
        name: Some("original".into()),
        extra: Default::default(),
    }));

    let policy = ImportPolicy {
        duplicates: DuplicatePolicy::Replace,
        ..Default::default()
    };
    let summary = run_import(batch_with_video().as_bytes(), &mut store, &policy)
        .expect("import succeeds");

    assert_eq!(summary.replaced, 1);
    assert_eq!(summary.imported, 2);
    match store.get(RecordKind::Video, &Id::new("v1")) {
        Some(Record::Video(v)) => assert_eq!(v.name.as_deref(), Some("clip")),
        other => panic!("expected video, got {other:?}"),
    }
}

#[test]
fn duplicate_create_new_rewrites_batch_references() {
    let mut store = MemoryStore::new();
    store.seed(Record::Video(VideoRecord::new("v1")));

    let policy = ImportPolicy {
        duplicates: DuplicatePolicy::CreateNew,
        ..Default::default()
    };
    let summary = run_import(batch_with_video().as_bytes(), &mut store, &policy)
        .expect("import succeeds");

    assert_eq!(summary.imported, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(store.len(RecordKind::Video), 2);

    // The annotation follows the video to its fresh id.
    let annotation = &store.annotations()[0];
    assert_ne!(annotation.video_id, Id::new("v1"));
    let videos: BTreeSet<Id> = store.existing_ids(RecordKind::Video);
    assert!(videos.contains(&annotation.video_id));
}

#[test]
fn missing_dependency_skips_only_the_dependent() {
    // No world-entity e1 anywhere: the annotation is dropped, the video
    // still lands.
    let input = format!(
        "{}\n{}\n",
        "{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}", ANNOTATION_LINE
    );
    let mut store = MemoryStore::new();
    let summary = run_import(input.as_bytes(), &mut store, &ImportPolicy::default())
        .expect("import succeeds");

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.len(RecordKind::Video), 1);
    assert!(store.annotations().is_empty());
}

#[test]
fn id_collision_across_kinds_drops_only_the_broken_record() {
    // A video and an annotation share the id "shared". The annotation's
    // entity is missing, so it is skipped; both videos must still land.
    let input = concat!(
        "{\"type\":\"video\",\"data\":{\"id\":\"shared\"}}\n",
        "{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}\n",
        "{\"type\":\"annotation\",\"data\":{\"id\":\"shared\",\"videoId\":\"v1\",",
        "\"kind\":\"object\",\"linkedKind\":\"entity\",\"linkedId\":\"missing-e\",",
        "\"sequence\":{\"boxes\":[{\"x\":1.0,\"y\":2.0,\"width\":3.0,\"height\":4.0,",
        "\"frameNumber\":0,\"isKeyframe\":true}],\"totalFrames\":1,\"keyframeCount\":1,",
        "\"interpolatedFrameCount\":0}}}\n",
    );
    let mut store = MemoryStore::new();
    let summary = run_import(input.as_bytes(), &mut store, &ImportPolicy::default())
        .expect("import succeeds");

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.conflicts.len(), 1);
    assert_eq!(summary.conflicts[0].line, 3);
    assert_eq!(store.len(RecordKind::Video), 2);
    assert!(store.get(RecordKind::Video, &Id::new("shared")).is_some());
    assert!(store.annotations().is_empty());
}

#[test]
fn missing_dependency_fail_import_writes_nothing() {
    let input = format!(
        "{}\n{}\n",
        "{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}", ANNOTATION_LINE
    );
    let policy = ImportPolicy {
        missing_dependencies: MissingDependencyPolicy::FailImport,
        ..Default::default()
    };
    let mut store = MemoryStore::new();
    let err = run_import(input.as_bytes(), &mut store, &policy).unwrap_err();

    match err {
        SeqlabelError::DependenciesMissing { conflicts } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].record_id, Id::new("a1"));
        }
        other => panic!("expected DependenciesMissing, got {other:?}"),
    }
    assert!(store.is_empty());
}

#[test]
fn parse_errors_abort_with_every_line() {
    let input = "garbage\n{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}\n{\"data\":{}}\n";
    let mut store = MemoryStore::new();
    let err = run_import(input.as_bytes(), &mut store, &ImportPolicy::default()).unwrap_err();

    match err {
        SeqlabelError::ImportParse { errors } => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].line, 1);
            assert_eq!(errors[1].line, 3);
        }
        other => panic!("expected ImportParse, got {other:?}"),
    }
    assert!(store.is_empty());
}

/// A store whose transactions always fail at the end, exercising the
/// rollback contract of the committer.
#[derive(Default)]
struct FailingStore {
    inner: MemoryStore,
    attempts: usize,
}

impl Store for FailingStore {
    fn existing_ids(&self, kind: RecordKind) -> BTreeSet<Id> {
        self.inner.existing_ids(kind)
    }

    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Transaction) -> Result<(), SeqlabelError>,
    ) -> Result<(), SeqlabelError> {
        self.attempts += 1;
        let mut staged = Vec::new();
        f(&mut StagingTransaction { staged: &mut staged })?;
        Err(SeqlabelError::Commit {
            message: "simulated storage failure".into(),
        })
    }
}

struct StagingTransaction<'a> {
    staged: &'a mut Vec<Record>,
}

impl Transaction for StagingTransaction<'_> {
    fn insert(&mut self, record: Record) -> Result<(), SeqlabelError> {
        self.staged.push(record);
        Ok(())
    }

    fn replace(&mut self, record: Record) -> Result<(), SeqlabelError> {
        self.staged.push(record);
        Ok(())
    }
}

#[test]
fn commit_failure_surfaces_and_leaves_store_untouched() {
    let mut store = FailingStore::default();
    store
        .inner
        .seed(Record::WorldEntity(NamedRecord::new("e0", "Seeded")));

    let err = run_import(
        batch_with_video().as_bytes(),
        &mut store,
        &ImportPolicy::default(),
    )
    .unwrap_err();

    assert!(matches!(err, SeqlabelError::Commit { .. }));
    assert_eq!(store.attempts, 1);
    assert_eq!(store.inner.len(RecordKind::WorldEntity), 1);
    assert_eq!(store.inner.len(RecordKind::Video), 0);
}
