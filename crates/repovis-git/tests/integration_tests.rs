//! Integration tests for repovis-git
//!
//! These tests build small git repositories on disk and run the full pipeline
//! against them through `GitRepo`.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, RepositoryInitOptions, Signature, Time};
use repovis_git::prelude::*;
use repovis_git::{History, Revision, repository_metadata, resolve_settings};
use similar_asserts::assert_eq;
use tempfile::TempDir;

/// A scratch repository with a deterministic clock
struct TestRepo {
    dir: TempDir,
    repo: Repository,
    clock: i64,
}

impl TestRepo {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init repository");
        Self {
            dir,
            repo,
            clock: 1_700_000_000,
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative_path: &str, content: &str) -> &Self {
        let file_path = self.path().join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        self
    }

    fn remove(&self, relative_path: &str) -> &Self {
        fs::remove_file(self.path().join(relative_path)).expect("Failed to remove file");
        self
    }

    fn rename(&self, from: &str, to: &str) -> &Self {
        let target = self.path().join(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::rename(self.path().join(from), target).expect("Failed to rename file");
        self
    }

    /// Stage the whole working tree and commit it on HEAD
    fn commit_as(&mut self, author: &str, message: &str) -> String {
        let mut index = self.repo.index().expect("Failed to open index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("Failed to stage files");
        index.update_all(["*"], None).expect("Failed to stage removals");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        self.clock += 60;
        let signature = Signature::new(author, "test@example.com", &Time::new(self.clock, 0))
            .expect("Failed to create signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .expect("Failed to commit")
            .to_string()
    }

    fn commit(&mut self, message: &str) -> String {
        self.commit_as("Test Author", message)
    }

    fn open(&self) -> GitRepo {
        GitRepo::open(self.path()).expect("Failed to open repository")
    }
}

/// commit 0 adds src/a.txt, commit 1 adds src/b.txt, commit 2 deletes src/a.txt
fn scenario_repo() -> (TestRepo, Vec<String>) {
    let mut test = TestRepo::new();
    let mut hashes = Vec::new();
    test.write("src/a.txt", "a");
    hashes.push(test.commit_as("Alice", "add a"));
    test.write("src/b.txt", "b");
    hashes.push(test.commit_as("Bob", "add b"));
    test.remove("src/a.txt");
    hashes.push(test.commit_as("Alice", "remove a"));
    (test, hashes)
}

fn revision_at(repo: &GitRepo, branch: &str, position: usize) -> Revision {
    History::load(repo, branch)
        .expect("Failed to load history")
        .get(position)
        .cloned()
        .expect("No revision at position")
}

#[test]
fn test_history_is_oldest_first() {
    let (test, hashes) = scenario_repo();
    let repo = test.open();
    let history = History::load(&repo, "main").expect("Failed to load history");

    assert_eq!(history.len(), 3);
    for (position, hash) in hashes.iter().enumerate() {
        assert_eq!(history.position_of(hash), Some(position));
    }
    assert!(history.get(0).expect("root").is_root());
}

#[test]
fn test_root_commit_lists_whole_tree() {
    let mut test = TestRepo::new();
    test.write("README.md", "readme")
        .write("src/lib.rs", "lib")
        .write("src/nested/deep/mod.rs", "deep");
    test.commit("initial");

    let repo = test.open();
    let root = revision_at(&repo, "main", 0);
    let changes = repo.changes(&root).expect("Failed to extract changes");

    assert!(changes.iter().all(|c| c.change_type == FileChangeType::Added));
    let mut paths: Vec<String> = changes.into_iter().map(|c| c.path).collect();
    paths.sort();
    assert_eq!(paths, vec!["README.md", "src/lib.rs", "src/nested/deep/mod.rs"]);

    let mut listing = repo.tree_files(&root.hash, None).expect("Failed to list tree");
    listing.sort();
    assert_eq!(listing, paths);
}

#[test]
fn test_diff_kinds_against_parent() {
    let mut test = TestRepo::new();
    test.write("keep.txt", "1").write("edit.txt", "1").write("drop.txt", "1");
    test.commit("initial");
    test.write("edit.txt", "2").write("new.txt", "1").remove("drop.txt");
    test.commit("second");

    let repo = test.open();
    let second = revision_at(&repo, "main", 1);
    let changes = repo.changes(&second).expect("Failed to extract changes");

    assert_eq!(
        changes,
        vec![
            FileChange::deleted("drop.txt"),
            FileChange::modified("edit.txt"),
            FileChange::added("new.txt"),
        ]
    );
}

#[test]
fn test_rename_reports_delete_and_add() {
    let mut test = TestRepo::new();
    test.write("old/name.txt", "same content");
    test.commit("initial");
    test.rename("old/name.txt", "new/name.txt");
    test.commit("move");

    let repo = test.open();
    let moved = revision_at(&repo, "main", 1);
    let changes = repo.changes(&moved).expect("Failed to extract changes");

    assert_eq!(
        changes,
        vec![
            FileChange::added("new/name.txt"),
            FileChange::deleted("old/name.txt"),
        ]
    );
}

#[test]
fn test_tree_files_for_folders() {
    let mut test = TestRepo::new();
    test.write("src/a.rs", "a")
        .write("src/ui/b.rs", "b")
        .write("src2/c.rs", "c")
        .write("docs", "not a folder");
    let hash = test.commit("initial");
    let repo = test.open();

    let mut files = repo.tree_files(&hash, Some("src")).expect("Failed to list");
    files.sort();
    assert_eq!(files, vec!["src/a.rs", "src/ui/b.rs"]);

    assert_eq!(
        repo.tree_files(&hash, Some("/src/ui/")).expect("Failed to list"),
        vec!["src/ui/b.rs"]
    );
    assert!(repo.tree_files(&hash, Some("missing")).expect("list").is_empty());
    assert!(repo.tree_files(&hash, Some("docs")).expect("list").is_empty());
}

#[test]
fn test_collapse_scenario_on_disk() {
    let (test, hashes) = scenario_repo();
    let repo = test.open();
    let structures = vec![
        Structure::new("src", "group")
            .collapsing()
            .with_positions(Some(0), Some(2)),
    ];

    let window = build_window(&repo, "main", &structures, WindowRequest::default())
        .expect("Failed to build window");

    let group = FileChange {
        change_type: FileChangeType::Added,
        path: "src/group".to_string(),
        collapsed: true,
    };
    assert_eq!(window[&0].changes, vec![group.clone()]);
    assert_eq!(window[&1].changes, vec![group]);
    assert_eq!(
        window[&2].changes,
        vec![
            FileChange::deleted("src/a.txt"),
            FileChange::expanded("src/b.txt"),
        ]
    );
    assert_eq!(window[&0].author, "Alice");
    assert_eq!(window[&1].author, "Bob");
    assert_eq!(window[&2].hash, hashes[2]);
    assert!(window[&0].timestamp < window[&1].timestamp);
}

#[test]
fn test_prepare_then_window_roundtrip() {
    let (test, hashes) = scenario_repo();
    let repo = test.open();
    let settings = Settings {
        milestones: vec![
            Milestone::new(hashes[1].as_str(), "second"),
            Milestone::new("0".repeat(40), "stale"),
        ],
        structures: vec![
            Structure::new("src", "group")
                .collapsing()
                .with_hashes(Some(hashes[0].as_str()), Some(hashes[2].as_str())),
        ],
    };

    let metadata = repository_metadata(&repo, "local", "main", Some(settings))
        .expect("Failed to compute metadata");
    assert_eq!(metadata.total_commits, 3);
    let settings = metadata.settings.expect("settings");
    assert_eq!(settings.milestones.len(), 1, "stale milestone is dropped");

    let window = build_window(&repo, "main", &settings.structures, WindowRequest::default())
        .expect("Failed to build window");
    let milestone = &settings.milestones[0];
    let id = milestone.commit_id.expect("resolved");
    assert_eq!(window[&id].hash, milestone.commit_hash);
    assert_eq!(window[&id].index, id);
    assert!(window[&id].changes.iter().all(|c| c.collapsed));
}

#[test]
fn test_resolution_is_stable_across_calls() {
    let (test, hashes) = scenario_repo();
    let repo = test.open();
    let history = History::load(&repo, "main").expect("Failed to load history");

    let mut first = Settings {
        milestones: vec![Milestone::new(hashes[2].as_str(), "tip")],
        structures: Vec::new(),
    };
    let mut second = first.clone();
    resolve_settings(&history, &mut first);
    resolve_settings(&history, &mut second);
    assert_eq!(first, second);
    assert_eq!(first.milestones[0].commit_id, Some(2));
}

#[test]
fn test_branch_resolution() {
    let (test, hashes) = scenario_repo();
    let repo = test.open();

    assert_eq!(repo.resolve_branch("main").expect("main"), hashes[2]);
    assert_eq!(repo.resolve_branch("refs/heads/main").expect("ref"), hashes[2]);

    let err = build_window(&repo, "does-not-exist", &[], WindowRequest::default()).unwrap_err();
    assert!(err.is_branch_not_found());

    let oid = git2::Oid::from_str(&hashes[1]).expect("oid");
    test.repo
        .reference("refs/remotes/origin/feature", oid, false, "test remote ref")
        .expect("Failed to create remote ref");
    assert_eq!(repo.resolve_branch("feature").expect("feature"), hashes[1]);

    let window = build_window(&repo, "feature", &[], WindowRequest::default())
        .expect("Failed to build window");
    assert_eq!(window.len(), 2);
}

#[test]
fn test_window_beyond_history_is_empty() {
    let (test, _) = scenario_repo();
    let repo = test.open();
    let window = build_window(&repo, "main", &[], WindowRequest::new(3, 50))
        .expect("Failed to build window");
    assert!(window.is_empty());
}

#[test]
fn test_window_json_shape() {
    let (test, hashes) = scenario_repo();
    let repo = test.open();
    let window = build_window(&repo, "main", &[], WindowRequest::new(0, 1))
        .expect("Failed to build window");

    let json = serde_json::to_value(&window).expect("Failed to serialize");
    let first = &json["0"];
    assert_eq!(first["commitId"], 0);
    assert_eq!(first["commitHash"], hashes[0].as_str());
    assert_eq!(first["author"], "Alice");
    assert!(first["timestamp"].is_i64());
    assert_eq!(first["changes"][0]["type"], "A");
    assert_eq!(first["changes"][0]["file"], "src/a.txt");
}
