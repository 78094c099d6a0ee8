// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for settings documents
//!
//! Parses arbitrary JSON as a settings document, resolves it against a small
//! in-memory history and builds a window with the surviving structures.

#![no_main]

use libfuzzer_sys::fuzz_target;

use repovis_git::{
    History, MemoryHistory, Settings, WindowRequest, resolve_settings, window_from_history,
};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut settings) = Settings::from_json(input) else {
        return;
    };

    let mut memory = MemoryHistory::new();
    memory.commit("main", "fuzz", [("src/a.txt", "a"), ("docs/b.md", "b")]);
    memory.commit("main", "fuzz", [("src/a.txt", "a2"), ("src/c.txt", "c")]);
    memory.commit("main", "fuzz", [("src/c.txt", "c")]);
    let Ok(history) = History::load(&memory, "main") else {
        return;
    };

    resolve_settings(&history, &mut settings);
    for structure in &settings.structures {
        if let (Some(start), Some(end)) = (structure.start_commit_id, structure.end_commit_id) {
            assert!(start <= end, "inverted structure survived resolution");
        }
    }

    // Window building should never panic on any resolved document
    let _ = window_from_history(&memory, &history, &settings.structures, WindowRequest::default());
});
