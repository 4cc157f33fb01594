// src/util/process.rs
use anyhow::{bail, Result};
use sysinfo::System;

// macOS can show as either
#[cfg(target_os = "macos")]
const ANKI_PROCESS_NAMES: &[&str] = &["Anki", "anki"];
#[cfg(target_os = "windows")]
const ANKI_PROCESS_NAMES: &[&str] = &["anki.exe"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const ANKI_PROCESS_NAMES: &[&str] = &["anki"];

/// PID of a running Anki desktop process, if any.
pub fn find_anki_process() -> Option<u32> {
    let system = System::new_all();

    ANKI_PROCESS_NAMES.iter().find_map(|name| {
        system
            .processes_by_exact_name(name.as_ref())
            .next()
            .map(|process| process.pid().as_u32())
    })
}

/// Fail if Anki is running.
///
/// The collection backend writes the collection file directly, which must not
/// happen while Anki holds it open.
pub fn check_anki_not_running() -> Result<()> {
    if let Some(pid) = find_anki_process() {
        bail!(
            "Anki is currently running (PID: {}).\n\n\
             The collection backend writes collection.anki2 directly and needs Anki closed.\n\
             Either close Anki and try again, or use `--backend connect` to sync\n\
             through the AnkiConnect add-on of the running app.",
            pid
        );
    }

    Ok(())
}
