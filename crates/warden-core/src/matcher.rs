//! Rule-to-process matching

use std::env::consts::EXE_SUFFIX;
use warden_host::ProcessInfo;
use warden_store::Rule;

/// Processes satisfying a rule's pattern.
///
/// Stateless and re-evaluated from scratch every cycle. An empty result
/// means "rule currently inactive", never an error.
pub fn matching_processes<'a>(rule: &Rule, processes: &'a [ProcessInfo]) -> Vec<&'a ProcessInfo> {
    matching_with_suffix(rule, processes, EXE_SUFFIX)
}

fn matching_with_suffix<'a>(
    rule: &Rule,
    processes: &'a [ProcessInfo],
    exe_suffix: &str,
) -> Vec<&'a ProcessInfo> {
    let pattern = rule.process_name_or_path.to_lowercase();
    let name_pattern = strip_exe_suffix(pattern.clone(), exe_suffix);
    let match_path = pattern.contains('/') || pattern.contains('\\');

    processes
        .iter()
        .filter(|process| {
            // Primary: short name, case-insensitive, extension-agnostic.
            if strip_exe_suffix(process.name.to_lowercase(), exe_suffix) == name_pattern {
                return true;
            }

            // Secondary: exact executable path, only for path-shaped
            // patterns and only on processes whose path was readable.
            if match_path {
                if let Some(exe) = &process.exe {
                    return exe.to_string_lossy().to_lowercase() == pattern;
                }
            }

            false
        })
        .collect()
}

fn strip_exe_suffix(name: String, suffix: &str) -> String {
    if suffix.is_empty() {
        return name;
    }
    match name.strip_suffix(suffix) {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, name: &str, exe: Option<&str>) -> ProcessInfo {
        let info = ProcessInfo::new(pid, name);
        match exe {
            Some(path) => info.with_exe(path),
            None => info,
        }
    }

    fn rule(pattern: &str) -> Rule {
        Rule::new(pattern, 60, 10)
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let processes = vec![proc(1, "Firefox", None), proc(2, "bash", None)];
        let matched = matching_with_suffix(&rule("firefox"), &processes, ".exe");

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].pid, 1);
    }

    #[test]
    fn name_match_strips_exe_suffix_on_both_sides() {
        let processes = vec![proc(1, "game.exe", None), proc(2, "game", None)];

        // Pattern with the suffix matches both forms.
        assert_eq!(
            matching_with_suffix(&rule("Game.exe"), &processes, ".exe").len(),
            2
        );
        // Pattern without the suffix does too.
        assert_eq!(
            matching_with_suffix(&rule("game"), &processes, ".exe").len(),
            2
        );
    }

    #[test]
    fn path_pattern_matches_exact_executable_path() {
        let processes = vec![
            proc(1, "frotz", Some("/usr/games/frotz")),
            proc(2, "frotz", Some("/opt/other/frotz")),
        ];

        let matched = matching_with_suffix(&rule("/usr/games/FROTZ"), &processes, ".exe");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].pid, 1);

        // A path pattern never falls back to short-name matching.
        let matched = matching_with_suffix(&rule("/usr/local/games/frotz"), &processes, ".exe");
        assert!(matched.is_empty());
    }

    #[test]
    fn path_pattern_keeps_suffix_on_path_branch() {
        let processes = vec![proc(1, "other", Some("c:\\games\\doom.exe"))];

        // The path comparison is exact (suffix kept), case-insensitive.
        let matched = matching_with_suffix(&rule("C:\\Games\\DOOM.EXE"), &processes, ".exe");
        assert_eq!(matched.len(), 1);

        // Stripping would break the path branch; a suffix-less path pattern
        // does not match the suffixed executable.
        let matched = matching_with_suffix(&rule("C:\\Games\\DOOM"), &processes, ".exe");
        assert!(matched.is_empty());
    }

    #[test]
    fn process_without_readable_exe_is_skipped_on_path_branch() {
        let processes = vec![proc(1, "zombie", None)];
        let matched = matching_with_suffix(&rule("/usr/bin/zombie"), &processes, ".exe");
        assert!(matched.is_empty());
    }

    #[test]
    fn no_processes_yields_empty_match() {
        let matched = matching_with_suffix(&rule("game"), &[], ".exe");
        assert!(matched.is_empty());
    }
}
