//! Functions that emit data for the wrapping launcher.

use std::path::Path;

use crate::app::input::InputTable;

const PLAY_PREFIX: &str = "__PLAY__=";
const CONTROLS_PREFIX: &str = "__CONTROLS__=";

/// The exit payload lines for a chosen project, in print order.
pub fn play_payload(project: &Path, controls: &InputTable) -> Vec<String> {
    vec![
        format!("{PLAY_PREFIX}{}", project.display()),
        format!("{CONTROLS_PREFIX}{}", controls.to_json()),
    ]
}

/// Emit machine-readable exit payload for launcher wrappers.
pub fn print_play_payload(project: &Path, controls: &InputTable) {
    for line in play_payload(project, controls) {
        println!("{line}");
    }
}

/// Returns the bash function that users should add to their `.bashrc`.
///
/// The function is named `ps-play`; it runs the menu and hands the chosen
/// project to `$PLAYER_SHELL_PLAYER <project> <controls-json>`.
pub fn bash_function() -> String {
    wrapper_function(r#"[ $exit_code -eq 0 ] && [ -n "$project" ] && [ -f "$project" ]"#)
}

/// Returns the zsh function that users should add to their `.zshrc`.
pub fn zsh_function() -> String {
    wrapper_function(r#"[[ $exit_code -eq 0 ]] && [[ -n "$project" ]] && [[ -f "$project" ]]"#)
}

fn wrapper_function(test: &str) -> String {
    let bin = env!("CARGO_PKG_NAME");
    format!(
        r#"
# ── {bin}: console menu for the project player ───────────────
# Pick a project with `ps-play`; it launches $PLAYER_SHELL_PLAYER on exit.
ps-play() {{
    local output
    output="$(command {bin} "$@")"
    local exit_code=$?
    local project=""
    local controls=""
    while IFS= read -r line; do
        case "$line" in
            {PLAY_PREFIX}*) project="${{line#{PLAY_PREFIX}}}" ;;
            {CONTROLS_PREFIX}*) controls="${{line#{CONTROLS_PREFIX}}}" ;;
        esac
    done <<< "$output"
    if {test}; then
        "${{PLAYER_SHELL_PLAYER:?set PLAYER_SHELL_PLAYER to your player binary}}" "$project" "$controls"
    fi
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::app::input::PhysicalKey;

    #[test]
    fn payload_has_path_then_controls() {
        let mut table = InputTable::default();
        table.apply_overrides(&BTreeMap::from([("jump".to_string(), PhysicalKey::X)]));
        let lines = play_payload(Path::new("/p/Pong.sb3"), &table);
        assert_eq!(lines[0], "__PLAY__=/p/Pong.sb3");
        let json = lines[1].strip_prefix(CONTROLS_PREFIX).unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert!(value.is_object());
        assert!(!json.contains('\n'));
    }

    #[test]
    fn wrappers_parse_both_prefixes() {
        for script in [bash_function(), zsh_function()] {
            assert!(script.contains("ps-play()"));
            assert!(script.contains(PLAY_PREFIX));
            assert!(script.contains(CONTROLS_PREFIX));
        }
    }
}
