//! Shell completion generation for promptline
//!
//! Generates completion scripts for bash, zsh and fish. The generated
//! scripts also complete the values of `--mode`, which clap cannot infer
//! because modes are parsed from free text.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, PromptlineError, Result};

const BIN_NAME: &str = "promptline";

/// Values accepted by `--mode`
const MODE_VALUES: &str = "shell slash nl";

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    print!("{}", completion_script(shell)?);
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(PromptlineError::Config(ConfigError::Generic(format!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell_name
        )))),
    }
}

/// Clap-generated script for `shell`
fn base_script(shell: Shell) -> String {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Full script with `--mode` value completion appended
fn completion_script(shell: Shell) -> Result<String> {
    let base = base_script(shell);

    let extra = match shell {
        Shell::Bash => format!(
            r#"
# Complete --mode values
_promptline_enhanced() {{
    local cur prev words cword
    _init_completion || return

    if [[ "$prev" == "--mode" ]]; then
        COMPREPLY=($(compgen -W "{MODE_VALUES}" -- "$cur"))
        return 0
    fi

    _promptline "$@"
}}

complete -F _promptline_enhanced {BIN_NAME}
"#
        ),
        Shell::Zsh => format!(
            r#"
# Complete --mode values
_promptline_enhanced() {{
    if [[ ${{words[CURRENT-1]}} == "--mode" ]]; then
        local -a modes
        modes=({MODE_VALUES})
        _describe 'modes' modes
        return 0
    fi

    _promptline "$@"
}}

compdef _promptline_enhanced {BIN_NAME}
"#
        ),
        Shell::Fish => format!(
            r#"
# Complete --mode values
complete -c {BIN_NAME} -l mode -f -a "{MODE_VALUES}" -d "Input mode"
"#
        ),
        _ => {
            return Err(PromptlineError::Config(ConfigError::Generic(
                "Unsupported shell. Supported shells: bash, zsh, fish".to_string(),
            )));
        }
    };

    Ok(format!("{base}{extra}"))
}
