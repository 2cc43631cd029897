//! Input acquisition for the subcommands.

use std::io::{IsTerminal, Read};

use crate::error::{CliError, CliResult};

/// Resolves command input by priority: file flag, positional argument, then
/// piped stdin. A terminal stdin does not count as input.
pub fn read_input(file: Option<&str>, arg: Option<&str>) -> CliResult<String> {
    if let Some(path) = file {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("failed to read {path}: {e}")))?;
        return Ok(data.trim().to_string());
    }

    if let Some(value) = arg {
        return Ok(value.trim().to_string());
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::Input(
            "no input provided. Use -f, pass an argument, or pipe data to stdin".into(),
        ));
    }

    let mut data = String::new();
    stdin
        .read_to_string(&mut data)
        .map_err(|e| CliError::Input(format!("failed to read stdin: {e}")))?;
    Ok(data.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_is_used_when_no_file_given() {
        let input = read_input(None, Some("  PHNhbWw+  ")).unwrap();
        assert_eq!(input, "PHNhbWw+");
    }

    #[test]
    fn file_takes_priority_over_argument() {
        let dir = std::env::temp_dir();
        let path = dir.join("samlscope_input_priority_test.txt");
        std::fs::write(&path, "from-file\n").unwrap();
        let input = read_input(path.to_str(), Some("from-arg")).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(input, "from-file");
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_input(Some("/nonexistent/samlscope.txt"), None).unwrap_err();
        assert!(matches!(err, CliError::Input(_)));
    }
}
