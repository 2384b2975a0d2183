//! Platform-specific print and enumeration commands.
//!
//! Each platform maps to a sequence of command attempts; the dispatcher
//! tries them in order and falls through on spawn failure. Keeping this a
//! pure table keeps the dispatcher itself platform-agnostic and testable.

use std::path::Path;

use regex_lite::Regex;

use super::PrinterError;

/// One concrete command invocation: program plus argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }
}

/// Build the ordered command attempts for printing `file` on `platform`.
///
/// - Unix-like systems spool through `lp`.
/// - Windows first tries the image viewer's silent-print switch, then falls
///   back to the shell's generic "print" verb.
pub fn print_commands(
    platform: &str,
    file: &Path,
    printer_name: Option<&str>,
    copies: u32,
) -> Result<Vec<CommandSpec>, PrinterError> {
    let file_arg = file.to_string_lossy().to_string();

    match platform {
        "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" => {
            let mut args = Vec::new();
            if let Some(name) = printer_name {
                args.extend(["-d".to_string(), name.to_string()]);
            }
            args.extend(["-n".to_string(), copies.to_string(), file_arg]);
            Ok(vec![CommandSpec::new("lp", args)])
        }
        "windows" => {
            let mut viewer_args = vec!["/pt".to_string(), file_arg.clone()];
            if let Some(name) = printer_name {
                viewer_args.push(name.to_string());
            }
            let fallback = CommandSpec::new(
                "powershell",
                vec![
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    format!("Start-Process -FilePath '{}' -Verb Print -Wait", file_arg),
                ],
            );
            Ok(vec![CommandSpec::new("mspaint", viewer_args), fallback])
        }
        other => Err(PrinterError::UnsupportedPlatform(other.to_string())),
    }
}

/// Command used to enumerate available printers, if the platform has one.
pub fn list_printers_command(platform: &str) -> Option<CommandSpec> {
    match platform {
        "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" => {
            Some(CommandSpec::new("lpstat", vec!["-p".to_string()]))
        }
        "windows" => Some(CommandSpec::new(
            "wmic",
            vec!["printer".to_string(), "get".to_string(), "name".to_string()],
        )),
        _ => None,
    }
}

/// Parse printer names out of the enumeration command's text output.
///
/// Unknown lines are skipped; no printers yields an empty list, not an error.
pub fn parse_printer_list(platform: &str, output: &str) -> Vec<String> {
    match platform {
        "windows" => output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("name"))
            .map(|line| line.to_string())
            .collect(),
        _ => {
            // lpstat -p lines look like: "printer Canon_SELPHY is idle. ..."
            let re = Regex::new(r"^printer\s+(\S+)").expect("static regex");
            output
                .lines()
                .filter_map(|line| re.captures(line.trim()))
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unix_print_command() {
        let file = PathBuf::from("/tmp/print_1_p1.jpg");
        let specs = print_commands("linux", &file, Some("Canon_SELPHY"), 2).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].program, "lp");
        assert_eq!(
            specs[0].args,
            vec!["-d", "Canon_SELPHY", "-n", "2", "/tmp/print_1_p1.jpg"]
        );
    }

    #[test]
    fn test_unix_print_command_default_printer() {
        let file = PathBuf::from("/tmp/print_1_p1.jpg");
        let specs = print_commands("linux", &file, None, 1).unwrap();
        assert_eq!(specs[0].args, vec!["-n", "1", "/tmp/print_1_p1.jpg"]);
    }

    #[test]
    fn test_windows_two_step_sequence() {
        let file = PathBuf::from("C:\\spool\\print_1_p1.jpg");
        let specs = print_commands("windows", &file, Some("Office"), 1).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].program, "mspaint");
        assert_eq!(specs[0].args[0], "/pt");
        assert_eq!(specs[1].program, "powershell");
        assert!(specs[1].args.last().unwrap().contains("-Verb Print"));
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let file = PathBuf::from("/tmp/x.jpg");
        let result = print_commands("plan9", &file, None, 1);
        assert!(matches!(result, Err(PrinterError::UnsupportedPlatform(_))));
    }

    #[test]
    fn test_parse_lpstat_output() {
        let output = "printer Canon_SELPHY is idle.  enabled since Mon\n\
                      printer HP_Deskjet is printing file.pdf\n\
                      system default destination: Canon_SELPHY\n";
        let printers = parse_printer_list("linux", output);
        assert_eq!(printers, vec!["Canon_SELPHY", "HP_Deskjet"]);
    }

    #[test]
    fn test_parse_lpstat_no_printers() {
        assert!(parse_printer_list("linux", "lpstat: No destinations added.\n").is_empty());
    }

    #[test]
    fn test_parse_wmic_output() {
        let output = "Name\r\nMicrosoft Print to PDF\r\nOffice\r\n\r\n";
        let printers = parse_printer_list("windows", output);
        assert_eq!(printers, vec!["Microsoft Print to PDF", "Office"]);
    }

    #[test]
    fn test_no_enumeration_command_for_unknown_platform() {
        assert!(list_printers_command("plan9").is_none());
    }
}
