//! Command line parsing for the tracker binary

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const USAGE: &str = "\
Usage:
  mediqueue-tracker [--config <path>] track <appointment-id>
  mediqueue-tracker [--config <path>] doctor <doctor-id>";

/// What the user asked the binary to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandType {
    /// Follow one appointment's queue position until interrupted
    Track { appointment_id: String },
    /// Print a doctor's queue once
    Doctor { doctor_id: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command_type: CommandType,
    pub config_path: String,
}

impl ParsedCommand {
    /// Parse the arguments after the program name.
    ///
    /// A missing or blank appointment id is accepted here; the view model
    /// reports it so the display can explain what went wrong.
    pub fn parse<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config_path = DEFAULT_CONFIG_PATH.to_string();
        let mut positional: Vec<String> = Vec::new();

        let mut args = args.into_iter().map(|arg| -> String { arg.into() });
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config_path = args
                        .next()
                        .ok_or_else(|| "--config needs a path".to_string())?;
                }
                "--help" | "-h" => {
                    return Ok(Self {
                        command_type: CommandType::Help,
                        config_path,
                    });
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command_type = match positional.next().as_deref() {
            Some("track") => CommandType::Track {
                appointment_id: positional.next().unwrap_or_default(),
            },
            Some("doctor") => {
                let doctor_id = positional
                    .next()
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| "doctor needs a doctor id".to_string())?;
                CommandType::Doctor { doctor_id }
            }
            Some("help") | None => CommandType::Help,
            Some(other) => return Err(format!("Unknown command: {}", other)),
        };

        if let Some(extra) = positional.next() {
            return Err(format!("Unexpected argument: {}", extra));
        }

        Ok(Self {
            command_type,
            config_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track() {
        let cmd = ParsedCommand::parse(["track", "apt-42"]).unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Track {
                appointment_id: "apt-42".to_string()
            }
        );
        assert_eq!(cmd.config_path, DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_parse_track_without_id() {
        let cmd = ParsedCommand::parse(["track"]).unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Track {
                appointment_id: String::new()
            }
        );
    }

    #[test]
    fn test_parse_config_flag_anywhere() {
        let cmd = ParsedCommand::parse(["doctor", "d-1", "--config", "/etc/mq.toml"]).unwrap();
        assert_eq!(cmd.config_path, "/etc/mq.toml");
        assert_eq!(
            cmd.command_type,
            CommandType::Doctor {
                doctor_id: "d-1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ParsedCommand::parse(["doctor"]).is_err());
        assert!(ParsedCommand::parse(["book", "x"]).is_err());
        assert!(ParsedCommand::parse(["track", "a", "b"]).is_err());
        assert!(ParsedCommand::parse(["track", "a", "--config"]).is_err());
    }

    #[test]
    fn test_parse_help() {
        let empty: [&str; 0] = [];
        assert_eq!(ParsedCommand::parse(empty).unwrap().command_type, CommandType::Help);
        assert_eq!(ParsedCommand::parse(["-h"]).unwrap().command_type, CommandType::Help);
    }
}
