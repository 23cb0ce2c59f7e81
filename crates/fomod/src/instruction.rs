//! Install instructions, the engine's sole output artifact
//!
//! Instructions describe file-system and plugin-state actions for the caller
//! to perform; the engine itself touches neither. Destinations are always
//! normalized to relative paths at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the caller is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionType {
    Copy,
    Mkdir,
    GenerateFile,
    IniEdit,
    EnablePlugin,
    EnableAllPlugins,
    Unsupported,
    Error,
}

/// Severity carried by error instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Fatal,
    Warning,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Fatal => write!(f, "fatal"),
            ErrorSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// One unit of the engine's output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "type")]
    pub kind: InstructionType,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub section: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub data: Option<Vec<u8>>,
    pub priority: i64,
}

impl Instruction {
    fn empty(kind: InstructionType) -> Self {
        Instruction {
            kind,
            source: None,
            destination: None,
            section: None,
            key: None,
            value: None,
            data: None,
            priority: 0,
        }
    }

    pub fn copy(source: impl Into<String>, destination: &str, priority: i64) -> Self {
        Instruction {
            source: Some(source.into()),
            destination: Some(force_relative(destination)),
            priority,
            ..Instruction::empty(InstructionType::Copy)
        }
    }

    pub fn mkdir(destination: &str) -> Self {
        Instruction {
            destination: Some(force_relative(destination)),
            ..Instruction::empty(InstructionType::Mkdir)
        }
    }

    pub fn generate_file(data: Vec<u8>, destination: &str) -> Self {
        Instruction {
            data: Some(data),
            destination: Some(force_relative(destination)),
            ..Instruction::empty(InstructionType::GenerateFile)
        }
    }

    pub fn ini_edit(
        file_name: impl Into<String>,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Instruction {
            destination: Some(file_name.into()),
            section: Some(section.into()),
            key: Some(key.into()),
            value: Some(value.into()),
            ..Instruction::empty(InstructionType::IniEdit)
        }
    }

    pub fn enable_plugin(plugin: impl Into<String>) -> Self {
        Instruction {
            source: Some(plugin.into()),
            ..Instruction::empty(InstructionType::EnablePlugin)
        }
    }

    pub fn enable_all_plugins() -> Self {
        Instruction::empty(InstructionType::EnableAllPlugins)
    }

    pub fn unsupported(function: impl Into<String>) -> Self {
        Instruction {
            source: Some(function.into()),
            ..Instruction::empty(InstructionType::Unsupported)
        }
    }

    pub fn install_error(severity: ErrorSeverity, message: impl Into<String>) -> Self {
        Instruction {
            source: Some(message.into()),
            value: Some(severity.to_string()),
            ..Instruction::empty(InstructionType::Error)
        }
    }
}

/// Strips any leading separator run so destinations are always relative
fn force_relative(path: &str) -> String {
    path.trim_start_matches(['/', '\\']).to_string()
}
