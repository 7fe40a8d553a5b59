use serde::{Deserialize, Serialize};

/// Configuration for block extraction behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Recognize the Linux kernel macros `IS_ENABLED`, `IS_BUILTIN` and
    /// `IS_MODULE` in block conditions
    pub handle_linux_macros: bool,

    /// Encode non-boolean comparisons (`A == 2`) and bare variables as
    /// synthetic truthiness variables instead of rejecting them
    pub fuzzy_parsing: bool,

    /// What to do with a block condition that cannot be parsed
    pub invalid_conditions: InvalidConditionHandling,

    /// Synthesize a whole-file root block with condition true when source
    /// text exists outside all directives
    pub add_pseudo_block: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            handle_linux_macros: false,
            fuzzy_parsing: false,
            invalid_conditions: InvalidConditionHandling::Exception,
            add_pseudo_block: true,
        }
    }
}

impl ExtractorConfig {
    /// Config for scanning Linux kernel sources: kernel macros, fuzzy
    /// comparisons, and best-effort recovery with a countable sentinel.
    #[must_use]
    pub fn for_linux_kernel() -> Self {
        Self {
            handle_linux_macros: true,
            fuzzy_parsing: true,
            invalid_conditions: InvalidConditionHandling::ErrorVariable,
            ..Default::default()
        }
    }

    /// Config that never aborts a file over a bad condition: failed
    /// conditions silently degrade to constant true.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            fuzzy_parsing: true,
            invalid_conditions: InvalidConditionHandling::True,
            ..Default::default()
        }
    }
}

/// How to handle invalid / unparseable block conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidConditionHandling {
    /// Fail, making the whole file unparseable.
    #[default]
    Exception,

    /// Replace the invalid condition with constant true.
    True,

    /// Replace the invalid condition with a variable named `PARSING_ERROR`,
    /// an otherwise ordinary variable whose occurrences can be counted as a
    /// parse-quality metric.
    ErrorVariable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_strict() {
        let config = ExtractorConfig::default();
        assert!(!config.handle_linux_macros);
        assert!(!config.fuzzy_parsing);
        assert_eq!(config.invalid_conditions, InvalidConditionHandling::Exception);
        assert!(config.add_pseudo_block);
    }

    #[test]
    fn linux_kernel_preset_enables_recovery() {
        let config = ExtractorConfig::for_linux_kernel();
        assert!(config.handle_linux_macros);
        assert!(config.fuzzy_parsing);
        assert_eq!(
            config.invalid_conditions,
            InvalidConditionHandling::ErrorVariable
        );
    }

    #[test]
    fn lenient_preset_degrades_to_true() {
        let config = ExtractorConfig::lenient();
        assert!(!config.handle_linux_macros);
        assert_eq!(config.invalid_conditions, InvalidConditionHandling::True);
    }

    #[test]
    fn serde_uses_snake_case_for_handling_mode() {
        let json = serde_json::to_string(&InvalidConditionHandling::ErrorVariable).unwrap();
        assert_eq!(json, "\"error_variable\"");

        let config: ExtractorConfig =
            serde_json::from_str(r#"{"handle_linux_macros":true,"fuzzy_parsing":false,"invalid_conditions":"true","add_pseudo_block":false}"#)
                .unwrap();
        assert!(config.handle_linux_macros);
        assert_eq!(config.invalid_conditions, InvalidConditionHandling::True);
        assert!(!config.add_pseudo_block);
    }
}
