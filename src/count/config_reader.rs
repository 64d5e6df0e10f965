use crate::count::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The optional JSON configuration of an election. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountConfig {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "cvrFiles")]
    pub cvr_files: Option<Vec<String>>,
    #[serde(rename = "auditFile")]
    pub audit_file: Option<String>,
    pub shuffle: Option<bool>,
    #[serde(rename = "randomSeed")]
    random_seed_js: Option<JSValue>,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "transferRule")]
    pub transfer_rule: Option<String>,
}

impl CountConfig {
    /// The seed may be written as a number or as a string.
    pub fn random_seed(&self) -> CountResult<Option<u32>> {
        match &self.random_seed_js {
            None => Ok(None),
            Some(JSValue::Number(n)) => n
                .as_u64()
                .and_then(|x| u32::try_from(x).ok())
                .map(Some)
                .context(ParsingJsonNumberSnafu {
                    value: n.to_string(),
                }),
            Some(JSValue::String(s)) => s
                .trim()
                .parse::<u32>()
                .ok()
                .map(Some)
                .context(ParsingJsonNumberSnafu { value: s.clone() }),
            Some(x) => ParsingJsonNumberSnafu {
                value: x.to_string(),
            }
            .fail(),
        }
    }
}

/// The `config` section of the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub kind: String,
    pub seats: u32,
    pub threshold: Option<String>,
}

pub fn read_config(path: &str) -> CountResult<CountConfig> {
    info!("Reading configuration {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: CountConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("config: {:?}", config);
    Ok(config)
}

pub fn validate_rules(config: &CountConfig) -> CountResult<StvRules> {
    let tiebreak_mode = match config.tiebreak_mode.as_deref() {
        None => StvRules::DEFAULT_RULES.tiebreak_mode,
        Some("firstReceipt") => TieBreakMode::FirstReceipt,
        Some("useCandidateOrder") => TieBreakMode::UseCandidateOrder,
        Some(x) => {
            return UnknownOptionSnafu {
                option: "tiebreakMode",
                value: x,
            }
            .fail()
        }
    };
    let transfer_rule = match config.transfer_rule.as_deref() {
        None => StvRules::DEFAULT_RULES.transfer_rule,
        Some("exhaustOnEliminated") => TransferRule::ExhaustOnEliminated,
        Some("skipToContinuing") => TransferRule::SkipToContinuing,
        Some(x) => {
            return UnknownOptionSnafu {
                option: "transferRule",
                value: x,
            }
            .fail()
        }
    };
    Ok(StvRules {
        tiebreak_mode,
        transfer_rule,
    })
}

pub fn read_summary(path: &str) -> CountResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_the_defaults() {
        let config: CountConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CountConfig::default());
        assert_eq!(validate_rules(&config).unwrap(), StvRules::DEFAULT_RULES);
        assert_eq!(config.random_seed().unwrap(), None);
    }

    #[test]
    fn full_config() {
        let config: CountConfig = serde_json::from_str(
            r#"{
                "contestName": "Board",
                "cvrFiles": ["a.csv", "b.csv"],
                "auditFile": "board_audit.txt",
                "shuffle": false,
                "randomSeed": "42",
                "tiebreakMode": "useCandidateOrder",
                "transferRule": "skipToContinuing"
            }"#,
        )
        .unwrap();
        assert_eq!(config.contest_name.as_deref(), Some("Board"));
        assert_eq!(config.cvr_files.as_ref().map(|v| v.len()), Some(2));
        assert_eq!(config.shuffle, Some(false));
        assert_eq!(config.random_seed().unwrap(), Some(42));
        assert_eq!(
            validate_rules(&config).unwrap(),
            StvRules {
                tiebreak_mode: TieBreakMode::UseCandidateOrder,
                transfer_rule: TransferRule::SkipToContinuing,
            }
        );
    }

    #[test]
    fn unknown_values_are_refused() {
        let config: CountConfig =
            serde_json::from_str(r#"{"tiebreakMode": "random", "randomSeed": -3}"#).unwrap();
        assert!(matches!(
            validate_rules(&config),
            Err(CountError::UnknownOption { .. })
        ));
        assert!(matches!(
            config.random_seed(),
            Err(CountError::ParsingJsonNumber { .. })
        ));
    }
}
