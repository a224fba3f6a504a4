use crate::draw::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "numberColumns")]
    pub number_columns: Option<Vec<String>>,
    #[serde(rename = "nameColumns")]
    pub name_columns: Option<Vec<String>>,
    pub delimiter: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawRules {
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: Option<i64>,
    #[serde(rename = "suspenseMillis")]
    pub suspense_millis: Option<u64>,
    #[serde(rename = "randomSeed")]
    _random_seed: Option<JSValue>,
}

impl DrawRules {
    pub fn random_seed(&self) -> DrawCliResult<Option<u64>> {
        match &self._random_seed {
            None | Some(JSValue::Null) => Ok(None),
            Some(x) => read_js_u64(x).map(Some),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "participantSource")]
    pub participant_source: ParticipantSource,
    #[serde(default)]
    pub rules: DrawRules,
}

pub fn read_config(path: &str) -> BDrawCliResult<DrawConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DrawConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> BDrawCliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// The delimiter as a single byte.
pub fn read_delimiter(delimiter: &str) -> DrawCliResult<u8> {
    match delimiter.as_bytes() {
        [b] => Ok(*b),
        // Written out in the JSON file
        _ if delimiter == "\\t" => Ok(b'\t'),
        _ => InvalidDelimiterSnafu { delimiter }.fail(),
    }
}

fn read_js_u64(x: &JSValue) -> DrawCliResult<u64> {
    match x {
        JSValue::Number(n) => n.as_u64().context(ParsingJsonNumberSnafu {
            value: n.to_string(),
        }),
        JSValue::String(s) => s.trim().parse::<u64>().ok().context(ParsingJsonNumberSnafu {
            value: s.clone(),
        }),
        _ => None.context(ParsingJsonNumberSnafu {
            value: x.to_string(),
        }),
    }
}
