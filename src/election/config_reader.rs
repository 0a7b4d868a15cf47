use crate::election::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source with the default layout: one ballot per row, starting at the first cell.
    pub fn from_path(
        provider: &str,
        file_path: &str,
        excel_worksheet_name: Option<String>,
    ) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            count_column_index: None,
            excel_worksheet_name,
        }
    }

    /// The column of the first choice, starting at 0.
    pub fn first_vote_column_index(&self) -> TidemanResult<usize> {
        match self._first_vote_column_index {
            Some(_) => Ok(read_js_int(&self._first_vote_column_index)? - 1),
            None => Ok(0),
        }
    }

    /// The first row holding a ballot, starting at 0.
    pub fn first_vote_row_index(&self) -> TidemanResult<usize> {
        match self._first_vote_row_index {
            Some(_) => Ok(read_js_int(&self._first_vote_row_index)? - 1),
            None => Ok(0),
        }
    }

    /// The column holding the ballot weights, starting at 0.
    pub fn count_column_index_int(&self) -> TidemanResult<Option<usize>> {
        if self.count_column_index.is_some() {
            read_js_int(&self.count_column_index).map(|x| Some(x - 1))
        } else {
            Ok(None)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRules {
    #[serde(rename = "maxCandidates")]
    pub max_candidates: Option<usize>,
    #[serde(rename = "invalidBallotRule")]
    pub invalid_ballot_rule: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "ballotSources", default)]
    pub ballot_sources: Vec<FileSource>,
    #[serde(default)]
    pub candidates: Vec<ConfigCandidate>,
    pub rules: Option<ElectionRules>,
}

pub fn parse_config(contents: &str) -> TidemanResult<ElectionConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

pub fn read_config(path: &str) -> TidemanResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents)
}

pub fn read_summary(path: String) -> TidemanResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// All the indexes are 1-based, as in spreadsheets.
fn read_js_int(x: &Option<JSValue>) -> TidemanResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        // Excel-style column names: A, B, ..., Z
        Some(JSValue::String(s)) if s.len() == 1 && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase()
                .chars()
                .next()
                .map(|c| (c as usize) - ('a' as usize) + 1)
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|x| *x >= 1).context(ParsingJsonNumberSnafu {})
}
