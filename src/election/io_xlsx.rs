// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::election::io_csv::simplify_file_name;
use crate::election::*;

pub fn read_xlsx_ranking(path: String, cfs: &FileSource) -> TidemanResult<Vec<ParsedBallot>> {
    let wrange = get_range(&path, cfs)?;
    parse_rows(&wrange, &simplify_file_name(&path), cfs)
}

fn parse_rows(
    wrange: &Range<DataType>,
    source_name: &str,
    cfs: &FileSource,
) -> TidemanResult<Vec<ParsedBallot>> {
    let first_row = cfs.first_vote_row_index()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        let lineno = idx + 1;
        debug!("parse_rows: lineno: {:?} row: {:?}", lineno, row);

        let count: Option<u64> = match count_idx_o {
            Some(count_idx) => read_count(row.get(count_idx), lineno)?,
            None => None,
        };

        let mut choices: Vec<String> = Vec::new();
        for (col, cell) in row.iter().enumerate().skip(choices_start_col) {
            if Some(col) == count_idx_o {
                continue;
            }
            match cell {
                DataType::String(s) if s.trim().is_empty() => {}
                DataType::String(s) => choices.push(s.trim().to_string()),
                DataType::Empty => {}
                _ => {
                    return ExcelWrongCellTypeSnafu {
                        lineno,
                        content: format!("{:?}", cell),
                    }
                    .fail();
                }
            }
        }

        if choices.is_empty() && count.is_none() {
            continue;
        }

        res.push(ParsedBallot {
            id: Some(format!("{}-{:08}", source_name, lineno)),
            count,
            choices,
        });
    }
    Ok(res)
}

fn read_count(cell: Option<&DataType>, lineno: usize) -> TidemanResult<Option<u64>> {
    match cell {
        None | Some(DataType::Empty) => Ok(None),
        Some(DataType::Int(i)) if *i >= 0 => Ok(Some(*i as u64)),
        Some(DataType::Float(f)) if *f >= 0.0 && f.fract() == 0.0 => Ok(Some(*f as u64)),
        Some(DataType::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .map(Some)
            .context(InvalidCountSnafu {
                lineno,
                content: s.clone(),
            }),
        Some(x) => InvalidCountSnafu {
            lineno,
            content: format!("{:?}", x),
        }
        .fail(),
    }
}

fn get_range(path: &String, cfs: &FileSource) -> TidemanResult<Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path: path.clone() })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path: path.clone() })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [(worksheet_name, wrange)] => {
                debug!("get_range: using the only worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            l => AmbiguousWorksheetSnafu { count: l.len() }.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<DataType>>) -> Range<DataType> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn rows_with_header_and_counts() {
        let range = sheet(vec![
            vec![s("first"), s("second"), s("third"), s("count")],
            vec![s("Alice"), s("Bob"), s("Charlie"), DataType::Float(3.0)],
            vec![s("Bob"), s("Charlie"), s("Alice"), DataType::Int(2)],
            vec![DataType::Empty, DataType::Empty, DataType::Empty, DataType::Empty],
        ]);
        let cfs: FileSource = serde_json::from_str(
            r#"{"provider": "xlsx", "filePath": "b.xlsx", "firstVoteRowIndex": 2, "countColumnIndex": "D"}"#,
        )
        .unwrap();
        let res = parse_rows(&range, "b.xlsx", &cfs).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].choices, vec!["Alice", "Bob", "Charlie"]);
        assert_eq!(res[0].count, Some(3));
        assert_eq!(res[1].count, Some(2));
        assert_eq!(res[1].id.as_deref(), Some("b.xlsx-00000003"));
    }

    #[test]
    fn numbers_are_not_names() {
        let range = sheet(vec![vec![s("Alice"), DataType::Float(1.5)]]);
        let cfs = FileSource::from_path("xlsx", "b.xlsx", None);
        let err = parse_rows(&range, "b.xlsx", &cfs).unwrap_err();
        assert!(matches!(err, TidemanError::ExcelWrongCellType { lineno: 1, .. }));
    }

    #[test]
    fn missing_workbook() {
        let cfs = FileSource::from_path("xlsx", "does_not_exist.xlsx", None);
        let err = read_xlsx_ranking("does_not_exist.xlsx".to_string(), &cfs).unwrap_err();
        assert!(matches!(err, TidemanError::OpeningExcel { .. }));
    }
}
