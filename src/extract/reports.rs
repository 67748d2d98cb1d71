//! Fixed layouts of the downloaded USDA ERS reports.
//!
//! Cell ranges are coupled to the exact layout of each spreadsheet as
//! downloaded; a re-export with shifted rows moves every downstream
//! value.

use crate::error::ExtractError;
use crate::extract::excel::{self, Cell};
use crate::merge::{keyed_series, SocioSources};
use crate::normalize::{cell_currency, cell_int, cell_rate, county_name, percent_or_keep};
use std::path::Path;

fn columns(
    dir: &Path,
    file: &str,
    sheet: &str,
    name_range: &str,
    value_range: &str,
) -> Result<(Vec<Cell>, Vec<Cell>), ExtractError> {
    let path = dir.join(file);
    let names = excel::read_range(&path, sheet, name_range)?;
    let values = excel::read_range(&path, sheet, value_range)?;
    Ok((names, values))
}

/// Education rates are exported as unit fractions; the rest of the
/// reports already carry percentages.
fn percents(cells: Vec<Cell>) -> Vec<Cell> {
    cells.iter().map(percent_or_keep).collect()
}

fn bare_county_names(cells: Vec<Cell>) -> Vec<Cell> {
    cells
        .into_iter()
        .map(|cell| match cell {
            Cell::Text(label) => Cell::Text(county_name(&label)),
            other => other,
        })
        .collect()
}

/// State-level sources for the national socioeconomic table.
pub fn state_sources(dir: &Path) -> Result<SocioSources, ExtractError> {
    let (names, values) = columns(
        dir,
        "EducationReportCompColl.xlsx",
        "EducationReport",
        "A6:A56",
        "F6:F56",
    )?;
    let college_rate = keyed_series("college completion rate", &names, &percents(values), cell_rate)?;

    let (names, values) = columns(
        dir,
        "EducationReportHSOnly.xlsx",
        "EducationReport",
        "A6:A56",
        "F6:F56",
    )?;
    let hs_only_rate = keyed_series("completed HS only rate", &names, &percents(values), cell_rate)?;

    let (names, values) = columns(
        dir,
        "PopulationReport.xlsx",
        "PopulationReport",
        "A6:A56",
        "E6:E56",
    )?;
    let population = keyed_series("population", &names, &values, cell_int)?;

    let (names, values) = columns(
        dir,
        "PovertyReportPercent.xlsx",
        "PovertyReport",
        "A7:A57",
        "E7:E57",
    )?;
    let poverty_rate = keyed_series("poverty rate", &names, &values, cell_rate)?;

    // The unemployment report carries both remaining columns: K holds the
    // rate, L the median household income.
    let unemployment_path = dir.join("UnemploymentReportPercent.xlsx");
    let names = excel::read_range(&unemployment_path, "UnemploymentReport", "B4:B54")?;
    let values = excel::read_range(&unemployment_path, "UnemploymentReport", "K4:K54")?;
    let unemployment_rate = keyed_series("unemployment rate", &names, &values, cell_rate)?;

    let values = excel::read_range(&unemployment_path, "UnemploymentReport", "L4:L54")?;
    let median_income = keyed_series("median household income", &names, &values, cell_currency)?;

    Ok(SocioSources {
        population,
        median_income,
        poverty_rate,
        unemployment_rate,
        hs_only_rate,
        college_rate,
    })
}

/// Michigan county sources. The same six attributes, but every report
/// labels its counties differently, so the names are reduced to bare
/// county names before keying.
pub fn michigan_sources(dir: &Path) -> Result<SocioSources, ExtractError> {
    let (names, values) = columns(
        dir,
        "MIEducationReportCompColl.xlsx",
        "EducationReport",
        "B5:B87",
        "I5:I87",
    )?;
    let college_rate = keyed_series(
        "college completion rate",
        &bare_county_names(names),
        &percents(values),
        cell_rate,
    )?;

    let (names, values) = columns(
        dir,
        "MIEducationReportHSOnly.xlsx",
        "EducationReport",
        "B5:B87",
        "I5:I87",
    )?;
    let hs_only_rate = keyed_series(
        "completed HS only rate",
        &bare_county_names(names),
        &percents(values),
        cell_rate,
    )?;

    let (names, values) = columns(
        dir,
        "MIPopulationReport.xlsx",
        "PopulationReport",
        "B5:B87",
        "G5:G87",
    )?;
    let population = keyed_series("population", &bare_county_names(names), &values, cell_int)?;

    let (names, values) = columns(
        dir,
        "MIPovertyReport.xlsx",
        "PovertyReport",
        "D7:D89",
        "G7:G89",
    )?;
    let poverty_rate = keyed_series("poverty rate", &bare_county_names(names), &values, cell_rate)?;

    let unemployment_path = dir.join("MIUnemploymentReport.xlsx");
    let names = bare_county_names(excel::read_range(
        &unemployment_path,
        "UnemploymentReport",
        "B4:B86",
    )?);
    let values = excel::read_range(&unemployment_path, "UnemploymentReport", "K4:K86")?;
    let unemployment_rate = keyed_series("unemployment rate", &names, &values, cell_rate)?;

    let values = excel::read_range(&unemployment_path, "UnemploymentReport", "L4:L86")?;
    let median_income = keyed_series("median household income", &names, &values, cell_currency)?;

    Ok(SocioSources {
        population,
        median_income,
        poverty_rate,
        unemployment_rate,
        hs_only_rate,
        college_rate,
    })
}
